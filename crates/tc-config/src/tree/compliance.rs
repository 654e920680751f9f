//! Compliance regimes.

use crate::layer::layered;

layered! {
    pub struct GdprCompliance / PartialGdprCompliance {
        value enabled: bool,
        value data_processing_agreement: bool,
        value dpo_contact: Option<String>,
        value right_to_erasure: bool,
    }
}

layered! {
    pub struct Soc2Compliance / PartialSoc2Compliance {
        value enabled: bool,
        /// `type1` or `type2`.
        value report_type: String,
        value last_audit: Option<String>,
    }
}

layered! {
    pub struct HipaaCompliance / PartialHipaaCompliance {
        value enabled: bool,
        value baa_signed: bool,
        value phi_encryption: bool,
    }
}

layered! {
    pub struct Iso27001Compliance / PartialIso27001Compliance {
        value enabled: bool,
        value certification_id: Option<String>,
        value expires_on: Option<String>,
    }
}

layered! {
    /// One record per regime.
    pub struct Compliance / PartialCompliance {
        nested gdpr: GdprCompliance,
        nested soc2: Soc2Compliance,
        nested hipaa: HipaaCompliance,
        nested iso27001: Iso27001Compliance,
    }
}

impl Default for Compliance {
    fn default() -> Self {
        Self {
            gdpr: GdprCompliance {
                enabled: false,
                data_processing_agreement: false,
                dpo_contact: None,
                right_to_erasure: true,
            },
            soc2: Soc2Compliance {
                enabled: false,
                report_type: "type1".to_string(),
                last_audit: None,
            },
            hipaa: HipaaCompliance {
                enabled: false,
                baa_signed: false,
                phi_encryption: false,
            },
            iso27001: Iso27001Compliance {
                enabled: false,
                certification_id: None,
                expires_on: None,
            },
        }
    }
}
