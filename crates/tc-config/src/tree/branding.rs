//! Branding: logos, palette, typography and design scales.

use crate::layer::layered;
use std::collections::BTreeMap;

layered! {
    /// Logo URLs.
    pub struct LogoSet / PartialLogoSet {
        value primary: String,
        value secondary: Option<String>,
        value favicon: String,
        value dark_mode: Option<String>,
    }
}

impl Default for LogoSet {
    fn default() -> Self {
        Self {
            primary: "/assets/logo.svg".to_string(),
            secondary: None,
            favicon: "/assets/favicon.ico".to_string(),
            dark_mode: None,
        }
    }
}

layered! {
    /// Text colours.
    pub struct TextPalette / PartialTextPalette {
        value primary: String,
        value secondary: String,
        value disabled: String,
        value inverse: String,
    }
}

impl Default for TextPalette {
    fn default() -> Self {
        Self {
            primary: "#111827".to_string(),
            secondary: "#4B5563".to_string(),
            disabled: "#9CA3AF".to_string(),
            inverse: "#FFFFFF".to_string(),
        }
    }
}

layered! {
    /// Brand palette. Every colour is a `#RRGGBB` hex string.
    pub struct Palette / PartialPalette {
        value primary: String,
        value secondary: String,
        value accent: String,
        value success: String,
        value warning: String,
        value error: String,
        value info: String,
        value background: String,
        value surface: String,
        nested text: TextPalette,
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#2563EB".to_string(),
            secondary: "#64748B".to_string(),
            accent: "#F59E0B".to_string(),
            success: "#10B981".to_string(),
            warning: "#F59E0B".to_string(),
            error: "#EF4444".to_string(),
            info: "#3B82F6".to_string(),
            background: "#FFFFFF".to_string(),
            surface: "#F9FAFB".to_string(),
            text: TextPalette::default(),
        }
    }
}

impl Palette {
    /// Every colour with its dotted field path, text sub-palette included.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("primary", self.primary.as_str()),
            ("secondary", self.secondary.as_str()),
            ("accent", self.accent.as_str()),
            ("success", self.success.as_str()),
            ("warning", self.warning.as_str()),
            ("error", self.error.as_str()),
            ("info", self.info.as_str()),
            ("background", self.background.as_str()),
            ("surface", self.surface.as_str()),
            ("text.primary", self.text.primary.as_str()),
            ("text.secondary", self.text.secondary.as_str()),
            ("text.disabled", self.text.disabled.as_str()),
            ("text.inverse", self.text.inverse.as_str()),
        ]
    }
}

layered! {
    /// Font families.
    pub struct FontFamilies / PartialFontFamilies {
        value primary: String,
        value secondary: String,
        value mono: String,
    }
}

layered! {
    /// Font size scale (CSS lengths).
    pub struct FontSizes / PartialFontSizes {
        value xs: String,
        value sm: String,
        value base: String,
        value lg: String,
        value xl: String,
        value xxl: String,
    }
}

layered! {
    /// Font weight scale.
    pub struct FontWeights / PartialFontWeights {
        value light: u16,
        value normal: u16,
        value medium: u16,
        value semibold: u16,
        value bold: u16,
    }
}

layered! {
    /// Line height scale.
    pub struct LineHeights / PartialLineHeights {
        value tight: f64,
        value normal: f64,
        value relaxed: f64,
    }
}

layered! {
    pub struct Typography / PartialTypography {
        nested font_family: FontFamilies,
        nested font_size: FontSizes,
        nested font_weight: FontWeights,
        nested line_height: LineHeights,
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            font_family: FontFamilies {
                primary: "Inter, system-ui, sans-serif".to_string(),
                secondary: "Georgia, serif".to_string(),
                mono: "JetBrains Mono, monospace".to_string(),
            },
            font_size: FontSizes {
                xs: "0.75rem".to_string(),
                sm: "0.875rem".to_string(),
                base: "1rem".to_string(),
                lg: "1.125rem".to_string(),
                xl: "1.25rem".to_string(),
                xxl: "1.5rem".to_string(),
            },
            font_weight: FontWeights {
                light: 300,
                normal: 400,
                medium: 500,
                semibold: 600,
                bold: 700,
            },
            line_height: LineHeights {
                tight: 1.25,
                normal: 1.5,
                relaxed: 1.75,
            },
        }
    }
}

layered! {
    /// Spacing scale (CSS lengths).
    pub struct SpacingScale / PartialSpacingScale {
        value xs: String,
        value sm: String,
        value md: String,
        value lg: String,
        value xl: String,
    }
}

impl Default for SpacingScale {
    fn default() -> Self {
        Self {
            xs: "0.25rem".to_string(),
            sm: "0.5rem".to_string(),
            md: "1rem".to_string(),
            lg: "1.5rem".to_string(),
            xl: "2rem".to_string(),
        }
    }
}

layered! {
    /// Border radius scale (CSS lengths).
    pub struct RadiusScale / PartialRadiusScale {
        value none: String,
        value sm: String,
        value md: String,
        value lg: String,
        value full: String,
    }
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self {
            none: "0".to_string(),
            sm: "0.25rem".to_string(),
            md: "0.5rem".to_string(),
            lg: "1rem".to_string(),
            full: "9999px".to_string(),
        }
    }
}

layered! {
    /// Box shadow scale (CSS `box-shadow` values).
    pub struct ShadowScale / PartialShadowScale {
        value sm: String,
        value md: String,
        value lg: String,
        value xl: String,
    }
}

impl Default for ShadowScale {
    fn default() -> Self {
        Self {
            sm: "0 1px 2px rgba(0, 0, 0, 0.05)".to_string(),
            md: "0 4px 6px rgba(0, 0, 0, 0.1)".to_string(),
            lg: "0 10px 15px rgba(0, 0, 0, 0.1)".to_string(),
            xl: "0 20px 25px rgba(0, 0, 0, 0.15)".to_string(),
        }
    }
}

layered! {
    /// Visual identity of a tenant.
    pub struct Branding / PartialBranding {
        nested logo: LogoSet,
        nested colors: Palette,
        nested typography: Typography,
        nested spacing: SpacingScale,
        nested border_radius: RadiusScale,
        nested shadows: ShadowScale,
        /// Raw style text appended after every generated rule.
        value custom_css: Option<String>,
        /// Named asset URLs; layers add or replace individual keys.
        map assets: BTreeMap<String, String>,
    }
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            logo: LogoSet::default(),
            colors: Palette::default(),
            typography: Typography::default(),
            spacing: SpacingScale::default(),
            border_radius: RadiusScale::default(),
            shadows: ShadowScale::default(),
            custom_css: None,
            assets: BTreeMap::new(),
        }
    }
}
