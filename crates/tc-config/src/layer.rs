//! Layered merging for configuration sections.
//!
//! Every section of a [`ConfigTree`](crate::ConfigTree) is declared through the
//! [`layered!`] macro, which emits two structs: the complete section and a
//! sparse twin whose fields are all optional. The macro also emits the
//! [`Layered`] implementation that applies the sparse twin on top of the
//! complete one.
//!
//! Each field is declared with a merge kind:
//!
//! | kind     | complete field   | layer field                | apply                         |
//! |----------|------------------|----------------------------|-------------------------------|
//! | `value`  | `T`              | `Option<T>`                | replace (arrays included)     |
//! | `nested` | `S: Layered`     | `Option<S::Partial>`       | recurse into `S`              |
//! | `map`    | `BTreeMap<K, V>` | `Option<BTreeMap<K, V>>`   | per-key union, layer wins     |
//!
//! A key present in a layer document is always a value, including an
//! explicit `null`: for an optional field (`value logo: Option<String>`) the
//! layer holds `Some(None)` and clears the inherited value. Absent keys
//! inherit. `null` on a non-optional field is a deserialization error.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// A configuration section that can absorb a sparse layer of overrides.
pub trait Layered: Clone {
    /// Sparse twin of this section.
    type Partial: Clone + Default;

    /// Apply `layer` on top of `self`. Fields absent from the layer are untouched.
    fn apply(&mut self, layer: &Self::Partial);

    /// Combine two layers into one that behaves like applying `lower`, then `upper`.
    fn stack(upper: &Self::Partial, lower: &Self::Partial) -> Self::Partial;

    /// Copy of `self` with `layer` applied.
    fn with_layer(&self, layer: &Self::Partial) -> Self {
        let mut out = self.clone();
        out.apply(layer);
        out
    }
}

/// Deserialize a present layer key as `Some`, so `null` reaches the inner type.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

pub(crate) fn apply_value<T: Clone>(target: &mut T, layer: &Option<T>) {
    if let Some(value) = layer {
        *target = value.clone();
    }
}

pub(crate) fn apply_nested<T: Layered>(target: &mut T, layer: &Option<T::Partial>) {
    if let Some(partial) = layer {
        target.apply(partial);
    }
}

pub(crate) fn apply_map<K: Ord + Clone, V: Clone>(
    target: &mut BTreeMap<K, V>,
    layer: &Option<BTreeMap<K, V>>,
) {
    if let Some(entries) = layer {
        for (key, value) in entries {
            target.insert(key.clone(), value.clone());
        }
    }
}

pub(crate) fn stack_value<T: Clone>(upper: &Option<T>, lower: &Option<T>) -> Option<T> {
    upper.clone().or_else(|| lower.clone())
}

pub(crate) fn stack_nested<T: Layered>(
    upper: &Option<T::Partial>,
    lower: &Option<T::Partial>,
) -> Option<T::Partial> {
    match (upper, lower) {
        (Some(u), Some(l)) => Some(T::stack(u, l)),
        (Some(u), None) => Some(u.clone()),
        (None, l) => l.clone(),
    }
}

pub(crate) fn stack_map<K: Ord + Clone, V: Clone>(
    upper: &Option<BTreeMap<K, V>>,
    lower: &Option<BTreeMap<K, V>>,
) -> Option<BTreeMap<K, V>> {
    match (upper, lower) {
        (Some(u), Some(l)) => {
            let mut merged = l.clone();
            merged.extend(u.iter().map(|(k, v)| (k.clone(), v.clone())));
            Some(merged)
        }
        (Some(u), None) => Some(u.clone()),
        (None, l) => l.clone(),
    }
}

/// Declare a configuration section and its sparse layer twin.
///
/// ```ignore
/// layered! {
///     /// Quota for one dimension.
///     pub struct QuotaLimit / PartialQuotaLimit {
///         value max: u64,
///         value current: u64,
///     }
/// }
/// ```
macro_rules! layered {
    (@partial value $ty:ty) => { Option<$ty> };
    (@partial map $ty:ty) => { Option<$ty> };
    (@partial nested $ty:ty) => { Option<<$ty as $crate::layer::Layered>::Partial> };

    (@apply value $ty:ty, $target:expr, $layer:expr) => {
        $crate::layer::apply_value($target, $layer)
    };
    (@apply map $ty:ty, $target:expr, $layer:expr) => {
        $crate::layer::apply_map($target, $layer)
    };
    (@apply nested $ty:ty, $target:expr, $layer:expr) => {
        $crate::layer::apply_nested::<$ty>($target, $layer)
    };

    (@stack value $ty:ty, $upper:expr, $lower:expr) => {
        $crate::layer::stack_value($upper, $lower)
    };
    (@stack map $ty:ty, $upper:expr, $lower:expr) => {
        $crate::layer::stack_map($upper, $lower)
    };
    (@stack nested $ty:ty, $upper:expr, $lower:expr) => {
        $crate::layer::stack_nested::<$ty>($upper, $lower)
    };

    (
        $(#[$meta:meta])*
        pub struct $name:ident / $partial:ident {
            $(
                $(#[$fmeta:meta])*
                $kind:ident $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $ty,
            )*
        }

        #[doc = concat!("Sparse layer over [`", stringify!($name), "`]; absent fields inherit.")]
        #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub struct $partial {
            $(
                #[serde(
                    skip_serializing_if = "Option::is_none",
                    deserialize_with = "crate::layer::present"
                )]
                pub $field: $crate::layer::layered!(@partial $kind $ty),
            )*
        }

        impl $crate::layer::Layered for $name {
            type Partial = $partial;

            fn apply(&mut self, layer: &$partial) {
                $(
                    $crate::layer::layered!(@apply $kind $ty, &mut self.$field, &layer.$field);
                )*
            }

            fn stack(upper: &$partial, lower: &$partial) -> $partial {
                $partial {
                    $(
                        $field: $crate::layer::layered!(
                            @stack $kind $ty, &upper.$field, &lower.$field
                        ),
                    )*
                }
            }
        }

        impl $partial {
            /// True when the layer carries no fields at all.
            pub fn is_empty(&self) -> bool {
                true $(&& self.$field.is_none())*
            }

            /// Stack `self` on top of `lower`: `self` wins field by field.
            pub fn layer_over(&self, lower: &Self) -> Self {
                <$name as $crate::layer::Layered>::stack(self, lower)
            }
        }
    };
}

pub(crate) use layered;
