//! Property tests for layered resolution.
//!
//! Covers:
//! - Precedence: overrides > template > baseline, field by field
//! - Total coverage: every field of the output is populated
//! - Non-mutation of the inputs

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use tc_config::tree::*;
use tc_config::{resolve, ResolveStamp};

fn stamp() -> ResolveStamp {
    ResolveStamp::at("prop", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
}

#[derive(Debug, Clone)]
struct LayerSeed {
    name: Option<String>,
    subdomain: Option<String>,
    users_max: Option<u64>,
    tags: Option<Vec<String>>,
    search: Option<bool>,
    primary: Option<String>,
    asset: Option<(String, String)>,
}

fn seed_strategy() -> impl Strategy<Value = LayerSeed> {
    (
        proptest::option::of("[A-Za-z ]{1,12}"),
        proptest::option::of("[a-z0-9-]{1,10}"),
        proptest::option::of(1u64..100_000),
        proptest::option::of(proptest::collection::vec("[a-z]{1,6}", 0..4)),
        proptest::option::of(any::<bool>()),
        proptest::option::of("#[0-9A-F]{6}"),
        proptest::option::of(("[a-z]{1,4}", "/[a-z]{1,8}\\.png")),
    )
        .prop_map(
            |(name, subdomain, users_max, tags, search, primary, asset)| LayerSeed {
                name,
                subdomain,
                users_max,
                tags,
                search,
                primary,
                asset,
            },
        )
}

fn layer_from(seed: &LayerSeed) -> PartialConfigTree {
    PartialConfigTree {
        name: seed.name.clone(),
        subdomain: seed.subdomain.clone(),
        metadata: seed.tags.as_ref().map(|tags| PartialMetadata {
            tags: Some(tags.clone()),
            ..Default::default()
        }),
        limits: seed.users_max.map(|max| PartialLimits {
            users: Some(PartialQuotaLimit {
                max: Some(max),
                ..Default::default()
            }),
            ..Default::default()
        }),
        features: seed.search.map(|search| PartialFeatures {
            core: Some(PartialCoreFeatures {
                search: Some(search),
                ..Default::default()
            }),
            ..Default::default()
        }),
        branding: if seed.primary.is_some() || seed.asset.is_some() {
            Some(PartialBranding {
                colors: seed.primary.as_ref().map(|p| PartialPalette {
                    primary: Some(p.clone()),
                    ..Default::default()
                }),
                assets: seed
                    .asset
                    .as_ref()
                    .map(|(k, v)| [(k.clone(), v.clone())].into_iter().collect()),
                ..Default::default()
            })
        } else {
            None
        },
        ..Default::default()
    }
}

fn pick<T: Clone>(over: &Option<T>, tpl: &Option<T>, base: &T) -> T {
    over.clone()
        .or_else(|| tpl.clone())
        .unwrap_or_else(|| base.clone())
}

proptest! {
    #[test]
    fn precedence_holds_per_field(t in seed_strategy(), o in seed_strategy()) {
        let baseline = ConfigTree::baseline();
        let tree = resolve(&baseline, &layer_from(&t), &layer_from(&o), &stamp());

        prop_assert_eq!(tree.name, pick(&o.name, &t.name, &baseline.name));
        prop_assert_eq!(tree.subdomain, pick(&o.subdomain, &t.subdomain, &baseline.subdomain));
        prop_assert_eq!(
            tree.limits.users.max,
            pick(&o.users_max, &t.users_max, &baseline.limits.users.max)
        );
        prop_assert_eq!(tree.metadata.tags, pick(&o.tags, &t.tags, &baseline.metadata.tags));
        prop_assert_eq!(
            tree.features.core.search,
            pick(&o.search, &t.search, &baseline.features.core.search)
        );
        prop_assert_eq!(
            tree.branding.colors.primary,
            pick(&o.primary, &t.primary, &baseline.branding.colors.primary)
        );
        // Untouched neighbours always come from the baseline.
        prop_assert_eq!(tree.limits.users.warning_threshold, baseline.limits.users.warning_threshold);
        prop_assert_eq!(&tree.security, &baseline.security);
    }

    #[test]
    fn asset_maps_union_with_override_winning(t in seed_strategy(), o in seed_strategy()) {
        let tree = resolve(&ConfigTree::baseline(), &layer_from(&t), &layer_from(&o), &stamp());
        if let Some((k, v)) = &o.asset {
            prop_assert_eq!(tree.branding.assets.get(k), Some(v));
        }
        if let Some((k, v)) = &t.asset {
            let over_same_key = o.asset.as_ref().map(|(ok, _)| ok == k).unwrap_or(false);
            if !over_same_key {
                prop_assert_eq!(tree.branding.assets.get(k), Some(v));
            }
        }
    }

    #[test]
    fn output_is_fully_populated(t in seed_strategy(), o in seed_strategy()) {
        let tree = resolve(&ConfigTree::baseline(), &layer_from(&t), &layer_from(&o), &stamp());
        let json = serde_json::to_value(&tree).unwrap();
        let full_keys = serde_json::to_value(ConfigTree::baseline()).unwrap();
        for (key, _) in full_keys.as_object().unwrap() {
            prop_assert!(json.get(key).is_some(), "missing top-level key {}", key);
        }
        // Round-trips as a complete tree, so no field is absent.
        let back: ConfigTree = serde_json::from_value(json).unwrap();
        prop_assert_eq!(back, tree);
    }

    #[test]
    fn inputs_are_not_mutated(t in seed_strategy(), o in seed_strategy()) {
        let baseline = ConfigTree::baseline();
        let template = layer_from(&t);
        let overrides = layer_from(&o);
        let before = (baseline.clone(), template.clone(), overrides.clone());

        let mut tree = resolve(&baseline, &template, &overrides, &stamp());
        tree.metadata.tags.push("mutated".to_string());
        tree.branding.assets.insert("x".to_string(), "y".to_string());

        prop_assert_eq!(before, (baseline, template, overrides));
    }

    #[test]
    fn stamp_always_applied(t in seed_strategy(), o in seed_strategy()) {
        let tree = resolve(&ConfigTree::baseline(), &layer_from(&t), &layer_from(&o), &stamp());
        prop_assert_eq!(tree.id.as_str(), "prop");
        prop_assert_eq!(tree.metadata.created_at, stamp().now);
        prop_assert_eq!(tree.metadata.last_active, stamp().now);
    }
}
