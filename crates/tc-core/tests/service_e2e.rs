//! End-to-end scenarios through the service façade.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tc_common::Error;
use tc_config::tree::{Limits, Plan};
use tc_config::{EngineSettings, PartialConfigTree, TreeUpdate};
use tc_core::{ManualClock, SystemClock, TenantConfigService, WorkflowRegistry};

fn service_with_clock() -> (TenantConfigService, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let mut settings = EngineSettings::default();
    settings.sync.enabled = false;
    let service = TenantConfigService::with_registry(
        settings,
        Arc::new(WorkflowRegistry::default()),
        clock.clone(),
    )
    .unwrap();
    (service, clock)
}

fn layer(json: &str) -> PartialConfigTree {
    serde_json::from_str(json).unwrap()
}

#[test]
fn acme_from_demo() {
    let (svc, _clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "demo", &layer(r#"{"name":"Acme"}"#), false)
        .unwrap();

    let tree = svc.get_tenant_config("acme").unwrap();
    let demo = svc.get_tenant_config("demo").unwrap();
    assert_eq!(tree.name, "Acme");
    assert_eq!(tree.subdomain, "demo");
    assert_eq!(tree.metadata.plan, demo.metadata.plan);
    assert_eq!(tree.metadata.plan, Plan::Professional);
    assert_eq!(tree.id, "acme");
}

#[test]
fn duplicate_create_is_refused_unless_overwriting() {
    let (svc, _clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "demo", &PartialConfigTree::default(), false)
        .unwrap();
    let err = svc
        .create_tenant_from_template("acme", "enterprise", &PartialConfigTree::default(), false)
        .unwrap_err();
    assert!(matches!(err, Error::TenantExists { .. }));
    assert_eq!(err.code(), 21);

    let tree = svc
        .create_tenant_from_template("acme", "enterprise", &PartialConfigTree::default(), true)
        .unwrap();
    assert_eq!(tree.metadata.plan, Plan::Enterprise);
    assert_eq!(
        svc.get_tenant_config("acme").unwrap().metadata.plan,
        Plan::Enterprise
    );
}

#[test]
fn read_your_writes_inside_ttl() {
    let (svc, clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "startup", &PartialConfigTree::default(), false)
        .unwrap();
    svc.get_tenant_config("acme");
    clock.advance_secs(1);

    let mut limits = Limits::default();
    limits.users.max = 500;
    limits.users.current = 500;
    let update = TreeUpdate {
        limits: Some(limits),
        ..Default::default()
    };
    assert!(svc.update_tenant_config("acme", &update));
    assert_eq!(svc.get_tenant_limits("acme").unwrap().users.max, 500);
    assert!(svc.is_limit_reached("acme", "users"));
    assert_eq!(
        svc.get_tenant_usage("acme").unwrap()[&tc_config::Dimension::Users].percentage,
        100
    );
}

#[test]
fn bypassing_update_is_picked_up_by_sync() {
    let (svc, _clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "startup", &PartialConfigTree::default(), false)
        .unwrap();
    svc.get_tenant_config("acme");

    // Direct registry write, as admin tooling would do.
    svc.registry().update(
        "acme",
        &TreeUpdate {
            name: Some("Admin Edit".to_string()),
            ..Default::default()
        },
    );
    assert_ne!(svc.get_tenant_config("acme").unwrap().name, "Admin Edit");
    let outcome = svc.sync_now();
    assert_eq!(outcome.refreshed, 1);
    assert_eq!(svc.get_tenant_config("acme").unwrap().name, "Admin Edit");
}

#[test]
fn remove_and_snapshot() {
    let (svc, _clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "demo", &PartialConfigTree::default(), false)
        .unwrap();
    let snap = svc.tenant_snapshot("acme").unwrap().unwrap();
    assert_eq!(snap.tenant_id, "acme");
    assert_eq!(snap.summary.plan, Plan::Professional);

    assert!(svc.remove_tenant_config("acme"));
    assert!(svc.get_tenant_config("acme").is_none());
    assert!(!svc.get_all_tenant_configs().contains_key("acme"));
}

#[test]
fn feature_lookup_through_service() {
    let (svc, _clock) = service_with_clock();
    assert!(svc.is_feature_enabled("default", "core.dashboard"));
    assert!(!svc.is_feature_enabled("default", "core.missing"));
    assert!(!svc.is_feature_enabled("default", "advanced.auditLogging"));
    assert!(svc.is_feature_enabled("enterprise", "advanced.auditLogging"));
}

#[test]
fn validate_through_service() {
    let (svc, _clock) = service_with_clock();
    svc.create_tenant_from_template("acme", "demo", &PartialConfigTree::default(), false)
        .unwrap();
    assert!(svc.validate_tenant_config("acme").valid);

    svc.update_tenant_config(
        "acme",
        &TreeUpdate {
            subdomain: Some("Demo_1".to_string()),
            ..Default::default()
        },
    );
    let report = svc.validate_tenant_config("acme");
    assert!(!report.valid);
    assert!(report.has_issue_for("subdomain"));
}

#[test]
fn read_your_writes_with_sync_running() {
    let svc = TenantConfigService::with_registry(
        EngineSettings::default(),
        Arc::new(WorkflowRegistry::default()),
        Arc::new(SystemClock),
    )
    .unwrap();
    assert!(svc.is_auto_sync_running());

    let tenants = ["t0", "t1", "t2", "t3"];
    for id in tenants {
        svc.create_tenant_from_template(id, "startup", &PartialConfigTree::default(), false)
            .unwrap();
    }

    let done = AtomicBool::new(false);
    thread::scope(|s| {
        // Sweeps and cache flushes racing the writers.
        s.spawn(|| {
            while !done.load(Ordering::Relaxed) {
                svc.sync_now();
            }
        });
        s.spawn(|| {
            let mut round = 0u32;
            while !done.load(Ordering::Relaxed) {
                for id in tenants {
                    svc.get_tenant_config(id);
                }
                round += 1;
                if round % 7 == 0 {
                    svc.clear_cache();
                }
            }
        });

        let writers: Vec<_> = tenants
            .iter()
            .map(|id| {
                let svc = &svc;
                s.spawn(move || {
                    for round in 0..300 {
                        let name = format!("{}-{}", id, round);
                        let update = TreeUpdate {
                            name: Some(name.clone()),
                            ..Default::default()
                        };
                        assert!(svc.update_tenant_config(id, &update));
                        assert_eq!(svc.get_tenant_config(id).unwrap().name, name);
                    }
                })
            })
            .collect();
        let results: Vec<_> = writers.into_iter().map(|w| w.join()).collect();
        done.store(true, Ordering::Relaxed);
        for result in results {
            result.unwrap();
        }
    });

    for id in tenants {
        assert_eq!(svc.get_tenant_config(id).unwrap().name, format!("{}-299", id));
    }
    assert!(svc.stop_auto_sync());
}
