mod common;

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use npuport_core::{BackendKind, NpuResult};
use npuport_runtime::{BackendHandle, BackendLoader, Deployment, Registry};

use common::{registry_with, serving_init};

#[test]
fn get_or_load_runs_the_loader_once() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::Binary, serving_init as _)],
    );

    let first = registry.get_or_load(BackendKind::Binary).expect("loads");
    let second = registry.get_or_load(BackendKind::Binary).expect("cached");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.load_attempts(BackendKind::Binary), 1);
}

#[test]
fn unavailable_result_is_cached() {
    let registry = registry_with(Deployment::allow_all(), vec![]);

    assert!(registry.get_or_load(BackendKind::LocalHcl).is_none());
    assert!(registry.get_or_load(BackendKind::LocalHcl).is_none());
    assert_eq!(registry.load_attempts(BackendKind::LocalHcl), 1);
}

#[test]
fn deployment_blocks_load_before_the_loader_runs() {
    let registry = registry_with(
        Deployment::from_list("direct"),
        vec![(BackendKind::Binary, serving_init as _)],
    );

    assert!(registry.get_or_load(BackendKind::Binary).is_none());
    assert_eq!(registry.load_attempts(BackendKind::Binary), 0);
}

#[test]
fn concurrent_lookups_load_once() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::Binary, serving_init as _)],
    );

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert!(registry.get_or_load(BackendKind::Binary).is_some());
            });
        }
    });
    assert_eq!(registry.load_attempts(BackendKind::Binary), 1);
}

#[test]
fn register_is_a_no_op_when_the_slot_is_live() {
    let registry = registry_with(Deployment::allow_all(), vec![]);

    registry.register(
        BackendKind::Direct,
        BackendHandle::from_module_init(BackendKind::Direct, serving_init),
    );
    // Second registration must not displace the live handle.
    registry.register(
        BackendKind::Direct,
        BackendHandle::from_module_init(BackendKind::Direct, common::declining_init),
    );

    let handle = registry.get_or_load(BackendKind::Direct).expect("registered");
    assert!(handle.ops().run.is_some(), "original handle survived");
}

#[test]
fn teardown_empties_slots_and_is_idempotent() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::Binary, serving_init as _)],
    );

    assert!(registry.get_or_load(BackendKind::Binary).is_some());
    registry.teardown();
    registry.teardown();

    // The slot is empty again, so the load strategy reruns.
    assert!(registry.get_or_load(BackendKind::Binary).is_some());
    assert_eq!(registry.load_attempts(BackendKind::Binary), 2);
}

#[test]
fn handles_outlive_teardown() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::Binary, serving_init as _)],
    );

    let handle = registry.get_or_load(BackendKind::Binary).expect("loads");
    registry.teardown();
    assert!(handle.ops().run.is_some());
}

/// Loader that parks inside `load` until the test releases it, exposing
/// the window between the load attempt and the final slot write.
struct GatedLoader {
    entered: Mutex<mpsc::Sender<()>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl BackendLoader for GatedLoader {
    fn load(&self, _kind: BackendKind) -> NpuResult<Option<BackendHandle>> {
        self.entered.lock().unwrap().send(()).unwrap();
        self.release.lock().unwrap().recv().unwrap();
        Ok(None)
    }
}

#[test]
fn registration_during_inflight_load_survives() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let registry = Registry::new(
        Deployment::allow_all(),
        Box::new(GatedLoader {
            entered: Mutex::new(entered_tx),
            release: Mutex::new(release_rx),
        }),
    );

    std::thread::scope(|scope| {
        let loading = scope.spawn(|| registry.get_or_load(BackendKind::Direct));

        // The loader is parked; a static registration lands mid-load.
        entered_rx.recv().unwrap();
        registry.register(
            BackendKind::Direct,
            BackendHandle::from_module_init(BackendKind::Direct, serving_init),
        );
        release_tx.send(()).unwrap();

        // The finishing load keeps the registered handle instead of caching
        // its own empty result over it.
        let loaded = loading.join().unwrap().expect("registered handle wins");
        assert!(loaded.ops().run.is_some());
    });

    assert!(registry.get_or_load(BackendKind::Direct).is_some());
}

#[test]
fn global_registry_is_a_singleton() {
    let a = Registry::global() as *const Registry;
    let b = Registry::global() as *const Registry;
    assert_eq!(a, b);
}
