//! Backend selection order and HCL family fallback suppression.

mod common;

use npuport_core::{BackendKind, NpuError};
use npuport_runtime::{BackendHandle, BuiltModel, Deployment};

use common::{declining_init, registry_with, serving_init};

#[test]
fn priority_order_picks_the_first_available_kind() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![
            (BackendKind::LocalHcl, serving_init as _),
            (BackendKind::Binary, serving_init as _),
        ],
    );

    let model = BuiltModel::restore(&registry, b"blob").expect("restores");
    assert_eq!(model.backend_kind(), BackendKind::LocalHcl);
}

#[test]
fn hcl_siblings_are_skipped_once_a_member_loads() {
    // PluginHcl loads but declines every request. Its siblings must not be
    // consulted at all; the pass falls through to Binary.
    let registry = registry_with(
        Deployment::allow_all(),
        vec![
            (BackendKind::PluginHcl, declining_init as _),
            (BackendKind::LocalHcl, serving_init as _),
            (BackendKind::Binary, serving_init as _),
        ],
    );

    let model = BuiltModel::restore(&registry, b"blob").expect("binary serves");
    assert_eq!(model.backend_kind(), BackendKind::Binary);
    assert_eq!(registry.load_attempts(BackendKind::LocalHcl), 0);
    assert_eq!(registry.load_attempts(BackendKind::RomHcl), 0);
}

#[test]
fn suppression_covers_statically_registered_family_members() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::PluginHcl, declining_init as _)],
    );
    registry.register(
        BackendKind::RomHcl,
        BackendHandle::from_module_init(BackendKind::RomHcl, serving_init),
    );

    // RomHcl could have served, but the family is already spoken for.
    assert!(matches!(
        BuiltModel::restore(&registry, b"blob"),
        Err(NpuError::Exhausted)
    ));
}

#[test]
fn suppression_does_not_cross_family_lines() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::PluginHcl, declining_init as _)],
    );
    registry.register(
        BackendKind::Direct,
        BackendHandle::from_module_init(BackendKind::Direct, serving_init),
    );

    let model = BuiltModel::restore(&registry, b"blob").expect("direct serves");
    assert_eq!(model.backend_kind(), BackendKind::Direct);
}

#[test]
fn failed_family_load_does_not_suppress_siblings() {
    // PluginHcl is simply absent; LocalHcl is the first member that loads.
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::LocalHcl, serving_init as _)],
    );

    let model = BuiltModel::restore(&registry, b"blob").expect("local hcl serves");
    assert_eq!(model.backend_kind(), BackendKind::LocalHcl);
    assert_eq!(registry.load_attempts(BackendKind::PluginHcl), 1);
}

#[test]
fn deployment_list_excludes_whole_kinds_from_selection() {
    let registry = registry_with(
        Deployment::from_list("binary,direct"),
        vec![
            (BackendKind::LocalHcl, serving_init as _),
            (BackendKind::Binary, serving_init as _),
        ],
    );

    let model = BuiltModel::restore(&registry, b"blob").expect("binary serves");
    assert_eq!(model.backend_kind(), BackendKind::Binary);
    assert_eq!(registry.load_attempts(BackendKind::LocalHcl), 0);
}

#[test]
fn exhausted_when_no_backend_serves() {
    let registry = registry_with(Deployment::allow_all(), vec![]);
    assert!(matches!(
        BuiltModel::restore(&registry, b"blob"),
        Err(NpuError::Exhausted)
    ));
}

#[test]
fn exhausted_when_deployment_permits_nothing() {
    let registry = registry_with(
        Deployment::from_list(""),
        vec![(BackendKind::Binary, serving_init as _)],
    );
    assert!(matches!(
        BuiltModel::restore(&registry, b"blob"),
        Err(NpuError::Exhausted)
    ));
}
