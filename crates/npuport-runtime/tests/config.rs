//! Configuration-object families: built-in defaults, validation, and
//! adoption of backend-supplied accessor tables.

mod common;

use npuport_core::{
    BackendKind, BackendTables, DeviceConfigMode, DynamicShapeEnableMode, ExecuteDevice,
    ForeignHandle, PerfMode, PrecisionMode, TuningStrategy,
};
use npuport_runtime::{
    BackendHandle, CLCustomization, Deployment, DynamicShapeConfig, ModelBuildOptions,
    ModelDeviceConfig, ModelInitOptions, OpDeviceOrder, Registry,
};

use common::{registry_with, serving_init};

fn bare_registry() -> Registry {
    registry_with(Deployment::allow_all(), vec![])
}

#[test]
fn build_options_default_round_trip() {
    let registry = bare_registry();
    let mut options = ModelBuildOptions::new(&registry).expect("defaults serve");

    assert_eq!(options.precision_mode(), PrecisionMode::Unset);
    assert_eq!(options.tuning_strategy(), TuningStrategy::Off);

    options.set_precision_mode(PrecisionMode::Fp16);
    options.set_tuning_strategy(TuningStrategy::OnCloud);
    assert_eq!(options.precision_mode(), PrecisionMode::Fp16);
    assert_eq!(options.tuning_strategy(), TuningStrategy::OnCloud);
}

#[test]
fn build_options_hold_nested_configs() {
    let registry = bare_registry();
    let mut options = ModelBuildOptions::new(&registry).unwrap();
    assert!(options.device_config().is_none());
    assert!(options.dynamic_shape_config().is_none());

    let device = ModelDeviceConfig::new(&registry).unwrap();
    let shapes = DynamicShapeConfig::new(&registry).unwrap();
    let order = OpDeviceOrder::new(&registry).unwrap();
    options.set_device_config(&device);
    options.set_dynamic_shape_config(&shapes);
    options.set_op_device_order(&order);

    assert!(options.device_config().is_some());
    assert!(options.dynamic_shape_config().is_some());
    assert!(options.op_device_order().is_some());
}

#[test]
fn device_config_default_round_trip() {
    let registry = bare_registry();
    let mut config = ModelDeviceConfig::new(&registry).unwrap();

    assert_eq!(config.mode(), DeviceConfigMode::Auto);
    config.set_mode(DeviceConfigMode::OpLevel);
    assert_eq!(config.mode(), DeviceConfigMode::OpLevel);

    assert!(config.cl_customization().is_none());
    let mut cl = CLCustomization::new(&registry).unwrap();
    cl.set_kernel_dir("/opt/kernels");
    assert_eq!(cl.kernel_dir(), "/opt/kernels");
    config.set_cl_customization(&cl);
    assert!(config.cl_customization().is_some());
}

#[test]
fn dynamic_shape_cache_size_is_range_checked() {
    let registry = bare_registry();
    let mut config = DynamicShapeConfig::new(&registry).unwrap();

    config.set_enable_mode(DynamicShapeEnableMode::Enabled);
    assert_eq!(config.enable_mode(), DynamicShapeEnableMode::Enabled);

    config.set_max_cache_num(5);
    assert_eq!(config.max_cache_num(), 5);

    // Zero and above-limit values leave the stored value untouched.
    config.set_max_cache_num(0);
    assert_eq!(config.max_cache_num(), 5);
    config.set_max_cache_num(11);
    assert_eq!(config.max_cache_num(), 5);

    config.set_cache_dir("/var/cache/npu");
    assert_eq!(config.cache_dir(), "/var/cache/npu");
}

#[test]
fn op_device_order_rejects_empty_names() {
    let registry = bare_registry();
    let mut order = OpDeviceOrder::new(&registry).unwrap();

    order.set_op_name("");
    assert_eq!(order.op_name(), "");

    order.set_op_name("Conv2D");
    order.set_order(&[ExecuteDevice::Cpu, ExecuteDevice::Npu]);
    assert_eq!(order.op_name(), "Conv2D");
    assert_eq!(order.order(), vec![ExecuteDevice::Cpu, ExecuteDevice::Npu]);
}

#[test]
fn init_options_default_round_trip() {
    let registry = bare_registry();
    let mut init = ModelInitOptions::new(&registry).unwrap();

    assert_eq!(init.perf_mode(), PerfMode::Unset);
    init.set_perf_mode(PerfMode::Extreme);
    assert_eq!(init.perf_mode(), PerfMode::Extreme);

    assert!(init.build_options().is_none());
    let build = ModelBuildOptions::new(&registry).unwrap();
    init.set_build_options(&build);
    assert!(init.build_options().is_some());
}

/// An HCL backend exposing only the device-config family. Its objects
/// start in a telltale mode so adoption is observable, and the accessors
/// are stateful so set-then-get flows through the backend table.
fn device_config_provider_init(tables: &mut BackendTables) {
    struct ProviderConfig {
        mode: DeviceConfigMode,
    }
    fn create() -> Option<ForeignHandle> {
        Some(ForeignHandle::from_box(Box::new(ProviderConfig {
            mode: DeviceConfigMode::OpLevel,
        })))
    }
    fn destroy(h: ForeignHandle) {
        drop(unsafe { h.into_box::<ProviderConfig>() })
    }
    fn set_mode(h: ForeignHandle, mode: DeviceConfigMode) {
        unsafe { h.as_mut::<ProviderConfig>() }.mode = mode
    }
    fn mode(h: ForeignHandle) -> DeviceConfigMode {
        unsafe { h.as_mut::<ProviderConfig>() }.mode
    }
    tables.config.device_config.create = Some(create);
    tables.config.device_config.destroy = Some(destroy);
    tables.config.device_config.set_mode = Some(set_mode);
    tables.config.device_config.mode = Some(mode);
}

#[test]
fn hcl_backend_tables_take_precedence_over_defaults() {
    let registry = bare_registry();
    registry.register(
        BackendKind::RomHcl,
        BackendHandle::from_module_init(BackendKind::RomHcl, device_config_provider_init),
    );

    let mut config = ModelDeviceConfig::new(&registry).unwrap();
    // The provider's initial value, not the built-in default.
    assert_eq!(config.mode(), DeviceConfigMode::OpLevel);

    // Set-then-get travels through the backend-supplied accessors.
    config.set_mode(DeviceConfigMode::ModelLevel);
    assert_eq!(config.mode(), DeviceConfigMode::ModelLevel);

    let second = ModelDeviceConfig::new(&registry).unwrap();
    assert_eq!(second.mode(), DeviceConfigMode::OpLevel);
}

#[test]
fn families_without_backend_accessors_fall_back_to_defaults() {
    let registry = bare_registry();
    registry.register(
        BackendKind::RomHcl,
        BackendHandle::from_module_init(BackendKind::RomHcl, device_config_provider_init),
    );

    // The provider exposes no build-options accessors, so V1 serves.
    let mut options = ModelBuildOptions::new(&registry).unwrap();
    options.set_precision_mode(PrecisionMode::Fp32);
    assert_eq!(options.precision_mode(), PrecisionMode::Fp32);
}

#[test]
fn resolution_is_stable_across_later_registrations() {
    let registry = bare_registry();

    // First use resolves against the defaults.
    let before = ModelDeviceConfig::new(&registry).unwrap();
    assert_eq!(before.mode(), DeviceConfigMode::Auto);

    registry.register(
        BackendKind::RomHcl,
        BackendHandle::from_module_init(BackendKind::RomHcl, device_config_provider_init),
    );

    // The family stays on the accessors it resolved first.
    let after = ModelDeviceConfig::new(&registry).unwrap();
    assert_eq!(after.mode(), DeviceConfigMode::Auto);
}

#[test]
fn non_config_backend_does_not_satisfy_resolution() {
    let registry = registry_with(
        Deployment::allow_all(),
        vec![(BackendKind::LocalHcl, serving_init as _)],
    );

    // The identity backend carries no configuration accessors.
    let config = ModelDeviceConfig::new(&registry).unwrap();
    assert_eq!(config.mode(), DeviceConfigMode::Auto);
}
