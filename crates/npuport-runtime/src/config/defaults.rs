//! Built-in (V1) configuration objects, used whenever no HCL backend
//! supplies a family's accessors.
//!
//! The accessors are module-level `fn`s so they slot straight into the
//! dispatch tables. Every handle created here is only ever dereferenced
//! here; the unsafety is confined to these typed re-borrows.

use npuport_core::{
    BuildOptionsTable, ClCustomizationTable, DeviceConfigMode, DeviceConfigTable,
    DynamicShapeEnableMode, DynamicShapeTable, ExecuteDevice, FallbackMode, ForeignHandle,
    InitOptionsTable, MemoryReusePlan, OpDeviceOrderTable, PerfMode, PrecisionMode,
    TuningStrategy,
};

#[derive(Default)]
struct BuildOptionsV1 {
    precision: PrecisionMode,
    tuning: TuningStrategy,
    device_config: Option<ForeignHandle>,
    dynamic_shape: Option<ForeignHandle>,
    op_device_order: Option<ForeignHandle>,
}

fn bo_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(BuildOptionsV1::default())))
}
fn bo_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<BuildOptionsV1>() })
}
fn bo_set_precision(h: ForeignHandle, mode: PrecisionMode) {
    unsafe { h.as_mut::<BuildOptionsV1>() }.precision = mode
}
fn bo_precision(h: ForeignHandle) -> PrecisionMode {
    unsafe { h.as_mut::<BuildOptionsV1>() }.precision
}
fn bo_set_tuning(h: ForeignHandle, strategy: TuningStrategy) {
    unsafe { h.as_mut::<BuildOptionsV1>() }.tuning = strategy
}
fn bo_tuning(h: ForeignHandle) -> TuningStrategy {
    unsafe { h.as_mut::<BuildOptionsV1>() }.tuning
}
fn bo_set_device_config(h: ForeignHandle, config: ForeignHandle) {
    unsafe { h.as_mut::<BuildOptionsV1>() }.device_config = Some(config)
}
fn bo_device_config(h: ForeignHandle) -> Option<ForeignHandle> {
    unsafe { h.as_mut::<BuildOptionsV1>() }.device_config
}
fn bo_set_dynamic_shape(h: ForeignHandle, config: ForeignHandle) {
    unsafe { h.as_mut::<BuildOptionsV1>() }.dynamic_shape = Some(config)
}
fn bo_dynamic_shape(h: ForeignHandle) -> Option<ForeignHandle> {
    unsafe { h.as_mut::<BuildOptionsV1>() }.dynamic_shape
}
fn bo_set_op_device_order(h: ForeignHandle, order: ForeignHandle) {
    unsafe { h.as_mut::<BuildOptionsV1>() }.op_device_order = Some(order)
}
fn bo_op_device_order(h: ForeignHandle) -> Option<ForeignHandle> {
    unsafe { h.as_mut::<BuildOptionsV1>() }.op_device_order
}

pub(crate) fn build_options_table() -> BuildOptionsTable {
    BuildOptionsTable {
        create: Some(bo_create),
        destroy: Some(bo_destroy),
        set_precision_mode: Some(bo_set_precision),
        precision_mode: Some(bo_precision),
        set_tuning_strategy: Some(bo_set_tuning),
        tuning_strategy: Some(bo_tuning),
        set_device_config: Some(bo_set_device_config),
        device_config: Some(bo_device_config),
        set_dynamic_shape_config: Some(bo_set_dynamic_shape),
        dynamic_shape_config: Some(bo_dynamic_shape),
        set_op_device_order: Some(bo_set_op_device_order),
        op_device_order: Some(bo_op_device_order),
    }
}

#[derive(Default)]
struct DeviceConfigV1 {
    mode: DeviceConfigMode,
    fallback: FallbackMode,
    reuse: MemoryReusePlan,
    cl_customization: Option<ForeignHandle>,
}

fn dc_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(DeviceConfigV1::default())))
}
fn dc_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<DeviceConfigV1>() })
}
fn dc_set_mode(h: ForeignHandle, mode: DeviceConfigMode) {
    unsafe { h.as_mut::<DeviceConfigV1>() }.mode = mode
}
fn dc_mode(h: ForeignHandle) -> DeviceConfigMode {
    unsafe { h.as_mut::<DeviceConfigV1>() }.mode
}
fn dc_set_fallback(h: ForeignHandle, mode: FallbackMode) {
    unsafe { h.as_mut::<DeviceConfigV1>() }.fallback = mode
}
fn dc_fallback(h: ForeignHandle) -> FallbackMode {
    unsafe { h.as_mut::<DeviceConfigV1>() }.fallback
}
fn dc_set_reuse(h: ForeignHandle, plan: MemoryReusePlan) {
    unsafe { h.as_mut::<DeviceConfigV1>() }.reuse = plan
}
fn dc_reuse(h: ForeignHandle) -> MemoryReusePlan {
    unsafe { h.as_mut::<DeviceConfigV1>() }.reuse
}
fn dc_set_cl(h: ForeignHandle, cl: ForeignHandle) {
    unsafe { h.as_mut::<DeviceConfigV1>() }.cl_customization = Some(cl)
}
fn dc_cl(h: ForeignHandle) -> Option<ForeignHandle> {
    unsafe { h.as_mut::<DeviceConfigV1>() }.cl_customization
}

pub(crate) fn device_config_table() -> DeviceConfigTable {
    DeviceConfigTable {
        create: Some(dc_create),
        destroy: Some(dc_destroy),
        set_mode: Some(dc_set_mode),
        mode: Some(dc_mode),
        set_fallback_mode: Some(dc_set_fallback),
        fallback_mode: Some(dc_fallback),
        set_memory_reuse_plan: Some(dc_set_reuse),
        memory_reuse_plan: Some(dc_reuse),
        set_cl_customization: Some(dc_set_cl),
        cl_customization: Some(dc_cl),
    }
}

#[derive(Default)]
struct OpDeviceOrderV1 {
    op_name: String,
    order: Vec<ExecuteDevice>,
}

fn odo_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(OpDeviceOrderV1::default())))
}
fn odo_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<OpDeviceOrderV1>() })
}
fn odo_set_op_name(h: ForeignHandle, name: &str) {
    unsafe { h.as_mut::<OpDeviceOrderV1>() }.op_name = name.to_string()
}
fn odo_op_name(h: ForeignHandle) -> String {
    unsafe { h.as_mut::<OpDeviceOrderV1>() }.op_name.clone()
}
fn odo_set_order(h: ForeignHandle, order: &[ExecuteDevice]) {
    unsafe { h.as_mut::<OpDeviceOrderV1>() }.order = order.to_vec()
}
fn odo_order(h: ForeignHandle) -> Vec<ExecuteDevice> {
    unsafe { h.as_mut::<OpDeviceOrderV1>() }.order.clone()
}

pub(crate) fn op_device_order_table() -> OpDeviceOrderTable {
    OpDeviceOrderTable {
        create: Some(odo_create),
        destroy: Some(odo_destroy),
        set_op_name: Some(odo_set_op_name),
        op_name: Some(odo_op_name),
        set_order: Some(odo_set_order),
        order: Some(odo_order),
    }
}

#[derive(Default)]
struct ClCustomizationV1 {
    kernel_dir: String,
}

fn cl_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(
        ClCustomizationV1::default(),
    )))
}
fn cl_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<ClCustomizationV1>() })
}
fn cl_set_kernel_dir(h: ForeignHandle, dir: &str) {
    unsafe { h.as_mut::<ClCustomizationV1>() }.kernel_dir = dir.to_string()
}
fn cl_kernel_dir(h: ForeignHandle) -> String {
    unsafe { h.as_mut::<ClCustomizationV1>() }.kernel_dir.clone()
}

pub(crate) fn cl_customization_table() -> ClCustomizationTable {
    ClCustomizationTable {
        create: Some(cl_create),
        destroy: Some(cl_destroy),
        set_kernel_dir: Some(cl_set_kernel_dir),
        kernel_dir: Some(cl_kernel_dir),
    }
}

#[derive(Default)]
struct DynamicShapeV1 {
    enable: DynamicShapeEnableMode,
    max_cache: u32,
    cache_dir: String,
}

fn ds_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(DynamicShapeV1::default())))
}
fn ds_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<DynamicShapeV1>() })
}
fn ds_set_enable(h: ForeignHandle, mode: DynamicShapeEnableMode) {
    unsafe { h.as_mut::<DynamicShapeV1>() }.enable = mode
}
fn ds_enable(h: ForeignHandle) -> DynamicShapeEnableMode {
    unsafe { h.as_mut::<DynamicShapeV1>() }.enable
}
fn ds_set_max_cache(h: ForeignHandle, num: u32) {
    unsafe { h.as_mut::<DynamicShapeV1>() }.max_cache = num
}
fn ds_max_cache(h: ForeignHandle) -> u32 {
    unsafe { h.as_mut::<DynamicShapeV1>() }.max_cache
}
fn ds_set_cache_dir(h: ForeignHandle, dir: &str) {
    unsafe { h.as_mut::<DynamicShapeV1>() }.cache_dir = dir.to_string()
}
fn ds_cache_dir(h: ForeignHandle) -> String {
    unsafe { h.as_mut::<DynamicShapeV1>() }.cache_dir.clone()
}

pub(crate) fn dynamic_shape_table() -> DynamicShapeTable {
    DynamicShapeTable {
        create: Some(ds_create),
        destroy: Some(ds_destroy),
        set_enable_mode: Some(ds_set_enable),
        enable_mode: Some(ds_enable),
        set_max_cache_num: Some(ds_set_max_cache),
        max_cache_num: Some(ds_max_cache),
        set_cache_dir: Some(ds_set_cache_dir),
        cache_dir: Some(ds_cache_dir),
    }
}

#[derive(Default)]
struct InitOptionsV1 {
    perf: PerfMode,
    build_options: Option<ForeignHandle>,
}

fn io_create() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(InitOptionsV1::default())))
}
fn io_destroy(h: ForeignHandle) {
    drop(unsafe { h.into_box::<InitOptionsV1>() })
}
fn io_set_perf(h: ForeignHandle, mode: PerfMode) {
    unsafe { h.as_mut::<InitOptionsV1>() }.perf = mode
}
fn io_perf(h: ForeignHandle) -> PerfMode {
    unsafe { h.as_mut::<InitOptionsV1>() }.perf
}
fn io_set_build_options(h: ForeignHandle, options: ForeignHandle) {
    unsafe { h.as_mut::<InitOptionsV1>() }.build_options = Some(options)
}
fn io_build_options(h: ForeignHandle) -> Option<ForeignHandle> {
    unsafe { h.as_mut::<InitOptionsV1>() }.build_options
}

pub(crate) fn init_options_table() -> InitOptionsTable {
    InitOptionsTable {
        create: Some(io_create),
        destroy: Some(io_destroy),
        set_perf_mode: Some(io_set_perf),
        perf_mode: Some(io_perf),
        set_build_options: Some(io_set_build_options),
        build_options: Some(io_build_options),
    }
}
