//! The six versioned configuration-object families.
//!
//! Each family's accessor set is resolved once per registry: if the most
//! suitable HCL backend exposes a non-null `create` accessor for the family,
//! its whole table is adopted (and the backend pinned alive); otherwise the
//! built-in V1 implementation serves. Every public method is a trivial
//! forward through the resolved table, returning the documented default
//! when the resolved accessor itself is absent.

mod defaults;

use std::sync::{Arc, OnceLock};

use npuport_core::{
    BackendKind, BackendRc, BuildOptionsTable, ClCustomizationTable, ConfigTable,
    DeviceConfigMode, DeviceConfigTable, DynamicShapeEnableMode, DynamicShapeTable, ExecuteDevice,
    FallbackMode, ForeignHandle, InitOptionsTable, MemoryReusePlan, NpuError, NpuResult,
    OpDeviceOrderTable, PerfMode, PrecisionMode, TuningStrategy, MAX_DYNAMIC_SHAPE_CACHE,
};
use tracing::warn;

use crate::registry::{BackendHandle, Registry};

/// A family's accessors plus the backend (if any) that supplied them; the
/// Arc pins that backend's library for as long as the resolution lives.
pub(crate) struct Resolved<T: Copy> {
    table: T,
    provider: Option<Arc<BackendHandle>>,
}

/// Once-per-registry resolution state for the six families.
#[derive(Default)]
pub(crate) struct ConfigRouter {
    build_options: OnceLock<Resolved<BuildOptionsTable>>,
    device_config: OnceLock<Resolved<DeviceConfigTable>>,
    op_device_order: OnceLock<Resolved<OpDeviceOrderTable>>,
    cl_customization: OnceLock<Resolved<ClCustomizationTable>>,
    dynamic_shape: OnceLock<Resolved<DynamicShapeTable>>,
    init_options: OnceLock<Resolved<InitOptionsTable>>,
}

impl Registry {
    /// The most suitable HCL backend for sourcing configuration accessors,
    /// independent of any model: first family member that loads, in the
    /// same priority order the selector uses.
    fn preferred_config_backend(&self) -> Option<Arc<BackendHandle>> {
        BackendKind::ALL
            .into_iter()
            .filter(|k| k.is_hcl_family())
            .find_map(|k| self.get_or_load(k))
    }

    fn resolve_family<'a, T: Copy>(
        &self,
        cell: &'a OnceLock<Resolved<T>>,
        pick: fn(&ConfigTable) -> T,
        has_create: fn(&T) -> bool,
        default_table: fn() -> T,
    ) -> &'a Resolved<T> {
        cell.get_or_init(|| {
            if let Some(backend) = self.preferred_config_backend() {
                let table = pick(backend.config());
                if has_create(&table) {
                    return Resolved {
                        table,
                        provider: Some(backend),
                    };
                }
            }
            Resolved {
                table: default_table(),
                provider: None,
            }
        })
    }

    fn build_options_dispatch(&self) -> &Resolved<BuildOptionsTable> {
        self.resolve_family(
            &self.config.build_options,
            |c| c.build_options,
            |t| t.create.is_some(),
            defaults::build_options_table,
        )
    }

    fn device_config_dispatch(&self) -> &Resolved<DeviceConfigTable> {
        self.resolve_family(
            &self.config.device_config,
            |c| c.device_config,
            |t| t.create.is_some(),
            defaults::device_config_table,
        )
    }

    fn op_device_order_dispatch(&self) -> &Resolved<OpDeviceOrderTable> {
        self.resolve_family(
            &self.config.op_device_order,
            |c| c.op_device_order,
            |t| t.create.is_some(),
            defaults::op_device_order_table,
        )
    }

    fn cl_customization_dispatch(&self) -> &Resolved<ClCustomizationTable> {
        self.resolve_family(
            &self.config.cl_customization,
            |c| c.cl_customization,
            |t| t.create.is_some(),
            defaults::cl_customization_table,
        )
    }

    fn dynamic_shape_dispatch(&self) -> &Resolved<DynamicShapeTable> {
        self.resolve_family(
            &self.config.dynamic_shape,
            |c| c.dynamic_shape,
            |t| t.create.is_some(),
            defaults::dynamic_shape_table,
        )
    }

    fn init_options_dispatch(&self) -> &Resolved<InitOptionsTable> {
        self.resolve_family(
            &self.config.init_options,
            |c| c.init_options,
            |t| t.create.is_some(),
            defaults::init_options_table,
        )
    }
}

fn create_raw(create: Option<npuport_core::CreateConfigFn>) -> NpuResult<ForeignHandle> {
    let create = create.ok_or(NpuError::Unsupported)?;
    create().ok_or(NpuError::BackendFailure(BackendRc::FAILURE))
}

/// Build-time options forwarded to whichever backend services the build.
pub struct ModelBuildOptions {
    raw: ForeignHandle,
    table: BuildOptionsTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl ModelBuildOptions {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.build_options_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub(crate) fn raw(&self) -> ForeignHandle {
        self.raw
    }

    pub fn set_precision_mode(&mut self, mode: PrecisionMode) {
        if let Some(f) = self.table.set_precision_mode {
            f(self.raw, mode)
        }
    }

    pub fn precision_mode(&self) -> PrecisionMode {
        self.table
            .precision_mode
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    pub fn set_tuning_strategy(&mut self, strategy: TuningStrategy) {
        if let Some(f) = self.table.set_tuning_strategy {
            f(self.raw, strategy)
        }
    }

    pub fn tuning_strategy(&self) -> TuningStrategy {
        self.table
            .tuning_strategy
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    /// Stores the config handle; ownership stays with the caller.
    pub fn set_device_config(&mut self, config: &ModelDeviceConfig) {
        if let Some(f) = self.table.set_device_config {
            f(self.raw, config.raw)
        }
    }

    pub fn device_config(&self) -> Option<ForeignHandle> {
        self.table.device_config.and_then(|f| f(self.raw))
    }

    pub fn set_dynamic_shape_config(&mut self, config: &DynamicShapeConfig) {
        if let Some(f) = self.table.set_dynamic_shape_config {
            f(self.raw, config.raw)
        }
    }

    pub fn dynamic_shape_config(&self) -> Option<ForeignHandle> {
        self.table.dynamic_shape_config.and_then(|f| f(self.raw))
    }

    pub fn set_op_device_order(&mut self, order: &OpDeviceOrder) {
        if let Some(f) = self.table.set_op_device_order {
            f(self.raw, order.raw)
        }
    }

    pub fn op_device_order(&self) -> Option<ForeignHandle> {
        self.table.op_device_order.and_then(|f| f(self.raw))
    }
}

impl Drop for ModelBuildOptions {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}

pub struct ModelDeviceConfig {
    raw: ForeignHandle,
    table: DeviceConfigTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl ModelDeviceConfig {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.device_config_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub fn set_mode(&mut self, mode: DeviceConfigMode) {
        if let Some(f) = self.table.set_mode {
            f(self.raw, mode)
        }
    }

    pub fn mode(&self) -> DeviceConfigMode {
        self.table.mode.map(|f| f(self.raw)).unwrap_or_default()
    }

    pub fn set_fallback_mode(&mut self, mode: FallbackMode) {
        if let Some(f) = self.table.set_fallback_mode {
            f(self.raw, mode)
        }
    }

    pub fn fallback_mode(&self) -> FallbackMode {
        self.table
            .fallback_mode
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    pub fn set_memory_reuse_plan(&mut self, plan: MemoryReusePlan) {
        if let Some(f) = self.table.set_memory_reuse_plan {
            f(self.raw, plan)
        }
    }

    pub fn memory_reuse_plan(&self) -> MemoryReusePlan {
        self.table
            .memory_reuse_plan
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    pub fn set_cl_customization(&mut self, customization: &CLCustomization) {
        if let Some(f) = self.table.set_cl_customization {
            f(self.raw, customization.raw)
        }
    }

    pub fn cl_customization(&self) -> Option<ForeignHandle> {
        self.table.cl_customization.and_then(|f| f(self.raw))
    }
}

impl Drop for ModelDeviceConfig {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}

pub struct OpDeviceOrder {
    raw: ForeignHandle,
    table: OpDeviceOrderTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl OpDeviceOrder {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.op_device_order_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub fn set_op_name(&mut self, name: &str) {
        if name.is_empty() {
            warn!("rejected empty op name");
            return;
        }
        if let Some(f) = self.table.set_op_name {
            f(self.raw, name)
        }
    }

    pub fn op_name(&self) -> String {
        self.table.op_name.map(|f| f(self.raw)).unwrap_or_default()
    }

    pub fn set_order(&mut self, order: &[ExecuteDevice]) {
        if let Some(f) = self.table.set_order {
            f(self.raw, order)
        }
    }

    pub fn order(&self) -> Vec<ExecuteDevice> {
        self.table.order.map(|f| f(self.raw)).unwrap_or_default()
    }
}

impl Drop for OpDeviceOrder {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}

pub struct CLCustomization {
    raw: ForeignHandle,
    table: ClCustomizationTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl CLCustomization {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.cl_customization_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub fn set_kernel_dir(&mut self, dir: &str) {
        if let Some(f) = self.table.set_kernel_dir {
            f(self.raw, dir)
        }
    }

    pub fn kernel_dir(&self) -> String {
        self.table
            .kernel_dir
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }
}

impl Drop for CLCustomization {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}

pub struct DynamicShapeConfig {
    raw: ForeignHandle,
    table: DynamicShapeTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl DynamicShapeConfig {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.dynamic_shape_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub fn set_enable_mode(&mut self, mode: DynamicShapeEnableMode) {
        if let Some(f) = self.table.set_enable_mode {
            f(self.raw, mode)
        }
    }

    pub fn enable_mode(&self) -> DynamicShapeEnableMode {
        self.table
            .enable_mode
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    /// Out-of-range sizes are rejected before any backend sees them; the
    /// stored value is left unchanged.
    pub fn set_max_cache_num(&mut self, num: u32) {
        if num == 0 || num > MAX_DYNAMIC_SHAPE_CACHE {
            warn!(num, "rejected out-of-range dynamic-shape cache size");
            return;
        }
        if let Some(f) = self.table.set_max_cache_num {
            f(self.raw, num)
        }
    }

    pub fn max_cache_num(&self) -> u32 {
        self.table
            .max_cache_num
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    pub fn set_cache_dir(&mut self, dir: &str) {
        if let Some(f) = self.table.set_cache_dir {
            f(self.raw, dir)
        }
    }

    pub fn cache_dir(&self) -> String {
        self.table
            .cache_dir
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }
}

impl Drop for DynamicShapeConfig {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}

pub struct ModelInitOptions {
    raw: ForeignHandle,
    table: InitOptionsTable,
    _provider: Option<Arc<BackendHandle>>,
}

impl ModelInitOptions {
    pub fn new(registry: &Registry) -> NpuResult<Self> {
        let resolved = registry.init_options_dispatch();
        Ok(Self {
            raw: create_raw(resolved.table.create)?,
            table: resolved.table,
            _provider: resolved.provider.clone(),
        })
    }

    pub(crate) fn raw(&self) -> ForeignHandle {
        self.raw
    }

    pub fn set_perf_mode(&mut self, mode: PerfMode) {
        if let Some(f) = self.table.set_perf_mode {
            f(self.raw, mode)
        }
    }

    pub fn perf_mode(&self) -> PerfMode {
        self.table
            .perf_mode
            .map(|f| f(self.raw))
            .unwrap_or_default()
    }

    pub fn set_build_options(&mut self, options: &ModelBuildOptions) {
        if let Some(f) = self.table.set_build_options {
            f(self.raw, options.raw)
        }
    }

    pub fn build_options(&self) -> Option<ForeignHandle> {
        self.table.build_options.and_then(|f| f(self.raw))
    }
}

impl Drop for ModelInitOptions {
    fn drop(&mut self) {
        if let Some(destroy) = self.table.destroy {
            destroy(self.raw)
        }
    }
}
