use crate::catalog;
use crate::options::{
    DeviceConfigMode, DynamicShapeEnableMode, ExecuteDevice, FallbackMode, MemoryReusePlan,
    ModelPriority, PerfMode, PrecisionMode, TuningStrategy,
};
use crate::{BackendRc, ForeignHandle, IoBuffer, ModelBuffer, TensorDesc};

/// One class of backend implementation. Discriminant order is selection
/// priority order. At most one live handle exists per kind per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// HCL served through a plugin the host application preloaded.
    PluginHcl = 0,
    /// HCL from the well-known shared library on the host.
    LocalHcl = 1,
    /// HCL linked into the host image; arrives via static registration.
    RomHcl = 2,
    /// Compiled-blob loader library.
    Binary = 3,
    /// In-process reference backend; arrives via static registration.
    Direct = 4,
}

pub const KIND_COUNT: usize = 5;

impl BackendKind {
    /// Every kind, in selection priority order (lowest index tried first).
    pub const ALL: [BackendKind; KIND_COUNT] = [
        BackendKind::PluginHcl,
        BackendKind::LocalHcl,
        BackendKind::RomHcl,
        BackendKind::Binary,
        BackendKind::Direct,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used by the deployment allow-list.
    pub fn short_name(self) -> &'static str {
        match self {
            BackendKind::PluginHcl => "plugin-hcl",
            BackendKind::LocalHcl => "local-hcl",
            BackendKind::RomHcl => "rom-hcl",
            BackendKind::Binary => "binary",
            BackendKind::Direct => "direct",
        }
    }

    /// The three HCL kinds are interchangeable paths to the same
    /// acceleration stack; once one of them loads, the others are skipped
    /// for the remainder of a selection pass.
    pub fn is_hcl_family(self) -> bool {
        matches!(
            self,
            BackendKind::PluginHcl | BackendKind::LocalHcl | BackendKind::RomHcl
        )
    }

    /// Kinds that never dynamically load; they arrive via `Register`.
    pub fn is_static(self) -> bool {
        matches!(self, BackendKind::RomHcl | BackendKind::Direct)
    }

    /// Symbol prefix for prefix-scheme resolution, if the kind loads
    /// dynamically.
    pub fn symbol_prefix(self) -> Option<&'static str> {
        match self {
            BackendKind::PluginHcl | BackendKind::LocalHcl => Some(catalog::HCL_SYMBOL_PREFIX),
            BackendKind::Binary => Some(catalog::BINARY_SYMBOL_PREFIX),
            BackendKind::RomHcl | BackendKind::Direct => None,
        }
    }
}

/// Completion callback for `run_async`. The token round-trips verbatim so a
/// caller can correlate completions with submissions.
#[derive(Clone, Copy, Debug)]
pub struct RunListener {
    pub on_done: fn(token: usize, rc: BackendRc, outputs: &[IoBuffer]),
    pub token: usize,
}

pub type BuildFn = fn(options: Option<ForeignHandle>, buffers: &[ModelBuffer]) -> Option<ForeignHandle>;
pub type RestoreFn = fn(blob: &[u8]) -> Option<ForeignHandle>;
pub type RestoreFromFileFn = fn(path: &str) -> Option<ForeignHandle>;
pub type RestoreFromFileWithShapeIndexFn = fn(path: &str, shape_index: u32) -> Option<ForeignHandle>;
pub type SaveFn = fn(model: ForeignHandle, path: &str) -> BackendRc;
pub type ModelNameFn = fn(model: ForeignHandle) -> String;
pub type IoCountFn = fn(model: ForeignHandle) -> usize;
pub type TensorDescFn = fn(model: ForeignHandle, index: usize) -> Option<TensorDesc>;
pub type CheckCompatibilityFn = fn(model: ForeignHandle) -> bool;
pub type AippParamCountFn = fn(model: ForeignHandle, input: usize) -> usize;
pub type DestroyModelFn = fn(model: ForeignHandle);
pub type CreateManagerFn = fn() -> Option<ForeignHandle>;
pub type DestroyManagerFn = fn(manager: ForeignHandle);
pub type InitFn = fn(manager: ForeignHandle, model: ForeignHandle) -> BackendRc;
pub type InitV2Fn = fn(
    manager: ForeignHandle,
    model: ForeignHandle,
    options: Option<ForeignHandle>,
    listener: Option<RunListener>,
) -> BackendRc;
pub type DeinitFn = fn(manager: ForeignHandle) -> BackendRc;
pub type RunFn = fn(manager: ForeignHandle, inputs: &[IoBuffer], outputs: &mut [IoBuffer]) -> BackendRc;
pub type RunAsyncFn = fn(
    manager: ForeignHandle,
    inputs: Vec<IoBuffer>,
    outputs: Vec<IoBuffer>,
    timeout_ms: u32,
    listener: RunListener,
) -> BackendRc;
pub type CancelFn = fn(manager: ForeignHandle) -> BackendRc;
pub type SetPriorityFn = fn(manager: ForeignHandle, priority: ModelPriority) -> BackendRc;

/// Operation-space slot table. A `None` slot is the typed "unsupported"
/// signal; it is checked at every call site, never assumed.
#[derive(Clone, Copy, Default)]
pub struct OpTable {
    pub build: Option<BuildFn>,
    /// Newer-ABI build. Its presence is also the ABI-revision marker probed
    /// by the pre-run compatibility adjustment.
    pub build_v2: Option<BuildFn>,
    pub restore: Option<RestoreFn>,
    pub restore_from_file: Option<RestoreFromFileFn>,
    pub restore_from_file_with_shape_index: Option<RestoreFromFileWithShapeIndexFn>,
    pub save: Option<SaveFn>,
    pub model_name: Option<ModelNameFn>,
    pub input_count: Option<IoCountFn>,
    pub output_count: Option<IoCountFn>,
    pub input_desc: Option<TensorDescFn>,
    pub output_desc: Option<TensorDescFn>,
    pub check_compatibility: Option<CheckCompatibilityFn>,
    pub aipp_param_count: Option<AippParamCountFn>,
    pub destroy_model: Option<DestroyModelFn>,
    pub create_manager: Option<CreateManagerFn>,
    pub destroy_manager: Option<DestroyManagerFn>,
    pub init: Option<InitFn>,
    pub init_v2: Option<InitV2Fn>,
    pub deinit: Option<DeinitFn>,
    pub run: Option<RunFn>,
    pub run_v3: Option<RunFn>,
    pub run_async: Option<RunAsyncFn>,
    pub cancel: Option<CancelFn>,
    pub set_priority: Option<SetPriorityFn>,
}

pub type CreateConfigFn = fn() -> Option<ForeignHandle>;
pub type DestroyConfigFn = fn(ForeignHandle);

#[derive(Clone, Copy, Default)]
pub struct BuildOptionsTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_precision_mode: Option<fn(ForeignHandle, PrecisionMode)>,
    pub precision_mode: Option<fn(ForeignHandle) -> PrecisionMode>,
    pub set_tuning_strategy: Option<fn(ForeignHandle, TuningStrategy)>,
    pub tuning_strategy: Option<fn(ForeignHandle) -> TuningStrategy>,
    pub set_device_config: Option<fn(ForeignHandle, ForeignHandle)>,
    pub device_config: Option<fn(ForeignHandle) -> Option<ForeignHandle>>,
    pub set_dynamic_shape_config: Option<fn(ForeignHandle, ForeignHandle)>,
    pub dynamic_shape_config: Option<fn(ForeignHandle) -> Option<ForeignHandle>>,
    pub set_op_device_order: Option<fn(ForeignHandle, ForeignHandle)>,
    pub op_device_order: Option<fn(ForeignHandle) -> Option<ForeignHandle>>,
}

#[derive(Clone, Copy, Default)]
pub struct DeviceConfigTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_mode: Option<fn(ForeignHandle, DeviceConfigMode)>,
    pub mode: Option<fn(ForeignHandle) -> DeviceConfigMode>,
    pub set_fallback_mode: Option<fn(ForeignHandle, FallbackMode)>,
    pub fallback_mode: Option<fn(ForeignHandle) -> FallbackMode>,
    pub set_memory_reuse_plan: Option<fn(ForeignHandle, MemoryReusePlan)>,
    pub memory_reuse_plan: Option<fn(ForeignHandle) -> MemoryReusePlan>,
    pub set_cl_customization: Option<fn(ForeignHandle, ForeignHandle)>,
    pub cl_customization: Option<fn(ForeignHandle) -> Option<ForeignHandle>>,
}

#[derive(Clone, Copy, Default)]
pub struct OpDeviceOrderTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_op_name: Option<fn(ForeignHandle, &str)>,
    pub op_name: Option<fn(ForeignHandle) -> String>,
    pub set_order: Option<fn(ForeignHandle, &[ExecuteDevice])>,
    pub order: Option<fn(ForeignHandle) -> Vec<ExecuteDevice>>,
}

#[derive(Clone, Copy, Default)]
pub struct ClCustomizationTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_kernel_dir: Option<fn(ForeignHandle, &str)>,
    pub kernel_dir: Option<fn(ForeignHandle) -> String>,
}

#[derive(Clone, Copy, Default)]
pub struct DynamicShapeTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_enable_mode: Option<fn(ForeignHandle, DynamicShapeEnableMode)>,
    pub enable_mode: Option<fn(ForeignHandle) -> DynamicShapeEnableMode>,
    pub set_max_cache_num: Option<fn(ForeignHandle, u32)>,
    pub max_cache_num: Option<fn(ForeignHandle) -> u32>,
    pub set_cache_dir: Option<fn(ForeignHandle, &str)>,
    pub cache_dir: Option<fn(ForeignHandle) -> String>,
}

#[derive(Clone, Copy, Default)]
pub struct InitOptionsTable {
    pub create: Option<CreateConfigFn>,
    pub destroy: Option<DestroyConfigFn>,
    pub set_perf_mode: Option<fn(ForeignHandle, PerfMode)>,
    pub perf_mode: Option<fn(ForeignHandle) -> PerfMode>,
    pub set_build_options: Option<fn(ForeignHandle, ForeignHandle)>,
    pub build_options: Option<fn(ForeignHandle) -> Option<ForeignHandle>>,
}

/// Configuration-space slot table, one sub-table per family.
#[derive(Clone, Copy, Default)]
pub struct ConfigTable {
    pub build_options: BuildOptionsTable,
    pub device_config: DeviceConfigTable,
    pub op_device_order: OpDeviceOrderTable,
    pub cl_customization: ClCustomizationTable,
    pub dynamic_shape: DynamicShapeTable,
    pub init_options: InitOptionsTable,
}

/// The pair of tables a module-init function populates by reference.
#[derive(Clone, Copy, Default)]
pub struct BackendTables {
    pub ops: OpTable,
    pub config: ConfigTable,
}

/// Signature of the conventional initializer entry point
/// (`catalog::MODULE_INIT_SYMBOL`), also used directly by statically
/// linked backends when they register themselves.
pub type ModuleInitFn = fn(&mut BackendTables);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_order_is_discriminant_order() {
        for pair in BackendKind::ALL.windows(2) {
            assert!(pair[0].index() < pair[1].index());
        }
    }

    #[test]
    fn static_kinds_have_no_symbol_prefix() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.is_static(), kind.symbol_prefix().is_none());
        }
    }
}
