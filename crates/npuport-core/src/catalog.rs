//! Stable capability catalog: entry names, symbol prefixes, well-known
//! library locations. Entry names are append-only; renaming an existing
//! entry breaks every deployed backend binary.
//!
//! A dynamically loadable backend exposes either `<prefix><entry>` symbols
//! for the slots it supports, or the single module-init symbol that fills
//! its tables programmatically.

/// Initializer entry point: `fn(&mut BackendTables)`.
pub const MODULE_INIT_SYMBOL: &str = "NpuBackendModuleInit";

/// Prefix shared by the three interchangeable HCL-family kinds.
pub const HCL_SYMBOL_PREFIX: &str = "HclNpu_";
/// Prefix for the compiled-blob loader kind.
pub const BINARY_SYMBOL_PREFIX: &str = "NpuBin_";

pub const HCL_LIBRARY: &str = "libhcl_npu.so";
pub const BINARY_LIBRARY: &str = "libnpu_binary.so";

/// Operation-space entry names.
pub mod op {
    pub const BUILD: &str = "ModelBuild";
    pub const BUILD_V2: &str = "ModelBuildV2";
    pub const RESTORE: &str = "ModelRestore";
    pub const RESTORE_FROM_FILE: &str = "ModelRestoreFromFile";
    pub const RESTORE_FROM_FILE_WITH_SHAPE_INDEX: &str = "ModelRestoreFromFileWithShapeIndex";
    pub const SAVE: &str = "ModelSave";
    pub const MODEL_NAME: &str = "ModelGetName";
    pub const INPUT_COUNT: &str = "ModelGetInputCount";
    pub const OUTPUT_COUNT: &str = "ModelGetOutputCount";
    pub const INPUT_DESC: &str = "ModelGetInputDesc";
    pub const OUTPUT_DESC: &str = "ModelGetOutputDesc";
    pub const CHECK_COMPATIBILITY: &str = "ModelCheckCompatibility";
    pub const AIPP_PARAM_COUNT: &str = "ModelGetAippParamCount";
    pub const DESTROY_MODEL: &str = "ModelDestroy";
    pub const CREATE_MANAGER: &str = "ManagerCreate";
    pub const DESTROY_MANAGER: &str = "ManagerDestroy";
    pub const INIT: &str = "ManagerInit";
    pub const INIT_V2: &str = "ManagerInitV2";
    pub const DEINIT: &str = "ManagerDeinit";
    pub const RUN: &str = "ManagerRun";
    pub const RUN_V3: &str = "ManagerRunV3";
    pub const RUN_ASYNC: &str = "ManagerRunAsync";
    pub const CANCEL: &str = "ManagerCancel";
    pub const SET_PRIORITY: &str = "ManagerSetPriority";
}

/// Configuration-space family names; a full accessor symbol reads
/// `<prefix><family><accessor>`, e.g. `HclNpu_BuildOptionsCreate`.
pub mod family {
    pub const BUILD_OPTIONS: &str = "BuildOptions";
    pub const DEVICE_CONFIG: &str = "DeviceConfig";
    pub const OP_DEVICE_ORDER: &str = "OpDeviceOrder";
    pub const CL_CUSTOMIZATION: &str = "CLCustomization";
    pub const DYNAMIC_SHAPE: &str = "DynamicShapeConfig";
    pub const INIT_OPTIONS: &str = "InitOptions";
}
