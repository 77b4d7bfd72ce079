//! Value enums for the six configuration-object families. The first variant
//! of each enum is the documented default returned when a resolved accessor
//! is absent.

/// Upper bound accepted by `DynamicShapeConfig::set_max_cache_num`.
pub const MAX_DYNAMIC_SHAPE_CACHE: u32 = 10;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PrecisionMode {
    #[default]
    Unset,
    Fp32,
    Fp16,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TuningStrategy {
    #[default]
    Off,
    OnDevice,
    OnDevicePreprocess,
    OnCloud,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceConfigMode {
    #[default]
    Auto,
    ModelLevel,
    OpLevel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FallbackMode {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoryReusePlan {
    #[default]
    Unset,
    Low,
    High,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DynamicShapeEnableMode {
    #[default]
    Disabled,
    Enabled,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PerfMode {
    #[default]
    Unset,
    Low,
    Medium,
    High,
    Extreme,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelPriority {
    #[default]
    Medium,
    High,
    Low,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecuteDevice {
    #[default]
    Npu,
    Cpu,
}
