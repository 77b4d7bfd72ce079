//! Symbol resolution against a loaded backend library.
//!
//! Every operation slot is probed as `<prefix><entry>`. If nothing resolves
//! that way the backend gets one chance to populate its tables itself via
//! the conventional module-init entry point; if that is also absent the
//! load fails and the caller releases the library.

use libloading::Library;
use npuport_core::catalog::{family, op, MODULE_INIT_SYMBOL};
use npuport_core::{BackendTables, ConfigTable, ModuleInitFn, NpuError, NpuResult};
use tracing::debug;

/// Look up one `<prefix><entry>` symbol as a plain function pointer.
/// Resolved pointers are trusted as-is: a stale or mismatched symbol is a
/// runtime fault at call time, not a type-checked error.
fn probe<T: Copy>(lib: &Library, prefix: &str, entry: &str, hits: &mut usize) -> Option<T> {
    let name = format!("{prefix}{entry}\0");
    let sym = unsafe { lib.get::<T>(name.as_bytes()) }.ok()?;
    *hits += 1;
    Some(*sym)
}

pub(crate) fn resolve_tables(lib: &Library, prefix: &str) -> NpuResult<BackendTables> {
    let mut tables = BackendTables::default();
    let mut hits = 0usize;

    {
        let ops = &mut tables.ops;
        ops.build = probe(lib, prefix, op::BUILD, &mut hits);
        ops.build_v2 = probe(lib, prefix, op::BUILD_V2, &mut hits);
        ops.restore = probe(lib, prefix, op::RESTORE, &mut hits);
        ops.restore_from_file = probe(lib, prefix, op::RESTORE_FROM_FILE, &mut hits);
        ops.restore_from_file_with_shape_index =
            probe(lib, prefix, op::RESTORE_FROM_FILE_WITH_SHAPE_INDEX, &mut hits);
        ops.save = probe(lib, prefix, op::SAVE, &mut hits);
        ops.model_name = probe(lib, prefix, op::MODEL_NAME, &mut hits);
        ops.input_count = probe(lib, prefix, op::INPUT_COUNT, &mut hits);
        ops.output_count = probe(lib, prefix, op::OUTPUT_COUNT, &mut hits);
        ops.input_desc = probe(lib, prefix, op::INPUT_DESC, &mut hits);
        ops.output_desc = probe(lib, prefix, op::OUTPUT_DESC, &mut hits);
        ops.check_compatibility = probe(lib, prefix, op::CHECK_COMPATIBILITY, &mut hits);
        ops.aipp_param_count = probe(lib, prefix, op::AIPP_PARAM_COUNT, &mut hits);
        ops.destroy_model = probe(lib, prefix, op::DESTROY_MODEL, &mut hits);
        ops.create_manager = probe(lib, prefix, op::CREATE_MANAGER, &mut hits);
        ops.destroy_manager = probe(lib, prefix, op::DESTROY_MANAGER, &mut hits);
        ops.init = probe(lib, prefix, op::INIT, &mut hits);
        ops.init_v2 = probe(lib, prefix, op::INIT_V2, &mut hits);
        ops.deinit = probe(lib, prefix, op::DEINIT, &mut hits);
        ops.run = probe(lib, prefix, op::RUN, &mut hits);
        ops.run_v3 = probe(lib, prefix, op::RUN_V3, &mut hits);
        ops.run_async = probe(lib, prefix, op::RUN_ASYNC, &mut hits);
        ops.cancel = probe(lib, prefix, op::CANCEL, &mut hits);
        ops.set_priority = probe(lib, prefix, op::SET_PRIORITY, &mut hits);
    }

    if hits == 0 {
        let init_name = format!("{MODULE_INIT_SYMBOL}\0");
        let init: ModuleInitFn = match unsafe { lib.get::<ModuleInitFn>(init_name.as_bytes()) } {
            Ok(sym) => *sym,
            Err(_) => {
                return Err(NpuError::LoadFailure(
                    "no prefixed symbols and no module-init entry",
                ))
            }
        };
        init(&mut tables);
        debug!(prefix, "backend populated tables via module-init");
        return Ok(tables);
    }

    // Partial misses in the configuration space are tolerated; absent
    // accessors stay None and are checked at call time.
    let mut cfg_hits = 0usize;
    resolve_config(lib, prefix, &mut tables.config, &mut cfg_hits);
    debug!(prefix, op_hits = hits, cfg_hits, "backend resolved via prefix scheme");
    Ok(tables)
}

fn resolve_config(lib: &Library, prefix: &str, cfg: &mut ConfigTable, hits: &mut usize) {
    let fam = family::BUILD_OPTIONS;
    let t = &mut cfg.build_options;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_precision_mode = probe(lib, prefix, &acc(fam, "SetPrecisionMode"), hits);
    t.precision_mode = probe(lib, prefix, &acc(fam, "GetPrecisionMode"), hits);
    t.set_tuning_strategy = probe(lib, prefix, &acc(fam, "SetTuningStrategy"), hits);
    t.tuning_strategy = probe(lib, prefix, &acc(fam, "GetTuningStrategy"), hits);
    t.set_device_config = probe(lib, prefix, &acc(fam, "SetDeviceConfig"), hits);
    t.device_config = probe(lib, prefix, &acc(fam, "GetDeviceConfig"), hits);
    t.set_dynamic_shape_config = probe(lib, prefix, &acc(fam, "SetDynamicShapeConfig"), hits);
    t.dynamic_shape_config = probe(lib, prefix, &acc(fam, "GetDynamicShapeConfig"), hits);
    t.set_op_device_order = probe(lib, prefix, &acc(fam, "SetOpDeviceOrder"), hits);
    t.op_device_order = probe(lib, prefix, &acc(fam, "GetOpDeviceOrder"), hits);

    let fam = family::DEVICE_CONFIG;
    let t = &mut cfg.device_config;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_mode = probe(lib, prefix, &acc(fam, "SetMode"), hits);
    t.mode = probe(lib, prefix, &acc(fam, "GetMode"), hits);
    t.set_fallback_mode = probe(lib, prefix, &acc(fam, "SetFallbackMode"), hits);
    t.fallback_mode = probe(lib, prefix, &acc(fam, "GetFallbackMode"), hits);
    t.set_memory_reuse_plan = probe(lib, prefix, &acc(fam, "SetMemoryReusePlan"), hits);
    t.memory_reuse_plan = probe(lib, prefix, &acc(fam, "GetMemoryReusePlan"), hits);
    t.set_cl_customization = probe(lib, prefix, &acc(fam, "SetCLCustomization"), hits);
    t.cl_customization = probe(lib, prefix, &acc(fam, "GetCLCustomization"), hits);

    let fam = family::OP_DEVICE_ORDER;
    let t = &mut cfg.op_device_order;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_op_name = probe(lib, prefix, &acc(fam, "SetOpName"), hits);
    t.op_name = probe(lib, prefix, &acc(fam, "GetOpName"), hits);
    t.set_order = probe(lib, prefix, &acc(fam, "SetOrder"), hits);
    t.order = probe(lib, prefix, &acc(fam, "GetOrder"), hits);

    let fam = family::CL_CUSTOMIZATION;
    let t = &mut cfg.cl_customization;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_kernel_dir = probe(lib, prefix, &acc(fam, "SetKernelDir"), hits);
    t.kernel_dir = probe(lib, prefix, &acc(fam, "GetKernelDir"), hits);

    let fam = family::DYNAMIC_SHAPE;
    let t = &mut cfg.dynamic_shape;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_enable_mode = probe(lib, prefix, &acc(fam, "SetEnableMode"), hits);
    t.enable_mode = probe(lib, prefix, &acc(fam, "GetEnableMode"), hits);
    t.set_max_cache_num = probe(lib, prefix, &acc(fam, "SetMaxCacheNum"), hits);
    t.max_cache_num = probe(lib, prefix, &acc(fam, "GetMaxCacheNum"), hits);
    t.set_cache_dir = probe(lib, prefix, &acc(fam, "SetCacheDir"), hits);
    t.cache_dir = probe(lib, prefix, &acc(fam, "GetCacheDir"), hits);

    let fam = family::INIT_OPTIONS;
    let t = &mut cfg.init_options;
    t.create = probe(lib, prefix, &acc(fam, "Create"), hits);
    t.destroy = probe(lib, prefix, &acc(fam, "Destroy"), hits);
    t.set_perf_mode = probe(lib, prefix, &acc(fam, "SetPerfMode"), hits);
    t.perf_mode = probe(lib, prefix, &acc(fam, "GetPerfMode"), hits);
    t.set_build_options = probe(lib, prefix, &acc(fam, "SetBuildOptions"), hits);
    t.build_options = probe(lib, prefix, &acc(fam, "GetBuildOptions"), hits);
}

fn acc(family: &str, accessor: &str) -> String {
    format!("{family}{accessor}")
}
