//! In-process reference backend: the statically linked "direct" kind.
//!
//! There is no library to load; the host process hands `module_init` to
//! `BackendHandle::from_module_init` and registers the result. Execution is
//! identity copy, which is enough to exercise the whole dispatch surface
//! end to end. The configuration tables are left empty: this backend
//! sources configuration from the SDK's built-in defaults.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use npuport_core::{
    BackendKind, BackendRc, BackendTables, ForeignHandle, IoBuffer, ModelBuffer, ModelPriority,
    RunListener,
};
use npuport_runtime::{BackendHandle, Registry};
use tracing::debug;

struct HostModel {
    name: String,
    blob: Bytes,
}

/// Shared manager state. Detached async runs hold their own `Arc`, so the
/// state outlives `destroy_manager`; the model lock serializes Run against
/// Deinit.
struct ManagerState {
    model: Mutex<Option<ForeignHandle>>,
    cancelled: AtomicBool,
}

struct HostManager {
    state: Arc<ManagerState>,
}

fn manager_state(manager: ForeignHandle) -> Arc<ManagerState> {
    let manager = unsafe { &*manager.as_ptr().cast::<HostManager>() };
    manager.state.clone()
}

const RC_NOT_BOUND: BackendRc = BackendRc(-2);
const RC_IO_MISMATCH: BackendRc = BackendRc(-3);
const RC_CANCELLED: BackendRc = BackendRc(-4);

fn build(_options: Option<ForeignHandle>, buffers: &[ModelBuffer]) -> Option<ForeignHandle> {
    if buffers.is_empty() || buffers.iter().any(|b| b.data.is_empty()) {
        return None;
    }
    let mut blob = Vec::new();
    for buffer in buffers {
        blob.extend_from_slice(&buffer.data);
    }
    debug!(name = %buffers[0].name, bytes = blob.len(), "host backend built model");
    Some(ForeignHandle::from_box(Box::new(HostModel {
        name: buffers[0].name.clone(),
        blob: Bytes::from(blob),
    })))
}

fn restore(blob: &[u8]) -> Option<ForeignHandle> {
    if blob.is_empty() {
        return None;
    }
    Some(ForeignHandle::from_box(Box::new(HostModel {
        name: "restored".to_string(),
        blob: Bytes::copy_from_slice(blob),
    })))
}

fn restore_from_file(path: &str) -> Option<ForeignHandle> {
    let blob = std::fs::read(path).ok()?;
    if blob.is_empty() {
        return None;
    }
    let name = std::path::Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("restored")
        .to_string();
    Some(ForeignHandle::from_box(Box::new(HostModel {
        name,
        blob: Bytes::from(blob),
    })))
}

fn restore_from_file_with_shape_index(path: &str, _shape_index: u32) -> Option<ForeignHandle> {
    restore_from_file(path)
}

fn save(model: ForeignHandle, path: &str) -> BackendRc {
    let model = unsafe { model.as_mut::<HostModel>() };
    match std::fs::write(path, &model.blob) {
        Ok(()) => BackendRc::OK,
        Err(_) => BackendRc::FAILURE,
    }
}

fn model_name(model: ForeignHandle) -> String {
    unsafe { model.as_mut::<HostModel>() }.name.clone()
}

fn check_compatibility(_model: ForeignHandle) -> bool {
    true
}

fn aipp_param_count(_model: ForeignHandle, _input: usize) -> usize {
    0
}

fn destroy_model(model: ForeignHandle) {
    drop(unsafe { model.into_box::<HostModel>() })
}

fn create_manager() -> Option<ForeignHandle> {
    Some(ForeignHandle::from_box(Box::new(HostManager {
        state: Arc::new(ManagerState {
            model: Mutex::new(None),
            cancelled: AtomicBool::new(false),
        }),
    })))
}

fn destroy_manager(manager: ForeignHandle) {
    drop(unsafe { manager.into_box::<HostManager>() })
}

fn init(manager: ForeignHandle, model: ForeignHandle) -> BackendRc {
    init_v2(manager, model, None, None)
}

fn init_v2(
    manager: ForeignHandle,
    model: ForeignHandle,
    _options: Option<ForeignHandle>,
    _listener: Option<RunListener>,
) -> BackendRc {
    let state = manager_state(manager);
    *state.model.lock().unwrap() = Some(model);
    state.cancelled.store(false, Ordering::Relaxed);
    BackendRc::OK
}

fn deinit(manager: ForeignHandle) -> BackendRc {
    match manager_state(manager).model.lock().unwrap().take() {
        Some(_) => BackendRc::OK,
        None => RC_NOT_BOUND,
    }
}

fn copy_identity(inputs: &[IoBuffer], outputs: &mut [IoBuffer]) -> BackendRc {
    if inputs.len() != outputs.len() {
        return RC_IO_MISMATCH;
    }
    for (dst, src) in outputs.iter_mut().zip(inputs) {
        dst.data = src.data.clone();
    }
    BackendRc::OK
}

fn run(manager: ForeignHandle, inputs: &[IoBuffer], outputs: &mut [IoBuffer]) -> BackendRc {
    let state = manager_state(manager);
    let bound = state.model.lock().unwrap();
    if bound.is_none() {
        return RC_NOT_BOUND;
    }
    copy_identity(inputs, outputs)
}

fn run_async(
    manager: ForeignHandle,
    inputs: Vec<IoBuffer>,
    mut outputs: Vec<IoBuffer>,
    _timeout_ms: u32,
    listener: RunListener,
) -> BackendRc {
    let state = manager_state(manager);
    if state.model.lock().unwrap().is_none() {
        return RC_NOT_BOUND;
    }
    std::thread::spawn(move || {
        // Re-check under the lock: deinit may have won the race.
        let bound = state.model.lock().unwrap();
        let rc = if bound.is_none() {
            RC_NOT_BOUND
        } else if state.cancelled.swap(false, Ordering::Relaxed) {
            RC_CANCELLED
        } else {
            copy_identity(&inputs, &mut outputs)
        };
        drop(bound);
        (listener.on_done)(listener.token, rc, &outputs);
    });
    BackendRc::OK
}

fn cancel(manager: ForeignHandle) -> BackendRc {
    manager_state(manager).cancelled.store(true, Ordering::Relaxed);
    BackendRc::OK
}

fn set_priority(_manager: ForeignHandle, _priority: ModelPriority) -> BackendRc {
    // Single in-process queue; priority is accepted and irrelevant.
    BackendRc::OK
}

/// Populate the operation table. Matches the module-init contract a
/// dynamically loaded backend would fulfil through its init symbol.
pub fn module_init(tables: &mut BackendTables) {
    let ops = &mut tables.ops;
    ops.build = Some(build);
    ops.build_v2 = Some(build);
    ops.restore = Some(restore);
    ops.restore_from_file = Some(restore_from_file);
    ops.restore_from_file_with_shape_index = Some(restore_from_file_with_shape_index);
    ops.save = Some(save);
    ops.model_name = Some(model_name);
    ops.check_compatibility = Some(check_compatibility);
    ops.aipp_param_count = Some(aipp_param_count);
    ops.destroy_model = Some(destroy_model);
    ops.create_manager = Some(create_manager);
    ops.destroy_manager = Some(destroy_manager);
    ops.init = Some(init);
    ops.init_v2 = Some(init_v2);
    ops.deinit = Some(deinit);
    ops.run = Some(run);
    ops.run_v3 = Some(run);
    ops.run_async = Some(run_async);
    ops.cancel = Some(cancel);
    ops.set_priority = Some(set_priority);
}

/// Wire this backend into a registry as the process's `Direct` kind.
pub fn register(registry: &Registry) {
    registry.register(
        BackendKind::Direct,
        BackendHandle::from_module_init(BackendKind::Direct, module_init),
    );
}
