use std::sync::Arc;

use npuport_core::{
    BackendRc, ForeignHandle, IoBuffer, ModelPriority, NpuError, NpuResult, RunListener,
};
use tracing::debug;

use crate::compat;
use crate::config::ModelInitOptions;
use crate::model::BuiltModel;
use crate::registry::BackendHandle;

/// One loaded, runnable instance of a BuiltModel. Created unbound; the
/// backend binding is derived from the model passed to `init`, never chosen
/// independently. No per-manager lock: concurrent Run/Cancel/Deinit
/// serialization is the backend's responsibility.
pub struct ModelManager {
    raw: Option<ForeignHandle>,
    backend: Option<Arc<BackendHandle>>,
    needs_legacy_buffers: bool,
}

impl ModelManager {
    pub fn new() -> Self {
        Self {
            raw: None,
            backend: None,
            needs_legacy_buffers: false,
        }
    }

    /// Bind to the model's backend and initialize. Re-entrant init is a
    /// caller error; after `deinit`, re-init must target the same backend
    /// (one backend per manager lifetime).
    pub fn init(
        &mut self,
        options: Option<&ModelInitOptions>,
        model: &BuiltModel,
        listener: Option<RunListener>,
    ) -> NpuResult<()> {
        if self.raw.is_some() {
            return Err(NpuError::InvalidState("manager is already initialized"));
        }
        let backend = model.backend().clone();
        if let Some(bound) = &self.backend {
            if !Arc::ptr_eq(bound, &backend) {
                return Err(NpuError::InvalidState(
                    "manager was previously bound to a different backend",
                ));
            }
        }

        let ops = backend.ops();
        let create = ops.create_manager.ok_or(NpuError::Unsupported)?;
        let raw = create().ok_or(NpuError::BackendFailure(BackendRc::FAILURE))?;
        let model_raw = model.raw()?;

        let rc = match (ops.init_v2, ops.init) {
            (Some(init_v2), _) => init_v2(raw, model_raw, options.map(|o| o.raw()), listener),
            (None, Some(init)) => init(raw, model_raw),
            (None, None) => {
                if let Some(destroy) = ops.destroy_manager {
                    destroy(raw);
                }
                return Err(NpuError::Unsupported);
            }
        };
        if !rc.is_ok() {
            if let Some(destroy) = ops.destroy_manager {
                destroy(raw);
            }
            return Err(NpuError::BackendFailure(rc));
        }

        self.needs_legacy_buffers = compat::needs_legacy_buffers(&backend);
        debug!(
            kind = backend.kind().short_name(),
            legacy = self.needs_legacy_buffers,
            "manager bound"
        );
        self.raw = Some(raw);
        self.backend = Some(backend);
        Ok(())
    }

    fn bound(&self) -> NpuResult<(ForeignHandle, &Arc<BackendHandle>)> {
        match (self.raw, &self.backend) {
            (Some(raw), Some(backend)) => Ok((raw, backend)),
            _ => Err(NpuError::InvalidState("manager is not initialized")),
        }
    }

    pub fn run(&self, inputs: &[IoBuffer], outputs: &mut [IoBuffer]) -> NpuResult<()> {
        let (raw, backend) = self.bound()?;
        let ops = backend.ops();
        let run = ops.run_v3.or(ops.run).ok_or(NpuError::Unsupported)?;

        let rc = if self.needs_legacy_buffers {
            let legacy_in = compat::to_legacy(inputs)?;
            let mut legacy_out = compat::to_legacy(outputs)?;
            let rc = run(raw, &legacy_in, &mut legacy_out);
            for (dst, src) in outputs.iter_mut().zip(legacy_out) {
                dst.data = src.data;
            }
            rc
        } else {
            run(raw, inputs, outputs)
        };

        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }

    /// The timeout is forwarded verbatim; the core keeps no timer.
    pub fn run_async(
        &self,
        inputs: Vec<IoBuffer>,
        outputs: Vec<IoBuffer>,
        timeout_ms: u32,
        listener: RunListener,
    ) -> NpuResult<()> {
        let (raw, backend) = self.bound()?;
        let run_async = backend.ops().run_async.ok_or(NpuError::Unsupported)?;

        let (inputs, outputs) = if self.needs_legacy_buffers {
            (compat::to_legacy(&inputs)?, compat::to_legacy(&outputs)?)
        } else {
            (inputs, outputs)
        };

        let rc = run_async(raw, inputs, outputs, timeout_ms, listener);
        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }

    /// Forwards only; no local state transition.
    pub fn cancel(&self) -> NpuResult<()> {
        let (raw, backend) = self.bound()?;
        let cancel = backend.ops().cancel.ok_or(NpuError::Unsupported)?;
        let rc = cancel(raw);
        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }

    pub fn set_priority(&self, priority: ModelPriority) -> NpuResult<()> {
        let (raw, backend) = self.bound()?;
        let set = backend.ops().set_priority.ok_or(NpuError::Unsupported)?;
        let rc = set(raw, priority);
        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }

    /// Deinit on an unbound manager is a caller error, not a crash.
    pub fn deinit(&mut self) -> NpuResult<()> {
        let Some(backend) = self.backend.clone() else {
            return Err(NpuError::InvalidState("manager is not initialized"));
        };
        let raw = self
            .raw
            .take()
            .ok_or(NpuError::InvalidState("manager is not initialized"))?;

        let ops = backend.ops();
        let rc = match ops.deinit {
            Some(deinit) => deinit(raw),
            None => BackendRc::OK,
        };
        if let Some(destroy) = ops.destroy_manager {
            destroy(raw);
        }
        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }
}

impl Default for ModelManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModelManager {
    fn drop(&mut self) {
        if self.raw.is_some() {
            let _ = self.deinit();
        }
    }
}
