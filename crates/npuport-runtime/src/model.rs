use std::path::Path;
use std::sync::Arc;

use npuport_core::{BackendKind, ForeignHandle, ModelBuffer, NpuError, NpuResult, TensorDesc};
use tracing::warn;

use crate::config::ModelBuildOptions;
use crate::fileio;
use crate::registry::{BackendHandle, Registry};
use crate::select::{self, ModelSource};

/// A compiled or restored model, bound for life to the backend that
/// produced it. Every accessor routes through that backend's tables; a
/// missing slot reports `Unsupported` rather than faulting.
pub struct BuiltModel {
    /// None once destroyed.
    raw: Option<ForeignHandle>,
    backend: Arc<BackendHandle>,
}

impl BuiltModel {
    pub fn build(
        registry: &Registry,
        options: Option<&ModelBuildOptions>,
        buffers: &[ModelBuffer],
    ) -> NpuResult<Self> {
        if buffers.is_empty() {
            return Err(NpuError::InvalidArgument("no model buffers"));
        }
        let source = ModelSource::Buffers {
            options: options.map(|o| o.raw()),
            buffers,
        };
        let (raw, backend) = select::create_model(registry, &source)?;
        Ok(Self {
            raw: Some(raw),
            backend,
        })
    }

    pub fn restore(registry: &Registry, blob: &[u8]) -> NpuResult<Self> {
        if blob.is_empty() {
            return Err(NpuError::InvalidArgument("empty model blob"));
        }
        let (raw, backend) = select::create_model(registry, &ModelSource::Blob(blob))?;
        Ok(Self {
            raw: Some(raw),
            backend,
        })
    }

    pub fn restore_from_file(registry: &Registry, path: &Path) -> NpuResult<Self> {
        let path = fileio::validate_model_path(path)?;
        let (raw, backend) = select::create_model(registry, &ModelSource::File(path))?;
        Ok(Self {
            raw: Some(raw),
            backend,
        })
    }

    pub fn restore_from_file_with_shape_index(
        registry: &Registry,
        path: &Path,
        shape_index: u32,
    ) -> NpuResult<Self> {
        let path = fileio::validate_model_path(path)?;
        let source = ModelSource::FileWithShapeIndex(path, shape_index);
        let (raw, backend) = select::create_model(registry, &source)?;
        Ok(Self {
            raw: Some(raw),
            backend,
        })
    }

    pub(crate) fn backend(&self) -> &Arc<BackendHandle> {
        &self.backend
    }

    pub(crate) fn raw(&self) -> NpuResult<ForeignHandle> {
        self.raw
            .ok_or(NpuError::InvalidState("model already destroyed"))
    }

    /// Which backend kind serviced this model.
    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn save(&self, path: &Path) -> NpuResult<()> {
        let raw = self.raw()?;
        let save = self.backend.ops().save.ok_or(NpuError::Unsupported)?;
        let path = path
            .to_str()
            .ok_or(NpuError::InvalidArgument("save path is not valid UTF-8"))?;
        let rc = save(raw, path);
        if rc.is_ok() {
            Ok(())
        } else {
            Err(NpuError::BackendFailure(rc))
        }
    }

    pub fn name(&self) -> NpuResult<String> {
        let raw = self.raw()?;
        let f = self.backend.ops().model_name.ok_or(NpuError::Unsupported)?;
        Ok(f(raw))
    }

    pub fn input_count(&self) -> NpuResult<usize> {
        let raw = self.raw()?;
        let f = self.backend.ops().input_count.ok_or(NpuError::Unsupported)?;
        Ok(f(raw))
    }

    pub fn output_count(&self) -> NpuResult<usize> {
        let raw = self.raw()?;
        let f = self
            .backend
            .ops()
            .output_count
            .ok_or(NpuError::Unsupported)?;
        Ok(f(raw))
    }

    pub fn input_desc(&self, index: usize) -> NpuResult<TensorDesc> {
        let raw = self.raw()?;
        let f = self.backend.ops().input_desc.ok_or(NpuError::Unsupported)?;
        f(raw, index).ok_or(NpuError::InvalidArgument("input index out of range"))
    }

    pub fn output_desc(&self, index: usize) -> NpuResult<TensorDesc> {
        let raw = self.raw()?;
        let f = self.backend.ops().output_desc.ok_or(NpuError::Unsupported)?;
        f(raw, index).ok_or(NpuError::InvalidArgument("output index out of range"))
    }

    pub fn check_compatibility(&self) -> NpuResult<bool> {
        let raw = self.raw()?;
        let f = self
            .backend
            .ops()
            .check_compatibility
            .ok_or(NpuError::Unsupported)?;
        Ok(f(raw))
    }

    pub fn aipp_param_count(&self, input: usize) -> NpuResult<usize> {
        let raw = self.raw()?;
        let f = self
            .backend
            .ops()
            .aipp_param_count
            .ok_or(NpuError::Unsupported)?;
        Ok(f(raw, input))
    }

    /// Idempotent; the backend's destroy slot runs at most once. A backend
    /// without a destroy entry is logged and the wrapper released anyway.
    pub fn destroy(&mut self) {
        let Some(raw) = self.raw.take() else { return };
        match self.backend.ops().destroy_model {
            Some(destroy) => destroy(raw),
            None => warn!(
                kind = self.backend.kind().short_name(),
                "backend has no model destroy entry; releasing wrapper only"
            ),
        }
    }
}

impl Drop for BuiltModel {
    fn drop(&mut self) {
        self.destroy();
    }
}
