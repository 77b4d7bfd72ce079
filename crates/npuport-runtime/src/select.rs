use std::sync::Arc;

use npuport_core::{BackendKind, ForeignHandle, ModelBuffer, NpuError, NpuResult};
use tracing::{debug, trace};

use crate::registry::{BackendHandle, Registry};

/// What the caller wants a backend to produce a model from.
pub(crate) enum ModelSource<'a> {
    Buffers {
        options: Option<ForeignHandle>,
        buffers: &'a [ModelBuffer],
    },
    Blob(&'a [u8]),
    File(&'a str),
    FileWithShapeIndex(&'a str, u32),
}

/// Walk backend kinds in priority order until one services the request.
///
/// Once any HCL-family member has loaded, its siblings are skipped for the
/// rest of this pass: a successful load already proves the family's
/// acceleration path is present, and retrying a structurally equivalent
/// sibling would only mask the first failure reason. The flag is set on
/// load success, not on operation success.
pub(crate) fn create_model(
    registry: &Registry,
    source: &ModelSource<'_>,
) -> NpuResult<(ForeignHandle, Arc<BackendHandle>)> {
    let mut hcl_family_tried = false;

    for kind in BackendKind::ALL {
        if !registry.deployment().permits(kind) {
            trace!(kind = kind.short_name(), "skipped: not in deployment list");
            continue;
        }
        if hcl_family_tried && kind.is_hcl_family() {
            trace!(kind = kind.short_name(), "skipped: HCL family already tried");
            continue;
        }
        let Some(backend) = registry.get_or_load(kind) else {
            continue;
        };
        if kind.is_hcl_family() {
            hcl_family_tried = true;
        }
        match invoke(&backend, source) {
            Some(model) => {
                debug!(kind = kind.short_name(), "model created");
                return Ok((model, backend));
            }
            None => debug!(kind = kind.short_name(), "backend declined request"),
        }
    }

    Err(NpuError::Exhausted)
}

fn invoke(backend: &BackendHandle, source: &ModelSource<'_>) -> Option<ForeignHandle> {
    let ops = backend.ops();
    match source {
        ModelSource::Buffers { options, buffers } => {
            // The newer build entry wins when both are exposed.
            let build = ops.build_v2.or(ops.build)?;
            build(*options, buffers)
        }
        ModelSource::Blob(blob) => (ops.restore?)(blob),
        ModelSource::File(path) => (ops.restore_from_file?)(path),
        ModelSource::FileWithShapeIndex(path, index) => {
            (ops.restore_from_file_with_shape_index?)(path, *index)
        }
    }
}
