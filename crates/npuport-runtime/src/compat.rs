use npuport_core::{BackendKind, IoBuffer, NpuError, NpuResult};

use crate::registry::BackendHandle;

/// A LocalHcl library that predates the build-v2 ABI revision only
/// understands the legacy rank-4 buffer layout. Statically linked backends
/// and new-ABI backends are exempt. Decided once, at manager bind time.
pub(crate) fn needs_legacy_buffers(backend: &BackendHandle) -> bool {
    backend.kind() == BackendKind::LocalHcl
        && !backend.is_static()
        && backend.ops().build_v2.is_none()
}

/// Convert every buffer to the legacy representation, or fail the whole
/// call: a partially converted run request is worse than no run at all.
pub(crate) fn to_legacy(buffers: &[IoBuffer]) -> NpuResult<Vec<IoBuffer>> {
    buffers
        .iter()
        .map(|b| {
            b.to_legacy_nchw().ok_or(NpuError::InvalidArgument(
                "buffer rank above four has no legacy layout",
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use npuport_core::{DType, Shape};

    #[test]
    fn one_bad_buffer_fails_the_whole_set() {
        let ok = IoBuffer::from_cpu_bytes(DType::F32, Shape::from_slice(&[1, 3]), Bytes::new());
        let bad = IoBuffer::from_cpu_bytes(
            DType::F32,
            Shape::from_slice(&[1, 1, 1, 1, 3]),
            Bytes::new(),
        );
        assert!(to_legacy(&[ok.clone()]).is_ok());
        assert!(matches!(
            to_legacy(&[ok, bad]),
            Err(NpuError::InvalidArgument(_))
        ));
    }
}
