use bytes::Bytes;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    F32,
    F16,
    I64,
    I32,
    U8,
}

impl DType {
    pub fn byte_size(self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::F16 => 2,
            DType::I64 => 8,
            DType::U8 => 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape(pub SmallVec<[usize; 6]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn rank(&self) -> usize {
        self.0.len()
    }
    pub fn numel(&self) -> usize {
        self.0.iter().product::<usize>().max(1)
    }
}

/// Memory layout contract for a buffer crossing the backend boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BufferFormat {
    #[default]
    Nd,
    /// Rank-4 layout expected by pre-revision HCL backends.
    Nchw,
}

#[derive(Clone, Debug)]
pub struct TensorDesc {
    pub dtype: DType,
    pub shape: Shape,
    pub format: BufferFormat,
}

/// One input or output buffer handed through to the bound backend.
#[derive(Clone, Debug)]
pub struct IoBuffer {
    pub desc: TensorDesc,
    pub data: Bytes,
}

impl IoBuffer {
    pub fn from_cpu_bytes(dtype: DType, shape: Shape, data: Bytes) -> Self {
        Self {
            desc: TensorDesc {
                dtype,
                shape,
                format: BufferFormat::Nd,
            },
            data,
        }
    }

    /// Legacy rank-4 NCHW view: dims left-padded with 1 to exactly four.
    /// Buffers of rank above four have no legacy representation.
    pub fn to_legacy_nchw(&self) -> Option<IoBuffer> {
        if self.desc.shape.rank() > 4 {
            return None;
        }
        let mut dims: SmallVec<[usize; 6]> = SmallVec::new();
        dims.extend(std::iter::repeat(1).take(4 - self.desc.shape.rank()));
        dims.extend(self.desc.shape.0.iter().copied());
        Some(IoBuffer {
            desc: TensorDesc {
                dtype: self.desc.dtype,
                shape: Shape(dims),
                format: BufferFormat::Nchw,
            },
            data: self.data.clone(),
        })
    }
}

/// One named artifact handed to a backend's build operation (an IR graph,
/// a weight blob, a pre-compiled segment).
#[derive(Clone, Debug)]
pub struct ModelBuffer {
    pub name: String,
    pub data: Bytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_nchw_pads_to_rank_four() {
        let buf = IoBuffer::from_cpu_bytes(DType::F32, Shape::from_slice(&[3, 5]), Bytes::new());
        let legacy = buf.to_legacy_nchw().expect("rank 2 converts");
        assert_eq!(legacy.desc.shape.0.as_slice(), &[1, 1, 3, 5]);
        assert_eq!(legacy.desc.format, BufferFormat::Nchw);
    }

    #[test]
    fn legacy_nchw_rejects_rank_five() {
        let buf =
            IoBuffer::from_cpu_bytes(DType::U8, Shape::from_slice(&[2, 2, 2, 2, 2]), Bytes::new());
        assert!(buf.to_legacy_nchw().is_none());
    }
}
