use std::ffi::c_void;

/// Pointer to a backend-owned object. The SDK never interprets the bits;
/// only the backend that produced the handle may dereference or free it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ForeignHandle(*mut c_void);

// Backend contract: handles may cross threads; the producing backend
// serializes access to the object behind them.
unsafe impl Send for ForeignHandle {}
unsafe impl Sync for ForeignHandle {}

impl ForeignHandle {
    /// Wrap a raw backend pointer. Null is not a handle.
    pub fn new(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(ptr))
        }
    }

    /// Move a Rust object behind an opaque handle. Used by in-process
    /// backends and the built-in configuration objects.
    pub fn from_box<T>(value: Box<T>) -> Self {
        Self(Box::into_raw(value).cast())
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0
    }

    /// # Safety
    /// The handle must have been produced by `from_box::<T>` and not freed.
    pub unsafe fn as_mut<'a, T>(self) -> &'a mut T {
        &mut *self.0.cast::<T>()
    }

    /// # Safety
    /// The handle must have been produced by `from_box::<T>`; it must not be
    /// used again afterwards.
    pub unsafe fn into_box<T>(self) -> Box<T> {
        Box::from_raw(self.0.cast::<T>())
    }
}

/// Raw status code shared with backend binaries. Zero means success.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackendRc(pub i32);

impl BackendRc {
    pub const OK: BackendRc = BackendRc(0);
    /// Generic failure code for backends that report nothing more specific.
    pub const FAILURE: BackendRc = BackendRc(-1);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }
}
