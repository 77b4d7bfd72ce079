pub mod backend;
pub mod catalog;
pub mod error;
pub mod handle;
pub mod options;
pub mod tensor;

pub use backend::*;
pub use error::*;
pub use handle::*;
pub use options::*;
pub use tensor::*;
