//! Dispatch core of the npuport SDK: backend registry, capability
//! resolution, backend selection with family fallback suppression, model
//! and manager lifecycle, and the six versioned configuration families.
//!
//! A host application wires a statically linked backend in at startup:
//!
//! ```no_run
//! use npuport_core::BackendKind;
//! use npuport_runtime::{BackendHandle, Registry};
//!
//! let registry = Registry::global();
//! registry.register(
//!     BackendKind::Direct,
//!     BackendHandle::from_module_init(BackendKind::Direct, npuport_backend_host::module_init),
//! );
//! ```
//!
//! (or simply `npuport_backend_host::register(registry)`).

mod compat;
pub mod config;
pub mod deploy;
mod fileio;
pub mod loader;
mod manager;
mod model;
pub mod registry;
mod resolve;
mod select;

pub use config::{
    CLCustomization, DynamicShapeConfig, ModelBuildOptions, ModelDeviceConfig, ModelInitOptions,
    OpDeviceOrder,
};
pub use deploy::Deployment;
pub use loader::{BackendLoader, PluginProbe, SystemLoader};
pub use manager::ModelManager;
pub use model::BuiltModel;
pub use registry::{BackendHandle, Registry};
