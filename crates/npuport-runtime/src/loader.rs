use libloading::Library;
use npuport_core::{catalog, BackendKind, NpuError, NpuResult};
use tracing::debug;

use crate::registry::BackendHandle;
use crate::resolve;

/// Type-specific load strategies behind the registry. Production uses
/// `SystemLoader`; tests substitute counting fakes.
pub trait BackendLoader: Send + Sync {
    /// `Ok(None)` means the backend is not available in this process.
    fn load(&self, kind: BackendKind) -> NpuResult<Option<BackendHandle>>;
}

/// Host-supplied hook handing over a plugin library the application has
/// already loaded.
pub type PluginProbe = Box<dyn Fn() -> Option<Library> + Send + Sync>;

#[derive(Default)]
pub struct SystemLoader {
    plugin: Option<PluginProbe>,
}

impl SystemLoader {
    pub fn new() -> Self {
        Self { plugin: None }
    }

    pub fn with_plugin_probe(probe: PluginProbe) -> Self {
        Self {
            plugin: Some(probe),
        }
    }
}

impl BackendLoader for SystemLoader {
    fn load(&self, kind: BackendKind) -> NpuResult<Option<BackendHandle>> {
        let library = match kind {
            BackendKind::PluginHcl => match self.plugin.as_ref().and_then(|probe| probe()) {
                Some(lib) => lib,
                None => return Ok(None),
            },
            BackendKind::LocalHcl => match open(catalog::HCL_LIBRARY) {
                Some(lib) => lib,
                None => return Ok(None),
            },
            BackendKind::Binary => match open(catalog::BINARY_LIBRARY) {
                Some(lib) => lib,
                None => return Ok(None),
            },
            // Static kinds only ever arrive via `Registry::register`.
            BackendKind::RomHcl | BackendKind::Direct => return Ok(None),
        };

        let prefix = kind
            .symbol_prefix()
            .ok_or(NpuError::LoadFailure("kind has no symbol prefix"))?;
        // On resolution failure the library drops here, releasing it.
        let tables = resolve::resolve_tables(&library, prefix)?;
        Ok(Some(BackendHandle::from_dynamic(kind, library, tables)))
    }
}

fn open(name: &str) -> Option<Library> {
    match unsafe { Library::new(name) } {
        Ok(lib) => Some(lib),
        Err(err) => {
            debug!(name, error = %err, "library open failed");
            None
        }
    }
}
