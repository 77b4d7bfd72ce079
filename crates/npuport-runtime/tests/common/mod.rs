#![allow(dead_code)]

use npuport_core::{BackendKind, BackendTables, ForeignHandle, ModuleInitFn, NpuResult};
use npuport_runtime::{BackendHandle, BackendLoader, Deployment, Registry};

/// Loader fake: serves the listed kinds from module-init functions, reports
/// everything else unavailable.
pub struct StubLoader {
    available: Vec<(BackendKind, ModuleInitFn)>,
}

impl StubLoader {
    pub fn new(available: Vec<(BackendKind, ModuleInitFn)>) -> Self {
        Self { available }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl BackendLoader for StubLoader {
    fn load(&self, kind: BackendKind) -> NpuResult<Option<BackendHandle>> {
        Ok(self
            .available
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(k, init)| BackendHandle::from_module_init(*k, *init)))
    }
}

pub fn registry_with(
    deployment: Deployment,
    available: Vec<(BackendKind, ModuleInitFn)>,
) -> Registry {
    init_tracing();
    Registry::new(deployment, Box::new(StubLoader::new(available)))
}

/// Full working backend (identity execution).
pub fn serving_init(tables: &mut BackendTables) {
    npuport_backend_host::module_init(tables);
}

/// A backend that loads fine but declines every model request.
pub fn declining_init(tables: &mut BackendTables) {
    fn no_build(
        _options: Option<ForeignHandle>,
        _buffers: &[npuport_core::ModelBuffer],
    ) -> Option<ForeignHandle> {
        None
    }
    fn no_restore(_blob: &[u8]) -> Option<ForeignHandle> {
        None
    }
    fn no_restore_from_file(_path: &str) -> Option<ForeignHandle> {
        None
    }
    tables.ops.build = Some(no_build);
    tables.ops.restore = Some(no_restore);
    tables.ops.restore_from_file = Some(no_restore_from_file);
}

pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
