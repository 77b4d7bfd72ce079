use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use libloading::Library;
use npuport_core::{BackendKind, BackendTables, ConfigTable, ModuleInitFn, OpTable, KIND_COUNT};
use tracing::{debug, info, warn};

use crate::config::ConfigRouter;
use crate::deploy::Deployment;
use crate::loader::{BackendLoader, SystemLoader};

/// One loaded backend: its (optional) library plus resolved slot tables.
/// Contents are immutable once constructed, so invoking through an already
/// resolved handle needs no locking.
pub struct BackendHandle {
    kind: BackendKind,
    /// None means statically linked; there is no library to close.
    library: Option<Library>,
    tables: BackendTables,
}

impl BackendHandle {
    pub(crate) fn from_dynamic(kind: BackendKind, library: Library, tables: BackendTables) -> Self {
        Self {
            kind,
            library: Some(library),
            tables,
        }
    }

    /// Handle for a statically linked backend, built by running its
    /// module-init function.
    pub fn from_module_init(kind: BackendKind, init: ModuleInitFn) -> Self {
        let mut tables = BackendTables::default();
        init(&mut tables);
        Self {
            kind,
            library: None,
            tables,
        }
    }

    pub fn kind(&self) -> BackendKind {
        self.kind
    }

    pub fn ops(&self) -> &OpTable {
        &self.tables.ops
    }

    pub fn config(&self) -> &ConfigTable {
        &self.tables.config
    }

    pub fn is_static(&self) -> bool {
        self.library.is_none()
    }
}

enum Slot {
    Empty,
    /// A load strategy ran and found nothing; not retried.
    Unavailable,
    Ready(Arc<BackendHandle>),
}

/// Process-wide backend table, indexed by kind. Explicit object with an
/// explicit teardown; `global()` provides the default process instance.
pub struct Registry {
    deployment: Deployment,
    loader: Box<dyn BackendLoader>,
    slots: RwLock<[Slot; KIND_COUNT]>,
    load_gate: Mutex<()>,
    attempts: [AtomicUsize; KIND_COUNT],
    pub(crate) config: ConfigRouter,
}

impl Registry {
    pub fn new(deployment: Deployment, loader: Box<dyn BackendLoader>) -> Self {
        Self {
            deployment,
            loader,
            slots: RwLock::new(std::array::from_fn(|_| Slot::Empty)),
            load_gate: Mutex::new(()),
            attempts: std::array::from_fn(|_| AtomicUsize::new(0)),
            config: ConfigRouter::default(),
        }
    }

    /// The process-wide instance: default deployment, system loader.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(|| Registry::new(Deployment::default(), Box::new(SystemLoader::new())))
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    /// Idempotent lazy load. Double-checked: a fast read first, then a
    /// re-check under the load gate so at most one load strategy runs per
    /// kind. Failures are cached as unavailable and not retried.
    pub fn get_or_load(&self, kind: BackendKind) -> Option<Arc<BackendHandle>> {
        if !self.deployment.permits(kind) {
            debug!(kind = kind.short_name(), "backend not permitted by deployment");
            return None;
        }

        match &self.slots.read().unwrap()[kind.index()] {
            Slot::Ready(h) => return Some(h.clone()),
            Slot::Unavailable => return None,
            Slot::Empty => {}
        }

        let _gate = self.load_gate.lock().unwrap();
        match &self.slots.read().unwrap()[kind.index()] {
            Slot::Ready(h) => return Some(h.clone()),
            Slot::Unavailable => return None,
            Slot::Empty => {}
        }

        self.attempts[kind.index()].fetch_add(1, Ordering::Relaxed);
        let loaded = match self.loader.load(kind) {
            Ok(Some(handle)) => {
                info!(kind = kind.short_name(), "backend loaded");
                Some(Arc::new(handle))
            }
            Ok(None) => {
                debug!(kind = kind.short_name(), "backend unavailable");
                None
            }
            Err(err) => {
                warn!(kind = kind.short_name(), error = %err, "backend load failed");
                None
            }
        };

        let mut slots = self.slots.write().unwrap();
        // `register` does not take the load gate, so a static registration
        // may have landed while the loader ran; the live handle wins.
        if let Slot::Ready(handle) = &slots[kind.index()] {
            return Some(handle.clone());
        }
        match loaded {
            Some(handle) => {
                slots[kind.index()] = Slot::Ready(handle.clone());
                Some(handle)
            }
            None => {
                slots[kind.index()] = Slot::Unavailable;
                None
            }
        }
    }

    /// Static pre-registration for backends compiled into the host process.
    /// A no-op when the kind already holds a live handle (at most one
    /// handle per kind, ever).
    pub fn register(&self, kind: BackendKind, handle: BackendHandle) {
        let mut slots = self.slots.write().unwrap();
        match &slots[kind.index()] {
            Slot::Ready(_) => {
                warn!(kind = kind.short_name(), "backend already registered; ignoring")
            }
            _ => {
                info!(kind = kind.short_name(), "backend registered");
                slots[kind.index()] = Slot::Ready(Arc::new(handle));
            }
        }
    }

    /// Idempotent teardown. A backend's library closes once the last
    /// outstanding reference (registry slot, model, options object) drops.
    pub fn teardown(&self) {
        let mut slots = self.slots.write().unwrap();
        for slot in slots.iter_mut() {
            *slot = Slot::Empty;
        }
        debug!("registry torn down");
    }

    /// Diagnostic: how many times the load strategy ran for `kind`.
    pub fn load_attempts(&self, kind: BackendKind) -> usize {
        self.attempts[kind.index()].load(Ordering::Relaxed)
    }
}
