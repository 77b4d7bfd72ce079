use npuport_core::{BackendKind, KIND_COUNT};
use tracing::warn;

/// Build-time allow-list override; absent or empty means every kind.
const DEFAULT_LIST: Option<&str> = option_env!("NPUPORT_BACKEND_LIST");

/// Which backend kinds this deployment permits. Consulted by the selector
/// and the registry before any load attempt.
#[derive(Clone, Debug)]
pub struct Deployment {
    allowed: [bool; KIND_COUNT],
}

impl Deployment {
    pub fn allow_all() -> Self {
        Self {
            allowed: [true; KIND_COUNT],
        }
    }

    /// Parse a comma-separated list of short names (`"local-hcl,direct"`).
    /// Unknown names are ignored with a warning.
    pub fn from_list(list: &str) -> Self {
        let mut allowed = [false; KIND_COUNT];
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match BackendKind::ALL.iter().find(|k| k.short_name() == name) {
                Some(kind) => allowed[kind.index()] = true,
                None => warn!(name, "unknown backend name in deployment list"),
            }
        }
        Self { allowed }
    }

    pub fn permits(&self, kind: BackendKind) -> bool {
        self.allowed[kind.index()]
    }
}

impl Default for Deployment {
    fn default() -> Self {
        match DEFAULT_LIST {
            Some(list) if !list.trim().is_empty() => Self::from_list(list),
            _ => Self::allow_all(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_names() {
        let dep = Deployment::from_list("local-hcl, direct");
        assert!(dep.permits(BackendKind::LocalHcl));
        assert!(dep.permits(BackendKind::Direct));
        assert!(!dep.permits(BackendKind::PluginHcl));
        assert!(!dep.permits(BackendKind::Binary));
    }

    #[test]
    fn unknown_names_are_ignored() {
        let dep = Deployment::from_list("gpu,direct");
        assert!(dep.permits(BackendKind::Direct));
        assert!(!dep.permits(BackendKind::RomHcl));
    }

    #[test]
    fn empty_list_permits_nothing() {
        let dep = Deployment::from_list("");
        for kind in BackendKind::ALL {
            assert!(!dep.permits(kind));
        }
    }
}
