use std::path::Path;

use npuport_core::{NpuError, NpuResult};

/// Path validation for the restore-from-file wrappers. The dispatch core
/// itself never touches the filesystem beyond this check.
pub(crate) fn validate_model_path(path: &Path) -> NpuResult<&str> {
    let utf8 = path
        .to_str()
        .ok_or(NpuError::InvalidArgument("model path is not valid UTF-8"))?;
    if !path.is_file() {
        return Err(NpuError::InvalidArgument(
            "model path does not name a readable file",
        ));
    }
    Ok(utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_rejected() {
        let err = validate_model_path(Path::new("/nonexistent/model.om")).unwrap_err();
        assert!(matches!(err, NpuError::InvalidArgument(_)));
    }

    #[test]
    fn existing_file_passes() {
        let path = std::env::temp_dir().join("npuport_fileio_test.om");
        std::fs::write(&path, b"blob").unwrap();
        assert!(validate_model_path(&path).is_ok());
        let _ = std::fs::remove_file(&path);
    }
}
