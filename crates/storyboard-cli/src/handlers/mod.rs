//! Command handlers
//!
//! Each handler module contains the execution logic for one CLI command
//! and its tests.

pub mod check;
pub mod init;
pub mod run;
pub mod timeline;
pub mod validate;

pub use check::execute_check;
pub use init::execute_init;
pub use run::execute_run;
pub use timeline::execute_timeline;
pub use validate::execute_validate;

use crate::error::{CliError, CliResult};
use std::path::Path;
use storyboard::{ScriptConfig, StageScript};

/// Load a script file, or the built-in FROST DKG script when `path` is `None`.
pub fn load_script(path: Option<&Path>) -> CliResult<StageScript> {
    let Some(path) = path else {
        tracing::debug!("no script given, using built-in FROST DKG script");
        return Ok(StageScript::frost_dkg()?);
    };
    if !path.exists() {
        return Err(CliError::invalid_argument(format!(
            "Script file not found: {}",
            path.display()
        )));
    }
    tracing::info!(path = %path.display(), "loading script");
    let config = ScriptConfig::from_path(path)?;
    Ok(StageScript::from_config(&config)?)
}

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_builtin_script() {
        let script = load_script(None).unwrap();
        assert_eq!(script.stages().len(), 3);
    }

    #[test]
    fn test_load_missing_script() {
        let err = load_script(Some(Path::new("/nonexistent/script.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Script file not found"));
    }

    #[test]
    fn test_load_script_from_yaml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("script.yaml");
        std::fs::write(&path, ScriptConfig::default().to_yaml().unwrap()).unwrap();

        let script = load_script(Some(path.as_path())).unwrap();
        assert_eq!(script.scene().len(), 3);
    }

    #[test]
    fn test_write_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.json");
        write_file(&path, "{}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
