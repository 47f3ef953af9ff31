use anyhow::Result;
use std::path::{Path, PathBuf};

pub const LOG_FOLDER_NAME: &str = "Signup_Log";

/// Resolve deployment folder (absolute path)
pub fn resolve_deployment_folder() -> PathBuf {
    // Prefer the folder where the executable lives (works in dev and deployed)
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(dir) = exe_path.parent() {
            return dir.to_path_buf();
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Resolve log folder (absolute path)
///
/// An explicit override wins. Otherwise walk up from the working directory looking for an
/// existing `Signup_Log/`, then fall back to one next to the executable.
pub fn resolve_log_folder(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        std::fs::create_dir_all(dir)
            .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
        return Ok(dir.to_path_buf());
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(found) = find_existing_log_folder(&cwd) {
            return Ok(found);
        }
    }

    let log_dir = resolve_deployment_folder().join(LOG_FOLDER_NAME);
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create log folder: {}", e))?;
    Ok(log_dir)
}

fn find_existing_log_folder(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(12)
        .map(|dir| dir.join(LOG_FOLDER_NAME))
        .find(|candidate| candidate.is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_is_created_and_used() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs").join("nested");
        let resolved = resolve_log_folder(Some(&target)).unwrap();
        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn finds_log_folder_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join(LOG_FOLDER_NAME);
        std::fs::create_dir_all(&log_dir).unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_existing_log_folder(&nested), Some(log_dir));
    }
}
