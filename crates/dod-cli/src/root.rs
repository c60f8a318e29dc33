use dod_core::config::CONFIG_FILE;
use std::path::{Path, PathBuf};

/// Locate the config file.
///
/// Priority:
/// 1. `--config` flag / `DOD_CONFIG` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.dod/config.yaml`
/// 3. The per-user file (`user`), if it exists
/// 4. None: settings come from the environment only
pub fn resolve_config_path(
    explicit: Option<&Path>,
    cwd: &Path,
    user: Option<PathBuf>,
) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }

    let mut dir = cwd.to_path_buf();
    loop {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        match dir.parent() {
            Some(p) => dir = p.to_path_buf(),
            None => break,
        }
    }

    user.filter(|p| p.is_file())
}
