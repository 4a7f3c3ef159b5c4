//! Writing the git-credentials file

use crate::{CredentialLineSet, Result};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Default location of the credentials file.
///
/// `$XDG_CONFIG_HOME/git/credentials`, falling back to `<home>/git/credentials`.
pub fn default_output_path(xdg_config_home: Option<&str>, home: Option<&Path>) -> Option<PathBuf> {
    let base = match xdg_config_home.filter(|s| !s.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => home?.to_path_buf(),
    };
    Some(base.join("git").join("credentials"))
}

/// [`default_output_path`] using the process environment
pub fn default_output_path_from_env() -> Option<PathBuf> {
    let xdg = std::env::var("XDG_CONFIG_HOME").ok();
    let home = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf());
    default_output_path(xdg.as_deref(), home.as_deref())
}

/// Write the credentials file, creating its directory.
///
/// The content is written to a temporary file next to the target and renamed
/// into place, so readers never see a partial file. On unix the file is only
/// readable by its owner.
pub fn write_credentials_file(path: &Path, lines: &CredentialLineSet) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&lines.to_bytes())?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path).map_err(|e| e.error)?;

    tracing::info!("Generated Git credentials file {}", path.display());
    Ok(())
}
