use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::AuthError;
use super::token::PersistedSession;

/// Storage abstraction for the persisted session.
pub trait TokenStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<PersistedSession>, AuthError>;
    /// Replaces any previously stored session wholesale.
    fn save(&self, session: &PersistedSession) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;
}

/// File-backed token store writing a single JSON document.
///
/// # Example
/// ```no_run
/// use twitchtui::auth::{FileTokenStore, TokenStore};
///
/// let store = FileTokenStore::new_default();
/// if let Some(cached) = store.load()? {
///     println!("cached session for {}", cached.login);
/// }
/// # Ok::<(), twitchtui::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn new_default() -> Self {
        Self::new(default_token_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<PersistedSession>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let session: PersistedSession = serde_json::from_str(&raw)?;
        Ok(Some(session))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), AuthError> {
        let serialized = serde_json::to_vec_pretty(session)?;
        atomic_write(&self.path, &serialized)
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

/// `~/.twitchtui/.token`, or a relative fallback when no home directory exists.
pub fn default_token_path() -> PathBuf {
    default_app_dir().join(".token")
}

pub(crate) fn default_app_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".twitchtui"))
        .unwrap_or_else(|| PathBuf::from(".twitchtui"))
}

/// Writes through a sibling temp file so readers see the old or the new
/// document, never a torn one. The file is owner-only from creation.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let temp_path = sibling_temp_path(path)?;
    let staged = write_private(&temp_path, data).and_then(|()| fs::rename(&temp_path, path));
    if let Err(error) = staged {
        let _ = fs::remove_file(&temp_path);
        return Err(error.into());
    }
    Ok(())
}

fn sibling_temp_path(path: &Path) -> Result<PathBuf, AuthError> {
    let name = path
        .file_name()
        .ok_or_else(|| AuthError::Io(format!("token path {} has no file name", path.display())))?;
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or_default();
    Ok(path.with_file_name(format!(
        ".{}.{}-{stamp}.partial",
        name.to_string_lossy(),
        std::process::id()
    )))
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options.open(path)?;
    file.write_all(data)?;
    file.sync_all()
}
