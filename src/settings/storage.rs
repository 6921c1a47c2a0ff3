//! Durable backends for the preference table.
//!
//! Preferences live in `XDG_STATE_HOME/skycycle/{namespace}/settings.toml`, where the
//! namespace is `default` for the default config directory and `custom_<hash>` for a
//! directory passed with `--config`, so that separate setups never share preferences.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use super::SettingUpdate;
use crate::common::constants::{APP_DIR_NAME, SETTINGS_FILE_NAME, SETTINGS_LOCK_FILE_NAME};
use crate::common::utils::private_path;

/// Flat key-value table of persisted preferences.
pub type Preferences = toml::Table;

/// A place preferences can be loaded from and saved to.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStorage: Send + Sync {
    /// Load the whole table. An absent store loads as an empty table.
    fn load(&self) -> Result<Preferences>;

    /// Replace the whole table.
    fn save(&self, preferences: &Preferences) -> Result<()>;

    /// Apply `update` to the stored table and save it, as one step with respect to
    /// other writers. Returns the table that was written.
    fn modify(&self, update: &SettingUpdate) -> Result<Preferences>;

    /// File backing this storage, if any.
    fn location(&self) -> Option<PathBuf>;
}

/// Shared storage, so a caller can keep a handle on a storage owned by a store.
impl<T: PreferenceStorage + ?Sized> PreferenceStorage for std::sync::Arc<T> {
    fn load(&self) -> Result<Preferences> {
        (**self).load()
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        (**self).save(preferences)
    }

    fn modify(&self, update: &SettingUpdate) -> Result<Preferences> {
        (**self).modify(update)
    }

    fn location(&self) -> Option<PathBuf> {
        (**self).location()
    }
}

/// Get the state directory for a given configuration directory.
pub fn get_state_dir(config_dir: Option<&Path>) -> Result<PathBuf> {
    let state_home = std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    let namespace = match config_dir {
        None => "default".to_string(),
        Some(path) => {
            let default_config = dirs::config_dir()
                .context("Could not determine config directory")?
                .join(APP_DIR_NAME);
            if path == default_config {
                "default".to_string()
            } else {
                get_state_namespace(path)
            }
        }
    };

    Ok(state_home.join(APP_DIR_NAME).join(namespace))
}

/// Stable namespace for a custom config directory.
fn get_state_namespace(config_path: &Path) -> String {
    let canonical = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    let hash = sha256::digest(canonical.to_string_lossy().as_bytes());
    format!("custom_{}", &hash[..16])
}

/// TOML file storage with locked, atomic replacement.
#[derive(Debug, Clone)]
pub struct FilePreferenceStorage {
    path: PathBuf,
}

impl FilePreferenceStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage in the state directory belonging to `config_dir`.
    pub fn for_config_dir(config_dir: Option<&Path>) -> Result<Self> {
        Ok(Self::new(get_state_dir(config_dir)?.join(SETTINGS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent(&self) -> Result<&Path> {
        self.path
            .parent()
            .with_context(|| format!("No parent directory for {}", private_path(&self.path)))
    }

    /// Take the cross-process writer lock. It is released when the file closes.
    fn lock(&self) -> Result<File> {
        let dir = self.parent()?;
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create state directory {}", private_path(dir)))?;

        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(SETTINGS_LOCK_FILE_NAME))
            .context("Failed to open settings lock file")?;
        lock_file
            .lock_exclusive()
            .context("Failed to lock settings file")?;
        Ok(lock_file)
    }

    /// Replace the file through a temporary sibling. Callers hold the lock.
    fn write_atomically(&self, preferences: &Preferences) -> Result<()> {
        let content = toml::to_string(preferences).context("Failed to serialize settings")?;

        let mut staged = tempfile::NamedTempFile::new_in(self.parent()?)
            .context("Failed to create temporary settings file")?;
        staged
            .write_all(content.as_bytes())
            .context("Failed to write temporary settings file")?;
        staged
            .as_file()
            .sync_all()
            .context("Failed to sync temporary settings file")?;
        staged
            .persist(&self.path)
            .with_context(|| format!("Failed to replace {}", private_path(&self.path)))?;

        Ok(())
    }
}

impl PreferenceStorage for FilePreferenceStorage {
    fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::new());
        }

        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", private_path(&self.path)))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", private_path(&self.path)))
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        let _lock = self.lock()?;
        self.write_atomically(preferences)
    }

    fn modify(&self, update: &SettingUpdate) -> Result<Preferences> {
        let _lock = self.lock()?;
        // Re-read under the lock so changes saved by other processes survive
        let mut preferences = match self.load() {
            Ok(preferences) => preferences,
            Err(e) => {
                log_pipe!();
                log_warning!("Replacing unreadable settings: {e:#}");
                Preferences::new()
            }
        };
        update.apply_to(&mut preferences);
        self.write_atomically(&preferences)?;
        Ok(preferences)
    }

    fn location(&self) -> Option<PathBuf> {
        Some(self.path.clone())
    }
}

/// In-process storage for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStorage {
    preferences: Mutex<Preferences>,
    fail_writes: AtomicBool,
}

impl MemoryPreferenceStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_preferences(preferences: Preferences) -> Self {
        Self {
            preferences: Mutex::new(preferences),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make subsequent saves fail, simulating an unavailable disk.
    #[cfg(any(test, feature = "testing-support"))]
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the stored table.
    pub fn snapshot(&self) -> Preferences {
        self.preferences
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl PreferenceStorage for MemoryPreferenceStorage {
    fn load(&self) -> Result<Preferences> {
        Ok(self.snapshot())
    }

    fn save(&self, preferences: &Preferences) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("In-memory storage is refusing writes");
        }
        let mut guard = self
            .preferences
            .lock()
            .map_err(|_| anyhow::anyhow!("In-memory storage lock poisoned"))?;
        *guard = preferences.clone();
        Ok(())
    }

    fn modify(&self, update: &SettingUpdate) -> Result<Preferences> {
        let mut guard = self
            .preferences
            .lock()
            .map_err(|_| anyhow::anyhow!("In-memory storage lock poisoned"))?;
        let mut preferences = guard.clone();
        update.apply_to(&mut preferences);
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("In-memory storage is refusing writes");
        }
        *guard = preferences.clone();
        Ok(preferences)
    }

    fn location(&self) -> Option<PathBuf> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let storage = FilePreferenceStorage::new(dir.path().join("settings.toml"));
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_creates_directories_and_preserves_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let storage = FilePreferenceStorage::new(&path);

        let mut preferences = Preferences::new();
        preferences.insert("temperature_unit".into(), "FAHRENHEIT".into());
        preferences.insert("future_field".into(), toml::Value::Integer(7));
        storage.save(&preferences).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("temperature_unit = \"FAHRENHEIT\""));
        assert_eq!(storage.load().unwrap(), preferences);
        assert!(path.with_file_name("settings.lock").exists());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "temperature_unit = [").unwrap();
        let err = FilePreferenceStorage::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse settings"));
    }

    #[test]
    fn test_modify_keeps_fields_written_since() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        let storage = FilePreferenceStorage::new(&path);
        storage.modify(&SettingUpdate::DarkTheme(true)).unwrap();

        let mut external = storage.load().unwrap();
        external.insert("temperature_unit".into(), "FAHRENHEIT".into());
        FilePreferenceStorage::new(&path).save(&external).unwrap();

        let written = storage.modify(&SettingUpdate::SystemTheme(false)).unwrap();
        assert_eq!(
            written.get("temperature_unit").and_then(|v| v.as_str()),
            Some("FAHRENHEIT")
        );
        assert_eq!(storage.load().unwrap(), written);
        assert_eq!(written.get("is_dark_theme"), Some(&toml::Value::Boolean(true)));
    }

    #[test]
    fn test_modify_replaces_malformed_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "temperature_unit = [").unwrap();

        let storage = FilePreferenceStorage::new(&path);
        storage.modify(&SettingUpdate::DarkTheme(true)).unwrap();
        assert_eq!(
            storage.load().unwrap().get("is_dark_theme"),
            Some(&toml::Value::Boolean(true))
        );
    }

    #[test]
    fn test_memory_storage_can_refuse_writes() {
        let storage = MemoryPreferenceStorage::new();
        storage.set_fail_writes(true);
        assert!(storage.save(&Preferences::new()).is_err());
        assert!(storage.modify(&SettingUpdate::DarkTheme(true)).is_err());
        assert!(storage.snapshot().is_empty());
        storage.set_fail_writes(false);
        assert!(storage.save(&Preferences::new()).is_ok());
    }

    #[test]
    #[serial]
    fn test_state_dir_namespaces() {
        let state_home = tempdir().unwrap();
        let original = std::env::var("XDG_STATE_HOME").ok();
        unsafe {
            std::env::set_var("XDG_STATE_HOME", state_home.path());
        }

        let default_dir = get_state_dir(None);
        let custom_dir = get_state_dir(Some(Path::new("/srv/skycycle-kiosk")));

        unsafe {
            match original {
                Some(val) => std::env::set_var("XDG_STATE_HOME", val),
                None => std::env::remove_var("XDG_STATE_HOME"),
            }
        }

        assert_eq!(
            default_dir.unwrap(),
            state_home.path().join("skycycle").join("default")
        );
        let custom_dir = custom_dir.unwrap();
        let namespace = custom_dir.file_name().unwrap().to_string_lossy().to_string();
        assert!(namespace.starts_with("custom_"));
        assert_eq!(namespace.len(), "custom_".len() + 16);
    }
}
