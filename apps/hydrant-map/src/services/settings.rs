use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Mutex;

/// Storage key the browser front-end uses; also the settings file stem.
pub const SETTINGS_KEY: &str = "fwfv_hydrants_user_settings";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default)]
    pub last_highlight_filter_string: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings storage unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Raw persistence for the serialized settings document.
pub trait SettingsBackend: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> Result<Option<String>, SettingsError>;
    fn write(&self, payload: &str) -> Result<(), SettingsError>;
}

#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsBackend for FileBackend {
    fn read(&self) -> Result<Option<String>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, payload: &str) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, payload)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    payload: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Mutex::new(Some(payload.into())),
        }
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self) -> Result<Option<String>, SettingsError> {
        Ok(self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn write(&self, payload: &str) -> Result<(), SettingsError> {
        *self
            .payload
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(payload.to_string());
        Ok(())
    }
}

/// Best-effort user settings.
///
/// Settings are read once at construction and written through on every
/// change. Storage failures are logged and otherwise ignored: reads fall
/// back to defaults and the in-memory value stays authoritative.
pub struct SettingsStore {
    backend: Box<dyn SettingsBackend>,
    current: Mutex<UserSettings>,
}

impl SettingsStore {
    pub fn new(backend: impl SettingsBackend + 'static) -> Self {
        let current = load_settings(&backend);
        Self {
            backend: Box::new(backend),
            current: Mutex::new(current),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileBackend::new(path))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn last_highlight_filter_string(&self) -> String {
        self.lock().last_highlight_filter_string.clone()
    }

    pub fn set_last_highlight_filter_string(&self, value: impl Into<String>) {
        let snapshot = {
            let mut current = self.lock();
            current.last_highlight_filter_string = value.into();
            current.clone()
        };
        if let Err(err) = save_settings(self.backend.as_ref(), &snapshot) {
            tracing::warn!(error = %err, "failed to persist user settings");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, UserSettings> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn load_settings(backend: &dyn SettingsBackend) -> UserSettings {
    let payload = match backend.read() {
        Ok(Some(payload)) => payload,
        Ok(None) => return UserSettings::default(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to read user settings; using defaults");
            return UserSettings::default();
        }
    };
    match serde_json::from_str(&payload) {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!(error = %err, "failed to parse user settings; using defaults");
            UserSettings::default()
        }
    }
}

fn save_settings(backend: &dyn SettingsBackend, settings: &UserSettings) -> Result<(), SettingsError> {
    let payload = serde_json::to_string(settings)?;
    backend.write(&payload)
}
