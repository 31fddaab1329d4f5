//! Persistent key-value storage and shared application state.
//!
//! The console keeps three keys in its store: `iot-settings` (a JSON
//! object), `isAuthenticated` (`"true"` when logged in) and `theme`
//! (`"dark"` or `"light"`). [`AppContext`] wraps a store and broadcasts
//! changes to interested tasks through `watch` channels.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::watch;
use tracing::{debug, warn};

use depin_types::{Settings, Theme};

use crate::error::Result;

pub const SETTINGS_KEY: &str = "iot-settings";
pub const AUTH_KEY: &str = "isAuthenticated";
pub const THEME_KEY: &str = "theme";

/// String key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The file is read once on open and rewritten on every change, through a
/// temporary file so a crash never leaves it half written.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!("Ignoring corrupt store {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!("Opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    // Changes only become visible once they are on disk.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

/// Typed access to the console's keys.
#[derive(Clone)]
pub struct SettingsStore {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Saved settings, or the defaults when nothing valid is stored.
    pub fn load_settings(&self) -> Settings {
        match self.store.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Stored settings are unreadable, using defaults: {}", e);
                Settings::default()
            }),
            Ok(None) => Settings::default(),
            Err(e) => {
                warn!("Failed to read settings, using defaults: {}", e);
                Settings::default()
            }
        }
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.store
            .set(SETTINGS_KEY, &serde_json::to_string(settings)?)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.store.get(AUTH_KEY), Ok(Some(v)) if v == "true")
    }

    pub fn set_authenticated(&self, authenticated: bool) -> Result<()> {
        if authenticated {
            self.store.set(AUTH_KEY, "true")
        } else {
            self.store.remove(AUTH_KEY)
        }
    }

    /// Stored theme; unknown or missing values mean dark.
    pub fn theme(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_default(),
            _ => Theme::default(),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(THEME_KEY, theme.as_str())
    }
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore").finish_non_exhaustive()
    }
}

/// State shared across the whole console: theme, login and connectivity.
///
/// Theme and login state are persisted; connectivity is reported by the
/// sync layer and only lives in memory.
#[derive(Debug)]
pub struct AppContext {
    store: SettingsStore,
    theme: watch::Sender<Theme>,
    authenticated: watch::Sender<bool>,
    online: watch::Sender<bool>,
}

impl AppContext {
    pub fn new(store: SettingsStore) -> Self {
        let theme = store.theme();
        let authenticated = store.is_authenticated();
        Self {
            store,
            theme: watch::Sender::new(theme),
            authenticated: watch::Sender::new(authenticated),
            online: watch::Sender::new(true),
        }
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set_theme(theme)?;
        self.theme.send_replace(theme);
        Ok(())
    }

    /// Flip between dark and light, returning the new theme.
    pub fn toggle_theme(&self) -> Result<Theme> {
        let next = self.theme().toggle();
        self.set_theme(next)?;
        Ok(next)
    }

    pub fn subscribe_theme(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.authenticated.borrow()
    }

    pub fn login(&self) -> Result<()> {
        self.store.set_authenticated(true)?;
        self.authenticated.send_replace(true);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.store.set_authenticated(false)?;
        self.authenticated.send_replace(false);
        Ok(())
    }

    pub fn subscribe_auth(&self) -> watch::Receiver<bool> {
        self.authenticated.subscribe()
    }

    pub fn is_online(&self) -> bool {
        *self.online.borrow()
    }

    /// Record connectivity; receivers are only woken when it changes.
    pub fn set_online(&self, online: bool) {
        self.online.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
    }

    pub fn subscribe_online(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }
}
