use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use nonempty::NonEmpty;
use serde::{Serialize, de::DeserializeOwned};

use super::records::{AllergiesDocument, ItemsDocument, LogDocument};
use crate::{
    Session,
    domain::{Config, ConfigError, ItemStore, KnownAllergies, LogBook},
};

/// Name of the data directory, relative to the root.
pub const DATA_DIR: &str = ".detective";

/// The documents kept in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Items that caused a reaction.
    ReactionItems,
    /// Confirmed allergies.
    KnownAllergies,
    /// The reaction log.
    LogEntries,
}

impl Key {
    /// The file name the document is stored under.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::ReactionItems => "reactionItems.json",
            Self::KnownAllergies => "knownAllergies.json",
            Self::LogEntries => "logEntries.json",
        }
    }
}

/// Errors reading or writing a single document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The file could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        source: io::Error,
    },
    /// The file is not valid JSON, or not in a known format.
    #[error("failed to parse {}: {source}", path.display())]
    Json {
        /// The offending file.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },
    /// The file parsed, but its contents are inconsistent.
    #[error("invalid data in {}: {reason}", path.display())]
    Invalid {
        /// The offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },
    /// The configuration file could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One or more documents could not be saved.
///
/// Saving carries on past individual failures, so every document that could be
/// written has been.
#[derive(Debug, thiserror::Error)]
pub struct SaveError {
    failures: NonEmpty<(PathBuf, StoreError)>,
}

impl SaveError {
    /// The files that could not be written, with the reason for each.
    pub fn failures(&self) -> impl Iterator<Item = &(PathBuf, StoreError)> {
        self.failures.iter()
    }
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MAX_DISPLAY: usize = 5;

        write!(f, "failed to save: ")?;

        let total = self.failures.len();

        let displayed_paths: Vec<String> = self
            .failures
            .iter()
            .take(MAX_DISPLAY)
            .map(|(p, _e)| p.display().to_string())
            .collect();

        let msg = displayed_paths.join(", ");

        if total <= MAX_DISPLAY {
            write!(f, "{msg}")
        } else {
            write!(f, "{msg}... (and {} more)", total - MAX_DISPLAY)
        }
    }
}

/// A filesystem backed store for the user's data.
///
/// Everything lives in a single `.detective` directory below the root. A
/// document that has never been written loads as empty.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// A store rooted at `root`. Nothing is read or created until needed.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(DATA_DIR),
        }
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    /// Path of the file backing a document.
    #[must_use]
    pub fn path(&self, key: Key) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Whether the data directory exists.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.dir.is_dir()
    }

    /// Create the data directory and a default configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the configuration file cannot be
    /// written.
    pub fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        Config::default().save(&self.config_path())?;
        tracing::info!("Initialized data directory at {}", self.dir.display());
        Ok(())
    }

    /// Load the configuration, falling back to the defaults if the file is
    /// missing or unreadable.
    #[must_use]
    pub fn load_config(&self) -> Config {
        let path = self.config_path();
        Config::load(&path).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config from {}: {e}", path.display());
            Config::default()
        })
    }

    /// Load the reaction items.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_items(&self) -> Result<ItemStore, StoreError> {
        let Some(document) = self.read::<ItemsDocument>(Key::ReactionItems)? else {
            return Ok(ItemStore::new());
        };
        ItemStore::try_from(document).map_err(|reason| StoreError::Invalid {
            path: self.path(Key::ReactionItems),
            reason,
        })
    }

    /// Save the reaction items.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_items(&self, items: &ItemStore) -> Result<(), StoreError> {
        self.write(Key::ReactionItems, &ItemsDocument::from(items))
    }

    /// Load the known allergies.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_allergies(&self) -> Result<KnownAllergies, StoreError> {
        Ok(self
            .read::<AllergiesDocument>(Key::KnownAllergies)?
            .map(KnownAllergies::from)
            .unwrap_or_default())
    }

    /// Save the known allergies.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_allergies(&self, allergies: &KnownAllergies) -> Result<(), StoreError> {
        self.write(Key::KnownAllergies, &AllergiesDocument::from(allergies))
    }

    /// Load the reaction log.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_log(&self) -> Result<LogBook, StoreError> {
        let Some(document) = self.read::<LogDocument>(Key::LogEntries)? else {
            return Ok(LogBook::new());
        };
        LogBook::try_from(document).map_err(|reason| StoreError::Invalid {
            path: self.path(Key::LogEntries),
            reason,
        })
    }

    /// Save the reaction log.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_log(&self, log: &LogBook) -> Result<(), StoreError> {
        self.write(Key::LogEntries, &LogDocument::from(log))
    }

    /// Load the items and allergies into a fresh [`Session`].
    ///
    /// # Errors
    ///
    /// Returns an error if either document exists but cannot be read or
    /// parsed.
    pub fn load_session(&self) -> Result<Session, StoreError> {
        Ok(Session::new(self.load_items()?, self.load_allergies()?))
    }

    /// Save the items and allergies held by a [`Session`].
    ///
    /// Both documents are attempted even if the first one fails.
    ///
    /// # Errors
    ///
    /// Returns an error listing every document that could not be written.
    pub fn save_session(&self, session: &Session) -> Result<(), SaveError> {
        let failures: Vec<_> = [
            (Key::ReactionItems, self.save_items(session.items())),
            (
                Key::KnownAllergies,
                self.save_allergies(session.known_allergies()),
            ),
        ]
        .into_iter()
        .filter_map(|(key, result)| result.err().map(|e| (self.path(key), e)))
        .collect();

        NonEmpty::from_vec(failures).map_or(Ok(()), |failures| Err(SaveError { failures }))
    }

    fn read<D: DeserializeOwned>(&self, key: Key) -> Result<Option<D>, StoreError> {
        let path = self.path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist yet", path.display());
                return Ok(None);
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| StoreError::Json { path, source })
    }

    fn write<S: Serialize>(&self, key: Key, document: &S) -> Result<(), StoreError> {
        let path = self.path(key);
        let io_error = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        let content = serde_json::to_string_pretty(document).map_err(|source| StoreError::Json {
            path: path.clone(),
            source,
        })?;

        // Write then rename, so a failed write never truncates existing data.
        let tmp = path.with_extension("json.tmp");
        let result = fs::write(&tmp, content)
            .map_err(io_error(&tmp))
            .and_then(|()| fs::rename(&tmp, &path).map_err(io_error(&path)));

        if let Err(e) = result {
            discard(&tmp);
            return Err(e);
        }

        tracing::debug!("Saved {}", path.display());
        Ok(())
    }
}

/// Remove a temporary file left behind by a failed write.
fn discard(tmp: &Path) {
    match fs::remove_file(tmp) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to remove {}: {e}", tmp.display()),
    }
}

#[cfg(test)]
mod tests {
    use non_empty_string::NonEmptyString;

    use super::*;

    fn text(s: &str) -> NonEmptyString {
        NonEmptyString::new(s.to_string()).unwrap()
    }

    #[test]
    fn missing_documents_load_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());

        assert!(!store.is_initialized());
        assert!(store.load_items().unwrap().is_empty());
        assert!(store.load_allergies().unwrap().is_empty());
        assert!(store.load_log().unwrap().is_empty());
    }

    #[test]
    fn session_survives_a_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());

        let mut items = ItemStore::new();
        items.add(text("Ramen"), "Wheat, Soy".into(), vec!["wheat".into(), "soy".into()]);
        items.add(text("Edamame"), "Soy".into(), vec!["soy".into()]);
        let allergies: KnownAllergies = ["Peanut"].into_iter().collect();
        let session = Session::new(items, allergies);

        store.save_session(&session).unwrap();
        let reloaded = store.load_session().unwrap();

        assert!(store.is_initialized());
        assert_eq!(reloaded.items().list(), session.items().list());
        assert!(reloaded.known_allergies().contains("peanut"));
        assert_eq!(reloaded.candidates(), session.candidates());
    }

    #[test]
    fn log_survives_a_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        let mut log = LogBook::new();
        log.add(text("Pad Thai"), text("Hives"));

        store.save_log(&log).unwrap();

        assert_eq!(store.load_log().unwrap().entries(), log.entries());
    }

    #[test]
    fn malformed_document_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.path(Key::ReactionItems), "not json").unwrap();

        let error = store.load_items().unwrap_err();

        assert!(matches!(error, StoreError::Json { .. }));
        assert_eq!(
            fs::read_to_string(store.path(Key::ReactionItems)).unwrap(),
            "not json"
        );
    }

    #[test]
    fn unknown_version_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.path(Key::KnownAllergies),
            r#"{"_version":"9","allergies":[]}"#,
        )
        .unwrap();

        assert!(matches!(store.load_allergies(), Err(StoreError::Json { .. })));
    }

    #[test]
    fn save_reports_every_failed_document() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        // A file where the data directory should be.
        fs::write(store.dir(), "").unwrap();

        let error = store.save_session(&Session::default()).unwrap_err();

        let paths: Vec<_> = error.failures().map(|(p, _)| p.clone()).collect();
        assert_eq!(
            paths,
            [store.path(Key::ReactionItems), store.path(Key::KnownAllergies)]
        );
        assert!(error.to_string().starts_with("failed to save: "));
    }

    #[test]
    fn failed_save_leaves_no_temporary_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        // A non-empty directory where the document should be, so the rename fails.
        let target = store.path(Key::ReactionItems);
        fs::create_dir_all(target.join("blocker")).unwrap();

        let error = store.save_items(&ItemStore::new()).unwrap_err();

        assert!(matches!(error, StoreError::Io { ref path, .. } if *path == target));
        assert!(!target.with_extension("json.tmp").exists());
        let leftovers: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, ["reactionItems.json"]);
    }

    #[test]
    fn empty_config_file_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.config_path(), "").unwrap();

        assert_eq!(store.load_config(), Config::default());
    }

    #[test]
    fn init_writes_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());

        store.init().unwrap();

        assert!(store.config_path().is_file());
        assert_eq!(store.load_config(), Config::default());
    }

    #[test]
    fn unreadable_config_falls_back_to_default() {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.config_path(), "this is = = not toml").unwrap();

        assert_eq!(store.load_config(), Config::default());
    }
}
