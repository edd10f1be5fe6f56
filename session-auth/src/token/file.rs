use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use log::*;
use secrecy::SecretString;

use super::{preview, CookieRecord, TokenStore, COOKIE_MAX_AGE_SECS};

/// Token store persisting the `auth_token` cookie as a JSON file.
///
/// A missing, unreadable or corrupt file reads as "no token". Write failures are
/// logged and otherwise ignored. On unix the file is readable by its owner only.
pub struct FileCookieStore {
    path: PathBuf,
    max_age: Duration,
}

impl FileCookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_age: Duration::seconds(COOKIE_MAX_AGE_SECS),
        }
    }

    /// Override the max-age applied on `set`.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record(&self) -> Option<CookieRecord> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read token store {}: {e}", self.path.display());
                return None;
            }
        };

        match serde_json::from_str(&contents) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring corrupt token store {}: {e}", self.path.display());
                None
            }
        }
    }

    fn write_record(&self, record: &CookieRecord) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(record)?;

        // Write beside the target, then rename over it so readers never see a partial file
        let temp_path = self.path.with_extension("json.tmp");
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&temp_path)?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // A stale temp file keeps its old mode through `open`
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, &self.path)
    }
}

impl TokenStore for FileCookieStore {
    fn set(&self, token: &str) {
        let record = CookieRecord::new(token, self.max_age, Utc::now());
        match self.write_record(&record) {
            Ok(()) => debug!("Stored auth token {}", preview(token)),
            Err(e) => warn!("Failed to write token store {}: {e}", self.path.display()),
        }
    }

    fn get(&self) -> Option<SecretString> {
        let record = self.read_record()?;
        if record.is_expired_at(Utc::now()) {
            debug!("Stored auth token expired at {}", record.expires_at);
            self.clear();
            return None;
        }
        Some(SecretString::from(record.value))
    }

    fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed auth token"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove token store {}: {e}", self.path.display()),
        }
    }
}
