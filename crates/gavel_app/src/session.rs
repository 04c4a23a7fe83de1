//! Session persistence: remembers the signed-in identity across runs.
//!
//! The server session itself lives in the HTTP cookie store; this file only
//! records who we believe is signed in so the app can restore the garage on
//! startup. A corrupt or missing file means "logged out".

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use gavel_core::UserIdentity;
use gavel_engine::AtomicFileWriter;
use gavel_logging::{gavel_info, gavel_warn};
use serde::{Deserialize, Serialize};

const SESSION_FILENAME: &str = ".gavel_session.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    user: Option<UserIdentity>,
}

pub struct SessionFile {
    dir: PathBuf,
}

impl SessionFile {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn in_current_dir() -> Self {
        Self::new(PathBuf::from("."))
    }

    fn path(&self) -> PathBuf {
        self.dir.join(SESSION_FILENAME)
    }

    /// Reads the remembered identity. Any failure degrades to logged out.
    pub fn load(&self) -> Option<UserIdentity> {
        let path = self.path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                gavel_warn!("Could not read session file {:?}: {}", path, err);
                return None;
            }
        };
        match serde_json::from_str::<PersistedSession>(&content) {
            Ok(session) => session.user,
            Err(err) => {
                gavel_warn!("Session file {:?} is corrupt, ignoring: {}", path, err);
                None
            }
        }
    }

    pub fn save(&self, user: &UserIdentity) {
        let session = PersistedSession {
            user: Some(user.clone()),
        };
        let content = match serde_json::to_string_pretty(&session) {
            Ok(content) => content,
            Err(err) => {
                gavel_warn!("Could not serialize session: {}", err);
                return;
            }
        };
        let writer = AtomicFileWriter::new(self.dir.clone());
        match writer.write(SESSION_FILENAME, &content) {
            Ok(path) => gavel_info!("Session saved to {:?}", path),
            Err(err) => gavel_warn!("Could not save session: {}", err),
        }
    }

    pub fn clear(&self) {
        match fs::remove_file(self.path()) {
            Ok(()) => gavel_info!("Session cleared"),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => gavel_warn!("Could not clear session: {}", err),
        }
    }
}
