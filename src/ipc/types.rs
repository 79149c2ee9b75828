use crate::auth::User;
use crate::{db, session};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Signed-in identity, mirrored from the workspace's session document.
    pub session: Option<User>,
    /// Daemon-wide default; a workspace setting may override it.
    pub seed_fixtures: bool,
}

impl AppState {
    pub fn new(seed_fixtures: bool) -> Self {
        Self {
            workspace: None,
            db: None,
            session: None,
            seed_fixtures,
        }
    }

    /// Opens (creating if needed) the workspace database and restores any
    /// persisted session from it.
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        // Release the previous handle before opening another file.
        self.db = None;
        self.session = None;
        let conn = db::open_db(path)?;
        let restored = session::restore(&conn)?;
        tracing::info!(
            workspace = %path.display(),
            signed_in = restored.is_some(),
            "workspace opened"
        );
        self.workspace = Some(path.to_path_buf());
        self.db = Some(conn);
        self.session = restored;
        Ok(())
    }
}
