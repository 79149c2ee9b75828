//! Shared plumbing for the request handlers: parameter parsing, the
//! session/workspace guard, store loading and the compare-and-swap commit.

use crate::auth::{AuthError, User};
use crate::csv::{self, CsvRow};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::records::{Record, RecordSet, TransitionError};
use crate::scope::{self, Scoped};
use crate::settings;
use crate::store::{self, Loaded, StoreError};
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

#[derive(Debug)]
pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::Db(_) => HandlerErr::new("db_query_failed", message),
            StoreError::Encode { key, .. } => {
                HandlerErr::new("db_update_failed", message).with_details(json!({ "key": key }))
            }
            StoreError::Conflict {
                key,
                expected,
                actual,
            } => HandlerErr::new("conflict", message).with_details(json!({
                "key": key,
                "expectedRevision": expected,
                "actualRevision": actual,
            })),
            StoreError::UnsupportedSchema { key, found } => {
                HandlerErr::new("unsupported_schema", message)
                    .with_details(json!({ "key": key, "schemaVersion": found }))
            }
        }
    }
}

impl From<TransitionError> for HandlerErr {
    fn from(e: TransitionError) -> Self {
        let message = e.to_string();
        match e {
            TransitionError::Forbidden { role, action } => HandlerErr::new("forbidden", message)
                .with_details(json!({ "role": role.label(), "action": action.as_str() })),
            TransitionError::InvalidInput(_) => HandlerErr::new("bad_params", message),
        }
    }
}

impl From<AuthError> for HandlerErr {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => HandlerErr::new("invalid_credentials", e.to_string()),
        }
    }
}

/// Wraps a handler body result into the response envelope.
pub fn reply(req: &Request, result: Result<serde_json::Value, HandlerErr>) -> serde_json::Value {
    match result {
        Ok(v) => ok(&req.id, v),
        Err(e) => {
            tracing::debug!(method = %req.method, code = e.code, message = %e.message, "request failed");
            e.response(&req.id)
        }
    }
}

pub fn get_required_str(params: &serde_json::Value, key: &str) -> Result<String, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn get_opt_str(params: &serde_json::Value, key: &str) -> Option<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn get_required_u64(params: &serde_json::Value, key: &str) -> Result<u64, HandlerErr> {
    params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| HandlerErr::new("bad_params", format!("{} must be a non-negative integer", key)))
}

/// Optional label param parsed with one of the `labeled_enum!` parsers.
/// `"All"` (the dashboard's catch-all filter value) is treated as absent.
pub fn get_opt_label<E>(
    params: &serde_json::Value,
    key: &str,
    parse: fn(&str) -> Option<E>,
) -> Result<Option<E>, HandlerErr> {
    match get_opt_str(params, key) {
        None => Ok(None),
        Some(s) if s.eq_ignore_ascii_case("all") => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| HandlerErr::new("bad_params", format!("unknown {}: {}", key, s))),
    }
}

pub fn get_required_label<E>(
    params: &serde_json::Value,
    key: &str,
    parse: fn(&str) -> Option<E>,
) -> Result<E, HandlerErr> {
    get_opt_label(params, key, parse)?
        .ok_or_else(|| HandlerErr::new("bad_params", format!("missing {}", key)))
}

pub fn expected_revision(params: &serde_json::Value) -> Result<Option<i64>, HandlerErr> {
    match params.get("expectedRevision") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .filter(|r| *r >= 0)
            .map(Some)
            .ok_or_else(|| HandlerErr::new("bad_params", "expectedRevision must be a non-negative integer")),
    }
}

pub fn require_db(state: &AppState) -> Result<&Connection, HandlerErr> {
    state
        .db
        .as_ref()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

pub fn workspace_path(state: &AppState) -> Result<PathBuf, HandlerErr> {
    state
        .workspace
        .clone()
        .ok_or_else(|| HandlerErr::new("no_workspace", "select a workspace first"))
}

/// Open workspace plus signed-in user, the context every record handler
/// runs in.
pub struct Ctx<'a> {
    pub conn: &'a Connection,
    pub user: &'a User,
    pub seed: bool,
}

pub fn require_session(state: &AppState) -> Result<Ctx<'_>, HandlerErr> {
    let conn = require_db(state)?;
    let user = state
        .session
        .as_ref()
        .ok_or_else(|| HandlerErr::new("not_authenticated", "sign in first"))?;
    Ok(Ctx {
        conn,
        user,
        seed: seed_enabled(state.seed_fixtures, conn),
    })
}

pub fn seed_enabled(default: bool, conn: &Connection) -> bool {
    settings::load(conn).seed_fixtures.unwrap_or(default)
}

pub fn load<T>(ctx: &Ctx<'_>, key: &str, fixtures: fn() -> Vec<T>) -> Result<Loaded<T>, HandlerErr>
where
    T: Record + Serialize + DeserializeOwned,
{
    let loaded = if ctx.seed {
        store::load_records(ctx.conn, key, fixtures)?
    } else {
        store::load_records(ctx.conn, key, Vec::new)?
    };
    Ok(loaded)
}

/// Loads a store and narrows it to what the session may see.
pub fn load_visible<T>(
    ctx: &Ctx<'_>,
    key: &str,
    fixtures: fn() -> Vec<T>,
) -> Result<(Loaded<T>, Vec<T>), HandlerErr>
where
    T: Record + Scoped + Serialize + DeserializeOwned,
{
    let loaded = load(ctx, key, fixtures)?;
    let visible = scope::visible(loaded.records.as_slice(), Some(ctx.user));
    Ok((loaded, visible))
}

/// Persists `next` unless the transition left the snapshot untouched.
pub fn commit<T>(
    ctx: &Ctx<'_>,
    key: &str,
    loaded: &Loaded<T>,
    next: &RecordSet<T>,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr>
where
    T: Record + Serialize,
{
    if next.same_snapshot(&loaded.records) {
        return Ok(json!({ "changed": false, "revision": loaded.revision }));
    }
    let expected = expected_revision(params)?.unwrap_or(loaded.revision);
    let revision = store::save_records(ctx.conn, key, next, expected)?;
    Ok(json!({ "changed": true, "revision": revision }))
}

pub fn export_csv<T: CsvRow>(rows: &[T], params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let content = csv::render(rows);
    let out_path = get_opt_str(params, "outPath");
    if let Some(path) = out_path.as_deref() {
        csv::write_file(std::path::Path::new(path), &content).map_err(|e| {
            HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": path }))
        })?;
        tracing::info!(path, rows = rows.len(), "csv exported");
    }
    Ok(json!({
        "fileName": T::FILE_NAME,
        "rowCount": rows.len(),
        "content": content,
        "path": out_path,
    }))
}
