use crate::auth::Action;
use crate::backup;
use crate::ipc::helpers::{get_required_str, reply, require_session, workspace_path, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::records::Actor;
use serde_json::json;
use std::path::PathBuf;

fn require_admin(state: &AppState) -> Result<String, HandlerErr> {
    let ctx = require_session(state)?;
    Actor::now(ctx.user).require(Action::ManageBackups)?;
    Ok(ctx.user.username.clone())
}

fn backup_export(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let username = require_admin(state)?;
    let out_path = get_required_str(params, "outPath")?;
    let workspace = workspace_path(state)?;

    if let Some(conn) = state.db.as_ref() {
        let _ = conn.execute_batch("PRAGMA wal_checkpoint(FULL)");
    }

    let export = backup::export_workspace_bundle(&workspace, &PathBuf::from(&out_path), Some(&username))
        .map_err(|e| HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": out_path })))?;
    tracing::info!(path = %out_path, sha256 = %export.db_sha256, "workspace bundle exported");
    Ok(json!({
        "path": out_path,
        "bundleFormat": export.bundle_format,
        "entryCount": export.entry_count,
        "dbSha256": export.db_sha256,
    }))
}

fn backup_import(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_admin(state)?;
    let in_path = get_required_str(params, "inPath")?;
    let workspace = workspace_path(state)?;
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return Err(HandlerErr::new("not_found", "bundle file not found").with_details(json!({ "path": in_path })));
    }

    // Drop the open handle before replacing the file.
    state.db = None;
    state.session = None;

    let import = backup::import_workspace_bundle(&src, &workspace);
    // Reopen whatever database is now in place, imported or not.
    let reopened = state.open_workspace(&workspace);
    let import = import
        .map_err(|e| HandlerErr::new("io_failed", format!("{e:#}")).with_details(json!({ "path": in_path })))?;
    reopened.map_err(|e| HandlerErr::new("db_open_failed", format!("{e:#}")))?;

    tracing::info!(
        path = %in_path,
        format = %import.bundle_format_detected,
        verified = import.checksum_verified,
        "workspace bundle imported"
    );
    Ok(json!({
        "workspacePath": workspace.to_string_lossy(),
        "bundleFormatDetected": import.bundle_format_detected,
        "checksumVerified": import.checksum_verified,
        "user": state.session,
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.exportWorkspaceBundle" => Some(reply(req, backup_export(state, &req.params))),
        "backup.importWorkspaceBundle" => Some(reply(req, backup_import(state, &req.params))),
        _ => None,
    }
}
