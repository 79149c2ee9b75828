use crate::auth::{self, LoginCredentials};
use crate::ipc::helpers::{get_required_str, reply, require_db, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::{session, settings};
use serde_json::json;

fn auth_login(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let creds = LoginCredentials {
        username: get_required_str(params, "username")?,
        password: params
            .get("password")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    };
    let warden_block = settings::load(conn).warden_block;
    let user = match auth::login(&creds, &warden_block) {
        Ok(u) => u,
        Err(e) => {
            tracing::info!(username = %creds.username, "login rejected");
            return Err(e.into());
        }
    };
    session::persist(conn, &user)?;
    tracing::info!(username = %user.username, role = %user.role, "signed in");
    state.session = Some(user);
    Ok(json!({ "user": state.session }))
}

fn auth_logout(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    session::clear(conn)?;
    if let Some(user) = state.session.take() {
        tracing::info!(username = %user.username, "signed out");
    }
    Ok(json!({ "signedOut": true }))
}

fn auth_session(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    require_db(state)?;
    Ok(json!({ "user": state.session }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(reply(req, auth_login(state, &req.params))),
        "auth.logout" => Some(reply(req, auth_logout(state))),
        "auth.session" => Some(reply(req, auth_session(state))),
        _ => None,
    }
}
