use crate::auth::Action;
use crate::ipc::helpers::{get_opt_str, reply, require_db, require_session, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::records::Actor;
use crate::scope;
use crate::settings;
use serde_json::json;

fn settings_get(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let conn = require_db(state)?;
    let current = settings::load(conn);
    Ok(json!({
        "settings": current,
        "effectiveSeedFixtures": current.seed_fixtures.unwrap_or(state.seed_fixtures),
    }))
}

fn settings_update(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    Actor::now(ctx.user).require(Action::UpdateSettings)?;

    let mut next = settings::load(ctx.conn);
    if let Some(block) = get_opt_str(params, "wardenBlock") {
        if scope::block_code(&block).is_none() {
            return Err(HandlerErr::new("bad_params", "wardenBlock must name a block, e.g. \"Block A\"")
                .with_details(json!({ "wardenBlock": block })));
        }
        next.warden_block = block;
    }
    match params.get("seedFixtures") {
        None => {}
        Some(serde_json::Value::Null) => next.seed_fixtures = None,
        Some(v) => {
            next.seed_fixtures = Some(
                v.as_bool()
                    .ok_or_else(|| HandlerErr::new("bad_params", "seedFixtures must be a boolean or null"))?,
            )
        }
    }
    settings::save(ctx.conn, &next).map_err(|e| {
        HandlerErr::new("db_update_failed", e.to_string()).with_details(json!({ "table": "settings" }))
    })?;
    tracing::info!(warden_block = %next.warden_block, seed_fixtures = ?next.seed_fixtures, "settings updated");
    Ok(json!({ "settings": next }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "settings.get" => Some(reply(req, settings_get(state))),
        "settings.update" => Some(reply(req, settings_update(state, &req.params))),
        _ => None,
    }
}
