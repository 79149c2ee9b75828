use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_label, get_required_str, load,
    load_visible, reply, require_session, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::rooms::{self, Room, RoomFilter, RoomStatus};
use crate::records::Actor;
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<RoomFilter, HandlerErr> {
    Ok(RoomFilter {
        search: get_opt_str(params, "search").unwrap_or_default(),
        block: get_opt_str(params, "block").filter(|b| !b.eq_ignore_ascii_case("all")),
        status: get_opt_label(params, "status", RoomStatus::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<Room>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::ROOMS, seed::rooms)?;
    let rows = visible.into_iter().filter(|r| filter.matches(r)).collect();
    Ok((rows, loaded.revision))
}

fn rooms_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": rooms::stats(&rows),
        "rooms": rows,
        "revision": revision,
    }))
}

fn rooms_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

fn rooms_set_status(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let status = get_required_label(params, "status", RoomStatus::parse)?;
    let loaded = load(&ctx, keys::ROOMS, seed::rooms)?;
    let next = rooms::set_status(&loaded.records, &Actor::now(ctx.user), &id, status)?;
    let result = commit(&ctx, keys::ROOMS, &loaded, &next, params)?;
    tracing::info!(room = %id, %status, changed = %result["changed"], "room status set");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "rooms.list" => Some(reply(req, rooms_list(state, &req.params))),
        "rooms.exportCsv" => Some(reply(req, rooms_export_csv(state, &req.params))),
        "rooms.setStatus" => Some(reply(req, rooms_set_status(state, &req.params))),
        _ => None,
    }
}
