use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_str, load, load_visible, reply,
    require_session, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::assets::{self, Asset, AssetCategory, AssetFilter, AssetStatus, Condition};
use crate::records::Actor;
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<AssetFilter, HandlerErr> {
    Ok(AssetFilter {
        search: get_opt_str(params, "search").unwrap_or_default(),
        category: get_opt_label(params, "category", AssetCategory::parse)?,
        status: get_opt_label(params, "status", AssetStatus::parse)?,
        condition: get_opt_label(params, "condition", Condition::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<Asset>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::ASSETS, seed::assets)?;
    let rows = visible.into_iter().filter(|a| filter.matches(a)).collect();
    Ok((rows, loaded.revision))
}

fn assets_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": assets::stats(&rows),
        "assets": rows,
        "revision": revision,
    }))
}

fn assets_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

fn assets_request_maintenance(
    state: &mut AppState,
    params: &serde_json::Value,
) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let loaded = load(&ctx, keys::ASSETS, seed::assets)?;
    let next = assets::request_maintenance(&loaded.records, &Actor::now(ctx.user), &id)?;
    let result = commit(&ctx, keys::ASSETS, &loaded, &next, params)?;
    tracing::info!(asset = %id, changed = %result["changed"], "asset maintenance requested");
    Ok(result)
}

fn assets_remove(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let loaded = load(&ctx, keys::ASSETS, seed::assets)?;
    let next = assets::remove(&loaded.records, &Actor::now(ctx.user), &id)?;
    let result = commit(&ctx, keys::ASSETS, &loaded, &next, params)?;
    tracing::info!(asset = %id, changed = %result["changed"], "asset removed");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "assets.list" => Some(reply(req, assets_list(state, &req.params))),
        "assets.exportCsv" => Some(reply(req, assets_export_csv(state, &req.params))),
        "assets.requestMaintenance" => Some(reply(req, assets_request_maintenance(state, &req.params))),
        "assets.remove" => Some(reply(req, assets_remove(state, &req.params))),
        _ => None,
    }
}
