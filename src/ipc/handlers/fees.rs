use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_str, get_required_u64, load,
    load_visible, reply, require_session, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::fees::{self, Fee, FeeFilter, FeeStatus, FeeType};
use crate::records::Actor;
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<FeeFilter, HandlerErr> {
    Ok(FeeFilter {
        search: get_opt_str(params, "search").unwrap_or_default(),
        status: get_opt_label(params, "status", FeeStatus::parse)?,
        fee_type: get_opt_label(params, "feeType", FeeType::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<Fee>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::FEES, seed::fees)?;
    let rows = visible.into_iter().filter(|f| filter.matches(f)).collect();
    Ok((rows, loaded.revision))
}

fn fees_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": fees::stats(&rows),
        "fees": rows,
        "revision": revision,
    }))
}

fn fees_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

fn fees_pay(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let loaded = load(&ctx, keys::FEES, seed::fees)?;
    let actor = Actor::now(ctx.user);
    let next = fees::pay(&loaded.records, &actor, &id)?;
    let result = commit(&ctx, keys::FEES, &loaded, &next, params)?;
    tracing::info!(fee = %id, changed = %result["changed"], "fee paid");
    Ok(result)
}

fn fees_apply_penalty(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let amount = get_required_u64(params, "amount")?;
    let loaded = load(&ctx, keys::FEES, seed::fees)?;
    let actor = Actor::now(ctx.user);
    let next = fees::apply_penalty(&loaded.records, &actor, &id, amount)?;
    let result = commit(&ctx, keys::FEES, &loaded, &next, params)?;
    tracing::info!(fee = %id, amount, changed = %result["changed"], "penalty applied");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "fees.list" => Some(reply(req, fees_list(state, &req.params))),
        "fees.exportCsv" => Some(reply(req, fees_export_csv(state, &req.params))),
        "fees.pay" => Some(reply(req, fees_pay(state, &req.params))),
        "fees.applyPenalty" => Some(reply(req, fees_apply_penalty(state, &req.params))),
        _ => None,
    }
}
