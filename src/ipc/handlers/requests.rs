use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_label, get_required_str, load,
    load_visible, reply, require_session, Ctx, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::requests::{
    self, HostelRequest, NewRequest, Priority, RequestFilter, RequestStatus, RequestType,
};
use crate::records::{Actor, RecordSet, TransitionError};
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<RequestFilter, HandlerErr> {
    Ok(RequestFilter {
        search: get_opt_str(params, "search").unwrap_or_default(),
        status: get_opt_label(params, "status", RequestStatus::parse)?,
        kind: get_opt_label(params, "type", RequestType::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<HostelRequest>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::REQUESTS, seed::requests)?;
    let rows = visible.into_iter().filter(|r| filter.matches(r)).collect();
    Ok((rows, loaded.revision))
}

fn requests_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": requests::stats(&rows),
        "requests": rows,
        "revision": revision,
    }))
}

fn requests_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

type Processor = fn(
    &RecordSet<HostelRequest>,
    &Actor<'_>,
    &str,
) -> Result<RecordSet<HostelRequest>, TransitionError>;

/// Shared body of approve, reject and assignMaintenance.
fn process(
    state: &mut AppState,
    params: &serde_json::Value,
    verb: &'static str,
    apply: Processor,
) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let loaded = load(&ctx, keys::REQUESTS, seed::requests)?;
    let actor = Actor::now(ctx.user);
    let next = apply(&loaded.records, &actor, &id)?;
    let result = commit(&ctx, keys::REQUESTS, &loaded, &next, params)?;
    tracing::info!(request = %id, by = %ctx.user.role, verb, changed = %result["changed"], "request processed");
    Ok(result)
}

/// The acting student's room from the student directory, when the client
/// does not say which room the request concerns.
fn own_room(ctx: &Ctx<'_>) -> Result<Option<String>, HandlerErr> {
    let (_, mine) = load_visible(ctx, keys::STUDENTS, seed::students)?;
    Ok(mine.into_iter().next().map(|s| s.room))
}

fn requests_submit(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let room_number = match get_opt_str(params, "roomNumber") {
        Some(room) => room,
        None => own_room(&ctx)?.unwrap_or_default(),
    };
    let new = NewRequest {
        room_number,
        kind: get_required_label(params, "type", RequestType::parse)?,
        title: get_required_str(params, "title")?,
        description: get_opt_str(params, "description").unwrap_or_default(),
        priority: get_opt_label(params, "priority", Priority::parse)?.unwrap_or(Priority::Medium),
        from_date: get_opt_str(params, "fromDate"),
        to_date: get_opt_str(params, "toDate"),
        reason: get_opt_str(params, "reason"),
    };
    let loaded = load(&ctx, keys::REQUESTS, seed::requests)?;
    let actor = Actor::now(ctx.user);
    let (next, id) = requests::submit(&loaded.records, &actor, new)?;
    let mut result = commit(&ctx, keys::REQUESTS, &loaded, &next, params)?;
    result["id"] = json!(id);
    tracing::info!(request = %id, student = %ctx.user.full_name, "request submitted");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    match req.method.as_str() {
        "requests.list" => Some(reply(req, requests_list(state, p))),
        "requests.exportCsv" => Some(reply(req, requests_export_csv(state, p))),
        "requests.approve" => Some(reply(req, process(state, p, "approve", requests::approve))),
        "requests.reject" => Some(reply(req, process(state, p, "reject", requests::reject))),
        "requests.assignMaintenance" => Some(reply(
            req,
            process(state, p, "assignMaintenance", requests::assign_maintenance),
        )),
        "requests.submit" => Some(reply(req, requests_submit(state, p))),
        _ => None,
    }
}
