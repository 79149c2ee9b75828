use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_label, get_required_str, load,
    load_visible, reply, require_session, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::attendance::{self, AttendanceFilter, AttendanceRecord, AttendanceStatus, CheckMethod};
use crate::records::{canonical_date, Actor};
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<AttendanceFilter, HandlerErr> {
    Ok(AttendanceFilter {
        date: match get_opt_str(params, "date") {
            None => None,
            Some(d) => Some(
                canonical_date(&d).ok_or_else(|| HandlerErr::new("bad_params", "date must be YYYY-MM-DD"))?,
            ),
        },
        search: get_opt_str(params, "search").unwrap_or_default(),
        status: get_opt_label(params, "status", AttendanceStatus::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<AttendanceRecord>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::ATTENDANCE, seed::attendance)?;
    let rows = visible.into_iter().filter(|r| filter.matches(r)).collect();
    Ok((rows, loaded.revision))
}

fn attendance_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": attendance::stats(&rows),
        "records": rows,
        "revision": revision,
    }))
}

fn attendance_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

fn attendance_mark(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let status = get_required_label(params, "status", AttendanceStatus::parse)?;
    let actor = Actor::now(ctx.user);
    let date = get_opt_str(params, "date").unwrap_or_else(|| actor.today_str());
    let loaded = load(&ctx, keys::ATTENDANCE, seed::attendance)?;
    let next = attendance::mark(&loaded.records, &actor, &student_id, &date, status)?;
    let result = commit(&ctx, keys::ATTENDANCE, &loaded, &next, params)?;
    tracing::info!(student = %student_id, %date, %status, changed = %result["changed"], "attendance marked");
    Ok(result)
}

fn attendance_scan(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let method = get_opt_label(params, "method", CheckMethod::parse)?.unwrap_or(CheckMethod::QrCode);
    let actor = Actor::now(ctx.user);
    let date = get_opt_str(params, "date").unwrap_or_else(|| actor.today_str());
    let loaded = load(&ctx, keys::ATTENDANCE, seed::attendance)?;
    let next = attendance::scan(&loaded.records, &actor, &student_id, &date, method)?;
    let result = commit(&ctx, keys::ATTENDANCE, &loaded, &next, params)?;
    tracing::info!(student = %student_id, %date, %method, changed = %result["changed"], "check-in recorded");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "attendance.list" => Some(reply(req, attendance_list(state, &req.params))),
        "attendance.exportCsv" => Some(reply(req, attendance_export_csv(state, &req.params))),
        "attendance.mark" => Some(reply(req, attendance_mark(state, &req.params))),
        "attendance.scan" => Some(reply(req, attendance_scan(state, &req.params))),
        _ => None,
    }
}
