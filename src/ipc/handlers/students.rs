use crate::ipc::helpers::{
    commit, export_csv, get_opt_label, get_opt_str, get_required_str, load, load_visible, reply,
    require_session, HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::records::students::{self, FeeStanding, NewStudent, Student, StudentFilter, StudentStatus};
use crate::records::Actor;
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn filter_from(params: &serde_json::Value) -> Result<StudentFilter, HandlerErr> {
    Ok(StudentFilter {
        search: get_opt_str(params, "search").unwrap_or_default(),
        block: get_opt_str(params, "block").filter(|b| !b.eq_ignore_ascii_case("all")),
        status: get_opt_label(params, "status", StudentStatus::parse)?,
        fee_status: get_opt_label(params, "feeStatus", FeeStanding::parse)?,
    })
}

fn filtered(state: &AppState, params: &serde_json::Value) -> Result<(Vec<Student>, i64), HandlerErr> {
    let ctx = require_session(state)?;
    let filter = filter_from(params)?;
    let (loaded, visible) = load_visible(&ctx, keys::STUDENTS, seed::students)?;
    let rows = visible.into_iter().filter(|s| filter.matches(s)).collect();
    Ok((rows, loaded.revision))
}

fn students_list(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, revision) = filtered(state, params)?;
    Ok(json!({
        "stats": students::stats(&rows),
        "students": rows,
        "revision": revision,
    }))
}

fn students_export_csv(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let (rows, _) = filtered(state, params)?;
    export_csv(&rows, params)
}

fn students_create(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let year = match params.get("year") {
        None | Some(serde_json::Value::Null) => 1,
        Some(v) => v
            .as_u64()
            .and_then(|y| u32::try_from(y).ok())
            .filter(|y| (1..=6).contains(y))
            .ok_or_else(|| HandlerErr::new("bad_params", "year must be between 1 and 6"))?,
    };
    let new = NewStudent {
        name: get_required_str(params, "name")?,
        email: get_opt_str(params, "email").unwrap_or_default(),
        phone: get_opt_str(params, "phone").unwrap_or_default(),
        room: get_required_str(params, "room")?,
        block: get_opt_str(params, "block"),
        course: get_opt_str(params, "course").unwrap_or_default(),
        year,
    };
    let loaded = load(&ctx, keys::STUDENTS, seed::students)?;
    let (next, id) = students::enroll(&loaded.records, &Actor::now(ctx.user), new)?;
    let mut result = commit(&ctx, keys::STUDENTS, &loaded, &next, params)?;
    result["id"] = json!(id);
    tracing::info!(student = %id, "student enrolled");
    Ok(result)
}

fn students_remove(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let id = get_required_str(params, "id")?;
    let loaded = load(&ctx, keys::STUDENTS, seed::students)?;
    let next = students::remove(&loaded.records, &Actor::now(ctx.user), &id)?;
    let result = commit(&ctx, keys::STUDENTS, &loaded, &next, params)?;
    tracing::info!(student = %id, changed = %result["changed"], "student removed");
    Ok(result)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(reply(req, students_list(state, &req.params))),
        "students.exportCsv" => Some(reply(req, students_export_csv(state, &req.params))),
        "students.create" => Some(reply(req, students_create(state, &req.params))),
        "students.remove" => Some(reply(req, students_remove(state, &req.params))),
        _ => None,
    }
}
