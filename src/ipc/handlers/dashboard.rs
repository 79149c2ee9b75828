use crate::dashboard::{self, VisibleData};
use crate::ipc::helpers::{load_visible, reply, require_session, HandlerErr};
use crate::ipc::types::{AppState, Request};
use crate::records::Actor;
use crate::seed;
use crate::store::keys;
use serde_json::json;

fn dashboard_summary(state: &mut AppState) -> Result<serde_json::Value, HandlerErr> {
    let ctx = require_session(state)?;
    let (_, students) = load_visible(&ctx, keys::STUDENTS, seed::students)?;
    let (_, rooms) = load_visible(&ctx, keys::ROOMS, seed::rooms)?;
    let (_, fees) = load_visible(&ctx, keys::FEES, seed::fees)?;
    let (_, attendance) = load_visible(&ctx, keys::ATTENDANCE, seed::attendance)?;
    let (_, requests) = load_visible(&ctx, keys::REQUESTS, seed::requests)?;
    let (_, assets) = load_visible(&ctx, keys::ASSETS, seed::assets)?;

    let data = VisibleData {
        students: &students,
        rooms: &rooms,
        fees: &fees,
        attendance: &attendance,
        requests: &requests,
        assets: &assets,
    };
    let today = Actor::now(ctx.user).today_str();
    Ok(json!({
        "role": ctx.user.role,
        "fullName": ctx.user.full_name,
        "cards": dashboard::cards(ctx.user, &data, &today),
    }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "dashboard.summary" => Some(reply(req, dashboard_summary(state))),
        _ => None,
    }
}
