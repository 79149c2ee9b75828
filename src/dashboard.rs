//! Role-specific summary cards computed from the visible records.

use crate::auth::{Role, User};
use crate::records::assets::{self, Asset};
use crate::records::attendance::{self, AttendanceRecord};
use crate::records::fees::{self, Fee, FeeStatus};
use crate::records::requests::{self, HostelRequest, RequestStatus, RequestType};
use crate::records::rooms::{self, Room, RoomStatus};
use crate::records::students::{self, Student};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub title: String,
    pub value: String,
    pub description: String,
}

fn card(title: &str, value: impl Into<String>, description: impl Into<String>) -> Card {
    Card {
        title: title.to_string(),
        value: value.into(),
        description: description.into(),
    }
}

/// Records already narrowed to what the session may see.
pub struct VisibleData<'a> {
    pub students: &'a [Student],
    pub rooms: &'a [Room],
    pub fees: &'a [Fee],
    pub attendance: &'a [AttendanceRecord],
    pub requests: &'a [HostelRequest],
    pub assets: &'a [Asset],
}

/// Rupees with Indian digit grouping: 245000 -> "₹2,45,000".
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return format!("₹{}", digits);
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("₹{},{}", groups.join(","), tail)
}

fn percent(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / whole as f64)
}

pub fn cards(user: &User, data: &VisibleData<'_>, today: &str) -> Vec<Card> {
    match user.role {
        Role::Admin => admin_cards(data),
        Role::Warden => warden_cards(user, data, today),
        Role::Management => management_cards(data),
        Role::Student => student_cards(user, data),
    }
}

fn admin_cards(data: &VisibleData<'_>) -> Vec<Card> {
    let st = students::stats(data.students);
    let rs = rooms::stats(data.rooms);
    let pending: Vec<&Fee> = data
        .fees
        .iter()
        .filter(|f| f.status != FeeStatus::Paid)
        .collect();
    let outstanding = pending
        .iter()
        .fold(0u64, |acc, f| acc.saturating_add(fees::total_due(f)));
    let rq = requests::stats(data.requests);
    vec![
        card("Total Students", st.total.to_string(), format!("{} active", st.active)),
        card(
            "Occupied Rooms",
            format!("{}/{}", rs.occupied, rs.total),
            format!("{} occupancy rate", percent(rs.occupied, rs.total)),
        ),
        card(
            "Pending Fees",
            format_inr(outstanding),
            format!("{} records pending", pending.len()),
        ),
        card(
            "Open Requests",
            (rq.pending + rq.in_progress).to_string(),
            format!("{} in progress", rq.in_progress),
        ),
    ]
}

fn warden_cards(user: &User, data: &VisibleData<'_>, today: &str) -> Vec<Card> {
    let block = user.block_assigned.clone().unwrap_or_default();
    let todays: Vec<AttendanceRecord> = data
        .attendance
        .iter()
        .filter(|r| r.date == today)
        .cloned()
        .collect();
    let at = attendance::stats(&todays);
    let pending: Vec<&HostelRequest> = data
        .requests
        .iter()
        .filter(|r| r.status == RequestStatus::Pending)
        .collect();
    let room_changes = pending.iter().filter(|r| r.kind == RequestType::RoomChange).count();
    let leave = pending.iter().filter(|r| r.kind == RequestType::Leave).count();
    let maintenance_rooms = data
        .rooms
        .iter()
        .filter(|r| r.status == RoomStatus::Maintenance)
        .count();
    let maintenance_requests = data
        .requests
        .iter()
        .filter(|r| r.kind == RequestType::Maintenance && r.status == RequestStatus::InProgress)
        .count();
    vec![
        card(
            "Block Students",
            data.students.len().to_string(),
            format!("{} assigned", block),
        ),
        card(
            "Today's Attendance",
            format!("{}/{}", at.present, at.total),
            format!("{}% present", at.percentage),
        ),
        card(
            "Pending Requests",
            pending.len().to_string(),
            format!("{} room changes, {} leave", room_changes, leave),
        ),
        card(
            "Maintenance Tasks",
            (maintenance_rooms + maintenance_requests).to_string(),
            format!("{} rooms under maintenance", maintenance_rooms),
        ),
    ]
}

fn management_cards(data: &VisibleData<'_>) -> Vec<Card> {
    let fs = fees::stats(data.fees);
    let rs = rooms::stats(data.rooms);
    let st = students::stats(data.students);
    let asset_stats = assets::stats(data.assets);
    vec![
        card("Total Revenue", format_inr(fs.paid), "Fees collected"),
        card(
            "Occupancy Rate",
            percent(rs.beds_occupied as usize, rs.beds as usize),
            format!("{} of {} beds", rs.beds_occupied, rs.beds),
        ),
        card(
            "Students",
            st.total.to_string(),
            format!("{}% fees paid", st.fees_paid_percent),
        ),
        card(
            "Asset Value",
            format_inr(asset_stats.total_value),
            format!("{} assets, {} in maintenance", asset_stats.total, asset_stats.maintenance),
        ),
    ]
}

fn student_cards(user: &User, data: &VisibleData<'_>) -> Vec<Card> {
    let me = data.students.iter().find(|s| s.name == user.full_name);
    let room_card = match me {
        Some(s) => {
            let floor = data
                .rooms
                .iter()
                .find(|r| r.number == s.room)
                .map(|r| format!(", Floor {}", r.floor))
                .unwrap_or_default();
            card("My Room", s.room.clone(), format!("Block {}{}", s.block, floor))
        }
        None => card("My Room", "Unassigned", "No room on record"),
    };
    let fs = fees::stats(data.fees);
    let fee_card = if fs.pending == 0 && fs.overdue == 0 {
        let standing = me.map(|s| s.fee_status.label()).unwrap_or("Paid");
        card("Fee Status", standing, "Nothing outstanding")
    } else {
        card("Fee Status", "Due", format!("{} outstanding", format_inr(fs.pending)))
    };
    let at = attendance::stats(data.attendance);
    let rq = requests::stats(data.requests);
    vec![
        room_card,
        fee_card,
        card(
            "Attendance",
            format!("{}%", at.percentage),
            format!("{} days recorded", at.total),
        ),
        card(
            "My Requests",
            rq.total.to_string(),
            format!("{} pending", rq.pending),
        ),
    ]
}
