use super::{contains_ci, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::{self, CsvRow};
use crate::scope::{self, Scoped};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

labeled_enum! {
    pub enum AttendanceStatus {
        Present => "Present",
        Absent => "Absent",
        Late => "Late",
        Partial => "Partial",
    }
}

labeled_enum! {
    pub enum CheckMethod {
        QrCode => "QR Code",
        Biometric => "Biometric",
        Manual => "Manual",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub room_number: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<CheckMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Record for AttendanceRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for AttendanceRecord {
    fn owned_by(&self, full_name: &str) -> bool {
        self.student_name == full_name
    }

    fn location(&self) -> Option<&str> {
        Some(self.room_number.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub date: Option<String>,
    pub search: String,
    pub status: Option<AttendanceStatus>,
}

impl AttendanceFilter {
    pub fn matches(&self, r: &AttendanceRecord) -> bool {
        self.date.as_deref().map_or(true, |d| r.date == d)
            && (contains_ci(&r.student_name, &self.search) || contains_ci(&r.room_number, &self.search))
            && self.status.map_or(true, |s| r.status == s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    /// Present share of `total`, one decimal; zero for an empty day.
    pub percentage: f64,
}

pub fn stats(records: &[AttendanceRecord]) -> AttendanceStats {
    let count = |s: AttendanceStatus| records.iter().filter(|r| r.status == s).count();
    let total = records.len();
    let present = count(AttendanceStatus::Present);
    let percentage = if total > 0 {
        ((present as f64 / total as f64) * 1000.0).round() / 10.0
    } else {
        0.0
    };
    AttendanceStats {
        total,
        present,
        absent: count(AttendanceStatus::Absent),
        late: count(AttendanceStatus::Late),
        percentage,
    }
}

/// Existing record for `(student_id, date)` visible to the actor, or a
/// template record for that student to copy name and room from.
fn locate<'s>(
    records: &'s RecordSet<AttendanceRecord>,
    actor: &Actor<'_>,
    student_id: &str,
    date: &str,
) -> (Option<&'s AttendanceRecord>, Option<&'s AttendanceRecord>) {
    let mut existing = None;
    let mut template = None;
    for r in records.as_slice() {
        if r.student_id != student_id || !scope::is_visible(r, actor.user) {
            continue;
        }
        if r.date == date && existing.is_none() {
            existing = Some(r);
        }
        if template.is_none() {
            template = Some(r);
        }
    }
    (existing, template)
}

fn require_date(date: &str) -> Result<String, TransitionError> {
    super::canonical_date(date)
        .ok_or_else(|| TransitionError::InvalidInput("date must be YYYY-MM-DD".to_string()))
}

/// Manual marking. Upserts on `(student_id, date)`; a student with no
/// visible attendance history cannot be marked.
pub fn mark(
    records: &RecordSet<AttendanceRecord>,
    actor: &Actor<'_>,
    student_id: &str,
    date: &str,
    status: AttendanceStatus,
) -> Result<RecordSet<AttendanceRecord>, TransitionError> {
    actor.require(Action::MarkAttendance)?;
    let date = require_date(date)?;
    let date = date.as_str();
    match locate(records, actor, student_id, date) {
        (Some(existing), _) => {
            let id = existing.id.clone();
            Ok(records.replace_one(&id, |r| {
                Some(AttendanceRecord {
                    status,
                    method: Some(CheckMethod::Manual),
                    ..r.clone()
                })
            }))
        }
        (None, Some(template)) => Ok(records.prepend(AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            student_name: template.student_name.clone(),
            room_number: template.room_number.clone(),
            date: date.to_string(),
            check_in: None,
            check_out: None,
            status,
            method: Some(CheckMethod::Manual),
            location: None,
        })),
        (None, None) => Ok(records.clone()),
    }
}

fn scan_location(method: CheckMethod, room_number: &str) -> String {
    match (method, room_number.chars().next()) {
        (CheckMethod::Biometric, Some(block)) => format!("Block {} Entry", block),
        _ => "Main Gate".to_string(),
    }
}

/// QR or biometric check-in: upserts a Present record stamped with the
/// check-in time.
pub fn scan(
    records: &RecordSet<AttendanceRecord>,
    actor: &Actor<'_>,
    student_id: &str,
    date: &str,
    method: CheckMethod,
) -> Result<RecordSet<AttendanceRecord>, TransitionError> {
    actor.require(Action::RecordScan)?;
    let date = require_date(date)?;
    let date = date.as_str();
    if method == CheckMethod::Manual {
        return Err(TransitionError::InvalidInput(
            "scan method must be QR Code or Biometric".to_string(),
        ));
    }
    let check_in = actor.at.format("%H:%M").to_string();
    match locate(records, actor, student_id, date) {
        (Some(existing), _) => {
            let id = existing.id.clone();
            Ok(records.replace_one(&id, |r| {
                Some(AttendanceRecord {
                    status: AttendanceStatus::Present,
                    check_in: Some(check_in),
                    method: Some(method),
                    location: Some(scan_location(method, &r.room_number)),
                    ..r.clone()
                })
            }))
        }
        (None, Some(template)) => Ok(records.prepend(AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            student_id: student_id.to_string(),
            student_name: template.student_name.clone(),
            room_number: template.room_number.clone(),
            date: date.to_string(),
            check_in: Some(check_in),
            check_out: None,
            status: AttendanceStatus::Present,
            method: Some(method),
            location: Some(scan_location(method, &template.room_number)),
        })),
        (None, None) => Ok(records.clone()),
    }
}

impl CsvRow for AttendanceRecord {
    const HEADERS: &'static [&'static str] = &[
        "Student Name",
        "Room",
        "Date",
        "Check In",
        "Check Out",
        "Status",
        "Method",
        "Location",
    ];
    const FILE_NAME: &'static str = "attendance.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.student_name.clone(),
            self.room_number.clone(),
            self.date.clone(),
            csv::opt(&self.check_in),
            csv::opt(&self.check_out),
            self.status.to_string(),
            self.method.map(|m| m.to_string()).unwrap_or_default(),
            csv::opt(&self.location),
        ]
    }
}
