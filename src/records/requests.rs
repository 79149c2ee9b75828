use super::{contains_ci, transition, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::{self, CsvRow};
use crate::scope::Scoped;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

labeled_enum! {
    pub enum RequestStatus {
        Pending => "Pending",
        Approved => "Approved",
        Rejected => "Rejected",
        InProgress => "In Progress",
    }
}

labeled_enum! {
    pub enum RequestType {
        Leave => "Leave",
        RoomChange => "Room Change",
        Maintenance => "Maintenance",
        Service => "Service",
        Other => "Other",
    }
}

labeled_enum! {
    pub enum Priority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelRequest {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub room_number: String,
    #[serde(rename = "type")]
    pub kind: RequestType,
    pub title: String,
    pub description: String,
    pub status: RequestStatus,
    pub priority: Priority,
    pub submitted_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Record for HostelRequest {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for HostelRequest {
    fn owned_by(&self, full_name: &str) -> bool {
        self.student_name == full_name
    }

    fn location(&self) -> Option<&str> {
        Some(self.room_number.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub search: String,
    pub status: Option<RequestStatus>,
    pub kind: Option<RequestType>,
}

impl RequestFilter {
    pub fn matches(&self, r: &HostelRequest) -> bool {
        (contains_ci(&r.student_name, &self.search) || contains_ci(&r.title, &self.search))
            && self.status.map_or(true, |s| r.status == s)
            && self.kind.map_or(true, |k| r.kind == k)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub in_progress: usize,
}

pub fn stats(requests: &[HostelRequest]) -> RequestStats {
    let mut out = RequestStats {
        total: requests.len(),
        ..Default::default()
    };
    for r in requests {
        match r.status {
            RequestStatus::Pending => out.pending += 1,
            RequestStatus::Approved => out.approved += 1,
            RequestStatus::Rejected => out.rejected += 1,
            RequestStatus::InProgress => out.in_progress += 1,
        }
    }
    out
}

fn process(
    requests: &RecordSet<HostelRequest>,
    actor: &Actor<'_>,
    action: Action,
    id: &str,
    status: RequestStatus,
    response: String,
) -> Result<RecordSet<HostelRequest>, TransitionError> {
    let processed_date = actor.today_str();
    let processed_by = actor.user.role.label().to_string();
    transition(requests, actor, action, id, |r| {
        Some(HostelRequest {
            status,
            processed_date: Some(processed_date),
            processed_by: Some(processed_by),
            response: Some(response),
            ..r.clone()
        })
    })
}

pub fn approve(
    requests: &RecordSet<HostelRequest>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<HostelRequest>, TransitionError> {
    let response = format!("Request approved by {}", actor.user.role);
    process(requests, actor, Action::ApproveRequest, id, RequestStatus::Approved, response)
}

pub fn reject(
    requests: &RecordSet<HostelRequest>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<HostelRequest>, TransitionError> {
    let response = format!("Request rejected by {}", actor.user.role);
    process(requests, actor, Action::RejectRequest, id, RequestStatus::Rejected, response)
}

pub fn assign_maintenance(
    requests: &RecordSet<HostelRequest>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<HostelRequest>, TransitionError> {
    process(
        requests,
        actor,
        Action::AssignMaintenance,
        id,
        RequestStatus::InProgress,
        "Maintenance team assigned.".to_string(),
    )
}

#[derive(Debug, Clone)]
pub struct NewRequest {
    pub room_number: String,
    pub kind: RequestType,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub reason: Option<String>,
}

fn optional_date(raw: Option<&str>) -> Result<Option<String>, TransitionError> {
    match raw.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) => super::canonical_date(d)
            .map(Some)
            .ok_or_else(|| TransitionError::InvalidInput("dates must be YYYY-MM-DD".to_string())),
    }
}

/// Files a new pending request for the acting student, newest first.
/// Returns the new snapshot and the id assigned to the request.
pub fn submit(
    requests: &RecordSet<HostelRequest>,
    actor: &Actor<'_>,
    new: NewRequest,
) -> Result<(RecordSet<HostelRequest>, String), TransitionError> {
    actor.require(Action::SubmitRequest)?;
    if new.title.trim().is_empty() {
        return Err(TransitionError::InvalidInput("title is required".to_string()));
    }
    if new.room_number.trim().is_empty() {
        return Err(TransitionError::InvalidInput(
            "roomNumber is required".to_string(),
        ));
    }
    let from_date = optional_date(new.from_date.as_deref())?;
    let to_date = optional_date(new.to_date.as_deref())?;
    if let (Some(from), Some(to)) = (from_date.as_deref(), to_date.as_deref()) {
        // Canonical dates compare in calendar order.
        if from > to {
            return Err(TransitionError::InvalidInput(
                "fromDate must not be after toDate".to_string(),
            ));
        }
    }

    let id = Uuid::new_v4().to_string();
    let record = HostelRequest {
        id: id.clone(),
        student_id: actor.user.id.clone(),
        student_name: actor.user.full_name.clone(),
        room_number: new.room_number.trim().to_string(),
        kind: new.kind,
        title: new.title.trim().to_string(),
        description: new.description,
        status: RequestStatus::Pending,
        priority: new.priority,
        submitted_date: actor.today_str(),
        processed_date: None,
        processed_by: None,
        response: None,
        from_date,
        to_date,
        reason: new.reason,
    };
    Ok((requests.prepend(record), id))
}

impl CsvRow for HostelRequest {
    const HEADERS: &'static [&'static str] = &[
        "Student Name",
        "Room",
        "Type",
        "Title",
        "Priority",
        "Status",
        "Submitted",
        "Processed By",
        "Processed Date",
    ];
    const FILE_NAME: &'static str = "requests.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.student_name.clone(),
            self.room_number.clone(),
            self.kind.to_string(),
            self.title.clone(),
            self.priority.to_string(),
            self.status.to_string(),
            self.submitted_date.clone(),
            csv::opt(&self.processed_by),
            csv::opt(&self.processed_date),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{demo_user, Role};
    use crate::records::testing::{actor_at, TODAY};
    use crate::seed;

    fn requests() -> RecordSet<HostelRequest> {
        RecordSet::new(seed::requests())
    }

    fn leave(title: &str) -> NewRequest {
        NewRequest {
            room_number: "A-205".to_string(),
            kind: RequestType::Leave,
            title: title.to_string(),
            description: "Going home".to_string(),
            priority: Priority::Medium,
            from_date: Some("2024-04-05".to_string()),
            to_date: Some("2024-04-10".to_string()),
            reason: None,
        }
    }

    #[test]
    fn warden_rejects_pending_request() {
        let user = demo_user(Role::Warden);
        let after = reject(&requests(), &actor_at(&user), "1").expect("reject");
        let r = after.get("1").unwrap();
        assert_eq!(r.status, RequestStatus::Rejected);
        assert_eq!(r.processed_by.as_deref(), Some("Warden"));
        assert_eq!(r.processed_date.as_deref(), Some(TODAY));
        assert_eq!(r.response.as_deref(), Some("Request rejected by Warden"));
    }

    #[test]
    fn last_transition_wins_and_scoping_fields_survive() {
        let user = demo_user(Role::Admin);
        let actor = actor_at(&user);
        let before = requests();
        let original = before.get("1").unwrap().clone();

        let approved = approve(&before, &actor, "1").expect("approve");
        assert_eq!(approved.get("1").unwrap().status, RequestStatus::Approved);
        let rejected = reject(&approved, &actor, "1").expect("reject");
        let r = rejected.get("1").unwrap();

        assert_eq!(r.status, RequestStatus::Rejected);
        assert_eq!(r.id, original.id);
        assert_eq!(r.student_id, original.student_id);
        assert_eq!(r.student_name, original.student_name);
        assert_eq!(r.room_number, original.room_number);
        assert_eq!(r.submitted_date, original.submitted_date);
        assert_eq!(r.title, original.title);
    }

    #[test]
    fn warden_cannot_touch_other_blocks() {
        let user = demo_user(Role::Warden);
        let before = requests();
        // Request 4 lives in C-301.
        let after = approve(&before, &actor_at(&user), "4").expect("approve");
        assert!(after.same_snapshot(&before));
    }

    #[test]
    fn unknown_id_keeps_snapshot() {
        let user = demo_user(Role::Admin);
        let before = requests();
        let after = approve(&before, &actor_at(&user), "missing").expect("approve");
        assert!(after.same_snapshot(&before));
    }

    #[test]
    fn students_and_management_cannot_process() {
        for role in [Role::Student, Role::Management] {
            let user = demo_user(role);
            assert!(matches!(
                approve(&requests(), &actor_at(&user), "1"),
                Err(TransitionError::Forbidden { .. })
            ));
        }
    }

    #[test]
    fn assign_maintenance_moves_to_in_progress() {
        let user = demo_user(Role::Admin);
        let after = assign_maintenance(&requests(), &actor_at(&user), "1").expect("assign");
        let r = after.get("1").unwrap();
        assert_eq!(r.status, RequestStatus::InProgress);
        assert_eq!(r.response.as_deref(), Some("Maintenance team assigned."));
    }

    #[test]
    fn student_submission_is_prepended_as_pending() {
        let user = demo_user(Role::Student);
        let before = requests();
        let (after, id) = submit(&before, &actor_at(&user), leave("Home visit")).expect("submit");
        assert_eq!(after.len(), before.len() + 1);
        let first = &after.as_slice()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.status, RequestStatus::Pending);
        assert_eq!(first.student_name, "Alex Thompson");
        assert_eq!(first.submitted_date, TODAY);
    }

    #[test]
    fn submission_validates_input_and_role() {
        let student = demo_user(Role::Student);
        assert!(matches!(
            submit(&requests(), &actor_at(&student), leave("  ")),
            Err(TransitionError::InvalidInput(_))
        ));

        let mut backwards = leave("Trip");
        backwards.from_date = Some("2024-04-10".to_string());
        backwards.to_date = Some("2024-04-05".to_string());
        assert!(matches!(
            submit(&requests(), &actor_at(&student), backwards),
            Err(TransitionError::InvalidInput(_))
        ));

        let warden = demo_user(Role::Warden);
        assert!(matches!(
            submit(&requests(), &actor_at(&warden), leave("Trip")),
            Err(TransitionError::Forbidden { .. })
        ));
    }

    #[test]
    fn leave_dates_are_stored_zero_padded() {
        let user = demo_user(Role::Student);
        let mut trip = leave("Trip");
        trip.from_date = Some("2024-4-5".to_string());
        trip.to_date = Some("2024-04-10".to_string());
        let (after, _) = submit(&requests(), &actor_at(&user), trip).expect("submit");
        let first = &after.as_slice()[0];
        assert_eq!(first.from_date.as_deref(), Some("2024-04-05"));
        assert_eq!(first.to_date.as_deref(), Some("2024-04-10"));

        let mut only_from = leave("Trip");
        only_from.from_date = Some("5/4/2024".to_string());
        only_from.to_date = None;
        assert!(matches!(
            submit(&requests(), &actor_at(&user), only_from),
            Err(TransitionError::InvalidInput(_))
        ));
    }

    #[test]
    fn in_progress_label_round_trips() {
        let v = serde_json::to_value(RequestStatus::InProgress).unwrap();
        assert_eq!(v, "In Progress");
        assert_eq!(RequestStatus::parse("In Progress"), Some(RequestStatus::InProgress));
        assert!(serde_json::from_str::<RequestStatus>("\"Done\"").is_err());
    }
}
