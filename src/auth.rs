//! Demo credential table, roles and the permission tables.
//!
//! The credential check here is a fixture for the dashboard shell, not a
//! security boundary: passwords are compared in plain text and sessions
//! never expire.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Warden,
    Management,
    Student,
}

impl Role {
    #[cfg(test)]
    pub const ALL: [Role; 4] = [Role::Admin, Role::Warden, Role::Management, Role::Student];

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Warden => "Warden",
            Role::Management => "Management",
            Role::Student => "Student",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Warden => "warden",
            Role::Management => "management",
            Role::Student => "student",
        }
    }

    pub fn demo_full_name(self) -> &'static str {
        match self {
            Role::Admin => "Dr. Sarah Johnson",
            Role::Warden => "Mr. Michael Chen",
            Role::Management => "Ms. Emily Rodriguez",
            Role::Student => "Alex Thompson",
        }
    }

    /// Capability strings handed to the client with the session.
    pub fn capabilities(self) -> &'static [Capability] {
        use Capability::*;
        match self {
            Role::Admin => &[
                StudentsManage,
                RoomsManage,
                FeesManage,
                ComplaintsManage,
                AssetsManage,
                AttendanceManage,
                AnnouncementsManage,
                ReportsView,
                AnalyticsView,
                RequestsApprove,
                MaintenanceManage,
                StaffManage,
            ],
            Role::Warden => &[
                StudentsView,
                StudentsManageBlock,
                RoomsView,
                AttendanceRecord,
                RequestsApproveBlock,
                MaintenanceAssign,
                AnnouncementsBlock,
                BlueprintView,
                ServiceBookingHandle,
            ],
            Role::Management => &[
                StudentsView,
                FeesView,
                OccupancyView,
                StaffView,
                ReportsView,
                AnalyticsView,
            ],
            Role::Student => &[
                ProfileView,
                ProfileEdit,
                RoomView,
                AssetsView,
                RequestsSubmit,
                AttendanceViewSelf,
                FeesPay,
                AnnouncementsView,
                ComplaintsTrack,
                VisitorsRequest,
            ],
        }
    }

    pub fn permits(self, action: Action) -> bool {
        action.allowed_roles().contains(&self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    StudentsManage,
    StudentsView,
    StudentsManageBlock,
    RoomsManage,
    RoomsView,
    RoomView,
    FeesManage,
    FeesView,
    FeesPay,
    ComplaintsManage,
    ComplaintsTrack,
    AssetsManage,
    AssetsView,
    AttendanceManage,
    AttendanceRecord,
    AttendanceViewSelf,
    AnnouncementsManage,
    AnnouncementsBlock,
    AnnouncementsView,
    ReportsView,
    AnalyticsView,
    RequestsApprove,
    RequestsApproveBlock,
    RequestsSubmit,
    MaintenanceManage,
    MaintenanceAssign,
    StaffManage,
    StaffView,
    OccupancyView,
    BlueprintView,
    ServiceBookingHandle,
    ProfileView,
    ProfileEdit,
    VisitorsRequest,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        use Capability::*;
        match self {
            StudentsManage => "students.manage",
            StudentsView => "students.view",
            StudentsManageBlock => "students.manage_block",
            RoomsManage => "rooms.manage",
            RoomsView => "rooms.view",
            RoomView => "room.view",
            FeesManage => "fees.manage",
            FeesView => "fees.view",
            FeesPay => "fees.pay",
            ComplaintsManage => "complaints.manage",
            ComplaintsTrack => "complaints.track",
            AssetsManage => "assets.manage",
            AssetsView => "assets.view",
            AttendanceManage => "attendance.manage",
            AttendanceRecord => "attendance.record",
            AttendanceViewSelf => "attendance.view_self",
            AnnouncementsManage => "announcements.manage",
            AnnouncementsBlock => "announcements.block",
            AnnouncementsView => "announcements.view",
            ReportsView => "reports.view",
            AnalyticsView => "analytics.view",
            RequestsApprove => "requests.approve",
            RequestsApproveBlock => "requests.approve_block",
            RequestsSubmit => "requests.submit",
            MaintenanceManage => "maintenance.manage",
            MaintenanceAssign => "maintenance.assign",
            StaffManage => "staff.manage",
            StaffView => "staff.view",
            OccupancyView => "occupancy.view",
            BlueprintView => "blueprint.view",
            ServiceBookingHandle => "service_booking.handle",
            ProfileView => "profile.view",
            ProfileEdit => "profile.edit",
            VisitorsRequest => "visitors.request",
        }
    }
}

/// Every mutation the daemon exposes. Gating goes through
/// [`Action::allowed_roles`], never through capability strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ApproveRequest,
    RejectRequest,
    AssignMaintenance,
    SubmitRequest,
    PayFee,
    PenalizeFee,
    MarkAttendance,
    RecordScan,
    RequestAssetMaintenance,
    RemoveAsset,
    EnrollStudent,
    RemoveStudent,
    SetRoomStatus,
    UpdateSettings,
    ManageBackups,
}

impl Action {
    pub fn allowed_roles(self) -> &'static [Role] {
        use Role::*;
        match self {
            Action::ApproveRequest
            | Action::RejectRequest
            | Action::AssignMaintenance
            | Action::MarkAttendance
            | Action::RecordScan
            | Action::RemoveStudent
            | Action::SetRoomStatus => &[Admin, Warden],
            Action::SubmitRequest | Action::PayFee | Action::RequestAssetMaintenance => &[Student],
            Action::PenalizeFee
            | Action::RemoveAsset
            | Action::EnrollStudent
            | Action::UpdateSettings
            | Action::ManageBackups => &[Admin],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::ApproveRequest => "requests.approve",
            Action::RejectRequest => "requests.reject",
            Action::AssignMaintenance => "requests.assignMaintenance",
            Action::SubmitRequest => "requests.submit",
            Action::PayFee => "fees.pay",
            Action::PenalizeFee => "fees.applyPenalty",
            Action::MarkAttendance => "attendance.mark",
            Action::RecordScan => "attendance.scan",
            Action::RequestAssetMaintenance => "assets.requestMaintenance",
            Action::RemoveAsset => "assets.remove",
            Action::EnrollStudent => "students.create",
            Action::RemoveStudent => "students.remove",
            Action::SetRoomStatus => "rooms.setStatus",
            Action::UpdateSettings => "settings.update",
            Action::ManageBackups => "backup",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_assigned: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,
}

const DEMO_CREDENTIALS: [(Role, &str, &str); 4] = [
    (Role::Admin, "admin", "admin123"),
    (Role::Warden, "warden", "warden123"),
    (Role::Management, "management", "mgmt123"),
    (Role::Student, "student", "student123"),
];

/// Matches `creds` against the demo table and synthesizes the session
/// identity. `warden_block` is the block handed to a warden session.
pub fn login(creds: &LoginCredentials, warden_block: &str) -> Result<User, AuthError> {
    let (role, _, _) = DEMO_CREDENTIALS
        .iter()
        .find(|(_, user, pass)| *user == creds.username && *pass == creds.password)
        .ok_or(AuthError::InvalidCredentials)?;
    Ok(synthesize_user(*role, &creds.username, warden_block))
}

fn synthesize_user(role: Role, username: &str, warden_block: &str) -> User {
    User {
        id: format!("{}_001", role.slug()),
        username: username.to_string(),
        email: format!("{}@hostel.edu", username),
        role,
        full_name: role.demo_full_name().to_string(),
        avatar: Some(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            username
        )),
        block_assigned: (role == Role::Warden).then(|| warden_block.to_string()),
        permissions: role
            .capabilities()
            .iter()
            .map(|c| c.as_str().to_string())
            .collect(),
    }
}

#[cfg(test)]
pub(crate) fn demo_user(role: Role) -> User {
    synthesize_user(role, DEMO_CREDENTIALS[role as usize].1, "Block A")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(u: &str, p: &str) -> LoginCredentials {
        LoginCredentials {
            username: u.to_string(),
            password: p.to_string(),
        }
    }

    #[test]
    fn every_demo_login_synthesizes_its_role() {
        for (role, user, pass) in DEMO_CREDENTIALS {
            let u = login(&creds(user, pass), "Block A").expect("login");
            assert_eq!(u.role, role);
            assert_eq!(u.id, format!("{}_001", user));
            assert_eq!(u.email, format!("{}@hostel.edu", user));
            assert_eq!(u.full_name, role.demo_full_name());
            assert_eq!(u.permissions.len(), role.capabilities().len());
        }
    }

    #[test]
    fn only_wardens_get_a_block() {
        let w = login(&creds("warden", "warden123"), "Block C").expect("login");
        assert_eq!(w.block_assigned.as_deref(), Some("Block C"));
        let a = login(&creds("admin", "admin123"), "Block C").expect("login");
        assert_eq!(a.block_assigned, None);
    }

    #[test]
    fn mismatched_password_is_rejected() {
        assert_eq!(
            login(&creds("admin", "warden123"), "Block A"),
            Err(AuthError::InvalidCredentials)
        );
        assert_eq!(
            login(&creds("", ""), "Block A"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn management_cannot_perform_any_action() {
        let actions = [
            Action::ApproveRequest,
            Action::RejectRequest,
            Action::AssignMaintenance,
            Action::SubmitRequest,
            Action::PayFee,
            Action::PenalizeFee,
            Action::MarkAttendance,
            Action::RecordScan,
            Action::RequestAssetMaintenance,
            Action::RemoveAsset,
            Action::EnrollStudent,
            Action::RemoveStudent,
            Action::SetRoomStatus,
            Action::UpdateSettings,
            Action::ManageBackups,
        ];
        for a in actions {
            assert!(!Role::Management.permits(a), "{a} allowed for management");
        }
    }

    #[test]
    fn approval_and_payment_are_split_between_staff_and_students() {
        assert!(Role::Admin.permits(Action::ApproveRequest));
        assert!(Role::Warden.permits(Action::RejectRequest));
        assert!(!Role::Student.permits(Action::ApproveRequest));
        assert!(Role::Student.permits(Action::PayFee));
        assert!(!Role::Admin.permits(Action::PayFee));
        assert!(!Role::Warden.permits(Action::SubmitRequest));
    }

    #[test]
    fn session_json_uses_camel_case() {
        let u = demo_user(Role::Warden);
        let v = serde_json::to_value(&u).expect("serialize");
        assert_eq!(v["fullName"], "Mr. Michael Chen");
        assert_eq!(v["blockAssigned"], "Block A");
        assert_eq!(v["role"], "Warden");
    }
}
