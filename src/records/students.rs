use super::{contains_ci, remove_visible, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::CsvRow;
use crate::scope::Scoped;
use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum StudentStatus {
        Active => "Active",
        Inactive => "Inactive",
        Graduated => "Graduated",
    }
}

labeled_enum! {
    pub enum FeeStanding {
        Paid => "Paid",
        Pending => "Pending",
        Overdue => "Overdue",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room: String,
    pub block: String,
    pub course: String,
    pub year: u32,
    pub status: StudentStatus,
    pub join_date: String,
    pub fee_status: FeeStanding,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Record for Student {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for Student {
    fn owned_by(&self, full_name: &str) -> bool {
        self.name == full_name
    }

    fn location(&self) -> Option<&str> {
        Some(self.block.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub search: String,
    pub block: Option<String>,
    pub status: Option<StudentStatus>,
    pub fee_status: Option<FeeStanding>,
}

impl StudentFilter {
    pub fn matches(&self, s: &Student) -> bool {
        (contains_ci(&s.name, &self.search)
            || contains_ci(&s.email, &self.search)
            || contains_ci(&s.room, &self.search))
            && self.block.as_deref().map_or(true, |b| s.block == b)
            && self.status.map_or(true, |st| s.status == st)
            && self.fee_status.map_or(true, |f| s.fee_status == f)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentStats {
    pub total: usize,
    pub active: usize,
    /// Share of students with fees paid, whole percent.
    pub fees_paid_percent: u32,
}

pub fn stats(students: &[Student]) -> StudentStats {
    let total = students.len();
    let paid = students
        .iter()
        .filter(|s| s.fee_status == FeeStanding::Paid)
        .count();
    StudentStats {
        total,
        active: students
            .iter()
            .filter(|s| s.status == StudentStatus::Active)
            .count(),
        fees_paid_percent: if total > 0 {
            ((paid as f64 / total as f64) * 100.0).round() as u32
        } else {
            0
        },
    }
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub room: String,
    pub block: Option<String>,
    pub course: String,
    pub year: u32,
}

fn next_student_id(students: &[Student]) -> String {
    let max = students
        .iter()
        .filter_map(|s| s.id.strip_prefix("STU"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("STU{:03}", max + 1)
}

/// Enrols a student as Active with fees pending. The block defaults to the
/// room prefix (`"B-310"` → `"B"`).
pub fn enroll(
    students: &RecordSet<Student>,
    actor: &Actor<'_>,
    new: NewStudent,
) -> Result<(RecordSet<Student>, String), TransitionError> {
    actor.require(Action::EnrollStudent)?;
    let name = new.name.trim().to_string();
    let room = new.room.trim().to_string();
    if name.is_empty() || room.is_empty() {
        return Err(TransitionError::InvalidInput(
            "name and room are required".to_string(),
        ));
    }
    let block = new
        .block
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .or_else(|| room.split('-').next().map(|p| p.trim().to_string()))
        .filter(|b| !b.is_empty())
        .ok_or_else(|| TransitionError::InvalidInput("block is required".to_string()))?;

    let id = next_student_id(students.as_slice());
    let mut items = students.as_slice().to_vec();
    items.push(Student {
        id: id.clone(),
        name,
        email: new.email.trim().to_string(),
        phone: new.phone.trim().to_string(),
        room,
        block,
        course: new.course.trim().to_string(),
        year: new.year,
        status: StudentStatus::Active,
        join_date: actor.today_str(),
        fee_status: FeeStanding::Pending,
        avatar: None,
    });
    Ok((RecordSet::new(items), id))
}

pub fn remove(
    students: &RecordSet<Student>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<Student>, TransitionError> {
    remove_visible(students, actor, Action::RemoveStudent, id)
}

impl CsvRow for Student {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Name",
        "Email",
        "Phone",
        "Room",
        "Block",
        "Course",
        "Year",
        "Status",
        "Fee Status",
    ];
    const FILE_NAME: &'static str = "students.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            self.email.clone(),
            self.phone.clone(),
            self.room.clone(),
            self.block.clone(),
            self.course.clone(),
            self.year.to_string(),
            self.status.to_string(),
            self.fee_status.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{demo_user, Role};
    use crate::records::testing::{actor_at, TODAY};
    use crate::scope::visible;
    use crate::seed;

    fn students() -> RecordSet<Student> {
        RecordSet::new(seed::students())
    }

    fn newcomer() -> NewStudent {
        NewStudent {
            name: "Priya Nair".to_string(),
            email: "priya.nair@student.edu".to_string(),
            phone: "+1 234 567 8906".to_string(),
            room: "D-110".to_string(),
            block: None,
            course: "Chemistry".to_string(),
            year: 1,
        }
    }

    #[test]
    fn warden_sees_block_students_only() {
        let user = demo_user(Role::Warden);
        let out = visible(&seed::students(), Some(&user));
        let ids: Vec<_> = out.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["STU001", "STU003"]);
    }

    #[test]
    fn enrolment_assigns_next_id_and_block_from_room() {
        let user = demo_user(Role::Admin);
        let (after, id) = enroll(&students(), &actor_at(&user), newcomer()).expect("enroll");
        assert_eq!(id, "STU006");
        let s = after.get("STU006").unwrap();
        assert_eq!(s.block, "D");
        assert_eq!(s.status, StudentStatus::Active);
        assert_eq!(s.fee_status, FeeStanding::Pending);
        assert_eq!(s.join_date, TODAY);
    }

    #[test]
    fn enrolment_is_admin_only() {
        let user = demo_user(Role::Warden);
        assert!(matches!(
            enroll(&students(), &actor_at(&user), newcomer()),
            Err(TransitionError::Forbidden { .. })
        ));
    }

    #[test]
    fn warden_removes_only_within_block() {
        let user = demo_user(Role::Warden);
        let before = students();
        let after = remove(&before, &actor_at(&user), "STU003").expect("remove");
        assert!(after.get("STU003").is_none());

        let untouched = remove(&before, &actor_at(&user), "STU002").expect("remove");
        assert!(untouched.same_snapshot(&before));
    }

    #[test]
    fn stats_round_paid_share() {
        let s = stats(&seed::students());
        assert_eq!(s.total, 5);
        assert_eq!(s.active, 4);
        assert_eq!(s.fees_paid_percent, 40);
    }
}
