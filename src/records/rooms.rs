use super::{contains_ci, transition, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::CsvRow;
use crate::scope::{self, Scoped};
use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum RoomStatus {
        Available => "Available",
        Occupied => "Occupied",
        Maintenance => "Maintenance",
        Reserved => "Reserved",
    }
}

labeled_enum! {
    pub enum RoomType {
        Single => "Single",
        Double => "Double",
        Triple => "Triple",
        Quad => "Quad",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub number: String,
    pub block: String,
    pub floor: u32,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub capacity: u32,
    pub occupied: u32,
    pub status: RoomStatus,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub assigned_students: Vec<String>,
    pub rent: u64,
}

impl Record for Room {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for Room {
    fn owned_by(&self, full_name: &str) -> bool {
        self.assigned_students.iter().any(|s| s == full_name)
    }

    fn location(&self) -> Option<&str> {
        Some(self.block.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub search: String,
    pub block: Option<String>,
    pub status: Option<RoomStatus>,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        (contains_ci(&room.number, &self.search)
            || room
                .assigned_students
                .iter()
                .any(|s| contains_ci(s, &self.search)))
            && self.block.as_deref().map_or(true, |b| room.block == b)
            && self.status.map_or(true, |s| room.status == s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub maintenance: usize,
    pub beds: u32,
    pub beds_occupied: u32,
}

pub fn stats(rooms: &[Room]) -> RoomStats {
    let count = |s: RoomStatus| rooms.iter().filter(|r| r.status == s).count();
    RoomStats {
        total: rooms.len(),
        available: count(RoomStatus::Available),
        occupied: count(RoomStatus::Occupied),
        maintenance: count(RoomStatus::Maintenance),
        beds: rooms.iter().map(|r| r.capacity).sum(),
        beds_occupied: rooms.iter().map(|r| r.occupied).sum(),
    }
}

/// Staff move a room between Available, Occupied, Maintenance and Reserved.
/// A room with occupants cannot be put back to Available.
pub fn set_status(
    rooms: &RecordSet<Room>,
    actor: &Actor<'_>,
    id: &str,
    status: RoomStatus,
) -> Result<RecordSet<Room>, TransitionError> {
    actor.require(Action::SetRoomStatus)?;
    if let Some(room) = rooms.get(id).filter(|r| scope::is_visible(*r, actor.user)) {
        if status == RoomStatus::Available && room.capacity > 0 && room.occupied >= room.capacity {
            return Err(TransitionError::InvalidInput(format!(
                "room {} is full",
                room.number
            )));
        }
    }
    transition(rooms, actor, Action::SetRoomStatus, id, |r| {
        (r.status != status).then(|| Room {
            status,
            ..r.clone()
        })
    })
}

impl CsvRow for Room {
    const HEADERS: &'static [&'static str] = &[
        "Room Number",
        "Block",
        "Floor",
        "Type",
        "Capacity",
        "Occupied",
        "Status",
        "Rent",
    ];
    const FILE_NAME: &'static str = "rooms.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.number.clone(),
            self.block.clone(),
            self.floor.to_string(),
            self.room_type.to_string(),
            self.capacity.to_string(),
            self.occupied.to_string(),
            self.status.to_string(),
            self.rent.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{demo_user, Role};
    use crate::records::testing::actor_at;
    use crate::scope::visible;
    use crate::seed;

    fn rooms() -> RecordSet<Room> {
        RecordSet::new(seed::rooms())
    }

    #[test]
    fn warden_reserves_room_in_block() {
        let user = demo_user(Role::Warden);
        let after = set_status(&rooms(), &actor_at(&user), "2", RoomStatus::Reserved).expect("set");
        assert_eq!(after.get("2").unwrap().status, RoomStatus::Reserved);
        assert_eq!(after.get("2").unwrap().block, "A");
    }

    #[test]
    fn warden_cannot_change_other_block() {
        let user = demo_user(Role::Warden);
        let before = rooms();
        let after = set_status(&before, &actor_at(&user), "3", RoomStatus::Maintenance).expect("set");
        assert!(after.same_snapshot(&before));
    }

    #[test]
    fn full_room_cannot_become_available() {
        let user = demo_user(Role::Admin);
        assert!(matches!(
            set_status(&rooms(), &actor_at(&user), "1", RoomStatus::Available),
            Err(TransitionError::InvalidInput(_))
        ));
    }

    #[test]
    fn same_status_keeps_snapshot() {
        let user = demo_user(Role::Admin);
        let before = rooms();
        let after = set_status(&before, &actor_at(&user), "2", RoomStatus::Available).expect("set");
        assert!(after.same_snapshot(&before));
    }

    #[test]
    fn students_see_rooms_they_are_assigned_to() {
        let mut user = demo_user(Role::Student);
        user.full_name = "Alice Johnson".to_string();
        let mine = visible(&seed::rooms(), Some(&user));
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].number, "B-201");
    }

    #[test]
    fn stats_count_beds() {
        let s = stats(&seed::rooms());
        assert_eq!(s.total, 4);
        assert_eq!(s.available, 2);
        assert_eq!(s.occupied, 1);
        assert_eq!(s.maintenance, 1);
        assert_eq!(s.beds, 8);
        assert_eq!(s.beds_occupied, 3);
    }
}
