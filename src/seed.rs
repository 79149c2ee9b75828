//! Demo fixtures written to an empty workspace the first time each store is
//! read.

use crate::records::assets::{Asset, AssetCategory, AssetStatus, Condition};
use crate::records::attendance::{AttendanceRecord, AttendanceStatus, CheckMethod};
use crate::records::fees::{Fee, FeeStatus, FeeType, PaymentMethod};
use crate::records::requests::{HostelRequest, Priority, RequestStatus, RequestType};
use crate::records::rooms::{Room, RoomStatus, RoomType};
use crate::records::students::{FeeStanding, Student, StudentStatus};

fn s(v: &str) -> String {
    v.to_string()
}

fn some(v: &str) -> Option<String> {
    Some(v.to_string())
}

fn strings(vs: &[&str]) -> Vec<String> {
    vs.iter().map(|v| v.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn student(
    id: &str,
    name: &str,
    room: &str,
    course: &str,
    year: u32,
    status: StudentStatus,
    join_date: &str,
    fee_status: FeeStanding,
    phone_suffix: u32,
) -> Student {
    let slug = name.to_lowercase().replace(' ', ".");
    let first = name.split(' ').next().unwrap_or(name).to_lowercase();
    Student {
        id: s(id),
        name: s(name),
        email: format!("{}@student.edu", slug),
        phone: format!("+1 234 567 {}", 8900 + phone_suffix),
        room: s(room),
        block: room.split('-').next().unwrap_or_default().to_string(),
        course: s(course),
        year,
        status,
        join_date: s(join_date),
        fee_status,
        avatar: Some(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            first
        )),
    }
}

pub fn students() -> Vec<Student> {
    use FeeStanding as F;
    use StudentStatus as S;
    vec![
        student("STU001", "Alex Thompson", "A-205", "Computer Science", 2, S::Active, "2023-08-15", F::Paid, 1),
        student("STU002", "Sarah Johnson", "B-310", "Mechanical Engineering", 3, S::Active, "2022-08-20", F::Pending, 2),
        student("STU003", "Michael Chen", "A-105", "Business Administration", 1, S::Active, "2024-01-10", F::Overdue, 3),
        student("STU004", "Emily Rodriguez", "C-201", "Biology", 4, S::Active, "2021-08-25", F::Paid, 4),
        student("STU005", "David Park", "B-405", "Physics", 2, S::Inactive, "2023-01-15", F::Pending, 5),
    ]
}

pub fn rooms() -> Vec<Room> {
    let deluxe = strings(&["AC", "Attached Bathroom", "Wi-Fi", "Study Table"]);
    vec![
        Room {
            id: s("1"),
            number: s("A-101"),
            block: s("A"),
            floor: 1,
            room_type: RoomType::Double,
            capacity: 2,
            occupied: 2,
            status: RoomStatus::Occupied,
            amenities: deluxe.clone(),
            assigned_students: strings(&["John Doe", "Mike Smith"]),
            rent: 12000,
        },
        Room {
            id: s("2"),
            number: s("A-102"),
            block: s("A"),
            floor: 1,
            room_type: RoomType::Single,
            capacity: 1,
            occupied: 0,
            status: RoomStatus::Available,
            amenities: deluxe.clone(),
            assigned_students: Vec::new(),
            rent: 15000,
        },
        Room {
            id: s("3"),
            number: s("B-201"),
            block: s("B"),
            floor: 2,
            room_type: RoomType::Triple,
            capacity: 3,
            occupied: 1,
            status: RoomStatus::Available,
            amenities: strings(&["Fan", "Common Bathroom", "Wi-Fi", "Study Table"]),
            assigned_students: strings(&["Alice Johnson"]),
            rent: 8000,
        },
        Room {
            id: s("4"),
            number: s("A-205"),
            block: s("A"),
            floor: 2,
            room_type: RoomType::Double,
            capacity: 2,
            occupied: 0,
            status: RoomStatus::Maintenance,
            amenities: deluxe,
            assigned_students: Vec::new(),
            rent: 12000,
        },
    ]
}

pub fn fees() -> Vec<Fee> {
    vec![
        Fee {
            id: s("1"),
            student_id: s("ST001"),
            student_name: s("John Doe"),
            room_number: s("A-101"),
            fee_type: FeeType::Monthly,
            amount: 12000,
            due_date: s("2024-04-01"),
            paid_date: some("2024-03-28"),
            status: FeeStatus::Paid,
            payment_method: Some(PaymentMethod::Upi),
            transaction_id: some("TXN123456789"),
            penalty: None,
        },
        Fee {
            id: s("2"),
            student_id: s("ST002"),
            student_name: s("Mike Smith"),
            room_number: s("A-101"),
            fee_type: FeeType::Monthly,
            amount: 12000,
            due_date: s("2024-04-01"),
            paid_date: None,
            status: FeeStatus::Pending,
            payment_method: None,
            transaction_id: None,
            penalty: None,
        },
        Fee {
            id: s("3"),
            student_id: s("ST003"),
            student_name: s("Alice Johnson"),
            room_number: s("B-201"),
            fee_type: FeeType::Monthly,
            amount: 8000,
            due_date: s("2024-03-15"),
            paid_date: None,
            status: FeeStatus::Overdue,
            payment_method: None,
            transaction_id: None,
            penalty: Some(500),
        },
        Fee {
            id: s("4"),
            student_id: s("ST001"),
            student_name: s("John Doe"),
            room_number: s("A-101"),
            fee_type: FeeType::Mess,
            amount: 4500,
            due_date: s("2024-04-05"),
            paid_date: some("2024-04-02"),
            status: FeeStatus::Paid,
            payment_method: Some(PaymentMethod::Online),
            transaction_id: some("TXN987654321"),
            penalty: None,
        },
    ]
}

pub fn attendance() -> Vec<AttendanceRecord> {
    vec![
        AttendanceRecord {
            id: s("1"),
            student_id: s("ST001"),
            student_name: s("John Doe"),
            room_number: s("A-101"),
            date: s("2024-04-01"),
            check_in: some("21:45"),
            check_out: some("06:30"),
            status: AttendanceStatus::Present,
            method: Some(CheckMethod::QrCode),
            location: some("Main Gate"),
        },
        AttendanceRecord {
            id: s("2"),
            student_id: s("ST002"),
            student_name: s("Mike Smith"),
            room_number: s("A-101"),
            date: s("2024-04-01"),
            check_in: some("23:15"),
            check_out: None,
            status: AttendanceStatus::Late,
            method: Some(CheckMethod::Biometric),
            location: some("Block A Entry"),
        },
        AttendanceRecord {
            id: s("3"),
            student_id: s("ST003"),
            student_name: s("Alice Johnson"),
            room_number: s("B-201"),
            date: s("2024-04-01"),
            check_in: None,
            check_out: None,
            status: AttendanceStatus::Absent,
            method: Some(CheckMethod::Manual),
            location: None,
        },
        AttendanceRecord {
            id: s("4"),
            student_id: s("ST001"),
            student_name: s("John Doe"),
            room_number: s("A-101"),
            date: s("2024-03-31"),
            check_in: some("22:00"),
            check_out: some("07:00"),
            status: AttendanceStatus::Present,
            method: Some(CheckMethod::QrCode),
            location: some("Main Gate"),
        },
    ]
}

pub fn requests() -> Vec<HostelRequest> {
    vec![
        HostelRequest {
            id: s("1"),
            student_id: s("ST001"),
            student_name: s("John Doe"),
            room_number: s("A-101"),
            kind: RequestType::Leave,
            title: s("Home Visit - Family Emergency"),
            description: s("Need to visit home due to family emergency. Will be away for 5 days."),
            status: RequestStatus::Pending,
            priority: Priority::High,
            submitted_date: s("2024-04-01"),
            processed_date: None,
            processed_by: None,
            response: None,
            from_date: some("2024-04-05"),
            to_date: some("2024-04-10"),
            reason: some("Family Emergency"),
        },
        HostelRequest {
            id: s("2"),
            student_id: s("ST002"),
            student_name: s("Mike Smith"),
            room_number: s("A-101"),
            kind: RequestType::RoomChange,
            title: s("Room Change Request"),
            description: s("Would like to change to a single room due to study requirements."),
            status: RequestStatus::Approved,
            priority: Priority::Medium,
            submitted_date: s("2024-03-25"),
            processed_date: some("2024-03-28"),
            processed_by: some("Admin"),
            response: some("Approved. Single room A-205 will be allocated."),
            from_date: None,
            to_date: None,
            reason: None,
        },
        HostelRequest {
            id: s("3"),
            student_id: s("ST003"),
            student_name: s("Alice Johnson"),
            room_number: s("B-201"),
            kind: RequestType::Maintenance,
            title: s("AC Not Working"),
            description: s("Air conditioning unit in room B-201 has stopped working."),
            status: RequestStatus::InProgress,
            priority: Priority::Medium,
            submitted_date: s("2024-04-02"),
            processed_date: some("2024-04-02"),
            processed_by: some("Warden"),
            response: some("Maintenance team assigned."),
            from_date: None,
            to_date: None,
            reason: None,
        },
        HostelRequest {
            id: s("4"),
            student_id: s("ST004"),
            student_name: s("David Wilson"),
            room_number: s("C-301"),
            kind: RequestType::Service,
            title: s("Laundry Service Booking"),
            description: s("Request for weekly laundry service pickup."),
            status: RequestStatus::Approved,
            priority: Priority::Low,
            submitted_date: s("2024-03-30"),
            processed_date: some("2024-03-31"),
            processed_by: some("Warden"),
            response: some("Approved. Service will start from Monday."),
            from_date: None,
            to_date: None,
            reason: None,
        },
    ]
}

pub fn assets() -> Vec<Asset> {
    vec![
        Asset {
            id: s("1"),
            name: s("Study Table"),
            category: AssetCategory::Furniture,
            asset_id: s("FUR-001"),
            assigned_to: some("John Doe"),
            room_number: some("A-101"),
            condition: Condition::Good,
            purchase_date: s("2023-01-15"),
            purchase_price: 5000,
            warranty_expiry: None,
            maintenance_schedule: None,
            status: AssetStatus::Assigned,
            description: some("Wooden study table with drawer"),
        },
        Asset {
            id: s("2"),
            name: s("LCD TV 32\""),
            category: AssetCategory::Electronics,
            asset_id: s("ELE-001"),
            assigned_to: None,
            room_number: some("Common Room A"),
            condition: Condition::Excellent,
            purchase_date: s("2023-06-20"),
            purchase_price: 25000,
            warranty_expiry: some("2025-06-20"),
            maintenance_schedule: None,
            status: AssetStatus::Assigned,
            description: some("Samsung 32 inch LED TV for common room"),
        },
        Asset {
            id: s("3"),
            name: s("Air Conditioner"),
            category: AssetCategory::Appliances,
            asset_id: s("APP-001"),
            assigned_to: some("Mike Smith"),
            room_number: some("A-101"),
            condition: Condition::Fair,
            purchase_date: s("2022-03-10"),
            purchase_price: 35000,
            warranty_expiry: some("2025-03-10"),
            maintenance_schedule: some("Quarterly"),
            status: AssetStatus::Maintenance,
            description: some("1.5 ton split AC"),
        },
        Asset {
            id: s("4"),
            name: s("Bed Frame"),
            category: AssetCategory::Furniture,
            asset_id: s("FUR-002"),
            assigned_to: some("Alice Johnson"),
            room_number: some("B-201"),
            condition: Condition::Good,
            purchase_date: s("2023-02-01"),
            purchase_price: 8000,
            warranty_expiry: None,
            maintenance_schedule: None,
            status: AssetStatus::Assigned,
            description: some("Metal bed frame with mattress"),
        },
        Asset {
            id: s("5"),
            name: s("Fire Extinguisher"),
            category: AssetCategory::Safety,
            asset_id: s("SAF-001"),
            assigned_to: None,
            room_number: some("Block A Corridor"),
            condition: Condition::Excellent,
            purchase_date: s("2023-08-15"),
            purchase_price: 2500,
            warranty_expiry: None,
            maintenance_schedule: some("Monthly"),
            status: AssetStatus::Available,
            description: some("ABC type fire extinguisher"),
        },
    ]
}
