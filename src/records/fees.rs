use super::{contains_ci, transition, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::{self, CsvRow};
use crate::scope::{self, Scoped};
use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum FeeStatus {
        Paid => "Paid",
        Pending => "Pending",
        Overdue => "Overdue",
        Partial => "Partial",
    }
}

labeled_enum! {
    pub enum FeeType {
        Monthly => "Monthly",
        Semester => "Semester",
        Annual => "Annual",
        SecurityDeposit => "Security Deposit",
        Mess => "Mess",
    }
}

labeled_enum! {
    pub enum PaymentMethod {
        Online => "Online",
        Cash => "Cash",
        Cheque => "Cheque",
        Upi => "UPI",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub room_number: String,
    pub fee_type: FeeType,
    pub amount: u64,
    pub due_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
    pub status: FeeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<u64>,
}

impl Record for Fee {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for Fee {
    fn owned_by(&self, full_name: &str) -> bool {
        self.student_name == full_name
    }

    fn location(&self) -> Option<&str> {
        Some(self.room_number.as_str()).filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeeFilter {
    pub search: String,
    pub status: Option<FeeStatus>,
    pub fee_type: Option<FeeType>,
}

impl FeeFilter {
    pub fn matches(&self, fee: &Fee) -> bool {
        (contains_ci(&fee.student_name, &self.search) || contains_ci(&fee.room_number, &self.search))
            && self.status.map_or(true, |s| fee.status == s)
            && self.fee_type.map_or(true, |t| fee.fee_type == t)
    }
}

/// Amount owed including any penalty.
pub fn total_due(fee: &Fee) -> u64 {
    fee.amount.saturating_add(fee.penalty.unwrap_or(0))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeStats {
    pub total: u64,
    pub paid: u64,
    pub pending: u64,
    pub overdue: usize,
}

pub fn stats(fees: &[Fee]) -> FeeStats {
    let mut out = FeeStats::default();
    for fee in fees {
        out.total = out.total.saturating_add(total_due(fee));
        match fee.status {
            FeeStatus::Paid => out.paid = out.paid.saturating_add(fee.amount),
            FeeStatus::Pending => out.pending = out.pending.saturating_add(total_due(fee)),
            FeeStatus::Overdue => out.overdue += 1,
            FeeStatus::Partial => {}
        }
    }
    out
}

/// Student pays an outstanding fee by UPI. Already paid fees are left alone.
pub fn pay(
    fees: &RecordSet<Fee>,
    actor: &Actor<'_>,
    fee_id: &str,
) -> Result<RecordSet<Fee>, TransitionError> {
    let paid_date = actor.today_str();
    let transaction_id = format!("TXN{}", actor.at.timestamp_millis());
    transition(fees, actor, Action::PayFee, fee_id, |fee| {
        if fee.status == FeeStatus::Paid {
            return None;
        }
        Some(Fee {
            status: FeeStatus::Paid,
            paid_date: Some(paid_date),
            payment_method: Some(PaymentMethod::Upi),
            transaction_id: Some(transaction_id),
            ..fee.clone()
        })
    })
}

/// New penalty total, `None` when it would overflow together with the amount.
fn penalized(fee: &Fee, amount: u64) -> Option<u64> {
    let penalty = fee.penalty.unwrap_or(0).checked_add(amount)?;
    fee.amount.checked_add(penalty)?;
    Some(penalty)
}

/// Marks an unpaid fee overdue and adds `amount` to its penalty.
pub fn apply_penalty(
    fees: &RecordSet<Fee>,
    actor: &Actor<'_>,
    fee_id: &str,
    amount: u64,
) -> Result<RecordSet<Fee>, TransitionError> {
    if amount == 0 {
        return Err(TransitionError::InvalidInput(
            "penalty must be positive".to_string(),
        ));
    }
    actor.require(Action::PenalizeFee)?;
    if let Some(fee) = fees.get(fee_id).filter(|f| scope::is_visible(*f, actor.user)) {
        if fee.status != FeeStatus::Paid && penalized(fee, amount).is_none() {
            return Err(TransitionError::InvalidInput(format!(
                "penalty on fee {} exceeds the representable amount",
                fee.id
            )));
        }
    }
    transition(fees, actor, Action::PenalizeFee, fee_id, |fee| {
        if fee.status == FeeStatus::Paid {
            return None;
        }
        Some(Fee {
            status: FeeStatus::Overdue,
            penalty: Some(penalized(fee, amount)?),
            ..fee.clone()
        })
    })
}

impl CsvRow for Fee {
    const HEADERS: &'static [&'static str] = &[
        "Student Name",
        "Room",
        "Fee Type",
        "Amount",
        "Due Date",
        "Status",
        "Payment Method",
        "Transaction ID",
    ];
    const FILE_NAME: &'static str = "fees.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.student_name.clone(),
            self.room_number.clone(),
            self.fee_type.to_string(),
            self.amount.to_string(),
            self.due_date.clone(),
            self.status.to_string(),
            self.payment_method.map(|m| m.to_string()).unwrap_or_default(),
            csv::opt(&self.transaction_id),
        ]
    }
}
