use super::{contains_ci, remove_visible, transition, Actor, Record, RecordSet, TransitionError};
use crate::auth::Action;
use crate::csv::{self, CsvRow};
use crate::scope::Scoped;
use serde::{Deserialize, Serialize};

labeled_enum! {
    pub enum AssetStatus {
        Available => "Available",
        Assigned => "Assigned",
        Maintenance => "Maintenance",
        Disposed => "Disposed",
    }
}

labeled_enum! {
    pub enum AssetCategory {
        Furniture => "Furniture",
        Electronics => "Electronics",
        Appliances => "Appliances",
        Infrastructure => "Infrastructure",
        Safety => "Safety",
        Other => "Other",
    }
}

labeled_enum! {
    pub enum Condition {
        Excellent => "Excellent",
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
        Damaged => "Damaged",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    pub asset_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room_number: Option<String>,
    pub condition: Condition,
    pub purchase_date: String,
    pub purchase_price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty_expiry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance_schedule: Option<String>,
    pub status: AssetStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Record for Asset {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Scoped for Asset {
    fn owned_by(&self, full_name: &str) -> bool {
        self.assigned_to.as_deref() == Some(full_name)
    }

    fn location(&self) -> Option<&str> {
        self.room_number.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub search: String,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub condition: Option<Condition>,
}

impl AssetFilter {
    pub fn matches(&self, a: &Asset) -> bool {
        (contains_ci(&a.name, &self.search)
            || contains_ci(&a.asset_id, &self.search)
            || a.assigned_to
                .as_deref()
                .is_some_and(|s| contains_ci(s, &self.search)))
            && self.category.map_or(true, |c| a.category == c)
            && self.status.map_or(true, |s| a.status == s)
            && self.condition.map_or(true, |c| a.condition == c)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStats {
    pub total: usize,
    pub assigned: usize,
    pub available: usize,
    pub maintenance: usize,
    pub total_value: u64,
}

pub fn stats(assets: &[Asset]) -> AssetStats {
    let count = |s: AssetStatus| assets.iter().filter(|a| a.status == s).count();
    AssetStats {
        total: assets.len(),
        assigned: count(AssetStatus::Assigned),
        available: count(AssetStatus::Available),
        maintenance: count(AssetStatus::Maintenance),
        total_value: assets.iter().map(|a| a.purchase_price).sum(),
    }
}

/// A student flags one of their assigned assets for maintenance.
pub fn request_maintenance(
    assets: &RecordSet<Asset>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<Asset>, TransitionError> {
    transition(assets, actor, Action::RequestAssetMaintenance, id, |a| {
        (a.status == AssetStatus::Assigned).then(|| Asset {
            status: AssetStatus::Maintenance,
            ..a.clone()
        })
    })
}

pub fn remove(
    assets: &RecordSet<Asset>,
    actor: &Actor<'_>,
    id: &str,
) -> Result<RecordSet<Asset>, TransitionError> {
    remove_visible(assets, actor, Action::RemoveAsset, id)
}

impl CsvRow for Asset {
    const HEADERS: &'static [&'static str] = &[
        "Asset ID",
        "Name",
        "Category",
        "Assigned To",
        "Room",
        "Condition",
        "Status",
        "Purchase Date",
        "Price",
    ];
    const FILE_NAME: &'static str = "assets.csv";

    fn cells(&self) -> Vec<String> {
        vec![
            self.asset_id.clone(),
            self.name.clone(),
            self.category.to_string(),
            csv::opt(&self.assigned_to),
            csv::opt(&self.room_number),
            self.condition.to_string(),
            self.status.to_string(),
            self.purchase_date.clone(),
            self.purchase_price.to_string(),
        ]
    }
}
