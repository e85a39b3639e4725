use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::entry::{DeedDetails, IncumbranceDetails, LedgerEntry};

/// Market status of a land asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyStatus {
    Develop,
    InMarket,
    Recycled,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 3] = [
        PropertyStatus::Develop,
        PropertyStatus::InMarket,
        PropertyStatus::Recycled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Develop => "Develop",
            PropertyStatus::InMarket => "InMarket",
            PropertyStatus::Recycled => "Recycled",
        }
    }
}

impl std::fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a record entered the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreatedMethod {
    /// Created through the registry workflow
    Add,
    /// Seeded or migrated from an existing register
    #[default]
    Import,
}

/// A lot held under a government lease
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldInfo {
    #[serde(default)]
    pub location_number: String,
    #[serde(default)]
    pub held_under: String,
    #[serde(default)]
    pub lease_term: String,
    #[serde(default)]
    pub commencement_of_lease_term: String,
    #[serde(default)]
    pub rent_per_annum: String,
}

/// The versioned land-asset document as stored on the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub created_method: CreatedMethod,
    #[serde(rename = "propertyStatus")]
    pub status: PropertyStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    // land department particulars
    #[serde(default)]
    pub property_reference_number: String,
    #[serde(default)]
    pub property_held_infos: Vec<HeldInfo>,
    #[serde(default)]
    pub property_address: String,
    #[serde(default)]
    pub property_chinese_address: String,
    #[serde(default)]
    pub property_share_of_the_location: String,
    #[serde(default)]
    pub property_remarks: Vec<String>,

    // ownership transfers
    #[serde(default)]
    pub transaction_history: Vec<LedgerEntry<DeedDetails>>,
    #[serde(default)]
    pub deeds_pending_registration: Vec<LedgerEntry<DeedDetails>>,
    #[serde(default)]
    pub deeds_pending_registration_rejected: Vec<LedgerEntry<DeedDetails>>,

    // incumbrances
    #[serde(default)]
    pub incumbrance_history: Vec<LedgerEntry<IncumbranceDetails>>,
    #[serde(default)]
    pub incumbrance_pending_registration: Vec<LedgerEntry<IncumbranceDetails>>,
    #[serde(default)]
    pub incumbrance_pending_registration_rejected: Vec<LedgerEntry<IncumbranceDetails>>,

    /// Ledger fields this struct does not model, carried through rewrites untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Ledger field names of the six entry lists
    pub const ENTRY_LIST_FIELDS: [&'static str; 6] = [
        "transactionHistory",
        "deedsPendingRegistration",
        "deedsPendingRegistrationRejected",
        "incumbranceHistory",
        "incumbrancePendingRegistration",
        "incumbrancePendingRegistrationRejected",
    ];

    pub fn has_pending_deeds(&self) -> bool {
        !self.deeds_pending_registration.is_empty()
    }

    pub fn has_pending_incumbrances(&self) -> bool {
        !self.incumbrance_pending_registration.is_empty()
    }

    /// True when none of the six entry lists hold anything
    pub fn entry_lists_empty(&self) -> bool {
        self.transaction_history.is_empty()
            && self.deeds_pending_registration.is_empty()
            && self.deeds_pending_registration_rejected.is_empty()
            && self.incumbrance_history.is_empty()
            && self.incumbrance_pending_registration.is_empty()
            && self.incumbrance_pending_registration_rejected.is_empty()
    }

    /// Advance the optimistic version and refresh the modification time
    pub(crate) fn bump(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}
