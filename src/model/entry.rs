// Pending entries - deeds and incumbrances moving through registration

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::model::identity::Caller;
use crate::model::payload::PayloadReader;
use crate::model::record::Record;

/// Selects which triplet of lists a pending operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Deed,
    Incumbrance,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Deed => "deed",
            Category::Incumbrance => "incumbrance",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deed" | "deeds" | "transaction" => Ok(Category::Deed),
            "incumbrance" | "incumbrances" => Ok(Category::Incumbrance),
            other => Err(WorkflowError::validation(
                "category",
                format!("unknown category `{other}`, expected deed or incumbrance"),
            )),
        }
    }
}

/// Outcome of a registrar's decision on a pending entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Approve,
    Reject,
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Approve => f.write_str("approve"),
            Resolution::Reject => f.write_str("reject"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    #[serde(default)]
    pub name_of_owner: String,
    #[serde(default)]
    pub capacity: String,
}

/// Owners are recorded either as a bare name or with their capacity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Named(String),
    Detailed(OwnerInfo),
}

impl OwnerRef {
    pub fn name(&self) -> &str {
        match self {
            OwnerRef::Named(name) => name,
            OwnerRef::Detailed(info) => &info.name_of_owner,
        }
    }
}

/// Party an incumbrance is registered in favour of
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Beneficiary {
    Named(String),
    Owners(Vec<OwnerRef>),
}

impl Beneficiary {
    fn is_blank(&self) -> bool {
        match self {
            Beneficiary::Named(name) => name.trim().is_empty(),
            Beneficiary::Owners(owners) => owners.is_empty(),
        }
    }
}

/// Ownership-transfer deed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeedDetails {
    #[serde(default)]
    pub owners: Vec<OwnerRef>,
    #[serde(default)]
    pub memorial_number: String,
    #[serde(default)]
    pub date_of_instrument: String,
    #[serde(default)]
    pub date_of_registration: String,
    #[serde(default)]
    pub consideration: String,
    #[serde(default)]
    pub remarks: String,
}

/// Mortgage, charge or other registered incumbrance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncumbranceDetails {
    #[serde(default)]
    pub memorial_number: String,
    #[serde(default)]
    pub date_of_instrument: String,
    #[serde(default)]
    pub date_of_registration: String,
    #[serde(default)]
    pub nature_of_incumbrances: String,
    #[serde(default = "Beneficiary::unnamed")]
    pub in_favour_of: Beneficiary,
    #[serde(default)]
    pub consideration: String,
    #[serde(default)]
    pub remarks: String,
}

impl Beneficiary {
    fn unnamed() -> Self {
        Beneficiary::Named(String::new())
    }
}

/// An entry in one of a record's lists plus its workflow metadata.
///
/// Entries imported with a record may lack submission metadata; entries
/// submitted through the workflow always carry `entry_id`, `submitted_at`
/// and `submitted_by`, and gain exactly one resolution pair when resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<Uuid>,
    #[serde(flatten)]
    pub details: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_by: Option<String>,
}

impl<T> LedgerEntry<T> {
    /// Wrap freshly validated details as a new submission
    pub fn submitted(details: T, caller: &Caller, now: DateTime<Utc>) -> Self {
        Self {
            entry_id: Some(Uuid::new_v4()),
            details,
            submitted_at: Some(now),
            submitted_by: Some(caller.to_string()),
            approved_at: None,
            approved_by: None,
            rejected_at: None,
            rejected_by: None,
        }
    }

    pub fn resolution(&self) -> Option<Resolution> {
        if self.approved_at.is_some() {
            Some(Resolution::Approve)
        } else if self.rejected_at.is_some() {
            Some(Resolution::Reject)
        } else {
            None
        }
    }

    /// Stamp the decision; submission metadata is left as it was
    pub(crate) fn resolve(&mut self, resolution: Resolution, caller: &Caller, now: DateTime<Utc>) {
        match resolution {
            Resolution::Approve => {
                self.approved_at = Some(now);
                self.approved_by = Some(caller.to_string());
            }
            Resolution::Reject => {
                self.rejected_at = Some(now);
                self.rejected_by = Some(caller.to_string());
            }
        }
    }
}

/// Mutable view of one category's history / pending / rejected lists
pub struct EntryLists<'a, T> {
    pub history: &'a mut Vec<LedgerEntry<T>>,
    pub pending: &'a mut Vec<LedgerEntry<T>>,
    pub rejected: &'a mut Vec<LedgerEntry<T>>,
}

impl<T> EntryLists<'_, T> {
    pub fn destination(&mut self, resolution: Resolution) -> &mut Vec<LedgerEntry<T>> {
        match resolution {
            Resolution::Approve => &mut *self.history,
            Resolution::Reject => &mut *self.rejected,
        }
    }
}

/// Business payload of a pending entry, tied to the lists of its category
pub trait EntryDetails: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    const CATEGORY: Category;

    /// Validate a submission payload against the category's required fields
    fn from_payload(payload: &serde_json::Value) -> Result<Self, WorkflowError>;

    fn lists(record: &mut Record) -> EntryLists<'_, Self>;

    fn pending(record: &Record) -> &[LedgerEntry<Self>];
}

impl EntryDetails for DeedDetails {
    const CATEGORY: Category = Category::Deed;

    fn from_payload(payload: &serde_json::Value) -> Result<Self, WorkflowError> {
        let reader = PayloadReader::new(payload)?;
        let owners: Vec<OwnerRef> = reader.required("owners")?;
        if owners.is_empty() {
            return Err(WorkflowError::validation("owners", "at least one owner is required"));
        }
        Ok(DeedDetails {
            owners,
            memorial_number: reader.required_text("memorialNumber")?,
            date_of_instrument: reader.required_text("dateOfInstrument")?,
            date_of_registration: reader.required_text("dateOfRegistration")?,
            consideration: reader.required_text("consideration")?,
            remarks: reader.required_text("remarks")?,
        })
    }

    fn lists(record: &mut Record) -> EntryLists<'_, Self> {
        EntryLists {
            history: &mut record.transaction_history,
            pending: &mut record.deeds_pending_registration,
            rejected: &mut record.deeds_pending_registration_rejected,
        }
    }

    fn pending(record: &Record) -> &[LedgerEntry<Self>] {
        &record.deeds_pending_registration
    }
}

impl EntryDetails for IncumbranceDetails {
    const CATEGORY: Category = Category::Incumbrance;

    fn from_payload(payload: &serde_json::Value) -> Result<Self, WorkflowError> {
        let reader = PayloadReader::new(payload)?;
        let in_favour_of: Beneficiary = reader.required("inFavourOf")?;
        if in_favour_of.is_blank() {
            return Err(WorkflowError::validation("inFavourOf", "must name at least one party"));
        }
        Ok(IncumbranceDetails {
            memorial_number: reader.required_text("memorialNumber")?,
            date_of_instrument: reader.required_text("dateOfInstrument")?,
            date_of_registration: reader.required_text("dateOfRegistration")?,
            nature_of_incumbrances: reader.required_text("natureOfIncumbrances")?,
            in_favour_of,
            consideration: reader.required_text("consideration")?,
            remarks: reader.required_text("remarks")?,
        })
    }

    fn lists(record: &mut Record) -> EntryLists<'_, Self> {
        EntryLists {
            history: &mut record.incumbrance_history,
            pending: &mut record.incumbrance_pending_registration,
            rejected: &mut record.incumbrance_pending_registration_rejected,
        }
    }

    fn pending(record: &Record) -> &[LedgerEntry<Self>] {
        &record.incumbrance_pending_registration
    }
}
