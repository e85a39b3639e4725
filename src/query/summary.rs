// Dashboard summary over the wholesale record set

use serde::Serialize;

use crate::model::{PropertyStatus, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    #[serde(rename = "Develop")]
    pub develop: usize,
    #[serde(rename = "InMarket")]
    pub in_market: usize,
    #[serde(rename = "Recycled")]
    pub recycled: usize,
}

/// Number of records with at least one pending entry per category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PendingCounts {
    pub deeds: usize,
    pub incumbrance: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_assets: usize,
    pub property_status: StatusCounts,
    pub pending_events: PendingCounts,
}

impl Summary {
    pub fn from_records(records: &[Record]) -> Self {
        records.iter().fold(Summary::default(), |mut summary, record| {
            match record.status {
                PropertyStatus::Develop => summary.property_status.develop += 1,
                PropertyStatus::InMarket => summary.property_status.in_market += 1,
                PropertyStatus::Recycled => summary.property_status.recycled += 1,
            }
            if record.has_pending_deeds() {
                summary.pending_events.deeds += 1;
            }
            if record.has_pending_incumbrances() {
                summary.pending_events.incumbrance += 1;
            }
            summary.total_assets += 1;
            summary
        })
    }
}
