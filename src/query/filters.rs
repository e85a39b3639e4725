// Record filtering and pagination over a wholesale record set

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::model::payload::{parse_whole_number, WholeNumber};
use crate::model::Record;

/// Page size bounds applied when a caller omits or oversizes `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryLimits {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    /// Parse raw `limit` / `offset` values. Absent offset is 0; absent limit
    /// is the default page size; limit is capped at the maximum.
    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        bounds: QueryLimits,
    ) -> Result<Self, WorkflowError> {
        let limit = match limit {
            Some(raw) => parse_count("limit", raw)?.min(bounds.max_limit),
            None => bounds.default_limit.min(bounds.max_limit),
        };
        let offset = match offset {
            Some(raw) => parse_count("offset", raw)?,
            None => 0,
        };
        Ok(Self { limit, offset })
    }
}

fn parse_count(field: &str, raw: &str) -> Result<usize, WorkflowError> {
    match parse_whole_number(field, raw)? {
        WholeNumber::NonNegative(value) => Ok(value),
        WholeNumber::Negative => Err(WorkflowError::validation(
            field,
            format!("must not be negative, got {}", raw.trim()),
        )),
    }
}

/// Substring filters; blank filters match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub reference_number: Option<String>,
    pub address: Option<String>,
}

impl RecordFilter {
    pub fn new(reference_number: Option<String>, address: Option<String>) -> Self {
        let keep = |s: Option<String>| s.filter(|s| !s.is_empty());
        Self {
            reference_number: keep(reference_number),
            address: keep(address),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        let reference_ok = self
            .reference_number
            .as_deref()
            .is_none_or(|needle| record.property_reference_number.contains(needle));
        let address_ok = self.address.as_deref().is_none_or(|needle| {
            record.property_address.contains(needle)
                || record.property_chinese_address.contains(needle)
        });
        reference_ok && address_ok
    }
}

/// One page of results plus the number of matches before slicing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub count: usize,
}

pub fn paginate<T>(items: Vec<T>, page: Pagination) -> Page<T> {
    let count = items.len();
    let rows = items
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();
    Page { rows, count }
}

/// Filter then paginate
pub fn find(records: Vec<Record>, filter: &RecordFilter, page: Pagination) -> Page<Record> {
    let matching: Vec<Record> = records.into_iter().filter(|r| filter.matches(r)).collect();
    paginate(matching, page)
}
