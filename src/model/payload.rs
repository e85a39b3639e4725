// Field-level reading of caller-supplied JSON payloads

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::WorkflowError;

static RECORD_ID: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,127}$").expect("record id pattern is valid")
});

static WHOLE_NUMBER: std::sync::LazyLock<Regex> = std::sync::LazyLock::new(|| {
    Regex::new(r"^([+-]?)([0-9]+)$").expect("whole number pattern is valid")
});

/// A caller-supplied whole number. Values too large for `usize` saturate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WholeNumber {
    Negative,
    NonNegative(usize),
}

/// Parse an optionally signed run of digits without a width limit
pub fn parse_whole_number(field: &str, raw: &str) -> Result<WholeNumber, WorkflowError> {
    let caps = WHOLE_NUMBER
        .captures(raw.trim())
        .ok_or_else(|| WorkflowError::validation(field, format!("`{raw}` is not an integer")))?;
    let digits = caps.get(2).map_or("", |m| m.as_str()).trim_start_matches('0');
    if digits.is_empty() {
        return Ok(WholeNumber::NonNegative(0));
    }
    if caps.get(1).is_some_and(|m| m.as_str() == "-") {
        return Ok(WholeNumber::Negative);
    }
    Ok(WholeNumber::NonNegative(digits.parse().unwrap_or(usize::MAX)))
}

/// Check a record identifier before it is used as a ledger key
pub fn validate_record_id(field: &str, id: &str) -> Result<(), WorkflowError> {
    if RECORD_ID.is_match(id) {
        Ok(())
    } else {
        Err(WorkflowError::validation(
            field,
            format!("`{id}` is not a valid identifier (letters, digits, '.', '_' or '-')"),
        ))
    }
}

/// Reads payload fields one at a time so that every failure names its field
pub struct PayloadReader<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a Value) -> Result<Self, WorkflowError> {
        payload
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| WorkflowError::validation("body", "payload must be a JSON object"))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.get(field).is_some_and(|v| !v.is_null())
    }

    pub fn required<T: DeserializeOwned>(&self, field: &str) -> Result<T, WorkflowError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(WorkflowError::validation(field, "field is required")),
            Some(value) => decode(field, value),
        }
    }

    pub fn optional<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, WorkflowError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => decode(field, value).map(Some),
        }
    }

    /// A required string that is not blank
    pub fn required_text(&self, field: &str) -> Result<String, WorkflowError> {
        let text: String = self.required(field)?;
        if text.trim().is_empty() {
            return Err(WorkflowError::validation(field, "must not be empty"));
        }
        Ok(text)
    }
}

fn decode<T: DeserializeOwned>(field: &str, value: &Value) -> Result<T, WorkflowError> {
    T::deserialize(value).map_err(|e| WorkflowError::validation(field, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn whole_numbers_saturate_instead_of_failing() {
        assert_eq!(parse_whole_number("n", " 42 ").unwrap(), WholeNumber::NonNegative(42));
        assert_eq!(parse_whole_number("n", "-0").unwrap(), WholeNumber::NonNegative(0));
        assert_eq!(parse_whole_number("n", "-7").unwrap(), WholeNumber::Negative);
        assert_eq!(
            parse_whole_number("n", "99999999999999999999").unwrap(),
            WholeNumber::NonNegative(usize::MAX)
        );
        assert_eq!(
            parse_whole_number("n", "-99999999999999999999").unwrap(),
            WholeNumber::Negative
        );
        for raw in ["", "1.5", "ten", "--1", "1e3"] {
            assert!(parse_whole_number("n", raw).is_err(), "{raw:?} should be rejected");
        }
    }

    #[test]
    fn non_object_payload_is_rejected() {
        assert!(PayloadReader::new(&json!([1, 2])).is_err());
    }

    #[test]
    fn type_errors_name_the_field() {
        let payload = json!({"propertyRemarks": "not a list"});
        let reader = PayloadReader::new(&payload).unwrap();
        let err = reader.optional::<Vec<String>>("propertyRemarks").unwrap_err();
        assert!(matches!(err, WorkflowError::Validation { ref field, .. } if field == "propertyRemarks"));
    }

    #[test]
    fn null_counts_as_absent() {
        let payload = json!({"remarks": null});
        let reader = PayloadReader::new(&payload).unwrap();
        assert!(!reader.contains("remarks"));
        assert_eq!(reader.optional::<String>("remarks").unwrap(), None);
        assert!(reader.required_text("remarks").is_err());
    }

    #[test]
    fn record_ids_are_restricted() {
        assert!(validate_record_id("ID", "asset1").is_ok());
        assert!(validate_record_id("ID", "PRN-0001.a_b").is_ok());
        assert!(validate_record_id("ID", "").is_err());
        assert!(validate_record_id("ID", "has space").is_err());
        assert!(validate_record_id("ID", "../etc").is_err());
    }
}
