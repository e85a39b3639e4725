// Validated inputs for record creation and field update

use serde_json::Value;

use crate::error::WorkflowError;
use crate::model::payload::{validate_record_id, PayloadReader};
use crate::model::{DeedDetails, HeldInfo, IncumbranceDetails, LedgerEntry, PropertyStatus, Record};

/// Descriptive payload of a new land asset
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRecord {
    pub id: String,
    pub status: PropertyStatus,
    pub property_reference_number: String,
    pub property_held_infos: Vec<HeldInfo>,
    pub property_address: String,
    pub property_chinese_address: String,
    pub property_share_of_the_location: String,
    pub property_remarks: Vec<String>,
}

impl CreateRecord {
    pub fn from_payload(payload: &Value) -> Result<Self, WorkflowError> {
        let reader = PayloadReader::new(payload)?;
        let id: String = reader.required("ID")?;
        validate_record_id("ID", &id)?;

        // Entries only ever arrive through submission, so any list sent with a
        // create must be present-and-empty or absent.
        for field in Record::ENTRY_LIST_FIELDS {
            if let Some(entries) = reader.optional::<Vec<Value>>(field)? {
                if !entries.is_empty() {
                    return Err(WorkflowError::validation(
                        field,
                        "must be empty on create; submit entries instead",
                    ));
                }
            }
        }

        Ok(CreateRecord {
            id,
            status: reader.required("propertyStatus")?,
            property_reference_number: reader.required_text("propertyReferenceNumber")?,
            property_held_infos: reader.optional("propertyHeldInfos")?.unwrap_or_default(),
            // descriptive strings may be blank
            property_address: reader.required("propertyAddress")?,
            property_chinese_address: reader.required("propertyChineseAddress")?,
            property_share_of_the_location: reader.required("propertyShareOfTheLocation")?,
            property_remarks: reader.optional("propertyRemarks")?.unwrap_or_default(),
        })
    }
}

/// Partial overlay applied by an update; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub id: String,
    pub status: Option<PropertyStatus>,
    pub property_reference_number: Option<String>,
    pub property_held_infos: Option<Vec<HeldInfo>>,
    pub property_address: Option<String>,
    pub property_chinese_address: Option<String>,
    pub property_share_of_the_location: Option<String>,
    pub property_remarks: Option<Vec<String>>,
    pub transaction_history: Option<Vec<LedgerEntry<DeedDetails>>>,
    pub deeds_pending_registration: Option<Vec<LedgerEntry<DeedDetails>>>,
    pub deeds_pending_registration_rejected: Option<Vec<LedgerEntry<DeedDetails>>>,
    pub incumbrance_history: Option<Vec<LedgerEntry<IncumbranceDetails>>>,
    pub incumbrance_pending_registration: Option<Vec<LedgerEntry<IncumbranceDetails>>>,
    pub incumbrance_pending_registration_rejected: Option<Vec<LedgerEntry<IncumbranceDetails>>>,
}

impl RecordPatch {
    pub fn from_payload(payload: &Value) -> Result<Self, WorkflowError> {
        let reader = PayloadReader::new(payload)?;
        Ok(RecordPatch {
            id: reader.required("ID")?,
            status: reader.optional("propertyStatus")?,
            property_reference_number: reader.optional("propertyReferenceNumber")?,
            property_held_infos: reader.optional("propertyHeldInfos")?,
            property_address: reader.optional("propertyAddress")?,
            property_chinese_address: reader.optional("propertyChineseAddress")?,
            property_share_of_the_location: reader.optional("propertyShareOfTheLocation")?,
            property_remarks: reader.optional("propertyRemarks")?,
            transaction_history: reader.optional("transactionHistory")?,
            deeds_pending_registration: reader.optional("deedsPendingRegistration")?,
            deeds_pending_registration_rejected: reader
                .optional("deedsPendingRegistrationRejected")?,
            incumbrance_history: reader.optional("incumbranceHistory")?,
            incumbrance_pending_registration: reader.optional("incumbrancePendingRegistration")?,
            incumbrance_pending_registration_rejected: reader
                .optional("incumbrancePendingRegistrationRejected")?,
        })
    }

    pub(crate) fn apply_to(&self, record: &mut Record) {
        fn overlay<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }

        overlay(&mut record.status, &self.status);
        overlay(&mut record.property_reference_number, &self.property_reference_number);
        overlay(&mut record.property_held_infos, &self.property_held_infos);
        overlay(&mut record.property_address, &self.property_address);
        overlay(&mut record.property_chinese_address, &self.property_chinese_address);
        overlay(
            &mut record.property_share_of_the_location,
            &self.property_share_of_the_location,
        );
        overlay(&mut record.property_remarks, &self.property_remarks);
        overlay(&mut record.transaction_history, &self.transaction_history);
        overlay(&mut record.deeds_pending_registration, &self.deeds_pending_registration);
        overlay(
            &mut record.deeds_pending_registration_rejected,
            &self.deeds_pending_registration_rejected,
        );
        overlay(&mut record.incumbrance_history, &self.incumbrance_history);
        overlay(
            &mut record.incumbrance_pending_registration,
            &self.incumbrance_pending_registration,
        );
        overlay(
            &mut record.incumbrance_pending_registration_rejected,
            &self.incumbrance_pending_registration_rejected,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_payload() -> Value {
        json!({
            "ID": "asset6",
            "propertyStatus": "Develop",
            "propertyReferenceNumber": "PRN0006",
            "propertyHeldInfos": [{
                "locationNumber": "INLAND LOT NO. 8888",
                "heldUnder": "GOVERNMENT LEASE",
                "leaseTerm": "999 YEARS",
                "commencementOfLeaseTerm": "1843/06/26",
                "rentPerAnnum": "$38.00"
            }],
            "propertyAddress": "1 QUEEN'S ROAD CENTRAL",
            "propertyChineseAddress": "皇后大道中1號",
            "propertyShareOfTheLocation": "1/1",
            "propertyRemarks": []
        })
    }

    #[test]
    fn create_payload_is_read_field_by_field() {
        let cmd = CreateRecord::from_payload(&create_payload()).unwrap();
        assert_eq!(cmd.id, "asset6");
        assert_eq!(cmd.status, PropertyStatus::Develop);
        assert_eq!(cmd.property_held_infos[0].lease_term, "999 YEARS");
    }

    #[test]
    fn descriptive_strings_may_be_blank_but_not_absent() {
        let mut payload = create_payload();
        for field in [
            "propertyAddress",
            "propertyChineseAddress",
            "propertyShareOfTheLocation",
        ] {
            payload[field] = json!("");
        }
        let cmd = CreateRecord::from_payload(&payload).unwrap();
        assert_eq!(cmd.property_address, "");
        assert_eq!(cmd.property_chinese_address, "");
        assert_eq!(cmd.property_share_of_the_location, "");

        for field in [
            "propertyAddress",
            "propertyChineseAddress",
            "propertyShareOfTheLocation",
        ] {
            let mut payload = create_payload();
            payload.as_object_mut().unwrap().remove(field);
            assert!(matches!(
                CreateRecord::from_payload(&payload),
                Err(WorkflowError::Validation { field: got, .. }) if got == field
            ));
        }

        let mut payload = create_payload();
        payload["propertyReferenceNumber"] = json!("  ");
        assert!(CreateRecord::from_payload(&payload).is_err());
    }

    #[test]
    fn create_rejects_status_outside_enumeration() {
        let mut payload = create_payload();
        payload["propertyStatus"] = json!("Demolished");
        assert!(matches!(
            CreateRecord::from_payload(&payload),
            Err(WorkflowError::Validation { field, .. }) if field == "propertyStatus"
        ));
    }

    #[test]
    fn create_rejects_non_array_and_non_empty_lists() {
        let mut payload = create_payload();
        payload["transactionHistory"] = json!("nope");
        assert!(CreateRecord::from_payload(&payload).is_err());

        let mut payload = create_payload();
        payload["deedsPendingRegistration"] = json!([{"memorialNumber": "X"}]);
        assert!(matches!(
            CreateRecord::from_payload(&payload),
            Err(WorkflowError::Validation { field, .. }) if field == "deedsPendingRegistration"
        ));

        let mut payload = create_payload();
        payload["incumbranceHistory"] = json!([]);
        assert!(CreateRecord::from_payload(&payload).is_ok());
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let patch = RecordPatch::from_payload(&json!({
            "ID": "asset1",
            "propertyStatus": "InMarket"
        }))
        .unwrap();
        assert_eq!(patch.status, Some(PropertyStatus::InMarket));
        assert!(patch.property_address.is_none());
        assert!(patch.transaction_history.is_none());
    }

    #[test]
    fn patch_requires_payload_identifier() {
        assert!(matches!(
            RecordPatch::from_payload(&json!({"propertyStatus": "InMarket"})),
            Err(WorkflowError::Validation { field, .. }) if field == "ID"
        ));
    }
}
