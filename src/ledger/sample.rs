// Sample land assets written by `seed`

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

fn lease(location: &str, rent: &str) -> Value {
    json!({
        "locationNumber": location,
        "heldUnder": "GOVERNMENT LEASE",
        "leaseTerm": "999 YEARS",
        "commencementOfLeaseTerm": "15/05/1855",
        "rentPerAnnum": rent
    })
}

/// The five imported assets, keyed by identifier, as raw ledger documents
pub fn sample_documents(now: DateTime<Utc>) -> Vec<(String, Value)> {
    let stamp = now.to_rfc3339();
    let asset = |id: &str, reference: &str, status: &str, share: &str, leases: Vec<Value>, address: &str, chinese: &str| {
        json!({
            "ID": id,
            "version": 0,
            "createdMethod": "Import",
            "createdAt": stamp,
            "updatedAt": stamp,
            "propertyStatus": status,
            "propertyReferenceNumber": reference,
            "propertyHeldInfos": leases,
            "propertyAddress": address,
            "propertyChineseAddress": chinese,
            "propertyShareOfTheLocation": share,
            "propertyRemarks": [],
            "transactionHistory": [],
            "deedsPendingRegistration": [],
            "deedsPendingRegistrationRejected": [],
            "incumbranceHistory": [],
            "incumbrancePendingRegistration": [],
            "incumbrancePendingRegistrationRejected": []
        })
    };

    vec![
        asset(
            "asset1",
            "PRN0001",
            "Develop",
            "4/ 200",
            vec![],
            "FLAT A, 12/F, 8 WYNDHAM STREET, CENTRAL",
            "中環雲咸街8號12樓A室",
        ),
        asset(
            "asset2",
            "PRN0002",
            "Develop",
            "",
            vec![lease(" LOT NO. 412", "N/A")],
            "SHOP 3, G/F, 22 DES VOEUX ROAD CENTRAL",
            "德輔道中22號地下3號舖",
        ),
        asset(
            "asset3",
            "PRN0003",
            "Develop",
            "",
            vec![lease(" LOT NO. 412", "N/A"), lease(" LOT NO. 412", "$1,000")],
            "5 HOI WAN STREET, QUARRY BAY",
            "鰂魚涌海灣街5號",
        ),
        asset(
            "asset4",
            "PRN0004",
            "InMarket",
            "1/ 48",
            vec![lease("KOWLOON INLAND LOT NO. 1106", "$200")],
            "18 NATHAN ROAD, TSIM SHA TSUI",
            "尖沙咀彌敦道18號",
        ),
        asset(
            "asset5",
            "PRN0005",
            "InMarket",
            "1/ 1",
            vec![lease("RURAL BUILDING LOT NO. 601", "N/A")],
            "3 REPULSE BAY ROAD",
            "淺水灣道3號",
        ),
    ]
    .into_iter()
    .map(|doc| {
        let id = doc["ID"].as_str().unwrap_or_default().to_string();
        (id, doc)
    })
    .collect()
}
