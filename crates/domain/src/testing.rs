//! Test fixtures shared across crates (feature `test-utils`)
//!
//! Bodies produced here pass [`SubmissionPayload::validate`] unless the caller
//! passes an invalid charge reference.
//!
//! [`SubmissionPayload::validate`]: crate::types::wire::SubmissionPayload::validate

use serde_json::{json, Value};

use crate::types::Declaration;

/// Charge reference used by the default fixtures.
pub const SAMPLE_CHARGE_REFERENCE: &str = "XJPR5768524625";

/// A complete `simpleDeclarationRequest` body for the given charge reference.
pub fn sample_submission_body(charge_reference: &str) -> Value {
    json!({
        "simpleDeclarationRequest": {
            "requestCommon": {
                "receiptDate": "2024-10-21T07:28:00Z",
                "acknowledgementReference": format!("{charge_reference}0"),
                "requestParameters": [
                    { "paramName": "REGIME", "paramValue": "PNGR" }
                ]
            },
            "requestDetail": {
                "declarationHeader": {
                    "chargeReference": charge_reference,
                    "portOfEntry": "LHR",
                    "portOfEntryName": "Heathrow Airport",
                    "expectedDateOfArrival": "2024-10-23",
                    "timeOfEntry": "16:45",
                    "messageTypes": { "messageType": "DeclarationCreate" },
                    "travellingFrom": "NON_EU Only",
                    "onwardTravelGBNI": "GB",
                    "uccRelief": false,
                    "ukVATPaid": false,
                    "ukExciseDutyPaid": false
                },
                "customerReference": {
                    "idType": "passport",
                    "idValue": "SX12345",
                    "ukResident": false
                },
                "personalDetails": { "firstName": "Harry", "lastName": "Potter" },
                "contactDetails": { "emailAddress": "harry@example.com" },
                "declarationTobacco": {
                    "totalExciseTobacco": "100.54",
                    "totalCustomsTobacco": "192.94",
                    "totalVATTobacco": "149.92",
                    "declarationItemTobacco": [{
                        "commodityDescription": "Cigarettes",
                        "quantity": "250",
                        "goodsValue": "400.00",
                        "valueCurrency": "USD",
                        "originCountry": "US",
                        "exchangeRate": "1.20",
                        "exchangeRateDate": "2024-10-21",
                        "goodsValueGBP": "304.11",
                        "customsGBP": "74.00",
                        "vatGBP": "79.06",
                        "exciseGBP": "91.23"
                    }]
                },
                "liabilityDetails": {
                    "totalExciseGBP": "100.54",
                    "totalCustomsGBP": "192.94",
                    "totalVATGBP": "149.92",
                    "grandTotalGBP": "443.40"
                }
            }
        }
    })
}

/// An amendment body: the sample body with the amend message type and
/// amendment liabilities.
pub fn sample_amendment_body(charge_reference: &str) -> Value {
    let mut body = sample_submission_body(charge_reference);
    let detail = &mut body["simpleDeclarationRequest"]["requestDetail"];
    detail["declarationHeader"]["messageTypes"]["messageType"] = json!("DeclarationAmend");
    detail["amendmentLiabilityDetails"] = json!({
        "additionalExciseGBP": "ignored",
        "totalExciseGBP": "10.00",
        "totalCustomsGBP": "0.00",
        "totalVATGBP": "2.00",
        "grandTotalGBP": "12.00"
    });
    body
}

/// A primary declaration with a valid body.
pub fn sample_declaration(correlation_id: &str) -> Declaration {
    Declaration::new(
        SAMPLE_CHARGE_REFERENCE,
        correlation_id,
        sample_submission_body(SAMPLE_CHARGE_REFERENCE),
    )
}

/// A declaration carrying both a primary body and an amendment.
pub fn sample_amended_declaration(correlation_id: &str, amend_correlation_id: &str) -> Declaration {
    sample_declaration(correlation_id)
        .with_amendment(amend_correlation_id, sample_amendment_body(SAMPLE_CHARGE_REFERENCE))
}
