//! Canonical wire schema for passenger declaration submissions
//!
//! Both downstream integrations accept the same `simpleDeclarationRequest`
//! document. Decoding a raw body into [`SubmissionPayload`] and encoding it
//! again yields the canonical form: field order follows these structs, and
//! input fields the schema does not know are dropped.
//!
//! Structural requirements are enforced by serde; field-level rules (charge
//! reference format, monetary amounts, dates) by [`SubmissionPayload::validate`].

use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

static CHARGE_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^X[A-Z]PR\d{10}$").expect("CHARGE_REFERENCE should compile - this is a bug")
});
static MONEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?\d+\.\d{2}$").expect("MONEY should compile - this is a bug"));

/// Why a body failed canonical validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("payload does not match submission schema: {0}")]
    Decode(String),

    #[error("invalid field {field}: {reason}")]
    Field { field: &'static str, reason: String },
}

impl SchemaViolation {
    fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Field { field, reason: reason.into() }
    }
}

/// Root of the canonical submission document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub simple_declaration_request: SimpleDeclarationRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleDeclarationRequest {
    pub request_common: RequestCommon,
    pub request_detail: RequestDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCommon {
    pub receipt_date: String,
    pub acknowledgement_reference: String,
    pub request_parameters: Vec<RequestParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameter {
    pub param_name: String,
    pub param_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    pub declaration_header: DeclarationHeader,
    pub customer_reference: CustomerReference,
    pub personal_details: PersonalDetails,
    pub contact_details: ContactDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_tobacco: Option<DeclarationTobacco>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_alcohol: Option<DeclarationAlcohol>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration_other: Option<DeclarationOther>,
    pub liability_details: LiabilityDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendment_liability_details: Option<LiabilityDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationHeader {
    pub charge_reference: String,
    pub port_of_entry: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_of_entry_name: Option<String>,
    pub expected_date_of_arrival: String,
    pub time_of_entry: String,
    pub message_types: MessageTypes,
    pub travelling_from: String,
    #[serde(rename = "onwardTravelGBNI", default, skip_serializing_if = "Option::is_none")]
    pub onward_travel_gbni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ucc_relief: Option<bool>,
    #[serde(rename = "ukVATPaid", default, skip_serializing_if = "Option::is_none")]
    pub uk_vat_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uk_excise_duty_paid: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageTypes {
    pub message_type: MessageType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    DeclarationCreate,
    DeclarationAmend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerReference {
    pub id_type: String,
    pub id_value: String,
    pub uk_resident: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationTobacco {
    #[serde(rename = "totalExciseTobacco")]
    pub total_excise: String,
    #[serde(rename = "totalCustomsTobacco")]
    pub total_customs: String,
    #[serde(rename = "totalVATTobacco")]
    pub total_vat: String,
    #[serde(rename = "declarationItemTobacco")]
    pub items: Vec<DeclarationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationAlcohol {
    #[serde(rename = "totalExciseAlcohol")]
    pub total_excise: String,
    #[serde(rename = "totalCustomsAlcohol")]
    pub total_customs: String,
    #[serde(rename = "totalVATAlcohol")]
    pub total_vat: String,
    #[serde(rename = "declarationItemAlcohol")]
    pub items: Vec<DeclarationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarationOther {
    #[serde(rename = "totalExciseOther")]
    pub total_excise: String,
    #[serde(rename = "totalCustomsOther")]
    pub total_customs: String,
    #[serde(rename = "totalVATOther")]
    pub total_vat: String,
    #[serde(rename = "declarationItemOther")]
    pub items: Vec<DeclarationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationItem {
    pub commodity_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    pub goods_value: String,
    pub value_currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    pub exchange_rate: String,
    pub exchange_rate_date: String,
    #[serde(rename = "goodsValueGBP")]
    pub goods_value_gbp: String,
    #[serde(rename = "customsGBP")]
    pub customs_gbp: String,
    #[serde(rename = "vatGBP")]
    pub vat_gbp: String,
    #[serde(rename = "exciseGBP")]
    pub excise_gbp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiabilityDetails {
    #[serde(rename = "totalExciseGBP")]
    pub total_excise_gbp: String,
    #[serde(rename = "totalCustomsGBP")]
    pub total_customs_gbp: String,
    #[serde(rename = "totalVATGBP")]
    pub total_vat_gbp: String,
    #[serde(rename = "grandTotalGBP")]
    pub grand_total_gbp: String,
}

impl SubmissionPayload {
    /// Decode a raw body and apply the field-level rules.
    pub fn from_value(body: &Value) -> Result<Self, SchemaViolation> {
        let payload = Self::deserialize(body).map_err(|e| SchemaViolation::Decode(e.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }

    /// Canonical JSON encoding of this payload.
    pub fn to_canonical_json(&self) -> Result<String, SchemaViolation> {
        serde_json::to_string(self).map_err(|e| SchemaViolation::Decode(e.to_string()))
    }

    pub fn charge_reference(&self) -> &str {
        &self.simple_declaration_request.request_detail.declaration_header.charge_reference
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let request = &self.simple_declaration_request;

        not_blank(
            "requestCommon.acknowledgementReference",
            &request.request_common.acknowledgement_reference,
        )?;
        not_blank("requestCommon.receiptDate", &request.request_common.receipt_date)?;
        if request.request_common.request_parameters.is_empty() {
            return Err(SchemaViolation::field(
                "requestCommon.requestParameters",
                "at least one parameter is required",
            ));
        }

        let detail = &request.request_detail;
        detail.declaration_header.validate()?;
        not_blank("customerReference.idValue", &detail.customer_reference.id_value)?;
        not_blank("personalDetails.firstName", &detail.personal_details.first_name)?;
        not_blank("personalDetails.lastName", &detail.personal_details.last_name)?;

        if let Some(tobacco) = &detail.declaration_tobacco {
            validate_goods(
                &tobacco.total_excise,
                &tobacco.total_customs,
                &tobacco.total_vat,
                &tobacco.items,
            )?;
        }
        if let Some(alcohol) = &detail.declaration_alcohol {
            validate_goods(
                &alcohol.total_excise,
                &alcohol.total_customs,
                &alcohol.total_vat,
                &alcohol.items,
            )?;
        }
        if let Some(other) = &detail.declaration_other {
            validate_goods(
                &other.total_excise,
                &other.total_customs,
                &other.total_vat,
                &other.items,
            )?;
        }

        detail.liability_details.validate()?;
        if let Some(amendment) = &detail.amendment_liability_details {
            amendment.validate()?;
        }

        Ok(())
    }
}

impl DeclarationHeader {
    fn validate(&self) -> Result<(), SchemaViolation> {
        if !CHARGE_REFERENCE.is_match(&self.charge_reference) {
            return Err(SchemaViolation::field(
                "declarationHeader.chargeReference",
                format!("'{}' is not a valid charge reference", self.charge_reference),
            ));
        }
        not_blank("declarationHeader.portOfEntry", &self.port_of_entry)?;
        not_blank("declarationHeader.travellingFrom", &self.travelling_from)?;

        NaiveDate::parse_from_str(&self.expected_date_of_arrival, "%Y-%m-%d").map_err(|e| {
            SchemaViolation::field("declarationHeader.expectedDateOfArrival", e.to_string())
        })?;
        NaiveTime::parse_from_str(&self.time_of_entry, "%H:%M").map_err(|e| {
            SchemaViolation::field("declarationHeader.timeOfEntry", e.to_string())
        })?;

        Ok(())
    }
}

impl LiabilityDetails {
    fn validate(&self) -> Result<(), SchemaViolation> {
        money("liabilityDetails.totalExciseGBP", &self.total_excise_gbp)?;
        money("liabilityDetails.totalCustomsGBP", &self.total_customs_gbp)?;
        money("liabilityDetails.totalVATGBP", &self.total_vat_gbp)?;
        money("liabilityDetails.grandTotalGBP", &self.grand_total_gbp)
    }
}

fn validate_goods(
    total_excise: &str,
    total_customs: &str,
    total_vat: &str,
    items: &[DeclarationItem],
) -> Result<(), SchemaViolation> {
    money("declarationGoods.totalExcise", total_excise)?;
    money("declarationGoods.totalCustoms", total_customs)?;
    money("declarationGoods.totalVAT", total_vat)?;

    if items.is_empty() {
        return Err(SchemaViolation::field("declarationGoods.items", "must not be empty"));
    }

    for item in items {
        not_blank("declarationItem.commodityDescription", &item.commodity_description)?;
        money("declarationItem.goodsValueGBP", &item.goods_value_gbp)?;
        money("declarationItem.customsGBP", &item.customs_gbp)?;
        money("declarationItem.vatGBP", &item.vat_gbp)?;
        money("declarationItem.exciseGBP", &item.excise_gbp)?;
        NaiveDate::parse_from_str(&item.exchange_rate_date, "%Y-%m-%d").map_err(|e| {
            SchemaViolation::field("declarationItem.exchangeRateDate", e.to_string())
        })?;
    }

    Ok(())
}

fn not_blank(field: &'static str, value: &str) -> Result<(), SchemaViolation> {
    if value.trim().is_empty() {
        return Err(SchemaViolation::field(field, "must not be blank"));
    }
    Ok(())
}

fn money(field: &'static str, value: &str) -> Result<(), SchemaViolation> {
    if !MONEY.is_match(value) {
        return Err(SchemaViolation::field(field, format!("'{value}' is not a monetary amount")));
    }
    Ok(())
}
