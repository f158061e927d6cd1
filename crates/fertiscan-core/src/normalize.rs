//! Field normalizers: raw key-value input to [`Inspection`].
//!
//! Each field has its own pure function. Malformed scalars collapse to `None`,
//! malformed containers collapse to their empty default, and only a field the
//! caller declared mandatory can fail the whole record.

use phonenumber::country;
use serde_json::{Map, Value as Json};
use tracing::debug;

use crate::NormalizeError;
use crate::extract::{
    DEFAULT_REGION, canonical_website, extract_first_number, normalize_phone_number,
    validate_npk, validate_registration_identifier,
};
use crate::inspection::{
    GuaranteedAnalysis, Inspection, NutrientValue, Organization, RegistrationNumber,
    RegistrationNumberType, Value,
};
use crate::legacy::upgrade_legacy;

/// Knobs for one normalization pass.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Region used to read phone numbers written without a country code.
    pub region: country::Id,
    /// Top-level fields that must be present after normalization.
    pub required: Vec<String>,
    /// Rewrite the flat `company_*` / `manufacturer_*` shape before normalizing.
    pub upgrade_legacy: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION,
            required: Vec::new(),
            upgrade_legacy: true,
        }
    }
}

/// Normalize a raw record.
///
/// Missing keys are absent, never errors. Normalizing the serialized output
/// again yields the same record.
pub fn normalize(raw: &Json, options: &NormalizeOptions) -> Result<Inspection, NormalizeError> {
    let obj = raw.as_object().ok_or(NormalizeError::NotAnObject)?;

    let upgraded = if options.upgrade_legacy {
        upgrade_legacy(obj)
    } else {
        None
    };
    let obj = upgraded.as_ref().unwrap_or(obj);

    let inspection = Inspection {
        organizations: organizations(obj.get("organizations"), options.region),
        fertiliser_name: text(obj.get("fertiliser_name")),
        registration_number: registration_numbers(obj.get("registration_number")),
        lot_number: text(obj.get("lot_number")),
        weight: entity_list("weight", obj.get("weight"), quantity),
        density: optional_quantity(obj.get("density")),
        volume: optional_quantity(obj.get("volume")),
        npk: npk(obj.get("npk")),
        guaranteed_analysis_en: guaranteed_analysis(obj.get("guaranteed_analysis_en")),
        guaranteed_analysis_fr: guaranteed_analysis(obj.get("guaranteed_analysis_fr")),
        cautions_en: text_list("cautions_en", obj.get("cautions_en")),
        cautions_fr: text_list("cautions_fr", obj.get("cautions_fr")),
        instructions_en: text_list("instructions_en", obj.get("instructions_en")),
        instructions_fr: text_list("instructions_fr", obj.get("instructions_fr")),
        ingredients_en: entity_list("ingredients_en", obj.get("ingredients_en"), nutrient_value),
        ingredients_fr: entity_list("ingredients_fr", obj.get("ingredients_fr"), nutrient_value),
    };

    check_required(&inspection, &options.required)?;
    Ok(inspection)
}

fn check_required(inspection: &Inspection, required: &[String]) -> Result<(), NormalizeError> {
    for name in required {
        let field = inspection
            .field(name)
            .ok_or_else(|| NormalizeError::UnknownField {
                field: name.clone(),
            })?;
        if field.is_absent() {
            return Err(NormalizeError::MissingField {
                field: name.clone(),
            });
        }
    }
    Ok(())
}

// ── Scalars ──

/// Free text: strings kept verbatim unless blank, numbers rendered as text.
pub fn text(raw: Option<&Json>) -> Option<String> {
    match raw? {
        Json::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Json::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A number from a JSON number or the first number embedded in a string.
/// Booleans and containers are absent.
pub fn number(raw: Option<&Json>) -> Option<f64> {
    match raw? {
        Json::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Json::String(s) => extract_first_number(s),
        _ => None,
    }
}

pub fn npk(raw: Option<&Json>) -> Option<String> {
    let value = text(raw)?;
    let valid = validate_npk(&value);
    if valid.is_none() {
        debug!(field = "npk", raw = %value, "discarding malformed npk");
    }
    valid
}

pub fn phone_number(raw: Option<&Json>, region: country::Id) -> Option<String> {
    let value = text(raw)?;
    let phone = normalize_phone_number(&value, region);
    if phone.is_none() {
        debug!(field = "phone_number", raw = %value, "discarding unparseable phone number");
    }
    phone
}

pub fn website(raw: Option<&Json>) -> Option<String> {
    text(raw).and_then(|v| canonical_website(&v))
}

// ── Collections ──

/// A list of text items. A non-list container is treated as empty.
pub fn text_list(field: &str, raw: Option<&Json>) -> Vec<String> {
    match raw {
        Some(Json::Array(items)) => items.iter().filter_map(|item| text(Some(item))).collect(),
        None | Some(Json::Null) => Vec::new(),
        Some(other) => {
            debug!(field, kind = json_kind(other), "expected a list, using empty");
            Vec::new()
        }
    }
}

/// A list of entities built from objects. Non-object items are skipped and a
/// non-list container is treated as empty.
pub fn entity_list<T>(
    field: &str,
    raw: Option<&Json>,
    build: impl Fn(&Map<String, Json>) -> T,
) -> Vec<T> {
    match raw {
        Some(Json::Array(items)) => items.iter().filter_map(Json::as_object).map(build).collect(),
        None | Some(Json::Null) => Vec::new(),
        Some(other) => {
            debug!(field, kind = json_kind(other), "expected a list, using empty");
            Vec::new()
        }
    }
}

// ── Entities ──

pub fn quantity(obj: &Map<String, Json>) -> Value {
    Value {
        value: number(obj.get("value")),
        unit: text(obj.get("unit")),
    }
}

/// A single quantity; an object with nothing recognisable in it is absent.
pub fn optional_quantity(raw: Option<&Json>) -> Option<Value> {
    raw?.as_object()
        .map(quantity)
        .filter(Value::is_populated)
}

pub fn nutrient_value(obj: &Map<String, Json>) -> NutrientValue {
    NutrientValue {
        nutrient: text(obj.get("nutrient")),
        value: number(obj.get("value")),
        unit: text(obj.get("unit")),
    }
}

pub fn organization(obj: &Map<String, Json>, region: country::Id) -> Organization {
    Organization {
        name: text(obj.get("name")),
        address: text(obj.get("address")),
        website: website(obj.get("website")),
        phone_number: phone_number(obj.get("phone_number"), region),
    }
}

pub fn organizations(raw: Option<&Json>, region: country::Id) -> Vec<Organization> {
    entity_list("organizations", raw, |obj| organization(obj, region))
}

pub fn registration_number(obj: &Map<String, Json>) -> RegistrationNumber {
    let identifier = text(obj.get("identifier"));
    let kind = text(obj.get("type"));
    RegistrationNumber {
        identifier: identifier
            .as_deref()
            .and_then(validate_registration_identifier),
        kind: kind.as_deref().and_then(RegistrationNumberType::parse),
    }
}

pub fn registration_numbers(raw: Option<&Json>) -> Vec<RegistrationNumber> {
    entity_list("registration_number", raw, registration_number)
}

/// A guaranteed analysis table. `is_minimal` in the input is ignored and
/// re-derived from the title.
pub fn guaranteed_analysis(raw: Option<&Json>) -> Option<GuaranteedAnalysis> {
    let obj = raw?.as_object()?;
    let analysis = GuaranteedAnalysis::new(
        text(obj.get("title")),
        entity_list("nutrients", obj.get("nutrients"), nutrient_value),
    );
    analysis.is_populated().then_some(analysis)
}

fn json_kind(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "bool",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
