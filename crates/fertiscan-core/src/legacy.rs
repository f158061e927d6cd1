//! Upgrade of the flat pre-`organizations` record shape.
//!
//! Older ground-truth files carry `company_*` and `manufacturer_*` keys and a
//! bare string `registration_number`. They are rewritten into the current
//! shape before normalization so both generations score the same way.

use serde_json::{Map, Value as Json, json};
use tracing::debug;

const ORGANIZATION_PREFIXES: &[&str] = &["company", "manufacturer"];
const ORGANIZATION_FIELDS: &[&str] = &["name", "address", "website", "phone_number"];

/// Rewrite a flat legacy record, or return `None` when `raw` is already in the
/// current shape.
pub fn upgrade_legacy(raw: &Map<String, Json>) -> Option<Map<String, Json>> {
    if raw.contains_key("organizations") || !has_legacy_keys(raw) {
        return None;
    }

    let mut upgraded = raw.clone();
    let mut organizations = Vec::new();

    for prefix in ORGANIZATION_PREFIXES {
        let mut org = Map::new();
        for field in ORGANIZATION_FIELDS {
            let value = upgraded
                .remove(&format!("{prefix}_{field}"))
                .unwrap_or(Json::Null);
            org.insert((*field).to_string(), value);
        }
        if org.values().any(|v| !v.is_null()) {
            organizations.push(Json::Object(org));
        }
    }

    if let Some(Json::String(identifier)) = upgraded.get("registration_number") {
        let wrapped = json!([{ "identifier": identifier, "type": "fertilizer_product" }]);
        upgraded.insert("registration_number".into(), wrapped);
    }

    debug!(organizations = organizations.len(), "upgraded legacy inspection shape");
    upgraded.insert("organizations".into(), Json::Array(organizations));
    Some(upgraded)
}

fn has_legacy_keys(raw: &Map<String, Json>) -> bool {
    ORGANIZATION_PREFIXES.iter().any(|prefix| {
        ORGANIZATION_FIELDS
            .iter()
            .any(|field| raw.contains_key(&format!("{prefix}_{field}")))
    })
}
