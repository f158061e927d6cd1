//! The normalized inspection record and its entities.
//!
//! Values of these types only come out of [`crate::normalize`], so every
//! invariant (canonical phone numbers, `www.` websites, strict identifiers,
//! empty collections instead of nulls) holds for any instance a caller sees.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::NormalizeError;
use crate::extract::is_minimal_title;
use crate::normalize::{NormalizeOptions, normalize};

/// A numeric quantity with its unit, e.g. `{ value: 10, unit: "kg" }`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Value {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

impl Value {
    /// At least one sub-field is known.
    pub fn is_populated(&self) -> bool {
        self.value.is_some() || self.unit.is_some()
    }
}

/// A named nutrient with an inline quantity.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NutrientValue {
    pub nutrient: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
}

impl NutrientValue {
    pub fn quantity(&self) -> Value {
        Value {
            value: self.value,
            unit: self.unit.clone(),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.nutrient.is_some() || self.value.is_some() || self.unit.is_some()
    }
}

/// A company or manufacturer named on the label.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Organization {
    pub name: Option<String>,
    pub address: Option<String>,
    /// Lowercase host with a `www.` prefix.
    pub website: Option<String>,
    /// E.164 form.
    pub phone_number: Option<String>,
}

impl Organization {
    pub fn is_populated(&self) -> bool {
        self.name.is_some()
            || self.address.is_some()
            || self.website.is_some()
            || self.phone_number.is_some()
    }
}

/// What a registration number is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationNumberType {
    /// A registered ingredient listed on the label.
    IngredientComponent,
    /// The fertilizer product itself.
    FertilizerProduct,
}

impl RegistrationNumberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IngredientComponent => "ingredient_component",
            Self::FertilizerProduct => "fertilizer_product",
        }
    }

    /// Parse the wire form; anything else is unknown.
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "ingredient_component" | "ingredient-component" => Some(Self::IngredientComponent),
            "fertilizer_product" | "fertilizer-product" => Some(Self::FertilizerProduct),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RegistrationNumber {
    /// Seven digits and one uppercase letter.
    pub identifier: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<RegistrationNumberType>,
}

impl RegistrationNumber {
    pub fn is_populated(&self) -> bool {
        self.identifier.is_some() || self.kind.is_some()
    }
}

/// A titled nutrient table.
///
/// `is_minimal` is derived from the title and cannot be set on its own; use
/// [`with_title`](Self::with_title) to change the title and re-derive it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct GuaranteedAnalysis {
    title: Option<String>,
    nutrients: Vec<NutrientValue>,
    is_minimal: Option<bool>,
}

impl GuaranteedAnalysis {
    pub fn new(title: Option<String>, nutrients: Vec<NutrientValue>) -> Self {
        let is_minimal = derive_is_minimal(title.as_deref());
        Self {
            title,
            nutrients,
            is_minimal,
        }
    }

    pub fn with_title(self, title: Option<String>) -> Self {
        Self::new(title, self.nutrients)
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn nutrients(&self) -> &[NutrientValue] {
        &self.nutrients
    }

    /// `None` when there is no title to judge from.
    pub fn is_minimal(&self) -> Option<bool> {
        self.is_minimal
    }

    pub fn is_populated(&self) -> bool {
        self.title.is_some() || self.nutrients.iter().any(NutrientValue::is_populated)
    }
}

fn derive_is_minimal(title: Option<&str>) -> Option<bool> {
    title.map(is_minimal_title)
}

/// Everything extracted from one fertilizer label.
///
/// Deserializing goes through the normalizer with default options, so
/// `serde_json::from_str::<Inspection>` never yields an unnormalized record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Json")]
pub struct Inspection {
    pub organizations: Vec<Organization>,
    pub fertiliser_name: Option<String>,
    pub registration_number: Vec<RegistrationNumber>,
    pub lot_number: Option<String>,
    pub weight: Vec<Value>,
    pub density: Option<Value>,
    pub volume: Option<Value>,
    pub npk: Option<String>,
    pub guaranteed_analysis_en: Option<GuaranteedAnalysis>,
    pub guaranteed_analysis_fr: Option<GuaranteedAnalysis>,
    pub cautions_en: Vec<String>,
    pub cautions_fr: Vec<String>,
    pub instructions_en: Vec<String>,
    pub instructions_fr: Vec<String>,
    pub ingredients_en: Vec<NutrientValue>,
    pub ingredients_fr: Vec<NutrientValue>,
}

impl TryFrom<Json> for Inspection {
    type Error = NormalizeError;

    fn try_from(raw: Json) -> Result<Self, Self::Error> {
        normalize(&raw, &NormalizeOptions::default())
    }
}

/// Declared field names, in record order.
pub const FIELD_NAMES: &[&str] = &[
    "organizations",
    "fertiliser_name",
    "registration_number",
    "lot_number",
    "weight",
    "density",
    "volume",
    "npk",
    "guaranteed_analysis_en",
    "guaranteed_analysis_fr",
    "cautions_en",
    "cautions_fr",
    "instructions_en",
    "instructions_fr",
    "ingredients_en",
    "ingredients_fr",
];

/// How a field is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Free text scored by string similarity.
    Text,
    /// Codes and identifiers scored by exact match.
    Code,
    Quantity,
    Quantities,
    Texts,
    Organizations,
    RegistrationNumbers,
    Nutrients,
    Analysis,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Code => "code",
            Self::Quantity => "quantity",
            Self::Quantities => "quantity list",
            Self::Texts => "text list",
            Self::Organizations => "organization list",
            Self::RegistrationNumbers => "registration number list",
            Self::Nutrients => "nutrient list",
            Self::Analysis => "guaranteed analysis",
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed view of one record field, tagged with its comparison category.
#[derive(Debug, Clone, Copy)]
pub enum FieldRef<'a> {
    Text(Option<&'a str>),
    Code(Option<&'a str>),
    Quantity(Option<&'a Value>),
    Quantities(&'a [Value]),
    Texts(&'a [String]),
    Organizations(&'a [Organization]),
    RegistrationNumbers(&'a [RegistrationNumber]),
    Nutrients(&'a [NutrientValue]),
    Analysis(Option<&'a GuaranteedAnalysis>),
}

impl FieldRef<'_> {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Code(_) => FieldKind::Code,
            Self::Quantity(_) => FieldKind::Quantity,
            Self::Quantities(_) => FieldKind::Quantities,
            Self::Texts(_) => FieldKind::Texts,
            Self::Organizations(_) => FieldKind::Organizations,
            Self::RegistrationNumbers(_) => FieldKind::RegistrationNumbers,
            Self::Nutrients(_) => FieldKind::Nutrients,
            Self::Analysis(_) => FieldKind::Analysis,
        }
    }

    /// Nothing meaningful is recorded: an absent scalar, or a collection with
    /// no populated element.
    pub fn is_absent(&self) -> bool {
        match self {
            Self::Text(v) | Self::Code(v) => v.is_none(),
            Self::Quantity(v) => !v.is_some_and(Value::is_populated),
            Self::Quantities(v) => !v.iter().any(Value::is_populated),
            Self::Texts(v) => v.iter().all(|s| s.trim().is_empty()),
            Self::Organizations(v) => !v.iter().any(Organization::is_populated),
            Self::RegistrationNumbers(v) => !v.iter().any(RegistrationNumber::is_populated),
            Self::Nutrients(v) => !v.iter().any(NutrientValue::is_populated),
            Self::Analysis(v) => !v.is_some_and(GuaranteedAnalysis::is_populated),
        }
    }
}

impl Inspection {
    /// Normalize a raw record with default options.
    pub fn from_json(raw: &Json) -> Result<Self, NormalizeError> {
        normalize(raw, &NormalizeOptions::default())
    }

    /// Every declared field, in [`FIELD_NAMES`] order.
    pub fn fields(&self) -> Vec<(&'static str, FieldRef<'_>)> {
        FIELD_NAMES
            .iter()
            .filter_map(|&name| self.field(name).map(|f| (name, f)))
            .collect()
    }

    /// Look up one field by its declared name.
    pub fn field(&self, name: &str) -> Option<FieldRef<'_>> {
        let field = match name {
            "organizations" => FieldRef::Organizations(&self.organizations),
            "fertiliser_name" => FieldRef::Text(self.fertiliser_name.as_deref()),
            "registration_number" => FieldRef::RegistrationNumbers(&self.registration_number),
            "lot_number" => FieldRef::Code(self.lot_number.as_deref()),
            "weight" => FieldRef::Quantities(&self.weight),
            "density" => FieldRef::Quantity(self.density.as_ref()),
            "volume" => FieldRef::Quantity(self.volume.as_ref()),
            "npk" => FieldRef::Code(self.npk.as_deref()),
            "guaranteed_analysis_en" => FieldRef::Analysis(self.guaranteed_analysis_en.as_ref()),
            "guaranteed_analysis_fr" => FieldRef::Analysis(self.guaranteed_analysis_fr.as_ref()),
            "cautions_en" => FieldRef::Texts(&self.cautions_en),
            "cautions_fr" => FieldRef::Texts(&self.cautions_fr),
            "instructions_en" => FieldRef::Texts(&self.instructions_en),
            "instructions_fr" => FieldRef::Texts(&self.instructions_fr),
            "ingredients_en" => FieldRef::Nutrients(&self.ingredients_en),
            "ingredients_fr" => FieldRef::Nutrients(&self.ingredients_fr),
            _ => return None,
        };
        Some(field)
    }
}
