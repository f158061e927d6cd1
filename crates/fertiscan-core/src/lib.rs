pub mod error;
pub mod extract;
pub mod inspection;
pub mod legacy;
pub mod normalize;

pub use error::NormalizeError;
pub use extract::{
    DEFAULT_REGION, canonical_website, extract_first_number, is_minimal_title,
    normalize_phone_number, normalize_website, parse_region, validate_npk,
    validate_registration_identifier,
};
pub use inspection::{
    FIELD_NAMES, FieldKind, FieldRef, GuaranteedAnalysis, Inspection, NutrientValue, Organization,
    RegistrationNumber, RegistrationNumberType, Value,
};
pub use normalize::{NormalizeOptions, normalize};
pub use phonenumber::country::Id as Region;
