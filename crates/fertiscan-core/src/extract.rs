//! Value extractors: pure functions that turn noisy label text into typed values.
//!
//! Every extractor returns `None` instead of failing. OCR and language-model
//! output is noisy enough that "unknown" is the only safe answer for text that
//! does not look like the value we want.

use std::sync::LazyLock;

use phonenumber::{Mode, country};
use regex::Regex;

/// Phone-number region used when the caller does not pick one.
pub const DEFAULT_REGION: country::Id = country::Id::CA;

/// Longest digit run a single E.164 number can carry.
const MAX_PHONE_DIGITS: usize = 15;

static FIRST_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("static regex"));

static REGISTRATION_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{7}[A-Z]$").expect("static regex"));

static NPK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(\.\d+)?-\d+(\.\d+)?-\d+(\.\d+)?$").expect("static regex")
});

static MINIMAL_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bminim\w*\b").expect("static regex"));

/// Return the first integer or decimal embedded in `text`.
///
/// Leading noise such as `~` or "approximately" is skipped. For ranges like
/// "12.5 and 15" the first number wins. Digit runs too long for an `f64` are
/// absent.
pub fn extract_first_number(text: &str) -> Option<f64> {
    FIRST_NUMBER
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse a phone number and format it as E.164.
///
/// A leading label like "Tel:" is tolerated. Returns `None` when the text does
/// not parse, when the parsed number is not valid, when letters follow the
/// first digit ("800 321-9605 FAX"), or when the text carries more digits
/// than one number can hold.
pub fn normalize_phone_number(text: &str, region: country::Id) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let number_start = text.find(|c: char| c.is_ascii_digit())?;
    if text[number_start..].chars().any(char::is_alphabetic) {
        return None;
    }

    let digits = text.chars().filter(char::is_ascii_digit).count();
    if digits > MAX_PHONE_DIGITS {
        return None;
    }

    let number = phonenumber::parse(Some(region), text).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

/// Parse a region code such as "CA" or "us".
pub fn parse_region(code: &str) -> Option<country::Id> {
    code.trim().to_ascii_uppercase().parse::<country::Id>().ok()
}

/// Comparison form of a website: lowercase, no scheme, no leading `www.`,
/// no trailing slash.
pub fn normalize_website(text: &str) -> Option<String> {
    let host = strip_website(text)?;
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    if host.is_empty() { None } else { Some(host) }
}

/// Storage form of a website: the comparison form with a `www.` prefix.
pub fn canonical_website(text: &str) -> Option<String> {
    normalize_website(text).map(|host| format!("www.{host}"))
}

fn strip_website(text: &str) -> Option<String> {
    let lowered = text.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let trimmed = without_scheme.trim_end_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Accept a registration identifier only when it is exactly seven digits
/// followed by one uppercase letter.
pub fn validate_registration_identifier(text: &str) -> Option<String> {
    REGISTRATION_IDENTIFIER
        .is_match(text)
        .then(|| text.to_string())
}

/// Accept an NPK ratio only in the strict `N-P-K` numeric form.
pub fn validate_npk(text: &str) -> Option<String> {
    NPK.is_match(text).then(|| text.to_string())
}

/// True when a guaranteed-analysis title announces minimum values
/// ("Guaranteed minimum analysis", "Analyse minimale garantie").
pub fn is_minimal_title(title: &str) -> bool {
    MINIMAL_TITLE.is_match(title)
}
