//! Boundary validators for intake data and model output.
//!
//! Both validators work on raw `serde_json::Value`s instead of going through
//! `serde::Deserialize`, because serde stops at the first error and the API
//! must report every offending field in one response. Semantic rules that
//! also apply to already typed values (ranges, trailing periods, the
//! recommendations/reason exclusivity) live in [`check_response`].

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::intake::normalize_pregnancy;
use crate::models::intake::{MedicalInput, Severity, Sex};
use crate::models::patient::IdentificationType;
use crate::models::response::{MedicalResponse, Recommendation};

/// `200-400`, `200 – 400`, `1 a 2` (Spanish "to"), case-insensitive.
///
/// # Panics
///
/// Only if the literal pattern fails to compile, which would be a bug in
/// this constant.
static RANGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*[-–]\s*\d+|\d+\s*a\s*\d+").expect("range pattern is a valid regex")
});

/// Whether `text` contains a numeric range expression.
///
/// Conservative: "12a3" also matches. Rejecting a safe string is acceptable,
/// letting a range through is not.
pub fn has_range(text: &str) -> bool {
    RANGE_PATTERN.is_match(text)
}

// ── Intake ───────────────────────────────────────────────────────────────────

/// Validate a raw intake payload, collecting every violated field.
pub fn validate_medical_input(raw: &Value) -> Result<MedicalInput, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError::single("input", "expected a JSON object"));
    };

    let mut errors = ValidationError::new();
    let mut fields = FieldReader::new(obj, "", &mut errors);

    let age = fields.required_u32("age");
    let sex = fields.required_enum::<Sex>("sex", "must be one of: masculino, femenino");
    let weight = fields.optional_positive_f64("weight");
    let symptoms = fields.required_string_list("symptoms");
    let allergies = fields.optional_string_list("allergies");
    let preexisting_diseases = fields.optional_string_list("preexisting_diseases");
    let pregnancy = fields.optional_bool("pregnancy");
    let current_medication = fields.optional_text("current_medication");
    let duration_days = fields.optional_u32("duration_days");
    let severity =
        fields.optional_enum::<Severity>("severity", "must be one of: leve, moderado, severo");

    if age == Some(0) {
        errors.add("age", "must be a positive integer");
    }
    if matches!(&symptoms, Some(list) if list.is_empty()) {
        errors.add("symptoms", "at least one symptom is required");
    }

    match (age, sex, symptoms) {
        (Some(age), Some(sex), Some(symptoms)) if errors.is_empty() => Ok(MedicalInput {
            age,
            sex,
            weight,
            symptoms,
            allergies,
            preexisting_diseases,
            pregnancy: normalize_pregnancy(sex, pregnancy),
            current_medication,
            duration_days,
            severity,
        }),
        _ => Err(errors),
    }
}

// ── Model output ─────────────────────────────────────────────────────────────

/// Validate a raw model response against the safety schema.
pub fn validate_medical_response(raw: &Value) -> Result<MedicalResponse, ValidationError> {
    let Some(obj) = raw.as_object() else {
        return Err(ValidationError::single("response", "expected a JSON object"));
    };

    let mut errors = ValidationError::new();

    let reason = match obj.get("reason") {
        None => {
            errors.add("reason", "is required (use null when recommendations are given)");
            None
        }
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add("reason", "must be a string or null");
            None
        }
    };

    let raw_lines = match obj.get("recommendations") {
        Some(Value::Array(items)) => Some(items),
        None => {
            errors.add("recommendations", "is required");
            None
        }
        Some(_) => {
            errors.add("recommendations", "must be an array");
            None
        }
    };

    let mut recommendations = Vec::new();
    if let Some(items) = raw_lines {
        for (index, item) in items.iter().enumerate() {
            let prefix = format!("recommendations[{index}]");
            let Some(line) = item.as_object() else {
                errors.add(prefix, "expected a JSON object");
                continue;
            };
            if let Some(rec) = read_recommendation(line, &prefix, &mut errors) {
                check_recommendation(&rec, &prefix, &mut errors);
                recommendations.push(rec);
            }
        }
        check_exclusivity(!items.is_empty(), reason.as_deref(), &mut errors);
    }

    errors.into_result(MedicalResponse {
        recommendations,
        reason,
    })
}

/// Semantic checks for a typed response. Returns an empty error when the
/// response is acceptable.
pub fn check_response(response: &MedicalResponse) -> ValidationError {
    let mut errors = ValidationError::new();
    for (index, rec) in response.recommendations.iter().enumerate() {
        check_recommendation(rec, &format!("recommendations[{index}]"), &mut errors);
    }
    check_exclusivity(
        !response.recommendations.is_empty(),
        response.reason.as_deref(),
        &mut errors,
    );
    errors
}

fn read_recommendation(
    obj: &Map<String, Value>,
    prefix: &str,
    errors: &mut ValidationError,
) -> Option<Recommendation> {
    let mut fields = FieldReader::new(obj, prefix, errors);

    let medication = fields.required_string("medication");
    let form = fields.required_string("form");
    let via = fields.required_string("via");
    let amount_value = fields.required_number("amount_value");
    let amount_unit = fields.required_string("amount_unit");
    let every_hour = fields.required_u32("every_hour");
    let duration_days = fields.required_u32("duration_days");
    let moment = fields.required_string("moment");
    let instructions = fields.required_string("instructions");
    let warnings = fields.required_string_list("warnings");

    Some(Recommendation {
        medication: medication?,
        form: form?,
        via: via?,
        amount_value: amount_value?,
        amount_unit: amount_unit?,
        every_hour: every_hour?,
        duration_days: duration_days?,
        moment: moment?,
        instructions: instructions?,
        warnings: warnings?,
    })
}

fn check_recommendation(rec: &Recommendation, prefix: &str, errors: &mut ValidationError) {
    let field = |name: &str| format!("{prefix}.{name}");

    if rec.medication.trim().is_empty() {
        errors.add(field("medication"), "must not be empty");
    }
    if rec.form.trim().is_empty() {
        errors.add(field("form"), "must not be empty");
    }
    if rec.via.trim().is_empty() {
        errors.add(field("via"), "must not be empty");
    }
    if !rec.amount_value.is_finite() || rec.amount_value <= 0.0 {
        errors.add(field("amount_value"), "must be a positive number");
    }
    if rec.amount_unit.trim().is_empty() {
        errors.add(field("amount_unit"), "must not be empty");
    }
    for (name, value) in [
        ("amount_unit", &rec.amount_unit),
        ("moment", &rec.moment),
        ("instructions", &rec.instructions),
    ] {
        if has_range(value) {
            errors.add(field(name), "must not contain a numeric range");
        }
    }
    if rec.instructions.trim_end().ends_with('.') {
        errors.add(field("instructions"), "must not end with a period");
    }
}

fn check_exclusivity(has_recommendations: bool, reason: Option<&str>, errors: &mut ValidationError) {
    if has_recommendations {
        if reason.is_some() {
            errors.add("reason", "must be null when recommendations are present");
        }
    } else if reason.is_none_or(|r| r.trim().is_empty()) {
        errors.add("reason", "is required when recommendations is empty");
    }
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// Check an identification number against the rules of its document type.
pub fn validate_identification_number(
    id_type: IdentificationType,
    number: &str,
) -> Result<(), ValidationError> {
    let number = number.trim();
    let digits = |len: usize| number.len() == len && number.bytes().all(|b| b.is_ascii_digit());

    let message = match id_type {
        IdentificationType::Dni if !digits(8) => Some("DNI must be exactly 8 digits"),
        IdentificationType::Ruc if !digits(11) => Some("RUC must be exactly 11 digits"),
        _ if number.is_empty() => Some("must not be empty"),
        _ => None,
    };

    match message {
        Some(msg) => Err(ValidationError::single("idNumber", msg)),
        None => Ok(()),
    }
}

// ── Field reader ─────────────────────────────────────────────────────────────

/// Reads typed fields from a JSON object, recording a message per bad field
/// instead of stopping at the first one.
struct FieldReader<'a> {
    obj: &'a Map<String, Value>,
    prefix: &'a str,
    errors: &'a mut ValidationError,
}

impl<'a> FieldReader<'a> {
    fn new(obj: &'a Map<String, Value>, prefix: &'a str, errors: &'a mut ValidationError) -> Self {
        Self {
            obj,
            prefix,
            errors,
        }
    }

    fn key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}.{name}", self.prefix)
        }
    }

    fn fail<T>(&mut self, name: &str, message: &str) -> Option<T> {
        let key = self.key(name);
        self.errors.add(key, message);
        None
    }

    /// `None` when the field is absent or null.
    fn present(&self, name: &str) -> Option<&'a Value> {
        self.obj.get(name).filter(|v| !v.is_null())
    }

    fn required(&mut self, name: &str) -> Option<&'a Value> {
        match self.present(name) {
            Some(value) => Some(value),
            None => self.fail(name, "is required"),
        }
    }

    fn to_u32(&mut self, name: &str, value: &Value) -> Option<u32> {
        match value.as_u64().and_then(|n| u32::try_from(n).ok()) {
            Some(n) => Some(n),
            None => self.fail(name, "must be a non-negative integer"),
        }
    }

    fn required_u32(&mut self, name: &str) -> Option<u32> {
        let value = self.required(name)?;
        self.to_u32(name, value)
    }

    fn optional_u32(&mut self, name: &str) -> Option<u32> {
        let value = self.present(name)?;
        self.to_u32(name, value)
    }

    fn required_number(&mut self, name: &str) -> Option<f64> {
        match self.required(name)?.as_f64() {
            Some(n) => Some(n),
            None => self.fail(name, "must be a single number"),
        }
    }

    fn optional_positive_f64(&mut self, name: &str) -> Option<f64> {
        match self.present(name)?.as_f64() {
            Some(n) if n.is_finite() && n > 0.0 => Some(n),
            _ => self.fail(name, "must be a positive number"),
        }
    }

    fn optional_bool(&mut self, name: &str) -> Option<bool> {
        match self.present(name)? {
            Value::Bool(b) => Some(*b),
            _ => self.fail(name, "must be true, false, or null"),
        }
    }

    fn required_string(&mut self, name: &str) -> Option<String> {
        match self.required(name)? {
            Value::String(s) => Some(s.clone()),
            _ => self.fail(name, "must be a string"),
        }
    }

    /// Blank strings collapse to `None`.
    fn optional_text(&mut self, name: &str) -> Option<String> {
        match self.present(name)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.trim().to_string()),
            _ => self.fail(name, "must be a string or null"),
        }
    }

    fn to_string_list(&mut self, name: &str, value: &Value) -> Option<Vec<String>> {
        let Value::Array(items) = value else {
            return self.fail(name, "must be an array of strings");
        };
        let mut list = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str().map(str::trim) {
                Some(s) if !s.is_empty() => list.push(s.to_string()),
                Some(_) => return self.fail(&format!("{name}[{index}]"), "must not be empty"),
                None => return self.fail(&format!("{name}[{index}]"), "must be a string"),
            }
        }
        Some(list)
    }

    fn required_string_list(&mut self, name: &str) -> Option<Vec<String>> {
        let value = self.required(name)?;
        self.to_string_list(name, value)
    }

    fn optional_string_list(&mut self, name: &str) -> Option<Vec<String>> {
        let value = self.present(name)?;
        self.to_string_list(name, value)
    }

    fn to_enum<T: FromStr>(&mut self, name: &str, value: &Value, message: &str) -> Option<T> {
        match value.as_str().map(T::from_str) {
            Some(Ok(v)) => Some(v),
            _ => self.fail(name, message),
        }
    }

    fn required_enum<T: FromStr>(&mut self, name: &str, message: &str) -> Option<T> {
        let value = self.required(name)?;
        self.to_enum(name, value, message)
    }

    fn optional_enum<T: FromStr>(&mut self, name: &str, message: &str) -> Option<T> {
        let value = self.present(name)?;
        self.to_enum(name, value, message)
    }
}
