// ============================================================
// Layer 4 — Input Validator
// ============================================================
// Accepted body:
//   {"sepal_length": 5.1, "sepal_width": 3.5,
//    "petal_length": 1.4, "petal_width": 0.2}
//
// Each field may be a JSON number or a string that parses as a
// float ("5.1"). Extra fields are ignored. Missing, null, boolean,
// array/object or non-finite ("nan", "inf") values are rejected.

use serde_json::{Map, Value};

use crate::domain::errors::{FieldIssue, ValidationError};
use crate::domain::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};

/// Parse a request body into a FeatureVector, collecting every
/// field-level problem before giving up.
pub fn parse_features(body: &[u8]) -> Result<FeatureVector, ValidationError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| ValidationError {
        issues: vec![FieldIssue::body("json_invalid", format!("JSON decode error: {e}"))],
    })?;

    let object = value.as_object().ok_or_else(|| ValidationError {
        issues: vec![FieldIssue::body(
            "model_attributes_type",
            "Input should be a valid dictionary or object",
        )],
    })?;

    features_from_object(object)
}

fn features_from_object(object: &Map<String, Value>) -> Result<FeatureVector, ValidationError> {
    let mut values = [0.0f64; FEATURE_COUNT];
    let mut issues = Vec::new();

    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES.iter()) {
        match coerce_field(name, object.get(*name)) {
            Ok(v) => *slot = v,
            Err(issue) => issues.push(issue),
        }
    }

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    // coerce_field already rejected non-finite values, but the
    // constructor is the invariant's owner so let it decide.
    Ok(FeatureVector::new(values)?)
}

fn coerce_field(name: &str, value: Option<&Value>) -> Result<f64, FieldIssue> {
    let v = match value {
        None => return Err(FieldIssue::new(name, "missing", "Field required")),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
            FieldIssue::new(name, "float_parsing", "Input should be a valid number")
        })?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| {
            FieldIssue::new(
                name,
                "float_parsing",
                "Input should be a valid number, unable to parse string as a number",
            )
        })?,
        Some(_) => {
            return Err(FieldIssue::new(name, "float_type", "Input should be a valid number"))
        }
    };

    if !v.is_finite() {
        return Err(FieldIssue::new(name, "finite_number", "Input should be a finite number"));
    }
    Ok(v)
}
