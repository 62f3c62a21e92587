// ============================================================
// Layer 3 — Raw Labels and Species
// ============================================================
// A model may emit either a class index (0, 1, 2) or a class
// name ("setosa"). RawLabel keeps that distinction explicit and
// Species::from_raw is the single, exhaustive mapping from what
// the model said to what the caller sees.
//
// Index lookup table:
//   0 → setosa
//   1 → versicolor
//   2 → virginica
//   anything else → "unknown"
//
// String labels are passed through unchanged.
//
// Numeric labels in an artifact are coerced to an index when they
// are integral, so exporters that write float classes (`1.0`)
// still load. A fractional label (`1.5`) names no class and the
// artifact is rejected.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// What a classifier returns for one feature vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawLabel {
    Index(i64),
    Name(String),
}

impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Index(i) => write!(f, "{i}"),
            RawLabel::Name(s) => f.write_str(s),
        }
    }
}

struct RawLabelVisitor;

impl<'de> Visitor<'de> for RawLabelVisitor {
    type Value = RawLabel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integral class index or a class name")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawLabel, E> {
        Ok(RawLabel::Index(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawLabel, E> {
        i64::try_from(v)
            .map(RawLabel::Index)
            .map_err(|_| E::custom(format!("class index {v} is out of range")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<RawLabel, E> {
        // i64::MAX is not representable as f64; stay strictly below 2^63
        if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
            Ok(RawLabel::Index(v as i64))
        } else {
            Err(E::custom(format!("numeric class label {v} is not an integer")))
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawLabel, E> {
        Ok(RawLabel::Name(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<RawLabel, E> {
        Ok(RawLabel::Name(v))
    }
}

impl<'de> Deserialize<'de> for RawLabel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawLabelVisitor)
    }
}

impl From<i64> for RawLabel {
    fn from(i: i64) -> Self {
        RawLabel::Index(i)
    }
}

impl From<&str> for RawLabel {
    fn from(s: &str) -> Self {
        RawLabel::Name(s.to_string())
    }
}

/// Human-readable species reported to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Species {
    Setosa,
    Versicolor,
    Virginica,
    /// Integer label outside the lookup table
    Unknown,
    /// Model emitted a name we don't recognise — passed through as-is
    Other(String),
}

impl Species {
    pub fn from_raw(raw: &RawLabel) -> Self {
        match raw {
            RawLabel::Index(0) => Species::Setosa,
            RawLabel::Index(1) => Species::Versicolor,
            RawLabel::Index(2) => Species::Virginica,
            RawLabel::Index(_) => Species::Unknown,
            RawLabel::Name(name) => match name.as_str() {
                "setosa" => Species::Setosa,
                "versicolor" => Species::Versicolor,
                "virginica" => Species::Virginica,
                _ => Species::Other(name.clone()),
            },
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Species::Setosa => "setosa",
            Species::Versicolor => "versicolor",
            Species::Virginica => "virginica",
            Species::Unknown => "unknown",
            Species::Other(name) => name,
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
