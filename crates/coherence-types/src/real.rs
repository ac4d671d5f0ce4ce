//! Serde helpers for reals that may be non-finite.
//!
//! JSON has no literal for infinity, and `serde_json` writes non-finite
//! floats as `null`, which does not read back. Fields annotated with
//! `#[serde(with = "coherence_types::real")]` are written as plain numbers
//! when finite and as the strings `"inf"`, `"-inf"` or `"nan"` otherwise.
//! Both forms are accepted when reading.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serializer};

/// Serialize a real, spelling non-finite values as strings.
pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else if value.is_nan() {
        serializer.serialize_str("nan")
    } else if value.is_sign_positive() {
        serializer.serialize_str("inf")
    } else {
        serializer.serialize_str("-inf")
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

/// Deserialize a real written by [`serialize`].
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Repr::deserialize(deserializer)? {
        Repr::Number(v) => Ok(v),
        Repr::Text(s) => match s.as_str() {
            "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            "nan" => Ok(f64::NAN),
            other => Err(de::Error::custom(format!("invalid real: {other}"))),
        },
    }
}
