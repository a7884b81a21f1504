use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MsValue {
    Bool(bool),
    Number(f64),
    String(String),
}

/// Declared type of a function parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    Bool,
    Number,
    String,
    Any,
}

/// How a guard value is coerced to a boolean. Chosen per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Truthiness {
    /// Only booleans may be used as conditions.
    Strict,
    /// `false`, `0`, NaN, `""`, `"false"` and `"0"` are false.
    #[default]
    Lenient,
}

impl MsValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }

    /// Returns `None` when strict truthiness rejects a non-boolean.
    pub fn truthy(&self, rules: Truthiness) -> Option<bool> {
        match (self, rules) {
            (Self::Bool(value), _) => Some(*value),
            (_, Truthiness::Strict) => None,
            (Self::Number(value), Truthiness::Lenient) => Some(*value != 0.0 && !value.is_nan()),
            (Self::String(value), Truthiness::Lenient) => {
                let trimmed = value.trim();
                Some(
                    !(trimmed.is_empty()
                        || trimmed == "0"
                        || trimmed.eq_ignore_ascii_case("false")),
                )
            }
        }
    }
}

impl fmt::Display for MsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{}", value),
            Self::Number(value) => {
                if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
                    write!(f, "{}", *value as i64)
                } else {
                    write!(f, "{}", value)
                }
            }
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for MsValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for MsValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MsValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MsValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl ValueType {
    pub fn accepts(self, value: &MsValue) -> bool {
        matches!(
            (self, value),
            (Self::Any, _)
                | (Self::Bool, MsValue::Bool(_))
                | (Self::Number, MsValue::Number(_))
                | (Self::String, MsValue::String(_))
        )
    }

    pub fn default_value(self) -> MsValue {
        match self {
            Self::Bool => MsValue::Bool(false),
            Self::Number => MsValue::Number(0.0),
            Self::String | Self::Any => MsValue::String(String::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Any => "any",
        }
    }
}

fn version_regex() -> &'static Regex {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    VERSION.get_or_init(|| Regex::new(r"^\d+(\.\d+)*$").expect("version regex must compile"))
}

/// Compares dotted numeric versions; missing trailing parts count as zero,
/// so `1.2` equals `1.2.0`.
pub fn compare_versions(left: &str, right: &str) -> Result<Ordering, String> {
    let left_parts = parse_version(left)?;
    let right_parts = parse_version(right)?;
    let width = left_parts.len().max(right_parts.len());
    for index in 0..width {
        let l = left_parts.get(index).copied().unwrap_or(0);
        let r = right_parts.get(index).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return Ok(other),
        }
    }
    Ok(Ordering::Equal)
}

fn parse_version(raw: &str) -> Result<Vec<u64>, String> {
    let trimmed = raw.trim();
    if !version_regex().is_match(trimmed) {
        return Err(format!("\"{}\" is not a dotted numeric version.", raw));
    }
    trimmed
        .split('.')
        .map(|part| {
            part.parse::<u64>()
                .map_err(|_| format!("Version part \"{}\" is out of range.", part))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_truthiness_rules() {
        let rules = Truthiness::Lenient;
        assert_eq!(MsValue::from(0.0).truthy(rules), Some(false));
        assert_eq!(MsValue::from(f64::NAN).truthy(rules), Some(false));
        assert_eq!(MsValue::from(2.5).truthy(rules), Some(true));
        assert_eq!(MsValue::from("").truthy(rules), Some(false));
        assert_eq!(MsValue::from(" FALSE ").truthy(rules), Some(false));
        assert_eq!(MsValue::from("0").truthy(rules), Some(false));
        assert_eq!(MsValue::from("no").truthy(rules), Some(true));
        assert_eq!(MsValue::from(true).truthy(rules), Some(true));
    }

    #[test]
    fn strict_truthiness_rejects_non_booleans() {
        assert_eq!(MsValue::from(1.0).truthy(Truthiness::Strict), None);
        assert_eq!(MsValue::from("x").truthy(Truthiness::Strict), None);
        assert_eq!(MsValue::from(false).truthy(Truthiness::Strict), Some(false));
    }

    #[test]
    fn numbers_display_without_trailing_fraction() {
        assert_eq!(MsValue::from(3.0).to_string(), "3");
        assert_eq!(MsValue::from(-1.0).to_string(), "-1");
        assert_eq!(MsValue::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn value_types_accept_matching_values() {
        assert!(ValueType::String.accepts(&MsValue::from("a")));
        assert!(!ValueType::String.accepts(&MsValue::from(1.0)));
        assert!(ValueType::Any.accepts(&MsValue::from(true)));
        assert_eq!(ValueType::Bool.default_value(), MsValue::Bool(false));
    }

    #[test]
    fn version_comparison_pads_missing_parts() {
        assert_eq!(compare_versions("1.2", "1.2.0"), Ok(Ordering::Equal));
        assert_eq!(compare_versions("1.10", "1.9"), Ok(Ordering::Greater));
        assert_eq!(compare_versions("0.9.1", "1.0"), Ok(Ordering::Less));
        assert!(compare_versions("1.x", "1.0").is_err());
    }
}
