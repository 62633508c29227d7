//! Parameter schemas and per-request parameter resolution.
//!
//! Callers send a flat `name -> value` map. Resolution fills defaults,
//! rejects unknown names, type mismatches, non-integral integers and
//! out-of-range values, and yields a [`ResolvedParams`] whose lookups cannot
//! miss for names declared in the schema.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StrategyError;

/// A single parameter value as received from the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Number(f64),
}

impl ParamValue {
    /// Parse a command-line style value: `true`/`false` or a number.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "true" => Some(Self::Bool(true)),
            "false" => Some(Self::Bool(false)),
            other => other.parse::<f64>().ok().map(Self::Number),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Raw request parameters.
pub type StrategyParams = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    Integer,
    Number,
    Bool,
}

/// Schema entry for one strategy parameter.
#[derive(Debug, Clone, Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub default: ParamValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub unit: Option<&'static str>,
    pub description: &'static str,
}

impl ParamSpec {
    pub const fn integer(name: &'static str, default: f64, min: f64, max: f64) -> Self {
        Self {
            name,
            ty: ParamType::Integer,
            default: ParamValue::Number(default),
            min: Some(min),
            max: Some(max),
            step: Some(1.0),
            unit: None,
            description: "",
        }
    }

    pub const fn number(name: &'static str, default: f64, min: f64, max: f64, step: f64) -> Self {
        Self {
            name,
            ty: ParamType::Number,
            default: ParamValue::Number(default),
            min: Some(min),
            max: Some(max),
            step: Some(step),
            unit: None,
            description: "",
        }
    }

    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            ty: ParamType::Bool,
            default: ParamValue::Bool(default),
            min: None,
            max: None,
            step: None,
            unit: None,
            description: "",
        }
    }

    pub const fn unit(mut self, unit: &'static str) -> Self {
        self.unit = Some(unit);
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Check `value` against this spec.
    fn validate(&self, value: ParamValue) -> Result<ParamValue, StrategyError> {
        match (self.ty, value) {
            (ParamType::Bool, ParamValue::Bool(_)) => Ok(value),
            (ParamType::Bool, ParamValue::Number(_)) => Err(StrategyError::config(format!(
                "parameter '{}' expects a boolean, got {value}",
                self.name
            ))),
            (_, ParamValue::Bool(_)) => Err(StrategyError::config(format!(
                "parameter '{}' expects a number, got {value}",
                self.name
            ))),
            (ty, ParamValue::Number(n)) => {
                if !n.is_finite() {
                    return Err(StrategyError::config(format!(
                        "parameter '{}' must be finite",
                        self.name
                    )));
                }
                if ty == ParamType::Integer && n.fract() != 0.0 {
                    return Err(StrategyError::config(format!(
                        "parameter '{}' must be a whole number, got {n}",
                        self.name
                    )));
                }
                let below = self.min.is_some_and(|min| n < min);
                let above = self.max.is_some_and(|max| n > max);
                if below || above {
                    return Err(StrategyError::config(format!(
                        "parameter '{}' = {n} is outside [{}, {}]",
                        self.name,
                        self.min.unwrap_or(f64::NEG_INFINITY),
                        self.max.unwrap_or(f64::INFINITY),
                    )));
                }
                Ok(value)
            }
        }
    }
}

/// Validated parameters with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedParams {
    values: BTreeMap<&'static str, ParamValue>,
}

impl ResolvedParams {
    pub fn resolve(specs: &[ParamSpec], raw: &StrategyParams) -> Result<Self, StrategyError> {
        if let Some(unknown) = raw.keys().find(|k| !specs.iter().any(|s| s.name == k.as_str())) {
            return Err(StrategyError::config(format!("unknown parameter '{unknown}'")));
        }
        let mut values = BTreeMap::new();
        for spec in specs {
            let value = match raw.get(spec.name) {
                Some(v) => spec.validate(*v)?,
                None => spec.default,
            };
            values.insert(spec.name, value);
        }
        Ok(Self { values })
    }

    pub fn number(&self, name: &str) -> Result<f64, StrategyError> {
        match self.values.get(name) {
            Some(ParamValue::Number(n)) => Ok(*n),
            Some(ParamValue::Bool(_)) => Err(StrategyError::config(format!(
                "parameter '{name}' is not numeric"
            ))),
            None => Err(StrategyError::config(format!("parameter '{name}' missing"))),
        }
    }

    /// Integer parameters are validated whole and within range, so the cast is exact.
    pub fn integer(&self, name: &str) -> Result<usize, StrategyError> {
        let n = self.number(name)?;
        if n < 0.0 {
            return Err(StrategyError::config(format!(
                "parameter '{name}' must be non-negative"
            )));
        }
        Ok(n as usize)
    }

    pub fn flag(&self, name: &str) -> Result<bool, StrategyError> {
        match self.values.get(name) {
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(ParamValue::Number(_)) => Err(StrategyError::config(format!(
                "parameter '{name}' is not a boolean"
            ))),
            None => Err(StrategyError::config(format!("parameter '{name}' missing"))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ParamValue)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPECS: &[ParamSpec] = &[
        ParamSpec::integer("period", 14.0, 5.0, 30.0),
        ParamSpec::number("ratio", 1.5, 1.0, 5.0, 0.1),
        ParamSpec::flag("enabled", false),
    ];

    fn params(pairs: &[(&str, ParamValue)]) -> StrategyParams {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn defaults_fill_missing() {
        let r = ResolvedParams::resolve(SPECS, &StrategyParams::new()).unwrap();
        assert_eq!(r.integer("period").unwrap(), 14);
        assert_eq!(r.number("ratio").unwrap(), 1.5);
        assert!(!r.flag("enabled").unwrap());
    }

    #[test]
    fn overrides_apply() {
        let raw = params(&[
            ("period", ParamValue::Number(20.0)),
            ("enabled", ParamValue::Bool(true)),
        ]);
        let r = ResolvedParams::resolve(SPECS, &raw).unwrap();
        assert_eq!(r.integer("period").unwrap(), 20);
        assert!(r.flag("enabled").unwrap());
    }

    #[test]
    fn unknown_key_rejected() {
        let raw = params(&[("perid", ParamValue::Number(20.0))]);
        let err = ResolvedParams::resolve(SPECS, &raw).unwrap_err();
        assert!(matches!(err, StrategyError::Configuration(m) if m.contains("perid")));
    }

    #[test]
    fn wrong_type_rejected() {
        let raw = params(&[("enabled", ParamValue::Number(1.0))]);
        assert!(ResolvedParams::resolve(SPECS, &raw).is_err());
        let raw = params(&[("ratio", ParamValue::Bool(true))]);
        assert!(ResolvedParams::resolve(SPECS, &raw).is_err());
    }

    #[test]
    fn range_and_integrality_enforced() {
        for bad in [4.0, 31.0, 14.5, f64::NAN] {
            let raw = params(&[("period", ParamValue::Number(bad))]);
            assert!(ResolvedParams::resolve(SPECS, &raw).is_err(), "accepted {bad}");
        }
        let raw = params(&[("period", ParamValue::Number(30.0))]);
        assert!(ResolvedParams::resolve(SPECS, &raw).is_ok());
    }

    #[test]
    fn parse_cli_values() {
        assert_eq!(ParamValue::parse("true"), Some(ParamValue::Bool(true)));
        assert_eq!(ParamValue::parse(" 2.5 "), Some(ParamValue::Number(2.5)));
        assert_eq!(ParamValue::parse("-10"), Some(ParamValue::Number(-10.0)));
        assert_eq!(ParamValue::parse("yes"), None);
    }

    #[test]
    fn untagged_json_values() {
        let raw: StrategyParams =
            serde_json::from_str(r#"{"period": 10, "enabled": true}"#).unwrap();
        assert_eq!(raw["period"], ParamValue::Number(10.0));
        assert_eq!(raw["enabled"], ParamValue::Bool(true));
    }
}
