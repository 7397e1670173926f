//! Declarative input schemas: types, bounds, enumerations and defaults.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ValidationError, Violation};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FieldKind {
    Integer {
        min: i64,
        max: i64,
    },
    String {
        min_length: usize,
        max_length: usize,
    },
    Enum {
        values: &'static [&'static str],
    },
    /// Array of distinct enum values.
    EnumSet {
        values: &'static [&'static str],
        min_items: usize,
        max_items: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldRule {
    pub name: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldRule {
    pub fn integer(name: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            name,
            kind: FieldKind::Integer { min, max },
            required: false,
            default: Some(Value::from(default)),
        }
    }

    pub fn string(name: &'static str, min_length: usize, max_length: usize) -> Self {
        Self {
            name,
            kind: FieldKind::String {
                min_length,
                max_length,
            },
            required: true,
            default: None,
        }
    }

    pub fn one_of(
        name: &'static str,
        values: &'static [&'static str],
        default: &'static str,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::Enum { values },
            required: false,
            default: Some(Value::from(default)),
        }
    }

    pub fn distinct_set(
        name: &'static str,
        values: &'static [&'static str],
        min_items: usize,
        max_items: usize,
    ) -> Self {
        Self {
            name,
            kind: FieldKind::EnumSet {
                values,
                min_items,
                max_items,
            },
            required: true,
            default: None,
        }
    }

    fn check(&self, value: &Value) -> Result<(), Violation> {
        match &self.kind {
            FieldKind::Integer { min, max } => {
                let out_of_range = Violation::OutOfRange {
                    min: *min,
                    max: *max,
                };
                match as_integer(value) {
                    Some(n) if (*min..=*max).contains(&n) => Ok(()),
                    Some(_) => Err(out_of_range),
                    // whole numbers beyond i64 are still integers
                    None if is_whole_number(value) => Err(out_of_range),
                    None => Err(Violation::WrongType {
                        expected: "integer",
                    }),
                }
            }
            FieldKind::String {
                min_length,
                max_length,
            } => {
                let s = value.as_str().ok_or(Violation::WrongType {
                    expected: "string",
                })?;
                let len = s.chars().count();
                if len < *min_length {
                    return Err(Violation::TooShort { min: *min_length });
                }
                if len > *max_length {
                    return Err(Violation::TooLong { max: *max_length });
                }
                Ok(())
            }
            FieldKind::Enum { values } => check_enum(value, values),
            FieldKind::EnumSet {
                values,
                min_items,
                max_items,
            } => {
                let items = value.as_array().ok_or(Violation::WrongType {
                    expected: "array",
                })?;
                if items.len() < *min_items {
                    return Err(Violation::TooFewItems { min: *min_items });
                }
                if items.len() > *max_items {
                    return Err(Violation::TooManyItems { max: *max_items });
                }
                let mut seen = HashSet::with_capacity(items.len());
                for item in items {
                    check_enum(item, values)?;
                    let s = item.as_str().unwrap_or_default();
                    if !seen.insert(s) {
                        return Err(Violation::Duplicate {
                            value: s.to_string(),
                        });
                    }
                }
                Ok(())
            }
        }
    }

    /// Integer values are normalized so `5.0` is stored as `5`.
    fn normalize(&self, value: Value) -> Value {
        match self.kind {
            FieldKind::Integer { .. } => as_integer(&value).map(Value::from).unwrap_or(value),
            _ => value,
        }
    }
}

fn check_enum(value: &Value, values: &'static [&'static str]) -> Result<(), Violation> {
    let s = value.as_str().ok_or(Violation::WrongType {
        expected: "string",
    })?;
    if values.contains(&s) {
        Ok(())
    } else {
        Err(Violation::NotAllowed { allowed: values })
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    (f.fract() == 0.0 && f.abs() < i64::MAX as f64).then_some(f as i64)
}

fn is_whole_number(value: &Value) -> bool {
    value.is_u64() || value.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
}

/// Structural constraints of one entrypoint's input.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputSchema {
    pub fields: Vec<FieldRule>,
}

impl InputSchema {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    /// Validate `raw` and return the input object with defaults applied.
    /// `null` counts as an empty object and unknown keys are dropped.
    pub fn validate(&self, raw: &Value) -> Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let obj = match raw {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => {
                return Err(ValidationError::new(
                    "input",
                    Violation::WrongType { expected: "object" },
                ))
            }
        };

        let mut out = Map::new();
        for rule in &self.fields {
            match obj.get(rule.name).filter(|v| !v.is_null()) {
                Some(value) => {
                    rule.check(value)
                        .map_err(|v| ValidationError::new(rule.name, v))?;
                    out.insert(rule.name.to_string(), rule.normalize(value.clone()));
                }
                None => {
                    if let Some(default) = &rule.default {
                        out.insert(rule.name.to_string(), default.clone());
                    } else if rule.required {
                        return Err(ValidationError::new(rule.name, Violation::Missing));
                    }
                }
            }
        }
        Ok(out)
    }
}
