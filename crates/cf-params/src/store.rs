//! Flat parameter store keyed by dotted channel-scoped names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{BlockKind, ParamError, ParamResult};

/// A stored parameter. Text values are accepted where they parse as numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParameterValue {
    Number(f64),
    Text(String),
}

impl ParameterValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Number(v) => Some(*v),
            ParameterValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Number(v)
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        ParameterValue::Text(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        ParameterValue::Text(s)
    }
}

/// `"<channel>.<name>"`
pub fn channel_key(channel: &str, name: &str) -> String {
    format!("{channel}.{name}")
}

/// `"<channel>.<name>[<index + 1>]"`; stored arrays are 1-based.
pub fn indexed_key(channel: &str, name: &str, index: usize) -> String {
    format!("{channel}.{name}[{}]", index + 1)
}

/// Largest node count `get_count` accepts.
pub const MAX_COUNT: usize = 100_000;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ParameterStore {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.values.iter()
    }

    /// Numeric value of `key`. A missing key yields `Ok(None)`.
    pub fn try_f64(&self, key: &str) -> ParamResult<Option<f64>> {
        match self.values.get(key) {
            None => Ok(None),
            Some(value) => value.as_f64().map(Some).ok_or_else(|| non_numeric(key, value)),
        }
    }

    pub fn get_f64(&self, key: &str) -> ParamResult<f64> {
        self.try_f64(key)?.ok_or_else(|| ParamError::NotFound {
            key: key.to_string(),
        })
    }

    /// Node count stored at `key`; fractional counts are truncated.
    pub fn get_count(&self, key: &str) -> ParamResult<usize> {
        let value = self.get_f64(key)?;
        if !value.is_finite() || value < 0.0 || value.trunc() > MAX_COUNT as f64 {
            return Err(ParamError::InvalidCount {
                key: key.to_string(),
                value,
            });
        }
        Ok(value.trunc() as usize)
    }

    /// Fails on the first of `names` missing under `channel`.
    pub fn require(&self, channel: &str, block: BlockKind, names: &[&str]) -> ParamResult<()> {
        for name in names {
            let key = channel_key(channel, name);
            if !self.contains(&key) {
                return Err(ParamError::MissingParameter {
                    key,
                    block,
                    channel: channel.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Writes `values` as `"<channel>.<name>[1..]"`.
    pub fn set_indexed(&mut self, channel: &str, name: &str, values: &[f64]) {
        for (i, v) in values.iter().enumerate() {
            self.insert(indexed_key(channel, name, i), *v);
        }
    }
}

impl FromIterator<(String, ParameterValue)> for ParameterStore {
    fn from_iter<I: IntoIterator<Item = (String, ParameterValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

fn non_numeric(key: &str, value: &ParameterValue) -> ParamError {
    let value = match value {
        ParameterValue::Number(v) => v.to_string(),
        ParameterValue::Text(s) => s.clone(),
    };
    ParamError::NonNumeric {
        key: key.to_string(),
        value,
    }
}
