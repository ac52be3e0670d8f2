// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON object (`json`) and array-of-pairs (`jsonArr`) formats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tether_core::{EnvRecord, Result, TetherError};

use super::last_wins;
use crate::format::{Formatter, InputData, InputFormat};

#[derive(Serialize, Deserialize)]
struct Pair {
    key: String,
    value: String,
}

/// `json` renders a sorted object, `jsonArr` an array of
/// `{"key": .., "value": ..}` in record order. Both indent by two spaces.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormat {
    as_array: bool,
}

impl JsonFormat {
    pub fn object() -> Self {
        Self { as_array: false }
    }

    pub fn array() -> Self {
        Self { as_array: true }
    }

    fn open(&self) -> u8 {
        if self.as_array { b'[' } else { b'{' }
    }
}

impl Formatter for JsonFormat {
    fn name(&self) -> &'static str {
        if self.as_array { "jsonArr" } else { "json" }
    }

    fn render(&self, records: &[EnvRecord]) -> Result<Vec<u8>> {
        if self.as_array {
            let pairs: Vec<Pair> = records
                .iter()
                .map(|r| Pair {
                    key: r.key.clone(),
                    value: r.value.clone(),
                })
                .collect();
            return Ok(serde_json::to_vec_pretty(&pairs)?);
        }
        Ok(serde_json::to_vec_pretty(&last_wins(records))?)
    }
}

impl InputFormat for JsonFormat {
    fn name(&self) -> &'static str {
        Formatter::name(self)
    }

    fn detect(&self, data: &[u8]) -> bool {
        let trimmed = data.trim_ascii();
        let close = if self.as_array { b']' } else { b'}' };
        trimmed.first() == Some(&self.open())
            && trimmed.last() == Some(&close)
            && serde_json::from_slice::<Value>(trimmed).is_ok()
    }

    /// Objects become maps with non-string values kept as JSON text.
    /// Arrays may hold plain strings or `{"key", "value"}` pairs.
    fn parse(&self, data: &[u8]) -> Result<InputData> {
        match serde_json::from_slice::<Value>(data)? {
            Value::Object(map) if !self.as_array => Ok(InputData::Map(
                map.into_iter().map(|(k, v)| (k, scalar(v))).collect(),
            )),
            Value::Array(items) if self.as_array => parse_array(items),
            _ => Err(TetherError::Serialization(format!(
                "expected a JSON {}",
                if self.as_array { "array" } else { "object" }
            ))),
        }
    }
}

fn scalar(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

fn parse_array(items: Vec<Value>) -> Result<InputData> {
    if items.iter().all(Value::is_string) {
        return Ok(InputData::List(items.into_iter().map(scalar).collect()));
    }
    let mut map = BTreeMap::new();
    for item in items {
        let pair: Pair = serde_json::from_value(item)?;
        map.insert(pair.key, pair.value);
    }
    Ok(InputData::Map(map))
}
