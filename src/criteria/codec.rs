//! Compact transport form of a criteria model
//!
//! Only non-empty raw values travel; parsed values are rebuilt on import
//! exactly as if the user had typed them.

use super::{Criteria, Operator, default_raw};
use serde_json::Value;
use std::collections::BTreeMap;

/// `field -> operator -> value`, as sent by clients or stored in a URL
pub type TransportCriteria = BTreeMap<String, BTreeMap<String, Value>>;

impl Criteria {
    /// Minimal transport form: empty entries and fields are dropped,
    /// `match` values are percent-encoded. A criterion cleared from a
    /// non-empty default is kept as `""` so that importing it does not
    /// bring the default back.
    pub fn export(&self) -> TransportCriteria {
        let mut out = TransportCriteria::new();
        for (field, fc) in self.iter() {
            let operators: BTreeMap<String, Value> = fc
                .iter()
                .filter(|(op, c)| !c.raw().is_empty() || !default_raw(field, *op).is_empty())
                .map(|(op, c)| {
                    let value = match op {
                        Operator::Match => urlencoding::encode(c.raw()).into_owned(),
                        _ => c.raw().to_string(),
                    };
                    (op.name().to_string(), Value::String(value))
                })
                .collect();
            if !operators.is_empty() {
                out.insert(field.name().to_string(), operators);
            }
        }
        out
    }

    /// Reset, then replay every transported entry through
    /// [`Criteria::set_criteria`]. Entries that cannot be applied are skipped.
    pub fn import(&mut self, transported: &TransportCriteria) {
        self.replay(transported, true);
    }

    /// Like [`Criteria::import`] for hand-written criteria files: `match`
    /// values are taken as typed, so `%20` stays a wildcard followed by `20`.
    pub fn import_raw(&mut self, transported: &TransportCriteria) {
        self.replay(transported, false);
    }

    fn replay(&mut self, transported: &TransportCriteria, decode: bool) {
        self.reset();
        for (field, operators) in transported {
            for (operator, value) in operators {
                // parsed entries are derived, never trusted from the outside
                if operator.starts_with('$') {
                    continue;
                }
                let Some(raw) = transport_value_to_raw(value) else {
                    tracing::warn!(field = %field, operator = %operator, "Skipping non-scalar criteria value");
                    continue;
                };
                let raw = if decode && operator == Operator::Match.name() {
                    decode_match(&raw)
                } else {
                    raw
                };
                if let Err(e) = self.set_criteria(field, operator, &raw) {
                    tracing::warn!(field = %field, operator = %operator, error = %e, "Skipping criteria entry");
                }
            }
        }
    }

    /// Build a fresh model from its transport form
    pub fn from_transport(transported: &TransportCriteria, timezone: super::Timezone) -> Self {
        let mut criteria = Criteria::new(timezone);
        criteria.import(transported);
        criteria
    }

    /// Build a fresh model from a criteria file, without percent-decoding
    pub fn from_file_form(transported: &TransportCriteria, timezone: super::Timezone) -> Self {
        let mut criteria = Criteria::new(timezone);
        criteria.import_raw(transported);
        criteria
    }

    /// Parse a transport form from JSON text (comments and trailing commas allowed)
    pub fn parse_transport(text: &str) -> Result<TransportCriteria, json5::Error> {
        json5::from_str(text)
    }
}

fn transport_value_to_raw(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn decode_match(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}
