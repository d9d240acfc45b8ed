//! Criteria model
//!
//! A [`Criteria`] holds, for every field of the log schema, the raw value
//! the user typed for each supported operator together with its parsed
//! counterpart. The parsed value is recomputed on every update so both
//! compilers can read it without parsing anything themselves.
//!
//! # Example
//!
//! ```text
//! severity.in     = "W E F"      -> Tokens(["W", "E", "F"])
//! hostname.match  = "aldaq%"     -> Pattern("aldaq%")
//! timestamp.since = "-5"         -> Instant(now - 5 minutes)
//! level.max       = "6"          -> Integer(6)
//! ```

pub mod codec;
pub mod error;
pub mod parse;
pub mod schema;

pub use codec::TransportCriteria;
pub use error::CriteriaError;
pub use parse::Timezone;
pub use schema::{Field, Operator};

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Default accepted severities (info, warning, error, fatal)
pub const DEFAULT_SEVERITIES: &str = "I W E F";

/// Raw value a criterion takes on reset
pub fn default_raw(field: Field, operator: Operator) -> &'static str {
    match (field, operator) {
        (Field::Severity, Operator::In) => DEFAULT_SEVERITIES,
        _ => "",
    }
}

/// Typed counterpart of a raw operator value
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// Wildcard pattern (`%` any run, `_` any character)
    Pattern(String),
    /// Absolute instant; `None` when the input was not a date
    Instant(Option<DateTime<Utc>>),
    /// Integer bound; `None` when the input was not a number
    Integer(Option<i64>),
    /// Accepted tokens, in the order typed
    Tokens(Vec<String>),
}

/// Raw and parsed value of one operator on one field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraint {
    raw: String,
    parsed: Option<Parsed>,
}

impl Constraint {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `None` when the criterion is not set and must not constrain anything
    pub fn parsed(&self) -> Option<&Parsed> {
        self.parsed.as_ref()
    }
}

/// Every operator entry of a single field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldCriteria {
    constraints: BTreeMap<Operator, Constraint>,
}

impl FieldCriteria {
    fn empty(field: Field) -> Self {
        Self {
            constraints: field
                .operators()
                .iter()
                .map(|op| (*op, Constraint::default()))
                .collect(),
        }
    }

    pub fn get(&self, operator: Operator) -> Option<&Constraint> {
        self.constraints.get(&operator)
    }

    /// Operator entries in emission order
    pub fn iter(&self) -> impl Iterator<Item = (Operator, &Constraint)> {
        self.constraints.iter().map(|(op, c)| (*op, c))
    }
}

/// Full set of per-field constraints for one session or query
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    fields: BTreeMap<Field, FieldCriteria>,
    timezone: Timezone,
}

impl Default for Criteria {
    fn default() -> Self {
        Self::new(Timezone::default())
    }
}

impl Criteria {
    /// Create a model with every field reset to its default
    pub fn new(timezone: Timezone) -> Self {
        let mut criteria = Self {
            fields: BTreeMap::new(),
            timezone,
        };
        criteria.reset();
        criteria
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Reset every field: all empty except `severity.in`, which accepts
    /// every severity but debug.
    pub fn reset(&mut self) {
        self.fields = Field::ALL
            .iter()
            .map(|field| (*field, FieldCriteria::empty(*field)))
            .collect();
        let now = Utc::now();
        for field in Field::ALL {
            for operator in field.operators() {
                let raw = default_raw(field, *operator);
                if !raw.is_empty() {
                    self.assign(field, *operator, raw, now);
                }
            }
        }
    }

    /// Pure update: a copy of this model with one criterion changed
    pub fn with_criteria(
        &self,
        field: &str,
        operator: &str,
        value: &str,
    ) -> Result<Criteria, CriteriaError> {
        let mut next = self.clone();
        next.set_criteria(field, operator, value)?;
        Ok(next)
    }

    /// Set one criterion from untyped input, returning whether it changed
    pub fn set_criteria(
        &mut self,
        field: &str,
        operator: &str,
        value: &str,
    ) -> Result<bool, CriteriaError> {
        let operator: Operator = operator.parse()?;
        let field: Field = field.parse()?;
        self.set(field, operator, value)
    }

    /// Set one criterion, returning whether the raw value changed
    pub fn set(
        &mut self,
        field: Field,
        operator: Operator,
        value: &str,
    ) -> Result<bool, CriteriaError> {
        self.set_at(field, operator, value, Utc::now())
    }

    /// Like [`Criteria::set`], resolving relative times against `now`
    pub fn set_at(
        &mut self,
        field: Field,
        operator: Operator,
        value: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, CriteriaError> {
        if !field.supports(operator) {
            return Err(CriteriaError::UnsupportedOperator {
                field: field.name(),
                operator: operator.name(),
            });
        }
        if self.raw(field, operator) == Some(value) {
            return Ok(false);
        }
        self.assign(field, operator, value, now);
        Ok(true)
    }

    fn assign(&mut self, field: Field, operator: Operator, value: &str, now: DateTime<Utc>) {
        let parsed = self.parse_value(operator, value, now);
        let constraint = Constraint {
            raw: value.to_string(),
            parsed,
        };
        self.fields
            .entry(field)
            .or_insert_with(|| FieldCriteria::empty(field))
            .constraints
            .insert(operator, constraint);
    }

    fn parse_value(&self, operator: Operator, value: &str, now: DateTime<Utc>) -> Option<Parsed> {
        if value.trim().is_empty() && !matches!(operator, Operator::Match | Operator::Exclude) {
            return None;
        }
        match operator {
            Operator::Since | Operator::Until => {
                Some(Parsed::Instant(self.timezone.parse_at(value, now)))
            }
            Operator::Min | Operator::Max => {
                Some(Parsed::Integer(parse::parse_leading_int(value)))
            }
            Operator::Match | Operator::Exclude => {
                (!value.is_empty()).then(|| Parsed::Pattern(value.to_string()))
            }
            Operator::In => Some(Parsed::Tokens(parse::split_tokens(value))),
        }
    }

    pub fn field(&self, field: Field) -> Option<&FieldCriteria> {
        self.fields.get(&field)
    }

    pub fn get(&self, field: Field, operator: Operator) -> Option<&Constraint> {
        self.fields.get(&field)?.get(operator)
    }

    pub fn raw(&self, field: Field, operator: Operator) -> Option<&str> {
        self.get(field, operator).map(Constraint::raw)
    }

    pub fn parsed(&self, field: Field, operator: Operator) -> Option<&Parsed> {
        self.get(field, operator)?.parsed()
    }

    /// Fields in schema order
    pub fn iter(&self) -> impl Iterator<Item = (Field, &FieldCriteria)> {
        self.fields.iter().map(|(field, fc)| (*field, fc))
    }

    /// Every set criterion, in field then operator order
    pub fn active(&self) -> impl Iterator<Item = (Field, Operator, &Parsed)> {
        self.iter().flat_map(|(field, fc)| {
            fc.iter()
                .filter_map(move |(op, c)| c.parsed().map(|parsed| (field, op, parsed)))
        })
    }

    /// True when no criterion constrains anything
    pub fn is_unconstrained(&self) -> bool {
        self.active().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_defaults() {
        let criteria = Criteria::default();
        assert_eq!(criteria.iter().count(), Field::ALL.len());
        assert_eq!(criteria.raw(Field::Severity, Operator::In), Some("I W E F"));
        assert_eq!(
            criteria.parsed(Field::Severity, Operator::In),
            Some(&Parsed::Tokens(vec![
                "I".to_string(),
                "W".to_string(),
                "E".to_string(),
                "F".to_string()
            ]))
        );
        assert_eq!(criteria.raw(Field::Hostname, Operator::Match), Some(""));
        assert_eq!(criteria.parsed(Field::Hostname, Operator::Match), None);
        assert_eq!(criteria.active().count(), 1);
    }

    #[test]
    fn test_set_criteria_updates_parsed_value() {
        let mut criteria = Criteria::default();
        assert!(criteria.set_criteria("level", "max", "6").unwrap());
        assert_eq!(
            criteria.parsed(Field::Level, Operator::Max),
            Some(&Parsed::Integer(Some(6)))
        );

        assert!(criteria.set_criteria("level", "max", "").unwrap());
        assert_eq!(criteria.parsed(Field::Level, Operator::Max), None);
    }

    #[test]
    fn test_set_same_value_reports_unchanged() {
        let mut criteria = Criteria::default();
        assert!(criteria.set_criteria("hostname", "match", "alio2%").unwrap());
        assert!(!criteria.set_criteria("hostname", "match", "alio2%").unwrap());
    }

    #[test]
    fn test_invalid_numbers_degrade() {
        let mut criteria = Criteria::default();
        criteria.set_criteria("pid", "min", "abc").unwrap();
        assert_eq!(
            criteria.parsed(Field::Pid, Operator::Min),
            Some(&Parsed::Integer(None))
        );
    }

    #[test]
    fn test_invalid_operator_leaves_model_untouched() {
        let mut criteria = Criteria::default();
        criteria.set_criteria("hostname", "match", "a%").unwrap();
        let before = criteria.clone();

        assert_eq!(
            criteria.set_criteria("hostname", "like", "b%"),
            Err(CriteriaError::InvalidOperator("like".to_string()))
        );
        assert_eq!(
            criteria.set_criteria("userId", "min", "10"),
            Err(CriteriaError::UnknownField("userId".to_string()))
        );
        assert_eq!(
            criteria.set_criteria("userId", "like", "x"),
            Err(CriteriaError::InvalidOperator("like".to_string()))
        );
        assert!(matches!(
            criteria.set_criteria("hostname", "since", "-5"),
            Err(CriteriaError::UnsupportedOperator { .. })
        ));
        assert_eq!(criteria, before);
    }

    #[test]
    fn test_with_criteria_is_pure() {
        let original = Criteria::default();
        let updated = original.with_criteria("message", "exclude", "%heartbeat%").unwrap();

        assert_eq!(original.parsed(Field::Message, Operator::Exclude), None);
        assert_eq!(
            updated.parsed(Field::Message, Operator::Exclude),
            Some(&Parsed::Pattern("%heartbeat%".to_string()))
        );
    }

    #[test]
    fn test_active_order_follows_schema() {
        let mut criteria = Criteria::default();
        criteria.set_criteria("level", "max", "11").unwrap();
        criteria.set_criteria("hostname", "exclude", "b").unwrap();
        criteria.set_criteria("hostname", "match", "a").unwrap();
        criteria.set_criteria("timestamp", "until", "-1").unwrap();

        let order: Vec<(Field, Operator)> = criteria.active().map(|(f, o, _)| (f, o)).collect();
        assert_eq!(
            order,
            vec![
                (Field::Timestamp, Operator::Until),
                (Field::Hostname, Operator::Match),
                (Field::Hostname, Operator::Exclude),
                (Field::Severity, Operator::In),
                (Field::Level, Operator::Max),
            ]
        );
    }
}
