use super::pattern::{WildcardPattern, strip_line_breaks};
use crate::criteria::parse::{epoch_seconds, parse_leading_int};
use crate::criteria::{Criteria, Field, Operator, Parsed};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::Arc;

/// One structured log record: field name to value
pub type Record = serde_json::Map<String, Value>;

#[derive(Debug, Clone)]
enum Check {
    In(HashSet<String>),
    Match(WildcardPattern),
    Exclude(WildcardPattern),
    Since(f64),
    Until(f64),
    Min(i64),
    Max(i64),
    /// Malformed criterion: no record passes
    Never,
}

#[derive(Debug, Clone)]
struct FieldCheck {
    key: &'static str,
    check: Check,
}

impl FieldCheck {
    fn passes(&self, value: Option<&Value>) -> bool {
        let value = value.filter(|v| !v.is_null());
        match &self.check {
            Check::In(set) => value
                .and_then(value_as_text)
                .is_some_and(|text| set.contains(text.as_ref())),
            Check::Match(pattern) => value
                .and_then(value_as_text)
                .is_some_and(|text| pattern.matches(&strip_line_breaks(&text))),
            // an absent value cannot be excluded
            Check::Exclude(pattern) => value
                .and_then(value_as_text)
                .is_none_or(|text| !pattern.matches(&strip_line_breaks(&text))),
            Check::Since(bound) => value
                .and_then(value_as_seconds)
                .is_some_and(|secs| secs >= *bound),
            Check::Until(bound) => value
                .and_then(value_as_seconds)
                .is_some_and(|secs| secs <= *bound),
            Check::Min(bound) => value.and_then(value_as_int).is_some_and(|n| n >= *bound),
            Check::Max(bound) => value.and_then(value_as_int).is_some_and(|n| n <= *bound),
            Check::Never => false,
        }
    }
}

/// Criteria compiled once into a flat list of checks.
///
/// Everything derived from the criteria (patterns, bounds, token sets) is
/// resolved at compile time; evaluating a record only reads the record.
#[derive(Debug, Clone, Default)]
pub struct CompiledFilter {
    checks: Arc<[FieldCheck]>,
}

impl CompiledFilter {
    pub fn compile(criteria: &Criteria) -> Self {
        let checks: Vec<FieldCheck> = criteria
            .active()
            .map(|(field, operator, parsed)| FieldCheck {
                key: field.name(),
                check: compile_check(field, operator, parsed),
            })
            .collect();
        tracing::trace!(checks = checks.len(), "Compiled criteria filter");
        Self {
            checks: checks.into(),
        }
    }

    /// True when the record satisfies every active criterion
    pub fn matches(&self, record: &Record) -> bool {
        self.checks
            .iter()
            .all(|check| check.passes(record.get(check.key)))
    }

    /// Number of active checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Turn the filter into a plain predicate closure
    pub fn into_predicate(self) -> impl Fn(&Record) -> bool + Clone + Send + Sync + 'static {
        move |record| self.matches(record)
    }
}

/// Compile criteria straight into a predicate closure
pub fn compile(criteria: &Criteria) -> impl Fn(&Record) -> bool + Clone + Send + Sync + 'static {
    CompiledFilter::compile(criteria).into_predicate()
}

fn compile_check(field: Field, operator: Operator, parsed: &Parsed) -> Check {
    match (operator, parsed) {
        (Operator::In, Parsed::Tokens(tokens)) => Check::In(tokens.iter().cloned().collect()),
        (Operator::Match, Parsed::Pattern(p)) => WildcardPattern::compile(p)
            .map(Check::Match)
            .unwrap_or(Check::Never),
        (Operator::Exclude, Parsed::Pattern(p)) => WildcardPattern::compile(p)
            .map(Check::Exclude)
            .unwrap_or(Check::Never),
        (Operator::Since, Parsed::Instant(Some(at))) => Check::Since(epoch_seconds(at)),
        (Operator::Until, Parsed::Instant(Some(at))) => Check::Until(epoch_seconds(at)),
        (Operator::Min, Parsed::Integer(Some(n))) => Check::Min(*n),
        (Operator::Max, Parsed::Integer(Some(n))) => Check::Max(*n),
        _ => {
            tracing::debug!(field = %field, operator = %operator, "Criterion can never match");
            Check::Never
        }
    }
}

fn value_as_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Null => None,
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// Record timestamps are fractional epoch seconds
fn value_as_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|secs| secs.is_finite()),
        _ => None,
    }
}

fn value_as_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}
