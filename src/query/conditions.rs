use super::store::SqlValue;
use crate::criteria::parse::epoch_seconds;
use crate::criteria::{Criteria, Operator, Parsed};
use chrono::SecondsFormat;
use serde::Serialize;

/// Parameterized translation of a criteria model.
///
/// The three lists run in parallel: `criteria[i]` binds `values[i]` and is
/// displayed as `verbose[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Conditions {
    pub values: Vec<SqlValue>,
    pub criteria: Vec<String>,
    pub verbose: Vec<String>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    fn push(&mut self, fragment: String, value: SqlValue, verbose: String) {
        self.criteria.push(fragment);
        self.values.push(value);
        self.verbose.push(verbose);
    }
}

/// Translate every active criterion into a SQL fragment, in field then
/// operator order. Fields come from the fixed schema, so the identifiers
/// are never user text.
pub fn to_conditions(criteria: &Criteria) -> Conditions {
    let mut conditions = Conditions::default();

    for (field, operator, parsed) in criteria.active() {
        let column = quote_identifier(field.name());
        let value = bound_value(parsed);
        let shown = display_value(parsed, &value);

        let (fragment, verbose) = match operator {
            Operator::Since | Operator::Min => {
                (format!("{column}>=?"), format!("{column}>={shown}"))
            }
            Operator::Until | Operator::Max => {
                (format!("{column}<=?"), format!("{column}<={shown}"))
            }
            Operator::Match => (
                format!("{column} LIKE (?)"),
                format!("{column} LIKE {shown}"),
            ),
            Operator::Exclude => (
                format!("(NOT({column} LIKE (?)) OR {column} IS NULL)"),
                format!("(NOT({column} LIKE {shown}) OR {column} IS NULL)"),
            ),
            Operator::In => (format!("{column} IN (?)"), format!("{column} IN {shown}")),
        };

        conditions.push(fragment, value, verbose);
    }

    conditions
}

fn bound_value(parsed: &Parsed) -> SqlValue {
    match parsed {
        Parsed::Instant(Some(at)) => SqlValue::Float(epoch_seconds(at)),
        Parsed::Integer(Some(n)) => SqlValue::Integer(*n),
        Parsed::Pattern(p) => SqlValue::Text(p.clone()),
        Parsed::Tokens(tokens) => SqlValue::List(tokens.clone()),
        // unknown compares to nothing, like the live filter
        Parsed::Instant(None) | Parsed::Integer(None) => SqlValue::Null,
    }
}

fn display_value(parsed: &Parsed, value: &SqlValue) -> String {
    match parsed {
        Parsed::Instant(Some(at)) => {
            format!("'{}'", at.to_rfc3339_opts(SecondsFormat::Millis, true))
        }
        _ => value.to_string(),
    }
}

/// Wrap a column or table name in backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `WHERE a AND b ...`, or an empty string when there is nothing to filter
pub fn criteria_as_string(fragments: &[String]) -> String {
    if fragments.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", fragments.join(" AND "))
    }
}

/// Same join as [`criteria_as_string`], over the display fragments
pub fn criteria_as_verbose_string(verbose: &[String]) -> String {
    criteria_as_string(verbose)
}
