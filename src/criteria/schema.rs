use super::error::CriteriaError;
use std::fmt;
use std::str::FromStr;

/// Comparison kinds a criterion can apply to a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    /// Lower time bound, inclusive
    Since,
    /// Upper time bound, inclusive
    Until,
    /// Wildcard pattern the value must match
    Match,
    /// Wildcard pattern the value must not match
    Exclude,
    /// Set of accepted tokens
    In,
    /// Lower integer bound, inclusive
    Min,
    /// Upper integer bound, inclusive
    Max,
}

impl Operator {
    /// Every operator, in the order conditions are emitted for one field
    pub const ALL: [Operator; 7] = [
        Operator::Since,
        Operator::Until,
        Operator::Match,
        Operator::Exclude,
        Operator::In,
        Operator::Min,
        Operator::Max,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Since => "since",
            Operator::Until => "until",
            Operator::Match => "match",
            Operator::Exclude => "exclude",
            Operator::In => "in",
            Operator::Min => "min",
            Operator::Max => "max",
        }
    }
}

impl FromStr for Operator {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| CriteriaError::InvalidOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns of the log message schema that criteria can constrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Timestamp,
    Hostname,
    Rolename,
    Pid,
    Username,
    System,
    Facility,
    Detector,
    Partition,
    Run,
    Errcode,
    Errline,
    Errsource,
    Message,
    Severity,
    Level,
}

const TIME_OPERATORS: &[Operator] = &[Operator::Since, Operator::Until];
const TEXT_OPERATORS: &[Operator] = &[Operator::Match, Operator::Exclude];
const NUMERIC_TEXT_OPERATORS: &[Operator] = &[
    Operator::Match,
    Operator::Exclude,
    Operator::Min,
    Operator::Max,
];
const SET_OPERATORS: &[Operator] = &[Operator::In];
const UPPER_BOUND_OPERATORS: &[Operator] = &[Operator::Max];

impl Field {
    /// Every field, in schema order
    pub const ALL: [Field; 16] = [
        Field::Timestamp,
        Field::Hostname,
        Field::Rolename,
        Field::Pid,
        Field::Username,
        Field::System,
        Field::Facility,
        Field::Detector,
        Field::Partition,
        Field::Run,
        Field::Errcode,
        Field::Errline,
        Field::Errsource,
        Field::Message,
        Field::Severity,
        Field::Level,
    ];

    /// Column name, used both as the record key and as the SQL identifier
    pub fn name(&self) -> &'static str {
        match self {
            Field::Timestamp => "timestamp",
            Field::Hostname => "hostname",
            Field::Rolename => "rolename",
            Field::Pid => "pid",
            Field::Username => "username",
            Field::System => "system",
            Field::Facility => "facility",
            Field::Detector => "detector",
            Field::Partition => "partition",
            Field::Run => "run",
            Field::Errcode => "errcode",
            Field::Errline => "errline",
            Field::Errsource => "errsource",
            Field::Message => "message",
            Field::Severity => "severity",
            Field::Level => "level",
        }
    }

    /// Operators this field accepts, in emission order
    pub fn operators(&self) -> &'static [Operator] {
        match self {
            Field::Timestamp => TIME_OPERATORS,
            Field::Pid | Field::Run | Field::Errcode | Field::Errline => NUMERIC_TEXT_OPERATORS,
            Field::Severity => SET_OPERATORS,
            Field::Level => UPPER_BOUND_OPERATORS,
            _ => TEXT_OPERATORS,
        }
    }

    pub fn supports(&self, operator: Operator) -> bool {
        self.operators().contains(&operator)
    }
}

impl FromStr for Field {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| CriteriaError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
