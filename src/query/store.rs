use crate::filter::Record;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A value bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    /// Expanded by the store into a comma-separated list (`IN (?)`)
    List(Vec<String>),
}

impl fmt::Display for SqlValue {
    /// Literal rendering for humans; not escaped, never executed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Float(x) => write!(f, "{x}"),
            SqlValue::Text(s) => write!(f, "'{s}'"),
            SqlValue::List(items) => {
                let quoted: Vec<String> = items.iter().map(|s| format!("'{s}'")).collect();
                write!(f, "({})", quoted.join(","))
            }
        }
    }
}

/// Failure reported by the relational store, passed through untouched
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Connection able to run one parameterized statement.
///
/// Implementations own pooling, timeouts and retries.
#[async_trait]
pub trait Store: Send + Sync {
    async fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<Record>, StoreError>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn execute(&self, sql: &str, values: &[SqlValue]) -> Result<Vec<Record>, StoreError> {
        (**self).execute(sql, values).await
    }
}
