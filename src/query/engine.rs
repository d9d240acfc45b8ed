use super::conditions::{criteria_as_string, criteria_as_verbose_string, to_conditions};
use super::error::QueryError;
use super::store::Store;
use crate::config::QueryRules;
use crate::criteria::Criteria;
use crate::filter::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

/// Caller-supplied paging options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    pub limit: u32,
}

impl QueryOptions {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

/// Statements produced for one query, before execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    pub rows_sql: String,
    pub count_sql: String,
    pub values: Vec<super::SqlValue>,
    pub query_as_string: String,
}

/// Envelope returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub rows: Vec<Record>,
    /// Matching rows, capped at the count ceiling
    pub total: u64,
    /// Rows actually returned
    pub count: usize,
    /// The ceiling was exceeded; the real total is unknown
    pub more: bool,
    pub limit: u32,
    pub query_as_string: String,
    /// Milliseconds spent in the store
    pub time: u64,
}

/// Runs criteria queries against a [`Store`]
pub struct QueryEngine<S> {
    store: S,
    rules: QueryRules,
}

impl<S: Store> QueryEngine<S> {
    pub fn new(store: S, rules: QueryRules) -> Self {
        Self { store, rules }
    }

    pub fn rules(&self) -> &QueryRules {
        &self.rules
    }

    /// Build the count, rows and display statements for `criteria`
    pub fn plan(&self, criteria: &Criteria, options: &QueryOptions) -> Result<QueryPlan, QueryError> {
        plan_query(&self.rules, criteria, options)
    }

    /// Count and fetch the rows matching `filters`.
    ///
    /// Both statements run concurrently; a failure in either aborts the
    /// whole call with the store's own error.
    pub async fn query_from_filters(
        &self,
        filters: Option<&Criteria>,
        options: &QueryOptions,
    ) -> Result<QueryResult, QueryError> {
        let criteria = filters.ok_or(QueryError::MissingFilters)?;
        let plan = self.plan(criteria, options)?;
        tracing::debug!(sql = %plan.rows_sql, values = plan.values.len(), "Querying messages");

        let started = Instant::now();
        let (count_rows, rows) = tokio::try_join!(
            self.store.execute(&plan.count_sql, &plan.values),
            self.store.execute(&plan.rows_sql, &plan.values),
        )?;
        let time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let counted = read_total(&count_rows).ok_or(QueryError::MalformedCount)?;
        let ceiling = self.rules.count_ceiling;
        tracing::debug!(counted, rows = rows.len(), time_ms = time, "Query finished");

        Ok(QueryResult {
            total: counted.min(ceiling),
            more: counted > ceiling,
            count: rows.len(),
            rows,
            limit: options.limit,
            query_as_string: plan.query_as_string,
            time,
        })
    }
}

/// Build the statements for `criteria` without touching any store
pub fn plan_query(
    rules: &QueryRules,
    criteria: &Criteria,
    options: &QueryOptions,
) -> Result<QueryPlan, QueryError> {
    if options.limit == 0 {
        return Err(QueryError::InvalidLimit(options.limit));
    }

    let conditions = to_conditions(criteria);
    let where_clause = criteria_as_string(&conditions.criteria);

    Ok(QueryPlan {
        rows_sql: rules.rows_query(&where_clause, options.limit),
        count_sql: rules.count_query(&where_clause),
        query_as_string: rules.verbose_query(
            &criteria_as_verbose_string(&conditions.verbose),
            options.limit,
        ),
        values: conditions.values,
    })
}

fn read_total(rows: &[Record]) -> Option<u64> {
    match rows.first()?.get("total")? {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
