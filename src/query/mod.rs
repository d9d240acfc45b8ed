//! Translation of criteria into parameterized SQL
//!
//! The same [`Criteria`](crate::criteria::Criteria) that drives the live
//! filter is turned into `?`-placeholder fragments plus bound values, then
//! into a count statement and a rows statement.
//!
//! # Fragments
//!
//! ```text
//! since     `field`>=?                                  epoch seconds
//! until     `field`<=?                                  epoch seconds
//! match     `field` LIKE (?)                            pattern
//! exclude   (NOT(`field` LIKE (?)) OR `field` IS NULL)  pattern
//! in        `field` IN (?)                              token list
//! min       `field`>=?                                  integer
//! max       `field`<=?                                  integer
//! ```

pub mod builder;
pub mod conditions;
pub mod engine;
pub mod error;
pub mod store;

pub use conditions::{Conditions, criteria_as_string, criteria_as_verbose_string, to_conditions};
pub use engine::{QueryEngine, QueryOptions, QueryPlan, QueryResult, plan_query};
pub use error::QueryError;
pub use store::{SqlValue, Store, StoreError};
