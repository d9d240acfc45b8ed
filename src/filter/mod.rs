//! Predicate compilation for live record streams
//!
//! A [`Criteria`](crate::criteria::Criteria) is compiled once into a
//! [`CompiledFilter`], which is then evaluated against every incoming
//! record. All criteria combine with AND logic; inside one field every
//! active operator must pass.
//!
//! # Operators
//!
//! ```text
//! in        value present and one of the tokens
//! match     value present and matching the wildcard pattern
//! exclude   value absent, or not matching the wildcard pattern
//! since     timestamp present and >= bound
//! until     timestamp present and <= bound
//! min/max   integer present and within the bound
//! ```

pub mod matcher;
pub mod pattern;

pub use matcher::{CompiledFilter, Record, compile};
pub use pattern::WildcardPattern;
