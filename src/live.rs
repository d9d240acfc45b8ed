//! Live filtering of an incoming record stream
//!
//! A [`CriteriaSession`] owns the criteria edited by one client and
//! publishes every change as an immutable snapshot. [`filter_live`] follows
//! those snapshots and recompiles its predicate only when one arrives.

use crate::criteria::{Criteria, CriteriaError, Timezone, TransportCriteria};
use crate::filter::{CompiledFilter, Record};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use tokio::sync::watch;

/// Receiving end of a session's criteria updates
pub type CriteriaSubscription = watch::Receiver<Arc<Criteria>>;

/// Criteria edited by a single client, with change notification
#[derive(Debug)]
pub struct CriteriaSession {
    sender: watch::Sender<Arc<Criteria>>,
}

impl CriteriaSession {
    pub fn new(timezone: Timezone) -> Self {
        let (sender, _) = watch::channel(Arc::new(Criteria::new(timezone)));
        Self { sender }
    }

    /// Current snapshot
    pub fn current(&self) -> Arc<Criteria> {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> CriteriaSubscription {
        self.sender.subscribe()
    }

    /// Change one criterion. Subscribers are only notified when the raw
    /// value actually changed.
    pub fn set_criteria(
        &self,
        field: &str,
        operator: &str,
        value: &str,
    ) -> Result<bool, CriteriaError> {
        let mut next = Criteria::clone(&self.current());
        let changed = next.set_criteria(field, operator, value)?;
        if changed {
            self.sender.send_replace(Arc::new(next));
        }
        Ok(changed)
    }

    pub fn reset(&self) {
        let mut next = Criteria::clone(&self.current());
        next.reset();
        self.sender.send_replace(Arc::new(next));
    }

    /// Replace the whole model from its transport form, notifying once
    pub fn import(&self, transported: &TransportCriteria) {
        let next = Criteria::from_transport(transported, self.current().timezone());
        self.sender.send_replace(Arc::new(next));
    }

    pub fn export(&self) -> TransportCriteria {
        self.current().export()
    }
}

impl Default for CriteriaSession {
    fn default() -> Self {
        Self::new(Timezone::default())
    }
}

/// Keep only the records passing the latest criteria snapshot.
///
/// The predicate is rebuilt when the subscription reports a change and
/// reused for every record in between. If the session goes away the last
/// snapshot stays in force.
pub fn filter_live<S>(records: S, mut criteria: CriteriaSubscription) -> impl Stream<Item = Record>
where
    S: Stream<Item = Record>,
{
    async_stream::stream! {
        let mut filter = CompiledFilter::compile(&criteria.borrow_and_update());
        futures::pin_mut!(records);

        while let Some(record) = records.next().await {
            if criteria.has_changed().unwrap_or(false) {
                filter = CompiledFilter::compile(&criteria.borrow_and_update());
                tracing::trace!(checks = filter.len(), "Live filter recompiled");
            }
            if filter.matches(&record) {
                yield record;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_set_does_not_notify() {
        let session = CriteriaSession::default();
        let mut sub = session.subscribe();
        sub.borrow_and_update();

        assert!(session.set_criteria("hostname", "match", "a%").unwrap());
        assert!(sub.has_changed().unwrap());
        sub.borrow_and_update();

        assert!(!session.set_criteria("hostname", "match", "a%").unwrap());
        assert!(!sub.has_changed().unwrap());
    }

    #[test]
    fn test_failed_set_does_not_notify() {
        let session = CriteriaSession::default();
        let mut sub = session.subscribe();
        sub.borrow_and_update();

        assert!(session.set_criteria("hostname", "between", "x").is_err());
        assert!(!sub.has_changed().unwrap());
    }

    #[test]
    fn test_snapshots_are_immutable() {
        let session = CriteriaSession::default();
        let before = session.current();
        session.set_criteria("level", "max", "6").unwrap();
        assert_ne!(*before, *session.current());
        assert_eq!(before.raw(crate::criteria::Field::Level, crate::criteria::Operator::Max), Some(""));
    }
}
