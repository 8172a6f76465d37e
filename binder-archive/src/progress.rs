//! Progress aggregation
//!
//! Long operations report a fraction in `[0, 1]`. When several run as
//! part of one job, an [`AggregateProgress`] fans their reports into a
//! single downstream sink carrying the arithmetic mean. All child state
//! lives under one mutex; this is nowhere near a hot path.

use parking_lot::Mutex;
use std::sync::Arc;

type Sink = Box<dyn Fn(f64) + Send + Sync>;

struct Inner {
    children: Mutex<Vec<f64>>,
    sink: Sink,
}

/// Combines N child progress sources into one averaged report.
#[derive(Clone)]
pub struct AggregateProgress {
    inner: Arc<Inner>,
}

impl AggregateProgress {
    pub fn new(sink: impl Fn(f64) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                children: Mutex::new(Vec::new()),
                sink: Box::new(sink),
            }),
        }
    }

    /// Add a child source, starting at 0.
    pub fn attach(&self) -> ProgressHandle {
        let mut children = self.inner.children.lock();
        children.push(0.0);
        ProgressHandle {
            inner: Arc::clone(&self.inner),
            index: children.len() - 1,
        }
    }
}

/// One child source of an [`AggregateProgress`].
#[derive(Clone)]
pub struct ProgressHandle {
    inner: Arc<Inner>,
    index: usize,
}

impl ProgressHandle {
    /// Report this child's fraction and forward the new mean downstream.
    pub fn report(&self, fraction: f64) {
        let mut children = self.inner.children.lock();
        children[self.index] = fraction.clamp(0.0, 1.0);
        let mean = children.iter().sum::<f64>() / children.len() as f64;
        drop(children);
        (self.inner.sink)(mean);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn recording() -> (AggregateProgress, Arc<AtomicU64>) {
        let last = Arc::new(AtomicU64::new(0));
        let sink_last = Arc::clone(&last);
        let aggregate = AggregateProgress::new(move |mean| {
            sink_last.store((mean * 1000.0) as u64, Ordering::SeqCst);
        });
        (aggregate, last)
    }

    #[test]
    fn test_mean_across_children() {
        let (aggregate, last) = recording();
        let a = aggregate.attach();
        let b = aggregate.attach();

        a.report(1.0);
        assert_eq!(last.load(Ordering::SeqCst), 500);

        b.report(0.5);
        assert_eq!(last.load(Ordering::SeqCst), 750);
    }

    #[test]
    fn test_attach_starts_at_zero() {
        let (aggregate, last) = recording();
        let a = aggregate.attach();
        a.report(1.0);
        assert_eq!(last.load(Ordering::SeqCst), 1000);

        // A new child drags the mean back down on the next report.
        let b = aggregate.attach();
        b.report(0.0);
        assert_eq!(last.load(Ordering::SeqCst), 500);
    }

    #[test]
    fn test_fraction_clamped() {
        let (aggregate, last) = recording();
        let a = aggregate.attach();
        a.report(7.5);
        assert_eq!(last.load(Ordering::SeqCst), 1000);
    }
}
