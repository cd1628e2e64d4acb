//! Push-based live views
//!
//! A `Subject` keeps the latest snapshot and a list of subscribers. Every
//! `publish` is delivered to every live subscriber, in order. A new
//! subscriber first receives the current snapshot (if any). Dropping a
//! `Subscription` unsubscribes; the subject prunes closed channels on the
//! next publish.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

struct Inner<T> {
    current: Option<T>,
    subscribers: Vec<UnboundedSender<T>>,
}

/// Observable store of the latest `T`
pub struct Subject<T> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Subject<T> {
    /// Create a subject with no value yet
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: None,
                subscribers: Vec::new(),
            }),
        }
    }

    /// Create a subject seeded with a value
    pub fn with_value(value: T) -> Self {
        let subject = Self::new();
        subject.lock().current = Some(value);
        subject
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current value and notify every subscriber
    pub fn publish(&self, value: T) {
        let mut inner = self.lock();
        inner
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        inner.current = Some(value);
    }

    /// Latest published value
    pub fn current(&self) -> Option<T> {
        self.lock().current.clone()
    }

    /// Subscribe to future values, starting with the current one
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();
        if let Some(current) = &inner.current {
            // receiver is alive, send cannot fail
            let _ = tx.send(current.clone());
        }
        inner.subscribers.push(tx);
        Subscription { rx }
    }

    /// Number of live subscribers (closed ones are counted until next publish)
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

impl<T: Clone> Default for Subject<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving end of a `Subject`
pub struct Subscription<T> {
    rx: UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next value; `None` once the subject is gone
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Next value if one is already queued
    pub fn try_recv(&mut self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Drain the queue and keep only the newest value
    pub fn latest(&mut self) -> Option<T> {
        let mut last = None;
        while let Some(value) = self.try_recv() {
            last = Some(value);
        }
        last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_every_update() {
        let subject = Subject::new();
        let mut sub = subject.subscribe();
        subject.publish(1);
        subject.publish(2);
        assert_eq!(sub.try_recv(), Some(1));
        assert_eq!(sub.try_recv(), Some(2));
        assert_eq!(sub.try_recv(), None);
    }

    #[test]
    fn test_late_subscriber_gets_current_value() {
        let subject = Subject::with_value("a".to_string());
        subject.publish("b".to_string());
        let mut sub = subject.subscribe();
        assert_eq!(sub.try_recv().as_deref(), Some("b"));
        assert_eq!(subject.current().as_deref(), Some("b"));
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let subject = Subject::new();
        let sub = subject.subscribe();
        let mut kept = subject.subscribe();
        assert_eq!(subject.subscriber_count(), 2);

        drop(sub);
        subject.publish(7);
        assert_eq!(subject.subscriber_count(), 1);
        assert_eq!(kept.latest(), Some(7));
    }

    #[tokio::test]
    async fn test_async_recv() {
        let subject = std::sync::Arc::new(Subject::new());
        let mut sub = subject.subscribe();
        let publisher = subject.clone();
        tokio::spawn(async move { publisher.publish(5u32) });
        assert_eq!(sub.recv().await, Some(5));
    }
}
