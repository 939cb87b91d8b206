//! Typed, buffering event logging.
//!
//! A [`Logger`] accepts events of some type `T`, stamps each with the
//! `Duration` elapsed since a common `Instant`, and hands them in batches to
//! a boxed action. A [`Registry`] binds named destinations so that several
//! components can share one logging configuration without agreeing on event
//! types.

#![forbid(missing_docs)]

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Events buffered before the action is invoked.
const BATCH: usize = 1024;

/// A map from names to typed loggers, sharing one start instant.
pub struct Registry {
    /// Instant common to all registered loggers.
    time: Instant,
    /// Installed loggers, keyed by name and erased by type.
    map: HashMap<String, Box<dyn Any>>,
}

impl Registry {
    /// Creates a registry whose loggers all measure time from `time`.
    pub fn new(time: Instant) -> Self {
        Registry { time, map: HashMap::new() }
    }

    /// Binds a log name to an action on event batches.
    ///
    /// Returns any previously installed logger under this name rather than
    /// redirecting it; existing handles keep writing to the old destination.
    pub fn insert<T: 'static, F: Fn(&Duration, &[(Duration, T)]) + 'static>(
        &mut self,
        name: &str,
        action: F,
    ) -> Option<Box<dyn Any>> {
        let logger = Logger::<T>::new(self.time, Box::new(action));
        self.map.insert(name.to_owned(), Box::new(logger))
    }

    /// Removes a bound logger, closing its stream once all handles drop.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Any>> {
        self.map.remove(name)
    }

    /// Retrieves a shared handle to a named logger, if the types agree.
    pub fn get<T: 'static>(&self, name: &str) -> Option<Logger<T>> {
        self.map
            .get(name)
            .and_then(|entry| entry.downcast_ref::<Logger<T>>())
            .cloned()
    }
}

/// A shared handle to a buffering event logger.
///
/// Clones share one buffer and one action, so events logged through any
/// handle appear in one stream with non-decreasing timestamps. Buffered
/// events are handed to the action when the buffer fills, on [`flush`],
/// and when the last handle drops.
///
/// [`flush`]: Logger::flush
pub struct Logger<T> {
    inner: Rc<RefCell<Core<T>>>,
}

impl<T> Clone for Logger<T> {
    fn clone(&self) -> Self {
        Logger { inner: Rc::clone(&self.inner) }
    }
}

struct Core<T> {
    time: Instant,
    action: Box<dyn Fn(&Duration, &[(Duration, T)])>,
    buffer: Vec<(Duration, T)>,
}

impl<T> Logger<T> {
    /// Allocates a logger bound to a write destination.
    pub fn new(time: Instant, action: Box<dyn Fn(&Duration, &[(Duration, T)])>) -> Self {
        Logger {
            inner: Rc::new(RefCell::new(Core {
                time,
                action,
                buffer: Vec::with_capacity(BATCH),
            })),
        }
    }

    /// Logs an event, stamped at the moment of this call.
    ///
    /// Delivery to the action may be delayed by buffering.
    pub fn log(&self, event: T) {
        let mut core = self.inner.borrow_mut();
        let elapsed = core.time.elapsed();
        core.buffer.push((elapsed, event));
        if core.buffer.len() >= BATCH {
            core.flush();
        }
    }

    /// Logs several events with one timestamp acquisition.
    pub fn log_many<I: IntoIterator<Item = T>>(&self, events: I) {
        let mut core = self.inner.borrow_mut();
        let elapsed = core.time.elapsed();
        core.buffer.extend(events.into_iter().map(|x| (elapsed, x)));
        if core.buffer.len() >= BATCH {
            core.flush();
        }
    }

    /// Delivers all buffered events to the action now.
    pub fn flush(&self) {
        self.inner.borrow_mut().flush();
    }
}

impl<T> Core<T> {
    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let lower = self.time.elapsed();
            (self.action)(&lower, &self.buffer[..]);
            self.buffer.clear();
        }
    }
}

impl<T> Drop for Core<T> {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {

    use super::{Logger, Registry};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Instant;

    #[test]
    fn logger_delivers_on_flush() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let logger = Logger::new(
            Instant::now(),
            Box::new(move |_, batch: &[(_, u32)]| {
                sink.borrow_mut().extend(batch.iter().map(|(_, x)| *x));
            }),
        );

        logger.log(3);
        logger.log(5);
        assert!(seen.borrow().is_empty());

        logger.flush();
        assert_eq!(&*seen.borrow(), &[3, 5]);
    }

    #[test]
    fn clones_share_one_stream() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let logger = Logger::new(
            Instant::now(),
            Box::new(move |_, batch: &[(_, &str)]| {
                sink.borrow_mut().extend(batch.iter().map(|(_, x)| *x));
            }),
        );

        let other = logger.clone();
        logger.log("a");
        other.log("b");
        drop(other);
        drop(logger);
        assert_eq!(&*seen.borrow(), &["a", "b"]);
    }

    #[test]
    fn registry_returns_typed_handles() {
        let mut registry = Registry::new(Instant::now());
        registry.insert::<u64, _>("counts", |_, _| {});

        assert!(registry.get::<u64>("counts").is_some());
        assert!(registry.get::<String>("counts").is_none());
        assert!(registry.remove("counts").is_some());
        assert!(registry.get::<u64>("counts").is_none());
    }
}
