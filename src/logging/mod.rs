//! Logging statistics from training runs
mod chunk_by_time;
mod display;

pub use chunk_by_time::ByTime;
pub use display::DisplayLogger;

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Hierarchical identifier of a logged value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id {
    /// Enclosing scopes, outermost first.
    namespace: Vec<&'static str>,
    name: &'static str,
}

impl Id {
    pub const fn new(name: &'static str) -> Self {
        Self {
            namespace: Vec::new(),
            name,
        }
    }

    /// Nest this identifier within an outer scope.
    #[must_use]
    pub fn within(mut self, scope: &'static str) -> Self {
        self.namespace.insert(0, scope);
        self
    }
}

impl From<&'static str> for Id {
    fn from(name: &'static str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for scope in &self.namespace {
            write!(f, "{}/", scope)?;
        }
        write!(f, "{}", self.name)
    }
}

/// A value that can be logged.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum LogValue {
    /// A scalar value. Aggregated by mean and standard deviation.
    Scalar(f64),
    /// A time duration. Aggregated by mean.
    Duration(Duration),
    /// Increment to a monotonic counter.
    CounterIncrement(u64),
}

/// Error logging a value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LogError {
    #[error("\"{id}\": incompatible value type {value:?}, expected {expected}")]
    IncompatibleValue {
        id: Id,
        value: LogValue,
        expected: &'static str,
    },
}

/// Log statistics from a training run.
pub trait StatsLogger {
    /// Log a value.
    ///
    /// # Returns
    /// May return an error if the logged value is structurally incompatible
    /// with previous values logged under the same id.
    fn log(&mut self, id: Id, value: LogValue) -> Result<(), LogError>;

    /// Write out any aggregated values.
    fn flush(&mut self);

    /// Log a scalar value, ignoring incompatibility errors.
    #[inline]
    fn log_scalar(&mut self, name: &'static str, value: f64) {
        let _ = self.log(name.into(), LogValue::Scalar(value));
    }

    /// Log a duration, ignoring incompatibility errors.
    #[inline]
    fn log_duration(&mut self, name: &'static str, duration: Duration) {
        let _ = self.log(name.into(), LogValue::Duration(duration));
    }

    /// Increment a counter, ignoring incompatibility errors.
    #[inline]
    fn log_counter_increment(&mut self, name: &'static str, increment: u64) {
        let _ = self.log(name.into(), LogValue::CounterIncrement(increment));
    }
}

/// Logger that does nothing
impl StatsLogger for () {
    #[inline]
    fn log(&mut self, _: Id, _: LogValue) -> Result<(), LogError> {
        Ok(())
    }
    #[inline]
    fn flush(&mut self) {}
}

impl<L: StatsLogger + ?Sized> StatsLogger for &'_ mut L {
    #[inline]
    fn log(&mut self, id: Id, value: LogValue) -> Result<(), LogError> {
        L::log(self, id, value)
    }
    #[inline]
    fn flush(&mut self) {
        L::flush(self)
    }
}

/// Add scoping to any [`StatsLogger`], including trait objects.
pub trait WithScope {
    /// Wrap this logger so that every id is nested within `scope`.
    fn with_scope(&mut self, scope: &'static str) -> ScopedLogger<'_, Self>;
}

impl<L: StatsLogger + ?Sized> WithScope for L {
    #[inline]
    fn with_scope(&mut self, scope: &'static str) -> ScopedLogger<'_, Self> {
        ScopedLogger { inner: self, scope }
    }
}

/// Logger that nests all ids within a scope.
#[derive(Debug)]
pub struct ScopedLogger<'a, L: ?Sized> {
    inner: &'a mut L,
    scope: &'static str,
}

impl<L: StatsLogger + ?Sized> StatsLogger for ScopedLogger<'_, L> {
    #[inline]
    fn log(&mut self, id: Id, value: LogValue) -> Result<(), LogError> {
        self.inner.log(id.within(self.scope), value)
    }
    #[inline]
    fn flush(&mut self) {
        self.inner.flush()
    }
}
