//! Command-line logger
use super::{ByTime, Id, LogError, LogValue, StatsLogger};
use crate::utils::stats::OnlineMeanVariance;
use std::collections::{btree_map::Entry, BTreeMap};
use std::fmt;
use std::time::{Duration, Instant};
use yansi::Paint;

/// Logger that displays summaries of each time chunk to standard output.
///
/// Scalars and durations are summarized by their mean and standard deviation,
/// counters by their running total and the increment within the chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLogger {
    chunker: ByTime,
    // A binary tree is used so that ids are displayed in sorted order
    summaries: BTreeMap<Id, Summary>,
    chunk_start: Instant,
}

impl DisplayLogger {
    pub fn new(chunker: ByTime) -> Self {
        Self {
            chunker,
            summaries: BTreeMap::new(),
            chunk_start: Instant::now(),
        }
    }
}

impl Default for DisplayLogger {
    fn default() -> Self {
        Self::new(ByTime::default())
    }
}

impl StatsLogger for DisplayLogger {
    fn log(&mut self, id: Id, value: LogValue) -> Result<(), LogError> {
        // Checked before logging so that a burst of values straddling the
        // chunk boundary lands in a single chunk.
        if self.chunker.chunk_elapsed() {
            self.flush();
        }
        match self.summaries.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(Summary::from(value));
                Ok(())
            }
            Entry::Occupied(mut entry) => {
                if entry.get_mut().push(value) {
                    Ok(())
                } else {
                    Err(LogError::IncompatibleValue {
                        id: entry.key().clone(),
                        value,
                        expected: entry.get().kind_name(),
                    })
                }
            }
        }
    }

    fn flush(&mut self) {
        let elapsed = self.chunk_start.elapsed();
        if self.summaries.values().any(Summary::has_data) {
            println!(
                "{}",
                Paint::fixed(8, format!("==== {:.1?} ====", elapsed))
            );
            for (id, summary) in self.summaries.iter().filter(|(_, s)| s.has_data()) {
                println!("{:<32} {}", Paint::fixed(35, id), summary);
            }
        }
        for summary in self.summaries.values_mut() {
            summary.reset();
        }
        self.chunker.note_flush();
        self.chunk_start = Instant::now();
    }
}

impl Drop for DisplayLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Aggregate of the values logged under one id within a chunk.
#[derive(Debug, Clone, PartialEq)]
enum Summary {
    Scalar(OnlineMeanVariance<f64>),
    Duration(OnlineMeanVariance<f64>),
    Counter { initial_value: u64, increment: u64 },
}

impl From<LogValue> for Summary {
    fn from(value: LogValue) -> Self {
        let mut summary = match value {
            LogValue::Scalar(_) => Self::Scalar(OnlineMeanVariance::new()),
            LogValue::Duration(_) => Self::Duration(OnlineMeanVariance::new()),
            LogValue::CounterIncrement(_) => Self::Counter {
                initial_value: 0,
                increment: 0,
            },
        };
        summary.push(value);
        summary
    }
}

impl Summary {
    /// Add a value. Returns `false` if the value type does not match the summary.
    fn push(&mut self, value: LogValue) -> bool {
        match (self, value) {
            (Self::Scalar(stats), LogValue::Scalar(x)) => stats.push(x),
            (Self::Duration(stats), LogValue::Duration(d)) => stats.push(d.as_secs_f64()),
            (Self::Counter { increment, .. }, LogValue::CounterIncrement(i)) => *increment += i,
            _ => return false,
        }
        true
    }

    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Duration(_) => "duration",
            Self::Counter { .. } => "counter",
        }
    }

    const fn has_data(&self) -> bool {
        match self {
            Self::Scalar(stats) | Self::Duration(stats) => stats.count() > 0,
            Self::Counter { increment, .. } => *increment > 0,
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Scalar(stats) | Self::Duration(stats) => *stats = OnlineMeanVariance::new(),
            Self::Counter {
                initial_value,
                increment,
            } => {
                *initial_value += *increment;
                *increment = 0;
            }
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Scalar(stats) => {
                if let Some(mean) = stats.mean() {
                    write!(f, "{:.4}", mean)?;
                }
                if stats.count() > 1 {
                    if let Some(stddev) = stats.stddev() {
                        write!(f, " {}", Paint::fixed(8, format!("(σ {:.4})", stddev)))?;
                    }
                }
                Ok(())
            }
            Self::Duration(stats) => match stats.mean() {
                Some(mean) => write!(f, "{:.3?}", Duration::from_secs_f64(mean)),
                None => Ok(()),
            },
            Self::Counter {
                initial_value,
                increment,
            } => write!(
                f,
                "{}  (+{})",
                initial_value + increment,
                Paint::fixed(253, increment)
            ),
        }
    }
}
