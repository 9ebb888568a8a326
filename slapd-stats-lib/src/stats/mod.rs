//! Polling a directory and turning what it returns into measurements
//!
//! # Implementation Model
//!
//! A [`MetricSet`] is built once per target (usually one database) from the
//! compiled [`StatisticDef`](crate::compile::StatisticDef)s for that target.
//! Each definition becomes a [`Statistic`] that knows which entry and
//! attribute it reads and how to turn the raw text into a number.
//!
//! On every [`MetricSet::collect`], each distinct query scope is fetched from
//! the [`DirectoryClient`](crate::directory::DirectoryClient) exactly once, no
//! matter how many statistics share it. Every statistic then looks up its raw
//! value in the cached results and records into one [`MeasurementMap`], which
//! is tagged with the target and handed to a [`Recorder`] as a single batch.
//!
//! A query that fails only affects the statistics bound to that scope; they
//! see no value for the cycle and everything else is still recorded. The
//! [`Poller`] repeats this on a fixed interval and never lets a single bad
//! cycle stop it.

mod measurement;
mod metric_set;
mod poller;
mod recorder;
mod statistic;

pub use measurement::{MeasureKind, Measurement, MeasurementMap, TagMap};
pub use metric_set::{CollectReport, MetricSet, ScopeResult};
pub use poller::{PollSummary, Poller};
pub use recorder::{JsonLinesRecorder, LogRecorder, Recorder};
pub use statistic::{CounterStatistic, GaugeStatistic, Statistic, StatisticBinding, TimestampStatistic, from_def};
