use super::{MeasurementMap, TagMap};
use crate::Result;
use chrono::{SecondsFormat, Utc};
use core::fmt::Debug;
use ohno::IntoAppError;
use serde::Serialize;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

const LOG_TARGET: &str = "  recorder";

/// Destination for tagged batches of measurements.
pub trait Recorder: Send + Sync + Debug {
    /// Record one cycle's measurements under `tags`.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be stored
    fn record(&self, tags: &TagMap, measurements: &MeasurementMap) -> Result<()>;
}

/// Writes every measurement to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRecorder;

impl Recorder for LogRecorder {
    fn record(&self, tags: &TagMap, measurements: &MeasurementMap) -> Result<()> {
        log::info!(target: LOG_TARGET, "[{tags}] {} measurements", measurements.len());
        for m in measurements {
            let unit = m.unit.as_deref().unwrap_or("");
            log::info!(target: LOG_TARGET, "[{tags}] {} = {} {unit} ({})", m.name, m.value, m.kind);
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct Batch<'a> {
    timestamp: String,
    tags: &'a TagMap,
    measurements: &'a MeasurementMap,
}

/// Appends one JSON object per batch to a writer.
///
/// ```json
/// {"timestamp":"2025-01-01T00:00:00Z","tags":{"database":"db1"},"measurements":[...]}
/// ```
#[derive(Debug)]
pub struct JsonLinesRecorder<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesRecorder<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Give back the writer, typically to inspect what was written.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send + Debug> Recorder for JsonLinesRecorder<W> {
    fn record(&self, tags: &TagMap, measurements: &MeasurementMap) -> Result<()> {
        let batch = Batch {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            tags,
            measurements,
        };

        let mut line = serde_json::to_vec(&batch).into_app_err("serializing measurements")?;
        line.push(b'\n');

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        writer.write_all(&line).into_app_err("writing measurements")?;
        writer.flush().into_app_err("flushing measurements")
    }
}
