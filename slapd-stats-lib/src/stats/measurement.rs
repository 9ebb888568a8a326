use core::fmt::{Display, Formatter};
use serde::Serialize;
use std::collections::BTreeMap;

/// Whether a measurement is a point-in-time value or a running total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MeasureKind {
    Gauge,
    Counter,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub kind: MeasureKind,
    pub value: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// The measurements of one collection cycle, in the order they were recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MeasurementMap {
    measurements: Vec<Measurement>,
}

impl MeasurementMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, name: &str, kind: MeasureKind, value: f64, unit: Option<&str>) {
        self.measurements.push(Measurement {
            name: name.to_owned(),
            kind,
            value,
            unit: unit.map(str::to_owned),
        });
    }

    /// The most recent measurement recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Measurement> {
        self.measurements.iter().rev().find(|m| m.name == name)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Measurement> {
        self.measurements.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

impl<'a> IntoIterator for &'a MeasurementMap {
    type Item = &'a Measurement;
    type IntoIter = core::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.measurements.iter()
    }
}

/// Labels attached to a batch of measurements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, String>);

impl TagMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Display for TagMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        for (index, (key, value)) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}
