use super::{MeasureKind, MeasurementMap};
use crate::compile::{StatisticDef, StatisticKind};
use crate::directory::DirectoryClient;
use chrono::NaiveDateTime;
use core::fmt::Debug;

const LOG_TARGET: &str = " statistic";

/// Turns one raw attribute value into a measurement.
pub trait Statistic: Send + Sync + Debug {
    /// Search base whose result holds this statistic's entry.
    fn query_dn(&self) -> &str;

    fn dn(&self) -> &str;

    fn attribute(&self) -> &str;

    /// Record a measurement for `raw`, if there is one to record.
    ///
    /// `raw` is `None` when the entry or attribute was absent this cycle.
    fn collect(&self, client: &dyn DirectoryClient, measurements: &mut MeasurementMap, raw: Option<&str>);
}

/// Where a statistic reads from and what it records under.
#[derive(Debug, Clone, PartialEq)]
pub struct StatisticBinding {
    pub metric_name: String,
    pub query_dn: String,
    pub dn: String,
    pub attribute: String,
    pub unit: Option<String>,
    pub scale: Option<f64>,
}

impl StatisticBinding {
    fn record(&self, measurements: &mut MeasurementMap, kind: MeasureKind, value: f64) {
        let value = self.scale.map_or(value, |scale| value * scale);
        measurements.record(&self.metric_name, kind, value, self.unit.as_deref());
    }

    fn unparseable(&self, client: &dyn DirectoryClient, raw: &str, expected: &str) {
        log::warn!(
            target: LOG_TARGET,
            "{}: value '{raw}' of '{}' on '{}' is not {expected}",
            client.server(),
            self.attribute,
            self.dn
        );
    }
}

impl From<&StatisticDef> for StatisticBinding {
    fn from(def: &StatisticDef) -> Self {
        Self {
            metric_name: def.metric_name.clone(),
            query_dn: def.query_dn.clone(),
            dn: def.dn.clone(),
            attribute: def.attribute.clone(),
            unit: def.unit.clone(),
            scale: def.scale,
        }
    }
}

macro_rules! binding_accessors {
    () => {
        fn query_dn(&self) -> &str {
            &self.0.query_dn
        }

        fn dn(&self) -> &str {
            &self.0.dn
        }

        fn attribute(&self) -> &str {
            &self.0.attribute
        }
    };
}

/// A numeric value that can go up and down, such as open connections.
#[derive(Debug, Clone)]
pub struct GaugeStatistic(pub StatisticBinding);

impl Statistic for GaugeStatistic {
    binding_accessors!();

    fn collect(&self, client: &dyn DirectoryClient, measurements: &mut MeasurementMap, raw: Option<&str>) {
        let Some(raw) = raw else { return };
        match parse_number(raw) {
            Some(value) => self.0.record(measurements, MeasureKind::Gauge, value),
            None => self.0.unparseable(client, raw, "a number"),
        }
    }
}

/// A running total, such as operations completed since startup.
#[derive(Debug, Clone)]
pub struct CounterStatistic(pub StatisticBinding);

impl Statistic for CounterStatistic {
    binding_accessors!();

    fn collect(&self, client: &dyn DirectoryClient, measurements: &mut MeasurementMap, raw: Option<&str>) {
        let Some(raw) = raw else { return };
        match parse_number(raw) {
            Some(value) if value >= 0.0 => self.0.record(measurements, MeasureKind::Counter, value),
            Some(_) => self.0.unparseable(client, raw, "a non-negative count"),
            None => self.0.unparseable(client, raw, "a number"),
        }
    }
}

/// An LDAP GeneralizedTime such as `monitorTimestamp`, recorded as Unix seconds.
#[derive(Debug, Clone)]
pub struct TimestampStatistic(pub StatisticBinding);

impl Statistic for TimestampStatistic {
    binding_accessors!();

    fn collect(&self, client: &dyn DirectoryClient, measurements: &mut MeasurementMap, raw: Option<&str>) {
        let Some(raw) = raw else { return };
        match parse_generalized_time(raw) {
            Some(seconds) => self.0.record(measurements, MeasureKind::Gauge, seconds),
            None => self.0.unparseable(client, raw, "a GeneralizedTime"),
        }
    }
}

/// Build the statistic a definition asks for.
#[must_use]
pub fn from_def(def: &StatisticDef) -> Box<dyn Statistic> {
    let binding = StatisticBinding::from(def);
    match def.kind {
        StatisticKind::Gauge => Box::new(GaugeStatistic(binding)),
        StatisticKind::Counter => Box::new(CounterStatistic(binding)),
        StatisticKind::Timestamp => Box::new(TimestampStatistic(binding)),
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `20240131123456Z` or `20240131123456.25Z` -> seconds since the epoch.
#[expect(clippy::cast_precision_loss, reason = "timestamps fit comfortably in an f64 mantissa")]
fn parse_generalized_time(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let raw = raw.strip_suffix('Z').unwrap_or(raw);
    let (main, fraction) = raw.split_once(['.', ',']).unwrap_or((raw, ""));

    let seconds = NaiveDateTime::parse_from_str(main, "%Y%m%d%H%M%S").ok()?.and_utc().timestamp() as f64;
    if fraction.is_empty() {
        return Some(seconds);
    }

    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let fraction: f64 = format!("0.{fraction}").parse().ok()?;
    Some(seconds + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::directory::Entry;

    #[derive(Debug)]
    struct NoServer;

    impl DirectoryClient for NoServer {
        fn server(&self) -> &str {
            "test"
        }

        fn query(&self, _base_dn: &str) -> Result<Vec<Entry>> {
            Ok(Vec::new())
        }
    }

    fn def(kind: StatisticKind, scale: Option<f64>) -> StatisticDef {
        StatisticDef {
            target: "db".into(),
            metric_name: "m".into(),
            query_dn: "cn=Monitor".into(),
            dn: "cn=Total,cn=Monitor".into(),
            attribute: "monitorCounter".into(),
            kind,
            unit: Some("1".into()),
            description: None,
            scale,
        }
    }

    fn collect(kind: StatisticKind, scale: Option<f64>, raw: Option<&str>) -> MeasurementMap {
        let mut measurements = MeasurementMap::new();
        from_def(&def(kind, scale)).collect(&NoServer, &mut measurements, raw);
        measurements
    }

    fn value(measurements: &MeasurementMap) -> f64 {
        measurements.get("m").unwrap().value
    }

    #[test]
    fn test_gauge() {
        let m = collect(StatisticKind::Gauge, None, Some(" 42 "));
        assert!((value(&m) - 42.0).abs() < f64::EPSILON);
        assert_eq!(m.get("m").unwrap().kind, MeasureKind::Gauge);
        assert_eq!(m.get("m").unwrap().unit.as_deref(), Some("1"));
    }

    #[test]
    fn test_scale_is_applied() {
        let m = collect(StatisticKind::Gauge, Some(0.001), Some("2500"));
        assert!((value(&m) - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_value_records_nothing() {
        assert!(collect(StatisticKind::Gauge, None, None).is_empty());
        assert!(collect(StatisticKind::Counter, None, None).is_empty());
        assert!(collect(StatisticKind::Timestamp, None, None).is_empty());
    }

    #[test]
    fn test_unparseable_records_nothing() {
        assert!(collect(StatisticKind::Gauge, None, Some("lots")).is_empty());
        assert!(collect(StatisticKind::Gauge, None, Some("NaN")).is_empty());
    }

    #[test]
    fn test_counter_rejects_negative() {
        assert!(collect(StatisticKind::Counter, None, Some("-1")).is_empty());
        let m = collect(StatisticKind::Counter, None, Some("1042"));
        assert_eq!(m.get("m").unwrap().kind, MeasureKind::Counter);
    }

    #[test]
    fn test_timestamp() {
        let m = collect(StatisticKind::Timestamp, None, Some("20240101000000Z"));
        assert!((value(&m) - 1_704_067_200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_generalized_time_fraction() {
        assert_eq!(parse_generalized_time("19700101000001.5Z"), Some(1.5));
        assert_eq!(parse_generalized_time("19700101000001,25Z"), Some(1.25));
        assert_eq!(parse_generalized_time("19700101000001"), Some(1.0));
        assert_eq!(parse_generalized_time("19700101000001.xZ"), None);
        assert_eq!(parse_generalized_time("yesterday"), None);
    }

    #[test]
    fn test_accessors() {
        let stat = from_def(&def(StatisticKind::Gauge, None));
        assert_eq!(stat.query_dn(), "cn=Monitor");
        assert_eq!(stat.dn(), "cn=Total,cn=Monitor");
        assert_eq!(stat.attribute(), "monitorCounter");
    }
}
