use super::{MeasurementMap, Statistic, TagMap, from_def};
use crate::compile::StatisticDef;
use crate::directory::{DirectoryClient, Entry};
use ohno::AppError;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const LOG_TARGET: &str = "   collect";

/// Tag that identifies which target a batch of measurements belongs to.
pub const TARGET_TAG: &str = "database";

type Attributes = BTreeMap<String, String>;

/// Outcome of querying one scope during a cycle.
#[derive(Debug, Clone)]
pub enum ScopeResult {
    /// The query returned entries, indexed by DN.
    Found(BTreeMap<String, Attributes>),

    /// The query succeeded but matched nothing.
    NotFound,

    /// The query failed.
    Error(Arc<AppError>),
}

impl ScopeResult {
    fn from_entries(entries: Vec<Entry>) -> Self {
        if entries.is_empty() {
            return Self::NotFound;
        }
        Self::Found(entries.into_iter().map(|entry| (entry.dn, entry.attributes)).collect())
    }

    /// Raw value of `attribute` on `dn`, if both are present.
    ///
    /// DNs and attribute types compare case-insensitively, as they do in LDAP,
    /// with an exact match tried first.
    #[must_use]
    pub fn lookup(&self, dn: &str, attribute: &str) -> Option<&str> {
        let Self::Found(entries) = self else {
            return None;
        };

        let attributes = find_ignore_case(entries, dn)?;
        find_ignore_case(attributes, attribute).map(String::as_str)
    }
}

fn find_ignore_case<'a, V>(map: &'a BTreeMap<String, V>, key: &str) -> Option<&'a V> {
    map.get(key)
        .or_else(|| map.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)).map(|(_, v)| v))
}

/// Everything one [`MetricSet::collect`] call produced.
#[derive(Debug)]
pub struct CollectReport {
    pub tags: TagMap,
    pub measurements: MeasurementMap,

    /// Number of directory queries issued.
    pub queries: usize,

    /// Scopes whose query failed this cycle.
    pub failed_scopes: Vec<(String, Arc<AppError>)>,

    /// Statistics that found no value for their entry and attribute.
    pub misses: usize,
}

impl CollectReport {
    /// Whether any scope could not be queried.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.failed_scopes.is_empty()
    }
}

/// The statistics of one target, together with the client used to read them.
#[derive(Debug)]
pub struct MetricSet {
    target: String,
    client: Arc<dyn DirectoryClient>,
    statistics: Vec<Box<dyn Statistic>>,
    query_dns: BTreeSet<String>,
}

impl MetricSet {
    #[must_use]
    pub fn new(target: impl Into<String>, client: Arc<dyn DirectoryClient>) -> Self {
        Self {
            target: target.into(),
            client,
            statistics: Vec::new(),
            query_dns: BTreeSet::new(),
        }
    }

    /// Build a set holding one statistic per definition, in order.
    #[must_use]
    pub fn from_defs(target: impl Into<String>, client: Arc<dyn DirectoryClient>, defs: &[StatisticDef]) -> Self {
        let mut set = Self::new(target, client);
        for def in defs {
            set.add_statistic(from_def(def));
        }
        set
    }

    /// Append a statistic and remember its query scope. Never touches the directory.
    pub fn add_statistic(&mut self, statistic: Box<dyn Statistic>) {
        let _ = self.query_dns.insert(statistic.query_dn().to_owned());
        self.statistics.push(statistic);
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.statistics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statistics.is_empty()
    }

    /// The distinct scopes queried on every cycle.
    pub fn query_dns(&self) -> impl Iterator<Item = &str> {
        self.query_dns.iter().map(String::as_str)
    }

    /// Run one collection cycle.
    ///
    /// Each distinct query scope is queried once. Statistics are then
    /// processed in the order they were added; one whose scope failed, or
    /// whose entry or attribute is missing, is handed `None`.
    #[must_use]
    pub fn collect(&self) -> CollectReport {
        let mut failed_scopes = Vec::new();
        let scopes: BTreeMap<&str, ScopeResult> = self
            .query_dns
            .iter()
            .map(|query_dn| {
                let result = match self.client.query(query_dn) {
                    Ok(entries) => ScopeResult::from_entries(entries),
                    Err(e) => {
                        log::error!(target: LOG_TARGET, "{}: query for '{query_dn}' failed: {e:#}", self.client.server());
                        let e = Arc::new(e);
                        failed_scopes.push((query_dn.clone(), Arc::clone(&e)));
                        ScopeResult::Error(e)
                    }
                };
                (query_dn.as_str(), result)
            })
            .collect();

        let mut measurements = MeasurementMap::new();
        let mut misses = 0;
        for statistic in &self.statistics {
            let raw = scopes
                .get(statistic.query_dn())
                .and_then(|scope| scope.lookup(statistic.dn(), statistic.attribute()));

            if raw.is_none() {
                misses += 1;
                log::trace!(
                    target: LOG_TARGET,
                    "No value for '{}' on '{}' under '{}'",
                    statistic.attribute(),
                    statistic.dn(),
                    statistic.query_dn()
                );
            }

            statistic.collect(self.client.as_ref(), &mut measurements, raw);
        }

        log::debug!(
            target: LOG_TARGET,
            "Collected {} measurements for '{}' with {} queries ({} failed, {misses} missing values)",
            measurements.len(),
            self.target,
            scopes.len(),
            failed_scopes.len()
        );

        CollectReport {
            tags: TagMap::new().with(TARGET_TAG, self.target.clone()),
            measurements,
            queries: scopes.len(),
            failed_scopes,
            misses,
        }
    }
}
