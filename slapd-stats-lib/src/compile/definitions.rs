use super::CompileError;
use crate::tree::{ConfigMap, ConfigNode, TreePath, keys};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How a raw attribute value is turned into a measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StatisticKind {
    /// A value that goes up and down.
    #[default]
    Gauge,

    /// A value that only grows while the server is up.
    Counter,

    /// An LDAP GeneralizedTime, recorded as seconds since the Unix epoch.
    Timestamp,
}

/// One attribute to poll, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticDef {
    /// Database (or other target) the value belongs to; becomes the `database` tag.
    pub target: String,
    pub metric_name: String,

    /// Search base whose result contains `dn`.
    pub query_dn: String,
    pub dn: String,
    pub attribute: String,
    pub kind: StatisticKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

/// Pull one definition out of every node of a compiled tree that reads an attribute.
///
/// Definitions come out in document order. A definition's target is the
/// `database` of the nearest node that has one, or `default_target`.
///
/// # Errors
///
/// Returns an error if a leaf lacks a derived field, names an unknown
/// statistic kind, or carries a non-numeric `scale`
pub fn extract_definitions(tree: &ConfigNode, default_target: &str) -> Result<Vec<StatisticDef>, CompileError> {
    let mut defs = Vec::new();
    extract(tree, default_target, &TreePath::root(), &mut defs)?;
    Ok(defs)
}

fn extract(node: &ConfigNode, target: &str, path: &TreePath, defs: &mut Vec<StatisticDef>) -> Result<(), CompileError> {
    match node {
        ConfigNode::Map(map) => {
            let own_target = map.text(keys::DATABASE);
            let target = own_target.as_deref().unwrap_or(target);

            if let Some(attribute) = map.text(keys::ATTRIBUTE) {
                defs.push(definition(map, attribute, target, path)?);
            }

            for (key, value) in map {
                extract(value, target, &path.key(key), defs)?;
            }
            Ok(())
        }
        ConfigNode::List(items) => {
            for (index, item) in items.iter().enumerate() {
                extract(item, target, &path.index(index), defs)?;
            }
            Ok(())
        }
        ConfigNode::Scalar(_) => Ok(()),
    }
}

fn definition(map: &ConfigMap, attribute: String, target: &str, path: &TreePath) -> Result<StatisticDef, CompileError> {
    let derived = |field: &'static str| {
        map.text(field).ok_or_else(|| CompileError::MissingField {
            path: path.to_string(),
            field,
        })
    };

    let kind = match map.text(keys::STATISTIC) {
        None => StatisticKind::default(),
        Some(kind) => kind.parse().map_err(|_parse_error| CompileError::UnknownStatistic {
            path: path.to_string(),
            kind,
        })?,
    };

    let scale = match map.scalar(keys::SCALE) {
        None => None,
        Some(scalar) => Some(scalar.as_f64().ok_or_else(|| CompileError::InvalidField {
            path: path.to_string(),
            field: keys::SCALE.to_owned(),
            expected: "a number",
        })?),
    };

    Ok(StatisticDef {
        target: target.to_owned(),
        metric_name: derived(keys::METRIC_NAME)?,
        query_dn: derived(keys::QUERY_DN)?,
        dn: derived(keys::COMPUTED_DN)?,
        attribute,
        kind,
        unit: map.text(keys::UNIT),
        description: map.text(keys::DESCRIPTION),
        scale,
    })
}

/// Split definitions by target, keeping targets in the order they first appear.
#[must_use]
pub fn group_by_target(defs: Vec<StatisticDef>) -> Vec<(String, Vec<StatisticDef>)> {
    let mut groups: Vec<(String, Vec<StatisticDef>)> = Vec::new();
    for def in defs {
        match groups.iter_mut().find(|(target, _)| *target == def.target) {
            Some((_, group)) => group.push(def),
            None => groups.push((def.target.clone(), vec![def])),
        }
    }
    groups
}
