use super::{DirectoryClient, Entry};
use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err, bail};
use serde_yaml::Value;
use std::collections::BTreeMap;

const LOG_TARGET: &str = " directory";

/// A directory served from a YAML file mapping each DN to its attributes.
///
/// ```yaml
/// "cn=Total,cn=Connections,cn=Monitor":
///   monitorCounter: 1042
/// ```
///
/// The file is read again on every query, so a process that rewrites it
/// (for example a cron job dumping `cn=Monitor`) is picked up without a restart.
/// Multi-valued attributes are written as lists; the first value is used.
#[derive(Debug, Clone)]
pub struct SnapshotClient {
    path: Utf8PathBuf,
    separator: String,
}

impl SnapshotClient {
    #[must_use]
    pub fn new(path: impl AsRef<Utf8Path>, separator: &str) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            separator: separator.to_owned(),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, BTreeMap<String, String>>> {
        let text = std::fs::read_to_string(&self.path).into_app_err_with(|| format!("reading directory snapshot '{}'", self.path))?;
        let document: Value = serde_yaml::from_str(&text).into_app_err_with(|| format!("parsing directory snapshot '{}'", self.path))?;

        let Value::Mapping(entries) = document else {
            if document.is_null() {
                return Ok(BTreeMap::new());
            }
            bail!("directory snapshot '{}' must map DNs to attributes", self.path);
        };

        let mut out = BTreeMap::new();
        for (dn, attributes) in entries {
            let dn = value_text(&dn).ok_or_else(|| app_err!("directory snapshot '{}' contains a non-scalar DN", self.path))?;

            let mut values = BTreeMap::new();
            if let Value::Mapping(attributes) = attributes {
                for (name, value) in attributes {
                    if let (Some(name), Some(value)) = (value_text(&name), value_text(&value)) {
                        let _ = values.insert(name, value);
                    }
                }
            }

            let _ = out.insert(dn, values);
        }

        Ok(out)
    }

    /// DNs compare ASCII-case-insensitively, as LDAP compares them.
    fn in_subtree(&self, dn: &str, base_dn: &str) -> bool {
        if base_dn.is_empty() {
            return true;
        }

        let Some(split) = dn.len().checked_sub(base_dn.len()) else {
            return false;
        };
        let (Some(head), Some(tail)) = (dn.get(..split), dn.get(split..)) else {
            return false;
        };

        tail.eq_ignore_ascii_case(base_dn)
            && (head.is_empty() || (head.ends_with(self.separator.as_str()) && head.len() > self.separator.len()))
    }
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Sequence(items) => items.first().and_then(value_text),
        Value::Tagged(tagged) => value_text(&tagged.value),
        Value::Null | Value::Mapping(_) => None,
    }
}

impl DirectoryClient for SnapshotClient {
    fn server(&self) -> &str {
        self.path.as_str()
    }

    fn query(&self, base_dn: &str) -> Result<Vec<Entry>> {
        let entries: Vec<Entry> = self
            .load()?
            .into_iter()
            .filter(|(dn, _)| self.in_subtree(dn, base_dn))
            .map(|(dn, attributes)| Entry { dn, attributes })
            .collect();

        log::trace!(target: LOG_TARGET, "Query '{base_dn}' on '{}' returned {} entries", self.path, entries.len());
        Ok(entries)
    }
}
