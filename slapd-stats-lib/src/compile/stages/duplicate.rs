use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigMap, ConfigNode, TreePath, keys};

const LOG_TARGET: &str = "   compile";

/// Copies every subtree that lists `databases` once per database.
///
/// Each copy is stamped with its own `database` and loses the `databases`
/// list; everything else is a deep copy of the original. Inside a list the
/// copies become siblings in place of the original; anywhere else the
/// original is replaced by a list of its copies.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateTargets;

impl Transformer for DuplicateTargets {
    fn name(&self) -> &'static str {
        "duplicate-targets"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        expand(tree, &TreePath::root()).map(Expansion::into_node)
    }
}

enum Expansion {
    Single(ConfigNode),
    Copies(Vec<ConfigNode>),
}

impl Expansion {
    fn into_node(self) -> ConfigNode {
        match self {
            Self::Single(node) => node,
            Self::Copies(copies) => ConfigNode::List(copies),
        }
    }
}

fn expand(node: &ConfigNode, path: &TreePath) -> Result<Expansion, CompileError> {
    match node {
        ConfigNode::Map(map) => {
            let targets = map.get(keys::DATABASES).map(|value| targets(value, path)).transpose()?;

            let mut inner = ConfigMap::new();
            for (key, value) in map {
                let value = match value {
                    ConfigNode::Map(labels) if key == keys::OBJECTS || key == keys::ATTRIBUTES => {
                        ConfigNode::Map(expand_labels(labels, &path.key(key))?)
                    }
                    _ if key == keys::DATABASES => continue,
                    _ => expand(value, &path.key(key))?.into_node(),
                };
                let _ = inner.insert(key.clone(), value);
            }

            let Some(targets) = targets else {
                return Ok(Expansion::Single(ConfigNode::Map(inner)));
            };

            log::debug!(target: LOG_TARGET, "Duplicating {path} for {} database(s)", targets.len());

            Ok(Expansion::Copies(
                targets
                    .into_iter()
                    .map(|database| {
                        let mut copy = inner.clone();
                        copy.set_text(keys::DATABASE, database);
                        ConfigNode::Map(copy)
                    })
                    .collect(),
            ))
        }
        ConfigNode::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match expand(item, &path.index(index))? {
                    Expansion::Single(node) => out.push(node),
                    Expansion::Copies(copies) => out.extend(copies),
                }
            }
            Ok(Expansion::Single(ConfigNode::List(out)))
        }
        ConfigNode::Scalar(_) => Ok(Expansion::Single(node.clone())),
    }
}

/// Keys of an `objects` or `attributes` map are labels, not fields, so the
/// map itself is never duplicated; a labelled node with `databases` becomes a
/// list of copies under its label.
fn expand_labels(labels: &ConfigMap, path: &TreePath) -> Result<ConfigMap, CompileError> {
    labels
        .iter()
        .map(|(label, value)| Ok::<_, CompileError>((label.clone(), expand(value, &path.key(label))?.into_node())))
        .collect()
}

fn targets(value: &ConfigNode, path: &TreePath) -> Result<Vec<String>, CompileError> {
    let targets = match value {
        ConfigNode::Scalar(scalar) => vec![scalar.text().ok_or_else(|| CompileError::EmptyTargets { path: path.to_string() })?],
        ConfigNode::List(items) => items
            .iter()
            .map(|item| {
                item.as_scalar()
                    .and_then(|scalar| scalar.text())
                    .ok_or_else(|| CompileError::InvalidTargets { path: path.to_string() })
            })
            .collect::<Result<Vec<_>, _>>()?,
        ConfigNode::Map(_) => return Err(CompileError::InvalidTargets { path: path.to_string() }),
    };

    if targets.is_empty() {
        return Err(CompileError::EmptyTargets { path: path.to_string() });
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duplicate(yaml: &str) -> Result<ConfigNode, CompileError> {
        DuplicateTargets.transform(&ConfigNode::parse_yaml(yaml).unwrap())
    }

    #[test]
    fn test_copies_become_siblings_in_lists() {
        let out = duplicate("children:\n  - rdn: cn=Before\n  - rdn: ou=db\n    databases: [db1, db2]\n  - rdn: cn=After\n").unwrap();
        let children = out.as_map().unwrap().get("children").and_then(ConfigNode::as_list).unwrap();
        assert_eq!(children.len(), 4);

        let databases: Vec<_> = children.iter().map(|c| c.as_map().unwrap().text("database")).collect();
        assert_eq!(databases, [None, Some("db1".into()), Some("db2".into()), None]);
        assert!(!children[1].as_map().unwrap().contains_key("databases"));
    }

    #[test]
    fn test_root_becomes_list_of_copies() {
        let out = duplicate("rdn: ou=db1\ndatabases: [db1, db2]\nchildren:\n  - attribute: numEntries\n").unwrap();
        let copies = out.as_list().unwrap();
        assert_eq!(copies.len(), 2);

        let first = copies[0].as_map().unwrap();
        let second = copies[1].as_map().unwrap();
        assert_eq!(first.text("database").as_deref(), Some("db1"));
        assert_eq!(second.text("database").as_deref(), Some("db2"));
        assert_eq!(first.get("children"), second.get("children"));
    }

    #[test]
    fn test_single_scalar_target() {
        let out = duplicate("rdn: ou=x\ndatabases: 3\n").unwrap();
        let copies = out.as_list().unwrap();
        assert_eq!(copies.len(), 1);
        assert_eq!(copies[0].as_map().unwrap().text("database").as_deref(), Some("3"));
    }

    #[test]
    fn test_nested_duplication_multiplies() {
        let out = duplicate("children:\n  - rdn: ou=a\n    databases: [x, y]\n    children:\n      - rdn: ou=b\n        databases: [p, q, r]\n").unwrap();
        let outer = out.as_map().unwrap().get("children").and_then(ConfigNode::as_list).unwrap();
        assert_eq!(outer.len(), 2);
        for copy in outer {
            let inner = copy.as_map().unwrap().get("children").and_then(ConfigNode::as_list).unwrap();
            assert_eq!(inner.len(), 3);
        }
    }

    #[test]
    fn test_copies_are_independent() {
        let out = duplicate("children:\n  - rdn: ou=db\n    databases: [a, b]\n    children:\n      - attribute: x\n").unwrap();
        let children = out.as_map().unwrap().get("children").and_then(ConfigNode::as_list).unwrap();

        let mut first = children[0].clone();
        if let ConfigNode::Map(map) = &mut first {
            let _ = map.insert("children", ConfigNode::List(Vec::new()));
        }

        let second = children[1].as_map().unwrap();
        assert_eq!(second.get("children").and_then(ConfigNode::as_list).map(<[_]>::len), Some(1));
    }

    #[test]
    fn test_empty_targets_fail() {
        let err = duplicate("children:\n  - rdn: ou=db\n    databases: []\n").unwrap_err();
        assert_eq!(err, CompileError::EmptyTargets { path: "children[0]".into() });
    }

    #[test]
    fn test_null_target_fails() {
        let err = duplicate("rdn: ou=db\ndatabases:\n").unwrap_err();
        assert_eq!(err, CompileError::EmptyTargets { path: "<root>".into() });
    }

    #[test]
    fn test_non_scalar_targets_fail() {
        let err = duplicate("rdn: ou=db\ndatabases:\n  - [a]\n").unwrap_err();
        assert_eq!(err, CompileError::InvalidTargets { path: "<root>".into() });
    }

    #[test]
    fn test_labels_are_not_fields() {
        let out = duplicate("objects:\n  databases:\n    rdn: cn=Databases\n  db:\n    rdn: ou=db\n    databases: [a, b]\n").unwrap();
        let objects = out.as_map().unwrap().get("objects").and_then(ConfigNode::as_map).unwrap();

        let databases = objects.get("databases").and_then(ConfigNode::as_map).unwrap();
        assert_eq!(databases.text("rdn").as_deref(), Some("cn=Databases"));

        let copies = objects.get("db").and_then(ConfigNode::as_list).unwrap();
        assert_eq!(copies.len(), 2);
    }

    #[test]
    fn test_tree_without_targets_is_unchanged() {
        let tree = ConfigNode::parse_yaml("rdn: cn=Monitor\nchildren:\n  - attribute: x\n").unwrap();
        assert_eq!(DuplicateTargets.transform(&tree).unwrap(), tree);
    }
}
