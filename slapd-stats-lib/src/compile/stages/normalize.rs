use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigMap, ConfigNode, TreePath, keys};

/// Rewrites every field name to `snake_case` so that `computedName`,
/// `ComputedName`, and `computed-name` all mean `computed_name`.
///
/// Keys of `objects` and `attributes` maps are names chosen by the operator
/// (object labels, LDAP attribute types) and are left exactly as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeKeys;

impl Transformer for NormalizeKeys {
    fn name(&self) -> &'static str {
        "normalize-keys"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        normalize(tree, &TreePath::root(), true)
    }
}

fn normalize(node: &ConfigNode, path: &TreePath, rewrite_keys: bool) -> Result<ConfigNode, CompileError> {
    match node {
        ConfigNode::Map(map) => {
            let mut out = ConfigMap::new();
            for (key, value) in map {
                let key = if rewrite_keys { snake_case(key) } else { key.clone() };
                // inside a labels map, a label that happens to read `objects` is still just a label
                let named_children = rewrite_keys && (key == keys::OBJECTS || key == keys::ATTRIBUTES);
                let value = match value {
                    ConfigNode::Map(_) if named_children => normalize(value, &path.key(&key), false)?,
                    _ => normalize(value, &path.key(&key), true)?,
                };

                if out.insert(key.clone(), value).is_some() {
                    return Err(CompileError::DuplicateKey {
                        path: path.to_string(),
                        key,
                    });
                }
            }
            Ok(ConfigNode::Map(out))
        }
        ConfigNode::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| normalize(item, &path.index(index), true))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigNode::List),
        ConfigNode::Scalar(_) => Ok(node.clone()),
    }
}

/// `queryDN` -> `query_dn`, `HTTPServer` -> `http_server`, `Query-Root` -> `query_root`.
pub(crate) fn snake_case(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    let mut out = String::with_capacity(key.len() + 4);

    for (index, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '_' | ' ' | '.') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_uppercase() {
            let boundary = index.checked_sub(1).and_then(|i| chars.get(i)).is_some_and(|&prev| {
                prev.is_lowercase()
                    || prev.is_ascii_digit()
                    || (prev.is_uppercase() && chars.get(index + 1).is_some_and(|next| next.is_lowercase()))
            });
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(yaml: &str) -> ConfigNode {
        NormalizeKeys.transform(&ConfigNode::parse_yaml(yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("computedName"), "computed_name");
        assert_eq!(snake_case("ComputedName"), "computed_name");
        assert_eq!(snake_case("RDN"), "rdn");
        assert_eq!(snake_case("queryDN"), "query_dn");
        assert_eq!(snake_case("Query-Root"), "query_root");
        assert_eq!(snake_case("HTTPServer"), "http_server");
        assert_eq!(snake_case("metric_name"), "metric_name");
        assert_eq!(snake_case("poll interval"), "poll_interval");
        assert_eq!(snake_case("db2Name"), "db2_name");
    }

    #[test]
    fn test_rewrites_nested_keys() {
        let out = normalized("RDN: cn=Monitor\nChildren:\n  - Attribute: monitorCounter\n    metricUnit: By\n");
        let root = out.as_map().unwrap();
        assert_eq!(root.text("rdn").as_deref(), Some("cn=Monitor"));

        let leaf = root.get("children").and_then(ConfigNode::as_list).unwrap()[0].as_map().unwrap();
        assert_eq!(leaf.text("attribute").as_deref(), Some("monitorCounter"));
        assert!(leaf.contains_key("metric_unit"));
    }

    #[test]
    fn test_values_are_untouched() {
        let out = normalized("name: SomeValue\n");
        assert_eq!(out.as_map().unwrap().text("name").as_deref(), Some("SomeValue"));
    }

    #[test]
    fn test_named_children_keep_their_keys() {
        let out = normalized("Attributes:\n  monitorCounter: counter\nObjects:\n  ReadWaiters:\n    RDN: cn=Read\n");
        let root = out.as_map().unwrap();

        let attributes = root.get("attributes").and_then(ConfigNode::as_map).unwrap();
        assert!(attributes.contains_key("monitorCounter"));

        let objects = root.get("objects").and_then(ConfigNode::as_map).unwrap();
        let waiters = objects.get("ReadWaiters").and_then(ConfigNode::as_map).unwrap();
        assert!(waiters.contains_key("rdn"));
    }

    #[test]
    fn test_label_named_like_a_field_is_an_object() {
        let out = normalized("objects:\n  objects:\n    RDN: cn=Objects\n    queryRoot: true\n");
        let objects = out.as_map().unwrap().get("objects").and_then(ConfigNode::as_map).unwrap();
        let labelled = objects.get("objects").and_then(ConfigNode::as_map).unwrap();
        assert_eq!(labelled.text("rdn").as_deref(), Some("cn=Objects"));
        assert!(labelled.flag("query_root"));
    }

    #[test]
    fn test_colliding_keys_fail() {
        let tree = ConfigNode::parse_yaml("computedName: a\ncomputed_name: b\n").unwrap();
        let err = NormalizeKeys.transform(&tree).unwrap_err();
        assert_eq!(
            err,
            CompileError::DuplicateKey {
                path: "<root>".into(),
                key: "computed_name".into()
            }
        );
    }
}
