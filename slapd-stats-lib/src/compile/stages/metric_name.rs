use super::join;
use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigMap, ConfigNode, Role, keys};

/// Builds hierarchical metric names.
///
/// An object or attribute node is named `prefix + separator + label`, where
/// the label is the first of `computed_name`, `name`, `attribute`, or `rdn`
/// that is present, and becomes the prefix for its descendants.
#[derive(Debug, Clone)]
pub struct ComputeMetricName {
    prefix: String,
    separator: String,
}

impl ComputeMetricName {
    #[must_use]
    pub fn new(prefix: &str, separator: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            separator: separator.to_owned(),
        }
    }

    fn compute(&self, node: &ConfigNode, prefix: &str) -> ConfigNode {
        match node {
            ConfigNode::Map(map) => {
                let own_name = match map.role() {
                    Role::Container => None,
                    Role::Object { .. } | Role::Attribute { .. } => Some(join(prefix, &self.separator, &label(map))),
                };

                let child_prefix = own_name.as_deref().unwrap_or(prefix);
                let mut out = map.map_values(|_, value| self.compute(value, child_prefix));

                if let Some(name) = own_name {
                    out.set_text(keys::METRIC_NAME, name);
                }

                ConfigNode::Map(out)
            }
            ConfigNode::List(items) => ConfigNode::List(items.iter().map(|item| self.compute(item, prefix)).collect()),
            ConfigNode::Scalar(_) => node.clone(),
        }
    }
}

fn label(map: &ConfigMap) -> String {
    [keys::COMPUTED_NAME, keys::NAME, keys::ATTRIBUTE, keys::RDN]
        .into_iter()
        .find_map(|key| map.text(key))
        .unwrap_or_default()
}

impl Transformer for ComputeMetricName {
    fn name(&self) -> &'static str {
        "compute-metric-name"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        Ok(self.compute(tree, &self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compute(prefix: &str, yaml: &str) -> ConfigNode {
        ComputeMetricName::new(prefix, "/")
            .transform(&ConfigNode::parse_yaml(yaml).unwrap())
            .unwrap()
    }

    fn child(node: &ConfigNode, index: usize) -> &ConfigNode {
        &node.as_map().unwrap().get("children").and_then(ConfigNode::as_list).unwrap()[index]
    }

    fn metric(node: &ConfigNode) -> Option<String> {
        node.as_map().unwrap().text(keys::METRIC_NAME)
    }

    #[test]
    fn test_label_fallbacks() {
        let out = compute(
            "",
            "
rdn: cn=Monitor
name: monitor
children:
  - rdn: cn=Threads
  - attribute: monitorCounter
  - attribute: x
    name: plain
    computed_name: computed
",
        );
        assert_eq!(metric(&out).as_deref(), Some("monitor"));
        assert_eq!(metric(child(&out, 0)).as_deref(), Some("monitor/cn=Threads"));
        assert_eq!(metric(child(&out, 1)).as_deref(), Some("monitor/monitorCounter"));
        assert_eq!(metric(child(&out, 2)).as_deref(), Some("monitor/computed"));
    }

    #[test]
    fn test_prefix_leads() {
        let out = compute("openldap", "attribute: numEntries\n");
        assert_eq!(metric(&out).as_deref(), Some("openldap/numEntries"));
    }

    #[test]
    fn test_containers_pass_prefix_through() {
        let out = compute("p", "name: ignored\nchildren:\n  - children:\n      - attribute: a\n");
        assert_eq!(metric(&out), None);
        let container = child(&out, 0);
        assert_eq!(metric(container), None);
        assert_eq!(metric(child(container, 0)).as_deref(), Some("p/a"));
    }

    #[test]
    fn test_siblings_share_prefix() {
        let out = compute("", "rdn: r\nname: top\nchildren:\n  - attribute: a\n  - attribute: b\n");
        assert_eq!(metric(child(&out, 0)).as_deref(), Some("top/a"));
        assert_eq!(metric(child(&out, 1)).as_deref(), Some("top/b"));
    }
}
