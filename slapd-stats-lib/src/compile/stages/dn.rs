use super::join;
use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigNode, Role, keys};

/// Derives each node's full DN from the chain of `rdn`s above it.
///
/// An object's `computed_dn` is its own `rdn` followed by its parent's DN; an
/// attribute leaf lives in its parent's entry and takes the parent's DN as is.
/// Containers are not stamped and hand the DN they received to their children.
#[derive(Debug, Clone)]
pub struct ComputeDn {
    separator: String,
}

impl ComputeDn {
    #[must_use]
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.to_owned(),
        }
    }

    fn compute(&self, node: &ConfigNode, suffix: &str) -> ConfigNode {
        match node {
            ConfigNode::Map(map) => {
                let own_dn = match map.role() {
                    Role::Object { rdn } => Some(join(&rdn, &self.separator, suffix)),
                    Role::Attribute { .. } => Some(suffix.to_owned()),
                    Role::Container => None,
                };

                let child_suffix = own_dn.as_deref().unwrap_or(suffix);
                let mut out = map.map_values(|_, value| self.compute(value, child_suffix));

                if let Some(dn) = own_dn {
                    out.set_text(keys::COMPUTED_DN, dn);
                }

                ConfigNode::Map(out)
            }
            ConfigNode::List(items) => ConfigNode::List(items.iter().map(|item| self.compute(item, suffix)).collect()),
            ConfigNode::Scalar(_) => node.clone(),
        }
    }
}

impl Transformer for ComputeDn {
    fn name(&self) -> &'static str {
        "compute-dn"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        Ok(self.compute(tree, ""))
    }
}
