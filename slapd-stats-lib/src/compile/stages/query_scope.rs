use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigNode, Role, keys};

/// Works out the DN each node's values are fetched under.
///
/// The first object on a path anchors the query scope at its `computed_dn`;
/// everything below it is read with a single subtree query rooted there. A
/// deeper object re-anchors only when it sets `query_root: true`. Unlike the
/// other stages, every map is stamped with `query_dn`, containers included;
/// nodes above any anchor get an empty scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeQueryScope;

impl Transformer for ComputeQueryScope {
    fn name(&self) -> &'static str {
        "compute-query-scope"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        Ok(scope(tree, None))
    }
}

fn scope(node: &ConfigNode, inherited: Option<&str>) -> ConfigNode {
    match node {
        ConfigNode::Map(map) => {
            let anchor = match map.role() {
                Role::Object { rdn } if inherited.is_none() || map.flag(keys::QUERY_ROOT) => {
                    Some(map.text(keys::COMPUTED_DN).unwrap_or(rdn))
                }
                _ => None,
            };

            let current = anchor.as_deref().or(inherited);
            let mut out = map.map_values(|_, value| scope(value, current));
            out.set_text(keys::QUERY_DN, current.unwrap_or_default());
            ConfigNode::Map(out)
        }
        ConfigNode::List(items) => ConfigNode::List(items.iter().map(|item| scope(item, inherited)).collect()),
        ConfigNode::Scalar(_) => node.clone(),
    }
}
