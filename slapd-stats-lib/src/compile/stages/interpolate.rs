use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigMap, ConfigNode, Role, TreePath, keys};

/// Resolves `{field}` placeholders in names and DNs.
///
/// A placeholder is looked up on the node's own scalar fields first, then on
/// each ancestor, nearest first. `{{` and `}}` stand for literal braces.
///
/// Every object or attribute node with a `name` gains a `computed_name`
/// (unless it already has one). Each `computed_dn` is rebuilt segment by
/// segment: the part a node added on top of its nearest DN-bearing ancestor
/// is resolved in that node's own scope, then joined onto the ancestor's
/// resolved DN. This is what lets an `rdn` such as `cn=Database {database}`
/// be written once and resolved per copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterpolateNames;

impl Transformer for InterpolateNames {
    fn name(&self) -> &'static str {
        "interpolate-names"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        let mut scopes = Vec::new();
        interpolate(tree, &mut scopes, None, &TreePath::root())
    }
}

/// The `computed_dn` of the nearest ancestor that has one, as written and resolved.
struct ParentDn<'a> {
    template: &'a str,
    resolved: String,
}

fn interpolate<'a>(
    node: &'a ConfigNode,
    scopes: &mut Vec<&'a ConfigMap>,
    parent_dn: Option<&ParentDn<'_>>,
    path: &TreePath,
) -> Result<ConfigNode, CompileError> {
    match node {
        ConfigNode::Map(map) => {
            let template = map.text(keys::COMPUTED_DN);
            let resolved = template
                .as_deref()
                .map(|dn| resolve_dn(dn, parent_dn, |field| lookup(map, scopes.as_slice(), field), path))
                .transpose()?;

            let own_dn = template.as_deref().zip(resolved.clone()).map(|(template, resolved)| ParentDn { template, resolved });
            let child_dn = own_dn.as_ref().or(parent_dn);

            scopes.push(map);
            let result: Result<ConfigMap, CompileError> = map
                .iter()
                .map(|(key, value)| Ok::<_, CompileError>((key.clone(), interpolate(value, scopes, child_dn, &path.key(key))?)))
                .collect();
            let _ = scopes.pop();
            let mut out = result?;

            if map.role() != Role::Container
                && !map.contains_key(keys::COMPUTED_NAME)
                && let Some(name) = map.text(keys::NAME)
            {
                out.set_text(keys::COMPUTED_NAME, render(&name, |field| lookup(map, scopes.as_slice(), field), path)?);
            }

            if let Some(resolved) = resolved {
                out.set_text(keys::COMPUTED_DN, resolved);
            }

            Ok(ConfigNode::Map(out))
        }
        ConfigNode::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| interpolate(item, scopes, parent_dn, &path.index(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigNode::List),
        ConfigNode::Scalar(_) => Ok(node.clone()),
    }
}

/// A field of `map`, else of the nearest ancestor that has it.
fn lookup(map: &ConfigMap, ancestors: &[&ConfigMap], field: &str) -> Option<String> {
    map.text(field).or_else(|| ancestors.iter().rev().find_map(|scope| scope.text(field)))
}

/// Resolve a `computed_dn`, leaving the part inherited from `parent` to the parent.
fn resolve_dn(
    template: &str,
    parent: Option<&ParentDn<'_>>,
    lookup: impl Fn(&str) -> Option<String>,
    path: &TreePath,
) -> Result<String, CompileError> {
    if let Some(parent) = parent
        && let Some(own) = template.strip_suffix(parent.template)
    {
        return Ok(format!("{}{}", render(own, lookup, path)?, parent.resolved));
    }

    render(template, lookup, path)
}

/// Expand the placeholders of `template`.
fn render(template: &str, lookup: impl Fn(&str) -> Option<String>, path: &TreePath) -> Result<String, CompileError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some(after) = tail.strip_prefix('}') {
            out.push('}');
            rest = after;
        } else {
            let Some(end) = tail.find('}') else {
                return Err(CompileError::UnterminatedPlaceholder {
                    path: path.to_string(),
                    template: template.to_owned(),
                });
            };

            let field = tail[1..end].trim();
            let value = lookup(field).ok_or_else(|| CompileError::UnresolvedPlaceholder {
                path: path.to_string(),
                placeholder: field.to_owned(),
            })?;
            out.push_str(&value);
            rest = &tail[end + 1..];
        }
    }

    out.push_str(rest);
    Ok(out)
}
