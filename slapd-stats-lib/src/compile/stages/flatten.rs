use crate::compile::{CompileError, Transformer};
use crate::tree::{ConfigMap, ConfigNode, Scalar, TreePath, keys};

/// Turns the `objects` and `attributes` shorthands into ordinary `children`.
///
/// `objects: {label: {...}}` becomes a child object named `label`, and
/// `attributes: {monitorCounter: counter}` becomes an attribute leaf reading
/// `monitorCounter` with the `counter` statistic. Leaves synthesized here were
/// never seen by the DN stage, so they take the DN of the entry they belong to.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlattenChildren;

impl Transformer for FlattenChildren {
    fn name(&self) -> &'static str {
        "flatten-children"
    }

    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        flatten(tree, "", &TreePath::root())
    }
}

fn flatten(node: &ConfigNode, inherited_dn: &str, path: &TreePath) -> Result<ConfigNode, CompileError> {
    match node {
        ConfigNode::Map(map) => {
            let dn = map.text(keys::COMPUTED_DN).unwrap_or_else(|| inherited_dn.to_owned());

            let mut out = map.clone();
            let objects = out.remove(keys::OBJECTS);
            let attributes = out.remove(keys::ATTRIBUTES);
            let existing = out.remove(keys::CHILDREN);

            if objects.is_some() || attributes.is_some() || existing.is_some() {
                let mut children = match existing {
                    Some(ConfigNode::List(items)) => items,
                    Some(ConfigNode::Scalar(Scalar::Null)) | None => Vec::new(),
                    Some(other) => vec![other],
                };

                if let Some(objects) = &objects {
                    object_children(objects, &path.key(keys::OBJECTS), &mut children)?;
                }

                if let Some(attributes) = &attributes {
                    attribute_children(attributes, &dn, &path.key(keys::ATTRIBUTES), &mut children)?;
                }

                let _ = out.insert(keys::CHILDREN, children);
            }

            out.try_map_values(|key, value| flatten(value, &dn, &path.key(key))).map(ConfigNode::Map)
        }
        ConfigNode::List(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| flatten(item, inherited_dn, &path.index(index)))
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigNode::List),
        ConfigNode::Scalar(_) => Ok(node.clone()),
    }
}

fn object_children(objects: &ConfigNode, path: &TreePath, children: &mut Vec<ConfigNode>) -> Result<(), CompileError> {
    let invalid = |path: &TreePath| CompileError::InvalidField {
        path: path.to_string(),
        field: keys::OBJECTS.to_owned(),
        expected: "a map or a list of maps",
    };

    match objects {
        ConfigNode::Map(entries) => {
            for (label, entry) in entries {
                let path = path.key(label);
                match entry {
                    ConfigNode::Map(object) => children.push(named(object, label)),

                    // an entry that was duplicated per database
                    ConfigNode::List(copies) => {
                        for (index, copy) in copies.iter().enumerate() {
                            let object = copy.as_map().ok_or_else(|| invalid(&path.index(index)))?;
                            children.push(named(object, label));
                        }
                    }
                    ConfigNode::Scalar(_) => return Err(invalid(&path)),
                }
            }
        }
        ConfigNode::List(items) => {
            for (index, item) in items.iter().enumerate() {
                if item.as_map().is_none() {
                    return Err(invalid(&path.index(index)));
                }
                children.push(item.clone());
            }
        }
        ConfigNode::Scalar(Scalar::Null) => {}
        ConfigNode::Scalar(_) => return Err(invalid(path)),
    }

    Ok(())
}

fn attribute_children(attributes: &ConfigNode, dn: &str, path: &TreePath, children: &mut Vec<ConfigNode>) -> Result<(), CompileError> {
    let invalid = |path: &TreePath| CompileError::InvalidField {
        path: path.to_string(),
        field: keys::ATTRIBUTES.to_owned(),
        expected: "a map, a list, or an attribute name",
    };

    match attributes {
        ConfigNode::Map(entries) => {
            for (attribute, entry) in entries {
                let path = path.key(attribute);
                match entry {
                    ConfigNode::Scalar(Scalar::Null) => children.push(leaf(attribute, None, dn)),
                    ConfigNode::Scalar(statistic) => children.push(leaf(attribute, statistic.text(), dn)),
                    ConfigNode::Map(fields) => children.push(attribute_leaf(fields, attribute, dn)),
                    ConfigNode::List(copies) => {
                        for (index, copy) in copies.iter().enumerate() {
                            let fields = copy.as_map().ok_or_else(|| invalid(&path.index(index)))?;
                            children.push(attribute_leaf(fields, attribute, dn));
                        }
                    }
                }
            }
        }
        ConfigNode::List(items) => {
            for (index, item) in items.iter().enumerate() {
                match item {
                    ConfigNode::Map(fields) if fields.contains_key(keys::ATTRIBUTE) => children.push(stamp_dn(fields.clone(), dn)),
                    ConfigNode::Scalar(scalar) => {
                        let attribute = scalar.text().ok_or_else(|| invalid(&path.index(index)))?;
                        children.push(leaf(&attribute, None, dn));
                    }
                    _ => return Err(invalid(&path.index(index))),
                }
            }
        }
        ConfigNode::Scalar(Scalar::Null) => {}
        ConfigNode::Scalar(scalar) => {
            let attribute = scalar.text().ok_or_else(|| invalid(path))?;
            children.push(leaf(&attribute, None, dn));
        }
    }

    Ok(())
}

fn named(object: &ConfigMap, label: &str) -> ConfigNode {
    let mut object = object.clone();
    if !object.contains_key(keys::NAME) {
        object.set_text(keys::NAME, label);
    }
    ConfigNode::Map(object)
}

fn leaf(attribute: &str, statistic: Option<String>, dn: &str) -> ConfigNode {
    let mut map = ConfigMap::new();
    map.set_text(keys::ATTRIBUTE, attribute);
    if let Some(statistic) = statistic {
        map.set_text(keys::STATISTIC, statistic);
    }
    map.set_text(keys::COMPUTED_DN, dn);
    ConfigNode::Map(map)
}

fn attribute_leaf(fields: &ConfigMap, attribute: &str, dn: &str) -> ConfigNode {
    let mut fields = fields.clone();
    if !fields.contains_key(keys::ATTRIBUTE) {
        fields.set_text(keys::ATTRIBUTE, attribute);
    }
    stamp_dn(fields, dn)
}

fn stamp_dn(mut fields: ConfigMap, dn: &str) -> ConfigNode {
    if !fields.contains_key(keys::COMPUTED_DN) {
        fields.set_text(keys::COMPUTED_DN, dn);
    }
    ConfigNode::Map(fields)
}
