use super::keys;
use crate::Result;
use ohno::IntoAppError;
use serde_yaml::{Mapping, Number, Value};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// A terminal value in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Textual form used for DNs, names, and placeholder substitution.
    ///
    /// Returns `None` for `Null`, which never counts as a present value.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::String(s) => Some(s.clone()),
        }
    }

    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "scale factors are small integers in practice")]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::String(s) => s.trim().parse().ok(),
            Self::Null | Self::Bool(_) => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
            Self::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
            _ => None,
        }
    }
}

/// What a map node stands for, decided by its marker fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    /// The node describes a directory entry. Wins over `attribute` when both are present.
    Object { rdn: String },

    /// The node reads one attribute of its parent's entry.
    Attribute { attribute: String },

    /// No marker: the node only groups its children.
    Container,
}

/// A map node. Keys are kept sorted so that every walk over the tree is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMap {
    fields: BTreeMap<String, ConfigNode>,
}

impl ConfigMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigNode>) -> Option<ConfigNode> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ConfigNode> {
        self.fields.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ConfigNode> {
        self.fields.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The scalar stored under `key`, if the field exists and is a scalar.
    #[must_use]
    pub fn scalar(&self, key: &str) -> Option<&Scalar> {
        match self.fields.get(key) {
            Some(ConfigNode::Scalar(scalar)) => Some(scalar),
            _ => None,
        }
    }

    /// The textual value of a scalar field. Null, maps, and lists yield `None`.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<String> {
        self.scalar(key).and_then(Scalar::text)
    }

    /// Whether a boolean field is present and true.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.scalar(key).and_then(Scalar::as_bool).unwrap_or(false)
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) {
        let _ = self.fields.insert(key.to_owned(), ConfigNode::Scalar(Scalar::String(value.into())));
    }

    #[must_use]
    pub fn role(&self) -> Role {
        if let Some(rdn) = self.text(keys::RDN) {
            Role::Object { rdn }
        } else if let Some(attribute) = self.text(keys::ATTRIBUTE) {
            Role::Attribute { attribute }
        } else {
            Role::Container
        }
    }

    /// Build a new map by transforming every value, keeping keys as they are.
    #[must_use]
    pub fn map_values(&self, mut f: impl FnMut(&str, &ConfigNode) -> ConfigNode) -> Self {
        Self {
            fields: self.fields.iter().map(|(key, value)| (key.clone(), f(key, value))).collect(),
        }
    }

    /// Fallible form of [`map_values`](Self::map_values).
    pub fn try_map_values<E>(&self, mut f: impl FnMut(&str, &ConfigNode) -> Result<ConfigNode, E>) -> Result<Self, E> {
        let mut out = Self::new();
        for (key, value) in &self.fields {
            let _ = out.fields.insert(key.clone(), f(key, value)?);
        }
        Ok(out)
    }
}

impl<'a> IntoIterator for &'a ConfigMap {
    type Item = (&'a String, &'a ConfigNode);
    type IntoIter = btree_map::Iter<'a, String, ConfigNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl<K: Into<String>, V: Into<ConfigNode>> FromIterator<(K, V)> for ConfigMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A node of the declarative monitoring tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Map(ConfigMap),
    List(Vec<ConfigNode>),
    Scalar(Scalar),
}

impl ConfigNode {
    /// Parse a YAML document into a tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML
    pub fn parse_yaml(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text).into_app_err("parsing monitoring tree")?;
        Ok(Self::from_yaml(&value))
    }

    #[must_use]
    pub fn from_yaml(value: &Value) -> Self {
        match value {
            Value::Null => Self::Scalar(Scalar::Null),
            Value::Bool(b) => Self::Scalar(Scalar::Bool(*b)),
            Value::Number(n) => Self::Scalar(number_scalar(n)),
            Value::String(s) => Self::Scalar(Scalar::String(s.clone())),
            Value::Sequence(items) => Self::List(items.iter().map(Self::from_yaml).collect()),
            Value::Mapping(mapping) => Self::Map(mapping.iter().map(|(k, v)| (key_text(k), Self::from_yaml(v))).collect()),
            Value::Tagged(tagged) => Self::from_yaml(&tagged.value),
        }
    }

    #[must_use]
    pub fn to_yaml(&self) -> Value {
        match self {
            Self::Map(map) => {
                let mut mapping = Mapping::new();
                for (key, value) in map {
                    let _ = mapping.insert(Value::String(key.clone()), value.to_yaml());
                }
                Value::Mapping(mapping)
            }
            Self::List(items) => Value::Sequence(items.iter().map(Self::to_yaml).collect()),
            Self::Scalar(Scalar::Null) => Value::Null,
            Self::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            Self::Scalar(Scalar::Int(i)) => Value::Number(Number::from(*i)),
            Self::Scalar(Scalar::Float(f)) => Value::Number(Number::from(*f)),
            Self::Scalar(Scalar::String(s)) => Value::String(s.clone()),
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl From<ConfigMap> for ConfigNode {
    fn from(map: ConfigMap) -> Self {
        Self::Map(map)
    }
}

impl From<Vec<Self>> for ConfigNode {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl From<Scalar> for ConfigNode {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<&str> for ConfigNode {
    fn from(s: &str) -> Self {
        Self::Scalar(Scalar::String(s.to_owned()))
    }
}

impl From<String> for ConfigNode {
    fn from(s: String) -> Self {
        Self::Scalar(Scalar::String(s))
    }
}

fn number_scalar(n: &Number) -> Scalar {
    n.as_i64()
        .map(Scalar::Int)
        .or_else(|| n.as_f64().map(Scalar::Float))
        .unwrap_or(Scalar::Null)
}

fn key_text(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Null => "null".to_owned(),
        Value::Tagged(tagged) => key_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => serde_yaml::to_string(key).map_or_else(|_| String::new(), |s| s.trim_end().to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_builds_maps_lists_and_scalars() {
        let node = ConfigNode::parse_yaml("rdn: cn=Monitor\nchildren:\n  - attribute: monitorCounter\n    scale: 2\n").unwrap();
        let map = node.as_map().unwrap();
        assert_eq!(map.text("rdn").as_deref(), Some("cn=Monitor"));

        let children = map.get("children").and_then(ConfigNode::as_list).unwrap();
        assert_eq!(children.len(), 1);
        let leaf = children[0].as_map().unwrap();
        assert_eq!(leaf.scalar("scale"), Some(&Scalar::Int(2)));
    }

    #[test]
    fn test_non_string_keys_are_rendered() {
        let node = ConfigNode::parse_yaml("1: one\ntrue: yes\n").unwrap();
        let map = node.as_map().unwrap();
        assert!(map.contains_key("1"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_yaml_round_trip_preserves_structure() {
        let text = "a:\n- 1\n- 2.5\n- null\nb: text\nc: false\n";
        let node = ConfigNode::parse_yaml(text).unwrap();
        assert_eq!(ConfigNode::from_yaml(&node.to_yaml()), node);
    }

    #[test]
    fn test_role_prefers_rdn() {
        let map: ConfigMap = [("rdn", "cn=Total"), ("attribute", "monitorCounter")].into_iter().collect();
        assert_eq!(map.role(), Role::Object { rdn: "cn=Total".into() });
    }

    #[test]
    fn test_role_attribute_only() {
        let map: ConfigMap = [("attribute", "monitorCounter")].into_iter().collect();
        assert_eq!(
            map.role(),
            Role::Attribute {
                attribute: "monitorCounter".into()
            }
        );
    }

    #[test]
    fn test_role_null_marker_is_container() {
        let node = ConfigNode::parse_yaml("rdn: null\nname: x\n").unwrap();
        assert_eq!(node.as_map().unwrap().role(), Role::Container);
    }

    #[test]
    fn test_numeric_rdn_counts_as_marker() {
        let node = ConfigNode::parse_yaml("rdn: 42\n").unwrap();
        assert_eq!(node.as_map().unwrap().role(), Role::Object { rdn: "42".into() });
    }

    #[test]
    fn test_flag_accepts_bool_and_text() {
        let node = ConfigNode::parse_yaml("a: true\nb: 'TRUE'\nc: no-thanks\n").unwrap();
        let map = node.as_map().unwrap();
        assert!(map.flag("a"));
        assert!(map.flag("b"));
        assert!(!map.flag("c"));
        assert!(!map.flag("missing"));
    }

    #[test]
    fn test_scalar_as_f64() {
        assert_eq!(Scalar::Int(3).as_f64(), Some(3.0));
        assert_eq!(Scalar::String(" 0.5 ".into()).as_f64(), Some(0.5));
        assert_eq!(Scalar::Bool(true).as_f64(), None);
    }
}
