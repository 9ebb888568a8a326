use core::fmt::{Display, Formatter};

/// Location of a node inside the tree, used to point errors at the offending node.
///
/// Rendered as `objects[0].children[2]`; the root renders as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreePath(String);

impl TreePath {
    #[must_use]
    pub const fn root() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn key(&self, key: &str) -> Self {
        if self.0.is_empty() {
            Self(key.to_owned())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{index}]", self.0))
    }
}

impl Display for TreePath {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        if self.0.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_display() {
        assert_eq!(TreePath::root().to_string(), "<root>");
    }

    #[test]
    fn test_nested_display() {
        let path = TreePath::root().key("objects").index(0).key("children").index(2);
        assert_eq!(path.to_string(), "objects[0].children[2]");
    }

    #[test]
    fn test_index_at_root() {
        assert_eq!(TreePath::root().index(1).key("rdn").to_string(), "[1].rdn");
    }
}
