use crate::Result;
use core::fmt::Debug;
use std::collections::BTreeMap;

/// One directory entry returned by a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub dn: String,
    pub attributes: BTreeMap<String, String>,
}

impl Entry {
    #[must_use]
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(attribute.into(), value.into());
        self
    }
}

/// A connection to a directory server.
///
/// Queries block; callers that live on an async runtime run them on a
/// blocking thread.
pub trait DirectoryClient: Send + Sync + Debug {
    /// Human-readable identity of the server, used in log messages.
    fn server(&self) -> &str;

    /// Return every entry whose DN is `base_dn` or lies below it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query could not be carried out. A base DN that
    /// does not exist is not an error and yields an empty list.
    fn query(&self, base_dn: &str) -> Result<Vec<Entry>>;
}
