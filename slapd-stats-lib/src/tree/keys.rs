//! Field names with meaning to the compiler.

/// Relative DN of the directory entry a node describes.
pub const RDN: &str = "rdn";

/// Directory attribute read by a metric leaf.
pub const ATTRIBUTE: &str = "attribute";

/// Full DN, derived from the `rdn` chain.
pub const COMPUTED_DN: &str = "computed_dn";

/// Search base that returns this node's entry.
pub const QUERY_DN: &str = "query_dn";

/// Hierarchical metric name.
pub const METRIC_NAME: &str = "metric_name";

/// Display name, may contain `{field}` placeholders.
pub const NAME: &str = "name";

/// `name` with its placeholders resolved.
pub const COMPUTED_NAME: &str = "computed_name";

/// Target a duplicated subtree belongs to.
pub const DATABASE: &str = "database";

/// Targets to duplicate a subtree for.
pub const DATABASES: &str = "databases";

/// Ordered child nodes.
pub const CHILDREN: &str = "children";

/// Named child objects, flattened into `children`.
pub const OBJECTS: &str = "objects";

/// Named attribute leaves, flattened into `children`.
pub const ATTRIBUTES: &str = "attributes";

/// Makes an object start a new query scope.
pub const QUERY_ROOT: &str = "query_root";

/// Statistic kind of a metric leaf.
pub const STATISTIC: &str = "statistic";

pub const UNIT: &str = "unit";
pub const DESCRIPTION: &str = "description";
pub const SCALE: &str = "scale";
