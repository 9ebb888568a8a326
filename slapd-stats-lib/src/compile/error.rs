use core::fmt::{Display, Formatter};

/// Why a monitoring tree could not be compiled.
///
/// Every variant names the tree path of the offending node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// Two keys of one map collapse to the same key after case normalization.
    DuplicateKey { path: String, key: String },

    /// A node asks to be duplicated for an empty list of targets.
    EmptyTargets { path: String },

    /// A duplication target is not a scalar.
    InvalidTargets { path: String },

    /// A field holds a value of the wrong shape.
    InvalidField {
        path: String,
        field: String,
        expected: &'static str,
    },

    /// A derived field that a later step depends on was never computed.
    MissingField { path: String, field: &'static str },

    /// A `{placeholder}` names a field found neither on the node nor on its ancestors.
    UnresolvedPlaceholder { path: String, placeholder: String },

    /// A `{` is never closed.
    UnterminatedPlaceholder { path: String, template: String },

    /// A leaf names a statistic kind that does not exist.
    UnknownStatistic { path: String, kind: String },
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DuplicateKey { path, key } => write!(f, "{path}: more than one field normalizes to '{key}'"),
            Self::EmptyTargets { path } => write!(f, "{path}: node is marked for duplication but lists no targets"),
            Self::InvalidTargets { path } => write!(f, "{path}: duplication targets must be scalars"),
            Self::InvalidField { path, field, expected } => write!(f, "{path}: field '{field}' must be {expected}"),
            Self::MissingField { path, field } => write!(f, "{path}: field '{field}' was not computed"),
            Self::UnresolvedPlaceholder { path, placeholder } => {
                write!(f, "{path}: placeholder '{{{placeholder}}}' does not name a field of this node or its ancestors")
            }
            Self::UnterminatedPlaceholder { path, template } => write!(f, "{path}: unterminated placeholder in '{template}'"),
            Self::UnknownStatistic { path, kind } => {
                write!(f, "{path}: unknown statistic '{kind}' (expected 'gauge', 'counter', or 'timestamp')")
            }
        }
    }
}

impl core::error::Error for CompileError {}
