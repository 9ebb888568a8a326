//! The standard compiler stages.

mod dn;
mod duplicate;
mod flatten;
mod interpolate;
mod metric_name;
mod normalize;
mod query_scope;

pub use dn::ComputeDn;
pub use duplicate::DuplicateTargets;
pub use flatten::FlattenChildren;
pub use interpolate::InterpolateNames;
pub use metric_name::ComputeMetricName;
pub use normalize::NormalizeKeys;
pub use query_scope::ComputeQueryScope;

/// Join `head` and `tail` with `separator`, dropping the separator when either side is empty.
fn join(head: &str, separator: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_owned(),
        (false, true) => head.to_owned(),
        (false, false) => format!("{head}{separator}{tail}"),
    }
}
