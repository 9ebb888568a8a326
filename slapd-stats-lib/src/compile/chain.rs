use super::CompileError;
use super::stages::{
    ComputeDn, ComputeMetricName, ComputeQueryScope, DuplicateTargets, FlattenChildren, InterpolateNames, NormalizeKeys,
};
use crate::tree::ConfigNode;
use core::fmt::Debug;
use std::time::Instant;

const LOG_TARGET: &str = "   compile";

/// One pass of the compiler.
pub trait Transformer: Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Build a new tree from `tree`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree is inconsistent in a way this stage cannot resolve
    fn transform(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError>;
}

/// Separators and prefixes that parameterize the standard stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub dn_separator: String,
    pub metric_separator: String,
    pub metric_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dn_separator: ",".to_owned(),
            metric_separator: "/".to_owned(),
            metric_prefix: String::new(),
        }
    }
}

/// An ordered, append-only list of compiler stages.
#[derive(Debug, Default)]
pub struct TransformationChain {
    stages: Vec<Box<dyn Transformer>>,
}

impl TransformationChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage. Stages run in the order they are registered.
    pub fn register(&mut self, stage: impl Transformer + 'static) {
        self.stages.push(Box::new(stage));
    }

    #[must_use]
    pub fn with(mut self, stage: impl Transformer + 'static) -> Self {
        self.register(stage);
        self
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Fold `tree` through every stage, feeding each stage the previous one's output.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any stage; nothing is produced in that case
    pub fn compile(&self, tree: &ConfigNode) -> Result<ConfigNode, CompileError> {
        let mut current = tree.clone();
        for stage in &self.stages {
            let start = Instant::now();
            current = stage.transform(&current).inspect_err(|e| {
                log::error!(target: LOG_TARGET, "Stage '{}' failed: {e}", stage.name());
            })?;
            log::debug!(target: LOG_TARGET, "Finished stage '{}' in {:.3}s", stage.name(), start.elapsed().as_secs_f64());
        }

        Ok(current)
    }
}

/// Build the standard chain, in its fixed order.
///
/// DNs are computed before duplication, so a per-database DN is written with a
/// `{database}` placeholder in its `rdn`, which the interpolation stage resolves
/// once every copy carries its own `database`.
#[must_use]
pub fn default_chain(options: &CompileOptions) -> TransformationChain {
    TransformationChain::new()
        .with(NormalizeKeys)
        .with(ComputeDn::new(&options.dn_separator))
        .with(DuplicateTargets)
        .with(FlattenChildren)
        .with(InterpolateNames)
        .with(ComputeMetricName::new(&options.metric_prefix, &options.metric_separator))
        .with(ComputeQueryScope)
}
