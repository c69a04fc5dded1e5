use std::fmt;

use thiserror::Error;

/// Composite contexts the builder can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Sequence,
    Selector,
    ReactiveSequence,
    ReactiveSelector,
    Parallel,
    Utility,
    WeightedRandom,
}

impl CompositeKind {
    /// Whether children of this composite carry a score function.
    pub fn is_scored(self) -> bool {
        matches!(self, CompositeKind::Utility | CompositeKind::WeightedRandom)
    }
}

impl fmt::Display for CompositeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompositeKind::Sequence => "sequence",
            CompositeKind::Selector => "selector",
            CompositeKind::ReactiveSequence => "reactive sequence",
            CompositeKind::ReactiveSelector => "reactive selector",
            CompositeKind::Parallel => "parallel",
            CompositeKind::Utility => "utility selector",
            CompositeKind::WeightedRandom => "weighted random selector",
        };
        f.write_str(name)
    }
}

/// Errors raised while assembling a tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("cannot build tree: no root node")]
    NoRoot,

    #[error("cannot build tree: {depth} composite(s) still open")]
    UnclosedComposite { depth: usize },

    #[error("end() called with no open composite")]
    UnbalancedEnd,

    #[error("{kind} has no children")]
    EmptyComposite { kind: CompositeKind },

    #[error("{count} decorator(s) queued with no node to wrap")]
    DanglingDecorator { count: usize },

    #[error("tree already has a root node")]
    MultipleRoots,

    #[error("child of {kind} added without a score")]
    MissingScore { kind: CompositeKind },

    #[error("score() only applies to the next child of a utility or weighted random selector")]
    UnexpectedScore,
}

pub type BuildResult<T> = Result<T, BuildError>;
