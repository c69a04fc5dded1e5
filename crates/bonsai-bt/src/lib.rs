//! Behavior tree runtime built on `bonsai-core`.
//!
//! Trees are made of [`Node`]s ticked against a shared [`Blackboard`](bonsai_core::Blackboard):
//!
//! - leaves: [`Action`], [`Condition`]
//! - composites: [`Sequence`], [`Selector`] (with memory), [`ReactiveSequence`],
//!   [`ReactiveSelector`], [`Parallel`], [`UtilitySelector`], [`WeightedRandomSelector`]
//! - [`Decorator`] with the transforms in [`decorator`]
//!
//! [`Tree`] owns a root and its blackboard; [`Builder`] assembles both fluently.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod bt;
pub mod builder;
pub mod decorator;
pub mod error;
pub mod nodes;
pub mod parallel;
pub mod tree;
pub mod utility;

pub use bt::{Node, Status};
pub use builder::Builder;
pub use decorator::{
    Cooldown, Decorator, Failer, FnTransform, Inverter, Repeat, Retry, Succeeder, Timeout,
    Transform,
};
pub use error::{BuildError, BuildResult, CompositeKind};
pub use nodes::{Action, Condition, ReactiveSelector, ReactiveSequence, Selector, Sequence};
pub use parallel::{Parallel, ParallelPolicy, Threshold};
pub use tree::Tree;
pub use utility::{Scored, UtilityConfig, UtilitySelector, WeightedRandomSelector};
