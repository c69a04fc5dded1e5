//! Umbrella crate that re-exports the `bonsai-*` building blocks.
//!
//! `bonsai::core` holds the blackboard, clocks and the deterministic RNG; `bonsai::bt` holds the
//! nodes, decorators and the tree builder. Most users only need [`prelude`].

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use bonsai_core as core;

#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub use bonsai_bt as bt;

/// Common imports for building and ticking trees.
#[cfg(feature = "bt")]
#[cfg_attr(docsrs, doc(cfg(feature = "bt")))]
pub mod prelude {
    pub use bonsai_bt::{
        Action, BuildError, Builder, Condition, Decorator, Node, ParallelPolicy, Status,
        Threshold, Transform, Tree,
    };
    pub use bonsai_core::{BbKey, Blackboard, Clock, ManualClock, MonotonicClock};
}
