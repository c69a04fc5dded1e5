//! Engine-agnostic primitives shared by bonsai behavior trees.
//!
//! - [`Blackboard`]: the thread-safe typed store nodes communicate through.
//! - [`Clock`]: monotonic time for nodes that measure elapsed time.
//! - [`SplitMix64`]: seeded RNG for reproducible stochastic selection.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod clock;
pub mod rng;

pub use blackboard::{BbKey, Blackboard};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use rng::{DeterministicRng, SplitMix64};
