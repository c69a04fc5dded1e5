use bonsai_core::Blackboard;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    Success,
    Failure,
    /// Not finished yet. The node keeps its progress and expects another tick.
    Running,
}

impl Status {
    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, Status::Success)
    }

    #[inline]
    pub fn is_failure(self) -> bool {
        matches!(self, Status::Failure)
    }

    #[inline]
    pub fn is_running(self) -> bool {
        matches!(self, Status::Running)
    }

    /// `Success` or `Failure`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        !self.is_running()
    }

    /// Swaps `Success` and `Failure`; `Running` is left alone.
    #[inline]
    pub fn invert(self) -> Self {
        match self {
            Status::Success => Status::Failure,
            Status::Failure => Status::Success,
            Status::Running => Status::Running,
        }
    }
}

impl From<bool> for Status {
    fn from(value: bool) -> Self {
        if value {
            Status::Success
        } else {
            Status::Failure
        }
    }
}

/// A behavior tree node.
///
/// Contract shared by every implementation:
/// - `tick` is re-entrant: after a terminal status the next call starts a fresh evaluation.
/// - A halted node returns `Failure` from `tick` without running any logic, until `reset`.
/// - `reset` clears per-traversal progress and the halted flag, recursively.
/// - `halt` marks the node and all of its descendants as halted.
pub trait Node: Send + 'static {
    fn tick(&mut self, blackboard: &Blackboard) -> Status;

    fn reset(&mut self);

    fn halt(&mut self);

    fn is_halted(&self) -> bool;
}

impl Node for Box<dyn Node> {
    #[inline]
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        (**self).tick(blackboard)
    }

    #[inline]
    fn reset(&mut self) {
        (**self).reset();
    }

    #[inline]
    fn halt(&mut self) {
        (**self).halt();
    }

    #[inline]
    fn is_halted(&self) -> bool {
        (**self).is_halted()
    }
}
