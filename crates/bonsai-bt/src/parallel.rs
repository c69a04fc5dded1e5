use bonsai_core::Blackboard;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::{Node, Status};
use crate::nodes::{halt_all, reset_all};

/// How many children have to agree before a [`Parallel`] settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Threshold {
    /// Every child.
    All,
    /// At least one child.
    Any,
    /// At least `n` children, clamped to `1..=children` (zero for a node without children).
    AtLeast(usize),
}

impl Threshold {
    /// The concrete count for a node with `children` children. Never exceeds `children`, so an
    /// empty parallel settles under every policy.
    pub fn required(self, children: usize) -> usize {
        match self {
            Threshold::All => children,
            Threshold::Any => children.min(1),
            Threshold::AtLeast(n) => n.max(1).min(children),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParallelPolicy {
    pub success: Threshold,
    pub failure: Threshold,
}

impl Default for ParallelPolicy {
    /// All children must succeed; any failure is fatal.
    fn default() -> Self {
        Self {
            success: Threshold::All,
            failure: Threshold::Any,
        }
    }
}

impl ParallelPolicy {
    pub fn new(success: Threshold, failure: Threshold) -> Self {
        Self { success, failure }
    }
}

/// Ticks every child on every call and settles on counts.
///
/// Per tick, children that finish are counted and reset, running children keep their progress.
/// The failure threshold is checked before the success threshold. Once the node settles it
/// resets all children.
pub struct Parallel {
    children: Vec<Box<dyn Node>>,
    policy: ParallelPolicy,
    halted: bool,
}

impl Parallel {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self::with_policy(children, ParallelPolicy::default())
    }

    pub fn with_policy(children: Vec<Box<dyn Node>>, policy: ParallelPolicy) -> Self {
        Self {
            children,
            policy,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    pub fn policy(&self) -> ParallelPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Node for Parallel {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        for child in self.children.iter_mut() {
            match child.tick(blackboard) {
                Status::Running => {}
                Status::Success => {
                    child.reset();
                    succeeded += 1;
                }
                Status::Failure => {
                    child.reset();
                    failed += 1;
                }
            }
        }

        let n = self.children.len();
        let verdict = if failed >= self.policy.failure.required(n) && failed > 0 {
            Status::Failure
        } else if succeeded >= self.policy.success.required(n) {
            Status::Success
        } else {
            Status::Running
        };

        if verdict.is_terminal() {
            tracing::debug!(
                succeeded,
                failed,
                children = n,
                status = ?verdict,
                "parallel settled"
            );
            self.reset();
        }
        verdict
    }

    fn reset(&mut self) {
        self.halted = false;
        reset_all(&mut self.children);
    }

    fn halt(&mut self) {
        self.halted = true;
        halt_all(&mut self.children);
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}
