use std::sync::Arc;

use bonsai_core::Blackboard;

use crate::bt::{Node, Status};

/// A root node plus the blackboard it runs against.
///
/// The blackboard is reference-counted so other threads can publish into it (see
/// [`Tree::shared_blackboard`]) while this tree is driven from one thread.
pub struct Tree {
    root: Box<dyn Node>,
    blackboard: Arc<Blackboard>,
    last: Option<Status>,
    ticks: u64,
}

impl Tree {
    pub fn new(root: Box<dyn Node>) -> Self {
        Self::with_blackboard(root, Arc::new(Blackboard::new()))
    }

    pub fn with_blackboard(root: Box<dyn Node>, blackboard: Arc<Blackboard>) -> Self {
        Self {
            root,
            blackboard,
            last: None,
            ticks: 0,
        }
    }

    pub fn tick(&mut self) -> Status {
        let status = self.root.tick(&self.blackboard);
        self.ticks = self.ticks.wrapping_add(1);
        self.last = Some(status);
        tracing::trace!(tick = self.ticks, ?status, "tree ticked");
        status
    }

    pub fn reset(&mut self) {
        self.root.reset();
        self.last = None;
    }

    pub fn halt(&mut self) {
        tracing::debug!(tick = self.ticks, "tree halted");
        self.root.halt();
    }

    pub fn is_halted(&self) -> bool {
        self.root.is_halted()
    }

    pub fn blackboard(&self) -> &Blackboard {
        &self.blackboard
    }

    pub fn shared_blackboard(&self) -> Arc<Blackboard> {
        Arc::clone(&self.blackboard)
    }

    /// Status returned by the most recent tick, `None` before the first tick or after `reset`.
    pub fn last_status(&self) -> Option<Status> {
        self.last
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn root(&self) -> &dyn Node {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> &mut dyn Node {
        self.root.as_mut()
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("blackboard", &self.blackboard)
            .field("last", &self.last)
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}
