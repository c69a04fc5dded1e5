use bonsai_core::Blackboard;

use crate::bt::{Node, Status};

/// Leaf node running a user function once per tick.
///
/// The function should not block: ticks are synchronous, and long work is expressed by returning
/// `Running` and picking up again on the next tick (usually via the blackboard).
pub struct Action<F> {
    func: F,
    halted: bool,
}

impl<F> Action<F>
where
    F: FnMut(&Blackboard) -> Status + Send + 'static,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            halted: false,
        }
    }
}

impl<F> Node for Action<F>
where
    F: FnMut(&Blackboard) -> Status + Send + 'static,
{
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }
        (self.func)(blackboard)
    }

    fn reset(&mut self) {
        self.halted = false;
    }

    fn halt(&mut self) {
        self.halted = true;
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

/// Leaf node mapping a predicate to `Success` / `Failure`.
pub struct Condition<F> {
    cond: F,
    halted: bool,
}

impl<F> Condition<F>
where
    F: FnMut(&Blackboard) -> bool + Send + 'static,
{
    pub fn new(cond: F) -> Self {
        Self {
            cond,
            halted: false,
        }
    }
}

impl<F> Node for Condition<F>
where
    F: FnMut(&Blackboard) -> bool + Send + 'static,
{
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }
        Status::from((self.cond)(blackboard))
    }

    fn reset(&mut self) {
        self.halted = false;
    }

    fn halt(&mut self) {
        self.halted = true;
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

pub(crate) fn reset_all(children: &mut [Box<dyn Node>]) {
    for c in children.iter_mut() {
        c.reset();
    }
}

pub(crate) fn halt_all(children: &mut [Box<dyn Node>]) {
    for c in children.iter_mut() {
        c.halt();
    }
}

/// AND composite with memory.
///
/// A `Running` child is resumed on the next tick; children that already succeeded in this
/// traversal are not ticked again.
pub struct Sequence {
    children: Vec<Box<dyn Node>>,
    index: usize,
    halted: bool,
}

impl Sequence {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self {
            children,
            index: 0,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Index of the child the next tick starts from.
    pub fn current_index(&self) -> usize {
        self.index
    }
}

impl Node for Sequence {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        while self.index < self.children.len() {
            let status = self.children[self.index].tick(blackboard);
            match status {
                Status::Running => return Status::Running,
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Success => self.index += 1,
            }
        }

        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        self.index = 0;
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

/// OR composite with memory (a.k.a. fallback).
pub struct Selector {
    children: Vec<Box<dyn Node>>,
    index: usize,
    halted: bool,
}

impl Selector {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self {
            children,
            index: 0,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }
}

impl Node for Selector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        while self.index < self.children.len() {
            let status = self.children[self.index].tick(blackboard);
            match status {
                Status::Running => return Status::Running,
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Failure => self.index += 1,
            }
        }

        self.reset();
        Status::Failure
    }

    fn reset(&mut self) {
        self.index = 0;
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

/// AND composite that re-checks every child from the start on each tick.
///
/// Useful when earlier children are guards that must keep holding while a later child runs. If a
/// different child becomes the running one, the previously running child is reset.
pub struct ReactiveSequence {
    children: Vec<Box<dyn Node>>,
    running: Option<usize>,
    halted: bool,
}

impl ReactiveSequence {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self {
            children,
            running: None,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    pub fn running_child(&self) -> Option<usize> {
        self.running
    }
}

impl Node for ReactiveSequence {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        for i in 0..self.children.len() {
            let status = self.children[i].tick(blackboard);
            match status {
                Status::Failure => {
                    self.reset();
                    return Status::Failure;
                }
                Status::Running => {
                    if self.running != Some(i) {
                        if let Some(prev) = self.running {
                            self.children[prev].reset();
                        }
                        self.running = Some(i);
                    }
                    return Status::Running;
                }
                Status::Success => continue,
            }
        }

        self.reset();
        Status::Success
    }

    fn reset(&mut self) {
        self.running = None;
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

/// OR composite that re-tries higher-priority children on each tick.
pub struct ReactiveSelector {
    children: Vec<Box<dyn Node>>,
    running: Option<usize>,
    halted: bool,
}

impl ReactiveSelector {
    pub fn new(children: Vec<Box<dyn Node>>) -> Self {
        Self {
            children,
            running: None,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Box<dyn Node>) {
        self.children.push(child);
    }

    pub fn running_child(&self) -> Option<usize> {
        self.running
    }
}

impl Node for ReactiveSelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        for i in 0..self.children.len() {
            let status = self.children[i].tick(blackboard);
            match status {
                Status::Failure => continue,
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Running => {
                    if self.running != Some(i) {
                        if let Some(prev) = self.running {
                            self.children[prev].reset();
                        }
                        self.running = Some(i);
                    }
                    return Status::Running;
                }
            }
        }

        self.reset();
        Status::Failure
    }

    fn reset(&mut self) {
        self.running = None;
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
