//! Fluent construction of behavior trees.
//!
//! The builder keeps a stack of open composite contexts. Composite methods (`sequence`,
//! `selector`, `parallel`, ...) open a context, leaves (`action`, `condition`, `node`) are
//! appended to the innermost open context, and `end` closes it. Decorator methods queue a wrapper
//! for the next node appended, leaf or composite; the first decorator queued ends up outermost.
//!
//! ```rust,ignore
//! use bonsai_bt::{Builder, Status};
//!
//! let mut tree = Builder::new()
//!     .selector()
//!         .sequence()
//!             .condition(|bb| bb.get_or("enemy_visible", false))
//!             .retry(3)
//!             .action(|_| Status::Success)
//!         .end()
//!         .action(|_| Status::Running)
//!     .end()
//!     .build()?;
//! ```
//!
//! Mistakes are recorded as they happen; [`Builder::build`] reports the first one.

use std::time::Duration;

use bonsai_core::Blackboard;

use crate::bt::{Node, Status};
use crate::decorator::{
    Cooldown, Decorator, Failer, Inverter, Repeat, Retry, Succeeder, Timeout, Transform,
};
use crate::error::{BuildError, BuildResult, CompositeKind};
use crate::nodes::{Action, Condition, ReactiveSelector, ReactiveSequence, Selector, Sequence};
use crate::parallel::{Parallel, ParallelPolicy};
use crate::tree::Tree;
use crate::utility::{ScoreFn, Scored, UtilityConfig, UtilitySelector, WeightedRandomSelector};

type Wrap = Box<dyn FnOnce(Box<dyn Node>) -> Box<dyn Node>>;

enum FrameConfig {
    Sequence,
    Selector,
    ReactiveSequence,
    ReactiveSelector,
    Parallel(ParallelPolicy),
    Utility(UtilityConfig),
    WeightedRandom(u64),
}

impl FrameConfig {
    fn kind(&self) -> CompositeKind {
        match self {
            FrameConfig::Sequence => CompositeKind::Sequence,
            FrameConfig::Selector => CompositeKind::Selector,
            FrameConfig::ReactiveSequence => CompositeKind::ReactiveSequence,
            FrameConfig::ReactiveSelector => CompositeKind::ReactiveSelector,
            FrameConfig::Parallel(_) => CompositeKind::Parallel,
            FrameConfig::Utility(_) => CompositeKind::Utility,
            FrameConfig::WeightedRandom(_) => CompositeKind::WeightedRandom,
        }
    }
}

struct Frame {
    config: FrameConfig,
    children: Vec<Box<dyn Node>>,
    scores: Vec<ScoreFn>,
    /// Decorators queued before this composite was opened.
    wraps: Vec<Wrap>,
    /// Score for this composite within its (scored) parent.
    score: Option<ScoreFn>,
}

impl Frame {
    fn seal(self) -> (Box<dyn Node>, Vec<Wrap>, Option<ScoreFn>) {
        let Frame {
            config,
            children,
            scores,
            wraps,
            score,
        } = self;

        let node: Box<dyn Node> = match config {
            FrameConfig::Sequence => Box::new(Sequence::new(children)),
            FrameConfig::Selector => Box::new(Selector::new(children)),
            FrameConfig::ReactiveSequence => Box::new(ReactiveSequence::new(children)),
            FrameConfig::ReactiveSelector => Box::new(ReactiveSelector::new(children)),
            FrameConfig::Parallel(policy) => Box::new(Parallel::with_policy(children, policy)),
            FrameConfig::Utility(config) => {
                Box::new(UtilitySelector::new(zip_scored(children, scores)).with_config(config))
            }
            FrameConfig::WeightedRandom(seed) => Box::new(WeightedRandomSelector::with_seed(
                zip_scored(children, scores),
                seed,
            )),
        };
        (node, wraps, score)
    }
}

fn zip_scored(children: Vec<Box<dyn Node>>, scores: Vec<ScoreFn>) -> Vec<Scored> {
    children
        .into_iter()
        .zip(scores)
        .map(|(node, score_fn)| Scored { node, score_fn })
        .collect()
}

#[derive(Default)]
pub struct Builder {
    root: Option<Box<dyn Node>>,
    stack: Vec<Frame>,
    pending: Vec<Wrap>,
    pending_score: Option<ScoreFn>,
    error: Option<BuildError>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    // Composites

    pub fn sequence(self) -> Self {
        self.open(FrameConfig::Sequence)
    }

    pub fn selector(self) -> Self {
        self.open(FrameConfig::Selector)
    }

    pub fn reactive_sequence(self) -> Self {
        self.open(FrameConfig::ReactiveSequence)
    }

    pub fn reactive_selector(self) -> Self {
        self.open(FrameConfig::ReactiveSelector)
    }

    pub fn parallel(self, policy: ParallelPolicy) -> Self {
        self.open(FrameConfig::Parallel(policy))
    }

    /// Utility selector; attach a score to every child with [`Builder::score`].
    pub fn utility(self) -> Self {
        self.utility_with(UtilityConfig::default())
    }

    pub fn utility_with(self, config: UtilityConfig) -> Self {
        self.open(FrameConfig::Utility(config))
    }

    /// Weighted random selector; attach a weight to every child with [`Builder::score`].
    pub fn weighted_random(self, seed: u64) -> Self {
        self.open(FrameConfig::WeightedRandom(seed))
    }

    pub fn end(mut self) -> Self {
        if self.error.is_some() {
            return self;
        }
        if !self.pending.is_empty() {
            let count = self.pending.len();
            return self.fail(BuildError::DanglingDecorator { count });
        }
        if self.pending_score.is_some() {
            return self.fail(BuildError::UnexpectedScore);
        }
        let Some(frame) = self.stack.pop() else {
            return self.fail(BuildError::UnbalancedEnd);
        };
        if frame.children.is_empty() {
            let kind = frame.config.kind();
            return self.fail(BuildError::EmptyComposite { kind });
        }

        let (node, wraps, score) = frame.seal();
        self.pending_score = score;
        self.attach(node, wraps)
    }

    // Leaves

    pub fn action<F>(self, func: F) -> Self
    where
        F: FnMut(&Blackboard) -> Status + Send + 'static,
    {
        self.node(Box::new(Action::new(func)))
    }

    pub fn condition<F>(self, cond: F) -> Self
    where
        F: FnMut(&Blackboard) -> bool + Send + 'static,
    {
        self.node(Box::new(Condition::new(cond)))
    }

    /// Append any node, e.g. a custom [`Node`] implementation or a prebuilt subtree.
    pub fn node(mut self, node: Box<dyn Node>) -> Self {
        if self.error.is_some() {
            return self;
        }
        let wraps = std::mem::take(&mut self.pending);
        self.attach(node, wraps)
    }

    /// Score (or weight) for the next child of the innermost utility / weighted random selector.
    pub fn score<F>(mut self, score_fn: F) -> Self
    where
        F: FnMut(&Blackboard) -> f32 + Send + 'static,
    {
        if self.error.is_some() {
            return self;
        }
        let scored_parent = self
            .stack
            .last()
            .is_some_and(|f| f.config.kind().is_scored());
        if !scored_parent || self.pending_score.is_some() {
            return self.fail(BuildError::UnexpectedScore);
        }
        self.pending_score = Some(Box::new(score_fn));
        self
    }

    // Decorators

    pub fn decorate<T: Transform>(mut self, transform: T) -> Self {
        if self.error.is_some() {
            return self;
        }
        self.pending.push(Box::new(move |child: Box<dyn Node>| -> Box<dyn Node> {
            Box::new(Decorator::new(transform, child))
        }));
        self
    }

    pub fn inverter(self) -> Self {
        self.decorate(Inverter)
    }

    pub fn succeeder(self) -> Self {
        self.decorate(Succeeder)
    }

    pub fn failer(self) -> Self {
        self.decorate(Failer)
    }

    pub fn repeat(self, times: u32) -> Self {
        self.decorate(Repeat::times(times))
    }

    pub fn repeat_forever(self) -> Self {
        self.decorate(Repeat::forever())
    }

    pub fn retry(self, times: u32) -> Self {
        self.decorate(Retry::times(times))
    }

    pub fn retry_forever(self) -> Self {
        self.decorate(Retry::forever())
    }

    pub fn timeout(self, limit: Duration) -> Self {
        self.decorate(Timeout::new(limit))
    }

    pub fn cooldown(self, period: Duration) -> Self {
        self.decorate(Cooldown::new(period))
    }

    // Finishing

    pub fn build(self) -> BuildResult<Tree> {
        self.build_node().map(Tree::new)
    }

    /// Finish and return the root node, e.g. to embed the result in another tree.
    pub fn build_node(self) -> BuildResult<Box<dyn Node>> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if !self.pending.is_empty() {
            return Err(log_error(BuildError::DanglingDecorator {
                count: self.pending.len(),
            }));
        }
        if !self.stack.is_empty() {
            return Err(log_error(BuildError::UnclosedComposite {
                depth: self.stack.len(),
            }));
        }
        self.root.ok_or_else(|| log_error(BuildError::NoRoot))
    }

    fn open(mut self, config: FrameConfig) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Some(parent) = self.stack.last() {
            let kind = parent.config.kind();
            if kind.is_scored() && self.pending_score.is_none() {
                return self.fail(BuildError::MissingScore { kind });
            }
        }

        let wraps = std::mem::take(&mut self.pending);
        let score = self.pending_score.take();
        self.stack.push(Frame {
            config,
            children: Vec::new(),
            scores: Vec::new(),
            wraps,
            score,
        });
        self
    }

    fn attach(mut self, node: Box<dyn Node>, wraps: Vec<Wrap>) -> Self {
        let node = wraps.into_iter().rev().fold(node, |child, wrap| wrap(child));

        let Some(frame) = self.stack.last_mut() else {
            if self.pending_score.is_some() {
                return self.fail(BuildError::UnexpectedScore);
            }
            if self.root.is_some() {
                return self.fail(BuildError::MultipleRoots);
            }
            self.root = Some(node);
            return self;
        };

        let kind = frame.config.kind();
        if kind.is_scored() {
            let Some(score) = self.pending_score.take() else {
                return self.fail(BuildError::MissingScore { kind });
            };
            frame.scores.push(score);
        } else if self.pending_score.is_some() {
            return self.fail(BuildError::UnexpectedScore);
        }
        frame.children.push(node);
        self
    }

    fn fail(mut self, err: BuildError) -> Self {
        if self.error.is_none() {
            self.error = Some(log_error(err));
        }
        self
    }
}

fn log_error(err: BuildError) -> BuildError {
    tracing::debug!(error = %err, "tree construction failed");
    err
}
