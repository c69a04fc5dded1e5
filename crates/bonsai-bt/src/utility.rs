use bonsai_core::{Blackboard, DeterministicRng, SplitMix64};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bt::{Node, Status};

pub type ScoreFn = Box<dyn FnMut(&Blackboard) -> f32 + Send>;

/// A child paired with the function that scores (or weighs) it each tick.
pub struct Scored {
    pub(crate) node: Box<dyn Node>,
    pub(crate) score_fn: ScoreFn,
}

impl Scored {
    pub fn new(
        node: Box<dyn Node>,
        score_fn: impl FnMut(&Blackboard) -> f32 + Send + 'static,
    ) -> Self {
        Self {
            node,
            score_fn: Box::new(score_fn),
        }
    }

    fn score(&mut self, bb: &Blackboard) -> f32 {
        let s = (self.score_fn)(bb);
        if s.is_nan() {
            f32::NEG_INFINITY
        } else {
            s
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtilityConfig {
    /// Children scoring below this are not considered for the tick.
    pub min_score: f32,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            min_score: f32::NEG_INFINITY,
        }
    }
}

/// Selector whose priority order is recomputed from scores on every tick.
///
/// Children are tried from highest to lowest score (ties keep insertion order) with ordinary
/// selector semantics. Because the order is recomputed each tick, a running child can be
/// pre-empted by one that now scores higher; the pre-empted child is reset.
pub struct UtilitySelector {
    children: Vec<Scored>,
    config: UtilityConfig,
    running: Option<usize>,
    last_scores: Vec<f32>,
    halted: bool,
}

impl UtilitySelector {
    pub fn new(children: Vec<Scored>) -> Self {
        Self {
            children,
            config: UtilityConfig::default(),
            running: None,
            last_scores: Vec::new(),
            halted: false,
        }
    }

    pub fn with_config(mut self, config: UtilityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn push(&mut self, child: Scored) {
        self.children.push(child);
    }

    pub fn running_child(&self) -> Option<usize> {
        self.running
    }

    /// Scores computed by the most recent tick, in insertion order.
    pub fn last_scores(&self) -> &[f32] {
        &self.last_scores
    }

    fn ranking(&mut self, blackboard: &Blackboard) -> Vec<usize> {
        self.last_scores.clear();
        for child in self.children.iter_mut() {
            let s = child.score(blackboard);
            self.last_scores.push(s);
        }

        let min = self.config.min_score;
        let scores = &self.last_scores;
        let mut order: Vec<usize> = (0..scores.len()).filter(|&i| scores[i] >= min).collect();
        // Stable sort keeps insertion order for equal scores.
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        order
    }
}

impl Node for UtilitySelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        for i in self.ranking(blackboard) {
            match self.children[i].node.tick(blackboard) {
                Status::Failure => continue,
                Status::Success => {
                    self.reset();
                    return Status::Success;
                }
                Status::Running => {
                    if self.running != Some(i) {
                        if let Some(prev) = self.running {
                            tracing::debug!(from = prev, to = i, "utility selector switched child");
                            self.children[prev].node.reset();
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
        for c in self.children.iter_mut() {
            c.node.reset();
        }
    }

    fn halt(&mut self) {
        self.halted = true;
        for c in self.children.iter_mut() {
            c.node.halt();
        }
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}

/// Runs one child chosen at random, proportionally to its weight.
///
/// Weights are clamped to zero from below; if they sum to zero the node fails. Children weighted
/// `f32::INFINITY` win outright and are chosen uniformly among themselves. A running child is
/// resumed on later ticks without drawing again. Draws come from a seeded [`SplitMix64`], so the
/// same seed and the same weights give the same choices.
pub struct WeightedRandomSelector {
    children: Vec<Scored>,
    rng: SplitMix64,
    running: Option<usize>,
    halted: bool,
}

impl WeightedRandomSelector {
    pub fn new(children: Vec<Scored>) -> Self {
        Self::with_seed(children, 0)
    }

    pub fn with_seed(children: Vec<Scored>, seed: u64) -> Self {
        Self {
            children,
            rng: SplitMix64::new(seed),
            running: None,
            halted: false,
        }
    }

    pub fn push(&mut self, child: Scored) {
        self.children.push(child);
    }

    pub fn running_child(&self) -> Option<usize> {
        self.running
    }

    fn draw(&mut self, blackboard: &Blackboard) -> Option<usize> {
        let weights: Vec<f32> = self
            .children
            .iter_mut()
            .map(|c| c.score(blackboard).max(0.0))
            .collect();

        // Infinite weights swamp every finite one; pick uniformly among them.
        let infinite: Vec<usize> = (0..weights.len())
            .filter(|&i| weights[i].is_infinite())
            .collect();
        if !infinite.is_empty() {
            let pick = (self.rng.next_u64() % infinite.len() as u64) as usize;
            return Some(infinite[pick]);
        }

        // Summed in f64 so that many large f32 weights cannot overflow.
        let total: f64 = weights.iter().map(|&w| f64::from(w)).sum();
        if total <= 0.0 {
            return None;
        }

        let target = f64::from(self.rng.next_f32_unit()) * total;
        let mut acc = 0.0f64;
        let mut last_positive = None;
        for (i, w) in weights.iter().enumerate() {
            if *w <= 0.0 {
                continue;
            }
            acc += f64::from(*w);
            last_positive = Some(i);
            if target < acc {
                return Some(i);
            }
        }
        // Rounding can leave `target` just past the final bucket.
        last_positive
    }
}

impl Node for WeightedRandomSelector {
    fn tick(&mut self, blackboard: &Blackboard) -> Status {
        if self.halted {
            return Status::Failure;
        }

        let index = match self.running {
            Some(i) => i,
            None => match self.draw(blackboard) {
                Some(i) => i,
                None => return Status::Failure,
            },
        };

        let status = self.children[index].node.tick(blackboard);
        if status.is_running() {
            self.running = Some(index);
        } else {
            self.reset();
        }
        status
    }

    fn reset(&mut self) {
        self.running = None;
        self.halted = false;
        for c in self.children.iter_mut() {
            c.node.reset();
        }
    }

    fn halt(&mut self) {
        self.halted = true;
        for c in self.children.iter_mut() {
            c.node.halt();
        }
    }

    fn is_halted(&self) -> bool {
        self.halted
    }
}
