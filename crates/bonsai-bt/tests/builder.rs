use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bonsai_bt::{
    BuildError, Builder, CompositeKind, ParallelPolicy, Sequence, Status, Threshold,
};
use bonsai_core::{BbKey, Blackboard};

const STEP: BbKey<u32> = BbKey::new("step");
const FINAL_STEP: BbKey<u32> = BbKey::new("final_step");

fn counter() -> (Arc<AtomicUsize>, impl FnMut(&Blackboard) -> Status + Send + 'static) {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    (calls, move |_: &Blackboard| {
        c.fetch_add(1, Ordering::SeqCst);
        Status::Success
    })
}

#[test]
fn nested_selector_with_sequence() {
    let mut tree = Builder::new()
        .selector()
        .sequence()
        .condition(|bb: &Blackboard| bb.get_or("enemy_visible", false))
        .action(|bb: &Blackboard| {
            bb.set("attacked", true);
            Status::Success
        })
        .end()
        .action(|bb: &Blackboard| {
            bb.set("patrolled", true);
            Status::Success
        })
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
    assert!(tree.blackboard().get_or("patrolled", false));
    assert!(!tree.blackboard().has("attacked"));

    tree.blackboard().set("enemy_visible", true);
    assert_eq!(tree.tick(), Status::Success);
    assert!(tree.blackboard().get_or("attacked", false));
}

#[test]
fn actions_share_state_through_the_blackboard() {
    let mut tree = Builder::new()
        .sequence()
        .action(|bb: &Blackboard| {
            STEP.set(bb, 1);
            Status::Success
        })
        .action(|bb: &Blackboard| {
            STEP.update(bb, |s| *s += 1);
            Status::Success
        })
        .action(|bb: &Blackboard| match STEP.get(bb) {
            Some(step) => {
                FINAL_STEP.set(bb, step);
                Status::Success
            }
            None => Status::Failure,
        })
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(FINAL_STEP.get(tree.blackboard()), Some(2));
}

#[test]
fn repeat_and_retry_through_the_builder() {
    let (repeats, action) = counter();
    let failures = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&failures);

    let mut tree = Builder::new()
        .sequence()
        .repeat(3)
        .action(action)
        .retry(4)
        .action(move |_: &Blackboard| {
            if f.fetch_add(1, Ordering::SeqCst) < 2 {
                Status::Failure
            } else {
                Status::Success
            }
        })
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(repeats.load(Ordering::SeqCst), 3);
    assert_eq!(failures.load(Ordering::SeqCst), 3);
}

#[test]
fn decorator_applies_to_a_whole_composite() {
    let mut tree = Builder::new()
        .inverter()
        .sequence()
        .action(|_: &Blackboard| Status::Success)
        .action(|_: &Blackboard| Status::Failure)
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
}

#[test]
fn parallel_via_builder() {
    let mut tree = Builder::new()
        .parallel(ParallelPolicy::new(Threshold::Any, Threshold::All))
        .action(|_: &Blackboard| Status::Running)
        .action(|_: &Blackboard| Status::Success)
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
}

#[test]
fn utility_via_builder() {
    let mut tree = Builder::new()
        .utility()
        .score(|bb: &Blackboard| bb.get_or("hunger", 0.0f32))
        .action(|bb: &Blackboard| {
            bb.set("choice", "eat");
            Status::Success
        })
        .score(|bb: &Blackboard| bb.get_or("fatigue", 0.0f32))
        .sequence()
        .action(|bb: &Blackboard| {
            bb.set("choice", "sleep");
            Status::Success
        })
        .end()
        .end()
        .build()
        .expect("valid tree");

    tree.blackboard().set("hunger", 0.3f32);
    tree.blackboard().set("fatigue", 0.7f32);
    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(tree.blackboard().get::<&'static str>("choice"), Some("sleep"));

    tree.blackboard().set("hunger", 0.9f32);
    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(tree.blackboard().get::<&'static str>("choice"), Some("eat"));
}

#[test]
fn weighted_random_via_builder() {
    let mut tree = Builder::new()
        .weighted_random(42)
        .score(|_: &Blackboard| 1.0)
        .action(|_: &Blackboard| Status::Success)
        .score(|_: &Blackboard| 0.0)
        .action(|_: &Blackboard| Status::Failure)
        .end()
        .build()
        .expect("valid tree");

    for _ in 0..16 {
        assert_eq!(tree.tick(), Status::Success);
    }
}

#[test]
fn prebuilt_subtree_can_be_embedded() {
    let (calls, action) = counter();
    let subtree = Builder::new()
        .sequence()
        .action(action)
        .end()
        .build_node()
        .expect("valid subtree");

    let mut tree = Builder::new()
        .selector()
        .action(|_: &Blackboard| Status::Failure)
        .node(subtree)
        .node(Box::new(Sequence::new(Vec::new())))
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Success);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_root() {
    assert_eq!(Builder::new().build().unwrap_err(), BuildError::NoRoot);
}

#[test]
fn unclosed_composite() {
    let err = Builder::new()
        .sequence()
        .selector()
        .action(|_: &Blackboard| Status::Success)
        .end()
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnclosedComposite { depth: 1 });
}

#[test]
fn unbalanced_end() {
    let err = Builder::new()
        .sequence()
        .action(|_: &Blackboard| Status::Success)
        .end()
        .end()
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnbalancedEnd);
}

#[test]
fn empty_composite() {
    let err = Builder::new().selector().end().build().unwrap_err();
    assert_eq!(
        err,
        BuildError::EmptyComposite {
            kind: CompositeKind::Selector
        }
    );
}

#[test]
fn dangling_decorator() {
    let err = Builder::new()
        .sequence()
        .action(|_: &Blackboard| Status::Success)
        .inverter()
        .retry(2)
        .end()
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::DanglingDecorator { count: 2 });

    let err = Builder::new().inverter().build().unwrap_err();
    assert_eq!(err, BuildError::DanglingDecorator { count: 1 });
}

#[test]
fn multiple_roots() {
    let err = Builder::new()
        .action(|_: &Blackboard| Status::Success)
        .action(|_: &Blackboard| Status::Success)
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::MultipleRoots);
}

#[test]
fn missing_score() {
    let err = Builder::new()
        .utility()
        .action(|_: &Blackboard| Status::Success)
        .end()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::MissingScore {
            kind: CompositeKind::Utility
        }
    );

    let err = Builder::new()
        .weighted_random(1)
        .sequence()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::MissingScore {
            kind: CompositeKind::WeightedRandom
        }
    );
}

#[test]
fn unexpected_score() {
    let err = Builder::new()
        .sequence()
        .score(|_: &Blackboard| 1.0)
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnexpectedScore);

    let err = Builder::new()
        .utility()
        .score(|_: &Blackboard| 1.0)
        .score(|_: &Blackboard| 2.0)
        .build()
        .unwrap_err();
    assert_eq!(err, BuildError::UnexpectedScore);
}

#[test]
fn errors_render_readably() {
    let err = BuildError::EmptyComposite {
        kind: CompositeKind::WeightedRandom,
    };
    assert_eq!(err.to_string(), "weighted random selector has no children");
    assert_eq!(
        BuildError::UnclosedComposite { depth: 2 }.to_string(),
        "cannot build tree: 2 composite(s) still open"
    );
}
