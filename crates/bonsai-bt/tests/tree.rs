use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bonsai_bt::{Builder, Decorator, Status, Timeout, Tree};
use bonsai_core::{BbKey, Blackboard, ManualClock};

const BATTERY: BbKey<f32> = BbKey::new("battery");
const POSITION: BbKey<i32> = BbKey::new("position");
const TARGET: BbKey<i32> = BbKey::new("target");
const DOCKED: BbKey<bool> = BbKey::new("docked");

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Step one unit towards `target`, reporting `Running` until there.
fn move_towards(target: BbKey<i32>) -> impl FnMut(&Blackboard) -> Status + Send + 'static {
    move |bb: &Blackboard| {
        let (Some(pos), Some(goal)) = (POSITION.get(bb), target.get(bb)) else {
            return Status::Failure;
        };
        if pos == goal {
            return Status::Success;
        }
        POSITION.set(bb, pos + (goal - pos).signum());
        BATTERY.update(bb, |b| *b -= 0.1);
        Status::Running
    }
}

fn robot() -> Tree {
    Builder::new()
        .reactive_selector()
        // Low battery pre-empts whatever else is running.
        .sequence()
        .condition(|bb: &Blackboard| BATTERY.get_or(bb, 0.0) < 0.25)
        .action(|bb: &Blackboard| {
            bb.set("dock", 0i32);
            Status::Success
        })
        .action(move_towards(BbKey::new("dock")))
        .action(|bb: &Blackboard| {
            DOCKED.set(bb, true);
            BATTERY.set(bb, 1.0);
            Status::Success
        })
        .end()
        .sequence()
        .condition(|bb: &Blackboard| TARGET.has(bb))
        .action(move_towards(TARGET))
        .end()
        .end()
        .build()
        .expect("valid robot tree")
}

#[test]
fn robot_walks_to_target_then_docks_when_battery_runs_low() {
    init_tracing();
    let mut tree = robot();
    let bb = tree.blackboard();
    POSITION.set(bb, 0);
    BATTERY.set(bb, 0.5);
    TARGET.set(bb, 5);

    // Three steps drain the battery from 0.5 to roughly 0.2.
    for _ in 0..3 {
        assert_eq!(tree.tick(), Status::Running);
    }
    assert_eq!(POSITION.get(tree.blackboard()), Some(3));

    // Battery is now low: the docking branch takes over and walks back home.
    let mut ticks = 0;
    while tree.tick().is_running() {
        ticks += 1;
        assert!(ticks < 16, "robot never docked");
    }
    assert_eq!(tree.last_status(), Some(Status::Success));
    assert_eq!(POSITION.get(tree.blackboard()), Some(0));
    assert_eq!(DOCKED.get(tree.blackboard()), Some(true));
    assert_eq!(BATTERY.get(tree.blackboard()), Some(1.0));
}

#[test]
fn counters_and_last_status() {
    let mut tree = Builder::new()
        .action(|_: &Blackboard| Status::Running)
        .build()
        .expect("valid tree");

    assert_eq!(tree.last_status(), None);
    assert_eq!(tree.tick_count(), 0);

    tree.tick();
    tree.tick();
    assert_eq!(tree.last_status(), Some(Status::Running));
    assert_eq!(tree.tick_count(), 2);

    tree.reset();
    assert_eq!(tree.last_status(), None);
    assert_eq!(tree.tick_count(), 2);
}

#[test]
fn halt_then_reset() {
    let mut tree = Builder::new()
        .sequence()
        .action(|_: &Blackboard| Status::Success)
        .action(|_: &Blackboard| Status::Running)
        .end()
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Running);
    tree.halt();
    assert!(tree.is_halted());
    assert!(tree.root().is_halted());
    assert_eq!(tree.tick(), Status::Failure);

    tree.reset();
    assert!(!tree.is_halted());
    assert_eq!(tree.tick(), Status::Running);
}

#[test]
fn blackboard_is_fed_from_another_thread() {
    let mut tree = Builder::new()
        .condition(|bb: &Blackboard| bb.get_or("sensor_ready", false))
        .build()
        .expect("valid tree");

    assert_eq!(tree.tick(), Status::Failure);

    let shared = tree.shared_blackboard();
    thread::spawn(move || shared.set("sensor_ready", true))
        .join()
        .expect("sensor thread");

    assert_eq!(tree.tick(), Status::Success);
}

#[test]
fn trees_can_share_one_blackboard() {
    let bb = Arc::new(Blackboard::new());
    let writer = Builder::new()
        .action(|bb: &Blackboard| {
            bb.set("message", String::from("hello"));
            Status::Success
        })
        .build_node()
        .expect("valid writer");
    let reader = Builder::new()
        .condition(|bb: &Blackboard| bb.get::<String>("message").as_deref() == Some("hello"))
        .build_node()
        .expect("valid reader");

    let mut writer = Tree::with_blackboard(writer, Arc::clone(&bb));
    let mut reader = Tree::with_blackboard(reader, Arc::clone(&bb));

    assert_eq!(reader.tick(), Status::Failure);
    assert_eq!(writer.tick(), Status::Success);
    assert_eq!(reader.tick(), Status::Success);
}

#[test]
fn custom_root_with_manual_clock() {
    let clock = ManualClock::new();
    let root = Decorator::new(
        Timeout::with_clock(Duration::from_millis(100), clock.clone()),
        Box::new(bonsai_bt::Action::new(|_: &Blackboard| Status::Running)),
    );
    let mut tree = Tree::new(Box::new(root));

    assert_eq!(tree.tick(), Status::Running);
    clock.advance(Duration::from_millis(150));
    assert_eq!(tree.tick(), Status::Failure);

    tree.root_mut().halt();
    assert!(tree.is_halted());
}

#[test]
fn debug_output_lists_state() {
    let mut tree = Builder::new()
        .action(|_: &Blackboard| Status::Success)
        .build()
        .expect("valid tree");
    tree.blackboard().set("k", 1u8);
    tree.tick();

    let rendered = format!("{tree:?}");
    assert!(rendered.contains("ticks: 1"), "{rendered}");
    assert!(rendered.contains("Success"), "{rendered}");
}
