#![cfg(feature = "serde")]

use bonsai_bt::{ParallelPolicy, Status, Threshold, UtilityConfig};

#[test]
fn parallel_policy_from_json() {
    let policy: ParallelPolicy =
        serde_json::from_str(r#"{"success":{"AtLeast":2},"failure":"All"}"#).expect("parse");
    assert_eq!(policy, ParallelPolicy::new(Threshold::AtLeast(2), Threshold::All));

    let json = serde_json::to_string(&ParallelPolicy::default()).expect("serialize");
    assert_eq!(json, r#"{"success":"All","failure":"Any"}"#);
}

#[test]
fn utility_config_from_json() {
    let config: UtilityConfig = serde_json::from_str(r#"{"min_score":0.25}"#).expect("parse");
    assert_eq!(config.min_score, 0.25);
}

#[test]
fn status_names() {
    assert_eq!(
        serde_json::to_string(&Status::Failure).expect("serialize"),
        r#""Failure""#
    );
}
