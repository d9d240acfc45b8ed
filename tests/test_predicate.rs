use log_criteria::{CompiledFilter, Criteria, Record, compile};
use serde_json::{Value, json};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("record must be an object"),
    }
}

fn criteria(entries: &[(&str, &str, &str)]) -> Criteria {
    let mut criteria = Criteria::default();
    // start unconstrained; the default severity set is tested on its own
    criteria.set_criteria("severity", "in", "").unwrap();
    for (field, operator, value) in entries {
        criteria
            .set_criteria(field, operator, value)
            .unwrap_or_else(|e| panic!("{field}.{operator}={value}: {e}"));
    }
    criteria
}

#[test]
fn test_in_excludes_debug_and_keeps_warning() {
    let predicate = compile(&criteria(&[("severity", "in", "W I E F")]));
    assert!(!predicate(&record(json!({"severity": "D"}))));
    assert!(predicate(&record(json!({"severity": "W"}))));
}

#[test]
fn test_match_and_exclude_are_complementary() {
    let matching = compile(&criteria(&[("errsource", "match", "ERR_%")]));
    assert!(matching(&record(json!({"errsource": "ERR_101"}))));
    assert!(!matching(&record(json!({"errsource": "WARN_101"}))));

    let excluding = compile(&criteria(&[("errsource", "exclude", "ERR_%")]));
    assert!(!excluding(&record(json!({"errsource": "ERR_101"}))));
    assert!(excluding(&record(json!({"errsource": "WARN_101"}))));
}

#[test]
fn test_underscore_matches_exactly_one_character() {
    let predicate = compile(&criteria(&[("hostname", "match", "flp00_")]));
    assert!(predicate(&record(json!({"hostname": "flp001"}))));
    assert!(!predicate(&record(json!({"hostname": "flp0012"}))));
    assert!(!predicate(&record(json!({"hostname": "flp00"}))));
}

#[test]
fn test_match_is_anchored_and_case_sensitive() {
    let predicate = compile(&criteria(&[("message", "match", "link down")]));
    assert!(predicate(&record(json!({"message": "link down"}))));
    assert!(!predicate(&record(json!({"message": "the link down"}))));
    assert!(!predicate(&record(json!({"message": "Link down"}))));
}

#[test]
fn test_match_ignores_line_breaks() {
    let predicate = compile(&criteria(&[("message", "match", "first%second")]));
    assert!(predicate(&record(json!({"message": "first\nsecond"}))));
    assert!(predicate(&record(json!({"message": "first\r\nsecond"}))));
}

#[test]
fn test_missing_field_fails_every_operator_but_exclude() {
    let empty = record(json!({"unrelated": "x"}));

    for entries in [
        vec![("hostname", "match", "%")],
        vec![("severity", "in", "W")],
        vec![("timestamp", "since", "2019-01-01")],
        vec![("pid", "min", "1")],
        vec![("level", "max", "20")],
    ] {
        let predicate = compile(&criteria(&entries));
        assert!(!predicate(&empty), "{entries:?} should reject a missing field");
    }

    let predicate = compile(&criteria(&[("hostname", "exclude", "%")]));
    assert!(predicate(&empty));
}

#[test]
fn test_time_bounds_are_inclusive() {
    let predicate = compile(&criteria(&[
        ("timestamp", "since", "2019-07-22T11:00:00Z"),
        ("timestamp", "until", "2019-07-22T12:00:00Z"),
    ]));
    let start = 1563793200.0;
    let end = 1563796800.0;

    assert!(predicate(&record(json!({"timestamp": start}))));
    assert!(predicate(&record(json!({"timestamp": end}))));
    assert!(predicate(&record(json!({"timestamp": 1563794601.351}))));
    assert!(!predicate(&record(json!({"timestamp": start - 0.001}))));
    assert!(!predicate(&record(json!({"timestamp": end + 1.0}))));
}

#[test]
fn test_relative_since_keeps_recent_records() {
    let predicate = compile(&criteria(&[("timestamp", "since", "-5")]));
    let now = chrono::Utc::now().timestamp() as f64;
    assert!(predicate(&record(json!({"timestamp": now + 1.0}))));
    assert!(!predicate(&record(json!({"timestamp": now - 3600.0}))));
}

#[test]
fn test_integer_bounds_are_inclusive() {
    let predicate = compile(&criteria(&[("pid", "min", "10"), ("pid", "max", "20")]));
    assert!(predicate(&record(json!({"pid": 10}))));
    assert!(predicate(&record(json!({"pid": 20}))));
    assert!(predicate(&record(json!({"pid": "15"}))));
    assert!(!predicate(&record(json!({"pid": 9}))));
    assert!(!predicate(&record(json!({"pid": 21}))));
}

#[test]
fn test_malformed_criteria_reject_everything() {
    let predicate = compile(&criteria(&[("level", "max", "six")]));
    assert!(!predicate(&record(json!({"level": 1}))));

    let predicate = compile(&criteria(&[("timestamp", "since", "yesterday-ish")]));
    assert!(!predicate(&record(json!({"timestamp": 1563794601.351}))));
}

#[test]
fn test_all_fields_must_pass() {
    let predicate = compile(&criteria(&[
        ("hostname", "match", "alio2-%"),
        ("severity", "in", "E F"),
        ("level", "max", "6"),
    ]));
    let base = json!({"hostname": "alio2-cr1-flp001", "severity": "E", "level": 1});
    assert!(predicate(&record(base.clone())));

    let mut wrong_level = record(base);
    wrong_level.insert("level".to_string(), json!(21));
    assert!(!predicate(&wrong_level));
}

#[test]
fn test_unconstrained_criteria_accept_anything() {
    let filter = CompiledFilter::compile(&criteria(&[]));
    assert!(filter.is_empty());
    assert!(filter.matches(&record(json!({}))));
    assert!(filter.matches(&record(json!({"severity": "D"}))));
}

#[test]
fn test_predicate_is_deterministic_and_detached() {
    let mut model = criteria(&[("hostname", "match", "a%")]);
    let predicate = compile(&model);
    let hit = record(json!({"hostname": "alpha"}));

    assert!(predicate(&hit));
    assert!(predicate(&hit));

    // later edits do not leak into an already compiled predicate
    model.set_criteria("hostname", "match", "b%").unwrap();
    assert!(predicate(&hit));
    assert!(!compile(&model)(&hit));
}
