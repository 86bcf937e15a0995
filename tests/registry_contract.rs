//! Registry behaviour seen through the public API: initialization, merging
//! and publishing across repeated loads.

use std::sync::{Arc, Mutex};

use angora::{
    load_bundle, Binding, Bundle, Colour, Environment, Palette, PaletteRegistry, PublishEvent,
    Publisher,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn hex(s: &str) -> Colour {
    Colour::from_hex(s).unwrap()
}

fn palette(entries: &[(&str, &str)]) -> Palette {
    entries.iter().map(|(name, value)| (*name, hex(value))).collect()
}

fn recorder(publisher: &Publisher) -> Arc<Mutex<Vec<PublishEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    publisher.subscribe(move |event: &PublishEvent| sink.lock().unwrap().push(event.clone()));
    seen
}

#[test]
fn repeated_initialization_keeps_tokens() {
    let env = Environment::new();
    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    registry.merge([("primary", hex("#111"))]);

    for _ in 0..3 {
        let again = PaletteRegistry::ensure_exists(&env).unwrap();
        assert!(again.same_as(&registry));
    }

    assert_eq!(registry.snapshot(), palette(&[("primary", "#111")]));
}

#[test]
fn merge_adds_and_overwrites() {
    let env = Environment::new();
    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    registry.merge([("a", hex("#111")), ("b", hex("#222"))]);

    registry.merge([("b", hex("#333")), ("c", hex("#444"))]);

    assert_eq!(
        registry.snapshot(),
        palette(&[("a", "#111"), ("b", "#333"), ("c", "#444")])
    );
}

#[test]
fn publish_reflects_latest_state() {
    let env = Environment::new();
    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    let publisher = Publisher::ensure_exists(&env).unwrap();
    let seen = recorder(&publisher);

    registry.merge([("x", hex("#000"))]);
    publisher.push_colors(&registry);
    registry.merge([("x", hex("#fff"))]);
    publisher.push_colors(&registry);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].colors, palette(&[("x", "#000")]));
    assert_eq!(seen[1].colors, palette(&[("x", "#fff")]));
    assert_eq!(publisher.latest().as_ref(), seen.last());
}

#[test]
fn empty_registry_publishes_empty_palette() {
    let env = Environment::new();
    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    let publisher = Publisher::ensure_exists(&env).unwrap();

    let event = publisher.push_colors(&registry);

    assert!(event.colors.is_empty());
    assert_eq!(event.generation, 0);
    assert_eq!(event.sequence, 1);
}

#[test]
fn empty_merge_changes_nothing() {
    let env = Environment::new();
    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    registry.merge([("a", hex("#111")), ("b", hex("#222"))]);
    let before = registry.versioned_snapshot();

    let summary = registry.merge(Vec::<(String, Colour)>::new());

    assert!(!summary.changed());
    assert_eq!(registry.versioned_snapshot(), before);
}

#[test]
fn two_loads_union_with_second_winning() {
    let env = Environment::new();
    let first = Bundle::new("first")
        .with_color("shared", "#111")
        .with_color("only-first", "#222");
    let second = Bundle::new("second")
        .with_color("shared", "#333")
        .with_color("only-second", "#444");

    load_bundle(&env, &first).unwrap();
    let report = load_bundle(&env, &second).unwrap();

    let expected = palette(&[
        ("only-first", "#222"),
        ("only-second", "#444"),
        ("shared", "#333"),
    ]);
    assert_eq!(report.event.colors, expected);
    assert_eq!(report.event.sequence, 2);
    assert_eq!(
        PaletteRegistry::ensure_exists(&env).unwrap().snapshot(),
        expected
    );
}

#[test]
fn host_preseeded_colors_are_adopted() {
    let env = Environment::new();
    env.define("colors", json!({ "brand": "#ff0000" })).unwrap();

    load_bundle(&env, &Bundle::new("theme").with_color("edge", "$brand")).unwrap();

    let registry = PaletteRegistry::ensure_exists(&env).unwrap();
    assert_eq!(registry.get("brand"), Some(hex("#f00")));
    assert_eq!(registry.get("edge"), Some(hex("#f00")));
    assert!(matches!(env.lookup("colors"), Some(Binding::Colors(_))));
}

#[test]
fn unadoptable_colors_binding_is_a_conflict() {
    let env = Environment::new();
    env.define("colors", json!(["not", "a", "palette"])).unwrap();

    let err = load_bundle(&env, &Bundle::new("theme").with_color("x", "#000")).unwrap_err();
    assert!(matches!(err, angora::AngoraError::BindingConflict { .. }));
}

#[test]
fn registry_binding_cannot_be_replaced() {
    let env = Environment::new();
    PaletteRegistry::ensure_exists(&env).unwrap();

    assert!(env.define("colors", json!({})).is_err());
    assert!(env.define("theme", json!("dark")).is_ok());
}
