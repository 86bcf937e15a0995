//! The process-wide environment. Kept to a single test because the global
//! can only be installed once per process.

use angora::{load_global, startup, AngoraError, Bundle, Environment, PaletteRegistry, Publisher};

#[test]
fn global_environment_lifecycle() {
    let bundle = Bundle::new("base").with_color("ink", "#000");

    assert!(matches!(
        Environment::global(),
        Err(AngoraError::EnvironmentUnavailable { .. })
    ));
    assert!(matches!(
        load_global(&bundle),
        Err(AngoraError::EnvironmentUnavailable { .. })
    ));

    let (env, reports) = startup([&bundle]).unwrap();
    assert_eq!(reports.len(), 1);
    assert!(std::ptr::eq(env, Environment::global().unwrap()));
    assert!(std::ptr::eq(env, Environment::install()));

    let report = load_global(&Bundle::new("theme").with_color("edge", "$ink")).unwrap();
    assert_eq!(report.event.sequence, 2);

    let registry = PaletteRegistry::ensure_exists(env).unwrap();
    assert_eq!(registry.names(), vec!["edge", "ink"]);
    assert_eq!(
        Publisher::ensure_exists(env).unwrap().latest().unwrap().colors,
        registry.snapshot()
    );
}
