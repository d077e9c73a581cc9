use offline_asr::infrastructure::observability::TracingConfig;

#[test]
fn given_default_config_when_created_then_environment_is_set() {
    let config = TracingConfig::default();
    assert!(!config.environment.is_empty());
    assert_eq!(config.level, "info");
}

#[test]
fn given_level_when_building_filter_then_tower_http_stays_at_debug() {
    let config = TracingConfig::new("test", "WARN", true);

    assert_eq!(config.filter_directive(), "warn,tower_http=debug");
    assert!(config.json_format);
}
