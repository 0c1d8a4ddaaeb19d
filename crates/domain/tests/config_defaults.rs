use vx_domain::config::{Config, ProcessorMode};

#[test]
fn default_host_is_localhost() {
    let config = Config::default();
    assert_eq!(config.server.host, "127.0.0.1");
}

#[test]
fn explicit_zero_host_parses() {
    let toml_str = r#"
[server]
host = "0.0.0.0"
port = 3210
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 3210);
}

#[test]
fn processor_mode_parses_from_toml() {
    let toml_str = r#"
[processor]
mode = "live"
secret_key_env = "STRIPE_KEY_PROD"
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.processor.mode, ProcessorMode::Live);
    assert_eq!(config.processor.secret_key_env, "STRIPE_KEY_PROD");
}

#[test]
fn webhook_defaults_are_bounded() {
    let config = Config::default();
    assert!(config.webhook.timeout_ms > 0);
    assert!(config.webhook.max_attempts >= 1);
}

#[test]
fn api_key_env_default() {
    let config = Config::default();
    assert_eq!(config.server.api_key_env, "VORTEX_API_KEY");
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml_str = r#"
[telephony]
gather_timeout_secs = 5
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.telephony.gather_timeout_secs, 5);
    assert_eq!(config.server.port, 3100);
    assert_eq!(config.processor.mode, ProcessorMode::Mock);
}
