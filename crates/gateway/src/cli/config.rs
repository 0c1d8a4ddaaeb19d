use vx_domain::config::{Config, ConfigSeverity};

/// Parse and validate the config, printing any issues found.
///
/// Returns `true` when the config carries no errors (warnings are allowed).
pub fn validate(config: &Config, config_path: &str) -> bool {
    let issues = config.validate();
    if issues.is_empty() {
        println!("Config OK ({config_path})");
        return true;
    }

    for issue in &issues {
        println!("{issue}");
    }

    let errors = issues
        .iter()
        .filter(|i| i.severity == ConfigSeverity::Error)
        .count();
    println!(
        "\n{errors} error(s), {} warning(s) in {config_path}",
        issues.len() - errors
    );

    errors == 0
}

/// Dump the resolved config (with all defaults filled in) as TOML.
///
/// Secrets set via env vars are not part of the config and never appear
/// here; inline `secret_key`/`api_key` values do, so treat the output as
/// sensitive.
pub fn show(config: &Config) {
    match toml::to_string_pretty(config) {
        Ok(rendered) => print!("{rendered}"),
        Err(e) => {
            eprintln!("Failed to serialize config: {e}");
            std::process::exit(1);
        }
    }
}
