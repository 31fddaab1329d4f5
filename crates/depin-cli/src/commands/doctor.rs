//! Doctor command implementation.
//!
//! Checks the configuration, the persisted store and the data source, so a
//! misconfigured backend shows up before the dashboard starts polling it.

use std::path::Path;

use anyhow::{Result, bail};
use owo_colors::OwoColorize;

use depin_core::{FileStore, SourceKind};

use crate::config::{Config, SourceOverrides};

/// Check result with status and message.
#[derive(Debug)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub warning: bool,
    pub message: String,
}

impl Check {
    fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            warning: false,
            message: message.into(),
        }
    }

    fn warn(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            warning: true,
            message: message.into(),
        }
    }

    fn fail(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: false,
            warning: false,
            message: message.into(),
        }
    }
}

pub async fn cmd_doctor(config: &Config, overrides: &SourceOverrides, no_color: bool) -> Result<()> {
    let checks = run_checks(config, overrides, &Config::path(), &Config::store_path()).await;

    for check in &checks {
        print_check_result(check, no_color);
    }

    let passed = checks.iter().filter(|c| c.passed && !c.warning).count();
    let warnings = checks.iter().filter(|c| c.warning).count();
    let failed = checks.iter().filter(|c| !c.passed).count();

    println!();
    if no_color {
        println!(
            "Summary: {} passed, {} warnings, {} failed",
            passed, warnings, failed
        );
    } else {
        println!(
            "Summary: {} passed, {} warnings, {} failed",
            passed.green(),
            warnings.yellow(),
            failed.red()
        );
    }

    if failed > 0 {
        bail!("{} check(s) failed", failed);
    }
    Ok(())
}

/// Run every check without printing anything.
pub async fn run_checks(
    config: &Config,
    overrides: &SourceOverrides,
    config_path: &Path,
    store_path: &Path,
) -> Vec<Check> {
    let mut checks = vec![check_config_file(config_path), check_store(store_path)];

    let export_dir = config.export_dir();
    checks.push(if export_dir.is_dir() {
        Check::pass("Export directory", export_dir.display().to_string())
    } else {
        Check::warn(
            "Export directory",
            format!("{} does not exist yet", export_dir.display()),
        )
    });

    checks.push(match config.resolve_source(overrides) {
        SourceKind::Simulated => Check::pass("Data source", "Simulated, no backend needed"),
        SourceKind::Live => check_backend(config, overrides).await,
    });
    checks
}

fn check_config_file(path: &Path) -> Check {
    if path.exists() {
        Check::pass("Config file", path.display().to_string())
    } else {
        Check::warn(
            "Config file",
            format!("Not found at {}, using defaults", path.display()),
        )
    }
}

fn check_store(path: &Path) -> Check {
    match FileStore::open(path) {
        Ok(_) => Check::pass("Settings store", path.display().to_string()),
        Err(e) => Check::fail("Settings store", format!("{} ({})", path.display(), e)),
    }
}

#[cfg(feature = "live")]
async fn check_backend(config: &Config, overrides: &SourceOverrides) -> Check {
    let client = match config.api_client(overrides) {
        Ok(client) => client,
        Err(e) => return Check::fail("Backend", format!("{:#}", e)),
    };
    match client.health().await {
        Ok(health) => Check::pass(
            "Backend",
            format!("{} reports '{}'", client.base_url(), health.status),
        ),
        Err(e) => Check::fail("Backend", e.to_string()),
    }
}

#[cfg(not(feature = "live"))]
async fn check_backend(config: &Config, overrides: &SourceOverrides) -> Check {
    Check::fail(
        "Backend",
        format!(
            "{} is configured but this build has no live client",
            config.api_url(overrides)
        ),
    )
}

fn print_check_result(check: &Check, no_color: bool) {
    let (icon, msg) = if check.passed && !check.warning {
        if no_color {
            ("[OK]".to_string(), check.message.clone())
        } else {
            (format!("{}", "[OK]".green()), check.message.clone())
        }
    } else if check.warning {
        if no_color {
            ("[!!]".to_string(), check.message.clone())
        } else {
            (
                format!("{}", "[!!]".yellow()),
                format!("{}", check.message.yellow()),
            )
        }
    } else if no_color {
        ("[FAIL]".to_string(), check.message.clone())
    } else {
        (
            format!("{}", "[FAIL]".red()),
            format!("{}", check.message.red()),
        )
    };
    println!("{} {}: {}", icon, check.name, msg);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_checks_pass() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            export_directory: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let checks = run_checks(
            &config,
            &SourceOverrides::default(),
            &dir.path().join("config.toml"),
            &dir.path().join("store.json"),
        )
        .await;

        assert!(checks.iter().all(|c| c.passed));
        let config_check = checks.iter().find(|c| c.name == "Config file").unwrap();
        assert!(config_check.warning);
        assert!(checks.iter().any(|c| c.name == "Data source" && !c.warning));
    }

    #[tokio::test]
    async fn test_unreachable_backend_fails() {
        let dir = tempfile::tempdir().unwrap();
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let overrides = SourceOverrides {
            source: Some(SourceKind::Live),
            api_url: Some(format!("http://{}", addr)),
            ..SourceOverrides::default()
        };
        let checks = run_checks(
            &Config::default(),
            &overrides,
            &dir.path().join("config.toml"),
            &dir.path().join("store.json"),
        )
        .await;

        let backend = checks.iter().find(|c| c.name == "Backend").unwrap();
        assert!(!backend.passed);
    }
}
