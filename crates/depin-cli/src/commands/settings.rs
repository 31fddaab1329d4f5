//! Settings, theme and auth commands.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use depin_core::export::settings_file_name;
use depin_core::settings::{password_strength, strength_label, validate_password_change};
use depin_core::{AppContext, Settings, SettingsForm, Theme};
use depin_types::settings::{DATA_RETENTION_CHOICES, LANGUAGE_CHOICES, REFRESH_INTERVAL_CHOICES};

use crate::cli::{AuthAction, OutputFormat, SettingKey, SettingsAction, ThemeArg, parse_bool_arg};
use crate::format::{FormatOptions, format_settings_json, format_settings_text};
use crate::util::{ExportTarget, today, write_output};

/// Apply one `key = value` change to `settings`.
///
/// Numeric and language settings must be one of the values offered by the
/// settings form.
pub fn apply_setting(settings: &mut Settings, key: SettingKey, value: &str) -> Result<()> {
    let value = value.trim();
    match key {
        SettingKey::FullName => settings.full_name = value.to_string(),
        SettingKey::Email => settings.email = value.to_string(),
        SettingKey::Phone => settings.phone = value.to_string(),
        SettingKey::EmailNotifications => {
            settings.email_notifications = parse_bool_arg(value).map_err(anyhow::Error::msg)?
        }
        SettingKey::SmsNotifications => {
            settings.sms_notifications = parse_bool_arg(value).map_err(anyhow::Error::msg)?
        }
        SettingKey::AlertNotifications => {
            settings.alert_notifications = parse_bool_arg(value).map_err(anyhow::Error::msg)?
        }
        SettingKey::AutoRefresh => {
            settings.auto_refresh = parse_bool_arg(value).map_err(anyhow::Error::msg)?
        }
        SettingKey::RefreshInterval => {
            settings.refresh_interval = parse_choice(value, &REFRESH_INTERVAL_CHOICES, "seconds")?
        }
        SettingKey::DataRetention => {
            settings.data_retention = parse_choice(value, &DATA_RETENTION_CHOICES, "days")?
        }
        SettingKey::Theme => settings.theme = value.parse::<Theme>().map_err(anyhow::Error::new)?,
        SettingKey::Language => {
            if !LANGUAGE_CHOICES.contains(&value) {
                bail!(
                    "Invalid language '{}'. Choose one of: {}",
                    value,
                    LANGUAGE_CHOICES.join(", ")
                );
            }
            settings.language = value.to_string();
        }
    }
    Ok(())
}

fn parse_choice(value: &str, choices: &[u32], unit: &str) -> Result<u32> {
    let parsed: u32 = value
        .parse()
        .with_context(|| format!("'{}' is not a number", value))?;
    if !choices.contains(&parsed) {
        let options: Vec<String> = choices.iter().map(u32::to_string).collect();
        bail!(
            "Invalid value {}. Choose one of: {} ({})",
            parsed,
            options.join(", "),
            unit
        );
    }
    Ok(parsed)
}

/// Save the form and apply its theme to the running context.
pub fn save_form(form: &mut SettingsForm, ctx: &AppContext) -> Result<()> {
    form.save(ctx.store()).context("Failed to save settings")?;
    if ctx.theme() != form.saved().theme {
        ctx.set_theme(form.saved().theme)
            .context("Failed to save theme")?;
    }
    Ok(())
}

pub fn cmd_settings(
    ctx: &AppContext,
    action: SettingsAction,
    export_dir: &Path,
    json: bool,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let mut form = SettingsForm::load(ctx.store());
    match action {
        SettingsAction::Show { output: format } => {
            let content = match format.resolve(json) {
                OutputFormat::Json => format_settings_json(form.saved(), opts)?,
                OutputFormat::Text => format_settings_text(form.saved(), opts),
            };
            write_output(output, &content)?;
        }
        SettingsAction::Set { key, value } => {
            apply_setting(form.draft_mut(), key, &value)?;
            if !form.is_dirty() {
                if !quiet {
                    eprintln!("No change.");
                }
                return Ok(());
            }
            save_form(&mut form, ctx)?;
            if !quiet {
                eprintln!("Settings saved.");
            }
        }
        SettingsAction::Export { path } => {
            let target = ExportTarget::resolve(path, export_dir, &settings_file_name(today()));
            let content = form.export_json()?;
            target.write(&content)?;
            if !quiet {
                eprintln!("Exported settings to {}", target);
            }
        }
        SettingsAction::Import { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            form.import_json(&content)
                .with_context(|| format!("Failed to import {}", path.display()))?;
            save_form(&mut form, ctx)?;
            if !quiet {
                eprintln!("Imported settings from {}", path.display());
            }
        }
        SettingsAction::Reset => {
            form.reset_to_defaults(ctx.store())
                .context("Failed to reset settings")?;
            ctx.set_theme(form.saved().theme)
                .context("Failed to save theme")?;
            if !quiet {
                eprintln!("Settings reset to defaults.");
            }
        }
        SettingsAction::Password => {
            let stdin = std::io::stdin();
            let mut lines = stdin.lock().lines();
            let new = lines.next().transpose()?.unwrap_or_default();
            let confirm = lines.next().transpose()?.unwrap_or_default();
            check_password(&new, &confirm)?;
            if !quiet {
                eprintln!(
                    "Password accepted (strength: {}).",
                    strength_label(password_strength(&new))
                );
            }
        }
    }
    Ok(())
}

/// Validate a password change, reporting the strength on failure.
pub fn check_password(new: &str, confirm: &str) -> Result<()> {
    validate_password_change(new, confirm).with_context(|| {
        format!(
            "Password rejected (strength: {})",
            strength_label(password_strength(new))
        )
    })
}

pub fn cmd_theme(ctx: &AppContext, value: Option<ThemeArg>, quiet: bool) -> Result<()> {
    let theme = match value {
        None => {
            println!("{}", ctx.theme());
            return Ok(());
        }
        Some(ThemeArg::Toggle) => ctx.toggle_theme()?,
        Some(ThemeArg::Dark) => {
            ctx.set_theme(Theme::Dark)?;
            Theme::Dark
        }
        Some(ThemeArg::Light) => {
            ctx.set_theme(Theme::Light)?;
            Theme::Light
        }
    };
    if !quiet {
        eprintln!("Theme set to {}.", theme);
    }
    Ok(())
}

pub fn cmd_auth(ctx: &AppContext, action: AuthAction, quiet: bool) -> Result<()> {
    match action {
        AuthAction::Login => {
            ctx.login().context("Failed to save login state")?;
            if !quiet {
                eprintln!("Signed in.");
            }
        }
        AuthAction::Logout => {
            ctx.logout().context("Failed to clear login state")?;
            if !quiet {
                eprintln!("Signed out.");
            }
        }
        AuthAction::Status => {
            let state = if ctx.is_authenticated() {
                "signed in"
            } else {
                "signed out"
            };
            println!("{}", state);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use depin_core::SettingsStore;

    fn ctx() -> AppContext {
        AppContext::new(SettingsStore::in_memory())
    }

    #[test]
    fn test_apply_setting_values() {
        let mut settings = Settings::default();
        apply_setting(&mut settings, SettingKey::FullName, " Field Operator ").unwrap();
        apply_setting(&mut settings, SettingKey::SmsNotifications, "yes").unwrap();
        apply_setting(&mut settings, SettingKey::RefreshInterval, "60").unwrap();
        apply_setting(&mut settings, SettingKey::Theme, "light").unwrap();
        apply_setting(&mut settings, SettingKey::Language, "es").unwrap();
        assert_eq!(settings.full_name, "Field Operator");
        assert!(settings.sms_notifications);
        assert_eq!(settings.refresh_interval, 60);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.language, "es");
    }

    #[test]
    fn test_apply_setting_rejects_unknown_choices() {
        let mut settings = Settings::default();
        assert!(apply_setting(&mut settings, SettingKey::RefreshInterval, "45").is_err());
        assert!(apply_setting(&mut settings, SettingKey::DataRetention, "many").is_err());
        assert!(apply_setting(&mut settings, SettingKey::Language, "fr").is_err());
        assert!(apply_setting(&mut settings, SettingKey::AutoRefresh, "sometimes").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_set_invalid_email_is_not_saved() {
        let ctx = ctx();
        let result = cmd_settings(
            &ctx,
            SettingsAction::Set {
                key: SettingKey::Email,
                value: "nobody".into(),
            },
            Path::new("."),
            false,
            None,
            true,
            &FormatOptions::default(),
        );
        assert!(result.is_err());
        assert_eq!(ctx.store().load_settings().email, "admin@iot.com");
    }

    #[test]
    fn test_saving_theme_setting_updates_context() {
        let ctx = ctx();
        cmd_settings(
            &ctx,
            SettingsAction::Set {
                key: SettingKey::Theme,
                value: "light".into(),
            },
            Path::new("."),
            false,
            None,
            true,
            &FormatOptions::default(),
        )
        .unwrap();
        assert_eq!(ctx.theme(), Theme::Light);
        assert_eq!(ctx.store().theme(), Theme::Light);
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ctx();
        let opts = FormatOptions::default();
        let run = |action| cmd_settings(&ctx, action, dir.path(), false, None, true, &opts);

        run(SettingsAction::Set {
            key: SettingKey::Phone,
            value: "+1 555 0100".into(),
        })
        .unwrap();
        run(SettingsAction::Export { path: None }).unwrap();
        run(SettingsAction::Reset).unwrap();
        assert_eq!(ctx.store().load_settings(), Settings::default());

        let exported = dir.path().join(settings_file_name(today()));
        run(SettingsAction::Import { path: exported }).unwrap();
        assert_eq!(ctx.store().load_settings().phone, "+1 555 0100");
    }

    #[test]
    fn test_import_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let ctx = ctx();
        let result = cmd_settings(
            &ctx,
            SettingsAction::Import { path },
            dir.path(),
            false,
            None,
            true,
            &FormatOptions::default(),
        );
        assert!(result.is_err());
        assert_eq!(ctx.store().load_settings(), Settings::default());
    }

    #[test]
    fn test_check_password() {
        assert!(check_password("Str0ng!Pass", "Str0ng!Pass").is_ok());
        assert!(check_password("Str0ng!Pass", "Str0ng!Pas").is_err());
        let err = check_password("weak", "weak").unwrap_err();
        assert!(format!("{:#}", err).contains("stronger password"));
    }

    #[test]
    fn test_theme_and_auth() {
        let ctx = ctx();
        cmd_theme(&ctx, Some(ThemeArg::Toggle), true).unwrap();
        assert_eq!(ctx.theme(), Theme::Light);
        cmd_theme(&ctx, Some(ThemeArg::Dark), true).unwrap();
        assert_eq!(ctx.store().theme(), Theme::Dark);

        cmd_auth(&ctx, AuthAction::Login, true).unwrap();
        assert!(ctx.store().is_authenticated());
        cmd_auth(&ctx, AuthAction::Logout, true).unwrap();
        assert!(!ctx.is_authenticated());
    }
}
