//! Settings editing: draft tracking, validation, import/export and
//! password checks.
//!
//! # Example
//!
//! ```
//! use depin_core::context::SettingsStore;
//! use depin_core::settings::SettingsForm;
//!
//! let store = SettingsStore::in_memory();
//! let mut form = SettingsForm::load(&store);
//! assert!(!form.is_dirty());
//!
//! form.draft_mut().full_name = "Field Operator".into();
//! assert!(form.is_dirty());
//!
//! form.save(&store).unwrap();
//! assert!(!form.is_dirty());
//! assert_eq!(store.load_settings().full_name, "Field Operator");
//! ```

use depin_types::Settings;

use crate::context::SettingsStore;
use crate::error::{Error, Result};

/// Minimum strength score accepted for a new password.
pub const MIN_PASSWORD_STRENGTH: u8 = 3;

const PASSWORD_SYMBOLS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Check the fields a user can get wrong when typing or importing settings.
pub fn validate_settings(settings: &Settings) -> Result<()> {
    if !settings.email.contains('@') {
        return Err(Error::Validation(format!(
            "Invalid email address: {}",
            settings.email
        )));
    }
    if settings.refresh_interval == 0 {
        return Err(Error::Validation(
            "Refresh interval must be greater than 0".to_string(),
        ));
    }
    if settings.data_retention == 0 {
        return Err(Error::Validation(
            "Data retention must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Score a password from 0 to 4: one point each for length of at least 8,
/// mixed case, a digit and a symbol.
///
/// ```
/// use depin_core::settings::password_strength;
///
/// assert_eq!(password_strength("abc"), 0);
/// assert_eq!(password_strength("Sensor2024!"), 4);
/// ```
pub fn password_strength(password: &str) -> u8 {
    let mut score = 0;
    if password.chars().count() >= 8 {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
    {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| PASSWORD_SYMBOLS.contains(c)) {
        score += 1;
    }
    score
}

/// Label for a strength score.
pub fn strength_label(score: u8) -> &'static str {
    match score {
        2 => "Fair",
        3 => "Good",
        4 => "Strong",
        _ => "Weak",
    }
}

/// Accept a new password only if both entries match and it is strong enough.
pub fn validate_password_change(new: &str, confirm: &str) -> Result<()> {
    if new != confirm {
        return Err(Error::Validation("Passwords do not match".to_string()));
    }
    if password_strength(new) < MIN_PASSWORD_STRENGTH {
        return Err(Error::Validation(
            "Please use a stronger password".to_string(),
        ));
    }
    Ok(())
}

/// Settings being edited, alongside the last saved copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    saved: Settings,
    draft: Settings,
}

impl SettingsForm {
    pub fn new(saved: Settings) -> Self {
        Self {
            draft: saved.clone(),
            saved,
        }
    }

    /// Start editing whatever is in the store.
    pub fn load(store: &SettingsStore) -> Self {
        Self::new(store.load_settings())
    }

    pub fn saved(&self) -> &Settings {
        &self.saved
    }

    pub fn draft(&self) -> &Settings {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Settings {
        &mut self.draft
    }

    /// Whether the draft differs from the saved settings.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.saved
    }

    /// Throw away unsaved edits.
    pub fn discard(&mut self) {
        self.draft = self.saved.clone();
    }

    /// Validate and persist the draft.
    pub fn save(&mut self, store: &SettingsStore) -> Result<()> {
        validate_settings(&self.draft)?;
        store.save_settings(&self.draft)?;
        self.saved = self.draft.clone();
        Ok(())
    }

    /// Replace both draft and saved copy with the defaults and persist them.
    pub fn reset_to_defaults(&mut self, store: &SettingsStore) -> Result<()> {
        let defaults = Settings::default();
        store.save_settings(&defaults)?;
        self.saved = defaults.clone();
        self.draft = defaults;
        Ok(())
    }

    /// The draft as pretty-printed JSON.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.draft)?)
    }

    /// Load settings from JSON into the draft. Nothing is saved until
    /// [`save`](Self::save), and on error the draft is left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let imported: Settings =
            serde_json::from_str(json).map_err(|e| Error::InvalidImport(e.to_string()))?;
        validate_settings(&imported).map_err(|e| Error::InvalidImport(e.to_string()))?;
        self.draft = imported;
        Ok(())
    }
}
