//! Form payloads and their validation rules.
//!
//! Every field defaults to empty so a missing field reaches validation and
//! comes back as an inline error instead of a rejected request. Text inputs
//! are trimmed; passwords are taken as typed.

use std::collections::BTreeMap;

use serde::Deserialize;

use krishop_core::{Email, Price, PriceError, Username};

use crate::db::NewItem;
use crate::models::DEFAULT_ITEM_IMAGE;
use crate::services::auth::MIN_PASSWORD_LENGTH;

/// Longest listing name, store or image filename.
pub const MAX_LISTING_FIELD: usize = 100;

const REQUIRED: &str = "This field is required.";

/// Per-field validation messages, rendered next to the inputs.
///
/// Only the first failing rule of each field is kept.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for `field` unless it already has one.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// The message for `field`, if any.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Auth forms
// =============================================================================

/// Registration form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// A registration that passed validation.
#[derive(Debug)]
pub struct Registration {
    pub username: Username,
    pub email: Email,
    pub password: String,
}

impl RegistrationForm {
    /// Validate and convert to typed values.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::new();
        let username = validate_username(&self.username, &mut errors);
        let email = validate_email(&self.email, &mut errors);

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        } else if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Field must be at least {MIN_PASSWORD_LENGTH} characters long."),
            );
        }

        if self.confirm_password.is_empty() {
            errors.add("confirm_password", REQUIRED);
        } else if self.confirm_password != self.password {
            errors.add("confirm_password", "Field must be equal to password.");
        }

        match (username, email) {
            (Some(username), Some(email)) if errors.is_empty() => Ok(Registration {
                username,
                email,
                password: self.password.clone(),
            }),
            _ => Err(errors),
        }
    }

    /// The form as re-rendered after a failed post: passwords are not echoed.
    #[must_use]
    pub fn without_passwords(&self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_owned(),
            ..Self::default()
        }
    }
}

/// Login form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Checkbox; present (any value) when ticked.
    pub remember: Option<String>,
}

impl LoginForm {
    /// Validate presence and email shape. Credentials are checked elsewhere.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<Email, FormErrors> {
        let mut errors = FormErrors::new();
        let email = validate_email(&self.email, &mut errors);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        match email {
            Some(email) if errors.is_empty() => Ok(email),
            _ => Err(errors),
        }
    }

    #[must_use]
    pub fn remember(&self) -> bool {
        self.remember.is_some()
    }
}

/// Account update form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct UpdateAccountForm {
    pub username: String,
    pub email: String,
}

impl UpdateAccountForm {
    /// Validate with the same rules as registration.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<(Username, Email), FormErrors> {
        let mut errors = FormErrors::new();
        let username = validate_username(&self.username, &mut errors);
        let email = validate_email(&self.email, &mut errors);
        match (username, email) {
            (Some(username), Some(email)) => Ok((username, email)),
            _ => Err(errors),
        }
    }

    /// Echo the trimmed input back into the form.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            username: self.username.trim().to_owned(),
            email: self.email.trim().to_owned(),
        }
    }
}

// =============================================================================
// Listing form
// =============================================================================

/// New listing form.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub name: String,
    pub price: String,
    pub store: String,
    pub image_file: String,
}

impl PostForm {
    /// Validate and convert to a listing ready to insert.
    ///
    /// # Errors
    ///
    /// Returns the collected field errors.
    pub fn validate(&self) -> Result<NewItem, FormErrors> {
        let mut errors = FormErrors::new();

        let name = required_bounded("name", &self.name, &mut errors);
        let store = required_bounded("store", &self.store, &mut errors);

        let price = match self.price.trim() {
            "" => {
                errors.add("price", REQUIRED);
                None
            }
            raw => match Price::parse(raw) {
                Ok(price) => Some(price),
                Err(e) => {
                    errors.add("price", price_message(&e));
                    None
                }
            },
        };

        let image_file = match self.image_file.trim() {
            "" => DEFAULT_ITEM_IMAGE.to_owned(),
            s if s.chars().count() > MAX_LISTING_FIELD => {
                errors.add("image_file", too_long_message());
                String::new()
            }
            s => s.to_owned(),
        };

        match (name, store, price) {
            (Some(name), Some(store), Some(price)) if errors.is_empty() => Ok(NewItem {
                name,
                price,
                store,
                image_file,
            }),
            _ => Err(errors),
        }
    }

    /// Echo the trimmed input back into the form.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_owned(),
            price: self.price.trim().to_owned(),
            store: self.store.trim().to_owned(),
            image_file: self.image_file.trim().to_owned(),
        }
    }
}

// =============================================================================
// Field validators
// =============================================================================

fn validate_username(raw: &str, errors: &mut FormErrors) -> Option<Username> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("username", REQUIRED);
        return None;
    }
    match Username::parse(raw) {
        Ok(username) => Some(username),
        Err(_) => {
            errors.add(
                "username",
                format!(
                    "Field must be between {} and {} characters long.",
                    Username::MIN_LENGTH,
                    Username::MAX_LENGTH
                ),
            );
            None
        }
    }
}

fn validate_email(raw: &str, errors: &mut FormErrors) -> Option<Email> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add("email", REQUIRED);
        return None;
    }
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add("email", "Invalid email address.");
            None
        }
    }
}

fn required_bounded(field: &'static str, raw: &str, errors: &mut FormErrors) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    if raw.chars().count() > MAX_LISTING_FIELD {
        errors.add(field, too_long_message());
        return None;
    }
    Some(raw.to_owned())
}

fn too_long_message() -> String {
    format!("Field cannot be longer than {MAX_LISTING_FIELD} characters.")
}

const fn price_message(e: &PriceError) -> &'static str {
    match e {
        PriceError::NotANumber => "Not a valid decimal value.",
        PriceError::Negative => "Price cannot be negative.",
        PriceError::TooPrecise => "Price can have at most 2 decimal places.",
        PriceError::TooLarge => "Price is too large.",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration(username: &str, email: &str, password: &str, confirm: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
            confirm_password: confirm.to_owned(),
        }
    }

    #[test]
    fn test_valid_registration_is_trimmed() {
        let valid = registration("  kri ", " kri@example.com ", "password123", "password123")
            .validate()
            .unwrap();
        assert_eq!(valid.username.as_str(), "kri");
        assert_eq!(valid.email.as_str(), "kri@example.com");
        assert_eq!(valid.password, "password123");
    }

    #[test]
    fn test_empty_registration_requires_every_field() {
        let errors = RegistrationForm::default().validate().unwrap_err();
        for field in ["username", "email", "password", "confirm_password"] {
            assert_eq!(errors.get(field), Some(REQUIRED), "{field}");
        }
    }

    #[test]
    fn test_registration_field_rules() {
        let errors = registration("k", "not-an-email", "short", "other")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors.get("username"),
            Some("Field must be between 2 and 20 characters long.")
        );
        assert_eq!(errors.get("email"), Some("Invalid email address."));
        assert_eq!(
            errors.get("password"),
            Some("Field must be at least 8 characters long.")
        );
        assert_eq!(
            errors.get("confirm_password"),
            Some("Field must be equal to password.")
        );
    }

    #[test]
    fn test_password_mismatch_only() {
        let errors = registration("kri", "kri@example.com", "password123", "password124")
            .validate()
            .unwrap_err();
        assert!(errors.get("username").is_none());
        assert_eq!(
            errors.get("confirm_password"),
            Some("Field must be equal to password.")
        );
    }

    #[test]
    fn test_without_passwords_drops_secrets() {
        let form = registration(" kri ", "kri@example.com", "password123", "password123");
        let echoed = form.without_passwords();
        assert_eq!(echoed.username, "kri");
        assert!(echoed.password.is_empty());
        assert!(echoed.confirm_password.is_empty());
    }

    #[test]
    fn test_login_requires_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some(REQUIRED));
        assert_eq!(errors.get("password"), Some(REQUIRED));
    }

    #[test]
    fn test_login_remember_checkbox() {
        let mut form = LoginForm {
            email: "kri@example.com".to_owned(),
            password: "x".to_owned(),
            remember: None,
        };
        assert!(!form.remember());
        form.remember = Some("y".to_owned());
        assert!(form.remember());
        assert_eq!(form.validate().unwrap().as_str(), "kri@example.com");
    }

    #[test]
    fn test_update_account_rules() {
        let form = UpdateAccountForm {
            username: "a".repeat(21),
            email: "kri@example.com".to_owned(),
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.get("username").is_some());
        assert!(errors.get("email").is_none());
    }

    #[test]
    fn test_post_form_defaults_image() {
        let item = PostForm {
            name: " Lamp ".to_owned(),
            price: "12.5".to_owned(),
            store: "Attic".to_owned(),
            image_file: String::new(),
        }
        .validate()
        .unwrap();
        assert_eq!(item.name, "Lamp");
        assert_eq!(item.price.to_string(), "12.50");
        assert_eq!(item.image_file, DEFAULT_ITEM_IMAGE);
    }

    #[test]
    fn test_post_form_errors() {
        let errors = PostForm {
            name: String::new(),
            price: "-3".to_owned(),
            store: "s".repeat(101),
            image_file: "i".repeat(101),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("name"), Some(REQUIRED));
        assert_eq!(errors.get("price"), Some("Price cannot be negative."));
        assert_eq!(
            errors.get("store"),
            Some("Field cannot be longer than 100 characters.")
        );
        assert!(errors.get("image_file").is_some());
    }

    #[test]
    fn test_post_form_rejects_non_numeric_price() {
        let errors = PostForm {
            name: "Lamp".to_owned(),
            price: "cheap".to_owned(),
            store: "Attic".to_owned(),
            image_file: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(errors.get("price"), Some("Not a valid decimal value."));
    }

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let form: PostForm = serde_json::from_str(r#"{"name": "Lamp"}"#).unwrap();
        assert_eq!(form.name, "Lamp");
        assert!(form.price.is_empty());
        assert!(form.store.is_empty());
    }
}
