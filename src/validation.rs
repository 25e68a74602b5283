//! Field validation for the signup, login and reset-password forms.

use std::collections::BTreeMap;
use std::fmt;

pub const MIN_NAME_LEN: usize = 2;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Email,
    Password,
    NewPassword,
    ConfirmPassword,
}

/// Per-field messages; empty means the form is valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<Field, &'static str>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.fields.get(&field).copied()
    }

    /// Editing a field clears its message.
    pub fn clear(&mut self, field: Field) {
        self.fields.remove(&field);
    }

    fn set(&mut self, field: Field, message: &'static str) {
        self.fields.insert(field, message);
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.fields.values().copied().collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// `something@something.something` with no whitespace in any part.
pub fn is_plausible_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.set(Field::Email, "Email is required");
    } else if !is_plausible_email(email) {
        errors.set(Field::Email, "Email is invalid");
    }
}

pub fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let name = name.trim();
    if name.is_empty() {
        errors.set(Field::Name, "Name is required");
    } else if name.chars().count() < MIN_NAME_LEN {
        errors.set(Field::Name, "Name must be at least 2 characters");
    }

    check_email(&mut errors, email);

    if password.is_empty() {
        errors.set(Field::Password, "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.set(Field::Password, "Password must be at least 6 characters");
    }

    errors.into_result()
}

pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.set(Field::Password, "Password is required");
    }
    errors.into_result()
}

pub fn validate_reset(
    email: &str,
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    check_email(&mut errors, email);

    if new_password.is_empty() {
        errors.set(Field::NewPassword, "New password is required");
    } else if new_password.chars().count() < MIN_PASSWORD_LEN {
        errors.set(Field::NewPassword, "Password must be at least 6 characters");
    }

    if confirm_password.is_empty() {
        errors.set(Field::ConfirmPassword, "Please confirm your password");
    } else if new_password != confirm_password {
        errors.set(Field::ConfirmPassword, "Passwords do not match");
    }

    errors.into_result()
}
