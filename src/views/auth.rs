//! Login, signup and reset-password screens.

use crate::ui::{AppContext, Screen};
use crate::validation::{Field, ValidationErrors, validate_login, validate_reset, validate_signup};
use crate::views::ToastVariant;
use dioxus::prelude::*;

#[component]
fn FieldError(errors: Signal<ValidationErrors>, field: Field) -> Element {
    match errors.read().get(field) {
        Some(message) => rsx! { p { class: "field-error", "{message}" } },
        None => rsx! {},
    }
}

#[component]
fn AuthCard(title: &'static str, subtitle: &'static str, children: Element) -> Element {
    rsx! {
        div { class: "main-container auth",
            div { class: "card auth-card",
                h2 { class: "auth-title", "{title}" }
                p { class: "text-muted", "{subtitle}" }
                {children}
            }
        }
    }
}

#[component]
pub fn LoginView(app: AppContext) -> Element {
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(ValidationErrors::default);
    let mut submitting = use_signal(|| false);

    let on_submit = move |ev: FormEvent| {
        ev.prevent_default();
        if submitting() {
            return;
        }
        let email_value = email().trim().to_string();
        let password_value = password();
        if let Err(found) = validate_login(&email_value, &password_value) {
            errors.set(found);
            return;
        }

        submitting.set(true);
        let client = app.client();
        spawn(async move {
            match client.login(&email_value, &password_value).await {
                Ok(auth) => {
                    let welcome = format!("Signed in as {}", auth.email);
                    app.sign_in(auth);
                    app.notify(ToastVariant::Success, "Welcome back", &welcome);
                    app.navigate(Screen::Chat);
                }
                Err(err) => {
                    tracing::warn!(%err, "login failed");
                    app.notify(ToastVariant::Error, "Login failed", &err.to_string());
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        AuthCard { title: "Log in", subtitle: "Sign in to continue your conversations.",
            form { class: "auth-form", onsubmit: on_submit,
                label { "Email" }
                input {
                    r#type: "email",
                    value: "{email}",
                    oninput: move |ev| {
                        email.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Email));
                    },
                }
                FieldError { errors, field: Field::Email }
                label { "Password" }
                input {
                    r#type: "password",
                    value: "{password}",
                    oninput: move |ev| {
                        password.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Password));
                    },
                }
                FieldError { errors, field: Field::Password }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Signing in…" } else { "Log in" }
                }
            }
            div { class: "auth-links",
                button { class: "link-btn", r#type: "button",
                    onclick: move |_| app.navigate(Screen::ResetPassword),
                    "Forgot password?"
                }
                button { class: "link-btn", r#type: "button",
                    onclick: move |_| app.navigate(Screen::Signup),
                    "Create an account"
                }
            }
        }
    }
}

#[component]
pub fn SignupView(app: AppContext) -> Element {
    let mut name = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut errors = use_signal(ValidationErrors::default);
    let mut submitting = use_signal(|| false);

    let on_submit = move |ev: FormEvent| {
        ev.prevent_default();
        if submitting() {
            return;
        }
        let name_value = name().trim().to_string();
        let email_value = email().trim().to_string();
        let password_value = password();
        if let Err(found) = validate_signup(&name_value, &email_value, &password_value) {
            errors.set(found);
            return;
        }

        submitting.set(true);
        let client = app.client();
        spawn(async move {
            match client
                .register(&name_value, &email_value, &password_value)
                .await
            {
                Ok(auth) => {
                    let welcome = format!("Welcome, {}!", auth.name);
                    app.sign_in(auth);
                    app.notify(ToastVariant::Success, "Account created", &welcome);
                    app.navigate(Screen::Chat);
                }
                Err(err) => {
                    tracing::warn!(%err, "signup failed");
                    app.notify(ToastVariant::Error, "Signup failed", &err.to_string());
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        AuthCard { title: "Create an account", subtitle: "It only takes a minute.",
            form { class: "auth-form", onsubmit: on_submit,
                label { "Name" }
                input {
                    r#type: "text",
                    value: "{name}",
                    oninput: move |ev| {
                        name.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Name));
                    },
                }
                FieldError { errors, field: Field::Name }
                label { "Email" }
                input {
                    r#type: "email",
                    value: "{email}",
                    oninput: move |ev| {
                        email.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Email));
                    },
                }
                FieldError { errors, field: Field::Email }
                label { "Password" }
                input {
                    r#type: "password",
                    value: "{password}",
                    oninput: move |ev| {
                        password.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Password));
                    },
                }
                FieldError { errors, field: Field::Password }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Creating account…" } else { "Sign up" }
                }
            }
            div { class: "auth-links",
                button { class: "link-btn", r#type: "button",
                    onclick: move |_| app.navigate(Screen::Login),
                    "Already have an account? Log in"
                }
            }
        }
    }
}

#[component]
pub fn ResetPasswordView(app: AppContext) -> Element {
    let mut email = use_signal(String::new);
    let mut new_password = use_signal(String::new);
    let mut confirm_password = use_signal(String::new);
    let mut errors = use_signal(ValidationErrors::default);
    let mut submitting = use_signal(|| false);

    let on_submit = move |ev: FormEvent| {
        ev.prevent_default();
        if submitting() {
            return;
        }
        let email_value = email().trim().to_string();
        let new_value = new_password();
        let confirm_value = confirm_password();
        if let Err(found) = validate_reset(&email_value, &new_value, &confirm_value) {
            errors.set(found);
            return;
        }

        submitting.set(true);
        let client = app.client();
        spawn(async move {
            match client
                .reset_password(&email_value, &new_value, &confirm_value)
                .await
            {
                Ok(message) => {
                    app.notify(ToastVariant::Success, "Password reset", &message);
                    app.navigate(Screen::Login);
                }
                Err(err) => {
                    tracing::warn!(%err, "password reset failed");
                    app.notify(ToastVariant::Error, "Reset failed", &err.to_string());
                }
            }
            submitting.set(false);
        });
    };

    rsx! {
        AuthCard { title: "Reset password", subtitle: "Choose a new password for your account.",
            form { class: "auth-form", onsubmit: on_submit,
                label { "Email" }
                input {
                    r#type: "email",
                    value: "{email}",
                    oninput: move |ev| {
                        email.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::Email));
                    },
                }
                FieldError { errors, field: Field::Email }
                label { "New password" }
                input {
                    r#type: "password",
                    value: "{new_password}",
                    oninput: move |ev| {
                        new_password.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::NewPassword));
                    },
                }
                FieldError { errors, field: Field::NewPassword }
                label { "Confirm password" }
                input {
                    r#type: "password",
                    value: "{confirm_password}",
                    oninput: move |ev| {
                        confirm_password.set(ev.value());
                        errors.with_mut(|e| e.clear(Field::ConfirmPassword));
                    },
                }
                FieldError { errors, field: Field::ConfirmPassword }
                button {
                    class: "btn btn-primary",
                    r#type: "submit",
                    disabled: submitting(),
                    if submitting() { "Resetting…" } else { "Reset password" }
                }
            }
            div { class: "auth-links",
                button { class: "link-btn", r#type: "button",
                    onclick: move |_| app.navigate(Screen::Login),
                    "Back to log in"
                }
            }
        }
    }
}
