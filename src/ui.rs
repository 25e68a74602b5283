use crate::api::{ApiClient, ApiError, AuthData};
use crate::chat::{ChatError, ChatState, ChatStore};
use crate::config::ApiConfig;
use crate::session::{Session, SessionStore};
use crate::views::{
    ChatView, DashboardView, HomeView, LoginView, ResetPasswordView, SignupView, Toast,
    ToastStack, ToastVariant,
};
use dioxus::prelude::*;
use std::sync::atomic::{AtomicU64, Ordering};

const APP_CSS: Asset = asset!("/assets/chatapp.css");

const TOAST_LIFETIME: std::time::Duration = std::time::Duration::from_secs(4);

static TOAST_IDS: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    Login,
    Signup,
    ResetPassword,
    Dashboard,
    Chat,
}

impl Screen {
    pub fn requires_session(self) -> bool {
        matches!(self, Screen::Dashboard | Screen::Chat)
    }

    /// Protected screens fall back to `Home` without a session.
    pub fn resolve(self, authenticated: bool) -> Screen {
        if self.requires_session() && !authenticated {
            Screen::Home
        } else {
            self
        }
    }
}

/// Signals every screen needs. Copy, so it can be moved into handlers freely.
#[derive(Clone, Copy, PartialEq)]
pub struct AppContext {
    pub screen: Signal<Screen>,
    pub session: Signal<Session>,
    pub config: Signal<ApiConfig>,
    pub toasts: Signal<Vec<Toast>>,
}

impl AppContext {
    pub fn navigate(mut self, target: Screen) {
        let authenticated = self.session.read().is_authenticated();
        let resolved = target.resolve(authenticated);
        if resolved != target {
            tracing::debug!(?target, "no session; redirecting home");
        }
        self.screen.set(resolved);
    }

    pub fn client(&self) -> ApiClient {
        self.session.read().client(&self.config.read())
    }

    pub fn sign_in(mut self, auth: AuthData) {
        let store = SessionStore::default();
        let session = match Session::begin(&store, auth.clone()) {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, "session not persisted; keeping it in memory");
                Session::from_auth(auth)
            }
        };
        self.session.set(session);
    }

    pub fn sign_out(mut self) {
        self.session.with_mut(|session| session.end(&SessionStore::default()));
        self.notify(
            ToastVariant::Info,
            "Logged out",
            "You have been successfully logged out.",
        );
        self.navigate(Screen::Home);
    }

    /// A 401 anywhere ends the session and sends the user to log in again.
    pub fn expire_session(mut self) {
        self.session.with_mut(|session| session.end(&SessionStore::default()));
        self.notify(
            ToastVariant::Error,
            "Session expired",
            "Please log in again.",
        );
        self.screen.set(Screen::Login);
    }

    pub fn notify(mut self, variant: ToastVariant, title: &str, description: &str) {
        let id = TOAST_IDS.fetch_add(1, Ordering::Relaxed);
        self.toasts.with_mut(|toasts| {
            toasts.push(Toast {
                id,
                title: title.to_string(),
                description: description.to_string(),
                variant,
            })
        });

        let mut toasts = self.toasts;
        spawn(async move {
            sleep(TOAST_LIFETIME).await;
            toasts.with_mut(|toasts| toasts.retain(|toast| toast.id != id));
        });
    }

    pub fn report_api_error(self, title: &str, err: &ApiError) {
        if err.is_unauthorized() {
            self.expire_session();
        } else {
            self.notify(ToastVariant::Error, title, &err.to_string());
        }
    }

    pub fn report_chat_error(self, title: &str, err: &ChatError) {
        match err {
            ChatError::Api(api) => self.report_api_error(title, api),
            other => self.notify(ToastVariant::Error, title, &other.to_string()),
        }
    }
}

impl ChatStore for Signal<ChatState> {
    fn view<R>(&self, f: impl FnOnce(&ChatState) -> R) -> R {
        self.with(f)
    }

    fn update<R>(&mut self, f: impl FnOnce(&mut ChatState) -> R) -> R {
        self.with_mut(f)
    }
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(duration: std::time::Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(target_arch = "wasm32")]
async fn sleep(duration: std::time::Duration) {
    gloo_timers::future::sleep(duration).await;
}

fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|err| {
        tracing::error!(%err, "invalid API configuration; using defaults");
        ApiConfig::default()
    })
}

#[component]
pub fn App() -> Element {
    let config = use_signal(load_config);
    let session = use_signal(|| Session::restore(&SessionStore::default()));
    let screen = use_signal(|| Screen::Home);
    let toasts = use_signal(Vec::<Toast>::new);
    let app = AppContext {
        screen,
        session,
        config,
        toasts,
    };

    let current = screen().resolve(session.read().is_authenticated());

    rsx! {
        document::Link { rel: "stylesheet", href: APP_CSS }
        div { class: "app-shell",
            match current {
                Screen::Home => rsx! { HomeView { app } },
                Screen::Login => rsx! { LoginView { app } },
                Screen::Signup => rsx! { SignupView { app } },
                Screen::ResetPassword => rsx! { ResetPasswordView { app } },
                Screen::Dashboard => rsx! { DashboardView { app } },
                Screen::Chat => rsx! { ChatView { app } },
            }
        }
        ToastStack { toasts }
    }
}
