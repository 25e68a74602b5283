pub mod auth;
pub mod chat;
pub mod composer;
pub mod dashboard;
pub mod home;
pub mod message;
pub mod shared;
pub mod sidebar;
pub mod toast;

pub use auth::{LoginView, ResetPasswordView, SignupView};
pub use chat::ChatView;
pub use composer::ComposerBar;
pub use dashboard::DashboardView;
pub use home::HomeView;
pub use message::MessageBubble;
pub use sidebar::Sidebar;
pub use toast::{Toast, ToastStack, ToastVariant};
