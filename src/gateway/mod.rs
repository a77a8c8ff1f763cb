pub mod classifier;
pub mod event;
pub mod line_items;
pub mod session_client;
pub mod signature;

pub use classifier::{Route, SkipReason, classify_session};
pub use event::{CheckoutSession, WebhookEvent};
pub use line_items::LineItem;
pub use signature::{SignatureError, SignatureVerifier};
