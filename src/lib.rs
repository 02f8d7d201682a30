pub mod generator;
pub mod interfaces;
pub mod models;
pub mod parser;
pub mod settings;
pub mod store;
pub mod utils;
#[cfg(feature = "web-api")]
pub mod web_handlers;

// Re-export the main model types for easier access
pub use models::{Node, OutputDocument, Protocol, SubscriptionTarget, User};

// Re-export the entry points
pub use generator::{render_subscription, RenderOptions};
pub use interfaces::{subscribe, SubscribeError};
pub use settings::Settings;
