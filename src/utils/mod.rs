pub mod base64;
pub mod filename;
pub mod url;

// Re-export common utilities
pub use base64::{base64_decode, base64_encode, url_safe_base64_encode};
pub use filename::{content_disposition, sanitize_filename};
pub use url::{url_decode, url_encode};
