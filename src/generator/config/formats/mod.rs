pub mod clash;
pub mod quanx;
pub mod singbox;
pub mod single;
pub mod surge;

// Re-export all format renderers
pub use clash::{proxy_to_clash, proxy_to_clash_yaml};
pub use quanx::proxy_to_quanx;
pub use singbox::{proxy_to_singbox, proxy_to_singbox_json};
pub use single::proxy_to_single;
pub use surge::proxy_to_surge;
