pub mod fields;
pub mod node_config;
pub mod protocol_config;

pub use node_config::{resolve_node, ResolvedNode};
pub use protocol_config::{
    AnyTlsConfig, Hysteria2Config, ProtocolConfig, ShadowsocksConfig, ShadowsocksRConfig,
    VlessConfig, VmessConfig,
};
