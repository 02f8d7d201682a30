//! Protocol specific configuration variants
//!
//! Each variant is decoded from the merged `client` over `config` sections of a
//! node's stored configuration. Decoding never fails: absent or unusable fields
//! stay `None` and the encoders decide whether the node can still be emitted.

use serde_json::Value;

use super::fields;
use crate::models::Protocol;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VmessConfig {
    pub alter_id: u32,
    /// VMess body cipher, `auto` when unset
    pub cipher: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlessConfig {
    pub flow: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowsocksConfig {
    pub cipher: Option<String>,
    /// Server side PSK, only meaningful for 2022 ciphers
    pub server_key: Option<String>,
    pub obfs: Option<String>,
    pub obfs_host: Option<String>,
    pub obfs_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadowsocksRConfig {
    pub cipher: Option<String>,
    pub protocol: Option<String>,
    pub protocol_param: Option<String>,
    pub obfs: Option<String>,
    pub obfs_param: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hysteria2Config {
    pub up_mbps: Option<u32>,
    pub down_mbps: Option<u32>,
    pub obfs: Option<String>,
    pub obfs_password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnyTlsConfig {
    pub password: Option<String>,
    pub idle_session_check_interval: Option<u32>,
    pub idle_session_timeout: Option<u32>,
    pub min_idle_session: Option<u32>,
}

/// Decoded per-protocol configuration, keyed by the node's type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolConfig {
    Vmess(VmessConfig),
    Vless(VlessConfig),
    Trojan,
    Shadowsocks(ShadowsocksConfig),
    ShadowsocksR(ShadowsocksRConfig),
    Hysteria2(Hysteria2Config),
    AnyTls(AnyTlsConfig),
}

impl ProtocolConfig {
    /// Empty configuration for `protocol`
    pub fn empty(protocol: Protocol) -> Self {
        match protocol {
            Protocol::VMess => ProtocolConfig::Vmess(VmessConfig::default()),
            Protocol::Vless => ProtocolConfig::Vless(VlessConfig::default()),
            Protocol::Trojan => ProtocolConfig::Trojan,
            Protocol::Shadowsocks => ProtocolConfig::Shadowsocks(ShadowsocksConfig::default()),
            Protocol::ShadowsocksR => ProtocolConfig::ShadowsocksR(ShadowsocksRConfig::default()),
            Protocol::Hysteria2 => ProtocolConfig::Hysteria2(Hysteria2Config::default()),
            Protocol::AnyTls => ProtocolConfig::AnyTls(AnyTlsConfig::default()),
        }
    }

    /// Decode the configuration for `protocol` from the merged sections.
    ///
    /// `merged` must already have `client` keys laid over `config` keys.
    pub fn decode(protocol: Protocol, merged: &Value) -> Self {
        if !merged.is_object() {
            return Self::empty(protocol);
        }

        match protocol {
            Protocol::VMess => ProtocolConfig::Vmess(VmessConfig {
                alter_id: fields::number(merged, &["alter_id", "alterId", "aid"]).unwrap_or(0),
                cipher: fields::string(merged, &["cipher", "method"]),
            }),
            Protocol::Vless => ProtocolConfig::Vless(VlessConfig {
                flow: fields::string(merged, &["flow"]),
            }),
            Protocol::Trojan => ProtocolConfig::Trojan,
            Protocol::Shadowsocks => ProtocolConfig::Shadowsocks(ShadowsocksConfig {
                cipher: fields::string(merged, &["cipher", "method"]),
                server_key: fields::string(
                    merged,
                    &["server_key", "server_password", "password"],
                ),
                obfs: fields::string(merged, &["obfs"]),
                obfs_host: fields::string(merged, &["obfs_host", "obfs-host", "obfs_param"]),
                obfs_uri: fields::string(merged, &["obfs_uri", "obfs-uri", "obfs_path"]),
            }),
            Protocol::ShadowsocksR => ProtocolConfig::ShadowsocksR(ShadowsocksRConfig {
                cipher: fields::string(merged, &["cipher", "method"]),
                protocol: fields::string(merged, &["protocol"]),
                protocol_param: fields::string(
                    merged,
                    &["protocol_param", "protocol-param", "protoparam"],
                ),
                obfs: fields::string(merged, &["obfs"]),
                obfs_param: fields::string(merged, &["obfs_param", "obfs-param", "obfsparam"]),
            }),
            Protocol::Hysteria2 => ProtocolConfig::Hysteria2(Hysteria2Config {
                up_mbps: fields::number(merged, &["up_mbps", "upmbps", "up"]),
                down_mbps: fields::number(merged, &["down_mbps", "downmbps", "down"]),
                obfs: fields::string(merged, &["obfs"]),
                obfs_password: fields::string(
                    merged,
                    &["obfs_password", "obfs-password", "obfs_param"],
                ),
            }),
            Protocol::AnyTls => ProtocolConfig::AnyTls(AnyTlsConfig {
                password: fields::string(merged, &["password"]),
                idle_session_check_interval: fields::number(
                    merged,
                    &["idle_session_check_interval", "idle-session-check-interval"],
                ),
                idle_session_timeout: fields::number(
                    merged,
                    &["idle_session_timeout", "idle-session-timeout"],
                ),
                min_idle_session: fields::number(
                    merged,
                    &["min_idle_session", "min-idle-session"],
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_shadowsocks() {
        let merged = json!({
            "cipher": "2022-blake3-aes-256-gcm",
            "server_key": "c2VydmVy",
            "obfs": "http",
            "obfs-host": "bing.com"
        });
        let config = ProtocolConfig::decode(Protocol::Shadowsocks, &merged);
        let ProtocolConfig::Shadowsocks(ss) = config else {
            panic!("expected shadowsocks config");
        };
        assert_eq!(ss.cipher.as_deref(), Some("2022-blake3-aes-256-gcm"));
        assert_eq!(ss.server_key.as_deref(), Some("c2VydmVy"));
        assert_eq!(ss.obfs_host.as_deref(), Some("bing.com"));
        assert_eq!(ss.obfs_uri, None);
    }

    #[test]
    fn test_decode_non_object_is_empty_variant() {
        assert_eq!(
            ProtocolConfig::decode(Protocol::Hysteria2, &json!("garbage")),
            ProtocolConfig::Hysteria2(Hysteria2Config::default())
        );
    }

    #[test]
    fn test_decode_numbers_from_strings() {
        let merged = json!({"upmbps": "100", "down_mbps": 500});
        let ProtocolConfig::Hysteria2(config) = ProtocolConfig::decode(Protocol::Hysteria2, &merged)
        else {
            panic!("expected hysteria2 config");
        };
        assert_eq!(config.up_mbps, Some(100));
        assert_eq!(config.down_mbps, Some(500));
    }
}
