//! Shadowsocks, including per-user key derivation for the 2022 ciphers

use base64::{engine::general_purpose, Engine as _};
use serde_json::json;

use super::common::singbox_outbound;
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions, ObfsPluginOpts};
use crate::models::{EntryFields, SubscriptionTarget};
use crate::parser::ShadowsocksConfig;
use crate::utils::base64::{base64_encode_bytes, url_safe_base64_encode};
use crate::utils::url::url_encode;

/// Whether `cipher` belongs to the SS-2022 family
pub fn is_2022_cipher(cipher: &str) -> bool {
    cipher.to_lowercase().contains("2022-blake3")
}

/// Key length in bytes required by a 2022 cipher
pub fn key_length(cipher: &str) -> usize {
    if cipher.to_lowercase().contains("aes-128") {
        16
    } else {
        32
    }
}

/// Derive the per-user key for a 2022 cipher from the user's secret.
///
/// The secret is taken as base64 when it decodes as such, otherwise as its
/// UTF-8 bytes; the bytes are then cycled or truncated to the cipher's key
/// length. Returns the key base64 encoded.
pub fn derive_user_key(cipher: &str, secret: &str) -> String {
    let mut source = general_purpose::STANDARD
        .decode(secret)
        .unwrap_or_else(|_| secret.as_bytes().to_vec());
    if source.is_empty() {
        source.push(0);
    }

    let key: Vec<u8> = source.iter().copied().cycle().take(key_length(cipher)).collect();
    base64_encode_bytes(&key)
}

/// Password to put on the wire for `cipher`.
///
/// 2022 ciphers need the server key and produce `{server_key}:{user_key}`;
/// everything else uses the user's password unchanged.
pub fn password(cipher: &str, server_key: Option<&str>, secret: &str) -> Option<String> {
    if is_2022_cipher(cipher) {
        let server_key = server_key.filter(|key| !key.is_empty())?;
        Some(format!("{}:{}", server_key, derive_user_key(cipher, secret)))
    } else {
        Some(secret.to_string())
    }
}

/// simple-obfs settings of a node, `None` when obfuscation is off
#[derive(Debug, Clone, PartialEq, Eq)]
struct Obfs<'a> {
    mode: &'static str,
    host: Option<&'a str>,
    uri: Option<&'a str>,
}

fn obfs(config: &ShadowsocksConfig) -> Option<Obfs<'_>> {
    let mode = match config.obfs.as_deref()?.to_lowercase().as_str() {
        "http" | "simple_obfs_http" | "obfs-http" => "http",
        "tls" | "simple_obfs_tls" | "obfs-tls" => "tls",
        _ => return None,
    };
    Some(Obfs {
        mode,
        host: config.obfs_host.as_deref(),
        uri: config.obfs_uri.as_deref(),
    })
}

impl Obfs<'_> {
    /// `obfs=http;obfs-host=..;obfs-uri=..`
    fn plugin_opts(&self) -> String {
        let mut opts = format!("obfs={}", self.mode);
        if let Some(host) = self.host {
            opts.push_str(&format!(";obfs-host={}", host));
        }
        if let Some(uri) = self.uri {
            opts.push_str(&format!(";obfs-uri={}", uri));
        }
        opts
    }

    /// `, obfs=http, obfs-host=.., obfs-uri=..` for line-oriented targets
    fn line_opts(&self) -> String {
        let mut opts = format!(", obfs={}", self.mode);
        if let Some(host) = self.host {
            opts.push_str(&format!(", obfs-host={}", host));
        }
        if let Some(uri) = self.uri {
            opts.push_str(&format!(", obfs-uri={}", uri));
        }
        opts
    }
}

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &ShadowsocksConfig,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    if ctx.user.passwd.is_empty() {
        return None;
    }
    let cipher = config.cipher.as_deref()?;
    let password = password(cipher, config.server_key.as_deref(), &ctx.user.passwd)?;
    let obfs = obfs(config);

    let fields = match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            EntryFields::Link(link(ctx, cipher, &password, obfs.as_ref()))
        }
        SubscriptionTarget::Clash => EntryFields::Clash(ClashProxy::Shadowsocks {
            common: CommonProxyOptions::new(ctx.name, &ctx.endpoint.server, ctx.endpoint.port)
                .udp(true),
            cipher: cipher.to_string(),
            password,
            plugin: obfs.as_ref().map(|_| "obfs".to_string()),
            plugin_opts: obfs.as_ref().map(|o| ObfsPluginOpts {
                mode: o.mode.to_string(),
                host: o.host.map(str::to_string),
            }),
        }),
        SubscriptionTarget::SingBox => {
            let mut outbound = singbox_outbound("shadowsocks", ctx.name, ctx.endpoint);
            outbound["method"] = json!(cipher);
            outbound["password"] = json!(password);
            if let Some(o) = &obfs {
                outbound["plugin"] = json!("obfs-local");
                outbound["plugin_opts"] = json!(o.plugin_opts());
            }
            EntryFields::SingBox(outbound)
        }
        SubscriptionTarget::QuantumultX => {
            let mut line = format!(
                "shadowsocks={}, method={}, password={}",
                ctx.endpoint.authority(),
                cipher,
                password
            );
            if let Some(o) = &obfs {
                line.push_str(&o.line_opts());
            }
            line.push_str(&format!(", udp-relay=true, tag={}", ctx.name));
            EntryFields::Line(line)
        }
        SubscriptionTarget::Surge => {
            let mut line = format!(
                "{} = ss, {}, {}, encrypt-method={}, password={}",
                ctx.name, ctx.endpoint.server, ctx.endpoint.port, cipher, password
            );
            if let Some(o) = &obfs {
                line.push_str(&o.line_opts());
            }
            line.push_str(", udp-relay=true");
            EntryFields::Line(line)
        }
    };
    Some(fields)
}

/// SIP002 link: `ss://{base64(method:password)}@{host}:{port}/?plugin=..#{name}`
fn link(ctx: &EncodeContext<'_>, cipher: &str, password: &str, obfs: Option<&Obfs<'_>>) -> String {
    let user_info = url_safe_base64_encode(&format!("{}:{}", cipher, password));
    let mut uri = format!("ss://{}@{}", user_info, ctx.endpoint.authority());
    if let Some(o) = obfs {
        uri.push_str(&format!(
            "/?plugin={}",
            url_encode(&format!("obfs-local;{}", o.plugin_opts()))
        ));
    }
    uri.push_str(&format!("#{}", url_encode(ctx.name)));
    uri
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointDescriptor, User};
    use crate::utils::base64::base64_decode_bytes;

    #[test]
    fn test_key_length_by_cipher() {
        for (cipher, expected) in [
            ("2022-blake3-aes-128-gcm", 16),
            ("2022-blake3-aes-256-gcm", 32),
            ("2022-blake3-chacha20-poly1305", 32),
        ] {
            for secret in ["", "short", "a-much-longer-secret-than-any-key-length-needs", "AAECAw=="] {
                let key = derive_user_key(cipher, secret);
                let decoded = base64_decode_bytes(&key).unwrap();
                assert_eq!(decoded.len(), expected, "{} / {}", cipher, secret);
            }
        }
    }

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(
            derive_user_key("2022-blake3-aes-256-gcm", "secret"),
            derive_user_key("2022-blake3-aes-256-gcm", "secret")
        );
    }

    #[test]
    fn test_derivation_cycles_decoded_bytes() {
        // "AAECAw==" is the bytes 0, 1, 2, 3
        let key = base64_decode_bytes(&derive_user_key("2022-blake3-aes-128-gcm", "AAECAw==")).unwrap();
        assert_eq!(key, vec![0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_secret_uses_zero_byte() {
        let key = base64_decode_bytes(&derive_user_key("2022-blake3-aes-128-gcm", "")).unwrap();
        assert_eq!(key, vec![0u8; 16]);
    }

    #[test]
    fn test_password_requires_server_key_for_2022() {
        assert_eq!(password("2022-blake3-aes-256-gcm", None, "secret"), None);
        assert_eq!(password("2022-blake3-aes-256-gcm", Some(""), "secret"), None);
        assert_eq!(
            password("aes-256-gcm", None, "secret"),
            Some("secret".to_string())
        );
        let pw = password("2022-blake3-aes-256-gcm", Some("c2VydmVy"), "secret").unwrap();
        assert!(pw.starts_with("c2VydmVy:"));
    }

    #[test]
    fn test_link_with_obfs() {
        let user = User {
            passwd: "secret".to_string(),
            ..Default::default()
        };
        let endpoint = EndpointDescriptor {
            server: "sg.example.com".to_string(),
            port: 8388,
            ..Default::default()
        };
        let ctx = EncodeContext {
            name: "SG-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        let config = ShadowsocksConfig {
            cipher: Some("aes-256-gcm".to_string()),
            obfs: Some("http".to_string()),
            obfs_host: Some("bing.com".to_string()),
            ..Default::default()
        };
        let Some(EntryFields::Link(uri)) = encode(&ctx, &config, SubscriptionTarget::V2Ray) else {
            panic!("expected link");
        };
        assert_eq!(
            uri,
            format!(
                "ss://{}@sg.example.com:8388/?plugin=obfs-local%3Bobfs%3Dhttp%3Bobfs-host%3Dbing.com#SG-1",
                url_safe_base64_encode("aes-256-gcm:secret")
            )
        );
    }

    #[test]
    fn test_plain_obfs_is_ignored_and_cipher_required() {
        let user = User {
            passwd: "secret".to_string(),
            ..Default::default()
        };
        let endpoint = EndpointDescriptor {
            server: "sg.example.com".to_string(),
            port: 8388,
            ..Default::default()
        };
        let ctx = EncodeContext {
            name: "SG-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        let mut config = ShadowsocksConfig {
            obfs: Some("plain".to_string()),
            ..Default::default()
        };
        assert!(encode(&ctx, &config, SubscriptionTarget::Surge).is_none());

        config.cipher = Some("chacha20-ietf-poly1305".to_string());
        let Some(EntryFields::Line(line)) = encode(&ctx, &config, SubscriptionTarget::Surge) else {
            panic!("expected surge line");
        };
        assert_eq!(
            line,
            "SG-1 = ss, sg.example.com, 8388, encrypt-method=chacha20-ietf-poly1305, password=secret, udp-relay=true"
        );
    }
}
