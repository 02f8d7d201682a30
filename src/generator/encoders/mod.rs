//! Per-protocol proxy encoders
//!
//! Every protocol module exposes an `encode` function that turns one resolved
//! node into the entry body for one target, or `None` when the node cannot be
//! represented there. Nothing in here fails loudly: unsupported combinations
//! and missing credentials simply drop the node.

pub mod anytls;
pub mod common;
pub mod hysteria2;
pub mod shadowsocks;
pub mod ssr;
pub mod trojan;
pub mod vless;
pub mod vmess;

use log::debug;

use crate::generator::short_id::ShortIdSelector;
use crate::models::{EndpointDescriptor, ProxyEntry, Security, SubscriptionTarget, User};
use crate::parser::{ProtocolConfig, ResolvedNode};

/// Everything an encoder needs besides its protocol configuration
#[derive(Debug, Clone, Copy)]
pub struct EncodeContext<'a> {
    /// Display name, already cleaned for the target
    pub name: &'a str,
    pub endpoint: &'a EndpointDescriptor,
    pub user: &'a User,
    /// Reality short-id picked for this render
    pub short_id: Option<&'a str>,
}

/// Clean a node name for line-oriented targets, where `,` and `=` are separators
pub fn clean_name(name: &str, target: SubscriptionTarget) -> String {
    match target {
        SubscriptionTarget::QuantumultX | SubscriptionTarget::Surge => {
            name.replace(',', " ").replace('=', "-")
        }
        _ => name.to_string(),
    }
}

/// Encode one resolved node for `target` under its cleaned stored name
pub fn encode(
    resolved: &ResolvedNode<'_>,
    user: &User,
    target: SubscriptionTarget,
    selector: &dyn ShortIdSelector,
) -> Option<ProxyEntry> {
    let name = clean_name(&resolved.node.name, target);
    encode_as(resolved, user, target, selector, name)
}

/// Encode one resolved node for `target`, emitting it as `name`
pub fn encode_as(
    resolved: &ResolvedNode<'_>,
    user: &User,
    target: SubscriptionTarget,
    selector: &dyn ShortIdSelector,
    name: String,
) -> Option<ProxyEntry> {
    let node = resolved.node;
    let endpoint = &resolved.endpoint;

    if endpoint.server.is_empty() {
        debug!("Skipping node '{}': no server address", node.name);
        return None;
    }

    let short_id = match endpoint.security {
        Security::Reality => selector.select(&endpoint.reality_short_ids),
        _ => None,
    };
    let ctx = EncodeContext {
        name: &name,
        endpoint,
        user,
        short_id,
    };

    let fields = match &resolved.config {
        ProtocolConfig::Vmess(config) => vmess::encode(&ctx, config, target),
        ProtocolConfig::Vless(config) => vless::encode(&ctx, config, target),
        ProtocolConfig::Trojan => trojan::encode(&ctx, target),
        ProtocolConfig::Shadowsocks(config) => shadowsocks::encode(&ctx, config, target),
        ProtocolConfig::ShadowsocksR(config) => ssr::encode(&ctx, config, target),
        ProtocolConfig::Hysteria2(config) => hysteria2::encode(&ctx, config, target),
        ProtocolConfig::AnyTls(config) => anytls::encode(&ctx, config, target),
    };

    match fields {
        Some(fields) => Some(ProxyEntry {
            name,
            protocol: node.protocol,
            fields,
        }),
        None => {
            debug!(
                "Skipping node '{}' ({}) for {}: unsupported or incomplete",
                node.name,
                node.protocol.as_str(),
                target.as_str()
            );
            None
        }
    }
}
