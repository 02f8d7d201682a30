use serde_json::json;

use super::common::{alpn_list, singbox_outbound, singbox_tls};
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions};
use crate::models::{EntryFields, SubscriptionTarget};
use crate::parser::Hysteria2Config;
use crate::utils::url::{build_query, url_encode};

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &Hysteria2Config,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    if ctx.user.passwd.is_empty() {
        return None;
    }
    let endpoint = ctx.endpoint;

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            Some(EntryFields::Link(link(ctx, config)))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(ClashProxy::Hysteria2 {
            common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port)
                .udp(true)
                .skip_cert_verify(endpoint.allow_insecure),
            password: ctx.user.passwd.clone(),
            sni: endpoint.server_name().to_string(),
            up: config.up_mbps.map(|mbps| format!("{} Mbps", mbps)),
            down: config.down_mbps.map(|mbps| format!("{} Mbps", mbps)),
            obfs: config.obfs.clone(),
            obfs_password: config.obfs.as_ref().and(config.obfs_password.clone()),
            alpn: alpn_list(endpoint),
        })),
        SubscriptionTarget::SingBox => {
            let mut outbound = singbox_outbound("hysteria2", ctx.name, endpoint);
            if let Some(up) = config.up_mbps {
                outbound["up_mbps"] = json!(up);
            }
            if let Some(down) = config.down_mbps {
                outbound["down_mbps"] = json!(down);
            }
            if let Some(obfs) = &config.obfs {
                outbound["obfs"] = json!({
                    "type": obfs,
                    "password": config.obfs_password.clone().unwrap_or_default(),
                });
            }
            outbound["password"] = json!(ctx.user.passwd);
            outbound["tls"] = singbox_tls(endpoint, None, true)?;
            Some(EntryFields::SingBox(outbound))
        }
        SubscriptionTarget::Surge => {
            let mut line = format!(
                "{} = hysteria2, {}, {}, password={}, sni={}",
                ctx.name,
                endpoint.server,
                endpoint.port,
                ctx.user.passwd,
                endpoint.server_name()
            );
            if let Some(down) = config.down_mbps {
                line.push_str(&format!(", download-bandwidth={}", down));
            }
            if endpoint.allow_insecure {
                line.push_str(", skip-cert-verify=true");
            }
            Some(EntryFields::Line(line))
        }
        SubscriptionTarget::QuantumultX => None,
    }
}

/// `hysteria2://{auth}@{host}:{port}/?sni=..&obfs=..#{name}`
fn link(ctx: &EncodeContext<'_>, config: &Hysteria2Config) -> String {
    let endpoint = ctx.endpoint;
    let up = config.up_mbps.map(|v| v.to_string());
    let down = config.down_mbps.map(|v| v.to_string());
    let alpn = endpoint.alpn_joined();
    let query = build_query(&[
        ("sni", Some(endpoint.server_name())),
        ("insecure", endpoint.allow_insecure.then_some("1")),
        ("obfs", config.obfs.as_deref()),
        (
            "obfs-password",
            config.obfs.as_ref().and(config.obfs_password.as_deref()),
        ),
        ("upmbps", up.as_deref()),
        ("downmbps", down.as_deref()),
        ("alpn", alpn.as_deref()),
    ]);

    format!(
        "hysteria2://{}@{}/?{}#{}",
        url_encode(&ctx.user.passwd),
        endpoint.authority(),
        query,
        url_encode(ctx.name)
    )
}
