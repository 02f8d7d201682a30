use serde_json::json;

use super::common::{alpn_list, singbox_outbound, DEFAULT_FINGERPRINT};
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions};
use crate::models::{EntryFields, SubscriptionTarget};
use crate::parser::AnyTlsConfig;
use crate::utils::url::{build_query, url_encode};

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &AnyTlsConfig,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    let password = if ctx.user.passwd.is_empty() {
        config.password.clone()?
    } else {
        ctx.user.passwd.clone()
    };
    let endpoint = ctx.endpoint;
    let fingerprint = endpoint
        .fingerprint
        .as_deref()
        .unwrap_or(DEFAULT_FINGERPRINT);

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            let query = build_query(&[
                ("sni", Some(endpoint.server_name())),
                ("fp", Some(fingerprint)),
                ("insecure", endpoint.allow_insecure.then_some("1")),
            ]);
            Some(EntryFields::Link(format!(
                "anytls://{}@{}/?{}#{}",
                url_encode(&password),
                endpoint.authority(),
                query,
                url_encode(ctx.name)
            )))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(ClashProxy::AnyTls {
            common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port)
                .udp(true)
                .skip_cert_verify(endpoint.allow_insecure),
            password,
            sni: endpoint.server_name().to_string(),
            client_fingerprint: fingerprint.to_string(),
            alpn: alpn_list(endpoint),
            idle_session_check_interval: config.idle_session_check_interval,
            idle_session_timeout: config.idle_session_timeout,
            min_idle_session: config.min_idle_session,
        })),
        SubscriptionTarget::SingBox => {
            let mut outbound = singbox_outbound("anytls", ctx.name, endpoint);
            outbound["password"] = json!(password);
            if let Some(interval) = config.idle_session_check_interval {
                outbound["idle_session_check_interval"] = json!(format!("{}s", interval));
            }
            if let Some(timeout) = config.idle_session_timeout {
                outbound["idle_session_timeout"] = json!(format!("{}s", timeout));
            }
            if let Some(min) = config.min_idle_session {
                outbound["min_idle_session"] = json!(min);
            }
            let mut tls = json!({
                "enabled": true,
                "server_name": endpoint.server_name(),
                "utls": { "enabled": true, "fingerprint": fingerprint },
            });
            if endpoint.allow_insecure {
                tls["insecure"] = json!(true);
            }
            if !endpoint.alpn.is_empty() {
                tls["alpn"] = json!(endpoint.alpn);
            }
            outbound["tls"] = tls;
            Some(EntryFields::SingBox(outbound))
        }
        SubscriptionTarget::QuantumultX | SubscriptionTarget::Surge => None,
    }
}
