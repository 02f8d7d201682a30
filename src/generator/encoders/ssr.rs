use md5::{Digest, Md5};

use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions};
use crate::models::{EntryFields, SubscriptionTarget};
use crate::parser::ShadowsocksRConfig;
use crate::utils::base64::url_safe_base64_encode;

/// Obfuscation modes that carry an `obfs-param`
const OBFS_WITH_PARAM: [&str; 5] = [
    "http_simple",
    "http_post",
    "tls1.2_ticket_auth",
    "simple_obfs_http",
    "simple_obfs_tls",
];

/// Fully defaulted SSR parameters of one node for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrParams {
    pub cipher: String,
    pub password: String,
    pub protocol: String,
    pub protocol_param: String,
    pub obfs: String,
    pub obfs_param: Option<String>,
}

impl SsrParams {
    pub fn resolve(ctx: &EncodeContext<'_>, config: &ShadowsocksRConfig) -> Option<Self> {
        let user = ctx.user;
        if user.passwd.is_empty() {
            return None;
        }
        let cipher = config.cipher.clone()?;
        let protocol = config
            .protocol
            .clone()
            .unwrap_or_else(|| "origin".to_string());
        let obfs = config.obfs.clone().unwrap_or_else(|| "plain".to_string());
        let protocol_param = config
            .protocol_param
            .clone()
            .unwrap_or_else(|| format!("{}:{}", user.id, user.passwd));

        let obfs_param = if OBFS_WITH_PARAM.contains(&obfs.as_str()) {
            Some(config.obfs_param.clone().unwrap_or_else(|| {
                fallback_obfs_param(ctx, &cipher, &obfs, &protocol)
            }))
        } else {
            None
        };

        Some(SsrParams {
            cipher,
            password: user.passwd.clone(),
            protocol,
            protocol_param,
            obfs,
            obfs_param,
        })
    }
}

/// Stable per-user obfs host: `{md5 prefix}{user id}.{tls host}`
fn fallback_obfs_param(ctx: &EncodeContext<'_>, cipher: &str, obfs: &str, protocol: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(ctx.user.id.to_string().as_bytes());
    hasher.update(ctx.user.passwd.as_bytes());
    hasher.update(cipher.as_bytes());
    hasher.update(obfs.as_bytes());
    hasher.update(protocol.as_bytes());
    let digest = format!("{:x}", hasher.finalize());

    let host = if ctx.endpoint.tls_host.is_empty() {
        &ctx.endpoint.server
    } else {
        &ctx.endpoint.tls_host
    };
    format!("{}{}.{}", &digest[..5], ctx.user.id, host)
}

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &ShadowsocksRConfig,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    let params = SsrParams::resolve(ctx, config)?;
    let endpoint = ctx.endpoint;

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            Some(EntryFields::Link(link(ctx, &params)))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(ClashProxy::ShadowsocksR {
            common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port).udp(true),
            cipher: params.cipher,
            password: params.password,
            protocol: params.protocol,
            protocol_param: params.protocol_param,
            obfs: params.obfs,
            obfs_param: params.obfs_param,
        })),
        SubscriptionTarget::QuantumultX => {
            let mut line = format!(
                "shadowsocks={}, method={}, password={}, ssr-protocol={}, ssr-protocol-param={}",
                endpoint.authority(),
                params.cipher,
                params.password,
                params.protocol,
                params.protocol_param
            );
            if params.obfs != "plain" {
                line.push_str(&format!(", obfs={}", params.obfs));
                if let Some(obfs_param) = &params.obfs_param {
                    line.push_str(&format!(", obfs-host={}", obfs_param));
                }
            }
            line.push_str(&format!(", tag={}", ctx.name));
            Some(EntryFields::Line(line))
        }
        SubscriptionTarget::SingBox | SubscriptionTarget::Surge => None,
    }
}

/// `ssr://base64(server:port:protocol:method:obfs:base64(password)/?params)`
fn link(ctx: &EncodeContext<'_>, params: &SsrParams) -> String {
    let endpoint = ctx.endpoint;
    let mut plain = format!(
        "{}:{}:{}:{}:{}:{}/?",
        endpoint.server,
        endpoint.port,
        params.protocol,
        params.cipher,
        params.obfs,
        url_safe_base64_encode(&params.password)
    );

    let mut query = vec![format!(
        "obfsparam={}",
        url_safe_base64_encode(params.obfs_param.as_deref().unwrap_or_default())
    )];
    query.push(format!(
        "protoparam={}",
        url_safe_base64_encode(&params.protocol_param)
    ));
    query.push(format!("remarks={}", url_safe_base64_encode(ctx.name)));
    plain.push_str(&query.join("&"));

    format!("ssr://{}", url_safe_base64_encode(&plain))
}
