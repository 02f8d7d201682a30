//! Subscription request handling
//!
//! Everything between an incoming token and the rendered document, kept
//! independent of any HTTP framework: token lookup, entitlement checks,
//! target selection, rendering and the response headers.

use log::{info, warn};
use thiserror::Error;

use crate::generator::{render_subscription, RenderOptions, ShortIdSelector};
use crate::models::{Node, OutputDocument, SubscriptionTarget, User};
use crate::utils::filename::content_disposition;

/// Reasons a subscription request is refused
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    #[error("invalid subscription token")]
    InvalidToken,
    #[error("account expired")]
    AccountExpired,
    #[error("traffic quota exhausted")]
    QuotaExhausted,
    #[error("no accessible nodes")]
    NoAccessibleNodes,
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl SubscribeError {
    /// HTTP status the error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            SubscribeError::InvalidToken => 401,
            SubscribeError::AccountExpired | SubscribeError::QuotaExhausted => 403,
            SubscribeError::NoAccessibleNodes => 404,
            SubscribeError::UnsupportedFormat(_) => 400,
            SubscribeError::Repository(_) => 500,
        }
    }
}

#[cfg(feature = "web-api")]
impl actix_web::ResponseError for SubscribeError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(SubscribeError::status_code(self))
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(actix_web::ResponseError::status_code(self))
            .content_type("text/plain; charset=utf-8")
            .body(self.to_string())
    }
}

/// Source of subscriber records
pub trait UserRepository: Send + Sync {
    /// The active user owning `token`, if any
    fn find_by_token(&self, token: &str) -> Result<Option<User>, SubscribeError>;
}

/// Source of node records
pub trait NodeRepository: Send + Sync {
    /// Nodes `user_id` may use, in the order they should be listed
    fn accessible_nodes(&self, user_id: i64) -> Result<Vec<Node>, SubscribeError>;
}

/// Site-wide settings used when answering subscription requests
pub trait SiteConfig: Send + Sync {
    fn site_name(&self) -> &str;

    fn site_url(&self) -> Option<&str>;

    fn update_interval_hours(&self) -> u32 {
        24
    }
}

/// Collaborators of one subscription request
#[derive(Clone, Copy)]
pub struct SubscribeContext<'a> {
    pub users: &'a dyn UserRepository,
    pub nodes: &'a dyn NodeRepository,
    pub site: &'a dyn SiteConfig,
    pub short_id_selector: &'a dyn ShortIdSelector,
}

/// One incoming subscription request
#[derive(Debug, Clone, Default)]
pub struct SubscribeRequest<'a> {
    pub token: &'a str,
    /// Explicit `target`/`flag` selector
    pub target: Option<&'a str>,
    pub user_agent: Option<&'a str>,
    /// Public URL of the request, for Surge's managed header
    pub subscription_url: Option<&'a str>,
    /// Current unix time in seconds
    pub now: i64,
}

/// Rendered subscription plus the headers to send with it
#[derive(Debug, Clone)]
pub struct SubscribeResponse {
    pub target: SubscriptionTarget,
    pub document: OutputDocument,
    pub headers: Vec<(String, String)>,
}

/// Pick the target: an explicit selector must be known, otherwise the
/// `User-Agent` decides and `v2ray` is the fallback
pub fn select_target(
    selector: Option<&str>,
    user_agent: Option<&str>,
) -> Result<SubscriptionTarget, SubscribeError> {
    match selector.map(str::trim).filter(|s| !s.is_empty()) {
        Some(name) => SubscriptionTarget::from_str(name)
            .ok_or_else(|| SubscribeError::UnsupportedFormat(name.to_string())),
        None => Ok(user_agent
            .and_then(SubscriptionTarget::from_user_agent)
            .unwrap_or(SubscriptionTarget::V2Ray)),
    }
}

/// Refuse expired accounts and exhausted quotas
pub fn check_entitlement(user: &User, now: i64) -> Result<(), SubscribeError> {
    if user.is_expired(now) {
        return Err(SubscribeError::AccountExpired);
    }
    if user.is_quota_exhausted() {
        return Err(SubscribeError::QuotaExhausted);
    }
    Ok(())
}

/// Headers sent along with a rendered document
pub fn response_headers(
    document: &OutputDocument,
    user: &User,
    target: SubscriptionTarget,
    site: &dyn SiteConfig,
) -> Vec<(String, String)> {
    let mut headers = vec![("Content-Type".to_string(), document.content_type.to_string())];
    if let Some(filename) = &document.filename {
        headers.push((
            "Content-Disposition".to_string(),
            content_disposition(filename),
        ));
    }
    headers.push((
        "Profile-Update-Interval".to_string(),
        site.update_interval_hours().to_string(),
    ));
    headers.push(("Subscription-Userinfo".to_string(), user.userinfo_header()));
    if target.shows_web_page() {
        if let Some(url) = site.site_url().filter(|url| !url.is_empty()) {
            headers.push(("profile-web-page-url".to_string(), url.to_string()));
        }
    }
    headers
}

/// Answer one subscription request
pub fn subscribe(
    ctx: &SubscribeContext<'_>,
    request: &SubscribeRequest<'_>,
) -> Result<SubscribeResponse, SubscribeError> {
    let target = select_target(request.target, request.user_agent)?;

    let user = ctx
        .users
        .find_by_token(request.token)?
        .ok_or(SubscribeError::InvalidToken)?;
    if let Err(e) = check_entitlement(&user, request.now) {
        warn!("Refusing subscription of user {}: {}", user.id, e);
        return Err(e);
    }

    let nodes = ctx.nodes.accessible_nodes(user.id)?;
    if nodes.is_empty() {
        return Err(SubscribeError::NoAccessibleNodes);
    }

    let options = RenderOptions {
        site_name: ctx.site.site_name(),
        subscription_url: request.subscription_url,
        short_id_selector: ctx.short_id_selector,
    };
    let document = render_subscription(&nodes, &user, target, &options);
    info!(
        "Served {} subscription to user {}: {} entries, {} skipped",
        target.as_str(),
        user.id,
        document.entries,
        document.skipped
    );

    let headers = response_headers(&document, &user, target, ctx.site);
    Ok(SubscribeResponse {
        target,
        document,
        headers,
    })
}
