use crate::generator::yaml::clash_output::ClashProxy;
use crate::models::Protocol;

/// Format-specific body of a rendered proxy
#[derive(Debug, Clone)]
pub enum EntryFields {
    /// Share link (`vmess://`, `vless://`, ...)
    Link(String),
    /// One Clash `proxies` item
    Clash(ClashProxy),
    /// One sing-box outbound object
    SingBox(serde_json::Value),
    /// One line of a line-oriented config (Quantumult X, Surge)
    Line(String),
}

/// One successfully encoded node for one target format
#[derive(Debug, Clone)]
pub struct ProxyEntry {
    pub name: String,
    pub protocol: Protocol,
    pub fields: EntryFields,
}

/// Final rendered subscription
#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub body: String,
    pub content_type: &'static str,
    /// Sanitized download name including extension, if the target is served as a file
    pub filename: Option<String>,
    /// Number of nodes that made it into the document
    pub entries: usize,
    /// Number of nodes dropped because they could not be encoded for the target
    pub skipped: usize,
}
