/// Client application a subscription is rendered for.
///
/// The set is closed; anything else is rejected at the HTTP boundary before
/// the generator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubscriptionTarget {
    V2Ray,
    Clash,
    QuantumultX,
    SingBox,
    Shadowrocket,
    Surge,
}

impl SubscriptionTarget {
    /// Convert a selector string to a target
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "v2ray" => Some(SubscriptionTarget::V2Ray),
            "clash" => Some(SubscriptionTarget::Clash),
            "quantumultx" => Some(SubscriptionTarget::QuantumultX),
            "singbox" => Some(SubscriptionTarget::SingBox),
            "shadowrocket" => Some(SubscriptionTarget::Shadowrocket),
            "surge" => Some(SubscriptionTarget::Surge),
            _ => None,
        }
    }

    /// Guess the target from a client's `User-Agent`
    pub fn from_user_agent(user_agent: &str) -> Option<Self> {
        let ua = user_agent.to_lowercase();
        if ua.contains("sing-box") || ua.contains("singbox") || ua.contains("sfa") {
            Some(SubscriptionTarget::SingBox)
        } else if ua.contains("clash") || ua.contains("mihomo") || ua.contains("stash") {
            Some(SubscriptionTarget::Clash)
        } else if ua.contains("shadowrocket") {
            Some(SubscriptionTarget::Shadowrocket)
        } else if ua.contains("quantumult") {
            Some(SubscriptionTarget::QuantumultX)
        } else if ua.contains("surge") {
            Some(SubscriptionTarget::Surge)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTarget::V2Ray => "v2ray",
            SubscriptionTarget::Clash => "clash",
            SubscriptionTarget::QuantumultX => "quantumultx",
            SubscriptionTarget::SingBox => "singbox",
            SubscriptionTarget::Shadowrocket => "shadowrocket",
            SubscriptionTarget::Surge => "surge",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            SubscriptionTarget::Clash => "text/yaml",
            SubscriptionTarget::SingBox => "application/json",
            SubscriptionTarget::V2Ray
            | SubscriptionTarget::Shadowrocket
            | SubscriptionTarget::QuantumultX
            | SubscriptionTarget::Surge => "text/plain",
        }
    }

    /// Extension of the downloadable profile, for targets that are served as files
    pub fn file_extension(self) -> Option<&'static str> {
        match self {
            SubscriptionTarget::Clash => Some("yaml"),
            SubscriptionTarget::SingBox => Some("json"),
            SubscriptionTarget::Surge => Some("conf"),
            SubscriptionTarget::V2Ray
            | SubscriptionTarget::Shadowrocket
            | SubscriptionTarget::QuantumultX => None,
        }
    }

    /// Targets whose output carries proxy groups
    pub fn is_grouped(self) -> bool {
        matches!(
            self,
            SubscriptionTarget::Clash | SubscriptionTarget::SingBox | SubscriptionTarget::Surge
        )
    }

    /// Targets that advertise the site's web page to the client
    pub fn shows_web_page(self) -> bool {
        matches!(self, SubscriptionTarget::Clash | SubscriptionTarget::Surge)
    }
}
