/// Type of proxy group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyGroupType {
    Select,
    URLTest,
}

impl ProxyGroupType {
    /// Get string representation of the proxy group type
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyGroupType::Select => "select",
            ProxyGroupType::URLTest => "url-test",
        }
    }
}

/// Default latency test target for url-test groups
pub const DEFAULT_TEST_URL: &str = "http://www.gstatic.com/generate_204";
/// Default interval in seconds between latency tests
pub const DEFAULT_TEST_INTERVAL: u32 = 300;
/// Default tolerance in milliseconds for url-test groups
pub const DEFAULT_TEST_TOLERANCE: u32 = 50;

/// A fully resolved proxy group, ready to be written by a renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyGroupConfig {
    /// Name of the proxy group
    pub name: String,
    /// Type of the proxy group
    pub group_type: ProxyGroupType,
    /// Members in declaration order: node names, group names, `DIRECT` or `REJECT`
    pub proxies: Vec<String>,
    /// URL for testing
    pub url: String,
    /// Interval in seconds between tests
    pub interval: u32,
    /// Tolerance value for tests
    pub tolerance: u32,
}

impl ProxyGroupConfig {
    /// Create a new proxy group config
    pub fn new(name: &str, group_type: ProxyGroupType, proxies: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            group_type,
            proxies,
            url: DEFAULT_TEST_URL.to_string(),
            interval: DEFAULT_TEST_INTERVAL,
            tolerance: DEFAULT_TEST_TOLERANCE,
        }
    }

    /// Get string representation of the group type
    pub fn type_str(&self) -> &'static str {
        self.group_type.as_str()
    }
}

/// A collection of proxy group configurations
pub type ProxyGroupConfigs = Vec<ProxyGroupConfig>;
