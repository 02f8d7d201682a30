use crate::generator::ShortIdSelector;
use crate::interfaces::SubscribeContext;
use crate::settings::Settings;
use crate::store::FileStore;

/// Application state shared by the web handlers
pub struct AppState {
    /// Global application settings
    pub config: Settings,

    /// Users and nodes served by this instance
    pub store: FileStore,

    short_id_selector: Box<dyn ShortIdSelector>,
}

impl AppState {
    /// Create a new AppState; the short-id policy follows `config`
    pub fn new(config: Settings, store: FileStore) -> Self {
        let short_id_selector = config.short_id_selector();
        Self {
            config,
            store,
            short_id_selector,
        }
    }

    /// Replace the short-id policy, mostly for reproducible output
    pub fn with_short_id_selector(mut self, selector: Box<dyn ShortIdSelector>) -> Self {
        self.short_id_selector = selector;
        self
    }

    /// Borrow the collaborators of a subscription request
    pub fn context(&self) -> SubscribeContext<'_> {
        SubscribeContext {
            users: &self.store,
            nodes: &self.store,
            site: &self.config,
            short_id_selector: self.short_id_selector.as_ref(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
