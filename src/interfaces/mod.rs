pub mod subscribe;

pub use subscribe::{
    check_entitlement, select_target, subscribe, NodeRepository, SiteConfig, SubscribeContext,
    SubscribeError, SubscribeRequest, SubscribeResponse, UserRepository,
};
