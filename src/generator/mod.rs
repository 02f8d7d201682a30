//! Subscription rendering
//!
//! [`render_subscription`] is the whole engine: it resolves every node,
//! encodes what the target can represent, groups the result by region and
//! writes the final document. It performs no I/O and keeps no state between
//! calls.

pub mod config;
pub mod encoders;
pub mod short_id;
pub mod yaml;

use log::debug;

use crate::models::{Node, OutputDocument, ProxyEntry, SubscriptionTarget, User};
use crate::parser::resolve_node;
use crate::utils::filename::{sanitize_filename, FALLBACK_FILENAME};
use config::formats::{
    proxy_to_clash, proxy_to_quanx, proxy_to_singbox, proxy_to_single, proxy_to_surge,
};
use config::{assemble_groups, static_rules, RegionGroups, RemarkRegistry};
use encoders::clean_name;
pub use short_id::{FirstShortId, FixedShortId, RandomShortId, ShortIdSelector};

/// Per-request inputs that are not part of the node list or the user
#[derive(Clone, Copy)]
pub struct RenderOptions<'a> {
    /// Display name of the site, used for the download filename
    pub site_name: &'a str,
    /// Public URL of this subscription, written into Surge's managed header
    pub subscription_url: Option<&'a str>,
    pub short_id_selector: &'a dyn ShortIdSelector,
}

impl<'a> RenderOptions<'a> {
    pub fn new(site_name: &'a str, short_id_selector: &'a dyn ShortIdSelector) -> Self {
        RenderOptions {
            site_name,
            subscription_url: None,
            short_id_selector,
        }
    }
}

/// Download filename for `target`: sanitized site name plus extension
pub fn output_filename(site_name: &str, target: SubscriptionTarget) -> Option<String> {
    let extension = target.file_extension()?;
    let mut base = sanitize_filename(site_name);
    if base.is_empty() {
        base = FALLBACK_FILENAME.to_string();
    }
    Some(format!("{}.{}", base, extension))
}

/// Render the subscription of `user` over `nodes` for `target`.
///
/// Node order is kept in every output. Nodes that cannot be encoded for the
/// target are left out and counted in [`OutputDocument::skipped`]. Emitted
/// names are unique and never equal a group or built-in outbound name; a
/// clash is resolved by appending ` 2`, ` 3`, ... to the later node.
pub fn render_subscription(
    nodes: &[Node],
    user: &User,
    target: SubscriptionTarget,
    options: &RenderOptions<'_>,
) -> OutputDocument {
    let mut entries: Vec<ProxyEntry> = Vec::with_capacity(nodes.len());
    let mut source_names: Vec<&str> = Vec::with_capacity(nodes.len());
    let mut remarks = RemarkRegistry::new();
    for node in nodes {
        let resolved = resolve_node(node);
        let cleaned = clean_name(&node.name, target);
        let name = remarks.propose(&cleaned);
        if let Some(entry) =
            encoders::encode_as(&resolved, user, target, options.short_id_selector, name)
        {
            if entry.name != cleaned {
                debug!("Renamed node '{}' to '{}'", node.name, entry.name);
            }
            remarks.claim(&entry.name);
            source_names.push(&node.name);
            entries.push(entry);
        }
    }
    let skipped = nodes.len() - entries.len();

    let body = if target.is_grouped() {
        // Classify by the stored name, list members by the emitted name
        let regions = RegionGroups::build(
            source_names
                .iter()
                .copied()
                .zip(entries.iter().map(|entry| entry.name.as_str())),
        );
        let entry_names: Vec<String> = entries.iter().map(|entry| entry.name.clone()).collect();
        let groups = assemble_groups(&entry_names, &regions);
        let rules = static_rules();

        match target {
            SubscriptionTarget::Clash => proxy_to_clash(&entries, &groups, rules),
            SubscriptionTarget::SingBox => proxy_to_singbox(&entries, &groups, rules),
            _ => proxy_to_surge(&entries, &groups, rules, options.subscription_url),
        }
    } else {
        match target {
            SubscriptionTarget::V2Ray => proxy_to_single(&entries, true),
            SubscriptionTarget::QuantumultX => proxy_to_quanx(&entries),
            _ => proxy_to_single(&entries, false),
        }
    };

    debug!(
        "Rendered {} for user {}: {} entries, {} skipped",
        target.as_str(),
        user.id,
        entries.len(),
        skipped
    );

    OutputDocument {
        body,
        content_type: target.content_type(),
        filename: output_filename(options.site_name, target),
        entries: entries.len(),
        skipped,
    }
}
