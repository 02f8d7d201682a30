use crate::models::{EntryFields, ProxyEntry};
use crate::utils::base64::base64_encode;

/// Convert entries to a share-link list
///
/// One link per line in entry order. The V2Ray flavour base64-encodes the
/// joined list as a whole.
///
/// # Arguments
/// * `entries` - Encoded entries, expected to carry links
/// * `encode_list` - Whether to base64-encode the joined list
pub fn proxy_to_single(entries: &[ProxyEntry], encode_list: bool) -> String {
    let links: Vec<&str> = entries
        .iter()
        .filter_map(|entry| match &entry.fields {
            EntryFields::Link(link) => Some(link.as_str()),
            _ => None,
        })
        .collect();

    let joined = links.join("\n");
    if encode_list {
        base64_encode(&joined)
    } else {
        joined
    }
}
