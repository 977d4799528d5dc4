use crate::cache::policy::EntryMap;
use crate::errors::KeeperError;
use serde::Serialize;

#[derive(Serialize)]
struct EntryImage<'a, V> {
    key: &'a str,
    contents: &'a V,
    created_ms: i64,
    expires_ms: Option<i64>,
    last_access_ms: Option<i64>,
}

/// Serialized footprint of every entry, in bytes. Walks all payloads; diagnostics only.
pub(crate) fn serialized_size<V: Serialize>(map: &EntryMap<V>) -> Result<usize, KeeperError> {
    let images: Vec<EntryImage<'_, V>> = map
        .iter()
        .map(|(key, entry)| EntryImage {
            key,
            contents: entry.contents(),
            created_ms: entry.created_millis(),
            expires_ms: entry.expires_millis(),
            last_access_ms: entry.last_access_millis(),
        })
        .collect();
    let bytes = bincode::serde::encode_to_vec(&images, bincode::config::standard())?;
    Ok(bytes.len())
}
