//! In-memory handler registry split into internal and extension partitions.
//!
//! # Responsibility
//! - Own every `HandlerId -> RouteHandler` entry of the front process.
//! - Drop an extension's whole partition in one map operation.
//!
//! # Invariants
//! - Internal entries are never removed individually.
//! - After `remove_extension(id)` no lookup under that extension id succeeds.
//! - Re-inserting an existing id replaces the previous handler (last write wins).
//! - Lookups return cloned handles, so callers never hold a registry borrow
//!   while a handler runs.

use crate::model::handler_id::HandlerId;
use crate::model::message::{ExtensionId, RouteParams};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Callback invoked with the parameters parsed from a matched URL.
pub type RouteHandler = Arc<dyn Fn(&RouteParams) + Send + Sync>;

/// Two-level handler store.
#[derive(Default)]
pub struct HandlerRegistry {
    internal: HashMap<HandlerId, RouteHandler>,
    extensions: BTreeMap<ExtensionId, HashMap<HandlerId, RouteHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_internal(&mut self, id: HandlerId, handler: RouteHandler) {
        self.internal.insert(id, handler);
    }

    /// Inserts into the extension partition, creating it on first use.
    pub fn put_extension(&mut self, extension_id: &str, id: HandlerId, handler: RouteHandler) {
        self.extensions
            .entry(extension_id.to_string())
            .or_default()
            .insert(id, handler);
    }

    pub fn get_internal(&self, id: &HandlerId) -> Option<RouteHandler> {
        self.internal.get(id).cloned()
    }

    /// Returns `None` when the extension has no partition or the id is absent in it.
    pub fn get_extension(&self, extension_id: &str, id: &HandlerId) -> Option<RouteHandler> {
        self.extensions.get(extension_id)?.get(id).cloned()
    }

    /// Drops the whole partition of `extension_id`.
    ///
    /// Returns how many handlers were removed; unknown ids remove nothing.
    pub fn remove_extension(&mut self, extension_id: &str) -> usize {
        self.extensions
            .remove(extension_id)
            .map_or(0, |partition| partition.len())
    }

    pub fn internal_len(&self) -> usize {
        self.internal.len()
    }

    pub fn extension_len(&self, extension_id: &str) -> usize {
        self.extensions.get(extension_id).map_or(0, HashMap::len)
    }

    /// Returns sorted ids of extensions that currently own handlers.
    pub fn extension_ids(&self) -> Vec<ExtensionId> {
        self.extensions.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.extensions.is_empty()
    }
}

impl Debug for HandlerRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("internal_len", &self.internal.len())
            .field("extension_ids", &self.extensions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{HandlerRegistry, RouteHandler};
    use crate::model::handler_id::HandlerId;
    use crate::model::message::RouteParams;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(counter: &Arc<AtomicUsize>) -> RouteHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_params: &RouteParams| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn stores_and_finds_internal_handlers() {
        let mut registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = HandlerId::generate();
        registry.put_internal(id.clone(), counting_handler(&hits));

        let handler = registry.get_internal(&id).expect("internal handler");
        handler(&RouteParams::new());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(registry.get_internal(&HandlerId::generate()).is_none());
        assert_eq!(registry.internal_len(), 1);
    }

    #[test]
    fn last_write_wins_for_duplicate_internal_id() {
        let mut registry = HandlerRegistry::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let id = HandlerId::from_wire("dup");

        registry.put_internal(id.clone(), counting_handler(&first));
        registry.put_internal(id.clone(), counting_handler(&second));

        registry.get_internal(&id).expect("handler")(&RouteParams::new());
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.internal_len(), 1);
    }

    #[test]
    fn extension_lookup_is_scoped_by_extension_id() {
        let mut registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let id = HandlerId::from_wire("h1");
        registry.put_extension("ext-1", id.clone(), counting_handler(&hits));

        assert!(registry.get_extension("ext-1", &id).is_some());
        assert!(registry.get_extension("ext-2", &id).is_none());
        assert!(registry.get_extension("ext-1", &HandlerId::from_wire("h2")).is_none());
        assert!(registry.get_internal(&id).is_none());
    }

    #[test]
    fn remove_extension_drops_whole_partition() {
        let mut registry = HandlerRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let first = HandlerId::generate();
        let second = HandlerId::generate();
        registry.put_extension("ext-1", first.clone(), counting_handler(&hits));
        registry.put_extension("ext-1", second.clone(), counting_handler(&hits));
        registry.put_extension("ext-2", HandlerId::generate(), counting_handler(&hits));

        assert_eq!(registry.remove_extension("ext-1"), 2);
        assert!(registry.get_extension("ext-1", &first).is_none());
        assert!(registry.get_extension("ext-1", &second).is_none());
        assert_eq!(registry.extension_len("ext-2"), 1);
        assert_eq!(registry.extension_ids(), vec!["ext-2".to_string()]);
    }

    #[test]
    fn removing_unknown_extension_is_a_noop() {
        let mut registry = HandlerRegistry::new();
        assert_eq!(registry.remove_extension("missing"), 0);
        assert_eq!(registry.remove_extension("missing"), 0);
        assert!(registry.is_empty());
    }
}
