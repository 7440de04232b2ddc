//! # Registry - Named, Ordered Service Handles
//!
//! Three views are kept in lockstep: name -> service, service -> name and
//! registration order. A service is a member of all three or of none.
//!
//! Identity is the address of the shared allocation behind an `Arc`, so two
//! services with equal field values stay distinct entries, and an
//! `Arc<Concrete>` and the `Arc<dyn Service>` made from it are the same entry.
//!
//! The registry is not synchronized itself; the server keeps it behind one
//! reader/writer lock.

use std::collections::HashMap;
use std::sync::Arc;

/// Name given to services registered with an empty name.
pub const DEFAULT_SERVICE_NAME: &str = "NoName";

/// Address of the allocation an `Arc` points to, metadata stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Identity(usize);

impl Identity {
    fn of<T: ?Sized>(service: &Arc<T>) -> Self {
        Identity(Arc::as_ptr(service).cast::<()>() as usize)
    }
}

struct Entry<S: ?Sized> {
    name: String,
    service: Arc<S>,
}

pub struct Registry<S: ?Sized> {
    services: HashMap<String, Arc<S>>,
    names: HashMap<Identity, String>,
    ordered: Vec<Entry<S>>,
}

impl<S: ?Sized> Registry<S> {
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
            names: HashMap::new(),
            ordered: Vec::new(),
        }
    }

    /// Register `service` under `requested`, returning the name it ends up with.
    ///
    /// Re-registering a service returns its current name and changes nothing.
    /// A taken name gets the smallest free numeric suffix starting at 2
    /// (`x`, `x2`, `x3`, ...).
    pub fn add(&mut self, requested: &str, service: Arc<S>) -> String {
        if let Some(existing) = self.names.get(&Identity::of(&service)) {
            return existing.clone();
        }

        let base = if requested.is_empty() {
            DEFAULT_SERVICE_NAME
        } else {
            requested
        };
        let name = self.free_name(base);

        self.services.insert(name.clone(), Arc::clone(&service));
        self.names.insert(Identity::of(&service), name.clone());
        self.ordered.push(Entry {
            name: name.clone(),
            service,
        });
        tracing::debug!(service = %name, "service registered");
        name
    }

    fn free_name(&self, base: &str) -> String {
        if !self.services.contains_key(base) {
            return base.to_string();
        }
        (2u64..)
            .map(|suffix| format!("{base}{suffix}"))
            .find(|candidate| !self.services.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    /// Drop `service` from every view. Returns `false` when it was not registered.
    ///
    /// Relative order of the remaining services is preserved.
    pub fn remove<T: ?Sized>(&mut self, service: &Arc<T>) -> bool {
        let identity = Identity::of(service);
        let Some(name) = self.names.remove(&identity) else {
            return false;
        };
        self.services.remove(&name);
        self.ordered
            .retain(|entry| Identity::of(&entry.service) != identity);
        tracing::debug!(service = %name, "service removed");
        true
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<S>> {
        self.services.get(name).cloned()
    }

    /// Name currently assigned to `service`, if registered.
    pub fn name_of<T: ?Sized>(&self, service: &Arc<T>) -> Option<&str> {
        self.names.get(&Identity::of(service)).map(String::as_str)
    }

    pub fn contains<T: ?Sized>(&self, service: &Arc<T>) -> bool {
        self.names.contains_key(&Identity::of(service))
    }

    /// Snapshot of `(name, service)` pairs in registration order.
    ///
    /// The snapshot owns its handles, so callers may release the lock guarding
    /// the registry before calling into the services.
    pub fn ordered(&self) -> Vec<(String, Arc<S>)> {
        self.ordered
            .iter()
            .map(|entry| (entry.name.clone(), Arc::clone(&entry.service)))
            .collect()
    }

    /// Assigned names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.ordered.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}

impl<S: ?Sized> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ?Sized> std::fmt::Debug for Registry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Probe: Send + Sync {}

    #[derive(Debug, PartialEq)]
    struct Dummy {
        label: &'static str,
    }

    impl Probe for Dummy {}

    fn dummy() -> Arc<Dummy> {
        Arc::new(Dummy { label: "same" })
    }

    #[test]
    fn add_is_idempotent() {
        let mut registry: Registry<Dummy> = Registry::new();
        let service = dummy();

        assert_eq!(registry.add("name", Arc::clone(&service)), "name");
        assert_eq!(registry.add("other", Arc::clone(&service)), "name");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn colliding_names_get_suffixes() {
        let mut registry: Registry<Dummy> = Registry::new();

        assert_eq!(registry.add("x", dummy()), "x");
        assert_eq!(registry.add("x", dummy()), "x2");
        assert_eq!(registry.add("x", dummy()), "x3");
        assert_eq!(registry.names(), vec!["x", "x2", "x3"]);
    }

    #[test]
    fn suffix_search_reuses_the_first_free_slot() {
        let mut registry: Registry<Dummy> = Registry::new();
        let second = dummy();

        registry.add("x", dummy());
        assert_eq!(registry.add("x", Arc::clone(&second)), "x2");
        assert!(registry.remove(&second));
        assert_eq!(registry.add("x", dummy()), "x2");
    }

    #[test]
    fn suffix_skips_names_taken_verbatim() {
        let mut registry: Registry<Dummy> = Registry::new();

        registry.add("x", dummy());
        registry.add("x2", dummy());
        assert_eq!(registry.add("x", dummy()), "x3");
    }

    #[test]
    fn empty_name_uses_placeholder() {
        let mut registry: Registry<Dummy> = Registry::new();

        assert_eq!(registry.add("", dummy()), DEFAULT_SERVICE_NAME);
        assert_eq!(registry.add("", dummy()), "NoName2");
    }

    #[test]
    fn equal_values_are_distinct_services() {
        let mut registry: Registry<Dummy> = Registry::new();
        let a = dummy();
        let b = dummy();
        assert_eq!(a, b);

        registry.add("s", Arc::clone(&a));
        registry.add("s", Arc::clone(&b));
        assert_eq!(registry.name_of(&a), Some("s"));
        assert_eq!(registry.name_of(&b), Some("s2"));
    }

    #[test]
    fn identity_survives_unsizing() {
        let mut registry: Registry<dyn Probe> = Registry::new();
        let concrete = dummy();
        let erased: Arc<dyn Probe> = concrete.clone();

        registry.add("probe", erased);
        assert!(registry.contains(&concrete));
        assert_eq!(registry.add("again", concrete.clone()), "probe");
        assert!(registry.remove(&concrete));
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_keeps_views_consistent_and_order_stable() {
        let mut registry: Registry<Dummy> = Registry::new();
        let one = dummy();
        let two = dummy();
        let three = dummy();
        registry.add("one", Arc::clone(&one));
        registry.add("two", Arc::clone(&two));
        registry.add("three", Arc::clone(&three));

        assert!(registry.remove(&two));

        assert!(registry.lookup("two").is_none());
        assert!(registry.name_of(&two).is_none());
        assert!(!registry.contains(&two));
        assert_eq!(registry.names(), vec!["one", "three"]);
        let ordered = registry.ordered();
        assert!(Arc::ptr_eq(&ordered[0].1, &one));
        assert!(Arc::ptr_eq(&ordered[1].1, &three));
    }

    #[test]
    fn removing_unknown_service_is_a_no_op() {
        let mut registry: Registry<Dummy> = Registry::new();
        registry.add("kept", dummy());

        assert!(!registry.remove(&dummy()));
        assert_eq!(registry.names(), vec!["kept"]);
    }

    #[test]
    fn removed_service_can_register_again_at_the_end() {
        let mut registry: Registry<Dummy> = Registry::new();
        let a = dummy();
        registry.add("a", Arc::clone(&a));
        registry.add("b", dummy());

        registry.remove(&a);
        assert_eq!(registry.add("a", Arc::clone(&a)), "a");
        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.lookup("a").map(|s| s.label), Some("same"));
    }
}
