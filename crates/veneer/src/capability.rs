//! behavior bundles attached at schema composition time
//!
//! A capability is a named bundle of operations declared on a schema node via
//! [Composer::feature](crate::schema::Composer::feature). Every node nested
//! under the declaring node inherits the bundle, so a view materialized at any
//! depth can [invoke](crate::view::View::invoke) it.

use crate::document::Value;
use crate::view::View;
use std::fmt;
use std::sync::Arc;

/// A named bundle of operations attachable to a schema node
///
/// Implementations answer [Capability::invoke] with `None` for operations they
/// do not provide, which lets several bundles coexist on one node.
pub trait Capability: Send + Sync {
    /// Bundle name, shown by [View::capability_names](crate::view::View::capability_names)
    fn name(&self) -> &str;

    /// Run `operation` against `view`, or `None` if this bundle does not
    /// provide it
    fn invoke(&self, operation: &str, view: &View) -> Option<Value>;
}

/// The effective, ordered set of bundles on one schema node
///
/// Entries are layered ancestors-first. Dispatch walks them in reverse, so the
/// most locally declared provider of an operation wins without evicting the
/// inherited one.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    entries: Vec<Arc<dyn Capability>>,
}

impl CapabilitySet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a bundle unless that exact instance is already layered
    pub(crate) fn layer(&mut self, capability: Arc<dyn Capability>) {
        let layered = self
            .entries
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &capability));
        if !layered {
            self.entries.push(capability);
        }
    }

    /// Put `inherited` underneath, keeping this set's own entries on top
    pub(crate) fn layer_under(&mut self, inherited: &CapabilitySet) {
        if inherited.is_empty() {
            return;
        }

        let own = std::mem::take(&mut self.entries);
        self.entries = inherited.entries.clone();
        for capability in own {
            self.layer(capability);
        }
    }

    pub(crate) fn dispatch(&self, operation: &str, view: &View) -> Option<Value> {
        self.entries
            .iter()
            .rev()
            .find_map(|capability| capability.invoke(operation, view))
    }

    /// Bundle names, most locally declared first
    pub fn names(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.entries.len());
        for capability in self.entries.iter().rev() {
            if !names.contains(&capability.name()) {
                names.push(capability.name());
            }
        }
        names
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|capability| capability.name()))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Named(&'static str);

    impl Capability for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn invoke(&self, _operation: &str, _view: &View) -> Option<Value> {
            None
        }
    }

    #[test]
    fn layering_the_same_instance_twice_is_a_noop() {
        let stamp: Arc<dyn Capability> = Arc::new(Named("stamp"));

        let mut set = CapabilitySet::default();
        set.layer(stamp.clone());
        set.layer(stamp);

        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distinct_instances_with_equal_names_both_layer() {
        let mut set = CapabilitySet::default();
        set.layer(Arc::new(Named("stamp")));
        set.layer(Arc::new(Named("stamp")));

        assert_eq!(set.len(), 2);
        // names are reported once
        assert_eq!(set.names(), vec!["stamp"]);
    }

    #[test]
    fn layer_under_keeps_own_entries_on_top() {
        let mut inherited = CapabilitySet::default();
        inherited.layer(Arc::new(Named("outer")));

        let mut set = CapabilitySet::default();
        set.layer(Arc::new(Named("inner")));
        set.layer_under(&inherited);

        assert_eq!(set.names(), vec!["inner", "outer"]);
    }

    #[test]
    fn layer_under_skips_instances_already_inherited() {
        let shared: Arc<dyn Capability> = Arc::new(Named("shared"));

        let mut inherited = CapabilitySet::default();
        inherited.layer(shared.clone());

        let mut set = CapabilitySet::default();
        set.layer(shared);
        set.layer_under(&inherited);

        assert_eq!(set.len(), 1);
    }
}
