//! materialized property trees
//!
//! A [View] is the mutable in-memory tree a caller reads and writes between a
//! host read and a [sync](crate::sync::sync). Materialization captures values
//! eagerly; the view holds no reference into the source document and later
//! changes to either side do not leak across.

use crate::document::{Document, Value};
use crate::schema::{Node, Schema};
use std::sync::Arc;

impl Schema {
    /// Materialize a view of `source`
    ///
    /// The whole declared tree is always built: keys absent from `source` (or
    /// an absent `source` altogether) come up as null scalars and all-null
    /// nested views, at any depth. Keys of `source` the schema does not
    /// declare are not part of the view; they reappear on
    /// [sync](crate::sync::sync). `source` is never mutated.
    pub fn materialize(&self, source: Option<&Document>) -> View {
        View::materialize_at(self.root().clone(), source, "$".to_owned())
    }
}

/// The mutable property tree over one (possibly absent) source document
#[derive(Debug)]
pub struct View {
    node: Arc<Node>,
    path: String,
    slots: indexmap::IndexMap<String, Slot>,
}

/// One mutable property slot
#[derive(Debug)]
pub(crate) enum Slot {
    Value(Value),
    Nested(View),
}

/// Reading a property yields either a scalar value or a nested view
#[derive(Debug)]
pub enum Entry<'a> {
    Value(&'a Value),
    Nested(&'a View),
}

impl View {
    fn materialize_at(node: Arc<Node>, source: Option<&Document>, path: String) -> View {
        let mut slots = indexmap::IndexMap::new();
        for (name, child) in node.children() {
            let slot = if child.is_nested() {
                let sub = source
                    .and_then(|document| document.get(name))
                    .and_then(Value::as_document);
                let child_path = format!("{path}.{name}");
                Slot::Nested(View::materialize_at(child.clone(), sub, child_path))
            } else {
                let value = source
                    .and_then(|document| document.get(name))
                    .cloned()
                    .unwrap_or(Value::Null);
                Slot::Value(value)
            };
            slots.insert(name.to_owned(), slot);
        }

        tracing::trace!(path = %path, slots = slots.len(), "materialize");
        View { node, path, slots }
    }

    /// The schema node this view was materialized from
    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    /// Current slot content for `name`
    pub fn get(&self, name: &str) -> Result<Entry<'_>, ViewError> {
        match self.slots.get(name) {
            Some(Slot::Value(value)) => Ok(Entry::Value(value)),
            Some(Slot::Nested(view)) => Ok(Entry::Nested(view)),
            None => Err(unknown_property(&self.path, name)),
        }
    }

    /// Current scalar value of `name`
    pub fn value(&self, name: &str) -> Result<&Value, ViewError> {
        match self.slots.get(name) {
            Some(Slot::Value(value)) => Ok(value),
            Some(Slot::Nested(_)) => Err(ViewError::NotScalar {
                path: self.path.clone(),
                name: name.to_owned(),
            }),
            None => Err(unknown_property(&self.path, name)),
        }
    }

    /// The nested view under `name`
    ///
    /// Repeated calls hand out the same view; writes through
    /// [View::nested_mut] are visible to every later read.
    pub fn nested(&self, name: &str) -> Result<&View, ViewError> {
        match self.slots.get(name) {
            Some(Slot::Nested(view)) => Ok(view),
            Some(Slot::Value(_)) => Err(ViewError::NotNested {
                path: self.path.clone(),
                name: name.to_owned(),
            }),
            None => Err(unknown_property(&self.path, name)),
        }
    }

    pub fn nested_mut(&mut self, name: &str) -> Result<&mut View, ViewError> {
        match self.slots.get_mut(name) {
            Some(Slot::Nested(view)) => Ok(view),
            Some(Slot::Value(_)) => Err(ViewError::NotNested {
                path: self.path.clone(),
                name: name.to_owned(),
            }),
            None => Err(unknown_property(&self.path, name)),
        }
    }

    /// Overwrite the scalar slot `name`
    ///
    /// Nested slots cannot be replaced wholesale; mutate them through
    /// [View::nested_mut].
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ViewError> {
        match self.slots.get_mut(name) {
            Some(Slot::Value(slot)) => {
                *slot = value.into();
                Ok(())
            }
            Some(Slot::Nested(_)) => Err(ViewError::NotScalar {
                path: self.path.clone(),
                name: name.to_owned(),
            }),
            None => Err(unknown_property(&self.path, name)),
        }
    }

    /// Read the entry at a path of property names
    ///
    /// An empty path yields this view itself.
    pub fn entry_at(&self, path: &[&str]) -> Result<Entry<'_>, ViewError> {
        match path {
            [] => Ok(Entry::Nested(self)),
            [name] => self.get(name),
            [name, rest @ ..] => self.nested(name)?.entry_at(rest),
        }
    }

    /// Set the scalar at a path of property names
    pub fn set_at(&mut self, path: &[&str], value: impl Into<Value>) -> Result<(), ViewError> {
        match path {
            [] => Err(unknown_property(&self.path, "")),
            [name] => self.set(name, value),
            [name, rest @ ..] => self.nested_mut(name)?.set_at(rest, value),
        }
    }

    /// Run a capability operation declared on this node or inherited from an
    /// ancestor
    pub fn invoke(&self, operation: &str) -> Result<Value, ViewError> {
        self.node
            .capabilities()
            .dispatch(operation, self)
            .ok_or_else(|| ViewError::UnknownOperation {
                name: operation.to_owned(),
            })
    }

    /// Names of the capability bundles visible on this view, most locally
    /// declared first
    pub fn capability_names(&self) -> Vec<&str> {
        self.node.capabilities().names()
    }

    /// The view's current declared content as a standalone document
    ///
    /// Same as a [sync](crate::sync::sync) against an empty document: null
    /// scalars and all-null subtrees are left out.
    pub fn to_document(&self) -> Document {
        crate::sync::sync(self, None)
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.slots.iter().map(|(name, slot)| (name.as_str(), slot))
    }
}

fn unknown_property(path: &str, name: &str) -> ViewError {
    ViewError::UnknownProperty {
        path: path.to_owned(),
        name: name.to_owned(),
    }
}

/// Errors raised by property access on a [View]
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ViewError {
    #[error("unknown property {name:?} at {path}")]
    UnknownProperty { path: String, name: String },
    #[error("property {name:?} at {path} is nested, not a scalar")]
    NotScalar { path: String, name: String },
    #[error("property {name:?} at {path} is a scalar, not nested")]
    NotNested { path: String, name: String },
    #[error("no capability bundle provides operation {name:?}")]
    UnknownOperation { name: String },
}
