//! schema composition and the frozen property tree
//!
//! [Schema::compose] runs a composition block against a [Composer], collecting
//! property declarations and problems, then freezes the result into an
//! immutable tree of [Node]s. A frozen schema is cheap to clone and safe to
//! share across threads; every [View](crate::view::View) materialized from it
//! reads the same tree.

use crate::capability::{Capability, CapabilitySet};
use crate::document::{Document, Value};
use std::sync::Arc;

/// One frozen property in a schema tree
///
/// A node is either a scalar (no children) or nested. Property names live in
/// the parent's child map, which makes the root node shaped like any other
/// nested node.
#[derive(Debug)]
pub struct Node {
    nested: Option<indexmap::IndexMap<String, Arc<Node>>>,
    capabilities: CapabilitySet,
}

impl Node {
    pub fn is_nested(&self) -> bool {
        self.nested.is_some()
    }

    /// Child nodes in declaration order; empty for scalars
    pub fn children(&self) -> impl Iterator<Item = (&str, &Arc<Node>)> {
        self.nested
            .iter()
            .flat_map(|children| children.iter())
            .map(|(name, node)| (name.as_str(), node))
    }

    pub fn child(&self, name: &str) -> Option<&Arc<Node>> {
        self.nested.as_ref().and_then(|children| children.get(name))
    }

    /// The effective capability set, inherited entries included
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }
}

/// A frozen, shareable schema
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<Node>,
}

impl Schema {
    /// Compose and freeze a schema
    ///
    /// The block declares properties top-down. Problems do not abort the
    /// block; they are collected and returned together once it finishes.
    ///
    /// ```
    /// use veneer::schema::Schema;
    ///
    /// let schema = Schema::compose(|root| {
    ///     root.scalar("title");
    ///     root.nested("band", |band| {
    ///         band.scalar("name");
    ///     });
    /// })
    /// .unwrap();
    ///
    /// assert!(schema.root().child("band").unwrap().is_nested());
    /// ```
    pub fn compose(build: impl FnOnce(&mut Composer)) -> Result<Schema, ComposeErrors> {
        let mut composer = Composer::at(Vec::new());
        build(&mut composer);
        composer.freeze_root()
    }

    pub fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Build a schema from an outline value
    ///
    /// An outline mirrors the document shape it declares: a document declares
    /// a nested property per key and a `null` leaf declares a scalar. Any
    /// other leaf is a problem.
    ///
    /// ```
    /// use veneer::document;
    /// use veneer::document::Value;
    /// use veneer::schema::Schema;
    ///
    /// let outline = Value::Document(document! {
    ///     "title" => Value::Null,
    ///     "band" => document! { "name" => Value::Null },
    /// });
    ///
    /// let schema = Schema::from_outline(&outline).unwrap();
    /// assert!(schema.root().child("band").unwrap().is_nested());
    /// ```
    pub fn from_outline(outline: &Value) -> Result<Schema, ComposeErrors> {
        let Value::Document(properties) = outline else {
            let mut errors = ComposeErrors::new();
            errors.log(Issue::OutlineLeaf {
                path: Vec::new(),
                found: outline.type_name(),
            });
            return Err(errors);
        };

        Schema::compose(|root| outline_level(root, properties))
    }
}

fn outline_level(composer: &mut Composer, properties: &Document) {
    for (name, value) in properties.iter() {
        match value {
            Value::Null => composer.scalar(name),
            Value::Document(children) => {
                composer.nested(name, |child| outline_level(child, children))
            }
            other => {
                let mut path = composer.path.clone();
                path.push(name.to_owned());
                composer.errors.log(Issue::OutlineLeaf {
                    path,
                    found: other.type_name(),
                });
            }
        }
    }
}

/// Mutable composition context for one nesting level
pub struct Composer {
    path: Vec<String>,
    children: Vec<(String, Draft)>,
    features: Vec<Arc<dyn Capability>>,
    errors: ComposeErrors,
}

enum Draft {
    Scalar,
    Nested(Composer),
    Embedded(Schema),
}

impl Composer {
    fn at(path: Vec<String>) -> Self {
        Self {
            path,
            children: Vec::new(),
            features: Vec::new(),
            errors: ComposeErrors::new(),
        }
    }

    /// Declare a scalar property
    pub fn scalar(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.reject(&name) {
            return;
        }
        self.children.push((name, Draft::Scalar));
    }

    /// Declare a nested property with its own composition block
    pub fn nested(&mut self, name: impl Into<String>, build: impl FnOnce(&mut Composer)) {
        let name = name.into();
        if self.reject(&name) {
            return;
        }

        let mut child_path = self.path.clone();
        child_path.push(name.clone());

        let mut child = Composer::at(child_path);
        build(&mut child);

        self.errors.absorb(&mut child.errors);
        self.children.push((name, Draft::Nested(child)));
    }

    /// Declare a capability bundle on this level
    ///
    /// The bundle reaches this node and everything nested under it, wherever
    /// the call sits relative to the property declarations.
    pub fn feature(&mut self, capability: Arc<dyn Capability>) {
        self.features.push(capability);
    }

    /// Attach an independently composed schema as a nested property
    ///
    /// The attached tree picks up this level's capability bundles underneath
    /// its own; the source schema and its other attachment sites are
    /// unaffected.
    pub fn embed(&mut self, name: impl Into<String>, schema: &Schema) {
        let name = name.into();
        if self.reject(&name) {
            return;
        }
        self.children.push((name, Draft::Embedded(schema.clone())));
    }

    fn reject(&mut self, name: &str) -> bool {
        if name.is_empty() {
            self.errors.log(Issue::EmptyPropertyName {
                path: self.path.clone(),
            });
            return true;
        }

        if self.children.iter().any(|(existing, _)| existing == name) {
            tracing::debug!(path = ?self.path, name, "collision");
            self.errors.log(Issue::DuplicateProperty {
                path: self.path.clone(),
                name: name.to_owned(),
            });
            return true;
        }

        false
    }

    fn freeze_root(self) -> Result<Schema, ComposeErrors> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let root = self.freeze(&CapabilitySet::default());
        Ok(Schema { root })
    }

    fn freeze(self, inherited: &CapabilitySet) -> Arc<Node> {
        let mut capabilities = inherited.clone();
        for feature in self.features {
            capabilities.layer(feature);
        }

        let mut children = indexmap::IndexMap::with_capacity(self.children.len());
        for (name, draft) in self.children {
            let node = match draft {
                Draft::Scalar => Arc::new(Node {
                    nested: None,
                    capabilities: capabilities.clone(),
                }),
                Draft::Nested(child) => child.freeze(&capabilities),
                Draft::Embedded(schema) => graft(schema.root(), &capabilities),
            };
            tracing::trace!(name = %name, nested = node.is_nested(), "freeze property");
            children.insert(name, node);
        }

        Arc::new(Node {
            nested: Some(children),
            capabilities,
        })
    }
}

/// Rebuild an attached subtree with `inherited` layered under every node's own
/// capability set
///
/// Shares the subtree untouched when there is nothing to layer.
fn graft(node: &Arc<Node>, inherited: &CapabilitySet) -> Arc<Node> {
    if inherited.is_empty() {
        return node.clone();
    }

    let mut capabilities = node.capabilities.clone();
    capabilities.layer_under(inherited);

    let nested = node.nested.as_ref().map(|children| {
        children
            .iter()
            .map(|(name, child)| (name.clone(), graft(child, inherited)))
            .collect()
    });

    Arc::new(Node {
        nested,
        capabilities,
    })
}

/// A single problem found while composing a schema
#[derive(Debug, PartialEq)]
pub enum Issue {
    /// Two sibling properties share a name
    DuplicateProperty { path: Vec<String>, name: String },
    /// A property was declared with an empty name
    EmptyPropertyName { path: Vec<String> },
    /// An outline leaf that is neither null nor a document
    OutlineLeaf {
        path: Vec<String>,
        found: &'static str,
    },
}

/// One or more problems found while composing a schema
#[derive(derive_new::new, Debug)]
pub struct ComposeErrors {
    #[new(default)]
    issues: Vec<Issue>,
}

impl ComposeErrors {
    pub(crate) fn log(&mut self, issue: Issue) {
        tracing::trace!(?issue, "issue found");
        self.issues.push(issue);
    }

    fn absorb(&mut self, other: &mut ComposeErrors) {
        self.issues.append(&mut other.issues);
    }

    fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl std::error::Error for ComposeErrors {}

impl std::fmt::Display for ComposeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Debug;
        self.issues.first().unwrap().fmt(f)?;
        if self.issues.len() > 1 {
            write!(f, " (+{} more)", self.issues.len() - 1)?;
        }
        Ok(())
    }
}
