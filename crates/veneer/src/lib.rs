//! # veneer - schema-mapped views over nested document attributes
//!
//! A host record (a database row, a json file, an in-memory map) keeps a
//! semi-structured document in one of its attributes. `veneer` overlays a
//! declared property tree on that document: callers materialize a mutable
//! [View](view::View), read and write the declared properties, and sync the
//! result back without disturbing anything the schema never declared.
//!
//! ## Introduction for developers
//!
//! The engine is a small pipeline. A [Schema](schema::Schema) is composed
//! once and frozen, a [View](view::View) is materialized per host read, and
//! [sync](sync::sync) produces the document to write back.
//!
//! ### The document model
//!
//! [Document](document::Document) is an order-preserving string-keyed map of
//! [Value](document::Value)s (null, boolean, integer, decimal, string, array,
//! document). It is what a host attribute holds on the wire, and the
//! [document!] macro builds them inline:
//!
//! ```
//! use veneer::document;
//!
//! let stored = document! {
//!     "title" => "Corduroy",
//!     "band" => document! { "name" => "Pearl Jam" },
//! };
//! ```
//!
//! ### Composing schemas
//!
//! [Schema::compose](schema::Schema::compose) runs a block of declarations
//! against a [Composer](schema::Composer). Properties are scalars or nested
//! blocks; an independently composed schema can be attached with
//! [embed](schema::Composer::embed), and
//! [feature](schema::Composer::feature) declares a
//! [Capability](capability::Capability) bundle that this level and everything
//! nested under it can invoke. Problems (duplicate siblings, empty names) do
//! not abort composition; they come back collected in
//! [ComposeErrors](schema::ComposeErrors).
//!
//! The frozen schema is immutable and `Arc`-shared, so one schema instance
//! serves any number of views on any number of threads.
//!
//! ### Materialized views
//!
//! [materialize](schema::Schema::materialize) captures the declared slice of
//! a source document eagerly. Declared keys the source lacks come up as null,
//! nested blocks come up as nested views, and source keys the schema does not
//! declare are simply not part of the view. The source is never mutated and
//! the view never holds a reference into it.
//!
//! ### Syncing back
//!
//! [sync](sync::sync) merges a view into the current attribute value instead
//! of replacing it: populated scalars overwrite their key, null scalars write
//! nothing and erase nothing, all-null subtrees are left out entirely, and
//! undeclared keys pass through untouched at every level.
//!
//! ```
//! use veneer::document;
//! use veneer::schema::Schema;
//!
//! let schema = Schema::compose(|root| {
//!     root.scalar("title");
//!     root.nested("band", |band| {
//!         band.scalar("name");
//!         band.nested("label", |label| {
//!             label.scalar("location");
//!         });
//!     });
//! })?;
//!
//! // the attribute as last stored, carrying a key the schema never declared
//! let stored = document! { "artist" => document! { "name" => "Eddie" } };
//!
//! let mut view = schema.materialize(Some(&stored));
//! view.set_at(&["band", "label", "location"], "San Francisco")?;
//!
//! let merged = veneer::sync::sync(&view, Some(&stored));
//!
//! // the undeclared key survives, and only the populated path is written
//! assert!(merged.contains_key("artist"));
//! let band = merged.get("band").unwrap().as_document().unwrap();
//! assert_eq!(band.keys().collect::<Vec<_>>(), vec!["label"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ### Host adapters
//!
//! [HostAdapter](host::HostAdapter) is the narrow seam to the record's
//! storage: read one attribute, write one attribute.
//! [load](host::load) and [store](host::store) wire the pipeline to it, with
//! store re-reading the attribute so concurrent writes to paths the view did
//! not touch survive. [MemoryHost](host::MemoryHost) backs tests and
//! [FileHost](host::FileHost) backs the command line tool.

pub mod capability;
pub mod document;
pub mod host;
pub mod schema;
pub mod sync;
pub mod view;
