//! write-back merges
//!
//! [sync] folds a [View]'s current values into the document the caller is
//! about to store, leaving everything the schema does not declare exactly
//! where it was.

use crate::document::{Document, Value};
use crate::view::{Slot, View};

/// Produce the document to write back for `view`
///
/// Starts from `current` (the host attribute's value at sync time, usually a
/// fresh read) and overwrites exactly the declared, populated paths:
///
/// - a scalar slot holding a value replaces or inserts its key
/// - a scalar slot holding null writes nothing and erases nothing
/// - a nested slot merges recursively against the existing sub-document and
///   is only written when the merged result is non-empty
/// - undeclared keys in `current` pass through untouched, at every level
///
/// The merge is pure: neither `view` nor `current` is modified, and the same
/// inputs always produce the same output, key order included.
pub fn sync(view: &View, current: Option<&Document>) -> Document {
    let mut merged = current.cloned().unwrap_or_default();

    for (name, slot) in view.slots() {
        match slot {
            Slot::Value(Value::Null) => {}
            Slot::Value(value) => {
                merged.insert(name, value.clone());
            }
            Slot::Nested(nested) => {
                let existing = current
                    .and_then(|document| document.get(name))
                    .and_then(Value::as_document);
                let sub = sync(nested, existing);
                if !sub.is_empty() {
                    merged.insert(name, sub);
                }
            }
        }
    }

    tracing::trace!(keys = merged.len(), "merged level");
    merged
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document;
    use crate::schema::Schema;
    use pretty_assertions::assert_eq;

    fn band_schema() -> Schema {
        Schema::compose(|root| {
            root.scalar("title");
            root.nested("band", |band| {
                band.scalar("name");
            });
        })
        .unwrap()
    }

    #[test]
    fn null_slots_never_erase_stored_values() {
        let stored = document! { "title" => "Corduroy" };

        let mut view = band_schema().materialize(None);
        view.set("title", Value::Null).unwrap();

        assert_eq!(sync(&view, Some(&stored)), stored);
    }

    #[test]
    fn all_null_subtrees_are_not_written() {
        let view = band_schema().materialize(None);

        assert_eq!(sync(&view, None), document! {});
    }

    #[test]
    fn a_stored_scalar_under_a_nested_name_is_replaced() {
        // "band" holds a string in the store; the declared subtree wins
        let stored = document! { "band" => "not a document" };

        let mut view = band_schema().materialize(Some(&stored));
        view.nested_mut("band").unwrap().set("name", "Low").unwrap();

        assert_eq!(
            sync(&view, Some(&stored)),
            document! { "band" => document! { "name" => "Low" } }
        );
    }

    #[test]
    fn undeclared_keys_survive_at_every_level() {
        let stored = document! {
            "plays" => 42,
            "band" => document! {
                "founded" => 1990,
                "name" => "Pearl Jam",
            },
        };

        let mut view = band_schema().materialize(Some(&stored));
        view.set("title", "Corduroy").unwrap();

        assert_eq!(
            sync(&view, Some(&stored)),
            document! {
                "plays" => 42,
                "band" => document! {
                    "founded" => 1990,
                    "name" => "Pearl Jam",
                },
                "title" => "Corduroy",
            }
        );
    }

    #[test]
    fn merged_keys_keep_the_stored_order() {
        let stored = document! { "title" => "Old", "plays" => 1 };

        let mut view = band_schema().materialize(Some(&stored));
        view.set("title", "New").unwrap();

        let merged = sync(&view, Some(&stored));
        let keys: Vec<_> = merged.keys().collect();
        assert_eq!(keys, vec!["title", "plays"]);
    }
}
