//! host record boundary
//!
//! The engine only ever touches one attribute of an externally-owned record:
//! it reads the attribute's document on [load] and writes the merged document
//! back on [store]. Everything else about the host's persistence stays behind
//! [HostAdapter].

use crate::document::{Document, Value};
use crate::schema::Schema;
use crate::sync::sync;
use crate::view::View;
use std::path::{Path, PathBuf};

/// Narrow adapter over a host record's attribute storage
///
/// `read` may legitimately find nothing, which materializes an all-null view.
/// Adapter failures propagate unmodified through [load] and [store].
pub trait HostAdapter {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Current value of `attribute`, if the record holds a document there
    fn read(&self, attribute: &str) -> Result<Option<Document>, Self::Error>;

    /// Overwrite `attribute` with `document`
    fn write(&mut self, attribute: &str, document: Document) -> Result<(), Self::Error>;
}

/// Read `attribute` once and materialize a view of it
pub fn load<H: HostAdapter>(schema: &Schema, host: &H, attribute: &str) -> Result<View, H::Error> {
    let current = host.read(attribute)?;
    Ok(schema.materialize(current.as_ref()))
}

/// Merge `view` into a fresh read of `attribute` and write the result back
///
/// Returns the merged document that was written. Re-reading at store time
/// means values written to the attribute after the view was loaded survive,
/// unless the view overwrites their exact path.
pub fn store<H: HostAdapter>(
    view: &View,
    host: &mut H,
    attribute: &str,
) -> Result<Document, H::Error> {
    let current = host.read(attribute)?;
    let merged = sync(view, current.as_ref());
    tracing::debug!(attribute, keys = merged.len(), "storing merged document");
    host.write(attribute, merged.clone())?;
    Ok(merged)
}

/// In-memory host record, one [Value] per attribute
///
/// Reads hand out clones; the engine never touches the stored values in
/// place.
#[derive(derive_new::new, Debug, Default)]
pub struct MemoryHost {
    #[new(default)]
    attributes: indexmap::IndexMap<String, Value>,
}

impl MemoryHost {
    /// Put any value into an attribute, document or not
    pub fn seed(&mut self, attribute: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(attribute.into(), value.into());
    }

    pub fn attribute(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }
}

impl HostAdapter for MemoryHost {
    type Error = std::convert::Infallible;

    fn read(&self, attribute: &str) -> Result<Option<Document>, Self::Error> {
        Ok(self
            .attributes
            .get(attribute)
            .and_then(Value::as_document)
            .cloned())
    }

    fn write(&mut self, attribute: &str, document: Document) -> Result<(), Self::Error> {
        self.attributes
            .insert(attribute.to_owned(), Value::Document(document));
        Ok(())
    }
}

/// A single json file holding one host record (an object of attributes)
///
/// Writes rewrite the whole file; attributes other than the one written stay
/// as they were.
#[derive(Debug)]
pub struct FileHost {
    path: PathBuf,
    record: Document,
}

impl FileHost {
    /// Load the record file
    pub fn open(file_path: &Path) -> Result<Self, FileHostError> {
        let file_path = file_path.canonicalize()?;
        tracing::info!(path = %file_path.display(), "loading record");

        let contents = std::fs::read_to_string(&file_path)?;
        let parsed: Value = serde_json::from_str(&contents)?;
        let Value::Document(record) = parsed else {
            return Err(FileHostError::NotARecord {
                found: parsed.type_name(),
            });
        };

        Ok(Self {
            path: file_path,
            record,
        })
    }

    pub fn record(&self) -> &Document {
        &self.record
    }

    fn persist(&self) -> Result<(), FileHostError> {
        tracing::debug!(path = %self.path.display(), "writing record");
        let mut contents = serde_json::to_string_pretty(&self.record)?;
        contents.push('\n');
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl HostAdapter for FileHost {
    type Error = FileHostError;

    fn read(&self, attribute: &str) -> Result<Option<Document>, Self::Error> {
        Ok(self
            .record
            .get(attribute)
            .and_then(Value::as_document)
            .cloned())
    }

    fn write(&mut self, attribute: &str, document: Document) -> Result<(), Self::Error> {
        self.record.insert(attribute, document);
        self.persist()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FileHostError {
    #[error("IO error")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse record file")]
    Json(#[from] serde_json::Error),
    #[error("Record file must hold an object, found {found}")]
    NotARecord { found: &'static str },
}
