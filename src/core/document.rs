//! Document traits and the common persisted fields shared by every collection

use mongodb::bson::DateTime;
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Fields persisted on every document, regardless of resource type.
///
/// Concrete models embed this with `#[serde(flatten)]` so the fields live at
/// the top level of the stored document:
///
/// ```rust,ignore
/// #[derive(Serialize, Deserialize)]
/// struct Product {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<ObjectId>,
///     name: String,
///     #[serde(flatten)]
///     audit: AuditFields,
/// }
/// ```
///
/// `deleted_at` is the single source of truth for visibility: `None` means
/// live, any timestamp means soft-deleted. The repository's read paths filter
/// on it; nothing ever physically removes a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Business-level activity flag. Defaults to true; the repository itself
    /// never filters on it.
    #[serde(default = "AuditFields::default_active")]
    pub is_active: bool,

    /// Identifier of the creating principal, if any.
    #[serde(default)]
    pub created_by: Option<ObjectId>,

    /// Soft-delete marker. `None` = live.
    #[serde(default)]
    pub deleted_at: Option<DateTime>,

    /// Set by the storage layer on insert.
    #[serde(default = "DateTime::now")]
    pub created_at: DateTime,

    /// Maintained by the storage layer on every write.
    #[serde(default = "DateTime::now")]
    pub updated_at: DateTime,
}

impl AuditFields {
    /// Fresh audit fields for a new, live document.
    pub fn new() -> Self {
        let now = DateTime::now();
        Self {
            is_active: true,
            created_by: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Audit fields attributed to the creating principal.
    pub fn created_by(principal: ObjectId) -> Self {
        Self {
            created_by: Some(principal),
            ..Self::new()
        }
    }

    fn default_active() -> bool {
        true
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::new()
    }
}

/// Binds a domain type to its MongoDB collection.
///
/// The serde bounds let [`Repository`](crate::storage::Repository) move
/// values through BSON in both directions; `Unpin` is required by the
/// driver's typed cursors.
pub trait Model: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Collection name, e.g. `"products"`.
    const COLLECTION: &'static str;

    /// The store-assigned identifier. `None` until the document is inserted;
    /// immutable afterwards.
    fn id(&self) -> Option<ObjectId>;

    /// The common persisted fields.
    fn audit(&self) -> &AuditFields;

    /// Whether the document has been soft-deleted.
    fn is_deleted(&self) -> bool {
        self.audit().deleted_at.is_some()
    }
}
