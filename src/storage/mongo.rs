//! Generic MongoDB repository with soft delete, pagination and search.
//!
//! `Repository<T>` is the single access layer every resource service is
//! built on. It owns three guarantees:
//!
//! - **Soft delete**: every read path filters `deleted_at == null` through
//!   the `scoped` builder; "delete" only ever stamps a timestamp.
//! - **Consistent pagination**: the two-query strategy
//!   ([`find_all_by_query`](Repository::find_all_by_query)) and the
//!   single-pass `$facet` strategies
//!   ([`find_by_paginate`](Repository::find_by_paginate),
//!   [`find_with_options`](Repository::find_with_options)) all derive their
//!   page metadata from [`PageInfo::compute`], so the wire shape cannot
//!   drift between code paths.
//! - **Filter-honoring mutations**: update/remove helpers apply exactly the
//!   caller-supplied filter in one atomic document operation. Ownership
//!   scoping is therefore the caller's filter, not a separate read.
//!
//! Timestamps are maintained here: inserts stamp `created_at`/`updated_at`,
//! and every update merges `$currentDate: { updated_at: true }` via
//! `normalize_update` unless the patch already touches the field.

use crate::core::document::Model;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::query::{PageInfo, Paged, Paginate, Sort};
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, DateTime, Document, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

// ---------------------------------------------------------------------------
// Query builders
// ---------------------------------------------------------------------------

/// Whether a query may see soft-deleted documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only live documents (`deleted_at == null`). The default for every
    /// read path.
    Live,
    /// No liveness predicate. Used for counts explicitly requested
    /// "including deleted".
    All,
}

/// Scope a caller-supplied filter to the requested visibility.
///
/// `Live` ANDs `deleted_at: null` onto the filter, overriding any
/// caller-supplied `deleted_at` key, so no call site can accidentally read
/// soft-deleted documents.
pub(crate) fn scoped(mut filter: Document, visibility: Visibility) -> Document {
    match visibility {
        Visibility::Live => {
            filter.insert("deleted_at", Bson::Null);
        }
        Visibility::All => {}
    }
    filter
}

/// Filter matching only soft-deleted documents.
fn deleted_filter() -> Document {
    doc! { "deleted_at": { "$ne": null } }
}

/// Build the OR-of-substring-matches predicate used by free-text search.
///
/// Each `(field, value)` pair becomes a case-insensitive `$regex` clause
/// matching `value` anywhere in the field. Values are escaped first, so
/// pattern metacharacters in user input match literally.
pub fn search_filter(fields: &[(&str, &str)]) -> Document {
    let clauses: Vec<Document> = fields
        .iter()
        .map(|(field, value)| {
            let mut clause = Document::new();
            clause.insert(
                *field,
                doc! { "$regex": regex::escape(value), "$options": "si" },
            );
            clause
        })
        .collect();

    doc! { "$or": clauses }
}

/// Normalize a caller-supplied update document.
///
/// A patch without update operators is wrapped in `$set`. Unless the patch
/// already touches `updated_at`, `$currentDate: { updated_at: true }` is
/// merged in so the update timestamp is maintained on every write path.
pub(crate) fn normalize_update(patch: Document) -> Document {
    let mut update = if patch.keys().any(|k| k.starts_with('$')) {
        patch
    } else {
        doc! { "$set": patch }
    };

    if !touches_field(&update, "updated_at") {
        if let Some(Bson::Document(dates)) = update.get_mut("$currentDate") {
            dates.insert("updated_at", true);
        } else {
            update.insert("$currentDate", doc! { "updated_at": true });
        }
    }

    update
}

fn touches_field(update: &Document, field: &str) -> bool {
    update.iter().any(|(op, operand)| {
        op.starts_with('$') && matches!(operand, Bson::Document(d) if d.contains_key(field))
    })
}

/// Coerce boolean-like `is_active` filter tokens into a proper boolean.
///
/// Query-string filters arrive with `"true"`/`"false"` strings or `1`/`0`
/// numbers; stored documents hold booleans. Unrecognized values pass
/// through untouched.
pub(crate) fn normalize_is_active(filter: &mut Document) {
    let normalized = match filter.get("is_active") {
        Some(Bson::String(s)) if s == "true" => Some(true),
        Some(Bson::String(s)) if s == "false" => Some(false),
        Some(Bson::Int32(1)) | Some(Bson::Int64(1)) => Some(true),
        Some(Bson::Int32(0)) | Some(Bson::Int64(0)) => Some(false),
        _ => None,
    };

    if let Some(value) = normalized {
        filter.insert("is_active", value);
    }
}

/// Build the single-pass listing pipeline: one `$match`, then a `$facet`
/// with a count branch and a sorted/skipped/limited data branch. Extra
/// caller stages (e.g. `$lookup` joins) run after `$limit`, on page-sized
/// input.
pub(crate) fn facet_pipeline(
    filter: Document,
    page: i64,
    limit: i64,
    sort: Document,
    extra_stages: &[Document],
) -> Vec<Document> {
    let mut data_stages = vec![
        doc! { "$sort": sort },
        doc! { "$skip": limit * (page - 1) },
        doc! { "$limit": limit },
    ];
    data_stages.extend(extra_stages.iter().cloned());

    vec![
        doc! { "$match": filter },
        doc! {
            "$facet": {
                "page": [ { "$count": "totalIndex" } ],
                "data": data_stages,
            }
        },
    ]
}

fn bson_to_i64(value: &Bson) -> Option<i64> {
    match value {
        Bson::Int32(v) => Some(i64::from(*v)),
        Bson::Int64(v) => Some(*v),
        Bson::Double(v) => Some(*v as i64),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Repository<T>
// ---------------------------------------------------------------------------

/// Options for [`Repository::find_with_options`].
#[derive(Debug, Default)]
pub struct ListOptions {
    pub filter: Document,
    pub paginate: Paginate,
    pub sort: Option<Sort>,
    pub extra_stages: Vec<Document>,
}

/// Generic access layer over one document collection.
///
/// Resource services hold one of these by value (the collection handle is
/// cheaply cloneable) and expose the subset of operations they need as thin
/// delegating methods.
#[derive(Clone, Debug)]
pub struct Repository<T: Send + Sync> {
    collection: Collection<T>,
}

impl<T: Model> Repository<T> {
    /// Bind the repository to `T`'s collection in the given database.
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(T::COLLECTION),
        }
    }

    /// The underlying typed collection.
    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    /// Same collection, viewed as raw documents. Used where the repository
    /// stamps fields below the typed model (timestamps at insert).
    fn raw(&self) -> Collection<Document> {
        self.collection.clone_with_type()
    }

    /// Insert one document and return the stored version, including the
    /// store-assigned identifier and timestamps.
    ///
    /// No uniqueness or validation is enforced here; constraint violations
    /// from the store propagate as write failures.
    pub async fn create(&self, model: &T) -> CatalogResult<T> {
        let mut document = mongodb::bson::to_document(model)?;
        let now = DateTime::now();
        document.insert("created_at", now);
        document.insert("updated_at", now);

        let raw = self.raw();
        let inserted = raw.insert_one(&document).await?;
        let stored = raw
            .find_one(doc! { "_id": inserted.inserted_id })
            .await?
            .ok_or_else(|| CatalogError::Internal("document missing after insert".into()))?;

        Ok(mongodb::bson::from_document(stored)?)
    }

    /// Bulk insert. Returns the stored documents in input order.
    ///
    /// The insert is ordered: an error on any item fails the whole call with
    /// no partial-success reporting. Known limitation of this operation.
    pub async fn create_many(&self, models: &[T]) -> CatalogResult<Vec<T>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let now = DateTime::now();
        let mut documents = Vec::with_capacity(models.len());
        for model in models {
            let mut document = mongodb::bson::to_document(model)?;
            document.insert("created_at", now);
            document.insert("updated_at", now);
            documents.push(document);
        }

        let result = self.raw().insert_many(&documents).await?;

        let mut stored = Vec::with_capacity(documents.len());
        for (index, mut document) in documents.into_iter().enumerate() {
            if let Some(id) = result.inserted_ids.get(&index) {
                document.insert("_id", id.clone());
            }
            stored.push(mongodb::bson::from_document(document)?);
        }
        Ok(stored)
    }

    /// Fetch the live document with this identifier.
    ///
    /// Returns `Ok(None)` when missing or soft-deleted; callers decide
    /// whether absence is an error.
    pub async fn find_one_by_id(&self, id: ObjectId) -> CatalogResult<Option<T>> {
        self.find_one_by_query(doc! { "_id": id }).await
    }

    /// Fetch one live document matching an arbitrary filter.
    ///
    /// The soft-delete exclusion is always ANDed on, so this path can never
    /// observe deleted documents.
    pub async fn find_one_by_query(&self, filter: Document) -> CatalogResult<Option<T>> {
        Ok(self
            .collection
            .find_one(scoped(filter, Visibility::Live))
            .await?)
    }

    /// The two-query listing strategy: a count and a data fetch issued
    /// concurrently, metadata derived from the count.
    ///
    /// With an empty filter the count is the cheap collection estimate minus
    /// an exact count of soft-deleted documents; a non-empty filter forces
    /// an exact filtered count. Data is ranked by descending identifier.
    pub async fn find_all_by_query(
        &self,
        filter: Document,
        paginate: &Paginate,
    ) -> CatalogResult<Paged<T>> {
        let page = paginate.page();
        let limit = paginate.limit();

        let data_filter = scoped(filter.clone(), Visibility::Live);
        let data_fut = async {
            let cursor = self
                .collection
                .find(data_filter)
                .sort(doc! { "_id": -1 })
                .skip((limit * (page - 1)) as u64)
                .limit(limit)
                .await?;
            Ok::<_, CatalogError>(cursor.try_collect::<Vec<T>>().await?)
        };

        let (data, total_live) = if filter.is_empty() {
            let estimate_fut = async {
                Ok::<_, CatalogError>(self.collection.estimated_document_count().await?)
            };
            let deleted_fut = async {
                Ok::<_, CatalogError>(self.collection.count_documents(deleted_filter()).await?)
            };
            let (data, estimated, deleted) = tokio::try_join!(data_fut, estimate_fut, deleted_fut)?;
            (data, estimated as i64 - deleted as i64)
        } else {
            let count_fut = async {
                Ok::<_, CatalogError>(
                    self.collection
                        .count_documents(scoped(filter, Visibility::Live))
                        .await?,
                )
            };
            let (data, total) = tokio::try_join!(data_fut, count_fut)?;
            (data, total as i64)
        };

        Ok(Paged {
            page: PageInfo::compute(total_live, page, limit, "_id", -1),
            data,
        })
    }

    /// The single-pass listing strategy: one aggregation round trip whose
    /// `$facet` produces the matched count and the data page together.
    ///
    /// `extra_stages` continue the data branch after `$limit` — the place
    /// for `$lookup` joins to related collections. Prefer this over
    /// [`find_all_by_query`](Self::find_all_by_query) when joins are needed.
    pub async fn find_by_paginate(
        &self,
        filter: Document,
        paginate: &Paginate,
        extra_stages: Vec<Document>,
    ) -> CatalogResult<Paged<T>> {
        let page = paginate.page();
        let limit = paginate.limit();
        self.run_facet(
            scoped(filter, Visibility::Live),
            page,
            limit,
            doc! { "_id": -1 },
            "_id",
            -1,
            extra_stages,
        )
        .await
    }

    /// Single-pass listing with a caller-specified sort.
    ///
    /// `sort_order` must be `1` or `-1`; anything else fails as a bad
    /// request before any query is issued. Boolean-like `is_active` filter
    /// tokens are normalized first.
    pub async fn find_with_options(&self, options: ListOptions) -> CatalogResult<Paged<T>> {
        let ListOptions {
            mut filter,
            paginate,
            sort,
            extra_stages,
        } = options;
        let page = paginate.page();
        let limit = paginate.limit();

        normalize_is_active(&mut filter);

        let (sort_doc, sort_by, sort_order) = match sort {
            Some(Sort { sort_by, sort_order }) => {
                if sort_order != 1 && sort_order != -1 {
                    return Err(CatalogError::bad_request("sortOrder must be 1 or -1"));
                }
                let mut sort_doc = Document::new();
                sort_doc.insert(sort_by.as_str(), sort_order);
                (sort_doc, sort_by, sort_order)
            }
            None => (doc! { "_id": -1 }, "_id".to_string(), -1),
        };

        self.run_facet(
            scoped(filter, Visibility::Live),
            page,
            limit,
            sort_doc,
            &sort_by,
            sort_order,
            extra_stages,
        )
        .await
    }

    /// Free-text search: case-insensitive substring match across the given
    /// `(field, value)` pairs, OR-combined, soft-delete excluded, paginated
    /// by the two-query strategy.
    pub async fn search_by_any_character(
        &self,
        fields: &[(&str, &str)],
        paginate: &Paginate,
    ) -> CatalogResult<Paged<T>> {
        if fields.is_empty() {
            // An empty $or is rejected server-side; fail early instead.
            return Err(CatalogError::bad_request(
                "search requires at least one field",
            ));
        }
        self.find_all_by_query(search_filter(fields), paginate).await
    }

    /// Apply a patch to the document with this identifier and return the
    /// updated document.
    ///
    /// No soft-delete filter is applied: updates may target soft-deleted
    /// rows by id. Zero matched documents is a [`CatalogError::WriteFailed`]
    /// — deliberately asymmetric with
    /// [`update_by_query`](Self::update_by_query).
    pub async fn update_by_id(&self, id: ObjectId, patch: Document) -> CatalogResult<T> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "_id": id }, normalize_update(patch))
            .return_document(ReturnDocument::After)
            .await?;

        updated.ok_or_else(|| CatalogError::WriteFailed {
            collection: T::COLLECTION,
            detail: format!("no document matched id {id}"),
        })
    }

    /// Apply a patch to the first document matching the filter.
    ///
    /// Returns `Ok(None)` when nothing matched — no error is raised. This
    /// asymmetry with [`update_by_id`](Self::update_by_id) is part of the
    /// documented contract.
    pub async fn update_by_query(
        &self,
        filter: Document,
        patch: Document,
    ) -> CatalogResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(filter, normalize_update(patch))
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Soft-delete the live document with this identifier.
    ///
    /// ANDs `deleted_at == null` into the filter, so deleting an
    /// already-deleted document is a no-op returning `Ok(None)` — the call
    /// is idempotent.
    pub async fn remove_by_id(&self, id: ObjectId) -> CatalogResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(
                scoped(doc! { "_id": id }, Visibility::Live),
                normalize_update(doc! { "$set": { "deleted_at": DateTime::now() } }),
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Soft-delete every live document matching the filter. Returns the
    /// number of documents marked.
    pub async fn remove_by_query(&self, filter: Document) -> CatalogResult<u64> {
        let result = self
            .collection
            .update_many(
                scoped(filter, Visibility::Live),
                normalize_update(doc! { "$set": { "deleted_at": DateTime::now() } }),
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Append an element to an array field on the document matching the
    /// filter; `Ok(None)` when nothing matched.
    pub async fn push_item_by_query(
        &self,
        filter: Document,
        item: Document,
    ) -> CatalogResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(filter, normalize_update(doc! { "$push": item }))
            .return_document(ReturnDocument::After)
            .await?)
    }

    /// Remove matching elements from an array field on the document matching
    /// the filter; `Ok(None)` when nothing matched.
    pub async fn pull_item_by_query(
        &self,
        filter: Document,
        item: Document,
    ) -> CatalogResult<Option<T>> {
        Ok(self
            .collection
            .find_one_and_update(filter, normalize_update(doc! { "$pull": item }))
            .return_document(ReturnDocument::After)
            .await?)
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_facet(
        &self,
        match_filter: Document,
        page: i64,
        limit: i64,
        sort: Document,
        sort_by: &str,
        sort_order: i32,
        extra_stages: Vec<Document>,
    ) -> CatalogResult<Paged<T>> {
        let pipeline = facet_pipeline(match_filter, page, limit, sort, &extra_stages);

        let mut cursor = self.collection.aggregate(pipeline).await?;
        let root = cursor.try_next().await?.unwrap_or_default();

        let total_index = root
            .get_array("page")
            .ok()
            .and_then(|branch| branch.first())
            .and_then(Bson::as_document)
            .and_then(|d| d.get("totalIndex"))
            .and_then(bson_to_i64)
            .unwrap_or(0);

        let mut data = Vec::new();
        if let Ok(rows) = root.get_array("data") {
            for row in rows {
                let document = row.as_document().ok_or_else(|| {
                    CatalogError::Internal("facet data branch yielded a non-document".into())
                })?;
                data.push(mongodb::bson::from_document(document.clone())?);
            }
        }

        Ok(Paged {
            page: PageInfo::compute(total_index, page, limit, sort_by, sort_order),
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
