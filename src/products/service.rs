//! Product business logic over the generic repository
//!
//! The service composes a [`Repository<Product>`] and adds the
//! product-specific rules: slug generation, owner stamping, and
//! ownership-scoped mutations. Ownership is enforced as part of the update
//! filter itself (`{_id, user_id}`), so the check and the write are one
//! atomic document operation.

use crate::core::auth::AuthUser;
use crate::core::error::{CatalogError, CatalogResult};
use crate::core::query::Paged;
use crate::core::strings::generate_slug;
use crate::products::model::{CreateProduct, Product, ProductQuery, UpdateProduct};
use crate::storage::Repository;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;

/// Fields searched when a free-text term is supplied.
const SEARCH_FIELDS: [&str; 3] = ["name", "slug", "description"];

#[derive(Clone)]
pub struct ProductService {
    repository: Repository<Product>,
}

impl ProductService {
    pub fn new(repository: Repository<Product>) -> Self {
        Self { repository }
    }

    /// Create a product owned by the acting user. The slug is derived from
    /// the name; uniqueness is not enforced at this layer.
    pub async fn create_product(
        &self,
        user: &AuthUser,
        input: CreateProduct,
    ) -> CatalogResult<Product> {
        let slug = generate_slug(&input.name);
        let product = Product::new(input, slug, user.id);
        self.repository.create(&product).await
    }

    /// List products: free-text search over name/slug/description when a
    /// term is present, otherwise the unfiltered paginated listing.
    pub async fn find_all(&self, query: &ProductQuery) -> CatalogResult<Paged<Product>> {
        let paginate = query.paginate();

        match query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
        {
            Some(term) => {
                let fields: Vec<(&str, &str)> =
                    SEARCH_FIELDS.iter().map(|field| (*field, term)).collect();
                self.repository
                    .search_by_any_character(&fields, &paginate)
                    .await
            }
            None => self.repository.find_all_by_query(doc! {}, &paginate).await,
        }
    }

    /// Fetch one live product; absence is a `NotFound`.
    pub async fn find_one(&self, id: ObjectId) -> CatalogResult<Product> {
        self.repository
            .find_one_by_id(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", id.to_hex()))
    }

    /// Ownership-scoped update. Only a product owned by the acting user is
    /// touched; a name change regenerates the slug.
    pub async fn update_product_by_id(
        &self,
        user: &AuthUser,
        id: ObjectId,
        patch: UpdateProduct,
    ) -> CatalogResult<Product> {
        let mut patch_doc = mongodb::bson::to_document(&patch)?;
        if patch_doc.is_empty() {
            return Err(CatalogError::bad_request("no fields to update"));
        }

        let slug = patch_doc.get_str("name").ok().map(generate_slug);
        if let Some(slug) = slug {
            patch_doc.insert("slug", slug);
        }

        self.repository
            .update_by_query(doc! { "_id": id, "user_id": user.id }, patch_doc)
            .await?
            .ok_or_else(|| CatalogError::not_found("product", id.to_hex()))
    }

    /// Ownership-scoped soft delete. Deleting a product that is already
    /// gone, or not owned by the acting user, is a `NotFound`.
    pub async fn delete_product_by_id(&self, user: &AuthUser, id: ObjectId) -> CatalogResult<()> {
        let removed = self
            .repository
            .remove_by_query(doc! { "_id": id, "user_id": user.id })
            .await?;

        if removed == 0 {
            return Err(CatalogError::not_found("product", id.to_hex()));
        }
        Ok(())
    }
}
