//! Product documents and request DTOs

use crate::core::document::{AuditFields, Model};
use crate::core::query::Paginate;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product document in the `products` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub qty: i64,
    /// Owning user. Mutations are scoped to this field matching the acting
    /// principal.
    pub user_id: ObjectId,
    #[serde(flatten)]
    pub audit: AuditFields,
}

impl Product {
    /// Build a new live product owned by `owner`.
    pub fn new(input: CreateProduct, slug: String, owner: ObjectId) -> Self {
        Self {
            id: None,
            name: input.name,
            slug,
            description: input.description,
            price: input.price,
            qty: input.qty,
            user_id: owner,
            audit: AuditFields::created_by(owner),
        }
    }
}

impl Model for Product {
    const COLLECTION: &'static str = "products";

    fn id(&self) -> Option<ObjectId> {
        self.id
    }

    fn audit(&self) -> &AuditFields {
        &self.audit
    }
}

/// Body of `POST /products`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub qty: i64,
}

/// Body of `PATCH /products/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<i64>,
}

/// Query string of `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductQuery {
    pub search: Option<String>,
    pub per_page: Option<i64>,
    pub current_page: Option<i64>,
}

impl ProductQuery {
    pub fn paginate(&self) -> Paginate {
        Paginate {
            per_page: self.per_page,
            current_page: self.current_page,
        }
    }
}
