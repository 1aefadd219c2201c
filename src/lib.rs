//! # catalog-rs
//!
//! A product-catalog microservice built around one reusable piece of
//! engineering: a generic, MongoDB-backed document repository
//! ([`storage::Repository`]) that gives every resource service consistent
//! soft-delete semantics, consistent pagination metadata, and free-text
//! search for free.
//!
//! ## Architecture
//!
//! - [`core`] — document traits, pagination wire types, typed errors, and
//!   the authentication seam (token validation is delegated to an external
//!   service; only the identity result is consumed here).
//! - [`storage`] — `Repository<T>`: create, point lookups, two pagination
//!   strategies (concurrent two-query and single-pass `$facet`), search,
//!   field and array mutations, soft delete.
//! - [`products`] — the concrete resource: model, DTO validation, an
//!   ownership-scoped service composing the repository, and axum handlers.
//! - [`server`] — state, router assembly, serve loop.
//!
//! ## Soft delete
//!
//! `deleted_at` is the single source of truth for visibility. Read paths
//! never return a soft-deleted document; "delete" stamps a timestamp and
//! nothing is ever physically removed by this crate.

pub mod config;
pub mod core;
pub mod products;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::core::{
        auth::{AuthProvider, AuthUser, NoAuthProvider, StaticTokenProvider},
        document::{AuditFields, Model},
        error::{CatalogError, CatalogResult},
        query::{PageInfo, Paged, Paginate, Sort},
        strings::{generate_password, generate_slug},
    };
    pub use crate::products::{CreateProduct, Product, ProductQuery, ProductService, UpdateProduct};
    pub use crate::server::AppState;
    pub use crate::storage::{ListOptions, Repository, search_filter};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use mongodb::bson::{Document, doc, oid::ObjectId};
    pub use serde::{Deserialize, Serialize};
}
