/// Catalog REST endpoints
///
/// One generic handler set serves products, categories and brands. Each entity
/// plugs in through `Resource`, which supplies its labels, whether its
/// collection is paginated, its validator and its foreign references.
///
/// Request flow: parse -> validate -> check references -> persist -> envelope.
/// The first failing step decides the response.

use super::envelope::Envelope;
use super::error::{ApiError, ApiResult};
use super::AppState;
use crate::catalog::validation::{validate_brand, validate_category, validate_product};
use crate::catalog::{
    Brand, BrandInput, CatalogStorage, Category, CategoryInput, Entity, Page, Product,
    ProductInput, ValidationErrors,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

/// A foreign reference carried by a write payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Table the id must exist in
    pub table: &'static str,
    pub id: i64,
    /// Client-facing message when it does not
    pub message: &'static str,
}

/// An entity exposed over REST
pub trait Resource: Entity {
    /// Display name, e.g. "Brand"
    const NAME: &'static str;
    /// Route segment, e.g. "brands"
    const COLLECTION: &'static str;
    /// Docs tag and list label, e.g. "Brands"
    const TAG: &'static str;
    /// Whether list reads honor `page`/`limit`
    const PAGINATED: bool = false;
    /// Past participle used in read messages, e.g. "Brands retrieved successfully"
    const READ_VERB: &'static str = "retrieved";

    fn validate(input: &Self::Input) -> Result<(), ValidationErrors>;

    /// References to check before writing, in check order
    fn references(_input: &Self::Input) -> Vec<Reference> {
        Vec::new()
    }
}

impl Resource for Brand {
    const NAME: &'static str = "Brand";
    const COLLECTION: &'static str = "brands";
    const TAG: &'static str = "Brands";

    fn validate(input: &BrandInput) -> Result<(), ValidationErrors> {
        validate_brand(input)
    }
}

impl Resource for Category {
    const NAME: &'static str = "Category";
    const COLLECTION: &'static str = "categories";
    const TAG: &'static str = "Categories";

    fn validate(input: &CategoryInput) -> Result<(), ValidationErrors> {
        validate_category(input)
    }
}

impl Resource for Product {
    const NAME: &'static str = "Product";
    const COLLECTION: &'static str = "products";
    const TAG: &'static str = "Products";
    const PAGINATED: bool = true;
    const READ_VERB: &'static str = "fetched";

    fn validate(input: &ProductInput) -> Result<(), ValidationErrors> {
        validate_product(input)
    }

    // Category first: its message wins when both are missing
    fn references(input: &ProductInput) -> Vec<Reference> {
        vec![
            Reference {
                table: "categories",
                id: input.category_id,
                message: "Invalid CategoryID",
            },
            Reference {
                table: "brands",
                id: input.brand_id,
                message: "Invalid BrandID",
            },
        ]
    }
}

/// Raw `page`/`limit` query values
///
/// Kept as strings so junk like `?page=abc` falls back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    /// PURE: resolve to an offset/limit window
    pub fn to_page(&self) -> Page {
        let page = positive_or(self.page.as_deref(), DEFAULT_PAGE);
        let limit = positive_or(self.limit.as_deref(), DEFAULT_LIMIT);
        Page {
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|&value| value >= 1)
        .unwrap_or(default)
}

/// Create CRUD routes for one resource
///
/// Paths are relative; the caller nests them under the API prefix. The
/// collection also answers with a trailing slash.
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    let collection = format!("/{}", R::COLLECTION);
    let item = format!("/{}/{{id}}", R::COLLECTION);

    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&format!("{}/", collection), get(list::<R>).post(create::<R>))
        .route(&item, get(show::<R>).put(update::<R>).delete(destroy::<R>))
}

fn lower(name: &str) -> String {
    name.to_lowercase()
}

/// Non-numeric ids can never match a row
fn target_id<R: Resource>(id: Result<Path<i64>, PathRejection>) -> ApiResult<i64> {
    match id {
        Ok(Path(id)) => Ok(id),
        Err(rejection) => {
            tracing::debug!("🔍 Unusable {} id: {}", R::NAME, rejection);
            Err(ApiError::ResourceNotFound(R::NAME))
        }
    }
}

fn parse_body<R: Resource>(
    payload: Result<Json<R::Input>, JsonRejection>,
    message: &'static str,
) -> ApiResult<R::Input> {
    payload.map(|Json(input)| input).map_err(|rejection| {
        tracing::debug!("⚠️ Rejected {} payload: {}", R::NAME, rejection.body_text());
        ApiError::MalformedInput(message)
    })
}

/// Ensure every foreign reference resolves to an existing row
async fn check_references<R: Resource>(
    storage: &CatalogStorage,
    input: &R::Input,
    failure: &str,
) -> ApiResult<()> {
    for reference in R::references(input) {
        let exists = storage
            .exists(reference.table, reference.id)
            .await
            .map_err(|e| ApiError::persistence(failure, e))?;
        if !exists {
            return Err(ApiError::ReferenceNotFound(reference.message));
        }
    }
    Ok(())
}

/// List a collection
///
/// GET /api/v1/{collection}[?page=&limit=]
async fn list<R: Resource>(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> ApiResult<Envelope<Vec<R>>> {
    let page = if R::PAGINATED {
        let query = query.map(|Query(q)| q).unwrap_or_default();
        Some(query.to_page())
    } else {
        None
    };

    let records = state
        .storage
        .find::<R>(page)
        .await
        .map_err(|e| ApiError::persistence(format!("Failed to fetch {}", R::COLLECTION), e))?;

    tracing::debug!("📋 Listed {} {}", records.len(), R::COLLECTION);
    Ok(Envelope::ok(records, format!("{} {} successfully", R::TAG, R::READ_VERB)))
}

/// Get one record
///
/// GET /api/v1/{collection}/{id}
async fn show<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Envelope<R>> {
    let id = target_id::<R>(id)?;

    let record = state
        .storage
        .find_by_id::<R>(id)
        .await
        .map_err(|e| ApiError::persistence(format!("Error retrieving {}", lower(R::NAME)), e))?
        .ok_or(ApiError::ResourceNotFound(R::NAME))?;

    Ok(Envelope::ok(record, format!("{} {} successfully", R::NAME, R::READ_VERB)))
}

/// Create a record
///
/// POST /api/v1/{collection}
async fn create<R: Resource>(
    State(state): State<AppState>,
    payload: Result<Json<R::Input>, JsonRejection>,
) -> ApiResult<Envelope<R>> {
    let failure = format!("Failed to create {}", lower(R::NAME));

    let input = parse_body::<R>(payload, "Invalid request body")?;
    R::validate(&input)?;
    check_references::<R>(&state.storage, &input, &failure).await?;

    let record = state
        .storage
        .create::<R>(&input)
        .await
        .map_err(|e| ApiError::persistence(failure, e))?;

    tracing::info!("✅ Created {} in {}", R::NAME, R::COLLECTION);
    Ok(Envelope::success(
        StatusCode::CREATED,
        record,
        format!("{} created successfully", R::NAME),
    ))
}

/// Replace a record's mutable fields
///
/// PUT /api/v1/{collection}/{id}
/// Existence is checked before the body is even parsed.
async fn update<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<R::Input>, JsonRejection>,
) -> ApiResult<Envelope<R>> {
    let failure = format!("Failed to update {}", lower(R::NAME));
    let id = target_id::<R>(id)?;

    let existing = state
        .storage
        .find_by_id::<R>(id)
        .await
        .map_err(|e| ApiError::persistence(failure.clone(), e))?;
    if existing.is_none() {
        return Err(ApiError::ResourceNotFound(R::NAME));
    }

    let input = parse_body::<R>(payload, "Invalid input")?;
    R::validate(&input)?;
    check_references::<R>(&state.storage, &input, &failure).await?;

    // None here means a concurrent delete won the race
    let record = state
        .storage
        .save::<R>(id, &input)
        .await
        .map_err(|e| ApiError::persistence(failure, e))?
        .ok_or(ApiError::ResourceNotFound(R::NAME))?;

    tracing::info!("🔄 Updated {} {}", R::NAME, id);
    Ok(Envelope::ok(record, format!("{} updated successfully", R::NAME)))
}

/// Delete a record
///
/// DELETE /api/v1/{collection}/{id}
/// Answers 204 with an empty body.
async fn destroy<R: Resource>(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let id = target_id::<R>(id)?;

    let deleted = state.storage.delete::<R>(id).await.map_err(|e| {
        tracing::warn!("🗑️ Delete of {} {} refused, it may still be referenced", R::NAME, id);
        ApiError::persistence(format!("Failed to delete {}", lower(R::NAME)), e)
    })?;

    if !deleted {
        return Err(ApiError::ResourceNotFound(R::NAME));
    }

    tracing::info!("🗑️ Deleted {} {}", R::NAME, id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, limit: Option<&str>) -> Page {
        PageQuery {
            page: page.map(str::to_string),
            limit: limit.map(str::to_string),
        }
        .to_page()
    }

    #[test]
    fn pagination_defaults() {
        assert_eq!(query(None, None), Page { limit: 10, offset: 0 });
    }

    #[test]
    fn pagination_window() {
        assert_eq!(query(Some("2"), Some("5")), Page { limit: 5, offset: 5 });
        assert_eq!(query(Some("3"), None), Page { limit: 10, offset: 20 });
    }

    #[test]
    fn junk_pagination_values_fall_back_to_defaults() {
        assert_eq!(query(Some("0"), Some("-4")), Page { limit: 10, offset: 0 });
        assert_eq!(query(Some("abc"), Some("")), Page { limit: 10, offset: 0 });
    }

    #[test]
    fn huge_pages_saturate_instead_of_overflowing() {
        let page = query(Some(&i64::MAX.to_string()), Some(&i64::MAX.to_string()));
        assert_eq!(page.offset, i64::MAX);
    }

    #[test]
    fn product_checks_category_before_brand() {
        let refs = Product::references(&ProductInput {
            category_id: 7,
            brand_id: 3,
            ..ProductInput::default()
        });
        let tables: Vec<_> = refs.iter().map(|r| r.table).collect();
        assert_eq!(tables, vec!["categories", "brands"]);
        assert_eq!(refs[0].message, "Invalid CategoryID");
        assert!(Brand::references(&BrandInput::default()).is_empty());
    }

    #[test]
    fn products_are_fetched_while_other_entities_are_retrieved() {
        assert_eq!(Product::READ_VERB, "fetched");
        assert_eq!(Brand::READ_VERB, "retrieved");
        assert_eq!(Category::READ_VERB, "retrieved");
    }
}
