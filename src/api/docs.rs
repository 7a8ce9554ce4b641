/// OpenAPI document
///
/// Component schemas come from the `ToSchema` derives on the catalog types.
/// Paths are generated from the `Resource` descriptors so the document can
/// never drift from the routes the generic handlers actually serve.

use super::health::HealthReport;
use super::resources::Resource;
use super::API_PREFIX;
use crate::catalog::{Brand, BrandInput, Category, CategoryInput, Product, ProductInput};
use utoipa::openapi::path::{
    HttpMethod, OperationBuilder, ParameterBuilder, ParameterIn, PathItemBuilder,
};
use utoipa::openapi::request_body::{RequestBody, RequestBodyBuilder};
use utoipa::openapi::schema::{
    ArrayBuilder, KnownFormat, ObjectBuilder, Ref, Schema, SchemaFormat, Type,
};
use utoipa::openapi::{
    Content, PathItem, Paths, PathsBuilder, RefOr, Required, ResponseBuilder,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        description = "CRUD service for products, categories and brands"
    ),
    tags(
        (name = "Products", description = "Product management endpoints"),
        (name = "Categories", description = "Category management endpoints"),
        (name = "Brands", description = "Brand management endpoints"),
        (name = "System", description = "Health and runtime endpoints")
    ),
    components(schemas(
        Brand,
        BrandInput,
        Category,
        CategoryInput,
        Product,
        ProductInput,
        HealthReport
    ))
)]
pub struct ApiDoc;

const JSON: &str = "application/json";

/// `{status, status_code, data, message}` with the given `data` schema
fn envelope(data: impl Into<RefOr<Schema>>) -> RefOr<Schema> {
    ObjectBuilder::new()
        .property(
            "status",
            ObjectBuilder::new()
                .schema_type(Type::String)
                .enum_values(Some(["success", "error"])),
        )
        .property("status_code", ObjectBuilder::new().schema_type(Type::Integer))
        .property("data", data)
        .property("message", ObjectBuilder::new().schema_type(Type::String))
        .required("status")
        .required("status_code")
        .required("data")
        .required("message")
        .into()
}

fn json_response(
    description: impl Into<String>,
    data: impl Into<RefOr<Schema>>,
) -> ResponseBuilder {
    ResponseBuilder::new()
        .description(description)
        .content(JSON, Content::new(Some(envelope(data))))
}

/// Error envelopes always carry `data: null`
fn error_response(description: impl Into<String>) -> ResponseBuilder {
    json_response(description, ObjectBuilder::new().schema_type(Type::Null))
}

fn id_parameter(name: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .description(Some(format!("{} identifier", name)))
        .schema(Some(
            ObjectBuilder::new()
                .schema_type(Type::Integer)
                .format(Some(SchemaFormat::KnownFormat(KnownFormat::Int64))),
        ))
}

fn page_parameter(name: &str, description: &str) -> ParameterBuilder {
    ParameterBuilder::new()
        .name(name)
        .parameter_in(ParameterIn::Query)
        .required(Required::False)
        .description(Some(description))
        .schema(Some(
            ObjectBuilder::new().schema_type(Type::Integer).minimum(Some(1)),
        ))
}

fn input_body<R: Resource>() -> RequestBody {
    RequestBodyBuilder::new()
        .required(Some(Required::True))
        .content(
            JSON,
            Content::new(Some(Ref::from_schema_name(format!("{}Input", R::NAME)))),
        )
        .build()
}

/// `GET` and `POST` on the collection path
fn collection_item<R: Resource>() -> PathItem {
    let lower = R::NAME.to_lowercase();
    let entity = Ref::from_schema_name(R::NAME);

    let mut list = OperationBuilder::new()
        .tag(R::TAG)
        .summary(Some(format!("List {}", R::COLLECTION)))
        .operation_id(Some(format!("list_{}", R::COLLECTION)))
        .response(
            "200",
            json_response(
                format!("{} {}", R::TAG, R::READ_VERB),
                ArrayBuilder::new().items(entity.clone()),
            ),
        )
        .response("500", error_response(format!("Failed to fetch {}", R::COLLECTION)));
    if R::PAGINATED {
        list = list
            .parameter(page_parameter("page", "1-based page number (default 1)"))
            .parameter(page_parameter("limit", "Page size (default 10)"));
    }

    let create = OperationBuilder::new()
        .tag(R::TAG)
        .summary(Some(format!("Create a {}", lower)))
        .operation_id(Some(format!("create_{}", lower)))
        .request_body(Some(input_body::<R>()))
        .response("201", json_response(format!("{} created", R::NAME), entity))
        .response("400", error_response("Invalid request body or validation failure"))
        .response("500", error_response(format!("Failed to create {}", lower)));

    PathItemBuilder::new()
        .operation(HttpMethod::Get, list)
        .operation(HttpMethod::Post, create)
        .build()
}

/// `GET`, `PUT` and `DELETE` on `/{collection}/{id}`
fn member_item<R: Resource>() -> PathItem {
    let lower = R::NAME.to_lowercase();
    let entity = Ref::from_schema_name(R::NAME);
    let not_found = format!("{} not found", R::NAME);

    let show = OperationBuilder::new()
        .tag(R::TAG)
        .summary(Some(format!("Get a {} by id", lower)))
        .operation_id(Some(format!("get_{}", lower)))
        .parameter(id_parameter(R::NAME))
        .response(
            "200",
            json_response(format!("{} {}", R::NAME, R::READ_VERB), entity.clone()),
        )
        .response("404", error_response(not_found.clone()))
        .response("500", error_response(format!("Error retrieving {}", lower)));

    let update = OperationBuilder::new()
        .tag(R::TAG)
        .summary(Some(format!("Update a {}", lower)))
        .operation_id(Some(format!("update_{}", lower)))
        .parameter(id_parameter(R::NAME))
        .request_body(Some(input_body::<R>()))
        .response("200", json_response(format!("{} updated", R::NAME), entity))
        .response("400", error_response("Invalid input or validation failure"))
        .response("404", error_response(not_found.clone()))
        .response("500", error_response(format!("Failed to update {}", lower)));

    let destroy = OperationBuilder::new()
        .tag(R::TAG)
        .summary(Some(format!("Delete a {}", lower)))
        .operation_id(Some(format!("delete_{}", lower)))
        .parameter(id_parameter(R::NAME))
        .response("204", ResponseBuilder::new().description(format!("{} deleted", R::NAME)))
        .response("404", error_response(not_found))
        .response("500", error_response(format!("Failed to delete {}", lower)));

    PathItemBuilder::new()
        .operation(HttpMethod::Get, show)
        .operation(HttpMethod::Put, update)
        .operation(HttpMethod::Delete, destroy)
        .build()
}

fn resource_paths<R: Resource>(paths: PathsBuilder) -> PathsBuilder {
    paths
        .path(format!("{}/{}", API_PREFIX, R::COLLECTION), collection_item::<R>())
        .path(format!("{}/{}/{{id}}", API_PREFIX, R::COLLECTION), member_item::<R>())
}

fn health_item() -> PathItem {
    let operation = OperationBuilder::new()
        .tag("System")
        .summary(Some("Liveness and runtime stats"))
        .operation_id(Some("health"))
        .response(
            "200",
            json_response("Service is healthy", Ref::from_schema_name("HealthReport")),
        );
    PathItem::new(HttpMethod::Get, operation)
}

fn catalog_paths() -> Paths {
    let paths = PathsBuilder::new();
    let paths = resource_paths::<Product>(paths);
    let paths = resource_paths::<Category>(paths);
    let paths = resource_paths::<Brand>(paths);
    paths.path("/health", health_item()).build()
}

/// Build the full OpenAPI 3 document served at /swagger/openapi.json
pub fn openapi_document() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.paths = catalog_paths();
    doc
}
