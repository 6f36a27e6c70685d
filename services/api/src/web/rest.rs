//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::{
    protocol::{CategoryGuide, ManualProductRequest, RoutineParams},
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use skinlog_core::{
    domain::{IngredientCategory, Product, ProductQuery, UsageLogEntry},
    logbook,
    ports::PortError,
    routine::{plan_routine, share_text, RoutinePlan},
    shelf::{self, ShelfError},
};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_shelf_handler,
        scan_product_handler,
        add_manual_product_handler,
        delete_product_handler,
        get_history_handler,
        get_routine_handler,
        log_routine_handler,
        share_routine_handler,
        list_categories_handler,
    ),
    components(
        schemas(ManualProductRequest, CategoryGuide)
    ),
    tags(
        (
            name = "SkinLog API",
            description = "Shelf management and nightly routine recommendations."
        )
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

/// Message shown to the user whenever the classifier fails.
pub const ANALYSIS_FAILED_MESSAGE: &str = "Could not analyze product.";

fn storage_failure(context: &str, e: PortError) -> HandlerError {
    error!("{}: {:?}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
}

fn shelf_failure(context: &str, e: ShelfError) -> HandlerError {
    match e {
        ShelfError::Analysis(e) => {
            error!("{}: {:?}", context, e);
            (StatusCode::BAD_GATEWAY, ANALYSIS_FAILED_MESSAGE.to_string())
        }
        ShelfError::Port(PortError::NotFound(message)) => (StatusCode::NOT_FOUND, message),
        ShelfError::Port(e) => storage_failure(context, e),
    }
}

/// Loads the current state and rebuilds tonight's plan from scratch.
async fn current_plan(
    app_state: &AppState,
    params: RoutineParams,
) -> Result<RoutinePlan, HandlerError> {
    let shelf = app_state
        .store
        .load_shelf()
        .await
        .map_err(|e| storage_failure("Failed to load shelf", e))?;
    let history = app_state
        .store
        .load_history()
        .await
        .map_err(|e| storage_failure("Failed to load history", e))?;

    Ok(plan_routine(
        &shelf,
        &history,
        params.goal(),
        params.device_enabled(),
        params.humidity_or(app_state.config.ambient_humidity),
        Utc::now(),
    ))
}

//=========================================================================================
// Shelf Handlers
//=========================================================================================

/// List the products on the shelf, in the order they were added.
#[utoipa::path(
    get,
    path = "/shelf",
    responses(
        (status = 200, description = "The shelf, in insertion order"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_shelf_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<Product>>, HandlerError> {
    let shelf = app_state
        .store
        .load_shelf()
        .await
        .map_err(|e| storage_failure("Failed to load shelf", e))?;
    Ok(Json(shelf))
}

/// Add a product by photographing it.
///
/// Accepts a multipart/form-data request with a single image part.
#[utoipa::path(
    post,
    path = "/shelf/scan",
    request_body(content_type = "multipart/form-data", description = "A photo of the product."),
    responses(
        (status = 201, description = "Product classified and added to the shelf"),
        (status = 400, description = "Bad request (e.g., missing image)"),
        (status = 502, description = "The classifier could not analyze the product"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn scan_product_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), HandlerError> {
    let image = match multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        Some(field) => field.bytes().await.map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Failed to read image bytes: {}", e),
            )
        })?,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                "Multipart form must include an image".to_string(),
            ))
        }
    };
    if image.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Uploaded image is empty".to_string()));
    }

    let added = shelf::add_product(
        app_state.store.as_ref(),
        app_state.classifier.as_ref(),
        ProductQuery::Image(image),
    )
    .await
    .map_err(|e| shelf_failure("Failed to add scanned product", e))?;

    match added {
        Some(product) => Ok((StatusCode::CREATED, Json(product))),
        None => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Scanned product was not added".to_string(),
        )),
    }
}

/// Add a product from a manually entered brand and name.
///
/// A blank brand or name is declined without contacting the classifier.
#[utoipa::path(
    post,
    path = "/shelf/manual",
    request_body = ManualProductRequest,
    responses(
        (status = 201, description = "Product classified and added to the shelf"),
        (status = 204, description = "Brand or name missing; nothing was added"),
        (status = 502, description = "The classifier could not analyze the product"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_manual_product_handler(
    State(app_state): State<Arc<AppState>>,
    Json(req): Json<ManualProductRequest>,
) -> Result<Response, HandlerError> {
    let query = ProductQuery::Manual {
        brand: req.brand,
        name: req.name,
    };
    let added = shelf::add_product(
        app_state.store.as_ref(),
        app_state.classifier.as_ref(),
        query,
    )
    .await
    .map_err(|e| shelf_failure("Failed to add manual product", e))?;

    Ok(match added {
        Some(product) => (StatusCode::CREATED, Json(product)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// Remove a product from the shelf. The usage history is not affected.
#[utoipa::path(
    delete,
    path = "/shelf/{id}",
    responses(
        (status = 204, description = "Product removed"),
        (status = 404, description = "No product with this id"),
        (status = 500, description = "Internal server error")
    ),
    params(
        ("id" = String, Path, description = "The product identifier.")
    )
)]
pub async fn delete_product_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    shelf::remove_product(app_state.store.as_ref(), &id)
        .await
        .map_err(|e| shelf_failure("Failed to remove product", e))?;
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// History and Routine Handlers
//=========================================================================================

/// The full usage log, in the order it was written.
#[utoipa::path(
    get,
    path = "/history",
    responses(
        (status = 200, description = "The usage log"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<UsageLogEntry>>, HandlerError> {
    let history = app_state
        .store
        .load_history()
        .await
        .map_err(|e| storage_failure("Failed to load history", e))?;
    Ok(Json(history))
}

/// Tonight's routine, generated from the current shelf and history.
#[utoipa::path(
    get,
    path = "/routine",
    params(RoutineParams),
    responses(
        (status = 200, description = "Cycle day, history signals and ordered routine steps"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_routine_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RoutineParams>,
) -> Result<Json<RoutinePlan>, HandlerError> {
    let plan = current_plan(&app_state, params).await?;
    Ok(Json(plan))
}

/// Record tonight's routine in the usage log, one entry per step.
#[utoipa::path(
    post,
    path = "/routine/log",
    params(RoutineParams),
    responses(
        (status = 201, description = "The entries that were appended"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn log_routine_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RoutineParams>,
) -> Result<(StatusCode, Json<Vec<UsageLogEntry>>), HandlerError> {
    let plan = current_plan(&app_state, params).await?;
    let entries = logbook::log_routine(app_state.store.as_ref(), &plan.steps, Utc::now())
        .await
        .map_err(|e| storage_failure("Failed to log routine", e))?;
    info!(cycle = %plan.cycle, steps = entries.len(), "Routine completed");
    Ok((StatusCode::CREATED, Json(entries)))
}

/// Tonight's routine as shareable plain text.
#[utoipa::path(
    get,
    path = "/routine/share",
    params(RoutineParams),
    responses(
        (
            status = 200,
            description = "Plain-text summary of the routine",
            body = String,
            content_type = "text/plain"
        ),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn share_routine_handler(
    State(app_state): State<Arc<AppState>>,
    Query(params): Query<RoutineParams>,
) -> Result<impl IntoResponse, HandlerError> {
    let plan = current_plan(&app_state, params).await?;
    let text = share_text(&plan.steps, plan.goal, Utc::now().date_naive());
    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text))
}

//=========================================================================================
// Category Guide
//=========================================================================================

/// Usage guidance and typical ingredients for every product category.
#[utoipa::path(
    get,
    path = "/categories",
    responses(
        (status = 200, description = "One guide entry per category", body = [CategoryGuide])
    )
)]
pub async fn list_categories_handler() -> Json<Vec<CategoryGuide>> {
    Json(
        IngredientCategory::ALL
            .into_iter()
            .map(CategoryGuide::from)
            .collect(),
    )
}
