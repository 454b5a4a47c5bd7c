use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::dto::{
    CreatedMealResponse, MealBody, MealListResponse, MealResponse, MealView, SummaryResponse,
};
use super::store::StoreError;
use crate::{
    error::ApiError,
    session::{self, session_cookie, OwnerToken, PresentedToken},
    state::AppState,
    summary::summarize,
};

pub fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/summary", get(get_summary))
        .route(
            "/meals/:id",
            get(get_meal).put(update_meal).delete(delete_meal),
        )
}

fn log_store_error(e: StoreError, id: Uuid) -> ApiError {
    if matches!(e, StoreError::NotFound) {
        warn!(meal_id = %id, "meal not found for session");
    }
    e.into()
}

/// POST /meals. Issues a session cookie when the client has none.
#[instrument(skip(state, presented, body), fields(session = ?presented))]
pub async fn create_meal(
    State(state): State<AppState>,
    PresentedToken(presented): PresentedToken,
    body: Result<Json<MealBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let fields = body.into_fields()?;

    let resolved = session::resolve(presented);
    let id = state.store.create(resolved.token(), fields).await?;

    let mut headers = vec![(header::LOCATION, format!("/meals/{}", id))];
    if let Some(issued) = resolved.issued() {
        info!(session = %issued.redacted(), "session issued");
        headers.push((
            header::SET_COOKIE,
            session_cookie(issued, state.config.cookie_secure),
        ));
    }
    info!(meal_id = %id, "meal created");

    Ok((
        StatusCode::CREATED,
        AppendHeaders(headers),
        Json(CreatedMealResponse { id }),
    ))
}

/// GET /meals
#[instrument(skip(state, owner), fields(session = %owner.redacted()))]
pub async fn list_meals(
    State(state): State<AppState>,
    OwnerToken(owner): OwnerToken,
) -> Result<Json<MealListResponse>, ApiError> {
    let meals = state.store.list(&owner).await?;
    Ok(Json(MealListResponse {
        meals: meals.into_iter().map(MealView::from).collect(),
    }))
}

/// GET /meals/summary
#[instrument(skip(state, owner), fields(session = %owner.redacted()))]
pub async fn get_summary(
    State(state): State<AppState>,
    OwnerToken(owner): OwnerToken,
) -> Result<Json<SummaryResponse>, ApiError> {
    let meals = state.store.list(&owner).await?;
    Ok(Json(SummaryResponse {
        summary: summarize(&meals),
    }))
}

/// GET /meals/:id
#[instrument(skip(state, owner, id), fields(session = %owner.redacted()))]
pub async fn get_meal(
    State(state): State<AppState>,
    OwnerToken(owner): OwnerToken,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MealResponse>, ApiError> {
    let Path(id) = id?;
    let meal = state.store.get(&owner, id).await.map_err(|e| log_store_error(e, id))?;
    Ok(Json(MealResponse { meal: meal.into() }))
}

/// PUT /meals/:id
#[instrument(skip(state, owner, id, body), fields(session = %owner.redacted()))]
pub async fn update_meal(
    State(state): State<AppState>,
    OwnerToken(owner): OwnerToken,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<MealBody>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let Json(body) = body?;
    let fields = body.into_fields()?;

    state
        .store
        .update(&owner, id, fields)
        .await
        .map_err(|e| log_store_error(e, id))?;
    info!(meal_id = %id, "meal updated");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /meals/:id
#[instrument(skip(state, owner, id), fields(session = %owner.redacted()))]
pub async fn delete_meal(
    State(state): State<AppState>,
    OwnerToken(owner): OwnerToken,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state
        .store
        .delete(&owner, id)
        .await
        .map_err(|e| log_store_error(e, id))?;
    info!(meal_id = %id, "meal deleted");
    Ok(StatusCode::NO_CONTENT)
}
