use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::insights::store;
use crate::models::insight::Insight;
use crate::sentiment::SentimentResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateInsightRequest {
    pub brand: Option<i64>,
    pub text: Option<String>,
}

#[derive(Deserialize)]
pub struct SentimentRequest {
    pub text: Option<String>,
}

/// GET /insights
pub async fn handle_list(State(state): State<AppState>) -> Result<Json<Vec<Insight>>, AppError> {
    let insights = store::list_insights(&state.db).await?;
    Ok(Json(insights))
}

/// GET /insights/:id
pub async fn handle_lookup(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Insight>, AppError> {
    let insight = store::lookup_insight(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Insight {id} not found")))?;
    Ok(Json(insight))
}

/// POST /insights
pub async fn handle_create(
    State(state): State<AppState>,
    Json(req): Json<CreateInsightRequest>,
) -> Result<(StatusCode, Json<Insight>), AppError> {
    let (Some(brand), Some(text)) = (req.brand, req.text.filter(|t| !t.is_empty())) else {
        return Err(AppError::Validation(
            "text and brand are required".to_string(),
        ));
    };

    let created = store::create_insight(&state.db, brand, &text).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /insights/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    store::delete_insight(&state.db, id).await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /sentiment
///
/// Classification failures surface as errors ("sentiment unavailable" to the
/// UI), never as a fabricated neutral result.
pub async fn handle_sentiment(
    State(state): State<AppState>,
    Json(req): Json<SentimentRequest>,
) -> Result<Json<SentimentResult>, AppError> {
    let Some(text) = req.text.filter(|t| !t.is_empty()) else {
        return Err(AppError::Validation("text is required".to_string()));
    };

    let result = state.classifier.classify(&text).await?;
    Ok(Json(result))
}
