//! Machine data endpoint.
//!
//! `GET /api/v1/data` sits behind the API key chain and returns the key
//! owner's tracked weight and food entries for a date range.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::api_key::ApiKeyPrincipal,
    models::data::{DataQuery, DataRange, DataResponse, FoodEntry, WeightEntry},
    state::AppState,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

/// Export tracked data.
///
/// # Query Parameters
///
/// - `type` - `weight`, `food` or `both` (default)
/// - `from`, `to` - Inclusive dates, `YYYY-MM-DD`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "weight": [{ "weight": 72.4, "recorded_at": "2025-01-02T07:30:00Z" }],
///   "food": [{ "food": "Oatmeal", "calories": 150, "weight": 40.0, "kcal_per_100g": 375.0,
///              "meal_datetime": "2025-01-02T08:00:00Z" }]
/// }
/// ```
///
/// Sections not requested by `type` are omitted.
pub async fn get_data(
    State(state): State<AppState>,
    Extension(principal): Extension<ApiKeyPrincipal>,
    Query(query): Query<DataQuery>,
) -> Result<Json<DataResponse>, AppError> {
    let range = query.into_range().map_err(AppError::InvalidRequest)?;

    tracing::debug!(
        user_id = principal.user_id,
        api_key_id = principal.api_key_id,
        data_type = ?range.data_type,
        "data export"
    );

    let mut response = DataResponse::default();
    if range.data_type.includes_weight() {
        response.weight = Some(weight_entries(&state.pool, principal.user_id, &range).await?);
    }
    if range.data_type.includes_food() {
        response.food = Some(food_entries(&state.pool, principal.user_id, &range).await?);
    }

    Ok(Json(response))
}

async fn weight_entries(
    pool: &DbPool,
    user_id: i64,
    range: &DataRange,
) -> Result<Vec<WeightEntry>, AppError> {
    let entries = sqlx::query_as::<_, WeightEntry>(
        r#"
        SELECT weight, recorded_at
        FROM weight_history
        WHERE user_id = $1 AND recorded_at >= $2 AND recorded_at < $3
        ORDER BY recorded_at
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

async fn food_entries(
    pool: &DbPool,
    user_id: i64,
    range: &DataRange,
) -> Result<Vec<FoodEntry>, AppError> {
    let entries = sqlx::query_as::<_, FoodEntry>(
        r#"
        SELECT food, calories, weight, kcal_per_100g, fats, carbs, proteins, meal_datetime
        FROM calorie_entries
        WHERE user_id = $1 AND meal_datetime >= $2 AND meal_datetime < $3
        ORDER BY meal_datetime
        "#,
    )
    .bind(user_id)
    .bind(range.start)
    .bind(range.end)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}
