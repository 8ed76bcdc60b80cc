use std::sync::Arc;

use axum::{extract::State, Json};

use crate::dto::{CategoriesResponse, MenuItemDto, MenuResponse};
use crate::error::ApiError;
use crate::routes::reject;
use crate::services::MenuService;
use crate::AppState;

/// `GET /api/menu`
pub async fn list_menu(State(state): State<Arc<AppState>>) -> Result<Json<MenuResponse>, ApiError> {
    let items = MenuService::new(state.clone())
        .list_available()
        .await
        .map_err(reject(&state))?;

    Ok(Json(MenuResponse {
        success: true,
        items: items.into_iter().map(MenuItemDto::from).collect(),
    }))
}

/// `GET /api/menu/categories`
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = MenuService::new(state.clone())
        .categories()
        .await
        .map_err(reject(&state))?;

    Ok(Json(CategoriesResponse {
        success: true,
        categories,
    }))
}
