use axum::{
    Extension,
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    AppState,
    cache::{invalidate_after, keys::ITEMS_LIST_PREFIX, read_through},
    database::models::{ADMIN_ROLE, Item},
    error::{AppError, AppResult},
    routes::{AppJson, AppQuery},
    utils::Claims,
};

use super::model::{CreateItemRequest, EnrichedItem, ListItemsParams, UpdateItemRequest};

fn not_found() -> AppError {
    AppError::NotFound("Item not found".into())
}

fn audit_log(event: &'static str, item_id: String, actor: String) {
    tokio::spawn(async move {
        tracing::info!(audit = event, item_id = %item_id, actor = %actor, "audit");
    });
}

/// Item list, served through the response cache. The cache key covers the
/// request path and every query parameter.
#[axum::debug_handler]
pub async fn list_items(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    AppQuery(params): AppQuery<ListItemsParams>,
) -> AppResult<Json<Vec<Item>>> {
    let query = params.into_query()?;
    let repo = state.items.clone();

    let items = read_through(
        &state.cache,
        ITEMS_LIST_PREFIX,
        uri.path(),
        uri.query().unwrap_or(""),
        move || async move { repo.list(&query).await.map_err(AppError::from) },
    )
    .await?;

    Ok(Json(items))
}

#[axum::debug_handler]
pub async fn get_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<Item>> {
    let item = state.items.find_by_id(&item_id).await?.ok_or_else(not_found)?;
    Ok(Json(item))
}

#[axum::debug_handler]
pub async fn enrich_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> AppResult<Json<EnrichedItem>> {
    let item = state.items.find_by_id(&item_id).await?.ok_or_else(not_found)?;

    let quote = state.quotes.fetch().await.map_err(|e| {
        tracing::warn!("Quote enrichment failed for {}: {}", item_id, e);
        AppError::ServiceUnavailable("Quote service unavailable".into())
    })?;

    Ok(Json(EnrichedItem {
        item,
        external: quote,
    }))
}

#[axum::debug_handler]
pub async fn create_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    AppJson(req): AppJson<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let new_item = req.validate()?;

    let created = invalidate_after(&state.cache, ITEMS_LIST_PREFIX, async {
        state.items.create(new_item).await.map_err(AppError::from)
    })
    .await?;

    audit_log("item_created", created.id.clone(), claims.sub);
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    AppJson(req): AppJson<UpdateItemRequest>,
) -> AppResult<Json<Item>> {
    let changes = req.validate()?;

    let updated = invalidate_after(&state.cache, ITEMS_LIST_PREFIX, async {
        state.items.update(&item_id, changes).await?.ok_or_else(not_found)
    })
    .await?;

    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(item_id): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_role(ADMIN_ROLE)?;

    invalidate_after(&state.cache, ITEMS_LIST_PREFIX, async {
        if state.items.delete(&item_id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    })
    .await?;

    audit_log("item_deleted", item_id, claims.sub);
    Ok(StatusCode::NO_CONTENT)
}
