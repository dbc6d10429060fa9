use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use quill_core::{Article, ArticleFilter, ArticleId, ArticlePatch, ArticleStats, NewArticle};
use quill_scrapers::{JobKind, JobReport};
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn parse_id(id: &str) -> ApiResult<ArticleId> {
    id.parse().map_err(|_| ApiError::NotFound)
}

pub async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    filter: Result<Query<ArticleFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Article>>> {
    let Query(filter) = filter.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    Ok(Json(state.storage.list(&filter).await?))
}

pub async fn article_stats(State(state): State<Arc<AppState>>) -> ApiResult<Json<ArticleStats>> {
    let articles = state.storage.list(&ArticleFilter::all()).await?;
    Ok(Json(ArticleStats::from_articles(&articles)))
}

pub async fn get_article(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Article>> {
    let id = parse_id(&id)?;
    state.storage.find_by_id(id).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn create_article(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewArticle>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(article) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let saved = state.storage.create(article).await?;
    tracing::info!("📝 Created article {} ({})", saved.slug, saved.id);
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ArticlePatch>, JsonRejection>,
) -> ApiResult<Json<Article>> {
    let id = parse_id(&id)?;
    let Json(patch) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    state.storage.update(id, patch).await?.map(Json).ok_or(ApiError::NotFound)
}

pub async fn delete_article(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult<Json<Value>> {
    let id = parse_id(&id)?;
    if state.storage.delete(id).await? {
        Ok(Json(json!({ "message": "Deleted" })))
    } else {
        Err(ApiError::NotFound)
    }
}

fn script_response(report: JobReport) -> Json<Value> {
    Json(json!({
        "message": "Script executed successfully",
        "output": report.output,
        "processed": report.processed,
        "candidates": report.candidates,
    }))
}

async fn run_script(state: &AppState, kind: JobKind) -> ApiResult<Json<Value>> {
    tracing::info!("▶️ Executing {} job", kind);
    let report = state.jobs.run(kind).await?;
    Ok(script_response(report))
}

pub async fn run_scrape(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    run_script(&state, JobKind::Scrape).await
}

pub async fn run_enhance(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    run_script(&state, JobKind::Enhance).await
}

pub async fn script_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({ "running": state.jobs.active() }))
}
