use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

use crate::AppState;
use crate::error::AppError;
use crate::types::MatchResult;
use crate::validate::RawSearchForm;

/// `POST /IqDB`
pub async fn search_iqdb(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Vec<MatchResult>>, AppError> {
    let request = RawSearchForm::from_multipart(multipart?).await?.validate()?;

    info!(
        services = ?request.services.iter().map(|s| s.name()).collect::<Vec<_>>(),
        discolor = request.discolor,
        file_name = %request.image.file_name,
        "IqDB 搜尋"
    );

    let html = state
        .fetcher
        .submit(&request)
        .await
        .map_err(|e| AppError::UpstreamTransport(format!("{:#}", e)))?;

    let results = state.parser.parse_page(&html)?;
    info!(matches = results.len(), "IqDB 搜尋完成");

    Ok(Json(results))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
