//! Template listing.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use std::sync::Arc;

use super::ApiError;
use crate::content::MenuKind;
use crate::pages::{TemplateChoice, list_templates};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TemplatesQuery {
    /// Only templates applying to this tab.
    #[serde(rename = "for")]
    pub kind: Option<MenuKind>,
}

/// GET /api/templates?for=daily|weekly
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TemplatesQuery>,
) -> Result<Json<Vec<TemplateChoice>>, ApiError> {
    let templates = list_templates(state.source.as_ref(), query.kind).await?;
    Ok(Json(templates.iter().map(TemplateChoice::from).collect()))
}
