//! Story image endpoints.

use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use super::ApiError;
use crate::pages::{PageOutcome, daily_page, weekly_page};
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// `YYYY-MM-DD`, defaults to today.
    pub date: Option<String>,
    pub template: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    pub template: Option<String>,
}

fn parse_date(date: Option<&str>) -> Result<NaiveDate, ApiError> {
    match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
            ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid date: {}", s))
        }),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

fn png_response(outcome: PageOutcome) -> Result<Response, ApiError> {
    match outcome {
        PageOutcome::Rendered(page) => {
            let disposition = format!("attachment; filename=\"{}\"", page.file.name);
            Ok((
                [
                    (header::CONTENT_TYPE, page.file.mime.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                page.file.bytes,
            )
                .into_response())
        }
        PageOutcome::NothingPublished(message) => {
            Err(ApiError::new(StatusCode::NOT_FOUND, message))
        }
    }
}

/// GET /api/daily/image?date=&template=
pub async fn daily_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DailyQuery>,
) -> Result<Response, ApiError> {
    let date = parse_date(query.date.as_deref())?;
    let outcome = daily_page(
        state.source.as_ref(),
        &state.render,
        date,
        query.template.as_deref(),
    )
    .await?;
    png_response(outcome)
}

/// GET /api/weekly/image?template=
pub async fn weekly_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WeeklyQuery>,
) -> Result<Response, ApiError> {
    let outcome = weekly_page(state.source.as_ref(), &state.render, query.template.as_deref()).await?;
    png_response(outcome)
}
