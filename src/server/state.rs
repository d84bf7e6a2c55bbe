//! Server state.

use std::sync::Arc;

use crate::content::ContentSource;
use crate::render::RenderContext;

/// Application state shared across handlers.
pub struct AppState {
    pub source: Arc<dyn ContentSource>,
    pub render: RenderContext,
}

impl AppState {
    pub fn new(source: Arc<dyn ContentSource>, render: RenderContext) -> Self {
        Self { source, render }
    }
}
