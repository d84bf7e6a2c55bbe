//! Page controllers: fetch what a tab needs, pick a template, render, export.
//!
//! Each call owns its render from start to finish, so two tabs (or two HTTP
//! requests) can run concurrently and a caller never sees another call's
//! result.

use chrono::NaiveDate;

use crate::content::query::{fetch_decodable, fetch_first, resolve_dishes};
use crate::content::{
    ContentSource, DAILY_MENU_TYPE, DailyMenuData, Direction, Filter, MENU_TEMPLATE_TYPE,
    MenuKind, MenuTemplate, MenuTemplateData, Query, WEEKLY_HIGHLIGHTS_TYPE,
    WeeklyHighlightsData,
};
use crate::error::Result;
use crate::export::{DAILY_FILE_NAME, ExportFile, WEEKLY_FILE_NAME};
use crate::render::{
    BackgroundOutcome, CardPlacement, RenderContext, Story, generate_daily_menu_canvas,
    generate_weekly_canvas, run_blocking,
};

pub const NO_DAILY_MENU: &str = "Aucun menu du jour publié pour aujourd'hui.";
pub const NO_WEEKLY_HIGHLIGHTS: &str = "Aucun « plats de la semaine » publié.";

const TEMPLATE_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub file: ExportFile,
    /// Id of the template that was selected, if any.
    pub template_id: Option<String>,
    pub background: BackgroundOutcome,
    pub cards: Vec<CardPlacement>,
}

impl RenderedPage {
    /// Encode the story as the export file. The PNG encode runs on the
    /// blocking pool.
    async fn export(
        name: &'static str,
        story: Story,
        template: Option<&MenuTemplate>,
    ) -> Result<Self> {
        let Story {
            surface,
            background,
            cards,
        } = story;
        let file = run_blocking("PNG export", move || ExportFile::png(name, &surface)).await?;
        Ok(Self {
            file,
            template_id: template.map(|t| t.id.clone()),
            background,
            cards,
        })
    }
}

#[derive(Debug, Clone)]
pub enum PageOutcome {
    Rendered(RenderedPage),
    /// Nothing to render; carries the message to show.
    NothingPublished(&'static str),
}

/// A template for the picker.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TemplateChoice {
    pub id: String,
    pub name: String,
}

impl From<&MenuTemplate> for TemplateChoice {
    fn from(template: &MenuTemplate) -> Self {
        Self {
            id: template.id.clone(),
            name: template.display_name().to_string(),
        }
    }
}

fn templates_query() -> Query {
    Query::of_type(MENU_TEMPLATE_TYPE).page_size(TEMPLATE_PAGE_SIZE)
}

/// Fetch templates, keeping those that apply to `kind` (all of them when
/// `kind` is `None`). Source order is preserved; templates that fail to
/// decode are skipped.
pub async fn list_templates(
    source: &dyn ContentSource,
    kind: Option<MenuKind>,
) -> Result<Vec<MenuTemplate>> {
    let templates: Vec<MenuTemplate> = fetch_decodable(source, &templates_query()).await?;
    Ok(filter_templates(templates, kind))
}

fn filter_templates(templates: Vec<MenuTemplate>, kind: Option<MenuKind>) -> Vec<MenuTemplate> {
    match kind {
        Some(kind) => templates.into_iter().filter(|t| t.applies_to(kind)).collect(),
        None => templates,
    }
}

/// The selected template if it is in `templates`, else the first one.
pub fn pick_template<'a>(
    templates: &'a [MenuTemplate],
    selected: Option<&str>,
) -> Option<&'a MenuTemplate> {
    selected
        .and_then(|id| templates.iter().find(|t| t.id == id))
        .or_else(|| templates.first())
}

/// Render the daily menu published for `date`.
pub async fn daily_page(
    source: &dyn ContentSource,
    ctx: &RenderContext,
    date: NaiveDate,
    template_id: Option<&str>,
) -> Result<PageOutcome> {
    let iso = date.format("%Y-%m-%d").to_string();
    let menu_query = Query::of_type(DAILY_MENU_TYPE)
        .filter(Filter::at("my.daily_menu.date", &iso))
        .page_size(1);
    let templates_query = templates_query();

    let (menu, templates) = tokio::try_join!(
        fetch_first::<DailyMenuData>(source, &menu_query),
        fetch_decodable::<MenuTemplateData>(source, &templates_query),
    )?;

    let Some(menu) = menu else {
        log::info!("No daily menu published for {}", iso);
        return Ok(PageOutcome::NothingPublished(NO_DAILY_MENU));
    };

    let dishes = resolve_dishes(source, &menu.referenced_ids()).await?;
    let templates = filter_templates(templates, Some(MenuKind::Daily));
    let template = pick_template(&templates, template_id);

    let story = generate_daily_menu_canvas(&menu, &dishes, template, ctx).await?;
    let page = RenderedPage::export(DAILY_FILE_NAME, story, template).await?;
    Ok(PageOutcome::Rendered(page))
}

/// Render the most recent weekly highlights (by week start).
pub async fn weekly_page(
    source: &dyn ContentSource,
    ctx: &RenderContext,
    template_id: Option<&str>,
) -> Result<PageOutcome> {
    let weekly_query = Query::of_type(WEEKLY_HIGHLIGHTS_TYPE)
        .order_by("my.weekly_highlights.week_start", Direction::Desc)
        .page_size(1);
    let templates_query = templates_query();

    let (weekly, templates) = tokio::try_join!(
        fetch_first::<WeeklyHighlightsData>(source, &weekly_query),
        fetch_decodable::<MenuTemplateData>(source, &templates_query),
    )?;

    let Some(weekly) = weekly else {
        log::info!("No weekly highlights published");
        return Ok(PageOutcome::NothingPublished(NO_WEEKLY_HIGHLIGHTS));
    };

    let dish_map = resolve_dishes(source, &weekly.referenced_ids()).await?;
    let dishes = weekly.resolved_dishes(&dish_map);
    let templates = filter_templates(templates, Some(MenuKind::Weekly));
    let template = pick_template(&templates, template_id);

    let story = generate_weekly_canvas(&weekly, &dishes, template, ctx).await?;
    let page = RenderedPage::export(WEEKLY_FILE_NAME, story, template).await?;
    Ok(PageOutcome::Rendered(page))
}
