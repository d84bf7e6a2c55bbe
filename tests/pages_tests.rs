//! Page controller tests against the in-memory content store.

mod common;

use ardoise::content::MenuKind;
use ardoise::export::{DAILY_FILE_NAME, WEEKLY_FILE_NAME};
use ardoise::pages::{
    NO_DAILY_MENU, NO_WEEKLY_HIGHLIGHTS, PageOutcome, RenderedPage, daily_page, list_templates,
    weekly_page,
};
use ardoise::render::BackgroundOutcome;
use chrono::NaiveDate;
use ardoise::content::MemorySource;
use common::{context, restaurant, restaurant_documents, template_json};
use serde_json::json;
use pretty_assertions::assert_eq;

fn rendered(outcome: PageOutcome) -> RenderedPage {
    match outcome {
        PageOutcome::Rendered(page) => page,
        PageOutcome::NothingPublished(message) => panic!("nothing rendered: {}", message),
    }
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[tokio::test]
async fn test_daily_page_renders_published_menu() {
    let source = restaurant();
    let page = rendered(
        daily_page(&source, &context(), date("2024-12-20"), None)
            .await
            .unwrap(),
    );

    assert_eq!(page.file.name, DAILY_FILE_NAME);
    assert_eq!(&page.file.bytes[..4], b"\x89PNG");
    // First template applying to the daily tab
    assert_eq!(page.template_id.as_deref(), Some("tpl-noel"));
    assert_eq!(page.background, BackgroundOutcome::Template);

    let labels: Vec<_> = page.cards.iter().map(|c| c.label).collect();
    assert_eq!(labels, vec![Some("Plat"), Some("Dessert")]);
}

#[tokio::test]
async fn test_daily_page_selected_template() {
    let source = restaurant();
    let page = rendered(
        daily_page(&source, &context(), date("2024-12-20"), Some("tpl-broken"))
            .await
            .unwrap(),
    );

    assert_eq!(page.template_id.as_deref(), Some("tpl-broken"));
    assert_eq!(page.background, BackgroundOutcome::Fallback);
}

#[tokio::test]
async fn test_daily_page_weekly_only_template_is_not_offered() {
    let source = restaurant();
    let page = rendered(
        daily_page(&source, &context(), date("2024-12-20"), Some("tpl-week"))
            .await
            .unwrap(),
    );

    assert_eq!(page.template_id.as_deref(), Some("tpl-noel"));
}

#[tokio::test]
async fn test_daily_page_nothing_published() {
    let source = restaurant();
    let outcome = daily_page(&source, &context(), date("2024-12-21"), None)
        .await
        .unwrap();

    assert!(matches!(outcome, PageOutcome::NothingPublished(m) if m == NO_DAILY_MENU));
}

#[tokio::test]
async fn test_weekly_page_uses_latest_week() {
    let source = restaurant();
    let page = rendered(weekly_page(&source, &context(), None).await.unwrap());

    assert_eq!(page.file.name, WEEKLY_FILE_NAME);
    assert_eq!(page.template_id.as_deref(), Some("tpl-broken"));

    // week-51: tarte, (ghost), boeuf
    let ids: Vec<_> = page.cards.iter().map(|c| c.dish_id.as_str()).collect();
    assert_eq!(ids, vec!["tarte", "boeuf"]);
    assert!(!page.cards[0].image_loaded);
    assert!(page.cards[1].image_loaded);
}

#[tokio::test]
async fn test_weekly_page_nothing_published() {
    let source = MemorySource::new(Vec::new());
    let outcome = weekly_page(&source, &context(), None).await.unwrap();
    assert!(matches!(outcome, PageOutcome::NothingPublished(m) if m == NO_WEEKLY_HIGHLIGHTS));
}

#[tokio::test]
async fn test_list_templates_per_tab() {
    let source = restaurant();

    let names = |templates: Vec<ardoise::content::MenuTemplate>| -> Vec<String> {
        templates.iter().map(|t| t.display_name().to_string()).collect()
    };

    let weekly = list_templates(&source, Some(MenuKind::Weekly)).await.unwrap();
    assert_eq!(names(weekly), vec!["Template sans nom", "Semaine"]);

    let all = list_templates(&source, None).await.unwrap();
    assert_eq!(all.len(), 3);
}

/// The restaurant plus a template with a scope this build does not know and
/// one whose data is not an object, both listed first.
fn restaurant_with_odd_templates() -> MemorySource {
    let mut documents = vec![
        template_json("tpl-tout", "Tout", Some("tout"), "https://cdn.test/tout.jpg"),
        json!({ "id": "tpl-garbled", "type": "menu_template", "data": "oops" }),
    ];
    documents.extend(restaurant_documents());
    MemorySource::new(documents)
}

#[tokio::test]
async fn test_odd_templates_do_not_block_daily_render() {
    let source = restaurant_with_odd_templates();
    let page = rendered(
        daily_page(&source, &context(), date("2024-12-20"), Some("tpl-tout"))
            .await
            .unwrap(),
    );

    assert_eq!(page.template_id.as_deref(), Some("tpl-noel"));
    assert_eq!(page.cards.len(), 2);
}

#[tokio::test]
async fn test_odd_templates_do_not_block_weekly_render() {
    let source = restaurant_with_odd_templates();
    let page = rendered(weekly_page(&source, &context(), None).await.unwrap());
    assert_eq!(page.template_id.as_deref(), Some("tpl-broken"));
}

#[tokio::test]
async fn test_odd_templates_left_out_of_listings() {
    let source = restaurant_with_odd_templates();

    let ids = |templates: Vec<ardoise::content::MenuTemplate>| -> Vec<String> {
        templates.into_iter().map(|t| t.id).collect()
    };

    let daily = list_templates(&source, Some(MenuKind::Daily)).await.unwrap();
    assert_eq!(ids(daily), vec!["tpl-noel", "tpl-broken"]);

    // Unfiltered listing keeps the unknown scope but not the garbled one
    let all = list_templates(&source, None).await.unwrap();
    assert_eq!(ids(all), vec!["tpl-tout", "tpl-noel", "tpl-broken", "tpl-week"]);
}
