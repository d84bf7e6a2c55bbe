//! In-memory content store.
//!
//! Holds raw documents and evaluates [`Query`]s against them with the same
//! path conventions as the REST API. Backs the CLI's `--content` fixture mode
//! and the test suite.

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering as CmpOrdering;
use std::path::Path;

use super::query::{ContentSource, Direction, Filter, Query};
use crate::error::{ArdoiseError, Result};

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    documents: Vec<Value>,
}

impl MemorySource {
    pub fn new(documents: Vec<Value>) -> Self {
        Self { documents }
    }

    /// Load documents from a JSON file holding either an array of documents
    /// or an API-style `{ "results": [...] }` object.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&contents).map_err(|e| {
            ArdoiseError::Query(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Array(documents) => Ok(Self::new(documents)),
            Value::Object(mut map) => match map.remove("results") {
                Some(Value::Array(documents)) => Ok(Self::new(documents)),
                _ => Err(ArdoiseError::Query(
                    "Expected an array of documents or a `results` array".to_string(),
                )),
            },
            _ => Err(ArdoiseError::Query(
                "Expected an array of documents".to_string(),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Resolve a query path against a raw document.
fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    match parts.next()? {
        "document" => match parts.next()? {
            "type" => doc.get("type"),
            "id" => doc.get("id"),
            _ => None,
        },
        "my" => {
            let doc_type = parts.next()?;
            if doc.get("type").and_then(Value::as_str) != Some(doc_type) {
                return None;
            }
            parts.try_fold(doc.get("data")?, |value, key| value.get(key))
        }
        _ => None,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn matches(doc: &Value, filter: &Filter) -> bool {
    match filter {
        Filter::At { path, value } => {
            lookup(doc, path).and_then(as_text).as_deref() == Some(value.as_str())
        }
        Filter::In { path, values } => lookup(doc, path)
            .and_then(as_text)
            .is_some_and(|v| values.contains(&v)),
    }
}

/// Missing values sort last in either direction.
fn compare(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(CmpOrdering::Equal)
        }
        (Some(x), Some(y)) => as_text(x).cmp(&as_text(y)),
        (Some(_), None) => CmpOrdering::Less,
        (None, Some(_)) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

#[async_trait]
impl ContentSource for MemorySource {
    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        let mut results: Vec<&Value> = self
            .documents
            .iter()
            .filter(|doc| query.filters.iter().all(|f| matches(doc, f)))
            .collect();

        results.sort_by(|a, b| {
            for ordering in &query.orderings {
                let (va, vb) = (lookup(a, &ordering.field), lookup(b, &ordering.field));
                let ord = match (ordering.direction, va.is_some() && vb.is_some()) {
                    (Direction::Desc, true) => compare(vb, va),
                    _ => compare(va, vb),
                };
                if ord != CmpOrdering::Equal {
                    return ord;
                }
            }
            CmpOrdering::Equal
        });

        Ok(results
            .into_iter()
            .take(query.page_size)
            .cloned()
            .collect())
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Value>> {
        Ok(self
            .documents
            .iter()
            .filter(|doc| {
                doc.get("id")
                    .and_then(Value::as_str)
                    .is_some_and(|id| ids.iter().any(|wanted| wanted == id))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> MemorySource {
        MemorySource::new(vec![
            json!({ "id": "w1", "type": "weekly_highlights", "data": { "week_start": "2024-12-09" } }),
            json!({ "id": "w2", "type": "weekly_highlights", "data": { "week_start": "2024-12-16" } }),
            json!({ "id": "w0", "type": "weekly_highlights", "data": {} }),
            json!({ "id": "m1", "type": "daily_menu", "data": { "date": "2024-12-20" } }),
            json!({ "id": "m2", "type": "daily_menu", "data": { "date": "2024-12-21" } }),
            json!({ "id": "d1", "type": "dish", "data": { "title": "Soupe", "price": 7 } }),
        ])
    }

    #[tokio::test]
    async fn test_filter_by_type_and_field() {
        let query = Query::of_type("daily_menu")
            .filter(Filter::at("my.daily_menu.date", "2024-12-21"))
            .page_size(1);
        let results = store().query(&query).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["id"], "m2");
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let query = Query::of_type("daily_menu").filter(Filter::at("my.daily_menu.date", "1999-01-01"));
        assert!(store().query(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_order_desc_missing_last() {
        let query = Query::of_type("weekly_highlights")
            .order_by("my.weekly_highlights.week_start", Direction::Desc);
        let ids: Vec<_> = store()
            .query(&query)
            .await
            .unwrap()
            .iter()
            .map(|d| d["id"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["w2", "w1", "w0"]);
    }

    #[tokio::test]
    async fn test_page_size_limits_results() {
        let query = Query::of_type("weekly_highlights").page_size(2);
        assert_eq!(store().query(&query).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_numeric_field_match() {
        let query = Query::of_type("dish").filter(Filter::at("my.dish.price", "7"));
        assert_eq!(store().query(&query).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_by_ids_skips_unknown() {
        let docs = store()
            .get_by_ids(&["d1".to_string(), "nope".to_string()])
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["id"], "d1");
    }

    #[test]
    fn test_from_value_accepts_results_object() {
        let source = MemorySource::from_value(json!({ "results": [{ "id": "a" }] })).unwrap();
        assert_eq!(source.len(), 1);
        assert!(MemorySource::from_value(json!("nope")).is_err());
    }
}
