//! Content query model.
//!
//! Queries are equality filters over document paths, optional orderings and
//! a page size. Paths follow the CMS conventions:
//!
//! - `document.type`, `document.id` address document metadata
//! - `my.<type>.<field>` addresses a field of the document's `data`
//!
//! An empty result is a normal outcome, not an error.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{DISH_TYPE, DishMap, Document};
use crate::error::{ArdoiseError, Result};

/// Largest page the store will return in one request.
pub const MAX_PAGE_SIZE: usize = 100;

/// A filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `path == value`
    At { path: String, value: String },
    /// `path ∈ values`
    In { path: String, values: Vec<String> },
}

impl Filter {
    pub fn at(path: &str, value: &str) -> Self {
        Filter::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    pub fn any(path: &str, values: &[String]) -> Self {
        Filter::In {
            path: path.to_string(),
            values: values.to_vec(),
        }
    }

    /// Filter on the document type.
    pub fn doc_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Predicate syntax understood by the REST API, e.g.
    /// `[at(document.type, "daily_menu")]`.
    pub fn to_predicate(&self) -> String {
        match self {
            Filter::At { path, value } => format!("[at({}, {})]", path, quote(value)),
            Filter::In { path, values } => {
                let list = values.iter().map(|v| quote(v)).collect::<Vec<_>>();
                format!("[in({}, [{}])]", path, list.join(", "))
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub field: String,
    pub direction: Direction,
}

impl Ordering {
    /// Ordering syntax, e.g. `my.weekly_highlights.week_start desc`.
    pub fn to_clause(&self) -> String {
        match self.direction {
            Direction::Asc => self.field.clone(),
            Direction::Desc => format!("{} desc", self.field),
        }
    }
}

/// A document query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub orderings: Vec<Ordering>,
    pub page_size: usize,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            orderings: Vec::new(),
            page_size: 20,
        }
    }
}

impl Query {
    /// All documents of a given type.
    pub fn of_type(doc_type: &str) -> Self {
        Self::default().filter(Filter::doc_type(doc_type))
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.orderings.push(Ordering {
            field: field.to_string(),
            direction,
        });
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// The `q` parameter: all predicates wrapped in one list.
    pub fn predicates(&self) -> String {
        let inner: String = self.filters.iter().map(Filter::to_predicate).collect();
        format!("[{}]", inner)
    }

    /// The `orderings` parameter, if any ordering is set.
    pub fn orderings_param(&self) -> Option<String> {
        if self.orderings.is_empty() {
            return None;
        }
        let clauses = self
            .orderings
            .iter()
            .map(Ordering::to_clause)
            .collect::<Vec<_>>();
        Some(format!("[{}]", clauses.join(", ")))
    }
}

/// Read-only access to the content store.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Run a query and return the raw documents.
    async fn query(&self, query: &Query) -> Result<Vec<Value>>;

    /// Fetch documents by id. Unknown ids are simply absent from the result.
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<Value>>;
}

/// Decode a raw document into a typed one.
pub fn decode<T: DeserializeOwned>(raw: Value) -> Result<Document<T>> {
    serde_json::from_value(raw)
        .map_err(|e| ArdoiseError::Query(format!("Malformed document: {}", e)))
}

/// Run a query and decode what decodes. Malformed documents are logged and
/// left out, so one bad entry in a listing does not hide the others.
pub async fn fetch_decodable<T: DeserializeOwned>(
    source: &dyn ContentSource,
    query: &Query,
) -> Result<Vec<Document<T>>> {
    Ok(source
        .query(query)
        .await?
        .into_iter()
        .filter_map(decode_or_skip)
        .collect())
}

fn decode_or_skip<T: DeserializeOwned>(raw: Value) -> Option<Document<T>> {
    let id = raw.get("id").and_then(Value::as_str).unwrap_or("?").to_string();
    match decode(raw) {
        Ok(doc) => Some(doc),
        Err(e) => {
            log::warn!("Skipping document {}: {}", id, e);
            None
        }
    }
}

/// Run a query and decode the first result, if any.
pub async fn fetch_first<T: DeserializeOwned>(
    source: &dyn ContentSource,
    query: &Query,
) -> Result<Option<Document<T>>> {
    let first = source.query(query).await?.into_iter().next();
    first.map(decode).transpose()
}

/// Batch-resolve dish ids into a dish map.
///
/// Documents that are not dishes, or that fail to decode, are left out; the
/// composers skip whatever is missing.
pub async fn resolve_dishes(source: &dyn ContentSource, ids: &[String]) -> Result<DishMap> {
    if ids.is_empty() {
        return Ok(DishMap::default());
    }

    let mut unique: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }

    let raw = source.get_by_ids(&unique).await?;
    let map: DishMap = raw
        .into_iter()
        .filter(|doc| {
            doc.get("type")
                .and_then(Value::as_str)
                .is_none_or(|t| t == DISH_TYPE)
        })
        .filter_map(decode_or_skip::<super::DishData>)
        .collect();

    for id in &unique {
        if map.get(id).is_none() {
            log::debug!("Dish {} did not resolve", id);
        }
    }
    log::debug!("Resolved {} of {} dish(es)", map.len(), unique.len());

    Ok(map)
}
