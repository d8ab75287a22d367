use std::collections::BTreeSet;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agg::{Agg, compile_aggs};
use crate::expr::Expr;

/// Value domain of a packed attribute filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    Int,
    Bool,
    Float,
}

/// Identifies the attribute a filter constrains, per value domain.
///
/// Domains share the packed-key trick on different fields, so the domain is
/// part of the identity: an integer filter on attribute 1 and a boolean
/// filter on attribute 1 are unrelated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AttrTag {
    pub domain: ValueDomain,
    pub attr_id: u32,
}

/// Metadata carried alongside a post-filter expression.
///
/// Tags group filters by the logical feature that produced them; the
/// attribute tag is the channel by which a facet composer recognizes and
/// excludes an attribute's own filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterMeta {
    pub tags: BTreeSet<String>,
    pub attr: Option<AttrTag>,
}

impl FilterMeta {
    pub fn tagged<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FilterMeta {
            tags: tags.into_iter().map(Into::into).collect(),
            attr: None,
        }
    }

    pub fn with_attr(mut self, tag: AttrTag) -> Self {
        self.attr = Some(tag);
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A filter applied after aggregation, kept with its metadata so that
/// aggregation composers can selectively exclude it.
#[derive(Debug, Clone, PartialEq)]
pub struct PostFilter {
    pub expr: Expr,
    pub meta: FilterMeta,
}

/// Accumulates the state of one search request: query-context filters,
/// post-filters with metadata, and named aggregations.
///
/// Insertion order is preserved everywhere; composers and decoders rely on
/// it.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    filters: Vec<Expr>,
    post_filters: Vec<PostFilter>,
    aggs: IndexMap<String, Agg>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query-context filter: restricts hits and every aggregation.
    pub fn add_filter(&mut self, expr: Expr) {
        self.filters.push(expr);
    }

    /// Add a post-filter: restricts hits only, leaving aggregations to
    /// opt in via their own filter nodes.
    pub fn add_post_filter(&mut self, expr: Expr, meta: FilterMeta) {
        self.post_filters.push(PostFilter { expr, meta });
    }

    pub fn add_agg(&mut self, name: impl Into<String>, agg: Agg) {
        self.aggs.insert(name.into(), agg);
    }

    pub fn filters(&self) -> &[Expr] {
        &self.filters
    }

    pub fn post_filters(&self) -> &[PostFilter] {
        &self.post_filters
    }

    pub fn aggs(&self) -> &IndexMap<String, Agg> {
        &self.aggs
    }

    /// Compile the accumulated state into the backend request body.
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        if !self.filters.is_empty() {
            let compiled: Vec<Value> = self.filters.iter().map(Expr::to_json).collect();
            body.insert(
                "query".to_string(),
                serde_json::json!({ "bool": { "filter": compiled } }),
            );
        }
        let post = Expr::and(self.post_filters.iter().map(|pf| pf.expr.clone()).collect());
        if let Some(post) = post {
            body.insert("post_filter".to_string(), post.to_json());
        }
        if !self.aggs.is_empty() {
            body.insert("aggs".to_string(), compile_aggs(&self.aggs));
        }
        Value::Object(body)
    }
}
