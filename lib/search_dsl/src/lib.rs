//! Backend-agnostic search query DSL.
//!
//! Provides the building blocks a filter layer needs to talk to an
//! Elasticsearch-flavoured search backend without depending on a client
//! library: boolean/term/range expressions, terms/filter/scripted-metric
//! aggregations, a query accumulator that keeps post-filters together with
//! their metadata, and a typed view over the aggregation result tree.
//!
//! The DSL itself never performs I/O. Queries compile to `serde_json::Value`
//! and result trees are parsed back from the backend's JSON response.

pub mod agg;
pub mod expr;
pub mod query;
pub mod result;
pub mod script;

pub use agg::{Agg, FilterAgg, ScriptedMetricAgg, TermsAgg, TermsSource};
pub use expr::{BoolExpr, Expr, KeyRange};
pub use query::{AttrTag, FilterMeta, PostFilter, SearchQuery, ValueDomain};
pub use result::{AggResult, AggResults, Bucket, BucketKey, ResultParseError, SearchResult};
pub use script::Script;
