use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Failure to interpret a backend response as a result tree.
///
/// Only structural violations surface as errors; individually malformed
/// buckets are skipped during decoding instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResultParseError {
    #[error("expected a JSON object at {context}")]
    NotAnObject { context: String },
}

/// Key of a terms bucket.
///
/// Field-sourced aggregations return numeric keys; script-sourced ones may
/// stringify them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketKey {
    Num(u64),
    Str(String),
}

impl BucketKey {
    /// The key as an unsigned integer, parsing the string form if needed.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            BucketKey::Num(key) => Some(*key),
            BucketKey::Str(raw) => raw.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: BucketKey,
    pub doc_count: u64,
}

/// Named aggregation results, in response order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AggResults(IndexMap<String, AggResult>);

impl AggResults {
    pub fn get(&self, name: &str) -> Option<&AggResult> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggResult)> {
        self.0.iter().map(|(name, agg)| (name.as_str(), agg))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn from_object(
        obj: &serde_json::Map<String, Value>,
        context: &str,
    ) -> Result<Self, ResultParseError> {
        let mut aggs = IndexMap::new();
        for (name, node) in obj {
            if name == "doc_count" {
                continue;
            }
            let Some(node_obj) = node.as_object() else {
                // Sibling scalars (e.g. bucket metadata) are not aggregations.
                continue;
            };
            let parsed = AggResult::from_object(node_obj, &format!("{context}.{name}"))?;
            aggs.insert(name.clone(), parsed);
        }
        Ok(AggResults(aggs))
    }
}

/// One aggregation's result.
#[derive(Debug, Clone, PartialEq)]
pub enum AggResult {
    /// Terms buckets, in response order.
    Terms { buckets: Vec<Bucket> },
    /// A filter node: matching document count plus nested aggregations.
    Filter { doc_count: u64, aggs: AggResults },
    /// A metric value (scalar or object, backend-defined).
    Metric { value: Value },
}

impl AggResult {
    pub fn buckets(&self) -> Option<&[Bucket]> {
        match self {
            AggResult::Terms { buckets } => Some(buckets),
            _ => None,
        }
    }

    pub fn doc_count(&self) -> Option<u64> {
        match self {
            AggResult::Filter { doc_count, .. } => Some(*doc_count),
            _ => None,
        }
    }

    pub fn metric_value(&self) -> Option<&Value> {
        match self {
            AggResult::Metric { value } => Some(value),
            _ => None,
        }
    }

    /// Nested aggregation lookup; `None` for leaf results.
    pub fn sub_agg(&self, name: &str) -> Option<&AggResult> {
        match self {
            AggResult::Filter { aggs, .. } => aggs.get(name),
            _ => None,
        }
    }

    fn from_object(
        obj: &serde_json::Map<String, Value>,
        context: &str,
    ) -> Result<Self, ResultParseError> {
        if let Some(raw_buckets) = obj.get("buckets") {
            let mut buckets = Vec::new();
            for raw in raw_buckets.as_array().into_iter().flatten() {
                match parse_bucket(raw) {
                    Some(bucket) => buckets.push(bucket),
                    None => log::debug!("skipping malformed bucket in {context}: {raw}"),
                }
            }
            return Ok(AggResult::Terms { buckets });
        }
        if let Some(value) = obj.get("value") {
            return Ok(AggResult::Metric {
                value: value.clone(),
            });
        }
        let doc_count = obj.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
        let aggs = AggResults::from_object(obj, context)?;
        Ok(AggResult::Filter { doc_count, aggs })
    }
}

fn parse_bucket(raw: &Value) -> Option<Bucket> {
    let obj = raw.as_object()?;
    let key = match obj.get("key")? {
        Value::Number(num) => BucketKey::Num(num.as_u64()?),
        Value::String(raw) => BucketKey::Str(raw.clone()),
        _ => return None,
    };
    let doc_count = obj.get("doc_count").and_then(Value::as_u64).unwrap_or(0);
    Some(Bucket { key, doc_count })
}

/// A fully-materialized backend response, reduced to what filter decoding
/// needs: the hit total and the aggregation tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub total: Option<u64>,
    pub aggs: AggResults,
}

impl SearchResult {
    /// Parse a backend response body.
    ///
    /// Accepts both the bare `{"aggregations": {...}}` shape and a full
    /// search response with a `hits` section.
    pub fn from_json(body: &Value) -> Result<Self, ResultParseError> {
        let obj = body.as_object().ok_or_else(|| ResultParseError::NotAnObject {
            context: "response".to_string(),
        })?;
        let total = obj.get("hits").and_then(|hits| {
            let total = hits.get("total")?;
            total.as_u64().or_else(|| total.get("value")?.as_u64())
        });
        let aggs = match obj.get("aggregations") {
            Some(raw) => {
                let raw_obj = raw.as_object().ok_or_else(|| ResultParseError::NotAnObject {
                    context: "aggregations".to_string(),
                })?;
                AggResults::from_object(raw_obj, "aggregations")?
            }
            None => AggResults::default(),
        };
        Ok(SearchResult { total, aggs })
    }
}
