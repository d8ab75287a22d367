use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use crate::expr::Expr;
use crate::script::Script;

/// What a terms aggregation buckets by.
#[derive(Debug, Clone, PartialEq)]
pub enum TermsSource {
    Field(String),
    Script(Script),
}

/// Bucket documents by distinct values of a field or script.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAgg {
    pub source: TermsSource,
    pub size: usize,
    /// Restrict buckets to these exact keys.
    pub include: Option<Vec<u64>>,
}

impl TermsAgg {
    pub fn field(field: impl Into<String>, size: usize) -> Self {
        TermsAgg {
            source: TermsSource::Field(field.into()),
            size,
            include: None,
        }
    }

    pub fn script(script: Script, size: usize) -> Self {
        TermsAgg {
            source: TermsSource::Script(script),
            size,
            include: None,
        }
    }

    pub fn with_include(mut self, values: Vec<u64>) -> Self {
        self.include = Some(values);
        self
    }
}

/// Restrict a set of named sub-aggregations to documents matching a filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterAgg {
    pub filter: Expr,
    pub aggs: IndexMap<String, Agg>,
}

impl FilterAgg {
    pub fn new(filter: Expr) -> Self {
        FilterAgg {
            filter,
            aggs: IndexMap::new(),
        }
    }

    pub fn with_agg(mut self, name: impl Into<String>, agg: Agg) -> Self {
        self.aggs.insert(name.into(), agg);
        self
    }
}

/// Map/combine/reduce metric aggregation evaluated on the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptedMetricAgg {
    pub init_script: String,
    pub map_script: String,
    pub combine_script: String,
    pub reduce_script: String,
    pub params: Map<String, Value>,
}

impl ScriptedMetricAgg {
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

/// An aggregation node.
#[derive(Debug, Clone, PartialEq)]
pub enum Agg {
    Terms(TermsAgg),
    Filter(FilterAgg),
    ScriptedMetric(ScriptedMetricAgg),
}

impl Agg {
    pub fn to_json(&self) -> Value {
        match self {
            Agg::Terms(terms) => {
                let mut body = Map::new();
                match &terms.source {
                    TermsSource::Field(field) => {
                        body.insert("field".to_string(), field.as_str().into());
                    }
                    TermsSource::Script(script) => {
                        body.insert("script".to_string(), script.to_json());
                    }
                }
                body.insert("size".to_string(), terms.size.into());
                if let Some(include) = &terms.include {
                    body.insert("include".to_string(), include.clone().into());
                }
                json!({ "terms": body })
            }
            Agg::Filter(filter) => {
                let mut node = Map::new();
                node.insert("filter".to_string(), filter.filter.to_json());
                if !filter.aggs.is_empty() {
                    node.insert("aggs".to_string(), compile_aggs(&filter.aggs));
                }
                Value::Object(node)
            }
            Agg::ScriptedMetric(metric) => {
                let mut body = json!({
                    "init_script": metric.init_script,
                    "map_script": metric.map_script,
                    "combine_script": metric.combine_script,
                    "reduce_script": metric.reduce_script,
                });
                if !metric.params.is_empty() {
                    body["params"] = Value::Object(metric.params.clone());
                }
                json!({ "scripted_metric": body })
            }
        }
    }
}

/// Compile a named aggregation map into its JSON form.
pub fn compile_aggs(aggs: &IndexMap<String, Agg>) -> Value {
    let mut compiled = Map::new();
    for (name, agg) in aggs {
        compiled.insert(name.clone(), agg.to_json());
    }
    Value::Object(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_agg_compiles_with_include_list() {
        let agg = Agg::Terms(TermsAgg::field("attr.bool", 2).with_include(vec![0b10, 0b11]));
        assert_eq!(
            agg.to_json(),
            json!({ "terms": { "field": "attr.bool", "size": 2, "include": [2, 3] } })
        );
    }

    #[test]
    fn filter_agg_compiles_nested_aggs() {
        let agg = Agg::Filter(
            FilterAgg::new(Expr::term("attr.int", 7))
                .with_agg("inner", Agg::Terms(TermsAgg::field("attr.int", 10))),
        );
        assert_eq!(
            agg.to_json(),
            json!({
                "filter": { "term": { "attr.int": 7 } },
                "aggs": { "inner": { "terms": { "field": "attr.int", "size": 10 } } },
            })
        );
    }

    #[test]
    fn bare_filter_agg_has_no_aggs_key() {
        let agg = Agg::Filter(FilterAgg::new(Expr::term("f", 1)));
        assert_eq!(agg.to_json(), json!({ "filter": { "term": { "f": 1 } } }));
    }
}
