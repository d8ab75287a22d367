//! Float range facets.
//!
//! Floats are continuous, so there is no per-value facet: the baseline
//! buckets documents per attribute id (a script shifts the packed key), and
//! each selected attribute gets a bare filter branch whose document count
//! answers "how many documents carry this attribute under the other
//! filters". An optional scripted-metric branch accumulates per-attribute
//! min/max for rendering slider bounds.

use std::collections::HashSet;

use itertools::Itertools;
use search_dsl::{
    Agg, AggResult, BoolExpr, Expr, FilterAgg, Script, ScriptedMetricAgg, SearchQuery,
    SearchResult, TermsAgg, ValueDomain,
};

use crate::codec::{AttrId, attr_key_bounds};
use crate::filter::branch::{Branch, BranchNames};
use crate::filter::build;
use crate::filter::facet::DEFAULT_NAMESPACE;
use crate::params::{Params, group_attr_params};
use crate::result::{AttrRangeFacet, AttrRangeFacetResult};
use crate::selection::{FloatBounds, RangeSelection};

const RANGE_AGG_SIZE: usize = 100;

/// Buckets a packed-key field by attribute id.
const ATTR_ID_SCRIPT: &str = "doc[params.field].value >>> 32";

/// Faceting filter over a packed float-attribute field.
#[derive(Debug, Clone)]
pub struct AttrRangeFacetFilter {
    name: String,
    field: String,
    alias: String,
    namespace: String,
    agg_size: usize,
    compute_min_max: bool,
}

impl AttrRangeFacetFilter {
    pub fn new(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        AttrRangeFacetFilter {
            name: name.into(),
            field: field.into(),
            alias: alias.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            agg_size: RANGE_AGG_SIZE,
            compute_min_max: false,
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_agg_size(mut self, size: usize) -> Self {
        self.agg_size = size;
        self
    }

    /// Also compute per-attribute value extents (an extra scripted-metric
    /// branch in the query).
    pub fn with_min_max(mut self) -> Self {
        self.compute_min_max = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Extract this filter's range selection from request parameters.
    pub fn parse(&self, params: &Params) -> RangeSelection {
        let mut selection = RangeSelection::default();
        for (attr_id, attr_params) in group_attr_params(params, &self.alias) {
            let bounds = FloatBounds::from_params(&attr_params);
            if !bounds.is_empty() {
                selection.insert(attr_id, bounds);
            }
        }
        selection
    }

    /// Apply the selection as post-filters carrying this filter's metadata.
    pub fn apply_filters(&self, query: &mut SearchQuery, selection: &RangeSelection) {
        for (attr_id, bounds) in selection.iter() {
            if let Some(expr) = build::float_range_expr(&self.field, attr_id, bounds) {
                let meta =
                    build::attr_filter_meta(&self.name, &self.alias, ValueDomain::Float, attr_id);
                query.add_post_filter(expr, meta);
            }
        }
    }

    /// Contribute this filter's aggregation branches.
    pub fn apply_aggs(&self, query: &mut SearchQuery) {
        let names = self.branch_names();
        let post = query.post_filters().to_vec();

        let baseline_filters = post
            .iter()
            .filter(|pf| !pf.meta.has_tag(&self.namespace))
            .map(|pf| pf.expr.clone())
            .collect_vec();
        let id_script = Script::painless(ATTR_ID_SCRIPT).with_param("field", self.field.clone());
        let full_agg = Agg::Terms(TermsAgg::script(id_script, self.agg_size));
        match Expr::and(baseline_filters) {
            Some(filter_expr) => query.add_agg(
                names.render(Branch::BaselineFilter),
                Agg::Filter(
                    FilterAgg::new(filter_expr).with_agg(names.render(Branch::Baseline), full_agg),
                ),
            ),
            None => query.add_agg(names.render(Branch::Baseline), full_agg),
        }

        for post_filter in &post {
            let Some(tag) = post_filter.meta.attr else {
                continue;
            };
            if tag.domain != ValueDomain::Float {
                continue;
            }
            // The id-slot range keeps foreign attributes out of the count
            // and stays in place even when it is the only clause.
            let (slot_start, slot_end) = attr_key_bounds(tag.attr_id);
            let slot = Expr::range(&self.field, Some(slot_start), Some(slot_end));
            let mut clauses = post
                .iter()
                .filter(|pf| pf.meta.attr != Some(tag))
                .map(|pf| pf.expr.clone())
                .collect_vec();
            let filter_expr = if clauses.is_empty() {
                slot
            } else {
                clauses.push(slot);
                Expr::Bool(BoolExpr::must(clauses))
            };
            query.add_agg(
                names.render(Branch::Attr(tag.attr_id)),
                Agg::Filter(FilterAgg::new(filter_expr)),
            );
        }

        if self.compute_min_max {
            self.apply_min_max_agg(query, &names, &post);
        }
    }

    fn apply_min_max_agg(
        &self,
        query: &mut SearchQuery,
        names: &BranchNames<'_>,
        post: &[search_dsl::PostFilter],
    ) {
        let metric = Agg::ScriptedMetric(min_max_agg(&self.field));
        // Extents reflect the other features' filters only: any filter of
        // this family would anchor min/max to its own selection.
        let other_filters = post
            .iter()
            .filter(|pf| !pf.meta.has_tag(&self.namespace) && !pf.meta.has_tag(&self.name))
            .map(|pf| pf.expr.clone())
            .collect_vec();
        match Expr::and(other_filters) {
            Some(filter_expr) => query.add_agg(
                names.render(Branch::MinMaxFilter),
                Agg::Filter(FilterAgg::new(filter_expr).with_agg(names.render(Branch::MinMax), metric)),
            ),
            None => query.add_agg(names.render(Branch::MinMax), metric),
        }
    }

    /// Decode this filter's branches from the result tree.
    pub fn decode(&self, result: &SearchResult, selection: &RangeSelection) -> AttrRangeFacetResult {
        let names = self.branch_names();
        let mut facets = AttrRangeFacetResult::new(&self.name, &self.alias);
        let mut processed: HashSet<AttrId> = HashSet::new();

        // Selected attributes: their branch's filter count is the real one.
        for (agg_name, agg_result) in result.aggs.iter() {
            let Some(Branch::Attr(attr_id)) = names.parse(agg_name) else {
                continue;
            };
            let Some(doc_count) = agg_result.doc_count() else {
                log::debug!("branch {agg_name} is not a filter node, skipping");
                continue;
            };
            facets.add_facet(AttrRangeFacet {
                attr_id,
                count: doc_count,
                selected: selection.has_selection(attr_id),
                min: None,
                max: None,
            });
            processed.insert(attr_id);
        }

        let baseline = result
            .aggs
            .get(&names.render(Branch::Baseline))
            .or_else(|| {
                result
                    .aggs
                    .get(&names.render(Branch::BaselineFilter))?
                    .sub_agg(&names.render(Branch::Baseline))
            });
        for bucket in baseline.and_then(AggResult::buckets).unwrap_or_default() {
            // Script-sourced buckets key by attribute id, often stringified.
            let Some(attr_id64) = bucket.key.as_u64() else {
                log::debug!("skipping non-numeric attribute bucket in {}", self.name);
                continue;
            };
            let Ok(attr_id) = AttrId::try_from(attr_id64) else {
                continue;
            };
            if !processed.contains(&attr_id) {
                // A selected attribute always has its own branch, so
                // baseline-only attributes are never selected.
                facets.add_facet(AttrRangeFacet {
                    attr_id,
                    count: bucket.doc_count,
                    selected: false,
                    min: None,
                    max: None,
                });
            }
        }

        self.merge_min_max(result, &names, &mut facets);
        facets
    }

    fn merge_min_max(
        &self,
        result: &SearchResult,
        names: &BranchNames<'_>,
        facets: &mut AttrRangeFacetResult,
    ) {
        let metric = result
            .aggs
            .get(&names.render(Branch::MinMax))
            .or_else(|| {
                result
                    .aggs
                    .get(&names.render(Branch::MinMaxFilter))?
                    .sub_agg(&names.render(Branch::MinMax))
            })
            .and_then(AggResult::metric_value);
        let Some(per_attr) = metric.and_then(|value| value.as_object()) else {
            return;
        };
        for (raw_id, extent) in per_attr {
            let Ok(attr_id) = raw_id.parse::<AttrId>() else {
                log::debug!("skipping min/max entry with non-numeric id {raw_id}");
                continue;
            };
            let Some(facet) = facets.get_facet_mut(attr_id) else {
                continue;
            };
            let values = extent.as_array();
            facet.min = values.and_then(|pair| pair.first()).and_then(|v| v.as_f64());
            facet.max = values.and_then(|pair| pair.get(1)).and_then(|v| v.as_f64());
        }
    }

    fn branch_names(&self) -> BranchNames<'_> {
        BranchNames {
            namespace: &self.namespace,
            name: &self.name,
        }
    }
}

/// Per-attribute min/max accumulation over a packed float field.
fn min_max_agg(field: &str) -> ScriptedMetricAgg {
    ScriptedMetricAgg {
        init_script: "state.extents = [:]".to_string(),
        map_script: "\
            for (packed in doc[params.field]) { \
            def id = String.valueOf(packed >>> 32); \
            def value = (double)Float.intBitsToFloat((int)(packed & 0xFFFFFFFFL)); \
            def extent = state.extents.get(id); \
            if (extent == null) { state.extents.put(id, [value, value]); } \
            else { \
            if (value < extent[0]) { extent[0] = value; } \
            if (value > extent[1]) { extent[1] = value; } } }"
            .to_string(),
        combine_script: "return state.extents".to_string(),
        reduce_script: "\
            def merged = [:]; \
            for (extents in states) { \
            if (extents == null) { continue; } \
            for (entry in extents.entrySet()) { \
            def extent = merged.get(entry.getKey()); \
            if (extent == null) { merged.put(entry.getKey(), entry.getValue()); } \
            else { \
            if (entry.getValue()[0] < extent[0]) { extent[0] = entry.getValue()[0]; } \
            if (entry.getValue()[1] > extent[1]) { extent[1] = entry.getValue()[1]; } } } } \
            return merged"
            .to_string(),
        params: serde_json::Map::new(),
    }
    .with_param("field", field)
}
