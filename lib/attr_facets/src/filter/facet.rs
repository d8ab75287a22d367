//! Discrete facet filters: multi-select faceting over integer and boolean
//! attributes.
//!
//! One filter owns one packed field and composes, per request, a baseline
//! aggregation shared by every attribute without a selection plus one
//! branch per selected attribute. A selected attribute's branch applies
//! every other active post-filter but never its own, which is what lets
//! users widen their own selection without losing sight of alternatives.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use search_dsl::{Agg, AggResult, Expr, FilterAgg, SearchQuery, SearchResult, TermsAgg};

use crate::codec::{AttrId, merge_bool, merge_int};
use crate::domain::DiscreteDomain;
use crate::filter::branch::{Branch, BranchNames};
use crate::filter::build;
use crate::params::{Op, Params, group_attr_params};
use crate::result::{AttrFacetResult, AttrFacetValue};
use crate::selection::Selection;

/// Namespace shared by all filters contributing to one request, unless
/// overridden. Post-filters tagged with the namespace belong to other
/// filter features and are excluded from baseline aggregations.
pub const DEFAULT_NAMESPACE: &str = "qf";

const INT_FULL_AGG_SIZE: usize = 10_000;
const INT_SINGLE_AGG_SIZE: usize = 100;
const BOOL_FULL_AGG_SIZE: usize = 100;

/// Faceting filter over a packed integer- or boolean-attribute field.
#[derive(Debug, Clone)]
pub struct AttrFacetFilter {
    name: String,
    field: String,
    alias: String,
    namespace: String,
    domain: DiscreteDomain,
    full_agg_size: usize,
    single_agg_size: usize,
    attr_values: HashMap<AttrId, Vec<u32>>,
}

impl AttrFacetFilter {
    /// Facet filter for integer attributes.
    pub fn new_int(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(
            name,
            field,
            alias,
            DiscreteDomain::Int,
            INT_FULL_AGG_SIZE,
            INT_SINGLE_AGG_SIZE,
        )
    }

    /// Facet filter for boolean attributes.
    pub fn new_bool(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        // Two values per attribute; the per-attribute branch size is fixed.
        Self::new(name, field, alias, DiscreteDomain::Bool, BOOL_FULL_AGG_SIZE, 2)
    }

    fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        alias: impl Into<String>,
        domain: DiscreteDomain,
        full_agg_size: usize,
        single_agg_size: usize,
    ) -> Self {
        AttrFacetFilter {
            name: name.into(),
            field: field.into(),
            alias: alias.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            domain,
            full_agg_size,
            single_agg_size,
            attr_values: HashMap::new(),
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_full_agg_size(mut self, size: usize) -> Self {
        self.full_agg_size = size;
        self
    }

    pub fn with_single_agg_size(mut self, size: usize) -> Self {
        self.single_agg_size = size;
        self
    }

    /// Bound per-attribute aggregations to known value ids (integer
    /// attributes with large cardinality).
    pub fn with_attr_values(mut self, attr_values: HashMap<AttrId, Vec<u32>>) -> Self {
        self.attr_values = attr_values;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Extract this filter's selection from request parameters.
    pub fn parse(&self, params: &Params) -> Selection {
        let mut selection = Selection::default();
        for (attr_id, attr_params) in group_attr_params(params, &self.alias) {
            let values = attr_params
                .get(Op::Exact)
                .iter()
                .filter_map(|raw| self.domain.parse_value(raw))
                .collect_vec();
            if !values.is_empty() {
                selection.insert(attr_id, values);
            }
        }
        selection
    }

    /// Apply the selection as post-filters carrying this filter's metadata.
    pub fn apply_filters(&self, query: &mut SearchQuery, selection: &Selection) {
        for (attr_id, values) in selection.iter() {
            if let Some(expr) = build::discrete_expr(&self.field, attr_id, values) {
                let meta = build::attr_filter_meta(
                    &self.name,
                    &self.alias,
                    self.domain.value_domain(),
                    attr_id,
                );
                query.add_post_filter(expr, meta);
            }
        }
    }

    /// Contribute this filter's aggregation branches, composed against the
    /// post-filters accumulated so far (from every filter of the request).
    pub fn apply_aggs(&self, query: &mut SearchQuery) {
        let names = self.branch_names();
        let post = query.post_filters().to_vec();

        let baseline_filters = post
            .iter()
            .filter(|pf| !pf.meta.has_tag(&self.namespace))
            .map(|pf| pf.expr.clone())
            .collect_vec();
        let full_agg = Agg::Terms(TermsAgg::field(&self.field, self.full_agg_size));
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
            if tag.domain != self.domain.value_domain() {
                continue;
            }
            let attr_agg = Agg::Terms(self.single_attr_agg(tag.attr_id));
            let other_filters = post
                .iter()
                .filter(|pf| pf.meta.attr != Some(tag))
                .map(|pf| pf.expr.clone())
                .collect_vec();
            match Expr::and(other_filters) {
                Some(filter_expr) => query.add_agg(
                    names.render(Branch::AttrFilter(tag.attr_id)),
                    Agg::Filter(
                        FilterAgg::new(filter_expr)
                            .with_agg(names.render(Branch::Attr(tag.attr_id)), attr_agg),
                    ),
                ),
                None => query.add_agg(names.render(Branch::Attr(tag.attr_id)), attr_agg),
            }
        }
    }

    /// Decode this filter's branches from the result tree.
    ///
    /// Per-attribute branches are read first; the baseline then fills in
    /// every attribute that has no branch of its own. Decoding is pure:
    /// the same result tree always yields the same facets.
    pub fn decode(&self, result: &SearchResult, selection: &Selection) -> AttrFacetResult {
        let names = self.branch_names();
        let mut facets = AttrFacetResult::new(&self.name, &self.alias);
        let mut processed: HashSet<AttrId> = HashSet::new();

        for (agg_name, agg_result) in result.aggs.iter() {
            let (attr_id, buckets) = match names.parse(agg_name) {
                Some(Branch::Attr(attr_id)) => (attr_id, agg_result.buckets()),
                Some(Branch::AttrFilter(attr_id)) => (
                    attr_id,
                    agg_result
                        .sub_agg(&names.render(Branch::Attr(attr_id)))
                        .and_then(AggResult::buckets),
                ),
                _ => continue,
            };
            for bucket in buckets.unwrap_or_default() {
                self.add_bucket(&mut facets, selection, attr_id, bucket, true);
            }
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
        for bucket in baseline.and_then(|agg| agg.buckets()).unwrap_or_default() {
            let Some(key) = bucket.key.as_u64() else {
                continue;
            };
            let (attr_id, _) = self.domain.split(key);
            if !processed.contains(&attr_id) {
                self.add_bucket(&mut facets, selection, attr_id, bucket, false);
            }
        }

        facets
    }

    fn add_bucket(
        &self,
        facets: &mut AttrFacetResult,
        selection: &Selection,
        branch_attr_id: AttrId,
        bucket: &search_dsl::Bucket,
        from_own_branch: bool,
    ) {
        let Some(key) = bucket.key.as_u64() else {
            log::debug!("skipping non-numeric bucket key in {}", self.name);
            return;
        };
        let (attr_id, value) = self.domain.split(key);
        if attr_id != branch_attr_id {
            // A bucket leaked across id slots; never attribute it to this
            // branch's facet.
            log::debug!(
                "discarding bucket of attribute {attr_id} found in branch of {branch_attr_id}"
            );
            return;
        }
        let selected = from_own_branch && selection.contains(attr_id, &value);
        facets.add_attr_value(
            attr_id,
            AttrFacetValue::new(
                value,
                bucket.doc_count,
                selected,
                selection.has_selection(attr_id),
            ),
        );
    }

    fn single_attr_agg(&self, attr_id: AttrId) -> TermsAgg {
        match self.domain {
            DiscreteDomain::Int => {
                let agg = TermsAgg::field(&self.field, self.single_agg_size);
                match self.attr_values.get(&attr_id) {
                    Some(value_ids) => agg.with_include(
                        value_ids
                            .iter()
                            .map(|value_id| merge_int(attr_id, *value_id))
                            .collect(),
                    ),
                    None => agg,
                }
            }
            DiscreteDomain::Bool => TermsAgg::field(&self.field, self.single_agg_size)
                .with_include(vec![merge_bool(attr_id, false), merge_bool(attr_id, true)]),
        }
    }

    fn branch_names(&self) -> BranchNames<'_> {
        BranchNames {
            namespace: &self.namespace,
            name: &self.name,
        }
    }
}
