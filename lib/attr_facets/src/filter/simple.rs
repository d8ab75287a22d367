//! Plain attribute filters.
//!
//! The simple variants only narrow the query: they add query-context
//! filters, attach no metadata and contribute no aggregations. Use the
//! facet variants when the UI needs counts.

use itertools::Itertools;
use search_dsl::{Expr, SearchQuery, ValueDomain};

use crate::codec::AttrId;
use crate::domain::DiscreteDomain;
use crate::filter::build;
use crate::params::{AttrParams, Op, Params, group_attr_params};
use crate::selection::FloatBounds;

/// A non-faceting filter over one packed-attribute field.
#[derive(Debug, Clone)]
pub struct AttrSimpleFilter {
    name: String,
    field: String,
    alias: String,
    domain: ValueDomain,
}

impl AttrSimpleFilter {
    pub fn new_int(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(name, field, alias, ValueDomain::Int)
    }

    pub fn new_bool(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(name, field, alias, ValueDomain::Bool)
    }

    pub fn new_float(name: impl Into<String>, field: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::new(name, field, alias, ValueDomain::Float)
    }

    fn new(
        name: impl Into<String>,
        field: impl Into<String>,
        alias: impl Into<String>,
        domain: ValueDomain,
    ) -> Self {
        AttrSimpleFilter {
            name: name.into(),
            field: field.into(),
            alias: alias.into(),
            domain,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Apply every parseable attribute constraint from `params` to the
    /// query context.
    pub fn apply(&self, query: &mut SearchQuery, params: &Params) {
        for (attr_id, attr_params) in group_attr_params(params, &self.alias) {
            if let Some(expr) = self.filter_expr(attr_id, &attr_params) {
                query.add_filter(expr);
            }
        }
    }

    fn filter_expr(&self, attr_id: AttrId, attr_params: &AttrParams) -> Option<Expr> {
        let discrete = |domain: DiscreteDomain| {
            let values = attr_params
                .get(Op::Exact)
                .iter()
                .filter_map(|raw| domain.parse_value(raw))
                .collect_vec();
            build::discrete_expr(&self.field, attr_id, &values)
        };
        match self.domain {
            ValueDomain::Int => discrete(DiscreteDomain::Int),
            ValueDomain::Bool => discrete(DiscreteDomain::Bool),
            ValueDomain::Float => {
                build::float_range_expr(&self.field, attr_id, FloatBounds::from_params(attr_params))
            }
        }
    }
}
