use indexmap::IndexMap;

use crate::codec::AttrId;
use crate::domain::AttrValue;
use crate::params::{AttrParams, Op};

/// Parsed discrete selections of one filter: attribute id → chosen values,
/// in request order.
///
/// Built once per request by [`parse`](crate::filter::AttrFacetFilter::parse)
/// and shared read-only between filter application and result decoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    values: IndexMap<AttrId, Vec<AttrValue>>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, attr_id: AttrId, values: Vec<AttrValue>) {
        self.values.insert(attr_id, values);
    }

    pub fn values_for(&self, attr_id: AttrId) -> &[AttrValue] {
        self.values
            .get(&attr_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, attr_id: AttrId, value: &AttrValue) -> bool {
        self.values_for(attr_id).contains(value)
    }

    pub fn has_selection(&self, attr_id: AttrId) -> bool {
        !self.values_for(attr_id).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttrId, &[AttrValue])> {
        self.values
            .iter()
            .map(|(attr_id, values)| (*attr_id, values.as_slice()))
    }
}

/// Inclusive float bounds of one attribute's range selection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FloatBounds {
    pub gte: Option<f32>,
    pub lte: Option<f32>,
}

impl FloatBounds {
    /// Extract bounds from grouped parameters. When an operator is supplied
    /// more than once, the last parseable value wins. NaN never parses.
    pub(crate) fn from_params(attr_params: &AttrParams) -> FloatBounds {
        FloatBounds {
            gte: last_float(attr_params.get(Op::Gte)),
            lte: last_float(attr_params.get(Op::Lte)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.gte.is_none() && self.lte.is_none()
    }
}

fn last_float(raw_values: &[String]) -> Option<f32> {
    raw_values
        .iter()
        .filter_map(|raw| raw.parse::<f32>().ok())
        .filter(|value| !value.is_nan())
        .last()
}

/// Parsed range selections of one float filter: attribute id → bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeSelection {
    bounds: IndexMap<AttrId, FloatBounds>,
}

impl RangeSelection {
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    pub(crate) fn insert(&mut self, attr_id: AttrId, bounds: FloatBounds) {
        self.bounds.insert(attr_id, bounds);
    }

    pub fn bounds_for(&self, attr_id: AttrId) -> Option<FloatBounds> {
        self.bounds.get(&attr_id).copied()
    }

    pub fn has_selection(&self, attr_id: AttrId) -> bool {
        self.bounds.contains_key(&attr_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttrId, FloatBounds)> + '_ {
        self.bounds.iter().map(|(attr_id, bounds)| (*attr_id, *bounds))
    }
}
