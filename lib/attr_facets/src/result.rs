//! Facet structures assembled from decoded aggregation results.
//!
//! Everything here is plain data, created per decoding pass and owned by
//! the caller.

use std::collections::HashMap;

use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::Serialize;

use crate::codec::AttrId;
use crate::domain::AttrValue;

/// One candidate value of a facet, with its document count and selection
/// state.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AttrFacetValue {
    pub value: AttrValue,
    pub count: u64,
    pub selected: bool,
    #[serde(skip)]
    siblings_selected: bool,
}

impl AttrFacetValue {
    pub(crate) fn new(value: AttrValue, count: u64, selected: bool, siblings_selected: bool) -> Self {
        AttrFacetValue {
            value,
            count,
            selected,
            siblings_selected,
        }
    }

    /// Display form of the count.
    ///
    /// When a sibling value of the same attribute is selected and this one
    /// is not, the count only covers documents matching the other active
    /// filters, so it is a lower bound and rendered as `+N`.
    pub fn count_text(&self) -> String {
        if self.siblings_selected && !self.selected {
            format!("+{}", self.count)
        } else {
            self.count.to_string()
        }
    }
}

/// All known values of one attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrFacet {
    pub attr_id: AttrId,
    values: Vec<AttrFacetValue>,
    selected: Vec<usize>,
    unselected: Vec<usize>,
    by_value: HashMap<AttrValue, usize>,
}

impl AttrFacet {
    fn new(attr_id: AttrId) -> Self {
        AttrFacet {
            attr_id,
            ..Default::default()
        }
    }

    fn add_value(&mut self, facet_value: AttrFacetValue) {
        let index = self.values.len();
        if facet_value.selected {
            self.selected.push(index);
        } else {
            self.unselected.push(index);
        }
        self.by_value.insert(facet_value.value, index);
        self.values.push(facet_value);
    }

    /// Every value, in decode order.
    pub fn all_values(&self) -> &[AttrFacetValue] {
        &self.values
    }

    /// Currently selected values only.
    pub fn selected_values(&self) -> impl Iterator<Item = &AttrFacetValue> {
        self.selected.iter().map(|index| &self.values[*index])
    }

    /// Values not currently selected.
    pub fn unselected_values(&self) -> impl Iterator<Item = &AttrFacetValue> {
        self.unselected.iter().map(|index| &self.values[*index])
    }

    pub fn get_value(&self, value: &AttrValue) -> Option<&AttrFacetValue> {
        self.by_value.get(value).map(|index| &self.values[*index])
    }
}

/// Decoded facets of one discrete filter, keyed by attribute id in decode
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrFacetResult {
    pub name: String,
    pub alias: String,
    facets: IndexMap<AttrId, AttrFacet>,
}

impl AttrFacetResult {
    pub(crate) fn new(name: &str, alias: &str) -> Self {
        AttrFacetResult {
            name: name.to_string(),
            alias: alias.to_string(),
            facets: IndexMap::new(),
        }
    }

    pub(crate) fn add_attr_value(&mut self, attr_id: AttrId, facet_value: AttrFacetValue) {
        self.facets
            .entry(attr_id)
            .or_insert_with(|| AttrFacet::new(attr_id))
            .add_value(facet_value);
    }

    pub fn get_facet(&self, attr_id: AttrId) -> Option<&AttrFacet> {
        self.facets.get(&attr_id)
    }

    pub fn facets(&self) -> impl Iterator<Item = &AttrFacet> {
        self.facets.values()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Attribute-level aggregate of one float attribute.
///
/// Range facets expose no discrete values; only how many documents carry
/// the attribute under the other active filters, and optionally the value
/// extent when the min/max branch was requested.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct AttrRangeFacet {
    pub attr_id: AttrId,
    pub count: u64,
    pub selected: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Decoded facets of one range filter.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrRangeFacetResult {
    pub name: String,
    pub alias: String,
    facets: IndexMap<AttrId, AttrRangeFacet>,
}

impl AttrRangeFacetResult {
    pub(crate) fn new(name: &str, alias: &str) -> Self {
        AttrRangeFacetResult {
            name: name.to_string(),
            alias: alias.to_string(),
            facets: IndexMap::new(),
        }
    }

    pub(crate) fn add_facet(&mut self, facet: AttrRangeFacet) {
        self.facets.insert(facet.attr_id, facet);
    }

    pub(crate) fn get_facet_mut(&mut self, attr_id: AttrId) -> Option<&mut AttrRangeFacet> {
        self.facets.get_mut(&attr_id)
    }

    pub fn get_facet(&self, attr_id: AttrId) -> Option<&AttrRangeFacet> {
        self.facets.get(&attr_id)
    }

    pub fn facets(&self) -> impl Iterator<Item = &AttrRangeFacet> {
        self.facets.values()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}
