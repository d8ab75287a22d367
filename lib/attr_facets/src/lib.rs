//! Dynamic per-attribute faceted search filtering.
//!
//! Documents carry an arbitrary set of `(attribute id, value)` pairs packed
//! into single integers and indexed as one flat field per value domain
//! (integer, boolean, float). This crate turns flat request parameters into
//! filter expressions over those packed fields, composes the aggregation
//! trees that implement multi-select faceting in a single backend round
//! trip, and decodes the result trees back into per-attribute facets.
//!
//! The flow per request, per filter:
//!
//! 1. [`parse`](AttrFacetFilter::parse) request parameters into a selection;
//! 2. [`apply_filters`](AttrFacetFilter::apply_filters) to the query;
//! 3. [`apply_aggs`](AttrFacetFilter::apply_aggs) once every filter of the
//!    request has applied its own filters;
//! 4. execute the query against the backend (not this crate's business);
//! 5. [`decode`](AttrFacetFilter::decode) the result tree.
//!
//! Malformed parameters never fail a request: whatever does not parse is
//! skipped and the rest of the request proceeds normally.

pub mod codec;
pub mod domain;
pub mod params;
pub mod result;
pub mod selection;

mod filter;

pub use domain::AttrValue;
pub use filter::{AttrFacetFilter, AttrRangeFacetFilter, AttrSimpleFilter, DEFAULT_NAMESPACE};
pub use params::Params;
pub use result::{
    AttrFacet, AttrFacetResult, AttrFacetValue, AttrRangeFacet, AttrRangeFacetResult,
};
pub use selection::{FloatBounds, RangeSelection, Selection};
