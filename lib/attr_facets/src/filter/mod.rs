mod branch;
mod build;
mod facet;
mod range;
mod simple;

pub use facet::{AttrFacetFilter, DEFAULT_NAMESPACE};
pub use range::AttrRangeFacetFilter;
pub use simple::AttrSimpleFilter;
