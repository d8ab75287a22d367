//! Aggregation branch identities.
//!
//! The composer and the decoder agree on branch names through this module
//! alone: branches are typed internally and stringified only at the query
//! boundary, then parsed back out of the result tree.

use crate::codec::{AttrId, MAX_ATTR_ID};

/// The kinds of aggregation branches one facet filter emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Branch {
    /// Shared facet view across all attribute ids without their own branch.
    Baseline,
    /// Filter wrapper around [`Branch::Baseline`].
    BaselineFilter,
    /// Facet view of a single selected attribute.
    Attr(AttrId),
    /// Filter wrapper around [`Branch::Attr`].
    AttrFilter(AttrId),
    /// Per-attribute min/max metric (range facets only).
    MinMax,
    /// Filter wrapper around [`Branch::MinMax`].
    MinMaxFilter,
}

/// Renders and parses branch names for one `<namespace>.<filter name>`
/// prefix.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BranchNames<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
}

impl BranchNames<'_> {
    pub fn render(&self, branch: Branch) -> String {
        let base = format!("{}.{}", self.namespace, self.name);
        match branch {
            Branch::Baseline => base,
            Branch::BaselineFilter => format!("{base}.filter"),
            Branch::Attr(attr_id) => format!("{base}:{attr_id}"),
            Branch::AttrFilter(attr_id) => format!("{base}.filter:{attr_id}"),
            Branch::MinMax => format!("{base}.min_max"),
            Branch::MinMaxFilter => format!("{base}.min_max.filter"),
        }
    }

    /// Parse an aggregation name back into a branch; `None` for names that
    /// belong to other filters or are malformed.
    pub fn parse(&self, agg_name: &str) -> Option<Branch> {
        let rest = agg_name
            .strip_prefix(self.namespace)?
            .strip_prefix('.')?
            .strip_prefix(self.name)?;
        match rest {
            "" => Some(Branch::Baseline),
            ".filter" => Some(Branch::BaselineFilter),
            ".min_max" => Some(Branch::MinMax),
            ".min_max.filter" => Some(Branch::MinMaxFilter),
            _ => {
                let (wrapper, raw_id) = match rest.strip_prefix(".filter:") {
                    Some(raw_id) => (true, raw_id),
                    None => (false, rest.strip_prefix(':')?),
                };
                let attr_id = raw_id.parse::<AttrId>().ok().filter(|id| *id <= MAX_ATTR_ID)?;
                Some(if wrapper {
                    Branch::AttrFilter(attr_id)
                } else {
                    Branch::Attr(attr_id)
                })
            }
        }
    }
}
