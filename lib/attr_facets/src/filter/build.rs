//! Filter-expression construction over packed keys.

use search_dsl::{AttrTag, Expr, FilterMeta, ValueDomain};

use crate::codec::{AttrId, merge_float};
use crate::domain::AttrValue;
use crate::selection::FloatBounds;

/// Equality filter over discrete values: a term for one value, a terms
/// disjunction for several, nothing for none.
pub(crate) fn discrete_expr(field: &str, attr_id: AttrId, values: &[AttrValue]) -> Option<Expr> {
    let keys: Vec<u64> = values.iter().map(|value| value.merge(attr_id)).collect();
    match keys.as_slice() {
        [] => None,
        [key] => Some(Expr::term(field, *key)),
        _ => Some(Expr::terms(field, keys)),
    }
}

// Packed float keys order like unsigned integers, which agrees with float
// order for non-negative values and reverses it for negative ones:
//
//              -Inf                 +0.0
//     0x{id}_ff800000      0x{id}_00000000
//                        | |
//                     *********
//                  **           **
//                 *               *
//     negative   *                 *   positive
//     floats     *                 *   floats
//              ⤹ *                * ⤸
//                  **           **
//                     *********
//                        | |
//     0x{id}_80000000      0x{id}_7f800000
//              -0.0                 +Inf
//
// Every conceptual range is therefore rewritten into key ranges anchored at
// the four boundary patterns of the attribute's slot.
pub(crate) fn float_range_expr(field: &str, attr_id: AttrId, bounds: FloatBounds) -> Option<Expr> {
    let key = |value: f32| merge_float(attr_id, value);
    let range = |gte: u64, lte: u64| Expr::range(field, Some(gte), Some(lte));

    match (bounds.gte, bounds.lte) {
        (Some(gte), Some(lte)) => {
            if gte >= 0.0 && lte >= 0.0 {
                Some(range(key(gte), key(lte)))
            } else if gte < 0.0 && lte < 0.0 {
                Some(range(key(lte), key(gte)))
            } else if gte < 0.0 {
                Expr::or(vec![
                    range(key(-0.0), key(gte)),
                    range(key(0.0), key(lte)),
                ])
            } else {
                // gte > 0 > lte: neither bound subsumes the other, so the
                // request means "value >= gte or value <= lte" and compiles
                // to the intersection of the two open-ended key ranges.
                Expr::and(vec![
                    range(key(gte), key(f32::INFINITY)),
                    range(key(lte), key(f32::NEG_INFINITY)),
                ])
            }
        }
        (Some(gte), None) => {
            if gte >= 0.0 {
                Some(range(key(gte), key(f32::INFINITY)))
            } else {
                Expr::or(vec![
                    range(key(-0.0), key(gte)),
                    range(key(0.0), key(f32::INFINITY)),
                ])
            }
        }
        (None, Some(lte)) => {
            if lte < 0.0 {
                Some(range(key(lte), key(f32::NEG_INFINITY)))
            } else {
                Expr::or(vec![
                    range(key(0.0), key(lte)),
                    range(key(-0.0), key(f32::NEG_INFINITY)),
                ])
            }
        }
        (None, None) => None,
    }
}

/// Metadata attached to every facet post-filter: the filter's name and an
/// `<alias>:<attr_id>` tag for feature-level grouping, plus the typed
/// attribute tag the composer excludes by.
pub(crate) fn attr_filter_meta(
    name: &str,
    alias: &str,
    domain: ValueDomain,
    attr_id: AttrId,
) -> FilterMeta {
    FilterMeta::tagged([name.to_string(), format!("{alias}:{attr_id}")])
        .with_attr(AttrTag { domain, attr_id })
}
