//! Packing of `(attribute id, value)` pairs into single sortable keys.
//!
//! One document field holds the packed keys of every attribute the document
//! carries, so a single terms aggregation over that field buckets all
//! attributes at once. A backend client inspecting the field without this
//! codec sees only undifferentiated integers.
//!
//! Attribute ids must stay below [`MAX_ATTR_ID`]; the parser enforces this
//! at the request boundary, the codec itself only debug-asserts it.

/// Attribute identifier. Valid ids occupy 31 bits.
pub type AttrId = u32;

/// Largest attribute id the packed layouts can carry.
pub const MAX_ATTR_ID: AttrId = (1 << 31) - 1;

/// Pack an integer attribute value: id in the high 32 bits, value in the
/// low 32.
#[inline]
pub fn merge_int(attr_id: AttrId, value_id: u32) -> u64 {
    debug_assert!(attr_id <= MAX_ATTR_ID);
    (u64::from(attr_id) << 32) | u64::from(value_id)
}

/// Exact inverse of [`merge_int`].
#[inline]
pub fn split_int(key: u64) -> (AttrId, u32) {
    ((key >> 32) as u32, key as u32)
}

/// Pack a boolean attribute value into the lowest bit.
#[inline]
pub fn merge_bool(attr_id: AttrId, value: bool) -> u64 {
    debug_assert!(attr_id <= MAX_ATTR_ID);
    (u64::from(attr_id) << 1) | u64::from(value)
}

/// Exact inverse of [`merge_bool`].
#[inline]
pub fn split_bool(key: u64) -> (AttrId, bool) {
    ((key >> 1) as u32, key & 1 == 1)
}

/// Pack a float attribute value by reinterpreting its IEEE-754 bits.
///
/// Non-negative floats sort consistently with their bit patterns; negative
/// floats sort reversed. Range queries over packed float keys must split at
/// the zero boundary accordingly — see the filter builder. There is no
/// `split_float`: float values are only ever compared and ranged, never
/// decoded back out of keys.
#[inline]
pub fn merge_float(attr_id: AttrId, value: f32) -> u64 {
    debug_assert!(attr_id <= MAX_ATTR_ID);
    (u64::from(attr_id) << 32) | u64::from(value.to_bits())
}

/// The full packed-key slot of one attribute id in the 32-bit-value
/// layouts: every key of this attribute falls inside these inclusive
/// bounds, and no key of any other attribute does.
#[inline]
pub fn attr_key_bounds(attr_id: AttrId) -> (u64, u64) {
    let start = u64::from(attr_id) << 32;
    (start, start | 0xFFFF_FFFF)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn int_layout_matches_wire_format() {
        assert_eq!(merge_int(18, 0xe2e4), 0x12_0000_e2e4);
        assert_eq!(merge_int(324, 0xdead), 0x144_0000_dead);
        assert_eq!(split_int(0x12_f000_0000), (18, 0xf000_0000));
    }

    #[test]
    fn bool_layout_matches_wire_format() {
        assert_eq!(merge_bool(1, true), 0b11);
        assert_eq!(merge_bool(1, false), 0b10);
        assert_eq!(merge_bool(2, true), 0b101);
        assert_eq!(split_bool(0b101), (2, true));
    }

    #[test]
    fn float_layout_matches_wire_format() {
        assert_eq!(merge_float(8, 2.71), 0x8_402d_70a4);
        assert_eq!(merge_float(8, 3.14), 0x8_4048_f5c3);
        assert_eq!(merge_float(8, -3.14), 0x8_c048_f5c3);
        assert_eq!(merge_float(8, 0.0), 0x8_0000_0000);
        assert_eq!(merge_float(8, -0.0), 0x8_8000_0000);
        assert_eq!(merge_float(8, f32::INFINITY), 0x8_7f80_0000);
        assert_eq!(merge_float(8, f32::NEG_INFINITY), 0x8_ff80_0000);
    }

    #[test]
    fn attr_key_bounds_cover_the_id_slot() {
        assert_eq!(attr_key_bounds(8), (0x8_0000_0000, 0x8_ffff_ffff));
        assert_eq!(attr_key_bounds(0x63), (0x63_0000_0000, 0x63_ffff_ffff));
    }

    proptest! {
        #[test]
        fn int_round_trip(attr_id in 0..=MAX_ATTR_ID, value_id: u32) {
            prop_assert_eq!(split_int(merge_int(attr_id, value_id)), (attr_id, value_id));
        }

        #[test]
        fn bool_round_trip(attr_id in 0..=MAX_ATTR_ID, value: bool) {
            prop_assert_eq!(split_bool(merge_bool(attr_id, value)), (attr_id, value));
        }

        #[test]
        fn non_negative_floats_sort_like_their_keys(
            attr_id in 0..=MAX_ATTR_ID,
            a in 0f32..1e30,
            b in 0f32..1e30,
        ) {
            if a < b {
                prop_assert!(merge_float(attr_id, a) < merge_float(attr_id, b));
            }
        }

        #[test]
        fn negative_floats_sort_reversed(
            attr_id in 0..=MAX_ATTR_ID,
            a in -1e30f32..-0.0,
            b in -1e30f32..-0.0,
        ) {
            if a < b {
                prop_assert!(merge_float(attr_id, a) > merge_float(attr_id, b));
            }
        }

        #[test]
        fn keys_stay_inside_the_id_slot(attr_id in 0..=MAX_ATTR_ID, value_id: u32) {
            let (lo, hi) = attr_key_bounds(attr_id);
            let key = merge_int(attr_id, value_id);
            prop_assert!(lo <= key && key <= hi);
        }
    }
}
