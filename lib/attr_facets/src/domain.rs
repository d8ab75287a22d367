use schemars::JsonSchema;
use serde::Serialize;
use search_dsl::ValueDomain;

use crate::codec::{self, AttrId};

/// A discrete attribute value, as decoded from a packed bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
#[serde(untagged)]
pub enum AttrValue {
    Int(u32),
    Bool(bool),
}

impl AttrValue {
    /// Pack this value with its attribute id.
    pub fn merge(&self, attr_id: AttrId) -> u64 {
        match self {
            AttrValue::Int(value_id) => codec::merge_int(attr_id, *value_id),
            AttrValue::Bool(value) => codec::merge_bool(attr_id, *value),
        }
    }
}

impl From<u32> for AttrValue {
    fn from(value_id: u32) -> Self {
        AttrValue::Int(value_id)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

/// The two discrete-value domains sharing the facet algorithm.
///
/// Floats are not discrete: the range facet path never decodes values out
/// of keys and has its own composer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscreteDomain {
    Int,
    Bool,
}

impl DiscreteDomain {
    pub fn value_domain(self) -> ValueDomain {
        match self {
            DiscreteDomain::Int => ValueDomain::Int,
            DiscreteDomain::Bool => ValueDomain::Bool,
        }
    }

    /// Parse one raw request value; `None` skips the value.
    ///
    /// Integers are canonical decimal within the backend's signed 32-bit
    /// integer type, mapped two's-complement onto the u32 value space.
    pub fn parse_value(self, raw: &str) -> Option<AttrValue> {
        match self {
            DiscreteDomain::Int => raw.parse::<i32>().ok().map(|v| AttrValue::Int(v as u32)),
            DiscreteDomain::Bool => match raw {
                "true" | "True" => Some(AttrValue::Bool(true)),
                "false" | "False" => Some(AttrValue::Bool(false)),
                _ => None,
            },
        }
    }

    /// Unpack a bucket key into `(attr_id, value)` for this domain.
    pub fn split(self, key: u64) -> (AttrId, AttrValue) {
        match self {
            DiscreteDomain::Int => {
                let (attr_id, value_id) = codec::split_int(key);
                (attr_id, AttrValue::Int(value_id))
            }
            DiscreteDomain::Bool => {
                let (attr_id, value) = codec::split_bool(key);
                (attr_id, AttrValue::Bool(value))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1234", Some(AttrValue::Int(1234)))]
    #[case("-5", Some(AttrValue::Int(0xffff_fffb)))]
    #[case("2147483647", Some(AttrValue::Int(0x7fff_ffff)))]
    #[case("2147483648", None)]
    #[case("0x1234", None)]
    #[case("1234.5", None)]
    #[case("", None)]
    fn int_value_parsing(#[case] raw: &str, #[case] expected: Option<AttrValue>) {
        assert_eq!(DiscreteDomain::Int.parse_value(raw), expected);
    }

    #[rstest]
    #[case("true", Some(AttrValue::Bool(true)))]
    #[case("True", Some(AttrValue::Bool(true)))]
    #[case("false", Some(AttrValue::Bool(false)))]
    #[case("False", Some(AttrValue::Bool(false)))]
    #[case("TRUE", None)]
    #[case("1", None)]
    fn bool_value_parsing(#[case] raw: &str, #[case] expected: Option<AttrValue>) {
        assert_eq!(DiscreteDomain::Bool.parse_value(raw), expected);
    }

    #[test]
    fn split_round_trips_merge() {
        assert_eq!(
            DiscreteDomain::Int.split(AttrValue::Int(57005).merge(324)),
            (324, AttrValue::Int(57005))
        );
        assert_eq!(
            DiscreteDomain::Bool.split(AttrValue::Bool(true).merge(1)),
            (1, AttrValue::Bool(true))
        );
    }

    #[test]
    fn values_serialize_as_plain_json() {
        assert_eq!(
            serde_json::to_value(AttrValue::Int(7)).unwrap(),
            serde_json::json!(7)
        );
        assert_eq!(
            serde_json::to_value(AttrValue::Bool(true)).unwrap(),
            serde_json::json!(true)
        );
    }
}
