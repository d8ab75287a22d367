//! Request-parameter extraction.
//!
//! Filter parameters arrive as a flat multi-value map. Keys follow the
//! `<alias><attr_id>` / `<alias><attr_id>__<op>` convention; everything
//! that does not parse is skipped silently — faceted search degrades
//! gracefully on malformed input instead of failing the request.

use indexmap::IndexMap;

use crate::codec::{AttrId, MAX_ATTR_ID};

/// Flat request parameters: key → raw values, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(IndexMap<String, Vec<String>>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single-valued parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0
            .entry(key.into())
            .or_default()
            .push(value.into());
        self
    }

    /// Append a multi-valued parameter, builder style.
    pub fn with_all<I, S>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(key.into())
            .or_default()
            .extend(values.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

impl<K, S> FromIterator<(K, Vec<S>)> for Params
where
    K: Into<String>,
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, Vec<S>)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, values) in iter {
            params = params.with_all(key, values);
        }
        params
    }
}

/// Operator tag carried by a parameter key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    /// No suffix: discrete value match.
    Exact,
    Gte,
    Lte,
}

impl Op {
    fn from_suffix(suffix: &str) -> Option<Op> {
        match suffix {
            "gte" => Some(Op::Gte),
            "lte" => Some(Op::Lte),
            _ => None,
        }
    }
}

/// Raw values of one attribute, grouped by operator in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrParams {
    groups: IndexMap<Op, Vec<String>>,
}

impl AttrParams {
    pub fn get(&self, op: Op) -> &[String] {
        self.groups.get(&op).map(Vec::as_slice).unwrap_or_default()
    }

    fn extend(&mut self, op: Op, values: &[String]) {
        self.groups
            .entry(op)
            .or_default()
            .extend(values.iter().cloned());
    }
}

/// Group request parameters by attribute id for one alias prefix.
///
/// Keys with a foreign prefix, an unparseable id, or an unknown operator
/// suffix are skipped. `<alias><id>` and `<alias><id>__gte` contribute to
/// the same attribute entry.
pub fn group_attr_params(params: &Params, alias: &str) -> IndexMap<AttrId, AttrParams> {
    let mut grouped: IndexMap<AttrId, AttrParams> = IndexMap::new();
    for (key, values) in params.iter() {
        let (base, op) = match key.split_once("__") {
            Some((base, suffix)) => match Op::from_suffix(suffix) {
                Some(op) => (base, op),
                None => {
                    log::debug!("skipping parameter {key}: unknown operator suffix");
                    continue;
                }
            },
            None => (key, Op::Exact),
        };
        let Some(raw_id) = base.strip_prefix(alias) else {
            continue;
        };
        let Some(attr_id) = parse_attr_id(raw_id) else {
            log::debug!("skipping parameter {key}: not a valid attribute id");
            continue;
        };
        grouped.entry(attr_id).or_default().extend(op, values);
    }
    grouped
}

fn parse_attr_id(raw: &str) -> Option<AttrId> {
    raw.parse::<AttrId>().ok().filter(|id| *id <= MAX_ATTR_ID)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("18", Some(18))]
    #[case("0", Some(0))]
    #[case("2147483647", Some(2147483647))]
    #[case("2147483648", None)]
    #[case("18-19", None)]
    #[case("99.9", None)]
    #[case("-1", None)]
    #[case("", None)]
    fn attr_id_parsing(#[case] raw: &str, #[case] expected: Option<AttrId>) {
        assert_eq!(parse_attr_id(raw), expected);
    }

    #[test]
    fn groups_by_attribute_across_operator_suffixes() {
        let params = Params::new()
            .with("a8__gte", "2.71")
            .with("a8__lte", "3.14")
            .with("a18", "1234")
            .with("b18", "224")
            .with("a18__unknown", "9");
        let grouped = group_attr_params(&params, "a");

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&8].get(Op::Gte), ["2.71"]);
        assert_eq!(grouped[&8].get(Op::Lte), ["3.14"]);
        assert!(grouped[&8].get(Op::Exact).is_empty());
        assert_eq!(grouped[&18].get(Op::Exact), ["1234"]);
    }

    #[test]
    fn preserves_request_order_of_values() {
        let params = Params::new().with_all("a8__gte", ["1", "2.71"]);
        let grouped = group_attr_params(&params, "a");
        assert_eq!(grouped[&8].get(Op::Gte), ["1", "2.71"]);
    }

    #[test]
    fn foreign_and_malformed_keys_yield_nothing() {
        let params = Params::new()
            .with("b18", "224")
            .with("a18-19", "1234")
            .with("a2147483648", "1");
        assert!(group_attr_params(&params, "a").is_empty());
    }
}
