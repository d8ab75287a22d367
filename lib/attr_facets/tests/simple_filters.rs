use attr_facets::{AttrSimpleFilter, Params};
use search_dsl::SearchQuery;
use serde_json::{Value, json};

fn applied(filter: &AttrSimpleFilter, params: Params) -> Value {
    let mut query = SearchQuery::new();
    filter.apply(&mut query, &params);
    query.to_json()
}

fn int_filter() -> AttrSimpleFilter {
    AttrSimpleFilter::new_int("attr_int", "attr.int", "a")
}

fn bool_filter() -> AttrSimpleFilter {
    AttrSimpleFilter::new_bool("attr_bool", "attr.bool", "a")
}

fn float_filter() -> AttrSimpleFilter {
    AttrSimpleFilter::new_float("attr_float", "attr.float", "a")
}

#[test]
fn int_filter_ignores_empty_and_foreign_params() {
    assert_eq!(applied(&int_filter(), Params::new()), json!({}));
    assert_eq!(
        applied(&int_filter(), Params::new().with("b18", "224")),
        json!({})
    );
}

#[test]
fn int_filter_builds_term_and_terms() {
    assert_eq!(
        applied(&int_filter(), Params::new().with("a18", "1234")),
        json!({ "query": { "bool": { "filter": [
            { "term": { "attr.int": 0x12_0000_04d2_u64 } },
        ] } } })
    );
    assert_eq!(
        applied(&int_filter(), Params::new().with_all("a18", ["1234", "5678"])),
        json!({ "query": { "bool": { "filter": [
            { "terms": { "attr.int": [0x12_0000_04d2_u64, 0x12_0000_162e_u64] } },
        ] } } })
    );
    assert_eq!(
        applied(
            &int_filter(),
            Params::new()
                .with_all("a18", ["1234", "5678"])
                .with("a324", "90"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "terms": { "attr.int": [0x12_0000_04d2_u64, 0x12_0000_162e_u64] } },
            { "term": { "attr.int": 0x144_0000_005a_u64 } },
        ] } } })
    );
}

#[test]
fn int_filter_skips_garbage() {
    for (key, value) in [
        ("a18", "0x1234"),
        ("a18-19", "1234"),
        ("a2147483648", "1"),
        ("a1", "2147483648"),
    ] {
        assert_eq!(
            applied(&int_filter(), Params::new().with(key, value)),
            json!({}),
            "{key}={value} should produce no filter",
        );
    }
}

#[test]
fn float_filter_positive_bounds() {
    assert_eq!(
        applied(&float_filter(), Params::new().with("a8__gte", "3.14")),
        json!({ "query": { "bool": { "filter": [
            { "range": { "attr.float": { "gte": 0x8_4048_f5c3_u64, "lte": 0x8_7f80_0000_u64 } } },
        ] } } })
    );
}

#[test]
fn float_filter_negative_lower_bound_splits() {
    assert_eq!(
        applied(&float_filter(), Params::new().with("a8__gte", "-3.14")),
        json!({ "query": { "bool": { "filter": [
            { "bool": { "should": [
                { "range": { "attr.float": { "gte": 0x8_8000_0000_u64, "lte": 0x8_c048_f5c3_u64 } } },
                { "range": { "attr.float": { "gte": 0x8_0000_0000_u64, "lte": 0x8_7f80_0000_u64 } } },
            ] } },
        ] } } })
    );
}

#[test]
fn float_filter_negative_upper_bound_swaps() {
    assert_eq!(
        applied(&float_filter(), Params::new().with("a8__lte", "-2.71")),
        json!({ "query": { "bool": { "filter": [
            { "range": { "attr.float": { "gte": 0x8_c02d_70a4_u64, "lte": 0x8_ff80_0000_u64 } } },
        ] } } })
    );
}

#[test]
fn float_filter_last_gte_wins() {
    assert_eq!(
        applied(
            &float_filter(),
            Params::new()
                .with_all("a8__gte", ["1", "2.71"])
                .with("a8__lte", "3.14"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "range": { "attr.float": { "gte": 0x8_402d_70a4_u64, "lte": 0x8_4048_f5c3_u64 } } },
        ] } } })
    );
}

#[test]
fn float_filter_negative_range() {
    assert_eq!(
        applied(
            &float_filter(),
            Params::new().with("a8__gte", "-3.14").with("a8__lte", "-2.71"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "range": { "attr.float": { "gte": 0x8_c02d_70a4_u64, "lte": 0x8_c048_f5c3_u64 } } },
        ] } } })
    );
}

#[test]
fn float_filter_range_straddling_zero() {
    assert_eq!(
        applied(
            &float_filter(),
            Params::new().with("a8__gte", "-3.14").with("a8__lte", "3.14"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "bool": { "should": [
                { "range": { "attr.float": { "gte": 0x8_8000_0000_u64, "lte": 0x8_c048_f5c3_u64 } } },
                { "range": { "attr.float": { "gte": 0x8_0000_0000_u64, "lte": 0x8_4048_f5c3_u64 } } },
            ] } },
        ] } } })
    );
}

#[test]
fn float_filter_crossed_bounds_intersect() {
    assert_eq!(
        applied(
            &float_filter(),
            Params::new().with("a8__gte", "3.14").with("a8__lte", "-3.14"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "bool": { "must": [
                { "range": { "attr.float": { "gte": 0x8_4048_f5c3_u64, "lte": 0x8_7f80_0000_u64 } } },
                { "range": { "attr.float": { "gte": 0x8_c048_f5c3_u64, "lte": 0x8_ff80_0000_u64 } } },
            ] } },
        ] } } })
    );
}

#[test]
fn float_filter_multiple_attributes() {
    assert_eq!(
        applied(
            &float_filter(),
            Params::new()
                .with("a8__gte", "2.71")
                .with("a8__lte", "3.14")
                .with("a99__lte", "99"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "range": { "attr.float": { "gte": 0x8_402d_70a4_u64, "lte": 0x8_4048_f5c3_u64 } } },
            { "bool": { "should": [
                { "range": { "attr.float": { "gte": 0x63_0000_0000_u64, "lte": 0x63_42c6_0000_u64 } } },
                { "range": { "attr.float": { "gte": 0x63_8000_0000_u64, "lte": 0x63_ff80_0000_u64 } } },
            ] } },
        ] } } })
    );
}

#[test]
fn float_filter_skips_garbage() {
    assert_eq!(
        applied(&float_filter(), Params::new().with("a99.9__gte", "99.9")),
        json!({})
    );
    assert_eq!(
        applied(&float_filter(), Params::new().with("a99__gte", "100ee2")),
        json!({})
    );
}

#[test]
fn bool_filter_builds_term_and_terms() {
    assert_eq!(
        applied(&bool_filter(), Params::new().with("a1", "true")),
        json!({ "query": { "bool": { "filter": [ { "term": { "attr.bool": 0b11 } } ] } } })
    );
    assert_eq!(
        applied(&bool_filter(), Params::new().with_all("a1", ["true", "false"])),
        json!({ "query": { "bool": { "filter": [ { "terms": { "attr.bool": [0b11, 0b10] } } ] } } })
    );
    assert_eq!(
        applied(
            &bool_filter(),
            Params::new()
                .with_all("a1", ["true", "false"])
                .with("a2", "false"),
        ),
        json!({ "query": { "bool": { "filter": [
            { "terms": { "attr.bool": [0b11, 0b10] } },
            { "term": { "attr.bool": 0b100 } },
        ] } } })
    );
}

#[test]
fn bool_filter_accepts_capitalized_spellings() {
    assert_eq!(
        applied(&bool_filter(), Params::new().with("a1", "True")),
        json!({ "query": { "bool": { "filter": [ { "term": { "attr.bool": 0b11 } } ] } } })
    );
}

#[test]
fn bool_filter_skips_garbage() {
    assert_eq!(
        applied(&bool_filter(), Params::new().with("a2147483648", "1")),
        json!({})
    );
    assert_eq!(
        applied(&bool_filter(), Params::new().with("a1", "yes")),
        json!({})
    );
}
