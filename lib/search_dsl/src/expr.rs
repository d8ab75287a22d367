use serde_json::{Value, json};

/// Inclusive bounds over a packed-key field.
///
/// Keys are opaque u64 values; interpreting them is the caller's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyRange {
    pub gte: Option<u64>,
    pub lte: Option<u64>,
}

/// Boolean combination of sub-expressions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoolExpr {
    pub must: Vec<Expr>,
    pub should: Vec<Expr>,
    pub must_not: Vec<Expr>,
}

impl BoolExpr {
    pub fn must(exprs: Vec<Expr>) -> Self {
        BoolExpr {
            must: exprs,
            ..Default::default()
        }
    }

    pub fn should(exprs: Vec<Expr>) -> Self {
        BoolExpr {
            should: exprs,
            ..Default::default()
        }
    }
}

/// A filter expression over an integer-keyed field.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Field equals the given key.
    Term { field: String, value: u64 },
    /// Field equals any of the given keys.
    Terms { field: String, values: Vec<u64> },
    /// Field falls within the inclusive key range.
    Range { field: String, bounds: KeyRange },
    Bool(BoolExpr),
}

impl Expr {
    pub fn term(field: impl Into<String>, value: u64) -> Self {
        Expr::Term {
            field: field.into(),
            value,
        }
    }

    pub fn terms(field: impl Into<String>, values: Vec<u64>) -> Self {
        Expr::Terms {
            field: field.into(),
            values,
        }
    }

    pub fn range(field: impl Into<String>, gte: Option<u64>, lte: Option<u64>) -> Self {
        Expr::Range {
            field: field.into(),
            bounds: KeyRange { gte, lte },
        }
    }

    /// Conjunction of `exprs`. An empty list has no expression; a single
    /// expression is returned as-is rather than wrapped.
    pub fn and(mut exprs: Vec<Expr>) -> Option<Expr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::Bool(BoolExpr::must(exprs))),
        }
    }

    /// Disjunction of `exprs`, collapsing like [`Expr::and`].
    pub fn or(mut exprs: Vec<Expr>) -> Option<Expr> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::Bool(BoolExpr::should(exprs))),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Expr::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Expr::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Expr::Range { field, bounds } => {
                let mut range = serde_json::Map::new();
                if let Some(gte) = bounds.gte {
                    range.insert("gte".to_string(), gte.into());
                }
                if let Some(lte) = bounds.lte {
                    range.insert("lte".to_string(), lte.into());
                }
                json!({ "range": { field.as_str(): range } })
            }
            Expr::Bool(bool_expr) => {
                let mut clauses = serde_json::Map::new();
                for (name, exprs) in [
                    ("must", &bool_expr.must),
                    ("should", &bool_expr.should),
                    ("must_not", &bool_expr.must_not),
                ] {
                    if !exprs.is_empty() {
                        let compiled: Vec<Value> = exprs.iter().map(Expr::to_json).collect();
                        clauses.insert(name.to_string(), compiled.into());
                    }
                }
                json!({ "bool": clauses })
            }
        }
    }
}
