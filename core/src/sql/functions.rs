//! Column functions for building DataFrame expressions.

use datafusion::common::ScalarValue;
use datafusion::functions_nested::expr_fn::{make_array, string_to_array};
use datafusion::logical_expr::{Case, Literal};
use datafusion::prelude::Expr;

/// Reference a column by name
pub fn col(name: &str) -> Expr {
    datafusion::prelude::col(name)
}

/// A literal value
pub fn lit<T: Literal>(value: T) -> Expr {
    datafusion::prelude::lit(value)
}

/// Lower-case a string expression
pub fn lower(expr: Expr) -> Expr {
    datafusion::functions::expr_fn::lower(expr)
}

/// Split a string expression into an array on `delimiter`.
///
/// The delimiter is matched literally, so adjacent delimiters produce empty
/// elements, and an empty string splits into a single empty element.
pub fn split(expr: Expr, delimiter: &str) -> Expr {
    let parts = string_to_array(expr.clone(), lit(delimiter), lit(ScalarValue::Utf8(None)));
    // string_to_array maps "" to an empty array
    Expr::Case(Case::new(
        None,
        vec![(
            Box::new(expr.eq(lit(""))),
            Box::new(make_array(vec![lit("")])),
        )],
        Some(Box::new(parts)),
    ))
}
