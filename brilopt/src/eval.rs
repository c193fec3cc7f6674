//! Compile-time evaluation of value operations, shared by constant
//! propagation and local value numbering.

use bril::{Literal, ValueOps};

/// Evaluate `op` over literal arguments. Returns `None` when the operation
/// cannot be computed at compile time (calls, φ-nodes, arity or type
/// mismatches). Division by zero folds to `0`.
pub fn eval_value_op(op: ValueOps, args: &[Literal]) -> Option<Literal> {
    use Literal::{Bool, Int};

    let value = match (op, args) {
        (ValueOps::Add, [Int(x), Int(y)]) => Int(x.wrapping_add(*y)),
        (ValueOps::Sub, [Int(x), Int(y)]) => Int(x.wrapping_sub(*y)),
        (ValueOps::Mul, [Int(x), Int(y)]) => Int(x.wrapping_mul(*y)),
        (ValueOps::Div, [Int(x), Int(y)]) => Int(if *y == 0 { 0 } else { x.wrapping_div(*y) }),
        (ValueOps::Eq, [Int(x), Int(y)]) => Bool(x == y),
        (ValueOps::Lt, [Int(x), Int(y)]) => Bool(x < y),
        (ValueOps::Gt, [Int(x), Int(y)]) => Bool(x > y),
        (ValueOps::Le, [Int(x), Int(y)]) => Bool(x <= y),
        (ValueOps::Ge, [Int(x), Int(y)]) => Bool(x >= y),
        (ValueOps::Not, [Bool(x)]) => Bool(!x),
        (ValueOps::And, [Bool(x), Bool(y)]) => Bool(*x && *y),
        (ValueOps::Or, [Bool(x), Bool(y)]) => Bool(*x || *y),
        (ValueOps::Id, [value]) => *value,
        _ => return None,
    };
    Some(value)
}
