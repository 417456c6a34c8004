// Copyright contributors to the shade project
// SPDX-License-Identifier: Apache-2.0

// Compile-time values of constant expressions. Folding is best effort: anything that
// cannot be folded, including division by zero and overflow, yields `None` and the
// expression is simply not constant.

use std::fmt;

use crate::ast::{BinaryOp, UnaryOp};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstantValue {
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl ConstantValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            ConstantValue::Int(v) => Some(*v as f64),
            ConstantValue::Float(v) => Some(*v),
            ConstantValue::Bool(_) => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Float(v) => write!(f, "{v:?}"),
            ConstantValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

pub fn fold_unary(op: UnaryOp, value: ConstantValue) -> Option<ConstantValue> {
    use ConstantValue::*;
    match (op, value) {
        (UnaryOp::Negate, Int(v)) => v.checked_neg().map(Int),
        (UnaryOp::Negate, Float(v)) => Some(Float(-v)),
        (UnaryOp::Not, Bool(v)) => Some(Bool(!v)),
        (UnaryOp::BitNot, Int(v)) => Some(Int(!v)),
        _ => None,
    }
}

pub fn fold_binary(op: BinaryOp, left: ConstantValue, right: ConstantValue) -> Option<ConstantValue> {
    use ConstantValue::*;
    match (left, right) {
        (Int(l), Int(r)) => fold_ints(op, l, r),
        (Bool(l), Bool(r)) => fold_bools(op, l, r),
        (Bool(_), _) | (_, Bool(_)) => None,
        (l, r) => fold_floats(op, l.as_float()?, r.as_float()?),
    }
}

fn fold_ints(op: BinaryOp, l: i64, r: i64) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue::*;
    let value = match op {
        Add => Int(l.checked_add(r)?),
        Sub => Int(l.checked_sub(r)?),
        Mul => Int(l.checked_mul(r)?),
        Div => Int(l.checked_div(r)?),
        Rem => Int(l.checked_rem(r)?),
        BitAnd => Int(l & r),
        BitOr => Int(l | r),
        BitXor => Int(l ^ r),
        Shl => Int(l.checked_shl(u32::try_from(r).ok()?)?),
        Shr => Int(l.checked_shr(u32::try_from(r).ok()?)?),
        Eq => Bool(l == r),
        NotEq => Bool(l != r),
        Less => Bool(l < r),
        LessEq => Bool(l <= r),
        Greater => Bool(l > r),
        GreaterEq => Bool(l >= r),
        And | Or => return None,
    };
    Some(value)
}

fn fold_floats(op: BinaryOp, l: f64, r: f64) -> Option<ConstantValue> {
    use BinaryOp::*;
    use ConstantValue::*;
    let value = match op {
        Add => Float(l + r),
        Sub => Float(l - r),
        Mul => Float(l * r),
        Div if r != 0.0 => Float(l / r),
        Rem if r != 0.0 => Float(l % r),
        Eq => Bool(l == r),
        NotEq => Bool(l != r),
        Less => Bool(l < r),
        LessEq => Bool(l <= r),
        Greater => Bool(l > r),
        GreaterEq => Bool(l >= r),
        _ => return None,
    };
    Some(value)
}

fn fold_bools(op: BinaryOp, l: bool, r: bool) -> Option<ConstantValue> {
    use BinaryOp::*;
    let value = match op {
        And | BitAnd => l && r,
        Or | BitOr => l || r,
        BitXor | NotEq => l != r,
        Eq => l == r,
        _ => return None,
    };
    Some(ConstantValue::Bool(value))
}

#[test]
fn test_fold_mixed_numbers() {
    let v = fold_binary(BinaryOp::Mul, ConstantValue::Int(2), ConstantValue::Float(1.5));
    assert_eq!(v, Some(ConstantValue::Float(3.0)));
}

#[test]
fn test_fold_division_by_zero() {
    assert_eq!(
        fold_binary(BinaryOp::Div, ConstantValue::Int(1), ConstantValue::Int(0)),
        None
    );
    assert_eq!(
        fold_binary(BinaryOp::Rem, ConstantValue::Float(1.0), ConstantValue::Float(0.0)),
        None
    );
}

#[test]
fn test_fold_comparison() {
    let v = fold_binary(BinaryOp::Less, ConstantValue::Int(1), ConstantValue::Int(2));
    assert_eq!(v, Some(ConstantValue::Bool(true)));
    assert_eq!(fold_unary(UnaryOp::Not, ConstantValue::Bool(true)), Some(ConstantValue::Bool(false)));
}
