//! Integer literals and their narrowing to a concrete integer kind

use super::{Expr, ExprContext, ExprVal};
use crate::builtins::{integer_kind_of, IntegerKind};
use crate::error::{ErrorPoint, ExprError};
use crate::types::Type;
use num_bigint::BigInt;

/// An integer literal narrowed to its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntValue {
    Int(BigInt),
    Int64(i64),
    Uint64(u64),
    Int32(i32),
    Uint32(u32),
    Int16(i16),
    Uint16(u16),
    Int8(i8),
    Uint8(u8),
    Bit(bool),
}

impl IntValue {
    /// Narrow `value` to `kind`, or `None` when it is out of range
    pub fn narrow(value: &BigInt, kind: IntegerKind) -> Option<Self> {
        Some(match kind {
            IntegerKind::Int => IntValue::Int(value.clone()),
            IntegerKind::Int64 => IntValue::Int64(value.try_into().ok()?),
            IntegerKind::Uint64 => IntValue::Uint64(value.try_into().ok()?),
            IntegerKind::Int32 => IntValue::Int32(value.try_into().ok()?),
            IntegerKind::Uint32 => IntValue::Uint32(value.try_into().ok()?),
            IntegerKind::Int16 => IntValue::Int16(value.try_into().ok()?),
            IntegerKind::Uint16 => IntValue::Uint16(value.try_into().ok()?),
            IntegerKind::Int8 => IntValue::Int8(value.try_into().ok()?),
            IntegerKind::Uint8 => IntValue::Uint8(value.try_into().ok()?),
            IntegerKind::Bit => match u8::try_from(value).ok()? {
                0 => IntValue::Bit(false),
                1 => IntValue::Bit(true),
                _ => return None,
            },
        })
    }

    pub fn to_bigint(&self) -> BigInt {
        match self {
            IntValue::Int(v) => v.clone(),
            IntValue::Int64(v) => BigInt::from(*v),
            IntValue::Uint64(v) => BigInt::from(*v),
            IntValue::Int32(v) => BigInt::from(*v),
            IntValue::Uint32(v) => BigInt::from(*v),
            IntValue::Int16(v) => BigInt::from(*v),
            IntValue::Uint16(v) => BigInt::from(*v),
            IntValue::Int8(v) => BigInt::from(*v),
            IntValue::Uint8(v) => BigInt::from(*v),
            IntValue::Bit(v) => BigInt::from(u8::from(*v)),
        }
    }

    pub fn kind(&self) -> IntegerKind {
        match self {
            IntValue::Int(_) => IntegerKind::Int,
            IntValue::Int64(_) => IntegerKind::Int64,
            IntValue::Uint64(_) => IntegerKind::Uint64,
            IntValue::Int32(_) => IntegerKind::Int32,
            IntValue::Uint32(_) => IntegerKind::Uint32,
            IntValue::Int16(_) => IntegerKind::Int16,
            IntValue::Uint16(_) => IntegerKind::Uint16,
            IntValue::Int8(_) => IntegerKind::Int8,
            IntValue::Uint8(_) => IntegerKind::Uint8,
            IntValue::Bit(_) => IntegerKind::Bit,
        }
    }
}

pub(super) fn assign_integer_to(
    expected: Option<&Type>,
    value: BigInt,
    point: ErrorPoint,
    ctx: &ExprContext<'_>,
) -> Result<Expr, ExprError> {
    let span = point.source_span();
    let expected = match expected.map(|t| ctx.current(t)) {
        None | Some(Type::Wildcard) | Some(Type::Parameter { being_inferred: true, .. }) => {
            return Err(ExprError::ExplicitTypeRequired { span })
        }
        Some(t) => t,
    };
    let kind = integer_kind_of(&expected).ok_or_else(|| ExprError::IntegerAssignedToNonIntegerType {
        expected: ctx.describe(&expected),
        span,
    })?;
    let narrowed = IntValue::narrow(&value, kind).ok_or_else(|| ExprError::IntegerOverflow {
        kind: ctx.describe(&expected),
        value,
        span,
    })?;
    Ok(Expr::new(expected, ExprVal::Integer(narrowed), point))
}
