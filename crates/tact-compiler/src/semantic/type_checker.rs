use crate::ast::nodes::{BinaryOp, UnaryOp};

use super::types::Type;

/// Check a binary operation and return the result type, or an error message.
pub fn check_binary_op(left: &Type, op: BinaryOp, right: &Type) -> Result<Type, String> {
    // Error propagates without additional errors.
    if matches!(left, Type::Error) || matches!(right, Type::Error) {
        return Ok(Type::Error);
    }

    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            match (left, right) {
                (Type::Int, Type::Int) => Ok(Type::Int),
                _ => Err(format!(
                    "operator '{}' cannot be applied to {} and {}",
                    op.symbol(),
                    left.display_name(),
                    right.display_name()
                )),
            }
        }
        BinaryOp::Eq | BinaryOp::Neq => {
            if types_comparable(left, right) {
                Ok(Type::Bool)
            } else {
                Err(format!(
                    "cannot compare {} and {} for equality",
                    left.display_name(),
                    right.display_name()
                ))
            }
        }
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte => match (left, right) {
            (Type::Int, Type::Int) => Ok(Type::Bool),
            _ => Err(format!(
                "operator '{}' cannot be applied to {} and {}",
                op.symbol(),
                left.display_name(),
                right.display_name()
            )),
        },
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Type::Bool, Type::Bool) => Ok(Type::Bool),
            _ => Err(format!(
                "operator '{}' requires Bool operands, got {} and {}",
                op.symbol(),
                left.display_name(),
                right.display_name()
            )),
        },
    }
}

/// Check a unary operation and return the result type.
pub fn check_unary_op(op: UnaryOp, operand: &Type) -> Result<Type, String> {
    if matches!(operand, Type::Error) {
        return Ok(Type::Error);
    }
    match op {
        UnaryOp::Neg => match operand {
            Type::Int => Ok(Type::Int),
            _ => Err(format!(
                "operator '-' cannot be applied to {}",
                operand.display_name()
            )),
        },
        UnaryOp::Not => match operand {
            Type::Bool => Ok(Type::Bool),
            _ => Err(format!(
                "operator '!' requires Bool operand, got {}",
                operand.display_name()
            )),
        },
    }
}

/// Check if two types can be compared for equality.
fn types_comparable(left: &Type, right: &Type) -> bool {
    if left == right {
        return !matches!(left, Type::Void);
    }
    // Maps compare against null only.
    (left.is_nullable() && matches!(right, Type::Null))
        || (matches!(left, Type::Null) && right.is_nullable())
}

/// Check if a value of type `from` can be assigned to a target of type `to`.
pub fn types_assignable(from: &Type, to: &Type) -> bool {
    if matches!(from, Type::Error) || matches!(to, Type::Error) {
        return true;
    }
    if from == to {
        return true;
    }
    // `null` and `emptyMap()` initialize maps.
    matches!(from, Type::Null) && to.is_nullable()
}
