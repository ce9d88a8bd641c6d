use serpentc_ast::types::{GENERAL_CLASS, INTEGER_CLASS};
use serpentc_ast::{BinaryOperator, ResolvedType};
use serpentc_ir::TExpr;

use crate::bridge::{self, BOOLEAN_WRAPPER, INTEGER_WRAPPER, REAL_WRAPPER};
use crate::errors::CodegenResult;
use crate::instr::Instr;

use super::{call_descriptor, push_raw_float, push_raw_int, push_raw_string, unpack, wrap_value, LowerCtx, INTEGER_TO_REAL_INTRINSIC};

pub fn lower_expr(ctx: &mut LowerCtx, expr: &TExpr) -> CodegenResult<Vec<Instr>> {
    match expr {
        TExpr::IntegerLiteral { value } => {
            let raw = push_raw_int(ctx, *value as i32)?;
            wrap_value(ctx, INTEGER_WRAPPER, "(I)V", raw)
        }
        TExpr::RealLiteral { value } => {
            let raw = push_raw_float(ctx, *value as f32)?;
            wrap_value(ctx, REAL_WRAPPER, "(F)V", raw)
        }
        TExpr::CharacterLiteral { value } => {
            let raw = push_raw_string(ctx, &value.to_string())?;
            wrap_value(ctx, bridge::CHARACTER_WRAPPER, "(Ljava/lang/String;)V", raw)
        }
        TExpr::StringLiteral { value } => {
            let raw = push_raw_string(ctx, value)?;
            wrap_value(ctx, bridge::STRING_WRAPPER, "(Ljava/lang/String;)V", raw)
        }
        TExpr::BoolLiteral { value } => {
            let raw = push_raw_int(ctx, if *value { 1 } else { 0 })?;
            wrap_value(ctx, BOOLEAN_WRAPPER, "(I)V", raw)
        }
        TExpr::VoidLiteral { .. } => Ok(vec![Instr::AconstNull]),
        TExpr::Current { .. } => Ok(vec![Instr::Aload(0)]),
        TExpr::Variable { mangled_name, .. } => Ok(vec![Instr::Aload(ctx.locals.slot(mangled_name)?)]),
        TExpr::FieldAccess { receiver, mangled_name, ty } => {
            let mut out = lower_expr(ctx, receiver)?;
            // The receiver's own static type names the class this field's
            // mangled name is prefixed with (see DESIGN.md: field access
            // shares the call-site dispatch simplification).
            let owner = bridge::internal_class_name(receiver.ty().name());
            let descriptor = crate::descriptor::type_descriptor(ty);
            let idx = ctx.pool.add_fieldref(&owner, mangled_name, &descriptor)?;
            out.push(Instr::Getfield(idx));
            Ok(out)
        }
        TExpr::FeatureCall { receiver, mangled_name, arguments: _, ty } if mangled_name == INTEGER_TO_REAL_INTRINSIC => {
            lower_integer_to_real(ctx, receiver, ty)
        }
        TExpr::FeatureCall { receiver, mangled_name, arguments, ty } => {
            let mut out = lower_expr(ctx, receiver)?;
            for arg in arguments {
                out.extend(lower_expr(ctx, arg)?);
            }
            let descriptor = call_descriptor(ctx, mangled_name, arguments, ty);
            let owner = bridge::internal_class_name(GENERAL_CLASS);
            let idx = ctx.pool.add_methodref(&owner, mangled_name, &descriptor)?;
            out.push(Instr::Invokevirtual(idx));
            Ok(out)
        }
        TExpr::PrecursorCall { precursor_name, target_mangled_name, arguments, ty } => {
            let mut out = vec![Instr::Aload(0)];
            for arg in arguments {
                out.extend(lower_expr(ctx, arg)?);
            }
            let descriptor = call_descriptor(ctx, target_mangled_name, arguments, ty);
            let owner = bridge::internal_class_name(precursor_name);
            let idx = ctx.pool.add_methodref(&owner, target_mangled_name, &descriptor)?;
            out.push(Instr::Invokespecial(idx));
            Ok(out)
        }
        TExpr::CreateExpr { type_decl, constructor, arguments } => super::stmt::lower_create(ctx, type_decl, constructor, arguments),
        TExpr::BinaryOp { operator, left, right, ty } => lower_binary_op(ctx, *operator, left, right, ty),
        TExpr::UnaryNot { operand } => lower_not(ctx, operand),
    }
}

fn lower_integer_to_real(ctx: &mut LowerCtx, receiver: &TExpr, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    debug_assert_eq!(ty.name(), serpentc_ast::types::REAL_CLASS);
    let mut value = unpack(ctx, receiver)?;
    value.push(Instr::I2F);
    wrap_value(ctx, REAL_WRAPPER, "(F)V", value)
}

fn lower_binary_op(ctx: &mut LowerCtx, operator: BinaryOperator, left: &TExpr, right: &TExpr, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    if operator.is_boolean_operator() {
        return lower_boolean_op(ctx, operator, left, right);
    }
    if operator.is_relational() {
        return lower_relational_op(ctx, operator, left, right);
    }
    if operator == BinaryOperator::Power {
        return lower_power(ctx, left, right, ty);
    }
    lower_arithmetic_op(ctx, operator, left, right, ty)
}

fn lower_arithmetic_op(ctx: &mut LowerCtx, operator: BinaryOperator, left: &TExpr, right: &TExpr, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    let mut value = unpack(ctx, left)?;
    value.extend(unpack(ctx, right)?);
    let is_integer = ty.name() == INTEGER_CLASS;
    value.push(match (operator, is_integer) {
        (BinaryOperator::Plus, true) => Instr::IAdd,
        (BinaryOperator::Plus, false) => Instr::FAdd,
        (BinaryOperator::Minus, true) => Instr::ISub,
        (BinaryOperator::Minus, false) => Instr::FSub,
        (BinaryOperator::Product, true) => Instr::IMul,
        (BinaryOperator::Product, false) => Instr::FMul,
        (BinaryOperator::Quotient, _) => Instr::FDiv,
        (BinaryOperator::IntegerQuotient, _) => Instr::IDiv,
        (BinaryOperator::IntegerRemainder, _) => Instr::IRem,
        (op, _) => unreachable!("{op:?} is not a plain arithmetic operator"),
    });
    let wrapper = if is_integer { INTEGER_WRAPPER } else { REAL_WRAPPER };
    let ctor_descriptor = if is_integer { "(I)V" } else { "(F)V" };
    wrap_value(ctx, wrapper, ctor_descriptor, value)
}

/// `^` always widens through `double` (spec.md §4.7 "Power") regardless of
/// operand kind, since `java.lang.Math.pow` only comes in that shape.
fn lower_power(ctx: &mut LowerCtx, left: &TExpr, right: &TExpr, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    let mut value = unpack(ctx, left)?;
    if left.ty().name() == INTEGER_CLASS {
        value.push(Instr::I2F);
    }
    value.push(Instr::F2D);
    let mut rhs = unpack(ctx, right)?;
    if right.ty().name() == INTEGER_CLASS {
        rhs.push(Instr::I2F);
    }
    rhs.push(Instr::F2D);
    value.extend(rhs);
    let pow_idx = ctx.pool.add_methodref("java/lang/Math", "pow", "(DD)D")?;
    value.push(Instr::Invokestatic(pow_idx));
    value.push(Instr::D2F);
    let is_integer = ty.name() == INTEGER_CLASS;
    if is_integer {
        value.push(Instr::F2I);
    }
    let wrapper = if is_integer { INTEGER_WRAPPER } else { REAL_WRAPPER };
    let ctor_descriptor = if is_integer { "(I)V" } else { "(F)V" };
    wrap_value(ctx, wrapper, ctor_descriptor, value)
}

fn lower_relational_op(ctx: &mut LowerCtx, operator: BinaryOperator, left: &TExpr, right: &TExpr) -> CodegenResult<Vec<Instr>> {
    let is_integer = left.ty().name() == INTEGER_CLASS;
    let mut value = unpack(ctx, left)?;
    value.extend(unpack(ctx, right)?);

    let label_true = ctx.fresh_label();
    let label_end = ctx.fresh_label();
    if is_integer {
        value.push(match operator {
            BinaryOperator::IsLess => Instr::IfIcmpLt(label_true),
            BinaryOperator::IsLessEqual => Instr::IfIcmpLe(label_true),
            BinaryOperator::IsGreaterEqual => Instr::IfIcmpGe(label_true),
            BinaryOperator::IsGreater => Instr::IfIcmpGt(label_true),
            BinaryOperator::IsEqual => Instr::IfIcmpEq(label_true),
            BinaryOperator::IsNotEqual => Instr::IfIcmpNe(label_true),
            op => unreachable!("{op:?} is not relational"),
        });
    } else {
        value.push(Instr::FCmpG);
        value.push(match operator {
            BinaryOperator::IsLess => Instr::IfLt(label_true),
            BinaryOperator::IsLessEqual => Instr::IfLe(label_true),
            BinaryOperator::IsGreaterEqual => Instr::IfGe(label_true),
            BinaryOperator::IsGreater => Instr::IfGt(label_true),
            BinaryOperator::IsEqual => Instr::IfEq(label_true),
            BinaryOperator::IsNotEqual => Instr::IfNe(label_true),
            op => unreachable!("{op:?} is not relational"),
        });
    }
    value.push(Instr::Bipush(0));
    value.push(Instr::Goto(label_end));
    value.push(Instr::Label(label_true));
    value.push(Instr::Bipush(1));
    value.push(Instr::Label(label_end));
    wrap_value(ctx, BOOLEAN_WRAPPER, "(I)V", value)
}

fn lower_boolean_op(ctx: &mut LowerCtx, operator: BinaryOperator, left: &TExpr, right: &TExpr) -> CodegenResult<Vec<Instr>> {
    let value = match operator {
        BinaryOperator::And => {
            let mut v = unpack(ctx, left)?;
            v.extend(unpack(ctx, right)?);
            v.push(Instr::IMul);
            v
        }
        BinaryOperator::Or => {
            let mut v = unpack(ctx, left)?;
            v.extend(unpack(ctx, right)?);
            v.push(Instr::IAdd);
            normalize_nonzero_to_one(ctx, v)
        }
        BinaryOperator::Xor => {
            let mut v = unpack(ctx, left)?;
            v.extend(unpack(ctx, right)?);
            v.push(Instr::IXor);
            v
        }
        BinaryOperator::AndThen => {
            let mut v = unpack(ctx, left)?;
            let label_false = ctx.fresh_label();
            let label_end = ctx.fresh_label();
            v.push(Instr::IfEq(label_false));
            v.extend(unpack(ctx, right)?);
            v.push(Instr::Goto(label_end));
            v.push(Instr::Label(label_false));
            v.push(Instr::Bipush(0));
            v.push(Instr::Label(label_end));
            v
        }
        BinaryOperator::OrElse => {
            let mut v = unpack(ctx, left)?;
            let label_true = ctx.fresh_label();
            let label_end = ctx.fresh_label();
            v.push(Instr::IfNe(label_true));
            v.extend(unpack(ctx, right)?);
            v.push(Instr::Goto(label_end));
            v.push(Instr::Label(label_true));
            v.push(Instr::Bipush(1));
            v.push(Instr::Label(label_end));
            v
        }
        BinaryOperator::Implies => {
            let mut v = unpack(ctx, left)?;
            let label_false = ctx.fresh_label();
            let label_end = ctx.fresh_label();
            v.push(Instr::IfEq(label_false));
            v.extend(unpack(ctx, right)?);
            v.push(Instr::Goto(label_end));
            v.push(Instr::Label(label_false));
            v.push(Instr::Bipush(1));
            v.push(Instr::Label(label_end));
            v
        }
        op => unreachable!("{op:?} is not a boolean operator"),
    };
    wrap_value(ctx, BOOLEAN_WRAPPER, "(I)V", value)
}

/// `or`'s raw `iadd` can produce `2` when both operands are `1`; this
/// folds any nonzero sum back down to the canonical `1`.
fn normalize_nonzero_to_one(ctx: &mut LowerCtx, mut value: Vec<Instr>) -> Vec<Instr> {
    let label_zero = ctx.fresh_label();
    let label_end = ctx.fresh_label();
    value.push(Instr::IfEq(label_zero));
    value.push(Instr::Bipush(1));
    value.push(Instr::Goto(label_end));
    value.push(Instr::Label(label_zero));
    value.push(Instr::Bipush(0));
    value.push(Instr::Label(label_end));
    value
}

fn lower_not(ctx: &mut LowerCtx, operand: &TExpr) -> CodegenResult<Vec<Instr>> {
    let mut value = unpack(ctx, operand)?;
    let label_true = ctx.fresh_label();
    let label_end = ctx.fresh_label();
    value.push(Instr::IfEq(label_true));
    value.push(Instr::Bipush(0));
    value.push(Instr::Goto(label_end));
    value.push(Instr::Label(label_true));
    value.push(Instr::Bipush(1));
    value.push(Instr::Label(label_end));
    wrap_value(ctx, BOOLEAN_WRAPPER, "(I)V", value)
}
