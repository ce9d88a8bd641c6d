//! Lowers the typed IR (`serpentc_ir`) to flat `Instr` sequences (spec.md
//! §4.7 "Expression and statement lowering"). Every ordinary routine call
//! dispatches `invokevirtual` through the synthesized root class rather
//! than the callee's own declaring class (see `emit_program`'s doc comment
//! for why, and DESIGN.md for the tradeoff this accepts).

pub mod expr;
pub mod stmt;

use std::collections::HashMap;

use serpentc_ast::ResolvedType;
use serpentc_ir::TExpr;

use crate::bridge;
use crate::descriptor::method_descriptor;
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::{Instr, LabelId};
use crate::pool::ConstantPool;
use crate::signature::SignatureTable;

pub use expr::lower_expr;
pub use stmt::lower_block;

/// Every value in this language's object model is a reference, so the
/// `to_real` coercion the type checker inserts (spec.md §4.3) is the one
/// `FeatureCall` this crate never dispatches as an ordinary virtual call.
pub const INTEGER_TO_REAL_INTRINSIC: &str = "INTEGER_to_real";

/// Maps a method's locals (`self` plus parameters plus declared locals) to
/// their JVM local-variable slots. Slot 0 is always `Current`; everything
/// else keeps declaration order, one slot per entry since every value is a
/// boxed reference (no category-2 locals in this object model).
pub struct LocalsMap(HashMap<String, u16>);

impl LocalsMap {
    pub fn build<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = HashMap::new();
        let mut slot: u16 = 1; // slot 0 is `this`/Current
        for name in names {
            map.insert(name.to_string(), slot);
            slot += 1;
        }
        Self(map)
    }

    pub fn slot(&self, mangled_name: &str) -> CodegenResult<u16> {
        self.0
            .get(mangled_name)
            .copied()
            .ok_or_else(|| CodegenError::MissingDescriptor(mangled_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Shared state threaded through one method's worth of lowering: the
/// class's constant pool (fed as instructions reference literals, fields
/// and methods), the program-wide call signature table, this method's
/// local slots, and a counter minting fresh branch-target labels.
pub struct LowerCtx<'a> {
    pub pool: &'a mut ConstantPool,
    pub signatures: &'a SignatureTable,
    pub locals: &'a LocalsMap,
    /// The internal name of the class whose method is being lowered, used
    /// to qualify `Current`'s own field writes (spec.md §4.3: an
    /// assignment's LHS field always belongs to the current class).
    pub current_class: &'a str,
    next_label: LabelId,
}

impl<'a> LowerCtx<'a> {
    pub fn new(pool: &'a mut ConstantPool, signatures: &'a SignatureTable, locals: &'a LocalsMap, current_class: &'a str) -> Self {
        Self { pool, signatures, locals, current_class, next_label: 0 }
    }

    pub fn fresh_label(&mut self) -> LabelId {
        let id = self.next_label;
        self.next_label += 1;
        id
    }
}

/// `New <wrapper>`, `Dup`, the caller-supplied value-producing code, then
/// `Invokespecial <wrapper>.<init><descriptor>` (spec.md §4.7 "every
/// literal and computed value is immediately boxed"). Works because `New`
/// and `Dup` precede the value: the wrapper reference sits one slot below
/// the value the whole time, exactly where the constructor call needs it.
pub fn wrap_value(ctx: &mut LowerCtx, wrapper: &str, ctor_descriptor: &str, value: Vec<Instr>) -> CodegenResult<Vec<Instr>> {
    let internal = bridge::internal_class_name(wrapper);
    let class_idx = ctx.pool.add_class(&internal)?;
    let mut out = vec![Instr::New(class_idx), Instr::Dup];
    out.extend(value);
    let ctor_idx = ctx.pool.add_methodref(&internal, "<init>", ctor_descriptor)?;
    out.push(Instr::Invokespecial(ctor_idx));
    Ok(out)
}

/// Boxes a raw primitive that is *already* on top of the stack (e.g. fresh
/// off a bridge call's `invokestatic` return) rather than one this code is
/// about to compute. `DupX1`/`Swap` reshuffle `[value]` into
/// `[wrapperref, value, wrapperref]` so the constructor call consumes
/// `(wrapperref, value)` and leaves one boxed reference behind — traced by
/// hand since the verifier that would normally catch a stack-shape mistake
/// is disabled (spec.md §9 Open Question (a)).
pub fn box_raw(ctx: &mut LowerCtx, wrapper: &str, ctor_descriptor: &str) -> CodegenResult<Vec<Instr>> {
    let internal = bridge::internal_class_name(wrapper);
    let class_idx = ctx.pool.add_class(&internal)?;
    let ctor_idx = ctx.pool.add_methodref(&internal, "<init>", ctor_descriptor)?;
    Ok(vec![Instr::New(class_idx), Instr::DupX1, Instr::Swap, Instr::Invokespecial(ctor_idx)])
}

/// Pushes a raw 32-bit int the narrowest way the instruction set allows
/// (spec.md §9 Open Question (c)): `bipush` within a signed byte, `sipush`
/// within a signed short, otherwise a pool `ldc`.
pub fn push_raw_int(ctx: &mut LowerCtx, value: i32) -> CodegenResult<Vec<Instr>> {
    if (-128..=127).contains(&value) {
        Ok(vec![Instr::Bipush(value as i8)])
    } else if (i16::MIN as i32..=i16::MAX as i32).contains(&value) {
        Ok(vec![Instr::Sipush(value as i16)])
    } else {
        let idx = ctx.pool.add_integer(value)?;
        Ok(vec![Instr::Ldc(idx)])
    }
}

pub fn push_raw_float(ctx: &mut LowerCtx, value: f32) -> CodegenResult<Vec<Instr>> {
    let idx = ctx.pool.add_float(value)?;
    Ok(vec![Instr::Ldc(idx)])
}

pub fn push_raw_string(ctx: &mut LowerCtx, value: &str) -> CodegenResult<Vec<Instr>> {
    let idx = ctx.pool.add_string(value)?;
    Ok(vec![Instr::Ldc(idx)])
}

/// Lowers `expr` and unpacks its boxed result through the raw field its
/// wrapper class carries (spec.md §4.8), for use in arithmetic/boolean/
/// relational operators, which all work on raw values.
pub fn unpack(ctx: &mut LowerCtx, expr: &TExpr) -> CodegenResult<Vec<Instr>> {
    let mut out = lower_expr(ctx, expr)?;
    let ty = expr.ty();
    out.extend(unpack_in_place(ctx, &ty)?);
    Ok(out)
}

/// Just the `getfield` half of `unpack`, for a value already on the stack.
pub fn unpack_in_place(ctx: &mut LowerCtx, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    let class_name = ty.name();
    let wrapper = bridge::wrapper_for_primitive(class_name).ok_or_else(|| CodegenError::UnsupportedBridgePrimitive(class_name.to_string()))?;
    let field = bridge::raw_field_for(wrapper).ok_or_else(|| CodegenError::UnsupportedBridgePrimitive(class_name.to_string()))?;
    let field_descriptor = match field {
        f if f == bridge::RAW_INT_FIELD => "I",
        f if f == bridge::RAW_FLOAT_FIELD => "F",
        _ => "Ljava/lang/String;",
    };
    let owner = bridge::internal_class_name(wrapper);
    let idx = ctx.pool.add_fieldref(&owner, field, field_descriptor)?;
    Ok(vec![Instr::Getfield(idx)])
}

/// The call-site descriptor for `mangled_name`: the callee's own declared
/// signature when known (spec.md §4.6 "Descriptor correctness" — every call
/// site targeting the same method must agree on one descriptor), falling
/// back to one built from this call's actual argument/return types only
/// when the program-wide table somehow lacks an entry.
pub fn call_descriptor(ctx: &LowerCtx, mangled_name: &str, arguments: &[TExpr], ty: &ResolvedType) -> String {
    if let Some(sig) = ctx.signatures.get(mangled_name) {
        return sig.descriptor();
    }
    let params: Vec<String> = arguments.iter().map(|a| crate::descriptor::type_descriptor(&a.ty())).collect();
    let ret = if ty.is_void() { crate::descriptor::VOID_DESCRIPTOR.to_string() } else { crate::descriptor::type_descriptor(ty) };
    method_descriptor(&params, &ret)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locals_map_assigns_sequential_slots_after_current() {
        let map = LocalsMap::build(["local_dx", "local_dy"]);
        assert_eq!(map.slot("local_dx").unwrap(), 1);
        assert_eq!(map.slot("local_dy").unwrap(), 2);
    }

    #[test]
    fn locals_map_reports_missing_names_as_a_codegen_error() {
        let map = LocalsMap::build(["local_dx"]);
        assert!(map.slot("local_missing").is_err());
    }

    #[test]
    fn push_raw_int_picks_the_narrowest_instruction() {
        let mut pool = ConstantPool::new();
        let sigs = SignatureTable::build(&serpentc_ir::TProgram::default());
        let locals = LocalsMap::build([]);
        let mut ctx = LowerCtx::new(&mut pool, &sigs, &locals, "APPLICATION");
        assert!(matches!(push_raw_int(&mut ctx, 10).unwrap()[0], Instr::Bipush(10)));
        assert!(matches!(push_raw_int(&mut ctx, 1000).unwrap()[0], Instr::Sipush(1000)));
        assert!(matches!(push_raw_int(&mut ctx, 100_000).unwrap()[0], Instr::Ldc(_)));
    }
}
