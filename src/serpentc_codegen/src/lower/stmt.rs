use serpentc_ast::ResolvedType;
use serpentc_ir::{TAssignTarget, TExpr, TStmt};

use crate::bridge;
use crate::errors::CodegenResult;
use crate::instr::Instr;

use super::{call_descriptor, lower_expr, unpack_in_place, LowerCtx};
use serpentc_ast::types::GENERAL_CLASS;

pub fn lower_block(ctx: &mut LowerCtx, stmts: &[TStmt]) -> CodegenResult<Vec<Instr>> {
    let mut out = Vec::new();
    for stmt in stmts {
        out.extend(lower_stmt(ctx, stmt)?);
    }
    Ok(out)
}

pub fn lower_stmt(ctx: &mut LowerCtx, stmt: &TStmt) -> CodegenResult<Vec<Instr>> {
    match stmt {
        TStmt::Assignment { target, value } => lower_assignment(ctx, target, value),
        TStmt::Create { target, type_decl, constructor, arguments } => {
            let mut out = assignment_prologue(target);
            out.extend(lower_create(ctx, type_decl, constructor, arguments)?);
            out.extend(assignment_epilogue(ctx, target)?);
            Ok(out)
        }
        TStmt::If { arms, else_branch } => lower_if(ctx, arms, else_branch),
        TStmt::Until { init, guard, body } => lower_until(ctx, init, guard, body),
        TStmt::RoutineCall { call } => {
            let mut out = lower_expr(ctx, call)?;
            if !call.ty().is_void() {
                out.push(Instr::Pop);
            }
            Ok(out)
        }
    }
}

/// `New`/`Dup`/`Dup`/`Invokespecial <init>()V`/arguments.../`Invokevirtual
/// GENERAL.<constructor>` (spec.md §4.7 "Object creation"): the default
/// constructor always runs first, then the user-named creation routine —
/// itself an ordinary call, so it dispatches through the root exactly like
/// any other routine call (see `lower_expr`'s `FeatureCall` case).
pub fn lower_create(ctx: &mut LowerCtx, type_decl: &ResolvedType, constructor: &str, arguments: &[TExpr]) -> CodegenResult<Vec<Instr>> {
    let internal = bridge::internal_class_name(&type_decl.instantiation_name());
    let class_idx = ctx.pool.add_class(&internal)?;
    let default_ctor_idx = ctx.pool.add_methodref(&internal, "<init>", "()V")?;
    let mut out = vec![Instr::New(class_idx), Instr::Dup, Instr::Dup, Instr::Invokespecial(default_ctor_idx)];
    for arg in arguments {
        out.extend(lower_expr(ctx, arg)?);
    }
    let descriptor = call_descriptor(ctx, constructor, arguments, &ResolvedType::void());
    let owner = bridge::internal_class_name(GENERAL_CLASS);
    let idx = ctx.pool.add_methodref(&owner, constructor, &descriptor)?;
    out.push(Instr::Invokevirtual(idx));
    Ok(out)
}

fn lower_assignment(ctx: &mut LowerCtx, target: &TAssignTarget, value: &TExpr) -> CodegenResult<Vec<Instr>> {
    let mut out = assignment_prologue(target);
    out.extend(lower_expr(ctx, value)?);
    out.extend(assignment_epilogue(ctx, target)?);
    Ok(out)
}

/// `Local` targets need nothing before the value; `Field` targets need
/// `Current` pushed first so it sits under the value for `putfield`
/// (spec.md §4.7 "Assignment").
fn assignment_prologue(target: &TAssignTarget) -> Vec<Instr> {
    match target {
        TAssignTarget::Local { .. } => Vec::new(),
        TAssignTarget::Field { .. } => vec![Instr::Aload(0)],
    }
}

fn assignment_epilogue(ctx: &mut LowerCtx, target: &TAssignTarget) -> CodegenResult<Vec<Instr>> {
    match target {
        TAssignTarget::Local { mangled_name, .. } => Ok(vec![Instr::Astore(ctx.locals.slot(mangled_name)?)]),
        TAssignTarget::Field { mangled_name, ty } => {
            let descriptor = crate::descriptor::type_descriptor(ty);
            let owner = bridge::internal_class_name(ctx.current_class);
            let idx = ctx.pool.add_fieldref(&owner, mangled_name, &descriptor)?;
            Ok(vec![Instr::Putfield(idx)])
        }
    }
}

/// Chained `if`/`elseif`/`else` (spec.md §4.7 "If"): each arm tests its
/// guard and falls through to the next arm's label when false, the last
/// arm's body jumping past every later arm to one shared end label.
fn lower_if(ctx: &mut LowerCtx, arms: &[(TExpr, Vec<TStmt>)], else_branch: &[TStmt]) -> CodegenResult<Vec<Instr>> {
    let label_end = ctx.fresh_label();
    let mut out = Vec::new();
    for (guard, body) in arms {
        let mut guard_code = unpack_in_place_after(ctx, guard)?;
        let label_next = ctx.fresh_label();
        guard_code.push(Instr::IfEq(label_next));
        out.extend(guard_code);
        out.extend(lower_block(ctx, body)?);
        out.push(Instr::Goto(label_end));
        out.push(Instr::Label(label_next));
    }
    out.extend(lower_block(ctx, else_branch)?);
    out.push(Instr::Label(label_end));
    Ok(out)
}

/// Lowers a boolean-typed guard expression and unpacks its raw `int`,
/// ready for an `ifeq`/`ifne` test.
fn unpack_in_place_after(ctx: &mut LowerCtx, guard: &TExpr) -> CodegenResult<Vec<Instr>> {
    let mut out = lower_expr(ctx, guard)?;
    out.extend(unpack_in_place(ctx, &guard.ty())?);
    Ok(out)
}

/// `from <init> until <guard> loop <body> end` (spec.md §4.7 "Until"):
/// runs `init` once, tests `guard` before every iteration including the
/// first (an Eiffel loop with a trivially-true guard never enters the
/// body), and re-tests after each body execution.
fn lower_until(ctx: &mut LowerCtx, init: &[TStmt], guard: &TExpr, body: &[TStmt]) -> CodegenResult<Vec<Instr>> {
    let label_body = ctx.fresh_label();
    let label_end = ctx.fresh_label();
    let mut out = lower_block(ctx, init)?;
    out.extend(unpack_in_place_after(ctx, guard)?);
    out.push(Instr::IfNe(label_end));
    out.push(Instr::Label(label_body));
    out.extend(lower_block(ctx, body)?);
    out.extend(unpack_in_place_after(ctx, guard)?);
    out.push(Instr::IfEq(label_body));
    out.push(Instr::Label(label_end));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instr::assemble;
    use crate::signature::SignatureTable;
    use crate::lower::LocalsMap;

    fn harness() -> (crate::pool::ConstantPool, SignatureTable) {
        (crate::pool::ConstantPool::new(), SignatureTable::build(&serpentc_ir::TProgram::default()))
    }

    #[test]
    fn until_tests_the_guard_before_the_first_iteration() {
        let (mut pool, sigs) = harness();
        let locals = LocalsMap::build([]);
        let mut ctx = LowerCtx::new(&mut pool, &sigs, &locals, "APPLICATION");
        let guard = TExpr::BoolLiteral { value: true };
        let code = lower_until(&mut ctx, &[], &guard, &[]).unwrap();
        // a guard that is trivially true must short-circuit before Label(body)
        assert!(matches!(code.first(), Some(Instr::New(_))));
        assemble(&code).unwrap();
    }

    #[test]
    fn routine_call_pops_a_function_result_but_not_a_procedure_result() {
        let (mut pool, sigs) = harness();
        let locals = LocalsMap::build([]);
        let mut ctx = LowerCtx::new(&mut pool, &sigs, &locals, "APPLICATION");
        let function_call = TStmt::RoutineCall { call: TExpr::IntegerLiteral { value: 1 } };
        let code = lower_stmt(&mut ctx, &function_call).unwrap();
        assert!(matches!(code.last(), Some(Instr::Pop)));

        let procedure_call = TStmt::RoutineCall { call: TExpr::VoidLiteral { ty: ResolvedType::void() } };
        let code = lower_stmt(&mut ctx, &procedure_call).unwrap();
        assert!(!matches!(code.last(), Some(Instr::Pop)));
    }
}
