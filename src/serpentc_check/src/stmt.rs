use serpentc_ast::{Expr, ResolvedType, Stmt};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase};
use serpentc_flatten::FlattenClass;
use serpentc_ir::{TAssignTarget, TStmt};
use serpentc_symbols::{mangle, mangle_local, resolve::substitute};

use crate::context::CheckContext;
use crate::expr::{check_expr, conform_with_coercion};
use crate::scope::MethodScope;

pub fn check_stmts(
    stmts: &[Stmt],
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Vec<TStmt> {
    stmts
        .iter()
        .filter_map(|stmt| check_stmt(stmt, scope, flat, ctx, diags))
        .collect()
}

pub fn check_stmt(
    stmt: &Stmt,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TStmt> {
    match stmt {
        Stmt::Assignment { lhs, rhs, location } => {
            let target = resolve_assign_target(lhs, scope, flat, location.as_ref(), diags)?;
            let target_ty = target_type(&target);
            let value = check_expr(rhs, scope, flat, ctx, diags)?;
            let value = conform_with_coercion(value, &target_ty, location.as_ref(), scope, ctx, diags)?;
            Some(TStmt::Assignment { target, value })
        }

        Stmt::Create { target, type_decl, constructor, arguments, location } => {
            let assign_target = resolve_assign_target(target, scope, flat, location.as_ref(), diags)?;
            let resolved_target = type_decl
                .as_ref()
                .map(|t| substitute(t, &scope.generics, &scope.class_type))
                .unwrap_or_else(|| target_type(&assign_target));

            let create_expr = serpentc_ast::Expr::CreateExpr {
                type_decl: type_decl.clone().unwrap_or_else(|| serpentc_ast::TypeDecl::concrete(resolved_target.name())),
                constructor: constructor.clone(),
                arguments: arguments.clone(),
                location: location.clone(),
            };
            let checked = check_expr(&create_expr, scope, flat, ctx, diags)?;
            let serpentc_ir::TExpr::CreateExpr { type_decl: resolved, constructor: ctor, arguments: args } = checked else {
                unreachable!("check_expr(CreateExpr) always returns TExpr::CreateExpr");
            };
            Some(TStmt::Create { target: assign_target, type_decl: resolved, constructor: ctor, arguments: args })
        }

        Stmt::If { arms, else_branch, location } => {
            let mut checked_arms = Vec::with_capacity(arms.len());
            for (cond, body) in arms {
                let Some(cond_t) = check_expr(cond, scope, flat, ctx, diags) else {
                    continue;
                };
                if cond_t.ty().name() != serpentc_ast::types::BOOLEAN_CLASS {
                    diags.add_error(
                        Phase::Type,
                        DiagnosticCode::TE4004NonBooleanGuard,
                        location.clone(),
                        format!("`if` condition must be boolean, found `{}`", cond_t.ty()),
                    );
                    continue;
                }
                checked_arms.push((cond_t, check_stmts(body, scope, flat, ctx, diags)));
            }
            let else_checked = check_stmts(else_branch, scope, flat, ctx, diags);
            Some(TStmt::If { arms: checked_arms, else_branch: else_checked })
        }

        Stmt::Until { init, guard, body, location } => {
            let init_checked = check_stmts(init, scope, flat, ctx, diags);
            let guard_checked = check_expr(guard, scope, flat, ctx, diags)?;
            if guard_checked.ty().name() != serpentc_ast::types::BOOLEAN_CLASS {
                diags.add_error(
                    Phase::Type,
                    DiagnosticCode::TE4004NonBooleanGuard,
                    location.clone(),
                    format!("`until` guard must be boolean, found `{}`", guard_checked.ty()),
                );
                return None;
            }
            let body_checked = check_stmts(body, scope, flat, ctx, diags);
            Some(TStmt::Until { init: init_checked, guard: guard_checked, body: body_checked })
        }

        Stmt::RoutineCall { call, .. } => {
            let call_checked = check_expr(call, scope, flat, ctx, diags)?;
            Some(TStmt::RoutineCall { call: call_checked })
        }
    }
}

fn target_type(target: &TAssignTarget) -> ResolvedType {
    match target {
        TAssignTarget::Local { ty, .. } | TAssignTarget::Field { ty, .. } => ty.clone(),
    }
}

/// spec.md §4.3 "Statement lowering": "LHS must be a local, a parameter,
/// or a field of the current class (fields of other objects are not
/// writable here)."
fn resolve_assign_target(
    expr: &Expr,
    scope: &MethodScope,
    flat: &FlattenClass,
    location: Option<&serpentc_diagnostics::SourceLocation>,
    diags: &mut DiagnosticCollection,
) -> Option<TAssignTarget> {
    match expr {
        Expr::Variable { name, .. } => {
            let mangled = mangle_local(name.as_str());
            if let Some(ty) = scope.lookup_local(&mangled) {
                return Some(TAssignTarget::Local { mangled_name: mangled, ty: ty.clone() });
            }
            match flat.get(name.as_str()) {
                Some(entry) if matches!(entry.feature.as_ref(), serpentc_ast::Feature::Field { .. }) => {
                    let serpentc_ast::Feature::Field { type_decl, .. } = entry.feature.as_ref() else {
                        unreachable!();
                    };
                    let ty = substitute(type_decl, &scope.generics, &scope.class_type);
                    Some(TAssignTarget::Field { mangled_name: mangle(&scope.current_class_name, name.as_str()), ty })
                }
                _ => {
                    diags.add_error(
                        Phase::Type,
                        DiagnosticCode::TE4005AssignmentToNonLvalue,
                        location.cloned(),
                        format!("`{name}` is not an assignable local, parameter, or own field"),
                    );
                    None
                }
            }
        }
        _ => {
            diags.add_error(
                Phase::Type,
                DiagnosticCode::TE4005AssignmentToNonLvalue,
                location.cloned(),
                "assignment target must be a local, parameter, or field name",
            );
            None
        }
    }
}
