use serpentc_ast::{BinaryOperator, Expr, Feature, LiteralValue, ResolvedType};
use serpentc_diagnostics::{DiagnosticCode, DiagnosticCollection, Phase, SourceLocation};
use serpentc_flatten::FlattenClass;
use serpentc_ir::TExpr;
use serpentc_symbols::{mangle, mangle_local, resolve::substitute};

use crate::coerce::coerce_integer_to_real;
use crate::context::CheckContext;
use crate::scope::MethodScope;

pub fn check_expr(
    expr: &Expr,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    match expr {
        Expr::IntegerLiteral { value, .. } => Some(TExpr::IntegerLiteral { value: *value }),
        Expr::RealLiteral { value, .. } => Some(TExpr::RealLiteral { value: *value }),
        Expr::CharacterLiteral { value, .. } => Some(TExpr::CharacterLiteral { value: *value }),
        Expr::StringLiteral { value, .. } => Some(TExpr::StringLiteral { value: value.clone() }),
        Expr::BoolLiteral { value, .. } => Some(TExpr::BoolLiteral { value: *value }),
        Expr::VoidLiteral { .. } => Some(TExpr::VoidLiteral { ty: ResolvedType::void() }),
        Expr::Current { .. } => Some(TExpr::Current { ty: scope.class_type.clone() }),

        Expr::Variable { name, location } => {
            let mangled = mangle_local(name.as_str());
            if let Some(ty) = scope.lookup_local(&mangled) {
                return Some(TExpr::Variable { mangled_name: mangled, ty: ty.clone() });
            }
            if name.as_str() == "Result" && !scope.is_function {
                diags.add_error(
                    Phase::Type,
                    DiagnosticCode::TE4006ResultInProcedure,
                    location.clone(),
                    "`Result` is only defined inside a function",
                );
                return None;
            }
            check_feature_call(None, scope.class_type.clone(), name.as_str(), &[], location.as_ref(), scope, flat, ctx, diags)
        }

        Expr::FeatureCall { receiver, name, arguments, location } => {
            let (receiver_expr, receiver_type) = match receiver {
                Some(r) => {
                    let checked = check_expr(r, scope, flat, ctx, diags)?;
                    let ty = checked.ty();
                    (Some(checked), ty)
                }
                None => (None, scope.class_type.clone()),
            };
            check_feature_call(receiver_expr, receiver_type, name.as_str(), arguments, location.as_ref(), scope, flat, ctx, diags)
        }

        Expr::PrecursorCall { ancestor, arguments, location } => {
            check_precursor_call(ancestor.as_ref().map(|a| a.as_str()), arguments, location.as_ref(), scope, flat, ctx, diags)
        }

        Expr::CreateExpr { type_decl, constructor, arguments, location } => {
            check_create_expr(type_decl, constructor.as_str(), arguments, location.as_ref(), scope, ctx, diags)
        }

        Expr::BinaryOp { operator, left, right, location } => {
            check_binary_op(*operator, left, right, location.as_ref(), scope, flat, ctx, diags)
        }

        Expr::UnaryNot { argument, location } => {
            let value = check_expr(argument, scope, flat, ctx, diags)?;
            require_boolean(&value, location.as_ref(), diags)?;
            Some(TExpr::UnaryNot { operand: Box::new(value) })
        }
    }
}

fn require_boolean(value: &TExpr, location: Option<&SourceLocation>, diags: &mut DiagnosticCollection) -> Option<()> {
    if value.ty().name() == serpentc_ast::types::BOOLEAN_CLASS {
        Some(())
    } else {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4004NonBooleanGuard,
            location.cloned(),
            format!("expected a boolean value, found `{}`", value.ty()),
        );
        None
    }
}

fn literal_value_to_texpr(value: &LiteralValue) -> TExpr {
    match value {
        LiteralValue::Integer(v) => TExpr::IntegerLiteral { value: *v },
        LiteralValue::Real(v) => TExpr::RealLiteral { value: *v },
        LiteralValue::Character(v) => TExpr::CharacterLiteral { value: *v },
        LiteralValue::String(v) => TExpr::StringLiteral { value: v.clone() },
        LiteralValue::Bool(v) => TExpr::BoolLiteral { value: *v },
        LiteralValue::Void => TExpr::VoidLiteral { ty: ResolvedType::void() },
    }
}

/// Type-checks one feature call/access, qualified or not. `receiver_expr`
/// is `None` for an unqualified call (the receiver is `Current`).
#[allow(clippy::too_many_arguments)]
fn check_feature_call(
    receiver_expr: Option<TExpr>,
    receiver_type: ResolvedType,
    name: &str,
    raw_args: &[Expr],
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    let is_self_call = receiver_type.name() == scope.current_class_name;
    // Reading our own flattened table directly avoids rebuilding a symbol
    // table for the class currently being checked.
    if is_self_call {
        let Some(entry) = flat.get(name) else {
            diags.add_error(
                Phase::Type,
                DiagnosticCode::TE4008UnknownFeature,
                location.cloned(),
                format!("`{}` has no feature named `{}`", scope.current_class_name, name),
            );
            return None;
        };
        let feature = entry.feature.clone();
        return match feature.as_ref() {
            Feature::Constant { value, .. } if raw_args.is_empty() => Some(literal_value_to_texpr(value)),
            Feature::Field { type_decl, .. } if raw_args.is_empty() => {
                let ty = substitute(type_decl, &scope.generics, &scope.class_type);
                Some(TExpr::FieldAccess {
                    receiver: Box::new(receiver_expr.unwrap_or_else(|| TExpr::Current { ty: scope.class_type.clone() })),
                    mangled_name: mangle(&scope.current_class_name, name),
                    ty,
                })
            }
            Feature::Constant { .. } | Feature::Field { .. } => {
                diags.add_error(
                    Phase::Type,
                    DiagnosticCode::TE4009WrongArgumentCount,
                    location.cloned(),
                    format!("`{name}` is a field or constant and takes no arguments"),
                );
                None
            }
            Feature::Method { parameters, return_type, .. } | Feature::ExternalMethod { parameters, return_type, .. } => {
                let resolved_params: Vec<(String, ResolvedType)> = parameters
                    .iter()
                    .map(|p| (p.name.to_string(), substitute(&p.type_decl, &scope.generics, &scope.class_type)))
                    .collect();
                let args = check_call_arguments(raw_args, &resolved_params, name, location, scope, flat, ctx, diags)?;
                let ty = return_type
                    .as_ref()
                    .map(|t| substitute(t, &scope.generics, &scope.class_type))
                    .unwrap_or_else(ResolvedType::void);
                Some(TExpr::FeatureCall {
                    receiver: Box::new(receiver_expr.unwrap_or_else(|| TExpr::Current { ty: scope.class_type.clone() })),
                    mangled_name: mangle(&scope.current_class_name, name),
                    arguments: args,
                    ty,
                })
            }
        };
    }

    let mangled = mangle(receiver_type.name(), name);
    let table = ctx.symbol_table_for(&receiver_type, diags)?;
    let Some(member) = table.get(&mangled).cloned() else {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4008UnknownFeature,
            location.cloned(),
            format!("`{}` has no feature named `{}`", receiver_type, name),
        );
        return None;
    };
    if !table.is_interface_member(&mangled) {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4010FeatureNotCallableByClient,
            location.cloned(),
            format!("`{name}` is not part of `{receiver_type}`'s external interface"),
        );
        return None;
    }
    if !member.clients.permits(&scope.current_class_name) {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4010FeatureNotCallableByClient,
            location.cloned(),
            format!("`{}` is not a permitted client of `{}`", scope.current_class_name, name),
        );
        return None;
    }

    let is_value_feature = !member.feature.is_routine();
    if is_value_feature {
        if !raw_args.is_empty() {
            diags.add_error(
                Phase::Type,
                DiagnosticCode::TE4009WrongArgumentCount,
                location.cloned(),
                format!("`{name}` is a field or constant and takes no arguments"),
            );
            return None;
        }
        return match member.feature.as_ref() {
            Feature::Constant { value, .. } => Some(literal_value_to_texpr(value)),
            Feature::Field { .. } => Some(TExpr::FieldAccess {
                receiver: Box::new(receiver_expr.unwrap_or_else(|| TExpr::Current { ty: scope.class_type.clone() })),
                mangled_name: mangled,
                ty: member.declared_type.clone().unwrap_or_else(ResolvedType::void),
            }),
            _ => unreachable!(),
        };
    }

    let params: Vec<(String, ResolvedType)> = member
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.resolved_type.clone()))
        .collect();
    let args = check_call_arguments(raw_args, &params, name, location, scope, flat, ctx, diags)?;
    Some(TExpr::FeatureCall {
        receiver: Box::new(receiver_expr.unwrap_or_else(|| TExpr::Current { ty: scope.class_type.clone() })),
        mangled_name: mangled,
        arguments: args,
        ty: member.declared_type.clone().unwrap_or_else(ResolvedType::void),
    })
}

/// Checks argument arity and, per argument, conformance (inserting the
/// `INTEGER -> REAL` coercion where needed).
#[allow(clippy::too_many_arguments)]
fn check_call_arguments(
    raw_args: &[Expr],
    params: &[(String, ResolvedType)],
    callee_name: &str,
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<Vec<TExpr>> {
    if raw_args.len() != params.len() {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4009WrongArgumentCount,
            location.cloned(),
            format!(
                "`{}` expects {} argument(s), found {}",
                callee_name,
                params.len(),
                raw_args.len()
            ),
        );
        return None;
    }

    let mut result = Vec::with_capacity(raw_args.len());
    for (arg, (_, param_ty)) in raw_args.iter().zip(params.iter()) {
        let checked = check_expr(arg, scope, flat, ctx, diags)?;
        result.push(conform_with_coercion(checked, param_ty, location, scope, ctx, diags)?);
    }
    Some(result)
}

pub(crate) fn conform_with_coercion(
    value: TExpr,
    target: &ResolvedType,
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    ctx: &CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    let _ = scope;
    let value_ty = value.ty();
    if ctx.conforms(&value_ty, target) {
        return Some(value);
    }
    if value_ty.name() == serpentc_ast::types::INTEGER_CLASS && target.name() == serpentc_ast::types::REAL_CLASS {
        return Some(coerce_integer_to_real(value));
    }
    diags.add_error(
        Phase::Type,
        DiagnosticCode::TE4003ArgumentNotConformant,
        location.cloned(),
        format!("expected a value conforming to `{target}`, found `{value_ty}`"),
    );
    None
}

#[allow(clippy::too_many_arguments)]
fn check_precursor_call(
    ancestor: Option<&str>,
    raw_args: &[Expr],
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    if !scope.inside_redefine {
        diags.add_error(
            Phase::Naming,
            DiagnosticCode::NE3005PrecursorOutsideRedefine,
            location.cloned(),
            "`Precursor` may only be called inside a redefined feature",
        );
        return None;
    }

    let suffix = format!("_{}", scope.current_feature_name);
    let key = if let Some(ancestor) = ancestor {
        let key = format!("Precursor_{ancestor}_{}{suffix}", scope.current_class_name);
        if !flat.precursors.contains_key(&key) {
            diags.add_error(
                Phase::Naming,
                DiagnosticCode::NE3004MissingPrecursorTarget,
                location.cloned(),
                format!("no precursor of `{}` through `{ancestor}`", scope.current_feature_name),
            );
            return None;
        }
        key
    } else {
        let candidates: Vec<&String> = flat.precursors.keys().filter(|k| k.ends_with(&suffix)).collect();
        match candidates.len() {
            0 => {
                diags.add_error(
                    Phase::Naming,
                    DiagnosticCode::NE3004MissingPrecursorTarget,
                    location.cloned(),
                    format!("no precursor is defined for `{}`", scope.current_feature_name),
                );
                return None;
            }
            1 => candidates[0].clone(),
            _ => {
                diags.add_error(
                    Phase::Naming,
                    DiagnosticCode::NE3003AmbiguousPrecursor,
                    location.cloned(),
                    format!(
                        "`{}` has more than one precursor; name the ancestor",
                        scope.current_feature_name
                    ),
                );
                return None;
            }
        }
    };

    let entry = flat.precursors.get(&key)?.clone();
    let params: Vec<(String, ResolvedType)> = entry
        .feature
        .parameters()
        .iter()
        .map(|p| (p.name.to_string(), substitute(&p.type_decl, &scope.generics, &scope.class_type)))
        .collect();
    let args = check_call_arguments(raw_args, &params, &key, location, scope, flat, ctx, diags)?;
    let ty = entry
        .feature
        .declared_type()
        .map(|t| substitute(t, &scope.generics, &scope.class_type))
        .unwrap_or_else(ResolvedType::void);

    let target_mangled_name = mangle(&entry.origin_class, entry.feature.name().as_str());
    Some(TExpr::PrecursorCall { precursor_name: key, target_mangled_name, arguments: args, ty })
}

fn check_create_expr(
    type_decl: &serpentc_ast::TypeDecl,
    constructor: &str,
    raw_args: &[Expr],
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    let resolved_target = substitute(type_decl, &scope.generics, &scope.class_type);

    let Some(flat_target) = ctx.flattened.get(resolved_target.name()) else {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4001UnknownType,
            location.cloned(),
            format!("unknown class `{}`", resolved_target.name()),
        );
        return None;
    };
    if flat_target.is_deferred() {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4011DeferredClassCreation,
            location.cloned(),
            format!("cannot create an instance of deferred class `{}`", resolved_target.name()),
        );
        return None;
    }

    let mangled_ctor = mangle(resolved_target.name(), constructor);
    let table = ctx.symbol_table_for(&resolved_target, diags)?;
    if !table.is_constructor(&mangled_ctor) {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4012UnknownConstructor,
            location.cloned(),
            format!("`{}` names unknown constructor `{constructor}`", resolved_target.name()),
        );
        return None;
    }
    let member = table.get(&mangled_ctor)?.clone();
    if resolved_target.name() != scope.current_class_name && !member.clients.permits(&scope.current_class_name) {
        diags.add_error(
            Phase::Type,
            DiagnosticCode::TE4010FeatureNotCallableByClient,
            location.cloned(),
            format!("`{}` is not a permitted client of `{constructor}`", scope.current_class_name),
        );
        return None;
    }

    let params: Vec<(String, ResolvedType)> = member
        .parameters
        .iter()
        .map(|p| (p.name.clone(), p.resolved_type.clone()))
        .collect();
    let flat_current = ctx.flattened.get(&scope.current_class_name)?.clone();
    let args = check_call_arguments(raw_args, &params, constructor, location, scope, &flat_current, ctx, diags)?;

    Some(TExpr::CreateExpr { type_decl: resolved_target, constructor: mangled_ctor, arguments: args })
}

#[allow(clippy::too_many_arguments)]
fn check_binary_op(
    operator: BinaryOperator,
    left: &Expr,
    right: &Expr,
    location: Option<&SourceLocation>,
    scope: &MethodScope,
    flat: &FlattenClass,
    ctx: &mut CheckContext,
    diags: &mut DiagnosticCollection,
) -> Option<TExpr> {
    let left_t = check_expr(left, scope, flat, ctx, diags)?;
    let right_t = check_expr(right, scope, flat, ctx, diags)?;

    if operator.is_boolean_operator() {
        require_boolean(&left_t, location, diags)?;
        require_boolean(&right_t, location, diags)?;
        if matches!(operator, BinaryOperator::Implies) {
            // `implies` desugars to `(not left) and-then right` (spec.md §4.3).
            return Some(TExpr::BinaryOp {
                operator: BinaryOperator::AndThen,
                left: Box::new(TExpr::UnaryNot { operand: Box::new(left_t) }),
                right: Box::new(right_t),
                ty: ResolvedType::boolean(),
            });
        }
        return Some(TExpr::BinaryOp { operator, left: Box::new(left_t), right: Box::new(right_t), ty: ResolvedType::boolean() });
    }

    if operator.participates_in_numeric_coercion() {
        let mut left_t = left_t;
        let mut right_t = right_t;
        let mut lt = left_t.ty();
        let mut rt = right_t.ty();
        if lt.name() == serpentc_ast::types::INTEGER_CLASS && rt.name() == serpentc_ast::types::REAL_CLASS {
            left_t = coerce_integer_to_real(left_t);
            lt = left_t.ty();
        } else if rt.name() == serpentc_ast::types::INTEGER_CLASS && lt.name() == serpentc_ast::types::REAL_CLASS {
            right_t = coerce_integer_to_real(right_t);
            rt = right_t.ty();
        }
        if !(lt.is_numeric() && lt == rt) {
            diags.add_error(
                Phase::Type,
                DiagnosticCode::TE4003ArgumentNotConformant,
                location.cloned(),
                format!("operator requires matching numeric operands, found `{lt}` and `{rt}`"),
            );
            return None;
        }
        let ty = if operator.is_relational() { ResolvedType::boolean() } else { lt };
        return Some(TExpr::BinaryOp { operator, left: Box::new(left_t), right: Box::new(right_t), ty });
    }

    unreachable!("BinaryOperator is exhaustively boolean or numeric-coercing")
}
