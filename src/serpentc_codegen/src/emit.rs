//! Builds one `ClassFile` per `TClass` (spec.md §4.9): fields, a default
//! constructor, every declared method (user-defined or host-bridged), and
//! — on the program's main class only — the JVM entry-point stub.

use serpentc_ast::types::GENERAL_CLASS;
use serpentc_ast::ResolvedType;
use serpentc_ir::{TClass, TMethod, TProgram};

use crate::bridge;
use crate::class_file::{major_version_for_release, ClassFile, FieldEntry, MethodEntry};
use crate::descriptor::{method_descriptor, type_descriptor, VOID_DESCRIPTOR};
use crate::errors::{CodegenError, CodegenResult};
use crate::instr::{assemble, Instr};
use crate::lower::{lower_block, LocalsMap, LowerCtx};
use crate::pool::ConstantPool;
use crate::signature::SignatureTable;

/// Emits `class`, returning its internal (unqualified) name and the
/// serialized class-file bytes.
pub fn emit_class(class: &TClass, program: &TProgram, release: u16, signatures: &SignatureTable) -> CodegenResult<(String, Vec<u8>)> {
    let mut pool = ConstantPool::new();
    pool.add_utf8("Code")?;
    let this_class_index = pool.add_class(&bridge::internal_class_name(&class.name))?;
    let super_class_index = pool.add_class(&bridge::internal_class_name(&class.super_class))?;

    let mut fields = Vec::with_capacity(class.fields.len());
    for field in &class.fields {
        let name_index = pool.add_utf8(&field.mangled_name)?;
        let descriptor_index = pool.add_utf8(&type_descriptor(&field.ty))?;
        fields.push(FieldEntry { name_index, descriptor_index });
    }

    let mut methods = vec![emit_default_constructor(class, &mut pool)?];
    for method in &class.methods {
        methods.push(emit_method(method, class, &mut pool, signatures)?);
    }
    if program.main_class.as_deref() == Some(class.name.as_str()) {
        methods.push(emit_main_stub(class, program, &mut pool, signatures)?);
    }

    let class_file = ClassFile {
        pool,
        this_class_index,
        super_class_index,
        major_version: major_version_for_release(release),
        fields,
        methods,
    };
    let bytes = class_file.serialize()?;
    Ok((class.name.clone(), bytes))
}

/// `Aload(0)`/`Invokespecial <super>.<init>()V`/`Return` (spec.md §4.7
/// "Default constructor"): every class gets exactly this one, regardless
/// of whether its own creation routines do more work afterward (those run
/// as ordinary routine calls from `CreateExpr`, not from `<init>`).
fn emit_default_constructor(class: &TClass, pool: &mut ConstantPool) -> CodegenResult<MethodEntry> {
    let super_internal = bridge::internal_class_name(&class.super_class);
    let super_ctor = pool.add_methodref(&super_internal, "<init>", "()V")?;
    let code = assemble(&[Instr::Aload(0), Instr::Invokespecial(super_ctor), Instr::Return])?;
    Ok(MethodEntry {
        name_index: pool.add_utf8("<init>")?,
        descriptor_index: pool.add_utf8("()V")?,
        is_static: false,
        is_varargs: false,
        max_locals: 1,
        code,
    })
}

fn emit_method(method: &TMethod, class: &TClass, pool: &mut ConstantPool, signatures: &SignatureTable) -> CodegenResult<MethodEntry> {
    match method {
        TMethod::UserDefined { mangled_name, parameters, return_type, locals, body, .. } => {
            let local_names: Vec<&str> = parameters.iter().chain(locals.iter()).map(|(name, _)| name.as_str()).collect();
            let locals_map = LocalsMap::build(local_names);
            let max_locals = locals_map.len() as u16 + 1;
            let mut ctx = LowerCtx::new(&mut *pool, signatures, &locals_map, &class.name);
            let mut instrs = lower_block(&mut ctx, body)?;
            instrs.extend(method_epilogue(&mut ctx, return_type, locals)?);
            let code = assemble(&instrs)?;

            let descriptor = method_public_descriptor(signatures, mangled_name, parameters, return_type);
            Ok(MethodEntry {
                name_index: pool.add_utf8(mangled_name)?,
                descriptor_index: pool.add_utf8(&descriptor)?,
                is_static: false,
                is_varargs: false,
                max_locals,
                code,
            })
        }
        TMethod::External { mangled_name, parameters, return_type, alias, .. } => {
            emit_external_method(mangled_name, parameters, return_type, alias, class, pool)
        }
    }
}

/// A function returns by reloading its implicit `Result` local (spec.md
/// §4.4 "every function carries an implicit `local_Result`"); a procedure
/// just falls off the end of its body.
fn method_epilogue(ctx: &mut LowerCtx, return_type: &Option<ResolvedType>, locals: &[(String, ResolvedType)]) -> CodegenResult<Vec<Instr>> {
    match return_type {
        Some(_) => {
            let result_name = locals
                .iter()
                .find(|(name, _)| name == "local_Result")
                .map(|(name, _)| name.as_str())
                .unwrap_or("local_Result");
            Ok(vec![Instr::Aload(ctx.locals.slot(result_name)?), Instr::AReturn])
        }
        None => Ok(vec![Instr::Return]),
    }
}

fn method_public_descriptor(signatures: &SignatureTable, mangled_name: &str, parameters: &[(String, ResolvedType)], return_type: &Option<ResolvedType>) -> String {
    if let Some(sig) = signatures.get(mangled_name) {
        return sig.descriptor();
    }
    let params: Vec<String> = parameters.iter().map(|(_, ty)| type_descriptor(ty)).collect();
    let ret = return_type.as_ref().map(type_descriptor).unwrap_or_else(|| VOID_DESCRIPTOR.to_string());
    method_descriptor(&params, &ret)
}

/// A host-bridged method (spec.md §4.8 "External methods"): unpacks every
/// primitive operand (`Current` included — an external method on `INTEGER`
/// itself unpacks its own receiver before calling the host), invokes the
/// named static host method, and reboxes a primitive result.
fn emit_external_method(
    mangled_name: &str,
    parameters: &[(String, ResolvedType)],
    return_type: &Option<ResolvedType>,
    alias: &str,
    class: &TClass,
    pool: &mut ConstantPool,
) -> CodegenResult<MethodEntry> {
    let (host_class, host_method) = split_external_alias(alias)?;

    let mut instrs = Vec::new();
    let mut host_param_descriptors = Vec::new();

    let current_ty = ResolvedType::simple(class.name.as_str());
    instrs.push(Instr::Aload(0));
    instrs.extend(unpack_operand(&mut *pool, &current_ty)?);
    host_param_descriptors.push(crate::descriptor::host_primitive_descriptor(&current_ty));

    for (index, (_, ty)) in parameters.iter().enumerate() {
        let slot = (index + 1) as u16;
        instrs.push(Instr::Aload(slot));
        instrs.extend(unpack_operand(&mut *pool, ty)?);
        host_param_descriptors.push(crate::descriptor::host_primitive_descriptor(ty));
    }

    let host_return_descriptor = return_type.as_ref().map(crate::descriptor::host_primitive_descriptor).unwrap_or_else(|| VOID_DESCRIPTOR.to_string());
    let host_descriptor = method_descriptor(&host_param_descriptors, &host_return_descriptor);
    let invoke_idx = pool.add_methodref(&host_class, host_method, &host_descriptor)?;
    instrs.push(Instr::Invokestatic(invoke_idx));

    let epilogue = match return_type {
        Some(ty) => match bridge::wrapper_for_primitive(ty.name()) {
            Some(wrapper) => {
                let ctor_descriptor = wrapper_ctor_descriptor(wrapper);
                let mut repack = box_raw_instrs(&mut *pool, wrapper, ctor_descriptor)?;
                repack.push(Instr::AReturn);
                repack
            }
            None => vec![Instr::AReturn],
        },
        None => vec![Instr::Return],
    };
    instrs.extend(epilogue);

    let code = assemble(&instrs)?;
    let public_params: Vec<String> = parameters.iter().map(|(_, ty)| type_descriptor(ty)).collect();
    let public_return = return_type.as_ref().map(type_descriptor).unwrap_or_else(|| VOID_DESCRIPTOR.to_string());
    let public_descriptor = method_descriptor(&public_params, &public_return);

    Ok(MethodEntry {
        name_index: pool.add_utf8(mangled_name)?,
        descriptor_index: pool.add_utf8(&public_descriptor)?,
        is_static: false,
        is_varargs: false,
        max_locals: parameters.len() as u16 + 1,
        code,
    })
}

fn unpack_operand(pool: &mut ConstantPool, ty: &ResolvedType) -> CodegenResult<Vec<Instr>> {
    if bridge::wrapper_for_primitive(ty.name()).is_none() {
        return Ok(Vec::new());
    }
    let wrapper = bridge::wrapper_for_primitive(ty.name()).expect("checked above");
    let field = bridge::raw_field_for(wrapper).ok_or_else(|| CodegenError::UnsupportedBridgePrimitive(ty.name().to_string()))?;
    let descriptor = match field {
        f if f == bridge::RAW_INT_FIELD => "I",
        f if f == bridge::RAW_FLOAT_FIELD => "F",
        _ => "Ljava/lang/String;",
    };
    let owner = bridge::internal_class_name(wrapper);
    let idx = pool.add_fieldref(&owner, field, descriptor)?;
    Ok(vec![Instr::Getfield(idx)])
}

fn wrapper_ctor_descriptor(wrapper: &str) -> &'static str {
    match wrapper {
        bridge::REAL_WRAPPER => "(F)V",
        bridge::STRING_WRAPPER | bridge::CHARACTER_WRAPPER => "(Ljava/lang/String;)V",
        _ => "(I)V",
    }
}

fn box_raw_instrs(pool: &mut ConstantPool, wrapper: &str, ctor_descriptor: &str) -> CodegenResult<Vec<Instr>> {
    let internal = bridge::internal_class_name(wrapper);
    let class_idx = pool.add_class(&internal)?;
    let ctor_idx = pool.add_methodref(&internal, "<init>", ctor_descriptor)?;
    Ok(vec![Instr::New(class_idx), Instr::DupX1, Instr::Swap, Instr::Invokespecial(ctor_idx)])
}

/// Splits `"org.example.Helper.frobnicate"` into `("org/example/Helper",
/// "frobnicate")` (spec.md §4.8 "External alias"): everything up to the
/// last `.` is the host class, slash-joined; the remainder is the method.
fn split_external_alias(alias: &str) -> CodegenResult<(String, &str)> {
    let dot = alias.rfind('.').ok_or_else(|| CodegenError::MalformedExternalAlias(alias.to_string()))?;
    let (owner, method) = alias.split_at(dot);
    let method = &method[1..];
    if owner.is_empty() || method.is_empty() {
        return Err(CodegenError::MalformedExternalAlias(alias.to_string()));
    }
    Ok((owner.replace('.', "/"), method))
}

/// The JVM entry point (spec.md §6 "Main stub"), emitted only on the class
/// named by `program.main_class`: constructs one instance and dispatches
/// the configured main routine through the root, exactly like any other
/// routine call.
fn emit_main_stub(class: &TClass, program: &TProgram, pool: &mut ConstantPool, signatures: &SignatureTable) -> CodegenResult<MethodEntry> {
    let this_internal = bridge::internal_class_name(&class.name);
    let class_idx = pool.add_class(&this_internal)?;
    let ctor_idx = pool.add_methodref(&this_internal, "<init>", "()V")?;

    let main_routine = program.main_routine.as_deref().unwrap_or_default();
    let descriptor = signatures.get(main_routine).map(|sig| sig.descriptor()).unwrap_or_else(|| VOID_DESCRIPTOR.to_string());
    let general_internal = bridge::internal_class_name(GENERAL_CLASS);
    let routine_idx = pool.add_methodref(&general_internal, main_routine, &descriptor)?;

    let code = assemble(&[Instr::New(class_idx), Instr::Dup, Instr::Invokespecial(ctor_idx), Instr::Invokevirtual(routine_idx), Instr::Return])?;
    Ok(MethodEntry {
        name_index: pool.add_utf8("main")?,
        descriptor_index: pool.add_utf8("([Ljava/lang/String;)V")?,
        is_static: true,
        is_varargs: true,
        max_locals: 1,
        code,
    })
}
