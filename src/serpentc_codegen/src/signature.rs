//! The global call-site descriptor table (spec.md §4.6 "Descriptor
//! correctness"). Every ordinary call dispatches virtually through the
//! synthesized root class (spec.md §4.5), so the descriptor baked into a
//! call site's `invokevirtual` must match the callee's *declared*
//! parameter/return types, never the actual argument expressions' types at
//! that call site — two call sites passing differently-typed-but-conforming
//! arguments still have to agree on one descriptor for the shared root
//! method slot to resolve.

use std::collections::HashMap;

use serpentc_ast::ResolvedType;
use serpentc_ir::{TMethod, TProgram};

use crate::descriptor::{method_descriptor, type_descriptor, VOID_DESCRIPTOR};

/// A method's declared shape, independent of any particular call site.
#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub param_types: Vec<ResolvedType>,
    pub return_type: Option<ResolvedType>,
}

impl MethodSignature {
    pub fn descriptor(&self) -> String {
        let params: Vec<String> = self.param_types.iter().map(type_descriptor).collect();
        let ret = self.return_type.as_ref().map(type_descriptor).unwrap_or_else(|| VOID_DESCRIPTOR.to_string());
        method_descriptor(&params, &ret)
    }
}

/// Maps every mangled method name in the program to its declared signature.
/// The root class already carries one de-duplicated copy of every method
/// (spec.md §4.5), so scanning the whole program (rather than just the
/// root) only matters as a defensive fallback.
pub struct SignatureTable(HashMap<String, MethodSignature>);

impl SignatureTable {
    pub fn build(program: &TProgram) -> Self {
        let mut map = HashMap::new();
        for class in &program.classes {
            for method in &class.methods {
                map.entry(method.mangled_name().to_string()).or_insert_with(|| method_signature(method));
            }
        }
        Self(map)
    }

    pub fn get(&self, mangled_name: &str) -> Option<&MethodSignature> {
        self.0.get(mangled_name)
    }
}

fn method_signature(method: &TMethod) -> MethodSignature {
    MethodSignature {
        param_types: method.parameters().iter().map(|(_, ty)| ty.clone()).collect(),
        return_type: method.return_type().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serpentc_ir::{TClass, TField};

    fn make_program() -> TProgram {
        TProgram {
            classes: vec![TClass {
                name: "POINT".to_string(),
                super_class: "GENERAL".to_string(),
                fields: vec![TField { mangled_name: "POINT_x".to_string(), ty: ResolvedType::integer() }],
                methods: vec![TMethod::UserDefined {
                    mangled_name: "POINT_move".to_string(),
                    parameters: vec![("local_dx".to_string(), ResolvedType::integer())],
                    return_type: None,
                    locals: vec![],
                    body: vec![],
                    is_constructor: false,
                }],
                is_root: false,
            }],
            main_class: None,
            main_routine: None,
        }
    }

    #[test]
    fn descriptor_reflects_declared_parameter_and_return_types() {
        let program = make_program();
        let table = SignatureTable::build(&program);
        let sig = table.get("POINT_move").unwrap();
        assert_eq!(sig.descriptor(), "(Lorg/eiffel/base/INTEGER;)V");
    }

    #[test]
    fn unknown_mangled_names_are_absent() {
        let program = make_program();
        let table = SignatureTable::build(&program);
        assert!(table.get("POINT_missing").is_none());
    }
}
