use thiserror::Error;

/// Internal invariants the emitter assumes the type checker already
/// guaranteed (spec.md §5: "a malformed AST that fails a structural
/// assertion" aborts immediately as an internal error, rather than being
/// collected). Recoverable, per-class emission problems go through
/// `serpentc_diagnostics::DiagnosticCollection` (Phase::Emission) instead
/// and do not use this type — see `serpentc_codegen::emit_program`.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("branch target label {0} was never placed")]
    UnresolvedLabel(u32),
    #[error("branch offset {0} does not fit in a signed 16-bit field")]
    BranchOffsetOutOfRange(i64),
    #[error("constant pool index {0} exceeds the 16-bit pool index range")]
    PoolIndexOverflow(usize),
    #[error("malformed external alias `{0}`: expected at least one `.` separating owner from method")]
    MalformedExternalAlias(String),
    #[error("no descriptor is registered for mangled name `{0}`")]
    MissingDescriptor(String),
    #[error("`{0}` cannot be unwrapped to a host-runtime primitive for a bridge call")]
    UnsupportedBridgePrimitive(String),
}

pub type CodegenResult<T> = Result<T, CodegenError>;
