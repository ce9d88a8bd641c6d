use serde::{Deserialize, Serialize};
use std::fmt;

/// The pipeline phase that raised a diagnostic, per spec.md §7's
/// propagation policy: each phase reports all of its errors before the
/// next phase is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    System,
    Inheritance,
    Naming,
    Type,
    Emission,
    Io,
    Internal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Parse => "parse",
            Phase::System => "system",
            Phase::Inheritance => "inheritance",
            Phase::Naming => "naming",
            Phase::Type => "type",
            Phase::Emission => "emission",
            Phase::Io => "io",
            Phase::Internal => "internal",
        };
        write!(f, "{s}")
    }
}

/// Diagnostic codes grouped by the §7 error taxonomy. Bands leave room to
/// grow within a category without renumbering siblings, the way
/// `bsharp_analysis::DiagnosticCode` bands its `BSE0xxxx`/`BSW0xxxx` codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // System errors (duplicate class, missing root, cycle) — SE1xxx
    SE1001DuplicateClassName,
    SE1002MissingRootClass,
    SE1003InheritanceCycle,

    // Inheritance errors — IE2xxx
    IE2001DuplicateFeatureName,
    IE2002UnknownRenameTarget,
    IE2003RedefineWithoutInherited,
    IE2004AmbiguousFeatureNoSelect,
    IE2005SelectOfNonInheritedName,
    IE2006UndefineWithoutInherited,

    // Naming errors — NE3xxx
    NE3001LocalCollidesWithFeature,
    NE3002UnknownClientClass,
    NE3003AmbiguousPrecursor,
    NE3004MissingPrecursorTarget,
    NE3005PrecursorOutsideRedefine,

    // Type errors — TE4xxx
    TE4001UnknownType,
    TE4002ArityMismatch,
    TE4003ArgumentNotConformant,
    TE4004NonBooleanGuard,
    TE4005AssignmentToNonLvalue,
    TE4006ResultInProcedure,
    TE4007AnchoredTypeCycle,
    TE4008UnknownFeature,
    TE4009WrongArgumentCount,
    TE4010FeatureNotCallableByClient,
    TE4011DeferredClassCreation,
    TE4012UnknownConstructor,

    // Emission errors — EE5xxx
    EE5001MalformedExternalAlias,
    EE5002UnsupportedBridgePrimitive,
    EE5003PoolIndexOverflow,
    EE5004BranchOffsetOutOfRange,

    // I/O errors — IOE6xxx
    IOE6001UnreadableSource,
    IOE6002UnwritableOutput,
    IOE6003ParserInvocationFailed,

    // Warnings — W9xxx (do not abort the pipeline)
    W9001UnreachableElseifArm,
    W9002RedundantParentheses,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
