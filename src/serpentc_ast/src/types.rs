use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identifier::Identifier;

/// A type declaration as written in the source. §3: "anchored-to-current"
/// and "anchored-to-feature" are resolved to a concrete type before IR is
/// built (the §4.2 anchored-type resolution pass); keeping them as a
/// distinct variant lets that pass and nothing downstream of it see them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDecl {
    Concrete {
        class_name: Identifier,
        #[serde(default)]
        actuals: Vec<TypeDecl>,
    },
    LikeCurrent,
    LikeFeature {
        feature_name: Identifier,
    },
}

impl TypeDecl {
    pub fn concrete(class_name: impl Into<String>) -> Self {
        TypeDecl::Concrete {
            class_name: Identifier::new(class_name),
            actuals: Vec::new(),
        }
    }

    pub fn is_anchored(&self) -> bool {
        !matches!(self, TypeDecl::Concrete { .. })
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDecl::Concrete {
                class_name,
                actuals,
            } => {
                write!(f, "{class_name}")?;
                if !actuals.is_empty() {
                    write!(f, "[")?;
                    for (i, a) in actuals.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{a}")?;
                    }
                    write!(f, "]")?;
                }
                Ok(())
            }
            TypeDecl::LikeCurrent => write!(f, "like Current"),
            TypeDecl::LikeFeature { feature_name } => write!(f, "like {feature_name}"),
        }
    }
}

/// A fully resolved type (spec.md §3): a base class name plus ordered
/// generic actuals, already substituted and anchor-free. Two `ResolvedType`
/// values are equal iff both components are structurally equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedType {
    pub class_name: Identifier,
    pub actuals: Vec<ResolvedType>,
}

pub const NONE_CLASS: &str = "NONE";
pub const ANY_CLASS: &str = "ANY";
pub const GENERAL_CLASS: &str = "GENERAL";
pub const INTEGER_CLASS: &str = "INTEGER";
pub const REAL_CLASS: &str = "REAL";
pub const BOOLEAN_CLASS: &str = "BOOLEAN";
pub const CHARACTER_CLASS: &str = "CHARACTER";
pub const STRING_CLASS: &str = "STRING";
pub const VOID_TYPE_NAME: &str = "<VOID>";

impl ResolvedType {
    pub fn simple(class_name: impl Into<String>) -> Self {
        Self {
            class_name: Identifier::new(class_name),
            actuals: Vec::new(),
        }
    }

    pub fn none() -> Self {
        Self::simple(NONE_CLASS)
    }

    pub fn void() -> Self {
        Self::simple(VOID_TYPE_NAME)
    }

    pub fn integer() -> Self {
        Self::simple(INTEGER_CLASS)
    }

    pub fn real() -> Self {
        Self::simple(REAL_CLASS)
    }

    pub fn boolean() -> Self {
        Self::simple(BOOLEAN_CLASS)
    }

    pub fn character() -> Self {
        Self::simple(CHARACTER_CLASS)
    }

    pub fn string() -> Self {
        Self::simple(STRING_CLASS)
    }

    pub fn is_none(&self) -> bool {
        self.class_name.as_str() == NONE_CLASS
    }

    pub fn is_void(&self) -> bool {
        self.class_name.as_str() == VOID_TYPE_NAME
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self.class_name.as_str(), INTEGER_CLASS | REAL_CLASS)
    }

    pub fn name(&self) -> &str {
        self.class_name.as_str()
    }

    /// The name this instantiation is emitted under (spec.md §9
    /// "Generics": "Code generation ... emits a separate class file per
    /// unique instantiation"). Non-generic types emit under their bare
    /// class name; a generic instantiation mangles its actuals in so
    /// `LIST[INTEGER]` and `LIST[STRING]` become distinct classes.
    pub fn instantiation_name(&self) -> String {
        if self.actuals.is_empty() {
            return self.class_name.to_string();
        }
        let mut out = self.class_name.to_string();
        for actual in &self.actuals {
            out.push_str("__");
            out.push_str(&actual.instantiation_name());
        }
        out
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name)?;
        if !self.actuals.is_empty() {
            write!(f, "[")?;
            for (i, a) in self.actuals.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{a}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}
