use serde::{Deserialize, Serialize};

use crate::feature::Feature;
use crate::identifier::Identifier;
use crate::types::TypeDecl;
use serpentc_diagnostics::SourceLocation;

/// Which classes may call a feature. `All` corresponds to no explicit
/// client clause (exported to every class); `Only` lists the classes
/// named as clients (spec.md §3 "feature clauses grouped by client
/// visibility").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClientSpec {
    All,
    Only { clients: Vec<Identifier> },
}

impl ClientSpec {
    pub fn permits(&self, client_class: &str) -> bool {
        match self {
            ClientSpec::All => true,
            ClientSpec::Only { clients } => clients.iter().any(|c| c.as_str() == client_class),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureClause {
    pub clients: ClientSpec,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameClause {
    pub from: Identifier,
    pub to: Identifier,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportClause {
    pub feature_names: Vec<Identifier>,
    pub clients: ClientSpec,
}

/// One `inherit` entry: a parent type plus the rename/redefine/undefine/
/// select/export adaptation clauses applied to features arriving through
/// that parent (spec.md §3 "inheritance list").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InheritanceClause {
    pub parent: TypeDecl,
    #[serde(default)]
    pub rename: Vec<RenameClause>,
    #[serde(default)]
    pub redefine: Vec<Identifier>,
    #[serde(default)]
    pub undefine: Vec<Identifier>,
    #[serde(default)]
    pub select: Vec<Identifier>,
    #[serde(default)]
    pub export: Vec<ExportClause>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceClass {
    pub name: Identifier,
    #[serde(default)]
    pub generic_formals: Vec<Identifier>,
    #[serde(default)]
    pub inherits: Vec<InheritanceClause>,
    /// Exported constructor names (spec.md §3 "creation clause").
    #[serde(default)]
    pub creation: Vec<Identifier>,
    #[serde(default)]
    pub feature_clauses: Vec<FeatureClause>,
    /// True when this source class is the synthetic root's designated
    /// ancestor-of-last-resort (`GENERAL` in the reference runtime, see
    /// spec.md §4.8). At most one class in a program may set this; the
    /// system examiner (spec.md §2 component #2) requires exactly one.
    #[serde(default)]
    pub is_general: bool,
    #[serde(default)]
    pub location: Option<SourceLocation>,
}

impl SourceClass {
    pub fn all_features(&self) -> impl Iterator<Item = (&ClientSpec, &Feature)> {
        self.feature_clauses
            .iter()
            .flat_map(|clause| clause.features.iter().map(move |f| (&clause.clients, f)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Program {
    pub classes: Vec<SourceClass>,
    /// The entry class/routine named on the CLI or in `serpent.toml`
    /// (spec.md §4.4 "Main program entry point").
    pub main_class: Option<Identifier>,
    pub main_routine: Option<Identifier>,
}

impl Program {
    pub fn find_class(&self, name: &str) -> Option<&SourceClass> {
        self.classes.iter().find(|c| c.name.as_str() == name)
    }
}
