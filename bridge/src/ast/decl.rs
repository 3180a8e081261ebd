use derive_more as dm;

use super::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display)]
#[display("d{_0}")]
pub struct DeclId(pub(crate) u32);

impl DeclId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKind {
    Local,
    Global,
    /// A member of the given record type.
    Field { record: TypeId },
}

/// A named, typed declaration: a variable, a parameter, or a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decl {
    pub name: String,
    pub ty: TypeId,
    pub storage: StorageKind,
}
