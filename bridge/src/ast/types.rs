use std::{cmp::Ordering, collections::HashMap};

use derive_more as dm;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display)]
#[display("t{_0}")]
pub struct TypeId(pub(crate) u32);

/// Standard integer kinds, declared in the order of their conversion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, dm::Display)]
pub enum IntKind {
    #[display("char")]
    Char,
    #[display("short")]
    Short,
    #[display("int")]
    Int,
    #[display("long")]
    Long,
    #[display("long long")]
    LongLong,
    #[display("__int128")]
    Int128,
}

impl IntKind {
    pub const ALL: [IntKind; 6] = [
        IntKind::Char,
        IntKind::Short,
        IntKind::Int,
        IntKind::Long,
        IntKind::LongLong,
        IntKind::Int128,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, dm::Display)]
pub enum FloatKind {
    #[display("_Float16")]
    Half,
    #[display("float")]
    Float,
    #[display("double")]
    Double,
    #[display("long double")]
    LongDouble,
    #[display("_Float128")]
    Float128,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Int { kind: IntKind, is_signed: bool },
    Float(FloatKind),
    Pointer(TypeId),
    Array { element: TypeId, len: u64 },
    /// A struct-like aggregate. `bits` is its storage size.
    Record { name: String, bits: u64 },
}

/// The parts of the target description that affect type sizes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TargetInfo {
    pub pointer_width: u32,
    pub char_is_signed: bool,
    pub long_width: u32,
    pub long_double_width: u32,
}

impl Default for TargetInfo {
    fn default() -> Self {
        // x86_64, LP64
        Self {
            pointer_width: 64,
            char_is_signed: true,
            long_width: 64,
            long_double_width: 128,
        }
    }
}

/// Interns types so that structurally equal types share the same id.
#[derive(Debug, Clone)]
pub struct TypeTable {
    target: TargetInfo,
    types: Vec<Type>,
    ids: HashMap<Type, TypeId>,
}

impl TypeTable {
    pub fn new(target: TargetInfo) -> Self {
        let mut table = Self {
            target,
            types: Vec::new(),
            ids: HashMap::new(),
        };
        // Standard scalar types are always available for lookups by width.
        table.intern(Type::Void);
        table.intern(Type::Bool);
        for kind in IntKind::ALL {
            table.intern(Type::Int {
                kind,
                is_signed: true,
            });
            table.intern(Type::Int {
                kind,
                is_signed: false,
            });
        }
        for kind in [
            FloatKind::Half,
            FloatKind::Float,
            FloatKind::Double,
            FloatKind::LongDouble,
            FloatKind::Float128,
        ] {
            table.intern(Type::Float(kind));
        }
        table
    }

    pub fn target(&self) -> &TargetInfo {
        &self.target
    }

    pub fn intern(&mut self, ty: Type) -> TypeId {
        if let Some(id) = self.ids.get(&ty) {
            return *id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.ids.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> &Type {
        self.types
            .get(id.0 as usize)
            .unwrap_or_else(|| panic!("Unknown type id: {id}"))
    }

    fn existing(&self, ty: &Type) -> TypeId {
        *self
            .ids
            .get(ty)
            .unwrap_or_else(|| panic!("Standard type is expected to be interned: {ty:?}"))
    }
}

impl TypeTable {
    pub fn bool(&self) -> TypeId {
        self.existing(&Type::Bool)
    }

    pub fn int(&self, kind: IntKind, is_signed: bool) -> TypeId {
        self.existing(&Type::Int { kind, is_signed })
    }

    /// Plain `char`, whose signedness is target-dependent.
    pub fn char(&self) -> TypeId {
        self.int(IntKind::Char, self.target.char_is_signed)
    }

    pub fn unsigned_int(&self) -> TypeId {
        self.int(IntKind::Int, false)
    }

    pub fn float(&self, kind: FloatKind) -> TypeId {
        self.existing(&Type::Float(kind))
    }

    pub fn pointer_to(&mut self, pointee: TypeId) -> TypeId {
        self.intern(Type::Pointer(pointee))
    }

    pub fn array_of(&mut self, element: TypeId, len: u64) -> TypeId {
        self.intern(Type::Array { element, len })
    }

    pub fn record(&mut self, name: &str, bits: u64) -> TypeId {
        self.intern(Type::Record {
            name: name.to_owned(),
            bits,
        })
    }
}

impl TypeTable {
    /// The storage size of the type in bits.
    pub fn bit_width(&self, ty: TypeId) -> u64 {
        match self.get(ty) {
            Type::Void => 0,
            Type::Bool => 8,
            Type::Int { kind, .. } => self.int_width(*kind) as u64,
            Type::Float(kind) => self.float_width(*kind) as u64,
            Type::Pointer(..) => self.target.pointer_width as u64,
            Type::Array { element, len } => self.bit_width(*element) * len,
            Type::Record { bits, .. } => *bits,
        }
    }

    fn int_width(&self, kind: IntKind) -> u32 {
        match kind {
            IntKind::Char => 8,
            IntKind::Short => 16,
            IntKind::Int => 32,
            IntKind::Long => self.target.long_width,
            IntKind::LongLong => 64,
            IntKind::Int128 => 128,
        }
    }

    fn float_width(&self, kind: FloatKind) -> u32 {
        match kind {
            FloatKind::Half => 16,
            FloatKind::Float => 32,
            FloatKind::Double => 64,
            FloatKind::LongDouble => self.target.long_double_width,
            FloatKind::Float128 => 128,
        }
    }

    pub fn is_bool(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), Type::Bool)
    }

    /// Bool, character and integer types.
    pub fn is_integer(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), Type::Bool | Type::Int { .. })
    }

    pub fn is_signed_integer(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), Type::Int { is_signed: true, .. })
    }

    pub fn is_char(&self, ty: TypeId) -> bool {
        matches!(self.get(ty), Type::Int {
            kind: IntKind::Char,
            ..
        })
    }

    pub fn record_name(&self, ty: TypeId) -> Option<&str> {
        match self.get(ty) {
            Type::Record { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn pointee(&self, ty: TypeId) -> Option<TypeId> {
        match self.get(ty) {
            Type::Pointer(pointee) => Some(*pointee),
            _ => None,
        }
    }

    /// The pointer type an array of the given type decays to.
    pub fn array_decayed(&mut self, ty: TypeId) -> Option<TypeId> {
        match self.get(ty) {
            Type::Array { element, .. } => {
                let element = *element;
                Some(self.pointer_to(element))
            }
            _ => None,
        }
    }
}

impl TypeTable {
    /// The narrowest standard integer type with exactly `width` bits.
    pub fn int_type_for_bitwidth(&self, width: u32, is_signed: bool) -> Option<TypeId> {
        IntKind::ALL
            .into_iter()
            .find(|kind| self.int_width(*kind) == width)
            .map(|kind| self.int(kind, is_signed))
    }

    /// The standard real floating type with exactly `width` bits.
    pub fn real_type_for_bitwidth(&self, width: u32) -> Option<TypeId> {
        [
            FloatKind::Half,
            FloatKind::Float,
            FloatKind::Double,
            FloatKind::LongDouble,
            FloatKind::Float128,
        ]
        .into_iter()
        .find(|kind| self.float_width(*kind) == width)
        .map(|kind| self.float(kind))
    }

    fn integer_rank(&self, ty: TypeId) -> Option<u32> {
        match self.get(ty) {
            Type::Bool => Some(0),
            Type::Int { kind, .. } => Some(*kind as u32 + 1),
            _ => None,
        }
    }

    /// Orders two integer types by the integer conversion rank, taking the
    /// mixed signedness rules of the usual arithmetic conversions into account.
    /// Returns `None` if either of the types is not an integer type.
    pub fn integer_type_order(&self, lhs: TypeId, rhs: TypeId) -> Option<Ordering> {
        let lhs_rank = self.integer_rank(lhs)?;
        let rhs_rank = self.integer_rank(rhs)?;
        if lhs == rhs {
            return Some(Ordering::Equal);
        }

        let lhs_unsigned = !self.is_signed_integer(lhs);
        let rhs_unsigned = !self.is_signed_integer(rhs);
        let order = if lhs_unsigned == rhs_unsigned {
            lhs_rank.cmp(&rhs_rank)
        } else if lhs_unsigned {
            // The unsigned type wins unless the signed one is strictly larger.
            if lhs_rank >= rhs_rank {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        } else if rhs_rank >= lhs_rank {
            Ordering::Less
        } else {
            Ordering::Greater
        };
        Some(order)
    }
}
