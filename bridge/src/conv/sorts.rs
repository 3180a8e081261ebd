use common::{log_fatal, z3::AstNodeSort};

use crate::ast::{Type, TypeId, TypeTable};

const TAG: &str = "sorts";

/// The mapping between source types and solver sorts.
pub trait SortMapping {
    fn sort_of(&self, ty: TypeId) -> AstNodeSort;

    /// The source type that best represents values of the sort.
    /// # Remarks
    /// `is_signed` is only relevant to bit vector sorts. Boolean sorts map to
    /// `unsigned int`, since reconstructed truth values are 0/1 literals.
    fn best_fit_type(&self, sort: &AstNodeSort, is_signed: bool) -> TypeId;
}

impl SortMapping for TypeTable {
    fn sort_of(&self, ty: TypeId) -> AstNodeSort {
        match self.get(ty) {
            Type::Bool => AstNodeSort::Bool,
            Type::Record { name, .. } => AstNodeSort::Uninterpreted { name: name.clone() },
            Type::Float(..) => {
                let width = self.bit_width(ty);
                let (ebits, sbits) = float_semantics(width).unwrap_or_else(|| {
                    log_fatal!(
                        target: TAG,
                        "Unsupported floating point width: {} for {}",
                        width,
                        crate::ast::TypeDisplay::new(self, ty),
                    )
                });
                AstNodeSort::Float { ebits, sbits }
            }
            Type::Void => log_fatal!(target: TAG, "Void type has no sort."),
            _ => {
                let size = self.bit_width(ty);
                if size == 0 || size > u32::MAX as u64 {
                    log_fatal!(
                        target: TAG,
                        "Invalid bit vector width: {} for {}",
                        size,
                        crate::ast::TypeDisplay::new(self, ty),
                    )
                }
                AstNodeSort::BitVector { size: size as u32 }
            }
        }
    }

    fn best_fit_type(&self, sort: &AstNodeSort, is_signed: bool) -> TypeId {
        match sort {
            AstNodeSort::Bool => self.unsigned_int(),
            AstNodeSort::BitVector { size } => self
                .int_type_for_bitwidth(*size, is_signed)
                .unwrap_or_else(|| {
                    log_fatal!(target: TAG, "No integer type with width: {}", size)
                }),
            AstNodeSort::Float { .. } => self
                .real_type_for_bitwidth(sort.size())
                .filter(|ty| float_semantics(self.bit_width(*ty)).is_some())
                .unwrap_or_else(|| log_fatal!(target: TAG, "No real type for sort: {}", sort)),
            AstNodeSort::Uninterpreted { .. } => {
                log_fatal!(target: TAG, "Uninterpreted sorts have no literal type: {}", sort)
            }
        }
    }
}

/// The bit width of values of the sort.
pub fn size_of_sort(sort: &AstNodeSort) -> u32 {
    sort.size()
}

/// Exponent and significand widths of the IEEE-754 binary interchange format
/// of the given total width.
fn float_semantics(width: u64) -> Option<(u32, u32)> {
    match width {
        16 => Some((5, 11)),
        32 => Some((8, 24)),
        64 => Some((11, 53)),
        128 => Some((15, 113)),
        _ => None,
    }
}
