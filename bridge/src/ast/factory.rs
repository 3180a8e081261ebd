use super::*;

/// Creation of expression nodes.
/// # Remarks
/// The caller is responsible for passing the resulting type of the node where
/// it is not implied by the operands. No semantic checks are performed.
pub trait NodeFactory {
    fn create_integer_literal(&mut self, value: u128, ty: TypeId) -> ExprId;

    fn create_character_literal(&mut self, value: u32, ty: TypeId) -> ExprId;

    fn create_floating_literal(&mut self, bits: u128, ty: TypeId) -> ExprId;

    fn create_bool_literal(&mut self, value: bool) -> ExprId;

    fn create_decl_ref(&mut self, decl: DeclId) -> ExprId;

    fn create_unary(&mut self, op: UnaryOp, operand: ExprId, ty: TypeId) -> ExprId;

    fn create_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: TypeId) -> ExprId;

    fn create_cast(&mut self, kind: CastKind, is_explicit: bool, operand: ExprId, ty: TypeId)
    -> ExprId;

    /// The type of the node is the type of the field.
    fn create_member(&mut self, base: ExprId, field: DeclId, is_arrow: bool) -> ExprId;

    fn create_array_subscript(&mut self, base: ExprId, index: ExprId, ty: TypeId) -> ExprId;

    fn create_paren(&mut self, inner: ExprId) -> ExprId;

    fn create_call(&mut self, callee: ExprId, args: Vec<ExprId>, ty: TypeId) -> ExprId;
}

impl NodeFactory for AstContext {
    fn create_integer_literal(&mut self, value: u128, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::IntegerLiteral(value), ty)
    }

    fn create_character_literal(&mut self, value: u32, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::CharacterLiteral(value), ty)
    }

    fn create_floating_literal(&mut self, bits: u128, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::FloatingLiteral(bits), ty)
    }

    fn create_bool_literal(&mut self, value: bool) -> ExprId {
        let ty = self.types().bool();
        self.add_expr(ExprKind::BoolLiteral(value), ty)
    }

    fn create_decl_ref(&mut self, decl: DeclId) -> ExprId {
        let ty = self.decl(decl).ty;
        self.add_expr(ExprKind::DeclRef(decl), ty)
    }

    fn create_unary(&mut self, op: UnaryOp, operand: ExprId, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::Unary { op, operand }, ty)
    }

    fn create_binary(&mut self, op: BinaryOp, lhs: ExprId, rhs: ExprId, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::Binary { op, lhs, rhs }, ty)
    }

    fn create_cast(
        &mut self,
        kind: CastKind,
        is_explicit: bool,
        operand: ExprId,
        ty: TypeId,
    ) -> ExprId {
        self.add_expr(
            ExprKind::Cast {
                kind,
                is_explicit,
                operand,
            },
            ty,
        )
    }

    fn create_member(&mut self, base: ExprId, field: DeclId, is_arrow: bool) -> ExprId {
        let ty = self.decl(field).ty;
        self.add_expr(
            ExprKind::Member {
                base,
                field,
                is_arrow,
            },
            ty,
        )
    }

    fn create_array_subscript(&mut self, base: ExprId, index: ExprId, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::ArraySubscript { base, index }, ty)
    }

    fn create_paren(&mut self, inner: ExprId) -> ExprId {
        let ty = self.type_of(inner);
        self.add_expr(ExprKind::Paren(inner), ty)
    }

    fn create_call(&mut self, callee: ExprId, args: Vec<ExprId>, ty: TypeId) -> ExprId {
        self.add_expr(ExprKind::Call { callee, args }, ty)
    }
}
