//! Bottom-up type annotation.
//!
//! A post-order walk that fills in the `ty` field of every expression
//! node that does not already carry one. Variable references and calls
//! are typed by the parser at construction; this pass derives the rest.
//! It also runs on sub-expressions during parsing, where operand types
//! decide pointer scaling and `sizeof` folding, so it must be idempotent.

use crate::ast::{Item, Node, NodeKind, Program};
use crate::types::Type;

/// Annotate every function body and stray top-level statement.
pub fn annotate_program(program: &mut Program) {
    for func in &mut program.funcs {
        for stmt in &mut func.body {
            annotate(stmt);
        }
    }
    for item in &mut program.items {
        if let Item::Stmt(node) = item {
            annotate(node);
        }
    }
}

/// Annotate one subtree.
pub fn annotate(node: &mut Node) {
    match &mut node.kind {
        NodeKind::Binary { lhs, rhs, .. }
        | NodeKind::Assign { lhs, rhs }
        | NodeKind::Comma { lhs, rhs } => {
            annotate(lhs);
            annotate(rhs);
        }
        NodeKind::AddrOf(inner) | NodeKind::Deref(inner) | NodeKind::Return(inner) => {
            annotate(inner);
        }
        NodeKind::If { cond, then, els } => {
            annotate(cond);
            annotate(then);
            if let Some(els) = els {
                annotate(els);
            }
        }
        NodeKind::While { cond, body } => {
            annotate(cond);
            annotate(body);
        }
        NodeKind::For {
            init,
            cond,
            step,
            body,
        } => {
            for part in [init, cond, step].into_iter().flatten() {
                annotate(part);
            }
            annotate(body);
        }
        NodeKind::Block(stmts) => {
            for stmt in stmts {
                annotate(stmt);
            }
        }
        NodeKind::Call { args, .. } => {
            for arg in args {
                annotate(arg);
            }
        }
        NodeKind::Num(_)
        | NodeKind::LocalVar { .. }
        | NodeKind::GlobalVar { .. }
        | NodeKind::VarDecl => {}
    }

    if node.ty.is_some() {
        return;
    }

    node.ty = match &node.kind {
        NodeKind::Num(_) => Some(Type::Int),
        // Comparisons always yield int, never the operand type
        NodeKind::Binary { op, lhs, .. } => {
            if op.is_comparison() {
                Some(Type::Int)
            } else {
                lhs.ty.clone()
            }
        }
        NodeKind::Assign { lhs, .. } => lhs.ty.clone(),
        NodeKind::AddrOf(inner) => inner.ty.clone().map(Type::pointer_to),
        // Dereferencing a non-pointer falls back to int; this keeps the
        // idiom `*(&a + k)` working when `a` is a scalar
        NodeKind::Deref(inner) => match inner.ty.as_ref().and_then(Type::pointee) {
            Some(pointee) => Some(pointee.clone()),
            None => Some(Type::Int),
        },
        NodeKind::Comma { rhs, .. } => rhs.ty.clone(),
        _ => None,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOp;

    fn local(ty: Type) -> Node {
        Node::typed(
            NodeKind::LocalVar {
                name: "x".to_string(),
                offset: 8,
            },
            ty,
        )
    }

    #[test]
    fn test_literal_is_int() {
        let mut node = Node::num(7);
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::Int));
    }

    #[test]
    fn test_arithmetic_takes_left_operand_type() {
        let ptr = Type::pointer_to(Type::Int);
        let mut node = Node::binary(BinaryOp::Add, local(ptr.clone()), Node::num(1));
        annotate(&mut node);
        assert_eq!(node.ty, Some(ptr));
    }

    #[test]
    fn test_comparison_is_always_int() {
        let ptr = Type::pointer_to(Type::Int);
        let mut node = Node::binary(BinaryOp::Lt, local(ptr), Node::num(0));
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::Int));
    }

    #[test]
    fn test_addr_of_wraps_pointer() {
        let mut node = Node::new(NodeKind::AddrOf(Box::new(local(Type::Int))));
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::pointer_to(Type::Int)));
    }

    #[test]
    fn test_deref_unwraps_pointer() {
        let ptr = Type::pointer_to(Type::pointer_to(Type::Int));
        let mut node = Node::new(NodeKind::Deref(Box::new(local(ptr))));
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::pointer_to(Type::Int)));
    }

    #[test]
    fn test_deref_of_non_pointer_falls_back_to_int() {
        // supports *(&a + k) for scalar a, where the operand types as int
        let mut node = Node::new(NodeKind::Deref(Box::new(local(Type::Int))));
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::Int));
    }

    #[test]
    fn test_preset_type_is_kept() {
        let mut node = Node::typed(NodeKind::Num(8), Type::Int);
        annotate(&mut node);
        assert_eq!(node.ty, Some(Type::Int));
    }

    #[test]
    fn test_array_variable_does_not_decay() {
        let arr = Type::array_of(Type::Int, 3);
        let mut node = local(arr.clone());
        annotate(&mut node);
        assert_eq!(node.ty, Some(arr));
    }
}
