//! Expression emission and address-form evaluation.
//!
//! `codegen_node` is the single dispatch point for every node; statement
//! forms are forwarded to `control_flow.rs`. The push/pop contract:
//! expression forms return `true` having pushed exactly one 8-byte value,
//! statement forms return `false` having pushed nothing.

use super::{ARG_REGS, CodeGen, CodeGenError};
use crate::ast::{BinaryOp, Node, NodeKind};
use crate::types::Type;
use std::fmt::Write as _;

impl CodeGen {
    /// Emit code for one node. Returns whether a value was pushed.
    pub(super) fn codegen_node(&mut self, node: &Node) -> Result<bool, CodeGenError> {
        match &node.kind {
            NodeKind::Num(value) => {
                writeln!(self.output, "  push {}", value)?;
                Ok(true)
            }
            NodeKind::LocalVar { .. } | NodeKind::GlobalVar { .. } => {
                self.codegen_addr(node)?;
                let ty = node
                    .ty
                    .as_ref()
                    .ok_or_else(|| CodeGenError::Untyped(node.kind.form_name()))?;
                // an array variable evaluates to its address, not a load
                if !matches!(ty, Type::Array(..)) {
                    self.load()?;
                }
                Ok(true)
            }
            NodeKind::Assign { lhs, rhs } => {
                self.codegen_addr(lhs)?;
                self.codegen_node(rhs)?;
                writeln!(self.output, "  pop rdi")?;
                writeln!(self.output, "  pop rax")?;
                writeln!(self.output, "  mov [rax], rdi")?;
                writeln!(self.output, "  push rdi")?;
                Ok(true)
            }
            NodeKind::AddrOf(inner) => {
                self.codegen_addr(inner)?;
                Ok(true)
            }
            NodeKind::Deref(inner) => {
                self.codegen_node(inner)?;
                self.load()?;
                Ok(true)
            }
            NodeKind::Comma { lhs, rhs } => {
                if self.codegen_node(lhs)? {
                    writeln!(self.output, "  pop rax")?;
                }
                self.codegen_node(rhs)
            }
            NodeKind::Binary { op, lhs, rhs } => {
                self.codegen_binary(*op, lhs, rhs)?;
                Ok(true)
            }
            NodeKind::Call { name, args, .. } => {
                // args are stored in reverse source order; materializing
                // them as stored leaves the first argument on top
                for arg in args {
                    self.codegen_node(arg)?;
                }
                for reg in ARG_REGS.iter().take(args.len()) {
                    writeln!(self.output, "  pop {}", reg)?;
                }
                // arguments beyond six stay on the stack; the callee reads
                // them at negative frame offsets
                // TODO: align rsp to 16 before the call once libc calls matter
                writeln!(self.output, "  call {}", name)?;
                writeln!(self.output, "  push rax")?;
                Ok(true)
            }
            NodeKind::VarDecl => Ok(false),
            NodeKind::Return(value) => self.codegen_return(value),
            NodeKind::If { cond, then, els } => self.codegen_if(cond, then, els.as_deref()),
            NodeKind::While { cond, body } => self.codegen_while(cond, body),
            NodeKind::For {
                init,
                cond,
                step,
                body,
            } => self.codegen_for(init.as_deref(), cond.as_deref(), step.as_deref(), body),
            NodeKind::Block(stmts) => self.codegen_block(stmts),
        }
    }

    /// Push the address of an addressable form.
    pub(super) fn codegen_addr(&mut self, node: &Node) -> Result<(), CodeGenError> {
        match &node.kind {
            NodeKind::LocalVar { offset, .. } => {
                // negative offsets address caller-pushed arguments
                writeln!(self.output, "  mov rax, rbp")?;
                writeln!(self.output, "  sub rax, {}", offset)?;
                writeln!(self.output, "  push rax")?;
                Ok(())
            }
            NodeKind::GlobalVar { name } => {
                writeln!(self.output, "  lea rax, {}[rip]", name)?;
                writeln!(self.output, "  push rax")?;
                Ok(())
            }
            // the value of the operand is the address
            NodeKind::Deref(inner) => {
                self.codegen_node(inner)?;
                Ok(())
            }
            other => Err(CodeGenError::NotAddressable(other.form_name())),
        }
    }

    /// Replace the address on top of the stack with the value it points at.
    fn load(&mut self) -> Result<(), CodeGenError> {
        writeln!(self.output, "  pop rax")?;
        writeln!(self.output, "  mov rax, [rax]")?;
        writeln!(self.output, "  push rax")?;
        Ok(())
    }

    fn codegen_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Node,
        rhs: &Node,
    ) -> Result<(), CodeGenError> {
        self.codegen_node(lhs)?;
        self.codegen_node(rhs)?;
        writeln!(self.output, "  pop rdi")?;
        writeln!(self.output, "  pop rax")?;
        match op {
            BinaryOp::Add => writeln!(self.output, "  add rax, rdi")?,
            BinaryOp::Sub => writeln!(self.output, "  sub rax, rdi")?,
            BinaryOp::Mul => writeln!(self.output, "  imul rax, rdi")?,
            BinaryOp::Div => {
                writeln!(self.output, "  cqo")?;
                writeln!(self.output, "  idiv rdi")?;
            }
            BinaryOp::Mod => {
                writeln!(self.output, "  cqo")?;
                writeln!(self.output, "  idiv rdi")?;
                writeln!(self.output, "  mov rax, rdx")?;
            }
            BinaryOp::Eq => self.compare("sete")?,
            BinaryOp::Neq => self.compare("setne")?,
            BinaryOp::Lt => self.compare("setl")?,
            BinaryOp::Ngt => self.compare("setle")?,
        }
        writeln!(self.output, "  push rax")?;
        Ok(())
    }

    /// `cmp` then normalize the flag into 0/1 across all 64 bits.
    fn compare(&mut self, setcc: &str) -> Result<(), CodeGenError> {
        writeln!(self.output, "  cmp rax, rdi")?;
        writeln!(self.output, "  {} al", setcc)?;
        writeln!(self.output, "  movzb rax, al")?;
        Ok(())
    }
}
