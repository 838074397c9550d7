//! Statement and control-flow emission.
//!
//! Every construct allocates the labels it needs up front, then tests its
//! condition against zero. Bodies are arbitrary statements or expression
//! statements; any value a body leaves behind is popped to keep the stack
//! balanced across iterations.

use super::{CodeGen, CodeGenError};
use crate::ast::Node;
use std::fmt::Write as _;

impl CodeGen {
    pub(super) fn codegen_return(&mut self, value: &Node) -> Result<bool, CodeGenError> {
        self.codegen_node(value)?;
        writeln!(self.output, "  pop rax")?;
        writeln!(self.output, "  mov rsp, rbp")?;
        writeln!(self.output, "  pop rbp")?;
        writeln!(self.output, "  ret")?;
        Ok(false)
    }

    pub(super) fn codegen_if(
        &mut self,
        cond: &Node,
        then: &Node,
        els: Option<&Node>,
    ) -> Result<bool, CodeGenError> {
        let else_label = self.fresh_label();
        let end_label = self.fresh_label();

        self.codegen_node(cond)?;
        writeln!(self.output, "  pop rax")?;
        writeln!(self.output, "  cmp rax, 0")?;
        writeln!(self.output, "  je {}", else_label)?;
        self.codegen_dropping_value(then)?;
        writeln!(self.output, "  jmp {}", end_label)?;
        writeln!(self.output, "{}:", else_label)?;
        if let Some(els) = els {
            self.codegen_dropping_value(els)?;
        }
        writeln!(self.output, "{}:", end_label)?;
        Ok(false)
    }

    pub(super) fn codegen_while(&mut self, cond: &Node, body: &Node) -> Result<bool, CodeGenError> {
        let top_label = self.fresh_label();
        let bottom_label = self.fresh_label();

        writeln!(self.output, "{}:", top_label)?;
        self.codegen_node(cond)?;
        writeln!(self.output, "  pop rax")?;
        writeln!(self.output, "  cmp rax, 0")?;
        writeln!(self.output, "  je {}", bottom_label)?;
        self.codegen_dropping_value(body)?;
        writeln!(self.output, "  jmp {}", top_label)?;
        writeln!(self.output, "{}:", bottom_label)?;
        Ok(false)
    }

    pub(super) fn codegen_for(
        &mut self,
        init: Option<&Node>,
        cond: Option<&Node>,
        step: Option<&Node>,
        body: &Node,
    ) -> Result<bool, CodeGenError> {
        let top_label = self.fresh_label();
        let bottom_label = self.fresh_label();

        if let Some(init) = init {
            self.codegen_dropping_value(init)?;
        }
        writeln!(self.output, "{}:", top_label)?;
        match cond {
            Some(cond) => {
                self.codegen_node(cond)?;
            }
            // no condition reads as "always true"
            None => writeln!(self.output, "  push 1")?,
        }
        writeln!(self.output, "  pop rax")?;
        writeln!(self.output, "  cmp rax, 0")?;
        writeln!(self.output, "  je {}", bottom_label)?;
        self.codegen_dropping_value(body)?;
        if let Some(step) = step {
            self.codegen_dropping_value(step)?;
        }
        writeln!(self.output, "  jmp {}", top_label)?;
        writeln!(self.output, "{}:", bottom_label)?;
        Ok(false)
    }

    pub(super) fn codegen_block(&mut self, stmts: &[Node]) -> Result<bool, CodeGenError> {
        for stmt in stmts {
            self.codegen_dropping_value(stmt)?;
        }
        Ok(false)
    }

    /// Emit a node and discard its value, if it pushed one.
    fn codegen_dropping_value(&mut self, node: &Node) -> Result<(), CodeGenError> {
        if self.codegen_node(node)? {
            writeln!(self.output, "  pop rax")?;
        }
        Ok(())
    }
}
