//! x86-64 Code Generation
//!
//! Walks the typed AST and emits Intel-syntax assembly (System V AMD64),
//! modeling every intermediate value through a push/pop discipline on the
//! machine stack: each expression leaves exactly one 8-byte value on top,
//! each statement leaves none. [`CodeGen::codegen_node`] reports whether
//! it pushed, so callers can drop surplus values with a `pop`.
//!
//! # Module Structure
//!
//! - `mod.rs`: `CodeGen` state, program and function emission, `.data`
//! - `expr.rs`: expression forms and address-form evaluation
//! - `control_flow.rs`: if/while/for/block/return
//! - `error.rs`: error types

mod control_flow;
mod error;
mod expr;

pub use error::CodeGenError;

use crate::ast::{FuncDef, Item, Program};
use std::fmt::Write as _;

/// Registers carrying the first six integer arguments, in ABI order.
pub(crate) const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

pub struct CodeGen {
    output: String,
    /// Monotonic counter behind `.L`-prefixed branch labels
    label_counter: usize,
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGen {
    pub fn new() -> Self {
        CodeGen {
            output: String::new(),
            label_counter: 0,
        }
    }

    /// Allocate the next branch label: `.L` plus a zero-padded counter.
    fn fresh_label(&mut self) -> String {
        let label = format!(".L{:05}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Generate assembly for an entire program.
    ///
    /// Function bodies come out in source order; stray top-level
    /// statements are emitted between them the same way the per-function
    /// driver emits body statements. Globals land in a trailing `.data`
    /// section, zero-initialized, in declaration order.
    pub fn codegen_program(&mut self, program: &Program) -> Result<String, CodeGenError> {
        writeln!(self.output, ".intel_syntax noprefix")?;
        writeln!(self.output, ".globl main")?;

        for item in &program.items {
            match item {
                Item::Func(index) => self.codegen_func(&program.funcs[*index])?,
                Item::Stmt(node) => {
                    if self.codegen_node(node)? {
                        writeln!(self.output, "  pop rax")?;
                    }
                }
            }
        }

        if !program.globals.is_empty() {
            writeln!(self.output)?;
            writeln!(self.output, ".data")?;
            for global in &program.globals {
                writeln!(self.output, "{}:", global.name)?;
                writeln!(self.output, "  .zero {}", global.slot_size())?;
            }
        }

        Ok(std::mem::take(&mut self.output))
    }

    fn codegen_func(&mut self, func: &FuncDef) -> Result<(), CodeGenError> {
        writeln!(self.output, "{}:", func.name)?;

        // prologue: fresh frame, then spill register arguments into their
        // slots so every parameter is addressable like a local
        writeln!(self.output, "  push rbp")?;
        writeln!(self.output, "  mov rbp, rsp")?;
        if func.frame_size > 0 {
            writeln!(self.output, "  sub rsp, {}", func.frame_size)?;
        }
        for (index, reg) in ARG_REGS.iter().enumerate().take(func.param_count) {
            writeln!(self.output, "  mov [rbp-{}], {}", 8 * (index + 1), reg)?;
        }

        for stmt in &func.body {
            if self.codegen_node(stmt)? {
                writeln!(self.output, "  pop rax")?;
            }
        }

        // epilogue for falling off the end; explicit returns emit their own
        writeln!(self.output, "  mov rsp, rbp")?;
        writeln!(self.output, "  pop rbp")?;
        writeln!(self.output, "  ret")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::typing;

    fn compile(source: &str) -> String {
        let mut parser = Parser::new(source).expect("tokenize");
        let mut program = parser.parse().expect("parse");
        typing::annotate_program(&mut program);
        CodeGen::new().codegen_program(&program).expect("codegen")
    }

    /// Label definitions only (lines like `.L00003:`), not jump operands.
    fn label_definitions(asm: &str) -> usize {
        asm.lines()
            .filter(|line| line.starts_with(".L") && line.ends_with(':'))
            .count()
    }

    #[test]
    fn test_header_lines() {
        let asm = compile("int main(){return 0;}");
        let mut lines = asm.lines();
        assert_eq!(lines.next(), Some(".intel_syntax noprefix"));
        assert_eq!(lines.next(), Some(".globl main"));
        assert_eq!(lines.next(), Some("main:"));
    }

    #[test]
    fn test_return_emits_epilogue() {
        let asm = compile("int main(){return 0;}");
        assert!(asm.contains("  push 0\n  pop rax\n  mov rsp, rbp\n  pop rbp\n  ret\n"));
    }

    #[test]
    fn test_frame_reserved_for_locals() {
        let asm = compile("int main(){int a; int b; int c; a=1; b=2; c=3; return c;}");
        assert!(asm.contains("  sub rsp, 32\n"), "{}", asm);
    }

    #[test]
    fn test_no_frame_without_locals() {
        let asm = compile("int main(){return 0;}");
        assert!(!asm.contains("sub rsp"), "{}", asm);
    }

    #[test]
    fn test_param_registers_spilled_in_order() {
        let asm = compile("int f(int a,int b,int c){return b;} int main(){return f(1,2,3);}");
        assert!(asm.contains("  mov [rbp-8], rdi\n  mov [rbp-16], rsi\n  mov [rbp-24], rdx\n"));
    }

    #[test]
    fn test_only_six_params_spilled() {
        let asm = compile(
            "int f(int a,int b,int c,int d,int e,int g,int h){return h;} \
             int main(){return f(1,2,3,4,5,6,7);}",
        );
        assert!(asm.contains("  mov [rbp-48], r9\n"));
        assert!(!asm.contains("[rbp-56]"), "{}", asm);
        // the seventh parameter is read from above the saved base pointer
        assert!(asm.contains("  sub rax, -16\n"), "{}", asm);
    }

    #[test]
    fn test_two_labels_per_construct() {
        let asm = compile(
            "int main(){int i; i=0; if(i) i=1; else i=2; \
             while(i<10) i=i+1; for(i=0; i<3; i=i+1) i=i; return i;}",
        );
        assert_eq!(label_definitions(&asm), 6);
    }

    #[test]
    fn test_if_without_else_still_two_labels() {
        let asm = compile("int main(){if(1) return 2; return 3;}");
        assert_eq!(label_definitions(&asm), 2);
    }

    #[test]
    fn test_labels_zero_padded() {
        let asm = compile("int main(){if(1) return 2; return 3;}");
        assert!(asm.contains(".L00000"), "{}", asm);
        assert!(asm.contains(".L00001"), "{}", asm);
    }

    #[test]
    fn test_globals_in_data_section() {
        let asm = compile("int g; int a[5]; int main(){return 0;}");
        let data_pos = asm.find(".data").expect("data section");
        let g_pos = asm.find("g:").expect("g label");
        let a_pos = asm.find("a:").expect("a label");
        assert!(data_pos < g_pos && g_pos < a_pos);
        assert!(asm.contains("g:\n  .zero 8\n"));
        assert!(asm.contains("a:\n  .zero 40\n"));
    }

    #[test]
    fn test_no_data_section_without_globals() {
        let asm = compile("int main(){return 0;}");
        assert!(!asm.contains(".data"));
    }

    #[test]
    fn test_global_access_is_rip_relative() {
        let asm = compile("int g; int main(){g=7; return g;}");
        assert!(asm.contains("  lea rax, g[rip]\n"), "{}", asm);
    }

    #[test]
    fn test_call_pops_args_into_registers() {
        let asm = compile("int f(int a,int b){return a-b;} int main(){return f(7,3);}");
        // arguments materialize in reverse, so the first pop gets arg 1
        assert!(
            asm.contains("  push 3\n  push 7\n  pop rdi\n  pop rsi\n  call f\n  push rax\n"),
            "{}",
            asm
        );
    }

    #[test]
    fn test_comparison_normalizes_to_bool() {
        let asm = compile("int main(){return 2<3;}");
        assert!(asm.contains("  cmp rax, rdi\n  setl al\n  movzb rax, al\n"));
    }

    #[test]
    fn test_division_sign_extends() {
        let asm = compile("int main(){return 7/2;}");
        assert!(asm.contains("  cqo\n  idiv rdi\n"));
    }

    #[test]
    fn test_modulo_takes_rdx() {
        let asm = compile("int main(){return 7%3;}");
        assert!(asm.contains("  cqo\n  idiv rdi\n  mov rax, rdx\n"));
    }

    #[test]
    fn test_sizeof_is_a_constant_push() {
        let asm = compile("int main(){int *p; return sizeof(p);}");
        assert!(asm.contains("  push 8\n"));
        // the operand itself is never evaluated
        assert!(!asm.contains("mov rax, [rax]"), "{}", asm);
    }

    #[test]
    fn test_array_variable_evaluates_to_address() {
        let asm = compile("int main(){int a[2]; int *p; p=a; return 0;}");
        // assigning the array to a pointer must not load through it:
        // exactly one load (none) before the store of p
        let store_pos = asm.find("  mov [rax], rdi").expect("store");
        let before = &asm[..store_pos];
        assert!(!before.contains("mov rax, [rax]"), "{}", asm);
    }

    #[test]
    fn test_assignment_through_pointer() {
        let asm = compile("int main(){int a; int *p; a=5; p=&a; *p=9; return a;}");
        // stores happen through [rax] three times: a=5, p=&a, *p=9
        assert_eq!(asm.matches("  mov [rax], rdi").count(), 3, "{}", asm);
    }

    #[test]
    fn test_while_loop_shape() {
        let asm = compile("int main(){int i; i=0; while(i<5) i=i+1; return i;}");
        let top = asm.find(".L00000:").expect("loop top");
        let exit_jump = asm.find("  je .L00001").expect("exit branch");
        let back_jump = asm.find("  jmp .L00000").expect("back edge");
        let bottom = asm.find(".L00001:").expect("loop bottom");
        assert!(top < exit_jump && exit_jump < back_jump && back_jump < bottom);
    }

    #[test]
    fn test_for_without_condition_pushes_true() {
        let asm = compile("int main(){for(;;) return 1;}");
        assert!(asm.contains("  push 1\n  pop rax\n  cmp rax, 0\n"), "{}", asm);
    }

    #[test]
    fn test_stray_toplevel_statement_is_popped() {
        let asm = compile("1+2;");
        assert!(asm.contains("  pop rax"), "{}", asm);
    }
}
