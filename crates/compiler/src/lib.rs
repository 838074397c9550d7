//! Mini-C Compiler Library
//!
//! Compiles Mini-C source text to x86-64 assembly (Intel syntax, System V
//! AMD64 calling convention) and, through [`compile_file`], drives the
//! system C compiler to assemble and link the result.
//!
//! The pipeline is strictly sequential: tokenize, parse (which also
//! resolves names and desugars), annotate types, emit. Each stage hands an
//! owned value to the next; errors carry a source offset and surface at
//! the driver as caret diagnostics.
//!
//! ```rust
//! let asm = minicc::compile_to_asm("int main(){return 1+2*3;}").unwrap();
//! assert!(asm.starts_with(".intel_syntax noprefix\n.globl main\n"));
//! ```

pub mod ast;
pub mod codegen;
pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod types;
pub mod typing;

pub use codegen::{CodeGen, CodeGenError};
pub use config::CompilerConfig;
pub use error::CompileError;
pub use lexer::{Token, TokenKind};
pub use parser::Parser;
pub use types::Type;

use std::fs;
use std::path::Path;
use std::process::Command;

/// Compile Mini-C source text to assembly text.
pub fn compile_to_asm(source: &str) -> Result<String, CompileError> {
    let mut parser = Parser::new(source)?;
    let mut program = parser.parse()?;
    typing::annotate_program(&mut program);
    let mut codegen = CodeGen::new();
    codegen
        .codegen_program(&program)
        .map_err(|e| CompileError::plain(e.to_string()))
}

/// Compile a source file to assembly, writing it to `asm_path`.
pub fn compile_file_to_asm(input: &Path, asm_path: &Path) -> Result<(), String> {
    let source =
        fs::read_to_string(input).map_err(|e| format!("Failed to read source file: {}", e))?;
    let asm = compile_to_asm(&source).map_err(|e| e.report(&source))?;
    fs::write(asm_path, asm).map_err(|e| format!("Failed to write assembly file: {}", e))?;
    Ok(())
}

/// Compile a source file and link it into an executable.
///
/// Writes `<output>.s`, invokes the configured C compiler to assemble and
/// link it, then removes the assembly file unless the configuration keeps
/// it.
pub fn compile_file(input: &Path, output: &Path, config: &CompilerConfig) -> Result<(), String> {
    let asm_path = output.with_extension("s");
    compile_file_to_asm(input, &asm_path)?;

    let mut cc = Command::new(&config.cc);
    cc.arg(&asm_path).arg("-o").arg(output);
    for path in &config.library_paths {
        cc.arg("-L").arg(path);
    }
    for lib in &config.libraries {
        cc.arg("-l").arg(lib);
    }

    let result = cc
        .output()
        .map_err(|e| format!("Failed to run {}: {}", config.cc, e))?;
    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(format!("Assembling and linking failed:\n{}", stderr));
    }

    if !config.keep_asm {
        fs::remove_file(&asm_path).ok();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_constant() {
        let asm = compile_to_asm("int main(){return 0;}").unwrap();
        assert!(asm.starts_with(".intel_syntax noprefix\n.globl main\nmain:\n"));
        assert!(asm.contains("  push 0\n  pop rax\n"));
    }

    #[test]
    fn test_precedence() {
        // 1+2*3: the multiplication must complete before the addition
        let asm = compile_to_asm("int main(){return 1+2*3;}").unwrap();
        let mul = asm.find("  imul rax, rdi").expect("imul");
        let add = asm.find("  add rax, rdi").expect("add");
        assert!(mul < add, "{}", asm);
    }

    #[test]
    fn test_locals_load_and_store() {
        let asm = compile_to_asm("int main(){int a; a=3; return a+4;}").unwrap();
        assert!(asm.contains("  mov [rax], rdi"));
        assert!(asm.contains("  mov rax, [rax]"));
    }

    #[test]
    fn test_comparison_result() {
        let asm = compile_to_asm("int main(){int a; int b; a=1; b=2; return a<b;}").unwrap();
        assert!(asm.contains("  setl al\n  movzb rax, al\n"));
    }

    #[test]
    fn test_recursive_function() {
        let asm = compile_to_asm(
            "int fib(int n){if(n<2) return n; return fib(n-1)+fib(n-2);} \
             int main(){return fib(10);}",
        )
        .unwrap();
        assert!(asm.contains("fib:\n"));
        assert!(asm.contains("  call fib\n"));
        assert!(asm.contains("main:\n"));
        assert!(asm.contains("  push 10\n  pop rdi\n  call fib\n"));
    }

    #[test]
    fn test_pointer_write_reads_back() {
        let asm =
            compile_to_asm("int main(){int a; int *p; a=5; p=&a; *p=9; return a;}").unwrap();
        // the *p=9 store goes through the loaded pointer value
        assert!(asm.contains("  push 9\n  pop rdi\n  pop rax\n  mov [rax], rdi\n"), "{}", asm);
    }

    #[test]
    fn test_cli_misuse_error_is_plain() {
        let err = CompileError::plain("Exactly one argument must be passed.");
        assert_eq!(err.report(""), "Exactly one argument must be passed.\n");
    }

    #[test]
    fn test_error_report_matches_column() {
        let source = "int main(){return x;}";
        let err = compile_to_asm(source).unwrap_err();
        let report = err.report(source);
        let mut lines = report.lines();
        assert_eq!(lines.next(), Some(source));
        let caret_line = lines.next().expect("caret line");
        assert_eq!(caret_line.find('^'), source.find('x'));
    }

    #[test]
    fn test_compile_file_to_asm_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("prog.mc");
        let asm_path = dir.path().join("prog.s");
        std::fs::write(&input, "int main(){return 7;}").unwrap();

        compile_file_to_asm(&input, &asm_path).unwrap();

        let asm = std::fs::read_to_string(&asm_path).unwrap();
        assert!(asm.starts_with(".intel_syntax noprefix\n"));
        assert!(asm.contains("  push 7\n"));
    }

    #[test]
    fn test_compile_file_to_asm_reports_caret() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.mc");
        std::fs::write(&input, "int main(){return @;}").unwrap();

        let err = compile_file_to_asm(&input, &dir.path().join("bad.s")).unwrap_err();
        assert!(err.contains("^ Invalid token."), "{}", err);
    }
}
