//! Mini-C Compiler CLI
//!
//! Takes the whole program source as the single command-line argument and
//! writes Intel-syntax x86-64 assembly to standard output. Diagnostics go
//! to standard error with a caret pointing at the offending column; every
//! failure exits with code 1.

use std::env;
use std::process;

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() != 1 {
        eprintln!("Exactly one argument must be passed.");
        process::exit(1);
    }

    let source = &args[0];
    match minicc::compile_to_asm(source) {
        Ok(asm) => print!("{}", asm),
        Err(e) => {
            eprint!("{}", e.report(source));
            process::exit(1);
        }
    }
}
