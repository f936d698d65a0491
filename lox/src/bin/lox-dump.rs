//! Compiles an expression file and dumps the resulting chunk, first as a
//! disassembly listing and then as JSON.

use anyhow::{Context, Result};
use lox_bytecode::{disasm, Chunk};

fn main() -> Result<()> {
    let path = std::env::args().nth(1).context("Usage: lox-dump <path>")?;
    let source =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {}", path))?;

    let mut chunk = Chunk::new();
    if !lox_compiler::compile(&source, &mut chunk) {
        std::process::exit(65);
    }

    print!("{}", disasm::disassemble(&chunk, &path));
    println!("{}", serde_json::to_string_pretty(&chunk)?);

    Ok(())
}
