pub mod chunk;
pub mod disasm;
pub mod opcode;

pub use chunk::{Chunk, Value};
