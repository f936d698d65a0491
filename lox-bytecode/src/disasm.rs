use crate::chunk::Chunk;
use crate::opcode;

/// Renders a whole chunk under a `== name ==` header. Callers print the
/// result; building a string keeps the output testable.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = format!("== {} ==\n", name);

    let mut offset = 0;
    while offset < chunk.len() {
        let (text, next) = disassemble_instruction(chunk, offset);
        out.push_str(&text);
        out.push('\n');
        offset = next;
    }

    out
}

/// Renders one instruction and returns the offset of the next one. The line
/// column shows `|` when the instruction is on the same source line as the
/// previous one.
pub fn disassemble_instruction(chunk: &Chunk, offset: usize) -> (String, usize) {
    let mut out = format!("{:04} ", offset);
    if offset > 0 && chunk.line(offset) == chunk.line(offset - 1) {
        out.push_str("   | ");
    } else {
        out.push_str(&format!("{:4} ", chunk.line(offset)));
    }

    let (text, next) = match chunk.byte(offset) {
        opcode::CONSTANT => {
            let constant = chunk.byte(offset + 1);
            (
                format!(
                    "{:<16} {:4} '{}'",
                    "OP_CONSTANT",
                    constant,
                    chunk.constant(constant)
                ),
                offset + 2,
            )
        }
        opcode::ADD => ("OP_ADD".to_string(), offset + 1),
        opcode::SUBTRACT => ("OP_SUBTRACT".to_string(), offset + 1),
        opcode::MULTIPLY => ("OP_MULTIPLY".to_string(), offset + 1),
        opcode::DIVIDE => ("OP_DIVIDE".to_string(), offset + 1),
        opcode::NEGATE => ("OP_NEGATE".to_string(), offset + 1),
        opcode::RETURN => ("OP_RETURN".to_string(), offset + 1),
        unknown => (format!("Unknown opcode {}", unknown), offset + 1),
    };

    out.push_str(&text);
    (out, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disassemble_chunk() {
        let mut chunk = Chunk::new();
        let constant = chunk.add_constant(1.2);
        chunk.write(opcode::CONSTANT, 123);
        chunk.write(constant as u8, 123);
        chunk.write(opcode::RETURN, 123);

        assert_eq!(
            disassemble(&chunk, "test chunk"),
            "== test chunk ==\n\
             0000  123 OP_CONSTANT         0 '1.2'\n\
             0002    | OP_RETURN\n"
        );
    }

    #[test]
    fn test_line_column_changes() {
        let mut chunk = Chunk::new();
        chunk.write(opcode::ADD, 1);
        chunk.write(opcode::NEGATE, 2);

        let (first, next) = disassemble_instruction(&chunk, 0);
        assert_eq!(first, "0000    1 OP_ADD");
        let (second, _) = disassemble_instruction(&chunk, next);
        assert_eq!(second, "0001    2 OP_NEGATE");
    }

    #[test]
    fn test_unknown_opcode() {
        let mut chunk = Chunk::new();
        chunk.write(42, 1);
        let (text, next) = disassemble_instruction(&chunk, 0);
        assert_eq!(text, "0000    1 Unknown opcode 42");
        assert_eq!(next, 1);
    }
}
