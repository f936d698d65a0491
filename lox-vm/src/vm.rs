use arrayvec::ArrayVec;
use lox_bytecode::chunk::Value;
use lox_bytecode::{disasm, opcode, Chunk};
use std::error::Error;
use std::fmt;

pub const STACK_MAX: usize = 256;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum InterpretError {
    Compile,
    Runtime,
}

impl fmt::Display for InterpretError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterpretError::Compile => write!(f, "interpret: compile error"),
            InterpretError::Runtime => write!(f, "interpret: runtime error"),
        }
    }
}

impl Error for InterpretError {}

pub struct Vm<'a> {
    chunk: &'a Chunk,
    // Instruction pointer: index of the next byte to execute.
    ip: usize,
    stack: ArrayVec<Value, STACK_MAX>,
    pub debug_trace: bool,
}

impl<'a> Vm<'a> {
    pub fn new(chunk: &'a Chunk) -> Vm<'a> {
        Vm {
            chunk,
            ip: 0,
            stack: ArrayVec::new(),
            debug_trace: false,
        }
    }

    /// Runs the chunk to its `OP_RETURN`, which prints the final stack value
    /// and yields it.
    pub fn run(&mut self) -> Result<Value, InterpretError> {
        loop {
            if self.debug_trace {
                let mut cells = String::from("          ");
                for value in &self.stack {
                    cells.push_str(&format!("[ {} ]", value));
                }
                println!("{}", cells);
                let (text, _) = disasm::disassemble_instruction(self.chunk, self.ip);
                println!("{}", text);
            }

            let instruction = self.read_byte()?;
            match instruction {
                opcode::CONSTANT => {
                    let index = self.read_byte()?;
                    let constant = self.chunk.constant(index);
                    self.push(constant)?;
                }

                opcode::ADD => self.binary_op(|a, b| a + b)?,
                opcode::SUBTRACT => self.binary_op(|a, b| a - b)?,
                opcode::MULTIPLY => self.binary_op(|a, b| a * b)?,
                opcode::DIVIDE => self.binary_op(|a, b| a / b)?,

                opcode::NEGATE => {
                    let value = self.pop()?;
                    self.push(-value)?;
                }

                opcode::RETURN => {
                    let value = self.pop()?;
                    println!("{}", value);
                    return Ok(value);
                }

                unknown => return self.fault(&format!("unknown opcode {}", unknown)),
            }
        }
    }

    fn read_byte(&mut self) -> Result<u8, InterpretError> {
        if self.ip >= self.chunk.len() {
            return self.fault("instruction pointer ran off the chunk");
        }
        let byte = self.chunk.byte(self.ip);
        self.ip += 1;
        Ok(byte)
    }

    fn binary_op(&mut self, op: fn(Value, Value) -> Value) -> Result<(), InterpretError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(op(a, b))
    }

    fn push(&mut self, value: Value) -> Result<(), InterpretError> {
        match self.stack.try_push(value) {
            Ok(()) => Ok(()),
            Err(_) => self.fault("stack overflow"),
        }
    }

    fn pop(&mut self) -> Result<Value, InterpretError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => self.fault("stack underflow"),
        }
    }

    fn fault<T>(&self, message: &str) -> Result<T, InterpretError> {
        eprintln!("[line {}] {}", self.current_line(), message);
        Err(InterpretError::Runtime)
    }

    fn current_line(&self) -> u32 {
        if self.chunk.is_empty() {
            return 0;
        }
        let offset = self.ip.saturating_sub(1).min(self.chunk.len() - 1);
        self.chunk.line(offset)
    }
}
