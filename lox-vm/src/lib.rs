pub mod vm;

pub use vm::{InterpretError, Vm, STACK_MAX};
