pub const CONSTANT: u8 = 0;

pub const ADD: u8 = 1;
pub const SUBTRACT: u8 = 2;
pub const MULTIPLY: u8 = 3;
pub const DIVIDE: u8 = 4;

pub const NEGATE: u8 = 5;

pub const RETURN: u8 = 6;
