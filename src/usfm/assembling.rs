//! Logical line assembly
//!
//! - `lines`: physical and logical line records, the dialect, the assembled book
//! - `assembler`: the one-line-behind state machine that merges and splits lines

pub mod assembler;
pub mod lines;

pub use assembler::LineAssembler;
pub use lines::{AssembledBook, Dialect, LogicalLine, PhysicalLine};
