//! Graph assembly infrastructure

mod assembler;

pub use assembler::GraphAssembler;
