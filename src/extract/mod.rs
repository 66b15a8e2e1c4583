pub mod assembler;

pub use assembler::RecordAssembler;
