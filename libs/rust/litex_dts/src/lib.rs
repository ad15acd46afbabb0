//! Device-tree source generation for LiteX VexRiscv SoCs.
#![no_std]

extern crate alloc;

mod assemble;
pub mod emit;
mod error;
mod options;
pub mod tree;

pub use assemble::build;
pub use assemble::generate;
pub use assemble::generate_from_json;
pub use error::Error;
pub use options::Framebuffer;
pub use options::Options;
