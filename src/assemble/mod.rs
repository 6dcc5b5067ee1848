//! Document assembly.
//!
//! This module turns an ordered [`PageList`](crate::model::PageList) into a
//! single PDF:
//! - [`assembler`]: the assembly driver and its per-call source cache
//! - [`copier`]: deep copy of one page and the objects it references
//! - [`metadata`]: the Info dictionary of the output

pub mod assembler;
pub mod copier;
pub mod metadata;

pub use assembler::{
    AssembleOptions, AssembledPdf, AssemblyStatistics, DocumentAssembler, SourceCache,
    assemble_blocking,
};
pub use copier::PageCopier;
