//! Writer implementations

pub mod file;
pub mod memory;
pub mod stdout;

pub use file::FileWriter;
pub use memory::MemoryWriter;
pub use stdout::StdOutWriter;

pub use crate::core::{LogWriter, SharedWriter};
