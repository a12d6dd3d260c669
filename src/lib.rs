//! Class file loading and runtime data area for a JVM.
//!
//! [`jvm::JVMParser`] decodes class files that were already read into
//! memory, [`runtime`] holds the thread stacks, frames and slots that the
//! interpreter executes on. Locating class files on disk and interpreting
//! bytecode are left to the embedding program.
pub mod access;
pub mod attribute;
pub mod constant_pool;
pub mod descriptor;
pub mod error;
pub mod jvm;
pub mod member;
pub mod reader;
pub mod runtime;

pub use error::{ClassFormatError, RuntimeError};
pub use jvm::{JVMClassFile, JVMParser};
