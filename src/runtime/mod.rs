//! Runtime data area: the per thread stacks that bytecode runs on.
//!
//! Every value lives in 32-bit [`Slot`]s. Longs and doubles are split over
//! two consecutive slots, low word first.
mod frame;
mod local_vars;
mod operand_stack;
mod slot;
mod thread;

pub use frame::Frame;
pub use local_vars::LocalVars;
pub use operand_stack::OperandStack;
pub use slot::{ObjectRef, Slot};
pub use thread::{Stack, Thread, ThreadConfig, DEFAULT_MAX_STACK_DEPTH};
