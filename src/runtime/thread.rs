//! Per thread JVM stack.
use crate::error::RuntimeError;
use crate::runtime::frame::Frame;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Default maximum number of frames on a thread's stack.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 1024;

/// Settings for a new `Thread`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ThreadConfig {
    // Frames beyond this depth raise a stack overflow.
    pub max_stack_depth: usize,
}

impl ThreadConfig {
    #[must_use]
    pub const fn with_max_stack_depth(mut self, max_stack_depth: usize) -> Self {
        self.max_stack_depth = max_stack_depth;
        self
    }
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }
}

/// Bounded stack of frames. Frames live in a vector, the caller of a frame
/// is the entry right below it.
#[derive(Debug, Clone)]
pub struct Stack {
    max_depth: usize,
    frames: Vec<Frame>,
}

impl Stack {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: Frame) -> Result<()> {
        if self.frames.len() >= self.max_depth {
            return Err(RuntimeError::StackOverflow {
                max_depth: self.max_depth,
            });
        }
        self.frames.push(frame);
        tracing::trace!(depth = self.frames.len(), "pushed frame");
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Frame> {
        let frame = self.frames.pop().ok_or(RuntimeError::EmptyStack)?;
        tracing::trace!(depth = self.frames.len(), "popped frame");
        Ok(frame)
    }

    pub fn top(&self) -> Result<&Frame> {
        self.frames.last().ok_or(RuntimeError::EmptyStack)
    }

    pub fn top_mut(&mut self) -> Result<&mut Frame> {
        self.frames.last_mut().ok_or(RuntimeError::EmptyStack)
    }

    /// Returns the frame of the method that called the current one.
    #[must_use]
    pub fn caller(&self) -> Option<&Frame> {
        self.frames.iter().rev().nth(1)
    }

    /// Walks the frames from the top of the stack down.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter().rev()
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// A JVM thread: a stack of frames plus the program counter of the
/// instruction being executed in the top frame.
#[derive(Debug, Clone)]
pub struct Thread {
    pc: usize,
    stack: Stack,
}

impl Thread {
    #[must_use]
    pub fn new(config: ThreadConfig) -> Self {
        Self {
            pc: 0,
            stack: Stack::new(config.max_stack_depth),
        }
    }

    #[must_use]
    pub fn with_default_config() -> Self {
        Self::new(ThreadConfig::default())
    }

    #[must_use]
    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn set_pc(&mut self, pc: usize) {
        self.pc = pc;
    }

    pub fn push_frame(&mut self, frame: Frame) -> Result<()> {
        self.stack.push(frame)
    }

    pub fn pop_frame(&mut self) -> Result<Frame> {
        self.stack.pop()
    }

    pub fn current_frame(&self) -> Result<&Frame> {
        self.stack.top()
    }

    pub fn current_frame_mut(&mut self) -> Result<&mut Frame> {
        self.stack.top_mut()
    }

    #[must_use]
    pub fn stack(&self) -> &Stack {
        &self.stack
    }
}
