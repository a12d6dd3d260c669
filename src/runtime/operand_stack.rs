//! Operand stack of a frame.
use crate::error::RuntimeError;
use crate::runtime::slot::{join_long, split_long, ObjectRef, Slot};

type Result<T> = std::result::Result<T, RuntimeError>;

/// Fixed capacity stack of slots, sized by the method's `max_stack`.
///
/// A long or double is pushed as two slots, low half first, and must be
/// popped as a pair. Popping a single half of a wide value is not guarded
/// here, the same way the instruction set leaves it to the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct OperandStack {
    slots: Box<[Slot]>,
    size: usize,
}

impl OperandStack {
    #[must_use]
    pub fn new(max_stack: usize) -> Self {
        Self {
            slots: vec![Slot::default(); max_stack].into_boxed_slice(),
            size: 0,
        }
    }

    /// Number of slots currently in use.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Drops every value, used when an exception handler takes over.
    pub fn clear(&mut self) {
        self.size = 0;
    }

    pub fn push_slot(&mut self, slot: Slot) -> Result<()> {
        self.reserve(1)?;
        self.slots[self.size] = slot;
        self.size += 1;
        Ok(())
    }

    pub fn pop_slot(&mut self) -> Result<Slot> {
        self.release(1)?;
        Ok(self.slots[self.size])
    }

    /// Returns the slot `depth` entries below the top without popping.
    pub fn peek_slot(&self, depth: usize) -> Result<Slot> {
        depth
            .checked_add(1)
            .and_then(|n| self.size.checked_sub(n))
            .map(|i| self.slots[i])
            .ok_or(RuntimeError::OperandStackUnderflow)
    }

    pub fn push_int(&mut self, value: i32) -> Result<()> {
        self.push_slot(Slot::from_int(value))
    }

    pub fn pop_int(&mut self) -> Result<i32> {
        Ok(self.pop_slot()?.int())
    }

    pub fn push_float(&mut self, value: f32) -> Result<()> {
        self.push_int(value.to_bits() as i32)
    }

    pub fn pop_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.pop_int()? as u32))
    }

    pub fn push_long(&mut self, value: i64) -> Result<()> {
        self.reserve(2)?;
        let (low, high) = split_long(value);
        self.slots[self.size] = Slot::from_int(low);
        self.slots[self.size + 1] = Slot::from_int(high);
        self.size += 2;
        Ok(())
    }

    pub fn pop_long(&mut self) -> Result<i64> {
        self.release(2)?;
        let low = self.slots[self.size].int();
        let high = self.slots[self.size + 1].int();
        Ok(join_long(low, high))
    }

    pub fn push_double(&mut self, value: f64) -> Result<()> {
        self.push_long(value.to_bits() as i64)
    }

    pub fn pop_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.pop_long()? as u64))
    }

    pub fn push_ref(&mut self, reference: Option<ObjectRef>) -> Result<()> {
        self.push_slot(Slot::from_ref(reference))
    }

    pub fn pop_ref(&mut self) -> Result<Option<ObjectRef>> {
        Ok(self.pop_slot()?.reference())
    }

    fn reserve(&self, n: usize) -> Result<()> {
        if self.slots.len() - self.size < n {
            return Err(RuntimeError::OperandStackOverflow {
                capacity: self.slots.len(),
            });
        }
        Ok(())
    }

    fn release(&mut self, n: usize) -> Result<()> {
        self.size = self
            .size
            .checked_sub(n)
            .ok_or(RuntimeError::OperandStackUnderflow)?;
        Ok(())
    }
}
