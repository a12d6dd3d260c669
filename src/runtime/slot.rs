//! Slots are the storage cells of local variable tables and operand stacks.
use std::num::NonZeroU32;

/// Opaque handle to a heap object. The heap itself is not modelled yet, a
/// handle is only ever compared and moved around.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef(NonZeroU32);

impl ObjectRef {
    /// Returns `None` for the zero handle.
    #[must_use]
    pub fn new(handle: u32) -> Option<Self> {
        NonZeroU32::new(handle).map(Self)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

/// A slot holds either a 32-bit primitive or a reference. There is no tag,
/// a slot must be read back as the same kind it was written as.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    // int, or the bits of a float, or one half of a long/double.
    num: i32,
    reference: Option<ObjectRef>,
}

impl Slot {
    #[must_use]
    pub const fn from_int(num: i32) -> Self {
        Self {
            num,
            reference: None,
        }
    }

    #[must_use]
    pub const fn from_ref(reference: Option<ObjectRef>) -> Self {
        Self { num: 0, reference }
    }

    #[must_use]
    pub const fn int(self) -> i32 {
        self.num
    }

    #[must_use]
    pub const fn reference(self) -> Option<ObjectRef> {
        self.reference
    }
}

/// Splits a 64-bit value into its `(low, high)` 32-bit halves, in the
/// order they are laid out in consecutive slots.
pub(crate) const fn split_long(value: i64) -> (i32, i32) {
    (value as i32, (value >> 32) as i32)
}

/// Inverse of [`split_long`].
pub(crate) const fn join_long(low: i32, high: i32) -> i64 {
    ((high as i64) << 32) | (low as u32 as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_halves_round_trip() {
        for value in [0, -1, 1, i64::MIN, i64::MAX, 2_997_924_580, -2_997_924_580] {
            let (low, high) = split_long(value);
            assert_eq!(join_long(low, high), value);
        }
        assert_eq!(split_long(0x1122_3344_5566_7788), (0x5566_7788, 0x1122_3344));
        assert_eq!(split_long(-1), (-1, -1));
    }

    #[test]
    fn zero_is_not_a_handle() {
        assert_eq!(ObjectRef::new(0), None);
        assert_eq!(ObjectRef::new(7).map(ObjectRef::get), Some(7));
        assert_eq!(Slot::default(), Slot::from_int(0));
        assert_eq!(Slot::default().reference(), None);
    }
}
