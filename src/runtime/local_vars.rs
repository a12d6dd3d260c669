//! Local variable table of a frame.
use crate::error::RuntimeError;
use crate::runtime::slot::{join_long, split_long, ObjectRef, Slot};

type Result<T> = std::result::Result<T, RuntimeError>;

/// Fixed size table of slots, sized by the method's `max_locals`. Longs and
/// doubles take the slot at `index` (low half) and `index + 1` (high half).
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVars {
    slots: Box<[Slot]>,
}

impl LocalVars {
    #[must_use]
    pub fn new(max_locals: usize) -> Self {
        Self {
            slots: vec![Slot::default(); max_locals].into_boxed_slice(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, index: usize) -> Result<Slot> {
        self.slots
            .get(index)
            .copied()
            .ok_or_else(|| self.out_of_range(index))
    }

    pub fn set_slot(&mut self, index: usize, slot: Slot) -> Result<()> {
        let err = self.out_of_range(index);
        *self.slots.get_mut(index).ok_or(err)? = slot;
        Ok(())
    }

    pub fn int(&self, index: usize) -> Result<i32> {
        Ok(self.slot(index)?.int())
    }

    pub fn set_int(&mut self, index: usize, value: i32) -> Result<()> {
        self.set_slot(index, Slot::from_int(value))
    }

    pub fn float(&self, index: usize) -> Result<f32> {
        Ok(f32::from_bits(self.int(index)? as u32))
    }

    pub fn set_float(&mut self, index: usize, value: f32) -> Result<()> {
        self.set_int(index, value.to_bits() as i32)
    }

    pub fn long(&self, index: usize) -> Result<i64> {
        self.check_pair(index)?;
        Ok(join_long(self.slots[index].int(), self.slots[index + 1].int()))
    }

    pub fn set_long(&mut self, index: usize, value: i64) -> Result<()> {
        self.check_pair(index)?;
        let (low, high) = split_long(value);
        self.slots[index] = Slot::from_int(low);
        self.slots[index + 1] = Slot::from_int(high);
        Ok(())
    }

    pub fn double(&self, index: usize) -> Result<f64> {
        Ok(f64::from_bits(self.long(index)? as u64))
    }

    pub fn set_double(&mut self, index: usize, value: f64) -> Result<()> {
        self.set_long(index, value.to_bits() as i64)
    }

    pub fn reference(&self, index: usize) -> Result<Option<ObjectRef>> {
        Ok(self.slot(index)?.reference())
    }

    pub fn set_reference(
        &mut self,
        index: usize,
        reference: Option<ObjectRef>,
    ) -> Result<()> {
        self.set_slot(index, Slot::from_ref(reference))
    }

    // Both halves of a long or double must be in range.
    fn check_pair(&self, index: usize) -> Result<()> {
        match index.checked_add(1) {
            Some(high) if high < self.slots.len() => Ok(()),
            _ => Err(self.out_of_range(index)),
        }
    }

    fn out_of_range(&self, index: usize) -> RuntimeError {
        RuntimeError::LocalIndexOutOfRange {
            index,
            max_locals: self.slots.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_variables_table() {
        let mut vars = LocalVars::new(100);
        let object = ObjectRef::new(3);
        vars.set_int(0, 100).unwrap();
        vars.set_int(1, -100).unwrap();
        vars.set_long(2, 2_997_924_580).unwrap();
        vars.set_long(4, -2_997_924_580).unwrap();
        vars.set_float(6, 3.141_592_6).unwrap();
        vars.set_double(7, 2.718_281_828_45).unwrap();
        vars.set_reference(9, None).unwrap();
        vars.set_reference(10, object).unwrap();

        assert_eq!(vars.int(0).unwrap(), 100);
        assert_eq!(vars.int(1).unwrap(), -100);
        assert_eq!(vars.long(2).unwrap(), 2_997_924_580);
        assert_eq!(vars.long(4).unwrap(), -2_997_924_580);
        assert_eq!(vars.float(6).unwrap(), 3.141_592_6);
        assert_eq!(vars.double(7).unwrap(), 2.718_281_828_45);
        assert_eq!(vars.reference(9).unwrap(), None);
        assert_eq!(vars.reference(10).unwrap(), object);
    }

    #[test]
    fn wide_values_use_low_then_high_slot() {
        let mut vars = LocalVars::new(2);
        vars.set_long(0, 0x0000_0001_ffff_fffe).unwrap();
        assert_eq!(vars.int(0).unwrap(), -2);
        assert_eq!(vars.int(1).unwrap(), 1);
    }

    #[test]
    fn starts_zeroed() {
        let vars = LocalVars::new(3);
        assert_eq!(vars.len(), 3);
        assert_eq!(vars.long(0).unwrap(), 0);
        assert_eq!(vars.reference(2).unwrap(), None);
        assert!(LocalVars::new(0).is_empty());
    }

    #[test]
    fn out_of_range_access_fails() {
        let mut vars = LocalVars::new(2);
        let err = RuntimeError::LocalIndexOutOfRange {
            index: 2,
            max_locals: 2,
        };
        assert_eq!(vars.int(2), Err(err.clone()));
        assert_eq!(vars.set_int(2, 1), Err(err));
        assert_eq!(
            vars.set_long(1, 1),
            Err(RuntimeError::LocalIndexOutOfRange {
                index: 1,
                max_locals: 2
            })
        );
        assert!(vars.double(usize::MAX).is_err());
    }
}
