//! Durable key-value slot holding the serialized task collection.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{Error, Result};

/// A single named location for the whole task blob. Writes replace the
/// previous contents in full.
pub trait DurableSlot {
    /// `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<Vec<u8>>>;

    fn write(&mut self, data: &[u8]) -> Result<()>;
}

#[derive(Debug, Default)]
struct MemoryState {
    data: Option<Vec<u8>>,
    fail_writes: bool,
    writes: usize,
}

/// In-process slot. Clones share the same contents, so a test can keep a
/// handle after giving one to a store.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    state: Rc<RefCell<MemoryState>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        let slot = Self::default();
        slot.state.borrow_mut().data = Some(data.into());
        slot
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.state.borrow().data.clone()
    }

    pub fn set_contents(&self, data: impl Into<Vec<u8>>) {
        self.state.borrow_mut().data = Some(data.into());
    }

    /// Make every subsequent write fail until turned off again.
    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.state.borrow().writes
    }
}

impl DurableSlot for MemorySlot {
    fn read(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.state.borrow().data.clone())
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(Error::Persistence("memory slot rejected write".to_string()));
        }
        state.data = Some(data.to_vec());
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_contents() {
        let slot = MemorySlot::new();
        let mut writer = slot.clone();
        assert!(slot.read().expect("read").is_none());

        writer.write(b"[]").expect("write");
        assert_eq!(slot.contents().as_deref(), Some(&b"[]"[..]));
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn failing_slot_keeps_previous_contents() {
        let mut slot = MemorySlot::with_contents("old");
        slot.fail_writes(true);
        let err = slot.write(b"new").expect_err("write should fail");
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(slot.contents().as_deref(), Some(&b"old"[..]));
        assert_eq!(slot.write_count(), 0);
    }
}
