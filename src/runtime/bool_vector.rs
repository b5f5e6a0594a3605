use crate::runtime::error::RuntimeError;

/// Fixed-length packed bit array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVector {
    bits: Vec<u8>,
    len: usize,
}

impl BoolVector {
    pub fn new(len: usize, init: bool) -> Self {
        let fill = if init { 0xFF } else { 0x00 };
        let mut vector = Self {
            bits: vec![fill; len.div_ceil(8)],
            len,
        };
        vector.clear_padding();
        vector
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, i: usize) -> Option<bool> {
        if i >= self.len {
            return None;
        }
        Some(self.bits[i / 8] & (1 << (i % 8)) != 0)
    }

    pub fn set(&mut self, i: usize, bit: bool) -> Result<(), RuntimeError> {
        if i >= self.len {
            return Err(RuntimeError::IndexOutOfRange {
                index: i,
                len: self.len,
            });
        }
        let mask = 1 << (i % 8);
        if bit {
            self.bits[i / 8] |= mask;
        } else {
            self.bits[i / 8] &= !mask;
        }
        Ok(())
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|byte| byte.count_ones() as usize).sum()
    }

    /// Bytes of packed bit storage.
    pub fn storage_bytes(&self) -> usize {
        self.bits.len()
    }

    fn clear_padding(&mut self) {
        let used = self.len % 8;
        if used != 0 {
            if let Some(last) = self.bits.last_mut() {
                *last &= (1u8 << used) - 1;
            }
        }
    }
}
