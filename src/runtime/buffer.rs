//! Editable text buffers.
//!
//! Text is stored as UTF-8 in a gap buffer: a single byte vector with a hole
//! (the gap) at the last edit position, so that runs of insertions at the
//! same place do not shift the rest of the text. The gap is real allocated
//! storage and counts towards a buffer's memory footprint.

use crate::runtime::{error::RuntimeError, value::Value};

/// Bytes of slack added whenever the gap has to grow.
pub const DEFAULT_GAP_BYTES: usize = 2000;

#[derive(Debug, Clone)]
pub struct Buffer {
    name: String,
    text: Vec<u8>,
    gap_start: usize,
    gap_end: usize,
    begv: usize,
    zv: usize,
    locals: Vec<(Value, Value)>,
}

impl Buffer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: vec![0; DEFAULT_GAP_BYTES],
            gap_start: 0,
            gap_end: DEFAULT_GAP_BYTES,
            begv: 0,
            zv: 0,
            locals: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of content bytes, excluding the gap.
    pub fn len_bytes(&self) -> usize {
        self.text.len() - self.gap_size()
    }

    pub fn is_empty(&self) -> bool {
        self.len_bytes() == 0
    }

    pub fn gap_size(&self) -> usize {
        self.gap_end - self.gap_start
    }

    /// Start of the accessible region, as a byte offset.
    pub fn begv(&self) -> usize {
        self.begv
    }

    /// End of the accessible region, as a byte offset.
    pub fn zv(&self) -> usize {
        self.zv
    }

    /// Returns the whole text, ignoring narrowing.
    pub fn contents(&self) -> String {
        let mut bytes = Vec::with_capacity(self.len_bytes());
        bytes.extend_from_slice(&self.text[..self.gap_start]);
        bytes.extend_from_slice(&self.text[self.gap_end..]);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Returns the text of the accessible region.
    pub fn accessible_contents(&self) -> String {
        let all = self.contents();
        all[self.begv..self.zv].to_string()
    }

    /// Inserts `text` at byte offset `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<(), RuntimeError> {
        self.check_position(pos)?;
        let n = text.len();
        self.move_gap(pos);
        self.ensure_gap(n);
        self.text[self.gap_start..self.gap_start + n].copy_from_slice(text.as_bytes());
        self.gap_start += n;

        if pos < self.begv {
            self.begv += n;
        }
        if pos <= self.zv {
            self.zv += n;
        }
        Ok(())
    }

    /// Deletes the bytes in `start..end`; the freed bytes join the gap.
    pub fn delete(&mut self, start: usize, end: usize) -> Result<(), RuntimeError> {
        if start > end {
            return Err(RuntimeError::IndexOutOfRange {
                index: start,
                len: end,
            });
        }
        self.check_position(start)?;
        self.check_position(end)?;

        let n = end - start;
        self.move_gap(end);
        self.gap_start -= n;

        let shift = |p: usize| {
            if p >= end {
                p - n
            } else if p > start {
                start
            } else {
                p
            }
        };
        self.begv = shift(self.begv);
        self.zv = shift(self.zv);
        Ok(())
    }

    /// Restricts the accessible region to `start..end`.
    pub fn narrow(&mut self, start: usize, end: usize) -> Result<(), RuntimeError> {
        let len = self.len_bytes();
        if start > end || end > len {
            return Err(RuntimeError::IndexOutOfRange { index: end, len });
        }
        self.check_position(start)?;
        self.check_position(end)?;
        self.begv = start;
        self.zv = end;
        Ok(())
    }

    pub fn widen(&mut self) {
        self.begv = 0;
        self.zv = self.len_bytes();
    }

    /// Binds `symbol` buffer-locally, replacing any previous binding.
    pub fn set_local(&mut self, symbol: Value, value: Value) {
        match self.locals.iter_mut().find(|(sym, _)| *sym == symbol) {
            Some(binding) => binding.1 = value,
            None => self.locals.push((symbol, value)),
        }
    }

    pub fn local(&self, symbol: Value) -> Option<Value> {
        self.locals
            .iter()
            .find(|(sym, _)| *sym == symbol)
            .map(|(_, value)| *value)
    }

    pub fn kill_local(&mut self, symbol: Value) -> bool {
        let before = self.locals.len();
        self.locals.retain(|(sym, _)| *sym != symbol);
        self.locals.len() != before
    }

    pub fn locals(&self) -> &[(Value, Value)] {
        &self.locals
    }

    fn byte_at(&self, pos: usize) -> u8 {
        if pos < self.gap_start {
            self.text[pos]
        } else {
            self.text[pos + self.gap_size()]
        }
    }

    fn check_position(&self, pos: usize) -> Result<(), RuntimeError> {
        let len = self.len_bytes();
        if pos > len {
            return Err(RuntimeError::IndexOutOfRange { index: pos, len });
        }
        // UTF-8 continuation bytes look like 0b10xx_xxxx.
        if pos < len && self.byte_at(pos) & 0xC0 == 0x80 {
            return Err(RuntimeError::NotCharBoundary(pos));
        }
        Ok(())
    }

    fn move_gap(&mut self, pos: usize) {
        if pos < self.gap_start {
            let n = self.gap_start - pos;
            self.text
                .copy_within(pos..self.gap_start, self.gap_end - n);
            self.gap_start = pos;
            self.gap_end -= n;
        } else if pos > self.gap_start {
            let n = pos - self.gap_start;
            self.text
                .copy_within(self.gap_end..self.gap_end + n, self.gap_start);
            self.gap_start += n;
            self.gap_end += n;
        }
    }

    fn ensure_gap(&mut self, needed: usize) {
        if self.gap_size() >= needed {
            return;
        }
        let grow = needed + DEFAULT_GAP_BYTES;
        self.text
            .splice(self.gap_end..self.gap_end, std::iter::repeat_n(0u8, grow));
        self.gap_end += grow;
    }
}
