//! Queue of edit records for the incremental parser
//!
//! Every primitive insert/remove produces one `tree_sitter::InputEdit`
//! (start / old end / new end, in bytes and byte-column points). The
//! buffer never parses; the editor's parser adapter drains this queue and
//! feeds the records to tree-sitter before reparsing. While a batch scope
//! is open, records accumulate and flush when the outermost scope exits,
//! so the parser sees one consistent group per user action.

use tree_sitter::InputEdit;

#[derive(Debug, Clone, Default)]
pub struct EditLog {
    pending: Vec<InputEdit>,
    batched: Vec<InputEdit>,
    batch_refs: u32,
}

impl EditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, edit: InputEdit) {
        if self.batch_refs > 0 {
            self.batched.push(edit);
        } else {
            self.pending.push(edit);
        }
    }

    pub fn begin_batch(&mut self) {
        self.batch_refs += 1;
    }

    pub fn end_batch(&mut self) {
        debug_assert!(self.batch_refs > 0, "end_batch without begin_batch");
        self.batch_refs -= 1;
        if self.batch_refs == 0 {
            self.pending.append(&mut self.batched);
        }
    }

    #[must_use]
    pub fn in_batch(&self) -> bool {
        self.batch_refs > 0
    }

    /// Records flushed and ready for the parser
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain the flushed records. Records still inside an open batch stay
    /// queued until the batch closes.
    pub fn take(&mut self) -> Vec<InputEdit> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.batched.clear();
    }
}
