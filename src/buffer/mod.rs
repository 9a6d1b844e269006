//! Buffer core: lines of codepoints plus the indices that keep every
//! coordinate system honest
//!
//! The buffer owns four structures that must never disagree: the line
//! table (`Vec<Vec<char>>`, one entry per line, no stored newlines), the
//! byte-count treap (O(log N) byte offset ↔ line mapping), the mark tree
//! (stable positions), and the history ring. `insert` and `remove` are
//! the only two primitive mutations; everything else (undo, redo, load,
//! clear) is expressed through them so the indices, marks, history and
//! parser edit records always move in lockstep.

use std::fmt::{self, Display};
use std::io::Write;
use std::thread::{self, ThreadId};

use tree_sitter::InputEdit;

use crate::bytecounts::ByteCounts;
use crate::codec;
use crate::error::{BufferError, Result};
use crate::history::{self, Change, History};
use crate::marks::{Mark, MarkKind, MarkTree};
use crate::position::Pos;

pub mod edit_log;
pub mod iter;

mod coords;

pub use iter::{BufferIter, MappedIter, TextIter};

use edit_log::EditLog;

/// Default tab stop for visual-column conversion
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Per-buffer configuration, fixed at open time
#[derive(Debug, Clone)]
pub struct BufferOptions {
    /// Language tag handed to the parser/indexer collaborators
    pub language: Option<String>,
    /// Record undo history. Scratch buffers turn this off.
    pub enable_history: bool,
    /// Ring slots for undo history; the oldest entry is evicted when the
    /// ring fills. See `history::DEFAULT_CAPACITY`.
    pub history_capacity: usize,
    /// Tab stop for visual-column conversion
    pub tab_width: usize,
    /// Debug-assert that all mutations happen on the opening thread
    pub main_thread_only: bool,
}

impl Default for BufferOptions {
    fn default() -> Self {
        Self {
            language: None,
            enable_history: true,
            history_capacity: history::DEFAULT_CAPACITY,
            tab_width: DEFAULT_TAB_WIDTH,
            main_thread_only: false,
        }
    }
}

/// A text buffer holding one document
pub struct Buffer {
    lines: Vec<Vec<char>>,
    bctree: ByteCounts,
    marks: MarkTree,
    history: History,
    edits: EditLog,
    opts: BufferOptions,
    version: u64,
    dirty: bool,
    owner: ThreadId,
}

impl Buffer {
    #[must_use]
    pub fn new(opts: BufferOptions) -> Self {
        let mut bctree = ByteCounts::new();
        bctree.append(0);
        Self {
            lines: vec![Vec::new()],
            bctree,
            marks: MarkTree::new(),
            history: History::with_capacity(opts.history_capacity),
            edits: EditLog::new(),
            opts,
            version: 0,
            dirty: false,
            owner: thread::current().id(),
        }
    }

    /// Open an empty buffer for a document
    #[must_use]
    pub fn open(language: Option<&str>, enable_history: bool) -> Self {
        Self::new(BufferOptions {
            language: language.map(str::to_owned),
            enable_history,
            ..BufferOptions::default()
        })
    }

    #[must_use]
    pub fn options(&self) -> &BufferOptions {
        &self.opts
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.opts.language.as_deref()
    }

    /// Monotonic counter bumped on every content mutation
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// True once the contents diverged from the last load/save
    #[must_use]
    pub fn dirty(&self) -> bool {
        self.dirty
    }

    // --- geometry ---

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Codepoints of line `i`, without the trailing newline
    #[must_use]
    pub fn line(&self, i: usize) -> &[char] {
        &self.lines[i]
    }

    /// Position one past the last codepoint of the buffer
    #[must_use]
    pub fn end_pos(&self) -> Pos {
        let line = self.lines.len() - 1;
        Pos::new(line as u32, self.lines[line].len() as u32)
    }

    /// Size of the UTF-8 serialization
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.bctree.total()
    }

    #[must_use]
    pub fn is_valid(&self, pos: Pos) -> bool {
        (pos.line as usize) < self.lines.len()
            && (pos.col as usize) <= self.lines[pos.line as usize].len()
    }

    /// Clamp a position into the buffer. Idempotent.
    #[must_use]
    pub fn fix_pos(&self, pos: Pos) -> Pos {
        let line = (pos.line as usize).min(self.lines.len() - 1);
        let col = (pos.col as usize).min(self.lines[line].len());
        Pos::new(line as u32, col as u32)
    }

    // --- editing ---

    /// Insert codepoints (newlines included) at `pos`, returning the end
    /// of the inserted content. `pos` is clamped into the buffer.
    pub fn insert(&mut self, pos: Pos, text: &[char]) -> Pos {
        let pos = self.fix_pos(pos);
        self.insert_impl(pos, text, true)
    }

    /// Strict `insert`: fails with `OutOfRange` instead of clamping
    pub fn try_insert(&mut self, pos: Pos, text: &[char]) -> Result<Pos> {
        if !self.is_valid(pos) {
            return Err(BufferError::out_of_range(format!(
                "insert position {} outside buffer",
                pos
            )));
        }
        Ok(self.insert_impl(pos, text, true))
    }

    /// Convenience for UTF-8 payloads
    pub fn insert_str(&mut self, pos: Pos, text: &str) -> Pos {
        let chars: Vec<char> = text.chars().collect();
        self.insert(pos, &chars)
    }

    /// Remove `[start, end)`. Both positions are clamped and reordered.
    pub fn remove(&mut self, start: Pos, end: Pos) {
        let mut start = self.fix_pos(start);
        let mut end = self.fix_pos(end);
        if end < start {
            std::mem::swap(&mut start, &mut end);
        }
        self.remove_impl(start, end, true);
    }

    /// Strict `remove`: fails with `OutOfRange` on any bad position
    pub fn try_remove(&mut self, start: Pos, end: Pos) -> Result<()> {
        if !self.is_valid(start) || !self.is_valid(end) || end < start {
            return Err(BufferError::out_of_range(format!(
                "range {}..{} outside buffer",
                start, end
            )));
        }
        self.remove_impl(start, end, true);
        Ok(())
    }

    /// Remove whole lines `y1..y2`, including their newlines
    pub fn remove_lines(&mut self, y1: usize, y2: usize) {
        let y2 = y2.min(self.lines.len());
        if y1 >= y2 {
            return;
        }
        if y2 < self.lines.len() {
            self.remove(Pos::new(y1 as u32, 0), Pos::new(y2 as u32, 0));
        } else if y1 > 0 {
            let prev_end = Pos::new(y1 as u32 - 1, self.lines[y1 - 1].len() as u32);
            self.remove(prev_end, self.end_pos());
        } else {
            self.remove(Pos::ZERO, self.end_pos());
        }
    }

    /// Drop all contents and history, leaving one empty line
    pub fn clear(&mut self) {
        let end = self.end_pos();
        if end != Pos::ZERO {
            self.remove_impl(Pos::ZERO, end, false);
        }
        self.history.clear();
    }

    fn insert_impl(&mut self, pos: Pos, text: &[char], record: bool) -> Pos {
        self.assert_owner();
        debug_assert!(self.is_valid(pos));
        if text.is_empty() {
            return pos;
        }

        let start_byte = self.pos_to_byte(pos);
        let start_point = self.ts_point(pos);

        let line_idx = pos.line as usize;
        let col = pos.col as usize;

        let mut segments = text.split(|&c| c == '\n');
        let first = segments.next().unwrap_or(&[]);
        let mut rest: Vec<Vec<char>> = segments.map(<[char]>::to_vec).collect();
        let k = rest.len();

        let new_end;
        if k == 0 {
            self.lines[line_idx].splice(col..col, first.iter().copied());
            new_end = Pos::new(pos.line, pos.col + first.len() as u32);
        } else {
            let suffix = self.lines[line_idx].split_off(col);
            self.lines[line_idx].extend_from_slice(first);
            let last = rest.last_mut().unwrap();
            new_end = Pos::new(pos.line + k as u32, last.len() as u32);
            last.extend_from_slice(&suffix);
            self.lines.splice(line_idx + 1..line_idx + 1, rest);
        }

        self.bctree.set(line_idx, self.line_weight(line_idx));
        for i in 1..=k {
            self.bctree.insert(line_idx + i, self.line_weight(line_idx + i));
        }

        self.marks.apply_edit(pos, pos, new_end);

        if record && self.opts.enable_history {
            self.history.push(Change {
                start: pos,
                old_end: pos,
                new_end,
                old_text: Vec::new(),
                new_text: text.to_vec(),
            });
        }

        self.edits.record(InputEdit {
            start_byte,
            old_end_byte: start_byte,
            new_end_byte: start_byte + codec::utf8_len_of(text),
            start_position: start_point,
            old_end_position: start_point,
            new_end_position: self.ts_point(new_end),
        });

        self.bump_version();
        new_end
    }

    fn remove_impl(&mut self, start: Pos, end: Pos, record: bool) {
        self.assert_owner();
        debug_assert!(self.is_valid(start) && self.is_valid(end));
        if start == end {
            return;
        }

        let start_byte = self.pos_to_byte(start);
        let old_end_byte = self.pos_to_byte(end);
        let start_point = self.ts_point(start);
        let old_end_point = self.ts_point(end);
        let old_text = if record && self.opts.enable_history {
            self.read(start, end)
        } else {
            Vec::new()
        };

        let (sl, sc) = (start.line as usize, start.col as usize);
        let (el, ec) = (end.line as usize, end.col as usize);

        if sl == el {
            self.lines[sl].drain(sc..ec);
        } else {
            let tail = self.lines[el].split_off(ec);
            self.lines[sl].truncate(sc);
            self.lines[sl].extend_from_slice(&tail);
            self.lines.drain(sl + 1..=el);
            for _ in sl + 1..=el {
                self.bctree.remove(sl + 1);
            }
        }
        self.bctree.set(sl, self.line_weight(sl));

        self.marks.apply_edit(start, end, start);

        if record && self.opts.enable_history {
            self.history.push(Change {
                start,
                old_end: end,
                new_end: start,
                old_text,
                new_text: Vec::new(),
            });
        }

        self.edits.record(InputEdit {
            start_byte,
            old_end_byte,
            new_end_byte: start_byte,
            start_position: start_point,
            old_end_position: old_end_point,
            new_end_position: start_point,
        });

        self.bump_version();
    }

    /// UTF-8 byte count of line `i`, counting its newline unless it is
    /// the final line
    fn line_weight(&self, i: usize) -> usize {
        codec::utf8_len_of(&self.lines[i]) + usize::from(i + 1 < self.lines.len())
    }

    fn bump_version(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    fn assert_owner(&self) {
        if self.opts.main_thread_only {
            debug_assert_eq!(
                thread::current().id(),
                self.owner,
                "buffer mutated off its owning thread"
            );
        }
    }

    // --- reading ---

    /// Codepoints in `[start, end)`, newlines included
    #[must_use]
    pub fn read(&self, start: Pos, end: Pos) -> Vec<char> {
        let start = self.fix_pos(start);
        let end = self.fix_pos(end);
        if end <= start {
            return Vec::new();
        }
        let (sl, sc) = (start.line as usize, start.col as usize);
        let (el, ec) = (end.line as usize, end.col as usize);
        if sl == el {
            return self.lines[sl][sc..ec].to_vec();
        }
        let mut out = Vec::with_capacity(self.distance(start, end));
        out.extend_from_slice(&self.lines[sl][sc..]);
        out.push('\n');
        for line in &self.lines[sl + 1..el] {
            out.extend_from_slice(line);
            out.push('\n');
        }
        out.extend_from_slice(&self.lines[el][..ec]);
        out
    }

    /// `read` capped at `limit` codepoints; also reports where the read
    /// actually stopped
    #[must_use]
    pub fn read_limited(&self, start: Pos, end: Pos, limit: usize) -> (Vec<char>, Pos) {
        let start = self.fix_pos(start);
        let end = self.fix_pos(end);
        if end <= start || limit == 0 {
            return (Vec::new(), start);
        }
        if self.distance(start, end) <= limit {
            return (self.read(start, end), end);
        }
        let mut out = Vec::with_capacity(limit);
        let mut pos = start;
        let mut it = self.iter(start);
        while out.len() < limit && pos < end {
            match it.next() {
                Some(c) => {
                    out.push(c);
                    pos = it.pos();
                }
                None => break,
            }
        }
        (out, pos)
    }

    /// `read` as a `String`
    #[must_use]
    pub fn text(&self, start: Pos, end: Pos) -> String {
        self.read(start, end).into_iter().collect()
    }

    /// Codepoints in `[a, b)`, counting one per newline
    #[must_use]
    pub fn distance(&self, a: Pos, b: Pos) -> usize {
        let a = self.fix_pos(a);
        let b = self.fix_pos(b);
        if b <= a {
            return 0;
        }
        if a.line == b.line {
            return (b.col - a.col) as usize;
        }
        let mut n = self.lines[a.line as usize].len() - a.col as usize + 1;
        for line in &self.lines[a.line as usize + 1..b.line as usize] {
            n += line.len() + 1;
        }
        n + b.col as usize
    }

    // --- position stepping ---

    /// One codepoint forward, crossing line ends; saturates at the end
    #[must_use]
    pub fn inc_pos(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        let line = pos.line as usize;
        if (pos.col as usize) < self.lines[line].len() {
            Pos::new(pos.line, pos.col + 1)
        } else if line + 1 < self.lines.len() {
            pos.next_line_start()
        } else {
            pos
        }
    }

    /// One codepoint back; saturates at the origin
    #[must_use]
    pub fn dec_pos(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        if pos.col > 0 {
            Pos::new(pos.line, pos.col - 1)
        } else if pos.line > 0 {
            let line = pos.line as usize - 1;
            Pos::new(pos.line - 1, self.lines[line].len() as u32)
        } else {
            pos
        }
    }

    /// One grapheme cluster forward
    #[must_use]
    pub fn inc_grapheme(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        let line = &self.lines[pos.line as usize];
        if (pos.col as usize) < line.len() {
            Pos::new(pos.line, codec::next_cluster(line, pos.col as usize) as u32)
        } else if (pos.line as usize) + 1 < self.lines.len() {
            pos.next_line_start()
        } else {
            pos
        }
    }

    /// One grapheme cluster back
    #[must_use]
    pub fn dec_grapheme(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        if pos.col > 0 {
            let line = &self.lines[pos.line as usize];
            Pos::new(pos.line, codec::prev_cluster(line, pos.col as usize) as u32)
        } else if pos.line > 0 {
            let line = pos.line as usize - 1;
            Pos::new(pos.line - 1, self.lines[line].len() as u32)
        } else {
            pos
        }
    }

    // --- history ---

    /// Undo one entry. Returns the position where the undone edit began,
    /// or `None` when history is exhausted.
    pub fn undo(&mut self) -> Option<Pos> {
        self.assert_owner();
        let entry = self.history.undo()?.clone();
        for change in entry.iter().rev() {
            self.remove_impl(change.start, change.new_end, false);
            if !change.old_text.is_empty() {
                self.insert_impl(change.start, &change.old_text, false);
            }
        }
        entry.first().map(|c| c.start)
    }

    /// Redo one undone entry. Returns the end of the re-applied content,
    /// or `None` when there is nothing to redo.
    pub fn redo(&mut self) -> Option<Pos> {
        self.assert_owner();
        let entry = self.history.redo()?.clone();
        for change in entry.iter() {
            self.remove_impl(change.start, change.old_end, false);
            if !change.new_text.is_empty() {
                self.insert_impl(change.start, &change.new_text, false);
            }
        }
        entry.last().map(|c| c.new_end)
    }

    /// Group subsequent edits into one undo step and one parser flush.
    /// Nested scopes are reference-counted.
    pub fn begin_batch(&mut self) {
        self.history.begin_batch();
        self.edits.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
        self.edits.end_batch();
    }

    /// RAII batch scope; closes on drop
    pub fn batch(&mut self) -> BatchScope<'_> {
        self.begin_batch();
        BatchScope { buf: self }
    }

    /// Break coalescing: the next edit starts a fresh history entry.
    /// The editor calls this on cursor motion.
    pub fn force_next_entry(&mut self) {
        self.history.force_next_entry();
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- marks ---

    pub fn insert_mark(&mut self, kind: MarkKind, pos: Pos) -> Mark {
        let pos = self.fix_pos(pos);
        self.marks.insert_mark(kind, pos)
    }

    pub fn delete_mark(&mut self, mark: Mark) {
        self.marks.delete_mark(mark);
    }

    #[must_use]
    pub fn mark_pos(&self, mark: Mark) -> Option<Pos> {
        self.marks.pos_of(mark)
    }

    #[must_use]
    pub fn mark_valid(&self, mark: Mark) -> bool {
        self.marks.is_valid(mark)
    }

    /// Read access to the mark tree for consumers filtering by range/kind
    #[must_use]
    pub fn marks(&self) -> &MarkTree {
        &self.marks
    }

    // --- parser bridge ---

    /// Drain the flushed parser edit records
    pub fn take_pending_edits(&mut self) -> Vec<InputEdit> {
        self.edits.take()
    }

    #[must_use]
    pub fn has_pending_edits(&self) -> bool {
        self.edits.has_pending()
    }

    // --- lifecycle / I/O ---

    /// Replace the whole contents from UTF-8 bytes. History is cleared.
    /// On malformed input the buffer is left empty and the error returned.
    pub fn load_utf8(&mut self, bytes: &[u8]) -> Result<()> {
        self.assert_owner();
        let decoded = codec::decode_utf8(bytes);
        self.clear();
        let chars = decoded?;
        if !chars.is_empty() {
            self.insert_impl(Pos::ZERO, &chars, false);
        }
        self.history.clear();
        self.dirty = false;
        Ok(())
    }

    /// Stream the contents as UTF-8. Line separators are written as-is;
    /// no trailing newline is invented.
    pub fn save_utf8(&mut self, sink: &mut impl Write) -> Result<()> {
        let mut buf = Vec::new();
        for (i, line) in self.lines.iter().enumerate() {
            buf.clear();
            codec::encode_utf8(line, &mut buf);
            sink.write_all(&buf)?;
            if i + 1 < self.lines.len() {
                sink.write_all(b"\n")?;
            }
        }
        self.dirty = false;
        Ok(())
    }

    /// Verify that the byte-count tree matches the line table and the
    /// mark tree is structurally sound; panics on violation
    pub fn check_invariants(&self) {
        assert!(!self.lines.is_empty(), "buffer lost its last line");
        assert_eq!(self.bctree.len(), self.lines.len(), "line/treap count skew");
        let values = self.bctree.values();
        for (i, &v) in values.iter().enumerate() {
            assert_eq!(v, self.line_weight(i), "stale byte count for line {}", i);
        }
        self.bctree.check_aggregates();
        self.marks.check_integrity();
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new(BufferOptions::default())
    }
}

impl Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            for &c in line {
                write!(f, "{}", c)?;
            }
            if i + 1 < self.lines.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Groups every mutation made while it lives into one undo entry and one
/// parser flush
pub struct BatchScope<'a> {
    buf: &'a mut Buffer,
}

impl std::ops::Deref for BatchScope<'_> {
    type Target = Buffer;

    fn deref(&self) -> &Buffer {
        self.buf
    }
}

impl std::ops::DerefMut for BatchScope<'_> {
    fn deref_mut(&mut self) -> &mut Buffer {
        self.buf
    }
}

impl Drop for BatchScope<'_> {
    fn drop(&mut self) {
        self.buf.end_batch();
    }
}



#[cfg(test)]
#[path = "iterator_tests.rs"]
mod iterator_tests;
