//! Read-only cursor over buffer contents
//!
//! Steps by codepoint or by grapheme cluster, in both directions, with
//! the newline between lines presented as a real `'\n'`. The iterator can
//! also carry a *fake end*: it reports end-of-file at a synthetic
//! position short of the real end and may then present a pre-configured
//! suffix, so the incremental parser reads a consistent snapshot while
//! the user is mid-edit.

use crate::codec::{self, Grapheme};
use crate::position::Pos;

use super::Buffer;

/// Cursor into a buffer. Cheap to copy; holds only a position.
#[derive(Clone, Copy)]
pub struct BufferIter<'a> {
    buf: &'a Buffer,
    pos: Pos,
    fake_end: Option<Pos>,
    /// Suffix presented once the fake end is reached
    append: &'a [char],
    /// Codepoints of the suffix already consumed
    append_off: usize,
}

impl Buffer {
    /// Cursor positioned at `pos` (clamped)
    #[must_use]
    pub fn iter(&self, pos: Pos) -> BufferIter<'_> {
        BufferIter {
            buf: self,
            pos: self.fix_pos(pos),
            fake_end: None,
            append: &[],
            append_off: 0,
        }
    }

    /// Cursor that reports eof at `fake_end` and then yields `append`.
    /// Handed to the parser adapter so a reparse sees a stable snapshot.
    #[must_use]
    pub fn iter_with_fake_end<'a>(
        &'a self,
        pos: Pos,
        fake_end: Pos,
        append: &'a [char],
    ) -> BufferIter<'a> {
        let fake_end = self.fix_pos(fake_end);
        BufferIter {
            buf: self,
            pos: self.fix_pos(pos).min(fake_end),
            fake_end: Some(fake_end),
            append,
            append_off: 0,
        }
    }
}

impl<'a> BufferIter<'a> {
    /// Current position. While the appended suffix is being consumed this
    /// stays at the fake end.
    #[must_use]
    pub fn pos(&self) -> Pos {
        self.pos
    }

    fn limit(&self) -> Pos {
        self.fake_end.unwrap_or_else(|| self.buf.end_pos())
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        self.pos >= self.limit() && self.append_off >= self.append.len()
    }

    #[must_use]
    pub fn bof(&self) -> bool {
        self.pos == Pos::ZERO && self.append_off == 0
    }

    #[must_use]
    pub fn bol(&self) -> bool {
        self.pos.col == 0
    }

    #[must_use]
    pub fn eol(&self) -> bool {
        self.eof() || self.peek() == Some('\n')
    }

    fn char_at(&self, pos: Pos) -> char {
        let line = self.buf.line(pos.line as usize);
        if (pos.col as usize) < line.len() {
            line[pos.col as usize]
        } else {
            '\n'
        }
    }

    /// Codepoint under the cursor without advancing
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        if self.pos < self.limit() {
            Some(self.char_at(self.pos))
        } else {
            self.append.get(self.append_off).copied()
        }
    }

    /// Codepoint under the cursor; advances one
    pub fn next(&mut self) -> Option<char> {
        if self.pos < self.limit() {
            let c = self.char_at(self.pos);
            self.pos = self.buf.inc_pos(self.pos);
            Some(c)
        } else if self.append_off < self.append.len() {
            let c = self.append[self.append_off];
            self.append_off += 1;
            Some(c)
        } else {
            None
        }
    }

    /// Step back one; returns the codepoint now under the cursor
    pub fn prev(&mut self) -> Option<char> {
        if self.append_off > 0 {
            self.append_off -= 1;
            Some(self.append[self.append_off])
        } else if self.pos == Pos::ZERO {
            None
        } else {
            self.pos = self.buf.dec_pos(self.pos);
            Some(self.char_at(self.pos))
        }
    }

    /// Grapheme cluster under the cursor without advancing
    #[must_use]
    pub fn gr_peek(&self) -> Option<Grapheme> {
        let mut probe = *self;
        probe.gr_next()
    }

    /// Grapheme cluster under the cursor; advances past it.
    /// The line separator is its own cluster; the appended suffix is
    /// served one codepoint at a time.
    pub fn gr_next(&mut self) -> Option<Grapheme> {
        if self.pos >= self.limit() {
            return self.next().map(|c| vec![c]);
        }
        let line = self.buf.line(self.pos.line as usize);
        let col = self.pos.col as usize;
        if col >= line.len() {
            self.next();
            return Some(vec!['\n']);
        }
        let mut end = codec::next_cluster(line, col);
        let limit = self.limit();
        if limit.line == self.pos.line {
            end = end.min(limit.col as usize);
        }
        let cluster: Grapheme = line[col..end].to_vec();
        self.pos = Pos::new(self.pos.line, end as u32);
        Some(cluster)
    }

    /// Step back one grapheme cluster; returns it
    pub fn gr_prev(&mut self) -> Option<Grapheme> {
        if self.append_off > 0 {
            return self.prev().map(|c| vec![c]);
        }
        if self.pos == Pos::ZERO {
            return None;
        }
        if self.pos.col == 0 {
            self.prev();
            return Some(vec!['\n']);
        }
        let line = self.buf.line(self.pos.line as usize);
        let col = self.pos.col as usize;
        let start = codec::prev_cluster(line, col);
        let cluster: Grapheme = line[start..col].to_vec();
        self.pos = Pos::new(self.pos.line, start as u32);
        Some(cluster)
    }

    /// Encode forward from the cursor into `out`, stopping before `max`
    /// bytes would be exceeded. Parser adapters call this to serve
    /// bounded chunks.
    pub fn fill_utf8(&mut self, out: &mut Vec<u8>, max: usize) {
        while let Some(c) = self.peek() {
            if out.len() + c.len_utf8() > max {
                break;
            }
            self.next();
            codec::encode_char(c, out);
        }
    }
}

/// Cursor over a read-only UTF-8 region (a memory-mapped file that is not
/// open in any buffer). Offsets are byte offsets into the region; the
/// region must be valid UTF-8, as produced by `codec::decode_utf8`
/// validation at open time.
#[derive(Clone, Copy)]
pub struct MappedIter<'a> {
    text: &'a str,
    offset: usize,
}

impl<'a> MappedIter<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self { text, offset: 0 }
    }

    #[must_use]
    pub fn byte_offset(&self) -> usize {
        self.offset
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        self.offset >= self.text.len()
    }

    #[must_use]
    pub fn bof(&self) -> bool {
        self.offset == 0
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.text[self.offset..].chars().next()
    }

    pub fn next(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.offset += c.len_utf8();
        Some(c)
    }

    pub fn prev(&mut self) -> Option<char> {
        let c = self.text[..self.offset].chars().next_back()?;
        self.offset -= c.len_utf8();
        Some(c)
    }
}

/// Read cursor for consumers that stream either live buffers or
/// memory-mapped read-only files through one interface. The buffer
/// variant is the primary; the mapped variant only serves read-only
/// loads.
#[derive(Clone, Copy)]
pub enum TextIter<'a> {
    Buffer(BufferIter<'a>),
    Mapped(MappedIter<'a>),
}

impl<'a> TextIter<'a> {
    #[must_use]
    pub fn peek(&self) -> Option<char> {
        match self {
            Self::Buffer(it) => it.peek(),
            Self::Mapped(it) => it.peek(),
        }
    }

    pub fn next(&mut self) -> Option<char> {
        match self {
            Self::Buffer(it) => it.next(),
            Self::Mapped(it) => it.next(),
        }
    }

    pub fn prev(&mut self) -> Option<char> {
        match self {
            Self::Buffer(it) => it.prev(),
            Self::Mapped(it) => it.prev(),
        }
    }

    #[must_use]
    pub fn eof(&self) -> bool {
        match self {
            Self::Buffer(it) => it.eof(),
            Self::Mapped(it) => it.eof(),
        }
    }

    #[must_use]
    pub fn bof(&self) -> bool {
        match self {
            Self::Buffer(it) => it.bof(),
            Self::Mapped(it) => it.bof(),
        }
    }

    pub fn fill_utf8(&mut self, out: &mut Vec<u8>, max: usize) {
        while let Some(c) = self.peek() {
            if out.len() + c.len_utf8() > max {
                break;
            }
            self.next();
            codec::encode_char(c, out);
        }
    }
}

impl<'a> From<BufferIter<'a>> for TextIter<'a> {
    fn from(it: BufferIter<'a>) -> Self {
        Self::Buffer(it)
    }
}

impl<'a> From<MappedIter<'a>> for TextIter<'a> {
    fn from(it: MappedIter<'a>) -> Self {
        Self::Mapped(it)
    }
}
