//! Conversions between the buffer's coordinate systems
//!
//! The canonical form is the codepoint `Pos`. Byte offsets index the
//! UTF-8 serialization, grapheme positions count extended clusters, and
//! visual columns expand tabs to the configured tab stop (every other
//! codepoint is one column wide). Each conversion costs O(log N) for the
//! line lookup plus a scan of one line.

use tree_sitter::Point;

use crate::codec;
use crate::position::Pos;

use super::Buffer;

impl Buffer {
    /// Byte offset of `pos` in the UTF-8 serialization
    #[must_use]
    pub fn pos_to_byte(&self, pos: Pos) -> usize {
        let pos = self.fix_pos(pos);
        self.bctree.sum_through(pos.line as usize)
            + self.line_col_to_byte(pos.line as usize, pos.col as usize)
    }

    /// Position of byte offset `off`; offsets at or past the end clamp to
    /// `end_pos`
    #[must_use]
    pub fn byte_to_pos(&self, off: usize) -> Pos {
        if off >= self.total_bytes() {
            return self.end_pos();
        }
        let (line, rem) = self.bctree.offset_to_line(off);
        Pos::new(line as u32, self.line_byte_to_col(line, rem) as u32)
    }

    /// `byte_to_pos` that reports overflow instead of clamping
    #[must_use]
    pub fn byte_to_pos_checked(&self, off: usize) -> Option<Pos> {
        if off > self.total_bytes() {
            None
        } else {
            Some(self.byte_to_pos(off))
        }
    }

    /// Codepoint position → (line, grapheme index)
    #[must_use]
    pub fn pos_to_grapheme(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        let line = &self.lines[pos.line as usize];
        Pos::new(pos.line, codec::col_to_cluster(line, pos.col as usize) as u32)
    }

    /// (line, grapheme index) → codepoint position
    #[must_use]
    pub fn grapheme_to_pos(&self, gpos: Pos) -> Pos {
        let line_idx = (gpos.line as usize).min(self.lines.len() - 1);
        let line = &self.lines[line_idx];
        Pos::new(
            line_idx as u32,
            codec::cluster_to_col(line, gpos.col as usize) as u32,
        )
    }

    /// Codepoint position → (line, visual column)
    #[must_use]
    pub fn pos_to_visual(&self, pos: Pos) -> Pos {
        let pos = self.fix_pos(pos);
        let line = &self.lines[pos.line as usize];
        let mut vcol = 0usize;
        for &c in &line[..pos.col as usize] {
            vcol += self.char_visual_width(c, vcol);
        }
        Pos::new(pos.line, vcol as u32)
    }

    /// (line, visual column) → codepoint position. A visual column inside
    /// a tab resolves to the tab itself.
    #[must_use]
    pub fn visual_to_pos(&self, vpos: Pos) -> Pos {
        let line_idx = (vpos.line as usize).min(self.lines.len() - 1);
        let line = &self.lines[line_idx];
        let target = vpos.col as usize;
        let mut vcol = 0usize;
        for (col, &c) in line.iter().enumerate() {
            if vcol >= target {
                return Pos::new(line_idx as u32, col as u32);
            }
            let w = self.char_visual_width(c, vcol);
            if target < vcol + w {
                return Pos::new(line_idx as u32, col as u32);
            }
            vcol += w;
        }
        Pos::new(line_idx as u32, line.len() as u32)
    }

    /// tree-sitter point for `pos`: row plus byte column
    #[must_use]
    pub fn ts_point(&self, pos: Pos) -> Point {
        let pos = self.fix_pos(pos);
        Point {
            row: pos.line as usize,
            column: self.line_col_to_byte(pos.line as usize, pos.col as usize),
        }
    }

    fn char_visual_width(&self, c: char, vcol: usize) -> usize {
        if c == '\t' {
            let tab = self.opts.tab_width.max(1);
            tab - (vcol % tab)
        } else {
            1
        }
    }

    fn line_col_to_byte(&self, line: usize, col: usize) -> usize {
        codec::utf8_len_of(&self.lines[line][..col])
    }

    /// Column containing in-line byte offset `off`; a mid-codepoint
    /// offset clamps to the codepoint's start
    fn line_byte_to_col(&self, line: usize, off: usize) -> usize {
        let mut acc = 0usize;
        for (col, &c) in self.lines[line].iter().enumerate() {
            let next = acc + codec::utf8_len(c);
            if off < next {
                return col;
            }
            acc = next;
        }
        self.lines[line].len()
    }
}
