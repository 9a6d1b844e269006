use super::*;

fn pos(line: u32, col: u32) -> Pos {
    Pos::new(line, col)
}

#[test]
fn test_insert_and_position() {
    let mut tree = MarkTree::new();
    let m = tree.insert_mark(MarkKind::Bookmark, pos(2, 3));
    assert_eq!(tree.pos_of(m), Some(pos(2, 3)));
    assert_eq!(tree.kind_of(m), Some(MarkKind::Bookmark));
    assert!(tree.is_valid(m));
    assert_eq!(tree.len(), 1);
}

#[test]
fn test_marks_at_same_position_share_a_node() {
    let mut tree = MarkTree::new();
    let a = tree.insert_mark(MarkKind::SearchResult, pos(1, 1));
    let b = tree.insert_mark(MarkKind::BuildError, pos(1, 1));
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.pos_of(a), Some(pos(1, 1)));
    assert_eq!(tree.pos_of(b), Some(pos(1, 1)));
}

#[test]
fn test_delete_mark_invalidates_handle() {
    let mut tree = MarkTree::new();
    let m = tree.insert_mark(MarkKind::Test, pos(0, 0));
    tree.delete_mark(m);
    assert!(!tree.is_valid(m));
    assert_eq!(tree.pos_of(m), None);
    assert_eq!(tree.kind_of(m), None);
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.node_count(), 0);
    // deleting again is a no-op
    tree.delete_mark(m);
}

#[test]
fn test_recycled_slot_does_not_alias_old_handle() {
    let mut tree = MarkTree::new();
    let old = tree.insert_mark(MarkKind::Test, pos(0, 0));
    tree.delete_mark(old);
    let new = tree.insert_mark(MarkKind::Bookmark, pos(5, 5));
    assert!(!tree.is_valid(old));
    assert_eq!(tree.pos_of(old), None);
    assert_eq!(tree.pos_of(new), Some(pos(5, 5)));
}

#[test]
fn test_delete_middle_mark_keeps_chain() {
    let mut tree = MarkTree::new();
    let a = tree.insert_mark(MarkKind::Test, pos(1, 1));
    let b = tree.insert_mark(MarkKind::Test, pos(1, 1));
    let c = tree.insert_mark(MarkKind::Test, pos(1, 1));
    tree.delete_mark(b);
    assert!(tree.is_valid(a) && tree.is_valid(c));
    assert_eq!(tree.len(), 2);
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn test_insert_before_edit_unchanged() {
    let mut tree = MarkTree::new();
    let before = tree.insert_mark(MarkKind::Bookmark, pos(0, 1));
    let at = tree.insert_mark(MarkKind::Bookmark, pos(0, 2));
    tree.apply_edit(pos(0, 2), pos(0, 2), pos(1, 1));
    assert_eq!(tree.pos_of(before), Some(pos(0, 1)));
    // mark at the insertion point sticks to the left edge
    assert_eq!(tree.pos_of(at), Some(pos(0, 2)));
}

#[test]
fn test_insert_across_newline_shifts_later_marks() {
    // S1: "abc\ndef", insert "X\nY" at (0,2)
    let mut tree = MarkTree::new();
    let next_line = tree.insert_mark(MarkKind::Bookmark, pos(1, 0));
    let same_line_before = tree.insert_mark(MarkKind::Bookmark, pos(0, 1));
    let same_line_after = tree.insert_mark(MarkKind::Bookmark, pos(0, 3));
    tree.apply_edit(pos(0, 2), pos(0, 2), pos(1, 1));
    assert_eq!(tree.pos_of(next_line), Some(pos(2, 0)));
    assert_eq!(tree.pos_of(same_line_before), Some(pos(0, 1)));
    // was one past the insertion point on the same line
    assert_eq!(tree.pos_of(same_line_after), Some(pos(1, 2)));
}

#[test]
fn test_remove_collapses_interior_marks() {
    // S2: "ab\ncd\nef", remove (0,1)..(2,1)
    let mut tree = MarkTree::new();
    let inside_a = tree.insert_mark(MarkKind::SearchResult, pos(1, 0));
    let inside_b = tree.insert_mark(MarkKind::SearchResult, pos(1, 2));
    let at_end = tree.insert_mark(MarkKind::SearchResult, pos(2, 1));
    let past_end = tree.insert_mark(MarkKind::SearchResult, pos(2, 2));
    let at_start = tree.insert_mark(MarkKind::SearchResult, pos(0, 1));
    tree.apply_edit(pos(0, 1), pos(2, 1), pos(0, 1));
    assert_eq!(tree.pos_of(inside_a), Some(pos(0, 1)));
    assert_eq!(tree.pos_of(inside_b), Some(pos(0, 1)));
    assert_eq!(tree.pos_of(at_end), Some(pos(0, 1)));
    assert_eq!(tree.pos_of(past_end), Some(pos(0, 2)));
    assert_eq!(tree.pos_of(at_start), Some(pos(0, 1)));
    assert_eq!(tree.len(), 5);
    // all five marks now share the single node at (0,1) or its neighbor
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn test_marks_never_dropped_by_edits() {
    let mut tree = MarkTree::new();
    let mut marks = Vec::new();
    for line in 0..20 {
        for col in 0..5 {
            marks.push(tree.insert_mark(MarkKind::Test, pos(line, col)));
        }
    }
    tree.apply_edit(pos(2, 1), pos(17, 3), pos(2, 1));
    for m in &marks {
        assert!(tree.is_valid(*m));
        assert!(tree.pos_of(*m).is_some());
    }
    assert_eq!(tree.len(), 100);
}

#[test]
fn test_marks_between_filters_range() {
    let mut tree = MarkTree::new();
    tree.insert_mark(MarkKind::Test, pos(0, 0));
    let b = tree.insert_mark(MarkKind::Test, pos(1, 0));
    let c = tree.insert_mark(MarkKind::Test, pos(1, 5));
    tree.insert_mark(MarkKind::Test, pos(3, 0));
    let found = tree.marks_between(pos(1, 0), pos(3, 0));
    assert_eq!(found.len(), 2);
    assert!(found.contains(&b) && found.contains(&c));
}

#[test]
fn test_rebalance_under_ascending_inserts() {
    // S6: 1000 marks at strictly increasing positions
    let mut tree = MarkTree::new();
    let mut marks = Vec::new();
    for i in 0..1000u32 {
        marks.push(tree.insert_mark(MarkKind::Test, pos(i / 10, i % 10)));
    }
    tree.check_integrity();
    let bound = 1.44 * (1002f64).log2();
    assert!((tree.height() as f64) <= bound);

    for m in marks.iter().step_by(2) {
        tree.delete_mark(*m);
    }
    tree.check_integrity();
    assert_eq!(tree.len(), 500);
    let bound = 1.44 * (502f64).log2();
    assert!((tree.height() as f64) <= bound);
}

#[test]
fn test_rebalance_under_descending_inserts() {
    let mut tree = MarkTree::new();
    for i in (0..500u32).rev() {
        tree.insert_mark(MarkKind::Test, pos(i, 0));
    }
    tree.check_integrity();
    assert_eq!(tree.node_count(), 500);
}

#[test]
fn test_ordering_preserved_across_edits() {
    let mut tree = MarkTree::new();
    for i in 0..50u32 {
        tree.insert_mark(MarkKind::Test, pos(i, i % 7));
    }
    tree.apply_edit(pos(10, 2), pos(30, 4), pos(12, 0));
    let positions = tree.positions();
    for w in positions.windows(2) {
        assert!(w[0] < w[1]);
    }
    tree.check_integrity();
}

#[test]
fn test_pure_insert_then_delete_round_trip() {
    let mut tree = MarkTree::new();
    let m = tree.insert_mark(MarkKind::History, pos(4, 2));
    // insert two lines at (1,0), then remove them again
    tree.apply_edit(pos(1, 0), pos(1, 0), pos(3, 0));
    assert_eq!(tree.pos_of(m), Some(pos(6, 2)));
    tree.apply_edit(pos(1, 0), pos(3, 0), pos(1, 0));
    assert_eq!(tree.pos_of(m), Some(pos(4, 2)));
}

#[test]
fn test_collapse_merges_chains_onto_one_node() {
    let mut tree = MarkTree::new();
    for col in 1..6 {
        tree.insert_mark(MarkKind::Test, pos(0, col));
    }
    assert_eq!(tree.node_count(), 5);
    tree.apply_edit(pos(0, 0), pos(0, 6), pos(0, 0));
    assert_eq!(tree.node_count(), 1);
    assert!(tree.node_at(pos(0, 0)));
    assert_eq!(tree.len(), 5);
}
