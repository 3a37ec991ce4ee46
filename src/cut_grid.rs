//! A plane partitioned by vertical and horizontal cut lines.
//!
//! The grid starts as one cell covering everything from the origin to
//! infinity. Writing a rectangle inserts cuts at its edges, splitting the
//! cells it crosses, and then overwrites the cells inside it. Every cell
//! always holds a value; a split copies the value into both halves.

use std::collections::BTreeSet;
use std::ops::{ControlFlow, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Cuts along x, splitting columns.
    Vertical,
    /// Cuts along y, splitting rows.
    Horizontal,
}

/// Extent of a write along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    Len(u32),
    /// Runs to the end of the axis, including the unbounded last cell.
    Open,
}

impl Span {
    fn is_empty(self) -> bool {
        self == Span::Len(0)
    }
}

impl From<u32> for Span {
    fn from(len: u32) -> Self {
        Span::Len(len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CutGrid<T> {
    // Both strictly increasing, first element always 0.
    vertical_cuts: Vec<u32>,
    horizontal_cuts: Vec<u32>,
    // cells[x_index][y_index]
    cells: Vec<Vec<T>>,
}

impl<T: Clone> CutGrid<T> {
    pub fn new(fill: T) -> Self {
        Self {
            vertical_cuts: vec![0],
            horizontal_cuts: vec![0],
            cells: vec![vec![fill]],
        }
    }

    pub fn vertical_cuts(&self) -> &[u32] {
        &self.vertical_cuts
    }

    pub fn horizontal_cuts(&self) -> &[u32] {
        &self.horizontal_cuts
    }

    /// Dimensions of the cell matrix as `(columns, rows)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.cells.len(), self.cells[0].len())
    }

    /// Returns the index of the cut at `at` on `axis`, inserting it first if
    /// it is missing. Inserting splits the column (or row) containing `at`.
    pub fn ensure_cut(&mut self, axis: Axis, at: u32) -> usize {
        let cuts = match axis {
            Axis::Vertical => &mut self.vertical_cuts,
            Axis::Horizontal => &mut self.horizontal_cuts,
        };
        let index = match cuts.binary_search(&at) {
            Ok(index) => return index,
            Err(index) => index,
        };
        // cuts[0] == 0 <= at, so the new cut always has a left/upper neighbour.
        cuts.insert(index, at);
        match axis {
            Axis::Vertical => {
                let column = self.cells[index - 1].clone();
                self.cells.insert(index, column);
            }
            Axis::Horizontal => {
                for column in &mut self.cells {
                    let value = column[index - 1].clone();
                    column.insert(index, value);
                }
            }
        }
        index
    }

    /// Overwrites `[x, x + width) × [y, y + height)` with `value`.
    /// A zero-length span on either axis makes this a no-op. An edge past
    /// `u32::MAX` is treated as [`Span::Open`].
    pub fn set_rectangle(
        &mut self,
        x: u32,
        y: u32,
        width: impl Into<Span>,
        height: impl Into<Span>,
        value: T,
    ) {
        let (width, height) = (width.into(), height.into());
        if width.is_empty() || height.is_empty() {
            return;
        }
        let x_start = self.ensure_cut(Axis::Vertical, x);
        let x_end = self.end_index(Axis::Vertical, x, width);
        let y_start = self.ensure_cut(Axis::Horizontal, y);
        let y_end = self.end_index(Axis::Horizontal, y, height);
        for column in &mut self.cells[x_start..x_end] {
            column[y_start..y_end].fill(value.clone());
        }
    }

    /// Cut index one past the last cell covered by `span` from `start`.
    fn end_index(&mut self, axis: Axis, start: u32, span: Span) -> usize {
        let end = match span {
            Span::Len(len) => start.checked_add(len),
            Span::Open => None,
        };
        match (end, axis) {
            (Some(end), _) => self.ensure_cut(axis, end),
            (None, Axis::Vertical) => self.vertical_cuts.len(),
            (None, Axis::Horizontal) => self.horizontal_cuts.len(),
        }
    }

    /// Collects the distinct keys of every cell overlapping
    /// `[x, x + width) × [y, y + height)`. Empty when either side is zero.
    pub fn get_rectangle<K, F>(
        &self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        key: F,
    ) -> BTreeSet<K>
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        let mut keys = BTreeSet::new();
        if width == 0 || height == 0 {
            return keys;
        }
        let columns = covering(&self.vertical_cuts, x, width);
        let rows = covering(&self.horizontal_cuts, y, height);
        for column in &self.cells[columns] {
            for cell in &column[rows.clone()] {
                keys.insert(key(cell));
            }
        }
        keys
    }

    pub fn get_value(&self, x: u32, y: u32) -> &T {
        &self.cells[floor_index(&self.vertical_cuts, x)][floor_index(&self.horizontal_cuts, y)]
    }

    /// Visits the top-left corner and value of every cell, column by column
    /// from the left, top to bottom within a column. Stops at the first
    /// `Break` and returns it.
    pub fn traverse<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(u32, u32, &T) -> ControlFlow<B>,
    {
        for (column, &x) in self.cells.iter().zip(&self.vertical_cuts) {
            for (cell, &y) in column.iter().zip(&self.horizontal_cuts) {
                if let ControlFlow::Break(b) = visit(x, y, cell) {
                    return ControlFlow::Break(b);
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Same as [`CutGrid::traverse`] with both axes descending.
    pub fn reverse_traverse<B, F>(&self, mut visit: F) -> ControlFlow<B>
    where
        F: FnMut(u32, u32, &T) -> ControlFlow<B>,
    {
        for (column, &x) in self.cells.iter().zip(&self.vertical_cuts).rev() {
            for (cell, &y) in column.iter().zip(&self.horizontal_cuts).rev() {
                if let ControlFlow::Break(b) = visit(x, y, cell) {
                    return ControlFlow::Break(b);
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Index of the last cut at or before `at`.
fn floor_index(cuts: &[u32], at: u32) -> usize {
    cuts.partition_point(|&cut| cut <= at) - 1
}

/// Cell indices overlapping `[start, start + len)`. An end past `u32::MAX`
/// covers through the last cell.
fn covering(cuts: &[u32], start: u32, len: u32) -> Range<usize> {
    let end = match start.checked_add(len) {
        Some(end) => cuts.partition_point(|&cut| cut < end),
        None => cuts.len(),
    };
    floor_index(cuts, start)..end
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn column(grid: &CutGrid<u32>, x: u32, rows: u32) -> Vec<u32> {
        (0..rows).map(|y| *grid.get_value(x, y)).collect()
    }

    #[test]
    fn test_new_grid_is_single_cell() {
        let grid = CutGrid::new('.');
        assert_eq!(grid.vertical_cuts(), &[0]);
        assert_eq!(grid.horizontal_cuts(), &[0]);
        assert_eq!(grid.shape(), (1, 1));
        assert_eq!(*grid.get_value(1000, 1000), '.');
    }

    #[test]
    fn test_overwrites_apply_in_call_order() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(0, 3, 1, 4, 7);
        assert_eq!(column(&grid, 0, 10), [0, 0, 0, 7, 7, 7, 7, 0, 0, 0]);

        grid.set_rectangle(0, 3, 1, 5, 9);
        assert_eq!(column(&grid, 0, 10), [0, 0, 0, 9, 9, 9, 9, 9, 0, 0]);

        grid.set_rectangle(0, 4, 5, 1, 4);
        assert_eq!(column(&grid, 0, 10), [0, 0, 0, 9, 4, 9, 9, 9, 0, 0]);
        assert_eq!(column(&grid, 4, 6), [0, 0, 0, 0, 4, 0]);
        assert_eq!(column(&grid, 5, 6), [0, 0, 0, 0, 0, 0]);
        assert_eq!(grid.vertical_cuts(), &[0, 1, 5]);
        assert_eq!(grid.horizontal_cuts(), &[0, 3, 4, 5, 7, 8]);
    }

    #[test]
    fn test_ensure_cut_twice_is_noop() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(2, 2, 3, 3, 1);
        let first = grid.ensure_cut(Axis::Vertical, 4);
        let snapshot = grid.clone();
        let second = grid.ensure_cut(Axis::Vertical, 4);
        assert_eq!(first, second);
        assert_eq!(grid, snapshot);

        let first = grid.ensure_cut(Axis::Horizontal, 1);
        let snapshot = grid.clone();
        assert_eq!(grid.ensure_cut(Axis::Horizontal, 1), first);
        assert_eq!(grid, snapshot);
    }

    #[test]
    fn test_split_keeps_values() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(0, 0, 4, 4, 5);
        grid.ensure_cut(Axis::Vertical, 2);
        grid.ensure_cut(Axis::Horizontal, 1);
        assert_eq!(grid.shape(), (3, 3));
        assert_eq!(grid.get_rectangle(0, 0, 4, 4, |v| *v), BTreeSet::from([5]));
        assert_eq!(*grid.get_value(4, 4), 0);
    }

    #[test]
    fn test_zero_size_is_noop() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(3, 3, 0, 2, 1);
        grid.set_rectangle(3, 3, 2, 0, 1);
        assert_eq!(grid.shape(), (1, 1));
        assert!(grid.get_rectangle(0, 0, 0, 5, |v| *v).is_empty());
        assert!(grid.get_rectangle(0, 0, 5, 0, |v| *v).is_empty());
    }

    #[test]
    fn test_open_span_reaches_infinity() {
        let mut grid = CutGrid::new('.');
        grid.set_rectangle(0, 5, Span::Open, Span::Open, 'X');
        assert_eq!(grid.vertical_cuts(), &[0]);
        assert_eq!(grid.horizontal_cuts(), &[0, 5]);
        assert_eq!(*grid.get_value(u32::MAX, u32::MAX), 'X');
        assert_eq!(*grid.get_value(9, 4), '.');
        assert_eq!(
            grid.get_rectangle(0, 3, 10, 4, |v| *v),
            BTreeSet::from(['.', 'X'])
        );
    }

    #[test]
    fn test_get_rectangle_between_cuts() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(0, 0, 10, 10, 1);
        grid.set_rectangle(4, 4, 2, 2, 2);
        // Query starts and ends between cuts: floor on the start, ceil on the end.
        assert_eq!(grid.get_rectangle(1, 1, 2, 2, |v| *v), BTreeSet::from([1]));
        assert_eq!(grid.get_rectangle(3, 3, 2, 2, |v| *v), BTreeSet::from([1, 2]));
        assert_eq!(grid.get_rectangle(5, 5, 10, 1, |v| *v), BTreeSet::from([0, 1, 2]));
    }

    #[test]
    fn test_traverse_order() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(1, 2, 1, 1, 1);
        let mut forward = Vec::new();
        let _ = grid.traverse(|x, y, _| {
            forward.push((x, y));
            ControlFlow::<()>::Continue(())
        });
        assert_eq!(
            forward,
            [(0, 0), (0, 2), (0, 3), (1, 0), (1, 2), (1, 3), (2, 0), (2, 2), (2, 3)]
        );

        let mut backward = Vec::new();
        let _ = grid.reverse_traverse(|x, y, _| {
            backward.push((x, y));
            ControlFlow::<()>::Continue(())
        });
        forward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn test_traverse_stops_on_break() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(1, 1, 1, 1, 7);
        let mut visited = 0;
        let found = grid.traverse(|x, y, v| {
            visited += 1;
            if *v == 7 {
                ControlFlow::Break((x, y))
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(found, ControlFlow::Break((1, 1)));
        assert_eq!(visited, 5);

        let found = grid.reverse_traverse(|x, y, v| {
            if *v == 7 {
                ControlFlow::Break((x, y))
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(found, ControlFlow::Break((1, 1)));
    }

    #[test]
    fn test_edges_past_u32_max_run_to_the_end() {
        let mut grid = CutGrid::new(0);
        grid.set_rectangle(u32::MAX, 0, 1, 1, 1);
        assert_eq!(grid.vertical_cuts(), &[0, u32::MAX]);
        assert_eq!(grid.horizontal_cuts(), &[0, 1]);
        assert_eq!(*grid.get_value(u32::MAX, 0), 1);
        assert_eq!(*grid.get_value(u32::MAX - 1, 0), 0);
        assert_eq!(grid.get_rectangle(u32::MAX, 0, 5, 1, |v| *v), BTreeSet::from([1]));

        grid.set_rectangle(10, u32::MAX - 2, 4, 10, 2);
        assert_eq!(*grid.get_value(12, u32::MAX), 2);
        assert_eq!(
            grid.get_rectangle(0, u32::MAX - 2, u32::MAX, u32::MAX, |v| *v),
            BTreeSet::from([0, 2])
        );
    }

    fn writes() -> impl Strategy<Value = Vec<(u32, u32, u32, u32, u8)>> {
        prop::collection::vec((0u32..20, 0u32..20, 1u32..8, 1u32..8, any::<u8>()), 1..12)
    }

    proptest! {
        #[test]
        fn cuts_track_distinct_edges(ops in writes()) {
            let mut grid = CutGrid::new(0u8);
            let mut xs = BTreeSet::from([0]);
            let mut ys = BTreeSet::from([0]);
            for &(x, y, w, h, v) in &ops {
                grid.set_rectangle(x, y, w, h, v);
                xs.extend([x, x + w]);
                ys.extend([y, y + h]);
            }
            let xs: Vec<u32> = xs.into_iter().collect();
            let ys: Vec<u32> = ys.into_iter().collect();
            prop_assert_eq!(grid.vertical_cuts(), xs.as_slice());
            prop_assert_eq!(grid.horizontal_cuts(), ys.as_slice());
            prop_assert_eq!(
                grid.shape(),
                (grid.vertical_cuts().len(), grid.horizontal_cuts().len())
            );
        }

        #[test]
        fn last_write_is_read_back(ops in writes()) {
            let mut grid = CutGrid::new(0u8);
            for &(x, y, w, h, v) in &ops {
                grid.set_rectangle(x, y, w, h, v);
                prop_assert_eq!(grid.get_rectangle(x, y, w, h, |c| *c), BTreeSet::from([v]));
            }
        }

        #[test]
        fn matches_dense_reference(ops in writes()) {
            let mut grid = CutGrid::new(0u8);
            let mut dense = vec![vec![0u8; 30]; 30];
            for &(x, y, w, h, v) in &ops {
                grid.set_rectangle(x, y, w, h, v);
                for column in &mut dense[x as usize..(x + w) as usize] {
                    column[y as usize..(y + h) as usize].fill(v);
                }
            }
            for (x, column) in dense.iter().enumerate() {
                for (y, &v) in column.iter().enumerate() {
                    prop_assert_eq!(*grid.get_value(x as u32, y as u32), v);
                }
            }
        }
    }
}
