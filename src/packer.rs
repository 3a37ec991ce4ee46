use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::ops::ControlFlow;
use std::time::Instant;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::cut_grid::{CutGrid, Span};
use crate::error::PackError;
use crate::types::{NamedRect, Packing, Placement, Position, Rect};

/// Index of a rectangle in the slice handed to [`insert_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RectId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cell {
    Empty,
    /// Below the height bound of the current attempt.
    Boundary,
    Occupied(RectId),
}

enum Footprint {
    Free,
    /// Blocked by the boundary and nothing else.
    Boundary,
    Blocked,
}

impl Footprint {
    fn classify(keys: &BTreeSet<Cell>) -> Self {
        if keys.iter().any(|k| matches!(k, Cell::Occupied(_))) {
            Footprint::Blocked
        } else if keys.contains(&Cell::Boundary) {
            Footprint::Boundary
        } else {
            Footprint::Free
        }
    }
}

/// Result of one greedy pass under a fixed height bound.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub height_bound: u32,
    pub grid: CutGrid<Cell>,
    pub positions: BTreeMap<RectId, Position>,
    /// Smallest overshoot `y + h - height_bound` over all corners rejected
    /// only by the boundary. `None` when no such corner was seen.
    pub min_delta_height: Option<u32>,
}

/// Places every rectangle, tallest first, at the first free corner in
/// column-major order within `[0, ∞) × [0, height_bound)`.
pub fn insert_all(rects: &[Rect], height_bound: u32) -> Attempt {
    let mut grid = CutGrid::new(Cell::Empty);
    let mut positions = BTreeMap::new();
    if rects.is_empty() {
        return Attempt {
            height_bound,
            grid,
            positions,
            min_delta_height: Some(0),
        };
    }

    let mut order: Vec<usize> = (0..rects.len()).collect();
    order.sort_by_key(|&i| Reverse(rects[i].h));

    grid.set_rectangle(0, height_bound, Span::Open, Span::Open, Cell::Boundary);

    let mut min_delta_height: Option<u32> = None;
    for index in order {
        let rect = rects[index];
        let found = grid.traverse(|x, y, cell| {
            // Corners inside another rectangle or past the bound are never candidates.
            if *cell != Cell::Empty {
                return ControlFlow::Continue(());
            }
            let keys = grid.get_rectangle(x, y, rect.w, rect.h, |c| *c);
            match Footprint::classify(&keys) {
                Footprint::Free => return ControlFlow::Break(Position::new(x, y)),
                Footprint::Boundary => {
                    let delta = y + rect.h - height_bound;
                    min_delta_height = Some(min_delta_height.map_or(delta, |m| m.min(delta)));
                }
                Footprint::Blocked => {}
            }
            ControlFlow::Continue(())
        });

        match found {
            ControlFlow::Break(pos) => {
                let id = RectId(index);
                grid.set_rectangle(pos.x, pos.y, rect.w, rect.h, Cell::Occupied(id));
                positions.insert(id, pos);
            }
            ControlFlow::Continue(()) => {
                tracing::warn!(index, %rect, height_bound, "no free corner for rectangle");
            }
        }
    }

    Attempt {
        height_bound,
        grid,
        positions,
        min_delta_height,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyColumn {
    /// Left edge of the column, which is also the width of the packing.
    pub x: u32,
    /// Height of the shortest rectangle in the rightmost occupied column.
    pub shortest_height: Option<u32>,
}

/// Scans columns right to left for the column just past the rightmost
/// rectangle. Returns `None` if the last (unbounded) column is occupied.
pub fn find_leftmost_empty_column(grid: &CutGrid<Cell>, rects: &[Rect]) -> Option<EmptyColumn> {
    let mut current: Option<u32> = None;
    let mut right_of_current: Option<u32> = None;
    // (column x, shortest height seen in it)
    let mut occupied: Option<(u32, u32)> = None;

    let _ = grid.reverse_traverse(|x, _, cell| {
        if let Some((column, _)) = occupied
            && column != x
        {
            return ControlFlow::Break(());
        }
        if current != Some(x) {
            right_of_current = current;
            current = Some(x);
        }
        if let Cell::Occupied(id) = *cell {
            let h = rects[id.0].h;
            occupied = Some(match occupied {
                Some((column, shortest)) => (column, shortest.min(h)),
                None => (x, h),
            });
        }
        ControlFlow::Continue(())
    });

    match occupied {
        None => Some(EmptyColumn {
            x: 0,
            shortest_height: None,
        }),
        Some((_, shortest)) => right_of_current.map(|x| EmptyColumn {
            x,
            shortest_height: Some(shortest),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Width reached the widest input rectangle.
    Converged,
    /// The last attempt produced no height increment worth trying.
    Exhausted,
    NoEmptyColumn,
    AttemptLimit,
    TimeLimit,
}

impl SearchOutcome {
    pub fn is_converged(self) -> bool {
        self == SearchOutcome::Converged
    }
}

impl std::fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SearchOutcome::Converged => "converged",
            SearchOutcome::Exhausted => "no further height increment",
            SearchOutcome::NoEmptyColumn => "no empty column found",
            SearchOutcome::AttemptLimit => "attempt limit reached",
            SearchOutcome::TimeLimit => "time limit reached",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttemptSummary {
    pub height_bound: u32,
    pub width: u32,
    pub min_delta_height: Option<u32>,
    pub shortest_height: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    pub outcome: SearchOutcome,
    /// Narrowest packing seen. Only `None` if the first attempt found no empty column.
    pub best: Option<Packing>,
    pub history: Vec<AttemptSummary>,
}

pub struct Packer {
    rects: Vec<NamedRect>,
    config: SearchConfig,
}

impl Packer {
    pub fn new(rects: Vec<NamedRect>, config: SearchConfig) -> Result<Self, PackError> {
        config.validate()?;

        let mut names = HashSet::new();
        let mut total_w: u32 = 0;
        let mut total_h: u32 = 0;
        for r in &rects {
            if r.rect.is_degenerate() {
                return Err(PackError::ZeroDimension {
                    name: r.name.clone(),
                });
            }
            if !names.insert(r.name.as_str()) {
                return Err(PackError::DuplicateName {
                    name: r.name.clone(),
                });
            }
            // Every coordinate the search produces is bounded by these sums.
            total_w = total_w.checked_add(r.rect.w).ok_or(PackError::TooLarge)?;
            total_h = total_h.checked_add(r.rect.h).ok_or(PackError::TooLarge)?;
        }

        Ok(Self { rects, config })
    }

    pub fn rects(&self) -> &[NamedRect] {
        &self.rects
    }

    /// Grows the height bound from the tallest rectangle until the packing
    /// is as narrow as the widest rectangle, or no increment is left.
    pub fn solve(&self) -> PackReport {
        let dims: Vec<Rect> = self.rects.iter().map(|r| r.rect).collect();
        let max_width = dims.iter().map(|r| r.w).max().unwrap_or(0);
        let mut height_bound = dims.iter().map(|r| r.h).max().unwrap_or(0);

        let started = Instant::now();
        let mut history: Vec<AttemptSummary> = Vec::new();
        let mut best: Option<Packing> = None;

        let outcome = loop {
            if history.len() >= self.config.max_attempts {
                break SearchOutcome::AttemptLimit;
            }
            if let Some(limit) = self.config.time_limit
                && started.elapsed() >= limit
            {
                break SearchOutcome::TimeLimit;
            }

            let attempt = insert_all(&dims, height_bound);
            let Some(column) = find_leftmost_empty_column(&attempt.grid, &dims) else {
                tracing::warn!(height_bound, "no empty column after packing attempt");
                break SearchOutcome::NoEmptyColumn;
            };
            tracing::debug!(
                height_bound,
                width = column.x,
                min_delta_height = ?attempt.min_delta_height,
                "packing attempt"
            );
            history.push(AttemptSummary {
                height_bound,
                width: column.x,
                min_delta_height: attempt.min_delta_height,
                shortest_height: column.shortest_height,
            });

            if best.as_ref().is_none_or(|b| column.x < b.width) {
                best = Some(self.to_packing(&attempt, column.x));
            }
            if best.as_ref().is_some_and(|b| b.width <= max_width) {
                break SearchOutcome::Converged;
            }
            match attempt.min_delta_height {
                Some(delta) if delta > 0 => height_bound += delta,
                _ => break SearchOutcome::Exhausted,
            }
        };

        tracing::info!(
            %outcome,
            attempts = history.len(),
            width = best.as_ref().map(|b| b.width),
            height = best.as_ref().map(|b| b.height),
            "packing search finished"
        );

        PackReport {
            outcome,
            best,
            history,
        }
    }

    fn to_packing(&self, attempt: &Attempt, width: u32) -> Packing {
        let placements: Vec<Placement> = self
            .rects
            .iter()
            .enumerate()
            .filter_map(|(i, r)| {
                attempt.positions.get(&RectId(i)).map(|pos| Placement {
                    name: r.name.clone(),
                    rect: r.rect,
                    x: pos.x,
                    y: pos.y,
                })
            })
            .collect();
        let height = placements.iter().map(|p| p.bottom()).max().unwrap_or(0);

        Packing {
            placements,
            width,
            height,
            height_bound: attempt.height_bound,
        }
    }
}

/// Validates `rects` and runs the height search.
pub fn pack(rects: Vec<NamedRect>, config: SearchConfig) -> Result<PackReport, PackError> {
    Ok(Packer::new(rects, config)?.solve())
}
