//! Bounded local grid: the dense node domain.
//!
//! # Data layout
//!
//! Cells are stored row-major in one `Vec<Cell>`; `CellId(y * width + x)`
//! indexes it directly, which is what lets the path search use a dense
//! `Vec`-backed node store for grid regions.
//!
//! # Movement model
//!
//! - Orthogonal step length 1, diagonal √2 (8-connected grids only).
//! - Edge cost = step length × the *destination* cell's cost multiplier.
//! - Multipliers are ≥ 1, so octile (8-connected) or Manhattan
//!   (4-connected) distance is an admissible heuristic.
//! - A diagonal step is only allowed when both orthogonal cells it passes
//!   are traversable (no corner cutting).
//! - Blocked cells have no edges in or out.

use ai_core::{CellId, GridPos, SimRng, ZoneId};

use crate::{Graph, SpatialError, SpatialResult};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

/// Neighbourhood used for movement.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

/// Per-cell map data.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub traversable: bool,
    /// Movement cost multiplier for entering this cell (≥ 1).
    pub cost: f32,
}

impl Default for Cell {
    fn default() -> Self {
        Self { traversable: true, cost: 1.0 }
    }
}

// ── GridMetric ────────────────────────────────────────────────────────────────

/// The geometry of a grid without its cells: enough to turn `CellId`s back
/// into positions and estimate distances.  `Copy`, so destinations can hold
/// one without borrowing the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridMetric {
    pub width:        u32,
    pub connectivity: Connectivity,
}

impl GridMetric {
    #[inline]
    pub fn pos(&self, cell: CellId) -> GridPos {
        GridPos::new((cell.0 % self.width) as i32, (cell.0 / self.width) as i32)
    }

    /// Admissible lower bound on the travel cost between two cells.
    pub fn distance(&self, a: CellId, b: CellId) -> f32 {
        let (pa, pb) = (self.pos(a), self.pos(b));
        match self.connectivity {
            Connectivity::Four  => pa.manhattan(pb) as f32,
            Connectivity::Eight => pa.octile(pb),
        }
    }
}

// ── LocalGrid ─────────────────────────────────────────────────────────────────

/// One bounded map region in the grid domain.
#[derive(Clone, Debug)]
pub struct LocalGrid {
    zone:         ZoneId,
    width:        u32,
    height:       u32,
    connectivity: Connectivity,
    cells:        Vec<Cell>,
}

impl LocalGrid {
    /// An all-open grid of `width × height` cells belonging to `zone`.
    pub fn new(
        zone:         ZoneId,
        width:        u32,
        height:       u32,
        connectivity: Connectivity,
    ) -> SpatialResult<Self> {
        let len = (width as u64) * (height as u64);
        if width == 0 || height == 0 || len > u32::MAX as u64 || width > i32::MAX as u32 {
            return Err(SpatialError::InvalidDimensions { width, height });
        }
        Ok(Self {
            zone,
            width,
            height,
            connectivity,
            cells: vec![Cell::default(); len as usize],
        })
    }

    /// Parse an ASCII map: `#` is blocked, digits `1`–`9` set a cost
    /// multiplier, anything else is open ground with cost 1.  Rows are
    /// separated by newlines and must all have the same width.
    pub fn from_ascii(zone: ZoneId, map: &str, connectivity: Connectivity) -> SpatialResult<Self> {
        let rows: Vec<&str> = map.lines().map(str::trim_end).filter(|l| !l.is_empty()).collect();
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count() as u32);
        let mut grid = Self::new(zone, width, height, connectivity)?;
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as u32 != width {
                return Err(SpatialError::InvalidDimensions { width, height });
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = GridPos::new(x as i32, y as i32);
                match ch {
                    '#' => {
                        grid.set_traversable(pos, false)?;
                    }
                    '1'..='9' => {
                        grid.set_cost(pos, ch.to_digit(10).unwrap_or(1) as f32)?;
                    }
                    _ => {}
                }
            }
        }
        Ok(grid)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    /// Number of cells (the dense node-store capacity).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn metric(&self) -> GridMetric {
        GridMetric { width: self.width, connectivity: self.connectivity }
    }

    // ── Addressing ────────────────────────────────────────────────────────

    #[inline]
    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// The cell at `pos`, or `None` outside the grid.
    #[inline]
    pub fn cell_id(&self, pos: GridPos) -> Option<CellId> {
        self.contains(pos)
            .then(|| CellId(pos.y as u32 * self.width + pos.x as u32))
    }

    /// Like [`cell_id`](Self::cell_id) but reports out-of-bounds positions.
    pub fn cell_at(&self, pos: GridPos) -> SpatialResult<CellId> {
        self.cell_id(pos).ok_or(SpatialError::OutOfBounds {
            pos,
            width:  self.width,
            height: self.height,
        })
    }

    #[inline]
    pub fn pos(&self, cell: CellId) -> GridPos {
        self.metric().pos(cell)
    }

    #[inline]
    pub fn cell(&self, cell: CellId) -> &Cell {
        &self.cells[cell.index()]
    }

    // ── Editing ───────────────────────────────────────────────────────────

    /// Open or block the cell at `pos`.  Returns its id so the caller can
    /// forward the change to live searches via `update_node`.
    pub fn set_traversable(&mut self, pos: GridPos, traversable: bool) -> SpatialResult<CellId> {
        let id = self.cell_at(pos)?;
        self.cells[id.index()].traversable = traversable;
        Ok(id)
    }

    /// Set the cost multiplier of the cell at `pos`.
    pub fn set_cost(&mut self, pos: GridPos, cost: f32) -> SpatialResult<CellId> {
        if !(cost.is_finite() && cost >= 1.0) {
            return Err(SpatialError::InvalidCost(cost));
        }
        let id = self.cell_at(pos)?;
        self.cells[id.index()].cost = cost;
        Ok(id)
    }

    /// Block roughly `density` of all cells at random, never touching the
    /// `keep_open` positions.  Returns the cells that were blocked.
    pub fn scatter_obstacles(
        &mut self,
        rng:       &mut SimRng,
        density:   f64,
        keep_open: &[GridPos],
    ) -> Vec<CellId> {
        let keep: Vec<CellId> = keep_open.iter().filter_map(|&p| self.cell_id(p)).collect();
        let mut blocked = Vec::new();
        for i in 0..self.cells.len() {
            let id = CellId(i as u32);
            if keep.contains(&id) || !self.cells[i].traversable {
                continue;
            }
            if rng.gen_bool(density) {
                self.cells[i].traversable = false;
                blocked.push(id);
            }
        }
        blocked
    }

    // ── Neighbourhood ─────────────────────────────────────────────────────

    #[inline]
    fn open(&self, pos: GridPos) -> bool {
        self.cell_id(pos).is_some_and(|c| self.cells[c.index()].traversable)
    }

    fn diagonal_allowed(&self, from: GridPos, dx: i32, dy: i32) -> bool {
        self.connectivity == Connectivity::Eight
            && self.open(from.offset(dx, 0))
            && self.open(from.offset(0, dy))
    }
}

impl Graph for LocalGrid {
    type Node = CellId;

    fn successors(&self, node: CellId, out: &mut Vec<(CellId, f32)>) {
        if !self.cell(node).traversable {
            return;
        }
        let here = self.pos(node);
        for (dx, dy) in ORTHOGONAL {
            if let Some(n) = self.cell_id(here.offset(dx, dy)) {
                let cell = &self.cells[n.index()];
                if cell.traversable {
                    out.push((n, cell.cost));
                }
            }
        }
        if self.connectivity == Connectivity::Four {
            return;
        }
        for (dx, dy) in DIAGONAL {
            let Some(n) = self.cell_id(here.offset(dx, dy)) else {
                continue;
            };
            let cell = &self.cells[n.index()];
            if cell.traversable && self.diagonal_allowed(here, dx, dy) {
                out.push((n, std::f32::consts::SQRT_2 * cell.cost));
            }
        }
    }

    /// Every in-bounds neighbour, blocked or not: a cell that just became
    /// blocked must still report the cells whose edges it removed.
    fn predecessors(&self, node: CellId, out: &mut Vec<CellId>) {
        let here = self.pos(node);
        let diagonal: &[(i32, i32)] = match self.connectivity {
            Connectivity::Four  => &[],
            Connectivity::Eight => &DIAGONAL,
        };
        for &(dx, dy) in ORTHOGONAL.iter().chain(diagonal) {
            if let Some(n) = self.cell_id(here.offset(dx, dy)) {
                out.push(n);
            }
        }
    }

    fn is_traversable(&self, node: CellId) -> bool {
        self.cell(node).traversable
    }
}
