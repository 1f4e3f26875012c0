//! Board geometry: glyph grid generation, cells and ley-lines
//!
//! The board is drawn as an irregular grid of glyphs. Cells are letters,
//! ley-line nodes are `@` until claimed, everything else is connector
//! glyphs and padding. The grid is generated once per side length and
//! never changes shape; game states overlay ownership on top of it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::StonehengeError;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Smallest supported side length
pub const MIN_LENGTH: usize = 1;

/// Largest supported side length
pub const MAX_LENGTH: usize = 5;

/// Cell labels in assignment order
pub const LETTERS: [char; 25] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y',
];

/// Glyph of an unclaimed ley-line node
pub const SENTINEL: char = '@';

/// All ley-line directions, in the order each cell stores its lines
pub const DIRECTIONS: [Direction; 3] = [
    Direction::UpRight,
    Direction::DownRight,
    Direction::Horizontal,
];

/// Number of cells on a board of the given side length
pub fn cell_count(length: usize) -> usize {
    // Triangle of rows 2..=length+1 plus the closing row of `length` cells
    (2..=length + 1).sum::<usize>() + length
}

/// Number of ley-lines on a board of the given side length
pub fn ley_line_count(length: usize) -> usize {
    3 * (length + 1)
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Grid coordinates (row, column) of a glyph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

impl Pos {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step by a signed offset, `None` if it would leave the grid's origin quadrant
    pub fn offset(self, (dr, dc): (isize, isize)) -> Option<Pos> {
        Some(Pos::new(
            self.row.checked_add_signed(dr)?,
            self.col.checked_add_signed(dc)?,
        ))
    }
}

/// Ley-line direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Lines running from lower-left to the top edge
    UpRight,
    /// Lines running from upper-left to the bottom edge
    DownRight,
    /// Rows, anchored at their left end
    Horizontal,
}

impl Direction {
    /// Grid step from a cell towards this direction's ley-line node
    pub const fn step(self) -> (isize, isize) {
        match self {
            Direction::UpRight => (-2, 2),
            Direction::DownRight => (2, 2),
            Direction::Horizontal => (0, -4),
        }
    }

    /// Position in a cell's `ley_lines` array
    pub const fn index(self) -> usize {
        match self {
            Direction::UpRight => 0,
            Direction::DownRight => 1,
            Direction::Horizontal => 2,
        }
    }
}

/// A claimable board position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub label: char,
    pub pos: Pos,
    /// Ley-line index per direction (see [`Direction::index`])
    pub ley_lines: [usize; 3],
}

/// A scoring line of cells anchored at a node glyph
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeyLine {
    pub direction: Direction,
    pub node: Pos,
    /// Member cell indices, nearest the node first
    pub members: Vec<usize>,
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Immutable board layout for one side length
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    length: usize,
    grid: Vec<Vec<char>>,
    cells: Vec<Cell>,
    ley_lines: Vec<LeyLine>,
}

impl Layout {
    /// Generate the layout for a side length in `MIN_LENGTH..=MAX_LENGTH`
    pub fn generate(length: usize) -> Result<Self, StonehengeError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(StonehengeError::OutOfRangeLength { length });
        }

        let grid = generate_grid(length);
        let positions = locate_cells(&grid);
        let (cells, ley_lines) = trace_ley_lines(&grid, &positions);

        Ok(Self {
            length,
            grid,
            cells,
            ley_lines,
        })
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Initial glyph grid (every cell unclaimed, every node a sentinel)
    pub fn grid(&self) -> &[Vec<char>] {
        &self.grid
    }

    /// Cells in label order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn ley_lines(&self) -> &[LeyLine] {
        &self.ley_lines
    }

    /// Index of the cell with this label, if it is on this board
    pub fn cell_index(&self, label: char) -> Option<usize> {
        let index = LETTERS.iter().position(|&l| l == label)?;
        (index < self.cells.len()).then_some(index)
    }

    /// Glyph at a grid position, `None` off the grid
    pub fn glyph(&self, pos: Pos) -> Option<char> {
        self.grid.get(pos.row)?.get(pos.col).copied()
    }

    /// Walk from `from` along `direction` until the node glyph is reached.
    ///
    /// Returns `None` if the walk leaves the grid first.
    pub fn scan_to_node(&self, from: Pos, direction: Direction) -> Option<Pos> {
        scan_to_node(&self.grid, from, direction)
    }
}

// ============================================================================
// GRID GENERATION
// ============================================================================

/// Build the glyph grid row by row
fn generate_grid(length: usize) -> Vec<Vec<char>> {
    let mut letters = LETTERS.iter().copied();
    let mut next_letter = || letters.next().unwrap_or(SENTINEL);
    let mut rows: Vec<String> = Vec::new();

    // Header: top ley-line nodes and their connectors
    rows.push(format!("{}@   @", spaces(2 * length + 4)));
    rows.push(format!("{}/   /", spaces(2 * length + 3)));

    // Upper triangle: rows of 2..=length+1 cells with diagonal rows between
    for row in 2..=length + 1 {
        let mut line = spaces(2 * (length + 1 - row));
        line.push_str("@ - ");
        for _ in 0..row - 1 {
            line.push(next_letter());
            line.push_str(" - ");
        }
        line.push(next_letter());
        if row != length + 1 {
            line.push_str("   @");
        }
        rows.push(line);

        if row != length + 1 {
            let mut diagonals = spaces(3 + 2 * (length + 1 - row));
            diagonals.push_str(&"/ \\ ".repeat(row));
            diagonals.push('/');
            rows.push(diagonals);
        }
    }

    // Merge row joining the two arms
    rows.push(format!("{}{}\\", spaces(5), "\\ / ".repeat(length)));

    // Closing row of `length` cells
    let mut line = String::from("  @ - ");
    for _ in 0..length - 1 {
        line.push(next_letter());
        line.push_str(" - ");
    }
    line.push(next_letter());
    line.push_str("   @");
    rows.push(line);

    // Trailer: bottom ley-line nodes, trailing padding trimmed
    rows.push(trim_padding(format!("{}{}", spaces(7), "\\   ".repeat(length))));
    rows.push(trim_padding(format!("{}{}", spaces(8), "@   ".repeat(length))));

    rows.into_iter().map(|row| row.chars().collect()).collect()
}

fn spaces(count: usize) -> String {
    " ".repeat(count)
}

/// Drop the three padding columns after the last glyph of a trailer row
fn trim_padding(mut row: String) -> String {
    row.truncate(row.len().saturating_sub(3));
    row
}

/// Cell positions in label order
fn locate_cells(grid: &[Vec<char>]) -> Vec<(char, Pos)> {
    let mut found: Vec<(char, Pos)> = grid
        .iter()
        .enumerate()
        .flat_map(|(row, glyphs)| {
            glyphs
                .iter()
                .enumerate()
                .filter(|(_, glyph)| glyph.is_ascii_uppercase())
                .map(move |(col, &glyph)| (glyph, Pos::new(row, col)))
        })
        .collect();
    found.sort_by_key(|&(label, _)| label);
    found
}

fn scan_to_node(grid: &[Vec<char>], from: Pos, direction: Direction) -> Option<Pos> {
    let mut pos = from;
    loop {
        let glyph = *grid.get(pos.row)?.get(pos.col)?;
        if glyph == SENTINEL {
            return Some(pos);
        }
        pos = pos.offset(direction.step())?;
    }
}

/// Group cells into ley-lines by the node each direction's scan reaches
fn trace_ley_lines(grid: &[Vec<char>], positions: &[(char, Pos)]) -> (Vec<Cell>, Vec<LeyLine>) {
    let mut ley_lines: Vec<LeyLine> = Vec::new();
    let mut by_node: FxHashMap<(Direction, Pos), usize> = FxHashMap::default();
    let mut cells = Vec::with_capacity(positions.len());

    for (index, &(label, pos)) in positions.iter().enumerate() {
        let mut lines = [0usize; 3];
        for direction in DIRECTIONS {
            let node = scan_to_node(grid, pos, direction)
                .expect("every cell reaches a ley-line node in each direction");
            let line = *by_node.entry((direction, node)).or_insert_with(|| {
                ley_lines.push(LeyLine {
                    direction,
                    node,
                    members: Vec::new(),
                });
                ley_lines.len() - 1
            });
            ley_lines[line].members.push(index);
            lines[direction.index()] = line;
        }
        cells.push(Cell {
            label,
            pos,
            ley_lines: lines,
        });
    }

    // Members were collected in label order; store them nearest the node first
    for ley_line in &mut ley_lines {
        let node = ley_line.node;
        ley_line.members.sort_by_key(|&member| {
            let pos = cells[member].pos;
            pos.row.abs_diff(node.row) + pos.col.abs_diff(node.col)
        });
    }

    (cells, ley_lines)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(layout: &Layout) -> Vec<String> {
        layout.grid().iter().map(|row| row.iter().collect()).collect()
    }

    fn members(layout: &Layout, line: &LeyLine) -> String {
        line.members.iter().map(|&m| layout.cells()[m].label).collect()
    }

    #[test]
    fn test_length_one_grid() {
        let layout = Layout::generate(1).unwrap();
        assert_eq!(
            rows(&layout),
            vec![
                "      @   @",
                "     /   /",
                "@ - A - B",
                "     \\ / \\",
                "  @ - C   @",
                "       \\",
                "        @",
            ]
        );
    }

    #[test]
    fn test_length_two_grid() {
        let layout = Layout::generate(2).unwrap();
        assert_eq!(
            rows(&layout),
            vec![
                "        @   @",
                "       /   /",
                "  @ - A - B   @",
                "     / \\ / \\ /",
                "@ - C - D - E",
                "     \\ / \\ / \\",
                "  @ - F - G   @",
                "       \\   \\",
                "        @   @",
            ]
        );
    }

    #[test]
    fn test_out_of_range_lengths() {
        for length in [0, 6, 25] {
            assert_eq!(
                Layout::generate(length),
                Err(StonehengeError::OutOfRangeLength { length })
            );
        }
    }

    #[test]
    fn test_counts_for_every_length() {
        for (length, cells) in [(1, 3), (2, 7), (3, 12), (4, 18), (5, 25)] {
            let layout = Layout::generate(length).unwrap();
            assert_eq!(cell_count(length), cells);
            assert_eq!(layout.cells().len(), cells);
            assert_eq!(layout.ley_lines().len(), ley_line_count(length));

            // Labels assigned in order, no duplicates
            let labels: Vec<char> = layout.cells().iter().map(|c| c.label).collect();
            assert_eq!(labels, LETTERS[..cells].to_vec());
        }
    }

    #[test]
    fn test_every_cell_on_three_distinct_lines() {
        for length in MIN_LENGTH..=MAX_LENGTH {
            let layout = Layout::generate(length).unwrap();
            for (index, cell) in layout.cells().iter().enumerate() {
                for direction in DIRECTIONS {
                    let line = &layout.ley_lines()[cell.ley_lines[direction.index()]];
                    assert_eq!(line.direction, direction);
                    assert!(line.members.contains(&index));
                }
            }
        }
    }

    #[test]
    fn test_line_sizes() {
        for length in MIN_LENGTH..=MAX_LENGTH {
            let layout = Layout::generate(length).unwrap();
            for line in layout.ley_lines() {
                assert!(line.members.len() >= 1 && line.members.len() <= length + 1);
                assert_eq!(layout.glyph(line.node), Some(SENTINEL));
            }
            // Each direction partitions the cells
            for direction in DIRECTIONS {
                let total: usize = layout
                    .ley_lines()
                    .iter()
                    .filter(|l| l.direction == direction)
                    .map(|l| l.members.len())
                    .sum();
                assert_eq!(total, layout.cells().len());
            }
        }
    }

    #[test]
    fn test_length_one_ley_lines() {
        let layout = Layout::generate(1).unwrap();
        let mut lines: Vec<(Direction, String)> = layout
            .ley_lines()
            .iter()
            .map(|l| (l.direction, members(&layout, l)))
            .collect();
        lines.sort_by_key(|(d, m)| (d.index(), m.clone()));
        assert_eq!(
            lines,
            vec![
                (Direction::UpRight, "A".to_string()),
                (Direction::UpRight, "BC".to_string()),
                (Direction::DownRight, "B".to_string()),
                (Direction::DownRight, "CA".to_string()),
                (Direction::Horizontal, "AB".to_string()),
                (Direction::Horizontal, "C".to_string()),
            ]
        );
    }

    #[test]
    fn test_scan_to_node() {
        let layout = Layout::generate(2).unwrap();
        let d = layout.cells()[layout.cell_index('D').unwrap()].pos;
        assert_eq!(d, Pos::new(4, 8));
        assert_eq!(layout.scan_to_node(d, Direction::UpRight), Some(Pos::new(0, 12)));
        assert_eq!(layout.scan_to_node(d, Direction::DownRight), Some(Pos::new(8, 12)));
        assert_eq!(layout.scan_to_node(d, Direction::Horizontal), Some(Pos::new(4, 0)));
    }

    #[test]
    fn test_cell_index() {
        let layout = Layout::generate(1).unwrap();
        assert_eq!(layout.cell_index('A'), Some(0));
        assert_eq!(layout.cell_index('C'), Some(2));
        assert_eq!(layout.cell_index('D'), None);
        assert_eq!(layout.cell_index('a'), None);
    }
}
