//! Square board of stones and the flood fills the rules are built on.
//!
//! Points are addressed either by `(x, y)` (row, column) or by the flat
//! index `x * size + y`. All traversals use an explicit work stack so their
//! depth is bounded by the board area rather than the call stack.

use std::fmt;
use std::ops::Neg;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    /// +1 for Black, -1 for White. Values are reported from Black's side.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Color::Black => 1.0,
            Color::White => -1.0,
        }
    }
}

impl Neg for Color {
    type Output = Color;

    fn neg(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "B"),
            Color::White => write!(f, "W"),
        }
    }
}

/// A flat point index, `x * size + y`.
pub type Point = usize;

/// A maximal 4-connected chain of same-colored stones and its liberty count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub stones: Vec<Point>,
    pub liberties: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    size: usize,
    cells: Vec<Option<Color>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![None; size * size],
        }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    #[inline]
    pub fn point(&self, x: usize, y: usize) -> Point {
        x * self.size + y
    }

    #[inline]
    pub fn coords(&self, pt: Point) -> (usize, usize) {
        (pt / self.size, pt % self.size)
    }

    /// Stone at `(x, y)`; `None` for empty or off-board points.
    pub fn get(&self, x: usize, y: usize) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        self.cells[self.point(x, y)]
    }

    #[inline]
    pub fn at(&self, pt: Point) -> Option<Color> {
        self.cells[pt]
    }

    #[inline]
    pub(crate) fn set(&mut self, pt: Point, cell: Option<Color>) {
        self.cells[pt] = cell;
    }

    /// Number of stones of `color` on the board.
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// The orthogonal on-board neighbors of a point.
    pub fn neighbors(&self, pt: Point) -> impl Iterator<Item = Point> + use<> {
        let s = self.size;
        let (x, y) = (pt / s, pt % s);
        let mut v = Vec::with_capacity(4);
        if x > 0 {
            v.push(pt - s);
        }
        if x + 1 < s {
            v.push(pt + s);
        }
        if y > 0 {
            v.push(pt - 1);
        }
        if y + 1 < s {
            v.push(pt + 1);
        }
        v.into_iter()
    }

    /// Collect the group containing `start` and count its distinct liberties.
    ///
    /// Returns `None` if `start` is empty.
    pub fn group(&self, start: Point) -> Option<Group> {
        let color = self.cells[start]?;
        let mut stack = vec![start];
        let mut visited = vec![false; self.cells.len()];
        let mut stones = Vec::new();
        let mut liberties = 0;

        visited[start] = true;
        while let Some(pt) = stack.pop() {
            stones.push(pt);
            for n in self.neighbors(pt) {
                if visited[n] {
                    continue;
                }
                match self.cells[n] {
                    None => {
                        visited[n] = true;
                        liberties += 1;
                    }
                    Some(c) if c == color => {
                        visited[n] = true;
                        stack.push(n);
                    }
                    _ => {}
                }
            }
        }
        Some(Group { stones, liberties })
    }

    /// Points reachable from any stone of `color` without crossing a stone
    /// of the opposite color.
    pub fn reachable(&self, color: Color) -> Vec<bool> {
        let blocker = Some(-color);
        let mut reached = vec![false; self.cells.len()];
        let mut stack: Vec<Point> = Vec::new();

        for (pt, &cell) in self.cells.iter().enumerate() {
            if cell == Some(color) {
                reached[pt] = true;
                stack.push(pt);
            }
        }
        while let Some(pt) = stack.pop() {
            for n in self.neighbors(pt) {
                if !reached[n] && self.cells[n] != blocker {
                    reached[n] = true;
                    stack.push(n);
                }
            }
        }
        reached
    }

    /// Area owned by each color: `(black, white)`.
    ///
    /// A point counts for a color iff only that color reaches it.
    pub fn area(&self) -> (usize, usize) {
        let black = self.reachable(Color::Black);
        let white = self.reachable(Color::White);
        black
            .iter()
            .zip(&white)
            .fold((0, 0), |(b, w), (&rb, &rw)| match (rb, rw) {
                (true, false) => (b + 1, w),
                (false, true) => (b, w + 1),
                _ => (b, w),
            })
    }

    /// If every on-board neighbor of an empty point is a stone of one color,
    /// return that color. May be a false eye.
    pub fn is_eyeish(&self, pt: Point) -> Option<Color> {
        if self.cells[pt].is_some() {
            return None;
        }
        let mut eyecolor = None;
        for n in self.neighbors(pt) {
            match (self.cells[n], eyecolor) {
                (None, _) => return None,
                (Some(c), None) => eyecolor = Some(c),
                (Some(c), Some(e)) if c != e => return None,
                _ => {}
            }
        }
        eyecolor
    }
}

/// Tentative edits to a board, rolled back when dropped unless committed.
///
/// Legality checks play a stone through a `Trial`, inspect the result and
/// let it fall out of scope; every exit path restores the board.
pub(crate) struct Trial<'a> {
    board: &'a mut Board,
    undo: Vec<(Point, Option<Color>)>,
}

/// Outcome of placing one stone and resolving captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Placement {
    pub captured: usize,
    pub group_size: usize,
    pub liberties: usize,
}

impl<'a> Trial<'a> {
    pub fn new(board: &'a mut Board) -> Self {
        Self {
            board,
            undo: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &*self.board
    }

    fn set(&mut self, pt: Point, cell: Option<Color>) {
        self.undo.push((pt, self.board.at(pt)));
        self.board.set(pt, cell);
    }

    /// Place a stone, remove every adjacent opposing group left without
    /// liberties, then measure the placed group.
    pub fn place(&mut self, pt: Point, color: Color) -> Placement {
        self.set(pt, Some(color));

        let mut captured = 0;
        for n in self.board.neighbors(pt) {
            if self.board.at(n) != Some(-color) {
                continue;
            }
            if let Some(group) = self.board.group(n) {
                if group.liberties == 0 {
                    captured += group.stones.len();
                    for s in group.stones {
                        self.set(s, None);
                    }
                }
            }
        }

        let (group_size, liberties) = self
            .board
            .group(pt)
            .map(|g| (g.stones.len(), g.liberties))
            .unwrap_or((0, 0));
        Placement {
            captured,
            group_size,
            liberties,
        }
    }

    /// Keep the edits.
    pub fn commit(mut self) {
        self.undo.clear();
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        while let Some((pt, cell)) = self.undo.pop() {
            self.board.set(pt, cell);
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in 0..self.size {
            for y in 0..self.size {
                let ch = match self.get(x, y) {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_from(rows: &[&str]) -> Board {
        let mut board = Board::new(rows.len());
        for (x, row) in rows.iter().enumerate() {
            for (y, ch) in row.chars().enumerate() {
                let cell = match ch {
                    'X' => Some(Color::Black),
                    'O' => Some(Color::White),
                    _ => None,
                };
                let pt = board.point(x, y);
                board.set(pt, cell);
            }
        }
        board
    }

    #[test]
    fn test_color_negation() {
        assert_eq!(-Color::Black, Color::White);
        assert_eq!(-(-Color::White), Color::White);
        assert_eq!(Color::Black.sign(), -Color::White.sign());
    }

    #[test]
    fn test_neighbors_corner_and_center() {
        let board = Board::new(5);
        assert_eq!(board.neighbors(0).count(), 2);
        assert_eq!(board.neighbors(board.point(0, 2)).count(), 3);
        assert_eq!(board.neighbors(board.point(2, 2)).count(), 4);
    }

    #[test]
    fn test_single_stone_liberties() {
        let board = board_from(&[".....", ".....", "..X..", ".....", "....."]);
        let group = board.group(board.point(2, 2)).unwrap();
        assert_eq!(group.stones.len(), 1);
        assert_eq!(group.liberties, 4);
    }

    #[test]
    fn test_shared_liberty_counted_once() {
        // The empty point at (1,1) touches three stones of the group.
        let board = board_from(&["XXX..", "X.X..", "XXX..", ".....", "....."]);
        let group = board.group(0).unwrap();
        assert_eq!(group.stones.len(), 8);
        // (1,1), (0,3), (1,3), (2,3), (3,0), (3,1), (3,2)
        assert_eq!(group.liberties, 7);
    }

    #[test]
    fn test_group_of_empty_point() {
        let board = Board::new(3);
        assert!(board.group(4).is_none());
    }

    #[test]
    fn test_area_with_contested_points() {
        // Column 2 is reachable by both colors.
        let board = board_from(&["X.O", "X.O", "X.O"]);
        assert_eq!(board.area(), (3, 3));
    }

    #[test]
    fn test_area_walled_territory() {
        let board = board_from(&["..X..", "..X..", "XXX..", ".....", "....."]);
        assert_eq!(board.area(), (25, 0));
    }

    #[test]
    fn test_trial_rolls_back_on_drop() {
        let mut board = board_from(&[".X.", "XO.", ".X."]);
        let before = board.clone();
        {
            let mut trial = Trial::new(&mut board);
            let placed = trial.place(5, Color::Black);
            assert_eq!(placed.captured, 1);
            assert_eq!(trial.board().at(4), None);
        }
        assert_eq!(board, before);
    }

    #[test]
    fn test_trial_commit_keeps_edits() {
        let mut board = board_from(&[".X.", "XO.", ".X."]);
        let mut trial = Trial::new(&mut board);
        trial.place(5, Color::Black);
        trial.commit();
        assert_eq!(board.at(4), None);
        assert_eq!(board.at(5), Some(Color::Black));
    }

    #[test]
    fn test_is_eyeish() {
        let board = board_from(&[".X.", "X..", "..."]);
        assert_eq!(board.is_eyeish(0), Some(Color::Black));
        assert_eq!(board.is_eyeish(4), None);
    }

    #[test]
    fn test_display() {
        let board = board_from(&["X.", ".O"]);
        assert_eq!(board.to_string(), "X . \n. O \n");
    }
}
