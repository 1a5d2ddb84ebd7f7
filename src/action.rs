//! Actions and their encodings.
//!
//! The search addresses moves by index: `x * size + y` for a play and
//! `size * size` for a pass. Resign never takes part in the search.
//!
//! GTP vertices use letters A-Z (skipping I) for columns and numbers for
//! rows, with row 1 at the bottom of the board (largest `x`).

use std::fmt;

use crate::board::Color;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Play { x: usize, y: usize },
    Pass,
    Resign,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    pub color: Color,
    pub kind: ActionKind,
}

impl Action {
    pub fn play(color: Color, x: usize, y: usize) -> Self {
        Self {
            color,
            kind: ActionKind::Play { x, y },
        }
    }

    pub fn pass(color: Color) -> Self {
        Self {
            color,
            kind: ActionKind::Pass,
        }
    }

    pub fn resign(color: Color) -> Self {
        Self {
            color,
            kind: ActionKind::Resign,
        }
    }

    #[inline]
    pub fn is_pass(&self) -> bool {
        self.kind == ActionKind::Pass
    }

    /// Move index on a board of the given size; `None` for resign.
    pub fn index(&self, size: usize) -> Option<usize> {
        match self.kind {
            ActionKind::Play { x, y } => Some(x * size + y),
            ActionKind::Pass => Some(size * size),
            ActionKind::Resign => None,
        }
    }

    /// Inverse of [`Action::index`]. Any index at or past `size * size` is a pass.
    pub fn from_index(color: Color, index: usize, size: usize) -> Self {
        if index >= size * size {
            Self::pass(color)
        } else {
            Self::play(color, index / size, index % size)
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ActionKind::Play { x, y } => write!(f, "{} ({x}, {y})", self.color),
            ActionKind::Pass => write!(f, "{} pass", self.color),
            ActionKind::Resign => write!(f, "{} resign", self.color),
        }
    }
}

/// A parsed GTP vertex.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Vertex {
    Pass,
    Point { x: usize, y: usize },
}

/// Parse a GTP vertex (e.g. "D4", "pass") for a board of the given size.
///
/// Returns `None` for malformed or off-board vertices.
pub fn parse_vertex(s: &str, size: usize) -> Option<Vertex> {
    if s.eq_ignore_ascii_case("pass") {
        return Some(Vertex::Pass);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return None;
    }

    let col_char = bytes[0].to_ascii_uppercase();
    if !col_char.is_ascii_uppercase() || col_char == b'I' {
        return None;
    }
    let mut y = (col_char - b'A') as usize;
    // Skip 'I' column (Go convention to avoid confusion with 'J')
    if col_char > b'I' {
        y -= 1;
    }

    let row: usize = s[1..].parse().ok()?;
    if row == 0 || row > size || y >= size {
        return None;
    }
    Some(Vertex::Point { x: size - row, y })
}

/// Format a board point as a GTP vertex.
pub fn format_vertex(x: usize, y: usize, size: usize) -> String {
    let mut c = b'A' + y as u8;
    if c >= b'I' {
        c += 1;
    }
    format!("{}{}", c as char, size - x)
}

/// Format an action as a GTP vertex ("pass" and "resign" included).
pub fn format_action(action: &Action, size: usize) -> String {
    match action.kind {
        ActionKind::Play { x, y } => format_vertex(x, y, size),
        ActionKind::Pass => "pass".into(),
        ActionKind::Resign => "resign".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_encoding() {
        let size = 5;
        assert_eq!(Action::play(Color::Black, 2, 3).index(size), Some(13));
        assert_eq!(Action::pass(Color::White).index(size), Some(25));
        assert_eq!(Action::resign(Color::White).index(size), None);
        assert_eq!(
            Action::from_index(Color::White, 13, size),
            Action::play(Color::White, 2, 3)
        );
        assert!(Action::from_index(Color::Black, 25, size).is_pass());
    }

    #[test]
    fn test_parse_vertex_corners() {
        assert_eq!(parse_vertex("A1", 9), Some(Vertex::Point { x: 8, y: 0 }));
        assert_eq!(parse_vertex("J9", 9), Some(Vertex::Point { x: 0, y: 8 }));
        assert_eq!(parse_vertex("pass", 9), Some(Vertex::Pass));
        assert_eq!(parse_vertex("PASS", 9), Some(Vertex::Pass));
    }

    #[test]
    fn test_parse_vertex_skips_i() {
        let h = parse_vertex("H5", 9);
        let j = parse_vertex("J5", 9);
        assert_eq!(h, Some(Vertex::Point { x: 4, y: 7 }));
        assert_eq!(j, Some(Vertex::Point { x: 4, y: 8 }));
        assert_eq!(parse_vertex("I5", 9), None);
    }

    #[test]
    fn test_parse_vertex_rejects_off_board() {
        assert_eq!(parse_vertex("K1", 9), None);
        assert_eq!(parse_vertex("A10", 9), None);
        assert_eq!(parse_vertex("A0", 9), None);
        assert_eq!(parse_vertex("Z", 9), None);
        assert_eq!(parse_vertex("44", 9), None);
    }

    #[test]
    fn test_vertex_roundtrip() {
        let size = 13;
        for x in 0..size {
            for y in 0..size {
                let s = format_vertex(x, y, size);
                assert_eq!(
                    parse_vertex(&s, size),
                    Some(Vertex::Point { x, y }),
                    "roundtrip failed for {s}"
                );
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Action::play(Color::Black, 2, 2).to_string(), "B (2, 2)");
        assert_eq!(Action::pass(Color::White).to_string(), "W pass");
        assert_eq!(format_action(&Action::resign(Color::Black), 9), "resign");
    }
}
