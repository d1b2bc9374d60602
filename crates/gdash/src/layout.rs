//! grid layout
//!
//! Panels are declared in rows. Within a row panels are placed left to right, rows are placed
//! top to bottom with a one unit gutter between them. There is no wrapping and no width
//! validation, a row wider than the grid simply overflows.
use crate::scope::hcl_enum;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

hcl_enum! {
    /// Treatment of rows without panels
    pub enum EmptyRows {
        /// Keep the row; it has no height but still adds its gutter
        Gutter = "gutter" => "gutter",
        /// Drop the row as if it was never declared
        Skip = "skip" => "skip",
    }
}

/// Position every panel
///
/// `x` is the sum of the widths of the panels before it in its row. `y` is the sum of the
/// tallest panel of each preceding row, plus one per preceding row.
pub fn arrange(rows: &[Vec<Size>], empty_rows: EmptyRows) -> Vec<Vec<Position>> {
    let mut y = 0;
    let mut ordinal = 0;
    let mut arranged = Vec::with_capacity(rows.len());

    for row in rows {
        if row.is_empty() && empty_rows == EmptyRows::Skip {
            arranged.push(Vec::new());
            continue;
        }

        let top = y + ordinal;
        let mut x = 0;
        let positions = row
            .iter()
            .map(|size| {
                let position = Position { x, y: top };
                x += size.width;
                position
            })
            .collect();

        y += row.iter().map(|size| size.height).max().unwrap_or(0);
        ordinal += 1;
        arranged.push(positions);
    }

    arranged
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn size(width: u32, height: u32) -> Size {
        Size { width, height }
    }

    fn at(x: u32, y: u32) -> Position {
        Position { x, y }
    }

    #[test]
    fn two_rows_of_two() {
        let rows = vec![
            vec![size(10, 8), size(24, 3)],
            vec![size(24, 4), size(3, 3)],
        ];

        assert_eq!(
            arrange(&rows, EmptyRows::Gutter),
            vec![vec![at(0, 0), at(10, 0)], vec![at(0, 9), at(24, 9)]]
        );
    }

    #[test]
    fn first_row_starts_at_origin() {
        let rows = vec![vec![size(6, 2), size(6, 2), size(6, 2)]];
        assert_eq!(
            arrange(&rows, EmptyRows::Gutter),
            vec![vec![at(0, 0), at(6, 0), at(12, 0)]]
        );
    }

    #[test]
    fn no_wrapping() {
        let rows = vec![vec![size(20, 1), size(20, 1)]];
        assert_eq!(arrange(&rows, EmptyRows::Gutter)[0][1], at(20, 0));
    }

    #[test]
    fn empty_rows_keep_their_gutter() {
        let rows = vec![vec![size(24, 4)], vec![], vec![size(24, 2)]];
        assert_eq!(
            arrange(&rows, EmptyRows::Gutter),
            vec![vec![at(0, 0)], vec![], vec![at(0, 6)]]
        );
    }

    #[test]
    fn empty_rows_can_be_skipped() {
        let rows = vec![vec![size(24, 4)], vec![], vec![size(24, 2)]];
        assert_eq!(
            arrange(&rows, EmptyRows::Skip),
            vec![vec![at(0, 0)], vec![], vec![at(0, 5)]]
        );
    }

    #[test]
    fn no_rows() {
        assert!(arrange(&[], EmptyRows::Gutter).is_empty());
    }
}
