use std::collections::HashMap;
use std::rc::Rc;

use crate::*;

/// Discretizes geographic points into cells and keeps every referenced cell canonical.
#[derive(Clone, Debug)]
pub struct Board {
    tile_width: f64,
    visibility_radius: i32,
    known_cells: HashMap<CellKey, CellRef>,
}

impl Board {
    pub fn new(tile_width: f64, visibility_radius: u32) -> Result<Self> {
        let config = GameConfig {
            tile_width,
            visibility_radius,
            ..Default::default()
        }
        .validate()?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &GameConfig) -> Result<Self> {
        let config = config.validate()?;
        let visibility_radius = i32::try_from(config.visibility_radius)
            .map_err(|_| GameError::InvalidConfig("visibility radius is too large"))?;
        Ok(Self {
            tile_width: config.tile_width,
            visibility_radius,
            known_cells: HashMap::new(),
        })
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn visibility_radius(&self) -> u32 {
        self.visibility_radius.unsigned_abs()
    }

    /// Returns the registered handle for `(i, j)`, registering `cell` on first sight.
    pub fn canonicalize(&mut self, cell: Cell) -> CellRef {
        Rc::clone(
            self.known_cells
                .entry(cell.key())
                .or_insert_with(|| Rc::new(cell)),
        )
    }

    /// Floor-buckets `point` by tile width. Coordinates beyond the `i32` range saturate.
    pub fn cell_for_point(&mut self, point: Point) -> CellRef {
        let i = (point.lat / self.tile_width).floor() as i32;
        let j = (point.lng / self.tile_width).floor() as i32;
        self.canonicalize(Cell::new(i, j))
    }

    /// South-west corner of the cell.
    pub fn cell_origin(&self, cell: Cell) -> Point {
        Point::new(
            f64::from(cell.i) * self.tile_width,
            f64::from(cell.j) * self.tile_width,
        )
    }

    pub fn cell_bounds(&self, cell: Cell) -> Bounds {
        Bounds {
            south_west: self.cell_origin(cell),
            north_east: Point::new(
                (f64::from(cell.i) + 1.0) * self.tile_width,
                (f64::from(cell.j) + 1.0) * self.tile_width,
            ),
        }
    }

    /// All canonical cells in the square of side `2 * radius + 1` tiles around the cell holding `point`.
    pub fn neighbors_of(&mut self, point: Point) -> Vec<CellRef> {
        let origin = self.cell_for_point(point);
        self.neighbors_of_cell(*origin)
    }

    pub fn neighbors_of_cell(&mut self, origin: Cell) -> Vec<CellRef> {
        SquareIter::new(origin, self.visibility_radius)
            .map(|cell| self.canonicalize(cell))
            .collect()
    }

    pub fn known_cells(&self) -> usize {
        self.known_cells.len()
    }

    pub fn clear(&mut self) {
        self.known_cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(radius: u32) -> Board {
        Board::new(1e-4, radius).unwrap()
    }

    #[test]
    fn canonicalize_returns_same_handle() {
        let mut board = board(1);
        for (i, j) in [(0, 0), (-4, 9), (i32::MAX, i32::MIN)] {
            let first = board.canonicalize(Cell::new(i, j));
            let second = board.canonicalize(Cell::new(i, j));
            assert_eq!(first, second);
            assert!(Rc::ptr_eq(&first, &second));
        }
        assert_eq!(board.known_cells(), 3);
    }

    #[test]
    fn cell_for_point_is_stable() {
        let mut board = board(1);
        let point = Point::new(36.9995, -122.0533);
        let first = board.cell_for_point(point);
        let second = board.cell_for_point(point);
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn cell_for_point_floors() {
        let mut board = board(1);
        assert_eq!(*board.cell_for_point(Point::new(0.00015, 0.00025)), Cell::new(1, 2));
        assert_eq!(*board.cell_for_point(Point::new(-0.00005, 0.0)), Cell::new(-1, 0));
    }

    #[test]
    fn points_within_one_tile_share_a_cell() {
        let mut board = board(1);
        let a = board.cell_for_point(Point::new(0.00011, 0.00021));
        let b = board.cell_for_point(Point::new(0.00019, 0.00029));
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn rejects_invalid_tile_width() {
        assert!(matches!(Board::new(0.0, 1), Err(GameError::InvalidConfig(_))));
        assert!(matches!(Board::new(-1.0, 1), Err(GameError::InvalidConfig(_))));
    }

    #[test]
    fn bounds_span_one_tile() {
        let board = board(1);
        let bounds = board.cell_bounds(Cell::new(2, -3));
        assert_eq!(bounds.south_west, Point::new(2.0 * 1e-4, -3.0 * 1e-4));
        assert_eq!(bounds.north_east, Point::new(3.0 * 1e-4, -2.0 * 1e-4));
    }

    #[test]
    fn neighbors_cover_square_and_are_canonical() {
        let mut board = board(2);
        let cells = board.neighbors_of(Point::new(0.00015, 0.00025));
        assert_eq!(cells.len(), 25);

        let center = board.canonicalize(Cell::new(1, 2));
        let found = cells.iter().find(|cell| ***cell == Cell::new(1, 2)).unwrap();
        assert!(Rc::ptr_eq(found, &center));
        assert!(cells.iter().any(|cell| **cell == Cell::new(-1, 0)));
        assert!(cells.iter().any(|cell| **cell == Cell::new(3, 4)));
        assert_eq!(board.known_cells(), 25);
    }

    #[test]
    fn zero_radius_yields_origin_only() {
        let mut board = board(0);
        let cells = board.neighbors_of(Point::new(-0.00005, 0.0));
        assert_eq!(cells.len(), 1);
        assert_eq!(*cells[0], Cell::new(-1, 0));
    }

    #[test]
    fn clear_forgets_cells() {
        let mut board = board(1);
        let before = board.canonicalize(Cell::new(1, 1));
        board.clear();
        assert_eq!(board.known_cells(), 0);
        let after = board.canonicalize(Cell::new(1, 1));
        assert!(!Rc::ptr_eq(&before, &after));
    }
}
