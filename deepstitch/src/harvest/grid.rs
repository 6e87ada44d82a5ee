//! Decoded tiles of one pyramid level.

use image::RgbImage;

/// Row-major `rows × cols` grid of decoded tiles, `None` where a tile could
/// not be obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    rows: u32,
    cols: u32,
    tiles: Vec<Option<RgbImage>>,
}

impl TileGrid {
    /// Creates a grid with every cell absent.
    pub fn new(rows: u32, cols: u32) -> Self {
        let len = rows as usize * cols as usize;
        Self {
            rows,
            cols,
            tiles: (0..len).map(|_| None).collect(),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of cells, present or not.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Stores a tile. Coordinates outside the grid are ignored.
    pub fn insert(&mut self, row: u32, col: u32, tile: RgbImage) {
        if let Some(index) = self.index(row, col) {
            self.tiles[index] = Some(tile);
        }
    }

    pub fn get(&self, row: u32, col: u32) -> Option<&RgbImage> {
        self.index(row, col).and_then(|index| self.tiles[index].as_ref())
    }

    /// Number of cells holding a tile.
    pub fn present_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_some()).count()
    }

    /// Present tiles with their `(row, col)`, in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &RgbImage)> + '_ {
        let cols = self.cols as usize;
        self.tiles.iter().enumerate().filter_map(move |(index, tile)| {
            tile.as_ref()
                .map(|t| ((index / cols) as u32, (index % cols) as u32, t))
        })
    }

    pub(crate) fn set_index(&mut self, index: usize, tile: Option<RgbImage>) {
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = tile;
        }
    }

    fn index(&self, row: u32, col: u32) -> Option<usize> {
        (row < self.rows && col < self.cols)
            .then(|| row as usize * self.cols as usize + col as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_absent() {
        let grid = TileGrid::new(2, 3);
        assert_eq!(grid.len(), 6);
        assert_eq!(grid.present_count(), 0);
        assert!(grid.get(1, 2).is_none());
        assert!(TileGrid::new(0, 5).is_empty());
    }

    #[test]
    fn test_insert_and_iterate_row_major() {
        let mut grid = TileGrid::new(2, 3);
        grid.insert(1, 2, RgbImage::new(1, 1));
        grid.insert(0, 1, RgbImage::new(2, 2));
        grid.insert(5, 5, RgbImage::new(3, 3));

        assert_eq!(grid.present_count(), 2);
        let coords: Vec<(u32, u32)> = grid.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(coords, vec![(0, 1), (1, 2)]);
        assert_eq!(grid.get(0, 1).map(|t| t.width()), Some(2));
    }
}
