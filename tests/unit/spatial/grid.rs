//! Tests for grid storage, neighbour lookup and the connection layout dump

#[cfg(test)]
mod tests {
    use dungeontile::spatial::connections::{ConnectionMask, Side};
    use dungeontile::spatial::grid::{Grid, parse_connection_layout};
    use dungeontile::spatial::tiles::{Tile, TileFlags, TileIdAllocator};

    fn tile(ids: &TileIdAllocator, connections: &str) -> Tile {
        Tile::new(
            ids,
            "room",
            "fort",
            connections.parse().unwrap(),
            TileFlags::default(),
        )
        .unwrap()
    }

    // Tests dimensions and initial state
    // Verified by swapping rows and cols in the backing shape
    #[test]
    fn test_new_grid_is_unset() {
        let grid = Grid::new(4, 2);

        assert_eq!(grid.cols(), 4);
        assert_eq!(grid.rows(), 2);
        assert!(!grid.is_complete());
        assert_eq!(grid.unset_cells().len(), 8);
        assert_eq!(grid.unset_cells().first(), Some(&(0, 0)));
        assert_eq!(grid.unset_cells().last(), Some(&(3, 1)));
    }

    // Tests binding cells uses (col, row) coordinates
    // Verified by indexing the array as [col, row]
    #[test]
    fn test_set_and_get() {
        let ids = TileIdAllocator::new();
        let room = tile(&ids, "R0");
        let mut grid = Grid::new(3, 2);

        assert!(grid.set(2, 1, &room));
        assert!(!grid.set(3, 0, &room));
        assert!(!grid.set(0, 2, &room));

        assert_eq!(grid.get(2, 1).map(Tile::id), Some(room.id()));
        assert!(grid.get(1, 2).is_none());
        assert!(grid.is_bound(2, 1));
        assert!(!grid.is_bound(0, 0));
    }

    // Tests neighbours stay inside the grid
    // Verified by wrapping around at the border
    #[test]
    fn test_neighbour() {
        let grid = Grid::new(3, 3);

        assert_eq!(grid.neighbour(1, 1, Side::Top), Some((1, 0)));
        assert_eq!(grid.neighbour(1, 1, Side::Right), Some((2, 1)));
        assert_eq!(grid.neighbour(1, 1, Side::Bottom), Some((1, 2)));
        assert_eq!(grid.neighbour(1, 1, Side::Left), Some((0, 1)));
        assert_eq!(grid.neighbour(0, 0, Side::Top), None);
        assert_eq!(grid.neighbour(0, 0, Side::Left), None);
        assert_eq!(grid.neighbour(2, 2, Side::Right), None);
        assert_eq!(grid.neighbour(2, 2, Side::Bottom), None);
    }

    // Tests cell iteration is row-major
    // Verified by iterating column-major
    #[test]
    fn test_cells_row_major() {
        let grid = Grid::new(2, 2);
        let order: Vec<(usize, usize)> = grid.cells().map(|(col, row, _)| (col, row)).collect();

        assert_eq!(order, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
        assert_eq!(grid.index_of(1, 1), 3);
        assert_eq!(grid.index_of(0, 1), 2);
    }

    // Tests matching neighbours produce no mismatches
    // Verified by comparing the sides without mirroring
    #[test]
    fn test_adjacency_consistent() {
        let ids = TileIdAllocator::new();
        let left = tile(&ids, "R0,R1");
        let right = tile(&ids, "L6,L7");
        let mut grid = Grid::new(2, 1);
        grid.set(0, 0, &left);
        grid.set(1, 0, &right);

        assert!(grid.adjacency_mismatches().is_empty());
    }

    // Tests a connector without its counterpart is reported
    // Verified by only checking the Right side
    #[test]
    fn test_adjacency_mismatch_reported() {
        let ids = TileIdAllocator::new();
        let upper = tile(&ids, "B3");
        let lower = tile(&ids, "T3");
        let mut grid = Grid::new(1, 2);
        grid.set(0, 0, &upper);
        grid.set(0, 1, &lower);

        assert_eq!(grid.adjacency_mismatches(), vec![(0, 0, Side::Bottom)]);
    }

    // Tests the layout format, including unset cells
    // Verified by printing raw mask bits
    #[test]
    fn test_connection_layout_format() {
        let ids = TileIdAllocator::new();
        let hall = tile(&ids, "R0,R1");
        let closed = tile(&ids, "");
        let mut grid = Grid::new(3, 1);
        grid.set(0, 0, &hall);
        grid.set(1, 0, &closed);

        assert_eq!(grid.connection_layout(), "Row[0]:[R0,R1][][null]\n");
    }

    // Tests the layout dump parses back bit for bit
    // Verified by treating empty cells as unset
    #[test]
    fn test_connection_layout_round_trip() {
        let ids = TileIdAllocator::new();
        let tiles = [
            tile(&ids, "T0,T7,R3"),
            tile(&ids, ""),
            tile(&ids, "B1,B2,L4,L5"),
        ];
        let mut grid = Grid::new(2, 2);
        grid.set(0, 0, &tiles[0]);
        grid.set(1, 0, &tiles[1]);
        grid.set(1, 1, &tiles[2]);

        let parsed = parse_connection_layout(&grid.connection_layout()).unwrap();

        assert_eq!(parsed, grid.masks());
        assert_eq!(parsed.get([0, 1]), Some(&Some(ConnectionMask::ZERO)));
        assert_eq!(parsed.get([1, 0]), Some(&None));
    }

    // Tests non-row lines are skipped and bad rows rejected
    // Verified by parsing every line
    #[test]
    fn test_parse_connection_layout_errors() {
        let dump = "- - - Connections - - -\nRow[0]:[T0][]\nRow[1]:[null][R1]\n- - -\n";
        let parsed = parse_connection_layout(dump).unwrap();
        assert_eq!(parsed.dim(), (2, 2));

        assert!(parse_connection_layout("Row[0]:[T0][R1]\nRow[1]:[T0]\n").is_err());
        assert!(parse_connection_layout("Row[0]:[T0\n").is_err());
        assert!(parse_connection_layout("Row[0]:[X9]\n").is_err());
        assert!(parse_connection_layout("Row[0] [T0]\n").is_err());
    }

    // Tests malformed rows name the line and the reason
    // Verified by dropping the reason from the message
    #[test]
    fn test_malformed_layout_message() {
        let message = parse_connection_layout("Row[0]:[T0\n").unwrap_err().to_string();
        assert!(message.contains("Row[0]:[T0"));
        assert!(message.contains("unterminated cell"));

        let message = parse_connection_layout("Row[0]:T0]\n").unwrap_err().to_string();
        assert!(message.contains("expected '['"));
    }

    // Tests Display and the layout dump agree
    // Verified by omitting the trailing newline from Display
    #[test]
    fn test_display_is_layout() {
        let ids = TileIdAllocator::new();
        let hall = tile(&ids, "T3,T4,B3,B4");
        let mut grid = Grid::new(2, 2);
        grid.set(1, 1, &hall);

        assert_eq!(grid.to_string(), grid.connection_layout());
        assert_eq!(grid.to_string(), "Row[0]:[null][null]\nRow[1]:[null][T3,T4,B3,B4]\n");
    }
}
