//! Tests for rotated and mirrored variant generation

#[cfg(test)]
mod tests {
    use dungeontile::DungeonError;
    use dungeontile::algorithm::permutation::{
        MAX_FLIPPABLE_PERMUTATIONS, MAX_PERMUTATIONS, TilePermuter,
    };
    use dungeontile::spatial::connections::ConnectionMask;
    use dungeontile::spatial::tiles::{Rotation, Tile, TileFlags, TileIdAllocator};
    use std::collections::HashSet;

    fn base(ids: &TileIdAllocator, connections: &str, flippable: bool, entrance: bool) -> Tile {
        Tile::new(
            ids,
            "corner",
            "fort",
            connections.parse().unwrap(),
            TileFlags {
                permutable: true,
                flippable,
                entrance,
                exit: false,
            },
        )
        .unwrap()
    }

    fn masks(tiles: &[Tile]) -> Vec<ConnectionMask> {
        tiles.iter().map(Tile::connections).collect()
    }

    // Tests a chiral rotation-only tile yields three new masks
    // Verified by starting the rotations at zero turns
    #[test]
    fn test_three_rotations() {
        let ids = TileIdAllocator::new();
        let corner = base(&ids, "T3,T4,R3,R4", false, false);
        let variants = TilePermuter::new(&ids).permute(&corner).unwrap();

        assert_eq!(variants.len(), MAX_PERMUTATIONS);
        let distinct: HashSet<_> = masks(&variants).into_iter().collect();
        assert_eq!(distinct.len(), 3);
        assert!(!distinct.contains(&corner.connections()));
        assert_eq!(
            masks(&variants),
            vec![
                corner.connections().rotate(1),
                corner.connections().rotate(2),
                corner.connections().rotate(3),
            ]
        );
    }

    // Tests a half-turn symmetric tile skips its 180 degree variant
    // Verified by removing the symmetry check
    #[test]
    fn test_symmetric_tile_skips_half_turn() {
        let ids = TileIdAllocator::new();
        let corridor = base(&ids, "T3,T4,B3,B4", false, false);
        let variants = TilePermuter::new(&ids).permute(&corridor).unwrap();

        assert_eq!(variants.len(), 2);
        let rotations: Vec<Rotation> = variants.iter().map(|t| t.orientation().rotation).collect();
        assert_eq!(rotations, vec![Rotation::Quarter, Rotation::ThreeQuarter]);
        assert!(
            variants
                .iter()
                .all(|t| t.connections() != corridor.connections())
        );
    }

    // Tests a chiral flippable tile yields seven distinct masks
    // Verified by rotating the base mask instead of the flipped one
    #[test]
    fn test_flippable_yields_seven() {
        let ids = TileIdAllocator::new();
        let hook = base(&ids, "T0,T1,R5", true, false);
        let variants = TilePermuter::new(&ids).permute(&hook).unwrap();

        assert_eq!(variants.len(), MAX_FLIPPABLE_PERMUTATIONS);
        let distinct: HashSet<_> = masks(&variants).into_iter().collect();
        assert_eq!(distinct.len(), 7);
        assert!(!distinct.contains(&hook.connections()));

        let flipped = variants.iter().filter(|t| t.orientation().flipped).count();
        assert_eq!(flipped, 4);
        assert_eq!(
            variants.get(3).map(Tile::connections),
            Some(hook.connections().flip_horizontal())
        );
    }

    // Tests variants inherit theme and capability but not permutability
    // Verified by copying the base flags verbatim
    #[test]
    fn test_variant_flags() {
        let ids = TileIdAllocator::new();
        let entrance = base(&ids, "R3,R4", true, true);
        let variants = TilePermuter::new(&ids).permute(&entrance).unwrap();

        for variant in &variants {
            assert!(variant.is_entrance());
            assert!(!variant.is_exit());
            assert!(!variant.is_permutable());
            assert!(!variant.is_flippable());
            assert_eq!(variant.theme(), "fort");
            assert_eq!(variant.orientation().base, Some(entrance.id()));
        }
    }

    // Tests every variant gets a fresh id and a suffixed name
    // Verified by reusing the base id
    #[test]
    fn test_variant_ids_and_names() {
        let ids = TileIdAllocator::new();
        let corner = base(&ids, "T3,R3", true, false);
        let variants = TilePermuter::new(&ids).permute(&corner).unwrap();

        let id_set: HashSet<_> = variants.iter().map(Tile::id).collect();
        assert_eq!(id_set.len(), variants.len());
        assert!(!id_set.contains(&corner.id()));

        let names: Vec<&str> = variants.iter().map(Tile::name).collect();
        assert_eq!(names.first(), Some(&"corner_r90"));
        assert!(names.contains(&"corner_f"));
        assert!(names.contains(&"corner_f_r270"));
    }

    // Tests permuting a non-permutable tile fails
    // Verified by returning an empty list instead
    #[test]
    fn test_non_permutable_rejected() {
        let ids = TileIdAllocator::new();
        let fixed = Tile::new(
            &ids,
            "fixed",
            "fort",
            ConnectionMask::ZERO,
            TileFlags::default(),
        )
        .unwrap();

        let result = TilePermuter::new(&ids).permute(&fixed);
        assert!(matches!(result, Err(DungeonError::InvalidArgument { .. })));
    }
}
