//! Tests for command-line parsing and the map runner

#[cfg(test)]
mod tests {
    use clap::Parser;
    use dungeontile::io::cli::{Cli, MapRunner};
    use dungeontile::io::configuration::{
        DEFAULT_ATTEMPTS, DEFAULT_COLS, DEFAULT_CONNECTION_CHANCE, DEFAULT_ROWS, DEFAULT_SEED,
    };
    use image::{Rgba, RgbaImage};
    use log::LevelFilter;
    use std::ffi::OsString;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Tile set covering every combination of centred doors
    fn write_tile_set(dir: &Path) {
        let descriptors = [
            "gate;fort;B3,B4;true;false;true;false",
            "end;fort;B3,B4;false;false;true;false",
            "hall;fort;T3,T4,B3,B4;false;false;true;false",
            "corner;fort;T3,T4,R3,R4;false;false;true;false",
            "tee;fort;T3,T4,R3,R4,B3,B4;false;false;true;false",
            "cross;fort;T3,T4,R3,R4,B3,B4,L3,L4;false;false;false;false",
            "closed;fort;;false;false;false;false",
            "empty;fort;;false;false;false;false",
        ];
        let image = RgbaImage::from_pixel(4, 4, Rgba([40, 40, 40, 255]));
        for descriptor in descriptors {
            image.save(dir.join(format!("{descriptor}.png"))).unwrap();
        }
    }

    fn args(tiles: &Path, extra: &[&str]) -> Vec<OsString> {
        let mut args = vec![OsString::from("dungeontile"), tiles.as_os_str().to_owned()];
        args.extend(extra.iter().map(OsString::from));
        args
    }

    // Tests CLI parsing with only the required tile directory
    // Verified by changing default values to ensure defaults are used
    #[test]
    fn test_cli_parse_minimal_args() {
        let cli = Cli::parse_from(["dungeontile", "tiles"]);

        assert_eq!(cli.target, PathBuf::from("tiles"));
        assert_eq!(cli.cols, DEFAULT_COLS);
        assert_eq!(cli.rows, DEFAULT_ROWS);
        assert_eq!(cli.chance, DEFAULT_CONNECTION_CHANCE);
        assert_eq!(cli.seed, DEFAULT_SEED);
        assert_eq!(cli.attempts, DEFAULT_ATTEMPTS);
        assert_eq!(cli.coverage, None);
        assert_eq!(cli.loaded, None);
        assert!(!cli.exit);
        assert!(!cli.quiet);
        assert_eq!(cli.log_level(), LevelFilter::Info);
    }

    // Tests CLI parsing with all available arguments
    // Verified by wiring --rows to the cols field
    #[test]
    fn test_cli_parse_all_args() {
        let cli = Cli::parse_from([
            "dungeontile",
            "tiles",
            "--cols",
            "8",
            "--rows",
            "5",
            "--chance",
            "75",
            "--seed",
            "9",
            "--count",
            "4",
            "--attempts",
            "3",
            "--output",
            "maps",
            "--exit",
            "--validate",
            "--coverage",
            "6",
            "--iterations",
            "12",
            "--verbose",
        ]);

        assert_eq!((cli.cols, cli.rows), (8, 5));
        assert_eq!(cli.chance, 75);
        assert_eq!(cli.count, 4);
        assert_eq!(cli.attempts, 3);
        assert_eq!(cli.coverage, Some(6));
        assert_eq!(cli.iterations, 12);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        assert_eq!(cli.output_path(2), PathBuf::from("maps").join("map_2.png"));

        let config = cli.generation_config();
        assert_eq!(config.seed, 9);
        assert!(config.place_exit);
        assert!(config.validate);
    }

    // Tests --quiet and --verbose cannot be combined
    // Verified by removing the conflict
    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["dungeontile", "tiles", "-q", "-v"]).is_err());

        let quiet = Cli::parse_from(["dungeontile", "tiles", "-q"]);
        assert_eq!(quiet.log_level(), LevelFilter::Warn);
        assert!(!quiet.should_show_progress());
    }

    // Tests a chance above u8 range is refused by the parser
    // Verified by parsing chance as u32
    #[test]
    fn test_chance_out_of_range() {
        assert!(Cli::try_parse_from(["dungeontile", "tiles", "--chance", "300"]).is_err());
    }

    // Tests a batch run writes one image per map
    // Verified by reusing the first output path for every map
    #[test]
    fn test_runner_writes_maps() {
        let tiles = TempDir::new().unwrap();
        write_tile_set(tiles.path());
        let output = TempDir::new().unwrap();

        let cli = Cli::parse_from(args(
            tiles.path(),
            &["--output", &output.path().to_string_lossy(), "--count", "2", "--cols", "4", "--quiet"],
        ));
        MapRunner::new(cli).process().unwrap();

        for index in 0..2 {
            let path = output.path().join(format!("map_{index}.png"));
            let map = image::open(&path).unwrap();
            assert_eq!((map.width(), map.height()), (16, 12));
        }
    }

    // Tests coverage mode runs the harness instead of writing maps
    // Verified by writing maps in coverage mode
    #[test]
    fn test_runner_coverage_mode() {
        let tiles = TempDir::new().unwrap();
        write_tile_set(tiles.path());
        let output = TempDir::new().unwrap();

        let cli = Cli::parse_from(args(
            tiles.path(),
            &["--output", &output.path().to_string_lossy(), "--coverage", "2", "--iterations", "5", "--quiet"],
        ));
        MapRunner::new(cli).process().unwrap();

        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }

    // Tests a zero attempt budget is rejected
    // Verified by treating zero attempts as one
    #[test]
    fn test_runner_rejects_zero_attempts() {
        let tiles = TempDir::new().unwrap();
        write_tile_set(tiles.path());

        let cli = Cli::parse_from(args(tiles.path(), &["--attempts", "0", "--quiet"]));

        assert!(MapRunner::new(cli).process().is_err());
    }

    // Tests a missing tile directory fails the run but is created for next time
    // Verified by returning Ok for an empty library
    #[test]
    fn test_runner_missing_directory() {
        let root = TempDir::new().unwrap();
        let tiles = root.path().join("tiles");
        let output = root.path().join("maps");

        let cli = Cli::parse_from(args(
            &tiles,
            &["--output", &output.to_string_lossy(), "--quiet"],
        ));

        assert!(MapRunner::new(cli).process().is_err());
        assert!(tiles.is_dir());
        assert!(!output.exists());
    }

    // Tests --loaded writes every derived tile image next to the maps
    // Verified by writing only the base tiles
    #[test]
    fn test_runner_writes_loaded_tiles() {
        let tiles = TempDir::new().unwrap();
        write_tile_set(tiles.path());
        let root = TempDir::new().unwrap();
        let loaded = root.path().join("loaded");
        let output = root.path().join("maps");

        let cli = Cli::parse_from(args(
            tiles.path(),
            &[
                "--output",
                &output.to_string_lossy(),
                "--loaded",
                &loaded.to_string_lossy(),
                "--quiet",
            ],
        ));
        assert_eq!(cli.loaded.as_deref(), Some(loaded.as_path()));
        MapRunner::new(cli).process().unwrap();

        // gate 4, end 4, hall 3, corner 4, tee 4, cross, closed, empty
        assert_eq!(std::fs::read_dir(&loaded).unwrap().count(), 22);
        assert!(output.join("map_0.png").is_file());
    }
}
