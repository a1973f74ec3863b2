#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Command, parse_language, parse_parallelism};
    use clap::Parser;
    use std::path::PathBuf;

    #[test]
    fn test_parse_parallelism() {
        assert_eq!(parse_parallelism("4"), Ok(4));
        assert!(parse_parallelism("0").is_err());
        assert!(parse_parallelism("-1").is_err());
        assert!(parse_parallelism("many").is_err());
    }

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("de"), Ok("de".to_string()));
        assert_eq!(parse_language("zh-TW"), Ok("zh-tw".to_string()));
        assert!(parse_language("").is_err());
        assert!(parse_language("x").is_err());
        assert!(parse_language("de_DE").is_err());
    }

    #[test]
    fn test_build_args() {
        let cli = Cli::parse_from([
            "stitch",
            "build",
            "--entry",
            "vs/app",
            "-e",
            "vs/worker",
            "--out-dir",
            "out-build",
            "--max-parallel",
            "2",
            "-l",
            "de",
            "--no-bundle-info",
        ]);

        match cli.command {
            Command::Build(args) => {
                assert_eq!(args.entries, vec!["vs/app", "vs/worker"]);
                assert_eq!(args.out_dir, Some(PathBuf::from("out-build")));
                assert_eq!(args.max_parallel, Some(2));
                assert_eq!(args.languages, vec!["de"]);
                assert!(args.no_bundle_info);
                assert!(!args.serial);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn test_serial_conflicts_with_max_parallel() {
        let result = Cli::try_parse_from(["stitch", "build", "--serial", "--max-parallel", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_minify_args() {
        let cli = Cli::parse_from(["stitch", "-q", "minify", "out", "--no-source-maps"]);
        assert!(cli.quiet);

        match cli.command {
            Command::Minify(args) => {
                assert_eq!(args.dir, PathBuf::from("out"));
                assert!(args.out_dir.is_none());
                assert!(args.no_source_maps);
            }
            _ => panic!("expected minify command"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["stitch", "-q", "-v", "minify", "out"]).is_err());
    }
}
