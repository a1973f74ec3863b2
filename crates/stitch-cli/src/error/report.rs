//! Conversion of CLI errors to miette reports.

use crate::error::CliError;
use miette::Report;

/// Convert a `CliError` to a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundler(e) => bundler_error_to_miette(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}

/// Convert a library error, keeping its code and help text.
pub fn bundler_error_to_miette(err: stitch_bundler::Error) -> Report {
    Report::new(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundler_error_keeps_code() {
        let report = cli_error_to_miette(CliError::Bundler(
            stitch_bundler::Error::NonLatin1Output {
                file: "vs/a.js".to_string(),
                character: '\u{2014}',
                code_point: 0x2014,
            },
        ));

        let code = report.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("NON_LATIN1_OUTPUT"));
        assert!(report.to_string().contains("vs/a.js"));
        assert!(report.help().is_some());
    }

    #[test]
    fn test_custom_error_message() {
        let report = cli_error_to_miette(CliError::Custom("nope".to_string()));
        assert_eq!(report.to_string(), "nope");
    }
}
