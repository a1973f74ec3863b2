//! Stylesheet minification with lightningcss.

use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};

use crate::{Error, Result};

pub fn minify_style(path: &str, source: &str) -> Result<String> {
    let minify_error = |message: String| Error::Minify {
        file: path.to_string(),
        message,
    };

    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: path.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| minify_error(format!("parse: {e}")))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| minify_error(format!("minify: {e}")))?;

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| minify_error(format!("print: {e}")))?;

    Ok(printed.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_style() {
        let css = ".monaco-editor {\n    color: #ff0000;\n    margin: 0px 0px 0px 0px;\n}\n";
        let minified = minify_style("vs/editor.css", css).unwrap();
        assert!(minified.len() < css.len());
        assert!(minified.contains("color:red"));
        assert!(!minified.contains('\n'));
    }
}
