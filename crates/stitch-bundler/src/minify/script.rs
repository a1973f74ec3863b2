//! Script minification with oxc.

use std::path::{Path, PathBuf};

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::sourcemap::RawSourceMap;
use crate::{Error, Result};

/// Minified script and, when requested, its external source map.
#[derive(Debug, Clone)]
pub struct MinifiedScript {
    pub code: String,
    pub map: Option<RawSourceMap>,
}

/// Minify one script. `path` is used for diagnostics and the map's source.
pub fn minify_script(path: &str, source: &str, source_map: bool) -> Result<MinifiedScript> {
    let allocator = Allocator::default();
    let source_type = SourceType::from_path(Path::new(path)).unwrap_or_else(|_| SourceType::mjs());

    let parsed = Parser::new(&allocator, source, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(Error::Minify {
            file: path.to_string(),
            message: if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            },
        });
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);

    let options = CodegenOptions {
        source_map_path: source_map.then(|| PathBuf::from(path)),
        ..CodegenOptions::minify()
    };
    let generated = Codegen::new()
        .with_options(options)
        .with_scoping(minified.scoping)
        .build(&program);

    let map = generated
        .map
        .map(|map| RawSourceMap::from_json(path, &map.to_json_string()))
        .transpose()?;

    Ok(MinifiedScript {
        code: generated.code,
        map,
    })
}

/// Fail on the first character above U+00FF.
pub fn check_latin1(file: &str, code: &str) -> Result<()> {
    match code.chars().find(|c| u32::from(*c) > 0xFF) {
        Some(character) => Err(Error::NonLatin1Output {
            file: file.to_string(),
            character,
            code_point: u32::from(character),
        }),
        None => Ok(()),
    }
}
