use std::path::PathBuf;

use stitch_bundler::builders::header::{DEFAULT_COPYRIGHT_MARKER, DEFAULT_HEADER};

pub fn default_src_dir() -> PathBuf {
    PathBuf::from("src")
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

pub fn default_header() -> String {
    DEFAULT_HEADER.to_string()
}

pub fn default_copyright_marker() -> String {
    DEFAULT_COPYRIGHT_MARKER.to_string()
}

pub fn default_bundle_info() -> bool {
    true
}

pub fn default_source_maps_enabled() -> bool {
    true
}
