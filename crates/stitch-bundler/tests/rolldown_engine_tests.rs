//! Pipeline tests against the real Rolldown engine.
//!
//! These run the default engine end to end on a small TypeScript project so
//! that map handling and header detection are checked on actual engine
//! output rather than a scripted one.

mod helpers;

use std::fs;

use helpers::{create_project, read_tree, write_source};
use stitch_bundler::builders::header::DEFAULT_HEADER;
use stitch_bundler::{BundleMetadata, EntryPoint, Pipeline, PipelineOptions};
use tempfile::TempDir;

const APP: &str = "/*---------------------------------------------\n * Copyright (c) Example Corp. All rights reserved.\n *--------------------------------------------*/\nimport { b } from './b';\n\nexport const answer: number = b + 1;\n";
const B: &str = "export const b: number = 41;\n";

/// Test helper to create a two-file TypeScript project
fn create_ts_project() -> TempDir {
    let project = create_project(&[]);
    let src = project.path().join("src");
    write_source(&src, "vs/app.ts", APP);
    write_source(&src, "vs/b.ts", B);
    project
}

fn options(project: &TempDir) -> PipelineOptions {
    PipelineOptions::new(project.path().join("src"), project.path().join("out"))
        .entry_point(EntryPoint::new("vs/app"))
}

#[tokio::test]
async fn test_run_writes_one_map_per_script() {
    let project = create_ts_project();
    let out = project.path().join("out");

    let result = Pipeline::new(options(&project)).run().await;
    if let Err(e) = &result {
        panic!("Rolldown build should succeed, but got error: {e:?}");
    }

    let paths: Vec<String> = read_tree(&out).into_iter().map(|(p, _)| p).collect();
    let scripts: Vec<&String> = paths.iter().filter(|p| p.ends_with(".js")).collect();
    let maps: Vec<&String> = paths.iter().filter(|p| p.ends_with(".map")).collect();

    assert!(paths.contains(&"vs/app.js".to_string()));
    assert_eq!(scripts.len(), maps.len(), "one map per script: {paths:?}");
    for script in scripts {
        assert!(maps.contains(&&format!("{script}.map")), "{script} has no map");

        let code = fs::read_to_string(out.join(script)).unwrap();
        assert_eq!(
            code.matches("sourceMappingURL").count(),
            1,
            "{script} should carry exactly one mapping comment"
        );
    }
}

#[tokio::test]
async fn test_bundle_info_records_imports() {
    let project = create_ts_project();
    let out = project.path().join("out");

    Pipeline::new(options(&project)).run().await.unwrap();

    let info = fs::read_to_string(out.join("bundleInfo.json")).unwrap();
    let metadata: BundleMetadata = serde_json::from_str(&info).unwrap();
    assert_eq!(metadata.graph["vs/app"], vec!["vs/b".to_string()]);
    assert!(metadata.bundles.contains_key("vs/app"));
}

#[tokio::test]
async fn test_header_added_with_source_maps_disabled() {
    let project = create_ts_project();
    let mut options = options(&project);
    options.source_maps.enabled = false;

    let files = Pipeline::new(options).assemble().await.unwrap();

    let app = files.iter().find(|f| f.path == "vs/app.js").unwrap();
    assert!(app.text().starts_with(DEFAULT_HEADER));
    assert_eq!(app.text().matches(DEFAULT_HEADER).count(), 1);
    assert!(files.iter().all(|f| !f.path.ends_with(".map")));
    assert!(files.iter().all(|f| !f.text().contains("sourceMappingURL")));
}

#[tokio::test]
async fn test_header_added_with_source_maps_enabled() {
    let project = create_ts_project();

    let files = Pipeline::new(options(&project)).assemble().await.unwrap();

    let app = files.iter().find(|f| f.path == "vs/app.js").unwrap();
    assert!(app.text().starts_with(DEFAULT_HEADER));
    assert_eq!(
        files.iter().filter(|f| f.path == "vs/app.js.map").count(),
        1
    );
}
