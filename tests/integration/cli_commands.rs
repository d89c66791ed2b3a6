use std::fs;

use archive_dirs::config::{AppConfig, SinkKind};
use archive_dirs::tooling::cli::{CliContext, Commands};
use archive_dirs::tree::DirectoryRecord;
use serde_json::Value;

use crate::integration::support::{archive_root, lossy};

#[test]
fn walk_then_index_then_update_readmes() {
    let (_temp, base) = archive_root();
    let spot = base.join("archive").join("spot1");
    for dir in ["a/x", "b"] {
        fs::create_dir_all(spot.join(dir)).unwrap();
    }
    fs::write(spot.join("a").join("00README"), "dataset a").unwrap();

    let spot_file = base.join("spots.txt");
    fs::write(&spot_file, format!("# spots\nspot1 {}\n", lossy(&spot))).unwrap();
    let snapshot = base.join("mapping.json");
    fs::write(
        &snapshot,
        format!(
            r#"{{"{}": {{"title": "A", "url": "http://cat/a"}}}}"#,
            lossy(&spot.join("a"))
        ),
    )
    .unwrap();

    let processing = base.join("processing");
    let mut config = AppConfig::default();
    config.archive.roots = vec![base.join("archive")];
    config.archive.spot_file = Some(spot_file);
    config.catalogue.mapping_snapshot = Some(snapshot);
    config.catalogue.live_lookups = false;
    config.walker.sort_by_name = true;
    config.files.processing_directory = Some(processing.clone());
    config.files.missing_metadata_file = base.join("missing_metadata.txt");
    config.index.sink = SinkKind::Ndjson;
    config.index.output_file = Some(base.join("bulk.ndjson"));
    let context = CliContext::new(config).unwrap();

    let dir_arg = format!("{}/", lossy(&spot));
    let output = context
        .execute(&Commands::Walk {
            dir: dir_arg.into(),
            output_dir: processing.clone(),
        })
        .unwrap();
    assert!(output.contains("Directories found"));

    let records_file = processing.join("spot1_directories.txt");
    let content = fs::read_to_string(&records_file).unwrap();
    let records: Vec<DirectoryRecord> = content
        .lines()
        .map(|l| DirectoryRecord::from_line(l).unwrap())
        .collect();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].path, lossy(&spot));
    let titled: Vec<&str> = records
        .iter()
        .filter(|r| r.has_title())
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(titled, vec!["a", "x"]);

    let readmes: Value =
        serde_json::from_str(&fs::read_to_string(processing.join("spot1_readmes.json")).unwrap())
            .unwrap();
    assert_eq!(readmes[lossy(&spot.join("a"))], "dataset a");

    // A second copy of the same walk output must not double the index
    fs::copy(&records_file, processing.join("copy_directories.txt")).unwrap();
    context.execute(&Commands::IndexDirs).unwrap();

    let missing = fs::read_to_string(base.join("missing_metadata.txt")).unwrap();
    assert_eq!(missing.lines().count(), 2);
    let bulk = fs::read_to_string(base.join("bulk.ndjson")).unwrap();
    assert_eq!(bulk.lines().count(), 4);

    context.execute(&Commands::UpdateReadmes).unwrap();
    let bulk = fs::read_to_string(base.join("bulk.ndjson")).unwrap();
    assert_eq!(bulk.lines().count(), 6);
    assert!(bulk.lines().last().unwrap().contains("dataset a"));
}

#[test]
fn walking_a_missing_root_fails() {
    let (_temp, base) = archive_root();
    let mut config = AppConfig::default();
    config.catalogue.live_lookups = false;
    let context = CliContext::new(config).unwrap();

    let result = context.execute(&Commands::Walk {
        dir: base.join("nope"),
        output_dir: base.join("out"),
    });
    assert!(result.is_err());
    assert!(!base.join("out").exists());
}
