use std::fs;

use archive_dirs::catalogue::CatalogueMapping;
use archive_dirs::config::{AppConfig, SinkKind};
use archive_dirs::spot::SpotMapping;
use archive_dirs::tooling::cli::{CliContext, Commands};
use archive_dirs::tree::DirectoryRecord;
use tempfile::TempDir;

use crate::integration::support::FixedCatalogue;

fn record_line(path: &str) -> String {
    DirectoryRecord::new(path, path, false).to_line().unwrap()
}

#[test]
fn improve_coverage_resolves_from_shallow_hits() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing_metadata.txt");
    let lines: Vec<String> = [
        "/badc",
        "/badc/cru",
        "/badc/cru/data",
        "/badc/cru/data/1999",
        "/neodc/x/y",
        "/neodc/x/y/z/w/v",
    ]
    .iter()
    .map(|p| record_line(p))
    .collect();
    fs::write(&missing, lines.join("\n")).unwrap();

    let mut config = AppConfig::default();
    config.catalogue.mapping_snapshot = Some(temp.path().join("mapping.json"));
    config.files.missing_metadata_file = missing;
    config.files.reduced_missing_file = temp.path().join("reduced_missing.txt");
    config.index.sink = SinkKind::Ndjson;
    config.index.output_file = Some(temp.path().join("bulk.ndjson"));

    let service = FixedCatalogue::default().with_title("/badc/cru", "CRU");
    let catalogue = CliContext::open_catalogue(&config, Some(Box::new(service.clone()))).unwrap();
    let context = CliContext::with_parts(config, SpotMapping::default(), catalogue);

    let output = context.execute(&Commands::ImproveCoverage).unwrap();
    assert!(output.contains("Improved"));

    assert_eq!(service.calls(), vec!["/badc/cru", "/neodc/x/y"]);

    let snapshot = CatalogueMapping::load(&temp.path().join("mapping.json")).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.get("/badc/cru").unwrap().title(), Some("CRU"));

    let reduced = fs::read_to_string(temp.path().join("reduced_missing.txt")).unwrap();
    let still_missing: Vec<String> = reduced
        .lines()
        .map(|l| DirectoryRecord::from_line(l).unwrap().path)
        .collect();
    assert_eq!(still_missing, vec!["/badc", "/neodc/x/y", "/neodc/x/y/z/w/v"]);

    let bulk = fs::read_to_string(temp.path().join("bulk.ndjson")).unwrap();
    assert_eq!(bulk.lines().count(), 12);
    assert_eq!(bulk.matches("\"CRU\"").count(), 3);
}

#[test]
fn deep_pool_gets_no_lookups() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.txt");
    let lines: Vec<String> = (0..1000)
        .map(|i| record_line(&format!("/a/b/c/d/e/f/g/h/i/{}", i)))
        .collect();
    fs::write(&missing, lines.join("\n")).unwrap();

    let mut config = AppConfig::default();
    config.files.missing_metadata_file = missing;
    config.files.reduced_missing_file = temp.path().join("reduced.txt");
    config.index.sink = SinkKind::Ndjson;
    config.index.output_file = Some(temp.path().join("bulk.ndjson"));

    let service = FixedCatalogue::default();
    let catalogue = CliContext::open_catalogue(&config, Some(Box::new(service.clone()))).unwrap();
    let context = CliContext::with_parts(config, SpotMapping::default(), catalogue);
    context.execute(&Commands::ImproveCoverage).unwrap();

    assert!(service.calls().is_empty());
    let reduced = fs::read_to_string(temp.path().join("reduced.txt")).unwrap();
    assert_eq!(reduced.lines().count(), 1000);
}
