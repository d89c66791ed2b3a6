#![cfg(unix)]

use std::fs;
use std::os::unix::fs::symlink;

use archive_dirs::catalogue::{CatalogueMapping, CatalogueRecord, CatalogueResolver};
use archive_dirs::spot::SpotMapping;
use archive_dirs::tree::{
    DirectoryRecord, ReadmeReader, RecordBuilder, TreeWalker, WalkerConfig, README_FILE_NAME,
};

use crate::integration::support::{archive_root, lossy};

fn sorted() -> WalkerConfig {
    WalkerConfig {
        sort_by_name: true,
        ..WalkerConfig::default()
    }
}

#[test]
fn project_with_linked_subdirectory() {
    let (_temp, base) = archive_root();
    let archive = base.join("archive");
    let proj = archive.join("proj");
    let data = archive.join("shared").join("data");
    fs::create_dir_all(proj.join("sub1")).unwrap();
    fs::create_dir_all(data.join("2001")).unwrap();
    fs::write(data.join(README_FILE_NAME), "shared data notes").unwrap();
    symlink(&data, proj.join("sub2")).unwrap();

    let mapping: CatalogueMapping = [(lossy(&proj), CatalogueRecord::titled("Project"))]
        .into_iter()
        .collect();
    let catalogue = CatalogueResolver::new(mapping, None);
    let spots = SpotMapping::new(vec![archive.clone()]);
    let builder = RecordBuilder::new(&spots, &catalogue, ReadmeReader::default());
    let walker = TreeWalker::new(&builder, sorted());

    let mut walk = walker.walk(&proj).unwrap();
    let records: Vec<DirectoryRecord> = walk.by_ref().collect();
    let stats = walk.stats();
    let readmes = walk.into_readmes();

    let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
    let sub2 = proj.join("sub2");
    assert_eq!(
        paths,
        vec![
            lossy(&proj),
            lossy(&proj.join("sub1")),
            lossy(&sub2),
            lossy(&sub2.join("2001")),
        ]
    );

    let link = &records[2];
    assert!(link.is_link_root);
    assert_eq!(link.canonical_path, lossy(&data));
    assert_eq!(link.name, "sub2");

    // Below the link root, canonical paths live under the target
    let below = &records[3];
    assert!(!below.is_link_root);
    assert_eq!(below.canonical_path, lossy(&data.join("2001")));

    // Only records whose canonical path sits under the project inherit its title
    assert_eq!(records[0].title.as_deref(), Some("Project"));
    assert_eq!(records[1].title.as_deref(), Some("Project"));
    assert!(records[2].title.is_none());

    assert_eq!(stats.link_roots, 1);
    assert_eq!(readmes.get(&lossy(&sub2)), Some("shared data notes"));
}

#[test]
fn link_flag_only_on_symlinks_that_move() {
    let (_temp, base) = archive_root();
    let archive = base.join("archive");
    let outside = base.join("elsewhere").join("target");
    fs::create_dir_all(archive.join("real").join("inner")).unwrap();
    fs::create_dir_all(&outside).unwrap();
    symlink(archive.join("real"), archive.join("alias")).unwrap();
    symlink(&outside, archive.join("escape")).unwrap();
    fs::write(archive.join("real").join("file.nc"), "x").unwrap();
    symlink(archive.join("real").join("file.nc"), archive.join("file_link")).unwrap();

    let catalogue = CatalogueResolver::new(CatalogueMapping::new(), None);
    let spots = SpotMapping::new(vec![archive.clone()]);
    let builder = RecordBuilder::new(&spots, &catalogue, ReadmeReader::default());
    let records: Vec<DirectoryRecord> = TreeWalker::new(&builder, sorted())
        .walk(&archive)
        .unwrap()
        .collect();

    let below_alias = format!("{}/", lossy(&archive.join("alias")));
    for record in records.iter().filter(|r| !r.path.starts_with(&below_alias)) {
        assert_eq!(
            record.is_link_root,
            record.path != record.canonical_path,
            "{}",
            record.path
        );
    }

    let alias = records.iter().find(|r| r.name == "alias").unwrap();
    assert!(alias.is_link_root);
    assert!(records
        .iter()
        .any(|r| r.path == lossy(&archive.join("alias").join("inner"))));

    // Targets outside the archive keep their literal path and are not followed
    let escape = records.iter().find(|r| r.name == "escape").unwrap();
    assert!(!escape.is_link_root);
    assert_eq!(escape.canonical_path, escape.path);

    assert!(records.iter().all(|r| r.name != "file_link"));
}
