use std::fs;

use archive_dirs::catalogue::{CatalogueMapping, CatalogueRecord, CatalogueResolver};
use archive_dirs::spot::SpotMapping;
use archive_dirs::tree::{ReadmeReader, RecordBuilder, TreeWalker, WalkerConfig};

use crate::integration::support::{archive_root, lossy};

#[test]
fn repeated_walks_produce_identical_records() {
    let (_temp, root) = archive_root();
    for dir in ["a/x/1", "a/y", "b", "c/z"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(root.join("a").join("00README"), "about a").unwrap();

    let mapping: CatalogueMapping = [(lossy(&root.join("a")), CatalogueRecord::titled("A"))]
        .into_iter()
        .collect();
    let catalogue = CatalogueResolver::new(mapping, None);
    let spots = SpotMapping::new(vec![root.clone()]);
    let builder = RecordBuilder::new(&spots, &catalogue, ReadmeReader::default());
    let config = WalkerConfig {
        sort_by_name: true,
        attach_readmes: true,
        ..WalkerConfig::default()
    };
    let walker = TreeWalker::new(&builder, config);

    let first: Vec<String> = walker
        .walk(&root)
        .unwrap()
        .map(|record| record.to_line().unwrap())
        .collect();
    let second: Vec<String> = walker
        .walk(&root)
        .unwrap()
        .map(|record| record.to_line().unwrap())
        .collect();

    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
    assert!(!catalogue.persist().unwrap());
}
