use std::fs;
use std::path::PathBuf;

use archive_dirs::catalogue::{CatalogueMapping, CatalogueRecord, CatalogueResolver};
use archive_dirs::deposit::{DepositEvents, DepositProcessor};
use archive_dirs::index::MemorySink;
use archive_dirs::spot::SpotMapping;
use archive_dirs::tree::{ReadmeReader, RecordBuilder, README_FILE_NAME};
use archive_dirs::types::{compute_document_id, DocumentIdentity};

use crate::integration::support::{archive_root, lossy};

#[test]
fn deposit_events_reach_the_sink() {
    let (_temp, root) = archive_root();
    let dataset = root.join("badc").join("cru");
    let fresh = dataset.join("v2");
    fs::create_dir_all(&fresh).unwrap();
    fs::write(dataset.join(README_FILE_NAME), "CRU notes").unwrap();

    let mapping: CatalogueMapping = [(lossy(&dataset), CatalogueRecord::titled("CRU"))]
        .into_iter()
        .collect();
    let catalogue = CatalogueResolver::new(mapping, None);
    let mut spots = SpotMapping::new(vec![root.clone()]);
    spots.insert("spot-cru", dataset.clone());
    let builder = RecordBuilder::new(&spots, &catalogue, ReadmeReader::default());

    let events = DepositEvents {
        mkdir: vec![fresh.clone()],
        rmdir: vec![dataset.join("v1")],
        symlink: vec![root.join("badc").join("missing_link")],
        readme: vec![dataset.join(README_FILE_NAME)],
    };
    let roots = vec![dataset.clone()];
    let mut sink = MemorySink::default();
    let report = DepositProcessor::new(&builder, DocumentIdentity::Path)
        .apply(&events, &roots, &mut sink)
        .unwrap();

    let upserted: Vec<PathBuf> = sink
        .upserts
        .iter()
        .map(|d| PathBuf::from(&d.document.path))
        .collect();
    assert_eq!(upserted, vec![fresh.clone(), dataset.clone()]);
    assert_eq!(sink.upserts[0].document.title.as_deref(), Some("CRU"));
    assert_eq!(sink.upserts[0].id, compute_document_id(&lossy(&fresh)));

    assert_eq!(
        sink.deletions,
        vec![compute_document_id(&lossy(&dataset.join("v1")))]
    );
    assert_eq!(sink.updates.len(), 1);
    assert_eq!(sink.updates[0].id, compute_document_id(&lossy(&dataset)));
    assert_eq!(sink.updates[0].fields["readme"], "CRU notes");

    assert_eq!(report.lines.len(), 5);
    assert!(report.lines[2].starts_with("Symlinked dirs: 1 Operation status: submitted=0"));
}

#[cfg(unix)]
#[test]
fn canonical_identity_follows_symlinks() {
    let (_temp, root) = archive_root();
    let target = root.join("shared").join("data");
    fs::create_dir_all(&target).unwrap();
    let link = root.join("proj_data");
    std::os::unix::fs::symlink(&target, &link).unwrap();

    let catalogue = CatalogueResolver::new(CatalogueMapping::new(), None);
    let spots = SpotMapping::new(vec![root.clone()]);
    let builder = RecordBuilder::new(&spots, &catalogue, ReadmeReader::default());

    let events = DepositEvents {
        symlink: vec![link.clone()],
        ..DepositEvents::default()
    };
    let mut sink = MemorySink::default();
    DepositProcessor::new(&builder, DocumentIdentity::CanonicalPath)
        .apply(&events, &[], &mut sink)
        .unwrap();

    assert_eq!(sink.upserts.len(), 1);
    let doc = &sink.upserts[0];
    assert!(doc.document.is_link_root);
    assert_eq!(doc.id, compute_document_id(&lossy(&target)));
}
