//! Directory tree traversal and record assembly.

pub mod builder;
pub mod readme;
pub mod record;
pub mod walker;

pub use builder::RecordBuilder;
pub use readme::{ReadmeDecoding, ReadmeReader, ReadmeStore, README_FILE_NAME};
pub use record::{path_depth, DirectoryRecord, RecordKind};
pub use walker::{TreeWalk, TreeWalker, WalkStats, WalkerConfig};
