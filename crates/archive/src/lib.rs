pub mod error;
pub mod ingest;
pub mod package;
pub mod resize;
pub mod workspace;

pub use error::{ArchiveError, PackageError};
pub use ingest::{ingest_combined, ingest_separate, IngestOptions, Ingested};
pub use package::{archive_file_name, package, Packaged};
pub use resize::{resize_image, Dimensions, ResizeError, ResizeSpec};
pub use workspace::RunWorkspace;
