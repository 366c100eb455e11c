pub mod archive;
pub mod classifier;
pub mod config;
pub mod error;
pub mod heuristics;
pub mod host;
pub mod messaging;
pub mod page_signals;
pub mod probe;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use archive::{ArchiveResolver, SnapshotSource};
pub use classifier::LinkClassifier;
pub use config::Config;
pub use error::{LinkrotError, Result};
pub use heuristics::Heuristics;
pub use messaging::{LinkService, Request, Response};
pub use page_signals::PageSignals;
pub use probe::{HttpProber, ProbeError, ProbeResponse, Prober};
pub use types::{ArchiveCheck, ArchiveSnapshot, LinkCheckResult, LinkStatus};
