#![forbid(unsafe_code)]

pub mod api;
pub mod blend;
pub mod error;
pub mod fetch;
pub mod layout;
pub mod model;
pub mod overlay;

pub use api::{DEFAULT_BASE_URL, IconApi, SubEntityKind, XivApiClient};
pub use blend::{BlendOptions, blend, collect_icon_paths, resolve_parent};
pub use error::{JobIconsError, JobIconsResult};
pub use layout::OutputLayout;
pub use model::{ClassJobInfo, IconRecord};
pub use overlay::overlay;

/// Outcome of one batch stage. Failed entities are reported by name and
/// skipped, never retried; a nonempty `failed` list makes the run exit
/// nonzero.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub processed: Vec<String>,
    pub failed: Vec<String>,
}

impl BatchSummary {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}
