pub mod appeal;
pub mod content;
pub mod decide;
pub mod queue;
pub mod stats;

use serde::Deserialize;

/// Shared ?page=&limit= query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}
