pub mod filters;
pub mod summary;

pub use filters::{find, paginate, Page, Pagination, QueryLimits, RecordFilter};
pub use summary::{PendingCounts, StatusCounts, Summary};
