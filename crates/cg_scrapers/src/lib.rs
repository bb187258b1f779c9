pub mod cli;
pub mod extract;
pub mod feed;
pub mod http;
pub mod logging;
pub mod paginator;

pub use cli::{FeedArgs, ScrapeArgs};
pub use http::HttpFeedSource;
pub use logging::{init_logging, Logger};
pub use paginator::{PaginationOutcome, Paginator};
