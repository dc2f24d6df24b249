pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod normalize;
pub mod result;

pub use config::ExplorerConfig;
pub use error::ScanError;
pub use extractor::LinkExtractor;
pub use fetcher::{FetchedPage, ProxyFetcher};
pub use normalize::normalize_url;
pub use result::{Extraction, LinkRecord};
