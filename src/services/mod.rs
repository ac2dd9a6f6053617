pub mod collections;
pub mod fetcher;
pub mod genres;
pub mod http_transport;
pub mod retry;

pub use fetcher::ResilientFetcher;
pub use genres::{top_genres, GenreTagged, MovieGrouping};
pub use http_transport::{
    BasicCredentials, HttpTransport, ReqwestTransport, TransportError, TransportResponse,
    UpstreamRequest,
};
pub use retry::RetryPolicy;
