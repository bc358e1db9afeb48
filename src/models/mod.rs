// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    non_empty, parse_start_date, parse_truthy, Candidate, Coordinate, DistanceBand, Locality,
    RankingPolicy, Region, Requester, SearchConfig, StructuredResponse, TriState,
};
pub use requests::{FilterListingsRequest, RankResponsesRequest, RegionRequest};
pub use responses::{
    ErrorResponse, FilterListingsResponse, HealthResponse, RankResponsesResponse, RequestersResponse,
};
