//! Housefinder - Accommodation search service for travelling employees
//!
//! This library turns a requester's work location into a search region,
//! screens scraped listings (deduplication, distance, budget and contact
//! rules) and ranks landlord responses with warnings and a summary.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    geodesic_distance_km, remove_duplicates, ListingFilter, RankingEngine, RegionCalculator, Summarizer,
};
pub use models::{Candidate, Coordinate, Region, Requester, SearchConfig, StructuredResponse};
