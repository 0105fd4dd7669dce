//! Postgres repositories implementing the core store traits.

pub mod catalog_repo;
pub mod match_repo;
pub mod opportunity_repo;

pub use catalog_repo::CatalogRepository;
pub use match_repo::MatchRepository;
pub use opportunity_repo::OpportunityRepository;
