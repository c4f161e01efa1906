pub mod api;
pub mod extract;


pub use api::IssueListingClient;
pub use extract::IssueExtractor;
