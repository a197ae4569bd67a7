pub mod client;
pub mod enrich;

pub use client::{MatchClient, MatchConfig, MatchError, MatchResponse, Matcher};
pub use enrich::enrich;
