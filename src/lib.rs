//! Fantasy fighter draft: rank the free-agent pool by pairwise matchup strength, hand fighters
//! to the smallest rosters first, and optionally run the draft live against a volatile board.

pub mod cli;
pub mod config;
pub mod data;
pub mod draft;
pub mod error;
pub mod logging;
pub mod server;
pub mod volatility;
