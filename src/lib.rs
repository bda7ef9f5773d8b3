//! Discover and download annual and periodic reports of A-share and Hong Kong
//! listed companies from the cninfo disclosure registry.

pub mod classifier;
pub mod cli;
pub mod cninfo;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod query;
pub mod selector;
pub mod stocks;
pub mod storage;
