//! raidnight-wcl: Warcraft Logs collaborators for raidnight
//!
//! - [`WclClient`]: report API client implementing `ReportSource`
//! - [`ScorePageScraper`]: `ScoreSource` over pre-rendered ranking pages
//!
//! Both take a [`WclConfig`] at construction time and retry server errors
//! under its [`RetryPolicy`] before surfacing a `FetchError`.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;
pub mod scores;

pub use client::WclClient;
pub use config::{RetryPolicy, WclConfig, DEFAULT_BASE_URL, DEFAULT_SITE_URL};
pub use error::WclError;
pub use retry::with_retry;
pub use scores::{parse_score_page, PageSource, ScorePageScraper, HEALER_SPECS};
