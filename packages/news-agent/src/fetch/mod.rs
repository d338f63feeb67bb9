//! Fetch layer: proxy-unlocker client plus retry policy.

pub mod retry;
pub mod unlocker;

pub use retry::{RetryFetcher, Sleeper, TokioSleeper};
pub use unlocker::UnlockerFetcher;
