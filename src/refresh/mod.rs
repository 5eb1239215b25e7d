pub mod fetcher;
pub mod health;
pub mod scheduler;

pub use fetcher::{RefreshTrigger, TokenFetcher};
pub use scheduler::RefreshScheduler;
