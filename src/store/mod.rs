pub mod state;

pub use state::TokenStore;
