pub mod client;

pub use client::{CardApiClient, CardApiError, CardLookup};
