pub mod cache;
pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;
pub mod types;

mod admin;
mod auth;
mod gems;
mod orders;
mod payments;
mod reviews;
mod wishlist;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheTier, CacheTiers, RequestCache};
pub use client::{ApiClient, ReadOptions};
pub use envelope::Envelope;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
