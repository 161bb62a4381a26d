//! Client library for the Aurelane gemstone marketplace.
//!
//! The interesting parts are the request cache in [`api::cache`] (TTL
//! entries, in-flight deduplication, supersession of stale requests) and
//! the checkout state machine in [`checkout`]. Everything else is typed
//! endpoint plumbing over the marketplace REST API.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod storage;

pub use api::{ApiClient, ApiError, CacheTier, HttpTransport, ReadOptions};
pub use cart::{Cart, CartItem};
pub use checkout::{CheckoutFlow, CheckoutResult, CheckoutState, Navigation, PaymentMethod};
pub use config::Config;
pub use storage::{AuthSession, SessionStore};
