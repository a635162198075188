//! AllDebrid API - HTTP client for the AllDebrid v4 REST API.
//!
//! This crate provides a typed client covering the account/pin, link,
//! magnet, saved-link and history endpoints. It handles bearer
//! authentication, the mandatory `agent` parameter, API key validation,
//! decoding of the `{status, data, error}` envelope, and transport retries
//! for idempotent endpoints.

pub mod client;
pub mod endpoints;
pub mod response;
pub mod routes;

// Re-export key types
pub use client::{ApiClient, RetryConfig};
pub use endpoints::account::{PinInfo, PinStatus, UserInfo};
pub use endpoints::links::{DelayedLink, DelayedState, StreamQuality, StreamRequest, UnlockedLink};
pub use endpoints::magnets::{InstantAvailability, MagnetLink, MagnetStatus, UploadedFile, UploadedMagnet};
pub use endpoints::saved::SavedLink;
pub use response::{ApiErrorBody, ApiResponse};
pub use routes::{Endpoint, EndpointTable};
