//! REST boundary with the ImovLocal backend.

pub mod api;

pub use api::{ApiClient, ApiError, BannerBackend, PropertyBackend, SubmissionPayload};
