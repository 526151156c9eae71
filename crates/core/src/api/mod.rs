//! Ticketing web service API.
//!
//! This module provides the `ShowApi` trait covering every remote call the
//! purchase flow makes, and an HTTP implementation talking to the real
//! service with a logged-in account cookie.

mod client;
mod types;

pub use client::HttpShowApi;
pub use types::*;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur when talking to the ticketing API.
///
/// A response whose envelope carries a non-zero errno is not an error at this
/// layer; it is returned as an `ApiResponse` and judged by the caller.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Envelope reported a failure where a payload was required.
    #[error("API rejected request: errno {errno} - {msg}")]
    Rejected { errno: i64, msg: String },

    /// Envelope reported success without a payload.
    #[error("API response has no data")]
    MissingData,

    /// Client not configured (bad cookie, etc.).
    #[error("Client not configured: {0}")]
    NotConfigured(String),
}

/// Remote calls needed to look up a project and place an order.
#[async_trait]
pub trait ShowApi: Send + Sync {
    /// Project metadata with its sessions and ticket tiers.
    async fn project(&self, project_id: u64) -> Result<ApiResponse<ProjectInfo>, ApiError>;

    /// Sessions and tiers of a dated project for one sale date.
    async fn project_by_date(
        &self,
        project_id: u64,
        date: &str,
    ) -> Result<ApiResponse<ProjectInfo>, ApiError>;

    /// Real-name buyers registered on the account.
    async fn buyers(&self, project_id: u64) -> Result<ApiResponse<BuyerList>, ApiError>;

    /// Shipping addresses registered on the account.
    async fn addresses(&self) -> Result<ApiResponse<AddressList>, ApiError>;

    /// Reserve a purchase and obtain an order token.
    async fn prepare(
        &self,
        request: &PrepareRequest,
    ) -> Result<ApiResponse<PrepareData>, ApiError>;

    /// Fetch the confirmation page data for a token.
    async fn confirm(&self, project_id: u64, token: &str)
        -> Result<ApiResponse<Value>, ApiError>;

    /// Submit the order.
    async fn create(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<ApiResponse<CreateOrderData>, ApiError>;
}
