//! Order building and submission.
//!
//! `OrderBuilder` turns project metadata plus a `PurchaseConfig` into an
//! `OrderDraft`; `OrderSession` walks the draft through prepare, confirm and
//! create; `run_purchase` chains the two for the command line.

mod builder;
mod flow;
mod session;
mod types;

pub use builder::{assemble, OrderBuilder};
pub use flow::{run_purchase, PurchaseOutcome};
pub use session::OrderSession;
pub use types::*;

use thiserror::Error;

use crate::api::ApiError;

/// Errors raised while building or submitting an order.
///
/// Envelope-level rejections from prepare/confirm/create are not errors;
/// they come back as `ApiResponse` values.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Transport failure, or a metadata call the draft cannot do without.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A configured index does not exist in the list the API returned.
    #[error("{list} index {index} out of range (list has {len} entries)")]
    IndexOutOfRange {
        list: &'static str,
        index: usize,
        len: usize,
    },

    /// The project needs real-name buyers and none were configured.
    #[error("Project requires real-name buyers but purchase.buyer_index is empty")]
    MissingBuyerIndex,

    /// A dated project with no date to query sessions for.
    #[error("Project {project_id} sells by date but no sale date is available")]
    MissingSaleDate { project_id: u64 },

    /// Confirm or create called before a successful prepare.
    #[error("Order has no token, prepare it first")]
    NotPrepared,
}
