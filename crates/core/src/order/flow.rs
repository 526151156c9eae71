//! One purchase attempt from configuration to created order.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ApiResponse, CreateOrderData, PrepareData, ShowApi};
use crate::config::PurchaseConfig;

use super::types::OrderDraft;
use super::{OrderBuilder, OrderError, OrderSession};

/// How a purchase attempt ended.
#[derive(Debug, Clone)]
pub enum PurchaseOutcome {
    /// Draft built, nothing submitted.
    DryRun(OrderDraft),
    /// Prepare was rejected; confirm and create were skipped.
    PrepareRejected {
        draft: OrderDraft,
        response: ApiResponse<PrepareData>,
    },
    /// Prepare was accepted but carried no token to continue with.
    PreparedWithoutToken {
        draft: OrderDraft,
        response: ApiResponse<PrepareData>,
    },
    /// Create was called; its response may still be a rejection.
    Submitted {
        draft: OrderDraft,
        response: ApiResponse<CreateOrderData>,
    },
}

impl PurchaseOutcome {
    pub fn draft(&self) -> &OrderDraft {
        match self {
            PurchaseOutcome::DryRun(draft) => draft,
            PurchaseOutcome::PrepareRejected { draft, .. } => draft,
            PurchaseOutcome::PreparedWithoutToken { draft, .. } => draft,
            PurchaseOutcome::Submitted { draft, .. } => draft,
        }
    }

    /// True only when the order was created.
    pub fn is_success(&self) -> bool {
        matches!(self, PurchaseOutcome::Submitted { response, .. } if response.is_success())
    }
}

/// Build a draft and, unless `dry_run`, submit it once.
///
/// A failed confirm is logged and creation still goes ahead.
pub async fn run_purchase(
    api: Arc<dyn ShowApi>,
    purchase: &PurchaseConfig,
    dry_run: bool,
) -> Result<PurchaseOutcome, OrderError> {
    let draft = OrderBuilder::new(Arc::clone(&api)).build(purchase).await?;
    info!(
        "Order built: screen={}, sku={}, count={}, pay_money={}, delivery={}",
        draft.screen_id,
        draft.sku_id,
        draft.count,
        draft.pay_money,
        draft.deliver_info.is_some()
    );

    if !draft.is_on_sale(Utc::now()) {
        warn!(
            "Ticket is outside its sale window (start: {:?}, end: {:?})",
            draft.sale_start, draft.sale_end
        );
    }

    if dry_run {
        return Ok(PurchaseOutcome::DryRun(draft));
    }

    let mut session = OrderSession::new(api, draft);

    let prepared = session.prepare().await?;
    if session.token().is_none() {
        let draft = session.into_draft();
        return Ok(if prepared.is_success() {
            PurchaseOutcome::PreparedWithoutToken {
                draft,
                response: prepared,
            }
        } else {
            PurchaseOutcome::PrepareRejected {
                draft,
                response: prepared,
            }
        });
    }

    session.confirm().await?;
    let response = session.create().await?;

    Ok(PurchaseOutcome::Submitted {
        draft: session.into_draft(),
        response,
    })
}
