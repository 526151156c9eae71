//! Prepare, confirm and create calls for one order draft.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, warn};

use crate::api::{ApiResponse, CreateOrderData, PrepareData, ShowApi};

use super::types::{OrderDraft, OrderStage};
use super::OrderError;

/// Drives a built draft through prepare → confirm → create.
///
/// Envelope failures are logged and handed back untouched; nothing is
/// retried. Calling a step again is how a caller retries it.
pub struct OrderSession {
    api: Arc<dyn ShowApi>,
    draft: OrderDraft,
    stage: OrderStage,
}

impl OrderSession {
    pub fn new(api: Arc<dyn ShowApi>, draft: OrderDraft) -> Self {
        Self {
            api,
            draft,
            stage: OrderStage::Built,
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn stage(&self) -> OrderStage {
        self.stage
    }

    pub fn token(&self) -> Option<&str> {
        self.draft.token.as_deref()
    }

    pub fn into_draft(self) -> OrderDraft {
        self.draft
    }

    /// Reserve the purchase. On success the token is attached to the draft.
    pub async fn prepare(&mut self) -> Result<ApiResponse<PrepareData>, OrderError> {
        let response = self.api.prepare(&self.draft.prepare_request()).await?;

        match (response.is_success(), response.data.as_ref()) {
            (true, Some(data)) => {
                self.draft.token = Some(data.token.clone());
                self.stage = OrderStage::Prepared;
                info!("Order prepared for project {}", self.draft.project_id);
            }
            (true, None) => {
                warn!("Prepare succeeded without a token");
            }
            (false, _) => {
                error!(
                    "Failed to prepare order: {}, {}",
                    response.errno, response.msg
                );
            }
        }

        Ok(response)
    }

    /// Fetch confirmation info. Informational: the draft is left as is.
    pub async fn confirm(&mut self) -> Result<ApiResponse<Value>, OrderError> {
        let token = self.token().ok_or(OrderError::NotPrepared)?.to_string();
        let response = self.api.confirm(self.draft.project_id, &token).await?;

        if response.is_success() {
            info!("Order confirmed, token: {}", token);
            self.stage = OrderStage::Confirmed;
        } else {
            error!(
                "Failed to confirm order: {}, {}",
                response.errno, response.msg
            );
        }

        Ok(response)
    }

    /// Submit the order. The response is returned as received.
    pub async fn create(&mut self) -> Result<ApiResponse<CreateOrderData>, OrderError> {
        let token = self.token().ok_or(OrderError::NotPrepared)?;
        let request = self.draft.create_request(token);
        let response = self.api.create(&request).await?;

        if response.is_success() {
            self.stage = OrderStage::Created;
            let order_id = response.data.as_ref().and_then(|d| d.order_id);
            info!("Order created: {:?}", order_id);
        } else {
            error!(
                "Failed to create order: {}, {}",
                response.errno, response.msg
            );
        }

        Ok(response)
    }
}
