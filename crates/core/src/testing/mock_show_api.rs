//! Mock ticketing API for testing.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::{
    AddressList, ApiError, ApiResponse, BuyerList, CreateOrderData, CreateOrderRequest,
    PrepareData, PrepareRequest, ProjectInfo, ShowApi,
};

/// Errno the mock answers with for unknown projects.
pub const MOCK_NOT_FOUND_ERRNO: i64 = 404;

/// A recorded API call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedApiCall {
    Project(u64),
    ProjectByDate { project_id: u64, date: String },
    Buyers(u64),
    Addresses,
    Prepare(PrepareRequest),
    Confirm { project_id: u64, token: String },
    Create(CreateOrderRequest),
}

/// Mock implementation of the ShowApi trait.
///
/// Provides controllable behavior for testing:
/// - Canned metadata per project (and per project and date)
/// - Configurable prepare/confirm/create envelopes
/// - Recorded calls for assertions
/// - Injected transport errors
///
/// # Example
///
/// ```rust,ignore
/// use showticket_core::testing::{MockShowApi, fixtures};
///
/// let api = MockShowApi::new();
/// api.add_project(fixtures::project(1, 1, 1)).await;
/// api.set_addresses(fixtures::address_list(1)).await;
///
/// let project = api.project(1).await?.into_result()?;
/// ```
#[derive(Debug)]
pub struct MockShowApi {
    projects: Arc<RwLock<HashMap<u64, ProjectInfo>>>,
    projects_by_date: Arc<RwLock<HashMap<(u64, String), ProjectInfo>>>,
    buyers: Arc<RwLock<ApiResponse<BuyerList>>>,
    addresses: Arc<RwLock<ApiResponse<AddressList>>>,
    prepare_response: Arc<RwLock<ApiResponse<PrepareData>>>,
    confirm_response: Arc<RwLock<ApiResponse<Value>>>,
    create_response: Arc<RwLock<ApiResponse<CreateOrderData>>>,
    calls: Arc<RwLock<Vec<RecordedApiCall>>>,
    /// If set, the next operation will fail with this error.
    next_error: Arc<RwLock<Option<ApiError>>>,
}

impl Default for MockShowApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockShowApi {
    /// Create a mock with empty account lists and successful order calls.
    pub fn new() -> Self {
        Self {
            projects: Arc::new(RwLock::new(HashMap::new())),
            projects_by_date: Arc::new(RwLock::new(HashMap::new())),
            buyers: Arc::new(RwLock::new(ApiResponse::ok(BuyerList::default()))),
            addresses: Arc::new(RwLock::new(ApiResponse::ok(AddressList::default()))),
            prepare_response: Arc::new(RwLock::new(ApiResponse::ok(PrepareData {
                token: "mock-token".to_string(),
            }))),
            confirm_response: Arc::new(RwLock::new(ApiResponse::ok(json!({})))),
            create_response: Arc::new(RwLock::new(ApiResponse::ok(CreateOrderData {
                order_id: Some(1),
                token: None,
                extra: Map::new(),
            }))),
            calls: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    // =========================================================================
    // Metadata Configuration
    // =========================================================================

    /// Add a project, keyed by its id.
    pub async fn add_project(&self, project: ProjectInfo) {
        self.projects.write().await.insert(project.id, project);
    }

    /// Add the per-date variant of a project.
    pub async fn add_project_by_date(&self, date: &str, project: ProjectInfo) {
        self.projects_by_date
            .write()
            .await
            .insert((project.id, date.to_string()), project);
    }

    /// Set the buyer list returned for every project.
    pub async fn set_buyers(&self, buyers: BuyerList) {
        *self.buyers.write().await = ApiResponse::ok(buyers);
    }

    /// Set the address list.
    pub async fn set_addresses(&self, addresses: AddressList) {
        *self.addresses.write().await = ApiResponse::ok(addresses);
    }

    // =========================================================================
    // Order Endpoint Configuration
    // =========================================================================

    pub async fn set_prepare_response(&self, response: ApiResponse<PrepareData>) {
        *self.prepare_response.write().await = response;
    }

    pub async fn set_confirm_response(&self, response: ApiResponse<Value>) {
        *self.confirm_response.write().await = response;
    }

    pub async fn set_create_response(&self, response: ApiResponse<CreateOrderData>) {
        *self.create_response.write().await = response;
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded calls.
    pub async fn recorded_calls(&self) -> Vec<RecordedApiCall> {
        self.calls.read().await.clone()
    }

    /// Get the number of calls performed.
    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }

    /// Clear recorded calls.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Configure the next operation to fail with the given error.
    pub async fn set_next_error(&self, error: ApiError) {
        *self.next_error.write().await = Some(error);
    }

    /// Clear any pending error.
    pub async fn clear_next_error(&self) {
        *self.next_error.write().await = None;
    }

    async fn take_error(&self) -> Option<ApiError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, call: RecordedApiCall) {
        self.calls.write().await.push(call);
    }
}

#[async_trait]
impl ShowApi for MockShowApi {
    async fn project(&self, project_id: u64) -> Result<ApiResponse<ProjectInfo>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Project(project_id)).await;

        Ok(match self.projects.read().await.get(&project_id) {
            Some(project) => ApiResponse::ok(project.clone()),
            None => ApiResponse::failure(MOCK_NOT_FOUND_ERRNO, "project not found"),
        })
    }

    async fn project_by_date(
        &self,
        project_id: u64,
        date: &str,
    ) -> Result<ApiResponse<ProjectInfo>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::ProjectByDate {
            project_id,
            date: date.to_string(),
        })
        .await;

        let key = (project_id, date.to_string());
        Ok(match self.projects_by_date.read().await.get(&key) {
            Some(project) => ApiResponse::ok(project.clone()),
            None => ApiResponse::failure(MOCK_NOT_FOUND_ERRNO, "no sessions on this date"),
        })
    }

    async fn buyers(&self, project_id: u64) -> Result<ApiResponse<BuyerList>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Buyers(project_id)).await;
        Ok(self.buyers.read().await.clone())
    }

    async fn addresses(&self) -> Result<ApiResponse<AddressList>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Addresses).await;
        Ok(self.addresses.read().await.clone())
    }

    async fn prepare(
        &self,
        request: &PrepareRequest,
    ) -> Result<ApiResponse<PrepareData>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Prepare(request.clone())).await;
        Ok(self.prepare_response.read().await.clone())
    }

    async fn confirm(
        &self,
        project_id: u64,
        token: &str,
    ) -> Result<ApiResponse<Value>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Confirm {
            project_id,
            token: token.to_string(),
        })
        .await;
        Ok(self.confirm_response.read().await.clone())
    }

    async fn create(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<ApiResponse<CreateOrderData>, ApiError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        self.record(RecordedApiCall::Create(request.clone())).await;
        Ok(self.create_response.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_unknown_project_is_rejected() {
        let api = MockShowApi::new();
        let response = tokio_test::block_on(api.project(99)).unwrap();
        assert_eq!(response.errno, MOCK_NOT_FOUND_ERRNO);
        assert_eq!(
            tokio_test::block_on(api.recorded_calls()),
            vec![RecordedApiCall::Project(99)]
        );
    }

    #[tokio::test]
    async fn test_injected_error_is_consumed_once() {
        let api = MockShowApi::new();
        api.add_project(fixtures::project(1, 1, 1)).await;
        api.set_next_error(ApiError::MissingData).await;

        assert!(api.project(1).await.is_err());
        assert!(api.project(1).await.unwrap().is_success());
        assert_eq!(api.call_count().await, 1);
    }
}
