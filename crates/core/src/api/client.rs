//! HTTP client for the ticketing web service.
//!
//! Every request carries the account cookie. Responses are JSON envelopes;
//! HTTP-level failures become `ApiError`s while envelope errors are handed
//! back as data.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, ORIGIN, REFERER};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ApiConfig;

use super::types::{
    AddressList, ApiResponse, BuyerList, CreateOrderData, CreateOrderRequest, PrepareData,
    PrepareRequest, ProjectInfo, RawEnvelope,
};
use super::{ApiError, ShowApi};

/// API version the project endpoint is queried with.
const PROJECT_API_VERSION: &str = "134";

/// Order type for regular ticket purchases.
const ORDER_TYPE: &str = "1";

/// Client identifier the order endpoints expect.
const REQUEST_SOURCE: &str = "pc-new";

/// Ticketing API client over HTTP.
pub struct HttpShowApi {
    client: Client,
    base_url: String,
    /// Identifies this client run to the order endpoints.
    device_id: String,
}

impl HttpShowApi {
    /// Create a new client from configuration.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        let cookie = HeaderValue::from_str(config.cookie.trim()).map_err(|_| {
            ApiError::NotConfigured("cookie contains invalid header characters".to_string())
        })?;
        headers.insert(COOKIE, cookie);
        if let Ok(origin) = HeaderValue::from_str(&base_url) {
            headers.insert(ORIGIN, origin);
        }
        if let Ok(referer) = HeaderValue::from_str(&format!("{}/", base_url)) {
            headers.insert(REFERER, referer);
        }

        if config.accept_invalid_certs {
            warn!("TLS certificate verification disabled for {}", base_url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self {
            client,
            base_url,
            device_id: Uuid::new_v4().simple().to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and decode the envelope.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        endpoint: &str,
    ) -> Result<ApiResponse<T>, ApiError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body,
            });
        }

        let raw: RawEnvelope = response.json().await.map_err(|e| {
            ApiError::ParseError(format!("Failed to parse {} response: {}", endpoint, e))
        })?;

        let decoded: ApiResponse<T> = raw.decode()?;
        debug!(
            "{} -> errno={}, msg='{}'",
            endpoint, decoded.errno, decoded.msg
        );

        Ok(decoded)
    }
}

#[async_trait]
impl ShowApi for HttpShowApi {
    async fn project(&self, project_id: u64) -> Result<ApiResponse<ProjectInfo>, ApiError> {
        debug!("Fetching project {}", project_id);

        let id = project_id.to_string();
        let request = self
            .client
            .get(self.url("/api/ticket/project/getV2"))
            .query(&[
                ("version", PROJECT_API_VERSION),
                ("id", id.as_str()),
                ("project_id", id.as_str()),
            ]);

        self.send(request, "project").await
    }

    async fn project_by_date(
        &self,
        project_id: u64,
        date: &str,
    ) -> Result<ApiResponse<ProjectInfo>, ApiError> {
        debug!("Fetching project {} for date {}", project_id, date);

        let request = self
            .client
            .get(self.url("/api/ticket/project/infoByDate"))
            .query(&[("id", project_id.to_string().as_str()), ("date", date)]);

        self.send(request, "project_by_date").await
    }

    async fn buyers(&self, project_id: u64) -> Result<ApiResponse<BuyerList>, ApiError> {
        debug!("Fetching buyer list");

        let request = self
            .client
            .get(self.url("/api/ticket/buyer/list"))
            .query(&[
                ("is_default", ""),
                ("projectId", project_id.to_string().as_str()),
            ]);

        self.send(request, "buyers").await
    }

    async fn addresses(&self) -> Result<ApiResponse<AddressList>, ApiError> {
        debug!("Fetching address list");

        let request = self.client.get(self.url("/api/ticket/addr/list"));

        self.send(request, "addresses").await
    }

    async fn prepare(
        &self,
        request: &PrepareRequest,
    ) -> Result<ApiResponse<PrepareData>, ApiError> {
        debug!(
            "Preparing order: project={}, screen={}, sku={}, count={}",
            request.project_id, request.screen_id, request.sku_id, request.count
        );

        let form = [
            ("project_id", request.project_id.to_string()),
            ("screen_id", request.screen_id.to_string()),
            ("sku_id", request.sku_id.to_string()),
            ("count", request.count.to_string()),
            ("order_type", ORDER_TYPE.to_string()),
            ("token", String::new()),
            ("requestSource", REQUEST_SOURCE.to_string()),
        ];

        let http_request = self
            .client
            .post(self.url("/api/ticket/order/prepare"))
            .query(&[("project_id", request.project_id.to_string())])
            .form(&form);

        self.send(http_request, "prepare").await
    }

    async fn confirm(
        &self,
        project_id: u64,
        token: &str,
    ) -> Result<ApiResponse<Value>, ApiError> {
        debug!("Confirming order token for project {}", project_id);

        let request = self
            .client
            .get(self.url("/api/ticket/order/confirmInfo"))
            .query(&[
                ("token", token),
                ("voucher", ""),
                ("project_id", project_id.to_string().as_str()),
                ("requestSource", REQUEST_SOURCE),
            ]);

        self.send(request, "confirm").await
    }

    async fn create(
        &self,
        request: &CreateOrderRequest,
    ) -> Result<ApiResponse<CreateOrderData>, ApiError> {
        debug!(
            "Creating order: project={}, screen={}, sku={}, count={}, pay_money={}",
            request.project_id, request.screen_id, request.sku_id, request.count, request.pay_money
        );

        let mut form: Vec<(&str, String)> = vec![
            ("project_id", request.project_id.to_string()),
            ("screen_id", request.screen_id.to_string()),
            ("sku_id", request.sku_id.to_string()),
            ("count", request.count.to_string()),
            ("pay_money", request.pay_money.to_string()),
            ("order_type", ORDER_TYPE.to_string()),
            ("timestamp", Utc::now().timestamp_millis().to_string()),
            ("token", request.token.clone()),
            ("deviceId", self.device_id.clone()),
            ("again", "1".to_string()),
            ("requestSource", REQUEST_SOURCE.to_string()),
        ];

        // Nested structures travel as JSON strings inside the form.
        if let Some(buyers) = &request.buyer_info {
            let json = serde_json::to_string(buyers)
                .map_err(|e| ApiError::ParseError(format!("Failed to encode buyers: {}", e)))?;
            form.push(("buyer_info", json));
        }
        if let Some(deliver) = &request.deliver_info {
            let json = serde_json::to_string(deliver).map_err(|e| {
                ApiError::ParseError(format!("Failed to encode delivery info: {}", e))
            })?;
            form.push(("deliver_info", json));
        }
        if let Some(buyer) = &request.buyer {
            form.push(("buyer", buyer.clone()));
        }
        if let Some(tel) = &request.tel {
            form.push(("tel", tel.clone()));
        }

        let http_request = self
            .client
            .post(self.url("/api/ticket/order/createV2"))
            .query(&[("project_id", request.project_id.to_string())])
            .form(&form);

        self.send(http_request, "create").await
    }
}
