//! Types for ticketing API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ApiError;

// ============================================================================
// Envelope
// ============================================================================

/// Errno the API uses for success.
pub const ERRNO_OK: i64 = 0;

/// Common JSON envelope around every API payload.
///
/// A non-zero `errno` is a remote rejection carried as data: `data` is only
/// decoded for successful responses, and a rejection keeps whatever payload
/// the server sent in `raw_data`, untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub errno: i64,
    #[serde(default)]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<Value>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            errno: ERRNO_OK,
            msg: String::new(),
            data: Some(data),
            raw_data: None,
        }
    }

    /// Rejected response without data.
    pub fn failure(errno: i64, msg: impl Into<String>) -> Self {
        Self {
            errno,
            msg: msg.into(),
            data: None,
            raw_data: None,
        }
    }

    /// Rejected response carrying the server's payload as-is.
    pub fn rejected_with(errno: i64, msg: impl Into<String>, raw_data: Value) -> Self {
        Self {
            raw_data: Some(raw_data),
            ..Self::failure(errno, msg)
        }
    }

    pub fn is_success(&self) -> bool {
        self.errno == ERRNO_OK
    }

    /// Unwrap the payload, turning a rejection into an error.
    pub fn into_result(self) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Rejected {
                errno: self.errno,
                msg: self.msg,
            });
        }
        self.data.ok_or(ApiError::MissingData)
    }
}

/// Envelope as it arrives on the wire. Endpoints disagree on whether the
/// status is called `errno`/`msg` or `code`/`message`, and some send both.
#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    errno: Option<i64>,
    code: Option<i64>,
    msg: Option<String>,
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

impl RawEnvelope {
    /// Status code of the envelope; an envelope with neither field is malformed.
    pub(crate) fn errno(&self) -> Result<i64, ApiError> {
        self.errno.or(self.code).ok_or_else(|| {
            ApiError::ParseError("Envelope has neither errno nor code".to_string())
        })
    }

    /// Decode the payload for successful responses only.
    pub(crate) fn decode<T: serde::de::DeserializeOwned>(
        self,
    ) -> Result<ApiResponse<T>, ApiError> {
        let errno = self.errno()?;
        let msg = self
            .msg
            .filter(|m| !m.is_empty())
            .or(self.message)
            .unwrap_or_default();

        if errno != ERRNO_OK {
            return Ok(match self.data {
                Value::Null => ApiResponse::failure(errno, msg),
                data => ApiResponse::rejected_with(errno, msg, data),
            });
        }
        if self.data.is_null() {
            return Ok(ApiResponse::failure(errno, msg));
        }

        let data = serde_json::from_value(self.data)
            .map_err(|e| ApiError::ParseError(format!("Failed to parse data: {}", e)))?;

        Ok(ApiResponse {
            errno,
            msg,
            data: Some(data),
            raw_data: None,
        })
    }
}

// ============================================================================
// Project metadata
// ============================================================================

/// Delivery type code meaning tickets are shipped to a postal address.
pub const DELIVERY_TYPE_ADDRESS: i64 = 3;

/// Express fee value meaning shipping is free.
pub const EXPRESS_FEE_FREE: i64 = -1;

/// A purchasable project (event).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectInfo {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Non-empty for dated projects whose sessions are fetched per date.
    #[serde(default)]
    pub sales_dates: Vec<Value>,
    #[serde(default)]
    pub has_paper_ticket: bool,
    /// Identity binding mode: 0 none, 1 one person per certificate,
    /// 2 one order per certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_bind: Option<u8>,
    #[serde(default)]
    pub screen_list: Vec<Screen>,
    /// Every other field the API sent, kept for marker detection.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectInfo {
    pub fn is_dated(&self) -> bool {
        !self.sales_dates.is_empty()
    }

    /// First advertised sale date, either a bare string or `{"date": ...}`.
    pub fn first_sales_date(&self) -> Option<String> {
        self.sales_dates.iter().find_map(|d| match d {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("date").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
    }
}

/// A session (screen) within a project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Screen {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub delivery_type: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub express_fee: Option<i64>,
    #[serde(default)]
    pub ticket_list: Vec<TicketTier>,
}

impl Screen {
    pub fn requires_address(&self) -> bool {
        self.delivery_type == DELIVERY_TYPE_ADDRESS
    }

    /// Express fee to charge, if any. Zero and the free sentinel charge nothing.
    pub fn chargeable_express_fee(&self) -> Option<i64> {
        self.express_fee
            .filter(|fee| *fee != 0 && *fee != EXPRESS_FEE_FREE)
    }
}

/// A priced ticket tier (sku) within a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TicketTier {
    pub id: u64,
    /// Price in cents.
    pub price: i64,
    #[serde(default)]
    pub desc: String,
    /// Unix timestamp (seconds) when sales open.
    #[serde(rename = "saleStart", default, skip_serializing_if = "Option::is_none")]
    pub sale_start: Option<i64>,
    /// Unix timestamp (seconds) when sales close.
    #[serde(rename = "saleEnd", default, skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<i64>,
}

// ============================================================================
// Buyers and addresses
// ============================================================================

/// Real-name buyer registered on the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuyerRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tel: String,
    #[serde(default)]
    pub personal_id: String,
    #[serde(default)]
    pub id_type: i64,
    #[serde(
        rename = "isBuyerInfoVerified",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_buyer_info_verified: Option<String>,
    #[serde(rename = "isBuyerValid", default, skip_serializing_if = "Option::is_none")]
    pub is_buyer_valid: Option<String>,
    /// Remaining server fields, echoed back on order creation.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BuyerRecord {
    /// Flag the record the way the order endpoint expects for selected buyers.
    pub fn mark_verified(&mut self) {
        self.is_buyer_info_verified = Some("true".to_string());
        self.is_buyer_valid = Some("true".to_string());
    }

    pub fn is_verified(&self) -> bool {
        self.is_buyer_info_verified.as_deref() == Some("true")
            && self.is_buyer_valid.as_deref() == Some("true")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuyerList {
    #[serde(default)]
    pub list: Vec<BuyerRecord>,
}

/// Shipping address registered on the account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddressRecord {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub prov: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub addr: String,
}

impl AddressRecord {
    /// Province, city, area and street concatenated.
    pub fn full_address(&self) -> String {
        format!("{}{}{}{}", self.prov, self.city, self.area, self.addr)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AddressList {
    #[serde(default)]
    pub addr_list: Vec<AddressRecord>,
}

/// Where paper tickets are shipped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliverInfo {
    pub name: String,
    pub tel: String,
    pub addr_id: u64,
    pub addr: String,
}

impl From<&AddressRecord> for DeliverInfo {
    fn from(a: &AddressRecord) -> Self {
        Self {
            name: a.name.clone(),
            tel: a.phone.clone(),
            addr_id: a.id,
            addr: a.full_address(),
        }
    }
}

// ============================================================================
// Order endpoints
// ============================================================================

/// Parameters of the prepare call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrepareRequest {
    pub project_id: u64,
    pub count: u32,
    pub screen_id: u64,
    pub sku_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PrepareData {
    pub token: String,
}

/// Parameters of the final create call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderRequest {
    pub project_id: u64,
    pub token: String,
    pub screen_id: u64,
    pub sku_id: u64,
    pub count: u32,
    pub pay_money: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer_info: Option<Vec<BuyerRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_info: Option<DeliverInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderData {
    #[serde(rename = "orderId", default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
