//! Order draft and verification mode types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{BuyerRecord, CreateOrderRequest, DeliverInfo, PrepareRequest, ProjectInfo};

/// Marker text of projects that allow several real-name buyers per order.
pub const ONE_ORDER_PER_CERT_MARKER: &str = "一单一证";

/// Marker text of projects that allow one real-name buyer per order.
pub const ONE_PERSON_PER_CERT_MARKER: &str = "一人一证";

/// How a project binds tickets to identity certificates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// No real-name requirement; the buyer is a name and phone number.
    None,
    /// One certificate per order, each order carries a single buyer.
    OnePersonPerCert,
    /// One certificate per ticket, an order may carry several buyers.
    OneOrderPerCert,
}

impl VerificationMode {
    /// Map the project's `id_bind` code. Unknown codes yield `None` so the
    /// caller can fall back to marker detection.
    pub fn from_id_bind(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::OnePersonPerCert),
            2 => Some(Self::OneOrderPerCert),
            _ => None,
        }
    }

    /// Resolve the mode of a project.
    ///
    /// The structured `id_bind` field wins. Without it the serialized
    /// metadata is searched for the marker texts, one-order first.
    pub fn detect(project: &ProjectInfo) -> Self {
        if let Some(mode) = project.id_bind.and_then(Self::from_id_bind) {
            return mode;
        }

        let text = serde_json::to_string(project).unwrap_or_default();
        if text.contains(ONE_ORDER_PER_CERT_MARKER) {
            Self::OneOrderPerCert
        } else if text.contains(ONE_PERSON_PER_CERT_MARKER) {
            Self::OnePersonPerCert
        } else {
            Self::None
        }
    }

    pub fn is_verified(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Buyer indices that make it into the order.
    pub fn select_buyer_indices<'a>(&self, configured: &'a [usize]) -> &'a [usize] {
        match self {
            Self::OneOrderPerCert => configured,
            Self::OnePersonPerCert => &configured[..configured.len().min(1)],
            Self::None => &[],
        }
    }
}

/// Who the order is for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Purchaser {
    /// Real-name buyers, already flagged as verified.
    Verified { buyers: Vec<BuyerRecord> },
    /// Plain contact taken from a shipping address.
    Contact { name: String, tel: String },
}

/// Everything needed to submit one purchase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDraft {
    pub project_id: u64,
    pub screen_id: u64,
    pub sku_id: u64,
    /// Tier price plus chargeable express fee, in cents.
    pub pay_money: i64,
    pub count: u32,
    pub purchaser: Purchaser,
    /// Present only when the session ships paper tickets to an address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_info: Option<DeliverInfo>,
    /// Set by a successful prepare call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_start: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_end: Option<DateTime<Utc>>,
}

impl OrderDraft {
    pub fn buyers(&self) -> &[BuyerRecord] {
        match &self.purchaser {
            Purchaser::Verified { buyers } => buyers,
            Purchaser::Contact { .. } => &[],
        }
    }

    /// Whether `now` falls inside the tier's sale window. Missing bounds are open.
    pub fn is_on_sale(&self, now: DateTime<Utc>) -> bool {
        self.sale_start.map_or(true, |start| now >= start)
            && self.sale_end.map_or(true, |end| now < end)
    }

    pub fn prepare_request(&self) -> PrepareRequest {
        PrepareRequest {
            project_id: self.project_id,
            count: self.count,
            screen_id: self.screen_id,
            sku_id: self.sku_id,
        }
    }

    pub fn create_request(&self, token: &str) -> CreateOrderRequest {
        let (buyer_info, buyer, tel) = match &self.purchaser {
            Purchaser::Verified { buyers } => (Some(buyers.clone()), None, None),
            Purchaser::Contact { name, tel } => (None, Some(name.clone()), Some(tel.clone())),
        };

        CreateOrderRequest {
            project_id: self.project_id,
            token: token.to_string(),
            screen_id: self.screen_id,
            sku_id: self.sku_id,
            count: self.count,
            pay_money: self.pay_money,
            buyer_info,
            deliver_info: self.deliver_info.clone(),
            buyer,
            tel,
        }
    }
}

/// Progress of an order through the submission sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OrderStage {
    Built,
    Prepared,
    Confirmed,
    Created,
}

impl OrderStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStage::Built => "built",
            OrderStage::Prepared => "prepared",
            OrderStage::Confirmed => "confirmed",
            OrderStage::Created => "created",
        }
    }
}

impl std::fmt::Display for OrderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
