//! Turns project metadata and a purchase configuration into an order draft.

use std::sync::Arc;

use chrono::DateTime;
use tracing::{debug, info, warn};

use crate::api::{AddressList, BuyerList, DeliverInfo, ProjectInfo, Screen, ShowApi};
use crate::config::PurchaseConfig;

use super::types::{OrderDraft, Purchaser, VerificationMode};
use super::OrderError;

/// Fetches whatever metadata a purchase needs and assembles the draft.
pub struct OrderBuilder {
    api: Arc<dyn ShowApi>,
}

impl OrderBuilder {
    pub fn new(api: Arc<dyn ShowApi>) -> Self {
        Self { api }
    }

    /// Build a draft for the configured purchase.
    ///
    /// Buyers are only fetched for identity-verified projects and addresses
    /// only when they supply the contact or the delivery destination.
    pub async fn build(&self, purchase: &PurchaseConfig) -> Result<OrderDraft, OrderError> {
        let project_id = purchase.project_id;
        let project = self.api.project(project_id).await?.into_result()?;
        info!("Loaded project {} '{}'", project.id, project.name);

        let mode = VerificationMode::detect(&project);
        debug!("Verification mode: {:?}", mode);

        let sessions = if project.is_dated() {
            let date = purchase
                .sales_date
                .first()
                .cloned()
                .or_else(|| project.first_sales_date())
                .ok_or(OrderError::MissingSaleDate { project_id })?;
            debug!("Dated project, loading sessions for {}", date);
            Some(
                self.api
                    .project_by_date(project_id, &date)
                    .await?
                    .into_result()?,
            )
        } else {
            None
        };
        let ticket_source = sessions.as_ref().unwrap_or(&project);

        let (screen_idx, _) = purchase.screen_ticket_index();
        let screen = shipping_screen(&project, ticket_source, screen_idx)?;

        let uses_buyers = mode.is_verified();
        if !uses_buyers && !purchase.buyer_index.is_empty() {
            warn!("Project is not identity-verified, ignoring purchase.buyer_index");
        }

        let buyers = if uses_buyers {
            Some(self.api.buyers(project_id).await?.into_result()?)
        } else {
            None
        };

        let addresses = if !uses_buyers || screen.requires_address() {
            Some(self.api.addresses().await?.into_result()?)
        } else {
            None
        };

        assemble(
            &project,
            ticket_source,
            mode,
            buyers.as_ref(),
            addresses.as_ref(),
            purchase,
        )
    }
}

/// Assemble a draft from already fetched metadata.
///
/// `ticket_source` is the project itself, or its per-date variant for dated
/// projects; it supplies the session id, tier id and price. Express fee,
/// delivery type and sale window always come from the base project's session
/// at the same index. `buyers` must be present for verified modes and
/// `addresses` whenever a contact or a delivery address is needed.
pub fn assemble(
    project: &ProjectInfo,
    ticket_source: &ProjectInfo,
    mode: VerificationMode,
    buyers: Option<&BuyerList>,
    addresses: Option<&AddressList>,
    purchase: &PurchaseConfig,
) -> Result<OrderDraft, OrderError> {
    let (screen_idx, ticket_idx) = purchase.screen_ticket_index();
    let screen = pick(&ticket_source.screen_list, screen_idx, "screen")?;
    let tier = pick(&screen.ticket_list, ticket_idx, "ticket")?;

    let shipping = shipping_screen(project, ticket_source, screen_idx)?;
    let base_tier = shipping.ticket_list.get(ticket_idx);
    let sale_start = base_tier.and_then(|t| t.sale_start).or(tier.sale_start);
    let sale_end = base_tier.and_then(|t| t.sale_end).or(tier.sale_end);

    let address_list = addresses.map(|a| a.addr_list.as_slice()).unwrap_or(&[]);

    let (purchaser, count) = if mode.is_verified() {
        let selected = mode.select_buyer_indices(&purchase.buyer_index);
        if selected.is_empty() {
            return Err(OrderError::MissingBuyerIndex);
        }
        let buyer_list = buyers.map(|b| b.list.as_slice()).unwrap_or(&[]);

        let mut chosen = Vec::with_capacity(selected.len());
        for &idx in selected {
            let mut buyer = pick(buyer_list, idx, "buyer")?.clone();
            buyer.mark_verified();
            chosen.push(buyer);
        }
        let count = chosen.len() as u32;
        (Purchaser::Verified { buyers: chosen }, count)
    } else {
        let address = pick(address_list, purchase.address_index(), "address")?;
        (
            Purchaser::Contact {
                name: address.name.clone(),
                tel: address.phone.clone(),
            },
            purchase.count,
        )
    };

    let mut pay_money = tier.price;
    if project.has_paper_ticket {
        if let Some(fee) = shipping.chargeable_express_fee() {
            pay_money += fee;
        }
    }

    let deliver_info = if shipping.requires_address() {
        let idx = if purchase.deliver_to_selected_address {
            purchase.address_index()
        } else {
            0
        };
        Some(DeliverInfo::from(pick(address_list, idx, "address")?))
    } else {
        None
    };

    Ok(OrderDraft {
        project_id: project.id,
        screen_id: screen.id,
        sku_id: tier.id,
        pay_money,
        count,
        purchaser,
        deliver_info,
        token: None,
        sale_start: sale_start.and_then(|s| DateTime::from_timestamp(s, 0)),
        sale_end: sale_end.and_then(|s| DateTime::from_timestamp(s, 0)),
    })
}

/// Session whose express fee and delivery type apply to the order.
///
/// The base project carries them even when the per-date variant does not;
/// a base project without sessions defers to the variant.
fn shipping_screen<'a>(
    project: &'a ProjectInfo,
    ticket_source: &'a ProjectInfo,
    screen_idx: usize,
) -> Result<&'a Screen, OrderError> {
    match project.screen_list.get(screen_idx) {
        Some(screen) => Ok(screen),
        None => pick(&ticket_source.screen_list, screen_idx, "screen"),
    }
}

fn pick<'a, T>(list: &'a [T], index: usize, list_name: &'static str) -> Result<&'a T, OrderError> {
    list.get(index).ok_or(OrderError::IndexOutOfRange {
        list: list_name,
        index,
        len: list.len(),
    })
}
