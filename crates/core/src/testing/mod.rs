//! Testing utilities and mock implementations.
//!
//! This module provides a mock `ShowApi` and fixture builders so the order
//! flow can be exercised without a live ticketing account.
//!
//! # Example
//!
//! ```rust,ignore
//! use showticket_core::testing::{fixtures, MockShowApi};
//!
//! let api = MockShowApi::new();
//! api.add_project(fixtures::project(85939, 2, 3)).await;
//! api.set_addresses(fixtures::address_list(1)).await;
//! ```

mod mock_show_api;

pub use mock_show_api::{MockShowApi, RecordedApiCall, MOCK_NOT_FOUND_ERRNO};

/// Test fixtures and helper functions.
pub mod fixtures {
    use serde_json::Map;

    use crate::api::{
        AddressList, AddressRecord, BuyerList, BuyerRecord, ProjectInfo, Screen, TicketTier,
    };
    use crate::order::{OrderDraft, Purchaser};

    /// Create a non-dated, non-verified project without paper tickets.
    ///
    /// Session ids are `project_id * 100 + s`, tier ids `session_id * 10 + t`,
    /// tier prices `10000 * (t + 1) + 100 * s` cents.
    pub fn project(project_id: u64, screens: u64, tiers: u64) -> ProjectInfo {
        ProjectInfo {
            id: project_id,
            name: format!("Project {}", project_id),
            sales_dates: vec![],
            has_paper_ticket: false,
            id_bind: None,
            screen_list: (0..screens)
                .map(|s| {
                    let screen_id = project_id * 100 + s;
                    Screen {
                        id: screen_id,
                        name: format!("Session {}", s + 1),
                        delivery_type: 1,
                        express_fee: None,
                        ticket_list: (0..tiers)
                            .map(|t| TicketTier {
                                id: screen_id * 10 + t,
                                price: 10000 * (t as i64 + 1) + 100 * s as i64,
                                desc: format!("Tier {}", t + 1),
                                sale_start: None,
                                sale_end: None,
                            })
                            .collect(),
                    }
                })
                .collect(),
            extra: Map::new(),
        }
    }

    /// Create a project that needs real-name buyers.
    pub fn verified_project(project_id: u64, id_bind: u8) -> ProjectInfo {
        let mut p = project(project_id, 1, 1);
        p.id_bind = Some(id_bind);
        p
    }

    /// Create a buyer record.
    pub fn buyer(id: u64, name: &str) -> BuyerRecord {
        BuyerRecord {
            id,
            name: name.to_string(),
            tel: format!("138{:08}", id),
            personal_id: format!("11010119900101{:04}", id % 10000),
            id_type: 0,
            is_buyer_info_verified: None,
            is_buyer_valid: None,
            extra: Map::new(),
        }
    }

    /// Create a buyer list with `n` entries, ids starting at 1000.
    pub fn buyer_list(n: u64) -> BuyerList {
        BuyerList {
            list: (0..n)
                .map(|i| buyer(1000 + i, &format!("Buyer {}", i + 1)))
                .collect(),
        }
    }

    /// Create an address record.
    pub fn address(id: u64, name: &str) -> AddressRecord {
        AddressRecord {
            id,
            name: name.to_string(),
            phone: format!("139{:08}", id),
            prov: "Shanghai".to_string(),
            city: "Shanghai".to_string(),
            area: "Pudong".to_string(),
            addr: format!("{} Century Avenue", id),
        }
    }

    /// Create an address list with `n` entries, ids starting at 500.
    pub fn address_list(n: u64) -> AddressList {
        AddressList {
            addr_list: (0..n)
                .map(|i| address(500 + i, &format!("Receiver {}", i + 1)))
                .collect(),
        }
    }

    /// Create a draft for one ticket bought under a plain contact.
    pub fn contact_draft(project_id: u64) -> OrderDraft {
        OrderDraft {
            project_id,
            screen_id: project_id * 100,
            sku_id: project_id * 1000,
            pay_money: 10000,
            count: 1,
            purchaser: Purchaser::Contact {
                name: "Receiver 1".to_string(),
                tel: "13900000500".to_string(),
            },
            deliver_info: None,
            token: None,
            sale_start: None,
            sale_end: None,
        }
    }
}
