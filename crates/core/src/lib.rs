pub mod api;
pub mod config;
pub mod order;
pub mod testing;

pub use api::{
    AddressList, AddressRecord, ApiError, ApiResponse, BuyerList, BuyerRecord, CreateOrderData,
    CreateOrderRequest, DeliverInfo, HttpShowApi, PrepareData, PrepareRequest, ProjectInfo,
    Screen, ShowApi, TicketTier,
};
pub use config::{
    load_config, load_config_from_str, validate_config, ApiConfig, Config, ConfigError,
    PurchaseConfig, SanitizedConfig,
};
pub use order::{
    run_purchase, OrderBuilder, OrderDraft, OrderError, OrderSession, OrderStage,
    PurchaseOutcome, Purchaser, VerificationMode,
};
