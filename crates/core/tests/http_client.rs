//! HttpShowApi tests against an in-process fake of the ticketing service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

use showticket_core::{
    run_purchase, ApiConfig, ApiError, HttpShowApi, PrepareRequest, PurchaseConfig, ShowApi,
};

const COOKIE: &str = "SESSDATA=test-session; bili_jct=csrf";
const PROJECT_ID: u64 = 85939;
const BROKEN_PROJECT_ID: u64 = 500;
const CAPTCHA_PROJECT_ID: u64 = 600;

/// Form bodies received by the fake, per endpoint.
#[derive(Clone, Default)]
struct Received {
    forms: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl Received {
    fn form(&self, endpoint: &str) -> Option<HashMap<String, String>> {
        self.forms
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == endpoint)
            .map(|(_, form)| form.clone())
    }

    fn push(&self, endpoint: &str, form: HashMap<String, String>) {
        self.forms
            .lock()
            .unwrap()
            .push((endpoint.to_string(), form));
    }
}

fn logged_in(headers: &HeaderMap) -> bool {
    headers
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == COOKIE)
}

fn not_logged_in() -> Response {
    Json(json!({ "errno": -101, "code": -101, "msg": "", "message": "not logged in", "data": null }))
        .into_response()
}

async fn project(headers: HeaderMap, Query(q): Query<HashMap<String, String>>) -> Response {
    if !logged_in(&headers) {
        return not_logged_in();
    }
    if q.get("id") == Some(&BROKEN_PROJECT_ID.to_string()) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }
    if q.get("version").map(String::as_str) != Some("134") {
        return Json(json!({ "errno": 2, "msg": "bad version" })).into_response();
    }

    Json(json!({
        "errno": 0,
        "code": 0,
        "msg": "",
        "message": "",
        "data": {
            "id": PROJECT_ID,
            "name": "Comic Expo",
            "sales_dates": [],
            "has_paper_ticket": true,
            "id_bind": 2,
            "performance_desc": { "list": [{ "module": "base_info", "details": "一单一证" }] },
            "screen_list": [{
                "id": 150001,
                "name": "Day 1",
                "delivery_type": 3,
                "express_fee": 600,
                "ticket_list": [
                    { "id": 400001, "price": 8800, "desc": "Regular", "saleStart": 1700000000, "saleEnd": 4100000000u64 },
                    { "id": 400002, "price": 28800, "desc": "VIP", "saleStart": 1700000000, "saleEnd": 4100000000u64 }
                ]
            }]
        }
    }))
    .into_response()
}

async fn buyers(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return not_logged_in();
    }
    Json(json!({
        "errno": 0,
        "msg": "",
        "data": {
            "list": [
                { "id": 11, "name": "Zhang San", "tel": "13800000011", "personal_id": "110101199001010011", "id_type": 0, "is_default": 1 },
                { "id": 12, "name": "Li Si", "tel": "13800000012", "personal_id": "110101199001010012", "id_type": 0, "is_default": 0 }
            ]
        }
    }))
    .into_response()
}

async fn addresses(headers: HeaderMap) -> Response {
    if !logged_in(&headers) {
        return not_logged_in();
    }
    Json(json!({
        "errno": 0,
        "msg": "",
        "data": {
            "addr_list": [
                { "id": 71, "name": "Zhang San", "phone": "13800000011", "prov": "Beijing", "city": "Beijing", "area": "Haidian", "addr": "1 Zhongguancun St" }
            ]
        }
    }))
    .into_response()
}

async fn prepare(
    State(received): State<Received>,
    Query(q): Query<HashMap<String, String>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    received.push("prepare", form.clone());
    if q.get("project_id") != form.get("project_id") {
        return Json(json!({ "errno": 3, "msg": "project mismatch" })).into_response();
    }
    if form.get("project_id") == Some(&CAPTCHA_PROJECT_ID.to_string()) {
        return Json(json!({
            "errno": 1,
            "msg": "captcha required",
            "data": { "token": "", "ga_data": { "riskParams": { "type": "geetest", "v_voucher": "v-123" } } }
        }))
        .into_response();
    }
    Json(json!({ "errno": 0, "msg": "", "data": { "token": "tok-xyz" } })).into_response()
}

async fn confirm(Query(q): Query<HashMap<String, String>>) -> Response {
    if q.get("token").map(String::as_str) != Some("tok-xyz") {
        return Json(json!({ "errno": 100001, "msg": "bad token" })).into_response();
    }
    Json(json!({ "errno": 0, "msg": "", "data": { "count": 2, "pay_money": 18200 } }))
        .into_response()
}

async fn create(
    State(received): State<Received>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    received.push("create", form);
    Json(json!({ "errno": 0, "msg": "", "data": { "orderId": 123456, "token": "pay-token" } }))
        .into_response()
}

/// Start the fake service and return its base URL.
async fn spawn_fake(received: Received) -> String {
    let app = Router::new()
        .route("/api/ticket/project/getV2", get(project))
        .route("/api/ticket/buyer/list", get(buyers))
        .route("/api/ticket/addr/list", get(addresses))
        .route("/api/ticket/order/prepare", post(prepare))
        .route("/api/ticket/order/confirmInfo", get(confirm))
        .route("/api/ticket/order/createV2", post(create))
        .with_state(received);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn api_config(base_url: &str, cookie: &str) -> ApiConfig {
    let mut config = ApiConfig::with_cookie(cookie);
    config.base_url = base_url.to_string();
    config.timeout_secs = 5;
    config
}

#[tokio::test]
async fn test_project_decodes_code_style_envelope() {
    let base_url = spawn_fake(Received::default()).await;
    let api = HttpShowApi::new(&api_config(&base_url, COOKIE)).unwrap();

    let project = api.project(PROJECT_ID).await.unwrap().into_result().unwrap();
    assert_eq!(project.name, "Comic Expo");
    assert_eq!(project.id_bind, Some(2));
    assert_eq!(project.screen_list[0].ticket_list.len(), 2);
    assert!(project.extra.contains_key("performance_desc"));
}

#[tokio::test]
async fn test_missing_login_is_returned_as_data() {
    let base_url = spawn_fake(Received::default()).await;
    let api = HttpShowApi::new(&api_config(&base_url, "SESSDATA=expired")).unwrap();

    let response = api.addresses().await.unwrap();
    assert_eq!(response.errno, -101);
    assert_eq!(response.msg, "not logged in");
    assert!(response.data.is_none());
}

#[tokio::test]
async fn test_http_failure_is_status_error() {
    let base_url = spawn_fake(Received::default()).await;
    let api = HttpShowApi::new(&api_config(&base_url, COOKIE)).unwrap();

    let err = api.project(BROKEN_PROJECT_ID).await.unwrap_err();
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_prepare_rejection_keeps_payload() {
    let base_url = spawn_fake(Received::default()).await;
    let api = HttpShowApi::new(&api_config(&base_url, COOKIE)).unwrap();

    let request = PrepareRequest {
        project_id: CAPTCHA_PROJECT_ID,
        count: 1,
        screen_id: 1,
        sku_id: 1,
    };
    let response = api.prepare(&request).await.unwrap();
    assert_eq!(response.errno, 1);
    assert_eq!(response.msg, "captcha required");
    assert!(response.data.is_none());

    let payload = response.raw_data.unwrap();
    assert_eq!(payload["ga_data"]["riskParams"]["v_voucher"], "v-123");
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let api = HttpShowApi::new(&api_config(&format!("http://127.0.0.1:{}", port), COOKIE))
        .unwrap();
    let err = api.addresses().await.unwrap_err();
    assert!(matches!(err, ApiError::HttpError(_)));
}

#[tokio::test]
async fn test_full_purchase_over_http() {
    let received = Received::default();
    let base_url = spawn_fake(received.clone()).await;
    let api: Arc<dyn ShowApi> = Arc::new(HttpShowApi::new(&api_config(&base_url, COOKIE)).unwrap());

    let mut purchase = PurchaseConfig::for_project(PROJECT_ID);
    purchase.buyer_index = vec![1, 0];
    purchase.screen_ticket = vec![(0, 0)];

    let outcome = run_purchase(api, &purchase, false).await.unwrap();
    assert!(outcome.is_success());

    let draft = outcome.draft();
    assert_eq!(draft.count, 2);
    assert_eq!(draft.pay_money, 8800 + 600);
    assert_eq!(draft.token.as_deref(), Some("tok-xyz"));

    let prepare_form = received.form("prepare").unwrap();
    assert_eq!(prepare_form["count"], "2");
    assert_eq!(prepare_form["screen_id"], "150001");
    assert_eq!(prepare_form["sku_id"], "400001");

    let create_form = received.form("create").unwrap();
    assert_eq!(create_form["token"], "tok-xyz");
    assert_eq!(create_form["pay_money"], "9400");
    assert_eq!(create_form["count"], "2");
    assert!(!create_form.contains_key("buyer"));

    let buyer_info: Vec<Value> = serde_json::from_str(&create_form["buyer_info"]).unwrap();
    assert_eq!(buyer_info.len(), 2);
    assert_eq!(buyer_info[0]["id"], 12);
    assert_eq!(buyer_info[0]["isBuyerInfoVerified"], "true");
    assert_eq!(buyer_info[0]["is_default"], 0);

    let deliver: Value = serde_json::from_str(&create_form["deliver_info"]).unwrap();
    assert_eq!(deliver["addr_id"], 71);
    assert_eq!(deliver["addr"], "BeijingBeijingHaidian1 Zhongguancun St");
}
