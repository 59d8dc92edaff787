//! HTTP surface tests against a recording stub exchange.

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use spot_guard::api::{AppState, create_router};
use spot_guard::exchange::{
    ACCOUNT_PATH, Exchange, ExchangeError, ORDER_PATH, QueryParams, TICKER_PRICE_PATH,
};
use spot_guard::risk::TradingPolicy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// ============================================================================
// Stub exchange
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    method: &'static str,
    path: String,
    params: Vec<(String, String)>,
    signed: bool,
}

#[derive(Default)]
struct StubExchange {
    responses: Mutex<HashMap<String, Result<Value, ExchangeError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubExchange {
    fn respond(self, path: &str, response: Result<Value, ExchangeError>) -> Self {
        self.responses.lock().unwrap().insert(path.to_string(), response);
        self
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str, path: &str, params: QueryParams, signed: bool) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            signed,
        });
    }

    fn answer(&self, path: &str) -> Result<Value, ExchangeError> {
        self.responses
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| panic!("no stub response for {path}"))
    }
}

#[async_trait]
impl Exchange for StubExchange {
    async fn get(&self, path: &str, params: QueryParams, signed: bool) -> Result<Value, ExchangeError> {
        self.record("GET", path, params, signed);
        self.answer(path)
    }

    async fn post(&self, path: &str, params: QueryParams, signed: bool) -> Result<Value, ExchangeError> {
        self.record("POST", path, params, signed);
        self.answer(path)
    }
}

// ============================================================================
// Fixtures
// ============================================================================

fn app(stub: Arc<StubExchange>) -> Router {
    let policy = TradingPolicy::new(["BTCUSDT", "ETHUSDT"], dec!(100));
    create_router(Arc::new(AppState::new(stub, policy)))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_order(order: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(order.to_string()))
        .unwrap()
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn order_ack() -> Value {
    json!({ "symbol": "BTCUSDT", "orderId": 28, "status": "FILLED" })
}

// ============================================================================
// /ping
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let stub = Arc::new(StubExchange::default());
    let (status, body) = send(app(stub.clone()), get("/ping")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
    assert!(stub.calls().is_empty());
}

// ============================================================================
// /price/{symbol}
// ============================================================================

#[tokio::test]
async fn test_price_normalizes_symbol() {
    let stub = Arc::new(StubExchange::default().respond(
        TICKER_PRICE_PATH,
        Ok(json!({ "symbol": "BTCUSDT", "price": "67000.50000000" })),
    ));

    let (status, body) = send(app(stub.clone()), get("/price/btcusdt")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "symbol": "BTCUSDT", "price": 67000.5 }));
    assert_eq!(
        stub.calls(),
        vec![RecordedCall {
            method: "GET",
            path: TICKER_PRICE_PATH.to_string(),
            params: params(&[("symbol", "BTCUSDT")]),
            signed: false,
        }]
    );
}

#[tokio::test]
async fn test_price_passes_upstream_error_through() {
    let upstream = r#"{"code":-1121,"msg":"Invalid symbol."}"#;
    let stub = Arc::new(StubExchange::default().respond(
        TICKER_PRICE_PATH,
        Err(ExchangeError::Rejected {
            status: 400,
            body: upstream.to_string(),
        }),
    ));

    let (status, body) = send(app(stub), get("/price/nope")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "detail": upstream }));
}

#[tokio::test]
async fn test_price_malformed_payload_is_bad_gateway() {
    let stub = Arc::new(
        StubExchange::default().respond(TICKER_PRICE_PATH, Ok(json!({ "symbol": "BTCUSDT" }))),
    );

    let (status, body) = send(app(stub), get("/price/BTCUSDT")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["detail"].as_str().unwrap().contains("price"));
}

// ============================================================================
// /balance
// ============================================================================

#[tokio::test]
async fn test_balance_keeps_positive_free_amounts() {
    let stub = Arc::new(StubExchange::default().respond(
        ACCOUNT_PATH,
        Ok(json!({
            "canTrade": true,
            "balances": [
                { "asset": "BTC", "free": "0.50000000", "locked": "0.00000000" },
                { "asset": "BNB", "free": "0.00000000", "locked": "2.00000000" },
                { "asset": "USDT", "free": "1000.25000000", "locked": "0.00000000" }
            ]
        })),
    ));

    let (status, body) = send(app(stub.clone()), get("/balance")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "balances": { "BTC": 0.5, "USDT": 1000.25 } }));

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, ACCOUNT_PATH);
    assert!(calls[0].signed);
    assert!(calls[0].params.is_empty());
}

#[tokio::test]
async fn test_balance_timeout_is_gateway_timeout() {
    let stub = Arc::new(StubExchange::default().respond(
        ACCOUNT_PATH,
        Err(ExchangeError::Unreachable {
            timed_out: true,
            reason: "operation timed out".into(),
        }),
    ));

    let (status, body) = send(app(stub), get("/balance")).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert!(body["detail"].as_str().unwrap().contains("unreachable"));
}

// ============================================================================
// /order
// ============================================================================

#[tokio::test]
async fn test_market_buy_is_forwarded_with_two_decimals() {
    let stub = Arc::new(StubExchange::default().respond(ORDER_PATH, Ok(order_ack())));

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "BTCUSDT",
            "side": "BUY",
            "type": "MARKET",
            "quote_amount": 50,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "exchange_response": order_ack() }));
    assert_eq!(
        stub.calls(),
        vec![RecordedCall {
            method: "POST",
            path: ORDER_PATH.to_string(),
            params: params(&[
                ("symbol", "BTCUSDT"),
                ("side", "BUY"),
                ("type", "MARKET"),
                ("quoteOrderQty", "50.00"),
            ]),
            signed: true,
        }]
    );
}

#[tokio::test]
async fn test_market_buy_over_limit_makes_no_call() {
    let stub = Arc::new(StubExchange::default());

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "BTCUSDT",
            "side": "BUY",
            "type": "MARKET",
            "quote_amount": 150,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("100"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_market_buy_at_limit_is_accepted() {
    let stub = Arc::new(StubExchange::default().respond(ORDER_PATH, Ok(order_ack())));

    let (status, _) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "btcusdt",
            "side": "BUY",
            "type": "MARKET",
            "quote_amount": 100,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let calls = stub.calls();
    assert!(calls[0].params.contains(&("quoteOrderQty".to_string(), "100.00".to_string())));
    assert!(calls[0].params.contains(&("symbol".to_string(), "BTCUSDT".to_string())));
}

#[tokio::test]
async fn test_symbol_outside_allow_list_makes_no_call() {
    for symbol in ["SOLUSDT", "dogeusdt", "BTCUSD"] {
        let stub = Arc::new(StubExchange::default());

        let (status, body) = send(
            app(stub.clone()),
            post_order(json!({
                "symbol": symbol,
                "side": "SELL",
                "type": "MARKET",
                "quantity": 1,
                "confirmed": true
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{symbol}");
        assert!(body["detail"].as_str().unwrap().contains("BTCUSDT, ETHUSDT"));
        assert!(stub.calls().is_empty());
    }
}

#[tokio::test]
async fn test_unconfirmed_order_makes_no_call() {
    let stub = Arc::new(StubExchange::default());

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "ETHUSDT",
            "side": "BUY",
            "type": "LIMIT",
            "quantity": 1,
            "price": 3000
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("confirmation missing"));
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_limit_order_params() {
    let stub = Arc::new(StubExchange::default().respond(ORDER_PATH, Ok(order_ack())));

    let (status, _) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "ETHUSDT",
            "side": "SELL",
            "type": "LIMIT",
            "quantity": 0.5,
            "price": 3100.5,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stub.calls()[0].params,
        params(&[
            ("symbol", "ETHUSDT"),
            ("side", "SELL"),
            ("type", "LIMIT"),
            ("quantity", "0.500000"),
            ("price", "3100.50"),
            ("timeInForce", "GTC"),
        ])
    );
}

#[tokio::test]
async fn test_missing_fields_name_requirements() {
    let cases = [
        (json!({ "side": "BUY", "type": "MARKET" }), "quote_amount"),
        (json!({ "side": "SELL", "type": "MARKET" }), "quantity"),
        (json!({ "side": "BUY", "type": "LIMIT", "quantity": 1 }), "quantity and price"),
    ];

    for (mut order, expected) in cases {
        order["symbol"] = json!("BTCUSDT");
        order["confirmed"] = json!(true);
        let stub = Arc::new(StubExchange::default());

        let (status, body) = send(app(stub.clone()), post_order(order)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains(expected), "{body}");
        assert!(stub.calls().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_order_type_never_reaches_exchange() {
    let stub = Arc::new(StubExchange::default());

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "BTCUSDT",
            "side": "BUY",
            "type": "STOP_LOSS",
            "quantity": 1,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("STOP_LOSS"), "{body}");
    assert!(stub.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_order_body_is_json_bad_request() {
    let not_json = Request::builder()
        .method("POST")
        .uri("/order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let no_content_type = Request::builder()
        .method("POST")
        .uri("/order")
        .body(Body::from(r#"{"symbol":"BTCUSDT"}"#))
        .unwrap();
    let huge_amount = Request::builder()
        .method("POST")
        .uri("/order")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"symbol":"BTCUSDT","side":"BUY","type":"MARKET","quote_amount":1e40,"confirmed":true}"#,
        ))
        .unwrap();

    for req in [not_json, no_content_type, huge_amount] {
        let stub = Arc::new(StubExchange::default());
        let (status, body) = send(app(stub.clone()), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!body["detail"].as_str().unwrap_or_default().is_empty(), "{body}");
        assert!(stub.calls().is_empty());
    }
}

#[tokio::test]
async fn test_upstream_order_rejection_passes_through() {
    let upstream = r#"{"code":-2010,"msg":"Account has insufficient balance for requested action."}"#;
    let stub = Arc::new(StubExchange::default().respond(
        ORDER_PATH,
        Err(ExchangeError::Rejected {
            status: 400,
            body: upstream.to_string(),
        }),
    ));

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "BTCUSDT",
            "side": "SELL",
            "type": "MARKET",
            "quantity": 0.001,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], json!(upstream));
    // submitted exactly once, no retry
    assert_eq!(stub.calls().len(), 1);
}

#[tokio::test]
async fn test_upstream_server_error_status_is_kept() {
    let stub = Arc::new(StubExchange::default().respond(
        ORDER_PATH,
        Err(ExchangeError::Rejected {
            status: 503,
            body: "Service Unavailable".into(),
        }),
    ));

    let (status, body) = send(
        app(stub.clone()),
        post_order(json!({
            "symbol": "BTCUSDT",
            "side": "BUY",
            "type": "MARKET",
            "quote_amount": 10,
            "confirmed": true
        })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({ "detail": "Service Unavailable" }));
    assert_eq!(stub.calls().len(), 1);
}
