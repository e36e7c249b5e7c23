use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use farm_market::api::rest::router;
use farm_market::config::Config;
use farm_market::engine::payment::Authorizer;
use farm_market::models::order::PaymentMethod;
use farm_market::state::AppState;
use farm_market::store::MemoryRepository;
use serde_json::{json, Value};
use tower::ServiceExt;

struct FixedAuthorizer(bool);

impl Authorizer for FixedAuthorizer {
    fn authorize(&self, method: PaymentMethod) -> bool {
        method == PaymentMethod::Cash || self.0
    }
}

fn setup_with(payments_succeed: bool) -> axum::Router {
    let config = Config {
        payment_delay_ms: 0,
        ..Config::default()
    };
    let state = AppState::with_parts(
        config,
        Arc::new(MemoryRepository::new()),
        Arc::new(MemoryRepository::new()),
        Arc::new(MemoryRepository::new()),
        Arc::new(FixedAuthorizer(payments_succeed)),
    );
    router(Arc::new(state))
}

fn setup() -> axum::Router {
    setup_with(true)
}

fn request(method: &str, uri: &str, actor: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header("x-actor-id", actor);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn get_request(uri: &str) -> Request<Body> {
    request("GET", uri, None, None)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn register(app: &axum::Router, name: &str, role: &str) -> String {
    let mut payload = json!({
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "phone": "9000000000",
        "role": role,
        "village": "Sira"
    });
    if role == "DELIVERY" {
        payload["vehicle"] = json!({ "kind": "Bike", "name": "Splendor", "number": "KA-06-7788" });
    }

    let res = app
        .clone()
        .oneshot(request("POST", "/users", None, Some(payload)))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn list_product(app: &axum::Router, farmer: &str) -> String {
    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/products",
            Some(farmer),
            Some(json!({
                "name": "Tomato",
                "price_per_kg": 30.0,
                "quantity_kg": 100.0,
                "grade": "A"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await["id"].as_str().unwrap().to_string()
}

async fn checkout(app: &axum::Router, consumer: &str, product: &str, method: &str) -> Value {
    let res = app
        .clone()
        .oneshot(request(
            "POST",
            "/orders",
            Some(consumer),
            Some(json!({
                "items": [{ "product_id": product, "quantity": 2.0 }],
                "payment_method": method
            })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    body_json(res).await
}

async fn set_status(app: &axum::Router, order: &str, actor: &str, status: &str) -> axum::response::Response {
    app.clone()
        .oneshot(request(
            "PATCH",
            &format!("/orders/{order}/status"),
            Some(actor),
            Some(json!({ "status": status })),
        ))
        .await
        .unwrap()
}

struct Cast {
    farmer: String,
    consumer: String,
    partner: String,
    product: String,
}

async fn cast(app: &axum::Router) -> Cast {
    let farmer = register(app, "Ravi", "FARMER").await;
    let consumer = register(app, "Asha", "CONSUMER").await;
    let partner = register(app, "Dev", "DELIVERY").await;
    let product = list_product(app, &farmer).await;
    Cast {
        farmer,
        consumer,
        partner,
        product,
    }
}

#[tokio::test]
async fn health_returns_ok() {
    let app = setup();
    let response = app.oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["users"], 0);
    assert_eq!(body["orders"], 0);
}

#[tokio::test]
async fn metrics_returns_prometheus_format() {
    let app = setup();
    let response = app.oneshot(get_request("/metrics")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("text/plain"));

    let body = body_string(response).await;
    assert!(body.contains("orders_open"));
}

#[tokio::test]
async fn register_user_rejects_blank_name() {
    let app = setup();
    let response = app
        .oneshot(request(
            "POST",
            "/users",
            None,
            Some(json!({ "name": "  ", "email": "a@b.c", "role": "CONSUMER" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_opens_pending_order_with_first_reference() {
    let app = setup();
    let cast = cast(&app).await;

    let order = checkout(&app, &cast.consumer, &cast.product, "CASH").await;

    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["reference"], 1001);
    assert_eq!(order["total_amount"], 62.0);
    assert_eq!(order["address"], "Sira");
    assert_eq!(order["farmer"]["id"], cast.farmer.as_str());

    let res = app
        .oneshot(request("GET", "/notifications", Some(&cast.farmer), None))
        .await
        .unwrap();
    let inbox = body_json(res).await;
    assert_eq!(inbox.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn cash_order_runs_to_delivery_and_rating() {
    let app = setup();
    let cast = cast(&app).await;
    let order = checkout(&app, &cast.consumer, &cast.product, "CASH").await;
    let id = order["id"].as_str().unwrap();

    for (actor, status) in [
        (&cast.farmer, "ACCEPTED"),
        (&cast.partner, "DRIVER_ASSIGNED"),
        (&cast.partner, "PICKED_UP"),
        (&cast.partner, "DELIVERED"),
    ] {
        let res = set_status(&app, id, actor, status).await;
        assert_eq!(res.status(), StatusCode::OK, "moving to {status}");
        assert_eq!(body_json(res).await["status"], status);
    }

    let res = app
        .clone()
        .oneshot(request("GET", &format!("/orders/{id}"), Some(&cast.consumer), None))
        .await
        .unwrap();
    let delivered = body_json(res).await;
    assert_eq!(delivered["payment_status"], "PAID");
    assert_eq!(delivered["delivery_partner"]["id"], cast.partner.as_str());

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/orders/{id}/rating"),
            Some(&cast.consumer),
            Some(json!({ "rating": 3, "feedback": "late but fresh" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["rating"], 3);

    let res = app
        .clone()
        .oneshot(get_request(&format!("/users/{}", cast.partner)))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["rating"], 4.0);

    let res = app
        .oneshot(request(
            "POST",
            &format!("/orders/{id}/rating"),
            Some(&cast.consumer),
            Some(json!({ "rating": 5 })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(res).await["code"], "already_rated");
}

#[tokio::test]
async fn rejected_order_is_closed() {
    let app = setup();
    let cast = cast(&app).await;
    let order = checkout(&app, &cast.consumer, &cast.product, "CASH").await;
    let id = order["id"].as_str().unwrap();

    let res = set_status(&app, id, &cast.farmer, "REJECTED").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = set_status(&app, id, &cast.farmer, "ACCEPTED").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn second_claim_gets_soft_conflict() {
    let app = setup();
    let cast = cast(&app).await;
    let rival = register(&app, "Mani", "DELIVERY").await;
    let order = checkout(&app, &cast.consumer, &cast.product, "CASH").await;
    let id = order["id"].as_str().unwrap();

    set_status(&app, id, &cast.farmer, "ACCEPTED").await;
    let res = set_status(&app, id, &cast.partner, "DRIVER_ASSIGNED").await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = set_status(&app, id, &rival, "DRIVER_ASSIGNED").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = body_json(res).await;
    assert_eq!(body["error"], "This delivery job is no longer available.");
}

#[tokio::test]
async fn unpaid_upi_order_hidden_until_paid() {
    let app = setup();
    let cast = cast(&app).await;
    let order = checkout(&app, &cast.consumer, &cast.product, "UPI").await;
    let id = order["id"].as_str().unwrap();
    set_status(&app, id, &cast.farmer, "ACCEPTED").await;

    let res = app
        .clone()
        .oneshot(request("GET", "/views/delivery", Some(&cast.partner), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["available"].as_array().unwrap().len(), 0);

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/orders/{id}/payment"),
            Some(&cast.consumer),
            Some(json!({ "method": "CARD" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let paid = body_json(res).await;
    assert_eq!(paid["payment_status"], "PAID");
    assert_eq!(paid["payment_method"], "CARD");

    let res = app
        .oneshot(request("GET", "/views/delivery", Some(&cast.partner), None))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["available"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn declined_payment_returns_402() {
    let app = setup_with(false);
    let cast = cast(&app).await;
    let order = checkout(&app, &cast.consumer, &cast.product, "UPI").await;
    let id = order["id"].as_str().unwrap();
    set_status(&app, id, &cast.farmer, "ACCEPTED").await;

    let res = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/orders/{id}/payment"),
            Some(&cast.consumer),
            Some(json!({ "method": "WALLET" })),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYMENT_REQUIRED);

    let res = app
        .oneshot(request("GET", &format!("/orders/{id}"), Some(&cast.consumer), None))
        .await
        .unwrap();
    assert_eq!(body_json(res).await["payment_status"], "PENDING");
}

#[tokio::test]
async fn missing_actor_header_is_unauthorized() {
    let app = setup();
    let response = app
        .oneshot(request("GET", "/views/consumer", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_endpoints_require_admin_role() {
    let app = setup();
    let consumer = register(&app, "Asha", "CONSUMER").await;
    let admin = register(&app, "Root", "ADMIN").await;

    let res = app
        .clone()
        .oneshot(request("GET", "/admin/overview", Some(&consumer), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .oneshot(request("GET", "/admin/overview", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await;
    assert_eq!(body["users"], 2);
    assert_eq!(body["total_orders"], 0);
}

#[tokio::test]
async fn product_search_matches_case_insensitively() {
    let app = setup();
    let farmer = register(&app, "Ravi", "FARMER").await;
    list_product(&app, &farmer).await;

    let res = app
        .clone()
        .oneshot(get_request("/products?q=toma"))
        .await
        .unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 1);

    let res = app.oneshot(get_request("/products?q=onion")).await.unwrap();
    assert_eq!(body_json(res).await.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn order_is_private_to_its_parties() {
    let app = setup();
    let cast = cast(&app).await;
    let stranger = register(&app, "Meena", "CONSUMER").await;
    let order = checkout(&app, &cast.consumer, &cast.product, "CASH").await;
    let id = order["id"].as_str().unwrap();

    let res = app
        .clone()
        .oneshot(get_request(&format!("/orders/{id}")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .clone()
        .oneshot(request("GET", &format!("/orders/{id}"), Some(&stranger), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app
        .oneshot(request("GET", &format!("/orders/{id}"), Some(&cast.farmer), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_json(res).await["reference"], 1001);
}

#[tokio::test]
async fn farmer_view_lists_own_products() {
    let app = setup();
    let cast = cast(&app).await;
    let other_farmer = register(&app, "Gowda", "FARMER").await;
    list_product(&app, &other_farmer).await;

    let res = app
        .oneshot(request("GET", "/views/farmer", Some(&cast.farmer), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = body_json(res).await;
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["id"], cast.product.as_str());
    assert_eq!(products[0]["farmer_id"], cast.farmer.as_str());
}
