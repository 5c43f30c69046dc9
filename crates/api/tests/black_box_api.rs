use pressbill_api::config::AppConfig;
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory store, ephemeral port.
        let app = pressbill_api::app::build_app(&AppConfig::default())
            .await
            .expect("failed to build app");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[tokio::test]
async fn health_endpoint_is_open() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/health", srv.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_customer_phone_is_a_conflict() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&json!({"name": "Ravi Traders", "phone": "9848000001"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&json!({"name": "Someone Else", "phone": "9848000001"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn customer_without_phone_gets_a_generated_reference() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/customers", srv.base_url))
        .json(&json!({"name": "Walk-in"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["phone"], "ID-000001");

    let res = client
        .get(format!("{}/customers/ID-000001", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn billing_flow_end_to_end() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Customer + a catalog item with price/tax defaults.
    client
        .post(format!("{}/customers", srv.base_url))
        .json(&json!({
            "name": "Sri Printers",
            "phone": "9848000002",
            "company": "Lakshmi Offset",
        }))
        .send()
        .await
        .unwrap();

    let res = client
        .post(format!("{}/inventory/items", srv.base_url))
        .json(&json!({"name": "Letterheads", "unit_price": 2.5, "tax_percent": 18}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let item: serde_json::Value = res.json().await.unwrap();
    assert_eq!(item["sku"], "ITM-00001");

    let res = client
        .get(format!("{}/inventory/items/Letterheads/defaults", srv.base_url))
        .send()
        .await
        .unwrap();
    let defaults: serde_json::Value = res.json().await.unwrap();
    assert_eq!(defaults["unit_price"], json!(2.5));

    // Bill with a known item (defaults apply) and an unknown description
    // (placeholder item gets staged).
    let res = client
        .post(format!("{}/bills", srv.base_url))
        .json(&json!({
            "customer_phone": "9848000002",
            "lines": [
                {"description": "Letterheads", "quantity": 100},
                {"description": "Custom job", "quantity": 1, "unit_rate": 500},
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let bill: serde_json::Value = res.json().await.unwrap();

    // 100 * 2.50 * 1.18 = 295.00, plus 500.00.
    assert_eq!(bill["subtotal"], json!(795.0));
    assert_eq!(bill["grand_total"], json!(795.0));
    assert_eq!(
        bill["total_in_words"],
        "Seven Hundred and Ninety Five Rupees Only"
    );
    assert_eq!(bill["status"], "finalized");
    let number = bill["number"].as_str().unwrap().to_string();

    // The unknown description is now a catalog item.
    let res = client
        .get(format!("{}/inventory/items?q=custom", srv.base_url))
        .send()
        .await
        .unwrap();
    let items: serde_json::Value = res.json().await.unwrap();
    assert_eq!(items["items"].as_array().unwrap().len(), 1);

    // Replace the lines through the edit flow.
    let res = client
        .put(format!("{}/bills/{}", srv.base_url, number))
        .json(&json!({
            "lines": [
                {"description": "Letterheads", "quantity": 10},
            ],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bill: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bill["grand_total"], json!(29.5));

    // Listing sees it; statements roll it up per company.
    let res = client
        .get(format!("{}/bills?phone=9848000002", srv.base_url))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/statements?scope=year", srv.base_url))
        .send()
        .await
        .unwrap();
    let statement: serde_json::Value = res.json().await.unwrap();
    assert_eq!(statement["invoice_count"], 1);
    assert_eq!(statement["per_company"]["Lakshmi Offset"]["count"], 1);

    let res = client
        .get(format!("{}/statements?scope=year&format=csv", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let csv = res.text().await.unwrap();
    assert!(csv.starts_with("Invoice No,Date,Company,Phone,Total Amount"));

    // Soft delete hides the bill from listings but keeps it fetchable.
    let res = client
        .delete(format!("{}/bills/{}", srv.base_url, number))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .get(format!("{}/bills", srv.base_url))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());

    let res = client
        .get(format!("{}/bills/{}", srv.base_url, number))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bill: serde_json::Value = res.json().await.unwrap();
    assert_eq!(bill["deleted"], true);
}

#[tokio::test]
async fn unknown_bill_is_not_found() {
    let srv = TestServer::spawn().await;
    let res = reqwest::get(format!("{}/bills/INV-010124-00001", srv.base_url))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reconcile_endpoint_recomputes_and_rejects() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Editing the total back-solves the rate.
    let res = client
        .post(format!("{}/reconcile", srv.base_url))
        .json(&json!({
            "quantity": 2,
            "unit_rate": 100,
            "tax_percent": 18,
            "line_total": 236.0,
            "last_edited": "rate",
            "field": "total",
            "value": 300.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["unit_rate"], json!(127.12));
    assert_eq!(body["line_total"], json!(300.0));
    assert_eq!(body["last_edited"], "total");
    // Display rounding is opt-in.
    assert!(body.get("rounded_total").is_none());

    let res = client
        .post(format!("{}/reconcile", srv.base_url))
        .json(&json!({
            "quantity": 3,
            "unit_rate": 33.33,
            "tax_percent": 0,
            "line_total": 99.99,
            "last_edited": "rate",
            "field": "quantity",
            "value": 3,
            "rounding": true,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["line_total"], json!(99.99));
    assert_eq!(body["rounded_total"], json!(100.0));

    // Zero quantity cannot absorb a total edit.
    let res = client
        .post(format!("{}/reconcile", srv.base_url))
        .json(&json!({
            "quantity": 0,
            "unit_rate": 50,
            "tax_percent": 0,
            "line_total": 0.0,
            "last_edited": "quantity",
            "field": "total",
            "value": 100.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "division_by_zero");

    // Negative input leaves an invalid_input error.
    let res = client
        .post(format!("{}/reconcile", srv.base_url))
        .json(&json!({
            "quantity": 2,
            "unit_rate": 100,
            "tax_percent": 18,
            "line_total": 236.0,
            "last_edited": "rate",
            "field": "quantity",
            "value": -1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
