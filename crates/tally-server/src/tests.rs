//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use tally_core::db::Database;
use tempfile::TempDir;
use tower::ServiceExt;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

struct TestApp {
    router: Router,
    db: Database,
    _uploads: TempDir,
}

fn setup_with_config(mut config: ServerConfig) -> TestApp {
    let db = Database::in_memory().unwrap();
    let uploads = TempDir::new().unwrap();
    config.upload_dir = uploads.path().to_path_buf();
    TestApp {
        router: create_router(db.clone(), None, config),
        db,
        _uploads: uploads,
    }
}

fn setup_test_app() -> TestApp {
    setup_with_config(ServerConfig::default())
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn get(&self, user: &str, uri: &str) -> axum::response::Response {
        self.send(
            Request::builder()
                .uri(uri)
                .header(CF_ACCESS_USER_HEADER, user)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn delete(&self, user: &str, uri: &str) -> axum::response::Response {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(CF_ACCESS_USER_HEADER, user)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn send_json(
        &self,
        method: &str,
        user: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> axum::response::Response {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(CF_ACCESS_USER_HEADER, user)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
    }

    async fn post_json(
        &self,
        user: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> axum::response::Response {
        self.send_json("POST", user, uri, body).await
    }

    async fn upload(
        &self,
        user: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> axum::response::Response {
        let boundary = "tally-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/receipts/upload")
                .header(CF_ACCESS_USER_HEADER, user)
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn expense(amount: f64, date: &str, category: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "expense",
        "amount": amount,
        "transaction_date": date,
        "category_name": category
    })
}

// ========== Identity Tests ==========

#[tokio::test]
async fn test_missing_identity_is_rejected() {
    let app = setup_test_app();

    let response = app
        .send(
            Request::builder()
                .uri("/api/transactions")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_me_provisions_user() {
    let app = setup_test_app();

    let response = app.get(ALICE, "/api/me").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], ALICE);
    assert_eq!(json["user"]["name"], "alice");
    assert_eq!(json["auth_method"], "cloudflare_header");

    // Second request resolves to the same row
    app.get(ALICE, "/api/me").await;
    assert_eq!(app.db.list_users().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_auth_acts_as_local_dev() {
    let app = setup_with_config(ServerConfig {
        require_auth: false,
        ..Default::default()
    });

    let response = app
        .send(Request::builder().uri("/api/me").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], "local-dev@localhost");
    assert_eq!(json["auth_method"], "none");
}

#[tokio::test]
async fn test_api_key_auth() {
    let app = setup_with_config(ServerConfig {
        api_keys: parse_api_keys("ci@example.com=secret-key-1"),
        ..Default::default()
    });

    let response = app
        .send(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer secret-key-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["user"]["email"], "ci@example.com");
    assert_eq!(json["auth_method"], "api_key");

    let response = app
        .send(
            Request::builder()
                .uri("/api/me")
                .header("authorization", "Bearer wrong-key-12")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[test]
fn test_parse_api_keys() {
    let keys = parse_api_keys(" a@example.com = k1 ,broken,, b@example.com=k2,=k3,c@example.com=");
    assert_eq!(
        keys,
        vec![
            ApiKey {
                email: "a@example.com".to_string(),
                key: "k1".to_string()
            },
            ApiKey {
                email: "b@example.com".to_string(),
                key: "k2".to_string()
            },
        ]
    );
}

#[test]
fn test_validate_api_key() {
    let keys = parse_api_keys("a@example.com=abc,b@example.com=abcdef");
    assert_eq!(validate_api_key("abc", &keys), Some("a@example.com"));
    assert_eq!(validate_api_key("abcdef", &keys), Some("b@example.com"));
    assert_eq!(validate_api_key("abd", &keys), None);
    assert_eq!(validate_api_key("", &keys), None);
}

#[tokio::test]
async fn test_security_headers() {
    let app = setup_test_app();

    let response = app.get(ALICE, "/api/me").await;
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert!(headers.contains_key("content-security-policy"));
}

// ========== Category Tests ==========

#[tokio::test]
async fn test_category_lifecycle() {
    let app = setup_test_app();

    let response = app
        .post_json(
            ALICE,
            "/api/categories",
            serde_json::json!({"name": "Groceries", "type": "expense"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = get_body_json(response).await;
    assert_eq!(created["name"], "Groceries");
    assert_eq!(created["type"], "expense");
    let id = created["id"].as_i64().unwrap();

    let response = app
        .post_json(
            ALICE,
            "/api/categories",
            serde_json::json!({"name": "Groceries", "type": "expense"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await["error"],
        "Category already exists"
    );

    let response = app.get(ALICE, "/api/categories").await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);

    // Another user cannot see or delete it
    let response = app.get(BOB, "/api/categories").await;
    assert!(get_body_json(response).await.as_array().unwrap().is_empty());
    let response = app.delete(BOB, &format!("/api/categories/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_json(response).await["error"], "Category not found");

    let response = app.delete(ALICE, &format!("/api/categories/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["message"], "Category deleted");
}

#[tokio::test]
async fn test_invalid_category_data() {
    let app = setup_test_app();

    for body in [
        serde_json::json!({"name": "  ", "type": "expense"}),
        serde_json::json!({"name": "Travel", "type": "transfer"}),
        serde_json::json!({"name": "Travel"}),
    ] {
        let response = app.post_json(ALICE, "/api/categories", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_body_json(response).await["error"],
            "Invalid category data"
        );
    }
}

#[tokio::test]
async fn test_malformed_and_oversized_json() {
    let app = setup_test_app();

    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri("/api/categories")
                .header(CF_ACCESS_USER_HEADER, ALICE)
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["error"], "Invalid JSON");

    let huge = "x".repeat(MAX_JSON_BODY + 1);
    let response = app
        .post_json(
            ALICE,
            "/api/categories",
            serde_json::json!({"name": huge, "type": "expense"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Transaction Tests ==========

#[tokio::test]
async fn test_transaction_crud() {
    let app = setup_test_app();

    app.post_json(
        ALICE,
        "/api/categories",
        serde_json::json!({"name": "Food", "type": "expense"}),
    )
    .await;

    let response = app
        .post_json(
            ALICE,
            "/api/transactions",
            serde_json::json!({
                "type": "expense",
                "amount": "12.50",
                "transaction_date": "2024-03-15T12:00:00Z",
                "category_name": " Food ",
                "description": "  "
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let tx = get_body_json(response).await;
    assert_eq!(tx["amount"], 12.5);
    assert_eq!(tx["transaction_date"], "2024-03-15");
    assert_eq!(tx["category_name"], "Food");
    assert!(tx["category_id"].is_i64());
    assert!(tx["description"].is_null());
    let id = tx["id"].as_i64().unwrap();

    let response = app.get(ALICE, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send_json(
            "PUT",
            ALICE,
            &format!("/api/transactions/{}", id),
            serde_json::json!({"amount": 20, "description": "Dinner"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = get_body_json(response).await;
    assert_eq!(updated["amount"], 20.0);
    assert_eq!(updated["description"], "Dinner");
    assert_eq!(updated["category_name"], "Food");

    let response = app.delete(ALICE, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        get_body_json(response).await["message"],
        "Transaction deleted"
    );

    let response = app.get(ALICE, &format!("/api/transactions/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get_body_json(response).await["error"],
        "Transaction not found"
    );
}

#[tokio::test]
async fn test_transaction_validation() {
    let app = setup_test_app();

    for body in [
        serde_json::json!({"type": "transfer", "amount": 5, "transaction_date": "2024-01-01"}),
        serde_json::json!({"type": "expense", "amount": 0, "transaction_date": "2024-01-01"}),
        serde_json::json!({"type": "expense", "amount": -3, "transaction_date": "2024-01-01"}),
        serde_json::json!({"type": "expense", "amount": 5, "transaction_date": "01/02/2024"}),
        serde_json::json!({"type": "expense", "transaction_date": "2024-01-01"}),
    ] {
        let response = app.post_json(ALICE, "/api/transactions", body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
    }
}

#[tokio::test]
async fn test_transaction_ownership() {
    let app = setup_test_app();

    let response = app
        .post_json(ALICE, "/api/transactions", expense(9.99, "2024-01-05", "Misc"))
        .await;
    let id = get_body_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/transactions/{}", id);

    assert_eq!(app.get(BOB, &uri).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        app.send_json("PUT", BOB, &uri, serde_json::json!({"amount": 1}))
            .await
            .status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(app.delete(BOB, &uri).await.status(), StatusCode::NOT_FOUND);

    let response = app.get(BOB, "/api/transactions").await;
    assert!(get_body_json(response).await.as_array().unwrap().is_empty());

    assert_eq!(app.get(ALICE, &uri).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_transaction_list_filters() {
    let app = setup_test_app();

    app.post_json(ALICE, "/api/transactions", expense(10.0, "2024-03-01", "A"))
        .await;
    app.post_json(ALICE, "/api/transactions", expense(20.0, "2024-03-31", "B"))
        .await;
    app.post_json(ALICE, "/api/transactions", expense(30.0, "2024-04-01", "C"))
        .await;
    app.post_json(
        ALICE,
        "/api/transactions",
        serde_json::json!({"type": "income", "amount": 100, "transaction_date": "2024-03-10"}),
    )
    .await;

    let response = app.get(ALICE, "/api/transactions").await;
    let all = get_body_json(response).await;
    let dates: Vec<_> = all
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["transaction_date"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        dates,
        vec!["2024-04-01", "2024-03-31", "2024-03-10", "2024-03-01"]
    );

    let response = app
        .get(ALICE, "/api/transactions?month=3&year=2024&type=expense")
        .await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 2);

    // Unknown type is ignored
    let response = app
        .get(ALICE, "/api/transactions?month=3&year=2024&type=bogus")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 3);

    for uri in [
        "/api/transactions?month=3",
        "/api/transactions?year=2024",
        "/api/transactions?month=13&year=2024",
    ] {
        assert_eq!(
            app.get(ALICE, uri).await.status(),
            StatusCode::BAD_REQUEST,
            "{}",
            uri
        );
    }
}

// ========== Recurring Bill Tests ==========

#[tokio::test]
async fn test_recurring_bill_lifecycle() {
    let app = setup_test_app();

    let response = app
        .post_json(
            ALICE,
            "/api/recurring-bills",
            serde_json::json!({"category_name": "Rent", "amount": 1500, "due_date": 1}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let bill = get_body_json(response).await;
    let id = bill["id"].as_i64().unwrap();
    assert_eq!(bill["amount"], 1500.0);

    for body in [
        serde_json::json!({"category_name": "Gym", "amount": 30, "due_date": 32}),
        serde_json::json!({"category_name": "", "amount": 30, "due_date": 3}),
        serde_json::json!({"category_name": "Gym", "amount": 0, "due_date": 3}),
    ] {
        let response = app.post_json(ALICE, "/api/recurring-bills", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .send_json(
            "PUT",
            ALICE,
            &format!("/api/recurring-bills/{}", id),
            serde_json::json!({"due_date": "5"}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["due_date"], 5);

    let response = app.get(BOB, &format!("/api/recurring-bills/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        get_body_json(response).await["error"],
        "Recurring bill not found"
    );

    let response = app
        .delete(ALICE, &format!("/api/recurring-bills/{}", id))
        .await;
    assert_eq!(
        get_body_json(response).await["message"],
        "Recurring bill deleted"
    );
    let response = app.get(ALICE, "/api/recurring-bills").await;
    assert!(get_body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_recurring_bills_month_view() {
    let app = setup_test_app();

    app.post_json(
        ALICE,
        "/api/recurring-bills",
        serde_json::json!({"category_name": "Internet", "amount": 59.99, "due_date": 20}),
    )
    .await;
    app.post_json(
        ALICE,
        "/api/recurring-bills",
        serde_json::json!({"category_name": "Rent", "amount": 1500, "due_date": 1}),
    )
    .await;
    app.post_json(ALICE, "/api/transactions", expense(1500.0, "2024-05-01", "Rent"))
        .await;

    let response = app
        .get(ALICE, "/api/recurring-bills/month?month=5&year=2024")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let bills = json.as_array().unwrap();
    assert_eq!(bills.len(), 2);
    assert_eq!(bills[0]["category_name"], "Rent");
    assert_eq!(bills[0]["is_complete"], true);
    assert_eq!(bills[0]["expense_count"], 1);
    assert_eq!(bills[1]["category_name"], "Internet");
    assert_eq!(bills[1]["is_complete"], false);

    for uri in [
        "/api/recurring-bills/month",
        "/api/recurring-bills/month?month=5",
        "/api/recurring-bills/month?month=&year=2024",
    ] {
        let response = app.get(ALICE, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_body_json(response).await["error"],
            "Month and year are required"
        );
    }

    // Present but malformed values keep their specific message
    for uri in [
        "/api/recurring-bills/month?month=13&year=2024",
        "/api/recurring-bills/month?month=abc&year=2024",
    ] {
        let response = app.get(ALICE, uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_body_json(response).await["error"],
            "Month must be between 1 and 12"
        );
    }
}

// ========== Dashboard Tests ==========

#[tokio::test]
async fn test_dashboard_stats() {
    let app = setup_test_app();
    let today = chrono::Local::now().date_naive();
    let date = today.format("%Y-%m-%d").to_string();
    let period = tally_core::models::MonthPeriod::containing(today);

    app.post_json(
        ALICE,
        "/api/transactions",
        serde_json::json!({"type": "income", "amount": 2500, "transaction_date": date}),
    )
    .await;
    app.post_json(ALICE, "/api/transactions", expense(1000.0, &date, "Rent"))
        .await;
    app.post_json(
        ALICE,
        "/api/transactions",
        serde_json::json!({"type": "expense", "amount": 125.5, "transaction_date": date}),
    )
    .await;
    // Someone else's spending never shows up
    app.post_json(BOB, "/api/transactions", expense(77.0, &date, "Rent"))
        .await;

    let response = app
        .get(
            ALICE,
            &format!(
                "/api/dashboard/stats?month={}&year={}",
                period.month, period.year
            ),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;

    assert_eq!(json["summary"]["totalIncome"], 2500.0);
    assert_eq!(json["summary"]["totalExpenses"], 1125.5);
    assert_eq!(json["summary"]["netBalance"], 1374.5);

    let breakdown = json["categoryBreakdown"].as_array().unwrap();
    assert_eq!(breakdown[0]["category"], "Rent");
    assert_eq!(breakdown[0]["total"], 1000.0);
    assert_eq!(breakdown[1]["category"], "Uncategorized");

    let monthly = json["monthlyData"].as_array().unwrap();
    assert_eq!(monthly.len(), 2);
    assert_eq!(monthly[0]["type"], "expense");
    assert_eq!(monthly[1]["type"], "income");

    let response = app.get(ALICE, "/api/dashboard/stats?year=2024").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Receipt Tests ==========

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n0000";

#[tokio::test]
async fn test_receipt_upload_serve_delete() {
    let app = setup_test_app();

    let response = app
        .upload(ALICE, "receipt", "lunch.png", "image/png", PNG_BYTES)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let stored = get_body_json(response).await;
    let filename = stored["filename"].as_str().unwrap().to_string();
    let path = stored["path"].as_str().unwrap().to_string();
    assert_eq!(stored["originalName"], "lunch.png");
    assert_eq!(path, format!("/uploads/{}", filename));

    // Attach it to a transaction
    let response = app
        .post_json(
            ALICE,
            "/api/transactions",
            serde_json::json!({
                "type": "expense",
                "amount": 8.75,
                "transaction_date": "2024-02-02",
                "receipt_path": path
            }),
        )
        .await;
    let tx_id = get_body_json(response).await["id"].as_i64().unwrap();

    let response = app.get(ALICE, &path).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], PNG_BYTES);

    assert_eq!(app.get(BOB, &path).await.status(), StatusCode::FORBIDDEN);

    let response = app
        .delete(BOB, &format!("/api/receipts/{}", filename))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(get_body_json(response).await["error"], "Unauthorized");

    let response = app
        .delete(ALICE, &format!("/api/receipts/{}", filename))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await["message"], "Receipt deleted");

    let response = app.get(ALICE, &format!("/api/transactions/{}", tx_id)).await;
    assert!(get_body_json(response).await["receipt_path"].is_null());

    let response = app
        .delete(ALICE, &format!("/api/receipts/{}", filename))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(get_body_json(response).await["error"], "File not found");

    assert_eq!(app.get(ALICE, &path).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_receipt_upload_rejections() {
    let app = setup_test_app();

    let response = app
        .upload(ALICE, "receipt", "notes.txt", "text/plain", b"hello")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        get_body_json(response).await["error"],
        "Only image files are allowed"
    );

    // Extension alone is not enough
    let response = app
        .upload(ALICE, "receipt", "sneaky.png", "application/pdf", b"%PDF")
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .upload(ALICE, "attachment", "lunch.png", "image/png", PNG_BYTES)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(get_body_json(response).await["error"], "No file uploaded");

    let too_big = vec![0u8; MAX_RECEIPT_SIZE + 1];
    let response = app
        .upload(ALICE, "receipt", "big.jpg", "image/jpeg", &too_big)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_receipt_path_traversal_rejected() {
    let app = setup_test_app();
    let user = app.db.ensure_user(ALICE).unwrap();

    let response = app
        .delete(
            ALICE,
            &format!("/api/receipts/..%2Freceipt-{}-1-x.png", user.id),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Audit Tests ==========

#[tokio::test]
async fn test_audit_log_records_access() {
    let app = setup_test_app();

    app.get(ALICE, "/api/categories").await;
    app.post_json(
        ALICE,
        "/api/categories",
        serde_json::json!({"name": "Fun", "type": "expense"}),
    )
    .await;
    app.get(BOB, "/api/categories").await;

    let response = app.get(ALICE, "/api/audit?limit=5").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "create");
    assert_eq!(entries[0]["entity_type"], "category");

    let response = app.get(ALICE, "/api/audit?limit=0").await;
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);
}
