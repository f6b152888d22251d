use std::sync::Arc;

use agri_bff::api::AppContext;
use agri_bff::config::AppConfig;
use agri_bff::logic::payment_signature;
use agri_bff::store::{collection, DocumentStore, MemoryStore};
use agri_bff::translate::EchoTranslator;
use agri_bff::{build_app, seed};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const PAYMENT_SECRET: &str = "integration-secret";

// Test client wrapper for making API calls as a given user
#[derive(Clone)]
struct TestClient {
    client: Client,
    base_url: String,
    user_id: Option<String>,
    roles: Option<String>,
}

impl TestClient {
    fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            user_id: None,
            roles: None,
        }
    }

    fn as_user(&self, user_id: &str) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            roles: None,
            ..self.clone()
        }
    }

    fn with_roles(&self, roles: &str) -> Self {
        Self {
            roles: Some(roles.to_string()),
            ..self.clone()
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;
        if let Some(user_id) = &self.user_id {
            builder = builder.header("X-User-Id", user_id);
        }
        if let Some(roles) = &self.roles {
            builder = builder.header("X-User-Roles", roles);
        }
        builder
    }

    async fn get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.authed(self.client.get(format!("{}{}", self.base_url, path)))
            .send()
            .await
    }

    async fn post(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.authed(self.client.post(format!("{}{}", self.base_url, path)))
            .json(&json)
            .send()
            .await
    }

    async fn put(&self, path: &str, json: Value) -> reqwest::Result<reqwest::Response> {
        self.authed(self.client.put(format!("{}{}", self.base_url, path)))
            .json(&json)
            .send()
            .await
    }

    async fn patch(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.authed(self.client.patch(format!("{}{}", self.base_url, path)))
            .send()
            .await
    }

    async fn delete(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.authed(self.client.delete(format!("{}{}", self.base_url, path)))
            .send()
            .await
    }
}

/// Start the full router on an ephemeral port over a seeded in-memory store
async fn spawn_app() -> (TestClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    seed::load_seed_data(store.as_ref()).await.unwrap();

    let mut config = AppConfig::default();
    config.payments.key_secret = Some(PAYMENT_SECRET.to_string());
    let ctx = Arc::new(AppContext::new(store.clone(), Arc::new(EchoTranslator), config));
    let app = build_app(ctx);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (TestClient::new(format!("http://{}", address)), store)
}

async fn json_body(response: reqwest::Response) -> Value {
    response.json().await.unwrap()
}

#[tokio::test]
async fn test_health_and_authentication() {
    let (client, _) = spawn_app().await;

    let response = client.get("/health").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    println!("✓ Health check responds");

    let response = client.get("/api/version").await.unwrap();
    let body = json_body(response).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let response = client.get("/api/cart").await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("X-User-Id"));
    println!("✓ Requests without X-User-Id are rejected");

    let response = client
        .as_user("farmer-ravi")
        .post(
            "/api/sync/orders",
            json!({"orders": [{"order_id": "o1", "action": "teleport", "order_status": "Pending"}]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    println!("✓ Malformed bodies are rejected before any write");
}

#[tokio::test]
async fn test_marketplace_queries() {
    let (client, _) = spawn_app().await;

    let body = json_body(client.get("/marketplace").await.unwrap()).await;
    // Seeded mangoes are out of stock
    assert_eq!(body["total"], 3);
    println!("✓ Marketplace lists only in-stock listings");

    let response = client
        .post(
            "/marketplace/query",
            json!({"pincode": "560001", "radius": 10.0, "sorted_by": "price"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["seed-onions", "seed-tomatoes"]);
    println!("✓ Radius query keeps nearby listings sorted by price");

    let response = client
        .post("/marketplace/query", json!({"pincode": "999999", "radius": 5.0}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = json_body(client.get("/marketplace/category/Grains").await.unwrap()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], "seed-basmati");

    let body = json_body(client.get("/marketplace/search?query=oni").await.unwrap()).await;
    assert_eq!(body["total"], 1);
    println!("✓ Category and prefix search work");
}

#[tokio::test]
async fn test_cart_single_farm_rule() {
    let (client, _) = spawn_app().await;
    let buyer = client.as_user("buyer-asha");

    let response = buyer
        .post("/api/cart/add", json!({"item_id": "seed-tomatoes", "quantity": 2}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = buyer
        .post("/api/cart/add", json!({"item_id": "seed-basmati", "quantity": 1}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    println!("✓ Items from a second farm are refused");

    let response = buyer
        .post("/api/cart/add", json!({"item_id": "seed-onions", "quantity": 0}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(buyer.get("/api/cart").await.unwrap()).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_bill"], 60.0);
    println!("✓ Cart total reflects current listing prices");
}

#[tokio::test]
async fn test_order_lifecycle() {
    let (client, _) = spawn_app().await;
    let farmer = client.as_user("farmer-ravi");
    let buyer = client.as_user("buyer-asha");
    let outsider = client.as_user("someone-else");

    let order = json!({
        "farmerId": "farmer-ravi",
        "buyerId": "buyer-asha",
        "product": "Tomatoes",
        "quantity": 10,
        "price": 300.0
    });

    let response = buyer.post("/api/orders", order.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = farmer.post("/api/orders", order).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let order_id = created["orderId"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "Pending");
    println!("✓ Farmer created order {}", order_id);

    let response = outsider.get(&format!("/api/orders/{}", order_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(buyer.get("/api/orders").await.unwrap()).await;
    assert_eq!(body["total"], 1);

    let response = buyer
        .post(&format!("/api/orders/{}/cancel", order_id), json!({"reason": "changed plans"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "Cancelled");

    let response = farmer
        .put(&format!("/api/orders/{}/status", order_id), json!({"status": "Shipped"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    println!("✓ Cancelled orders cannot change status");
}

#[tokio::test]
async fn test_payment_confirmation_requires_valid_signature() {
    let (client, _) = spawn_app().await;
    let buyer = client.as_user("buyer-asha");

    let response = buyer
        .post("/api/payments/initiate", json!({"amount": 50000, "receipt_id": "rcpt-1"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let payment = json_body(response).await;
    let order_id = payment["order_id"].as_str().unwrap().to_string();
    assert!(order_id.starts_with("order_"));
    assert_eq!(payment["status"], "created");

    let response = buyer
        .post(
            "/api/payments/confirmation",
            json!({"order_id": order_id, "payment_id": "pay_123", "signature": "00ff"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    println!("✓ Forged signature rejected");

    let signature = payment_signature(PAYMENT_SECRET, &order_id, "pay_123");
    let response = buyer
        .post(
            "/api/payments/confirmation",
            json!({"order_id": order_id, "payment_id": "pay_123", "signature": signature}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(
        buyer
            .get(&format!("/api/payments/status?order_id={}", order_id))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["status"], "paid");
    println!("✓ Signed confirmation marks the payment paid");
}

#[tokio::test]
async fn test_sensor_readings_raise_alerts() {
    let (client, _) = spawn_app().await;
    let farmer = client.as_user("farmer-ravi");

    let response = farmer
        .post(
            "/api/sensors/data",
            json!({
                "sensor_id": "field-7",
                "temperature": 45.0,
                "humidity": 50.0,
                "soil_moisture": 30.0,
                "timestamp": "2024-06-01T10:00:00Z"
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["metric"], "temperature");
    println!("✓ Temperature above the global threshold raised an alert");

    let body = json_body(farmer.get("/api/sensors/alerts").await.unwrap()).await;
    assert_eq!(body["total"], 1);

    let response = farmer.get("/api/sensors/field-7/status").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_sync_conflict_merge() {
    let (client, store) = spawn_app().await;
    store
        .set(&collection("user_data").doc("notes-1"), json!({"notes": "water on monday"}))
        .await
        .unwrap();

    let response = client
        .as_user("farmer-ravi")
        .post(
            "/api/sync/conflict",
            json!({
                "document_id": "notes-1",
                "field_name": "notes",
                "local_value": "and thursday",
                "resolution_action": "merge"
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["resolved_value"], "water on monday and thursday");

    let stored = store
        .get(&collection("user_data").doc("notes-1"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored["notes"], "water on monday and thursday");
    println!("✓ Merge appends the local value to the server value");

    let body = json_body(client.as_user("farmer-ravi").get("/api/sync/status").await.unwrap()).await;
    assert_eq!(body["status"], "synced");
}

#[tokio::test]
async fn test_forum_moderation_and_votes() {
    let (client, _) = spawn_app().await;
    let author = client.as_user("farmer-meera");
    let moderator = client.as_user("mod-1").with_roles("moderator");

    let response = author
        .post(
            "/api/forum/threads",
            json!({"title": "Best time to sow wheat?", "content": "North India", "category": "crops"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let thread_id = json_body(response).await["thread_id"].as_str().unwrap().to_string();

    let response = author
        .post(&format!("/api/forum/threads/{}/vote", thread_id), json!({"vote": "up"}))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["votes"]["up"], 1);

    let response = author
        .put(&format!("/api/forum/threads/{}/moderate", thread_id), json!({"action": "lock"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = moderator
        .put(&format!("/api/forum/threads/{}/moderate", thread_id), json!({"action": "lock"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = author
        .post(&format!("/api/forum/threads/{}/comments", thread_id), json!({"content": "Anyone?"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    println!("✓ Locked threads refuse comments");

    let response = client.get("/api/forum/search?query=wh").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_translate() {
    let (client, _) = spawn_app().await;

    let response = client
        .post("/api/translate", json!({"text": "hello", "target_language": "hi"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["translated_text"], "[hi] hello");

    let response = client
        .post("/api/translate", json!({"text": "hello", "target_language": "ja"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    println!("✓ Unsupported target languages are rejected");
}

fn history_actions(history: &Value, item_id: &str) -> Vec<String> {
    history["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|entry| entry["item_id"] == item_id)
        .map(|entry| entry["action"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_inventory_crud_and_history() {
    let (client, _) = spawn_app().await;
    let ravi = client.as_user("farmer-ravi");
    let meera = client.as_user("farmer-meera");

    let item = json!({
        "id": "ravi-ginger",
        "name": "Ginger",
        "category": "Spices",
        "quantity": {"value": 40, "unit": "kg"},
        "price": {"value": 120, "unit": "INR/kg"},
        "storage": "externally_stored"
    });
    let response = ravi.post("/api/inventory/items", item.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = ravi.post("/api/inventory/items", item).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    println!("✓ Duplicate item ids are refused");

    let response = meera
        .put("/api/inventory/items/ravi-ginger", json!({"quantity": 1}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = meera.delete("/api/inventory/items/ravi-ginger").await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    println!("✓ Only the owner edits or deletes an item");

    let response = ravi
        .put("/api/inventory/items/ravi-ginger", json!({"quantity": {"value": 0, "unit": "kg"}}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["item_status"], "out of stock");

    let body = json_body(client.get("/api/inventory?storage=externally_stored").await.unwrap()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["id"], "ravi-ginger");

    let response = ravi.delete("/api/inventory/items/ravi-ginger").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = client.get("/api/inventory/items/ravi-ginger").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let history = json_body(client.get("/api/inventory/history").await.unwrap()).await;
    assert_eq!(history_actions(&history, "ravi-ginger"), vec!["created", "updated", "deleted"]);
    println!("✓ Every change lands in the inventory history");
}

#[tokio::test]
async fn test_malformed_query_strings_are_json_errors() {
    let (client, _) = spawn_app().await;

    let response = client.get("/api/inventory?storage=bogus").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let response = client.get("/marketplace/search?min_price=cheap").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());

    let response = client
        .as_user("ops")
        .with_roles("admin")
        .get("/api/analytics/sales?page=first")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
    println!("✓ Malformed query strings get the JSON error body");
}

#[tokio::test]
async fn test_sync_inventory_respects_ownership() {
    let (client, store) = spawn_app().await;
    let ravi = client.as_user("farmer-ravi");
    let meera = client.as_user("farmer-meera");

    let entry = |item_id: &str, action: &str, quantity: f64| {
        json!({
            "item_id": item_id,
            "action": action,
            "name": "Tomatoes",
            "category": "Vegetables",
            "quantity": quantity,
            "price": 30.0
        })
    };

    // One foreign entry rejects the whole batch
    let response = meera
        .post(
            "/api/sync/inventory",
            json!({"items": [entry("meera-okra", "add", 10.0), entry("seed-tomatoes", "remove", 0.0)]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = client.get("/api/inventory/items/meera-okra").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = client.get("/api/inventory/items/seed-tomatoes").await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    println!("✓ Foreign removals abort the batch before any write");

    let response = meera
        .post("/api/sync/inventory", json!({"items": [entry("seed-tomatoes", "add", 1.0)]}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let listing = json_body(client.get("/api/inventory/items/seed-tomatoes").await.unwrap()).await;
    assert_eq!(listing["owner_id"], "farmer-ravi");
    assert_eq!(listing["quantity"]["value"], 120.0);
    println!("✓ Offline adds cannot take over another farmer's item");

    let response = ravi
        .post(
            "/api/sync/inventory",
            json!({"items": [entry("seed-tomatoes", "edit", 5.0), entry("ravi-new", "add", 3.0)]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(client.get("/api/inventory/items/seed-tomatoes").await.unwrap()).await;
    assert_eq!(listing["quantity"]["value"], 5.0);

    let history = json_body(client.get("/api/inventory/history").await.unwrap()).await;
    assert_eq!(history_actions(&history, "seed-tomatoes"), vec!["updated"]);
    assert_eq!(history_actions(&history, "ravi-new"), vec!["created"]);
    println!("✓ Synced changes are recorded in history");

    store
        .set(&collection("inventory").doc("orphan"), json!({"name": "Orphan"}))
        .await
        .unwrap();
    let response = meera
        .post("/api/sync/inventory", json!({"items": [entry("orphan", "remove", 0.0)]}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = client
        .as_user("ops")
        .with_roles("admin")
        .post("/api/sync/inventory", json!({"items": [entry("orphan", "remove", 0.0)]}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(store.get(&collection("inventory").doc("orphan")).await.unwrap().is_none());
    println!("✓ Items without an owner need an admin");
}

#[tokio::test]
async fn test_sync_orders_cannot_rewrite_orders() {
    let (client, store) = spawn_app().await;
    let farmer = client.as_user("farmer-ravi");
    let buyer = client.as_user("buyer-asha");
    let outsider = client.as_user("someone-else");

    let response = farmer
        .post(
            "/api/orders",
            json!({
                "farmerId": "farmer-ravi",
                "buyerId": "buyer-asha",
                "product": "Onions",
                "quantity": 5,
                "price": 125.0
            }),
        )
        .await
        .unwrap();
    let order_id = json_body(response).await["orderId"].as_str().unwrap().to_string();
    let response = buyer
        .post(&format!("/api/orders/{}/cancel", order_id), json!({"reason": "duplicate"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = buyer
        .post(
            "/api/sync/orders",
            json!({"orders": [{"order_id": order_id, "action": "update", "order_status": "Shipped"}]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    println!("✓ Cancelled orders stay cancelled through sync");

    let response = outsider
        .post(
            "/api/sync/orders",
            json!({"orders": [
                {"order_id": "offline-1", "action": "add", "order_status": "Pending"},
                {"order_id": order_id, "action": "add", "order_status": "Pending"}
            ]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(store.get(&collection("orders").doc("offline-1")).await.unwrap().is_none());

    let order = json_body(buyer.get(&format!("/api/orders/{}", order_id)).await.unwrap()).await;
    assert_eq!(order["buyerId"], "buyer-asha");
    assert_eq!(order["status"], "Cancelled");
    println!("✓ Offline adds never overwrite an existing order");

    let response = outsider
        .post(
            "/api/sync/orders",
            json!({"orders": [{"order_id": "offline-1", "action": "add", "order_status": "Pending"}]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let order = json_body(outsider.get("/api/orders/offline-1").await.unwrap()).await;
    assert_eq!(order["buyerId"], "someone-else");
}

#[tokio::test]
async fn test_chat_conversations() {
    let (client, _) = spawn_app().await;
    let ravi = client.as_user("farmer-ravi");
    let asha = client.as_user("buyer-asha");

    let response = ravi.get("/api/chat/conversations").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ravi
        .post("/api/chat/conversations", json!({"participants": ["buyer-asha"]}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let conversation_id = json_body(response).await["conversation_id"].as_str().unwrap().to_string();
    let messages = format!("/api/chat/conversations/{}/messages", conversation_id);

    let response = asha.post(&messages, json!({"content": "Are the tomatoes ripe?"})).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let response = asha.post(&messages, json!({"content": "   "})).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client.as_user("someone-else").get(&messages).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(ravi.get(&messages).await.unwrap()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["sender_id"], "buyer-asha");

    let body = json_body(asha.get("/api/chat/conversations").await.unwrap()).await;
    assert_eq!(body["total"], 1);
    println!("✓ Conversations are visible to participants only");
}

#[tokio::test]
async fn test_group_membership() {
    let (client, _) = spawn_app().await;
    let ravi = client.as_user("farmer-ravi");
    let asha = client.as_user("buyer-asha");

    let response = ravi
        .post(
            "/api/groups",
            json!({"name": "Hoskote growers", "description": "Weekly market", "members": ["buyer-asha"]}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let group = json_body(response).await;
    let group_id = group["group_id"].as_str().unwrap().to_string();
    assert_eq!(group["members"], json!(["buyer-asha", "farmer-ravi"]));

    let response = ravi
        .delete(&format!("/api/groups/{}/members/farmer-ravi", group_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let response = asha
        .delete(&format!("/api/groups/{}/members/farmer-ravi", group_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    println!("✓ The creator stays in the group");

    let response = asha
        .post(&format!("/api/groups/{}/chat", group_id), json!({"message": "Stall 4 this week"}))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = asha
        .delete(&format!("/api/groups/{}/members/buyer-asha", group_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(client.get(&format!("/api/groups/{}/members", group_id)).await.unwrap()).await;
    assert_eq!(body["members"], json!(["farmer-ravi"]));

    let response = asha.delete(&format!("/api/groups/{}", group_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = ravi.delete(&format!("/api/groups/{}", group_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    println!("✓ Members leave and the creator deletes");
}

#[tokio::test]
async fn test_notifications_inbox() {
    let (client, _) = spawn_app().await;
    let asha = client.as_user("buyer-asha");
    let admin = client.as_user("ops").with_roles("admin");
    let notification = json!({"title": "Order shipped", "body": "On its way", "user_id": "buyer-asha"});

    let response = asha.post("/api/notifications/send", notification.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = admin.post("/api/notifications/send", notification).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let notification_id = created["notification_id"].as_str().unwrap().to_string();
    assert_eq!(created["type"], "general");

    let body = json_body(asha.get("/api/notifications/unread-count").await.unwrap()).await;
    assert_eq!(body["unread_count"], 1);

    let response = asha
        .put(&format!("/api/notifications/{}/mark-read", notification_id), json!({}))
        .await
        .unwrap();
    assert_eq!(json_body(response).await["read"], true);
    let body = json_body(asha.get("/api/notifications/unread-count").await.unwrap()).await;
    assert_eq!(body["unread_count"], 0);

    let path = format!("/api/notifications/{}", notification_id);
    assert_eq!(asha.delete(&path).await.unwrap().status(), StatusCode::OK);
    assert_eq!(asha.delete(&path).await.unwrap().status(), StatusCode::NOT_FOUND);
    println!("✓ Notifications are read and deleted from the caller's inbox");
}

#[tokio::test]
async fn test_reviews_update_listing_rating() {
    let (client, _) = spawn_app().await;
    let asha = client.as_user("buyer-asha");

    let response = asha
        .post(
            "/api/reviews",
            json!({"product_id": "seed-tomatoes", "rating": 4, "comment": "Fresh", "user_id": "someone-else"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = asha
        .post(
            "/api/reviews",
            json!({"product_id": "seed-tomatoes", "rating": 6, "user_id": "buyer-asha"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = asha
        .post(
            "/api/reviews",
            json!({"product_id": "seed-tomatoes", "rating": 4, "comment": "Fresh", "user_id": "buyer-asha"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let review_id = json_body(response).await["review_id"].as_str().unwrap().to_string();

    let listing = json_body(client.get("/api/inventory/items/seed-tomatoes").await.unwrap()).await;
    assert_eq!(listing["average_rating"], 4.0);
    let summary = json_body(client.get("/api/reviews/summary?product_id=seed-tomatoes").await.unwrap()).await;
    assert_eq!(summary["total_reviews"], 1);
    println!("✓ Reviews feed the listing's average rating");

    let response = client
        .as_user("farmer-ravi")
        .put(
            &format!("/api/reviews/{}", review_id),
            json!({"product_id": "seed-tomatoes", "rating": 1, "user_id": "farmer-ravi"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = asha
        .delete(&format!("/api/reviews/{}?product_id=seed-tomatoes", review_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = json_body(client.get("/api/inventory/items/seed-tomatoes").await.unwrap()).await;
    assert_eq!(listing["average_rating"], 0.0);
}

#[tokio::test]
async fn test_partner_analytics() {
    let (client, store) = spawn_app().await;
    let owner = client.as_user("storage-owner");

    let response = owner
        .post(
            "/api/partners/cold-storage",
            json!({"name": "Whitefield Cold Store", "location": "Bengaluru", "capacity": 1000, "contact_info": "+919876543210"}),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let partner_id = json_body(response).await["partner_id"].as_str().unwrap().to_string();
    let analytics = format!("/api/partners/{}/analytics", partner_id);

    let response = client.get(&analytics).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    store
        .set(
            &collection("cold_storage_capacity").doc(&partner_id),
            json!({"total_capacity": 1000.0, "current_utilization": 250.0}),
        )
        .await
        .unwrap();
    let body = json_body(client.get(&analytics).await.unwrap()).await;
    assert_eq!(body["utilization_rate"], 25.0);
    println!("✓ Cold storage utilisation is reported as a percentage");

    let response = owner
        .post(
            "/api/partners/retail",
            json!({"name": "Corner Mart", "location": "Bengaluru", "contact_info": "mart@example.com", "business_type": "grocery", "rating": 4.2}),
        )
        .await
        .unwrap();
    let retail_id = json_body(response).await["partner_id"].as_str().unwrap().to_string();
    let response = client.get(&format!("/api/partners/{}/analytics", retail_id)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geospatial_search() {
    let (client, _) = spawn_app().await;

    let body = json_body(
        client
            .get("/api/geospatial/search?latitude=12.9700&longitude=77.7490&place_type=cold_storage&radius_m=1000")
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["place_id"], "seed-storage-whitefield");
    assert!(body["items"][0]["distance_m"].as_f64().unwrap() < 1000.0);

    let body = json_body(
        client
            .get("/api/geospatial/search?latitude=12.9634&longitude=77.5775&place_type=cold_storage")
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["total"], 0);
    println!("✓ Places outside the radius are excluded");

    let response = client
        .get("/api/geospatial/search?latitude=12.97&longitude=77.59&place_type=airport")
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cold_storage_services_and_favorites() {
    let (client, _) = spawn_app().await;
    let owner = client.as_user("storage-owner");
    let ravi = client.as_user("farmer-ravi");
    let service = json!({
        "name": "Frost Hub",
        "address": "Whitefield, Bengaluru",
        "phone_number": "+919876543210",
        "minimum_quantity": 100,
        "areas_served": ["560066"],
        "payment_methods": ["upi"]
    });

    let response = owner.post("/api/cold_storage_services", service.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = json_body(response).await;
    let service_id = created["service_id"].as_str().unwrap().to_string();
    assert_eq!(created["status"], "active");
    let path = format!("/api/cold_storage_services/{}", service_id);

    let mut update = service.clone();
    update["name"] = json!("Frost Hub East");
    let response = ravi.put(&path, update.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = owner.put(&path, update).await.unwrap();
    assert_eq!(json_body(response).await["name"], "Frost Hub East");

    let body = json_body(client.get("/api/cold_storage_services").await.unwrap()).await;
    assert_eq!(body["total"], 1);
    println!("✓ Service listings are edited by their owner");

    let response = ravi.patch(&format!("{}/favorite", path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ravi
        .put(
            "/api/auth/profile",
            json!({
                "first_name": "Ravi",
                "last_name": "Kumar",
                "phone_number": "+919812345678",
                "occupation": "farmer"
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ravi.patch(&format!("{}/favorite", path)).await.unwrap();
    assert_eq!(json_body(response).await["favorites"], json!([service_id]));
    let response = ravi.patch(&format!("{}/favorite", path)).await.unwrap();
    assert_eq!(json_body(response).await["favorites"], json!([service_id]));

    // Profile edits keep the favorites list
    let response = ravi
        .put(
            "/api/auth/profile",
            json!({
                "first_name": "Ravi",
                "last_name": "K",
                "phone_number": "+919812345678",
                "occupation": "farmer"
            }),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = ravi.patch(&format!("{}/unfavorite", path)).await.unwrap();
    assert_eq!(json_body(response).await["favorites"], json!([]));
    println!("✓ Farmers keep a deduplicated favorites list");

    let response = ravi.patch("/api/cold_storage_services/missing/favorite").await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(ravi.delete(&path).await.unwrap().status(), StatusCode::FORBIDDEN);
    assert_eq!(owner.delete(&path).await.unwrap().status(), StatusCode::OK);
    assert_eq!(client.get(&path).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_platform_analytics() {
    let (client, store) = spawn_app().await;
    let admin = client.as_user("ops").with_roles("admin");

    for (id, active) in [("u1", true), ("u2", false), ("u3", true)] {
        store
            .set(&collection("users").doc(id), json!({"active": active}))
            .await
            .unwrap();
    }
    for (id, amount, timestamp) in [
        ("t1", 100.0, "2024-01-01T00:00:00Z"),
        ("t2", 300.0, "2024-01-02T00:00:00Z"),
        ("t3", 200.0, "2024-01-03T00:00:00Z"),
    ] {
        store
            .set(
                &collection("transactions").doc(id),
                json!({"total_amount": amount, "timestamp": timestamp}),
            )
            .await
            .unwrap();
    }
    store
        .set(&collection("sessions").doc("s1"), json!({"active": true, "error": "timeout"}))
        .await
        .unwrap();

    let response = client.as_user("farmer-ravi").get("/api/analytics/users").await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = json_body(admin.get("/api/analytics/users").await.unwrap()).await;
    assert_eq!(body, json!({"total_users": 3, "active_users": 2, "inactive_users": 1}));

    let body = json_body(admin.get("/api/analytics/sales").await.unwrap()).await;
    assert_eq!(body["total_sales"], 600.0);
    assert_eq!(body["avg_order_value"], 200.0);
    assert!(body.get("page").is_none());

    let body = json_body(admin.get("/api/analytics/sales?page=2&limit=1").await.unwrap()).await;
    assert_eq!(body["total_sales"], 300.0);
    assert_eq!(body["total_transactions"], 1);
    assert_eq!(body["page"], 2);

    let response = admin.get("/api/analytics/sales?page=1&limit=0").await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(admin.get("/api/analytics/system").await.unwrap()).await;
    assert_eq!(body, json!({"total_sessions": 1, "active_sessions": 1, "total_errors": 1}));
    println!("✓ Platform analytics aggregate users, sales and sessions");
}
