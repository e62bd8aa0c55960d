//! `HttpGateway` against a local mock HTTP server.

#![allow(clippy::unwrap_used)]

use catalog_sync::{
    CatalogClient, ClientConfig, CredentialStore, Credentials, Gateway, GatewayError, HttpGateway,
    Operation, ProductDraft, ProductId, ProductUpdate, Registered, Registration,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn gateway() -> (MockServer, HttpGateway, CredentialStore) {
    let server = MockServer::start().await;
    let credentials = CredentialStore::in_memory();
    let config = ClientConfig::default().with_base_url(format!("{}/api", server.uri()));
    let gateway = HttpGateway::new(&config, credentials.clone()).unwrap();
    (server, gateway, credentials)
}

fn lamp_json(id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "title": "Lamp",
        "description": "Warm light",
        "price": 19.5,
        "category": "Home",
        "stock": 4,
        "images": ["https://img.test/lamp.png"]
    })
}

fn lamp_draft() -> ProductDraft {
    ProductDraft {
        title: "Lamp".into(),
        description: "Warm light".into(),
        price: 19.5,
        category: "Home".into(),
        stock: 4,
        images: vec!["https://img.test/lamp.png".into()],
    }
}

#[tokio::test]
async fn test_fetch_products_decodes_underscore_ids() {
    let (server, gateway, _) = gateway().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([lamp_json("p1"), lamp_json("p2")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let products = gateway.fetch_products().await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, ProductId::new("p1"));
    assert_eq!(products[1].images, vec!["https://img.test/lamp.png".to_string()]);
}

#[tokio::test]
async fn test_request_without_token_carries_no_authorization() {
    let (server, gateway, _) = gateway().await;
    Mock::given(method("GET"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lamp_json("p1")))
        .mount(&server)
        .await;

    gateway.fetch_product(&ProductId::new("p1")).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_write_attaches_token_read_at_request_time() {
    let (server, gateway, credentials) = gateway().await;
    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({
            "title": "Lamp",
            "description": "Warm light",
            "price": 19.5,
            "category": "Home",
            "stock": 4,
            "images": ["https://img.test/lamp.png"]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(lamp_json("p9")))
        .expect(1)
        .mount(&server)
        .await;

    // Persisted after the gateway was built
    credentials.persist("tok-1").unwrap();
    let product = gateway.create_product(&lamp_draft()).await.unwrap();

    assert_eq!(product.id, ProductId::new("p9"));
    assert_eq!(product.title, "Lamp");
}

#[tokio::test]
async fn test_update_sends_only_present_fields() {
    let (server, gateway, credentials) = gateway().await;
    credentials.persist("tok-1").unwrap();
    Mock::given(method("PUT"))
        .and(path("/api/products/p1"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({ "stock": 0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(lamp_json("p1")))
        .expect(1)
        .mount(&server)
        .await;

    let update = ProductUpdate {
        stock: Some(0),
        ..ProductUpdate::default()
    };
    gateway.update_product(&ProductId::new("p1"), &update).await.unwrap();
}

#[tokio::test]
async fn test_delete_accepts_empty_success_body() {
    let (server, gateway, credentials) = gateway().await;
    credentials.persist("tok-1").unwrap();
    Mock::given(method("DELETE"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway.delete_product(&ProductId::new("p1")).await.unwrap();
}

#[tokio::test]
async fn test_rejection_carries_server_message() {
    let (server, gateway, _) = gateway().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let err = gateway
        .login(&Credentials::new("a@b.com", "wrong1"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 401,
            detail: Some("Invalid credentials".into()),
        }
    );
}

#[tokio::test]
async fn test_rejection_without_detail_falls_back() {
    let (server, gateway, _) = gateway().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "ok": false })))
        .mount(&server)
        .await;

    let err = gateway.fetch_products().await.unwrap_err();

    assert_eq!(
        err,
        GatewayError::Rejected {
            status: 500,
            detail: None,
        }
    );
    assert_eq!(
        err.user_message(Operation::FetchProducts),
        "Failed to fetch products"
    );
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let (server, gateway, _) = gateway().await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = gateway.fetch_products().await.unwrap_err();
    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_server_is_transport_error() {
    // Nothing listens on port 1
    let config = ClientConfig::default().with_base_url("http://127.0.0.1:1/api");
    let gateway = HttpGateway::new(&config, CredentialStore::in_memory()).unwrap();

    let err = gateway.fetch_products().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}

#[tokio::test]
async fn test_login_and_register_replies() {
    let (server, gateway, _) = gateway().await;
    let user = json!({ "_id": "u1", "name": "Ada", "email": "ada@example.com" });
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "email": "ada@example.com", "password": "secret1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "t1", "user": user.clone() })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(user))
        .mount(&server)
        .await;

    let session = gateway
        .login(&Credentials::new("ada@example.com", "secret1"))
        .await
        .unwrap();
    assert_eq!(session.token, "t1");
    assert_eq!(session.user.name, "Ada");

    let registered = gateway
        .register(&Registration {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert!(matches!(registered, Registered::User(ref u) if u.email == "ada@example.com"));
}

#[tokio::test]
async fn test_connected_client_persists_token_across_restart() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::default()
        .with_base_url(format!("{}/api", server.uri()))
        .with_token_path(dir.path().join("session.json"));

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t-disk",
            "user": { "_id": "u1", "name": "Ada", "email": "ada@example.com" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("authorization", "Bearer t-disk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([lamp_json("p1")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::connect(&config).unwrap();
    client
        .login(Credentials::new("ada@example.com", "secret1"))
        .await
        .unwrap()
        .wait()
        .await;
    assert_eq!(client.state(|s| s.auth.token.clone()).await.as_deref(), Some("t-disk"));

    // A fresh client over the same file starts signed in
    let restarted = CatalogClient::connect(&config).unwrap();
    assert!(restarted.state(|s| s.auth.is_authenticated()).await);
    assert_eq!(restarted.state(|s| s.auth.user.clone()).await, None);

    restarted.fetch_products().await.unwrap().wait().await;
    assert_eq!(restarted.state(|s| s.products.list.len()).await, 1);
}
