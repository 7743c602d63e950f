#![allow(dead_code)]

use axum::Router;
use genosentinel::{
    clinical::{self, store::MemoryClinicalStore, ClinicalContext},
    config::{AuthConfig, GatewayConfig, JwtConfig, LoggingConfig},
    gateway::{create_router, GatewayState},
    genomics::{self, clinic_client::ClinicClient, store::MemoryGenomicsStore, GenomicsContext},
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;

pub const TEST_USER: &str = "admin";
pub const TEST_PASSWORD: &str = "s3cret-pass";
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// Serve `app` on an ephemeral port and return its base URL
pub async fn spawn_router(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}", port)
}

/// Clinical service backed by the in-memory store
pub async fn spawn_clinical() -> String {
    let ctx = ClinicalContext::new(Arc::new(MemoryClinicalStore::new()));
    spawn_router(clinical::create_router(ctx)).await
}

/// Genomics service backed by the in-memory store, looking patients up at
/// `clinical_base` (the clinical service root, without /clinica)
pub async fn spawn_genomics(clinical_base: &str) -> String {
    let clinic = ClinicClient::new(format!("{}{}", clinical_base, clinical::PATH_PREFIX), 5)
        .unwrap();
    let ctx = GenomicsContext::new(Arc::new(MemoryGenomicsStore::new()), Arc::new(clinic));
    spawn_router(genomics::create_router(ctx)).await
}

pub fn gateway_config(routes: Vec<(String, String)>) -> GatewayConfig {
    GatewayConfig {
        port: 0,
        auth: AuthConfig {
            username: TEST_USER.to_string(),
            password: TEST_PASSWORD.to_string(),
        },
        jwt: JwtConfig {
            secret: Some(TEST_JWT_SECRET.to_string()),
            private_key: None,
            public_key: None,
            issuer: "genosentinel-test".to_string(),
            access_token_ttl_hours: 1,
        },
        routes,
        upstream_timeout_secs: Some(5),
        logging: LoggingConfig::default(),
    }
}

pub async fn spawn_gateway(routes: Vec<(String, String)>) -> String {
    let state = GatewayState::from_config(&gateway_config(routes)).unwrap();
    spawn_router(create_router(state)).await
}

/// Gateway, clinical and genomics services wired together
pub struct TestStack {
    pub gateway: String,
    pub clinical: String,
    pub genomics: String,
    pub client: reqwest::Client,
}

impl TestStack {
    pub async fn spawn() -> Self {
        let clinical = spawn_clinical().await;
        let genomics = spawn_genomics(&clinical).await;
        let gateway = spawn_gateway(vec![
            (clinical::PATH_PREFIX.to_string(), clinical.clone()),
            (genomics::PATH_PREFIX.to_string(), genomics.clone()),
        ])
        .await;

        Self {
            gateway,
            clinical,
            genomics,
            client: reqwest::Client::new(),
        }
    }

    pub async fn token(&self) -> String {
        login(&self.client, &self.gateway).await
    }
}

pub async fn login(client: &reqwest::Client, gateway: &str) -> String {
    let response = client
        .post(format!("{}/auth/login", gateway))
        .json(&json!({ "username": TEST_USER, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    body["access_token"].as_str().unwrap().to_string()
}

/// Create a patient directly on the clinical service and return its id
pub async fn create_patient(client: &reqwest::Client, clinical: &str, first: &str, last: &str) -> String {
    let response = client
        .post(format!("{}/clinica/patients", clinical))
        .json(&json!({
            "firstName": first,
            "lastName": last,
            "birthDate": "1970-01-01",
            "gender": "female"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    body["id"].as_str().unwrap().to_string()
}
