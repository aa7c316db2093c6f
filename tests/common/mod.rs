//! Shared harness for API tests: the full router over the in-memory store,
//! a scripted image host and HS256-signed identity tokens.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use tower::ServiceExt;

use biodata_service::{
    api::{AppState, RouterBuilder},
    database::{MemoryProfileStore, ProfileStore},
    models::{IdTokenClaims, NewUser, Role},
    service::{IdentityProvider, ImageStore, ImageStoreError, ImageUpload, JwtIdentityProvider},
};

pub const SECRET: &[u8] = b"integration-secret";
pub const PROJECT: &str = "biodata-test";
pub const MAX_IMAGE_BYTES: usize = 64 * 1024;
pub const BOUNDARY: &str = "biodata-boundary";

#[derive(Default)]
pub struct ScriptedImageStore {
    pub fail: bool,
    pub uploads: AtomicUsize,
}

#[async_trait]
impl ImageStore for ScriptedImageStore {
    async fn upload(&self, _image: ImageUpload) -> Result<String, ImageStoreError> {
        if self.fail {
            return Err(ImageStoreError::Timeout);
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("https://images.test/{}.jpg", n))
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryProfileStore>,
    pub images: Arc<ScriptedImageStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_parts(MemoryProfileStore::new(), ScriptedImageStore::default())
    }

    pub fn with_parts(store: MemoryProfileStore, images: ScriptedImageStore) -> Self {
        let store = Arc::new(store);
        let images = Arc::new(images);
        let identity_provider: Arc<dyn IdentityProvider> =
            Arc::new(JwtIdentityProvider::with_secret(SECRET, PROJECT));

        let state = AppState::new(
            store.clone(),
            identity_provider.clone(),
            images.clone(),
            MAX_IMAGE_BYTES,
        );
        let router = RouterBuilder::with_all_routes()
            .build(identity_provider)
            .with_state(state);

        Self {
            router,
            store,
            images,
        }
    }

    /// Inserts an admin account directly into the store
    pub async fn seed_admin(&self, email: &str) {
        self.store
            .insert_user(NewUser {
                email: email.to_string(),
                uid: None,
                name: Some("Admin".to_string()),
                photo_url: None,
            })
            .await
            .unwrap();
        self.store.set_user_role(email, Role::Admin).await.unwrap();
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str, email: Option<&str>) -> (StatusCode, Value) {
        self.send(request(Method::GET, uri, email, Body::empty(), None))
            .await
    }

    pub async fn delete(&self, uri: &str, email: &str) -> (StatusCode, Value) {
        self.send(request(Method::DELETE, uri, Some(email), Body::empty(), None))
            .await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        email: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        self.send(request(
            method,
            uri,
            Some(email),
            Body::from(body.to_string()),
            Some("application/json"),
        ))
        .await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        email: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let content_type = format!("multipart/form-data; boundary={}", BOUNDARY);
        self.send(request(
            method,
            uri,
            Some(email),
            Body::from(multipart_body(fields, image)),
            Some(&content_type),
        ))
        .await
    }

    /// Registers the caller's user record
    pub async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .json(Method::POST, "/users", email, serde_json::json!({}))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    /// Registers the caller and publishes a complete biodata for them
    pub async fn publish(&self, email: &str, biodata_type: &str, age: &str) -> String {
        self.register(email).await;

        let mut fields = biodata_fields(email);
        fields.retain(|(name, _)| *name != "biodataType" && *name != "age");
        fields.push(("biodataType", biodata_type));
        fields.push(("age", age));

        let (status, body) = self
            .multipart(
                Method::POST,
                "/biodatas",
                email,
                &fields,
                Some(("image/jpeg", JPEG)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["_id"].as_str().unwrap().to_string()
    }
}

pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

pub fn token_for(email: &str) -> String {
    let now = Utc::now();
    let claims = IdTokenClaims::new(
        &format!("uid-{}", email),
        email,
        PROJECT,
        now,
        now + Duration::hours(1),
    );
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET),
    )
    .unwrap()
}

pub fn request(
    method: Method,
    uri: &str,
    email: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(email) = email {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token_for(email)));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

/// Every required biodata field with the contact email set to `email`
pub fn biodata_fields(email: &str) -> Vec<(&'static str, &str)> {
    vec![
        ("biodataType", "Female"),
        ("name", "Test Member"),
        ("dob", "1996-04-12"),
        ("height", "5'4\""),
        ("weight", "55kg"),
        ("age", "28"),
        ("occupation", "Engineer"),
        ("race", "Asian"),
        ("fatherName", "Father Name"),
        ("motherName", "Mother Name"),
        ("permanentDivision", "Dhaka"),
        ("presentDivision", "Dhaka"),
        ("contactEmail", email),
        ("mobileNumber", "+8801700000000"),
    ]
}

pub fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    if let Some((content_type, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"profileImage\"; filename=\"photo.jpg\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
