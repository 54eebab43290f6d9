use accounts::{
    api,
    auth::{AuthConfig, Authenticator, MemoryUserStore, PasswordHasher},
    APP_USER_AGENT,
};
use anyhow::{Context, Result};
use reqwest::{header::SET_COOKIE, Client, StatusCode};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;

async fn spawn_server() -> Result<SocketAddr> {
    let authenticator = Authenticator::new(
        Arc::new(MemoryUserStore::new()),
        PasswordHasher::with_cost(8, 1, 1)?,
        SecretString::from("integration-secret".to_string()),
        AuthConfig::new().with_session_ttl_seconds(300),
    )?;

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = api::app(Arc::new(authenticator));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app.into_make_service()).await;
    });
    Ok(addr)
}

fn client() -> Result<Client> {
    Ok(Client::builder().user_agent(APP_USER_AGENT).build()?)
}

fn session_cookie(response: &reqwest::Response) -> Result<String> {
    let header = response
        .headers()
        .get(SET_COOKIE)
        .context("missing set-cookie")?
        .to_str()?;
    Ok(header.split(';').next().unwrap_or_default().to_string())
}

#[tokio::test]
async fn sign_up_current_user_sign_out_sign_in() -> Result<()> {
    let addr = spawn_server().await?;
    let base = format!("http://{addr}");
    let client = client()?;

    let response = client
        .post(format!("{base}/api/users/sign-up"))
        .json(&json!({"name": "Bob", "email": "Test@Test.com", "password": "password"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = session_cookie(&response)?;
    let created: Value = response.json().await?;
    assert_eq!(created["email"], "test@test.com");

    let response = client
        .get(format!("{base}/api/users/current-user"))
        .header("cookie", &cookie)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["currentUser"]["id"], created["id"]);

    let response = client
        .post(format!("{base}/api/users/sign-out"))
        .header("cookie", &cookie)
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(session_cookie(&response)?, "session=");

    let response = client
        .get(format!("{base}/api/users/current-user"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = client
        .post(format!("{base}/api/users/sign-in"))
        .json(&json!({"email": "test@test.com", "password": "password"}))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response)?;

    let response = client
        .get(format!("{base}/api/users/current-user"))
        .bearer_auth(cookie.trim_start_matches("session="))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn list_health_and_wrong_verb() -> Result<()> {
    let addr = spawn_server().await?;
    let base = format!("http://{addr}");
    let client = client()?;

    for (name, email) in [("Bob", "bob@test.com"), ("Sam", "sam@test.com")] {
        let response = client
            .post(format!("{base}/api/users/sign-up"))
            .json(&json!({"name": name, "email": email, "password": "password"}))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let users: Vec<Value> = client
        .get(format!("{base}/api/users"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(users.len(), 2);

    let response = client.delete(format!("{base}/api/users")).send().await?;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: Value = response.json().await?;
    assert_eq!(body["errors"][0]["message"], "Method DELETE not allowed");

    let response = client.get(format!("{base}/health")).send().await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-app"));
    Ok(())
}
