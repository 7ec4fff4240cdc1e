//! Token refresh behaviour of the session-bound client

use serde_json::json;
use std::time::Duration;
use usina_core::{Session, SessionHandle, UserProfile};
use usina_http::types::Credentials;
use usina_http::{ApiClient, ClientError, Resource};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn signed_in(access: &str, refresh: &str) -> SessionHandle {
    SessionHandle::new(Session::authenticated(
        access,
        refresh,
        UserProfile::minimal(Some(1), "a@x.com"),
    ))
}

async fn mount_refresh(server: &MockServer, refresh: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .and(body_json(json!({ "refresh": refresh })))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_stores_access_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token/"))
        .and(body_json(json!({"email": "a@x.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access": "T1",
            "refresh": "R1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let login = client
        .login(&Credentials {
            email: "a@x.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    let session = SessionHandle::new(Session::authenticated(
        login.access,
        login.refresh,
        login.user,
    ));
    assert_eq!(session.access_token().await.as_deref(), Some("T1"));
    assert_eq!(session.refresh_token().await.as_deref(), Some("R1"));
    assert_eq!(session.user().await.unwrap().email, "a@x.com");
}

#[tokio::test]
async fn test_login_with_invalid_credentials_is_unauthorized() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let result = client
        .login(&Credentials {
            email: "a@x.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert!(matches!(result, Err(ref e) if e.is_unauthorized()));
}

#[tokio::test]
async fn test_401_refreshes_once_and_retries_with_new_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ops/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ops/"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "status": "aberta"}])))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let body = client.with_session(&session).get("ops/").await.unwrap();
    assert_eq!(body, json!([{"id": 1, "status": "aberta"}]));

    assert_eq!(session.access_token().await.as_deref(), Some("T2"));
    assert_eq!(session.refresh_token().await.as_deref(), Some("R1"));
    assert!(session.is_authenticated().await);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_rotated_refresh_token_is_stored() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/clientes/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/clientes/"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"id": 9}]})))
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2", "refresh": "R2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let clients = client
        .with_session(&session)
        .list(Resource::Clients)
        .await
        .unwrap();
    assert_eq!(clients, vec![json!({"id": 9})]);
    assert_eq!(session.refresh_token().await.as_deref(), Some("R2"));
}

#[tokio::test]
async fn test_retry_returning_401_is_not_retried_again() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ops/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "nope"})))
        .expect(2)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let result = client.with_session(&session).get("ops/").await;
    assert!(matches!(result, Err(ref e) if e.is_unauthorized()));

    let requests = mock_server.received_requests().await.unwrap();
    let bearers: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/ops/")
        .map(|r| r.headers.get("authorization").unwrap().to_str().unwrap().to_string())
        .collect();
    assert_eq!(bearers, vec!["Bearer T1", "Bearer T2"]);

    mock_server.verify().await;
}

#[tokio::test]
async fn test_no_refresh_token_propagates_original_401() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ops/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Authentication credentials were not provided."})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = SessionHandle::new(Session::anonymous());

    let err = client.with_session(&session).get("ops/").await.unwrap_err();
    let upstream = err.upstream().expect("upstream error");
    assert_eq!(upstream.status.as_u16(), 401);
    assert_eq!(
        upstream.body,
        json!({"detail": "Authentication credentials were not provided."})
    );

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_refresh_failure_clears_session_and_returns_refresh_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ops/"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"detail": "Given token not valid for any token type"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is invalid or expired"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let err = client.with_session(&session).get("ops/").await.unwrap_err();
    match err {
        ClientError::Upstream(upstream) => {
            assert_eq!(upstream.body, json!({"detail": "Token is invalid or expired"}));
        }
        other => panic!("expected refresh error, got {other:?}"),
    }

    assert_eq!(session.snapshot().await, Session::anonymous());

    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_401_errors_pass_through_without_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pecas/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"codigo": ["Este campo é obrigatório."]})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let err = client
        .with_session(&session)
        .create(Resource::Parts, json!({"quantidade": 1}))
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(
        err.upstream().unwrap().summary(),
        "codigo: Este campo é obrigatório."
    );
    assert_eq!(session.access_token().await.as_deref(), Some("T1"));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_concurrent_401s_each_refresh_independently() {
    let mock_server = MockServer::start().await;

    for resource_path in ["/ops/", "/atividades/"] {
        Mock::given(method("GET"))
            .and(path(resource_path))
            .and(header("authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(401).set_delay(Duration::from_millis(100)))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(resource_path))
            .and(header("authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"path": resource_path}])))
            .expect(1)
            .mount(&mock_server)
            .await;
    }
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        2,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");
    let bound = client.with_session(&session);

    let (orders, activities) = tokio::join!(
        bound.list(Resource::ProductionOrders),
        bound.list(Resource::Activities)
    );

    assert_eq!(orders.unwrap(), vec![json!({"path": "/ops/"})]);
    assert_eq!(activities.unwrap(), vec![json!({"path": "/atividades/"})]);
    assert_eq!(session.access_token().await.as_deref(), Some("T2"));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_patch_body_is_resent_after_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/pecas/3/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pecas/3/"))
        .and(header("authorization", "Bearer T2"))
        .and(body_json(json!({"quantidade": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "quantidade": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let body = client
        .with_session(&session)
        .update(Resource::Parts, 3, json!({"quantidade": 1}))
        .await
        .unwrap();
    assert_eq!(body, json!({"id": 3, "quantidade": 1}));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_put_body_is_resent_after_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/clientes/7/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/clientes/7/"))
        .and(header("authorization", "Bearer T2"))
        .and(body_json(json!({"nome": "ACME"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7, "nome": "ACME"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let body = client
        .with_session(&session)
        .replace(Resource::Clients, 7, json!({"nome": "ACME"}))
        .await
        .unwrap();
    assert_eq!(body["nome"], "ACME");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_delete_survives_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/atividades/4/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/atividades/4/"))
        .and(header("authorization", "Bearer T2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(
        &mock_server,
        "R1",
        ResponseTemplate::new(200).set_body_json(json!({"access": "T2"})),
        1,
    )
    .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    client
        .with_session(&session)
        .remove(Resource::Activities, 4)
        .await
        .unwrap();
    assert_eq!(session.access_token().await.as_deref(), Some("T2"));

    mock_server.verify().await;
}

#[tokio::test]
async fn test_fetch_single_item_with_session_bearer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ops/12/"))
        .and(header("authorization", "Bearer T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 12, "status": "em_andamento"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_refresh(&mock_server, "R1", ResponseTemplate::new(200), 0).await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let session = signed_in("T1", "R1");

    let body = client
        .with_session(&session)
        .fetch(Resource::ProductionOrders, 12)
        .await
        .unwrap();
    assert_eq!(body["id"], 12);

    mock_server.verify().await;
}
