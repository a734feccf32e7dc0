// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Sessão: estúdios da identidade, seleção e logout
    let session_routes = Router::new()
        .route(
            "/",
            get(handlers::session::get_session).delete(handlers::session::sign_out),
        )
        .route("/tenants", get(handlers::session::list_my_tenants))
        .route("/tenant", post(handlers::session::select_tenant));

    // Clientes (o estúdio vem da sessão, as permissões do cargo ativo)
    let client_routes = Router::new()
        .route(
            "/",
            get(handlers::crm::list_clients).post(handlers::crm::create_client),
        )
        .route("/revision", get(handlers::crm::client_list_revision))
        .route(
            "/{id}",
            get(handlers::crm::get_client).put(handlers::crm::update_client),
        );

    let protected = Router::new()
        .nest("/session", session_routes)
        .nest("/clients", client_routes)
        .route("/visits", post(handlers::crm::record_visit))
        .route(
            "/capabilities/{role}",
            get(handlers::rbac::get_role_capabilities),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api", protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{
        db::MemoryStore,
        models::{auth::Claims, client_list::ListThresholds, rbac::Role},
        services::auth::AuthService,
    };

    const SECRET: &str = "segredo-de-teste";

    struct TestApp {
        router: Router,
        store: Arc<MemoryStore>,
    }

    fn test_app() -> TestApp {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::with_store(
            store.clone(),
            AuthService::new(SECRET.to_string()),
            ListThresholds::default(),
        );
        TestApp {
            router: build_router(state),
            store,
        }
    }

    fn token_for(identity: Uuid) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: identity,
            exp: now + 3600,
            iat: now,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap()
    }

    async fn call(app: &TestApp, method: Method, uri: &str, identity: Uuid, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token_for(identity)));

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let app = test_app();
        let request = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = test_app();
        let request = Request::builder().uri("/api/session").body(Body::empty()).unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/session")
            .header(header::AUTHORIZATION, "Bearer nao-e-jwt")
            .body(Body::empty())
            .unwrap();
        let response = app.router.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_session_flow_select_switch_sign_out() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio_a = Uuid::new_v4();
        let studio_b = Uuid::new_v4();
        app.store.add_membership(me, studio_a, "Agulha de Ouro", Role::Master);
        app.store.add_membership(me, studio_b, "Tinta Fresca", Role::Receptionist);

        let (status, session) = call(&app, Method::GET, "/api/session", me, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(session["tenantId"].is_null());
        assert!(session["role"].is_null());
        assert_eq!(session["capabilities"]["canAddClient"], false);

        let (status, tenants) = call(&app, Method::GET, "/api/session/tenants", me, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tenants.as_array().unwrap().len(), 2);

        let (status, selected) = call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio_a }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(selected["role"], "MASTER");
        assert_eq!(selected["capabilities"]["canViewFinancials"], true);

        let (_, switched) = call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio_b }))).await;
        assert_eq!(switched["tenantId"], studio_b.to_string());
        assert_eq!(switched["role"], "RECEPTIONIST");
        assert_eq!(switched["capabilities"]["canViewFinancials"], false);

        let (status, _) = call(&app, Method::DELETE, "/api/session", me, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, session) = call(&app, Method::GET, "/api/session", me, None).await;
        assert!(session["tenantId"].is_null());
        assert!(session["role"].is_null());
    }

    #[tokio::test]
    async fn test_select_foreign_tenant_is_forbidden() {
        let app = test_app();
        let me = Uuid::new_v4();

        let (status, _) = call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": Uuid::new_v4() }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_client_list_requires_selected_tenant() {
        let app = test_app();
        let (status, _) = call(&app, Method::GET, "/api/clients", Uuid::new_v4(), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_client_list_with_metrics_and_projection() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Artist);
        let ana = app.store.add_client(studio, "Ana", Some("ana@ink.com"));
        let bia = app.store.add_client(studio, "Bia", None);
        app.store.add_visit(studio, Some(ana), Some("800"), Some("2024-01-01"));
        app.store.add_visit(studio, Some(ana), Some("700"), Some("2024-03-01"));
        app.store.add_visit(studio, Some(bia), Some("50"), None);

        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let (status, view) = call(&app, Method::GET, "/api/clients?sort=SPEND", me, None).await;
        assert_eq!(status, StatusCode::OK);
        let items = view["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["fullName"], "Ana");
        assert_eq!(items[0]["totalVisits"], 2);
        assert_eq!(items[0]["actions"]["canEdit"], true);
        assert_eq!(view["canFilterByProfessional"], false);

        let (_, vip) = call(&app, Method::GET, "/api/clients?search=an&filter=VIP", me, None).await;
        let vip_items = vip["items"].as_array().unwrap();
        assert_eq!(vip_items.len(), 1);
        assert_eq!(vip_items[0]["id"], ana.to_string());
    }

    #[tokio::test]
    async fn test_client_role_sees_list_but_cannot_write() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Client);
        let ana = app.store.add_client(studio, "Ana", None);

        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let (status, view) = call(&app, Method::GET, "/api/clients", me, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["items"].as_array().unwrap().len(), 1);
        assert_eq!(view["canAddClient"], false);

        let (status, _) = call(&app, Method::POST, "/api/clients", me, Some(json!({ "fullName": "Nova" }))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&app, Method::GET, &format!("/api/clients/{ana}"), me, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_enroll_edit_and_record_visit() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Master);
        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let (_, before) = call(&app, Method::GET, "/api/clients/revision", me, None).await;
        assert_eq!(before["revision"], 0);

        let (status, created) = call(&app, Method::POST, "/api/clients", me, Some(json!({ "fullName": "Carla", "email": "carla@ink.com" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (status, edited) = call(&app, Method::PUT, &format!("/api/clients/{id}"), me, Some(json!({ "instagram": "@carla" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(edited["instagram"], "@carla");
        assert_eq!(edited["email"], "carla@ink.com");

        let (status, _) = call(&app, Method::POST, "/api/visits", me, Some(json!({ "clientId": id, "price": 300.0, "performedDate": "2024-07-10" }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, profile) = call(&app, Method::GET, &format!("/api/clients/{id}"), me, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(profile["totalVisits"], 1);
        assert_eq!(profile["totalSpent"], 300.0);

        let (_, after) = call(&app, Method::GET, "/api/clients/revision", me, None).await;
        assert_eq!(after["revision"], 3);
    }

    #[tokio::test]
    async fn test_revision_long_poll_wakes_on_write() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Master);
        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let ((status, polled), (created, _)) = tokio::join!(
            call(&app, Method::GET, "/api/clients/revision?after=0", me, None),
            call(&app, Method::POST, "/api/clients", me, Some(json!({ "fullName": "Duda" }))),
        );

        assert_eq!(created, StatusCode::CREATED);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(polled["revision"], 1);

        // Revisão desconhecida (ex.: depois de um restart) responde na hora
        let (_, stale) = call(&app, Method::GET, "/api/clients/revision?after=7", me, None).await;
        assert_eq!(stale["revision"], 1);
    }

    #[tokio::test]
    async fn test_sign_out_forgets_session() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Master);
        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let (status, _) = call(&app, Method::DELETE, "/api/session", me, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, Method::GET, "/api/clients", me, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_payload_is_bad_request() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Receptionist);
        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;

        let (status, body) = call(&app, Method::POST, "/api/clients", me, Some(json!({ "fullName": "", "email": "x" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["details"]["full_name"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_role_capabilities_are_most_restrictive() {
        let app = test_app();
        let me = Uuid::new_v4();

        let (status, caps) = call(&app, Method::GET, "/api/capabilities/OWNER", me, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(caps.as_object().unwrap().values().all(|v| v == false));

        let (_, master) = call(&app, Method::GET, "/api/capabilities/master", me, None).await;
        assert_eq!(master["canAccessSettings"], true);
    }

    #[tokio::test]
    async fn test_clients_unavailable_is_reported() {
        let app = test_app();
        let me = Uuid::new_v4();
        let studio = Uuid::new_v4();
        app.store.add_membership(me, studio, "Agulha de Ouro", Role::Master);
        call(&app, Method::POST, "/api/session/tenant", me, Some(json!({ "tenantId": studio }))).await;
        app.store.set_failing(&app.store.fail_clients, true);

        let (status, body) = call(&app, Method::GET, "/api/clients", me, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["items"].is_null());
    }
}
