//! REST router.
//!
//! One resource per entity under `/api/`, five routes each. GET routes
//! serve the read projection; POST takes the nested create input;
//! PUT and PATCH both take the all-optional partial update (a full PUT
//! body is a PATCH supplying every field).
//!
//! NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).

use axum::routing::get;
use axum::Json;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::state::AppState;

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

macro_rules! resource_routes {
    ($router:expr, $path:literal, $($module:ident)::+) => {{
        $router
            .route($path, get($($module)::+::list).post($($module)::+::create))
            .route(
                concat!($path, "/:id"),
                get($($module)::+::retrieve)
                    .put($($module)::+::update)
                    .patch($($module)::+::update)
                    .delete($($module)::+::destroy),
            )
    }};
}

pub fn api_router(state: AppState) -> Router {
    let mut api = Router::new().route("/health", get(health));

    api = resource_routes!(api, "/direcciones", endpoints::catalog::direcciones);
    api = resource_routes!(api, "/personas", endpoints::persons);
    api = resource_routes!(
        api,
        "/clasificaciones-recurso",
        endpoints::catalog::clasificaciones_recurso
    );
    api = resource_routes!(api, "/tipos-recurso", endpoints::resources::tipos_recurso);
    api = resource_routes!(
        api,
        "/recursos-comunitarios",
        endpoints::resources::recursos_comunitarios
    );
    api = resource_routes!(api, "/tipos-vivienda", endpoints::catalog::tipos_vivienda);
    api = resource_routes!(api, "/tipos-situacion", endpoints::catalog::tipos_situacion);
    api = resource_routes!(
        api,
        "/tipos-modalidad-paciente",
        endpoints::catalog::tipos_modalidad
    );
    api = resource_routes!(api, "/terminales", endpoints::terminals);
    api = resource_routes!(api, "/pacientes", endpoints::patients::pacientes);
    api = resource_routes!(
        api,
        "/relaciones-paciente",
        endpoints::patients::relaciones_paciente
    );
    api = resource_routes!(
        api,
        "/clasificaciones-alarma",
        endpoints::catalog::clasificaciones_alarma
    );
    api = resource_routes!(api, "/tipos-alarma", endpoints::alarms::tipos_alarma);
    api = resource_routes!(api, "/alarmas", endpoints::alarms::alarmas);
    api = resource_routes!(api, "/usuarios", endpoints::users);
    api = resource_routes!(api, "/grupos", endpoints::catalog::grupos);

    let api = api
        .with_state(state)
        .layer(axum::middleware::from_fn(middleware::log::log_access))
        .layer(CorsLayer::permissive());

    Router::new().nest("/api", api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    // The TempDir is returned so it outlives the router; dropping it
    // would delete the database file mid-test.
    fn test_router() -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        (api_router(AppState::new(path)), dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn persona_body() -> serde_json::Value {
        serde_json::json!({
            "nombre": "Carmen",
            "apellidos": "Lopez Ruiz",
            "dni": "12345678Z",
            "fecha_nacimiento": "1941-05-20",
            "sexo": "femenino",
            "telefono_fijo": "958000000",
            "direccion": {
                "localidad": "Granada",
                "provincia": "Granada",
                "direccion_completa": "Calle Real 5",
                "codigo_postal": "18001"
            }
        })
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_list_returns_empty_array() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/personas")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn persona_create_then_retrieve() {
        let (router, _dir) = test_router();

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/personas", persona_body()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["direccion"]["localidad"], "Granada");
        let id = created["id"].as_str().unwrap().to_string();

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/personas/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched = body_json(response).await;
        assert_eq!(fetched["nombre"], "Carmen");
        assert_eq!(fetched["sexo"], "femenino");
    }

    #[tokio::test]
    async fn malformed_id_returns_400() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/personas/not-a-uuid")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn missing_persona_returns_404() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/personas/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn patch_updates_only_supplied_fields() {
        let (router, _dir) = test_router();

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/personas", persona_body()))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/personas/{id}"),
                serde_json::json!({ "telefono_movil": "600111222" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["telefono_movil"], "600111222");
        assert_eq!(updated["nombre"], "Carmen");
        assert_eq!(updated["direccion"]["codigo_postal"], "18001");
    }

    #[tokio::test]
    async fn patch_null_clears_nullable_field() {
        let (router, _dir) = test_router();

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/personas", persona_body()))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(json_request(
                "PATCH",
                &format!("/api/personas/{id}"),
                serde_json::json!({ "telefono_fijo": null }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body_json(response).await;
        assert_eq!(updated["telefono_fijo"], serde_json::Value::Null);
        assert_eq!(updated["nombre"], "Carmen");
    }

    #[tokio::test]
    async fn delete_then_retrieve_returns_404() {
        let (router, _dir) = test_router();

        let response = router
            .clone()
            .oneshot(json_request("POST", "/api/personas", persona_body()))
            .await
            .unwrap();
        let id = body_json(response).await["id"].as_str().unwrap().to_string();

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/personas/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = router
            .oneshot(
                Request::builder()
                    .uri(format!("/api/personas/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn invalid_enum_in_body_is_client_error() {
        let (router, _dir) = test_router();
        let mut body = persona_body();
        body["sexo"] = serde_json::json!("desconocido");

        let response = router
            .oneshot(json_request("POST", "/api/personas", body))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn relacion_with_unknown_paciente_returns_400() {
        let (router, _dir) = test_router();
        let response = router
            .oneshot(json_request(
                "POST",
                "/api/relaciones-paciente",
                serde_json::json!({
                    "nombre": "Luis",
                    "apellidos": "Lopez",
                    "telefono": "600111222",
                    "tipo_relacion": "hijo",
                    "tiene_llaves_vivienda": true,
                    "prioridad": 1,
                    "es_conviviente": false,
                    "paciente_id": uuid::Uuid::new_v4()
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn tipo_vivienda_post_is_idempotent() {
        let (router, _dir) = test_router();
        let body = serde_json::json!({ "nombre": "Piso" });

        let first = router
            .clone()
            .oneshot(json_request("POST", "/api/tipos-vivienda", body.clone()))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);
        let first_id = body_json(first).await["id"].as_str().unwrap().to_string();

        let second = router
            .clone()
            .oneshot(json_request("POST", "/api/tipos-vivienda", body))
            .await
            .unwrap();
        let second_id = body_json(second).await["id"].as_str().unwrap().to_string();
        assert_eq!(first_id, second_id);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/tipos-vivienda")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);
    }
}
