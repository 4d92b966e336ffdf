use std::future::Future;
use std::path::PathBuf;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

use crate::common::{error, info, Error, ErrorKind, Result};
use crate::core::{Caller, UnitOfWork};
use crate::identity::{Employee, PrincipalPayload, SignInArea};
use crate::protocol::{
    path, ChangeRoleRequest, ErrorBody, SignInRequest, SignInResponse, SignOutResponse,
};

// Server configuration.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    // http listen host.
    listen_host: Option<String>,
    // http listen port.
    listen_port: Option<String>,
    // Directory of the built portal. Unknown paths fall back to its index.html.
    static_dir: Option<PathBuf>,
    // Origins allowed to call the api from a browser.
    cors_allow_origins: Option<Vec<String>>,
}

impl Config {
    const DEFAULT_LISTEN_HOST: &'static str = "127.0.0.1";
    const DEFAULT_LISTEN_PORT: &'static str = crate::server::DEFAULT_PORT;

    pub fn set_listen_host(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.listen_host = Some(val)
        }
    }
    pub fn set_listen_port(&mut self, val: &mut Option<String>) {
        if let Some(val) = val.take() {
            self.listen_port = Some(val)
        }
    }
    pub fn set_static_dir(&mut self, val: &mut Option<PathBuf>) {
        if let Some(val) = val.take() {
            self.static_dir = Some(val)
        }
    }
    pub fn set_cors_allow_origins(&mut self, val: &mut Option<Vec<String>>) {
        if let Some(val) = val.take() {
            self.cors_allow_origins = Some(val)
        }
    }
    pub(crate) fn override_merge(&mut self, other: &mut Config) {
        self.set_listen_host(&mut other.listen_host);
        self.set_listen_port(&mut other.listen_port);
        self.set_static_dir(&mut other.static_dir);
        self.set_cors_allow_origins(&mut other.cors_allow_origins);
    }

    pub(crate) fn listen_addr(&self) -> String {
        format!(
            "{}:{}",
            self.listen_host
                .as_deref()
                .unwrap_or(Config::DEFAULT_LISTEN_HOST),
            self.listen_port
                .as_deref()
                .unwrap_or(Config::DEFAULT_LISTEN_PORT),
        )
    }

    fn cors(&self) -> Result<Option<CorsLayer>> {
        let Some(origins) = self.cors_allow_origins.as_ref() else {
            return Ok(None);
        };
        let origins = origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| {
                    Error::from(ErrorKind::Config(format!("invalid cors origin {:?}", origin)))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        ))
    }
}

#[derive(Clone)]
struct AppState {
    request_sender: mpsc::Sender<UnitOfWork>,
}

impl AppState {
    // Hand the unit of work to the gatekeeper and wait for its answer.
    async fn dispatch<T>(
        &self,
        uow: UnitOfWork,
        rx: oneshot::Receiver<Result<T>>,
    ) -> std::result::Result<T, ApiError> {
        self.request_sender
            .send(uow)
            .await
            .map_err(|_| ErrorKind::Internal("gatekeeper unavailable".to_owned()))?;
        let response = rx
            .await
            .map_err(|_| ErrorKind::Internal("gatekeeper dropped request".to_owned()))?;
        Ok(response?)
    }
}

pub(crate) struct Server {
    config: Config,
}

impl Server {
    // Construct Server from config.
    pub(crate) fn new(config: Config) -> Self {
        Self { config }
    }

    pub(crate) fn router(&self, request_sender: mpsc::Sender<UnitOfWork>) -> Result<Router> {
        let mut router = Router::new()
            .route(path::HEALTH, get(health))
            .route(path::SIGN_IN_ADMIN, post(sign_in_admin))
            .route(path::SIGN_IN_USER, post(sign_in_user))
            .route(path::SIGN_OUT, post(sign_out))
            .route(path::ME, get(me))
            .route(path::EMPLOYEES, get(list_employees))
            .route(path::EMPLOYEE, get(get_employee))
            .route(path::EMPLOYEE_ROLE, put(change_role))
            .with_state(AppState { request_sender });

        if let Some(dir) = self.config.static_dir.as_ref() {
            let index = ServeFile::new(dir.join("index.html"));
            router = router.fallback_service(ServeDir::new(dir).fallback(index));
        }
        if let Some(cors) = self.config.cors()? {
            router = router.layer(cors);
        }

        Ok(router)
    }

    pub(crate) async fn run(
        self,
        request_sender: mpsc::Sender<UnitOfWork>,
        listener: TcpListener,
        shutdown: impl Future + Send + 'static,
    ) -> Result<()> {
        let router = self.router(request_sender)?;
        info!(addr = ?listener.local_addr().ok(), "Server running. {:?}", self.config);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received");
            })
            .await?;

        info!("Shutdown successfully completed");

        Ok(())
    }
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        ApiError(Error::from(kind))
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0.kind() {
            ErrorKind::Unauthenticated(_) | ErrorKind::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ErrorKind::Forbidden(_) => StatusCode::FORBIDDEN,
            ErrorKind::NotFound(_) => StatusCode::NOT_FOUND,
            ErrorKind::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(backtrace = ?self.0.backtrace(), "{}", self.0);
            "internal error".to_owned()
        };
        (status, Json(ErrorBody::new(message))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// Token of an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token.to_owned())
    } else {
        None
    }
}

fn caller(headers: &HeaderMap) -> Caller {
    Caller::from_token(bearer_token(headers))
}

fn json_body<T>(body: std::result::Result<Json<T>, JsonRejection>) -> std::result::Result<T, ApiError> {
    body.map(|Json(body)| body)
        .map_err(|rejection| ErrorKind::BadRequest(rejection.body_text()).into())
}

fn employee_id(id: std::result::Result<Path<u64>, PathRejection>) -> std::result::Result<u64, ApiError> {
    id.map(|Path(id)| id)
        .map_err(|rejection| ErrorKind::BadRequest(rejection.body_text()).into())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn sign_in(
    state: AppState,
    area: SignInArea,
    body: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<SignInResponse> {
    let request = json_body(body)?;
    let (uow, rx) = UnitOfWork::new_sign_in(area, request);
    state.dispatch(uow, rx).await.map(Json)
}

async fn sign_in_admin(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<SignInResponse> {
    sign_in(state, SignInArea::Admin, body).await
}

async fn sign_in_user(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<SignInResponse> {
    sign_in(state, SignInArea::User, body).await
}

async fn sign_out(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<SignOutResponse> {
    let (uow, rx) = UnitOfWork::new_sign_out(caller(&headers));
    state.dispatch(uow, rx).await.map(Json)
}

async fn me(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<PrincipalPayload> {
    let (uow, rx) = UnitOfWork::new_me(caller(&headers));
    state.dispatch(uow, rx).await.map(Json)
}

async fn list_employees(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<Employee>> {
    let (uow, rx) = UnitOfWork::new_list_employees(caller(&headers));
    state.dispatch(uow, rx).await.map(Json)
}

async fn get_employee(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> ApiResult<Employee> {
    let id = employee_id(id)?;
    let (uow, rx) = UnitOfWork::new_get_employee(caller(&headers), id);
    state.dispatch(uow, rx).await.map(Json)
}

async fn change_role(
    State(state): State<AppState>,
    headers: HeaderMap,
    id: std::result::Result<Path<u64>, PathRejection>,
    body: std::result::Result<Json<ChangeRoleRequest>, JsonRejection>,
) -> ApiResult<Employee> {
    let id = employee_id(id)?;
    let request = json_body(body)?;
    let (uow, rx) = UnitOfWork::new_change_role(caller(&headers), id, request.role);
    state.dispatch(uow, rx).await.map(Json)
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;

    // The receiver is returned so that dispatching does not fail on a closed channel.
    fn router(config: Config) -> (Router, mpsc::Receiver<UnitOfWork>) {
        let (send, recv) = mpsc::channel(1);
        (Server::new(config).router(send).unwrap(), recv)
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(authorization).unwrap(),
        );
        headers
    }

    #[test]
    fn parse_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc".to_owned()));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc".to_owned()));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("abc")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn error_status() {
        let cases = [
            (ErrorKind::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (ErrorKind::Unauthenticated("x".into()), StatusCode::UNAUTHORIZED),
            (ErrorKind::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ErrorKind::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ErrorKind::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ErrorKind::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (kind, status) in cases {
            assert_eq!(ApiError::from(kind).status(), status);
        }
    }

    #[test]
    fn listen_addr_defaults_and_overrides() {
        let mut config = Config::default();
        assert_eq!(config.listen_addr(), "127.0.0.1:7878");

        let mut other = Config {
            listen_port: Some("9000".into()),
            ..Default::default()
        };
        config.override_merge(&mut other);
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
        assert!(other.listen_port.is_none());
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        let config = Config {
            cors_allow_origins: Some(vec!["http://localhost:5173".into()]),
            ..Default::default()
        };
        assert!(config.cors().unwrap().is_some());

        let config = Config {
            cors_allow_origins: Some(vec!["bad\norigin".into()]),
            ..Default::default()
        };
        assert!(config.cors().is_err());
    }

    #[test]
    fn malformed_body_is_bad_request() {
        tokio_test::block_on(async move {
            let (router, _requests) = router(Config::default());

            let request = Request::post(path::SIGN_IN_USER)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email": "#))
                .unwrap();
            let (status, _, body) = send(router.clone(), request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let body: ErrorBody = serde_json::from_slice(&body).unwrap();
            assert_eq!(body.status, "error");
            assert!(!body.message.is_empty());

            let request = Request::put("/api/employees/5/role")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"role": "OWNER"}"#))
                .unwrap();
            let (status, _, _) = send(router, request).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
        })
    }

    #[test]
    fn malformed_employee_id_is_bad_request() {
        tokio_test::block_on(async move {
            let (router, _requests) = router(Config::default());

            for uri in ["/api/employees/abc", "/api/employees/-1"] {
                let request = Request::get(uri)
                    .header(header::AUTHORIZATION, "Bearer abc")
                    .body(Body::empty())
                    .unwrap();
                let (status, _, body) = send(router.clone(), request).await;
                assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
                let body: ErrorBody = serde_json::from_slice(&body).unwrap();
                assert_eq!(body.status, "error");
            }
        })
    }

    #[test]
    fn unknown_paths_fall_back_to_index() {
        tokio_test::block_on(async move {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("index.html"), "<h1>portal</h1>").unwrap();
            std::fs::write(dir.path().join("app.js"), "start()").unwrap();

            let (router, _requests) = router(Config {
                static_dir: Some(dir.path().to_owned()),
                ..Default::default()
            });

            let get = |uri: &str| Request::get(uri).body(Body::empty()).unwrap();

            let (status, _, body) = send(router.clone(), get("/hr/dashboard")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, b"<h1>portal</h1>");

            let (status, _, body) = send(router.clone(), get("/app.js")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, b"start()");

            // Api routes take precedence over the static files.
            let (status, _, body) = send(router, get(path::HEALTH)).await;
            assert_eq!(status, StatusCode::OK);
            let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(health["status"], "ok");
        })
    }

    #[test]
    fn cors_headers_for_allowed_origin() {
        tokio_test::block_on(async move {
            let (router, _requests) = router(Config {
                cors_allow_origins: Some(vec!["http://localhost:5173".into()]),
                ..Default::default()
            });
            let allow_origin = |headers: &HeaderMap| {
                headers
                    .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                    .map(|value| value.to_str().unwrap().to_owned())
            };

            let request = Request::get(path::HEALTH)
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap();
            let (status, headers, _) = send(router.clone(), request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(allow_origin(&headers).as_deref(), Some("http://localhost:5173"));

            let request = Request::get(path::HEALTH)
                .header(header::ORIGIN, "http://elsewhere.test")
                .body(Body::empty())
                .unwrap();
            let (_, headers, _) = send(router.clone(), request).await;
            assert!(allow_origin(&headers).is_none());

            let request = Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/employees/5/role")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization")
                .body(Body::empty())
                .unwrap();
            let (status, headers, _) = send(router, request).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(allow_origin(&headers).as_deref(), Some("http://localhost:5173"));
            let methods = headers
                .get(header::ACCESS_CONTROL_ALLOW_METHODS)
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default();
            assert!(methods.contains("PUT"), "{}", methods);
        })
    }
}
