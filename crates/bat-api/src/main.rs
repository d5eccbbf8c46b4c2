//! 코칭 플랫폼 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 인증(토큰 발급/갱신), 아이덴티티 관리, 평가 협업자 부여 엔드포인트를
//! 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use bat_api::routes::create_api_router;
use bat_api::services::ensure_default_admin;
use bat_api::state::AppState;
use bat_api::swagger_ui_router;
use bat_core::{init_logging_from_env, AppConfig, AuthConfig, DatabaseConfig};

/// 서버 설정 구조체.
struct ServerConfig {
    /// 바인딩할 호스트 주소
    host: String,
    /// 바인딩할 포트
    port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// 환경 변수에서 설정 로드.
    fn from_env() -> Self {
        let host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("API_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self { host, port }
    }

    /// 소켓 주소 반환.
    ///
    /// # Errors
    /// `host:port` 형식이 유효하지 않으면 `AddrParseError`를 반환합니다.
    fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// 데이터베이스 연결 풀 생성.
///
/// `DATABASE_URL`이 설정되지 않았으면 None을 반환합니다. 풀 없이도
/// 서버는 시작되지만 저장소가 필요한 엔드포인트는 500을 반환합니다.
async fn create_db_pool() -> Option<sqlx::PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            warn!("DATABASE_URL not set, starting without a database");
            return None;
        }
    };

    let db_config = DatabaseConfig::default();
    match PgPoolOptions::new()
        .max_connections(db_config.max_connections)
        .acquire_timeout(Duration::from_secs(db_config.connection_timeout_secs))
        .idle_timeout(Duration::from_secs(db_config.idle_timeout_secs))
        .connect(&url)
        .await
    {
        Ok(pool) => {
            info!("Database connection pool initialized");
            Some(pool)
        }
        Err(e) => {
            error!(error = %e, "데이터베이스 연결 실패");
            None
        }
    }
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS` 환경변수가 설정되어 있으면 해당 origin만 허용합니다.
/// 설정되지 않으면 개발 모드로 간주하여 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            AllowOrigin::any()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(std::env::var("CORS_ORIGINS").is_ok())
        .max_age(Duration::from_secs(3600))
}

/// 전체 라우터 생성.
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .merge(swagger_ui_router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(cors_layer())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // tracing 초기화
    init_logging_from_env()?;

    info!("Starting BAT API server...");

    // 설정 로드: CONFIG_PATH가 설정되어 있으면 파일(+BAT__ 환경 변수
    // 오버라이드)에서, 없으면 환경 변수만으로 로드합니다.
    let (config, auth_config) = match std::env::var("CONFIG_PATH") {
        Ok(path) => {
            let app_config = AppConfig::load(&path)?;
            (
                ServerConfig {
                    host: app_config.server.host,
                    port: app_config.server.port,
                },
                app_config.auth,
            )
        }
        Err(_) => (ServerConfig::from_env(), AuthConfig::from_env()?),
    };

    let addr = config.socket_addr().map_err(|e| {
        error!(
            host = %config.host,
            port = config.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. API_HOST, API_PORT 환경변수를 확인하세요."
        );
        e
    })?;

    // 데이터베이스 연결
    let db_pool = create_db_pool().await;

    // 초기 관리자 시드 (아이덴티티 테이블이 비어 있을 때만)
    if let Some(pool) = &db_pool {
        match ensure_default_admin(pool, &auth_config).await {
            Ok(Some(admin)) => info!(id = %admin.id, "default admin seeded"),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "초기 관리자 시드 실패"),
        }
    }

    // AppState 생성
    let state = Arc::new(AppState::new(db_pool, auth_config));
    info!(
        version = %state.version,
        has_db = state.db_pool.is_some(),
        "Application state initialized"
    );

    // 라우터 조립 및 서버 시작
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("BAT API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
