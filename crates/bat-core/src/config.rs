//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// 인증 설정
    pub auth: AuthConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
    /// 유휴 타임아웃 (초)
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            connection_timeout_secs: 30,
            idle_timeout_secs: 300,
        }
    }
}

/// 인증 설정.
///
/// 토큰 수명과 갱신 윈도우는 정책 상수입니다. 기본값(15분 / 180초)을
/// 바꾸면 기존에 발급된 토큰의 분류가 달라지지는 않지만, 갱신 판정
/// 경계는 즉시 새 값을 따릅니다.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT 서명 비밀 키
    pub secret: String,
    /// Access Token 수명 (분)
    #[serde(default = "default_token_ttl_minutes")]
    pub token_ttl_minutes: i64,
    /// 갱신 윈도우 (초) - 만료 전 이 구간에 들어오면 조용한 재발급 대상
    #[serde(default = "default_renewal_window_secs")]
    pub renewal_window_secs: i64,
    /// 토큰을 담는 쿠키 이름
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// 초기 관리자 계정 사용자 이름 (테이블이 비어 있을 때만 시드)
    #[serde(default)]
    pub default_admin_username: Option<String>,
    /// 초기 관리자 계정 이메일
    #[serde(default)]
    pub default_admin_email: Option<String>,
    /// 초기 관리자 계정 비밀번호
    #[serde(default)]
    pub default_admin_password: Option<String>,
}

fn default_token_ttl_minutes() -> i64 {
    15
}
fn default_renewal_window_secs() -> i64 {
    180
}
fn default_cookie_name() -> String {
    "access_token".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_minutes: default_token_ttl_minutes(),
            renewal_window_secs: default_renewal_window_secs(),
            cookie_name: default_cookie_name(),
            default_admin_username: None,
            default_admin_email: None,
            default_admin_password: None,
        }
    }
}

impl AuthConfig {
    /// 환경 변수에서 인증 설정을 로드합니다.
    ///
    /// # 환경변수
    /// - `JWT_SECRET`: 서명 비밀 키 (필수)
    /// - `TOKEN_TTL_MINUTES`: Access Token 수명 (기본값: 15)
    /// - `RENEWAL_WINDOW_SECS`: 갱신 윈도우 (기본값: 180)
    /// - `DEFAULT_ADMIN_USERNAME` / `DEFAULT_ADMIN_EMAIL` / `DEFAULT_ADMIN_PASSWORD`:
    ///   초기 관리자 시드 (선택)
    pub fn from_env() -> Result<Self, crate::error::BatError> {
        let secret = std::env::var("JWT_SECRET").map_err(|_| {
            crate::error::BatError::Config("JWT_SECRET 환경 변수가 필요합니다".to_string())
        })?;

        let token_ttl_minutes = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_token_ttl_minutes);
        let renewal_window_secs = std::env::var("RENEWAL_WINDOW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_renewal_window_secs);

        Ok(Self {
            secret,
            token_ttl_minutes,
            renewal_window_secs,
            cookie_name: default_cookie_name(),
            default_admin_username: std::env::var("DEFAULT_ADMIN_USERNAME").ok(),
            default_admin_email: std::env::var("DEFAULT_ADMIN_EMAIL").ok(),
            default_admin_password: std::env::var("DEFAULT_ADMIN_PASSWORD").ok(),
        })
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("auth.token_ttl_minutes", 15)?
            .set_default("auth.renewal_window_secs", 180)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("BAT")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
