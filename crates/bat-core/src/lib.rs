//! # BAT Core
//!
//! 코칭/평가 플랫폼의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 자격증명/권한 코어 전반에서 사용되는 기본 타입을 제공합니다:
//! - 아이덴티티 및 역할 지배 모델
//! - 리소스 접근 부여(협업자) 모델
//! - 닫힌 에러 분류
//! - 설정 관리
//! - 로깅 인프라
//!
//! I/O는 없습니다. 저장소/전송 계층은 `bat-api`가 담당합니다.

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
