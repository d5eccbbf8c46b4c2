//! Repository pattern for database operations.
//!
//! 데이터베이스 접근 로직을 라우트 핸들러에서 분리하여 관리합니다.
//! 모든 Repository는 static methods 패턴을 사용하며, 소유된 연결 풀을
//! 명시적으로 전달받습니다 - 프로세스 전역 핸들은 없습니다.

pub mod assessments;
pub mod identities;

pub use assessments::AssessmentRepository;
pub use identities::IdentityRepository;
