//! 서비스 계층.
//!
//! 권한 판정과 저장소 호출을 묶는 비즈니스 로직입니다.

pub mod identity;

pub use identity::{
    authenticate, create_identity, delete_identity, ensure_default_admin, get_identity,
    list_identities, update_identity, IdentityCreate, IdentityUpdate,
};
