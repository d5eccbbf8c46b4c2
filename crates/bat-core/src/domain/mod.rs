//! 자격증명/권한 코어의 도메인 모델.

mod grant;
mod identity;

pub use grant::*;
pub use identity::*;
