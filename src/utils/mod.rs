pub mod cookie;
pub mod jwt;

pub use jwt::{decode_session_token, encode_session_token, init_session_config};
