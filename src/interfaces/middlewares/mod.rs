pub mod origin_guard;
pub mod rate_limit;
pub mod security_headers;
