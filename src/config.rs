pub const USER_ID_LEN: usize = 6;
pub const POST_ID_LEN: usize = 8;
pub const COMMENT_ID_LEN: usize = 10;

pub const MAX_NAME_LENGTH: usize = 50;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_CONTENT_LENGTH: usize = 5000;

pub fn data_path() -> String {
    std::env::var("RIPPLE_DATA_PATH").unwrap_or_else(|_| "data.json".to_string())
}

pub fn listen_addr() -> String {
    std::env::var("RIPPLE_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
