use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Random alphanumeric identifier of a fixed length. Collision checks are
/// the caller's job (see the fresh_*_id methods on Db).
pub fn new_id(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Sanitize to plain text only - no HTML allowed
pub fn sanitize_text(text: &str) -> String {
    ammonia::Builder::default()
        .tags(std::collections::HashSet::new())
        .clean(text)
        .to_string()
}
