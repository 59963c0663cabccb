// src/services/session.rs
use uuid::Uuid;

/// Length of generated session tokens. Collisions are accepted by design;
/// there is no uniqueness check against the store.
const SESSION_ID_LEN: usize = 24;

/// Returns the caller-supplied id trimmed, or a fresh random token when the
/// caller supplied none (or only whitespace).
pub fn resolve_session_id(supplied: Option<&str>) -> String {
    match supplied.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => generate_session_id(),
    }
}

fn generate_session_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    hex[..SESSION_ID_LEN].to_string()
}
