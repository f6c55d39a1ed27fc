use uuid::Uuid;

/// Generate a fresh item identity. UUIDv7 keeps ids roughly time-ordered,
/// which makes the store's default name ordering cheap to debug.
pub fn new_uuid_v7() -> String {
    Uuid::now_v7().to_string()
}
