use uuid::Uuid;

/// Fresh identifier for records that arrive without one, e.g. `p_3f2a…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}
