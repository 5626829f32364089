//! ID generator port for run identifiers.

/// Generates unique identifiers.
///
/// Each generation run is tagged with one identifier so that reports from
/// repeated runs can be told apart.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
