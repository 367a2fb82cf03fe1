//! Stop catalog error types.

/// Errors from loading or querying the stop catalog.
///
/// Clonable so that a failed load can be replayed to every later caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog could not be fetched (network failure, error status).
    #[error("stop catalog unavailable: {message}")]
    Unavailable { message: String },

    /// The catalog was fetched but could not be parsed.
    #[error("stop catalog unparseable: {message}")]
    Unparseable { message: String },

    /// A query was made before `load` was called.
    #[error("stop catalog not loaded")]
    NotLoaded,
}
