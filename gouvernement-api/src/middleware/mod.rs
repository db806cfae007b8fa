/// Middleware modules for the API server
///
/// - `security`: security response headers
///
/// Bearer authentication lives in [`crate::app`] and authorization gates in
/// [`crate::guard`].

pub mod security;
