use thiserror::Error;

/// Reasons a raw URL did not yield a media identifier.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Nothing but whitespace was supplied.
    #[error("no URL provided")]
    Empty,

    /// The URL parsed but points at a host we do not know.
    #[error("unsupported host: {host}")]
    UnsupportedHost { host: String },

    /// The host matched but no valid 11-character token was found.
    #[error("no media identifier in URL")]
    NoIdentifier,

    /// The input was neither a parseable URL nor a recognizable link shape.
    #[error("malformed URL")]
    Malformed,
}
