//! Error taxonomy at the GraphQL boundary.
//!
//! Every error emitted to a client carries a `type` tag from [`ErrorKind`]
//! and a `userMessage` safe for display. Internal causes are logged with the
//! request id; in production the serialized message contains only the
//! request id so nothing about the backend leaks.

use {async_graphql::ErrorExtensionValues, std::fmt::Display, tracing::error};

use meridian_upstream::UpstreamError;

/// The `type` tag attached to every boundary error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Expired,
    Internal,
    NotAuthenticated,
    NotAuthorized,
    NotFound,
    NotSupported,
}

impl ErrorKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Expired => "EXPIRED",
            Self::Internal => "INTERNAL",
            Self::NotAuthenticated => "NOT_AUTHENTICATED",
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotFound => "NOT_FOUND",
            Self::NotSupported => "NOT_SUPPORTED",
        }
    }

    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::Expired => "Your session has expired. Please sign in again.",
            Self::Internal => "Something went wrong on the server. Please try again.",
            Self::NotAuthenticated => "Please sign in to continue.",
            Self::NotAuthorized => "You are not authorized to perform that action.",
            Self::NotFound => "The requested item could not be found.",
            Self::NotSupported => "That action is not supported.",
        }
    }
}

fn tagged(kind: ErrorKind, message: String, user_message: &str) -> async_graphql::Error {
    let mut extensions = ErrorExtensionValues::default();
    extensions.set("type", kind.tag());
    extensions.set("userMessage", user_message);
    async_graphql::Error {
        message,
        source: None,
        extensions: Some(extensions),
    }
}

#[must_use]
pub fn typed(kind: ErrorKind, message: impl Into<String>) -> async_graphql::Error {
    tagged(kind, message.into(), kind.user_message())
}

#[must_use]
pub fn not_authenticated() -> async_graphql::Error {
    typed(ErrorKind::NotAuthenticated, "not authenticated")
}

#[must_use]
pub fn not_authorized() -> async_graphql::Error {
    typed(ErrorKind::NotAuthorized, "not authorized")
}

#[must_use]
pub fn not_found(what: impl Display) -> async_graphql::Error {
    typed(ErrorKind::NotFound, format!("not found: {what}"))
}

#[must_use]
pub fn expired(message: impl Into<String>) -> async_graphql::Error {
    typed(ErrorKind::Expired, message)
}

#[must_use]
pub fn not_supported(message: impl Into<String>) -> async_graphql::Error {
    typed(ErrorKind::NotSupported, message)
}

/// Wrap an unexpected failure as INTERNAL. The cause is logged against the
/// request id; the serialized message carries the cause only outside
/// production.
#[must_use]
pub fn internal(request_id: &str, dev_mode: bool, cause: impl Display) -> async_graphql::Error {
    error!(request_id, %cause, "internal error");
    let message = if dev_mode {
        format!("Internal error [{request_id}]: {cause}")
    } else {
        format!("Internal error [{request_id}]")
    };
    tagged(ErrorKind::Internal, message, ErrorKind::Internal.user_message())
}

/// Map an upstream failure to a boundary error: not-found becomes NOT_FOUND,
/// invalid-argument is forwarded as-is, everything else is INTERNAL.
#[must_use]
pub fn from_upstream(request_id: &str, dev_mode: bool, err: UpstreamError) -> async_graphql::Error {
    match err {
        UpstreamError::NotFound(what) => not_found(what),
        UpstreamError::InvalidArgument(message) => async_graphql::Error::new(message),
        other => internal(request_id, dev_mode, other),
    }
}
