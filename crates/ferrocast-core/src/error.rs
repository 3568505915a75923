use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Local input errors, raised before any request leaves the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be an ISO calendar date (YYYY-MM-DD): '{value}'")]
    InvalidDate { value: String },
    #[error("date '{value}' is outside the supported calendar range")]
    DateOutOfRange { value: String },

    #[error("invalid simulation method '{value}', expected one of garch, bootstrap")]
    InvalidSimulationMethod { value: String },

    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
}

/// Coarse classification of a [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    Transport,
    Service,
    Validation,
    Decode,
}

/// Typed failure returned by every remote gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Network failure, or a non-2xx response without a parseable detail.
    Transport {
        status: Option<u16>,
        message: String,
    },
    /// Non-2xx response carrying a server-supplied detail message.
    Service { status: u16, detail: String },
    /// Input rejected locally; no request was sent.
    Validation(ValidationError),
    /// Successful status whose body does not match the expected shape.
    Decode { message: String },
}

impl GatewayError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn service(status: u16, detail: impl Into<String>) -> Self {
        Self::Service {
            status,
            detail: detail.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> GatewayErrorKind {
        match self {
            Self::Transport { .. } => GatewayErrorKind::Transport,
            Self::Service { .. } => GatewayErrorKind::Service,
            Self::Validation(_) => GatewayErrorKind::Validation,
            Self::Decode { .. } => GatewayErrorKind::Decode,
        }
    }

    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Service { status, .. } => Some(*status),
            Self::Validation(_) | Self::Decode { .. } => None,
        }
    }

    /// Server detail, if the backend supplied one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Service { detail, .. } => Some(detail.as_str()),
            _ => None,
        }
    }

    /// Text suitable for an error banner: the server detail verbatim when
    /// present, otherwise a generic message for the failure class.
    pub fn user_message(&self) -> String {
        match self {
            Self::Service { detail, .. } => detail.clone(),
            Self::Validation(error) => error.to_string(),
            Self::Transport { .. } | Self::Decode { .. } => String::from("Failed to fetch data"),
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "gateway.transport",
            Self::Service { .. } => "gateway.service",
            Self::Validation(_) => "gateway.validation",
            Self::Decode { .. } => "gateway.decode",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport {
                status: Some(status),
                message,
            } => write!(f, "{message} (status {status}, {})", self.code()),
            Self::Transport {
                status: None,
                message,
            } => write!(f, "{message} ({})", self.code()),
            Self::Service { status, detail } => {
                write!(f, "{detail} (status {status}, {})", self.code())
            }
            Self::Validation(error) => write!(f, "{error} ({})", self.code()),
            Self::Decode { message } => write!(f, "{message} ({})", self.code()),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Validation(error) => Some(error),
            _ => None,
        }
    }
}

impl From<ValidationError> for GatewayError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_surface_detail_verbatim() {
        let error = GatewayError::service(404, "Symbol not found");
        assert_eq!(error.user_message(), "Symbol not found");
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.kind(), GatewayErrorKind::Service);
    }

    #[test]
    fn transport_errors_fall_back_to_generic_message() {
        let error = GatewayError::http_status(502, "upstream returned status 502");
        assert_eq!(error.user_message(), "Failed to fetch data");
        assert_eq!(error.status(), Some(502));
        assert!(error.to_string().contains("gateway.transport"));
    }

    #[test]
    fn validation_errors_convert_into_gateway_errors() {
        let error = GatewayError::from(ValidationError::EmptySymbol);
        assert_eq!(error.kind(), GatewayErrorKind::Validation);
        assert_eq!(error.status(), None);
        assert_eq!(error.user_message(), "symbol cannot be empty");
    }
}
