use ferrocast_core::{GatewayError, GatewayErrorKind};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ferrocast_core::ValidationError),

    #[error("{}", .0.user_message())]
    Gateway(#[from] GatewayError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Command(_) => 2,
            Self::Gateway(error) => match error.kind() {
                GatewayErrorKind::Validation => 2,
                _ => 3,
            },
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_validation_failures_share_the_validation_exit_code() {
        let local = CliError::Gateway(GatewayError::from(
            ferrocast_core::ValidationError::EmptySymbol,
        ));
        assert_eq!(local.exit_code(), 2);

        let remote = CliError::Gateway(GatewayError::service(404, "Symbol not found"));
        assert_eq!(remote.exit_code(), 3);
        assert_eq!(remote.to_string(), "Symbol not found");
    }
}
