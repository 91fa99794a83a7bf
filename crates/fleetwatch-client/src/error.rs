/// The single failure kind of the transport layer.
///
/// `code` is the HTTP status of the failed response, or 0 when no response
/// was received at all (connect refused, timeout, DNS).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub code: u16,
    pub message: String,
}

impl TransportError {
    pub fn from_code(code: u16) -> Self {
        Self {
            code,
            message: format!("An error occurred - Error code: {code}"),
        }
    }
}

impl TransportError {
    /// A request that could not be built, so nothing was sent.
    pub fn invalid_request(detail: impl std::fmt::Display) -> Self {
        Self {
            code: 0,
            message: format!("Invalid request - {detail}"),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::from_code(err.status().map(|s| s.as_u16()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_code() {
        let err = TransportError::from_code(503);
        assert_eq!(err.code, 503);
        assert_eq!(err.to_string(), "An error occurred - Error code: 503");
    }
}
