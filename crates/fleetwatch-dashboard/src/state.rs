use fleetwatch_client::TransportError;
use fleetwatch_common::ResponseEnvelope;

/// What the presentation layer renders. Exactly one is current at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Loading,
    Loaded(ResponseEnvelope),
    Error(String),
}

impl AppState {
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            AppState::Loaded(env) => Some(env),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AppState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AppState::Loading)
    }
}

/// Two phases of one action: the snapshot shown while the call is in
/// flight, then its outcome.
#[derive(Debug, Clone)]
pub enum Projection {
    /// `None` until a list has been loaded.
    Pending(Option<ResponseEnvelope>),
    Settled(Result<ResponseEnvelope, TransportError>),
}

impl From<Projection> for AppState {
    fn from(projection: Projection) -> Self {
        match projection {
            Projection::Pending(None) => AppState::Loading,
            Projection::Pending(Some(env)) | Projection::Settled(Ok(env)) => AppState::Loaded(env),
            Projection::Settled(Err(err)) => AppState::Error(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_to_state() {
        assert!(AppState::from(Projection::Pending(None)).is_loading());

        let env = ResponseEnvelope::default();
        assert_eq!(
            AppState::from(Projection::Pending(Some(env.clone()))),
            AppState::Loaded(env.clone())
        );
        assert_eq!(
            AppState::from(Projection::Settled(Ok(env.clone()))).envelope(),
            Some(&env)
        );

        let state = AppState::from(Projection::Settled(Err(TransportError::from_code(502))));
        assert_eq!(state.error(), Some("An error occurred - Error code: 502"));
    }
}
