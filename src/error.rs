use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// A listener panicked during `try_trigger`; listeners after it were skipped.
    #[error("listener `{listener}` panicked while handling `{event}`: {message}")]
    ListenerPanicked {
        event: String,
        listener: String,
        message: String,
    },

    #[error("channel `{event}` is not registered with argument type {expected}")]
    ChannelTypeMismatch { event: String, expected: String },

    #[error("Config error: {0}")]
    Config(String),
}

pub type HookResult<T> = Result<T, HookError>;

impl HookError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        HookError::Config(message.into())
    }

    /// Builds a `ListenerPanicked` from a `catch_unwind` payload.
    pub(crate) fn from_panic(
        event: &str,
        listener: &str,
        payload: &(dyn std::any::Any + Send),
    ) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        HookError::ListenerPanicked {
            event: event.to_string(),
            listener: listener.to_string(),
            message,
        }
    }
}
