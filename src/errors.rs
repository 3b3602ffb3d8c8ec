use thiserror::Error;

/// Where the user is sent when a transport-level failure happens.
pub const LOGIN_ROUTE: &str = "/auth/login";

/// Text shown when a response could not be understood.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
    /// The request never reached the server or was rejected on the way.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx response that carried neither an envelope nor an error page.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// `success: false` (or an HTML error page) with a message for the user.
    #[error("{0}")]
    Application(String),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("notification {0} is not in the feed")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// How a failed action is reflected back to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recovery {
    /// Leave the current view for a fixed recovery route.
    Redirect(String),
    /// Dismissible inline banner with the given message.
    Banner(String),
}

impl AppError {
    pub fn recovery(&self) -> Recovery {
        match self {
            AppError::Transport(_) => Recovery::Redirect(LOGIN_ROUTE.to_string()),
            AppError::Status { status, .. } => Recovery::Redirect(format!("/errors/{}", status)),
            AppError::Application(message) => Recovery::Banner(message.clone()),
            AppError::NotFound(_) => Recovery::Banner(self.to_string()),
            AppError::Malformed(e) => {
                tracing::error!("Malformed response: {}", e);
                Recovery::Banner(GENERIC_ERROR.to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                Recovery::Banner(GENERIC_ERROR.to_string())
            }
        }
    }

    /// The server-supplied message, if this is an application failure.
    pub fn application_message(&self) -> Option<&str> {
        match self {
            AppError::Application(message) => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::Transport(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_redirects_to_login() {
        let err = AppError::Transport("connection refused".into());
        assert_eq!(err.recovery(), Recovery::Redirect("/auth/login".into()));
    }

    #[test]
    fn test_status_redirects_to_error_page() {
        let err = AppError::Status {
            status: 403,
            message: "forbidden".into(),
        };
        assert_eq!(err.recovery(), Recovery::Redirect("/errors/403".into()));
    }

    #[test]
    fn test_application_message_shown_verbatim() {
        let err = AppError::Application("You have already marked this notification as read.".into());
        assert_eq!(
            err.recovery(),
            Recovery::Banner("You have already marked this notification as read.".into())
        );
        assert_eq!(
            err.application_message(),
            Some("You have already marked this notification as read.")
        );
    }

    #[test]
    fn test_malformed_fails_closed() {
        let err = AppError::Malformed("expected value at line 1".into());
        assert_eq!(err.recovery(), Recovery::Banner(GENERIC_ERROR.into()));
        assert!(err.application_message().is_none());
    }
}
