//! Process exit codes
//!
//! Scripts can branch on these without parsing output.

use vblob_core::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    /// Anything not covered below
    GeneralError = 1,
    /// Bad arguments or input rejected before any request
    UsageError = 2,
    /// The service could not be reached, or kept failing
    NetworkError = 3,
    /// Token missing, rejected or expired
    AuthError = 4,
    NotFound = 5,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl From<&Error> for ExitCode {
    fn from(error: &Error) -> Self {
        match error {
            Error::Validation(_) | Error::Config(_) => ExitCode::UsageError,
            Error::Auth(_) => ExitCode::AuthError,
            Error::NotFound(_) => ExitCode::NotFound,
            Error::Network(_) | Error::TransientStatus { .. } => ExitCode::NetworkError,
            Error::Upload { status, .. }
            | Error::Commit { status, .. }
            | Error::Request { status, .. } => match status {
                None => ExitCode::NetworkError,
                Some(404) => ExitCode::NotFound,
                Some(401 | 403) => ExitCode::AuthError,
                Some(s) if *s >= 500 => ExitCode::NetworkError,
                Some(_) => ExitCode::GeneralError,
            },
            Error::Parse(_) | Error::Io(_) | Error::Json(_) => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::NotFound.as_i32(), 5);
    }

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            ExitCode::from(&Error::Validation("empty pathname".into())),
            ExitCode::UsageError
        );
        assert_eq!(ExitCode::from(&Error::Auth("forbidden".into())), ExitCode::AuthError);
        assert_eq!(
            ExitCode::from(&Error::Upload {
                status: None,
                body: "connection reset".into()
            }),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&Error::Request {
                status: Some(404),
                body: String::new()
            }),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from(&Error::Commit {
                status: Some(503),
                body: String::new()
            }),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from(&Error::Upload {
                status: Some(400),
                body: String::new()
            }),
            ExitCode::GeneralError
        );
    }
}
