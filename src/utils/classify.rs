//! # classify
//!
//! Map low level failures onto `TransportErrorKind`

use std::error::Error;
use std::io;

use crate::{TransportError, TransportErrorKind};

/// Classify an error, looking for an `io::Error` in its source chain.
/// If none is found, the error message is inspected instead.
pub fn classify_error(err: &(dyn Error + 'static)) -> TransportError {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return TransportError::new(classify_io_error(io_err), err);
        }
        current = e.source();
    }
    let msg = err.to_string();
    TransportError::new(classify_message(&msg), msg)
}

/// Classify an `io::Error` on its os error code, then on its kind
pub fn classify_io_error(err: &io::Error) -> TransportErrorKind {
    if let Some(kind) = err.raw_os_error().and_then(classify_os_error) {
        return kind;
    }
    match err.kind() {
        io::ErrorKind::ConnectionRefused | io::ErrorKind::TimedOut => {
            TransportErrorKind::Unreachable
        }
        io::ErrorKind::PermissionDenied => TransportErrorKind::AuthenticationFailed,
        io::ErrorKind::NotFound => TransportErrorKind::ShareNotFound,
        _ => TransportErrorKind::Io,
    }
}

/// libsmbclient reports NT status codes as errno values:
/// logon failure is `EPERM`, access denied is `EACCES`, bad network name is `ENOENT` or `ENODEV`.
#[cfg(target_family = "unix")]
fn classify_os_error(code: i32) -> Option<TransportErrorKind> {
    match code {
        libc::EPERM | libc::EACCES => Some(TransportErrorKind::AuthenticationFailed),
        libc::ENOENT | libc::ENODEV | libc::ENXIO => Some(TransportErrorKind::ShareNotFound),
        libc::ECONNREFUSED
        | libc::EHOSTUNREACH
        | libc::EHOSTDOWN
        | libc::ENETUNREACH
        | libc::ENETDOWN
        | libc::ETIMEDOUT => Some(TransportErrorKind::Unreachable),
        _ => None,
    }
}

#[cfg(target_family = "windows")]
fn classify_os_error(code: i32) -> Option<TransportErrorKind> {
    use windows_sys::Win32::Foundation::{
        ERROR_ACCESS_DENIED, ERROR_ACCOUNT_DISABLED, ERROR_ACCOUNT_RESTRICTION, ERROR_BAD_NETPATH,
        ERROR_BAD_NET_NAME, ERROR_CONNECTION_REFUSED, ERROR_HOST_UNREACHABLE,
        ERROR_INVALID_PASSWORD, ERROR_LOGON_FAILURE, ERROR_NETWORK_UNREACHABLE, ERROR_SEM_TIMEOUT,
    };

    match code as u32 {
        ERROR_LOGON_FAILURE
        | ERROR_ACCESS_DENIED
        | ERROR_INVALID_PASSWORD
        | ERROR_ACCOUNT_RESTRICTION
        | ERROR_ACCOUNT_DISABLED => Some(TransportErrorKind::AuthenticationFailed),
        ERROR_BAD_NET_NAME => Some(TransportErrorKind::ShareNotFound),
        ERROR_BAD_NETPATH
        | ERROR_HOST_UNREACHABLE
        | ERROR_NETWORK_UNREACHABLE
        | ERROR_CONNECTION_REFUSED
        | ERROR_SEM_TIMEOUT => Some(TransportErrorKind::Unreachable),
        _ => None,
    }
}

#[cfg(not(any(target_family = "unix", target_family = "windows")))]
fn classify_os_error(_code: i32) -> Option<TransportErrorKind> {
    None
}

/// Last resort classification, on NT status names found in the message
pub fn classify_message(msg: &str) -> TransportErrorKind {
    const AUTH: &[&str] = &[
        "STATUS_LOGON_FAILURE",
        "STATUS_ACCESS_DENIED",
        "STATUS_WRONG_PASSWORD",
        "Authentication failed",
    ];
    const NOT_FOUND: &[&str] = &["STATUS_BAD_NETWORK_NAME", "STATUS_OBJECT_NAME_NOT_FOUND"];
    const UNREACHABLE: &[&str] = &[
        "STATUS_HOST_UNREACHABLE",
        "STATUS_CONNECTION_REFUSED",
        "STATUS_IO_TIMEOUT",
    ];
    if AUTH.iter().any(|s| msg.contains(s)) {
        TransportErrorKind::AuthenticationFailed
    } else if NOT_FOUND.iter().any(|s| msg.contains(s)) {
        TransportErrorKind::ShareNotFound
    } else if UNREACHABLE.iter().any(|s| msg.contains(s)) {
        TransportErrorKind::Unreachable
    } else {
        TransportErrorKind::Other
    }
}

#[cfg(test)]
mod test {

    use std::fmt;

    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Debug)]
    struct Wrapper(io::Error);

    impl fmt::Display for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped: {}", self.0)
        }
    }

    impl Error for Wrapper {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[derive(Debug)]
    struct Opaque(&'static str);

    impl fmt::Display for Opaque {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl Error for Opaque {}

    #[test]
    fn should_classify_io_error_kinds() {
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::ConnectionRefused)),
            TransportErrorKind::Unreachable
        );
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::TimedOut)),
            TransportErrorKind::Unreachable
        );
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::PermissionDenied)),
            TransportErrorKind::AuthenticationFailed
        );
        assert_eq!(
            classify_io_error(&io::Error::from(io::ErrorKind::BrokenPipe)),
            TransportErrorKind::Io
        );
    }

    #[test]
    #[cfg(target_family = "unix")]
    fn should_classify_errno() {
        assert_eq!(
            classify_io_error(&io::Error::from_raw_os_error(libc::EPERM)),
            TransportErrorKind::AuthenticationFailed
        );
        assert_eq!(
            classify_io_error(&io::Error::from_raw_os_error(libc::EACCES)),
            TransportErrorKind::AuthenticationFailed
        );
        assert_eq!(
            classify_io_error(&io::Error::from_raw_os_error(libc::ENOENT)),
            TransportErrorKind::ShareNotFound
        );
        assert_eq!(
            classify_io_error(&io::Error::from_raw_os_error(libc::EHOSTUNREACH)),
            TransportErrorKind::Unreachable
        );
        assert_eq!(
            classify_io_error(&io::Error::from_raw_os_error(libc::EIO)),
            TransportErrorKind::Io
        );
    }

    #[test]
    fn should_classify_source_chain() {
        let err = Wrapper(io::Error::from(io::ErrorKind::ConnectionRefused));
        let classified = classify_error(&err);
        assert_eq!(classified.kind(), TransportErrorKind::Unreachable);
        assert!(classified.detail().starts_with("wrapped: "));
    }

    #[test]
    fn should_fallback_to_message() {
        let err = Opaque("tree connect failed: STATUS_BAD_NETWORK_NAME");
        assert_eq!(classify_error(&err).kind(), TransportErrorKind::ShareNotFound);
        let err = Opaque("session setup: STATUS_LOGON_FAILURE");
        assert_eq!(
            classify_error(&err).kind(),
            TransportErrorKind::AuthenticationFailed
        );
        let err = Opaque("something odd happened");
        assert_eq!(classify_error(&err).kind(), TransportErrorKind::Other);
    }
}
