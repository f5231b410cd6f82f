//! # transport
//!
//! Stable interface over the SMB client library.
//! Each platform provides a single adapter implementing these traits, so that
//! changes in the upstream library never leak into the browser.

use remotefs::fs::{FileType, Metadata};

use crate::TransportResult;

// -- unix transport

#[cfg(all(target_family = "unix", feature = "libsmbclient"))]
mod unix;
#[cfg(all(target_family = "unix", feature = "libsmbclient"))]
pub use unix::{PavaoConnection, PavaoSession, PavaoShare, PavaoTransport};

/// Transport backed by the system SMB client
#[cfg(all(target_family = "unix", feature = "libsmbclient"))]
pub type SystemTransport = PavaoTransport;

// -- windows transport

#[cfg(target_family = "windows")]
mod windows;
#[cfg(target_family = "windows")]
pub use windows::{WindowsConnection, WindowsSession, WindowsShare, WindowsTransport};

/// Transport backed by the system SMB client
#[cfg(target_family = "windows")]
pub type SystemTransport = WindowsTransport;

/// Default SMB port
pub const DEFAULT_PORT: u16 = 445;

/// Release a transport resource.
///
/// Must be idempotent: closing an already closed resource returns `Ok(())`.
pub trait Close {
    fn close(&mut self) -> TransportResult<()>;
}

/// Opens transport connections towards a SMB server
pub trait SmbTransport {
    type Connection: SmbConnection;

    /// Open a connection to `host`
    fn connect(&self, host: &str) -> TransportResult<Self::Connection>;
}

/// An open, not yet authenticated, connection
pub trait SmbConnection: Close {
    type Session: SmbSession;

    /// Authenticate on the connection. No domain is sent unless configured on the transport.
    fn authenticate(&mut self, username: &str, password: &str) -> TransportResult<Self::Session>;
}

/// An authenticated session
pub trait SmbSession: Close {
    type Share: SmbShare;

    /// List every share exposed by the server, in server order
    fn list_shares(&mut self) -> TransportResult<Vec<ShareInfo>>;

    /// Connect to the share named `name`.
    /// Fails with [`crate::TransportErrorKind::ShareNotFound`] if it doesn't exist.
    fn connect_share(&mut self, name: &str) -> TransportResult<Self::Share>;
}

/// A connected share
pub trait SmbShare: Close {
    /// Kind of the share
    fn kind(&self) -> ShareKind;

    /// List the entries at the root of the share, in server order
    fn list_root(&mut self) -> TransportResult<Vec<ShareEntry>>;

    /// Stat the entry named `name` at the root of the share
    fn stat(&mut self, name: &str) -> TransportResult<Metadata>;
}

/// Options shared by every transport
#[derive(Debug, Default, Clone)]
pub struct TransportOptions {
    pub(crate) port: Option<u16>,
    pub(crate) workgroup: Option<String>,
}

impl TransportOptions {
    /// Set the server port. [`DEFAULT_PORT`] is used otherwise.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the workgroup (or domain) to authenticate in.
    /// By default no domain is sent.
    pub fn workgroup<S: AsRef<str>>(mut self, workgroup: S) -> Self {
        self.workgroup = Some(workgroup.as_ref().to_string());
        self
    }

    /// Get the configured port, or the default one
    pub fn get_port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

/// Kind of a share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareKind {
    /// Share backed by a filesystem tree
    Disk,
    Printer,
    /// Communication device
    Device,
    /// Inter-process communication endpoint
    Ipc,
    Unknown,
}

/// Share exposed by a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareInfo {
    pub name: String,
    pub kind: ShareKind,
    pub comment: Option<String>,
}

impl ShareInfo {
    pub fn new<S: AsRef<str>>(name: S, kind: ShareKind) -> Self {
        Self {
            name: name.as_ref().to_string(),
            kind,
            comment: None,
        }
    }

    /// Construct ShareInfo with the provided comment; empty comments are discarded
    pub fn comment<S: AsRef<str>>(mut self, comment: S) -> Self {
        let comment = comment.as_ref();
        self.comment = (!comment.is_empty()).then(|| comment.to_string());
        self
    }

    /// Returns whether this is an administrative share (name ending with `$`)
    pub fn is_administrative(&self) -> bool {
        self.name.ends_with('$')
    }
}

/// Entry at the root of a share
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareEntry {
    pub name: String,
    pub file_type: FileType,
}

impl ShareEntry {
    pub fn new<S: AsRef<str>>(name: S, file_type: FileType) -> Self {
        Self {
            name: name.as_ref().to_string(),
            file_type,
        }
    }

    /// Returns whether this is the `.` or `..` pseudo entry
    pub fn is_pseudo(&self) -> bool {
        self.name == "." || self.name == ".."
    }
}
