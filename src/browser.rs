//! # browser
//!
//! Share enumeration on top of a [`SmbTransport`]

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;

use remotefs::File;

use crate::transport::{
    Close, ShareEntry, ShareInfo, ShareKind, SmbConnection, SmbSession, SmbShare, SmbTransport,
};
use crate::{BrowseError, BrowseResult, Credentials, TransportError, TransportErrorKind};

/// Share handle type produced by the transport `T`
type ShareOf<T> =
    <<<T as SmbTransport>::Connection as SmbConnection>::Session as SmbSession>::Share;

/// Lists the shares of a SMB server and the root entries of a share.
///
/// Every call opens its own connection and session, and releases them before
/// returning, whatever the outcome. Calls are blocking: run them off any
/// latency-sensitive thread.
#[derive(Debug, Default, Clone)]
pub struct ShareBrowser<T: SmbTransport> {
    transport: T,
}

impl<T: SmbTransport> ShareBrowser<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Return a reference to the inner transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// List the names of the shares exposed by the server, in server order.
    /// Administrative shares (ending with `$`) are excluded.
    pub fn list_shares(&self, credentials: &Credentials) -> BrowseResult<Vec<String>> {
        self.list_share_info(credentials)
            .map(|shares| shares.into_iter().map(|share| share.name).collect())
    }

    /// Same as [`Self::list_shares`], but keeps kind and comment of each share
    pub fn list_share_info(&self, credentials: &Credentials) -> BrowseResult<Vec<ShareInfo>> {
        let (username, password) = validate_credentials(credentials)?;
        let host = credentials.host();
        trace!("listing shares on {}", host);
        let mut connection = Scoped::new(
            self.transport
                .connect(host)
                .map_err(|e| map_error(host, None, e))?,
            "connection",
        );
        let mut session = Scoped::new(
            connection
                .authenticate(username, password)
                .map_err(|e| map_error(host, None, e))?,
            "session",
        );
        let shares: Vec<ShareInfo> = session
            .list_shares()
            .map_err(|e| map_error(host, None, e))?
            .into_iter()
            .filter(|share| !share.is_administrative())
            .collect();
        debug!("found {} shares on {}", shares.len(), host);
        Ok(shares)
    }

    /// List the names of the entries at the root of the disk share `share`, in server order.
    /// The `.` and `..` pseudo entries are excluded.
    pub fn list_entries(
        &self,
        credentials: &Credentials,
        share: &str,
    ) -> BrowseResult<Vec<String>> {
        self.with_disk_share(credentials, share, |handle| {
            Ok(list_root(handle)?
                .into_iter()
                .map(|entry| entry.name)
                .collect())
        })
    }

    /// Same as [`Self::list_entries`], but stats each entry.
    /// Files are returned with path `/<name>`.
    pub fn list_entry_files(
        &self,
        credentials: &Credentials,
        share: &str,
    ) -> BrowseResult<Vec<File>> {
        self.with_disk_share(credentials, share, |handle| {
            list_root(handle)?
                .into_iter()
                .map(|entry| -> Result<File, TransportError> {
                    let metadata = handle.stat(&entry.name)?;
                    Ok(File {
                        path: PathBuf::from(format!("/{}", entry.name)),
                        metadata,
                    })
                })
                .collect()
        })
    }

    // -- private

    /// Connect, authenticate and open the disk share `share`, then run `f` on it
    fn with_disk_share<F, R>(
        &self,
        credentials: &Credentials,
        share: &str,
        f: F,
    ) -> BrowseResult<R>
    where
        F: FnOnce(&mut ShareOf<T>) -> Result<R, TransportError>,
    {
        let (username, password) = validate_credentials(credentials)?;
        if share.trim().is_empty() {
            return Err(BrowseError::invalid_argument("share name must not be blank"));
        }
        let host = credentials.host();
        trace!("listing entries of share {} on {}", share, host);
        let mut connection = Scoped::new(
            self.transport
                .connect(host)
                .map_err(|e| map_error(host, None, e))?,
            "connection",
        );
        // the share is only involved from `connect_share` on
        let mut session = Scoped::new(
            connection
                .authenticate(username, password)
                .map_err(|e| map_error(host, None, e))?,
            "session",
        );
        let mut handle = Scoped::new(
            session
                .connect_share(share)
                .map_err(|e| map_error(host, Some(share), e))?,
            "share",
        );
        let kind = handle.kind();
        if kind != ShareKind::Disk {
            error!("share {} on {} is a {:?} share", share, host, kind);
            return Err(BrowseError::connection(format!(
                "share '{share}' is not a disk share"
            )));
        }
        let result = f(&mut *handle).map_err(|e| map_error(host, Some(share), e))?;
        debug!("listed share {} on {}", share, host);
        Ok(result)
    }
}

/// List the root of `share`, without pseudo entries
fn list_root<S: SmbShare>(share: &mut S) -> Result<Vec<ShareEntry>, TransportError> {
    Ok(share
        .list_root()?
        .into_iter()
        .filter(|entry| !entry.is_pseudo())
        .collect())
}

/// Check required parameters; returns username and password
fn validate_credentials(credentials: &Credentials) -> BrowseResult<(&str, &str)> {
    if credentials.host.trim().is_empty() {
        return Err(BrowseError::invalid_argument("host must not be blank"));
    }
    let username = match credentials.username.as_deref() {
        Some(username) if !username.trim().is_empty() => username,
        _ => return Err(BrowseError::invalid_argument("username must not be blank")),
    };
    let password = credentials
        .password
        .as_deref()
        .ok_or_else(|| BrowseError::invalid_argument("password must be provided"))?;
    Ok((username, password))
}

/// Map a transport failure onto a `BrowseError`.
/// `share` is set when the operation targets a share.
fn map_error(host: &str, share: Option<&str>, err: TransportError) -> BrowseError {
    error!("SMB operation on {} failed: {}", host, err);
    let detail = err.detail();
    match (err.kind(), share) {
        (TransportErrorKind::AuthenticationFailed, _) => {
            BrowseError::authentication(format!("{host} rejected the logon: {detail}"))
        }
        (TransportErrorKind::Unreachable, _) => {
            BrowseError::connection(format!("could not connect to SMB server {host}: {detail}"))
        }
        (TransportErrorKind::ShareNotFound, Some(share)) => {
            BrowseError::connection(format!("share '{share}' does not exist"))
        }
        (TransportErrorKind::ShareNotFound, None) => {
            BrowseError::connection(format!("SMB protocol error on {host}: {detail}"))
        }
        (TransportErrorKind::Io, _) => {
            BrowseError::connection(format!("I/O error while talking to {host}: {detail}"))
        }
        (TransportErrorKind::Other, _) => {
            BrowseError::connection(format!("unexpected error on {host}: {detail}"))
        }
    }
}

/// Closes the wrapped resource when dropped.
/// Close failures are logged and never replace the result of the operation.
struct Scoped<R: Close> {
    resource: R,
    name: &'static str,
}

impl<R: Close> Scoped<R> {
    fn new(resource: R, name: &'static str) -> Self {
        Self { resource, name }
    }
}

impl<R: Close> Deref for Scoped<R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.resource
    }
}

impl<R: Close> DerefMut for Scoped<R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut self.resource
    }
}

impl<R: Close> Drop for Scoped<R> {
    fn drop(&mut self) {
        trace!("closing {}", self.name);
        if let Err(err) = self.resource.close() {
            warn!("failed to close {}: {}", self.name, err);
        }
    }
}
