//! # UNIX transport
//!
//! SMB transport built on libsmbclient through `pavao`.
//!
//! libsmbclient connects and authenticates lazily, on the first operation.
//! Authentication is therefore verified by listing the server root, which
//! requires both a working transport and a valid logon.

use pavao::{SmbClient, SmbCredentials, SmbOptions};
use remotefs::fs::Metadata;

use super::{
    Close, ShareEntry, ShareInfo, ShareKind, SmbConnection, SmbSession, SmbShare, SmbTransport,
    TransportOptions,
};
use crate::utils::smb as smb_utils;
use crate::{TransportError, TransportErrorKind, TransportResult};

/// SMB transport backed by libsmbclient
#[derive(Debug, Default, Clone)]
pub struct PavaoTransport {
    options: TransportOptions,
}

impl PavaoTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

impl SmbTransport for PavaoTransport {
    type Connection = PavaoConnection;

    fn connect(&self, host: &str) -> TransportResult<PavaoConnection> {
        let server = format!("smb://{}:{}", host, self.options.get_port());
        trace!("preparing connection to {}", server);
        Ok(PavaoConnection {
            target: Target {
                server,
                workgroup: self.options.workgroup.clone(),
            },
            open: true,
        })
    }
}

/// Server address and workgroup
#[derive(Debug, Clone)]
struct Target {
    server: String,
    workgroup: Option<String>,
}

impl Target {
    fn credentials(&self, share: &str, username: &str, password: &str) -> SmbCredentials {
        let credentials = SmbCredentials::default()
            .server(&self.server)
            .share(share)
            .username(username)
            .password(password);
        match &self.workgroup {
            Some(workgroup) => credentials.workgroup(workgroup),
            None => credentials,
        }
    }
}

/// Server address waiting for credentials
pub struct PavaoConnection {
    target: Target,
    open: bool,
}

impl Close for PavaoConnection {
    fn close(&mut self) -> TransportResult<()> {
        self.open = false;
        Ok(())
    }
}

impl SmbConnection for PavaoConnection {
    type Session = PavaoSession;

    fn authenticate(&mut self, username: &str, password: &str) -> TransportResult<PavaoSession> {
        if !self.open {
            return Err(TransportError::new(
                TransportErrorKind::Other,
                "connection is closed",
            ));
        }
        trace!("authenticating on {} as {}", self.target.server, username);
        let client = SmbClient::new(self.target.credentials("", username, password), options())
            .map_err(smb_utils::classify_smb_error)?;
        let shares = list_server_root(&client)?;
        debug!("authenticated on {}", self.target.server);
        Ok(PavaoSession {
            client: Some(client),
            shares: Some(shares),
            target: self.target.clone(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Authenticated libsmbclient context on the server root.
///
/// libsmbclient keeps a single context per process, shared with every `PavaoShare`
/// opened from this session: shares must be closed before their session.
pub struct PavaoSession {
    client: Option<SmbClient>,
    /// Shares listed while authenticating
    shares: Option<Vec<ShareInfo>>,
    target: Target,
    username: String,
    password: String,
}

impl PavaoSession {
    fn client(&self) -> TransportResult<&SmbClient> {
        self.client
            .as_ref()
            .ok_or_else(|| TransportError::new(TransportErrorKind::Other, "session is closed"))
    }

    fn shares(&mut self) -> TransportResult<Vec<ShareInfo>> {
        match self.shares.take() {
            Some(shares) => Ok(shares),
            None => list_server_root(self.client()?),
        }
    }
}

impl Close for PavaoSession {
    fn close(&mut self) -> TransportResult<()> {
        // dropping the context releases the libsmbclient connection
        if self.client.take().is_some() {
            trace!("session closed");
        }
        Ok(())
    }
}

impl SmbSession for PavaoSession {
    type Share = PavaoShare;

    fn list_shares(&mut self) -> TransportResult<Vec<ShareInfo>> {
        self.client()?;
        self.shares()
    }

    fn connect_share(&mut self, name: &str) -> TransportResult<PavaoShare> {
        let shares = self.shares()?;
        let kind = shares
            .iter()
            .find(|share| share.name == name)
            .map(|share| share.kind);
        // keep the listing for later calls on this session
        self.shares = Some(shares);
        let kind = kind.ok_or_else(|| {
            TransportError::new(
                TransportErrorKind::ShareNotFound,
                format!("no share named '{name}'"),
            )
        })?;
        trace!("connecting to share {} ({:?})", name, kind);
        let credentials =
            self.target
                .credentials(&format!("/{name}"), &self.username, &self.password);
        let client =
            SmbClient::new(credentials, options()).map_err(smb_utils::classify_smb_error)?;
        Ok(PavaoShare {
            client: Some(client),
            kind,
        })
    }
}

/// libsmbclient context on a single share.
///
/// It shares the libsmbclient context of the session which opened it; dropping it
/// frees that context, so close it before the session.
pub struct PavaoShare {
    client: Option<SmbClient>,
    kind: ShareKind,
}

impl PavaoShare {
    fn client(&self) -> TransportResult<&SmbClient> {
        self.client
            .as_ref()
            .ok_or_else(|| TransportError::new(TransportErrorKind::Other, "share is closed"))
    }
}

impl Close for PavaoShare {
    fn close(&mut self) -> TransportResult<()> {
        if self.client.take().is_some() {
            trace!("share closed");
        }
        Ok(())
    }
}

impl SmbShare for PavaoShare {
    fn kind(&self) -> ShareKind {
        self.kind
    }

    fn list_root(&mut self) -> TransportResult<Vec<ShareEntry>> {
        trace!("listing share root");
        let dirents = self
            .client()?
            .list_dir("/")
            .map_err(smb_utils::classify_smb_error)?;
        Ok(dirents
            .iter()
            .filter_map(smb_utils::dirent_to_entry)
            .collect())
    }

    fn stat(&mut self, name: &str) -> TransportResult<Metadata> {
        let path = format!("/{name}");
        trace!("get stat for {}", path);
        self.client()?
            .stat(path.as_str())
            .map_err(smb_utils::classify_smb_error)
            .map(smb_utils::smbstat_to_metadata)
    }
}

fn options() -> SmbOptions {
    SmbOptions::default()
        .case_sensitive(false)
        .one_share_per_server(true)
}

/// List the server root: this is where libsmbclient exposes shares
fn list_server_root(client: &SmbClient) -> TransportResult<Vec<ShareInfo>> {
    let dirents = client.list_dir("").map_err(|e| {
        let err = smb_utils::classify_smb_error(e);
        error!("could not list server root: {}", err);
        err
    })?;
    Ok(dirents
        .iter()
        .filter_map(smb_utils::dirent_to_share)
        .collect())
}
