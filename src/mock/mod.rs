//! ## Mock
//!
//! Contains mock for test units

use std::cell::RefCell;
use std::rc::Rc;

use remotefs::fs::{FileType, Metadata};

use crate::transport::{
    Close, ShareEntry, ShareInfo, ShareKind, SmbConnection, SmbSession, SmbShare, SmbTransport,
};
use crate::{TransportError, TransportErrorKind, TransportResult};

// -- logger

#[allow(dead_code)]
pub fn logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// -- transport

type Events = Rc<RefCell<Vec<String>>>;

/// In-memory transport recording every call it receives.
/// Clones share the same event log.
#[derive(Debug, Default, Clone)]
pub struct StubTransport {
    shares: Vec<ShareInfo>,
    entries: Vec<ShareEntry>,
    connect_error: Option<TransportErrorKind>,
    authenticate_error: Option<TransportErrorKind>,
    listing_error: Option<TransportErrorKind>,
    stat_error: Option<TransportErrorKind>,
    close_error: bool,
    events: Events,
}

impl StubTransport {
    /// Add a share exposed by the server
    pub fn share(mut self, name: &str, kind: ShareKind) -> Self {
        self.shares.push(ShareInfo::new(name, kind));
        self
    }

    /// Add an entry at the root of every share
    pub fn entry(mut self, name: &str, file_type: FileType) -> Self {
        self.entries.push(ShareEntry::new(name, file_type));
        self
    }

    pub fn fail_connect(mut self, kind: TransportErrorKind) -> Self {
        self.connect_error = Some(kind);
        self
    }

    pub fn fail_authenticate(mut self, kind: TransportErrorKind) -> Self {
        self.authenticate_error = Some(kind);
        self
    }

    /// Make both share listing and root listing fail
    pub fn fail_listing(mut self, kind: TransportErrorKind) -> Self {
        self.listing_error = Some(kind);
        self
    }

    pub fn fail_stat(mut self, kind: TransportErrorKind) -> Self {
        self.stat_error = Some(kind);
        self
    }

    /// Make every close fail
    pub fn fail_close(mut self) -> Self {
        self.close_error = true;
        self
    }

    /// Recorded events, in order
    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    /// Number of times `event` was recorded
    pub fn count(&self, event: &str) -> usize {
        self.events.borrow().iter().filter(|e| *e == event).count()
    }

    fn record(&self, event: &str) {
        self.events.borrow_mut().push(event.to_string());
    }

    fn check(&self, error: Option<TransportErrorKind>) -> TransportResult<()> {
        match error {
            Some(kind) => Err(TransportError::new(kind, "stub failure")),
            None => Ok(()),
        }
    }

    fn release(&self, event: &str) -> TransportResult<()> {
        self.record(event);
        if self.close_error {
            Err(TransportError::new(TransportErrorKind::Io, "stub close failure"))
        } else {
            Ok(())
        }
    }
}

impl SmbTransport for StubTransport {
    type Connection = StubConnection;

    fn connect(&self, _host: &str) -> TransportResult<StubConnection> {
        self.record("connect");
        self.check(self.connect_error)?;
        Ok(StubConnection(self.clone()))
    }
}

pub struct StubConnection(StubTransport);

impl Close for StubConnection {
    fn close(&mut self) -> TransportResult<()> {
        self.0.release("close connection")
    }
}

impl SmbConnection for StubConnection {
    type Session = StubSession;

    fn authenticate(&mut self, _username: &str, _password: &str) -> TransportResult<StubSession> {
        self.0.record("authenticate");
        self.0.check(self.0.authenticate_error)?;
        Ok(StubSession(self.0.clone()))
    }
}

pub struct StubSession(StubTransport);

impl Close for StubSession {
    fn close(&mut self) -> TransportResult<()> {
        self.0.release("close session")
    }
}

impl SmbSession for StubSession {
    type Share = StubShare;

    fn list_shares(&mut self) -> TransportResult<Vec<ShareInfo>> {
        self.0.record("list_shares");
        self.0.check(self.0.listing_error)?;
        Ok(self.0.shares.clone())
    }

    fn connect_share(&mut self, name: &str) -> TransportResult<StubShare> {
        self.0.record("connect_share");
        let kind = self
            .0
            .shares
            .iter()
            .find(|share| share.name == name)
            .map(|share| share.kind)
            .ok_or_else(|| {
                TransportError::new(TransportErrorKind::ShareNotFound, "STATUS_BAD_NETWORK_NAME")
            })?;
        Ok(StubShare {
            transport: self.0.clone(),
            kind,
        })
    }
}

pub struct StubShare {
    transport: StubTransport,
    kind: ShareKind,
}

impl Close for StubShare {
    fn close(&mut self) -> TransportResult<()> {
        self.transport.release("close share")
    }
}

impl SmbShare for StubShare {
    fn kind(&self) -> ShareKind {
        self.kind
    }

    fn list_root(&mut self) -> TransportResult<Vec<ShareEntry>> {
        self.transport.record("list_root");
        self.transport.check(self.transport.listing_error)?;
        Ok(self.transport.entries.clone())
    }

    fn stat(&mut self, name: &str) -> TransportResult<Metadata> {
        self.transport.record("stat");
        self.transport.check(self.transport.stat_error)?;
        self.transport
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| Metadata::default().file_type(entry.file_type.clone()))
            .ok_or_else(|| TransportError::new(TransportErrorKind::Io, "no such entry"))
    }
}
