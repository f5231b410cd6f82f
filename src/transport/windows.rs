//! # Windows transport
//!
//! SMB transport built on the Windows networking API.
//! Sessions are established with `WNetAddConnection2W` on the `IPC$` share,
//! shares are enumerated with `NetShareEnum` and share contents are read
//! through UNC paths.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::iter::once;
use std::net::TcpStream;
use std::os::windows::ffi::OsStrExt;
use std::path::PathBuf;
use std::ptr;

use remotefs::fs::{FileType, Metadata};
use windows_sys::Win32::Foundation::{NO_ERROR, TRUE};
use windows_sys::Win32::NetworkManagement::NetManagement::{
    NetApiBufferFree, MAX_PREFERRED_LENGTH,
};
use windows_sys::Win32::NetworkManagement::WNet::{
    WNetAddConnection2W, WNetCancelConnection2W, NETRESOURCEW, RESOURCETYPE_ANY,
};
use windows_sys::Win32::Storage::FileSystem::{
    NetShareEnum, SHARE_INFO_1, STYPE_DEVICE, STYPE_DISKTREE, STYPE_IPC, STYPE_PRINTQ,
};

use super::{
    Close, ShareEntry, ShareInfo, ShareKind, SmbConnection, SmbSession, SmbShare, SmbTransport,
    TransportOptions,
};
use crate::utils::classify;
use crate::{TransportError, TransportErrorKind, TransportResult};

/// SMB transport backed by the Windows networking API.
///
/// The configured port is only used to probe the server; Windows always
/// reaches SMB shares on the default port.
#[derive(Debug, Default, Clone)]
pub struct WindowsTransport {
    options: TransportOptions,
}

impl WindowsTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self { options }
    }
}

impl SmbTransport for WindowsTransport {
    type Connection = WindowsConnection;

    fn connect(&self, host: &str) -> TransportResult<WindowsConnection> {
        let port = self.options.get_port();
        trace!("probing {}:{}", host, port);
        // any failure at this stage means the server can't be reached
        TcpStream::connect((host, port))
            .map_err(|e| TransportError::new(TransportErrorKind::Unreachable, e))?;
        Ok(WindowsConnection {
            host: host.to_string(),
            workgroup: self.options.workgroup.clone(),
        })
    }
}

/// Reachable server, not yet authenticated
pub struct WindowsConnection {
    host: String,
    workgroup: Option<String>,
}

impl Close for WindowsConnection {
    fn close(&mut self) -> TransportResult<()> {
        // the probe stream is already gone
        Ok(())
    }
}

impl SmbConnection for WindowsConnection {
    type Session = WindowsSession;

    fn authenticate(&mut self, username: &str, password: &str) -> TransportResult<WindowsSession> {
        let remote = format!(r"\\{}\IPC$", self.host);
        let username = match &self.workgroup {
            Some(workgroup) => format!(r"{workgroup}\{username}"),
            None => username.to_string(),
        };
        trace!("authenticating on {} as {}", remote, username);
        let mut remote_w = to_wide(&remote);
        let password_w = to_wide(password);
        let username_w = to_wide(&username);
        // SAFETY: a zeroed NETRESOURCEW is valid; every string outlives the call
        let result = unsafe {
            let mut resource: NETRESOURCEW = std::mem::zeroed();
            resource.dwType = RESOURCETYPE_ANY;
            resource.lpRemoteName = remote_w.as_mut_ptr();
            WNetAddConnection2W(&resource, password_w.as_ptr(), username_w.as_ptr(), 0)
        };
        if result != NO_ERROR {
            let err = win32_error(result);
            error!("could not authenticate on {}: {}", remote, err);
            return Err(err);
        }
        debug!("authenticated on {}", remote);
        Ok(WindowsSession {
            host: self.host.clone(),
            remote: Some(remote_w),
        })
    }
}

/// Authenticated IPC$ connection
pub struct WindowsSession {
    host: String,
    /// Wide remote name of the IPC$ connection; `None` once cancelled
    remote: Option<Vec<u16>>,
}

impl WindowsSession {
    fn check_open(&self) -> TransportResult<()> {
        match self.remote {
            Some(_) => Ok(()),
            None => Err(TransportError::new(
                TransportErrorKind::Other,
                "session is closed",
            )),
        }
    }
}

impl Close for WindowsSession {
    fn close(&mut self) -> TransportResult<()> {
        if let Some(remote) = self.remote.take() {
            trace!("cancelling IPC$ connection on {}", self.host);
            // SAFETY: remote is a nul terminated wide string
            let result = unsafe { WNetCancelConnection2W(remote.as_ptr(), 0, TRUE) };
            if result != NO_ERROR {
                return Err(win32_error(result));
            }
        }
        Ok(())
    }
}

impl SmbSession for WindowsSession {
    type Share = WindowsShare;

    fn list_shares(&mut self) -> TransportResult<Vec<ShareInfo>> {
        self.check_open()?;
        net_share_enum(&self.host)
    }

    fn connect_share(&mut self, name: &str) -> TransportResult<WindowsShare> {
        self.check_open()?;
        let kind = net_share_enum(&self.host)?
            .into_iter()
            .find(|share| share.name.eq_ignore_ascii_case(name))
            .map(|share| share.kind)
            .ok_or_else(|| {
                TransportError::new(
                    TransportErrorKind::ShareNotFound,
                    format!("no share named '{name}'"),
                )
            })?;
        Ok(WindowsShare {
            root: PathBuf::from(format!(r"\\{}\{}\", self.host, name)),
            kind,
        })
    }
}

/// Share reached through its UNC path
pub struct WindowsShare {
    root: PathBuf,
    kind: ShareKind,
}

impl Close for WindowsShare {
    fn close(&mut self) -> TransportResult<()> {
        Ok(())
    }
}

impl SmbShare for WindowsShare {
    fn kind(&self) -> ShareKind {
        self.kind
    }

    fn list_root(&mut self) -> TransportResult<Vec<ShareEntry>> {
        trace!("listing files at {}", self.root.display());
        fs::read_dir(&self.root)
            .map_err(io_error)?
            .map(|entry| -> TransportResult<ShareEntry> {
                let entry = entry.map_err(io_error)?;
                let file_type = entry.file_type().map_err(io_error)?;
                Ok(ShareEntry::new(
                    entry.file_name().to_string_lossy(),
                    get_file_type(&file_type),
                ))
            })
            .collect()
    }

    fn stat(&mut self, name: &str) -> TransportResult<Metadata> {
        let path = self.root.join(name);
        trace!("get stat for {}", path.display());
        let stat = fs::symlink_metadata(&path).map_err(io_error)?;
        let mut metadata = Metadata::default()
            .file_type(get_file_type(&stat.file_type()))
            .size(stat.len());
        if let Ok(accessed) = stat.accessed() {
            metadata = metadata.accessed(accessed);
        }
        if let Ok(created) = stat.created() {
            metadata = metadata.created(created);
        }
        if let Ok(modified) = stat.modified() {
            metadata = metadata.modified(modified);
        }
        Ok(metadata)
    }
}

fn get_file_type(file_type: &fs::FileType) -> FileType {
    if file_type.is_dir() {
        FileType::Directory
    } else if file_type.is_symlink() {
        FileType::Symlink
    } else {
        FileType::File
    }
}

/// Enumerate the shares of `host` at info level 1 (name, type, remark)
fn net_share_enum(host: &str) -> TransportResult<Vec<ShareInfo>> {
    let server = to_wide(&format!(r"\\{host}"));
    let mut buffer: *mut u8 = ptr::null_mut();
    let mut read: u32 = 0;
    let mut total: u32 = 0;
    trace!("enumerating shares on {}", host);
    // SAFETY: out pointers are valid; buffer is freed below with NetApiBufferFree
    let result = unsafe {
        NetShareEnum(
            server.as_ptr(),
            1,
            &mut buffer,
            MAX_PREFERRED_LENGTH,
            &mut read,
            &mut total,
            ptr::null_mut(),
        )
    };
    if result != NO_ERROR {
        return Err(win32_error(result));
    }
    let shares = if buffer.is_null() {
        Vec::new()
    } else {
        // SAFETY: on success buffer holds `read` SHARE_INFO_1 structures
        let infos =
            unsafe { std::slice::from_raw_parts(buffer as *const SHARE_INFO_1, read as usize) };
        infos
            .iter()
            .map(|info| {
                let name = unsafe { from_wide_ptr(info.shi1_netname) };
                let remark = unsafe { from_wide_ptr(info.shi1_remark) };
                ShareInfo::new(name, share_kind(info.shi1_type)).comment(remark)
            })
            .collect()
    };
    if !buffer.is_null() {
        // SAFETY: buffer was allocated by NetShareEnum
        unsafe {
            NetApiBufferFree(buffer as *const _);
        }
    }
    Ok(shares)
}

fn share_kind(share_type: u32) -> ShareKind {
    // the upper bits flag special and temporary shares
    match share_type & 0xff {
        STYPE_DISKTREE => ShareKind::Disk,
        STYPE_PRINTQ => ShareKind::Printer,
        STYPE_DEVICE => ShareKind::Device,
        STYPE_IPC => ShareKind::Ipc,
        _ => ShareKind::Unknown,
    }
}

fn io_error(err: io::Error) -> TransportError {
    TransportError::new(classify::classify_io_error(&err), err)
}

fn win32_error(code: u32) -> TransportError {
    io_error(io::Error::from_raw_os_error(code as i32))
}

fn to_wide(s: &str) -> Vec<u16> {
    OsStr::new(s).encode_wide().chain(once(0)).collect()
}

/// Read a nul terminated wide string; null pointers yield an empty string
unsafe fn from_wide_ptr(ptr: *const u16) -> String {
    if ptr.is_null() {
        return String::new();
    }
    let mut len = 0;
    while *ptr.add(len) != 0 {
        len += 1;
    }
    String::from_utf16_lossy(std::slice::from_raw_parts(ptr, len))
}
