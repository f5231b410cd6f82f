//! # smb utils
//!
//! Conversions from libsmbclient types

use std::io;

use libc::mode_t;
use pavao::{SmbDirent, SmbDirentType, SmbError, SmbStat};
use remotefs::fs::{FileType, Metadata, UnixPex};

use super::classify::{classify_error, classify_io_error};
use crate::transport::{ShareEntry, ShareInfo, ShareKind};
use crate::{TransportError, TransportErrorKind};

/// Classify a pavao failure.
///
/// pavao reports every failed `opendir`/`stat` as `BadFileDescriptor` and leaves the
/// reason in errno, so this must be called right after the failing call.
pub fn classify_smb_error(err: SmbError) -> TransportError {
    classify_smb_error_with(err, io::Error::last_os_error())
}

fn classify_smb_error_with(err: SmbError, last_os_error: io::Error) -> TransportError {
    match err {
        SmbError::BadFileDescriptor => match last_os_error.raw_os_error() {
            Some(code) if code != 0 => TransportError::new(
                classify_io_error(&last_os_error),
                format!("{err}: {last_os_error}"),
            ),
            _ => TransportError::new(TransportErrorKind::Other, err),
        },
        // `Io` carries no source, so the chain walk would miss it
        SmbError::Io(io_err) => TransportError::new(classify_io_error(&io_err), io_err),
        err => classify_error(&err),
    }
}

/// Convert `SmbStat` to `Metadata`
pub fn smbstat_to_metadata(stat: SmbStat) -> Metadata {
    let mode = mode_t::from(stat.mode);
    Metadata::default()
        .accessed(stat.accessed)
        .created(stat.created)
        .file_type(get_file_type_from_stat(&stat))
        .gid(stat.gid)
        .mode(UnixPex::from(mode as u32))
        .modified(stat.modified)
        .size(stat.size)
        .uid(stat.uid)
}

fn get_file_type_from_stat(stat: &SmbStat) -> FileType {
    match stat.mode {
        mode if mode.is_dir() => FileType::Directory,
        mode if mode.is_symlink() => FileType::Symlink,
        _ => FileType::File,
    }
}

/// Convert a server root dirent to `ShareInfo`.
/// Returns `None` if the dirent is not a share (e.g. a workgroup or server).
pub fn dirent_to_share(dirent: &SmbDirent) -> Option<ShareInfo> {
    let kind = match dirent.get_type() {
        SmbDirentType::FileShare => ShareKind::Disk,
        SmbDirentType::PrinterShare => ShareKind::Printer,
        SmbDirentType::CommsShare => ShareKind::Device,
        SmbDirentType::IpcShare => ShareKind::Ipc,
        _ => return None,
    };
    Some(ShareInfo::new(dirent.name(), kind).comment(dirent.comment()))
}

/// Convert a share dirent to `ShareEntry`.
/// Returns `None` if the dirent is neither a file, a directory nor a link.
pub fn dirent_to_entry(dirent: &SmbDirent) -> Option<ShareEntry> {
    let file_type = match dirent.get_type() {
        SmbDirentType::Dir => FileType::Directory,
        SmbDirentType::File => FileType::File,
        SmbDirentType::Link => FileType::Symlink,
        _ => return None,
    };
    Some(ShareEntry::new(dirent.name(), file_type))
}

#[cfg(test)]
mod test {

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn should_classify_bad_file_descriptor_on_errno() {
        let err = classify_smb_error_with(
            SmbError::BadFileDescriptor,
            io::Error::from_raw_os_error(libc::EACCES),
        );
        assert_eq!(err.kind(), TransportErrorKind::AuthenticationFailed);
        assert!(err
            .detail()
            .starts_with("server returned a bad file descriptor: "));
        assert_eq!(
            classify_smb_error_with(
                SmbError::BadFileDescriptor,
                io::Error::from_raw_os_error(libc::EPERM)
            )
            .kind(),
            TransportErrorKind::AuthenticationFailed
        );
        assert_eq!(
            classify_smb_error_with(
                SmbError::BadFileDescriptor,
                io::Error::from_raw_os_error(libc::ECONNREFUSED)
            )
            .kind(),
            TransportErrorKind::Unreachable
        );
        assert_eq!(
            classify_smb_error_with(
                SmbError::BadFileDescriptor,
                io::Error::from_raw_os_error(libc::ENODEV)
            )
            .kind(),
            TransportErrorKind::ShareNotFound
        );
    }

    #[test]
    fn should_not_classify_bad_file_descriptor_without_errno() {
        let err =
            classify_smb_error_with(SmbError::BadFileDescriptor, io::Error::from_raw_os_error(0));
        assert_eq!(err.kind(), TransportErrorKind::Other);
        assert_eq!(err.detail(), "server returned a bad file descriptor");
    }

    #[test]
    fn should_classify_inner_io_error() {
        let err = classify_smb_error_with(
            SmbError::Io(io::Error::from(io::ErrorKind::ConnectionRefused)),
            io::Error::from_raw_os_error(libc::EACCES),
        );
        assert_eq!(err.kind(), TransportErrorKind::Unreachable);
        let err = classify_smb_error_with(
            SmbError::Io(io::Error::from_raw_os_error(libc::EPERM)),
            io::Error::from_raw_os_error(0),
        );
        assert_eq!(err.kind(), TransportErrorKind::AuthenticationFailed);
    }

    #[test]
    fn should_classify_other_smb_errors() {
        assert_eq!(
            classify_smb_error_with(SmbError::BadValue, io::Error::from_raw_os_error(0)).kind(),
            TransportErrorKind::Other
        );
    }
}
