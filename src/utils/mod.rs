//! # utils
//!
//! Utilities shared by transports

pub mod classify;
#[cfg(all(target_family = "unix", feature = "libsmbclient"))]
pub mod smb;
