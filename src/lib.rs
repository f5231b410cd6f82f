#![crate_name = "smb_share_browser"]
#![crate_type = "lib"]

//! # smb-share-browser
//!
//! smb-share-browser lists the shares exposed by a SMB/CIFS server and the entries at the root of a share.
//! It is meant to back the share picker of a NAS browsing application.
//!
//! ## Get started
//!
//! First of all you need to add **smb-share-browser** to your project dependencies:
//!
//! ```toml
//! smb-share-browser = "^0.1"
//! ```
//!
//! these features are supported:
//!
//! - `libsmbclient`: enable the UNIX transport, built on libsmbclient through [pavao](https://github.com/veeso/pavao). (*enabled by default*)
//! - `no-log`: disable logging. By default, this library will log via the `log` crate.
//!
//! ### Browsing a NAS
//!
//! Each call opens its own connection, authenticates, enumerates and closes everything before returning.
//! Calls are blocking, so run them off the UI thread.
//!
//! ```rust,no_run
//! # #[cfg(any(all(target_family = "unix", feature = "libsmbclient"), target_family = "windows"))]
//! # fn main() -> Result<(), smb_share_browser::BrowseError> {
//! use smb_share_browser::{Credentials, ShareBrowser, SystemTransport, TransportOptions};
//!
//! let browser = ShareBrowser::new(SystemTransport::new(TransportOptions::default()));
//! let credentials = Credentials::new("nas.local")
//!     .username("alice")
//!     .password("secret");
//!
//! // administrative shares, such as `IPC$`, are not listed
//! for share in browser.list_shares(&credentials)? {
//!     println!("{share}");
//! }
//! // `.` and `..` are not listed
//! for entry in browser.list_entries(&credentials, "public")? {
//!     println!("{entry}");
//! }
//! # Ok(())
//! # }
//! # #[cfg(not(any(all(target_family = "unix", feature = "libsmbclient"), target_family = "windows")))]
//! # fn main() {}
//! ```
//!
//! ### Errors
//!
//! Failures are reported as one of three [`BrowseError`] variants:
//!
//! - `InvalidArgument`: a blank or missing parameter, reported before any network activity
//! - `Authentication`: the server rejected the credentials
//! - `Connection`: anything else, including missing shares and shares which are not disk shares
//!
//! ### Custom transports
//!
//! The browser works on top of the traits in [`transport`], so any SMB client library can be
//! plugged in by implementing [`SmbTransport`] and its associated resources.
//!

#![doc(html_playground_url = "https://play.rust-lang.org")]

// -- crates
#[macro_use]
extern crate log;

mod browser;
mod credentials;
mod error;
pub mod transport;

pub use browser::ShareBrowser;
pub use credentials::Credentials;
pub use error::{BrowseError, BrowseResult, TransportError, TransportErrorKind, TransportResult};
#[cfg(any(
    all(target_family = "unix", feature = "libsmbclient"),
    target_family = "windows"
))]
pub use transport::SystemTransport;
pub use transport::{
    ShareEntry, ShareInfo, ShareKind, SmbConnection, SmbSession, SmbShare, SmbTransport,
    TransportOptions,
};

// -- utils
pub(crate) mod utils;
// -- mock
#[cfg(test)]
pub(crate) mod mock;
