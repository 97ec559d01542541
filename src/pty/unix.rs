//! Unix PTY allocation
//!
//! # References
//!
//! - posix_openpt(3): https://man7.org/linux/man-pages/man3/posix_openpt.3.html
//! - grantpt(3), unlockpt(3), ptsname(3)

use std::fs::File;
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, BorrowedFd, FromRawFd, IntoRawFd, OwnedFd};
use std::sync::Arc;

use nix::fcntl::OFlag;
use nix::pty::{grantpt, posix_openpt, unlockpt, PtyMaster};

use super::{PtyError, PtyResult};

/// The master side of a freshly allocated pseudoterminal
///
/// No child is attached: the slave is left for an external program to open
/// through [`Pty::slave_path`].
pub struct Pty {
    /// The PTY master, shared by both relay directions after [`Pty::split`]
    master: Arc<File>,
    /// Path to the slave device, e.g. `/dev/pts/3`
    slave_path: String,
}

impl Pty {
    /// Allocate a new master/slave pair
    ///
    /// The master is opened with `O_NOCTTY`, so it never becomes the
    /// controlling terminal of this process. The slave is unlocked and can be
    /// opened by other processes as soon as this returns.
    pub fn open() -> PtyResult<Self> {
        let master = posix_openpt(OFlag::O_RDWR | OFlag::O_NOCTTY).map_err(PtyError::OpenMaster)?;

        grantpt(&master).map_err(PtyError::GrantPty)?;
        unlockpt(&master).map_err(PtyError::UnlockPty)?;

        let slave_path = slave_name(&master).map_err(PtyError::PtsName)?;

        // SAFETY: into_raw_fd hands over sole ownership of a valid, open descriptor
        let fd = unsafe { OwnedFd::from_raw_fd(master.into_raw_fd()) };

        Ok(Self {
            master: Arc::new(File::from(fd)),
            slave_path,
        })
    }

    /// Path of the slave device
    pub fn slave_path(&self) -> &str {
        &self.slave_path
    }

    /// Split into a read-only and a write-only view of the master
    ///
    /// Both views share the same open file; it is closed once the last view
    /// is dropped.
    pub fn split(self) -> (MasterReader, MasterWriter) {
        (
            MasterReader {
                master: Arc::clone(&self.master),
            },
            MasterWriter {
                master: self.master,
            },
        )
    }
}

impl AsFd for Pty {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.master.as_fd()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn slave_name(master: &PtyMaster) -> nix::Result<String> {
    nix::pty::ptsname_r(master)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn slave_name(master: &PtyMaster) -> nix::Result<String> {
    // SAFETY: ptsname uses a static buffer; the caller copies it out before
    // any relay thread exists
    unsafe { nix::pty::ptsname(master) }
}

/// Read-only view of the PTY master, owned by the reverse relay
pub struct MasterReader {
    master: Arc<File>,
}

impl Read for MasterReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (&*self.master).read(buf)
    }
}

/// Write-only view of the PTY master, owned by the forward relay
pub struct MasterWriter {
    master: Arc<File>,
}

impl Write for MasterWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        (&*self.master).write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        (&*self.master).flush()
    }
}
