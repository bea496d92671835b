//! Readiness polling over client sockets.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

/// Wait up to `timeout` for any of `fds` to become readable.
///
/// Returns the index of the first ready descriptor in `fds` order, or `None`
/// on timeout. Hang-ups and socket errors count as readable so the next read
/// reports them.
pub fn first_readable(fds: &[RawFd], timeout: Duration) -> io::Result<Option<usize>> {
    let mut pollfds: Vec<libc::pollfd> = fds
        .iter()
        .map(|&fd| libc::pollfd {
            fd,
            events: libc::POLLIN,
            revents: 0,
        })
        .collect();
    let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `pollfds` is a live, correctly sized array of pollfd structs.
    let ready = unsafe {
        libc::poll(
            pollfds.as_mut_ptr(),
            pollfds.len() as libc::nfds_t,
            timeout_ms,
        )
    };

    if ready < 0 {
        let err = io::Error::last_os_error();
        if err.kind() == io::ErrorKind::Interrupted {
            return Ok(None);
        }
        return Err(err);
    }
    if ready == 0 {
        return Ok(None);
    }

    let mask = libc::POLLIN | libc::POLLHUP | libc::POLLERR | libc::POLLNVAL;
    Ok(pollfds.iter().position(|p| p.revents & mask != 0))
}
