//! Stdout-backed terminal.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::core::terminal::Terminal;

#[cfg(unix)]
use libc::{self, c_int};

#[cfg(unix)]
fn wait_writable(fd: c_int) -> std::io::Result<()> {
    let mut fds = libc::pollfd {
        fd,
        events: libc::POLLOUT,
        revents: 0,
    };
    loop {
        let result = unsafe { libc::poll(&mut fds, 1, -1) };
        if result < 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            return Err(err);
        }
        if result == 0 {
            continue;
        }
        if (fds.revents & libc::POLLOUT) != 0 {
            return Ok(());
        }

        return Err(std::io::Error::other(format!(
            "poll(POLLOUT) returned revents=0x{:x}",
            fds.revents
        )));
    }
}

#[cfg(unix)]
pub(crate) fn write_all_fd_with<FWrite, FWait>(
    fd: c_int,
    bytes: &[u8],
    mut write_once: FWrite,
    mut wait_writable: FWait,
) -> std::io::Result<()>
where
    FWrite: FnMut(c_int, &[u8]) -> std::io::Result<usize>,
    FWait: FnMut(c_int) -> std::io::Result<()>,
{
    let mut written = 0;
    while written < bytes.len() {
        match write_once(fd, &bytes[written..]) {
            Ok(0) => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "write returned 0",
                ));
            }
            Ok(count) => {
                let remaining = bytes.len() - written;
                if count > remaining {
                    return Err(std::io::Error::other(
                        "write returned more bytes than requested",
                    ));
                }
                written += count;
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                wait_writable(fd)?;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(())
}

#[cfg(unix)]
pub(crate) fn write_fd(fd: c_int, data: &str) -> std::io::Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    write_all_fd_with(
        fd,
        data.as_bytes(),
        |fd, buf| {
            let result = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
            if result < 0 {
                Err(std::io::Error::last_os_error())
            } else {
                Ok(result as usize)
            }
        },
        wait_writable,
    )
}

#[cfg(unix)]
fn read_winsize(fd: c_int) -> Option<(u16, u16)> {
    let mut size = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    let result = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size) };
    if result == 0 && size.ws_col > 0 && size.ws_row > 0 {
        Some((size.ws_col, size.ws_row))
    } else {
        None
    }
}

/// Terminal that writes straight to the process's stdout.
///
/// Write failures are logged once and later writes are dropped; a broken pipe must not take
/// the render thread down with it.
pub struct ProcessTerminal {
    #[cfg(unix)]
    stdout_fd: c_int,
    write_log_path: Option<PathBuf>,
    write_log_failed: bool,
    write_failed: bool,
}

impl ProcessTerminal {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            stdout_fd: libc::STDOUT_FILENO,
            write_log_path: None,
            write_log_failed: false,
            write_failed: false,
        }
    }

    /// Mirror every write into `path` as well.
    pub fn with_write_log(mut self, path: Option<PathBuf>) -> Self {
        self.write_log_path = path;
        self
    }

    #[cfg(unix)]
    fn write_device(&mut self, data: &str) -> std::io::Result<()> {
        write_fd(self.stdout_fd, data)
    }

    #[cfg(not(unix))]
    fn write_device(&mut self, data: &str) -> std::io::Result<()> {
        let stdout = std::io::stdout();
        let mut stdout = stdout.lock();
        stdout.write_all(data.as_bytes())?;
        stdout.flush()
    }

    fn mirror_to_log(&mut self, data: &str) {
        if self.write_log_failed {
            return;
        }
        if let Some(path) = self.write_log_path.as_ref() {
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| file.write_all(data.as_bytes()));
            if let Err(err) = result {
                tracing::warn!(path = %path.display(), error = %err, "write log disabled");
                self.write_log_failed = true;
            }
        }
    }
}

impl Default for ProcessTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminal for ProcessTerminal {
    fn write(&mut self, data: &str) {
        if !self.write_failed {
            if let Err(err) = self.write_device(data) {
                tracing::warn!(error = %err, "terminal write failed; dropping further output");
                self.write_failed = true;
            }
        }
        self.mirror_to_log(data);
    }

    #[cfg(unix)]
    fn columns(&self) -> Option<u16> {
        read_winsize(self.stdout_fd).map(|(cols, _)| cols)
    }

    #[cfg(not(unix))]
    fn columns(&self) -> Option<u16> {
        None
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io;

    use super::{write_all_fd_with, ProcessTerminal};
    use crate::core::terminal::Terminal;

    #[test]
    fn write_all_fd_with_retries_on_eintr_and_writes_all_bytes() {
        let data = b"\x1b[2A\r\x1b[2K";
        let mut out = Vec::new();
        let mut calls = 0;
        write_all_fd_with(
            1,
            data,
            |_, buf| {
                calls += 1;
                match calls {
                    1 => Err(io::Error::from(io::ErrorKind::Interrupted)),
                    2 => {
                        out.extend_from_slice(&buf[..2]);
                        Ok(2)
                    }
                    _ => {
                        out.extend_from_slice(buf);
                        Ok(buf.len())
                    }
                }
            },
            |_| unreachable!("wait_writable should not be called for EINTR"),
        )
        .expect("write_all_fd_with failed");

        assert_eq!(out, data);
    }

    #[test]
    fn write_all_fd_with_waits_for_writable_on_would_block() {
        let data = b"frame";
        let mut out = Vec::new();
        let mut calls = 0;
        let events = std::cell::RefCell::new(Vec::new());
        write_all_fd_with(
            1,
            data,
            |_, buf| {
                events.borrow_mut().push("write");
                calls += 1;
                if calls == 1 {
                    return Err(io::Error::from(io::ErrorKind::WouldBlock));
                }
                out.extend_from_slice(buf);
                Ok(buf.len())
            },
            |_| {
                events.borrow_mut().push("wait");
                Ok(())
            },
        )
        .expect("write_all_fd_with failed");

        assert_eq!(out, data);
        assert_eq!(events.into_inner(), vec!["write", "wait", "write"]);
    }

    #[test]
    fn write_all_fd_with_rejects_zero_length_progress() {
        let err = write_all_fd_with(1, b"x", |_, _| Ok(0), |_| Ok(()))
            .expect_err("zero-length write must fail");
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn write_log_mirrors_bytes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frames.log");
        let mut terminal = ProcessTerminal::new().with_write_log(Some(path.clone()));
        // Suppress the real stdout write; only the mirror matters here.
        terminal.write_failed = true;

        terminal.write("\x1b[?25l");
        terminal.write("frame\n");

        let contents = std::fs::read_to_string(&path).expect("read write log");
        assert_eq!(contents, "\x1b[?25lframe\n");
    }
}
