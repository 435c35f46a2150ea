//! The operating system primitives the shell is allowed to use.
//!
//! Everything the executor does to the outside world goes through [`Os`],
//! so the whole lexer/parser/executor pipeline can run against a recording
//! fake in tests.
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::Pid;

use crate::diag::Sink;

#[cfg(test)]
pub mod fake;
mod unix;

pub use self::unix::UnixOs;

pub trait Os: Sink {
    /// Fork. The child runs `body` and exits with its return value; the
    /// parent gets the child's pid.
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32,
        Self: Sized;

    /// Replace the process image, searching `PATH` for `program`.
    /// Only returns on failure.
    fn exec(&mut self, program: &str, argv: &[String]) -> Errno;

    /// `(read_end, write_end)`
    fn pipe(&mut self) -> nix::Result<(RawFd, RawFd)>;
    fn dup2(&mut self, src: RawFd, dst: RawFd) -> nix::Result<()>;
    fn close(&mut self, fd: RawFd) -> nix::Result<()>;
    fn open(&mut self, path: &str, flags: OFlag) -> nix::Result<RawFd>;
    fn read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize>;
    fn write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize>;

    /// Block until child `pid` terminates and return its exit status.
    fn wait(&mut self, pid: Pid) -> nix::Result<i32>;
    /// Like `wait`, but `None` if the child is still running.
    fn try_wait(&mut self, pid: Pid) -> nix::Result<Option<i32>>;

    fn chdir(&mut self, path: &str) -> nix::Result<()>;
    fn getpid(&self) -> Pid;
    fn exit(&mut self, status: i32) -> !;
}

pub fn write_str<O: Os + ?Sized>(os: &mut O, fd: RawFd, text: &str) -> nix::Result<()> {
    let mut buf = text.as_bytes();
    while !buf.is_empty() {
        match os.write(fd, buf) {
            Ok(0) => return Err(Errno::EIO),
            Ok(n) => buf = &buf[n..],
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
