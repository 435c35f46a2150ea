use std::os::unix::io::RawFd;
use std::process;

use errno::errno;
use nix::errno::Errno;
use nix::fcntl::{self, OFlag};
use nix::sys::stat::Mode;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{self, ForkResult, Pid};

use crate::diag::{Level, Sink};
use crate::os::Os;

/// The host operating system.
#[derive(Debug, Default)]
pub struct UnixOs;

fn last_errno() -> Errno {
    Errno::from_raw(errno().0)
}

fn status_of(ws: WaitStatus) -> Option<i32> {
    match ws {
        WaitStatus::Exited(_, status) => Some(status),
        WaitStatus::Signaled(_, sig, _) => Some(128 + sig as i32),
        _ => None,
    }
}

impl Sink for UnixOs {
    fn report(&mut self, level: Level, msg: &str) {
        log!("{:?}: {}", level, msg);
        match level {
            Level::User | Level::System => println_stderr!("tsh: {}", msg),
            Level::Debug => {}
        }
    }
}

impl Os for UnixOs {
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32,
    {
        // the shell is single threaded, so the child may run arbitrary code
        match unsafe { unistd::fork() }? {
            ForkResult::Parent { child } => Ok(child),
            ForkResult::Child => {
                let status = body(self);
                self.exit(status)
            }
        }
    }

    fn exec(&mut self, program: &str, argv: &[String]) -> Errno {
        match exec::execvp(program, argv) {
            exec::Error::Errno(e) => Errno::from_raw(e.0),
            other => {
                log!("exec {}: {:?}", program, other);
                Errno::EINVAL
            }
        }
    }

    fn pipe(&mut self) -> nix::Result<(RawFd, RawFd)> {
        let mut fds: [libc::c_int; 2] = [-1, -1];
        let res = unsafe { libc::pipe(fds.as_mut_ptr()) };
        Errno::result(res)?;
        Ok((fds[0], fds[1]))
    }

    fn dup2(&mut self, src: RawFd, dst: RawFd) -> nix::Result<()> {
        let res = unsafe { libc::dup2(src, dst) };
        Errno::result(res).map(drop)
    }

    fn close(&mut self, fd: RawFd) -> nix::Result<()> {
        let res = unsafe { libc::close(fd) };
        Errno::result(res).map(drop)
    }

    fn open(&mut self, path: &str, flags: OFlag) -> nix::Result<RawFd> {
        fcntl::open(path, flags, Mode::from_bits_truncate(0o644))
    }

    fn read(&mut self, fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len()) };
        if n < 0 {
            return Err(last_errno());
        }
        Ok(n as usize)
    }

    fn write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        let n = unsafe { libc::write(fd, buf.as_ptr() as *const libc::c_void, buf.len()) };
        if n < 0 {
            return Err(last_errno());
        }
        Ok(n as usize)
    }

    fn wait(&mut self, pid: Pid) -> nix::Result<i32> {
        loop {
            match waitpid(pid, None) {
                Ok(ws) => {
                    if let Some(status) = status_of(ws) {
                        return Ok(status);
                    }
                }
                Err(Errno::EINTR) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn try_wait(&mut self, pid: Pid) -> nix::Result<Option<i32>> {
        let ws = waitpid(pid, Some(WaitPidFlag::WNOHANG))?;
        Ok(status_of(ws))
    }

    fn chdir(&mut self, path: &str) -> nix::Result<()> {
        unistd::chdir(path)
    }

    fn getpid(&self) -> Pid {
        unistd::getpid()
    }

    fn exit(&mut self, status: i32) -> ! {
        process::exit(status)
    }
}
