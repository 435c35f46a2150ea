use std::collections::{HashMap, VecDeque};
use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::Pid;

use crate::diag::{Level, Sink};
use crate::os::Os;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fork(i32),
    Exec(String, Vec<String>),
    Pipe(RawFd, RawFd),
    Dup2(RawFd, RawFd),
    Close(RawFd),
    Open(String, OFlag),
    Wait(i32),
    Chdir(String),
}

/// Records every call instead of touching the system. Children run in
/// process when spawned and are reaped immediately.
#[derive(Debug)]
pub struct FakeOs {
    pub input: VecDeque<u8>,
    pub stdout: Vec<u8>,
    pub calls: Vec<Call>,
    pub reports: Vec<(Level, String)>,
    /// programs `exec` fails for with ENOENT
    pub missing: Vec<String>,
    /// paths `open` and `chdir` fail for with ENOENT
    pub bad_paths: Vec<String>,
    pub fail_fork: bool,
    /// status reported for every program that exec'd successfully
    pub exec_status: i32,
    next_fd: RawFd,
    next_pid: i32,
    exited: HashMap<i32, i32>,
    /// set after a successful exec, until the simulated child finishes
    replaced: bool,
}

impl FakeOs {
    pub fn new() -> FakeOs {
        FakeOs {
            input: VecDeque::new(),
            stdout: Vec::new(),
            calls: Vec::new(),
            reports: Vec::new(),
            missing: Vec::new(),
            bad_paths: Vec::new(),
            fail_fork: false,
            exec_status: 0,
            next_fd: 3,
            next_pid: 100,
            exited: HashMap::new(),
            replaced: false,
        }
    }

    pub fn with_input(input: &str) -> FakeOs {
        let mut os = FakeOs::new();
        os.input.extend(input.bytes());
        os
    }

    pub fn execs(&self) -> Vec<(String, Vec<String>)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Exec(name, argv) => Some((name.clone(), argv.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn forks(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Fork(_))).count()
    }

    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn reported(&self, level: Level, needle: &str) -> bool {
        self.reports.iter().any(|(l, m)| *l == level && m.contains(needle))
    }
}

impl Sink for FakeOs {
    fn report(&mut self, level: Level, msg: &str) {
        if !self.replaced {
            self.reports.push((level, msg.to_string()));
        }
    }
}

impl Os for FakeOs {
    fn spawn<F>(&mut self, body: F) -> nix::Result<Pid>
    where
        F: FnOnce(&mut Self) -> i32,
    {
        if self.fail_fork {
            return Err(Errno::EAGAIN);
        }
        self.next_pid += 1;
        let pid = self.next_pid;
        self.calls.push(Call::Fork(pid));

        let status = body(self);
        let status = if self.replaced { self.exec_status } else { status };
        self.replaced = false;
        self.exited.insert(pid, status);
        Ok(Pid::from_raw(pid))
    }

    fn exec(&mut self, program: &str, argv: &[String]) -> Errno {
        if self.missing.iter().any(|m| m == program) {
            return Errno::ENOENT;
        }
        self.calls.push(Call::Exec(program.to_string(), argv.to_vec()));
        self.replaced = true;
        Errno::UnknownErrno
    }

    fn pipe(&mut self) -> nix::Result<(RawFd, RawFd)> {
        let fds = (self.next_fd, self.next_fd + 1);
        self.next_fd += 2;
        self.calls.push(Call::Pipe(fds.0, fds.1));
        Ok(fds)
    }

    fn dup2(&mut self, src: RawFd, dst: RawFd) -> nix::Result<()> {
        if !self.replaced {
            self.calls.push(Call::Dup2(src, dst));
        }
        Ok(())
    }

    fn close(&mut self, fd: RawFd) -> nix::Result<()> {
        if !self.replaced {
            self.calls.push(Call::Close(fd));
        }
        Ok(())
    }

    fn open(&mut self, path: &str, flags: OFlag) -> nix::Result<RawFd> {
        if self.bad_paths.iter().any(|p| p == path) {
            return Err(Errno::ENOENT);
        }
        self.calls.push(Call::Open(path.to_string(), flags));
        let fd = self.next_fd;
        self.next_fd += 1;
        Ok(fd)
    }

    fn read(&mut self, _fd: RawFd, buf: &mut [u8]) -> nix::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.input.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&mut self, fd: RawFd, buf: &[u8]) -> nix::Result<usize> {
        if fd == 1 && !self.replaced {
            self.stdout.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn wait(&mut self, pid: Pid) -> nix::Result<i32> {
        let pid = i32::from(pid);
        self.calls.push(Call::Wait(pid));
        self.exited.remove(&pid).ok_or(Errno::ECHILD)
    }

    fn try_wait(&mut self, pid: Pid) -> nix::Result<Option<i32>> {
        let pid = i32::from(pid);
        match self.exited.remove(&pid) {
            Some(status) => Ok(Some(status)),
            None => Err(Errno::ECHILD),
        }
    }

    fn chdir(&mut self, path: &str) -> nix::Result<()> {
        if self.bad_paths.iter().any(|p| p == path) {
            return Err(Errno::ENOENT);
        }
        self.calls.push(Call::Chdir(path.to_string()));
        Ok(())
    }

    fn getpid(&self) -> Pid {
        Pid::from_raw(42)
    }

    fn exit(&mut self, status: i32) -> ! {
        panic!("exit({})", status)
    }
}
