use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::unistd::Pid;

use crate::builtins;
use crate::diag::Level;
use crate::os::{self, Os};
use crate::shell::Shell;
use crate::types::{Command, Pipeline, RedirKind, Redirection, SimpleCommand};

/// Run a parsed line.
///
/// Returns 1 for an empty command, -1 for an invalid one or when fork
/// fails, otherwise the status of what ran (0 for background launches).
pub fn run_command<O: Os>(sh: &mut Shell, os: &mut O, cmd: &Command) -> i32 {
    match cmd {
        Command::Empty(_) => 1,
        Command::Invalid(errors) => {
            os.report(Level::User, &format!("invalid command: {}", errors));
            -1
        }
        Command::Simple(simple) => run_simple(sh, os, simple),
        Command::Pipeline(pipeline) => run_pipeline(sh, os, pipeline),
        Command::List(list) => {
            let mut status = 0;
            for cmd in &list.commands {
                status = run_command(sh, os, cmd);
                if !sh.should_run {
                    break;
                }
            }
            status
        }
    }
}

fn run_simple<O: Os>(sh: &mut Shell, os: &mut O, simple: &SimpleCommand) -> i32 {
    let name = match simple.name() {
        Some(x) => x,
        None => return 1,
    };
    if let Some(builtin) = builtins::lookup(name) {
        log!("builtin: {:?}", simple.argv);
        return builtin(sh, os, &simple.argv);
    }

    log!("run: {:?}", simple.argv);
    match os.spawn(|os| {
        if let Err(status) = apply_redirects(os, &simple.redirects) {
            return status;
        }
        exec_program(os, simple)
    }) {
        Ok(pid) => {
            if simple.background {
                track_background(sh, os, &[pid]);
                0
            } else {
                wait_child(os, pid)
            }
        }
        Err(e) => {
            os.report(Level::System, &format!("fork failed: {}", e));
            -1
        }
    }
}

/// Run `N` stages connected by `N - 1` pipes.
pub fn run_pipeline<O: Os>(sh: &mut Shell, os: &mut O, pipeline: &Pipeline) -> i32 {
    let length = pipeline.len();
    if length == 0 {
        return 1;
    }

    let mut pipes: Vec<(RawFd, RawFd)> = Vec::with_capacity(length - 1);
    for _ in 0..length - 1 {
        match os.pipe() {
            Ok(fds) => pipes.push(fds),
            Err(e) => {
                os.report(Level::System, &format!("pipe failed: {}", e));
                close_pipes(os, &pipes);
                return -1;
            }
        }
    }

    let mut children: Vec<Pid> = Vec::new();
    let mut fork_failed = false;
    for (i, stage) in pipeline.commands.iter().enumerate() {
        let pipes_ref = &pipes;
        let spawned = os.spawn(|os| {
            // read from the previous stage, write to the next one
            if i > 0 {
                if let Err(status) = redirect_fd(os, pipes_ref[i - 1].0, 0) {
                    return status;
                }
            }
            if i < length - 1 {
                if let Err(status) = redirect_fd(os, pipes_ref[i].1, 1) {
                    return status;
                }
            }
            close_pipes(os, pipes_ref);

            if let Err(status) = apply_redirects(os, &stage.redirects) {
                return status;
            }
            if stage.is_empty() {
                return 0;
            }
            exec_program(os, stage)
        });
        match spawned {
            Ok(pid) => children.push(pid),
            Err(e) => {
                os.report(Level::System, &format!("fork failed: {}", e));
                fork_failed = true;
                break;
            }
        }
    }
    close_pipes(os, &pipes);

    if pipeline.is_background() && !fork_failed {
        track_background(sh, os, &children);
        return 0;
    }

    let mut status = 0;
    for pid in &children {
        status = wait_child(os, *pid);
    }
    if fork_failed {
        -1
    } else {
        status
    }
}

fn close_pipes<O: Os>(os: &mut O, pipes: &[(RawFd, RawFd)]) {
    for &(read_end, write_end) in pipes {
        let _ = os.close(read_end);
        let _ = os.close(write_end);
    }
}

/// Make `fd` available as `target`, in a child.
fn redirect_fd<O: Os>(os: &mut O, fd: RawFd, target: RawFd) -> Result<(), i32> {
    if fd == target {
        return Ok(());
    }
    match os.dup2(fd, target) {
        Ok(()) => Ok(()),
        Err(e) => {
            os.report(Level::System, &format!("dup2 {} -> {}: {}", fd, target, e));
            Err(1)
        }
    }
}

fn open_flags(kind: RedirKind) -> OFlag {
    match kind {
        RedirKind::In => OFlag::O_RDONLY,
        RedirKind::Out => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
        RedirKind::Append => OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_APPEND,
        RedirKind::None => OFlag::empty(),
    }
}

/// Apply the redirection slots of one command, in a child. `Err` holds the
/// status the child should exit with.
fn apply_redirects<O: Os>(os: &mut O, redirects: &[Redirection]) -> Result<(), i32> {
    for r in redirects.iter().filter(|r| r.is_set()) {
        if let Some(fd) = r.dest_fd {
            redirect_fd(os, fd, r.source_fd)?;
            continue;
        }
        let path = match r.path.as_deref() {
            Some(x) => x,
            None => {
                os.report(Level::Debug, &format!("redirection of fd {} has no target", r.source_fd));
                continue;
            }
        };
        let fd = match os.open(path, open_flags(r.kind)) {
            Ok(fd) => fd,
            Err(e) => {
                os.report(Level::System, &format!("cannot open {}: {}", path, e.desc()));
                return Err(1);
            }
        };
        if fd != r.source_fd {
            redirect_fd(os, fd, r.source_fd)?;
            let _ = os.close(fd);
        }
    }
    Ok(())
}

/// Replace the child with the program; returns the exit status only when
/// that failed.
fn exec_program<O: Os>(os: &mut O, simple: &SimpleCommand) -> i32 {
    let name = simple.name().unwrap_or_default();
    let err = os.exec(name, &simple.argv);
    match err {
        Errno::ENOENT => os.report(Level::User, &format!("{}: command not found", name)),
        Errno::EACCES => os.report(Level::User, &format!("{}: permission denied", name)),
        Errno::ENOEXEC => os.report(Level::User, &format!("{}: exec format error", name)),
        _ => os.report(Level::User, &format!("{}: {}", name, err.desc())),
    }
    1
}

fn wait_child<O: Os>(os: &mut O, pid: Pid) -> i32 {
    match os.wait(pid) {
        Ok(status) => status,
        Err(e) => {
            os.report(Level::System, &format!("wait for {} failed: {}", pid, e));
            -1
        }
    }
}

fn track_background<O: Os>(sh: &mut Shell, os: &mut O, pids: &[Pid]) {
    for pid in pids {
        if let Err(e) = os::write_str(os, 1, &format!("[{}]\n", pid)) {
            log!("background notice: {}", e);
        }
        sh.background.push(*pid);
    }
}
