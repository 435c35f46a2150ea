use nix::errno::Errno;
use nix::unistd::Pid;

use crate::diag::Level;
use crate::line::{LineBuffer, LineStatus};
use crate::os::{self, Os};
use crate::parsers::lexer::tokenize;
use crate::parsers::parser_cmd::parse_command;
use crate::types::{Command, TokenList};

pub const DEFAULT_PROMPT: &str = "tsh> ";

pub struct Shell {
    pub name: String,
    pub prompt: String,
    pub should_run: bool,
    pub last_exit_status: i32,
    pub line: LineBuffer,
    pub tokens: TokenList,
    pub cmd: Command,
    /// children started with `&` that have not been reaped yet
    pub background: Vec<Pid>,
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new()
    }
}

impl Shell {
    pub fn new() -> Shell {
        Shell {
            name: "tsh".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            should_run: true,
            last_exit_status: 0,
            line: LineBuffer::new(),
            tokens: TokenList::default(),
            cmd: Command::default(),
            background: Vec::new(),
        }
    }

    /// Tokenize and parse `line` into `self.tokens` and `self.cmd`,
    /// reporting the advisory parse errors found. An invalid command is
    /// reported when the executor refuses it.
    pub fn parse_line<O: Os + ?Sized>(&mut self, os: &mut O, line: &str) {
        self.tokens = tokenize(line);
        log!("{}", self.tokens);
        self.cmd = parse_command(&self.tokens);
        log!("{}", self.cmd);
        if let Command::Invalid(_) = self.cmd {
            return;
        }
        for kind in self.cmd.errors().iter() {
            os.report(Level::User, kind.describe());
        }
    }
}

/// Prompt for and parse one line. Returns false when nothing was read;
/// on end of input or a read error the shell is told to stop.
pub fn get_command<O: Os + ?Sized>(sh: &mut Shell, os: &mut O) -> bool {
    if let Err(e) = os::write_str(os, 1, &sh.prompt) {
        log!("prompt: {}", e);
    }

    match sh.line.read(os, 0) {
        LineStatus::Ok(_) => {
            let line = sh.line.as_str().into_owned();
            sh.parse_line(os, &line);
            true
        }
        LineStatus::Eof => {
            sh.should_run = false;
            false
        }
        LineStatus::Error(e) => {
            os.report(Level::System, &format!("read failed: {}", e));
            sh.should_run = false;
            sh.last_exit_status = 1;
            false
        }
    }
}

/// Collect background children that have finished.
pub fn reap_background<O: Os + ?Sized>(sh: &mut Shell, os: &mut O) {
    let mut running = Vec::new();
    for pid in sh.background.drain(..) {
        match os.try_wait(pid) {
            Ok(Some(status)) => {
                let msg = format!("[{}] Done {}\n", pid, status);
                if let Err(e) = os::write_str(os, 1, &msg) {
                    log!("reap notice: {}", e);
                }
            }
            Ok(None) => running.push(pid),
            Err(Errno::ECHILD) => {}
            Err(e) => {
                os.report(Level::System, &format!("wait for {} failed: {}", pid, e));
            }
        }
    }
    sh.background = running;
}
