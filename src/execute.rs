use std::mem;

use crate::core;
use crate::os::{self, Os};
use crate::shell::{self, Shell};

/// Run the read-parse-execute loop until `quit` or end of input and return
/// the status the process should exit with.
pub fn run_loop<O: Os>(sh: &mut Shell, os: &mut O) -> i32 {
    while sh.should_run {
        shell::reap_background(sh, os);
        if shell::get_command(sh, os) {
            let cmd = mem::take(&mut sh.cmd);
            core::run_command(sh, os, &cmd);
            sh.cmd = cmd;
        }
    }

    let msg = format!("{} ({}) was terminated\n", sh.name, os.getpid());
    if let Err(e) = os::write_str(os, 1, &msg) {
        log!("farewell: {}", e);
    }
    sh.last_exit_status
}

/// Run a single line, as given with `-c`.
pub fn run_line<O: Os>(sh: &mut Shell, os: &mut O, line: &str) -> i32 {
    log!("run line: {:?}", line);
    sh.parse_line(os, line);
    let cmd = mem::take(&mut sh.cmd);
    let status = core::run_command(sh, os, &cmd);
    let empty = cmd.is_empty();
    sh.cmd = cmd;

    if !sh.should_run {
        sh.last_exit_status
    } else if empty {
        0
    } else if status < 0 {
        1
    } else {
        status
    }
}
