use std::process;

use clap::Parser;

use tsh::execute;
use tsh::os::UnixOs;
use tsh::shell::Shell;

#[derive(Parser, Debug)]
#[command(name = "tsh", version, about = "A tiny Unix shell")]
struct Opts {
    /// Run one command line and exit
    #[arg(short = 'c', value_name = "LINE")]
    command: Option<String>,
}

fn main() {
    let opts = Opts::parse();
    let mut sh = Shell::new();
    let mut os = UnixOs;

    let status = match opts.command {
        Some(line) => execute::run_line(&mut sh, &mut os, &line),
        None => execute::run_loop(&mut sh, &mut os),
    };
    process::exit(status);
}
