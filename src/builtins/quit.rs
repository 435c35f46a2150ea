use crate::os::Os;
use crate::shell::Shell;
use crate::tools::atoi;

/// `quit [n]`: ask the driver loop to stop, exiting with `n` later.
pub fn run(sh: &mut Shell, _os: &mut dyn Os, args: &[String]) -> i32 {
    sh.should_run = false;
    if let Some(code) = args.get(1) {
        sh.last_exit_status = atoi(code);
    }
    0
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::os::fake::FakeOs;
    use crate::shell::Shell;

    #[test]
    fn test_quit() {
        let mut sh = Shell::new();
        let mut os = FakeOs::new();
        run(&mut sh, &mut os, &["quit".to_string()]);
        assert!(!sh.should_run);
        assert_eq!(sh.last_exit_status, 0);

        let mut sh = Shell::new();
        run(&mut sh, &mut os, &["quit".to_string(), "3".to_string()]);
        assert!(!sh.should_run);
        assert_eq!(sh.last_exit_status, 3);
        assert!(os.calls.is_empty());
    }
}
