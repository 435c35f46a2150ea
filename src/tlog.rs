use time::OffsetDateTime;

pub fn getpid() -> i32 {
    unsafe { libc::getpid() }
}

/// Local wall-clock time as `YYYY-mm-dd HH:MM:SS.mmm`, UTC if the local
/// offset cannot be determined (e.g. in a multi-threaded test runner).
pub fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second(),
        now.millisecond(),
    )
}

/// Append a line to the file named by `TSH_LOG_FILE`, if set.
#[macro_export]
macro_rules! log {
    ($fmt:expr) => (
        let log_file = std::env::var("TSH_LOG_FILE").unwrap_or_default();

        if !log_file.is_empty() {
            use std::io::Write as _;

            let msg = $fmt;
            match std::fs::OpenOptions::new().append(true).create(true).open(&log_file) {
                Ok(mut lfile) => {
                    let pid = $crate::tlog::getpid();
                    let now = $crate::tlog::timestamp();
                    let msg = format!("[{}][{}] {}", now, pid, msg);
                    let msg = if msg.ends_with('\n') { msg } else { format!("{}\n", msg) };
                    if lfile.write_all(msg.as_bytes()).is_err() {
                        eprintln!("tlog: write_all error");
                    }
                }
                Err(_) => eprintln!("tlog: open file error"),
            }
        }
    );

    ($fmt:expr, $($arg:tt)*) => (
        let msg = format!($fmt, $($arg)*);
        $crate::log!(&msg);
    );
}
