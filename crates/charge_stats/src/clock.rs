use std::fs;
use std::path::PathBuf;

/// Whole seconds since boot, including time spent suspended.
///
/// `0` means the clock could not be read.
pub trait BootClock {
    fn now_secs(&self) -> u64;
}

/// Reads the first field of `/proc/uptime`.
#[derive(Debug, Clone)]
pub struct ProcUptimeClock {
    path: PathBuf,
}

impl ProcUptimeClock {
    pub fn new() -> Self {
        Self::with_path("/proc/uptime")
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcUptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BootClock for ProcUptimeClock {
    fn now_secs(&self) -> u64 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| parse_uptime_secs(&text))
            .unwrap_or(0)
    }
}

fn parse_uptime_secs(text: &str) -> Option<u64> {
    let first = text.split_whitespace().next()?;
    let whole = first.split('.').next()?;
    whole.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_uptime_seconds() {
        assert_eq!(parse_uptime_secs("12345.67 54321.00\n"), Some(12345));
        assert_eq!(parse_uptime_secs("7 1"), Some(7));
        assert_eq!(parse_uptime_secs(""), None);
        assert_eq!(parse_uptime_secs("abc 1"), None);
    }

    #[test]
    fn unreadable_uptime_is_clock_failure() {
        let dir = tempfile::tempdir().unwrap();
        let clock = ProcUptimeClock::with_path(dir.path().join("uptime"));
        assert_eq!(clock.now_secs(), 0);

        std::fs::write(dir.path().join("uptime"), "42.10 1.00\n").unwrap();
        assert_eq!(clock.now_secs(), 42);
    }
}
