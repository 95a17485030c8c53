//! Administrator privilege handling.
//!
//! `netsh` refuses to change adapter settings without administrator rights,
//! so on Windows the process relaunches itself through a UAC prompt.

use crate::error::{Error, Result};
use std::ffi::OsString;

/// Flag appended to the relaunched command line so it never relaunches again.
pub const ELEVATED_FLAG: &str = "--elevated";

/// Outcome of [`ensure_elevated`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    /// Already running with the needed rights
    Elevated,
    /// An elevated copy was started; this process should exit
    Relaunched,
    /// Continuing without rights; configuration commands will likely fail
    Unprivileged,
}

/// Check if running with administrator privileges.
#[cfg(windows)]
#[must_use]
pub fn is_elevated() -> bool {
    // `net session` only succeeds for administrators
    std::process::Command::new("net")
        .arg("session")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Check if running as root.
#[cfg(unix)]
#[must_use]
pub fn is_elevated() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(any(windows, unix)))]
#[must_use]
pub fn is_elevated() -> bool {
    false
}

/// Make sure configuration commands can run.
///
/// `already_relaunched` is true when this process was itself started by a
/// relaunch; it is then never relaunched a second time.
///
/// # Errors
///
/// Returns an error if the elevated copy could not be started.
pub fn ensure_elevated(already_relaunched: bool) -> Result<Elevation> {
    if is_elevated() {
        return Ok(Elevation::Elevated);
    }

    if already_relaunched || !cfg!(windows) {
        tracing::warn!("Not running as administrator; DNS and MTU changes will likely fail");
        return Ok(Elevation::Unprivileged);
    }

    let exe = std::env::current_exe()?;
    let args: Vec<OsString> = std::env::args_os().skip(1).collect();
    let script = relaunch_script(&exe.to_string_lossy(), &args);

    tracing::info!("Requesting administrator rights");
    std::process::Command::new("powershell")
        .args(["-NoProfile", "-NonInteractive", "-Command", &script])
        .spawn()
        .map_err(|e| Error::elevation(format!("cannot start elevated process: {e}")))?;

    Ok(Elevation::Relaunched)
}

/// PowerShell one-liner starting `exe` with `args` plus [`ELEVATED_FLAG`]
/// under the `RunAs` verb.
///
/// `Start-Process` joins `-ArgumentList` with plain spaces, so each argument
/// is command-line quoted first and PowerShell quoted second.
#[must_use]
pub fn relaunch_script(exe: &str, args: &[OsString]) -> String {
    let arguments: Vec<String> = args
        .iter()
        .map(|a| ps_quote(&cmdline_quote(&a.to_string_lossy())))
        .chain(std::iter::once(ps_quote(ELEVATED_FLAG)))
        .collect();

    format!(
        "Start-Process -FilePath {} -ArgumentList @({}) -Verb RunAs",
        ps_quote(exe),
        arguments.join(",")
    )
}

/// Quote one argument for a Windows command line (`CommandLineToArgvW` rules).
///
/// Arguments without whitespace or `"` pass through unchanged.
fn cmdline_quote(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"') {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                // Backslashes before a quote are doubled, plus one for the quote
                quoted.push_str(&"\\".repeat(backslashes * 2 + 1));
                quoted.push('"');
                backslashes = 0;
            }
            _ => {
                quoted.push_str(&"\\".repeat(backslashes));
                quoted.push(c);
                backslashes = 0;
            }
        }
    }
    // Trailing backslashes precede the closing quote
    quoted.push_str(&"\\".repeat(backslashes * 2));
    quoted.push('"');
    quoted
}

/// Single-quote a string for PowerShell.
fn ps_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relaunch_script_appends_flag() {
        let args = vec![OsString::from("speed"), OsString::from("--format"), OsString::from("json")];
        let script = relaunch_script(r"C:\Tools\netopt.exe", &args);
        assert_eq!(
            script,
            r"Start-Process -FilePath 'C:\Tools\netopt.exe' -ArgumentList @('speed','--format','json','--elevated') -Verb RunAs"
        );
    }

    #[test]
    fn test_relaunch_script_keeps_spaced_argument_whole() {
        let args = vec![OsString::from("--interface"), OsString::from("Wi-Fi 2")];
        let script = relaunch_script(r"C:\netopt.exe", &args);
        assert_eq!(
            script,
            r#"Start-Process -FilePath 'C:\netopt.exe' -ArgumentList @('--interface','"Wi-Fi 2"','--elevated') -Verb RunAs"#
        );
    }

    #[test]
    fn test_relaunch_script_escapes_quotes() {
        let args = vec![OsString::from("--interface"), OsString::from("Bob's LAN")];
        let script = relaunch_script(r"C:\netopt.exe", &args);
        assert!(script.contains(r#"'"Bob''s LAN"'"#));
    }

    #[test]
    fn test_cmdline_quote() {
        assert_eq!(cmdline_quote("Ethernet"), "Ethernet");
        assert_eq!(cmdline_quote(""), "\"\"");
        assert_eq!(
            cmdline_quote("Local Area Connection"),
            "\"Local Area Connection\""
        );
        assert_eq!(cmdline_quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert_eq!(cmdline_quote(r"C:\My Dir\"), r#""C:\My Dir\\""#);
        assert_eq!(cmdline_quote(r#"a\"b"#), r#""a\\\"b""#);
    }

    #[test]
    fn test_already_relaunched_never_relaunches() {
        let outcome = ensure_elevated(true).unwrap();
        assert_ne!(outcome, Elevation::Relaunched);
    }
}
