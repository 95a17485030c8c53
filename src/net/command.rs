//! External command execution.
//!
//! Every OS command netopt issues (`netsh`, `ping`) is described as a
//! [`NetCommand`] and handed to a [`CommandRunner`]. Arguments are passed as
//! a vector, never through a shell, so an interface name containing shell
//! metacharacters stays a single argument.

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;

/// A program plus its argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl NetCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `netsh interface ip set dns name=<if> static <address>`
    ///
    /// An empty address renders as `none`, which netsh documents as
    /// "remove all statically configured DNS servers".
    #[must_use]
    pub fn set_dns(interface: &str, address: &str) -> Self {
        let address = if address.trim().is_empty() {
            "none"
        } else {
            address
        };
        Self::new(
            "netsh",
            [
                "interface".to_string(),
                "ip".into(),
                "set".into(),
                "dns".into(),
                format!("name={interface}"),
                "static".into(),
                address.into(),
            ],
        )
    }

    /// `netsh interface ip add dns name=<if> <address> index=<index>`
    #[must_use]
    pub fn add_dns(interface: &str, address: &str, index: u8) -> Self {
        Self::new(
            "netsh",
            [
                "interface".to_string(),
                "ip".into(),
                "add".into(),
                "dns".into(),
                format!("name={interface}"),
                address.into(),
                format!("index={index}"),
            ],
        )
    }

    /// `netsh interface ipv4 set subinterface <if> mtu=<mtu> store=persistent`
    #[must_use]
    pub fn set_mtu(interface: &str, mtu: u32) -> Self {
        Self::new(
            "netsh",
            [
                "interface".to_string(),
                "ipv4".into(),
                "set".into(),
                "subinterface".into(),
                interface.into(),
                format!("mtu={mtu}"),
                "store=persistent".into(),
            ],
        )
    }

    /// A single echo request through the OS `ping` utility.
    #[must_use]
    pub fn ping_once(host: &str) -> Self {
        let count_flag = if cfg!(windows) { "-n" } else { "-c" };
        Self::new("ping", [count_flag, "1", host])
    }
}

impl fmt::Display for NetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs [`NetCommand`]s.
///
/// `Err` means the command could not be run at all; a non-zero exit is
/// reported through [`CommandOutput::code`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &NetCommand) -> Result<CommandOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &NetCommand) -> Result<CommandOutput> {
        tracing::debug!("Running: {command}");

        let output = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
