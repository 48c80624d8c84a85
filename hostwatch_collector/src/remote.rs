//! SSH metrics client: one authenticated session, three fixed probe
//! commands, parsed into a [`RemoteUsage`].
//!
//! Commands run strictly sequentially because they share the session. The
//! first failure (stderr output, non-zero exit, timeout) aborts the whole
//! fetch; later probes do not run.

use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use ssh2::Session;
use tracing::{debug, info, warn};

use crate::config::RemoteConfig;
use crate::error::FetchError;
use crate::types::RemoteUsage;

/// CPU utilization as 100 - idle% over a one-second vmstat window.
pub const CPU_CMD: &str = "vmstat 1 2 | tail -1 | awk '{print 100 - $15}'";
/// Used/total memory in percent, two decimals.
pub const MEM_CMD: &str = "free -m | awk '/Mem:/ {printf \"%.2f\", ($3/$2)*100}'";
/// Use% of the root filesystem, trailing % stripped.
pub const DISK_CMD: &str = "df -h / | awk 'NR==2 {print $5}' | tr -d \"%\"";

/// Captured output of one remote command.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
}

/// Seam between probe orchestration and the transport running the commands;
/// lets tests drive the probes with canned output.
pub trait ProbeShell {
    fn run(&mut self, command: &str) -> Result<CommandOutput, FetchError>;
}

/// Source of one parsed usage snapshot. The collector job is generic over
/// this so tests can substitute a fake.
pub trait MetricsSource {
    fn fetch(&self) -> Result<RemoteUsage, FetchError>;
}

/// Run the three probes in order and parse each trimmed stdout into a
/// number.
pub fn collect_probes<S: ProbeShell>(shell: &mut S) -> Result<RemoteUsage, FetchError> {
    let cpu = probe(shell, "cpu", CPU_CMD)?;
    let mem = probe(shell, "mem", MEM_CMD)?;
    let disk = probe(shell, "disk", DISK_CMD)?;
    Ok(RemoteUsage { cpu, mem, disk })
}

fn probe<S: ProbeShell>(
    shell: &mut S,
    field: &'static str,
    command: &str,
) -> Result<f64, FetchError> {
    let out = shell.run(command)?;
    if !out.stderr.is_empty() {
        return Err(FetchError::Command {
            command: command.to_string(),
            detail: out.stderr,
        });
    }
    if out.exit_status != 0 {
        return Err(FetchError::Command {
            command: command.to_string(),
            detail: format!("exit status {}", out.exit_status),
        });
    }
    let text = out.stdout.trim();
    text.parse::<f64>().map_err(|_| FetchError::Parse {
        field,
        output: text.to_string(),
    })
}

/// Probes one host over SSH with password auth. No internal retry: one
/// `fetch` is one attempt, and the session is released on every exit path.
pub struct SshMetricsClient {
    cfg: RemoteConfig,
}

impl SshMetricsClient {
    pub fn new(cfg: RemoteConfig) -> Self {
        Self { cfg }
    }

    fn connect(&self) -> Result<Session, FetchError> {
        let addr = format!("{}:{}", self.cfg.host, self.cfg.port);
        let connect_err = |reason: String| FetchError::Connect {
            host: addr.clone(),
            reason,
        };

        let sockaddr = addr
            .to_socket_addrs()
            .map_err(|e| connect_err(e.to_string()))?
            .next()
            .ok_or_else(|| connect_err("no address resolved".to_string()))?;
        let tcp = TcpStream::connect_timeout(
            &sockaddr,
            Duration::from_secs(self.cfg.connect_timeout_secs),
        )
        .map_err(|e| connect_err(e.to_string()))?;

        let mut session = Session::new().map_err(|e| connect_err(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| connect_err(e.to_string()))?;

        self.verify_host_key(&session, &addr)?;

        info!("authenticating to {} as {}", addr, self.cfg.user);
        session
            .userauth_password(&self.cfg.user, &self.cfg.password)
            .map_err(|e| connect_err(e.to_string()))?;

        // Bound every subsequent blocking call on this session so a hung
        // probe cannot hang the cycle.
        session.set_timeout((self.cfg.command_timeout_secs * 1000) as u32);
        Ok(session)
    }

    fn verify_host_key(&self, session: &Session, addr: &str) -> Result<(), FetchError> {
        let actual = session
            .host_key_hash(ssh2::HashType::Sha256)
            .map(hex)
            .ok_or_else(|| FetchError::Connect {
                host: addr.to_string(),
                reason: "host key hash unavailable".to_string(),
            })?;
        match self.cfg.host_fingerprint.as_deref() {
            Some(pinned) if actual.eq_ignore_ascii_case(pinned) => Ok(()),
            Some(pinned) => Err(FetchError::Connect {
                host: addr.to_string(),
                reason: format!("host key mismatch: pinned {pinned}, got {actual}"),
            }),
            None => {
                warn!("no HOST_FINGERPRINT pinned; accepting host key {actual} for {addr}");
                Ok(())
            }
        }
    }
}

impl MetricsSource for SshMetricsClient {
    fn fetch(&self) -> Result<RemoteUsage, FetchError> {
        let session = self.connect()?;
        let usage = collect_probes(&mut SshShell { session: &session });
        debug!("closing session to {}", self.cfg.host);
        // Session drop disconnects the transport on success and failure alike
        usage
    }
}

struct SshShell<'s> {
    session: &'s Session,
}

impl ProbeShell for SshShell<'_> {
    fn run(&mut self, command: &str) -> Result<CommandOutput, FetchError> {
        let cmd_err = |detail: String| FetchError::Command {
            command: command.to_string(),
            detail,
        };

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| cmd_err(e.to_string()))?;
        channel.exec(command).map_err(|e| cmd_err(e.to_string()))?;

        let mut stdout = String::new();
        channel
            .read_to_string(&mut stdout)
            .map_err(|e| cmd_err(e.to_string()))?;
        let mut stderr = String::new();
        channel
            .stderr()
            .read_to_string(&mut stderr)
            .map_err(|e| cmd_err(e.to_string()))?;
        channel.wait_close().map_err(|e| cmd_err(e.to_string()))?;
        let exit_status = channel.exit_status().map_err(|e| cmd_err(e.to_string()))?;

        Ok(CommandOutput {
            stdout,
            stderr: stderr.trim().to_string(),
            exit_status,
        })
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
