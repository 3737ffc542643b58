//! Scripted FTP server for integration tests.

#![allow(dead_code)]

use shapecam_ftp::FtpConnectionConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// What the server answers to `PASV`.
#[derive(Debug, Clone)]
pub enum PasvMode {
    /// Open a data listener and announce it as an IPv4 tuple.
    Reachable,
    /// Announce the data port with an all-zero host.
    ZeroHost,
    /// Announce a port nobody listens on.
    Unreachable,
    /// Answer with this literal line.
    Literal(String),
    /// Never answer.
    Silent,
}

#[derive(Debug, Clone)]
pub struct MockOptions {
    pub pasv: PasvMode,
    pub pass_reply: String,
    pub stor_reply: String,
    /// Drop the data connection unread instead of draining it.
    pub reset_data: bool,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            pasv: PasvMode::Reachable,
            pass_reply: "230 Login successful.".into(),
            stor_reply: "150 Ok to send data.".into(),
            reset_data: false,
        }
    }
}

/// Everything the server observed on the session that issued commands.
#[derive(Debug, Default)]
pub struct MockRecord {
    pub commands: Vec<String>,
    pub received: Vec<u8>,
    pub data_connections: usize,
    /// The client hung up after QUIT.
    pub closed_after_quit: bool,
}

impl MockRecord {
    pub fn verbs(&self) -> Vec<String> {
        self.commands
            .iter()
            .map(|c| c.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }
}

pub struct MockFtp {
    pub addr: SocketAddr,
    handle: JoinHandle<MockRecord>,
}

impl MockFtp {
    pub async fn start(opts: MockOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let record = serve(stream, &opts).await;
                // Connections without commands are reachability probes.
                if !record.commands.is_empty() {
                    return record;
                }
            }
        });
        Self { addr, handle }
    }

    pub fn config(&self, user: &str, pass: &str) -> FtpConnectionConfig {
        FtpConnectionConfig {
            host: "127.0.0.1".into(),
            port: self.addr.port(),
            username: user.into(),
            password: pass.into(),
            connect_timeout_sec: 5,
            reply_poll_attempts: 100,
            reply_poll_interval_ms: 20,
            ..Default::default()
        }
    }

    /// Wait until the client has closed the command session.
    pub async fn finish(self) -> MockRecord {
        timeout(Duration::from_secs(10), self.handle)
            .await
            .expect("mock server did not see the control connection close")
            .unwrap()
    }
}

async fn serve(stream: TcpStream, opts: &MockOptions) -> MockRecord {
    let (rd, mut wr) = stream.into_split();
    let mut lines = BufReader::new(rd).lines();
    let mut record = MockRecord::default();
    let mut data_listener: Option<TcpListener> = None;
    let mut quit_seen = false;

    wr.write_all(b"220 (mockFTPd 1.0)\r\n").await.ok();

    while let Ok(Some(line)) = lines.next_line().await {
        record.commands.push(line.clone());
        let verb = line.split(' ').next().unwrap_or_default().to_ascii_uppercase();
        let reply = match verb.as_str() {
            "USER" => "331 Please specify the password.".to_string(),
            "PASS" => opts.pass_reply.clone(),
            "TYPE" => "200 Switching to Binary mode.".to_string(),
            "PASV" => match pasv_reply(&opts.pasv, &mut data_listener).await {
                Some(r) => r,
                None => continue,
            },
            "STOR" => {
                wr.write_all(format!("{}\r\n", opts.stor_reply).as_bytes())
                    .await
                    .ok();
                if !opts.stor_reply.starts_with('1') {
                    continue;
                }
                let Some(listener) = data_listener.take() else {
                    continue;
                };
                let (mut data, _) = listener.accept().await.unwrap();
                record.data_connections += 1;
                if opts.reset_data {
                    drop(data);
                    drop(listener);
                    "426 Connection closed; transfer aborted.".to_string()
                } else {
                    data.read_to_end(&mut record.received).await.ok();
                    "226 Transfer complete.".to_string()
                }
            }
            "QUIT" => {
                quit_seen = true;
                "221 Goodbye.".to_string()
            }
            _ => "502 Command not implemented.".to_string(),
        };
        wr.write_all(format!("{}\r\n", reply).as_bytes()).await.ok();
    }

    record.closed_after_quit = quit_seen;
    record
}

async fn pasv_reply(mode: &PasvMode, slot: &mut Option<TcpListener>) -> Option<String> {
    let announce = |port: u16, host: &str| {
        format!(
            "227 Entering Passive Mode ({},{},{}).",
            host,
            port / 256,
            port % 256
        )
    };
    match mode {
        PasvMode::Reachable | PasvMode::ZeroHost => {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            *slot = Some(listener);
            let host = if matches!(mode, PasvMode::ZeroHost) {
                "0,0,0,0"
            } else {
                "127,0,0,1"
            };
            Some(announce(port, host))
        }
        PasvMode::Unreachable => {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let port = listener.local_addr().unwrap().port();
            drop(listener);
            Some(announce(port, "127,0,0,1"))
        }
        PasvMode::Literal(text) => Some(text.clone()),
        PasvMode::Silent => None,
    }
}
