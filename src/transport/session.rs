use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use super::types::SmtpReply;
use crate::routing::{RoutingError, SystemDns};

const MAX_REPLY_LINE: u64 = 4096;
const MAX_REPLY_LINES: usize = 128;

/// Opens SMTP channels. One channel per probe, never shared.
pub trait SmtpConnector {
    type Channel: SmtpChannel;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<Self::Channel>;
}

/// A connected SMTP client session.
///
/// Every call must return within its `timeout`; timeouts are reported as
/// `TimedOut` or `WouldBlock`, malformed replies as `InvalidData`.
pub trait SmtpChannel {
    fn read_reply(&mut self, timeout: Duration) -> io::Result<SmtpReply>;

    /// Write `command` followed by CRLF and read the reply.
    fn send_command(&mut self, command: &str, timeout: Duration) -> io::Result<SmtpReply>;

    fn close(&mut self);
}

/// Plain TCP transport (no STARTTLS; the probe never sends message data).
///
/// The exchange name is resolved through [`SystemDns`] as an absolute name,
/// inside the same budget as the connection attempts.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    dns: SystemDns,
}

impl TcpConnector {
    pub fn new(dns: SystemDns) -> Self {
        Self { dns }
    }
}

impl SmtpConnector for TcpConnector {
    type Channel = TcpChannel;

    fn connect(&self, host: &str, port: u16, timeout: Duration) -> io::Result<TcpChannel> {
        let started = Instant::now();
        let addrs = self
            .dns
            .lookup_host(host, timeout)
            .map_err(|err| host_lookup_error(host, err))?;
        let mut last_err = None;
        for ip in addrs {
            let left = time_left(started, timeout)?;
            match TcpStream::connect_timeout(&SocketAddr::new(ip, port), left) {
                Ok(stream) => return TcpChannel::new(stream),
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no address for {host}"),
            )
        }))
    }
}

fn host_lookup_error(host: &str, err: RoutingError) -> io::Error {
    match err {
        RoutingError::Timeout { .. } => io::Error::new(
            io::ErrorKind::TimedOut,
            format!("address lookup for {host} timed out"),
        ),
        RoutingError::NoRecords { .. } | RoutingError::DomainNotFound { .. } => {
            io::Error::new(io::ErrorKind::NotFound, format!("no address for {host}"))
        }
        other => io::Error::other(format!("address lookup for {host} failed: {other}")),
    }
}

#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl TcpChannel {
    fn new(stream: TcpStream) -> io::Result<Self> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self { stream, reader })
    }
}

impl SmtpChannel for TcpChannel {
    fn read_reply(&mut self, timeout: Duration) -> io::Result<SmtpReply> {
        let started = Instant::now();
        let mut code = None;
        let mut message_lines = Vec::new();
        loop {
            if message_lines.len() >= MAX_REPLY_LINES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "SMTP reply has too many lines",
                ));
            }
            self.stream
                .set_read_timeout(Some(time_left(started, timeout)?))?;
            let mut raw = String::new();
            let bytes = (&mut self.reader)
                .take(MAX_REPLY_LINE)
                .read_line(&mut raw)?;
            if bytes == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ));
            }
            if !raw.ends_with('\n') {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "SMTP reply line too long",
                ));
            }

            let line = parse_reply_line(&raw)?;
            match code {
                Some(existing) if existing != line.code => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "inconsistent SMTP reply codes: {} vs {}",
                            existing, line.code
                        ),
                    ));
                }
                Some(_) => {}
                None => code = Some(line.code),
            }
            message_lines.push(line.text);
            if !line.continuation {
                break;
            }
        }
        Ok(SmtpReply {
            code: code.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "SMTP reply missing status code")
            })?,
            message: message_lines.join("\n"),
        })
    }

    fn send_command(&mut self, command: &str, timeout: Duration) -> io::Result<SmtpReply> {
        if command.contains(['\r', '\n']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "SMTP command contains a line break",
            ));
        }
        let started = Instant::now();
        self.stream.set_write_timeout(Some(timeout))?;
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()?;
        self.read_reply(time_left(started, timeout)?)
    }

    fn close(&mut self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ReplyLine {
    pub code: u16,
    pub continuation: bool,
    pub text: String,
}

/// Parse one `CODE[ -]text` line, CRLF or LF terminated.
pub(crate) fn parse_reply_line(raw: &str) -> io::Result<ReplyLine> {
    let raw = raw
        .strip_suffix('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .unwrap_or(raw);

    let code_part = raw.get(..3).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP reply: '{raw}'"),
        )
    })?;
    if !code_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP status code: '{code_part}'"),
        ));
    }
    let code = code_part.parse::<u16>().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP status code: '{code_part}'"),
        )
    })?;

    let separator = raw.as_bytes().get(3).copied();
    if !matches!(separator, None | Some(b' ') | Some(b'-')) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("invalid SMTP reply: '{raw}'"),
        ));
    }
    Ok(ReplyLine {
        code,
        continuation: separator == Some(b'-'),
        text: raw.get(4..).unwrap_or_default().to_string(),
    })
}

fn time_left(started: Instant, timeout: Duration) -> io::Result<Duration> {
    timeout
        .checked_sub(started.elapsed())
        .filter(|left| !left.is_zero())
        .ok_or_else(|| io::Error::new(io::ErrorKind::TimedOut, "SMTP time budget exhausted"))
}
