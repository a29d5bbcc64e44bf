use std::io;
use std::time::Duration;

use tracing::{debug, trace};

use super::deadline::Deadline;
use super::error::is_timeout;
use super::session::{SmtpChannel, SmtpConnector};
use super::{ProbeError, ProbeOutcome, ProbeStage, SmtpReply};
use crate::routing::MailRoute;

/// Identity and addresses used for one probe.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    /// Name announced with `HELO`.
    pub helo: &'a str,
    /// Claimed sender for `MAIL FROM`.
    pub from: &'a str,
    /// Address under test, sent with `RCPT TO`.
    pub to: &'a str,
}

/// Run `HELO` / `MAIL FROM` / `RCPT TO` against `route` and report what the
/// server said about the recipient. No message data is ever sent.
///
/// `timeout` bounds the whole session, connect included. The channel is closed
/// before this returns, on every path.
pub fn probe<C>(
    connector: &C,
    route: &MailRoute,
    port: u16,
    envelope: &Envelope<'_>,
    timeout: Duration,
) -> Result<ProbeOutcome, ProbeError>
where
    C: SmtpConnector + ?Sized,
{
    let deadline = Deadline::start(timeout);
    let budget = deadline.remaining(ProbeStage::Connect)?;
    let channel = connector
        .connect(&route.exchange, port, budget)
        .map_err(|err| {
            if is_timeout(&err) {
                ProbeError::Timeout {
                    stage: ProbeStage::Connect,
                    budget: deadline.budget(),
                }
            } else {
                ProbeError::connect(&route.exchange, port, err)
            }
        })?;
    let mut session = Session { channel, deadline };

    let greeting = session.greeting()?;
    if !greeting.is_positive_completion() {
        return Ok(session.reject(ProbeStage::Greeting, &greeting));
    }

    let helo = session.exchange(ProbeStage::Helo, &format!("HELO {}", envelope.helo))?;
    if !helo.is_positive_completion() {
        return Ok(session.reject(ProbeStage::Helo, &helo));
    }

    let mail = session.exchange(
        ProbeStage::MailFrom,
        &format!("MAIL FROM:<{}>", envelope.from),
    )?;
    if !mail.is_positive_completion() {
        return Ok(session.reject(ProbeStage::MailFrom, &mail));
    }

    let rcpt = session.exchange(ProbeStage::RcptTo, &format!("RCPT TO:<{}>", envelope.to))?;
    let outcome = ProbeOutcome::from_recipient_reply(&rcpt);
    session.quit();

    debug!(
        exchange = %route.exchange,
        code = rcpt.code,
        accepted = outcome.accepted,
        "recipient probed"
    );
    Ok(outcome)
}

/// Owns the channel for the duration of a probe and closes it on drop.
struct Session<Ch: SmtpChannel> {
    channel: Ch,
    deadline: Deadline,
}

impl<Ch: SmtpChannel> Session<Ch> {
    fn greeting(&mut self) -> Result<SmtpReply, ProbeError> {
        let left = self.deadline.remaining(ProbeStage::Greeting)?;
        let reply = self
            .channel
            .read_reply(left)
            .map_err(|err| self.failure(ProbeStage::Greeting, err))?;
        trace!(code = reply.code, message = %reply.message, "S");
        Ok(reply)
    }

    fn exchange(&mut self, stage: ProbeStage, command: &str) -> Result<SmtpReply, ProbeError> {
        let left = self.deadline.remaining(stage)?;
        trace!(%stage, command, "C");
        let reply = self
            .channel
            .send_command(command, left)
            .map_err(|err| self.failure(stage, err))?;
        trace!(code = reply.code, message = %reply.message, "S");
        Ok(reply)
    }

    fn reject(&mut self, stage: ProbeStage, reply: &SmtpReply) -> ProbeOutcome {
        debug!(%stage, code = reply.code, "server refused the probe");
        self.quit();
        ProbeOutcome::rejected(stage, reply)
    }

    /// Best effort: the outcome is already decided.
    fn quit(&mut self) {
        if let Ok(left) = self.deadline.remaining(ProbeStage::Quit) {
            if let Err(err) = self.channel.send_command("QUIT", left) {
                trace!(error = %err, "QUIT failed");
            }
        }
    }

    fn failure(&self, stage: ProbeStage, err: io::Error) -> ProbeError {
        if is_timeout(&err) {
            ProbeError::Timeout {
                stage,
                budget: self.deadline.budget(),
            }
        } else {
            ProbeError::protocol(stage, err)
        }
    }
}

impl<Ch: SmtpChannel> Drop for Session<Ch> {
    fn drop(&mut self) {
        self.channel.close();
    }
}
