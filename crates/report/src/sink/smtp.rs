use crate::error::{ErrorKind, Result};
use crate::sink::ReportSink;
use crate::{Rendered, Renderer, Report};
use exn::ResultExt;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const TIMEOUT: Duration = Duration::from_secs(30);

/// Sends reports through an SMTP relay using STARTTLS.
pub struct SmtpSink {
    server: String,
    port: u16,
    credentials: Option<Credentials>,
    from: Mailbox,
    to: Mailbox,
    renderer: Arc<Renderer>,
}
impl SmtpSink {
    /// Both addresses are parsed here so a typo shows up before the run does
    /// any work.
    pub fn new(server: impl Into<String>, port: u16, from: &str, to: &str, renderer: Arc<Renderer>) -> Result<Self> {
        Ok(Self {
            server: server.into(),
            port,
            credentials: None,
            from: mailbox(from)?,
            to: mailbox(to)?,
            renderer,
        })
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username.into(), password.into()));
        self
    }

    fn message(&self, rendered: &Rendered) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(rendered.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(rendered.text.clone(), rendered.html.clone()))
            .or_raise(|| ErrorKind::Smtp)
    }

    fn transport(&self) -> Result<SmtpTransport> {
        let mut builder = SmtpTransport::starttls_relay(&self.server)
            .or_raise(|| ErrorKind::Smtp)?
            .port(self.port)
            .timeout(Some(TIMEOUT));
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }
        Ok(builder.build())
    }
}

fn mailbox(address: &str) -> Result<Mailbox> {
    address.parse::<Mailbox>().or_raise(|| ErrorKind::InvalidAddress(address.to_string()))
}

impl ReportSink for SmtpSink {
    fn name(&self) -> &str {
        "smtp"
    }

    #[instrument(skip_all, fields(server = %self.server, port = self.port))]
    fn deliver(&self, report: &Report) -> Result<()> {
        let rendered = self.renderer.render(report)?;
        let message = self.message(&rendered)?;
        let response = self.transport()?.send(&message).or_raise(|| ErrorKind::Smtp)?;
        tracing::debug!(code = %response.code(), "Report accepted by relay");
        Ok(())
    }
}
