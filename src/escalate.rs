//! Failure escalation
//!
//! Every reported failure is logged, then emailed to operators through the
//! `sqlEmail` stored procedure. A failed notification gets exactly one
//! follow-up attempt describing the procedure failure; after that it is only
//! logged.

use crate::error::{Error, Result};
use crate::sink::{ProcedureParam, ProcedureSink};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Subject of the follow-up sent when a notification itself fails
pub const PROCEDURE_FAILURE_SUBJECT: &str = "Unable to connect to SQL stored procedure";

/// Most bytes of an unparseable response body quoted in a notification
pub const RESPONSE_EXCERPT_LIMIT: usize = 2048;

/// Logs failures and notifies operators
#[derive(Clone)]
pub struct Escalator {
    sink: Arc<dyn ProcedureSink>,
    procedure: String,
    recipients: String,
}

impl Escalator {
    /// Notify `recipients` through `procedure` on `sink`
    pub fn new(
        sink: Arc<dyn ProcedureSink>,
        procedure: impl Into<String>,
        recipients: impl Into<String>,
    ) -> Self {
        Self {
            sink,
            procedure: procedure.into(),
            recipients: recipients.into(),
        }
    }

    /// Log `err` and notify operators.
    ///
    /// Returns the notification outcome; callers decide what to do with the
    /// original error.
    pub async fn escalate(&self, context: &str, err: &Error) -> Result<()> {
        error!("{}: {}", context, err);
        let mut body = format!("{context}\nThe following error occurred: {err}");
        if let Error::MalformedResponse { body: response, .. } = err {
            debug!("Unparseable response body: {}", response);
            body.push_str("\nThe following result errored: ");
            body.push_str(excerpt(response, RESPONSE_EXCERPT_LIMIT));
        }
        self.notify(err.subject(), &body).await
    }

    /// Send a notification. On failure one follow-up notification is
    /// attempted, then the failure is logged and returned.
    pub async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        let Err(first) = self.send(subject, body).await else {
            return Ok(());
        };
        error!("Command returned error from SQL: {}", first);

        let follow_up = format!(
            "Unable to connect to SQL stored procedure.\n\
             The following error occurred while running stored procedure: {first}\n\
             The following information was sent to the SQL Server:\n\tSubject: {subject}\n\tBody: {body}"
        );
        match self.send(PROCEDURE_FAILURE_SUBJECT, &follow_up).await {
            Ok(()) => Err(Error::notification(first.to_string())),
            Err(second) => {
                warn!("Giving up on notification '{}': {}", subject, second);
                Err(Error::notification(format!("{first}; follow-up failed: {second}")))
            }
        }
    }

    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let params = [
            ProcedureParam::new("recepients", self.recipients.as_str()),
            ProcedureParam::new("subject", subject),
            ProcedureParam::new("body", body),
        ];
        self.sink.call(&self.procedure, &params).await
    }
}

/// Leading part of `text`, at most `limit` bytes, cut on a char boundary
fn excerpt(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl std::fmt::Debug for Escalator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Escalator")
            .field("backend", &self.sink.backend_name())
            .field("procedure", &self.procedure)
            .field("recipients", &self.recipients)
            .finish()
    }
}
