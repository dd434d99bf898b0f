//! Page error and console capture
//!
//! Listeners are attached before navigation and append to shared logs from
//! background tasks; checks read snapshots after acting on the page.

use std::sync::{Arc, Mutex, PoisonError};

use chromiumoxide::cdp::js_protocol::runtime::{
    EventConsoleApiCalled, EventExceptionThrown, ExceptionDetails, RemoteObject,
};
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;

use crate::common::Result;

/// Append-only message log shared with a listener task
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn push(&self, entry: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    /// Copy of every entry in arrival order
    pub fn snapshot(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Uncaught exceptions and console output of one page
pub struct PageEvents {
    pub errors: EventLog,
    pub console: EventLog,
    tasks: Vec<JoinHandle<()>>,
}

impl PageEvents {
    /// Subscribe to `Runtime.exceptionThrown` and `Runtime.consoleAPICalled`
    pub async fn attach(page: &Page) -> Result<Self> {
        let errors = EventLog::default();
        let console = EventLog::default();

        let mut exceptions = page.event_listener::<EventExceptionThrown>().await?;
        let error_log = errors.clone();
        let error_task = tokio::spawn(async move {
            while let Some(event) = exceptions.next().await {
                let message = describe_exception(&event.exception_details);
                tracing::debug!(%message, "page error");
                error_log.push(message);
            }
        });

        let mut messages = page.event_listener::<EventConsoleApiCalled>().await?;
        let console_log = console.clone();
        let console_task = tokio::spawn(async move {
            while let Some(event) = messages.next().await {
                let kind = format!("{:?}", event.r#type).to_lowercase();
                let parts = event.args.iter().map(remote_text).collect();
                console_log.push(format_console(&kind, parts));
            }
        });

        Ok(Self {
            errors,
            console,
            tasks: vec![error_task, console_task],
        })
    }
}

impl Drop for PageEvents {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Human-readable form of an uncaught exception
pub fn describe_exception(details: &ExceptionDetails) -> String {
    let description = details
        .exception
        .as_ref()
        .and_then(|e| e.description.clone());
    format_exception(&details.text, description.as_deref())
}

/// Prefer the thrown value's description (message + stack) over the summary
pub fn format_exception(text: &str, description: Option<&str>) -> String {
    match description {
        Some(desc) if !desc.is_empty() => format!("PAGE ERROR: {}", desc),
        _ => format!("PAGE ERROR: {}", text),
    }
}

fn remote_text(object: &RemoteObject) -> String {
    match (&object.value, &object.description) {
        (Some(serde_json::Value::String(s)), _) => s.clone(),
        (Some(value), _) => value.to_string(),
        (None, Some(desc)) => desc.clone(),
        (None, None) => String::new(),
    }
}

/// `[kind] arg arg ...`
pub fn format_console(kind: &str, parts: Vec<String>) -> String {
    format!("[{}] {}", kind, parts.join(" "))
}
