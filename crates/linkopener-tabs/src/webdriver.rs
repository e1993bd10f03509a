//! Minimal W3C WebDriver client over blocking HTTP/JSON

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::{json, Value};

use crate::driver::BrowserDriver;
use crate::error::DriverError;
use crate::handle::TabHandle;

/// Upper bound for one WebDriver command; navigation can block on slow pages
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct WebDriverClient {
    http: Client,
    base_url: String,
    session_id: String,
}

impl WebDriverClient {
    pub(crate) fn http_client() -> Result<Client, DriverError> {
        Ok(Client::builder().timeout(REQUEST_TIMEOUT).build()?)
    }

    /// Create a session on the endpoint at `base_url` with the given capabilities
    pub fn new_session(base_url: &str, capabilities: Value) -> Result<Self, DriverError> {
        let http = Self::http_client()?;
        let base_url = base_url.trim_end_matches('/').to_string();

        let body = json!({ "capabilities": { "alwaysMatch": capabilities } });
        let value = send(http.post(format!("{}/session", base_url)).json(&body))?;

        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| DriverError::Protocol {
                error: "session not created".to_string(),
                message: "response carried no sessionId".to_string(),
            })?
            .to_string();

        tracing::debug!(session_id = %session_id, "Created WebDriver session");

        Ok(Self {
            http,
            base_url,
            session_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/session/{}{}", self.base_url, self.session_id, path)
    }
}

/// Whether the endpoint's `/status` reports ready
pub(crate) fn is_ready(http: &Client, base_url: &str) -> bool {
    match send(http.get(format!("{}/status", base_url))) {
        Ok(value) => value.get("ready").and_then(Value::as_bool).unwrap_or(false),
        Err(_) => false,
    }
}

/// Send a command and unwrap the `value` member, turning error objects into errors
fn send(request: RequestBuilder) -> Result<Value, DriverError> {
    let response = request.send()?;
    let body = response.text()?;
    let mut body: Value = serde_json::from_str(&body)?;
    let value = body
        .get_mut("value")
        .map(Value::take)
        .unwrap_or(Value::Null);
    unwrap_value(value)
}

fn unwrap_value(value: Value) -> Result<Value, DriverError> {
    if let Some(error) = value.get("error").and_then(Value::as_str) {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(DriverError::Protocol {
            error: error.to_string(),
            message: message.to_string(),
        });
    }
    Ok(value)
}

fn handles(value: Value) -> Result<Vec<TabHandle>, DriverError> {
    Ok(serde_json::from_value(value)?)
}

impl BrowserDriver for WebDriverClient {
    fn current_window(&self) -> Result<TabHandle, DriverError> {
        let value = send(self.http.get(self.url("/window")))?;
        Ok(serde_json::from_value(value)?)
    }

    fn window_handles(&self) -> Result<Vec<TabHandle>, DriverError> {
        handles(send(self.http.get(self.url("/window/handles")))?)
    }

    fn navigate(&self, url: &str) -> Result<(), DriverError> {
        send(self.http.post(self.url("/url")).json(&json!({ "url": url })))?;
        Ok(())
    }

    fn execute_script(&self, script: &str, args: Vec<Value>) -> Result<Value, DriverError> {
        let body = json!({ "script": script, "args": args });
        send(self.http.post(self.url("/execute/sync")).json(&body))
    }

    fn switch_to(&self, handle: &TabHandle) -> Result<(), DriverError> {
        let body = json!({ "handle": handle.as_str() });
        send(self.http.post(self.url("/window")).json(&body))?;
        Ok(())
    }

    fn close_window(&self) -> Result<Vec<TabHandle>, DriverError> {
        handles(send(self.http.delete(self.url("/window")))?)
    }

    fn quit(&self) -> Result<(), DriverError> {
        send(self.http.delete(self.url("")))?;
        tracing::debug!(session_id = %self.session_id, "Deleted WebDriver session");
        Ok(())
    }
}
