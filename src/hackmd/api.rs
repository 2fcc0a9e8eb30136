use crate::config::Credential;
use crate::error::{HackmdError, Result};
use crate::model::{Note, Team, User};
use serde::Serialize;
use std::time::Duration;

/// One conservative timeout for every request. The API is interactive;
/// anything slower than this is effectively down.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking client for the HackMD REST API.
///
/// Non-2xx responses become [`HackmdError::Remote`] with the status and
/// body; connection and parse failures surface as
/// [`HackmdError::Transport`].
pub struct ApiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

#[derive(Serialize)]
struct NotePayload<'a> {
    title: &'a str,
    content: &'a str,
}

impl ApiClient {
    pub fn new(credential: &Credential) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: credential.api_base_url.trim_end_matches('/').to_string(),
            token: credential.api_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response> {
        let response = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()?;
        check_status(response)
    }

    pub fn me(&self) -> Result<User> {
        Ok(self.get("/me")?.json()?)
    }

    pub fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.get("/teams")?.json()?)
    }

    pub fn notes(&self) -> Result<Vec<Note>> {
        Ok(self.get("/notes")?.json()?)
    }

    pub fn note(&self, id: &str) -> Result<Note> {
        Ok(self.get(&format!("/notes/{}", id))?.json()?)
    }

    pub fn create_note(&self, title: &str, content: &str) -> Result<Note> {
        let response = self
            .http
            .post(self.url("/notes"))
            .bearer_auth(&self.token)
            .json(&NotePayload { title, content })
            .send()?;
        Ok(check_status(response)?.json()?)
    }
}

fn check_status(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(HackmdError::Remote {
        status: status.as_u16(),
        body,
    })
}
