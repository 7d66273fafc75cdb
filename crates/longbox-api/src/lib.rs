// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::io::{BufRead, BufReader, Lines};
use std::time::Duration;

use longbox_app::{Issue, MassEditAction, QueueItem, RootFolder, RootFolderId, Volume, VolumeId};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid server URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("server.api_key must not be empty")]
    MissingApiKey,
    #[error("cannot reach {base_url} -- is the server running? ({source})")]
    Connect {
        base_url: String,
        source: reqwest::Error,
    },
    #[error("server error ({code}): {message}")]
    Status { code: u16, message: String },
    #[error("volume {0} not found")]
    VolumeNotFound(VolumeId),
    #[error("decode {what}: {source}")]
    Decode {
        what: &'static str,
        source: reqwest::Error,
    },
    #[error("build HTTP client: {0}")]
    Http(reqwest::Error),
    #[error("read event stream: {0}")]
    Stream(std::io::Error),
}

/// A remote catalogue match returned by the volume search endpoint.
/// These are candidates for import, not library members, so they carry
/// no local identifier.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    pub comicvine_id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub publisher: Option<String>,
    pub issue_count: i64,
}

/// Push event decoded off the server's line-delimited JSON stream.
/// Unknown event kinds and unknown mass-edit identifiers are skipped,
/// so a newer server never breaks an older client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    MassEditorStatus {
        action: MassEditAction,
        current_item: i64,
        total_items: i64,
    },
    VolumeUpdated(VolumeId),
    QueueUpdated,
    TaskFinished(String),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    event: String,
    identifier: Option<String>,
    volume_id: Option<i64>,
    task: Option<String>,
    current_item: Option<i64>,
    total_items: Option<i64>,
}

fn decode_event(line: &str) -> Option<PushEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let raw: RawEvent = serde_json::from_str(trimmed).ok()?;
    match raw.event.as_str() {
        "mass_editor_status" => {
            let action = MassEditAction::parse(raw.identifier.as_deref()?)?;
            Some(PushEvent::MassEditorStatus {
                action,
                current_item: raw.current_item?,
                total_items: raw.total_items?,
            })
        }
        "volume_updated" => Some(PushEvent::VolumeUpdated(VolumeId::new(raw.volume_id?))),
        "queue_updated" => Some(PushEvent::QueueUpdated),
        "task_finished" => Some(PushEvent::TaskFinished(raw.task?)),
        _ => None,
    }
}

/// Blocking iterator over the push-event stream. Ends when the server
/// closes the connection; a read error ends the stream after yielding it.
pub struct EventStream {
    done: bool,
    lines: Lines<BufReader<Response>>,
}

impl Iterator for EventStream {
    type Item = Result<PushEvent, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Ok(line)) => line,
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(ApiError::Stream(error)));
                }
            };

            if let Some(event) = decode_event(&line) {
                return Some(Ok(event));
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct MassEditRequest<'a> {
    action: &'static str,
    volume_ids: &'a [VolumeId],
    #[serde(skip_serializing_if = "Option::is_none")]
    root_folder_id: Option<RootFolderId>,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    api_key: String,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        Url::parse(&base_url).map_err(|source| ApiError::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;
        if api_key.trim().is_empty() {
            return Err(ApiError::MissingApiKey);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            base_url,
            api_key: api_key.to_owned(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .map_err(|source| ApiError::Connect {
                base_url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }
        Ok(response)
    }

    pub fn list_volumes(&self) -> Result<Vec<Volume>, ApiError> {
        debug!(base_url = %self.base_url, "list volumes");
        let response = self.send(self.http.get(format!("{}/volumes", self.base_url)))?;
        response.json().map_err(|source| ApiError::Decode {
            what: "volume list",
            source,
        })
    }

    pub fn get_volume(&self, id: VolumeId) -> Result<Volume, ApiError> {
        debug!(%id, "get volume");
        let response = self
            .http
            .get(format!("{}/volumes/{}", self.base_url, id.get()))
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .map_err(|source| ApiError::Connect {
                base_url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::VolumeNotFound(id));
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }
        response.json().map_err(|source| ApiError::Decode {
            what: "volume",
            source,
        })
    }

    pub fn volume_issues(&self, id: VolumeId) -> Result<Vec<Issue>, ApiError> {
        debug!(%id, "list issues");
        let response = self.send(
            self.http
                .get(format!("{}/volumes/{}/issues", self.base_url, id.get())),
        )?;
        response.json().map_err(|source| ApiError::Decode {
            what: "issue list",
            source,
        })
    }

    pub fn update_volume(&self, volume: &Volume) -> Result<Volume, ApiError> {
        debug!(id = %volume.id, "update volume");
        let response = self.send(
            self.http
                .put(format!("{}/volumes/{}", self.base_url, volume.id.get()))
                .json(volume),
        )?;
        response.json().map_err(|source| ApiError::Decode {
            what: "updated volume",
            source,
        })
    }

    pub fn delete_volume(&self, id: VolumeId, delete_folder: bool) -> Result<(), ApiError> {
        debug!(%id, delete_folder, "delete volume");
        self.send(
            self.http
                .delete(format!("{}/volumes/{}", self.base_url, id.get()))
                .query(&[("delete_folder", if delete_folder { "true" } else { "false" })]),
        )?;
        Ok(())
    }

    pub fn search_volumes(&self, query: &str) -> Result<Vec<SearchResult>, ApiError> {
        debug!(query, "search remote volumes");
        let response = self.send(
            self.http
                .get(format!("{}/volumes/search", self.base_url))
                .query(&[("query", query)]),
        )?;
        response.json().map_err(|source| ApiError::Decode {
            what: "search results",
            source,
        })
    }

    pub fn root_folders(&self) -> Result<Vec<RootFolder>, ApiError> {
        let response = self.send(self.http.get(format!("{}/rootfolder", self.base_url)))?;
        response.json().map_err(|source| ApiError::Decode {
            what: "root folders",
            source,
        })
    }

    pub fn queue(&self) -> Result<Vec<QueueItem>, ApiError> {
        let response = self.send(self.http.get(format!("{}/queue", self.base_url)))?;
        response.json().map_err(|source| ApiError::Decode {
            what: "queue",
            source,
        })
    }

    /// Kick off a named background task on the server. The result arrives
    /// later as a `task_finished` push event.
    pub fn run_command(&self, task: &str) -> Result<(), ApiError> {
        debug!(task, "run server task");
        self.send(
            self.http
                .post(format!("{}/system/tasks", self.base_url))
                .json(&serde_json::json!({ "task": task })),
        )?;
        Ok(())
    }

    pub fn mass_edit(
        &self,
        action: MassEditAction,
        volume_ids: &[VolumeId],
        root_folder_id: Option<RootFolderId>,
    ) -> Result<(), ApiError> {
        debug!(action = action.as_str(), count = volume_ids.len(), "mass edit");
        self.send(
            self.http
                .post(format!("{}/masseditor", self.base_url))
                .json(&MassEditRequest {
                    action: action.as_str(),
                    volume_ids,
                    root_folder_id,
                }),
        )?;
        Ok(())
    }

    /// Open the push-event channel. The server keeps the response open and
    /// writes one JSON object per line; progress for long operations flows
    /// through here instead of polling.
    pub fn event_stream(&self) -> Result<EventStream, ApiError> {
        debug!(base_url = %self.base_url, "open event stream");
        let response = self
            .http
            .get(format!("{}/events/stream", self.base_url))
            .query(&[("api_key", self.api_key.as_str())])
            .timeout(Duration::from_secs(60 * 60 * 24))
            .send()
            .map_err(|source| ApiError::Connect {
                base_url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        Ok(EventStream {
            done: false,
            lines: BufReader::new(response).lines(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return ApiError::Status {
            code: status.as_u16(),
            message: error,
        };
    }

    if body.len() < 100 && !body.contains('{') && !body.is_empty() {
        return ApiError::Status {
            code: status.as_u16(),
            message: body.to_owned(),
        };
    }

    ApiError::Status {
        code: status.as_u16(),
        message: "unexpected response".to_owned(),
    }
}
