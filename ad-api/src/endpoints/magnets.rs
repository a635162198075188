//! Magnet endpoints: upload (magnet URIs and torrent files), status,
//! delete, restart and instant availability.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;
use ad_core::error::{AdError, AdResult};
use crate::client::{list_params, require_non_empty, ApiClient};
use crate::response::{ApiErrorBody, MessageData};
use crate::routes::Endpoint;

const TORRENT_MIME: &str = "application/x-bittorrent";

/// One entry of a `magnet/upload` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedMagnet {
    #[serde(default)]
    pub magnet: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub id: Option<u64>,
    /// Per-magnet error; the request as a whole still succeeds.
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// One entry of a `magnet/upload/file` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Status of a magnet in the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetStatus {
    pub id: u64,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub hash: Option<String>,
    /// Human-readable status, e.g. "Downloading" or "Ready".
    #[serde(default)]
    pub status: String,
    /// 0-3 processing, 4 ready, 5+ error.
    #[serde(rename = "statusCode", default)]
    pub status_code: i64,
    #[serde(default)]
    pub downloaded: u64,
    #[serde(default)]
    pub uploaded: u64,
    #[serde(default)]
    pub seeders: u64,
    #[serde(rename = "downloadSpeed", default)]
    pub download_speed: u64,
    #[serde(rename = "uploadSpeed", default)]
    pub upload_speed: u64,
    #[serde(rename = "uploadDate", default)]
    pub upload_date: i64,
    #[serde(rename = "completionDate", default)]
    pub completion_date: i64,
    #[serde(default)]
    pub links: Vec<MagnetLink>,
}

/// A file link of a finished magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MagnetLink {
    pub link: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub size: u64,
}

impl MagnetStatus {
    /// Whether the magnet has finished and exposes links.
    pub fn is_ready(&self) -> bool {
        self.status_code == 4
    }

    /// Whether the service reported an error for this magnet.
    pub fn is_error(&self) -> bool {
        self.status_code >= 5
    }

    /// Download progress in percent.
    pub fn progress(&self) -> f64 {
        if self.size == 0 {
            return if self.is_ready() { 100.0 } else { 0.0 };
        }
        (self.downloaded as f64 / self.size as f64 * 100.0).min(100.0)
    }
}

/// Instant availability of a magnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantAvailability {
    #[serde(default)]
    pub magnet: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub instant: bool,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Result of `magnet/restart` for several ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestartResult {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub magnets: Vec<RestartedMagnet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartedMagnet {
    #[serde(default)]
    pub magnet: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Debug, Deserialize)]
struct MagnetsData<T> {
    magnets: T,
}

#[derive(Debug, Deserialize)]
struct FilesData {
    files: Vec<UploadedFile>,
}

impl ApiClient {
    /// Upload magnet URIs or info hashes.
    pub async fn upload_magnets<S: AsRef<str>>(&self, magnets: &[S]) -> AdResult<Vec<UploadedMagnet>> {
        require_non_empty("magnets", magnets)?;
        let params = list_params("magnets", magnets);
        let data: MagnetsData<Vec<UploadedMagnet>> =
            self.call(Endpoint::MagnetUpload, &params).await?;
        Ok(data.magnets)
    }

    /// Upload `.torrent` files. Every path must point to an existing file.
    pub async fn upload_torrent_files<P: AsRef<Path>>(&self, paths: &[P]) -> AdResult<Vec<UploadedFile>> {
        if paths.is_empty() {
            return Err(AdError::InvalidInput("no files to upload".into()));
        }
        for (i, p) in paths.iter().enumerate() {
            if !p.as_ref().is_file() {
                return Err(AdError::InvalidInput(format!(
                    "file path is not valid ({i}: {})",
                    p.as_ref().display()
                )));
            }
        }

        let mut form = Form::new();
        for (i, p) in paths.iter().enumerate() {
            let path = p.as_ref();
            let bytes = tokio::fs::read(path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("file{i}.torrent"));
            debug!("attaching {} ({} bytes)", name, bytes.len());
            let part = Part::bytes(bytes)
                .file_name(name)
                .mime_str(TORRENT_MIME)
                .map_err(|e| AdError::Internal(format!("invalid mime type: {e}")))?;
            form = form.part(format!("files[{i}]"), part);
        }

        let data: FilesData = self.call_multipart(Endpoint::MagnetUploadFile, form).await?;
        Ok(data.files)
    }

    /// Status of one magnet.
    pub async fn magnet_status(&self, id: u64) -> AdResult<MagnetStatus> {
        let params = vec![("id".to_string(), id.to_string())];
        let data: MagnetsData<OneOrMany<MagnetStatus>> =
            self.call(Endpoint::MagnetStatus, &params).await?;
        match data.magnets {
            OneOrMany::One(status) => Ok(status),
            OneOrMany::Many(list) => list
                .into_iter()
                .find(|m| m.id == id)
                .ok_or_else(|| AdError::api("MAGNET_INVALID_ID", format!("magnet {id} not found"))),
        }
    }

    /// Status of every magnet in the account.
    pub async fn magnets(&self) -> AdResult<Vec<MagnetStatus>> {
        let data: MagnetsData<OneOrMany<MagnetStatus>> =
            self.call(Endpoint::MagnetStatus, &[]).await?;
        Ok(match data.magnets {
            OneOrMany::One(status) => vec![status],
            OneOrMany::Many(list) => list,
        })
    }

    /// Delete a magnet.
    pub async fn delete_magnet(&self, id: u64) -> AdResult<String> {
        let params = vec![("id".to_string(), id.to_string())];
        let data: MessageData = self.call(Endpoint::MagnetDelete, &params).await?;
        Ok(data.message)
    }

    /// Restart failed magnets. A single id is sent as `id`, several as `ids[]`.
    pub async fn restart_magnets(&self, ids: &[u64]) -> AdResult<RestartResult> {
        let params = match ids {
            [] => return Err(AdError::InvalidInput("no magnet id to restart".into())),
            [id] => vec![("id".to_string(), id.to_string())],
            many => {
                let ids: Vec<String> = many.iter().map(u64::to_string).collect();
                list_params("ids", &ids)
            }
        };
        self.call(Endpoint::MagnetRestart, &params).await
    }

    /// Check whether magnets are instantly available.
    pub async fn check_magnet_instant<S: AsRef<str>>(
        &self,
        magnets: &[S],
    ) -> AdResult<Vec<InstantAvailability>> {
        require_non_empty("magnets", magnets)?;
        let params = list_params("magnets", magnets);
        let data: MagnetsData<Vec<InstantAvailability>> =
            self.call(Endpoint::MagnetInstant, &params).await?;
        Ok(data.magnets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ad_core::config::ApiConfig;
    use wiremock::matchers::{body_string_contains, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client() -> (MockServer, ApiClient) {
        let server = MockServer::start().await;
        let config = ApiConfig {
            api_key: "abcdefghij0123456789".into(),
            base_url: format!("{}/v4/", server.uri()),
            ..ApiConfig::default()
        };
        (server, ApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_magnet_status_deserialize() {
        let json = serde_json::json!({
            "id": 186284422,
            "filename": "ubuntu.iso",
            "size": 1000,
            "status": "Downloading",
            "statusCode": 1,
            "downloaded": 250,
            "links": []
        });
        let status: MagnetStatus = serde_json::from_value(json).unwrap();
        assert!(!status.is_ready());
        assert!((status.progress() - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_empty_inputs_rejected() {
        let client = ApiClient::new(&ApiConfig::default()).unwrap();
        let none: [&str; 0] = [];
        assert!(matches!(client.upload_magnets(&none).await, Err(AdError::InvalidInput(_))));
        assert!(matches!(client.check_magnet_instant(&[""]).await, Err(AdError::InvalidInput(_))));
        assert!(matches!(client.restart_magnets(&[]).await, Err(AdError::InvalidInput(_))));

        let no_paths: [&str; 0] = [];
        assert!(matches!(
            client.upload_torrent_files(&no_paths).await,
            Err(AdError::InvalidInput(_))
        ));
        assert!(matches!(
            client.upload_torrent_files(&["invalid_file.torrent"]).await,
            Err(AdError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_magnets_sends_form_list() {
        let (server, client) = mock_client().await;
        Mock::given(method("POST"))
            .and(path("/v4/magnet/upload"))
            .and(body_string_contains("magnets%5B%5D=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"magnets": [
                    {"magnet": "abc", "hash": "abc", "name": "x", "size": 1, "ready": false, "id": 7},
                    {"magnet": "bad", "error": {"code": "MAGNET_INVALID_URI", "message": "Magnet is not valid"}}
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploaded = client.upload_magnets(&["abc", "bad"]).await.unwrap();
        assert_eq!(uploaded[0].id, Some(7));
        assert_eq!(uploaded[1].error.as_ref().map(|e| e.code.as_str()), Some("MAGNET_INVALID_URI"));
    }

    #[tokio::test]
    async fn test_magnet_status_single_object() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/v4/magnet/status"))
            .and(query_param("id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"magnets": {"id": 42, "filename": "a", "statusCode": 4, "size": 0}}
            })))
            .mount(&server)
            .await;

        let status = client.magnet_status(42).await.unwrap();
        assert!(status.is_ready());
        assert_eq!(status.progress(), 100.0);
    }

    #[tokio::test]
    async fn test_restart_many_uses_ids_list() {
        let (server, client) = mock_client().await;
        Mock::given(method("GET"))
            .and(path("/v4/magnet/restart"))
            .and(query_param("ids[]", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"magnets": [{"magnet": 1, "message": "Magnet restarted"}, {"magnet": 2, "message": "Magnet restarted"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = client.restart_magnets(&[1, 2]).await.unwrap();
        assert_eq!(result.magnets.len(), 2);
    }

    #[tokio::test]
    async fn test_upload_torrent_file_multipart() {
        let (server, client) = mock_client().await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("test.torrent");
        std::fs::write(&file, b"d8:announce0:e").unwrap();

        Mock::given(method("POST"))
            .and(path("/v4/magnet/upload/file"))
            .and(body_string_contains("files[0]"))
            .and(body_string_contains("application/x-bittorrent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "data": {"files": [{"file": "test.torrent", "name": "test", "size": 14, "ready": true, "id": 9}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let files = client.upload_torrent_files(&[&file]).await.unwrap();
        assert_eq!(files[0].id, Some(9));
        assert!(files[0].ready);
    }
}
