//! Remote document store backed by the Drive v3 REST API
//!
//! Only the calls the storage router needs are implemented: folder probe,
//! multipart upload, metadata, content link and delete. Token acquisition
//! is outside this crate; a bearer token is read from the environment
//! variable named in `[remote] access-token-env`.

use super::remote::{RemoteMetadata, RemoteStore, StorageProbe};
use super::share_link::direct_download_url;
use super::StorageError;
use crate::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: Option<String>,
    name: Option<String>,
    /// Reported as a decimal string
    size: Option<String>,
    mime_type: Option<String>,
    web_content_link: Option<String>,
}

/// Drive-backed [`RemoteStore`]
pub struct DriveClient {
    client: Client,
    api_base: String,
    folder_id: String,
    token: Option<String>,
    token_env: String,
}

impl DriveClient {
    /// Builds a client from configuration, reading the token from the
    /// configured environment variable
    pub fn from_config(config: &RemoteConfig, client: Client) -> Self {
        let token = std::env::var(&config.access_token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self::new(client, &config.api_base, &config.folder_id, token)
            .with_token_env(&config.access_token_env)
    }

    pub fn new(client: Client, api_base: &str, folder_id: &str, token: Option<String>) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            folder_id: folder_id.to_string(),
            token,
            token_env: String::new(),
        }
    }

    fn with_token_env(mut self, env: &str) -> Self {
        self.token_env = env.to_string();
        self
    }

    fn token(&self) -> Result<&str, StorageError> {
        self.token.as_deref().ok_or_else(|| {
            StorageError::RemoteAuth(format!("no access token in ${}", self.token_env))
        })
    }

    fn files_url(&self, id: &str) -> String {
        format!("{}/drive/v3/files/{}", self.api_base, id)
    }

    async fn get_file(&self, id: &str, fields: &str) -> Result<DriveFile, StorageError> {
        let response = self
            .client
            .get(self.files_url(id))
            .bearer_auth(self.token()?)
            .query(&[("fields", fields), ("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| StorageError::RemoteUpload(e.to_string()))?;

        let response = check_status(response).await?;
        response
            .json::<DriveFile>()
            .await
            .map_err(|e| StorageError::RemoteUpload(format!("malformed response: {}", e)))
    }
}

/// Maps a provider error response onto the storage taxonomy
///
/// 401 is always an authorization problem. 403 is a quota problem when the
/// body says so and an authorization problem otherwise.
fn classify_failure(status: StatusCode, body: &str) -> StorageError {
    let detail = format!("HTTP {}: {}", status.as_u16(), body.trim());

    match status {
        StatusCode::UNAUTHORIZED => StorageError::RemoteAuth(detail),
        StatusCode::FORBIDDEN
            if body.contains("storageQuotaExceeded") || body.to_lowercase().contains("quota") =>
        {
            StorageError::RemoteQuota(detail)
        }
        StatusCode::FORBIDDEN => StorageError::RemoteAuth(detail),
        _ => StorageError::RemoteUpload(detail),
    }
}

async fn check_status(response: Response) -> Result<Response, StorageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status, &body))
}

/// Assembles a `multipart/related` body: JSON metadata part, then content
fn multipart_body(boundary: &str, metadata: &serde_json::Value, mime_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(bytes.len() + 512);
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{m}\r\n--{b}\r\nContent-Type: {t}\r\n\r\n",
            b = boundary,
            m = metadata,
            t = mime_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());
    body
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn probe(&self) -> StorageProbe {
        if self.token.is_none() {
            return StorageProbe::unavailable(format!(
                "No access token found in ${}",
                self.token_env
            ));
        }

        match self.get_file(&self.folder_id, "id,name").await {
            Ok(folder) => StorageProbe::available(format!(
                "Remote folder '{}' is reachable",
                folder.name.unwrap_or_else(|| self.folder_id.clone())
            )),
            Err(e) => StorageProbe::unavailable(e.to_string()),
        }
    }

    async fn upload(&self, bytes: Vec<u8>, name: &str, mime_type: &str) -> Result<String, StorageError> {
        let token = self.token()?;
        let boundary = format!("folio-harvest-{}", Uuid::new_v4().simple());
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": mime_type,
            "parents": [self.folder_id],
        });

        let response = self
            .client
            .post(format!("{}/upload/drive/v3/files", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id"),
                ("supportsAllDrives", "true"),
            ])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", boundary),
            )
            .body(multipart_body(&boundary, &metadata, mime_type, &bytes))
            .send()
            .await
            .map_err(|e| StorageError::RemoteUpload(e.to_string()))?;

        let created = check_status(response)
            .await?
            .json::<DriveFile>()
            .await
            .map_err(|e| StorageError::RemoteUpload(format!("malformed response: {}", e)))?;

        let id = created
            .id
            .ok_or_else(|| StorageError::RemoteUpload("upload response has no id".to_string()))?;

        tracing::info!("Uploaded '{}' to remote storage as {}", name, id);
        Ok(id)
    }

    async fn metadata(&self, id: &str) -> Result<RemoteMetadata, StorageError> {
        let file = self.get_file(id, "id,name,size,mimeType").await?;

        let size_bytes = file
            .size
            .as_deref()
            .and_then(|s| s.parse::<u64>().ok())
            .ok_or_else(|| StorageError::RemoteUpload(format!("no size reported for {}", id)))?;

        Ok(RemoteMetadata {
            name: file.name.unwrap_or_default(),
            size_bytes,
            mime_type: file.mime_type.unwrap_or_default(),
        })
    }

    async fn download_link(&self, id: &str) -> Result<String, StorageError> {
        let file = self.get_file(id, "id,webContentLink").await?;

        Ok(match file.web_content_link {
            Some(link) if link.contains("export=download") => link,
            Some(link) => {
                let separator = if link.contains('?') { '&' } else { '?' };
                format!("{}{}export=download", link, separator)
            }
            None => direct_download_url(id),
        })
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let response = self
            .client
            .delete(self.files_url(id))
            .bearer_auth(self.token()?)
            .query(&[("supportsAllDrives", "true")])
            .send()
            .await
            .map_err(|e| StorageError::RemoteUpload(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }

        check_status(response).await?;
        tracing::info!("Deleted remote object {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, token: Option<&str>) -> DriveClient {
        DriveClient::new(Client::new(), &server.uri(), "folder-1", token.map(String::from))
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, ""),
            StorageError::RemoteAuth(_)
        ));
        assert!(matches!(
            classify_failure(
                StatusCode::FORBIDDEN,
                r#"{"error":{"errors":[{"reason":"storageQuotaExceeded"}]}}"#
            ),
            StorageError::RemoteQuota(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "insufficientPermissions"),
            StorageError::RemoteAuth(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            StorageError::RemoteUpload(_)
        ));
    }

    #[tokio::test]
    async fn test_probe_without_token() {
        let server = MockServer::start().await;
        let probe = client(&server, None).probe().await;
        assert!(!probe.available);
    }

    #[tokio::test]
    async fn test_probe_reachable_folder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/folder-1"))
            .and(header("authorization", "Bearer t0k"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "folder-1", "name": "Books"})),
            )
            .mount(&server)
            .await;

        let probe = client(&server, Some("t0k")).probe().await;
        assert!(probe.available);
        assert!(probe.message.contains("Books"));
    }

    #[tokio::test]
    async fn test_probe_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
            .mount(&server)
            .await;

        let probe = client(&server, Some("expired")).probe().await;
        assert!(!probe.available);
        assert!(probe.message.contains("authorization"));
    }

    #[tokio::test]
    async fn test_upload_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(body_string_contains("\"parents\":[\"folder-1\"]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "f-9"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "f-9", "name": "a.pdf", "size": "20480", "mimeType": "application/pdf"
            })))
            .mount(&server)
            .await;

        let drive = client(&server, Some("t"));
        let id = drive.upload(vec![0u8; 64], "a.pdf", "application/pdf").await.unwrap();
        assert_eq!(id, "f-9");

        let meta = drive.metadata(&id).await.unwrap();
        assert_eq!(meta.size_bytes, 20480);
        assert_eq!(meta.name, "a.pdf");
    }

    #[tokio::test]
    async fn test_upload_quota_exceeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error":{"code":403,"message":"The user's Drive storage quota has been exceeded.","errors":[{"reason":"storageQuotaExceeded"}]}}"#,
            ))
            .mount(&server)
            .await;

        let err = client(&server, Some("t"))
            .upload(vec![1; 10], "a.pdf", "application/pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::RemoteQuota(_)));
    }

    #[tokio::test]
    async fn test_download_link_appends_export() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "f-1", "webContentLink": "https://drive.google.com/uc?id=f-1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/drive/v3/files/f-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "f-2"})))
            .mount(&server)
            .await;

        let drive = client(&server, Some("t"));
        assert_eq!(
            drive.download_link("f-1").await.unwrap(),
            "https://drive.google.com/uc?id=f-1&export=download"
        );
        assert_eq!(
            drive.download_link("f-2").await.unwrap(),
            "https://docs.google.com/uc?id=f-2&export=download"
        );
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        assert!(client(&server, Some("t")).delete("gone").await.is_ok());
    }
}
