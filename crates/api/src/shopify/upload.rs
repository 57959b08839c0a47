//! Staged file uploads: reserve a slot, transfer the bytes, finalize the file.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use pod_relay_core::CredentialSet;
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::queries::{
    CreatedFile, FILE_CREATE, FILE_STATUS, STAGED_UPLOADS_CREATE, file_create, file_status,
    staged_uploads_create,
};
use super::{ShopifyClient, check_user_errors};
use crate::error::{Provider, RelayError, body_excerpt};
use crate::poll::PollPolicy;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Largest remote image copied by [`ShopifyClient::upload_from_url`].
pub const MAX_REMOTE_IMAGE_BYTES: usize = crate::MAX_BODY_BYTES;

/// Bytes to upload plus their metadata.
#[derive(Clone)]
pub struct UploadAsset {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
    pub alt: Option<String>,
}

impl std::fmt::Debug for UploadAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadAsset")
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("alt", &self.alt)
            .finish()
    }
}

impl UploadAsset {
    /// Decode a `data:<mime>;base64,<payload>` URL.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::BadRequest` if the URL is not a base64 data URL,
    /// the MIME type is malformed or the payload does not decode.
    pub fn from_data_url(data_url: &str, filename: impl Into<String>) -> Result<Self, RelayError> {
        let invalid = || RelayError::BadRequest("Invalid base64 image format".to_string());

        let rest = data_url.trim().strip_prefix("data:").ok_or_else(invalid)?;
        let (mime_type, payload) = rest.split_once(";base64,").ok_or_else(invalid)?;
        if !is_valid_mime(mime_type) || payload.is_empty() {
            return Err(invalid());
        }

        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = BASE64.decode(compact).map_err(|_| invalid())?;

        Ok(Self {
            bytes,
            filename: filename.into(),
            mime_type: mime_type.to_string(),
            alt: None,
        })
    }

    /// Wrap raw bytes, guessing the MIME type from the filename extension.
    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            bytes,
            mime_type: mime_from_filename(&filename).to_string(),
            filename,
            alt: None,
        }
    }

    /// Attach alt text to the finalized file.
    #[must_use]
    pub fn with_alt(mut self, alt: Option<String>) -> Self {
        self.alt = alt.filter(|a| !a.trim().is_empty());
        self
    }
}

/// A reserved upload slot. Consumed by [`ShopifyClient::transfer_upload`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUploadTicket {
    pub target_url: String,
    pub resource_url: String,
    /// Form parameters in the order the platform returned them.
    pub parameters: Vec<(String, String)>,
}

/// A file registered with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub remote_id: String,
    /// Absent while the platform is still processing the file.
    pub public_url: Option<String>,
}

/// Result of a completed staged upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file has a public URL.
    Ready(FileReference),
    /// The file was created but its URL is not available yet.
    ProcessingPending(FileReference),
}

impl UploadOutcome {
    #[must_use]
    pub const fn file(&self) -> &FileReference {
        match self {
            Self::Ready(file) | Self::ProcessingPending(file) => file,
        }
    }

    #[must_use]
    pub fn public_url(&self) -> Option<&str> {
        self.file().public_url.as_deref()
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::ProcessingPending(_))
    }
}

impl From<&CreatedFile> for UploadOutcome {
    fn from(file: &CreatedFile) -> Self {
        let reference = FileReference {
            remote_id: file.id.clone(),
            public_url: file.public_url().map(str::to_string),
        };
        if reference.public_url.is_some() {
            Self::Ready(reference)
        } else {
            Self::ProcessingPending(reference)
        }
    }
}

impl ShopifyClient {
    /// Run the full staged upload: reserve, transfer, finalize.
    ///
    /// # Errors
    ///
    /// Propagates the error of the first step that fails; later steps do not
    /// run.
    #[instrument(skip(self, credentials, asset), fields(filename = %asset.filename, size = asset.bytes.len()))]
    pub async fn upload(
        &self,
        credentials: &CredentialSet,
        asset: UploadAsset,
    ) -> Result<UploadOutcome, RelayError> {
        let ticket = self.reserve_upload(credentials, &asset).await?;
        let alt = asset.alt.clone();
        let resource_url = self.transfer_upload(ticket, asset).await?;
        let outcome = self
            .finalize_upload(credentials, resource_url, alt)
            .await?;

        tracing::info!(
            file_id = %outcome.file().remote_id,
            pending = outcome.is_pending(),
            "Staged upload finalized"
        );
        Ok(outcome)
    }

    /// Fetch a remote URL into memory, then run the staged upload.
    ///
    /// The filename comes from the last URL path segment and the MIME type
    /// from the response `Content-Type`, falling back to the file extension.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Upload` if the source URL is invalid, answers
    /// with a non-2xx status or is larger than [`MAX_REMOTE_IMAGE_BYTES`];
    /// otherwise as [`Self::upload`].
    #[instrument(skip(self, credentials))]
    pub async fn upload_from_url(
        &self,
        credentials: &CredentialSet,
        source_url: &str,
        alt: Option<String>,
    ) -> Result<UploadOutcome, RelayError> {
        // Fail on credentials before spending a download
        self.store(credentials)?;

        let parsed = url::Url::parse(source_url)
            .map_err(|e| RelayError::Upload(format!("invalid source URL {source_url}: {e}")))?;

        let asset = self
            .fetch_source(&parsed, MAX_REMOTE_IMAGE_BYTES)
            .await?
            .with_alt(alt);

        self.upload(credentials, asset).await
    }

    /// Download `source` into memory, refusing bodies over `limit` bytes.
    async fn fetch_source(&self, source: &url::Url, limit: usize) -> Result<UploadAsset, RelayError> {
        let too_large = || RelayError::Upload(format!("{source} is larger than {limit} bytes"));

        let mut response = self
            .inner
            .client
            .get(source.as_str())
            .send()
            .await
            .map_err(|e| RelayError::Upload(format!("failed to fetch {source}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Upload(format!(
                "failed to fetch {source}: HTTP {}",
                status.as_u16()
            )));
        }

        let max = u64::try_from(limit).unwrap_or(u64::MAX);
        if response.content_length().is_some_and(|length| length > max) {
            return Err(too_large());
        }

        let filename = filename_from_url(source);
        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::trim)
            .filter(|v| *v != FALLBACK_MIME_TYPE && is_valid_mime(v))
            .map_or_else(|| mime_from_filename(&filename).to_string(), str::to_string);

        // Content-Length may be absent or wrong, so cap while streaming too
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| RelayError::Upload(format!("failed to read {source}: {e}")))?
        {
            if bytes.len() + chunk.len() > limit {
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        tracing::debug!(size = bytes.len(), %mime_type, "Fetched remote image");
        Ok(UploadAsset {
            bytes,
            filename,
            mime_type,
            alt: None,
        })
    }

    /// Reserve an upload slot with `stagedUploadsCreate`.
    ///
    /// # Errors
    ///
    /// - `RelayError::Config` / `RelayError::Provider` per [`Self::graphql`]
    ///   (user errors are provider errors)
    /// - `RelayError::Upload` if no usable target is returned
    pub async fn reserve_upload(
        &self,
        credentials: &CredentialSet,
        asset: &UploadAsset,
    ) -> Result<StagedUploadTicket, RelayError> {
        use staged_uploads_create::{OPERATION_NAME, ResponseData, StagedUploadInput, Variables};

        let variables = Variables {
            input: vec![StagedUploadInput {
                resource: "FILE",
                filename: asset.filename.clone(),
                mime_type: asset.mime_type.clone(),
                file_size: asset.bytes.len().to_string(),
                http_method: "POST",
            }],
        };

        let data: ResponseData = self
            .graphql(credentials, OPERATION_NAME, STAGED_UPLOADS_CREATE, variables)
            .await?;

        let payload = data
            .staged_uploads_create
            .ok_or_else(|| RelayError::Upload("stagedUploadsCreate returned no payload".to_string()))?;
        check_user_errors(&payload.user_errors)?;

        let target = payload
            .staged_targets
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::Upload("no staged upload target returned".to_string()))?;

        match (target.url, target.resource_url) {
            (Some(target_url), Some(resource_url)) => Ok(StagedUploadTicket {
                target_url,
                resource_url,
                parameters: target
                    .parameters
                    .into_iter()
                    .map(|p| (p.name, p.value))
                    .collect(),
            }),
            _ => Err(RelayError::Upload(
                "staged upload target is missing its URLs".to_string(),
            )),
        }
    }

    /// Transfer the bytes to a reserved slot and return the resource URL.
    ///
    /// Sends every ticket parameter in order, then a `file` part. No platform
    /// auth header is attached.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Upload` on a non-2xx response or an invalid MIME
    /// type, `RelayError::Transport` if the target cannot be reached.
    pub async fn transfer_upload(
        &self,
        ticket: StagedUploadTicket,
        asset: UploadAsset,
    ) -> Result<String, RelayError> {
        let StagedUploadTicket {
            target_url,
            resource_url,
            parameters,
        } = ticket;

        let file_part = Part::bytes(asset.bytes)
            .file_name(asset.filename)
            .mime_str(&asset.mime_type)
            .map_err(|e| RelayError::Upload(format!("invalid MIME type {}: {e}", asset.mime_type)))?;

        let form = parameters
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .part("file", file_part);

        let response = self
            .inner
            .client
            .post(&target_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RelayError::transport(Provider::Shopify, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(RelayError::Upload(format!(
                "staged upload target returned {}: {}",
                status.as_u16(),
                body_excerpt(&text)
            )));
        }

        tracing::debug!(status = status.as_u16(), "Staged upload transferred");
        Ok(resource_url)
    }

    /// Register the uploaded resource with `fileCreate`.
    ///
    /// # Errors
    ///
    /// - `RelayError::Provider` for GraphQL or user errors
    /// - `RelayError::Upload` if no file is returned
    pub async fn finalize_upload(
        &self,
        credentials: &CredentialSet,
        resource_url: String,
        alt: Option<String>,
    ) -> Result<UploadOutcome, RelayError> {
        use file_create::{FileCreateInput, OPERATION_NAME, ResponseData, Variables};

        let variables = Variables {
            files: vec![FileCreateInput {
                content_type: "IMAGE",
                original_source: resource_url,
                alt,
            }],
        };

        let data: ResponseData = self
            .graphql(credentials, OPERATION_NAME, FILE_CREATE, variables)
            .await?;

        let payload = data
            .file_create
            .ok_or_else(|| RelayError::Upload("fileCreate returned no payload".to_string()))?;
        check_user_errors(&payload.user_errors)?;

        payload
            .files
            .unwrap_or_default()
            .first()
            .map(UploadOutcome::from)
            .ok_or_else(|| RelayError::Upload("No file returned from fileCreate".to_string()))
    }

    /// Poll a created file until it has a public URL.
    ///
    /// # Errors
    ///
    /// - `RelayError::Timeout` when the attempt ceiling is reached
    /// - `RelayError::Upload` if the platform marks the file as failed
    /// - `RelayError::Cancelled` if `cancel` fires
    #[instrument(skip(self, credentials, cancel))]
    pub async fn await_file_url(
        &self,
        credentials: &CredentialSet,
        file_id: &str,
        policy: PollPolicy,
        cancel: &CancellationToken,
    ) -> Result<String, RelayError> {
        use file_status::{OPERATION_NAME, ResponseData, Variables};

        let mut attempts = 0;
        while attempts < policy.max_attempts {
            policy.wait(cancel).await?;
            attempts += 1;

            let data: ResponseData = self
                .graphql(
                    credentials,
                    OPERATION_NAME,
                    FILE_STATUS,
                    Variables {
                        id: file_id.to_string(),
                    },
                )
                .await?;

            let Some(file) = data.node else {
                return Err(RelayError::Upload(format!("file {file_id} not found")));
            };
            if let Some(url) = file.public_url() {
                tracing::debug!(attempts, "File processing complete");
                return Ok(url.to_string());
            }
            if file.is_failed() {
                return Err(RelayError::Upload(format!("file {file_id} failed processing")));
            }
        }

        Err(RelayError::Timeout {
            task: "File processing".to_string(),
            attempts,
        })
    }
}

fn filename_from_url(url: &url::Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |s| s.into_owned())
        })
        .unwrap_or_else(|| "upload".to_string())
}

/// Whether `mime` parses as a `type/subtype` media type.
fn is_valid_mime(mime: &str) -> bool {
    !mime.contains(';') && Part::text("").mime_str(mime).is_ok()
}

fn mime_from_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::RelayConfig;

    fn client() -> ShopifyClient {
        ShopifyClient::new(reqwest::Client::new(), &RelayConfig::default().shopify)
    }

    fn credentials(server: &MockServer) -> CredentialSet {
        CredentialSet {
            commerce_domain: Some(server.uri()),
            commerce_token: Some(SecretString::from("shpat_test")),
            ..CredentialSet::default()
        }
    }

    fn png_asset() -> UploadAsset {
        UploadAsset {
            bytes: b"fake png bytes".to_vec(),
            filename: "design.png".to_string(),
            mime_type: "image/png".to_string(),
            alt: None,
        }
    }

    async fn mount_staged_target(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/graphql.json"))
            .and(body_partial_json(json!({"operationName": "stagedUploadsCreate"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stagedUploadsCreate": {
                    "stagedTargets": [{
                        "url": format!("{}/upload-target", server.uri()),
                        "resourceUrl": "https://shopify-staged-uploads.storage.googleapis.com/tmp/design.png",
                        "parameters": [
                            {"name": "key", "value": "tmp/design.png"},
                            {"name": "policy", "value": "cG9saWN5"},
                            {"name": "x-goog-signature", "value": "abc123"}
                        ]
                    }],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_from_data_url() {
        let asset = UploadAsset::from_data_url("data:image/png;base64,aGVsbG8=", "design.png")
            .expect("valid data url");

        assert_eq!(asset.bytes, b"hello");
        assert_eq!(asset.mime_type, "image/png");
        assert_eq!(asset.filename, "design.png");
    }

    #[test]
    fn test_from_data_url_rejects_malformed_input() {
        for input in [
            "aGVsbG8=",
            "data:image/png,aGVsbG8=",
            "data:;base64,aGVsbG8=",
            "data:image/png;base64,",
            "data:image/png;base64,not base64!!",
            "data:imagepng;base64,aGVsbG8=",
            "data:not a mime;base64,aGVsbG8=",
        ] {
            let err = UploadAsset::from_data_url(input, "x.png").expect_err(input);
            assert!(matches!(err, RelayError::BadRequest(_)), "{input}");
        }
    }

    #[test]
    fn test_filename_and_mime_from_url() {
        let url = url::Url::parse("https://cdn.example.com/art/My%20Design.JPG?v=3").expect("url");
        let filename = filename_from_url(&url);

        assert_eq!(filename, "My Design.JPG");
        assert_eq!(mime_from_filename(&filename), "image/jpeg");
        assert_eq!(
            filename_from_url(&url::Url::parse("https://cdn.example.com/").expect("url")),
            "upload"
        );
        assert_eq!(mime_from_filename("archive.tar"), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn test_from_bytes_guesses_mime() {
        let asset = UploadAsset::from_bytes(vec![1, 2, 3], "logo.webp");
        assert_eq!(asset.filename, "logo.webp");
        assert_eq!(asset.mime_type, mime_from_filename("logo.webp"));
        assert!(asset.alt.is_none());
    }

    #[tokio::test]
    async fn test_upload_pending_when_finalize_has_no_url() {
        let server = MockServer::start().await;
        mount_staged_target(&server).await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .and(body_string_contains("tmp/design.png"))
            .and(body_string_contains("x-goog-signature"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/graphql.json"))
            .and(body_partial_json(json!({
                "operationName": "fileCreate",
                "variables": {"files": [{
                    "contentType": "IMAGE",
                    "originalSource": "https://shopify-staged-uploads.storage.googleapis.com/tmp/design.png"
                }]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"fileCreate": {
                    "files": [{"id": "gid://shopify/MediaImage/42", "alt": "", "fileStatus": "UPLOADED"}],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client()
            .upload(&credentials(&server), png_asset())
            .await
            .expect("upload");

        assert_eq!(
            outcome,
            UploadOutcome::ProcessingPending(FileReference {
                remote_id: "gid://shopify/MediaImage/42".to_string(),
                public_url: None,
            })
        );
    }

    #[tokio::test]
    async fn test_failed_transfer_never_finalizes() {
        let server = MockServer::start().await;
        mount_staged_target(&server).await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .respond_with(ResponseTemplate::new(403).set_body_string("<Error>SignatureDoesNotMatch</Error>"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "fileCreate"})))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let err = client()
            .upload(&credentials(&server), png_asset())
            .await
            .expect_err("transfer rejected");

        assert_eq!(
            err.to_string(),
            "Upload failed: staged upload target returned 403: <Error>SignatureDoesNotMatch</Error>"
        );
    }

    #[tokio::test]
    async fn test_reserve_user_errors_never_transfer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "stagedUploadsCreate"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stagedUploadsCreate": {
                    "stagedTargets": [],
                    "userErrors": [{"field": ["input", "0", "fileSize"], "message": "File size is too large"}]
                }}
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let err = client()
            .upload(&credentials(&server), png_asset())
            .await
            .expect_err("user errors");

        assert_eq!(
            err.to_string(),
            "Shopify API error: input.0.fileSize: File size is too large"
        );
    }

    #[tokio::test]
    async fn test_reserve_without_targets_is_upload_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stagedUploadsCreate": {"stagedTargets": [], "userErrors": []}}
            })))
            .mount(&server)
            .await;

        let err = client()
            .reserve_upload(&credentials(&server), &png_asset())
            .await
            .expect_err("no targets");

        assert!(matches!(err, RelayError::Upload(_)));
    }

    #[tokio::test]
    async fn test_upload_without_credentials() {
        let err = client()
            .upload(&CredentialSet::default(), png_asset())
            .await
            .expect_err("missing credentials");

        assert!(err.is_config_for(Provider::Shopify));
    }

    #[tokio::test]
    async fn test_await_file_url_polls_until_ready() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "fileStatus"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"node": {"id": "gid://shopify/MediaImage/42", "fileStatus": "PROCESSING", "image": null}}
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"operationName": "fileStatus"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"node": {
                    "id": "gid://shopify/MediaImage/42",
                    "fileStatus": "READY",
                    "image": {"url": "https://cdn.shopify.com/s/files/design.png"}
                }}
            })))
            .mount(&server)
            .await;

        let url = client()
            .await_file_url(
                &credentials(&server),
                "gid://shopify/MediaImage/42",
                PollPolicy::new(Duration::from_millis(1), 5),
                &CancellationToken::new(),
            )
            .await
            .expect("file url");

        assert_eq!(url, "https://cdn.shopify.com/s/files/design.png");
    }

    #[tokio::test]
    async fn test_await_file_url_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"node": {"id": "gid://shopify/MediaImage/42", "fileStatus": "PROCESSING"}}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let err = client()
            .await_file_url(
                &credentials(&server),
                "gid://shopify/MediaImage/42",
                PollPolicy::new(Duration::from_millis(1), 3),
                &CancellationToken::new(),
            )
            .await
            .expect_err("timeout");

        assert!(matches!(err, RelayError::Timeout { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn test_upload_from_url_copies_remote_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/art/My%20Design.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png; charset=binary")
                    .set_body_bytes(b"remote png".to_vec()),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/graphql.json"))
            .and(body_partial_json(json!({
                "operationName": "stagedUploadsCreate",
                "variables": {"input": [{
                    "filename": "My Design.png",
                    "mimeType": "image/png",
                    "fileSize": "10"
                }]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"stagedUploadsCreate": {
                    "stagedTargets": [{
                        "url": format!("{}/upload-target", server.uri()),
                        "resourceUrl": "https://shopify-staged-uploads.storage.googleapis.com/tmp/My%20Design.png",
                        "parameters": [{"name": "key", "value": "tmp/My Design.png"}]
                    }],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/upload-target"))
            .and(body_string_contains("remote png"))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/admin/api/2025-01/graphql.json"))
            .and(body_partial_json(json!({
                "operationName": "fileCreate",
                "variables": {"files": [{"alt": "Sunset tee"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"fileCreate": {
                    "files": [{
                        "id": "gid://shopify/MediaImage/7",
                        "alt": "Sunset tee",
                        "fileStatus": "READY",
                        "image": {"url": "https://cdn.shopify.com/s/files/My_Design.png"}
                    }],
                    "userErrors": []
                }}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client()
            .upload_from_url(
                &credentials(&server),
                &format!("{}/art/My%20Design.png", server.uri()),
                Some("Sunset tee".to_string()),
            )
            .await
            .expect("upload from url");

        assert_eq!(
            outcome.public_url(),
            Some("https://cdn.shopify.com/s/files/My_Design.png")
        );
    }

    #[tokio::test]
    async fn test_upload_from_url_source_error_never_reserves() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let source = format!("{}/missing.png", server.uri());
        let err = client()
            .upload_from_url(&credentials(&server), &source, None)
            .await
            .expect_err("source 404");

        assert_eq!(
            err.to_string(),
            format!("Upload failed: failed to fetch {source}: HTTP 404")
        );
    }

    #[tokio::test]
    async fn test_upload_from_url_rejects_declared_oversize() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge.png"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(vec![0_u8; MAX_REMOTE_IMAGE_BYTES + 1]),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let err = client()
            .upload_from_url(
                &credentials(&server),
                &format!("{}/huge.png", server.uri()),
                None,
            )
            .await
            .expect_err("too large");

        assert!(matches!(err, RelayError::Upload(_)));
        assert!(err.to_string().contains("is larger than"));
    }

    #[tokio::test]
    async fn test_fetch_source_caps_chunked_body() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        // Chunked responses carry no Content-Length
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0_u8; 1024];
            let _ = socket.read(&mut request).await;
            let mut response = String::from(
                "HTTP/1.1 200 OK\r\ncontent-type: image/png\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n",
            );
            for _ in 0..4 {
                response.push_str("8\r\nAAAAAAAA\r\n");
            }
            response.push_str("0\r\n\r\n");
            let _ = socket.write_all(response.as_bytes()).await;
        });

        let source = url::Url::parse(&format!("http://{addr}/stream.png")).expect("url");
        let err = client()
            .fetch_source(&source, 16)
            .await
            .expect_err("over cap");

        assert_eq!(
            err.to_string(),
            format!("Upload failed: {source} is larger than 16 bytes")
        );
    }

    #[tokio::test]
    async fn test_fetch_source_within_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/art/logo"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/webp")
                    .set_body_bytes(b"0123456789abcdef".to_vec()),
            )
            .mount(&server)
            .await;

        let source = url::Url::parse(&format!("{}/art/logo", server.uri())).expect("url");
        let asset = client().fetch_source(&source, 16).await.expect("exactly at cap");

        assert_eq!(asset.bytes.len(), 16);
        assert_eq!(asset.filename, "logo");
        assert_eq!(asset.mime_type, "image/webp");
    }
}
