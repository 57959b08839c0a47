//! GraphQL operation documents and their typed variables/responses.

use serde::{Deserialize, Serialize};

use super::UserError;

pub const STAGED_UPLOADS_CREATE: &str = r"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters {
        name
        value
      }
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const FILE_CREATE: &str = r"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      alt
      fileStatus
      ... on MediaImage {
        image {
          url
        }
      }
    }
    userErrors {
      field
      message
    }
  }
}
";

pub const FILE_STATUS: &str = r"
query fileStatus($id: ID!) {
  node(id: $id) {
    id
    ... on MediaImage {
      fileStatus
      image {
        url
      }
    }
  }
}
";

pub mod staged_uploads_create {
    use super::{Deserialize, Serialize, UserError};

    pub const OPERATION_NAME: &str = "stagedUploadsCreate";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub input: Vec<StagedUploadInput>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StagedUploadInput {
        pub resource: &'static str,
        pub filename: String,
        pub mime_type: String,
        /// Byte count as a decimal string.
        pub file_size: String,
        pub http_method: &'static str,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub staged_uploads_create: Option<Payload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub staged_targets: Option<Vec<StagedTarget>>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct StagedTarget {
        pub url: Option<String>,
        pub resource_url: Option<String>,
        #[serde(default)]
        pub parameters: Vec<Parameter>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Parameter {
        pub name: String,
        pub value: String,
    }
}

pub mod file_create {
    use super::{Deserialize, Serialize, UserError};

    pub const OPERATION_NAME: &str = "fileCreate";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub files: Vec<FileCreateInput>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FileCreateInput {
        pub content_type: &'static str,
        pub original_source: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub alt: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ResponseData {
        pub file_create: Option<Payload>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Payload {
        pub files: Option<Vec<super::CreatedFile>>,
        #[serde(default)]
        pub user_errors: Vec<UserError>,
    }
}

pub mod file_status {
    use super::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "fileStatus";

    #[derive(Debug, Serialize)]
    pub struct Variables {
        pub id: String,
    }

    #[derive(Debug, Deserialize)]
    pub struct ResponseData {
        pub node: Option<super::CreatedFile>,
    }
}

/// A file as returned by `fileCreate` or a `node` lookup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFile {
    pub id: String,
    pub alt: Option<String>,
    /// `UPLOADED`, `PROCESSING`, `READY` or `FAILED`.
    pub file_status: Option<String>,
    pub image: Option<ImageRef>,
}

impl CreatedFile {
    /// The public image URL, once processing has produced one.
    #[must_use]
    pub fn public_url(&self) -> Option<&str> {
        self.image
            .as_ref()
            .and_then(|image| image.url.as_deref())
            .filter(|url| !url.is_empty())
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.file_status.as_deref() == Some("FAILED")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRef {
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_staged_upload_variables_serialize() {
        let variables = staged_uploads_create::Variables {
            input: vec![staged_uploads_create::StagedUploadInput {
                resource: "FILE",
                filename: "design.png".to_string(),
                mime_type: "image/png".to_string(),
                file_size: "2048".to_string(),
                http_method: "POST",
            }],
        };

        let value = serde_json::to_value(&variables).expect("serialize");
        assert_eq!(
            value,
            json!({"input": [{
                "resource": "FILE",
                "filename": "design.png",
                "mimeType": "image/png",
                "fileSize": "2048",
                "httpMethod": "POST"
            }]})
        );
    }

    #[test]
    fn test_created_file_without_image() {
        let file: CreatedFile = serde_json::from_value(json!({
            "id": "gid://shopify/MediaImage/1",
            "alt": null,
            "fileStatus": "UPLOADED",
            "image": null
        }))
        .expect("deserialize");

        assert_eq!(file.public_url(), None);
        assert!(!file.is_failed());
    }

    #[test]
    fn test_created_file_with_image() {
        let file: CreatedFile = serde_json::from_value(json!({
            "id": "gid://shopify/MediaImage/1",
            "fileStatus": "READY",
            "image": {"url": "https://cdn.shopify.com/s/files/design.png"}
        }))
        .expect("deserialize");

        assert_eq!(file.public_url(), Some("https://cdn.shopify.com/s/files/design.png"));
    }
}
