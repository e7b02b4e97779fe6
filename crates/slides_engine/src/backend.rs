use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use slides_core::{ActivityRecord, ContentPayload, GradeLevel, LinkFields, VariationRequest};
use slides_logging::{slides_debug, slides_info, slides_warn};
use url::Url;

use crate::{BackendError, FailureKind, UploadedExport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    /// Account recorded as the author of link updates and variations.
    pub user_id: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub inherit_creator_id: bool,
    pub variation_description: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            user_id: String::new(),
            connect_timeout: Duration::from_secs(10),
            // Slide generation waits on a language model; keep this generous.
            request_timeout: Duration::from_secs(120),
            inherit_creator_id: true,
            variation_description: "Age group variation".to_string(),
        }
    }
}

/// Activity database and slide generator.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_activity(&self, id: &str) -> Result<ActivityRecord, BackendError>;

    async fn generate_content(
        &self,
        activity_id: &str,
        grade: GradeLevel,
    ) -> Result<ContentPayload, BackendError>;

    async fn upload_export(
        &self,
        activity_id: &str,
        name: &str,
        export_url: &str,
    ) -> Result<UploadedExport, BackendError>;

    async fn persist_links(
        &self,
        activity_id: &str,
        links: &LinkFields,
        upload: &UploadedExport,
    ) -> Result<(), BackendError>;

    async fn create_variation(&self, request: &VariationRequest) -> Result<(), BackendError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| BackendError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        let raw = format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path);
        Url::parse(&raw).map_err(|err| {
            BackendError::new(FailureKind::Network, format!("bad backend url {raw}: {err}"))
        })
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, BackendError> {
        let url = self.endpoint(path)?;
        slides_debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed = if bytes.is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_slice::<Value>(&bytes)
        };

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|body| extract_error_message(&body))
                .unwrap_or_else(|| status.to_string());
            let kind = if status == reqwest::StatusCode::NOT_FOUND {
                FailureKind::NotFound
            } else {
                FailureKind::HttpStatus(status.as_u16())
            };
            slides_warn!("Backend {} answered {}: {}", path, status, message);
            return Err(BackendError::new(kind, message));
        }

        parsed.map_err(|err| {
            BackendError::new(
                FailureKind::InvalidResponse,
                format!("{path} returned malformed JSON: {err}"),
            )
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery<'a> {
    activity_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateQuery<'a> {
    activity_id: &'a str,
    grade_level: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadQuery<'a> {
    pdf_url: &'a str,
    activity_id: &'a str,
    pdf_name: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadReply {
    pdf_url: String,
    thumbnail_url: String,
}

#[derive(Serialize)]
struct PdfRef<'a> {
    name: &'a str,
    source: &'a str,
    thumbnail: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlideLinks<'a> {
    pdf: PdfRef<'a>,
    slide_url: &'a str,
    editable_slide_url: &'a str,
    collaboration_url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LinkUpdate<'a> {
    activity_id: &'a str,
    #[serde(rename = "userID")]
    user_id: &'a str,
    slides: SlideLinks<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VariationLinks<'a> {
    public_view_link: &'a str,
    collaboration_link: &'a str,
    template_link: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VariationQuery<'a> {
    activity_id: &'a str,
    age_group: [usize; 1],
    #[serde(rename = "userID")]
    user_id: &'a str,
    #[serde(rename = "inheritCreatorID")]
    inherit_creator_id: bool,
    variation: &'a str,
    slides: VariationLinks<'a>,
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn fetch_activity(&self, id: &str) -> Result<ActivityRecord, BackendError> {
        let mut body = self
            .post("fetchActivity", &ActivityQuery { activity_id: id })
            .await?;
        match body.get_mut("activityData").map(Value::take) {
            Some(Value::Null) | None => Err(BackendError::new(
                FailureKind::InvalidResponse,
                "fetchActivity reply has no activityData",
            )),
            Some(data) => {
                slides_debug!("Fetched activity {}: {}", id, data);
                Ok(ActivityRecord(data))
            }
        }
    }

    async fn generate_content(
        &self,
        activity_id: &str,
        grade: GradeLevel,
    ) -> Result<ContentPayload, BackendError> {
        let mut body = self
            .post(
                "generateSlides",
                &GenerateQuery {
                    activity_id,
                    grade_level: grade.label(),
                },
            )
            .await?;
        let deck = body
            .get_mut("slides")
            .and_then(|slides| slides.get_mut(0))
            .map(Value::take)
            .ok_or_else(|| {
                BackendError::new(
                    FailureKind::InvalidResponse,
                    format!("generateSlides reply has no slides: {body}"),
                )
            })?;
        let payload: ContentPayload = serde_json::from_value(deck).map_err(|err| {
            BackendError::new(
                FailureKind::InvalidResponse,
                format!("slide sections are malformed: {err}"),
            )
        })?;
        slides_info!("Generator returned content for activity {}", activity_id);
        Ok(payload)
    }

    async fn upload_export(
        &self,
        activity_id: &str,
        name: &str,
        export_url: &str,
    ) -> Result<UploadedExport, BackendError> {
        let body = self
            .post(
                "uploadPdf",
                &UploadQuery {
                    pdf_url: export_url,
                    activity_id,
                    pdf_name: name,
                },
            )
            .await?;
        let reply: UploadReply = serde_json::from_value(body).map_err(|err| {
            BackendError::new(
                FailureKind::InvalidResponse,
                format!("uploadPdf reply is missing fields: {err}"),
            )
        })?;
        slides_info!("Uploaded export for activity {} to {}", activity_id, reply.pdf_url);
        Ok(UploadedExport {
            name: name.to_string(),
            pdf_url: reply.pdf_url,
            thumbnail_url: reply.thumbnail_url,
        })
    }

    async fn persist_links(
        &self,
        activity_id: &str,
        links: &LinkFields,
        upload: &UploadedExport,
    ) -> Result<(), BackendError> {
        let request = LinkUpdate {
            activity_id,
            user_id: &self.settings.user_id,
            slides: SlideLinks {
                pdf: PdfRef {
                    name: &upload.name,
                    source: &upload.pdf_url,
                    thumbnail: &upload.thumbnail_url,
                },
                slide_url: &links.public_view,
                editable_slide_url: &links.template,
                collaboration_url: &links.collaboration,
            },
        };
        self.post("updateActivitySlides", &request).await?;
        slides_info!("Stored slide links for activity {}", activity_id);
        Ok(())
    }

    async fn create_variation(&self, request: &VariationRequest) -> Result<(), BackendError> {
        let query = VariationQuery {
            activity_id: &request.activity_id,
            age_group: [request.grade.index()],
            user_id: &self.settings.user_id,
            inherit_creator_id: self.settings.inherit_creator_id,
            variation: &self.settings.variation_description,
            slides: VariationLinks {
                public_view_link: &request.links.public_view,
                collaboration_link: &request.links.collaboration,
                template_link: &request.links.template,
            },
        };
        self.post("createVariation", &query).await?;
        slides_info!(
            "Created {} variation of activity {}",
            request.grade,
            request.activity_id
        );
        Ok(())
    }
}

/// Best-effort human-readable message from a backend error body.
///
/// Looks at `message`, then `error.message`, then joins `errors[]`.
pub fn extract_error_message(body: &Value) -> Option<String> {
    if let Some(message) = body.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = body
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }
    let errors: Vec<String> = body
        .get("errors")?
        .as_array()?
        .iter()
        .map(|entry| match entry {
            Value::String(text) => text.clone(),
            other => extract_error_message(other).unwrap_or_else(|| other.to_string()),
        })
        .collect();
    (!errors.is_empty()).then(|| errors.join(", "))
}

fn map_reqwest_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        return BackendError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return BackendError::new(FailureKind::InvalidResponse, err.to_string());
    }
    BackendError::new(FailureKind::Network, err.to_string())
}
