use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use slides_core::{
    decompose, GradeLevel, LinkFields, SectionTag, SelectionError, VariationRequest,
};
use slides_engine::{
    extract_error_message, Backend, BackendSettings, FailureKind, ReqwestBackend, UploadedExport,
};
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        user_id: "user-7".to_string(),
        ..BackendSettings::default()
    })
    .expect("client")
}

fn links() -> LinkFields {
    LinkFields {
        collaboration: "https://www.canva.com/design/D1/edit?x=1".to_string(),
        template: "https://www.canva.com/design/D1/view?x=1&mode=preview".to_string(),
        public_view: "https://www.canva.com/design/D1/view?x=1".to_string(),
    }
}

#[tokio::test]
async fn fetch_activity_unwraps_activity_data() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetchActivity"))
        .and(body_json(json!({ "activityId": "abc" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "activityData": { "_id": "abc", "title": "Leaf hunt", "age_group": [1, 2] }
        })))
        .mount(&server)
        .await;

    let record = backend_for(&server).fetch_activity("abc").await.expect("record");
    let activity = record.validate("abc").expect("valid");
    assert_eq!(activity.title(), "Leaf hunt");
    assert!(activity.has_multiple_grade_groups());
}

#[tokio::test]
async fn missing_activity_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetchActivity"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "nope" })))
        .mount(&server)
        .await;

    let err = backend_for(&server).fetch_activity("zzz").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::NotFound);
    assert_eq!(err.message, "nope");
    assert_eq!(
        err.into_selection_error("zzz"),
        SelectionError::NotFound {
            id: "zzz".to_string()
        }
    );
}

#[tokio::test]
async fn server_errors_become_transport_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetchActivity"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend_for(&server).fetch_activity("abc").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
    assert!(matches!(
        err.into_selection_error("abc"),
        SelectionError::Transport { .. }
    ));
}

#[tokio::test]
async fn generate_content_reads_first_deck() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generateSlides"))
        .and(body_json(json!({ "activityId": "abc", "gradeLevel": "1-2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "slides": [{
                "play": ["Warm up"],
                "reflect": null,
                "connect": ["Pair up", "Share"],
                "grow": ["Take home"]
            }]
        })))
        .mount(&server)
        .await;

    let grade = GradeLevel::from_label("1-2").unwrap();
    let payload = backend_for(&server)
        .generate_content("abc", grade)
        .await
        .expect("payload");
    let sections: Vec<SectionTag> = decompose(&payload).iter().map(|u| u.section).collect();
    assert_eq!(
        sections,
        vec![
            SectionTag::Play,
            SectionTag::Connect,
            SectionTag::Connect,
            SectionTag::Grow
        ]
    );
}

#[tokio::test]
async fn generate_without_slides_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generateSlides"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slides": [] })))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .generate_content("abc", GradeLevel::from_index(1).unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidResponse);
}

#[tokio::test]
async fn upload_then_persist_links() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/uploadPdf"))
        .and(body_json(json!({
            "pdfUrl": "file:///tmp/deck.md",
            "activityId": "abc",
            "pdfName": "Leaf hunt"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pdfUrl": "https://cdn.example/deck.pdf",
            "thumbnailUrl": "https://cdn.example/deck.png"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/updateActivitySlides"))
        .and(body_json(json!({
            "activityId": "abc",
            "userID": "user-7",
            "slides": {
                "pdf": {
                    "name": "Leaf hunt",
                    "source": "https://cdn.example/deck.pdf",
                    "thumbnail": "https://cdn.example/deck.png"
                },
                "slideUrl": "https://www.canva.com/design/D1/view?x=1",
                "editableSlideUrl": "https://www.canva.com/design/D1/view?x=1&mode=preview",
                "collaborationUrl": "https://www.canva.com/design/D1/edit?x=1"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let upload = backend
        .upload_export("abc", "Leaf hunt", "file:///tmp/deck.md")
        .await
        .expect("upload");
    assert_eq!(
        upload,
        UploadedExport {
            name: "Leaf hunt".to_string(),
            pdf_url: "https://cdn.example/deck.pdf".to_string(),
            thumbnail_url: "https://cdn.example/deck.png".to_string(),
        }
    );
    backend
        .persist_links("abc", &links(), &upload)
        .await
        .expect("persist");
}

#[tokio::test]
async fn persist_failure_carries_nested_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/updateActivitySlides"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({ "error": { "message": "db down" } })),
        )
        .mount(&server)
        .await;

    let upload = UploadedExport {
        name: "n".to_string(),
        pdf_url: "p".to_string(),
        thumbnail_url: "t".to_string(),
    };
    let err = backend_for(&server)
        .persist_links("abc", &links(), &upload)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(500));
    assert_eq!(err.message, "db down");
}

#[tokio::test]
async fn create_variation_posts_grade_index_and_defaults() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/createVariation"))
        .and(body_partial_json(json!({
            "activityId": "abc",
            "ageGroup": [3],
            "userID": "user-7",
            "inheritCreatorID": true,
            "variation": "Age group variation",
            "slides": { "templateLink": "https://www.canva.com/design/D1/view?x=1&mode=preview" }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    let request = VariationRequest {
        activity_id: "abc".to_string(),
        title: "Leaf hunt".to_string(),
        grade: GradeLevel::from_index(3).unwrap(),
        links: links(),
    };
    backend_for(&server)
        .create_variation(&request)
        .await
        .expect("variation");
}

#[tokio::test]
async fn create_variation_joins_error_list() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/createVariation"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "errors": ["ageGroup taken", "title missing"] })),
        )
        .mount(&server)
        .await;

    let request = VariationRequest {
        activity_id: "abc".to_string(),
        title: "Leaf hunt".to_string(),
        grade: GradeLevel::from_index(2).unwrap(),
        links: links(),
    };
    let err = backend_for(&server)
        .create_variation(&request)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.message, "ageGroup taken, title missing");
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/fetchActivity"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "activityData": {} })),
        )
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(BackendSettings {
        base_url: server.uri(),
        request_timeout: Duration::from_millis(50),
        ..BackendSettings::default()
    })
    .expect("client");
    let err = backend.fetch_activity("abc").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[test]
fn error_message_extraction_prefers_top_level_message() {
    assert_eq!(
        extract_error_message(&json!({ "message": "top", "error": { "message": "nested" } })),
        Some("top".to_string())
    );
    assert_eq!(
        extract_error_message(&json!({ "error": { "message": "nested" } })),
        Some("nested".to_string())
    );
    assert_eq!(
        extract_error_message(&json!({ "errors": [{ "message": "a" }, "b"] })),
        Some("a, b".to_string())
    );
    assert_eq!(extract_error_message(&json!({ "errors": [] })), None);
    assert_eq!(extract_error_message(&json!("plain")), None);
}
