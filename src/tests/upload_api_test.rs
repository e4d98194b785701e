#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::Settings;
    use crate::routes::create_app;
    use crate::services::{LocalFileStore, UploadService};
    use crate::state::AppState;
    use crate::utils::ShutdownCoordinator;

    const BOUNDARY: &str = "docchat-test-boundary";

    struct TestPart<'a> {
        field: &'a str,
        file_name: Option<&'a str>,
        content_type: Option<&'a str>,
        data: &'a [u8],
    }

    fn pdf<'a>(file_name: &'a str, data: &'a [u8]) -> TestPart<'a> {
        TestPart {
            field: "files",
            file_name: Some(file_name),
            content_type: Some("application/pdf"),
            data,
        }
    }

    fn create_test_app(root: &Path, coordinator: ShutdownCoordinator) -> Router {
        let mut settings = Settings::default();
        settings.upload.content_dir = root.to_path_buf();

        let service = Arc::new(UploadService::new(
            Arc::new(LocalFileStore::new(root)),
            settings.upload.policy(),
            settings.upload.public_path.clone(),
        ));
        create_app(AppState::new(service, coordinator), &settings)
    }

    fn multipart_body(parts: &[TestPart<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            let disposition = match part.file_name {
                Some(file_name) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.field, file_name
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.field),
            };
            body.extend_from_slice(disposition.as_bytes());
            if let Some(content_type) = part.content_type {
                body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
            }
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(part.data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    fn upload_request(parts: &[TestPart<'_>]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn stored_count(root: &Path) -> usize {
        std::fs::read_dir(root).map(|dir| dir.count()).unwrap_or(0)
    }

    #[tokio::test]
    async fn test_request_without_files_is_rejected() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let note = TestPart {
            field: "note",
            file_name: None,
            content_type: None,
            data: b"hello",
        };
        let (status, body) = send(app, upload_request(&[note])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No files provided.");
    }

    #[tokio::test]
    async fn test_too_many_files_writes_nothing() {
        let scratch = tempfile::tempdir().unwrap();
        let root = scratch.path().join("uploads");
        let app = create_test_app(&root, ShutdownCoordinator::new());

        let names: Vec<String> = (0..6).map(|i| format!("doc-{}.pdf", i)).collect();
        let parts: Vec<_> = names.iter().map(|n| pdf(n, b"%PDF-1.4")).collect();
        let (status, body) = send(app, upload_request(&parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "You can upload up to 5 files at once.");
        assert_eq!(stored_count(&root), 0);
    }

    #[tokio::test]
    async fn test_non_pdf_anywhere_rejects_whole_batch() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let parts = [
            pdf("first.pdf", b"%PDF-1.4 first"),
            TestPart {
                field: "files",
                file_name: Some("notes.txt"),
                content_type: Some("text/plain"),
                data: b"plain text",
            },
            pdf("third.pdf", b"%PDF-1.4 third"),
        ];
        let (status, body) = send(app, upload_request(&parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Only PDF files are allowed.");
        assert!(body.get("files").is_none());
        assert_eq!(stored_count(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_oversized_part_is_named_and_nothing_stored() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let too_big = vec![b'a'; 10 * 1024 * 1024 + 1];
        let parts = [pdf("small.pdf", b"%PDF-1.4"), pdf("huge.pdf", &too_big)];
        let (status, body) = send(app, upload_request(&parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File \"huge.pdf\" exceeds 10 MB.");
        assert_eq!(stored_count(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_part_far_over_ceiling_is_named() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        // Larger than a whole batch of maximum-size files
        let huge = vec![b'a'; 60 * 1024 * 1024];
        let (status, body) = send(app, upload_request(&[pdf("huge.pdf", &huge)])).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File \"huge.pdf\" exceeds 10 MB.");
        assert_eq!(stored_count(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_full_batch_with_one_oversized_part_is_named() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let at_limit = vec![b'a'; 10 * 1024 * 1024];
        let over_limit = vec![b'a'; 11 * 1024 * 1024];
        let parts = [
            pdf("a.pdf", &at_limit),
            pdf("b.pdf", &at_limit),
            pdf("c.pdf", &at_limit),
            pdf("d.pdf", &at_limit),
            pdf("e.pdf", &over_limit),
        ];
        let (status, body) = send(app, upload_request(&parts)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "File \"e.pdf\" exceeds 10 MB.");
        assert_eq!(stored_count(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_pdf_extension_without_media_type_is_accepted() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let part = TestPart {
            field: "files",
            file_name: Some("SCAN.PDF"),
            content_type: Some("application/octet-stream"),
            data: b"%PDF-1.4",
        };
        let (status, body) = send(app, upload_request(&[part])).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["files"][0]["name"], "SCAN.PDF");
    }

    #[tokio::test]
    async fn test_upload_round_trip() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let content = b"%PDF-1.7\nreport body\n%%EOF";
        let parts = [pdf("My Report (final).pdf", content)];
        let (status, body) = send(app.clone(), upload_request(&parts)).await;

        assert_eq!(status, StatusCode::OK);
        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0]["name"], "My Report (final).pdf");
        assert_eq!(files[0]["size"], content.len() as u64);

        let path = files[0]["path"].as_str().unwrap();
        let stored_name = path.strip_prefix("/uploads/").unwrap();
        assert!(stored_name.ends_with("-My_Report__final_.pdf"));
        assert!(stored_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'));
        assert_eq!(std::fs::read(scratch.path().join(stored_name)).unwrap(), content);

        // The returned path is servable
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let served = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&served[..], &content[..]);
    }

    #[tokio::test]
    async fn test_identical_names_never_overwrite() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let (_, first) = send(app.clone(), upload_request(&[pdf("same.pdf", b"one")])).await;
        let (_, second) = send(app, upload_request(&[pdf("same.pdf", b"two")])).await;

        let first_path = first["files"][0]["path"].as_str().unwrap();
        let second_path = second["files"][0]["path"].as_str().unwrap();
        assert_ne!(first_path, second_path);
        assert_eq!(stored_count(scratch.path()), 2);
    }

    #[tokio::test]
    async fn test_other_fields_are_ignored() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let parts = [
            TestPart {
                field: "workspace",
                file_name: None,
                content_type: None,
                data: b"default",
            },
            pdf("a.pdf", b"%PDF-1.4"),
        ];
        let (status, body) = send(app, upload_request(&parts)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["files"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_generic_failure() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let request = Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to upload files.");
    }

    #[tokio::test]
    async fn test_uploads_refused_during_shutdown() {
        let scratch = tempfile::tempdir().unwrap();
        let coordinator = ShutdownCoordinator::new();
        coordinator
            .start_graceful_shutdown(std::time::Duration::from_millis(10))
            .await;
        let app = create_test_app(scratch.path(), coordinator);

        let (status, _) = send(app, upload_request(&[pdf("a.pdf", b"%PDF")])).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(stored_count(scratch.path()), 0);
    }

    #[tokio::test]
    async fn test_root_and_health() {
        let scratch = tempfile::tempdir().unwrap();
        let app = create_test_app(scratch.path(), ShutdownCoordinator::new());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "All good");

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
