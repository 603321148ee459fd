use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use url::Url;
use webmd_core::TransportMode;
use webmd_engine::{localize_images, ArticleDocument, FetchSettings, Transport};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(server: &MockServer, route: &str, body: &[u8], content_type: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.to_vec(), content_type))
        .mount(server)
        .await;
}

fn library_transport() -> Transport {
    let settings = FetchSettings {
        retry_limit: 0,
        ..FetchSettings::default()
    };
    Transport::new(TransportMode::Library, settings).expect("transport")
}

#[tokio::test]
async fn images_are_saved_with_unique_names_and_rewritten() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    serve(&server, "/a/logo.png", b"first", "image/png").await;
    serve(&server, "/b/logo.png", b"second", "image/png").await;
    serve(&server, "/s/large.jpg", b"large", "image/jpeg").await;
    serve(&server, "/photo", b"webp", "image/webp").await;

    let base = Url::parse(&format!("{}/guide/", server.uri())).unwrap();
    let html = "<p>\
        <img src=\"/a/logo.png\" srcset=\"/a/logo@2x.png 2x\">\
        <img src=\"/b/logo.png\">\
        <img srcset=\"/s/small.jpg 480w, /s/large.jpg 1024w\">\
        <img data-src=\"/photo\">\
        <img src=\"/missing.png\">\
        <img src=\"data:image/gif;base64,R0lGOD\">\
        <img alt=\"no source\">\
        </p>";
    let mut doc = ArticleDocument::parse_fragment(html, base.clone());

    let temp = TempDir::new().unwrap();
    let images_dir = temp.path().join("images").join("guide");
    let report = localize_images(&mut doc, &base, &images_dir, temp.path(), &library_transport())
        .await
        .expect("localize");

    let saved: Vec<&str> = report.saved.iter().map(|s| s.markdown_src.as_str()).collect();
    assert_eq!(
        saved,
        vec![
            "images/guide/logo.png",
            "images/guide/logo-1.png",
            "images/guide/large.jpg",
            "images/guide/photo.webp",
        ]
    );
    assert_eq!(report.failed.len(), 1);
    assert!(report.failed[0].source_url.ends_with("/missing.png"));

    assert_eq!(fs::read(images_dir.join("logo.png")).unwrap(), b"first");
    assert_eq!(fs::read(images_dir.join("logo-1.png")).unwrap(), b"second");
    assert_eq!(fs::read(images_dir.join("photo.webp")).unwrap(), b"webp");

    let imgs = doc.elements_by_tag("img");
    let srcs: Vec<Option<&str>> = imgs
        .iter()
        .map(|id| doc.element(*id).and_then(|el| el.attr("src")))
        .collect();
    assert_eq!(
        srcs,
        vec![
            Some("images/guide/logo.png"),
            Some("images/guide/logo-1.png"),
            Some("images/guide/large.jpg"),
            Some("images/guide/photo.webp"),
            Some("/missing.png"),
            Some("data:image/gif;base64,R0lGOD"),
            None,
        ]
    );
    let first = doc.element(imgs[0]).unwrap();
    assert_eq!(first.attr("srcset"), None);
}

#[tokio::test]
async fn unknown_types_fall_back_to_bin() {
    let server = MockServer::start().await;
    serve(&server, "/download", b"??", "application/octet-stream").await;

    let base = Url::parse(&server.uri()).unwrap();
    let mut doc = ArticleDocument::parse_fragment("<img src=\"/download?id=7\">", base.clone());
    let temp = TempDir::new().unwrap();
    let images_dir = temp.path().join("img");

    let report = localize_images(&mut doc, &base, &images_dir, temp.path(), &library_transport())
        .await
        .expect("localize");
    assert_eq!(report.saved[0].markdown_src, "img/download.bin");
}

#[tokio::test]
async fn images_dir_is_created_even_without_images() {
    let base = Url::parse("https://example.com/").unwrap();
    let mut doc = ArticleDocument::parse_fragment("<p>text only</p>", base.clone());
    let temp = TempDir::new().unwrap();
    let images_dir = temp.path().join("images").join("empty");

    let report = localize_images(&mut doc, &base, &images_dir, temp.path(), &library_transport())
        .await
        .expect("localize");
    assert!(report.saved.is_empty());
    assert!(images_dir.is_dir());
}
