#![allow(dead_code)]

use actix_web::{App, HttpResponse, HttpServer, web};
use std::time::Duration;

pub const HERO_JPG_BYTES: usize = 300 * 1024;
pub const LOGO_WEBP_BYTES: usize = 10 * 1024;
pub const SITE_CSS_BYTES: usize = 5_000;
pub const APP_JS_BYTES: usize = 150 * 1024;
pub const DEFER_JS_BYTES: usize = 2_000;
pub const INTRO_MP4_BYTES: usize = 1024 * 1024;
pub const PRELOAD_FONT_BYTES: usize = 20_000;
pub const FACE_FONT_BYTES: usize = 30_000;

// HEAD declares one length, GET serves another, so the measured size shows
// which request produced it
pub const DECLARED_HEAD_BYTES: usize = 12_345;
pub const DECLARED_GET_BYTES: usize = 10;

pub const INLINE_STYLE: &str = "\n      body { color: #111; }\n      @font-face { font-family: Brand; src: url('/fonts/brand.woff2') format('woff2'); }\n    ";
pub const INLINE_SCRIPT: &str = "window.dataLayer = window.dataLayer || [];";

pub fn index_html() -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <title>Fixture</title>
    <link rel="stylesheet" href="/css/site.css">
    <link rel="preload" as="font" href="/fonts/preload.woff2">
    <style>{INLINE_STYLE}</style>
    <script src="/js/app.js"></script>
    <script src="/js/defer.js" defer></script>
    <script>{INLINE_SCRIPT}</script>
  </head>
  <body>
    <img src="/images/hero.jpg" alt="hero">
    <img src="/images/logo.webp" loading="lazy" srcset="/images/logo.webp 1x" alt="logo">
    <img src="data:image/png;base64,iVBORw0KGgo=" alt="pixel">
    <img src="/images/missing.png" alt="missing">
    <video autoplay preload="auto">
      <source src="/media/intro.mp4" type="video/mp4">
    </video>
    <iframe src="https://www.youtube.com/embed/abc123"></iframe>
  </body>
</html>"#
    )
}

pub fn slow_resource_html() -> &'static str {
    r#"<html><body><script src="/js/slow.js" async></script><img src="/images/logo.webp" loading="lazy"></body></html>"#
}

pub fn declared_size_html() -> &'static str {
    r#"<html><body><img src="/images/declared.avif" loading="lazy" srcset="/images/declared.avif 1x"></body></html>"#
}

fn sized(content_type: &'static str, bytes: usize) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(content_type)
        .body(vec![b'x'; bytes])
}

/// Serves the fixture page and its assets on an ephemeral port
pub async fn start_fixture_server() -> String {
    let http_server = HttpServer::new(|| {
        App::new()
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html; charset=utf-8")
                        .body(index_html())
                }),
            )
            .route(
                "/images/hero.jpg",
                web::get().to(|| async { sized("image/jpeg", HERO_JPG_BYTES) }),
            )
            .route(
                "/images/logo.webp",
                web::get().to(|| async { sized("image/webp", LOGO_WEBP_BYTES) }),
            )
            .route(
                "/css/site.css",
                web::get().to(|| async { sized("text/css", SITE_CSS_BYTES) }),
            )
            .route(
                "/js/app.js",
                web::get().to(|| async { sized("application/javascript", APP_JS_BYTES) }),
            )
            .route(
                "/js/defer.js",
                web::get().to(|| async { sized("application/javascript", DEFER_JS_BYTES) }),
            )
            .route(
                "/media/intro.mp4",
                web::get().to(|| async { sized("video/mp4", INTRO_MP4_BYTES) }),
            )
            .route(
                "/fonts/preload.woff2",
                web::get().to(|| async { sized("font/woff2", PRELOAD_FONT_BYTES) }),
            )
            .route(
                "/fonts/brand.woff2",
                web::get().to(|| async { sized("font/woff2", FACE_FONT_BYTES) }),
            )
            .service(
                web::resource("/images/declared.avif")
                    .route(web::head().to(|| async { sized("image/avif", DECLARED_HEAD_BYTES) }))
                    .route(web::get().to(|| async { sized("image/avif", DECLARED_GET_BYTES) })),
            )
            .route(
                "/declared-size",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html")
                        .body(declared_size_html())
                }),
            )
            .route(
                "/slow-resource",
                web::get().to(|| async {
                    HttpResponse::Ok()
                        .content_type("text/html")
                        .body(slow_resource_html())
                }),
            )
            .route(
                "/js/slow.js",
                web::get().to(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    sized("application/javascript", 100)
                }),
            )
            .route(
                "/slow-page",
                web::get().to(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    HttpResponse::Ok().content_type("text/html").body("<html></html>")
                }),
            )
            .route(
                "/server-error",
                web::get().to(|| async { HttpResponse::InternalServerError().body("Error") }),
            )
            .route(
                "/empty",
                web::get().to(|| async { HttpResponse::Ok().content_type("text/html").finish() }),
            )
    })
    .workers(2)
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind test server");

    let addr = http_server
        .addrs()
        .first()
        .cloned()
        .expect("No address bound");
    let url = format!("http://{}", addr);

    let app_server = http_server.run();

    tokio::spawn(async move {
        if let Err(e) = app_server.await {
            eprintln!("Test server error: {}", e);
        }
    });

    url
}
