//! HTTP image loader against a local tiny_http server.

use ardoise::ArdoiseError;
use ardoise::render::{CachingLoader, HttpImageLoader, ImageLoader};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct TestServer {
    base: String,
    hits: Arc<AtomicUsize>,
}

fn png_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 30, Rgba([200, 10, 10, 255])));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn start_server() -> TestServer {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let port = server.server_addr().to_ip().unwrap().port();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let png = png_bytes();

    std::thread::spawn(move || {
        for request in server.incoming_requests() {
            counter.fetch_add(1, Ordering::SeqCst);
            let response = match request.url() {
                "/dish.png" => tiny_http::Response::from_data(png.clone()).with_header(
                    "Content-Type: image/png"
                        .parse::<tiny_http::Header>()
                        .unwrap(),
                ),
                "/garbage.png" => tiny_http::Response::from_data(b"not an image".to_vec()),
                _ => tiny_http::Response::from_data(b"missing".to_vec()).with_status_code(404),
            };
            let _ = request.respond(response);
        }
    });

    TestServer {
        base: format!("http://127.0.0.1:{}", port),
        hits,
    }
}

fn loader() -> HttpImageLoader {
    HttpImageLoader::new("ardoise-tests", Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_loads_and_decodes_png() {
    let server = start_server();
    let image = loader()
        .load(&format!("{}/dish.png", server.base))
        .await
        .unwrap();
    assert_eq!((image.width(), image.height()), (40, 30));
}

#[tokio::test]
async fn test_http_error_status() {
    let server = start_server();
    let err = loader()
        .load(&format!("{}/nope.png", server.base))
        .await
        .unwrap_err();
    assert!(matches!(err, ArdoiseError::ImageLoad(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_undecodable_payload() {
    let server = start_server();
    let err = loader()
        .load(&format!("{}/garbage.png", server.base))
        .await
        .unwrap_err();
    assert!(matches!(err, ArdoiseError::ImageLoad(_)));
}

#[tokio::test]
async fn test_cache_hits_network_once() {
    let server = start_server();
    let cached = CachingLoader::new(loader(), 4, Duration::from_secs(60));
    let url = format!("{}/dish.png", server.base);

    cached.load(&url).await.unwrap();
    cached.load(&url).await.unwrap();

    assert_eq!(server.hits.load(Ordering::SeqCst), 1);
}
