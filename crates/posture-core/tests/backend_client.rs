use posture_core::{FrameOutcome, PostureClient, ServerDefaults};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// A request as seen by the stub backend.
struct Captured {
    head: String,
    body: Vec<u8>,
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<Captured> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
    let lower = head.to_ascii_lowercase();
    let content_length = lower
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok());
    let chunked = lower.contains("transfer-encoding: chunked");

    loop {
        let body = &buf[head_end..];
        let complete = match content_length {
            Some(len) => body.len() >= len,
            None if chunked => find(body, b"0\r\n\r\n").is_some(),
            None => true,
        };
        if complete {
            break;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    Ok(Captured {
        head,
        body: buf[head_end..].to_vec(),
    })
}

/// Serve `status_line` + `body` to every connection and forward what was received.
async fn spawn_backend(status_line: &'static str, body: &'static str) -> (String, mpsc::UnboundedReceiver<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                if let Ok(request) = read_request(&mut stream).await {
                    let _ = tx.send(request);
                }
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
            });
        }
    });

    (format!("http://{}", addr), rx)
}

fn client_for(url: &str) -> PostureClient {
    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    PostureClient::with_client(http, url)
}

#[tokio::test]
async fn fetches_default_config() {
    let (url, mut requests) = spawn_backend(
        "200 OK",
        r#"{"right_min_angle":-80,"right_max_angle":-63,"left_min_angle":80,"left_max_angle":115}"#,
    )
    .await;

    let client = client_for(&format!("{}/", url));
    let defaults = client.fetch_defaults().await.unwrap();

    assert_eq!(defaults, ServerDefaults::default());
    let request = requests.recv().await.unwrap();
    assert!(request.head.starts_with("GET /api/config "));
}

#[tokio::test]
async fn submits_frame_as_multipart_file() {
    let (url, mut requests) = spawn_backend(
        "200 OK",
        r#"{"status":"Bad Posture! Please fix your neck angle","is_good":false,
            "angles":{"right":-50.0},"landmarks":[{"x":0.4,"y":0.6,"z":0.0,"visibility":0.8}]}"#,
    )
    .await;

    let client = client_for(&url);
    let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02, 0xFF, 0xD9];
    let outcome = client.process_image(jpeg.clone()).await.unwrap();

    let FrameOutcome::Evaluated(sample) = outcome else {
        panic!("expected an evaluated sample");
    };
    assert!(!sample.is_good);
    assert_eq!(sample.angles.right, Some(-50.0));
    assert_eq!(sample.angles.left, None);
    assert_eq!(sample.landmarks.map(|l| l.len()), Some(1));

    let request = requests.recv().await.unwrap();
    assert!(request.head.starts_with("POST /api/process-image "));
    assert!(request.head.to_ascii_lowercase().contains("multipart/form-data"));

    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="frame.jpg""#));
    assert!(body.contains("image/jpeg"));
    assert!(find(&request.body, &jpeg).is_some());
}

#[tokio::test]
async fn backend_error_body_is_a_rejected_frame() {
    let (url, _requests) = spawn_backend("200 OK", r#"{"error":"No clear view of neck angle"}"#).await;

    let outcome = client_for(&url).process_image(vec![0xFF, 0xD8, 0xFF]).await.unwrap();

    assert_eq!(outcome, FrameOutcome::Rejected("No clear view of neck angle".to_string()));
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (url, _requests) = spawn_backend("500 Internal Server Error", r#"{"detail":"boom"}"#).await;

    let client = client_for(&url);
    assert!(client.process_image(vec![0xFF, 0xD8, 0xFF]).await.is_err());
    assert!(client.fetch_defaults().await.is_err());
}

#[tokio::test]
async fn unreachable_backend_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}", addr));
    assert!(client.fetch_defaults().await.is_err());
}
