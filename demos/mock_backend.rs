//! A stand-in for the processing backend on `localhost:8000`.
//!
//! Accepts the multipart upload the relay forwards, counts its files and
//! answers the way the real service does once a job completes.
//!
//! ```text
//! cargo run --example mock_backend
//! cargo run -- --bind 127.0.0.1:8080
//! curl -F files=@photo.jpg -F mode=fast http://127.0.0.1:8080/api/process
//! ```

use axum::{extract::Multipart, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;

async fn process(mut multipart: Multipart) -> Result<Json<Value>, (StatusCode, String)> {
    let mut files = 0usize;
    let mut bytes = 0usize;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (e.status(), e.body_text()))?
    {
        let is_file = field.file_name().is_some();
        let data = field.bytes().await.map_err(|e| (e.status(), e.body_text()))?;
        if is_file {
            files += 1;
            bytes += data.len();
        }
    }

    let job_id = uuid::Uuid::new_v4();
    println!("Job {} received {} file(s), {} bytes", job_id, files, bytes);

    Ok(Json(json!({
        "status": "completed",
        "result": format!("/static/{}.png", job_id),
    })))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Router::new().route("/api/process", post(process));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8000));
    println!("Mock backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
