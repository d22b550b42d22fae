//! demos/test_backend.rs
//! Local API for the status widget to watch, with the routes of the
//! demo service it stands in for.
//! Run: cargo run --example test_backend -- [port]

use hyper::{
    header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE},
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use rand::Rng;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::SocketAddr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::sleep;

const APP_NAME: &str = "CI/CD Demo API";

#[derive(Clone)]
struct ApiState {
    version:      String,
    build_number: String,
    healthy_flag: Arc<AtomicBool>,
    fail_pct:     f64,
}

fn json_response(status: StatusCode, body: Value) -> Response<Body> {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

// ——————————————————————————————————————————
// Request handler
async fn handle(req: Request<Body>, state: ApiState) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => json_response(
            StatusCode::OK,
            json!({
                "message": "Welcome to the CI/CD Demo API",
                "version": state.version,
                "docs": "/api/info",
                "endpoints": {
                    "health": "/api/health",
                    "info": "/api/info",
                    "echo": "/api/echo",
                },
            }),
        ),
        (&Method::GET, "/api/health") => {
            let injected = state.fail_pct > 0.0
                && rand::thread_rng().gen_bool(state.fail_pct / 100.0);

            if injected || !state.healthy_flag.load(Ordering::SeqCst) {
                json_response(
                    StatusCode::SERVICE_UNAVAILABLE,
                    json!({"status": "unhealthy", "timestamp": now(), "service": APP_NAME}),
                )
            } else {
                json_response(
                    StatusCode::OK,
                    json!({"status": "healthy", "timestamp": now(), "service": APP_NAME}),
                )
            }
        }
        (&Method::GET, "/api/info") => json_response(
            StatusCode::OK,
            json!({
                "name": APP_NAME,
                "version": state.version,
                "build_number": state.build_number,
                "endpoints": [
                    {"path": "/", "method": "GET", "description": "Welcome message"},
                    {"path": "/api/health", "method": "GET", "description": "Health check"},
                    {"path": "/api/info", "method": "GET", "description": "Application info"},
                    {"path": "/api/echo", "method": "POST", "description": "Echo service"},
                ],
                "timestamp": now(),
            }),
        ),
        (&Method::POST, "/api/echo") => match hyper::body::to_bytes(req.into_body()).await {
            Ok(bytes) => {
                // Anything that is not JSON echoes back as an empty object.
                let received: Value =
                    serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}));
                json_response(
                    StatusCode::OK,
                    json!({
                        "received": received,
                        "message": "Echo successful!",
                        "timestamp": now(),
                    }),
                )
            }
            Err(e) => {
                eprintln!("Failed to read request body: {}", e);
                internal_error()
            }
        },
        (&Method::GET, "/api/pipeline-status") => json_response(
            StatusCode::OK,
            json!({
                "pipeline": "CI/CD Demo",
                "stages": [
                    {"name": "Build", "status": "success", "duration": "45s"},
                    {"name": "Test", "status": "success", "duration": "1m 23s"},
                    {"name": "Docker Build", "status": "success", "duration": "2m 10s"},
                    {"name": "Deploy", "status": "success", "duration": "30s"},
                ],
                "overall_status": "success",
                "build_number": state.build_number,
            }),
        ),
        _ => json_response(
            StatusCode::NOT_FOUND,
            json!({
                "error": "Not Found",
                "message": "The requested endpoint does not exist",
                "status": 404,
            }),
        ),
    };

    Ok(response)
}

fn internal_error() -> Response<Body> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({
            "error": "Internal Server Error",
            "message": "An unexpected error occurred",
            "status": 500,
        }),
    )
}

// ——————————————————————————————————————————
// Main
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let port: u16 = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PORT").ok())
        .unwrap_or_else(|| "5000".into())
        .parse()?;

    let state = ApiState {
        version: std::env::var("APP_VERSION").unwrap_or_else(|_| "1.0.0".into()),
        build_number: std::env::var("BUILD_NUMBER").unwrap_or_else(|_| "local".into()),
        healthy_flag: Arc::new(AtomicBool::new(true)),
        fail_pct: std::env::var("FAIL_PCT").ok().and_then(|v| v.parse().ok()).unwrap_or(0.0),
    };

    // Flip health every FLIP_SECS seconds so the widget has something to show.
    if let Some(flip) = std::env::var("FLIP_SECS").ok().and_then(|v| v.parse::<u64>().ok()) {
        let st = state.clone();
        tokio::spawn(async move {
            loop {
                sleep(Duration::from_secs(flip)).await;
                let cur = st.healthy_flag.load(Ordering::SeqCst);
                st.healthy_flag.store(!cur, Ordering::SeqCst);
                println!("Health flipped → {}", if !cur { "healthy" } else { "unhealthy" });
            }
        });
    }

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let make_svc = make_service_fn(move |_conn| {
        let st = state.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, st.clone()))) }
    });

    println!("Demo API on http://{}", addr);

    Server::bind(&addr).serve(make_svc).await?;
    Ok(())
}
