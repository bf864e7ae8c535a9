use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware для логирования HTTP запросов
///
/// Пишет метод, путь, статус и длительность. Ответы 5xx - на уровне error,
/// 4xx - warn, остальные - info.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let status = response.status();
    let duration = start.elapsed().as_millis();

    if status.is_server_error() {
        tracing::error!("{} {} -> {} ({}ms)", method, path, status.as_u16(), duration);
    } else if status.is_client_error() {
        tracing::warn!("{} {} -> {} ({}ms)", method, path, status.as_u16(), duration);
    } else {
        tracing::info!("{} {} -> {} ({}ms)", method, path, status.as_u16(), duration);
    }

    response
}
