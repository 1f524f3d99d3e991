//! Middleware for logging requests and responses.

use axum::{
    body::{Body, to_bytes},
    extract::Request,
    http::{
        Method, StatusCode,
        header::CONTENT_TYPE,
        request,
        response,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

/// The number of characters of a request or response body logged at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const EVENT_STREAM_CONTENT_TYPE: &str = "text/event-stream";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If the body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and the full body is logged at the `debug` level.
/// Password fields in submitted forms are redacted, and server-sent event
/// streams are passed through without reading their body.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body_text) = match read_request(request).await {
        Ok(request) => request,
        Err(error) => {
            tracing::error!("could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let is_form = parts
        .headers
        .get(CONTENT_TYPE)
        .is_some_and(|value| value.as_bytes() == FORM_CONTENT_TYPE.as_bytes());

    if parts.method == Method::POST && is_form {
        let display_text = redact_field(&body_text, "password");
        log_request(&parts, &display_text);
    } else {
        log_request(&parts, &body_text);
    }

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    if is_event_stream(&response) {
        let (parts, body) = response.into_parts();
        log_response(&parts, "<event stream>");
        return Response::from_parts(parts, body);
    }

    let (parts, body) = response.into_parts();
    match to_bytes(body, usize::MAX).await {
        Ok(bytes) => {
            log_response(&parts, &String::from_utf8_lossy(&bytes));
            Response::from_parts(parts, Body::from(bytes))
        }
        Err(error) => {
            tracing::error!("could not read response body: {error}");
            Response::from_parts(parts, Body::empty())
        }
    }
}

fn is_event_stream(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(EVENT_STREAM_CONTENT_TYPE))
}

fn redact_field(form_text: &str, field_name: &str) -> String {
    let key = format!("{field_name}=");

    form_text
        .split('&')
        .map(|pair| {
            if pair.starts_with(&key) {
                format!("{key}********")
            } else {
                pair.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn read_request(request: Request) -> Result<(request::Parts, String), axum::Error> {
    let (parts, body) = request.into_parts();
    let body_bytes = to_bytes(body, usize::MAX).await?;

    Ok((parts, String::from_utf8_lossy(&body_bytes).to_string()))
}

/// The first [LOG_BODY_LENGTH_LIMIT] characters of `body`, or `None` if it is short enough.
fn truncate(body: &str) -> Option<&str> {
    body.char_indices()
        .nth(LOG_BODY_LENGTH_LIMIT)
        .map(|(end, _)| &body[..end])
}

fn log_request(parts: &request::Parts, body: &str) {
    match truncate(body) {
        Some(head) => {
            tracing::info!("Received request: {parts:#?}\nbody: {head}...");
            tracing::debug!("Full request body: {body:?}");
        }
        None => tracing::info!("Received request: {parts:#?}\nbody: {body:?}"),
    }
}

fn log_response(parts: &response::Parts, body: &str) {
    match truncate(body) {
        Some(head) => {
            tracing::info!("Sending response: {parts:#?}\nbody: {head}...");
            tracing::debug!("Full response body: {body:?}");
        }
        None => tracing::info!("Sending response: {parts:#?}\nbody: {body:?}"),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        middleware,
        response::{
            Html,
            sse::{Event, Sse},
        },
        routing::{get, post},
    };
    use axum_test::TestServer;
    use futures::stream;
    use std::convert::Infallible;

    use super::{LOG_BODY_LENGTH_LIMIT, logging_middleware, redact_field, truncate};

    #[test]
    fn redacts_password_field() {
        assert_eq!(
            redact_field("username=kavya&password=hunter2&remember_me=on", "password"),
            "username=kavya&password=********&remember_me=on"
        );
    }

    #[test]
    fn redact_leaves_other_fields_alone() {
        assert_eq!(
            redact_field("description=Ferry&total_amount=400", "password"),
            "description=Ferry&total_amount=400"
        );
    }

    #[test]
    fn truncate_respects_multi_byte_characters() {
        let body = "₹".repeat(LOG_BODY_LENGTH_LIMIT + 1);

        let head = truncate(&body).unwrap();

        assert_eq!(head.chars().count(), LOG_BODY_LENGTH_LIMIT);
        assert_eq!(truncate("₹100"), None);
    }

    async fn echo(body: String) -> Html<String> {
        Html(body)
    }

    async fn events() -> Sse<stream::Iter<std::vec::IntoIter<Result<Event, Infallible>>>> {
        Sse::new(stream::iter(vec![Ok(Event::default().data("hello"))]))
    }

    #[tokio::test]
    async fn passes_bodies_through() {
        let app = Router::new()
            .route("/echo", post(echo))
            .route("/events", get(events))
            .layer(middleware::from_fn(logging_middleware));
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post("/echo")
            .form(&[("username", "kavya"), ("password", "hunter2")])
            .await;
        response.assert_status_ok();
        assert_eq!(response.text(), "username=kavya&password=hunter2");

        let response = server.get("/events").await;
        response.assert_status_ok();
        assert!(response.text().contains("data: hello"));
    }
}
