use crate::routes::{App, Reply, Request};
use std::io::{self, Cursor};
use tiny_http::{Header, Response, Server, StatusCode};
use tracing::{debug, error, info};

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn into_response(reply: Reply) -> Response<Cursor<Vec<u8>>> {
    let mut response = Response::from_string(reply.body).with_status_code(StatusCode(reply.status));
    if let Some(content_type) = header("Content-Type", "text/html; charset=utf-8") {
        response.add_header(content_type);
    }
    if let Some(location) = reply.location.as_deref().and_then(|v| header("Location", v)) {
        response.add_header(location);
    }
    if let Some(cookie) = reply.set_cookie.as_deref().and_then(|v| header("Set-Cookie", v)) {
        response.add_header(cookie);
    }
    response
}

/// Runs the handler, turning store failures into a 500 page.
pub fn dispatch(app: &mut App, req: &Request<'_>) -> Reply {
    match app.handle(req) {
        Ok(reply) => reply,
        Err(err) => {
            error!("{} {} failed: {}", req.method, req.path, err);
            Reply::server_error()
        }
    }
}

/// Serves requests one at a time until the listener shuts down.
pub fn run(mut app: App, port: u16) -> io::Result<()> {
    let server = Server::http(("0.0.0.0", port)).map_err(io::Error::other)?;
    info!("To-do server running on http://localhost:{}", port);

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();
        let cookie = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Cookie"))
            .map(|h| h.value.as_str().to_string());
        let mut body = String::new();
        if let Err(err) = request.as_reader().read_to_string(&mut body) {
            debug!("unreadable request body: {}", err);
            body.clear();
        }

        let req = Request::new(method.clone(), &url, &body, cookie.as_deref());
        let reply = dispatch(&mut app, &req);
        debug!("{} {} -> {}", method, url, reply.status);

        if let Err(err) = request.respond(into_response(reply)) {
            debug!("failed to send response: {}", err);
        }
    }

    Ok(())
}
