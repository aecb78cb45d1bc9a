use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::error::{Result, ServeError};
use crate::request::{Request, RequestPath};
use crate::resolver::resolve;
use crate::response::Response;
use crate::{log_error, log_request, log_response};

/// Turns requests into fully buffered, compressed responses.
#[derive(Debug, Clone)]
pub struct FileHandler {
    config: Arc<ServerConfig>,
}

impl FileHandler {
    pub fn new(config: Arc<ServerConfig>) -> Self {
        Self { config }
    }

    pub fn handle(&self, request: &Request) -> Response {
        let start_time = Instant::now();
        log_request!(request.method, request.target);

        let (response, original_size) = match self.respond(request) {
            Ok(result) => result,
            Err(e) => {
                if e.status().code() >= 500 {
                    log_error!(e, format!("{} {}", request.method, request.target));
                } else {
                    log::debug!("{} {}: {}", request.method, request.target, e);
                }
                (Response::from(e), 0)
            }
        };

        log_response!(
            response.status.code(),
            start_time.elapsed(),
            original_size,
            response.body.len()
        );
        response
    }

    fn respond(&self, request: &Request) -> Result<(Response, usize)> {
        if request.method != "GET" {
            return Err(ServeError::NotFound("Method is not supported.".to_string()));
        }

        let path = RequestPath::parse(&request.target)?;
        let (body, content_type) = resolve(&self.config.root, &path)?.into_body()?;

        let mode = self.config.compression;
        if let Some(accepted) = request.header("accept-encoding") {
            if !accepts_encoding(accepted, mode.encoding()) {
                log::debug!(
                    "Client accepts \"{}\" but responses are always {}",
                    accepted,
                    mode.encoding()
                );
            }
        }

        let compressed = mode.compress(&body)?;
        Ok((
            Response::ok(content_type, mode.encoding(), compressed),
            body.len(),
        ))
    }
}

fn accepts_encoding(accept_encoding: &str, encoding: &str) -> bool {
    accept_encoding
        .split(',')
        .map(|e| e.split(';').next().unwrap_or("").trim())
        .any(|e| e == "*" || e.eq_ignore_ascii_case(encoding))
}
