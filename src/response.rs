use std::io::{self, Write};

use crate::error::ServeError;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalServerError,
}

impl Status {
    pub fn code(&self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::InternalServerError => 500,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::InternalServerError => "Internal Server Error",
        }
    }
}

/// A fully buffered response. Nothing reaches the socket until it is built.
#[derive(Debug)]
pub struct Response {
    pub status: Status,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn ok(content_type: &str, encoding: &str, body: Vec<u8>) -> Self {
        Self {
            status: Status::Ok,
            headers: vec![
                ("Content-Type".to_string(), content_type.to_string()),
                ("Content-Encoding".to_string(), encoding.to_string()),
            ],
            body,
        }
    }

    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![(
                "Content-Type".to_string(),
                "text/plain; charset=utf-8".to_string(),
            )],
            body: body.into().into_bytes(),
        }
    }

    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\n",
            self.status.code(),
            self.status.reason()
        )?;
        for (key, value) in &self.headers {
            write!(out, "{}: {}\r\n", key, value)?;
        }
        write!(out, "Content-Length: {}\r\n", self.body.len())?;
        out.write_all(b"Connection: close\r\n\r\n")?;
        out.write_all(&self.body)?;
        out.flush()
    }
}

impl From<ServeError> for Response {
    fn from(err: ServeError) -> Self {
        Response::text(err.status(), err.body())
    }
}
