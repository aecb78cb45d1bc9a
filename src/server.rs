use log::{debug, info, warn};
use std::io::{self, BufReader};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::ServerConfig;
use crate::handler::FileHandler;
use crate::log_error;
use crate::request::Request;
use crate::response::{Response, Status};

pub fn start_server(config: ServerConfig) -> io::Result<()> {
    let listener = TcpListener::bind(config.listen_addr())?;
    info!("Starting server at {}", listener.local_addr()?);
    info!("Directory: {}", config.root.display());
    info!("Compression: {}", config.compression);

    serve(listener, FileHandler::new(Arc::new(config)))
}

const MIN_ACCEPT_DELAY: Duration = Duration::from_millis(5);
const MAX_ACCEPT_DELAY: Duration = Duration::from_secs(1);

/// Accepts connections on `listener` forever, one thread each.
pub fn serve(listener: TcpListener, handler: FileHandler) -> io::Result<()> {
    let mut accept_delay = None;
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(s) => {
                accept_delay = None;
                s
            }
            Err(e) => {
                let delay = next_accept_delay(accept_delay);
                warn!("Failed to accept connection: {}; retrying in {:?}", e, delay);
                accept_delay = Some(delay);
                thread::sleep(delay);
                continue;
            }
        };
        let handler = handler.clone();

        thread::spawn(move || {
            if let Err(e) = handle_connection(stream, &handler) {
                log_error!(e, "Error handling connection");
            }
        });
    }

    Ok(())
}

/// Doubles the pause after each consecutive accept failure, e.g. when the
/// process is out of file descriptors.
fn next_accept_delay(previous: Option<Duration>) -> Duration {
    match previous {
        None => MIN_ACCEPT_DELAY,
        Some(delay) => (delay * 2).min(MAX_ACCEPT_DELAY),
    }
}

fn handle_connection(mut client: TcpStream, handler: &FileHandler) -> io::Result<()> {
    if let Ok(peer) = client.peer_addr() {
        debug!("New connection from {}", peer);
    }

    let request = {
        let mut reader = BufReader::new(&client);
        Request::read_from(&mut reader)
    };

    let response = match request {
        Ok(Some(request)) => handler.handle(&request),
        Ok(None) => {
            debug!("Connection closed before a request was sent");
            return Ok(());
        }
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            warn!("Rejecting request: {}", e);
            Response::text(Status::BadRequest, "Bad request")
        }
        Err(e) => return Err(e),
    };

    response.write_to(&mut client)
}
