//! Helpers shared by the unit tests: a one-shot HTTP server, tgz fixtures,
//! a fake process runner and a reporter that records what it is told.

use super::probe::{CommandOutput, CommandRunner};
use super::report::{Level, Reporter};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

/// Serves a single request on a random local port and returns its base URL.
pub fn serve_once(status: &'static str, body: Vec<u8>, with_length: bool) -> String {
    serve(status, body, with_length, None)
}

/// Like `serve_once`, but sends the first `split` body bytes, waits `pause`,
/// then sends the rest.
pub fn serve_with_stall(body: Vec<u8>, split: usize, pause: Duration) -> String {
    serve("200 OK", body, true, Some((split, pause)))
}

fn serve(
    status: &'static str,
    body: Vec<u8>,
    with_length: bool,
    stall: Option<(usize, Duration)>,
) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        let (mut stream, _) = match listener.accept() {
            Ok(conn) => conn,
            Err(_) => return,
        };

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }

        let mut head = format!("HTTP/1.1 {}\r\nConnection: close\r\n", status);
        if with_length {
            head.push_str(&format!("Content-Length: {}\r\n", body.len()));
        }
        head.push_str("\r\n");

        let _ = stream.write_all(head.as_bytes());
        match stall {
            Some((split, pause)) => {
                let split = split.min(body.len());
                let _ = stream.write_all(&body[..split]);
                let _ = stream.flush();
                thread::sleep(pause);
                let _ = stream.write_all(&body[split..]);
            }
            None => {
                let _ = stream.write_all(&body);
            }
        }
        let _ = stream.flush();
    });

    format!("http://{}", addr)
}

pub fn http_client() -> reqwest::blocking::Client {
    crate::utils::download::client_builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Builds an in-memory `.tgz` holding the given files.
pub fn build_tgz(files: &[(&str, &[u8])]) -> Vec<u8> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);

    for (path, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, *contents).unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

#[derive(Default)]
pub struct RecordingReporter {
    pub lines: RefCell<Vec<(Level, String)>>,
    pub total: Cell<Option<u64>>,
    pub transferred: Cell<u64>,
    pub finished: Cell<bool>,
}

impl RecordingReporter {
    pub fn text(&self) -> String {
        self.lines
            .borrow()
            .iter()
            .map(|(_, line)| line.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Reporter for RecordingReporter {
    fn log(&self, level: Level, line: &str) {
        self.lines.borrow_mut().push((level, line.to_string()));
    }

    fn begin_transfer(&self, total: u64) {
        self.total.set(Some(total));
    }

    fn advance(&self, bytes: u64) {
        self.transferred.set(self.transferred.get() + bytes);
    }

    fn finish_transfer(&self) {
        self.finished.set(true);
    }
}

/// Answers commands from a table keyed by program name; unknown programs fail
/// to launch the way a missing binary does.
#[derive(Default)]
pub struct FakeRunner {
    responses: HashMap<String, CommandOutput>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, program: &str, success: bool, stdout: &str, stderr: &str) -> Self {
        self.responses.insert(
            program.to_string(),
            CommandOutput {
                success,
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
            },
        );
        self
    }

    /// Java and Python both present.
    pub fn all_present() -> Self {
        Self::new()
            .respond("java", true, "", "openjdk version \"11.0.20\" 2023-07-18\n")
            .respond("python", true, "Python 3.11.4\n", "")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str]) -> std::io::Result<CommandOutput> {
        let mut call = program.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().unwrap().push(call);

        self.responses.get(program).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("{program}: not found"))
        })
    }
}
