use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use rlog::Request;
use rlog::logger::Logger;
use serde_json::Value;
use tracing::{Dispatch, Level};
use tracing_subscriber::fmt::MakeWriter;

/// An in-memory log sink shared between the subscriber and the test.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    fn buf(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A dispatcher writing flattened JSON records, one per line, into this
    /// sink.
    pub fn dispatch(&self, level: Level) -> Dispatch {
        let subscriber = tracing_subscriber::fmt()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_max_level(level)
            .with_writer(self.clone())
            .finish();
        Dispatch::new(subscriber)
    }

    pub fn logger(&self, level: Level) -> Logger {
        Logger::new(self.dispatch(level))
    }

    pub fn records(&self) -> Vec<Value> {
        let out = String::from_utf8(self.buf().clone()).expect("utf-8 log output");
        out.lines()
            .map(|line| serde_json::from_str(line).expect("one JSON record per line"))
            .collect()
    }
}

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn get(uri: &str) -> Request {
    http::Request::get(uri)
        .body(Bytes::new())
        .map(Request::from)
        .expect("valid request")
}

pub fn message(record: &Value) -> &str {
    record["message"].as_str().unwrap_or_default()
}

pub fn request_id(record: &Value) -> Option<&str> {
    record["span"]["requestID"].as_str()
}
