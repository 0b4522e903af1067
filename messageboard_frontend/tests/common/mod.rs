#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use messageboard_frontend::transport::{RawResponse, Transport, TransportError};
use messageboard_frontend::{BoardClient, Identity};
use reqwest::{Method, Url};

pub const TIMEOUT: Duration = Duration::from_secs(5);
pub const TRIPCODE: &str = "test-trip";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub url: String,
    pub form: Vec<(String, String)>,
}

enum Route {
    Body(String),
    Fail(io::ErrorKind),
}

/// In-memory board keyed by endpoint name. Unknown endpoints refuse the connection.
#[derive(Default)]
pub struct FakeBoard {
    routes: Mutex<HashMap<String, Route>>,
    requests: Mutex<Vec<Recorded>>,
    held: Mutex<bool>,
    released: Condvar,
}

impl FakeBoard {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, endpoint: &str, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Route::Body(body.to_string()));
    }

    pub fn fail(&self, endpoint: &str, kind: io::ErrorKind) {
        self.routes
            .lock()
            .unwrap()
            .insert(endpoint.to_string(), Route::Fail(kind));
    }

    /// Makes every request wait until [`FakeBoard::release`] is called.
    pub fn hold(&self) {
        *self.held.lock().unwrap() = true;
    }

    pub fn release(&self) {
        *self.held.lock().unwrap() = false;
        self.released.notify_all();
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn client(self: &Arc<Self>) -> BoardClient {
        BoardClient::new(
            Url::parse("http://board.test").unwrap(),
            self.clone(),
            Identity::new(TRIPCODE),
        )
    }

    fn answer(&self, recorded: Recorded, url: &Url) -> Result<RawResponse, TransportError> {
        let mut held = self.held.lock().unwrap();
        while *held {
            held = self.released.wait(held).unwrap();
        }
        drop(held);
        self.requests.lock().unwrap().push(recorded);
        let endpoint = url.path().trim_start_matches('/');
        match self.routes.lock().unwrap().get(endpoint) {
            Some(Route::Body(body)) => Ok(RawResponse::new(200, body.clone())),
            Some(Route::Fail(kind)) => Err(io::Error::new(*kind, "scripted failure").into()),
            None => Err(io::Error::new(io::ErrorKind::ConnectionRefused, "no route").into()),
        }
    }
}

impl Transport for FakeBoard {
    fn request(
        &self,
        url: &Url,
        method: Method,
        _follow_redirects: bool,
    ) -> Result<RawResponse, TransportError> {
        let recorded = Recorded {
            method: method.to_string(),
            url: url.to_string(),
            form: Vec::new(),
        };
        self.answer(recorded, url)
    }

    fn post_request(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError> {
        let recorded = Recorded {
            method: "POST".to_string(),
            url: url.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        self.answer(recorded, url)
    }
}

pub fn post_json(id: i64, reply: i64) -> String {
    format!(r#"{{"hash":"hash{id}","content":"post {id}","rowid":{id},"reply":{reply}}}"#)
}

/// `{"response":[...]}` listing top-level posts with the given ids.
pub fn page(ids: &[i64]) -> String {
    replies(ids, -1)
}

pub fn replies(ids: &[i64], parent: i64) -> String {
    let posts: Vec<String> = ids.iter().map(|id| post_json(*id, parent)).collect();
    format!(r#"{{"response":[{}]}}"#, posts.join(","))
}

pub fn created(rowid: i64) -> String {
    format!(r#"{{"response":{{"rowid":{rowid}}}}}"#)
}

pub fn form(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
