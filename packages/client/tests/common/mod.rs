//! In-memory transport for driving the request pipeline without sockets

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use fetchkit_client::abort::AbortSignal;
use fetchkit_client::error::BoxError;
use fetchkit_client::http::WireBody;
use fetchkit_client::transport::{Transport, TransportRequest, TransportResponse};
use fetchkit_client::{FetchClient, HeaderMap, Method};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};

/// What the mock does with the next request
#[derive(Clone, Debug)]
pub enum Reply {
    /// Answer with a status, headers and body chunks
    Respond {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        chunks: Vec<&'static [u8]>,
    },
    /// Answer with a status and headers, send `first`, then never finish the body
    Stall {
        status: u16,
        first: &'static [u8],
    },
    /// Answer with a status, send `first`, then fail the body read
    Broken {
        status: u16,
        first: &'static [u8],
        error: &'static str,
    },
    /// Fail at the transport level
    Fail(&'static str),
    /// Never answer; settles only when the signal aborts
    Hang,
}

impl Reply {
    pub fn status(status: u16) -> Self {
        Reply::Respond {
            status,
            headers: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn json(status: u16, body: &'static str) -> Self {
        Reply::Respond {
            status,
            headers: vec![("content-type", "application/json")],
            chunks: vec![body.as_bytes()],
        }
    }
}

/// A request as the transport received it
#[derive(Clone, Debug)]
pub struct Seen {
    pub method: Method,
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub signal: AbortSignal,
}

#[derive(Default)]
struct State {
    replies: VecDeque<Reply>,
    fallback: Option<Reply>,
    seen: Vec<Seen>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply for the next unanswered request.
    pub fn reply(self, reply: Reply) -> Self {
        self.state.lock().expect("mock state poisoned").replies.push_back(reply);
        self
    }

    /// Reply used once the queue is empty; defaults to an empty 200.
    pub fn always(self, reply: Reply) -> Self {
        self.state.lock().expect("mock state poisoned").fallback = Some(reply);
        self
    }

    pub fn client(&self) -> FetchClient {
        FetchClient::with_transport(self.clone())
    }

    pub fn calls(&self) -> usize {
        self.state.lock().expect("mock state poisoned").seen.len()
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.state.lock().expect("mock state poisoned").seen.clone()
    }

    pub fn last(&self) -> Seen {
        self.seen().pop().expect("transport was never called")
    }
}

impl Transport for MockTransport {
    fn fetch(
        &self,
        request: TransportRequest,
        signal: AbortSignal,
    ) -> BoxFuture<'static, Result<TransportResponse, BoxError>> {
        let reply = {
            let mut state = self.state.lock().expect("mock state poisoned");
            let body = match request.body() {
                WireBody::Bytes(bytes) => Some(bytes.clone()),
                WireBody::Empty | WireBody::Stream(_) => None,
            };
            state.seen.push(Seen {
                method: request.method().clone(),
                uri: request.uri().to_string(),
                headers: request.headers().clone(),
                body,
                signal: signal.clone(),
            });
            state
                .replies
                .pop_front()
                .or_else(|| state.fallback.clone())
                .unwrap_or_else(|| Reply::status(200))
        };

        async move {
            match reply {
                Reply::Respond {
                    status,
                    headers,
                    chunks,
                } => {
                    let mut builder = http::Response::builder().status(status);
                    for (name, value) in headers {
                        builder = builder.header(name, value);
                    }
                    let body = stream::iter(
                        chunks
                            .into_iter()
                            .map(|chunk| Ok::<_, BoxError>(Bytes::from_static(chunk))),
                    )
                    .boxed();
                    Ok(builder.body(body)?)
                }
                Reply::Stall { status, first } => {
                    let body = stream::once(async move { Ok::<_, BoxError>(Bytes::from_static(first)) })
                        .chain(stream::pending())
                        .boxed();
                    Ok(http::Response::builder().status(status).body(body)?)
                }
                Reply::Broken { status, first, error } => {
                    let body = stream::iter(vec![
                        Ok::<_, BoxError>(Bytes::from_static(first)),
                        Err(error.into()),
                    ])
                    .boxed();
                    Ok(http::Response::builder().status(status).body(body)?)
                }
                Reply::Fail(message) => Err(message.into()),
                Reply::Hang => {
                    signal.cancelled().await;
                    Err("request cancelled".into())
                }
            }
        }
        .boxed()
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
