use std::collections::HashMap;
use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::Mutex;

use http::StatusCode;
use serde::Serialize;

use super::SourceClient;
use super::SourceResponse;

/// A mocking source client maintaining a queue of stub responses per path
///
/// Consecutive requests to the same path pop consecutive stubs, which is how
/// multi-page fetches are simulated: queue one response per page.
///
/// See [MockingClient::stub]
#[derive(Debug, Default, Clone)]
pub struct MockingClient {
    stubs: HashMap<String, Arc<Mutex<VecDeque<StubResponse>>>>,
}

impl From<MockingClient> for SourceClient {
    fn from(value: MockingClient) -> Self {
        Self::Mocked(value)
    }
}

#[derive(Debug)]
pub struct MockingError {
    pub status: StatusCode,
    pub url: String,
}

impl MockingClient {
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a stub request
    #[must_use = "call .finish() to register the stub request"]
    pub fn stub<U: AsRef<str>>(&mut self, path: U) -> StubRequestBuilder<'_> {
        StubRequestBuilder::new(path.as_ref().into(), self)
    }

    pub(super) fn fetch_mocked<R: SourceResponse>(
        &self,
        req_path: &str,
    ) -> Result<Option<R::Response>, MockingError> {
        let Some(stub) = self
            .stubs
            .get(req_path)
            .and_then(|stubs| stubs.deref().lock().unwrap().pop_front())
        else {
            panic!("could not find stub for request at PATH '{req_path}'");
        };

        if !stub.code.is_success() {
            return Err(MockingError {
                status: stub.code,
                url: req_path.to_string(),
            });
        }
        match stub.body {
            None => Ok(None),
            Some(body) => Ok(Some(
                R::from_bytes(body.as_bytes())
                    .expect("mocked response body should deserialize faultlessly"),
            )),
        }
    }
}

/// A stub response that mocks a response status code and body
#[derive(Debug, Clone)]
struct StubResponse {
    code: StatusCode,
    body: Option<Arc<String>>,
}

#[derive(Debug)]
pub struct StubRequestBuilder<'a> {
    path: String,
    client: &'a mut MockingClient,
}

#[derive(Debug)]
pub struct StubResponseBuilder<'a> {
    code: StatusCode,
    bodies: Vec<Option<Arc<String>>>,
    request_builder: StubRequestBuilder<'a>,
}

impl<'a> StubRequestBuilder<'a> {
    fn new(path: String, client: &'a mut MockingClient) -> Self {
        Self { path, client }
    }

    /// Sets the mocked response associated to this stubbed request
    #[must_use = "call .finish() to register the stub request"]
    pub fn response(self, code: StatusCode) -> StubResponseBuilder<'a> {
        StubResponseBuilder {
            code,
            bodies: Vec::new(),
            request_builder: self,
        }
    }

    fn finish_with_responses(self, responses: Vec<StubResponse>) {
        let stubs = self.client.stubs.entry(self.path).or_default();
        responses
            .into_iter()
            .for_each(|stub| stubs.deref().lock().unwrap().push_back(stub));
    }
}

impl StubResponseBuilder<'_> {
    /// Queues a body for the mocked response
    ///
    /// Calling this multiple times queues one response per body, popped in
    /// order by consecutive requests to the same path.
    #[must_use = "call .finish() to register the stub request"]
    pub fn body<B: AsRef<str>>(mut self, body: B) -> Self {
        self.bodies.push(Some(Arc::new(body.as_ref().to_string())));
        self
    }

    #[must_use = "call .finish() to register the stub request"]
    pub fn json<T: Serialize>(mut self, body: T) -> Self {
        let json_body = serde_json::to_string(&body).expect("Failed to serialize JSON");
        self.bodies.push(Some(Arc::new(json_body)));
        self
    }

    /// Builds the [StubResponse]s and registers them into the [MockingClient]
    pub fn finish(self) {
        let responses = self
            .bodies
            .into_iter()
            .map(|body| StubResponse {
                code: self.code,
                body,
            })
            .collect();
        self.request_builder.finish_with_responses(responses)
    }
}
