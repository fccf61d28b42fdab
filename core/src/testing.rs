//! Scripted in-process transport for controller tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::api::BookingApi;
use crate::client::BookingClient;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

pub(crate) const BASE_URL: &str = "http://clinic.test";

enum Reply {
    Status(u16, String),
    Refused,
}

struct Route {
    method: HttpMethod,
    path: String,
    reply: Reply,
}

pub(crate) struct Gate(Arc<Semaphore>);

impl Gate {
    /// Let held and future requests through, one at a time.
    pub(crate) fn open(&self) {
        self.0.add_permits(1);
    }
}

/// Answers each request with the first scripted reply whose method and path
/// match, consuming it. Unscripted requests get a 599.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    sent: Mutex<Vec<HttpRequest>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: format!("{BASE_URL}{path}"),
            reply: Reply::Status(status, body.to_string()),
        });
    }

    pub(crate) fn refuse(&self, method: HttpMethod, path: &str) {
        self.routes.lock().unwrap().push(Route {
            method,
            path: format!("{BASE_URL}{path}"),
            reply: Reply::Refused,
        });
    }

    /// Hold every reply until the returned gate is opened.
    pub(crate) fn hold(&self) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(Arc::clone(&semaphore));
        Gate(semaphore)
    }

    pub(crate) fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.sent.lock().unwrap().push(request.clone());
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _pass = gate.acquire().await.unwrap();
        }

        let route = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter()
                .position(|r| r.method == request.method && r.path == request.path)
                .map(|i| routes.remove(i))
        };
        match route.map(|r| r.reply) {
            Some(Reply::Status(status, body)) => Ok(HttpResponse::new(status, body)),
            Some(Reply::Refused) => Err(ApiError::Network("connection refused".to_string())),
            None => Ok(HttpResponse::new(599, "unscripted request")),
        }
    }
}

pub(crate) fn api(transport: &Arc<ScriptedTransport>) -> BookingApi<ScriptedTransport> {
    BookingApi::new(BookingClient::new(BASE_URL), Arc::clone(transport))
}

pub(crate) fn doctor_json(id: &str, name: &str, specialty: &str) -> String {
    format!(r#"{{"id":"{id}","name":"{name}","specialty":"{specialty}","availableSlots":[]}}"#)
}

pub(crate) fn appointment_json(id: &str, doctor_id: &str, patient: &str, date_time: &str) -> String {
    format!(
        r#"{{"id":"{id}","doctorId":"{doctor_id}","patientName":"{patient}","dateTime":"{date_time}","status":"Scheduled"}}"#
    )
}
