//! Background thread that owns the backend client. The UI sends `Request`s
//! and drains `Response`s on every tick, so a slow backend never freezes the
//! terminal.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, error};

use crate::analytics::{load_snapshot, AnalyticsSnapshot};
use crate::api::{ApiError, Backend};
use crate::models::{ExportFormat, ExportedVerse, Product, ProductPayload, Verse, VersePayload};
use crate::verses::{VerseFilters, VerseSort};

/// Work for the backend thread.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ListVerses {
        ticket: u64,
        filters: VerseFilters,
        sort: VerseSort,
    },
    /// Create when `target` is `None`, update otherwise.
    SaveVerse {
        target: Option<String>,
        payload: VersePayload,
    },
    DeleteVerse {
        id: String,
    },
    BulkDeleteVerses {
        ids: Vec<String>,
    },
    ExportVerse {
        id: String,
        format: ExportFormat,
    },
    ListProducts {
        ticket: u64,
    },
    CreateProduct {
        payload: ProductPayload,
    },
    LoadAnalytics {
        ticket: u64,
    },
}

/// Result of a `Request`, tagged with whatever the reducer needs to route it.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    VersesListed {
        ticket: u64,
        result: Result<Vec<Verse>, ApiError>,
    },
    VerseSaved(Result<Verse, ApiError>),
    VersesDeleted {
        ids: Vec<String>,
        bulk: bool,
        result: Result<(), ApiError>,
    },
    VerseExported(Result<ExportedVerse, ApiError>),
    ProductsListed {
        ticket: u64,
        result: Result<Vec<Product>, ApiError>,
    },
    ProductCreated(Result<Product, ApiError>),
    AnalyticsLoaded {
        ticket: u64,
        result: Result<AnalyticsSnapshot, ApiError>,
    },
}

/// Run a single request against the backend.
pub fn execute<B: Backend + ?Sized>(backend: &B, request: Request) -> Response {
    match request {
        Request::ListVerses {
            ticket,
            filters,
            sort,
        } => Response::VersesListed {
            ticket,
            result: backend.list_verses(&filters, sort),
        },
        Request::SaveVerse { target, payload } => Response::VerseSaved(match target {
            Some(id) => backend.update_verse(&id, &payload),
            None => backend.create_verse(&payload),
        }),
        Request::DeleteVerse { id } => {
            let result = backend.delete_verse(&id);
            Response::VersesDeleted {
                ids: vec![id],
                bulk: false,
                result,
            }
        }
        Request::BulkDeleteVerses { ids } => {
            let result = backend.bulk_delete_verses(&ids);
            Response::VersesDeleted {
                ids,
                bulk: true,
                result,
            }
        }
        Request::ExportVerse { id, format } => {
            Response::VerseExported(backend.export_verse(&id, format))
        }
        Request::ListProducts { ticket } => Response::ProductsListed {
            ticket,
            result: backend.list_products(),
        },
        Request::CreateProduct { payload } => {
            Response::ProductCreated(backend.create_product(&payload))
        }
        Request::LoadAnalytics { ticket } => Response::AnalyticsLoaded {
            ticket,
            result: load_snapshot(backend),
        },
    }
}

/// Handle held by the UI thread.
pub struct Worker {
    requests: Sender<Request>,
    responses: Receiver<Response>,
}

impl Worker {
    /// Move `backend` onto a new thread and start serving requests in order.
    /// The thread exits once this handle is dropped and its current request
    /// has finished.
    pub fn spawn<B>(backend: B) -> Result<Self>
    where
        B: Backend + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel::<Request>();
        let (response_tx, response_rx) = mpsc::channel::<Response>();

        thread::Builder::new()
            .name("onimix-backend".to_string())
            .spawn(move || {
                for request in request_rx {
                    debug!(?request, "executing backend request");
                    let response = execute(&backend, request);
                    if response_tx.send(response).is_err() {
                        break;
                    }
                }
                debug!("backend worker stopped");
            })
            .context("failed to spawn backend worker")?;

        Ok(Self {
            requests: request_tx,
            responses: response_rx,
        })
    }

    pub fn send(&self, request: Request) {
        if self.requests.send(request).is_err() {
            error!("backend worker is gone; request dropped");
        }
    }

    /// Every response that has arrived since the last call.
    pub fn drain(&self) -> Vec<Response> {
        let mut responses = Vec::new();
        loop {
            match self.responses.try_recv() {
                Ok(response) => responses.push(response),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        responses
    }

    /// Block until the next response arrives or `timeout` passes.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Response> {
        match self.responses.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}
