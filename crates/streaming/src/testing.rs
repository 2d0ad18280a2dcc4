//! Scripted in-process [`ImageryEndpoint`] for tests here and downstream.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use foundation::Year;
use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::error::ImageryError;
use crate::protocol::ImageryResponse;
use crate::request::ImageryRequest;
use crate::resolver::{BoxFuture, ImageryEndpoint};

pub fn url_for(year: i32) -> String {
    format!("https://tiles.example/naip/{year}/{{z}}/{{x}}/{{y}}")
}

/// Answers from per-year queues, defaulting to `url_for(year)`.
#[derive(Default)]
pub struct ScriptedEndpoint {
    scripts: Mutex<BTreeMap<i32, VecDeque<Result<ImageryResponse, ImageryError>>>>,
    gates: Mutex<BTreeMap<i32, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<ImageryRequest>>,
}

impl ScriptedEndpoint {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_next(&self, year: i32, err: ImageryError) {
        self.scripts.lock().entry(year).or_default().push_back(Err(err));
    }

    /// Holds the next response for `year` until the returned sender fires.
    pub fn gate(&self, year: i32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(year, rx);
        tx
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls_for(&self, year: i32) -> usize {
        let start = Year(year).start_date();
        self.calls
            .lock()
            .iter()
            .filter(|r| r.start_date == start)
            .count()
    }
}

impl ImageryEndpoint for ScriptedEndpoint {
    fn request_tiles<'a>(
        &'a self,
        request: &'a ImageryRequest,
    ) -> BoxFuture<'a, Result<ImageryResponse, ImageryError>> {
        Box::pin(async move {
            self.calls.lock().push(request.clone());
            let year: i32 = request
                .start_date
                .get(..4)
                .and_then(|y| y.parse().ok())
                .unwrap_or_default();

            let gate = self.gates.lock().remove(&year);
            if let Some(gate) = gate {
                let _ = gate.await;
            }

            let scripted = self
                .scripts
                .lock()
                .get_mut(&year)
                .and_then(|q| q.pop_front());
            scripted.unwrap_or_else(|| {
                Ok(ImageryResponse {
                    tile_url: url_for(year),
                })
            })
        })
    }
}
