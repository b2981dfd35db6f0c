use crate::core::{ModelStats, RasterImage, ScoredPrediction};
use crate::engine::SketchEngine;
use crate::error::{Result, SketchError};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use tracing::{debug, error};

enum Request {
    Classify {
        image: RasterImage,
        reply: Sender<ScoredPrediction>,
    },
    Teach {
        images: Vec<RasterImage>,
        label: String,
        reply: Sender<usize>,
    },
    Stats {
        reply: Sender<ModelStats>,
    },
    Reset {
        reply: Sender<()>,
    },
}

/// An answer that will arrive from the worker.
pub struct Pending<T> {
    rx: Receiver<T>,
}

impl<T> Pending<T> {
    /// Blocks until the worker replies.
    pub fn wait(self) -> Result<T> {
        self.rx.recv().map_err(|_| SketchError::ServiceUnavailable)
    }
}

/// Runs a [`SketchEngine`] on a dedicated thread.
///
/// Requests are served one at a time in submission order, so a classify sent
/// after a teach always sees the taught example. Every request gets exactly
/// one reply.
pub struct SketchService {
    tx: Option<Sender<Request>>,
    worker: Option<JoinHandle<SketchEngine>>,
}

impl SketchService {
    pub fn spawn(engine: SketchEngine) -> Result<Self> {
        let (tx, rx) = channel::<Request>();
        let worker = thread::Builder::new()
            .name("sketch-engine".to_string())
            .spawn(move || serve(engine, rx))?;
        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn classify(&self, image: RasterImage) -> Result<Pending<ScoredPrediction>> {
        self.submit(|reply| Request::Classify { image, reply })
    }

    pub fn teach(&self, image: RasterImage, label: impl Into<String>) -> Result<Pending<usize>> {
        self.teach_many(vec![image], label)
    }

    pub fn teach_many(
        &self,
        images: Vec<RasterImage>,
        label: impl Into<String>,
    ) -> Result<Pending<usize>> {
        let label = label.into();
        self.submit(|reply| Request::Teach {
            images,
            label,
            reply,
        })
    }

    pub fn stats(&self) -> Result<Pending<ModelStats>> {
        self.submit(|reply| Request::Stats { reply })
    }

    pub fn reset(&self) -> Result<Pending<()>> {
        self.submit(|reply| Request::Reset { reply })
    }

    /// Drains the queue, stops the worker and hands the engine back.
    pub fn shutdown(mut self) -> Result<SketchEngine> {
        self.stop().ok_or(SketchError::ServiceUnavailable)
    }

    fn submit<T>(&self, build: impl FnOnce(Sender<T>) -> Request) -> Result<Pending<T>> {
        let tx = self.tx.as_ref().ok_or(SketchError::ServiceUnavailable)?;
        let (reply, rx) = channel();
        tx.send(build(reply))
            .map_err(|_| SketchError::ServiceUnavailable)?;
        Ok(Pending { rx })
    }

    fn stop(&mut self) -> Option<SketchEngine> {
        drop(self.tx.take());
        let worker = self.worker.take()?;
        match worker.join() {
            Ok(engine) => Some(engine),
            Err(_) => {
                error!("sketch engine worker panicked");
                None
            }
        }
    }
}

impl Drop for SketchService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve(mut engine: SketchEngine, rx: Receiver<Request>) -> SketchEngine {
    debug!("sketch engine worker started");
    // A caller that dropped its Pending simply misses the reply.
    for request in rx {
        match request {
            Request::Classify { image, reply } => {
                let _ = reply.send(engine.classify(&image));
            }
            Request::Teach {
                images,
                label,
                reply,
            } => {
                let _ = reply.send(engine.teach_many(&images, &label));
            }
            Request::Stats { reply } => {
                let _ = reply.send(engine.stats().clone());
            }
            Request::Reset { reply } => {
                engine.reset();
                let _ = reply.send(());
            }
        }
    }
    debug!("sketch engine worker stopped");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::fixtures::{cross, ring};
    use std::sync::Arc;

    fn service() -> SketchService {
        let engine = SketchEngine::new(&EngineConfig::default()).unwrap();
        SketchService::spawn(engine).unwrap()
    }

    #[test]
    fn requests_are_served_in_order() {
        let svc = service();
        let taught = svc.teach(ring(), "ring").unwrap();
        let classified = svc.classify(ring()).unwrap();
        let stats = svc.stats().unwrap();

        assert_eq!(taught.wait().unwrap(), 5);
        assert_eq!(classified.wait().unwrap().label(), Some("ring"));
        assert_eq!(stats.wait().unwrap().get("ring"), Some(5));
    }

    #[test]
    fn reset_is_observed_by_later_requests() {
        let svc = service();
        svc.teach(cross(), "x").unwrap();
        svc.reset().unwrap();
        let p = svc.classify(cross()).unwrap().wait().unwrap();
        assert!(p.is_none());
        assert!(svc.stats().unwrap().wait().unwrap().is_empty());
    }

    #[test]
    fn every_request_gets_one_reply() {
        let svc = service();
        let pending: Vec<_> = (0..10).map(|_| svc.stats().unwrap()).collect();
        for p in pending {
            assert!(p.wait().is_ok());
        }
    }

    #[test]
    fn concurrent_callers_share_one_engine() {
        let svc = Arc::new(service());
        let handles: Vec<_> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|label| {
                let svc = Arc::clone(&svc);
                thread::spawn(move || svc.teach(ring(), label).unwrap().wait().unwrap())
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), 5);
        }
        let stats = svc.stats().unwrap().wait().unwrap();
        assert_eq!(stats.label_count(), 4);
        assert_eq!(stats.total_examples(), 20);
    }

    #[test]
    fn shutdown_returns_engine_with_state() {
        let svc = service();
        svc.teach(ring(), "ring").unwrap();
        let engine = svc.shutdown().unwrap();
        assert_eq!(engine.stats().get("ring"), Some(5));
    }

    #[test]
    fn dropped_pending_does_not_stall_worker() {
        let svc = service();
        drop(svc.teach(ring(), "ring").unwrap());
        assert_eq!(svc.stats().unwrap().wait().unwrap().get("ring"), Some(5));
    }
}
