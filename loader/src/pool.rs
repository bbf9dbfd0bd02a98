//! Fixed-size worker pool for the parallel load stage.
//!
//! Jobs go over an unbounded channel to a small set of worker threads.
//! [`Pool::drain`] blocks until every submitted job has finished and
//! surfaces the first failure; the pipeline calls it at every barrier.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Sender};
use modl_core::{Fatal, ModlResult};
use tracing::trace;

type Job = Box<dyn FnOnce() -> ModlResult<()> + Send>;

struct Pending {
    in_flight: usize,
    failure: Option<Fatal>,
}

struct Shared {
    pending: Mutex<Pending>,
    settled: Condvar,
}

pub struct Pool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl Pool {
    pub fn new(workers: usize) -> Pool {
        let (sender, receiver) = unbounded::<Job>();
        let shared = Arc::new(Shared {
            pending: Mutex::new(Pending {
                in_flight: 0,
                failure: None,
            }),
            settled: Condvar::new(),
        });

        let handles = (0..workers)
            .map(|index| {
                let receiver = receiver.clone();
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    trace!(worker = index, "worker started");
                    for job in receiver.iter() {
                        let result = job();
                        let mut pending = shared.pending.lock().unwrap();
                        pending.in_flight -= 1;
                        if let Err(fatal) = result {
                            // Only the first failure survives a drain.
                            pending.failure.get_or_insert(fatal);
                        }
                        shared.settled.notify_all();
                    }
                })
            })
            .collect();

        Pool {
            sender: Some(sender),
            workers: handles,
            shared,
        }
    }

    /// Queues a job. Returns immediately; the outcome is observed at the
    /// next [`drain`](Pool::drain).
    pub fn submit(&self, job: impl FnOnce() -> ModlResult<()> + Send + 'static) {
        {
            let mut pending = self.shared.pending.lock().unwrap();
            pending.in_flight += 1;
        }
        self.sender
            .as_ref()
            .expect("pool already shut down")
            .send(Box::new(job))
            .expect("worker channel closed");
    }

    /// Blocks until all submitted jobs have completed, then reports the
    /// first failure seen since the previous drain, if any.
    pub fn drain(&self) -> ModlResult<()> {
        let mut pending = self.shared.pending.lock().unwrap();
        while pending.in_flight > 0 {
            pending = self.shared.settled.wait(pending).unwrap();
        }
        match pending.failure.take() {
            Some(fatal) => Err(fatal),
            None => Ok(()),
        }
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        // Closing the channel ends the worker loops.
        self.sender.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}
