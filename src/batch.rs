//! Concurrent generation of many mazes on a fixed pool of worker threads.
//!
//! A batch is split into contiguous blocks of requests, one work item per block. Each worker
//! generates its block's mazes in request order and stores the text in that block's result slot,
//! so joining the slots in block order reproduces the request order.

use std::collections::VecDeque;
use std::ops::Range;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use tracing::{debug, error};

use crate::config::MazeConfig;
use crate::create::create;
use crate::grid_factory::GridFactory;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WorkerState {
    Waiting,
    Executing,
    Terminated,
}

#[derive(Debug)]
struct WorkItem {
    block: usize,
    requests: Vec<MazeConfig>,
}

#[derive(Debug, Default)]
struct WorkQueue {
    items: VecDeque<WorkItem>,
    should_exit: bool,
}

#[derive(Debug, Default)]
struct Results {
    blocks: Vec<Option<String>>,
    pending: usize,
}

struct Shared {
    factory: Arc<GridFactory>,
    queue: Mutex<WorkQueue>,
    work_ready: Condvar,
    // separate from the queue lock
    results: Mutex<Results>,
    all_done: Condvar,
    states: Mutex<Vec<WorkerState>>,
}

// Poisoning is ignored: no lock is held across generation.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Shared {
    fn set_state(&self, worker: usize, state: WorkerState) {
        if let Some(s) = lock(&self.states).get_mut(worker) {
            *s = state;
        }
    }

    fn next_item(&self, worker: usize) -> Option<WorkItem> {
        let mut queue = lock(&self.queue);
        loop {
            if queue.should_exit {
                return None;
            }
            if let Some(item) = queue.items.pop_front() {
                return Some(item);
            }
            self.set_state(worker, WorkerState::Waiting);
            queue = self.work_ready.wait(queue).unwrap_or_else(|poisoned| poisoned.into_inner());
        }
    }

    fn finish(&self, block: usize, output: String) {
        let mut results = lock(&self.results);
        if results.pending == 0 {
            // the batch was abandoned by a shutdown
            return;
        }
        if let Some(slot) = results.blocks.get_mut(block) {
            *slot = Some(output);
        }
        results.pending -= 1;
        if results.pending == 0 {
            self.all_done.notify_all();
        }
    }
}

fn worker_loop(worker: usize, shared: Arc<Shared>) {
    debug!("[batch] worker {} started", worker);
    while let Some(item) = shared.next_item(worker) {
        shared.set_state(worker, WorkerState::Executing);
        let factory = &shared.factory;
        let output = panic::catch_unwind(AssertUnwindSafe(|| {
                item.requests.iter().map(|config| create(factory, config)).collect::<String>()
            }))
            .unwrap_or_else(|_| {
                error!("[batch] worker {} panicked on block {}", worker, item.block);
                String::new()
            });
        shared.finish(item.block, output);
    }
    shared.set_state(worker, WorkerState::Terminated);
    debug!("[batch] worker {} terminated", worker);
}

/// Split `len` requests into at most `blocks` contiguous ranges.
///
/// Sizes differ by at most one, the larger ranges first. No range is empty.
pub fn partition(len: usize, blocks: usize) -> Vec<Range<usize>> {
    let blocks = blocks.max(1).min(len);
    if blocks == 0 {
        return vec![];
    }
    let (base, remainder) = (len / blocks, len % blocks);
    let mut ranges = Vec::with_capacity(blocks);
    let mut start = 0;
    for block in 0..blocks {
        let size = base + if block < remainder { 1 } else { 0 };
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

/// A pool of maze generating threads, owned by whoever creates it.
///
/// Threads start in `new` and stop at `shutdown` or when the generator is dropped.
pub struct BatchGenerator {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    worker_count: usize,
    batch_lock: Mutex<()>,
}

impl BatchGenerator {
    pub fn new(factory: Arc<GridFactory>, workers: usize) -> BatchGenerator {
        let worker_count = workers.max(1);
        let shared = Arc::new(Shared {
            factory,
            queue: Mutex::new(WorkQueue::default()),
            work_ready: Condvar::new(),
            results: Mutex::new(Results::default()),
            all_done: Condvar::new(),
            states: Mutex::new(vec![WorkerState::Waiting; worker_count]),
        });

        let workers = (0..worker_count)
            .map(|worker| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || worker_loop(worker, shared))
            })
            .collect();

        BatchGenerator {
            shared,
            workers,
            worker_count,
            batch_lock: Mutex::new(()),
        }
    }

    pub fn with_default_workers(factory: Arc<GridFactory>) -> BatchGenerator {
        BatchGenerator::new(factory, DEFAULT_WORKERS)
    }

    #[inline]
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_running(&self) -> bool {
        !self.workers.is_empty()
    }

    pub fn worker_states(&self) -> Vec<WorkerState> {
        lock(&self.shared.states).clone()
    }

    /// Queue one work item per block of `requests` and wake the workers.
    ///
    /// False if the pool has shut down or an earlier batch is still pending.
    pub fn generate(&self, requests: &[MazeConfig]) -> bool {
        if !self.is_running() {
            return false;
        }
        let blocks = partition(requests.len(), self.worker_count);
        {
            let mut results = lock(&self.shared.results);
            if results.pending > 0 {
                return false;
            }
            results.blocks = vec![None; blocks.len()];
            results.pending = blocks.len();
        }
        debug!("[batch] {} requests in {} blocks", requests.len(), blocks.len());

        let mut queue = lock(&self.shared.queue);
        for (block, range) in blocks.into_iter().enumerate() {
            queue.items.push_back(WorkItem {
                block,
                requests: requests[range].to_vec(),
            });
        }
        self.shared.work_ready.notify_all();
        true
    }

    /// Block until every queued block has finished, then take the joined output in block order.
    pub fn wait_for_completion(&self) -> String {
        let mut results = lock(&self.shared.results);
        while results.pending > 0 {
            results = self.shared
                .all_done
                .wait(results)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        results.blocks.drain(..).flatten().collect()
    }

    /// Generate every request and concatenate the texts in request order.
    ///
    /// One request is generated on the calling thread. Concurrent callers are served one batch at
    /// a time.
    pub fn create_batch(&self, requests: &[MazeConfig]) -> String {
        match requests.len() {
            0 => String::new(),
            1 => create(&self.shared.factory, &requests[0]),
            _ => {
                let _batch = lock(&self.batch_lock);
                if self.generate(requests) {
                    self.wait_for_completion()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Stop the workers. Blocks already running finish, but their output and anything still
    /// queued is discarded, and waiters are released.
    pub fn shutdown(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        {
            let mut queue = lock(&self.shared.queue);
            queue.should_exit = true;
            queue.items.clear();
            self.shared.work_ready.notify_all();
        }
        {
            let mut results = lock(&self.shared.results);
            results.pending = 0;
            self.shared.all_done.notify_all();
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("[batch] worker thread panicked");
            }
        }
        debug!("[batch] pool of {} workers shut down", self.worker_count);
    }
}

impl Drop for BatchGenerator {
    fn drop(&mut self) {
        self.shutdown();
    }
}


#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use quickcheck::quickcheck;

    use super::*;
    use crate::generators::Algorithm;

    fn generator() -> BatchGenerator {
        BatchGenerator::with_default_workers(Arc::new(GridFactory::new()))
    }

    fn sequential(requests: &[MazeConfig]) -> String {
        let factory = GridFactory::new();
        requests.iter().map(|c| create(&factory, c)).collect()
    }

    fn config(rows: usize, columns: usize, seed: u64) -> MazeConfig {
        MazeConfig::new().with_rows(rows).with_columns(columns).with_seed(seed)
    }

    #[test]
    fn partition_is_contiguous_and_even() {
        assert_eq!(partition(10, 4), vec![0..3, 3..6, 6..8, 8..10]);
        assert_eq!(partition(4, 4), vec![0..1, 1..2, 2..3, 3..4]);
        assert_eq!(partition(2, 4), vec![0..1, 1..2]);
        assert_eq!(partition(7, 1), vec![0..7]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn two_requests_in_order() {
        let a = config(5, 5, 1234);
        let b = config(3, 3, 5678);
        let batch = generator().create_batch(&[a, b]);
        let factory = GridFactory::new();
        assert_eq!(batch, create(&factory, &a) + &create(&factory, &b));
    }

    #[test]
    fn many_requests_in_order() {
        let requests: Vec<MazeConfig> = (0..13)
            .map(|i| {
                config(2 + i % 5, 3 + i % 4, i as u64)
                    .with_algorithm([Algorithm::BinaryTree, Algorithm::Sidewinder,
                                     Algorithm::DepthFirstSearch][i % 3])
            })
            .collect();
        let g = generator();
        assert_eq!(g.create_batch(&requests), sequential(&requests));
        // the pool is reusable
        assert_eq!(g.create_batch(&requests[..5]), sequential(&requests[..5]));
    }

    #[test]
    fn empty_and_single_batches() {
        let g = generator();
        assert_eq!(g.create_batch(&[]), "");
        let single = config(4, 4, 9);
        assert_eq!(g.create_batch(&[single]), sequential(&[single]));
    }

    #[test]
    fn explicit_generate_then_wait() {
        let g = generator();
        let requests = [config(3, 3, 1), config(4, 4, 2), config(5, 5, 3)];
        assert!(g.generate(&requests));
        assert_eq!(g.wait_for_completion(), sequential(&requests));
        // nothing pending, nothing to collect
        assert_eq!(g.wait_for_completion(), "");
    }

    #[test]
    fn workers_settle_then_terminate() {
        let mut g = BatchGenerator::new(Arc::new(GridFactory::new()), 3);
        assert_eq!(g.worker_count(), 3);
        g.create_batch(&[config(3, 3, 1), config(3, 3, 2), config(3, 3, 3)]);

        let deadline = Instant::now() + Duration::from_secs(5);
        while g.worker_states().iter().any(|s| *s != WorkerState::Waiting) && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(g.worker_states(), vec![WorkerState::Waiting; 3]);

        g.shutdown();
        assert!(!g.is_running());
        assert_eq!(g.worker_states(), vec![WorkerState::Terminated; 3]);
        assert!(!g.generate(&[config(2, 2, 1), config(2, 2, 2)]));
        assert_eq!(g.create_batch(&[config(2, 2, 1), config(2, 2, 2)]), "");
    }

    #[test]
    fn batch_matches_sequential() {
        fn p(seeds: Vec<u16>) -> bool {
            let requests: Vec<MazeConfig> = seeds.iter()
                .take(12)
                .map(|s| config(3, 2 + (*s as usize % 3), u64::from(*s)))
                .collect();
            generator().create_batch(&requests) == sequential(&requests)
        }
        quickcheck(p as fn(Vec<u16>) -> bool);
    }
}
