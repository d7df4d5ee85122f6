#![forbid(unsafe_code)]

//! Producer/consumer playback: a sort run on a background thread.
//!
//! [`SortWorker`] moves an owned [`SortRun`] onto a worker thread that pushes
//! every event through a bounded channel. The consumer pulls events in the
//! exact order the algorithm produced them.
//!
//! # How it works
//!
//! 1. The worker checks the stop flag, pulls one step, and sends it.
//! 2. When the channel is full the worker blocks on `send` (backpressure);
//!    events are never dropped.
//! 3. After each send the worker optionally waits `step_delay`; the wait is
//!    cut short by the stop flag.
//! 4. The worker exits after sending `Done` or an error, when stopped, or
//!    when the receiver is gone.
//!
//! # Cancellation
//!
//! [`SortWorker::cancel`] raises the stop flag and drops the receiver so
//! a worker blocked on a full channel wakes up. The array handed back in
//! [`WorkerOutcome`] always equals the result of `stats.steps()` completed
//! steps: a step's mutation and the send of its event happen in the same
//! iteration, with no stop check in between.

use std::sync::mpsc::{self, Receiver, SyncSender, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::algorithm::Algorithm;
use crate::array::ArrayModel;
use crate::engine::{RunState, RunStats, SortRun};
use crate::error::{Result, SortError};
use crate::step::StepEvent;

/// Stop flag shared by a [`SortWorker`] handle and its thread.
///
/// Raised once by the consumer side, never lowered. The worker polls it
/// between steps and sleeps on it during the step delay, so raising the
/// flag also cuts a pending delay short.
#[derive(Clone, Default)]
pub(crate) struct StopFlag {
    state: Arc<(Mutex<bool>, Condvar)>,
}

impl StopFlag {
    pub(crate) fn raise(&self) {
        let (raised, wake) = &*self.state;
        *raised.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    pub(crate) fn is_raised(&self) -> bool {
        let (raised, _) = &*self.state;
        *raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for up to `timeout`. Returns whether the flag was raised.
    pub(crate) fn sleep(&self, timeout: Duration) -> bool {
        let (raised, wake) = &*self.state;
        let guard = raised.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = wake
            .wait_timeout_while(guard, timeout, |raised| !*raised)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// What the worker hands back when it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerOutcome {
    pub algorithm: Algorithm,
    /// The array after every step the worker performed.
    pub array: ArrayModel,
    /// Final run state; `Running` (or `Idle`) when cancelled early.
    pub state: RunState,
    /// Steps performed, which can exceed the events a cancelling consumer
    /// actually received.
    pub stats: RunStats,
    /// Whether the worker exited before the run finished.
    pub cancelled: bool,
}

/// Handle to a sort run executing on a background thread.
pub struct SortWorker {
    algorithm: Algorithm,
    receiver: Option<Receiver<Result<StepEvent>>>,
    stop: StopFlag,
    thread: Option<thread::JoinHandle<WorkerOutcome>>,
}

impl SortWorker {
    /// Start `run` on a new thread.
    ///
    /// `capacity` bounds the event channel and must be at least 1.
    /// `step_delay` paces the worker; zero runs as fast as the consumer reads.
    pub fn spawn(
        run: SortRun<ArrayModel>,
        capacity: usize,
        step_delay: Duration,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(SortError::invalid_config(
                "channel capacity must be at least 1",
            ));
        }
        let algorithm = run.algorithm();
        let (sender, receiver) = mpsc::sync_channel(capacity);
        let stop = StopFlag::default();
        let worker_stop = stop.clone();

        crate::debug!(
            algorithm = algorithm.name(),
            len = run.array().len(),
            capacity,
            step_delay_ms = step_delay.as_millis() as u64,
            "spawning sort worker"
        );
        let thread = thread::spawn(move || work(run, sender, worker_stop, step_delay));

        Ok(Self {
            algorithm,
            receiver: Some(receiver),
            stop,
            thread: Some(thread),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Block until the next event; `None` once the worker has exited and
    /// every sent event has been received.
    pub fn recv(&self) -> Option<Result<StepEvent>> {
        self.receiver.as_ref()?.recv().ok()
    }

    /// Non-blocking receive for consumers polling from their own loop.
    ///
    /// `Ok(None)` means nothing is ready yet; `Err(())` means the worker is
    /// gone and the channel is drained.
    #[allow(clippy::result_unit_err)]
    pub fn try_recv(&self) -> std::result::Result<Option<Result<StepEvent>>, ()> {
        let Some(receiver) = self.receiver.as_ref() else {
            return Err(());
        };
        match receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(()),
        }
    }

    /// Stop the worker between steps and take the array back.
    ///
    /// Events still buffered in the channel are discarded.
    pub fn cancel(mut self) -> Result<WorkerOutcome> {
        crate::debug!(algorithm = self.algorithm.name(), "cancelling sort worker");
        self.stop.raise();
        // Unblocks a worker waiting on a full channel.
        self.receiver.take();
        self.join_thread()
    }

    /// Let the worker run to completion, discarding unread events, and take
    /// the array back.
    pub fn join(mut self) -> Result<WorkerOutcome> {
        if let Some(receiver) = self.receiver.take() {
            for _ in receiver.iter() {}
        }
        self.join_thread()
    }

    fn join_thread(&mut self) -> Result<WorkerOutcome> {
        let handle = self.thread.take().ok_or(SortError::WorkerPanicked)?;
        handle.join().map_err(|_| {
            crate::warn!(algorithm = self.algorithm.name(), "sort worker panicked");
            SortError::WorkerPanicked
        })
    }
}

impl Iterator for SortWorker {
    type Item = Result<StepEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.recv()
    }
}

impl Drop for SortWorker {
    fn drop(&mut self) {
        self.stop.raise();
        // Don't join in drop to avoid blocking; the receiver drops next,
        // which releases a worker stuck on `send`.
    }
}

impl std::fmt::Debug for SortWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortWorker")
            .field("algorithm", &self.algorithm)
            .field("joined", &self.thread.is_none())
            .finish_non_exhaustive()
    }
}

fn work(
    mut run: SortRun<ArrayModel>,
    sender: SyncSender<Result<StepEvent>>,
    stop: StopFlag,
    step_delay: Duration,
) -> WorkerOutcome {
    let mut cancelled = false;
    loop {
        if stop.is_raised() {
            cancelled = true;
            break;
        }
        let Some(item) = run.next_event() else {
            break;
        };
        let last = !matches!(item, Ok(ref event) if !event.is_terminal());
        if sender.send(item).is_err() {
            // Receiver gone: nobody is listening any more.
            cancelled = !last;
            break;
        }
        if last {
            break;
        }
        if !step_delay.is_zero() && stop.sleep(step_delay) {
            cancelled = true;
            break;
        }
    }

    crate::debug!(
        algorithm = run.algorithm().name(),
        state = ?run.state(),
        steps = run.stats().steps(),
        cancelled,
        "sort worker exiting"
    );
    WorkerOutcome {
        algorithm: run.algorithm(),
        state: run.state(),
        stats: run.stats(),
        cancelled,
        array: run.into_array(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::Stepper;
    use crate::engine::SortEngine;
    use pretty_assertions::assert_eq;
    use std::sync::mpsc::Sender;
    use std::time::Instant;

    fn owned_run(algorithm: Algorithm, values: Vec<i32>) -> SortRun<ArrayModel> {
        SortEngine::new().run_algorithm(algorithm, ArrayModel::from_values(values))
    }

    fn descending(n: i32) -> Vec<i32> {
        (0..n).rev().collect()
    }

    // ---- Stop flag ----

    #[test]
    fn raising_a_clone_stops_the_original() {
        let flag = StopFlag::default();
        let worker_side = flag.clone();
        assert!(!worker_side.is_raised());
        flag.raise();
        assert!(worker_side.is_raised());
    }

    #[test]
    fn sleep_runs_out_when_never_raised() {
        let flag = StopFlag::default();
        let start = Instant::now();
        assert!(!flag.sleep(Duration::from_millis(10)));
        assert!(start.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn sleep_returns_at_once_when_already_raised() {
        let flag = StopFlag::default();
        flag.raise();
        let start = Instant::now();
        assert!(flag.sleep(Duration::from_secs(30)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn raise_wakes_a_sleeper() {
        let flag = StopFlag::default();
        let sleeper = flag.clone();
        let handle = thread::spawn(move || sleeper.sleep(Duration::from_secs(30)));
        thread::sleep(Duration::from_millis(20));
        flag.raise();
        assert!(handle.join().unwrap());
    }

    // ---- Streaming ----

    #[test]
    fn zero_capacity_is_rejected() {
        let err = SortWorker::spawn(owned_run(Algorithm::Bubble, vec![1]), 0, Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, SortError::InvalidConfig { .. }));
    }

    #[test]
    fn events_arrive_in_algorithm_order() {
        let values = vec![9, 4, 7, 1, 3, 3, 8];
        let expected: Vec<StepEvent> = owned_run(Algorithm::Selection, values.clone())
            .collect::<Result<_>>()
            .unwrap();

        let worker =
            SortWorker::spawn(owned_run(Algorithm::Selection, values), 1, Duration::ZERO).unwrap();
        let mut received = Vec::new();
        while let Some(event) = worker.recv() {
            received.push(event.unwrap());
        }
        assert_eq!(received, expected);

        let outcome = worker.join().unwrap();
        assert_eq!(outcome.state, RunState::Completed);
        assert!(!outcome.cancelled);
        assert_eq!(outcome.array.values(), &[1, 3, 3, 4, 7, 8, 9]);
    }

    #[test]
    fn iterator_drains_to_done() {
        let worker = SortWorker::spawn(
            owned_run(Algorithm::Insertion, vec![3, 1, 2]),
            4,
            Duration::ZERO,
        )
        .unwrap();
        let events: Vec<_> = worker.map(|e| e.unwrap()).collect();
        assert_eq!(events.last(), Some(&StepEvent::Done));
    }

    #[test]
    fn try_recv_reports_disconnect_after_done() {
        let worker =
            SortWorker::spawn(owned_run(Algorithm::Bubble, vec![1]), 1, Duration::ZERO).unwrap();
        assert_eq!(worker.recv(), Some(Ok(StepEvent::Done)));
        // Give the worker time to exit and drop its sender.
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match worker.try_recv() {
                Err(()) => break,
                Ok(None) if Instant::now() < deadline => thread::sleep(Duration::from_millis(1)),
                other => panic!("unexpected receive result: {other:?}"),
            }
        }
    }

    // ---- Backpressure ----

    #[test]
    fn worker_does_not_run_ahead_of_full_channel() {
        let worker =
            SortWorker::spawn(owned_run(Algorithm::Bubble, descending(50)), 1, Duration::ZERO)
                .unwrap();
        thread::sleep(Duration::from_millis(50));
        let outcome = worker.cancel().unwrap();
        // One event buffered plus one blocked in `send`.
        assert!(outcome.stats.steps() <= 2, "ran ahead: {:?}", outcome.stats);
        assert!(outcome.cancelled);
    }

    // ---- Cancellation ----

    #[test]
    fn cancel_leaves_consistent_prefix() {
        let values = descending(30);
        let worker = SortWorker::spawn(
            owned_run(Algorithm::Bubble, values.clone()),
            2,
            Duration::ZERO,
        )
        .unwrap();
        for _ in 0..25 {
            worker.recv().unwrap().unwrap();
        }
        let outcome = worker.cancel().unwrap();
        assert!(outcome.cancelled);
        assert_eq!(outcome.state, RunState::Running);

        let performed = outcome.stats.steps();
        assert!(performed >= 25);
        let mut replay = owned_run(Algorithm::Bubble, values);
        for _ in 0..performed {
            replay.next().unwrap().unwrap();
        }
        assert_eq!(&outcome.array, replay.array());
    }

    #[test]
    fn cancel_interrupts_step_delay() {
        let worker = SortWorker::spawn(
            owned_run(Algorithm::Bubble, descending(10)),
            1,
            Duration::from_secs(30),
        )
        .unwrap();
        worker.recv().unwrap().unwrap();
        let start = Instant::now();
        let outcome = worker.cancel().unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(outcome.stats.steps(), 1);
    }

    /// Delegating stepper that reports when the worker drops its run.
    struct ExitReporter {
        inner: Box<dyn Stepper + Send>,
        exited: Sender<()>,
    }

    impl Stepper for ExitReporter {
        fn step(&mut self, array: &mut ArrayModel) -> Result<StepEvent> {
            self.inner.step(array)
        }
    }

    impl Drop for ExitReporter {
        fn drop(&mut self) {
            let _ = self.exited.send(());
        }
    }

    #[test]
    fn dropping_handle_stops_the_worker() {
        let (exited_tx, exited_rx) = mpsc::channel();
        let run = owned_run(Algorithm::Bubble, descending(40)).with_stepper(Box::new(
            ExitReporter {
                inner: Algorithm::Bubble.stepper(),
                exited: exited_tx,
            },
        ));
        let worker = SortWorker::spawn(run, 1, Duration::ZERO).unwrap();
        worker.recv().unwrap().unwrap();
        let start = Instant::now();
        drop(worker);
        assert!(start.elapsed() < Duration::from_secs(5));
        // The run is dropped only when the worker thread exits.
        assert_eq!(exited_rx.recv_timeout(Duration::from_secs(5)), Ok(()));
    }

    #[test]
    fn dropping_handle_interrupts_step_delay() {
        let (exited_tx, exited_rx) = mpsc::channel();
        let run = owned_run(Algorithm::Selection, descending(20)).with_stepper(Box::new(
            ExitReporter {
                inner: Algorithm::Selection.stepper(),
                exited: exited_tx,
            },
        ));
        let worker = SortWorker::spawn(run, 4, Duration::from_secs(30)).unwrap();
        worker.recv().unwrap().unwrap();
        drop(worker);
        assert_eq!(exited_rx.recv_timeout(Duration::from_secs(5)), Ok(()));
    }

    // ---- Failures ----

    struct Panicking;

    impl Stepper for Panicking {
        fn step(&mut self, _array: &mut ArrayModel) -> Result<StepEvent> {
            panic!("stepper exploded");
        }
    }

    #[test]
    fn fault_is_sent_then_worker_exits_cleanly() {
        let run = owned_run(Algorithm::Bubble, vec![2, 1])
            .with_stepper(Box::new(crate::engine::OutOfBounds));
        let worker = SortWorker::spawn(run, 1, Duration::ZERO).unwrap();
        assert!(matches!(
            worker.recv(),
            Some(Err(SortError::IndexOutOfRange { .. }))
        ));
        let outcome = worker.join().unwrap();
        assert_eq!(outcome.state, RunState::Faulted);
        assert!(!outcome.cancelled);
    }

    #[test]
    fn panicking_worker_surfaces_on_join() {
        let run = owned_run(Algorithm::Bubble, vec![2, 1]).with_stepper(Box::new(Panicking));
        let worker = SortWorker::spawn(run, 1, Duration::ZERO).unwrap();
        assert_eq!(worker.recv(), None);
        assert_eq!(worker.join(), Err(SortError::WorkerPanicked));
    }

    #[test]
    fn debug_mentions_algorithm() {
        let worker =
            SortWorker::spawn(owned_run(Algorithm::Selection, vec![1]), 1, Duration::ZERO).unwrap();
        assert!(format!("{worker:?}").contains("Selection"));
        worker.join().unwrap();
    }
}
