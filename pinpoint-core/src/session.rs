//! Async driver for the selection state machine.
//!
//! Every `select` spawns exactly one fetch on the Tokio runtime. Results come
//! back over a channel and are applied one at a time through `&mut self`, so a
//! stale result can never race a newer selection.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::{
    Coordinate, FetchOutcome, WeatherError, WeatherProvider,
    selection::{Selection, Transition},
};

/// A finished request, tagged with the coordinate it was issued for.
#[derive(Debug)]
struct Completion {
    coordinate: Coordinate,
    result: Result<FetchOutcome, WeatherError>,
}

pub struct Session {
    provider: Arc<dyn WeatherProvider>,
    state: watch::Sender<Selection>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl Session {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        let (state, _) = watch::channel(Selection::Idle);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        Self {
            provider,
            state,
            completions_tx,
            completions_rx,
            in_flight: 0,
        }
    }

    /// Current selection.
    pub fn selection(&self) -> Selection {
        *self.state.borrow()
    }

    /// Receiver that observes every selection change.
    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.state.subscribe()
    }

    /// Requests issued but not yet applied or discarded.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Handle a map tap. Must be called from within a Tokio runtime.
    pub fn select(&mut self, latitude: f64, longitude: f64) -> Coordinate {
        let coordinate = Coordinate::normalize(latitude, longitude);
        tracing::info!(%coordinate, "point selected");

        self.state.send_modify(|s| s.select(coordinate));
        self.spawn_fetch(coordinate);
        coordinate
    }

    pub fn dismiss(&mut self) {
        if self.selection() != Selection::Idle {
            tracing::info!("selection dismissed");
        }
        self.state.send_modify(Selection::dismiss);
    }

    /// Wait for the next request to finish and apply it.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Transition> {
        if self.in_flight == 0 {
            return None;
        }

        let completion = self.completions_rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(completion))
    }

    /// Apply completions until the current selection is no longer loading.
    pub async fn settle(&mut self) -> Selection {
        while self.selection().is_loading() {
            if self.next_completion().await.is_none() {
                break;
            }
        }
        self.selection()
    }

    fn spawn_fetch(&mut self, coordinate: Coordinate) {
        let provider = Arc::clone(&self.provider);
        let tx = self.completions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let result = provider.fetch(coordinate).await;
            // The receiver only goes away with the session itself.
            let _ = tx.send(Completion { coordinate, result });
        });
    }

    fn apply(&mut self, completion: Completion) -> Transition {
        let Completion { coordinate, result } = completion;

        let mut transition = Transition::Stale;
        self.state.send_if_modified(|s| {
            transition = s.complete(coordinate, &result);
            transition != Transition::Stale
        });

        match (&transition, &result) {
            (Transition::Stale, _) => {
                tracing::debug!(%coordinate, "discarding stale weather result");
            }
            (_, Err(err)) => {
                tracing::warn!(%coordinate, error = %err, "weather request failed");
            }
            (_, Ok(FetchOutcome::NotAvailable)) => {
                tracing::info!(%coordinate, "no weather available for point");
            }
            (_, Ok(FetchOutcome::Available(summary))) => {
                tracing::info!(%coordinate, ?summary, "weather resolved");
            }
        }

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeatherSummary;
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tokio::sync::oneshot;

    type Reply = Result<FetchOutcome, WeatherError>;

    /// Provider whose replies are released by the test, one coordinate at a time.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        gates: Mutex<HashMap<Coordinate, oneshot::Receiver<Reply>>>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn gate(&self, coordinate: Coordinate) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(coordinate, rx);
            tx
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for ScriptedProvider {
        async fn fetch(&self, coordinate: Coordinate) -> Result<FetchOutcome, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = self.gates.lock().unwrap().remove(&coordinate);
            match gate {
                Some(rx) => rx.await.unwrap_or(Ok(FetchOutcome::NotAvailable)),
                None => Ok(FetchOutcome::NotAvailable),
            }
        }
    }

    fn summary(temp: i32) -> WeatherSummary {
        WeatherSummary {
            temperature_celsius: temp,
            wind_speed_kmh: 10,
            precipitation_probability_percent: 20,
        }
    }

    fn setup() -> (Arc<ScriptedProvider>, Session) {
        let provider = Arc::new(ScriptedProvider::default());
        let session = Session::new(provider.clone());
        (provider, session)
    }

    #[tokio::test]
    async fn tap_is_normalized_before_request() {
        let (provider, mut session) = setup();
        let expected = Coordinate::normalize(45.68, -73.12);
        let gate = provider.gate(expected);

        let c = session.select(45.678, -73.123);
        assert_eq!(c.latitude(), 45.68);
        assert_eq!(c.longitude(), -73.12);
        assert_eq!(session.selection(), Selection::Pending(expected));

        gate.send(Ok(FetchOutcome::Available(summary(21)))).unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Resolved));
        assert_eq!(session.selection(), Selection::Resolved(expected, summary(21)));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn stale_result_arriving_last_is_discarded() {
        let (provider, mut session) = setup();
        let c1 = Coordinate::normalize(10.0, 10.0);
        let c2 = Coordinate::normalize(20.0, 20.0);
        let g1 = provider.gate(c1);
        let g2 = provider.gate(c2);

        session.select(10.0, 10.0);
        session.select(20.0, 20.0);
        assert_eq!(session.in_flight(), 2);

        g2.send(Ok(FetchOutcome::Available(summary(2)))).unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Resolved));

        g1.send(Ok(FetchOutcome::Available(summary(1)))).unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Stale));

        assert_eq!(session.selection(), Selection::Resolved(c2, summary(2)));
        assert_eq!(session.in_flight(), 0);
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn stale_result_arriving_first_is_discarded() {
        let (provider, mut session) = setup();
        let c1 = Coordinate::normalize(10.0, 10.0);
        let c2 = Coordinate::normalize(20.0, 20.0);
        let g1 = provider.gate(c1);
        let g2 = provider.gate(c2);

        session.select(10.0, 10.0);
        session.select(20.0, 20.0);

        g1.send(Ok(FetchOutcome::Available(summary(1)))).unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Stale));
        assert_eq!(session.selection(), Selection::Pending(c2));

        g2.send(Err(WeatherError::InvalidInput(
            crate::CoordinateError::LatitudeOutOfRange(99.0),
        )))
        .unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Failed));
        assert_eq!(session.selection(), Selection::Failed(c2));
    }

    #[tokio::test]
    async fn dismiss_while_pending_discards_the_result() {
        let (provider, mut session) = setup();
        let c = Coordinate::normalize(1.0, 1.0);
        let gate = provider.gate(c);

        session.select(1.0, 1.0);
        session.dismiss();
        assert_eq!(session.selection(), Selection::Idle);

        gate.send(Ok(FetchOutcome::Available(summary(5)))).unwrap();
        assert_eq!(session.next_completion().await, Some(Transition::Stale));
        assert_eq!(session.selection(), Selection::Idle);
    }

    #[tokio::test]
    async fn dismiss_after_result_clears_everything() {
        let (_provider, mut session) = setup();

        session.select(3.0, 4.0);
        let settled = session.settle().await;
        assert_eq!(settled, Selection::Failed(Coordinate::normalize(3.0, 4.0)));

        session.dismiss();
        assert_eq!(session.selection(), Selection::Idle);
        assert_eq!(session.selection().coordinate(), None);
    }

    #[tokio::test]
    async fn next_completion_without_requests_returns_none() {
        let (_provider, mut session) = setup();
        assert_eq!(session.next_completion().await, None);
        assert_eq!(session.settle().await, Selection::Idle);
    }

    #[tokio::test]
    async fn settle_skips_stale_results() {
        let (provider, mut session) = setup();
        let c1 = Coordinate::normalize(1.0, 1.0);
        let c2 = Coordinate::normalize(2.0, 2.0);
        let g1 = provider.gate(c1);
        let g2 = provider.gate(c2);

        session.select(1.0, 1.0);
        session.select(2.0, 2.0);
        g1.send(Ok(FetchOutcome::Available(summary(1)))).unwrap();
        g2.send(Ok(FetchOutcome::Available(summary(2)))).unwrap();

        assert_eq!(session.settle().await, Selection::Resolved(c2, summary(2)));
    }

    #[tokio::test]
    async fn subscribers_see_transitions_but_not_stale_results() {
        let (provider, mut session) = setup();
        let c1 = Coordinate::normalize(1.0, 1.0);
        let c2 = Coordinate::normalize(2.0, 2.0);
        let g1 = provider.gate(c1);
        let g2 = provider.gate(c2);
        let mut rx = session.subscribe();

        session.select(1.0, 1.0);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Selection::Pending(c1));

        session.select(2.0, 2.0);
        assert_eq!(*rx.borrow_and_update(), Selection::Pending(c2));

        g1.send(Ok(FetchOutcome::Available(summary(1)))).unwrap();
        session.next_completion().await;
        assert!(!rx.has_changed().unwrap());

        g2.send(Ok(FetchOutcome::NotAvailable)).unwrap();
        session.next_completion().await;
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Selection::Failed(c2));
    }

    #[tokio::test]
    async fn each_selection_issues_exactly_one_request() {
        let (provider, mut session) = setup();

        for i in 0..5 {
            session.select(f64::from(i), 0.0);
        }
        while session.next_completion().await.is_some() {}

        assert_eq!(provider.calls(), 5);
        assert_eq!(
            session.selection(),
            Selection::Failed(Coordinate::normalize(4.0, 0.0))
        );
    }
}
