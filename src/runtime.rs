//! Cooperative event loop driving the [Engine]
use std::future::Future;

use log::{debug, error, info, warn};

use tokio::{
    sync::{mpsc, watch},
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{
    compass::HeadingSample,
    engine::{Engine, Event, Snapshot},
    error::LocationFailure,
    prelude::{Clock, GeoPoint},
    solar::SolarRoutine,
};

/// Event sources consumed by [run].
pub struct Sources<L, C> {
    /// One shot location request. A future that never resolves
    /// leaves the [Engine] pending.
    pub location: L,
    /// Heading stream, None when the device has no orientation sensor.
    pub headings: Option<mpsc::Receiver<HeadingSample>>,
    /// Manually entered (latitude, longitude) pairs, in degrees.
    pub manual_locations: Option<mpsc::Receiver<(f64, f64)>>,
    /// Wall clock
    pub clock: C,
}

impl<L, C> Sources<L, C> {
    /// Location request and wall clock only
    pub fn new(location: L, clock: C) -> Self {
        Self {
            location,
            headings: None,
            manual_locations: None,
            clock,
        }
    }

    /// Returns [Sources] with this heading stream
    pub fn with_headings(mut self, headings: mpsc::Receiver<HeadingSample>) -> Self {
        self.headings = Some(headings);
        self
    }

    /// Returns [Sources] with this manual location stream
    pub fn with_manual_locations(mut self, manual: mpsc::Receiver<(f64, f64)>) -> Self {
        self.manual_locations = Some(manual);
        self
    }
}

async fn next_item<T>(rx: &mut Option<mpsc::Receiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

enum Incoming {
    Cancelled,
    Event(Event),
    HeadingsClosed,
    ManualClosed,
}

/// Runs the [Engine] until `cancel` is triggered: the timer, the location
/// request, the heading stream and manual entries are multiplexed on the
/// current task and each event is handled to completion before the next one.
/// A [Snapshot] is published after every handled event.
/// Location events that arrive while the clock is failing are kept and
/// delivered with the next event that gets a valid time.
/// Returns the torn down [Engine].
pub async fn run<S, L, C>(
    mut engine: Engine<S>,
    sources: Sources<L, C>,
    snapshots: watch::Sender<Snapshot>,
    cancel: CancellationToken,
) -> Engine<S>
where
    S: SolarRoutine,
    L: Future<Output = Result<GeoPoint, LocationFailure>>,
    C: Clock,
{
    let Sources {
        location,
        mut headings,
        mut manual_locations,
        clock,
    } = sources;

    tokio::pin!(location);
    let mut location_pending = true;

    // latest location event not delivered yet
    let mut deferred: Option<Event> = None;

    let mut ticker = tokio::time::interval(engine.config().tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let incoming = tokio::select! {
            biased;
            _ = cancel.cancelled() => Incoming::Cancelled,
            fix = &mut location, if location_pending => {
                location_pending = false;
                Incoming::Event(Event::Location(fix))
            },
            entry = next_item(&mut manual_locations) => match entry {
                Some((latitude_deg, longitude_deg)) => Incoming::Event(Event::ManualLocation {
                    latitude_deg,
                    longitude_deg,
                }),
                None => Incoming::ManualClosed,
            },
            sample = next_item(&mut headings) => match sample {
                Some(sample) => Incoming::Event(Event::Heading(sample)),
                None => Incoming::HeadingsClosed,
            },
            _ = ticker.tick() => Incoming::Event(Event::Tick),
        };

        match incoming {
            Incoming::Cancelled => {
                info!("event loop shutting down");
                engine.teardown();
                snapshots.send_replace(engine.snapshot());
                break;
            },
            Incoming::HeadingsClosed => {
                debug!("heading stream closed");
                headings = None;
            },
            Incoming::ManualClosed => {
                debug!("manual location stream closed");
                manual_locations = None;
            },
            Incoming::Event(event) => match clock.now() {
                Ok(now) => {
                    if let Some(pending) = deferred.take() {
                        engine.handle(now, pending);
                    }
                    engine.handle(now, event);
                    snapshots.send_replace(engine.snapshot());
                },
                Err(e) => match event {
                    Event::Location(_) | Event::ManualLocation { .. } => {
                        warn!("{:?} deferred: {}", event, e);
                        deferred = Some(event);
                    },
                    event => error!("{:?} dropped: {}", event, e),
                },
            },
        }
    }

    // releases the sensor subscription
    drop(headings);
    engine
}

#[cfg(test)]
mod test {
    use super::{run, Sources};
    use crate::{
        compass::{BearingResult, HeadingSample},
        engine::{Engine, LocationState, Snapshot},
        error::LocationFailure,
        prelude::{Clock, Config, Epoch, Error, GeoPoint, KAABA},
    };
    use tokio::{
        sync::{mpsc, watch},
        time::{sleep, Duration, Instant},
    };
    use tokio_util::sync::CancellationToken;

    use std::cell::Cell;

    /// Wall clock following the (paused) tokio clock
    struct PausedClock {
        base: Epoch,
        start: Instant,
    }

    impl PausedClock {
        fn new() -> Self {
            Self {
                base: Epoch::from_gregorian_utc(2024, 3, 20, 13, 0, 0, 0),
                start: Instant::now(),
            }
        }
    }

    impl Clock for PausedClock {
        fn now(&self) -> Result<Epoch, Error> {
            let elapsed = self.start.elapsed().as_secs_f64();
            Ok(self.base + hifitime::Duration::from_seconds(elapsed))
        }
    }

    /// Fails on its first reading only
    struct FlakyClock {
        calls: Cell<usize>,
        inner: PausedClock,
    }

    impl Clock for FlakyClock {
        fn now(&self) -> Result<Epoch, Error> {
            let calls = self.calls.get();
            self.calls.set(calls + 1);
            if calls == 0 {
                Err(Error::SystemClock)
            } else {
                self.inner.now()
            }
        }
    }

    struct BrokenClock;

    impl Clock for BrokenClock {
        fn now(&self) -> Result<Epoch, Error> {
            Err(Error::SystemClock)
        }
    }

    fn utc_engine() -> Engine {
        Engine::new(Config::default().with_utc_offset_minutes(0))
    }

    fn cancel_after(secs: u64) -> CancellationToken {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(secs)).await;
            token.cancel();
        });
        cancel
    }

    #[tokio::test(start_paused = true)]
    async fn located_with_heading() {
        let london = GeoPoint::new(51.5074, -0.1278).unwrap();
        let qibla = BearingResult::between(&london, &KAABA);

        let (tx, rx) = mpsc::channel(8);
        for degrees in [10.0, 250.0, 90.0] {
            tx.send(HeadingSample::new(degrees).unwrap()).await.unwrap();
        }

        let (snapshots, mut observer) = watch::channel(Snapshot::default());
        let cancel = CancellationToken::new();

        let token = cancel.clone();
        let expected = 90.0 - qibla.bearing_deg;
        let watcher = tokio::spawn(async move {
            let snapshot = observer
                .wait_for(|s| {
                    s.rotation_deg == Some(expected) && s.next_event.candidate.is_some()
                })
                .await
                .map(|s| s.clone());
            token.cancel();
            snapshot
        });

        let sources = Sources::new(async move { Ok(london) }, PausedClock::new()).with_headings(rx);

        let engine = run(utc_engine(), sources, snapshots, cancel).await;
        let snapshot = watcher.await.unwrap().unwrap();

        assert_eq!(snapshot.location, LocationState::Acquired(london));
        assert_eq!(snapshot.qibla, Some(qibla));
        assert!(snapshot.schedule.is_some());
        assert!(!snapshot.stopped);

        assert!(engine.is_stopped());
        // late samples are ignored
        assert!(tx.send(HeadingSample::new(0.0).unwrap()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn location_never_resolves() {
        let (snapshots, observer) = watch::channel(Snapshot::default());
        let sources = Sources::new(std::future::pending(), PausedClock::new());

        let engine = run(
            utc_engine(),
            sources,
            snapshots,
            cancel_after(5),
        )
        .await;

        assert_eq!(*engine.location(), LocationState::Pending);
        assert!(engine.prayer_schedule().is_none());
        assert!(engine.qibla().is_none());

        let last = observer.borrow().clone();
        assert!(last.stopped);
        assert_eq!(last.location, LocationState::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn location_denied() {
        let (snapshots, observer) = watch::channel(Snapshot::default());
        let (tx, rx) = mpsc::channel(1);
        drop(tx);

        let sources = Sources::new(
            async { Err(LocationFailure::PermissionDenied) },
            PausedClock::new(),
        )
        .with_headings(rx);

        let engine = run(
            utc_engine(),
            sources,
            snapshots,
            cancel_after(3),
        )
        .await;

        assert_eq!(
            engine.location_fix(),
            Err(Error::LocationUnavailable(LocationFailure::PermissionDenied))
        );
        assert!(engine.compass_rotation().is_none());
        assert_eq!(
            observer.borrow().location,
            LocationState::Unavailable(LocationFailure::PermissionDenied)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_follows_the_clock() {
        let london = GeoPoint::new(51.5074, -0.1278).unwrap();
        let (snapshots, mut observer) = watch::channel(Snapshot::default());
        let cancel = cancel_after(10);

        let sources = Sources::new(async move { Ok(london) }, PausedClock::new());

        let watcher = tokio::spawn(async move {
            let first = observer
                .wait_for(|s| s.next_event.candidate.is_some())
                .await
                .map(|s| s.next_event.remaining)
                .unwrap();
            observer.changed().await.unwrap();
            observer.changed().await.unwrap();
            let later = observer.borrow().next_event.remaining;
            (first, later)
        });

        let _ = run(utc_engine(), sources, snapshots, cancel).await;
        let (first, later) = watcher.await.unwrap();
        assert!(later < first);
    }

    #[tokio::test(start_paused = true)]
    async fn location_survives_clock_errors() {
        let (snapshots, observer) = watch::channel(Snapshot::default());
        let clock = FlakyClock {
            calls: Cell::new(0),
            inner: PausedClock::new(),
        };
        let sources = Sources::new(async { Ok(KAABA) }, clock);

        let engine = run(utc_engine(), sources, snapshots, cancel_after(5)).await;

        assert_eq!(*engine.location(), LocationState::Acquired(KAABA));
        assert_eq!(observer.borrow().location, LocationState::Acquired(KAABA));
        assert!(observer.borrow().qibla.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn broken_clock_delivers_nothing() {
        let (snapshots, observer) = watch::channel(Snapshot::default());
        let sources = Sources::new(async { Ok(KAABA) }, BrokenClock);

        let engine = run(utc_engine(), sources, snapshots, cancel_after(2)).await;

        assert_eq!(*engine.location(), LocationState::Pending);
        assert!(observer.borrow().stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_entry_after_denial() {
        let (snapshots, mut observer) = watch::channel(Snapshot::default());
        let (tx, rx) = mpsc::channel(4);
        let cancel = CancellationToken::new();

        let sources = Sources::new(
            async { Err(LocationFailure::PermissionDenied) },
            PausedClock::new(),
        )
        .with_manual_locations(rx);

        let token = cancel.clone();
        let user = tokio::spawn(async move {
            observer
                .wait_for(|s| {
                    s.location == LocationState::Unavailable(LocationFailure::PermissionDenied)
                })
                .await
                .unwrap();

            // out of range: rejected, still unavailable
            tx.send((48.8566, 190.0)).await.unwrap();
            sleep(Duration::from_secs(2)).await;
            let rejected = observer.borrow().location;

            tx.send((48.8566, 2.3522)).await.unwrap();
            let accepted = observer
                .wait_for(|s| matches!(s.location, LocationState::Acquired(_)))
                .await
                .map(|s| s.clone())
                .unwrap();
            token.cancel();
            (rejected, accepted)
        });

        let engine = run(utc_engine(), sources, snapshots, cancel).await;
        let (rejected, accepted) = user.await.unwrap();

        assert_eq!(
            rejected,
            LocationState::Unavailable(LocationFailure::PermissionDenied)
        );
        let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
        assert_eq!(accepted.location, LocationState::Acquired(paris));
        assert!(accepted.schedule.is_some());
        assert!(accepted.next_event.candidate.is_some());
        assert_eq!(engine.location_fix(), Ok(paris));
    }
}
