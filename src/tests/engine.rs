use hifitime::Unit;

use crate::{
    prelude::{
        Config, Date, Engine, Epoch, Event, GeoPoint, HeadingSample, LocationFailure,
        LocationState, Prayer, Rounding, SolarEvent, SolarRoutine,
    },
    time::local_utc_offset,
    tests::init_logger,
};

/// Deterministic [SolarRoutine]: fixed UTC hours on every day
struct FixedSun;

impl SolarRoutine for FixedSun {
    fn solve(&self, _: &GeoPoint, date: Date, event: SolarEvent) -> Option<Epoch> {
        let hours = match event {
            SolarEvent::Morning { depression_deg } if depression_deg > 1.0 => 4.0,
            SolarEvent::Morning { .. } => 6.0,
            SolarEvent::Transit => 12.0,
            SolarEvent::AsrShadow { .. } => 15.0,
            SolarEvent::Evening { depression_deg } if depression_deg > 1.0 => 20.0,
            SolarEvent::Evening { .. } => 18.0,
        };
        Some(date.midnight_utc() + hours * Unit::Hour)
    }
}

fn engine() -> Engine<FixedSun> {
    // Kuwait method: no adjustments
    let cfg = Config::default()
        .with_method("kuwait".parse().unwrap())
        .with_rounding(Rounding::None)
        .with_utc_offset_minutes(0);
    Engine::with_solar_routine(cfg, FixedSun)
}

fn at(day: u8, hour: u8, minute: u8, second: u8) -> Epoch {
    Epoch::from_gregorian_utc(2024, 3, day, hour, minute, second, 0)
}

#[test]
fn synthetic_day() {
    init_logger();
    let mut engine = engine();
    let point = GeoPoint::new(29.3759, 47.9774).unwrap();

    engine.handle(at(20, 3, 0, 0), Event::Location(Ok(point)));

    let schedule = engine.prayer_schedule().unwrap();
    assert!(schedule.is_complete());
    assert_eq!(
        schedule.entry(Prayer::Maghrib).instant().unwrap(),
        at(20, 18, 0, 0)
    );

    let expectations = [
        (at(20, 3, 0, 0), Prayer::Fajr, "1h 0m 0s"),
        (at(20, 4, 0, 1), Prayer::Sunrise, "1h 59m 59s"),
        (at(20, 13, 30, 0), Prayer::Asr, "1h 30m 0s"),
        (at(20, 19, 59, 59), Prayer::Isha, "0h 0m 1s"),
    ];

    for (now, prayer, countdown) in expectations {
        engine.handle(now, Event::Tick);
        let state = engine.next_event_state();
        assert_eq!(state.candidate.unwrap().prayer, prayer, "at {}", now);
        assert_eq!(state.countdown().to_string(), countdown, "at {}", now);
    }
}

#[test]
fn following_day() {
    init_logger();
    let mut engine = engine();
    let point = GeoPoint::new(29.3759, 47.9774).unwrap();
    engine.handle(at(20, 21, 0, 0), Event::Location(Ok(point)));

    let state = *engine.next_event_state();
    let candidate = state.candidate.unwrap();
    assert_eq!(candidate.prayer, Prayer::Fajr);
    assert!(candidate.next_day);
    assert_eq!(candidate.instant, at(21, 4, 0, 0));
    assert_eq!(state.countdown().to_string(), "7h 0m 0s");

    // the day rolls over
    engine.handle(at(21, 0, 0, 0), Event::Tick);
    assert_eq!(
        engine.prayer_schedule().unwrap().date(),
        Date::new(2024, 3, 21).unwrap()
    );
    let candidate = engine.next_event_state().candidate.unwrap();
    assert_eq!(candidate.instant, at(21, 4, 0, 0));
    assert!(!candidate.next_day);
}

#[test]
fn local_day_follows_utc_offset() {
    let cfg = Config::default()
        .with_method("kuwait".parse().unwrap())
        .with_rounding(Rounding::None)
        .with_utc_offset_minutes(180);
    let mut engine = Engine::with_solar_routine(cfg, FixedSun);
    let point = GeoPoint::new(29.3759, 47.9774).unwrap();

    // 22:00 UTC is already the 21st on the local wall clock
    engine.handle(at(20, 22, 0, 0), Event::Location(Ok(point)));
    assert_eq!(
        engine.prayer_schedule().unwrap().date(),
        Date::new(2024, 3, 21).unwrap()
    );
}

#[test]
fn west_coast_evening() {
    init_logger();
    // 18:00 PDT on the 20th
    let cfg = Config::default().with_utc_offset_minutes(-420);
    let mut engine = Engine::new(cfg);
    let los_angeles = GeoPoint::new(34.05, -118.24).unwrap();
    let now = at(21, 1, 0, 0);

    engine.handle(now, Event::Location(Ok(los_angeles)));

    assert_eq!(
        engine.prayer_schedule().unwrap().date(),
        Date::new(2024, 3, 20).unwrap()
    );

    let state = engine.next_event_state();
    let next = state.candidate.unwrap();
    assert_eq!(next.prayer, Prayer::Maghrib);
    assert!(!next.next_day);
    assert!(next.instant > now);
    assert!(state.remaining.to_seconds() < 2.0 * 3600.0);
}

#[test]
fn system_time_zone_by_default() {
    init_logger();
    let mut engine = Engine::new(Config::default());
    let point = GeoPoint::new(34.05, -118.24).unwrap();
    let now = at(21, 1, 0, 0);

    engine.handle(now, Event::Location(Ok(point)));

    assert_eq!(
        engine.prayer_schedule().unwrap().date(),
        Date::from_epoch(now, local_utc_offset(now))
    );
}

#[test]
fn synthetic_event_sequence() {
    init_logger();
    let mut engine = engine();
    let point = GeoPoint::new(51.5074, -0.1278).unwrap();
    let now = at(20, 10, 0, 0);

    let events = [
        Event::Tick,
        Event::Heading(HeadingSample::new(12.0).unwrap()),
        Event::Location(Err(LocationFailure::PositionUnavailable)),
        Event::Tick,
    ];
    for event in events {
        engine.handle(now, event);
    }

    assert_eq!(
        *engine.location(),
        LocationState::Unavailable(LocationFailure::PositionUnavailable)
    );
    assert!(engine.prayer_schedule().is_none());
    assert!(engine.compass_rotation().is_none());
    assert_eq!(engine.compass().heading().unwrap().degrees(), 12.0);

    engine.set_manual_location(51.5074, -0.1278, now).unwrap();
    assert_eq!(*engine.location(), LocationState::Acquired(point));

    let qibla = *engine.qibla().unwrap();
    assert_eq!(engine.compass_rotation(), Some(12.0 - qibla.bearing_deg));
    assert_eq!(
        engine.next_event_state().candidate.unwrap().prayer,
        Prayer::Dhuhr
    );

    engine.handle(now, Event::Teardown);
    let snapshot = engine.snapshot();
    assert!(snapshot.stopped);
    assert_eq!(snapshot.rotation_deg, Some(-qibla.bearing_deg));
}
