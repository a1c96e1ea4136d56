use rand::{prelude::*, rngs::SmallRng, SeedableRng};

use crate::{
    prelude::{bearing, normalize_degrees, HeadingSample, QiblaCompass, KAABA},
    tests::{init_logger, CITIES},
};

#[test]
fn no_heading_ever() {
    init_logger();
    for city in CITIES.iter() {
        let mut compass = QiblaCompass::new();
        let result = compass.update_location(&city.point());

        assert_eq!(result.bearing_deg, bearing(&city.point(), &KAABA));
        assert_eq!(compass.rotation_deg(), Some(-result.bearing_deg));
        assert_eq!(compass.needle_deg(), Some(normalize_degrees(result.bearing_deg)));
    }
}

#[test]
fn location_change_recomputes_bearing() {
    let mut compass = QiblaCompass::new();
    compass.update_heading(HeadingSample::new(45.0).unwrap());

    let london = compass.update_location(&CITIES[0].point());
    let tokyo = compass.update_location(&CITIES[3].point());
    assert_ne!(london, tokyo);

    assert_eq!(compass.bearing(), Some(&tokyo));
    assert_eq!(compass.rotation_deg(), Some(45.0 - tokyo.bearing_deg));
}

#[test]
fn fuzz_headings() {
    let mut rng = SmallRng::seed_from_u64(0x4b41_4241);
    let mut compass = QiblaCompass::new();
    let qibla = compass.update_location(&CITIES[2].point());

    for _ in 0..1_000 {
        let alpha = rng.random_range(0.0..360.0);
        let sample = HeadingSample::from_device_alpha(alpha).unwrap();
        compass.update_heading(sample);

        let heading = compass.heading().unwrap().degrees();
        assert!((0.0..360.0).contains(&heading));
        assert_eq!(compass.rotation_deg(), Some(heading - qibla.bearing_deg));

        let needle = compass.needle_deg().unwrap();
        assert!((0.0..360.0).contains(&needle));
    }
}
