mod compass;
mod engine;


use log::LevelFilter;
use std::sync::Once;

use crate::prelude::GeoPoint;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Reference location, with expected qibla bearing and distance
pub struct City {
    pub name: &'static str,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub qibla_deg: f64,
    pub qibla_km: f64,
}

impl City {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude_deg, self.longitude_deg)
            .unwrap_or_else(|e| panic!("{}: {}", self.name, e))
    }
}

pub const CITIES: [City; 6] = [
    City {
        name: "London",
        latitude_deg: 51.5074,
        longitude_deg: -0.1278,
        qibla_deg: 118.99,
        qibla_km: 4793.8,
    },
    City {
        name: "New York",
        latitude_deg: 40.7128,
        longitude_deg: -74.0060,
        qibla_deg: 58.48,
        qibla_km: 10306.3,
    },
    City {
        name: "Jakarta",
        latitude_deg: -6.2088,
        longitude_deg: 106.8456,
        qibla_deg: 295.15,
        qibla_km: 7920.1,
    },
    City {
        name: "Tokyo",
        latitude_deg: 35.6762,
        longitude_deg: 139.6503,
        qibla_deg: 293.00,
        qibla_km: 9471.8,
    },
    City {
        name: "Cape Town",
        latitude_deg: -33.9249,
        longitude_deg: 18.4241,
        qibla_deg: 23.35,
        qibla_km: 6558.3,
    },
    City {
        name: "Helsinki",
        latitude_deg: 60.1699,
        longitude_deg: 24.9384,
        qibla_deg: 158.23,
        qibla_km: 4464.4,
    },
];
