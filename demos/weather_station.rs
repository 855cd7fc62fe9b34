//! # Example: weather_station
//!
//! A measurement source publishes readings; displays subscribe to them.
//!
//! Shows how to:
//! - Compose a [`Registry`] into a subject instead of inheriting from one.
//! - Implement [`Subscribe`] for stateful displays.
//! - Observe failures through the [`PublishReport`] and the diagnostics stream.
//!
//! ## Flow
//! ```text
//! WeatherData::set_measurements()
//!     └─► registry.publish("weather", &Reading)
//!           ├─► CurrentConditions.on_event()
//!           ├─► Statistics.on_event()
//!           ├─► Forecast.on_event()     (fails on a pressure drop)
//!           └─► LogWriter.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=notifyhub=debug cargo run --example weather_station
//! ```

use std::sync::{Arc, Mutex};

use notifyhub::{EventKind, HandlerError, LogWriter, PublishReport, Registry, Subscribe, Topic};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy)]
struct Reading {
    temperature: f32,
    humidity: f32,
    pressure: f32,
}

/// Subject: owns the registry and publishes on every state change.
struct WeatherData {
    registry: Registry<Reading>,
    topic: Topic,
}

impl WeatherData {
    fn new(registry: Registry<Reading>) -> Self {
        Self {
            registry,
            topic: Topic::from("weather"),
        }
    }

    fn set_measurements(&self, temperature: f32, humidity: f32, pressure: f32) -> PublishReport {
        let reading = Reading {
            temperature,
            humidity,
            pressure,
        };
        self.registry.publish(&self.topic, &reading)
    }
}

struct CurrentConditions;

impl Subscribe<Reading> for CurrentConditions {
    fn on_event(&self, r: &Reading) -> Result<(), HandlerError> {
        println!(
            "[current] {:.1}F degrees and {:.1}% humidity",
            r.temperature, r.humidity
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "current-conditions"
    }
}

#[derive(Default)]
struct Statistics {
    temps: Mutex<Vec<f32>>,
}

impl Subscribe<Reading> for Statistics {
    fn on_event(&self, r: &Reading) -> Result<(), HandlerError> {
        let mut temps = self
            .temps
            .lock()
            .map_err(|e| HandlerError::fail(e.to_string()))?;
        temps.push(r.temperature);
        let sum: f32 = temps.iter().sum();
        let max = temps.iter().copied().fold(f32::MIN, f32::max);
        let min = temps.iter().copied().fold(f32::MAX, f32::min);
        println!(
            "[stats] avg/max/min temperature = {:.1}/{:.1}/{:.1}",
            sum / temps.len() as f32,
            max,
            min
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "statistics"
    }
}

#[derive(Default)]
struct Forecast {
    last_pressure: Mutex<Option<f32>>,
}

impl Subscribe<Reading> for Forecast {
    fn on_event(&self, r: &Reading) -> Result<(), HandlerError> {
        let mut last = self
            .last_pressure
            .lock()
            .map_err(|e| HandlerError::fail(e.to_string()))?;
        let prev = last.replace(r.pressure);
        match prev {
            Some(p) if r.pressure < p - 1.0 => Err(HandlerError::fail(format!(
                "pressure dropped from {p:.1} to {:.1}; storm model unavailable",
                r.pressure
            ))),
            Some(p) if r.pressure > p => {
                println!("[forecast] improving weather on the way!");
                Ok(())
            }
            _ => {
                println!("[forecast] more of the same");
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        "forecast"
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let registry: Registry<Reading> = Registry::new();
    let mut diagnostics = registry.events();
    let station = WeatherData::new(registry.clone());

    registry.subscribe("weather", Arc::new(CurrentConditions));
    registry.subscribe("weather", Arc::new(Statistics::default()));
    registry.subscribe("weather", Arc::new(Forecast::default()));
    let logger = registry.subscribe_scoped(
        "weather",
        Arc::new(LogWriter::new().with_label("weather-log")),
    );

    for (t, h, p) in [(80.0, 65.0, 30.4), (82.0, 70.0, 29.2), (78.0, 90.0, 29.2)] {
        let report = station.set_measurements(t, h, p);
        if let Err(err) = report.into_result() {
            println!("[station] {err}: {}", err.as_message());
        }
    }

    // Tear down the logger; the remaining displays keep receiving.
    drop(logger);
    let reading = Reading {
        temperature: 75.0,
        humidity: 60.0,
        pressure: 30.0,
    };
    let report = registry.publish_async("weather", reading).await?;
    println!(
        "[station] async pass delivered to {} displays",
        report.delivered
    );

    let mut failures = 0;
    while let Ok(ev) = diagnostics.try_recv() {
        if matches!(ev.kind, EventKind::HandlerFailed | EventKind::HandlerPanicked) {
            failures += 1;
        }
    }
    println!("[station] diagnostics saw {failures} handler failure(s)");
    Ok(())
}
