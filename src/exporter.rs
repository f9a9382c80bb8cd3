use std::time::Duration;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use rand::Rng;
use reqwest::{Client, StatusCode};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::config::{Config, ExportConfig};
use crate::error::Result;
use crate::mindergas::MeterReading;
use crate::mindergas::client::MindergasClient;
use crate::p1::ExternalReading;
use crate::p1::client::P1Client;

/// Day of month of the last successful export. Only the day number is
/// kept, so the same day number in the next month counts as exported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportState {
    last_export_day: Option<u32>,
}

impl ExportState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_export_day(&self) -> Option<u32> {
        self.last_export_day
    }

    fn exported_on(&self, day: u32) -> bool {
        self.last_export_day == Some(day)
    }

    fn mark_exported(&mut self, day: u32) {
        self.last_export_day = Some(day);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not the export minute.
    Idle,
    /// Export minute, but today's reading was already sent.
    AlreadyExported,
    /// The P1 meter could not be queried.
    FetchFailed,
    /// At least one reading reached mindergas.nl.
    Exported { uploaded: usize },
    /// Data was fetched but no gas reading was uploaded.
    NothingExported,
}

pub struct Exporter {
    p1: P1Client,
    mindergas: MindergasClient,
    schedule: ExportConfig,
}

impl Exporter {
    pub fn new(config: &Config, http: Client) -> Self {
        Self {
            p1: P1Client::new(http.clone(), &config.p1.ip),
            mindergas: MindergasClient::new(http, &config.mindergas.url, &config.mindergas.token),
            schedule: config.export.clone(),
        }
    }

    pub fn p1(&self) -> &P1Client {
        &self.p1
    }

    /// Poll the wall clock forever, exporting once per day in the window.
    pub async fn run(&self) {
        let mut state = ExportState::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(self.schedule.poll_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            if let TickOutcome::Exported { uploaded } =
                self.tick(&mut state, Local::now().naive_local()).await
            {
                info!("Exported {} gas meter reading(s), next export tomorrow", uploaded);
            }
        }
    }

    fn is_export_minute(&self, now: NaiveDateTime) -> bool {
        now.hour() == self.schedule.hour && now.minute() == self.schedule.minute
    }

    pub async fn tick(&self, state: &mut ExportState, now: NaiveDateTime) -> TickOutcome {
        let now_str = now.format("%Y-%m-%d %H:%M:%S");
        debug!("Checking for export window, current time: {}", now_str);

        if !self.is_export_minute(now) {
            return TickOutcome::Idle;
        }
        if state.exported_on(now.day()) {
            debug!("Already exported today (day {})", now.day());
            return TickOutcome::AlreadyExported;
        }

        info!("In export window, current time: {}", now_str);
        info!("Retrieving data from P1 meter");
        let data = match self.p1.data().await {
            Ok(data) => data,
            Err(e) => {
                error!("Could not retrieve data from the P1 meter: {}", e);
                return TickOutcome::FetchFailed;
            }
        };

        let mut uploaded = 0;
        for reading in data.gas_readings() {
            match self.export_reading(reading).await {
                Ok(status) => {
                    info!("The mindergas.nl API responded with status {}", status);
                    uploaded += 1;
                }
                Err(e) => error!("Skipping gas meter reading {}: {}", reading.unique_id, e),
            }
        }

        if uploaded == 0 {
            return TickOutcome::NothingExported;
        }

        state.mark_exported(now.day());
        debug!("Marked day {} as exported", now.day());
        TickOutcome::Exported { uploaded }
    }

    async fn export_reading(&self, reading: &ExternalReading) -> Result<StatusCode> {
        let reading_time = reading.reading_time()?;
        info!(
            "Found gas meter reading: value={} unit={} reading_time={}",
            reading.value,
            reading.unit,
            reading_time.format("%Y-%m-%d %H:%M:%S")
        );

        let delay = self.jitter();
        info!(
            "Sleeping {} minutes to reduce load on the mindergas.nl API",
            delay.as_secs() / 60
        );
        tokio::time::sleep(delay).await;

        self.mindergas
            .upload(&MeterReading::new(reading_time, reading.value))
            .await
    }

    fn jitter(&self) -> Duration {
        let minutes = rand::thread_rng()
            .gen_range(self.schedule.jitter_min_minutes..=self.schedule.jitter_max_minutes);
        Duration::from_secs(minutes * 60)
    }
}
