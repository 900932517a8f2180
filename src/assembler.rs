// File: ./src/assembler.rs
//! Runs the whole conversion: discovery, then one pass per month, then the
//! calendar file.
//!
//! A month that fails (network, empty export, bad CSV) is logged and
//! skipped. Only an empty discovery or a failed write ends the run.
use crate::cache::DiscoveryCache;
use crate::client::discovery::{self, MonthSource};
use crate::client::http::Fetcher;
use crate::config::Config;
use crate::grid::{self, Grid, WalkContext};
use crate::markup;
use crate::model::{CalendarDate, Cancellations, ScheduleCalendar, WholeCancellations};
use crate::parser::Vocabulary;
use crate::storage::LocalStorage;
use crate::timing::Timer;
use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::Path;

/// Outcome of a run, for the final log line and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub sources: usize,
    pub processed: usize,
    pub events: usize,
}

pub struct CalendarAssembler<F: Fetcher> {
    fetcher: F,
    config: Config,
    vocab: Vocabulary,
    manual: BTreeSet<CalendarDate>,
    cache: DiscoveryCache,
    calendar: ScheduleCalendar,
    now: DateTime<Utc>,
}

impl<F: Fetcher> CalendarAssembler<F> {
    /// `manual` holds the dates from the cancellation file, `now` stamps
    /// every event and decides cache freshness.
    pub fn new(
        fetcher: F,
        config: Config,
        manual: BTreeSet<CalendarDate>,
        cache: DiscoveryCache,
        now: DateTime<Utc>,
    ) -> Self {
        let vocab = config.vocabulary();
        let calendar = ScheduleCalendar::new(config.calendar_meta(), now);
        Self {
            fetcher,
            config,
            vocab,
            manual,
            cache,
            calendar,
            now,
        }
    }

    pub fn calendar(&self) -> &ScheduleCalendar {
        &self.calendar
    }

    pub fn cache(&self) -> &DiscoveryCache {
        &self.cache
    }

    /// Month sources, from the cache while fresh, otherwise from the page.
    pub async fn sources(&mut self) -> Result<Vec<MonthSource>> {
        let url = self.config.planning_url.clone();
        if let Some(cached) = self.cache.get(&url, self.now)
            && !cached.is_empty()
        {
            log::info!("Using {} cached month sources", cached.len());
            return Ok(cached.to_vec());
        }

        let _timer = Timer::start("Month discovery");
        let sources = discovery::discover(&self.fetcher, &url)
            .await?
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("No month found on {}", url))?;

        self.cache.store(&url, sources.clone(), self.now);
        if let Err(e) = self.cache.save() {
            log::warn!("Could not save discovery cache: {}", e);
        }
        Ok(sources)
    }

    /// Tries each markup variant; the first one yielding cancellations wins.
    pub async fn detect_cancellations(&self, source: &MonthSource) -> Cancellations {
        let year = self.config.academic_year();
        for (i, url) in source.markup_variants().iter().enumerate() {
            log::debug!("Trying markup variant {}: {}", i + 1, url);
            let markup = match self.fetcher.get_text(url).await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Markup variant {} failed: {}", i + 1, e);
                    continue;
                }
            };
            match markup::scan(&markup, year) {
                Some(found) if !found.is_empty() => return found,
                Some(_) => log::debug!("Variant {} has styles but nothing struck", i + 1),
                None => log::debug!("Variant {} lacks style information", i + 1),
            }
        }
        log::info!("No strikethrough found for {}", source.month);
        Cancellations::default()
    }

    pub async fn fetch_grid(&self, csv_url: &str) -> Result<Grid> {
        let payload = self.fetcher.get_text(csv_url).await?;
        let grid = grid::parse_csv(&payload)?;
        if grid.len() < 2 {
            bail!("CSV export is empty or malformed");
        }
        Ok(grid)
    }

    /// One month: cancellations, grid, events. Returns how many events
    /// made it into the calendar.
    pub async fn process_month(&mut self, source: &MonthSource) -> Result<usize> {
        log::info!("Processing {}", source.month);

        let detected = self.detect_cancellations(source).await;
        let grid = self.fetch_grid(&source.csv_url).await?;

        let whole = WholeCancellations::new(self.manual.clone(), detected.whole);
        if !whole.is_empty() {
            log::info!("{}: {} whole days cancelled", source.month, whole.len());
        }
        let ctx = WalkContext {
            year: self.config.academic_year(),
            whole: &whole,
            partial: &detected.partial,
            vocab: &self.vocab,
        };
        let events = grid::walk(&grid, &ctx);

        let added = events.iter().filter(|e| self.calendar.push(e)).count();
        log::info!("{}: {} events", source.month, added);
        Ok(added)
    }

    /// Fills the calendar from every discovered month.
    pub async fn run(&mut self) -> Result<RunSummary> {
        let _timer = Timer::start("Schedule processing");
        let sources = self.sources().await?;

        let mut summary = RunSummary {
            sources: sources.len(),
            ..RunSummary::default()
        };
        for source in &sources {
            let _timer = Timer::start(format!("Month {}", source.month));
            match self.process_month(source).await {
                Ok(n) => {
                    summary.processed += 1;
                    summary.events += n;
                }
                Err(e) => log::warn!("Skipping {}: {:#}", source.month, e),
            }
        }
        Ok(summary)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let _timer = Timer::start("Calendar write");
        LocalStorage::write_output(path, &self.calendar.to_ics())?;
        log::info!(
            "Wrote {} events to {}",
            self.calendar.len(),
            path.display()
        );
        Ok(())
    }
}
