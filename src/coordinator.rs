//! Refresh cycle and single owner of the display state.
//!
//! The coordinator runs as an actor: commands arrive on an mpsc channel,
//! rendered snapshots leave on another. Meal and timetable are fetched
//! concurrently in a spawned task and joined before anything is applied, so
//! the presenter never sees half an update. A trigger that arrives while a
//! fetch pair is in flight is dropped, not queued.
use crate::client::{FetchError, ScheduleSource};
use crate::config::Config;
use crate::context::SharedContext;
use crate::dates::{local_today, request_date};
use crate::model::{
    DisplayPart, DisplayState, MealMenu, School, TimetablePeriod, normalize_timetable,
};
use crate::present::{RenderDirective, render};
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant, sleep_until};

const DEFAULT_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SelectPart(DisplayPart),
    SetSchool(String),
    SetClassGrade { grade: u32, class_number: u32 },
    ToggleSkipWeekend,
    Refresh,
    Reachability(bool),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Render(Vec<RenderDirective>),
    /// No school is configured yet; the presenter should ask for one.
    SchoolRequired,
    /// School search came back empty; the presenter should ask again.
    SchoolNotFound(String),
    SchoolSearchFailed(String),
}

/// Result of one fetch pair. Either half may have failed independently.
#[derive(Debug)]
pub struct FetchOutcome {
    pub school: School,
    pub date: NaiveDate,
    pub meal: Result<MealMenu, FetchError>,
    pub timetable: Result<Vec<TimetablePeriod>, FetchError>,
}

enum Wake {
    Command(Option<Command>),
    Fetched(FetchOutcome),
    Tick,
}

pub struct RefreshCoordinator<S: ScheduleSource> {
    source: Arc<S>,
    ctx: SharedContext,
    config: Config,
    state: DisplayState,
    interval: Duration,
    next_tick: Option<Instant>,
    today: fn() -> NaiveDate,
    done_tx: mpsc::Sender<FetchOutcome>,
    done_rx: mpsc::Receiver<FetchOutcome>,
}

impl<S: ScheduleSource> RefreshCoordinator<S> {
    pub fn new(source: S, ctx: SharedContext, mut config: Config) -> Self {
        config.normalize();
        let (done_tx, done_rx) = mpsc::channel(1);
        let state = DisplayState {
            school: config.school().ok(),
            selection: config.selection(),
            ..DisplayState::default()
        };
        let interval = config
            .refresh_interval_hours
            .checked_mul(60 * 60)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_INTERVAL);
        Self {
            source: Arc::new(source),
            ctx,
            config,
            state,
            interval,
            next_tick: None,
            today: local_today,
            done_tx,
            done_rx,
        }
    }

    /// Replaces the wall clock used to compute the request date.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Deadline of the single live refresh timer, if one is scheduled.
    pub fn next_tick(&self) -> Option<Instant> {
        self.next_tick
    }

    pub fn render(&self) -> Vec<RenderDirective> {
        render(&self.state)
    }

    /// Arms the periodic timer one interval from now. An interval too large
    /// to represent leaves no timer at all.
    fn rearm(&mut self) {
        self.next_tick = Instant::now().checked_add(self.interval);
    }

    /// Starts a fetch pair unless one is already in flight or no school is
    /// configured. Reschedules the periodic timer. Returns whether a fetch
    /// was started.
    pub fn trigger(&mut self) -> bool {
        if self.state.is_refreshing {
            log::debug!("Refresh already in flight, ignoring trigger");
            return false;
        }
        let Some(school) = self.state.school.clone() else {
            log::debug!("No school configured, refresh skipped");
            self.next_tick = None;
            return false;
        };

        self.state.is_refreshing = true;
        self.rearm();

        let date = request_date((self.today)(), self.config.skip_weekend);
        let source = Arc::clone(&self.source);
        let config = self.config.clone();
        let done_tx = self.done_tx.clone();
        log::info!("Refreshing meals and timetable for {}", date);

        tokio::spawn(async move {
            let fetch = tokio::spawn(async move {
                tokio::join!(
                    source.fetch_meal_list(&config, date),
                    source.fetch_timetable(&config, date)
                )
            });
            let (meal, timetable) = match fetch.await {
                Ok(pair) => pair,
                Err(e) => {
                    let err = FetchError::NetworkFailure(format!("fetch task aborted: {}", e));
                    (Err(err.clone()), Err(err))
                }
            };
            let _ = done_tx
                .send(FetchOutcome {
                    school,
                    date,
                    meal,
                    timetable,
                })
                .await;
        });
        true
    }

    /// Merges a fetch pair into the display state and leaves `Refreshing`.
    ///
    /// A failed half keeps its previous value when that value belongs to
    /// the same request date, and is emptied otherwise. An outcome fetched
    /// for a school that is no longer active is discarded and a fetch for
    /// the current school is started instead.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        if self.state.school.as_ref() != Some(&outcome.school) {
            log::info!(
                "Discarding refresh for {}, school changed meanwhile",
                outcome.school.school_name
            );
            self.state.is_refreshing = false;
            self.trigger();
            return;
        }

        let same_day = self.state.fetched_for == Some(outcome.date);

        match outcome.meal {
            Ok(menu) => self.state.meal = Some(menu),
            Err(e) => {
                log::warn!("Meal fetch failed: {}", e);
                if !same_day {
                    self.state.meal = Some(MealMenu::default());
                }
            }
        }
        match outcome.timetable {
            Ok(rows) => self.state.timetable = normalize_timetable(rows),
            Err(e) => {
                log::warn!("Timetable fetch failed: {}", e);
                if !same_day {
                    self.state.timetable.clear();
                }
            }
        }

        self.state.fetched_for = Some(outcome.date);
        self.state.is_refreshing = false;
    }

    /// Waits for the in-flight fetch pair and applies it. Returns `false`
    /// when nothing was in flight.
    pub async fn finish_refresh(&mut self) -> bool {
        if !self.state.is_refreshing {
            return false;
        }
        match self.done_rx.recv().await {
            Some(outcome) => {
                self.apply(outcome);
                true
            }
            None => false,
        }
    }

    pub fn select_part(&mut self, part: DisplayPart) {
        self.state.selection.part = part;
    }

    /// Returns whether the flag changed.
    pub fn set_reachable(&mut self, reachable: bool) -> bool {
        if self.state.network_reachable == reachable {
            return false;
        }
        log::info!(
            "Network {}",
            if reachable { "reachable" } else { "unreachable" }
        );
        self.state.network_reachable = reachable;
        true
    }

    /// Values below 1 are rejected and the previous selection is kept.
    pub fn set_class_grade(&mut self, grade: u32, class_number: u32) -> bool {
        if grade == 0 || class_number == 0 {
            log::warn!("Rejected grade/class {}/{}", grade, class_number);
            return false;
        }
        self.config.grade = grade;
        self.config.class_number = class_number;
        self.persist();
        self.sync_selection();
        true
    }

    pub fn toggle_skip_weekend(&mut self) -> bool {
        self.config.skip_weekend = !self.config.skip_weekend;
        self.persist();
        self.sync_selection();
        self.config.skip_weekend
    }

    /// Resolves `name`, persists the result and makes it the active school.
    pub async fn set_school(&mut self, name: &str) -> Result<School, FetchError> {
        let school = self.source.search_school(name).await?;
        self.config.set_school(&school);
        self.persist();
        if self.state.school.as_ref() != Some(&school) {
            self.state.meal = None;
            self.state.timetable.clear();
            self.state.fetched_for = None;
        }
        self.state.school = Some(school.clone());
        Ok(school)
    }

    fn sync_selection(&mut self) {
        let part = self.state.selection.part;
        self.state.selection = self.config.selection();
        self.state.selection.part = part;
    }

    fn persist(&self) {
        if let Err(e) = self.config.save(self.ctx.as_ref()) {
            log::error!("Failed to save preferences: {}", e);
        }
    }

    /// Applies one command. Returns `false` when the actor should stop.
    async fn handle(&mut self, command: Command, events: &mpsc::Sender<AppEvent>) -> bool {
        match command {
            Command::SelectPart(part) => self.select_part(part),
            Command::Refresh => {
                self.trigger();
            }
            Command::SetClassGrade {
                grade,
                class_number,
            } => {
                if self.set_class_grade(grade, class_number) {
                    self.trigger();
                }
            }
            Command::ToggleSkipWeekend => {
                self.toggle_skip_weekend();
                self.trigger();
            }
            Command::SetSchool(name) => match self.set_school(&name).await {
                Ok(_) => {
                    self.trigger();
                }
                Err(FetchError::NotFound) => {
                    let _ = events.send(AppEvent::SchoolNotFound(name)).await;
                }
                Err(e) => {
                    log::warn!("School search for '{}' failed: {}", name, e);
                    let _ = events.send(AppEvent::SchoolSearchFailed(e.to_string())).await;
                }
            },
            Command::Reachability(reachable) => {
                self.set_reachable(reachable);
            }
            Command::Quit => return false,
        }
        true
    }

    /// Actor loop. Ends on `Command::Quit`, when the command channel closes,
    /// or when the presenter drops its event receiver.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        events: mpsc::Sender<AppEvent>,
    ) {
        if self.state.school.is_none() {
            let _ = events.send(AppEvent::SchoolRequired).await;
        } else {
            self.trigger();
        }
        if events.send(AppEvent::Render(self.render())).await.is_err() {
            return;
        }

        loop {
            let tick = self.next_tick;
            let wake = tokio::select! {
                cmd = commands.recv() => Wake::Command(cmd),
                Some(outcome) = self.done_rx.recv() => Wake::Fetched(outcome),
                _ = wait_for_tick(tick) => Wake::Tick,
            };

            match wake {
                Wake::Command(None) => break,
                Wake::Command(Some(command)) => {
                    if !self.handle(command, &events).await {
                        break;
                    }
                }
                Wake::Fetched(outcome) => self.apply(outcome),
                Wake::Tick => {
                    log::info!("Periodic refresh");
                    if !self.trigger() && self.state.school.is_some() {
                        // Still fetching; wait a full interval again.
                        self.rearm();
                    }
                }
            }

            if events.send(AppEvent::Render(self.render())).await.is_err() {
                break;
            }
        }
        log::info!("Coordinator stopped");
    }
}

async fn wait_for_tick(deadline: Option<Instant>) {
    match deadline {
        Some(d) => sleep_until(d).await,
        None => std::future::pending().await,
    }
}
