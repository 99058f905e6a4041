//! Daemon state: the mission selector plus the tick loop driving it.

use crate::config::DaemonConfig;
use crate::protocol::{CatalogEntry, Request, Response, StateSnapshot};
use crate::ticker::{TickFlow, Ticker};
use explorer_missions::{ActiveMission, MissionSelector, SelectorError, Signal, Transition};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

pub type SharedState = Arc<RwLock<DaemonState>>;

#[derive(Debug)]
pub struct DaemonState {
    selector: MissionSelector,
    tick_period: Duration,
    /// The live tick loop and its run id. Ticks carrying any other id are
    /// refused.
    ticking: Option<(u64, Ticker)>,
    next_run: u64,
    /// Set by `Shutdown`; no tick loop starts afterwards.
    shutting_down: bool,
}

impl DaemonState {
    pub fn new(config: &DaemonConfig) -> Self {
        Self {
            selector: MissionSelector::new(),
            tick_period: config.tick_period(),
            ticking: None,
            next_run: 0,
            shutting_down: false,
        }
    }

    #[cfg(test)]
    pub fn selector(&self) -> &MissionSelector {
        &self.selector
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking.is_some()
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Catalog => self.catalog(),
            Request::GetState => self.state(),
            Request::Open { mission } => {
                self.cancel_ticks();
                self.selector.open(mission);
                info!("Opened mission: {}", mission);
                self.state()
            }
            Request::Back => {
                self.cancel_ticks();
                match self.selector.back() {
                    Some(mission) => {
                        info!("Left mission: {}", mission);
                        Response::Success {
                            message: format!("Left {}", mission.descriptor().title),
                        }
                    }
                    None => Response::error(SelectorError::NoActiveMission.to_string()),
                }
            }
            Request::Act { action } => self.apply(|s| s.dispatch(action)),
            Request::Evaluate => {
                let response = self.apply(MissionSelector::evaluate);
                if let Some(active) = self.selector.active() {
                    let stats = active.stats();
                    debug!(
                        mission = %active.id(),
                        evaluations = stats.evaluations,
                        pass_rate = stats.pass_rate(),
                        recent_rate = stats.recent_rate(),
                        "evaluated"
                    );
                }
                response
            }
            Request::NextLevel => self.apply(MissionSelector::next_level),
            Request::Shutdown => {
                self.shutting_down = true;
                self.cancel_ticks();
                Response::Success {
                    message: "Shutting down".to_string(),
                }
            }
        }
    }

    /// Advance the active experiment by one step on behalf of tick loop `run`.
    pub fn tick(&mut self, run: u64) -> TickFlow {
        if self.ticking.as_ref().map(|(id, _)| *id) != Some(run) {
            debug!(run, "stale tick ignored");
            return TickFlow::Stop;
        }
        match self.selector.tick() {
            Ok(transition) => {
                self.on_transition(transition);
                if transition.running {
                    TickFlow::Continue
                } else {
                    TickFlow::Stop
                }
            }
            Err(e) => {
                warn!("Tick failed: {}", e);
                self.cancel_ticks();
                TickFlow::Stop
            }
        }
    }

    fn needs_ticker(&self) -> bool {
        !self.shutting_down
            && self.ticking.is_none()
            && self.selector.active().is_some_and(ActiveMission::is_running)
    }

    fn apply<F>(&mut self, op: F) -> Response
    where
        F: FnOnce(&mut MissionSelector) -> Result<Transition, SelectorError>,
    {
        match op(&mut self.selector) {
            Ok(transition) => {
                self.on_transition(transition);
                self.state()
            }
            Err(e) => {
                warn!("Request rejected: {}", e);
                Response::error(e.to_string())
            }
        }
    }

    fn on_transition(&mut self, transition: Transition) {
        if transition.signal == Signal::Completed {
            if let Some(active) = self.selector.active() {
                info!(
                    "Mission complete: {} ({}/{}, {:.0}% of checks passed)",
                    active.id(),
                    self.selector.completed_count(),
                    self.selector.catalog().len(),
                    active.stats().pass_rate() * 100.0
                );
            }
        }
        if !transition.running {
            self.cancel_ticks();
        }
    }

    fn cancel_ticks(&mut self) {
        if let Some((run, _ticker)) = self.ticking.take() {
            debug!(run, "tick loop cancelled");
        }
    }

    fn catalog(&self) -> Response {
        let missions: Vec<CatalogEntry> = self
            .selector
            .catalog()
            .iter()
            .map(|d| CatalogEntry {
                mission: d.clone(),
                completed: self.selector.is_completed(d.id),
            })
            .collect();
        Response::Catalog {
            total: missions.len(),
            completed: self.selector.completed_count(),
            missions,
        }
    }

    fn state(&self) -> Response {
        let stats = self.selector.active().map(ActiveMission::stats);
        Response::State(Box::new(StateSnapshot {
            tick_ms: self.tick_period.as_millis() as u64,
            ticking: self.is_ticking(),
            completed: self.selector.completed(),
            total: self.selector.catalog().len(),
            active: self.selector.active().map(ActiveMission::snapshot),
            pass_rate: stats.map(|s| s.pass_rate()),
            recent_rate: stats.map(|s| s.recent_rate()),
        }))
    }
}

/// Handle one request and start a tick loop if it left the experiment running.
pub async fn respond(shared: &SharedState, request: Request) -> Response {
    let mut s = shared.write().await;
    let response = s.handle(request);
    schedule_ticks(shared, &mut s);
    response
}

/// Start a tick loop if the active experiment is running and none is live.
///
/// The loop holds only a weak handle, so a dropped daemon state also ends it.
pub fn schedule_ticks(shared: &SharedState, state: &mut DaemonState) {
    if !state.needs_ticker() {
        return;
    }
    state.next_run += 1;
    let run = state.next_run;
    let weak = Arc::downgrade(shared);
    let ticker = Ticker::spawn(state.tick_period, move || {
        let weak = weak.clone();
        async move {
            let Some(shared) = weak.upgrade() else {
                return TickFlow::Stop;
            };
            let mut s = shared.write().await;
            s.tick(run)
        }
    });
    debug!(run, period_ms = ticker.period().as_millis() as u64, "tick loop started");
    state.ticking = Some((run, ticker));
}

#[cfg(test)]
mod tests {
    use super::*;
    use explorer_missions::heat::{HeatAction, ROOM_TEMPERATURE};
    use explorer_missions::magnetism::MagnetAction;
    use explorer_missions::motion::MotionAction;
    use explorer_missions::{MissionAction, MissionId, MissionSnapshot};

    fn daemon() -> DaemonState {
        DaemonState::new(&DaemonConfig::default())
    }

    fn snapshot(response: Response) -> StateSnapshot {
        match response {
            Response::State(s) => *s,
            other => panic!("expected state, got {other:?}"),
        }
    }

    fn error_message(response: Response) -> String {
        match response {
            Response::Error { message } => message,
            other => panic!("expected error, got {other:?}"),
        }
    }

    fn act(state: &mut DaemonState, action: MissionAction) -> Response {
        state.handle(Request::Act { action })
    }

    #[test]
    fn catalog_lists_every_mission() {
        let mut state = daemon();
        match state.handle(Request::Catalog) {
            Response::Catalog {
                missions,
                completed,
                total,
            } => {
                assert_eq!(total, 7);
                assert_eq!(completed, 0);
                assert_eq!(missions[0].mission.id, MissionId::Motion);
                assert!(missions.iter().all(|m| !m.completed));
            }
            other => panic!("expected catalog, got {other:?}"),
        }
    }

    #[test]
    fn open_mounts_level_one_and_back_discards_it() {
        let mut state = daemon();
        let s = snapshot(state.handle(Request::Open {
            mission: MissionId::Air,
        }));
        match s.active {
            Some(MissionSnapshot::Air(screen)) => assert_eq!(screen.level.get(), 1),
            other => panic!("unexpected active screen {other:?}"),
        }

        assert!(matches!(
            state.handle(Request::Back),
            Response::Success { .. }
        ));
        assert!(snapshot(state.handle(Request::GetState)).active.is_none());
        assert_eq!(
            error_message(state.handle(Request::Back)),
            "no mission is open"
        );
    }

    #[test]
    fn misuse_is_reported_as_error() {
        let mut state = daemon();
        let flip = MissionAction::Magnetism(MagnetAction::FlipFirst);
        assert_eq!(error_message(act(&mut state, flip.clone())), "no mission is open");
        assert_eq!(
            error_message(state.handle(Request::Evaluate)),
            "no mission is open"
        );

        state.handle(Request::Open {
            mission: MissionId::Heat,
        });
        assert!(error_message(act(&mut state, flip)).contains("while heat is open"));
        assert!(matches!(
            state.handle(Request::NextLevel),
            Response::Error { .. }
        ));
    }

    #[test]
    fn completing_a_mission_marks_the_catalog() {
        let mut state = daemon();
        state.handle(Request::Open {
            mission: MissionId::Magnetism,
        });
        act(&mut state, MissionAction::Magnetism(MagnetAction::FlipSecond));
        for _ in 0..2 {
            state.handle(Request::Evaluate);
            snapshot(state.handle(Request::NextLevel));
        }
        let s = snapshot(state.handle(Request::Evaluate));
        assert_eq!(s.completed, vec![MissionId::Magnetism]);

        match state.handle(Request::Catalog) {
            Response::Catalog {
                missions,
                completed,
                ..
            } => {
                assert_eq!(completed, 1);
                let magnets = missions
                    .iter()
                    .find(|m| m.mission.id == MissionId::Magnetism)
                    .unwrap();
                assert!(magnets.completed);
            }
            other => panic!("expected catalog, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_is_acknowledged_and_stops_ticks() {
        let shared: SharedState = Arc::new(RwLock::new(daemon()));
        respond(
            &shared,
            Request::Open {
                mission: MissionId::Heat,
            },
        )
        .await;
        respond(
            &shared,
            Request::Act {
                action: MissionAction::Heat(HeatAction::Heat),
            },
        )
        .await;
        assert!(shared.read().await.is_ticking());

        match respond(&shared, Request::Shutdown).await {
            Response::Success { message } => assert_eq!(message, "Shutting down"),
            other => panic!("expected success, got {other:?}"),
        }
        assert!(!shared.read().await.is_ticking());

        tokio::time::sleep(Duration::from_secs(1)).await;
        let s = shared.read().await;
        match s.selector().active().unwrap().snapshot() {
            MissionSnapshot::Heat(screen) => {
                assert_eq!(screen.state.temperature, ROOM_TEMPERATURE)
            }
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[test]
    fn state_reports_pass_rates_of_the_active_screen() {
        let mut state = daemon();
        let idle = snapshot(state.handle(Request::GetState));
        assert_eq!(idle.pass_rate, None);

        state.handle(Request::Open {
            mission: MissionId::Magnetism,
        });
        state.handle(Request::Evaluate);
        act(&mut state, MissionAction::Magnetism(MagnetAction::FlipFirst));
        let s = snapshot(state.handle(Request::Evaluate));
        assert_eq!(s.pass_rate, Some(0.5));
        assert_eq!(s.recent_rate, Some(0.5));
    }

    #[test]
    fn stale_runs_are_refused() {
        let mut state = daemon();
        state.handle(Request::Open {
            mission: MissionId::Heat,
        });
        act(&mut state, MissionAction::Heat(HeatAction::Heat));
        assert_eq!(state.tick(42), TickFlow::Stop);
        match state.selector().active().unwrap().snapshot() {
            MissionSnapshot::Heat(s) => assert_eq!(s.state.temperature, ROOM_TEMPERATURE),
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn motion_run_is_ticked_to_the_finish() {
        let shared: SharedState = Arc::new(RwLock::new(daemon()));
        {
            let mut s = shared.write().await;
            s.handle(Request::Open {
                mission: MissionId::Motion,
            });
            let started = snapshot(act(&mut s, MissionAction::Motion(MotionAction::Start)));
            assert!(!started.ticking);
            schedule_ticks(&shared, &mut s);
            assert!(s.is_ticking());
        }

        tokio::time::sleep(Duration::from_secs(11)).await;

        let s = shared.read().await;
        assert!(!s.is_ticking());
        match s.selector().active().unwrap().snapshot() {
            MissionSnapshot::Motion(screen) => {
                assert!(!screen.running);
                assert_eq!(screen.state.distance, 50.0);
                assert_eq!(screen.state.elapsed_ticks, 100);
                assert!(screen.feedback.unwrap().passed);
            }
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn leaving_a_mission_stops_its_ticks() {
        let shared: SharedState = Arc::new(RwLock::new(daemon()));
        {
            let mut s = shared.write().await;
            s.handle(Request::Open {
                mission: MissionId::Heat,
            });
            act(&mut s, MissionAction::Heat(HeatAction::Heat));
            schedule_ticks(&shared, &mut s);
        }
        tokio::time::sleep(Duration::from_millis(350)).await;
        {
            let mut s = shared.write().await;
            match s.selector().active().unwrap().snapshot() {
                MissionSnapshot::Heat(screen) => assert_eq!(screen.state.temperature, 31.0),
                other => panic!("unexpected snapshot {other:?}"),
            }
            s.handle(Request::Back);
            assert!(!s.is_ticking());
            s.handle(Request::Open {
                mission: MissionId::Heat,
            });
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        let s = shared.read().await;
        match s.selector().active().unwrap().snapshot() {
            MissionSnapshot::Heat(screen) => {
                assert_eq!(screen.state.temperature, ROOM_TEMPERATURE);
                assert!(!screen.running);
            }
            other => panic!("unexpected snapshot {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_cancels_and_restarting_resumes() {
        let shared: SharedState = Arc::new(RwLock::new(daemon()));
        {
            let mut s = shared.write().await;
            s.handle(Request::Open {
                mission: MissionId::Motion,
            });
            act(&mut s, MissionAction::Motion(MotionAction::Start));
            schedule_ticks(&shared, &mut s);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
        {
            let mut s = shared.write().await;
            act(&mut s, MissionAction::Motion(MotionAction::Pause));
            schedule_ticks(&shared, &mut s);
            assert!(!s.is_ticking());
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        {
            let mut s = shared.write().await;
            match s.selector().active().unwrap().snapshot() {
                MissionSnapshot::Motion(screen) => assert_eq!(screen.state.elapsed_ticks, 2),
                other => panic!("unexpected snapshot {other:?}"),
            }
            act(&mut s, MissionAction::Motion(MotionAction::Start));
            schedule_ticks(&shared, &mut s);
            assert!(s.is_ticking());
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
        let s = shared.read().await;
        match s.selector().active().unwrap().snapshot() {
            MissionSnapshot::Motion(screen) => assert_eq!(screen.state.elapsed_ticks, 4),
            other => panic!("unexpected snapshot {other:?}"),
        }
    }
}
