//! Pointer-driven boundary dragging.
//!
//! [`DragController`] owns at most one live drag session. A pointer-down on a
//! visible, unlocked slice starts a session, moves from the same pointer feed
//! [`adjust_boundary`] with freshly resolved grid and neighbor candidates, and
//! pointer-up or cancel ends it. Events from any other pointer are ignored.

use serde::{Deserialize, Serialize};

use crate::algorithms::adjustment::{
    adjust_boundary, build_grid_candidates, resolve_neighbor_candidates, resolve_snap_interval_sec,
    snap_tolerance_sec, AdjustmentRequest,
};
use crate::config::AdjustmentSettings;
use crate::models::{
    format_boundary_label, AdjustmentHandle, AdjustmentResult, LimitCue, SliceBoundary, SliceId,
    SnapConfig, SnapSource, TimeDomain,
};

/// Pointer input delivered to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Down {
        pointer_id: u32,
        slice_id: SliceId,
        handle: AdjustmentHandle,
        pointer_sec: f64,
        /// Modifier held: snapping is skipped for this event.
        bypass: bool,
    },
    Move {
        pointer_id: u32,
        pointer_sec: f64,
        bypass: bool,
    },
    Up {
        pointer_id: u32,
    },
    Cancel {
        pointer_id: u32,
    },
}

/// How the tooltip should present the settled value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapState {
    Snapped,
    Free,
    Bypass,
}

/// Live readout shown next to the dragged handle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragTooltip {
    pub boundary_sec: f64,
    pub boundary_label: String,
    pub duration_sec: f64,
    pub snap_state: SnapState,
    pub limit_cue: LimitCue,
}

/// New slice bounds produced by one pointer event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragUpdate {
    pub slice_id: SliceId,
    pub handle: AdjustmentHandle,
    pub result: AdjustmentResult,
    pub tooltip: DragTooltip,
}

/// What the controller did with an event.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    Update(DragUpdate),
    /// The session for `slice_id` ended; the last update stays applied.
    Ended { slice_id: SliceId },
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
struct DragSession {
    pointer_id: u32,
    slice_id: SliceId,
    handle: AdjustmentHandle,
    fixed_boundary_sec: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Single-session drag state machine.
#[derive(Debug, Clone)]
pub struct DragController {
    domain: TimeDomain,
    settings: AdjustmentSettings,
    state: DragState,
}

impl DragController {
    pub fn new(domain: TimeDomain, settings: AdjustmentSettings) -> Self {
        Self {
            domain: TimeDomain::ordered(domain.start, domain.end),
            settings,
            state: DragState::Idle,
        }
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Slice currently being dragged.
    pub fn active_slice(&self) -> Option<&SliceId> {
        match &self.state {
            DragState::Dragging(session) => Some(&session.slice_id),
            DragState::Idle => None,
        }
    }

    /// Replace the domain. Any live session ends; its slice id is returned.
    pub fn set_domain(&mut self, domain: TimeDomain) -> Option<SliceId> {
        let domain = TimeDomain::ordered(domain.start, domain.end);
        if domain == self.domain {
            return None;
        }
        self.domain = domain;
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => {
                log::debug!("domain changed; ending drag of {}", session.slice_id);
                Some(session.slice_id)
            }
            DragState::Idle => None,
        }
    }

    /// Feed one pointer event; `slices` is the current slice list.
    pub fn handle(&mut self, event: PointerEvent, slices: &[SliceBoundary]) -> DragOutcome {
        match event {
            PointerEvent::Down {
                pointer_id,
                slice_id,
                handle,
                pointer_sec,
                bypass,
            } => self.begin(pointer_id, slice_id, handle, pointer_sec, bypass, slices),
            PointerEvent::Move {
                pointer_id,
                pointer_sec,
                bypass,
            } => match &self.state {
                DragState::Dragging(session) if session.pointer_id == pointer_id => {
                    DragOutcome::Update(self.update(session, pointer_sec, bypass, slices))
                }
                _ => DragOutcome::Ignored,
            },
            PointerEvent::Up { pointer_id } | PointerEvent::Cancel { pointer_id } => {
                self.finish(pointer_id)
            }
        }
    }

    fn begin(
        &mut self,
        pointer_id: u32,
        slice_id: SliceId,
        handle: AdjustmentHandle,
        pointer_sec: f64,
        bypass: bool,
        slices: &[SliceBoundary],
    ) -> DragOutcome {
        if self.is_dragging() {
            return DragOutcome::Ignored;
        }
        let Some(slice) = slices.iter().find(|s| s.id == slice_id) else {
            return DragOutcome::Ignored;
        };
        if !slice.visible || slice.locked {
            return DragOutcome::Ignored;
        }

        let session = DragSession {
            pointer_id,
            slice_id,
            handle,
            fixed_boundary_sec: slice.fixed_boundary_for(handle),
        };
        let update = self.update(&session, pointer_sec, bypass, slices);
        self.state = DragState::Dragging(session);
        DragOutcome::Update(update)
    }

    fn finish(&mut self, pointer_id: u32) -> DragOutcome {
        match &self.state {
            DragState::Dragging(session) if session.pointer_id == pointer_id => {
                let slice_id = session.slice_id.clone();
                self.state = DragState::Idle;
                DragOutcome::Ended { slice_id }
            }
            _ => DragOutcome::Ignored,
        }
    }

    fn update(
        &self,
        session: &DragSession,
        pointer_sec: f64,
        bypass: bool,
        slices: &[SliceBoundary],
    ) -> DragUpdate {
        let settings = &self.settings;
        let interval = resolve_snap_interval_sec(settings.snap_mode, settings.fixed_snap_preset_sec, &self.domain);
        let snap_at = self.domain.clamp(pointer_sec);

        let mut snap = SnapConfig::new(snap_tolerance_sec(interval))
            .with_grid(build_grid_candidates(snap_at, interval, &self.domain))
            .with_neighbors(resolve_neighbor_candidates(
                slices,
                &session.slice_id,
                &self.domain,
                session.fixed_boundary_sec,
            ));
        snap.mode = settings.snap_mode;
        snap.enabled = settings.snap_enabled;
        snap.bypass = bypass;

        let request = AdjustmentRequest::new(
            session.handle,
            pointer_sec,
            session.fixed_boundary_sec,
            self.domain,
        )
        .with_min_duration(settings.min_duration_sec)
        .with_snap(snap);
        let result = adjust_boundary(&request);

        let snap_state = if bypass {
            SnapState::Bypass
        } else if result.snap_source == SnapSource::None {
            SnapState::Free
        } else {
            SnapState::Snapped
        };
        let boundary_sec = result.boundary_sec(session.handle);

        DragUpdate {
            slice_id: session.slice_id.clone(),
            handle: session.handle,
            result,
            tooltip: DragTooltip {
                boundary_sec,
                boundary_label: format_boundary_label(boundary_sec),
                duration_sec: result.duration_sec(),
                snap_state,
                limit_cue: result.limit_cue,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEN_HOURS: f64 = 36_000.0;

    fn controller() -> DragController {
        DragController::new(TimeDomain::new(0.0, TEN_HOURS), AdjustmentSettings::default())
    }

    fn slices() -> Vec<SliceBoundary> {
        vec![
            SliceBoundary::new("a", 3600.0, 7200.0),
            SliceBoundary::new("locked", 20_000.0, 21_000.0).locked(),
            SliceBoundary::new("hidden", 22_000.0, 23_000.0).hidden(),
        ]
    }

    fn down(slice: &str, handle: AdjustmentHandle, pointer_sec: f64) -> PointerEvent {
        PointerEvent::Down {
            pointer_id: 1,
            slice_id: SliceId::new(slice),
            handle,
            pointer_sec,
            bypass: false,
        }
    }

    fn moved(pointer_id: u32, pointer_sec: f64, bypass: bool) -> PointerEvent {
        PointerEvent::Move {
            pointer_id,
            pointer_sec,
            bypass,
        }
    }

    fn expect_update(outcome: DragOutcome) -> DragUpdate {
        match outcome {
            DragOutcome::Update(update) => update,
            other => panic!("expected update, got {:?}", other),
        }
    }

    #[test]
    fn test_locked_hidden_and_unknown_slices_do_not_start() {
        let mut drag = controller();
        let slices = slices();
        for id in ["locked", "hidden", "missing"] {
            assert_eq!(drag.handle(down(id, AdjustmentHandle::End, 20_500.0), &slices), DragOutcome::Ignored);
        }
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_full_session_lifecycle() {
        let mut drag = controller();
        let slices = slices();

        let first = expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));
        assert_eq!(first.result.start_sec, 3600.0);
        assert_eq!(first.result.end_sec, 7200.0);
        assert_eq!(drag.active_slice(), Some(&SliceId::new("a")));

        // Another pointer cannot steer or end the session.
        assert_eq!(drag.handle(moved(2, 9000.0, false), &slices), DragOutcome::Ignored);
        assert_eq!(drag.handle(PointerEvent::Up { pointer_id: 2 }, &slices), DragOutcome::Ignored);

        let update = expect_update(drag.handle(moved(1, 9000.0, false), &slices));
        assert_eq!(update.result.end_sec, 9000.0);
        assert_eq!(update.tooltip.duration_sec, 5400.0);
        assert_eq!(update.tooltip.boundary_label, format_boundary_label(9000.0));

        assert_eq!(
            drag.handle(PointerEvent::Cancel { pointer_id: 1 }, &slices),
            DragOutcome::Ended {
                slice_id: SliceId::new("a")
            }
        );
        assert!(!drag.is_dragging());
        assert_eq!(drag.handle(moved(1, 9500.0, false), &slices), DragOutcome::Ignored);
    }

    #[test]
    fn test_second_down_is_ignored_while_dragging() {
        let mut drag = controller();
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::Start, 3600.0), &slices));
        assert_eq!(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices), DragOutcome::Ignored);
    }

    #[test]
    fn test_grid_snap_and_bypass() {
        // Ten hours gives a 300 s grid with a 105 s tolerance.
        let mut drag = controller();
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));

        let snapped = expect_update(drag.handle(moved(1, 10_850.0, false), &slices));
        assert_eq!(snapped.result.end_sec, 10_800.0);
        assert_eq!(snapped.result.snap_source, SnapSource::Grid);
        assert_eq!(snapped.tooltip.snap_state, SnapState::Snapped);

        let free = expect_update(drag.handle(moved(1, 10_850.0, true), &slices));
        assert_eq!(free.result.end_sec, 10_850.0);
        assert_eq!(free.tooltip.snap_state, SnapState::Bypass);
    }

    #[test]
    fn test_neighbor_wins_grid_tie() {
        let mut drag = controller();
        let mut slices = slices();
        slices.push(SliceBoundary::new("b", 10_900.0, 12_000.0));
        expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));

        let update = expect_update(drag.handle(moved(1, 10_850.0, false), &slices));
        assert_eq!(update.result.end_sec, 10_900.0);
        assert_eq!(update.result.snap_source, SnapSource::Neighbor);
    }

    #[test]
    fn test_min_duration_cue_reaches_tooltip() {
        let mut drag = controller();
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::Start, 3600.0), &slices));

        let update = expect_update(drag.handle(moved(1, 7190.0, true), &slices));
        assert_eq!(update.result.start_sec, 7140.0);
        assert_eq!(update.tooltip.limit_cue, LimitCue::MinDuration);
        assert_eq!(update.tooltip.duration_sec, 60.0);
    }

    #[test]
    fn test_fixed_preset_grid() {
        let settings = AdjustmentSettings {
            snap_mode: crate::models::SnapMode::Fixed,
            fixed_snap_preset_sec: Some(1000.0),
            ..Default::default()
        };
        let mut drag = DragController::new(TimeDomain::new(0.0, TEN_HOURS), settings);
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));

        let update = expect_update(drag.handle(moved(1, 9_700.0, false), &slices));
        assert_eq!(update.result.end_sec, 10_000.0);
    }

    #[test]
    fn test_disabled_snapping_is_free() {
        let settings = AdjustmentSettings {
            snap_enabled: false,
            ..Default::default()
        };
        let mut drag = DragController::new(TimeDomain::new(0.0, TEN_HOURS), settings);
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));

        let update = expect_update(drag.handle(moved(1, 10_850.0, false), &slices));
        assert_eq!(update.result.end_sec, 10_850.0);
        assert_eq!(update.tooltip.snap_state, SnapState::Free);
    }

    #[test]
    fn test_domain_change_ends_session() {
        let mut drag = controller();
        let slices = slices();
        expect_update(drag.handle(down("a", AdjustmentHandle::End, 7200.0), &slices));

        assert_eq!(drag.set_domain(TimeDomain::new(0.0, TEN_HOURS)), None);
        assert!(drag.is_dragging());

        assert_eq!(
            drag.set_domain(TimeDomain::new(TEN_HOURS, -3600.0)),
            Some(SliceId::new("a"))
        );
        assert!(!drag.is_dragging());
        assert_eq!(drag.domain(), TimeDomain::new(-3600.0, TEN_HOURS));
    }
}
