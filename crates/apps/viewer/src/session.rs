use std::sync::Arc;

use compute::analysis::{RankedLocation, SpatialAnalysis};
use formats::feed::HeatIslandFeed;
use foundation::geo::GeoPoint;
use foundation::time::Time;
use layers::compose::{
    BoundaryDocuments, FrameSnapshot, LayerInputs, LayerToggles, RenderFrame, compose_frame,
};
use layers::layer::PickRef;
use layers::panel::{SelectionPanel, selection_panel};
use layers::tooltip::{Tooltip, tooltip_for};
use runtime::clock::PulseTrain;
use scene::anomaly::{AnomalyId, AnomalySet};
use scene::camera::{CameraController, CameraPose, CameraTuning};
use scene::reference::{ReferenceLocation, los_angeles_parks};
use scene::region::RegionCatalog;
use scene::selection::SelectionState;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::loader::DataEvent;

/// Tolerance, in degrees per axis, for matching a fly-to target to an anomaly.
pub const TARGET_MATCH_TOLERANCE_DEG: f64 = 1e-4;
/// Zoom used when jumping to a named region.
pub const REGION_ZOOM: f64 = 13.0;

/// What the host should do after a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Tooltip(Option<Tooltip>),
    Selection(SelectionPanel),
    /// Region names for a picker, sorted.
    Regions(Vec<String>),
    Quit,
}

/// All interactive state of one map view.
///
/// Only the host loop touches a session, so nothing here is shared or
/// locked. Every entry point either applies fully or returns an error with
/// the state unchanged.
#[derive(Debug)]
pub struct MapSession {
    camera: CameraController,
    selection: SelectionState,
    anomalies: AnomalySet,
    regions: Option<RegionCatalog>,
    sites: Arc<[ReferenceLocation]>,
    boundaries: BoundaryDocuments,
    toggles: LayerToggles,
    pulse: PulseTrain,
    related_sites: usize,
    last_emitted: Option<RenderFrame>,
}

impl MapSession {
    pub fn new(
        tuning: CameraTuning,
        boundaries: BoundaryDocuments,
        related_sites: usize,
    ) -> Result<Self, ViewerError> {
        Ok(Self {
            camera: CameraController::new(tuning)?,
            selection: SelectionState::default(),
            anomalies: AnomalySet::empty(),
            regions: None,
            sites: los_angeles_parks(),
            boundaries,
            toggles: LayerToggles::default(),
            pulse: PulseTrain::default(),
            related_sites,
            last_emitted: None,
        })
    }

    pub fn from_config(config: &ViewerConfig) -> Result<Self, ViewerError> {
        Self::new(
            config.camera_tuning()?,
            config.boundaries(),
            config.related_sites,
        )
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn anomalies(&self) -> &AnomalySet {
        &self.anomalies
    }

    pub fn regions(&self) -> Option<&RegionCatalog> {
        self.regions.as_ref()
    }

    pub fn toggles(&self) -> LayerToggles {
        self.toggles
    }

    /// Swaps in a freshly loaded feed. A selection whose anomaly is gone is
    /// cleared.
    pub fn replace_anomalies(&mut self, feed: HeatIslandFeed) {
        let summary = &feed.summary;
        info!(
            kept = feed.anomalies.len(),
            reported = summary.total_count,
            severe = summary.severe_count(),
            dropped = summary.dropped,
            "heat-island feed loaded"
        );
        self.anomalies = feed.anomalies;
        if let Some(id) = self.selection.selected() {
            if self.anomalies.get(id).is_none() {
                info!(%id, "selected anomaly no longer in feed, clearing selection");
                self.selection.clear();
            }
        }
    }

    pub fn set_regions(&mut self, regions: RegionCatalog) {
        info!(regions = regions.len(), "region catalog loaded");
        self.regions = Some(regions);
    }

    pub fn apply_data(&mut self, event: DataEvent) {
        match event {
            DataEvent::Anomalies(feed) => self.replace_anomalies(feed),
            DataEvent::Regions(regions) => self.set_regions(regions),
        }
    }

    /// Selects an anomaly and flies to it. Leaves analysis mode.
    pub fn select_anomaly(&mut self, id: &AnomalyId) -> Result<(), ViewerError> {
        let location = self
            .anomalies
            .get(id)
            .map(|a| a.location)
            .ok_or_else(|| ViewerError::UnknownAnomaly(id.to_string()))?;
        self.camera.fly_to(location.lat, location.lon, None)?;
        self.selection.select(id.clone());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Enters analysis mode for the selected anomaly and frames it together
    /// with its nearest reference sites.
    pub fn find_related_sites(&mut self) -> Result<Vec<RankedLocation>, ViewerError> {
        let id = self.selection.selected().ok_or(ViewerError::NothingSelected)?;
        let anomaly = self
            .anomalies
            .get(id)
            .ok_or_else(|| ViewerError::UnknownAnomaly(id.to_string()))?;
        if self.sites.is_empty() {
            return Err(ViewerError::MissingReferenceData("reference sites"));
        }

        let ranked = SpatialAnalysis::nearest_k(&anomaly.location, &self.sites, self.related_sites);
        let satellites: Vec<GeoPoint> = ranked.iter().map(|r| r.location.location).collect();
        self.camera.focus_on_cluster(anomaly.location, &satellites)?;
        self.selection.enter_analysis();
        debug!(
            sites = ?ranked.iter().map(|r| r.location.name.as_str()).collect::<Vec<_>>(),
            "related sites"
        );
        Ok(ranked)
    }

    pub fn fly_to(&mut self, lat: f64, lon: f64, zoom: Option<f64>) -> Result<(), ViewerError> {
        self.camera.fly_to(lat, lon, zoom)?;
        Ok(())
    }

    /// Flies to a target and selects the anomaly sitting on it, if any.
    pub fn fly_to_target(&mut self, lat: f64, lon: f64) -> Result<Option<AnomalyId>, ViewerError> {
        self.camera.fly_to(lat, lon, None)?;
        let hit = self
            .anomalies
            .near(&GeoPoint::new(lat, lon), TARGET_MATCH_TOLERANCE_DEG)
            .map(|a| a.id.clone());
        if let Some(id) = &hit {
            self.selection.select(id.clone());
        }
        Ok(hit)
    }

    pub fn focus_on_region(&mut self, name: &str) -> Result<(), ViewerError> {
        let regions = self
            .regions
            .as_ref()
            .ok_or(ViewerError::MissingReferenceData("regions"))?;
        let center = regions
            .get(name)
            .and_then(|r| r.center())
            .ok_or_else(|| ViewerError::UnknownRegion(name.to_string()))?;
        self.camera.fly_to(center.lat, center.lon, Some(REGION_ZOOM))?;
        Ok(())
    }

    pub fn focus_on_cluster(
        &mut self,
        primary: GeoPoint,
        satellites: &[GeoPoint],
    ) -> Result<(), ViewerError> {
        self.camera.focus_on_cluster(primary, satellites)?;
        Ok(())
    }

    pub fn apply_user_pose(&mut self, pose: CameraPose) -> Result<(), ViewerError> {
        self.camera.apply_user_pose(pose)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.camera.reset();
        self.selection.clear();
    }

    pub fn set_heat_islands_visible(&mut self, visible: bool) {
        self.toggles.heat_islands = visible;
    }

    pub fn tooltip(&self, pick: &PickRef) -> Option<Tooltip> {
        tooltip_for(pick, &self.anomalies, self.regions.as_ref())
    }

    /// Detail card for the selected anomaly; lists the nearest sites once
    /// analysis mode is on.
    pub fn selection_panel(&self) -> Result<SelectionPanel, ViewerError> {
        let id = self.selection.selected().ok_or(ViewerError::NothingSelected)?;
        selection_panel(
            &self.selection,
            &self.anomalies,
            self.regions.as_ref(),
            &self.sites,
            self.related_sites,
        )
        .ok_or_else(|| ViewerError::UnknownAnomaly(id.to_string()))
    }

    pub fn region_names(&self) -> Result<Vec<String>, ViewerError> {
        let regions = self
            .regions
            .as_ref()
            .ok_or(ViewerError::MissingReferenceData("regions"))?;
        Ok(regions.sorted_names().into_iter().map(str::to_owned).collect())
    }

    pub fn apply(&mut self, command: Command) -> Result<Outcome, ViewerError> {
        match command {
            Command::Select(id) => self.select_anomaly(&id)?,
            Command::Clear => self.clear_selection(),
            Command::Related => {
                self.find_related_sites()?;
                return Ok(Outcome::Selection(self.selection_panel()?));
            }
            Command::Info => return Ok(Outcome::Selection(self.selection_panel()?)),
            Command::Regions => return Ok(Outcome::Regions(self.region_names()?)),
            Command::Fly { lat, lon, zoom } => self.fly_to(lat, lon, zoom)?,
            Command::Goto { lat, lon } => {
                self.fly_to_target(lat, lon)?;
            }
            Command::Region(name) => self.focus_on_region(&name)?,
            Command::Cluster {
                primary,
                satellites,
            } => self.focus_on_cluster(primary, &satellites)?,
            Command::Pose(pose) => self.apply_user_pose(pose)?,
            Command::Hover(pick) => return Ok(Outcome::Tooltip(self.tooltip(&pick))),
            Command::Reset => self.reset(),
            Command::Heat(visible) => self.set_heat_islands_visible(visible),
            Command::Quit => return Ok(Outcome::Quit),
        }
        Ok(Outcome::Continue)
    }

    /// Composes the frame for `time` from the current state.
    pub fn compose(&self, time: Time) -> RenderFrame {
        let snapshot = FrameSnapshot {
            camera: *self.camera.pose(),
            selection: &self.selection,
            time,
        };
        let inputs = LayerInputs {
            anomalies: &self.anomalies,
            regions: self.regions.as_ref(),
            sites: &self.sites,
            boundaries: &self.boundaries,
            toggles: self.toggles,
            pulse: self.pulse,
            related_sites: self.related_sites,
        };
        compose_frame(&snapshot, &inputs)
    }

    /// The frame for `time`, unless it equals the last one returned.
    pub fn frame_if_changed(&mut self, time: Time) -> Option<RenderFrame> {
        let frame = self.compose(time);
        if self.last_emitted.as_ref() == Some(&frame) {
            return None;
        }
        self.last_emitted = Some(frame.clone());
        Some(frame)
    }
}

/// Logs a rejected command. Errors never end the session.
pub fn report(err: &ViewerError) {
    warn!(%err, "command rejected");
}
