//! Camera state controller.
//!
//! The controller is the only owner of the current [`CameraPose`]. Every
//! operation either replaces the pose wholesale (bumping the revision by one)
//! or leaves it untouched and returns an error; there is no partially applied
//! transition. Transitions are described, not run: the pose carries its
//! duration and interpolation mode and the rendering engine animates toward it.
//! A newer pose simply supersedes an in-flight one.

use foundation::bounds::GeoBounds;
use foundation::geo::{GeoPoint, InvalidCoordinate};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Interpolation {
    /// Jump, or interpolate linearly if the renderer insists.
    Linear,
    /// Zoom out, travel, zoom in.
    FlyTo,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPose {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
    /// Degrees from nadir.
    pub pitch: f64,
    /// Degrees clockwise from north.
    pub bearing: f64,
    pub transition_duration_ms: u32,
    pub interpolation: Interpolation,
}

impl CameraPose {
    pub fn target(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    /// Central Los Angeles, tilted for a 3D look.
    pub fn city_default() -> Self {
        Self {
            longitude: -118.25,
            latitude: 34.05,
            zoom: 10.0,
            pitch: 45.0,
            bearing: 0.0,
            transition_duration_ms: DEFAULT_TRANSITION_MS,
            interpolation: Interpolation::FlyTo,
        }
    }

    fn check(&self) -> Result<(), CameraError> {
        GeoPoint::try_new(self.latitude, self.longitude)?;
        check_zoom(self.zoom)?;
        if !(self.pitch.is_finite() && self.bearing.is_finite()) {
            return Err(CameraError::InvalidOrientation {
                pitch: self.pitch,
                bearing: self.bearing,
            });
        }
        Ok(())
    }
}

pub const DEFAULT_TRANSITION_MS: u32 = 2000;

/// Empirically tuned framing constants. None of these have a derivation
/// beyond "looks right"; they are exposed so deployments can adjust them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraTuning {
    pub default_pose: CameraPose,
    pub fly_to_zoom: f64,
    pub fly_to_pitch: f64,
    pub cluster_pitch: f64,
    /// Zoom used for a zero-spread cluster, and the offset of the log2 fit.
    pub cluster_base_zoom: f64,
    pub zoom_min: f64,
    pub zoom_max: f64,
    /// Added after clamping; positive values frame tighter.
    pub zoom_bias: f64,
    pub transition_ms: u32,
}

impl CameraTuning {
    /// Rejects tunings that would make framing meaningless: non-finite
    /// values, a negative or inverted zoom clamp, or an invalid default pose.
    pub fn validate(&self) -> Result<(), CameraError> {
        let values = [
            self.fly_to_zoom,
            self.fly_to_pitch,
            self.cluster_pitch,
            self.cluster_base_zoom,
            self.zoom_min,
            self.zoom_max,
            self.zoom_bias,
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(CameraError::InvalidTuning("non-finite tuning value"));
        }
        if self.zoom_min < 0.0 || self.zoom_min > self.zoom_max {
            return Err(CameraError::InvalidTuning("zoom clamp must satisfy 0 <= min <= max"));
        }
        check_zoom(self.fly_to_zoom)?;
        self.default_pose.check()
    }
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            default_pose: CameraPose::city_default(),
            fly_to_zoom: 14.0,
            fly_to_pitch: 60.0,
            cluster_pitch: 45.0,
            cluster_base_zoom: 14.0,
            zoom_min: 9.0,
            zoom_max: 14.0,
            zoom_bias: 0.8,
            transition_ms: DEFAULT_TRANSITION_MS,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, thiserror::Error)]
pub enum CameraError {
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),
    #[error("invalid zoom {0}")]
    InvalidZoom(f64),
    #[error("invalid orientation (pitch {pitch}, bearing {bearing})")]
    InvalidOrientation { pitch: f64, bearing: f64 },
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("invalid camera tuning: {0}")]
    InvalidTuning(&'static str),
}

fn check_zoom(zoom: f64) -> Result<(), CameraError> {
    if zoom.is_finite() && zoom >= 0.0 {
        Ok(())
    } else {
        Err(CameraError::InvalidZoom(zoom))
    }
}

/// Viewport that frames a primary point and its satellites.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClusterFrame {
    pub bounds: GeoBounds,
    pub center: GeoPoint,
    /// Larger axis extent in degrees.
    pub spread: f64,
    /// Zoom after clamping, before the bias.
    pub fitted_zoom: f64,
    pub zoom: f64,
}

/// Bounding-box framing for `{primary} ∪ satellites`.
///
/// Zoom is `clamp(14 - log2(spread * 100))` plus the bias: each zoom level
/// halves the visible span, so the log2 of the spread tracks the tile level
/// that fits it. Invalid satellites are skipped.
pub fn frame_cluster(
    primary: GeoPoint,
    satellites: &[GeoPoint],
    tuning: &CameraTuning,
) -> Result<ClusterFrame, CameraError> {
    tuning.validate()?;
    let primary = primary.validated()?;
    if satellites.is_empty() {
        return Err(CameraError::DegenerateGeometry("no satellite points to frame"));
    }

    let mut points = Vec::with_capacity(satellites.len() + 1);
    points.push(primary);
    for sat in satellites {
        if sat.is_valid() {
            points.push(*sat);
        } else {
            warn!(lat = sat.lat, lon = sat.lon, "focus_on_cluster: skipping invalid satellite");
        }
    }
    if points.len() == 1 {
        return Err(CameraError::DegenerateGeometry("no valid satellite points to frame"));
    }

    let bounds = GeoBounds::from_points(&points)
        .ok_or(CameraError::DegenerateGeometry("empty point set"))?;
    let spread = bounds.spread();
    let raw = if spread > 0.0 {
        tuning.cluster_base_zoom - (spread * 100.0).log2()
    } else {
        tuning.cluster_base_zoom
    };
    let fitted_zoom = raw.clamp(tuning.zoom_min, tuning.zoom_max);

    Ok(ClusterFrame {
        bounds,
        center: bounds.center(),
        spread,
        fitted_zoom,
        zoom: fitted_zoom + tuning.zoom_bias,
    })
}

#[derive(Debug, Clone)]
pub struct CameraController {
    pose: CameraPose,
    revision: u64,
    tuning: CameraTuning,
}

impl Default for CameraController {
    fn default() -> Self {
        let tuning = CameraTuning::default();
        Self {
            pose: tuning.default_pose,
            revision: 0,
            tuning,
        }
    }
}

impl CameraController {
    pub fn new(tuning: CameraTuning) -> Result<Self, CameraError> {
        tuning.validate()?;
        Ok(Self {
            pose: tuning.default_pose,
            revision: 0,
            tuning,
        })
    }

    pub fn pose(&self) -> &CameraPose {
        &self.pose
    }

    /// Number of pose replacements so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tuning(&self) -> &CameraTuning {
        &self.tuning
    }

    /// Flies to `(lat, lon)` with a steeper pitch. `zoom` defaults to the
    /// tuned fly-to zoom. Bearing is kept.
    pub fn fly_to(
        &mut self,
        lat: f64,
        lon: f64,
        zoom: Option<f64>,
    ) -> Result<&CameraPose, CameraError> {
        let zoom = zoom.unwrap_or(self.tuning.fly_to_zoom);
        let checked = GeoPoint::try_new(lat, lon)
            .map_err(CameraError::from)
            .and_then(|p| check_zoom(zoom).map(|()| p));
        let target = match checked {
            Ok(p) => p,
            Err(err) => {
                warn!(lat, lon, zoom, %err, "fly_to blocked");
                return Err(err);
            }
        };

        let pose = CameraPose {
            longitude: target.lon,
            latitude: target.lat,
            zoom,
            pitch: self.tuning.fly_to_pitch,
            bearing: self.pose.bearing,
            transition_duration_ms: self.tuning.transition_ms,
            interpolation: Interpolation::FlyTo,
        };
        Ok(self.replace(pose))
    }

    /// Frames `primary` together with `satellites` (see [`frame_cluster`]).
    pub fn focus_on_cluster(
        &mut self,
        primary: GeoPoint,
        satellites: &[GeoPoint],
    ) -> Result<&CameraPose, CameraError> {
        let frame = match frame_cluster(primary, satellites, &self.tuning) {
            Ok(f) => f,
            Err(err) => {
                warn!(%err, "focus_on_cluster blocked");
                return Err(err);
            }
        };
        debug!(
            center_lat = frame.center.lat,
            center_lon = frame.center.lon,
            spread = frame.spread,
            fitted_zoom = frame.fitted_zoom,
            zoom = frame.zoom,
            "focus_on_cluster framed"
        );

        let pose = CameraPose {
            longitude: frame.center.lon,
            latitude: frame.center.lat,
            zoom: frame.zoom,
            pitch: self.tuning.cluster_pitch,
            bearing: 0.0,
            transition_duration_ms: self.tuning.transition_ms,
            interpolation: Interpolation::FlyTo,
        };
        Ok(self.replace(pose))
    }

    pub fn reset(&mut self) -> &CameraPose {
        let pose = self.tuning.default_pose;
        self.replace(pose)
    }

    /// Takes over a pose produced by direct manipulation in the renderer
    /// (drag, scroll, rotate).
    pub fn apply_user_pose(&mut self, pose: CameraPose) -> Result<&CameraPose, CameraError> {
        if let Err(err) = pose.check() {
            warn!(%err, "apply_user_pose blocked");
            return Err(err);
        }
        Ok(self.replace(pose))
    }

    fn replace(&mut self, pose: CameraPose) -> &CameraPose {
        self.pose = pose;
        self.revision += 1;
        &self.pose
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CameraController, CameraError, CameraPose, CameraTuning, Interpolation, frame_cluster,
    };
    use foundation::geo::GeoPoint;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "expected {a} ~= {b}");
    }

    #[test]
    fn starts_at_city_default() {
        let cam = CameraController::default();
        assert_eq!(*cam.pose(), CameraPose::city_default());
        assert_eq!(cam.revision(), 0);
        assert!(cam.pose().pitch > 0.0);
    }

    #[test]
    fn fly_to_replaces_pose_once() {
        let mut cam = CameraController::default();
        let pose = *cam.fly_to(34.1, -118.3, None).unwrap();
        assert_eq!(
            pose,
            CameraPose {
                longitude: -118.3,
                latitude: 34.1,
                zoom: 14.0,
                pitch: 60.0,
                bearing: 0.0,
                transition_duration_ms: 2000,
                interpolation: Interpolation::FlyTo,
            }
        );
        assert_eq!(cam.revision(), 1);
    }

    #[test]
    fn fly_to_keeps_bearing_and_honours_zoom() {
        let mut cam = CameraController::default();
        let mut rotated = CameraPose::city_default();
        rotated.bearing = 30.0;
        cam.apply_user_pose(rotated).unwrap();
        let pose = *cam.fly_to(34.0, -118.0, Some(13.0)).unwrap();
        assert_eq!(pose.bearing, 30.0);
        assert_eq!(pose.zoom, 13.0);
    }

    #[test]
    fn invalid_fly_to_leaves_pose_untouched() {
        let mut cam = CameraController::default();
        cam.fly_to(34.0, -118.0, None).unwrap();
        let before = *cam.pose();

        assert!(matches!(
            cam.fly_to(91.0, 0.0, None),
            Err(CameraError::InvalidCoordinate(_))
        ));
        assert!(cam.fly_to(f64::NAN, 0.0, None).is_err());
        assert_eq!(
            cam.fly_to(34.0, -118.0, Some(-1.0)),
            Err(CameraError::InvalidZoom(-1.0))
        );

        assert_eq!(*cam.pose(), before);
        assert_eq!(cam.revision(), 1);
    }

    #[test]
    fn last_writer_wins() {
        let mut cam = CameraController::default();
        cam.fly_to(34.0, -118.0, None).unwrap();
        cam.fly_to(35.0, -117.0, None).unwrap();
        assert_eq!(cam.pose().target(), GeoPoint::new(35.0, -117.0));
        assert_eq!(cam.revision(), 2);
    }

    #[test]
    fn cluster_zero_spread_uses_base_zoom_plus_bias() {
        let p = GeoPoint::new(34.05, -118.25);
        let frame = frame_cluster(p, &[p, p], &CameraTuning::default()).unwrap();
        assert_eq!(frame.spread, 0.0);
        assert_eq!(frame.zoom, 14.0 + 0.8);
        assert_eq!(frame.center, p);
    }

    #[test]
    fn cluster_zoom_follows_log2_of_spread() {
        let tuning = CameraTuning::default();
        let primary = GeoPoint::new(34.0, -118.3);
        // 0.1° lon spread: 14 - log2(10) ≈ 10.678
        let frame = frame_cluster(primary, &[GeoPoint::new(34.05, -118.2)], &tuning).unwrap();
        assert_close(frame.spread, 0.1);
        assert_close(frame.fitted_zoom, 14.0 - 10f64.log2());
        assert_close(frame.zoom, frame.fitted_zoom + 0.8);
        assert_close(frame.center.lat, 34.025);
        assert_close(frame.center.lon, -118.25);
    }

    #[test]
    fn cluster_zoom_is_clamped() {
        let tuning = CameraTuning::default();
        let primary = GeoPoint::new(30.0, -120.0);
        let wide = frame_cluster(primary, &[GeoPoint::new(40.0, -110.0)], &tuning).unwrap();
        assert_eq!(wide.fitted_zoom, 9.0);
        assert_close(wide.zoom, 9.8);

        let tight = frame_cluster(primary, &[GeoPoint::new(30.0001, -120.0)], &tuning).unwrap();
        assert_eq!(tight.fitted_zoom, 14.0);
    }

    #[test]
    fn cluster_rejects_empty_and_invalid_input() {
        let mut cam = CameraController::default();
        let p = GeoPoint::new(34.0, -118.0);
        assert!(matches!(
            cam.focus_on_cluster(p, &[]),
            Err(CameraError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            cam.focus_on_cluster(GeoPoint::new(f64::NAN, 0.0), &[p]),
            Err(CameraError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            cam.focus_on_cluster(p, &[GeoPoint::new(95.0, 0.0)]),
            Err(CameraError::DegenerateGeometry(_))
        ));
        assert_eq!(cam.revision(), 0);
        assert_eq!(*cam.pose(), CameraPose::city_default());
    }

    #[test]
    fn cluster_skips_invalid_satellites() {
        let tuning = CameraTuning::default();
        let p = GeoPoint::new(34.0, -118.0);
        let s = GeoPoint::new(34.1, -118.1);
        let with_junk = frame_cluster(p, &[s, GeoPoint::new(0.0, 500.0)], &tuning).unwrap();
        let clean = frame_cluster(p, &[s], &tuning).unwrap();
        assert_eq!(with_junk, clean);
    }

    #[test]
    fn focus_on_cluster_sets_flat_bearing_and_cluster_pitch() {
        let mut cam = CameraController::default();
        let mut rotated = CameraPose::city_default();
        rotated.bearing = 90.0;
        cam.apply_user_pose(rotated).unwrap();
        let pose = *cam
            .focus_on_cluster(GeoPoint::new(34.0, -118.3), &[GeoPoint::new(34.05, -118.2)])
            .unwrap();
        assert_eq!(pose.bearing, 0.0);
        assert_eq!(pose.pitch, 45.0);
        assert_eq!(pose.interpolation, Interpolation::FlyTo);
        assert_eq!(pose.transition_duration_ms, 2000);
    }

    #[test]
    fn custom_tuning_is_honoured() {
        let tuning = CameraTuning {
            zoom_bias: -0.5,
            zoom_min: 5.0,
            ..CameraTuning::default()
        };
        let p = GeoPoint::new(34.05, -118.25);
        let frame = frame_cluster(p, &[p], &tuning).unwrap();
        assert_eq!(frame.zoom, 13.5);
    }

    #[test]
    fn unusable_tuning_is_rejected_up_front() {
        let inverted = CameraTuning {
            zoom_min: 15.0,
            ..CameraTuning::default()
        };
        assert!(matches!(
            CameraController::new(inverted),
            Err(CameraError::InvalidTuning(_))
        ));
        let p = GeoPoint::new(34.05, -118.25);
        assert!(matches!(
            frame_cluster(p, &[GeoPoint::new(34.1, -118.3)], &inverted),
            Err(CameraError::InvalidTuning(_))
        ));

        let nan_bound = CameraTuning {
            zoom_max: f64::NAN,
            ..CameraTuning::default()
        };
        assert!(CameraController::new(nan_bound).is_err());

        let mut bad_pose = CameraTuning::default();
        bad_pose.default_pose.latitude = 120.0;
        assert!(matches!(
            CameraController::new(bad_pose),
            Err(CameraError::InvalidCoordinate(_))
        ));

        let cam = CameraController::new(CameraTuning::default()).unwrap();
        assert_eq!(*cam.pose(), CameraPose::city_default());
    }

    #[test]
    fn reset_restores_default() {
        let mut cam = CameraController::default();
        cam.fly_to(40.0, -74.0, None).unwrap();
        assert_eq!(*cam.reset(), CameraPose::city_default());
        assert_eq!(cam.revision(), 2);
    }

    #[test]
    fn user_pose_is_validated() {
        let mut cam = CameraController::default();
        let mut bad = CameraPose::city_default();
        bad.latitude = -95.0;
        assert!(cam.apply_user_pose(bad).is_err());
        bad = CameraPose::city_default();
        bad.pitch = f64::INFINITY;
        assert!(matches!(
            cam.apply_user_pose(bad),
            Err(CameraError::InvalidOrientation { .. })
        ));
        assert_eq!(cam.revision(), 0);
    }

    fn la_points() -> impl Strategy<Value = Vec<GeoPoint>> {
        prop::collection::vec((33.6f64..34.4, -118.7f64..-117.9), 1..8)
            .prop_map(|v| v.into_iter().map(|(lat, lon)| GeoPoint::new(lat, lon)).collect())
    }

    proptest! {
        #[test]
        fn framing_ignores_satellite_order(
            (sats, shuffled) in la_points().prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
        ) {
            let primary = GeoPoint::new(34.05, -118.25);
            let mut a = CameraController::default();
            let mut b = CameraController::default();
            let pa = *a.focus_on_cluster(primary, &sats).unwrap();
            let pb = *b.focus_on_cluster(primary, &shuffled).unwrap();
            prop_assert_eq!(pa, pb);
        }

        #[test]
        fn framing_ignores_duplicate_satellites(sats in la_points(), dup in any::<prop::sample::Index>()) {
            let primary = GeoPoint::new(34.05, -118.25);
            let mut with_dup = sats.clone();
            with_dup.push(sats[dup.index(sats.len())]);
            let tuning = CameraTuning::default();
            prop_assert_eq!(
                frame_cluster(primary, &sats, &tuning).unwrap(),
                frame_cluster(primary, &with_dup, &tuning).unwrap()
            );
        }

        #[test]
        fn framed_zoom_stays_within_biased_clamp(sats in la_points()) {
            let tuning = CameraTuning::default();
            let frame = frame_cluster(GeoPoint::new(34.05, -118.25), &sats, &tuning).unwrap();
            prop_assert!(frame.zoom >= tuning.zoom_min + tuning.zoom_bias);
            prop_assert!(frame.zoom <= tuning.zoom_max + tuning.zoom_bias);
            prop_assert!(frame.bounds.contains(&frame.center));
        }
    }
}
