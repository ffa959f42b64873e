//! The single-threaded host loop.

use runtime::animation::AnimationLoop;
use runtime::clock::MonotonicClock;
use runtime::frame::Frame;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::command::Command;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::loader::{spawn_initial_loads, DataEvent, Loader};
use crate::session::{report, MapSession, Outcome};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames_seen: u64,
    pub frames_emitted: u64,
    pub commands: u64,
}

#[derive(Serialize)]
struct TooltipLine<'a> {
    tooltip: &'a Option<layers::tooltip::Tooltip>,
}

#[derive(Serialize)]
struct SelectionLine<'a> {
    selection: &'a layers::panel::SelectionPanel,
}

#[derive(Serialize)]
struct RegionsLine<'a> {
    regions: &'a [String],
}

/// One stdin line, without its terminator. Bytes that are not UTF-8 reject
/// that line only.
fn decode_line(mut raw: Vec<u8>) -> Result<String, ViewerError> {
    if raw.last() == Some(&b'\r') {
        raw.pop();
    }
    String::from_utf8(raw)
        .map_err(|e| ViewerError::InvalidCommand(format!("line is not UTF-8: {e}")))
}

async fn write_json_line<W, T>(out: &mut W, value: &T) -> Result<(), ViewerError>
where
    W: AsyncWrite + Unpin,
    T: Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(value)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await?;
    Ok(())
}

/// Multiplexes commands, data arrivals and animation frames until `quit`,
/// the frame bound, or the end of both input and frames.
///
/// Data is applied before anything else; a due frame is sampled before the
/// next command, so a busy input cannot hold back rendering.
///
/// When input ends without a frame bound the loop exits; with a bound it
/// keeps rendering until the bound is reached.
pub async fn drive<R, W>(
    session: &mut MapSession,
    mut frames: watch::Receiver<Frame>,
    mut data: mpsc::Receiver<DataEvent>,
    input: R,
    out: &mut W,
    max_frames: Option<u64>,
) -> Result<RunStats, ViewerError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut stats = RunStats::default();
    let mut segments = input.split(b'\n');
    let mut input_open = true;
    let mut data_open = true;

    loop {
        tokio::select! {
            biased;

            event = data.recv(), if data_open => match event {
                Some(event) => session.apply_data(event),
                None => data_open = false,
            },

            changed = frames.changed() => {
                if changed.is_err() {
                    debug!("animation loop stopped");
                    break;
                }
                let frame = *frames.borrow_and_update();
                stats.frames_seen += 1;
                if let Some(render) = session.frame_if_changed(frame.time) {
                    write_json_line(out, &render).await?;
                    stats.frames_emitted += 1;
                }
                if max_frames.is_some_and(|max| stats.frames_seen >= max) {
                    break;
                }
            }

            segment = segments.next_segment(), if input_open => {
                let Some(raw) = segment? else {
                    debug!("input closed");
                    input_open = false;
                    if max_frames.is_none() {
                        break;
                    }
                    continue;
                };
                let line = match decode_line(raw) {
                    Ok(line) => line,
                    Err(err) => {
                        stats.commands += 1;
                        report(&err);
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                stats.commands += 1;
                let outcome = line
                    .parse::<Command>()
                    .and_then(|cmd| session.apply(cmd));
                match outcome {
                    Ok(Outcome::Continue) => {}
                    Ok(Outcome::Tooltip(tip)) => {
                        write_json_line(out, &TooltipLine { tooltip: &tip }).await?;
                    }
                    Ok(Outcome::Selection(panel)) => {
                        write_json_line(out, &SelectionLine { selection: &panel }).await?;
                    }
                    Ok(Outcome::Regions(names)) => {
                        write_json_line(out, &RegionsLine { regions: &names }).await?;
                    }
                    Ok(Outcome::Quit) => break,
                    Err(err) => report(&err),
                }
            }
        }
    }
    Ok(stats)
}

/// Runs the viewer against stdin and stdout.
pub async fn run(config: ViewerConfig) -> Result<RunStats, ViewerError> {
    config.access_token()?;
    let mut session = MapSession::from_config(&config)?;

    let (tx, rx) = mpsc::channel(8);
    spawn_initial_loads(
        Loader::new(),
        config.feed_url(),
        config.neighborhoods.clone(),
        tx,
    );

    let (handle, frames) = AnimationLoop::new(config.frame_rate).start(MonotonicClock::new());
    info!(frame_rate = config.frame_rate, "viewer started");

    let input = tokio::io::BufReader::new(tokio::io::stdin());
    let mut out = tokio::io::stdout();
    let result = drive(&mut session, frames, rx, input, &mut out, config.max_frames).await;

    handle.stop().await;
    if let Ok(stats) = &result {
        info!(
            frames = stats.frames_seen,
            emitted = stats.frames_emitted,
            commands = stats.commands,
            "viewer stopped"
        );
    }
    result
}

#[cfg(test)]
mod tests {
    use super::drive;
    use crate::loader::DataEvent;
    use crate::session::MapSession;
    use formats::feed::HeatIslandFeed;
    use foundation::geo::GeoPoint;
    use foundation::time::Time;
    use layers::compose::BoundaryDocuments;
    use runtime::animation::AnimationLoop;
    use runtime::clock::MonotonicClock;
    use runtime::frame::Frame;
    use scene::anomaly::{Anomaly, AnomalyId, AnomalySet, Severity};
    use scene::camera::CameraTuning;
    use scene::region::{Polygon, RegionCatalog, RegionPolygon};
    use serde_json::Value;
    use tokio::sync::{mpsc, watch};

    fn feed() -> HeatIslandFeed {
        HeatIslandFeed {
            anomalies: AnomalySet::new(vec![Anomaly {
                id: AnomalyId::new("A"),
                location: GeoPoint::new(34.05, -118.25),
                intensity: 6.2,
                severity: Severity::Extreme,
                avg_temp_c: Some(41.0),
                max_temp_c: None,
                size_pixels: None,
            }]),
            summary: Default::default(),
        }
    }

    fn session() -> MapSession {
        MapSession::new(CameraTuning::default(), BoundaryDocuments::default(), 3).unwrap()
    }

    fn json_lines(out: &[u8]) -> Vec<Value> {
        std::str::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn emits_only_changed_frames_until_the_bound() {
        let mut s = session();
        let (handle, frames) = AnimationLoop::new(60.0).start(MonotonicClock::new());
        let (_tx, rx) = mpsc::channel::<DataEvent>(1);
        let mut out = Vec::new();

        let stats = drive(&mut s, frames, rx, &b""[..], &mut out, Some(5)).await.unwrap();
        handle.stop().await;

        assert_eq!(stats.frames_seen, 5);
        assert_eq!(stats.frames_emitted, 1);
        let lines = json_lines(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["camera"]["latitude"], 34.05);
    }

    #[tokio::test(start_paused = true)]
    async fn data_and_commands_shape_the_frames() {
        let mut s = session();
        let (handle, frames) = AnimationLoop::new(60.0).start(MonotonicClock::new());
        let (tx, rx) = mpsc::channel(1);
        tx.send(DataEvent::Anomalies(feed())).await.unwrap();
        drop(tx);

        let input = &b"bogus\nselect A\nrelated\nhover anomaly A\n"[..];
        let mut out = Vec::new();
        let stats = drive(&mut s, frames, rx, input, &mut out, Some(3)).await.unwrap();
        handle.stop().await;

        assert_eq!(stats.commands, 4);
        assert!(s.selection().analysis());
        let lines = json_lines(&out);
        let panel = lines.iter().find(|l| l.get("selection").is_some()).unwrap();
        assert_eq!(panel["selection"]["id"], "A");
        assert_eq!(panel["selection"]["nearest"].as_array().unwrap().len(), 3);
        let tip = lines.iter().find(|l| l.get("tooltip").is_some()).unwrap();
        assert_eq!(tip["tooltip"]["kind"], "anomaly");
        let last = lines.last().unwrap();
        let ids: Vec<&str> = last["layers"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.iter().filter(|id| id.starts_with("related-arc-")).count(), 3);
        assert_eq!(ids.iter().filter(|id| id.starts_with("related-site-")).count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_stops_without_a_bound() {
        let mut s = session();
        let (handle, frames) = AnimationLoop::default().start(MonotonicClock::new());
        let (_tx, rx) = mpsc::channel::<DataEvent>(1);
        let mut out = Vec::new();

        let stats = drive(&mut s, frames, rx, &b"heat off\nquit\nselect A\n"[..], &mut out, None)
            .await
            .unwrap();
        handle.stop().await;
        assert_eq!(stats.commands, 2);
        assert!(!s.toggles().heat_islands);
    }

    #[tokio::test(start_paused = true)]
    async fn undecodable_line_is_rejected_and_input_continues() {
        let mut s = session();
        let (_frames_tx, frames) = watch::channel(Frame::new(0, Time::ZERO));
        let (_tx, rx) = mpsc::channel::<DataEvent>(1);
        let mut out = Vec::new();

        let input = &b"\xff\xfe\nheat off\r\nquit\n"[..];
        let stats = drive(&mut s, frames, rx, input, &mut out, None).await.unwrap();

        assert_eq!(stats.commands, 3);
        assert!(!s.toggles().heat_islands);
        assert!(out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn due_frame_is_rendered_before_pending_commands() {
        let mut s = session();
        let (frames_tx, frames) = watch::channel(Frame::new(0, Time::ZERO));
        frames_tx.send(Frame::new(1, Time(16.0))).unwrap();
        let (_tx, rx) = mpsc::channel::<DataEvent>(1);
        let mut out = Vec::new();

        let stats = drive(&mut s, frames, rx, &b"heat off\nquit\n"[..], &mut out, None)
            .await
            .unwrap();

        assert_eq!(stats.frames_seen, 1);
        assert_eq!(stats.commands, 2);
        let lines = json_lines(&out);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].get("camera").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn regions_command_lists_loaded_names() {
        let mut s = session();
        s.set_regions(RegionCatalog::new(vec![RegionPolygon::new(
            "Downtown",
            vec![Polygon::new(vec![vec![
                GeoPoint::new(34.0, -118.3),
                GeoPoint::new(34.0, -118.2),
                GeoPoint::new(34.1, -118.2),
            ]])],
        )]));
        let (_frames_tx, frames) = watch::channel(Frame::new(0, Time::ZERO));
        let (_tx, rx) = mpsc::channel::<DataEvent>(1);
        let mut out = Vec::new();

        drive(&mut s, frames, rx, &b"regions\ninfo\nquit\n"[..], &mut out, None)
            .await
            .unwrap();

        let lines = json_lines(&out);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["regions"], serde_json::json!(["Downtown"]));
    }
}
