use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::motion_detector::{DetectionError, MotionDetector};
use crate::pipeline::pipeline_error::PipelineError;
use crate::pipeline::pipeline_executor::{PipelineConfig, PipelineExecutor, PipelineReport};
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::stage_message::StageMessage;
use crate::rendering::frame_renderer::{FrameRenderer, RenderError, RenderOutcome};
use crate::shared::annotated_frame::AnnotatedFrame;
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// Runs the pipeline as three concurrent stages.
///
/// Layout: `source thread → detector thread → calling thread [render]`
///
/// Stages hand values over `crossbeam-channel` queues and block on receive.
/// Shutdown is broadcast through `PipelineConfig::cancelled`; dropping the
/// render queue's receiver also unblocks upstream senders.
pub struct ThreadedPipelineExecutor;

impl ThreadedPipelineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedPipelineExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineExecutor for ThreadedPipelineExecutor {
    fn execute(
        &self,
        reader: Box<dyn VideoReader>,
        input: &Path,
        detector: Box<dyn MotionDetector>,
        mut renderer: FrameRenderer,
        config: PipelineConfig,
        logger: &mut dyn PipelineLogger,
    ) -> Result<PipelineReport, PipelineError> {
        let (frame_tx, frame_rx) = stage_queue::<Frame>(config.queue_capacity);
        let (detected_tx, detected_rx) = stage_queue::<AnnotatedFrame>(config.queue_capacity);

        logger.info(&format!("Starting pipeline on {}", input.display()));
        let source_handle = spawn_source(
            reader,
            input.to_path_buf(),
            frame_tx,
            config.frame_delay,
            Arc::clone(&config.cancelled),
        );
        let detector_handle =
            spawn_detector(detector, frame_rx, detected_tx, Arc::clone(&config.cancelled));

        let terminal = run_render_loop(&detected_rx, &mut renderer, logger);
        if !matches!(terminal, RenderTerminal::End) {
            config.cancelled.store(true, Ordering::Relaxed);
        }

        drop(detected_rx);
        renderer.close();

        let report = PipelineReport {
            frames_rendered: renderer.rendered(),
            ..PipelineReport::default()
        };
        join_threads(
            source_handle,
            detector_handle,
            terminal,
            report,
            &config.cancelled,
            logger,
        )
    }
}

fn stage_queue<T>(capacity: Option<usize>) -> (Sender<StageMessage<T>>, Receiver<StageMessage<T>>) {
    match capacity {
        Some(cap) => crossbeam_channel::bounded(cap),
        None => crossbeam_channel::unbounded(),
    }
}

struct SourceOutcome {
    frames_read: usize,
    error: Option<String>,
}

fn spawn_source(
    mut reader: Box<dyn VideoReader>,
    input: PathBuf,
    frame_tx: Sender<StageMessage<Frame>>,
    frame_delay: Duration,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<SourceOutcome> {
    thread::spawn(move || {
        let outcome = run_source(&mut *reader, &input, &frame_tx, frame_delay, &cancelled);
        reader.close();
        outcome
    })
}

/// Reads frames in order and ends with exactly one terminal message.
fn run_source(
    reader: &mut dyn VideoReader,
    input: &Path,
    frame_tx: &Sender<StageMessage<Frame>>,
    frame_delay: Duration,
    cancelled: &AtomicBool,
) -> SourceOutcome {
    if let Err(e) = reader.open(input) {
        let reason = format!("cannot open {}: {e}", input.display());
        log::error!("{reason}");
        let _ = frame_tx.send(StageMessage::Failed(reason.clone()));
        return SourceOutcome {
            frames_read: 0,
            error: Some(reason),
        };
    }

    let mut frames_read = 0;
    let mut error = None;
    for result in reader.frames() {
        if cancelled.load(Ordering::Relaxed) {
            log::debug!("Source cancelled after {frames_read} frames");
            break;
        }
        match result {
            Ok(frame) => {
                if frame_tx.send(StageMessage::Item(frame)).is_err() {
                    break;
                }
                frames_read += 1;
                if !frame_delay.is_zero() {
                    thread::sleep(frame_delay);
                }
            }
            Err(e) => {
                let reason = format!("decode failed after {frames_read} frames: {e}");
                log::error!("{reason}");
                error = Some(reason);
                break;
            }
        }
    }

    let terminal = match &error {
        Some(reason) => StageMessage::Failed(reason.clone()),
        None => StageMessage::End,
    };
    let _ = frame_tx.send(terminal);
    log::debug!("Source finished ({frames_read} frames)");
    SourceOutcome { frames_read, error }
}

#[derive(Default)]
struct DetectorOutcome {
    emitted: usize,
    detect_ms: Vec<f64>,
    error: Option<DetectionError>,
}

fn spawn_detector(
    mut detector: Box<dyn MotionDetector>,
    frame_rx: Receiver<StageMessage<Frame>>,
    detected_tx: Sender<StageMessage<AnnotatedFrame>>,
    cancelled: Arc<AtomicBool>,
) -> JoinHandle<DetectorOutcome> {
    thread::spawn(move || run_detector(&mut *detector, &frame_rx, &detected_tx, &cancelled))
}

/// Scores frames until a terminal message, a detection error or a cancel,
/// then forwards exactly one terminal message.
fn run_detector(
    detector: &mut dyn MotionDetector,
    frame_rx: &Receiver<StageMessage<Frame>>,
    detected_tx: &Sender<StageMessage<AnnotatedFrame>>,
    cancelled: &AtomicBool,
) -> DetectorOutcome {
    let mut outcome = DetectorOutcome::default();

    let terminal = loop {
        if cancelled.load(Ordering::Relaxed) {
            break StageMessage::End;
        }
        let frame = match frame_rx.recv() {
            Ok(StageMessage::Item(frame)) => frame,
            Ok(StageMessage::End) => break StageMessage::End,
            Ok(StageMessage::Failed(reason)) => break StageMessage::Failed(reason),
            Err(_) => break StageMessage::Failed("source stage exited without an end marker".into()),
        };

        let start = Instant::now();
        match detector.process_frame(frame) {
            Ok(Some(annotated)) => {
                outcome.detect_ms.push(start.elapsed().as_secs_f64() * 1000.0);
                if detected_tx.send(StageMessage::Item(annotated)).is_err() {
                    break StageMessage::End;
                }
                outcome.emitted += 1;
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("Detection failed: {e}");
                cancelled.store(true, Ordering::Relaxed);
                let reason = e.to_string();
                outcome.error = Some(e);
                break StageMessage::Failed(reason);
            }
        }
    };

    let _ = detected_tx.send(terminal);
    log::debug!("Detector finished ({} frames emitted)", outcome.emitted);
    outcome
}

/// Why the render loop stopped.
#[derive(Debug)]
enum RenderTerminal {
    End,
    Failed(String),
    Cancelled,
    Disconnected,
    Error(RenderError),
}

fn run_render_loop(
    detected_rx: &Receiver<StageMessage<AnnotatedFrame>>,
    renderer: &mut FrameRenderer,
    logger: &mut dyn PipelineLogger,
) -> RenderTerminal {
    loop {
        let annotated = match detected_rx.recv() {
            Ok(StageMessage::Item(annotated)) => annotated,
            Ok(StageMessage::End) => return RenderTerminal::End,
            Ok(StageMessage::Failed(reason)) => return RenderTerminal::Failed(reason),
            Err(_) => return RenderTerminal::Disconnected,
        };

        logger.metric("motion_regions", annotated.boxes.len() as f64);
        logger.metric("detector_queue_depth", detected_rx.len() as f64);

        let start = Instant::now();
        let outcome = renderer.render(annotated);
        logger.timing("render", start.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            Ok(RenderOutcome::Continue) => logger.progress(renderer.rendered(), 0),
            Ok(RenderOutcome::Cancelled) => return RenderTerminal::Cancelled,
            Err(e) => {
                log::error!("Rendering failed: {e}");
                return RenderTerminal::Error(e);
            }
        }
    }
}

/// Joins both worker threads and picks the error to surface.
///
/// Priority: render, source, detection, panics, then any unclaimed
/// upstream failure.
fn join_threads(
    source_handle: JoinHandle<SourceOutcome>,
    detector_handle: JoinHandle<DetectorOutcome>,
    terminal: RenderTerminal,
    mut report: PipelineReport,
    cancelled: &AtomicBool,
    logger: &mut dyn PipelineLogger,
) -> Result<PipelineReport, PipelineError> {
    let source = source_handle.join();
    let detector = detector_handle.join();

    if let RenderTerminal::Error(e) = terminal {
        return Err(PipelineError::Render(e));
    }

    let source = source.map_err(|_| PipelineError::StagePanicked("source"));
    let detector = detector.map_err(|_| PipelineError::StagePanicked("detector"));

    if let Ok(SourceOutcome {
        error: Some(reason),
        ..
    }) = &source
    {
        return Err(PipelineError::Source(reason.clone()));
    }
    let detector = match detector {
        Ok(DetectorOutcome { error: Some(e), .. }) => return Err(PipelineError::Detection(e)),
        other => other?,
    };
    let source = source?;

    for ms in &detector.detect_ms {
        logger.timing("detect", *ms);
    }
    report.frames_read = source.frames_read;
    report.frames_annotated = detector.emitted;

    match terminal {
        RenderTerminal::Failed(reason) => Err(PipelineError::Upstream(reason)),
        RenderTerminal::Disconnected => Err(PipelineError::Upstream(
            "detector stage exited without an end marker".into(),
        )),
        _ => {
            report.cancelled = cancelled.load(Ordering::Relaxed);
            logger.info(&format!(
                "Pipeline finished: {} read, {} scored, {} rendered{}",
                report.frames_read,
                report.frames_annotated,
                report.frames_rendered,
                if report.cancelled { " (cancelled)" } else { "" }
            ));
            Ok(report)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::infrastructure::frame_difference_detector::{
        DetectorConfig, FrameDifferenceDetector,
    };
    use crate::pipeline::pipeline_logger::{NullPipelineLogger, StdoutPipelineLogger};
    use crate::rendering::frame_renderer::tests::{Recorded, RecordingDisplay};
    use crate::rendering::frame_renderer::RenderConfig;
    use crate::rendering::infrastructure::annotator_factory::RenderMode;
    use crate::shared::bounding_box::BoundingBox;
    use crate::shared::synthetic::{moving_square_scene, square_frame, square_position, SQUARE_SIDE};
    use crate::shared::video_metadata::VideoMetadata;
    use std::sync::Mutex;

    // --- Stubs ---

    struct StubReader {
        frames: Vec<Frame>,
        fail_open: bool,
        fail_after: Option<usize>,
        closed: Arc<AtomicBool>,
    }

    impl StubReader {
        fn new(frames: Vec<Frame>) -> Self {
            Self {
                frames,
                fail_open: false,
                fail_after: None,
                closed: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    impl VideoReader for StubReader {
        fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err(format!("no such file: {}", path.display()).into());
            }
            Ok(VideoMetadata {
                width: 120,
                height: 100,
                fps: 0.0,
                total_frames: self.frames.len(),
                codec: String::new(),
                source_path: Some(path.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let fail_after = self.fail_after;
            Box::new(self.frames.drain(..).enumerate().map(
                move |(i, f)| -> Result<Frame, Box<dyn std::error::Error>> {
                    if fail_after.is_some_and(|n| i >= n) {
                        Err("corrupt packet".into())
                    } else {
                        Ok(f)
                    }
                },
            ))
        }

        fn close(&mut self) {
            self.closed.store(true, Ordering::Relaxed);
        }
    }

    fn detector() -> Box<dyn MotionDetector> {
        Box::new(FrameDifferenceDetector::new(DetectorConfig::default()).unwrap())
    }

    fn renderer(cancel_after: Option<usize>) -> (FrameRenderer, Arc<Mutex<Recorded>>) {
        let (display, recorded) = RecordingDisplay::new(cancel_after);
        let config = RenderConfig {
            mode: RenderMode::Boxes,
            timestamp: false,
            wait: Duration::ZERO,
            ..RenderConfig::default()
        };
        (FrameRenderer::from_config(&config, Box::new(display)), recorded)
    }

    fn fast_config(queue_capacity: Option<usize>) -> PipelineConfig {
        PipelineConfig {
            frame_delay: Duration::ZERO,
            queue_capacity,
            ..PipelineConfig::default()
        }
    }

    fn run(
        reader: StubReader,
        cancel_after: Option<usize>,
        config: PipelineConfig,
    ) -> (Result<PipelineReport, PipelineError>, Arc<Mutex<Recorded>>) {
        let (renderer, recorded) = renderer(cancel_after);
        let result = ThreadedPipelineExecutor::new().execute(
            Box::new(reader),
            Path::new("scene"),
            detector(),
            renderer,
            config,
            &mut NullPipelineLogger,
        );
        (result, recorded)
    }

    fn is_green(frame: &Frame, x: usize, y: usize) -> bool {
        let p = frame.as_ndarray();
        [p[[y, x, 0]], p[[y, x, 1]], p[[y, x, 2]]] == [0, 255, 0]
    }

    // --- End to end ---

    #[test]
    fn test_moving_square_scene_end_to_end() {
        let scene = moving_square_scene();
        let reader = StubReader::new(scene.clone());
        let closed = Arc::clone(&reader.closed);

        let (result, recorded) = run(reader, None, fast_config(Some(8)));
        let report = result.unwrap();

        assert_eq!(
            report,
            PipelineReport {
                frames_read: 10,
                frames_annotated: 9,
                frames_rendered: 9,
                cancelled: false,
            }
        );
        assert!(closed.load(Ordering::Relaxed));

        let rec = recorded.lock().unwrap();
        assert_eq!(rec.closes, 1);
        let indices: Vec<usize> = rec.frames.iter().map(|f| f.index()).collect();
        assert_eq!(indices, (1..10).collect::<Vec<_>>());

        // Still frames come through untouched.
        for shown in &rec.frames[..4] {
            assert_eq!(shown, &scene[shown.index()]);
        }
        // Moving frames carry an outline enclosing the square.
        for shown in &rec.frames[4..] {
            let green: Vec<(usize, usize)> = (0..100)
                .flat_map(|y| (0..120).map(move |x| (x, y)))
                .filter(|&(x, y)| is_green(shown, x, y))
                .collect();
            assert!(!green.is_empty(), "frame {}", shown.index());

            let (x, y) = square_position(shown.index());
            let square = BoundingBox::new(x, y, SQUARE_SIDE, SQUARE_SIDE);
            let min_x = green.iter().map(|p| p.0).min().unwrap() as i32;
            let max_x = green.iter().map(|p| p.0).max().unwrap() as i32;
            let min_y = green.iter().map(|p| p.1).min().unwrap() as i32;
            let max_y = green.iter().map(|p| p.1).max().unwrap() as i32;
            let outline = BoundingBox::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1);
            assert!(outline.encloses(&square), "frame {}: {outline:?}", shown.index());
        }
    }

    #[test]
    fn test_unbounded_queues_give_same_result() {
        let (result, recorded) = run(
            StubReader::new(moving_square_scene()),
            None,
            fast_config(None),
        );
        assert_eq!(result.unwrap().frames_rendered, 9);
        assert_eq!(recorded.lock().unwrap().frames.len(), 9);
    }

    #[test]
    fn test_single_frame_renders_nothing() {
        let (result, recorded) = run(
            StubReader::new(vec![square_frame(32, 32, None, 0)]),
            None,
            fast_config(Some(1)),
        );
        let report = result.unwrap();
        assert_eq!((report.frames_read, report.frames_rendered), (1, 0));
        assert!(recorded.lock().unwrap().frames.is_empty());
    }

    #[test]
    fn test_empty_source_completes() {
        let (result, recorded) = run(StubReader::new(Vec::new()), None, fast_config(Some(8)));
        assert_eq!(result.unwrap(), PipelineReport::default());
        assert_eq!(recorded.lock().unwrap().closes, 1);
    }

    // --- Failure and cancellation ---

    #[test]
    fn test_open_failure_surfaces_source_error() {
        let mut reader = StubReader::new(moving_square_scene());
        reader.fail_open = true;
        let closed = Arc::clone(&reader.closed);

        let (result, recorded) = run(reader, None, fast_config(Some(8)));

        match result {
            Err(PipelineError::Source(reason)) => assert!(reason.contains("scene")),
            other => panic!("expected source error, got {other:?}"),
        }
        assert!(closed.load(Ordering::Relaxed));
        let rec = recorded.lock().unwrap();
        assert!(rec.frames.is_empty());
        assert_eq!(rec.closes, 1);
    }

    #[test]
    fn test_decode_failure_mid_stream_is_source_error() {
        let mut reader = StubReader::new(moving_square_scene());
        reader.fail_after = Some(3);

        let (result, recorded) = run(reader, None, fast_config(Some(8)));

        assert!(matches!(result, Err(PipelineError::Source(_))));
        assert_eq!(recorded.lock().unwrap().frames.len(), 2);
    }

    #[test]
    fn test_shape_change_is_detection_error() {
        let frames = vec![
            square_frame(64, 48, None, 0),
            square_frame(64, 48, None, 1),
            square_frame(32, 48, None, 2),
            square_frame(64, 48, None, 3),
        ];
        let (result, recorded) = run(StubReader::new(frames), None, fast_config(Some(8)));

        assert!(matches!(
            result,
            Err(PipelineError::Detection(DetectionError::ShapeMismatch { index: 2, .. }))
        ));
        assert_eq!(recorded.lock().unwrap().frames.len(), 1);
    }

    #[test]
    fn test_user_cancel_stops_all_stages() {
        let frames: Vec<Frame> = (0..500).map(|i| square_frame(32, 32, None, i)).collect();
        let config = fast_config(Some(2));
        let cancelled = Arc::clone(&config.cancelled);

        let (result, recorded) = run(StubReader::new(frames), Some(3), config);

        let report = result.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.frames_rendered, 3);
        assert!(report.frames_read < 500);
        assert!(cancelled.load(Ordering::Relaxed));
        assert_eq!(recorded.lock().unwrap().closes, 1);
    }

    #[test]
    fn test_preset_cancel_token_ends_quietly() {
        let config = fast_config(Some(8));
        config.cancelled.store(true, Ordering::Relaxed);

        let (result, recorded) = run(StubReader::new(moving_square_scene()), None, config);

        let report = result.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.frames_read, 0);
        assert!(recorded.lock().unwrap().frames.is_empty());
    }

    #[test]
    fn test_logger_receives_stage_timings() {
        let (renderer, _recorded) = renderer(None);
        let mut logger = StdoutPipelineLogger::new(1);
        let report = ThreadedPipelineExecutor::new()
            .execute(
                Box::new(StubReader::new(moving_square_scene())),
                Path::new("scene"),
                detector(),
                renderer,
                fast_config(Some(8)),
                &mut logger,
            )
            .unwrap();

        assert_eq!(logger.timings_for("detect").unwrap().len(), report.frames_annotated);
        assert_eq!(logger.timings_for("render").unwrap().len(), report.frames_rendered);
        let regions = logger.metrics_for("motion_regions").unwrap();
        assert_eq!(regions, &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        assert_eq!(logger.frames(), 9);
    }

    // --- Stage contracts ---

    #[test]
    fn test_detector_forwards_end_exactly_once_at_tail() {
        let (frame_tx, frame_rx) = crossbeam_channel::unbounded();
        let (detected_tx, detected_rx) = crossbeam_channel::unbounded();
        for frame in moving_square_scene() {
            frame_tx.send(StageMessage::Item(frame)).unwrap();
        }
        frame_tx.send(StageMessage::End).unwrap();

        let mut detector = FrameDifferenceDetector::new(DetectorConfig::default()).unwrap();
        let outcome = run_detector(&mut detector, &frame_rx, &detected_tx, &AtomicBool::new(false));
        drop(detected_tx);

        let out: Vec<StageMessage<AnnotatedFrame>> = detected_rx.iter().collect();
        assert_eq!(outcome.emitted, 9);
        assert_eq!(out.len(), 10);
        assert_eq!(out.iter().filter(|m| m.is_terminal()).count(), 1);
        assert_eq!(out.last(), Some(&StageMessage::End));
    }

    #[test]
    fn test_detector_forwards_upstream_failure() {
        let (frame_tx, frame_rx) = crossbeam_channel::unbounded();
        let (detected_tx, detected_rx) = crossbeam_channel::unbounded();
        frame_tx.send(StageMessage::Item(square_frame(16, 16, None, 0))).unwrap();
        frame_tx.send(StageMessage::Failed("disk gone".into())).unwrap();

        let mut detector = FrameDifferenceDetector::new(DetectorConfig::default()).unwrap();
        run_detector(&mut detector, &frame_rx, &detected_tx, &AtomicBool::new(false));
        drop(detected_tx);

        let out: Vec<_> = detected_rx.iter().collect();
        assert_eq!(out, vec![StageMessage::Failed("disk gone".into())]);
    }

    #[test]
    fn test_detector_treats_vanished_source_as_failure() {
        let (frame_tx, frame_rx) = crossbeam_channel::unbounded::<StageMessage<Frame>>();
        let (detected_tx, detected_rx) = crossbeam_channel::unbounded();
        drop(frame_tx);

        let mut detector = FrameDifferenceDetector::new(DetectorConfig::default()).unwrap();
        run_detector(&mut detector, &frame_rx, &detected_tx, &AtomicBool::new(false));

        assert!(matches!(detected_rx.try_recv(), Ok(StageMessage::Failed(_))));
    }

    #[test]
    fn test_source_ends_with_single_end_marker() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let mut reader = StubReader::new(moving_square_scene());
        let outcome = run_source(
            &mut reader,
            Path::new("scene"),
            &tx,
            Duration::ZERO,
            &AtomicBool::new(false),
        );
        drop(tx);

        let out: Vec<StageMessage<Frame>> = rx.iter().collect();
        assert_eq!(outcome.frames_read, 10);
        assert!(outcome.error.is_none());
        assert_eq!(out.len(), 11);
        assert_eq!(out.iter().filter(|m| m.is_terminal()).count(), 1);
        assert_eq!(out.last(), Some(&StageMessage::End));
    }

    #[test]
    fn test_source_paces_frames() {
        let (tx, _rx) = crossbeam_channel::unbounded();
        let mut reader = StubReader::new((0..3).map(|i| square_frame(8, 8, None, i)).collect());
        let start = Instant::now();
        run_source(
            &mut reader,
            Path::new("scene"),
            &tx,
            Duration::from_millis(10),
            &AtomicBool::new(false),
        );
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
