//! Conversion jobs.
//!
//! `run_conversion` is the synchronous body of a job. `ConversionOrchestrator`
//! runs that body on a worker thread and hands events back over a channel;
//! the caller polls with [`ConversionHandle::try_receive`] or blocks with
//! [`ConversionHandle::recv`].

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::error::ConvertError;
use super::sink::RasterPageSink;
use crate::engine::layout::{CancelToken, LayoutSummary, PageLayoutEngine, Progress};
use crate::engine::params::{LayoutOptions, Parameters, ResourcePaths};
use crate::engine::perturb::PerturbationModel;
use crate::platform::io::{DocumentAdapter, PlainTextAdapter};
use crate::platform::output::OutputWriter;
use crate::platform::renderer::{BackgroundTemplate, FontGlyphRenderer};

#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub input: PathBuf,
    /// `handwritten_<stem>` はこの下に作られる
    pub output_dir: PathBuf,
    pub resources: ResourcePaths,
    pub params: Parameters,
    pub options: LayoutOptions,
    /// None なら毎回異なる揺らぎ
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed { pages: usize, message: String },
    Cancelled { message: String },
    Failed { message: String },
}

impl Outcome {
    pub fn success(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Completed { message, .. }
            | Outcome::Cancelled { message }
            | Outcome::Failed { message } => message,
        }
    }

    pub fn pages(&self) -> usize {
        match self {
            Outcome::Completed { pages, .. } => *pages,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionEvent {
    Progress { percent: u8, message: String },
    Finished(Outcome),
}

impl From<Progress> for ConversionEvent {
    fn from(p: Progress) -> Self {
        ConversionEvent::Progress {
            percent: p.percent,
            message: p.message,
        }
    }
}

/// 変換結果の詳細
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub summary: LayoutSummary,
    pub output_dir: PathBuf,
    pub pages: Vec<PathBuf>,
}

/* ============================
 * Synchronous body
 * ============================ */

/// Runs one job on the calling thread with the plain text adapter.
///
/// Emits `Progress` events and exactly one `Finished` at the end; the same
/// outcome is returned.
pub fn run_conversion(
    job: &ConversionJob,
    cancel: &CancelToken,
    emit: &mut dyn FnMut(ConversionEvent),
) -> Outcome {
    run_conversion_with(job, &PlainTextAdapter, cancel, emit)
}

pub fn run_conversion_with(
    job: &ConversionJob,
    adapter: &dyn DocumentAdapter,
    cancel: &CancelToken,
    emit: &mut dyn FnMut(ConversionEvent),
) -> Outcome {
    let outcome = match convert(job, adapter, cancel, emit) {
        Ok(report) => {
            log::info!(target: "Conversion", "{} page(s) written to {}", report.summary.pages, report.output_dir.display());
            Outcome::Completed {
                pages: report.summary.pages,
                message: format!(
                    "converted {} page(s) into {}",
                    report.summary.pages,
                    report.output_dir.display()
                ),
            }
        }
        Err(ConvertError::Cancelled) => {
            log::info!(target: "Conversion", "cancelled: {}", job.input.display());
            Outcome::Cancelled {
                message: ConvertError::Cancelled.to_string(),
            }
        }
        Err(e) => {
            log::warn!(target: "Conversion", "failed: {}", e);
            Outcome::Failed {
                message: e.to_string(),
            }
        }
    };
    emit(ConversionEvent::Finished(outcome.clone()));
    outcome
}

/// Does the actual work; pages flushed before an error stay on disk.
pub fn convert(
    job: &ConversionJob,
    adapter: &dyn DocumentAdapter,
    cancel: &CancelToken,
    emit: &mut dyn FnMut(ConversionEvent),
) -> Result<ConversionReport, ConvertError> {
    let text = adapter.read_text(&job.input)?;
    emit(Progress::new(10, "input loaded").into());

    let params = &job.params;
    params.validate()?;

    let template = BackgroundTemplate::open(&job.resources.background_path)?;
    let (width, height) = template.size();
    params.validate_for(width, height)?;

    let renderer = FontGlyphRenderer::open(&job.resources.font_path)?;
    let writer = OutputWriter::for_input(&job.output_dir, &job.input)?;
    log::debug!(target: "Conversion", "{}x{} background, {}px font", width, height, params.font_size);

    let perturb = PerturbationModel::seeded(params, job.seed);
    let mut engine = PageLayoutEngine::new(params, job.options, (width, height), &renderer, perturb);
    let mut sink = RasterPageSink::new(&template, &renderer, &writer, params.font_size, job.options.apply_rotation)?;

    let summary = engine.run(&text, &mut sink, cancel, &mut |p: Progress| emit(p.into()))?;
    emit(Progress::new(100, "done").into());

    Ok(ConversionReport {
        summary,
        output_dir: writer.dir().to_path_buf(),
        pages: sink.into_written(),
    })
}

/* ============================
 * Worker thread
 * ============================ */

pub struct ConversionOrchestrator;

impl ConversionOrchestrator {
    /// `.txt` 入力でジョブを開始する
    pub fn spawn(job: ConversionJob) -> ConversionHandle {
        Self::spawn_with(job, Arc::new(PlainTextAdapter))
    }

    pub fn spawn_with(job: ConversionJob, adapter: Arc<dyn DocumentAdapter>) -> ConversionHandle {
        let (tx, rx) = mpsc::channel();
        let cancel = CancelToken::new();
        let token = cancel.clone();

        let worker = thread::spawn(move || spawn_conversion_thread(job, adapter, token, tx));

        ConversionHandle {
            events: rx,
            cancel,
            worker: Some(worker),
            finished: None,
        }
    }
}

/// 変換スレッド
fn spawn_conversion_thread(
    job: ConversionJob,
    adapter: Arc<dyn DocumentAdapter>,
    cancel: CancelToken,
    tx: Sender<ConversionEvent>,
) {
    run_conversion_with(&job, adapter.as_ref(), &cancel, &mut |event| {
        let _ = tx.send(event);
    });
}

pub struct ConversionHandle {
    events: Receiver<ConversionEvent>,
    cancel: CancelToken,
    worker: Option<JoinHandle<()>>,
    finished: Option<Outcome>,
}

impl ConversionHandle {
    /// 届いているイベントをブロックせずに取り込む
    pub fn try_receive(&mut self) -> Vec<ConversionEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.note(&event);
            events.push(event);
        }
        events
    }

    /// 次のイベントを待つ。ワーカーが終了していれば None
    pub fn recv(&mut self) -> Option<ConversionEvent> {
        let event = self.events.recv().ok()?;
        self.note(&event);
        Some(event)
    }

    /// 協調的キャンセルを要求する
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Finished が既に届いていればその結果
    pub fn outcome(&self) -> Option<&Outcome> {
        self.finished.as_ref()
    }

    /// Waits for the worker and returns its outcome. Events not yet
    /// received are discarded.
    pub fn join(mut self) -> Outcome {
        while self.finished.is_none() {
            if self.recv().is_none() {
                break;
            }
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            log::warn!(target: "ConversionHandle", "conversion worker panicked");
            return Outcome::Failed {
                message: "conversion worker panicked".to_string(),
            };
        }
        self.finished.unwrap_or_else(|| Outcome::Failed {
            message: "conversion worker exited without a result".to_string(),
        })
    }

    fn note(&mut self, event: &ConversionEvent) {
        if let ConversionEvent::Finished(outcome) = event {
            self.finished = Some(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(input: PathBuf, output_dir: PathBuf) -> ConversionJob {
        ConversionJob {
            input,
            output_dir,
            resources: ResourcePaths {
                font_path: PathBuf::from("missing-font.ttf"),
                background_path: PathBuf::from("missing-background.png"),
            },
            params: Parameters::default(),
            options: LayoutOptions::default(),
            seed: Some(7),
        }
    }

    #[test]
    fn missing_input_fails_before_any_progress() {
        let dir = tempfile::tempdir().expect("tempdir");
        let job = job(dir.path().join("nope.txt"), dir.path().to_path_buf());
        let mut events = Vec::new();
        let outcome = run_conversion(&job, &CancelToken::new(), &mut |e| events.push(e));

        assert!(!outcome.success());
        assert!(outcome.message().contains("not found"));
        assert_eq!(events, vec![ConversionEvent::Finished(outcome)]);
    }

    #[test]
    fn input_loaded_progress_follows_a_successful_read() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("note.txt");
        std::fs::write(&input, "hello").expect("write");
        // 背景が無いので読み込み直後に失敗する
        let mut events = Vec::new();
        let outcome = run_conversion(&job(input, dir.path().to_path_buf()), &CancelToken::new(), &mut |e| {
            events.push(e)
        });

        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(
            events.first(),
            Some(&ConversionEvent::Progress {
                percent: 10,
                message: "input loaded".to_string()
            })
        );
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn unsupported_extension_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("letter.docx");
        std::fs::write(&input, b"PK").expect("write");
        let outcome = run_conversion(&job(input, dir.path().to_path_buf()), &CancelToken::new(), &mut |_| {});
        assert_eq!(
            outcome,
            Outcome::Failed {
                message: "unsupported input format: .docx".to_string()
            }
        );
    }

    #[test]
    fn worker_reports_exactly_one_finished_event() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut handle = ConversionOrchestrator::spawn(job(dir.path().join("nope.txt"), dir.path().to_path_buf()));
        // 複製したトークンは同じフラグを共有する
        let token = handle.cancel_token();
        handle.cancel();
        assert!(token.is_cancelled());

        let mut finished = 0;
        while let Some(event) = handle.recv() {
            if matches!(event, ConversionEvent::Finished(_)) {
                finished += 1;
            }
        }
        assert_eq!(finished, 1);
        assert!(matches!(handle.outcome(), Some(Outcome::Failed { .. })));
        // 入力が無いのでキャンセルより先に失敗する
        let outcome = handle.join();
        assert!(matches!(outcome, Outcome::Failed { .. }));
    }
}
