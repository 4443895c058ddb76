use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use sweep_config::Config;
use sweep_library::{Backup, Classifier, Journal, Mode, Outcome, Pipeline, RunState, RunSummary, Status};
use sweep_report::error::{ErrorKind as ReportErrorKind, Result as ReportResult};
use sweep_report::{Report, ReportSink};
use sweep_storage::BackendHandle;
use sweep_storage::backend::{LocalBackend, MockBackend};
use tempfile::TempDir;
use time::OffsetDateTime;
use time::macros::datetime;

const NOW: OffsetDateTime = datetime!(2025-03-14 09:26:53 UTC);

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<Report>>>);
impl RecordingSink {
    fn reports(&self) -> Vec<Report> {
        self.0.lock().unwrap().clone()
    }
}
impl ReportSink for RecordingSink {
    fn name(&self) -> &str {
        "recording"
    }

    fn deliver(&self, report: &Report) -> ReportResult<()> {
        self.0.lock().unwrap().push(report.clone());
        Ok(())
    }
}

struct BrokenSink;
impl ReportSink for BrokenSink {
    fn name(&self) -> &str {
        "broken"
    }

    fn deliver(&self, _report: &Report) -> ReportResult<()> {
        exn::bail!(ReportErrorKind::SendmailNotFound);
    }
}

struct Fixture {
    temp_dir: TempDir,
}
impl Fixture {
    fn new(files: &[(&str, usize)]) -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::create_dir(temp_dir.path().join("Downloads")).unwrap();
        let fixture = Self { temp_dir };
        for (name, size) in files {
            fs::write(fixture.source().join(name), vec![b'x'; *size]).unwrap();
        }
        fixture
    }

    fn source(&self) -> std::path::PathBuf {
        self.temp_dir.path().join("Downloads")
    }

    fn local(&self, name: &str) -> BackendHandle {
        Arc::new(LocalBackend::new(name, self.temp_dir.path().join(name)).unwrap())
    }

    fn pipeline(&self, primary: BackendHandle, secondary: BackendHandle, sink: &RecordingSink) -> Pipeline {
        let backup = Backup::new(Classifier::default(), primary, secondary);
        Pipeline::new(self.source(), backup, Journal::in_memory()).with_sink(Box::new(sink.clone()))
    }

    fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> =
            fs::read_dir(self.source()).unwrap().map(|e| e.unwrap().file_name().to_string_lossy().into_owned()).collect();
        names.sort();
        names
    }
}

fn completed(outcome: Outcome) -> RunSummary {
    match outcome {
        Outcome::Completed(summary) => summary,
        other => panic!("expected a completed run, got {other:?}"),
    }
}

#[test]
fn test_primary_read_only_secondary_ok() {
    let fixture = Fixture::new(&[("a.pdf", 10), ("b.csv", 20), ("c.zip", 30)]);
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(Arc::new(MockBackend::unwritable("Primary")), fixture.local("Secondary"), &sink);

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| unreachable!()));
    assert_eq!(summary.tally.primary, 0);
    assert_eq!(summary.tally.secondary, 3);
    assert_eq!(summary.tally.errors.len(), 3);
    assert!(summary.tally.errors.iter().all(|e| e.starts_with("Primary: ")));
    assert_eq!(summary.status, Status::Partial);
    assert!(summary.cleaned());
    assert_eq!(summary.deleted, 3);
    assert_eq!(summary.bytes_freed, 60);
    assert!(fixture.source_names().is_empty());

    let secondary = fixture.temp_dir.path().join("Secondary");
    assert!(secondary.join("Documentos/a.pdf").is_file());
    assert!(secondary.join("Datasets_Data/b.csv").is_file());
    assert!(secondary.join("Comprimidos_Installers/c.zip").is_file());

    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, "AUTO PARTIAL");
    assert!(reports[0].lines.iter().any(|line| line.text == "Copy finished: Primary(0) | Secondary(3)"));
}

#[test]
fn test_empty_source_skips_cleanup() {
    let fixture = Fixture::new(&[]);
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(fixture.local("Primary"), fixture.local("Secondary"), &sink);

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.tally.as_tuple(), (0, 0, &[][..]));
    assert_eq!(summary.status, Status::NothingCopied);
    assert_eq!(
        summary.states,
        [
            RunState::Idle,
            RunState::Scanning,
            RunState::Copying,
            RunState::SkippedCleaning,
            RunState::Reporting,
            RunState::Done,
        ]
    );
    assert_eq!(summary.mb_freed(), 0.0);
    let reports = sink.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].mb_freed, 0.0);
    assert_eq!(reports[0].status, "AUTO NOTHING COPIED");
}

#[test]
fn test_bytes_freed_in_megabytes() {
    let fixture = Fixture::new(&[("model.gguf", 1_048_576), ("video.mp4", 2_097_152)]);
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(fixture.local("Primary"), fixture.local("Secondary"), &sink);

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.status, Status::Success);
    assert_eq!(summary.mb_freed(), 3.0);
    assert_eq!(sink.reports()[0].subject(), "AUTO SUCCESS (+3.00 MB) - Backup 2025-03-14");
}

#[test]
fn test_subfolders_are_left_alone() {
    let fixture = Fixture::new(&[("notes.md", 5)]);
    let nested = fixture.source().join("project");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("inner.py"), b"print()").unwrap();
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(fixture.local("Primary"), fixture.local("Secondary"), &sink);

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.tally.as_tuple(), (1, 1, &[][..]));
    assert_eq!(fixture.source_names(), ["project"]);
    assert!(nested.join("inner.py").is_file());
    assert!(!fixture.temp_dir.path().join("Primary/Notebooks_Scripts").exists());
}

#[test]
fn test_no_cleanup_when_every_copy_fails() {
    let fixture = Fixture::new(&[("a.pdf", 1), ("b.png", 1)]);
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(
        Arc::new(MockBackend::unwritable("Primary")),
        Arc::new(MockBackend::unwritable("Secondary")),
        &sink,
    );

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.tally.errors.len(), 4);
    assert!(!summary.cleaned());
    assert_eq!(summary.status, Status::NothingCopied);
    assert_eq!(fixture.source_names(), ["a.pdf", "b.png"]);
}

#[test]
fn test_missing_source_is_reported() {
    let fixture = Fixture::new(&[]);
    fs::remove_dir(fixture.source()).unwrap();
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(fixture.local("Primary"), fixture.local("Secondary"), &sink);

    let outcome = pipeline.run(Mode::Manual, NOW, |_| panic!("must not prompt"));
    assert!(!outcome.ran());
    let Outcome::Failed(summary) = outcome else {
        panic!("expected a failed run");
    };
    assert_eq!(summary.status, Status::Failed);
    assert!(!fixture.temp_dir.path().join("Primary").exists());
    assert_eq!(sink.reports()[0].status, "MANUAL FAILED");
    assert_eq!(sink.reports()[0].disk, None);
    assert_eq!(summary.disk, None);
}

#[test]
fn test_declined_prompt_touches_nothing() {
    let fixture = Fixture::new(&[("a.pdf", 1)]);
    let sink = RecordingSink::default();
    let pipeline = fixture.pipeline(fixture.local("Primary"), fixture.local("Secondary"), &sink);

    let mut asked = None;
    let outcome = pipeline.run(Mode::Manual, NOW, |source| {
        asked = Some(source.to_path_buf());
        false
    });
    assert!(matches!(outcome, Outcome::Declined));
    assert_eq!(asked.as_deref(), Some(fixture.source().as_path()));
    assert_eq!(fixture.source_names(), ["a.pdf"]);
    assert!(!fixture.temp_dir.path().join("Primary").exists());
    assert!(sink.reports().is_empty());
}

#[test]
fn test_report_delivery_failure_keeps_status() {
    let fixture = Fixture::new(&[("a.pdf", 1)]);
    let backup = Backup::new(Classifier::default(), fixture.local("Primary"), fixture.local("Secondary"));
    let journal_path = fixture.temp_dir.path().join("backup_log.txt");
    let pipeline = Pipeline::new(fixture.source(), backup, Journal::new(&journal_path, Default::default()))
        .with_sink(Box::new(BrokenSink));

    let summary = completed(pipeline.run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.status, Status::Success);
    let journal = fs::read_to_string(journal_path).unwrap();
    assert!(journal.contains("Report delivery failed (broken): sendmail not found on this system"));
}

#[test]
fn test_same_day_runs_share_folder() {
    let fixture = Fixture::new(&[("report.pdf", 3)]);
    let mut config = Config::default();
    config.source = fixture.source();
    config.primary.path = fixture.temp_dir.path().join("D");
    config.secondary.path = fixture.temp_dir.path().join("A");
    config.journal.path = fixture.temp_dir.path().join("backup_log.txt");

    let first = completed(Pipeline::from_config(&config, NOW).unwrap().run(Mode::Auto, NOW, |_| true));
    assert_eq!(first.status, Status::Success);

    fs::write(fixture.source().join("report.pdf"), b"second").unwrap();
    let later = datetime!(2025-03-14 18:05:00 UTC);
    let second = completed(Pipeline::from_config(&config, later).unwrap().run(Mode::Auto, later, |_| true));
    assert_eq!(second.status, Status::Success);

    for base in ["D", "A"] {
        let folder = fixture.temp_dir.path().join(base).join("2025/2025-03-14_Backup_Descargas/Documentos");
        assert_eq!(fs::read(folder.join("report.pdf")).unwrap(), b"xxx");
        assert_eq!(fs::read(folder.join("report_20250314_180500.pdf")).unwrap(), b"second");
    }
    let journal = fs::read_to_string(&config.journal.path).unwrap();
    assert_eq!(journal.matches("--- Automatic backup started ---").count(), 2);
    assert!(Path::new(&config.journal.path).is_file());
}

#[test]
fn test_category_override_from_config() {
    let fixture = Fixture::new(&[("scan.heic", 1)]);
    let mut config = Config::default();
    config.source = fixture.source();
    config.primary.path = fixture.temp_dir.path().join("D");
    config.secondary.path = fixture.temp_dir.path().join("A");
    config.journal.path = fixture.temp_dir.path().join("backup_log.txt");
    config.categories = Some([("Imagenes".to_string(), vec!["heic".to_string()])].into_iter().collect());

    let summary = completed(Pipeline::from_config(&config, NOW).unwrap().run(Mode::Auto, NOW, |_| true));
    assert_eq!(summary.tally.as_tuple(), (1, 1, &[][..]));
    assert!(fixture.temp_dir.path().join("D/2025/2025-03-14_Backup_Descargas/Imagenes/scan.heic").is_file());
}
