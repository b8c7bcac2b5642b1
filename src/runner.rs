//! 병렬 검사 실행 모듈
//!
//! 파일마다 rayon 작업 하나로 검사하고(fan-out), 시트 목록은 버퍼가 있는
//! 채널을 통해 전용 출력 스레드 하나로 모읍니다(fan-in).

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use tracing::debug;

use crate::error::{Result, SheetCheckError};
use crate::processor::{check_file, CheckOptions, CheckResult};
use crate::stats::Statistics;
use crate::summary::FileSummary;

/// 결과 채널 버퍼 크기
pub const SUMMARY_QUEUE_CAPACITY: usize = 1000;

/// 시트 목록 수신자
pub trait SummarySink: Send {
    fn accept(&mut self, summary: FileSummary) -> io::Result<()>;
}

/// 표준 출력으로 시트 목록 출력
#[derive(Default)]
pub struct StdoutSink {
    json: bool,
    progress: Option<ProgressBar>,
}

impl StdoutSink {
    pub fn new(json: bool) -> Self {
        Self {
            json,
            progress: None,
        }
    }

    /// 출력하는 동안 진행률 바를 잠시 지움
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    fn write_summary(&self, summary: &FileSummary) -> io::Result<()> {
        let mut out = io::stdout().lock();
        if self.json {
            writeln!(out, "{}", summary.to_json_line()?)
        } else {
            // 요약마다 빈 줄 하나로 구분
            writeln!(out, "{}", summary)
        }
    }
}

impl SummarySink for StdoutSink {
    fn accept(&mut self, summary: FileSummary) -> io::Result<()> {
        match &self.progress {
            Some(pb) => pb.suspend(|| self.write_summary(&summary)),
            None => self.write_summary(&summary),
        }
    }
}

/// 메모리에 모으는 수신자
impl SummarySink for Vec<FileSummary> {
    fn accept(&mut self, summary: FileSummary) -> io::Result<()> {
        self.push(summary);
        Ok(())
    }
}

/// 실패한 파일 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub path: PathBuf,
    pub reason: String,
    pub removed: bool,
}

/// 실행 결과
#[derive(Debug)]
pub struct RunReport<S> {
    /// 경로 순으로 정렬된 실패 목록
    pub failures: Vec<Failure>,
    /// 모든 시트 목록을 받은 뒤의 수신자
    pub sink: S,
    /// 수신자의 첫 번째 출력 에러 (이후 시트 목록은 버려짐)
    pub sink_error: Option<io::Error>,
}

/// 전역 스레드 풀 크기 설정
pub fn configure_threads(threads: usize) -> Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| SheetCheckError::ThreadPoolError {
            reason: e.to_string(),
        })
}

/// 모든 파일을 병렬로 검사
///
/// `on_each`는 파일 하나의 검사가 끝날 때마다 작업 스레드에서 호출됩니다.
/// `options.collect_sheets`가 켜져 있으면 성공한 파일의 시트 목록이 `sink`로
/// 전달되며, 이 함수가 반환되기 전에 모두 처리됩니다.
pub fn run_checks<S, F>(
    files: Vec<PathBuf>,
    options: &CheckOptions,
    stats: &Statistics,
    on_each: F,
    sink: S,
) -> RunReport<S>
where
    S: SummarySink,
    F: Fn(&CheckResult) + Sync,
{
    run_checks_with(files, options, stats, check_file, on_each, sink)
}

/// 파일 검사 함수를 지정해서 실행
pub fn run_checks_with<S, C, F>(
    files: Vec<PathBuf>,
    options: &CheckOptions,
    stats: &Statistics,
    check: C,
    on_each: F,
    sink: S,
) -> RunReport<S>
where
    S: SummarySink,
    C: Fn(PathBuf, &CheckOptions) -> CheckResult + Sync,
    F: Fn(&CheckResult) + Sync,
{
    let (tx, rx) = mpsc::sync_channel::<FileSummary>(SUMMARY_QUEUE_CAPACITY);

    thread::scope(|scope| {
        let consumer = scope.spawn(move || drain(rx, sink));

        let mut failures: Vec<Failure> = files
            .into_par_iter()
            .map_with(tx, |tx, path| {
                let result = check(path, options);
                stats.record(&result);
                on_each(&result);

                if options.collect_sheets {
                    if let Some(summary) = result.summary() {
                        // 수신 스레드가 먼저 끝난 경우에만 실패
                        if tx.send(summary).is_err() {
                            debug!("결과 채널이 닫혀 있음");
                        }
                    }
                }

                result.error().map(|error| Failure {
                    reason: error.to_string(),
                    path: result.path.clone(),
                    removed: result.removed,
                })
            })
            .flatten()
            .collect();

        // map_with 가 보낸 쪽을 모두 drop 했으므로 수신 루프가 끝남
        let (sink, sink_error) = consumer
            .join()
            .unwrap_or_else(|payload| panic::resume_unwind(payload));

        failures.sort_by(|a, b| a.path.cmp(&b.path));
        RunReport {
            failures,
            sink,
            sink_error,
        }
    })
}

/// 채널이 닫힐 때까지 수신자로 전달
///
/// 첫 에러 이후에는 수신자를 더 호출하지 않고 채널만 비웁니다.
fn drain<S: SummarySink>(
    rx: mpsc::Receiver<FileSummary>,
    mut sink: S,
) -> (S, Option<io::Error>) {
    let mut first_error = None;

    for summary in rx {
        if first_error.is_some() {
            continue;
        }
        let path = summary.path.clone();
        if let Err(e) = sink.accept(summary) {
            debug!(path = %path.display(), "시트 목록 출력 중단: {}", e);
            first_error = Some(e);
        }
    }

    (sink, first_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::{guard, Outcome};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// 첫 호출부터 실패하는 수신자
    struct ClosedPipe {
        calls: usize,
    }

    impl SummarySink for ClosedPipe {
        fn accept(&mut self, _summary: FileSummary) -> io::Result<()> {
            self.calls += 1;
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    /// 파서 없이 성공 결과를 만드는 검사 함수, `boom`이 들어간 파일은 패닉
    fn fake_check(path: PathBuf, _options: &CheckOptions) -> CheckResult {
        let panics = path.to_string_lossy().contains("boom");
        let outcome = match guard(&path, || {
            if panics {
                panic!("malformed record");
            }
            Ok(vec!["Sheet1".to_string()])
        }) {
            Ok(sheets) => Outcome::Valid { sheets },
            Err(error) => Outcome::Invalid { error },
        };
        CheckResult {
            path,
            format: None,
            outcome,
            file_size: 0,
            removed: false,
        }
    }

    fn fake_files(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_empty_run() {
        let stats = Statistics::new(0);
        let report = run_checks(
            Vec::new(),
            &CheckOptions::new().with_sheets(true),
            &stats,
            |_| {},
            Vec::<FileSummary>::new(),
        );

        assert!(report.failures.is_empty());
        assert!(report.sink.is_empty());
        assert!(report.sink_error.is_none());
    }

    #[test]
    fn test_sink_error_stops_output_once() {
        let files: Vec<PathBuf> = (0..50).map(|i| PathBuf::from(format!("{}.xlsx", i))).collect();
        let stats = Statistics::new(files.len());

        let report = run_checks_with(
            files,
            &CheckOptions::new().with_sheets(true),
            &stats,
            fake_check,
            |_| {},
            ClosedPipe { calls: 0 },
        );

        // 모든 파일은 계속 검사되지만 수신자는 한 번만 호출됨
        assert_eq!(stats.get_valid_count(), 50);
        assert_eq!(report.sink.calls, 1);
        assert_eq!(
            report.sink_error.map(|e| e.kind()),
            Some(io::ErrorKind::BrokenPipe)
        );
    }

    #[test]
    fn test_panicking_file_does_not_stop_others() {
        let files = fake_files(&["a.xlsx", "boom.xlsx", "c.xlsx", "d.xlsx"]);
        let stats = Statistics::new(files.len());

        let report = run_checks_with(
            files,
            &CheckOptions::new().with_sheets(true),
            &stats,
            fake_check,
            |_| {},
            Vec::<FileSummary>::new(),
        );

        assert_eq!(stats.get_valid_count(), 3);
        assert_eq!(stats.get_invalid_count(), 1);
        assert_eq!(report.sink.len(), 3);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, PathBuf::from("boom.xlsx"));
        assert!(report.failures[0].reason.contains("malformed record"));
    }

    #[test]
    fn test_failures_are_isolated_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for name in ["c.xls", "a.xlsx", "b.xlsb", "skip.txt"] {
            let path = temp_dir.path().join(name);
            fs::write(&path, b"garbage").unwrap();
            files.push(path);
        }

        let stats = Statistics::new(files.len());
        let seen = AtomicUsize::new(0);
        let report = run_checks(
            files,
            &CheckOptions::new().with_sheets(true),
            &stats,
            |_| {
                seen.fetch_add(1, Ordering::Relaxed);
            },
            Vec::<FileSummary>::new(),
        );

        assert_eq!(seen.load(Ordering::Relaxed), 4);
        assert_eq!(stats.get_invalid_count(), 3);
        assert_eq!(stats.get_skipped_count(), 1);
        assert!(report.sink.is_empty());

        let names: Vec<_> = report
            .failures
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.xlsb", "c.xls"]);
        assert!(report.failures.iter().all(|f| !f.removed));
    }
}
