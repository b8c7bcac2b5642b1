//! sheetcheck - SPREADSHEET FOLDER VALIDATOR
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use sheetcheck::{
    cli::Args,
    collect_files,
    logging::init_logging,
    processor::CheckResult,
    runner::{configure_threads, run_checks, Failure, StdoutSink},
    PatternMatcher, SpreadsheetFormat, Statistics,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 로그가 진행률 바를 잠시 지우고 출력되도록 먼저 생성
    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        create_progress_bar()
    };

    init_logging(args.verbose, &pb);

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        configure_threads(threads).context("스레드 풀 초기화 실패")?;
    }

    // 패턴 매처 초기화
    let pattern_matcher = PatternMatcher::new(args.pattern.clone())?;

    if !args.quiet {
        print_header(&args);
    }

    // 대상 파일 수집
    let files = collect_files(&args.input, &args.scan_options(), &pattern_matcher)
        .with_context(|| format!("폴더를 탐색할 수 없습니다: {}", args.input.display()))?;

    if files.is_empty() {
        if !args.quiet {
            eprintln!("{}", "⚠️ 검사할 파일이 없습니다.".yellow());
        }
        return Ok(());
    }

    if !args.quiet {
        eprintln!(
            "  {} 발견된 파일 수: {}",
            "📋".bright_white(),
            files.len().to_string().bright_green()
        );
    }

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&files);
        return Ok(());
    }

    let stats = Statistics::new(files.len());
    pb.set_length(files.len() as u64);

    let sink = StdoutSink::new(args.json).with_progress(pb.clone());
    let report = run_checks(
        files,
        &args.check_options(),
        &stats,
        |result| {
            pb.inc(1);
            if args.verbose {
                print_result_line(&pb, result);
            }
        },
        sink,
    );

    pb.finish_and_clear();

    if !args.quiet {
        print_failures(&report.failures, args.verbose);
    }

    // 실패 목록 파일 작성
    if let Some(ref log_path) = args.log {
        write_failure_log(log_path, &report.failures)
            .with_context(|| format!("실패 목록을 기록할 수 없습니다: {}", log_path.display()))?;
        if !args.quiet {
            eprintln!("\n{} 실패 목록 저장: {:?}", "📝".bright_cyan(), log_path);
        }
    }

    if let Some(e) = report.sink_error {
        // 파이프를 닫은 쪽(head 등)은 오류가 아님
        if e.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(anyhow::Error::new(e).context("시트 목록을 출력할 수 없습니다"));
    }

    if !args.quiet {
        stats.print_summary();
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args) {
    eprintln!("\n{}", "═".repeat(50).bright_blue());
    eprintln!(
        "{}",
        " 🔎 SPREADSHEET FOLDER VALIDATOR".bright_white().bold()
    );
    eprintln!("{}", "═".repeat(50).bright_blue());
    eprintln!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);

    if let Some(ref pattern) = args.pattern {
        eprintln!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if args.recursive {
        match args.max_depth {
            Some(depth) => eprintln!("  {} 최대 깊이: {}", "📏".bright_white(), depth),
            None => eprintln!("  {} 하위 폴더 포함", "📏".bright_white()),
        }
    }

    if args.deep {
        eprintln!("  {} {}", "🔬".bright_cyan(), "정밀 검사 (전체 시트 읽기)".cyan());
    }

    if args.remove {
        eprintln!(
            "  {} {}",
            "🗑️".bright_red(),
            "파싱 실패 파일 삭제 모드".red()
        );
    }

    if args.dry_run {
        eprintln!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 검사 없음)".yellow()
        );
    }

    eprintln!("{}", "═".repeat(50).bright_blue());
    eprintln!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력 (실제로 검사될 파일만)
fn print_dry_run(files: &[PathBuf]) {
    let targets = dry_run_targets(files);
    for path in &targets {
        println!("{}", path.display());
    }

    let skipped = files.len() - targets.len();
    if skipped > 0 {
        eprintln!(
            "  {} 스프레드시트가 아니라서 건너뛸 파일: {}",
            "⏭️".bright_yellow(),
            skipped.to_string().yellow()
        );
    }
}

/// 형식을 판별할 수 있는 파일
fn dry_run_targets(files: &[PathBuf]) -> Vec<&Path> {
    files
        .iter()
        .map(PathBuf::as_path)
        .filter(|path| SpreadsheetFormat::from_path(path).is_some())
        .collect()
}

/// 파일 하나의 결과 줄 (verbose)
fn print_result_line(pb: &ProgressBar, result: &CheckResult) {
    let name = result.path.display().to_string();
    let line = if result.is_valid() {
        format!("  {} {}", "✓".green(), name)
    } else if result.is_invalid() {
        format!("  {} {}", "✗".red(), name)
    } else {
        format!("  {} {}", "-".dimmed(), name.dimmed())
    };
    pb.println(line);
}

/// 진행률 바 생성 (길이는 파일 수집 후 설정)
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░");
    pb.set_style(style);
    pb
}

/// 실패 목록 출력
fn print_failures(failures: &[Failure], verbose: bool) {
    if failures.is_empty() {
        return;
    }

    eprintln!("\n{}", "❌ 파싱할 수 없는 파일:".bright_red());
    for failure in failures {
        let removed = if failure.removed {
            " (삭제됨)".magenta().to_string()
        } else {
            String::new()
        };
        eprintln!("  {} {}{}", "•".red(), failure.path.display(), removed);
        if verbose {
            eprintln!("    {}", failure.reason.dimmed());
        }
    }
}

/// 실패 목록 파일 작성
fn write_failure_log(log_path: &Path, failures: &[Failure]) -> Result<()> {
    let mut log_file = BufWriter::new(File::create(log_path)?);

    writeln!(log_file, "sheetcheck 실패 목록")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 실패 수: {}", failures.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for failure in failures {
        writeln!(log_file, "\n파일: {}", failure.path.display())?;
        writeln!(log_file, "에러: {}", failure.reason)?;
        if failure.removed {
            writeln!(log_file, "삭제됨")?;
        }
    }

    log_file.flush()?;
    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
