//! 통계 및 유틸리티 모듈
//!
//! 검사 통계 수집 및 포맷팅을 담당합니다.
//! 표준 출력은 시트 목록 전용이므로 요약은 표준 에러로 출력합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::processor::CheckResult;

/// 검사 통계 구조체
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 파싱 성공 수
    pub valid_count: AtomicUsize,
    /// 파싱 실패 수
    pub invalid_count: AtomicUsize,
    /// 건너뛴 파일 수
    pub skipped_count: AtomicUsize,
    /// 삭제된 파일 수
    pub removed_count: AtomicUsize,
    /// 검사한 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 검사 결과 하나를 카운터에 반영
    pub fn record(&self, result: &CheckResult) {
        if result.is_valid() {
            self.valid_count.fetch_add(1, Ordering::Relaxed);
            self.total_bytes_read
                .fetch_add(result.file_size, Ordering::Relaxed);
        } else if result.is_invalid() {
            self.invalid_count.fetch_add(1, Ordering::Relaxed);
            self.total_bytes_read
                .fetch_add(result.file_size, Ordering::Relaxed);
        } else {
            self.skipped_count.fetch_add(1, Ordering::Relaxed);
        }

        if result.removed {
            self.removed_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn get_valid_count(&self) -> usize {
        self.valid_count.load(Ordering::Relaxed)
    }

    pub fn get_invalid_count(&self) -> usize {
        self.invalid_count.load(Ordering::Relaxed)
    }

    pub fn get_skipped_count(&self) -> usize {
        self.skipped_count.load(Ordering::Relaxed)
    }

    pub fn get_removed_count(&self) -> usize {
        self.removed_count.load(Ordering::Relaxed)
    }

    pub fn get_bytes_read(&self) -> u64 {
        self.total_bytes_read.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 유효율 (건너뛴 파일 제외), 검사한 파일이 없으면 None
    pub fn valid_rate(&self) -> Option<f64> {
        let checked = self.get_valid_count() + self.get_invalid_count();
        if checked == 0 {
            return None;
        }
        Some((self.get_valid_count() as f64 / checked as f64) * 100.0)
    }

    /// 검사 통계 요약 출력
    pub fn print_summary(&self) {
        let valid = self.get_valid_count();
        let invalid = self.get_invalid_count();
        let skipped = self.get_skipped_count();
        let removed = self.get_removed_count();

        eprintln!("\n{}", "═".repeat(50).bright_blue());
        eprintln!("{}", " 📊 검사 결과".bright_white().bold());
        eprintln!("{}", "═".repeat(50).bright_blue());

        eprintln!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        eprintln!(
            "  {} 유효:         {}",
            "✅".bright_green(),
            valid.to_string().green()
        );

        if invalid > 0 {
            eprintln!(
                "  {} 파싱 실패:    {}",
                "❌".bright_red(),
                invalid.to_string().red()
            );
        } else {
            eprintln!("  {} 파싱 실패:    {}", "✅".bright_green(), "0".green());
        }

        if skipped > 0 {
            eprintln!(
                "  {} 건너뜀:       {}",
                "⏭️".bright_yellow(),
                skipped.to_string().yellow()
            );
        }

        if removed > 0 {
            eprintln!(
                "  {} 삭제됨:       {}",
                "🗑️".bright_magenta(),
                removed.to_string().magenta()
            );
        }

        eprintln!(
            "  {} 검사 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.get_bytes_read())
        );

        if let Some(rate) = self.valid_rate() {
            eprintln!("  {} 유효율:       {:.1}%", "📈".bright_white(), rate);
        }

        eprintln!(
            "  {} 검사 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        eprintln!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use sheetcheck::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        format!("{}시간 {}분", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}
