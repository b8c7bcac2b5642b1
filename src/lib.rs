//! sheetcheck - SPREADSHEET FOLDER VALIDATOR
//!
//! 폴더 내 스프레드시트 파일을 형식에 맞는 파서로 열어 보고, 파싱할 수 없는
//! 파일을 보고하거나 삭제하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 🚀 **병렬 처리**: Rayon을 활용해 파일마다 독립적으로 검사
//! - 🛡️ **장애 격리**: 파서가 패닉해도 해당 파일만 실패로 기록
//! - 📑 **시트 목록**: 파일별 시트 이름을 텍스트 또는 JSON Lines로 출력
//! - 🗑️ **자동 정리**: 파싱할 수 없는 파일 삭제
//! - 🔍 **패턴 필터링**: glob 형식의 파일 이름 필터링
//! - 📈 **통계**: 유효/실패/건너뜀/삭제 수와 검사 용량
//!
//! # 예제
//!
//! ```bash
//! # 검사만
//! sheetcheck ./reports
//!
//! # 시트 목록 출력
//! sheetcheck -s ./reports
//!
//! # 파싱 실패 파일 삭제
//! sheetcheck -r ./reports
//! ```

pub mod cli;
pub mod error;
pub mod format;
pub mod logging;
pub mod pattern;
pub mod processor;
pub mod runner;
pub mod scanner;
pub mod stats;
pub mod summary;

// Re-exports for convenient access
pub use cli::Args;
pub use error::{Result, SheetCheckError};
pub use format::SpreadsheetFormat;
pub use pattern::PatternMatcher;
pub use processor::{check_file, CheckOptions, CheckResult, Outcome};
pub use runner::{run_checks, run_checks_with, Failure, RunReport, StdoutSink, SummarySink};
pub use scanner::{collect_files, ScanOptions};
pub use stats::{format_bytes, Statistics};
pub use summary::FileSummary;
