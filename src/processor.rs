//! 스프레드시트 파일 검사 모듈
//!
//! 개별 파일을 열어 시트 목록을 읽고, 파싱 실패 시 로그 기록과 삭제를 담당합니다.
//! 파서 내부의 패닉도 이 모듈에서 잡아 해당 파일만 실패로 처리합니다.

use calamine::{Ods, Reader, Xls, Xlsb, Xlsx};
use memmap2::Mmap;
use std::any::Any;
use std::cell::Cell;
use std::fmt::Display;
use std::fs::{self, File};
use std::io::{BufReader, Cursor, Read, Seek};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::error::{Result, SheetCheckError};
use crate::format::SpreadsheetFormat;
use crate::summary::FileSummary;

/// 파일 하나의 검사 결과 종류
#[derive(Debug)]
pub enum Outcome {
    /// 파싱 성공
    Valid { sheets: Vec<String> },
    /// 파싱 실패
    Invalid { error: SheetCheckError },
    /// 스프레드시트가 아니라서 건너뜀
    Skipped,
}

/// 파일 검사 결과
#[derive(Debug)]
pub struct CheckResult {
    /// 검사한 파일 경로
    pub path: PathBuf,
    /// 판별된 형식
    pub format: Option<SpreadsheetFormat>,
    /// 결과
    pub outcome: Outcome,
    /// 원본 파일 크기
    pub file_size: u64,
    /// 실패 후 파일이 삭제되었는지 여부
    pub removed: bool,
}

impl CheckResult {
    pub fn is_valid(&self) -> bool {
        matches!(self.outcome, Outcome::Valid { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.outcome, Outcome::Invalid { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, Outcome::Skipped)
    }

    /// 실패 원인 (실패 시)
    pub fn error(&self) -> Option<&SheetCheckError> {
        match &self.outcome {
            Outcome::Invalid { error } => Some(error),
            _ => None,
        }
    }

    /// 시트 이름 목록 (성공 시)
    pub fn sheets(&self) -> Option<&[String]> {
        match &self.outcome {
            Outcome::Valid { sheets } => Some(sheets),
            _ => None,
        }
    }

    /// 성공한 파일의 집계 레코드
    pub fn summary(&self) -> Option<FileSummary> {
        self.sheets()
            .map(|sheets| FileSummary::new(self.path.clone(), sheets.to_vec()))
    }
}

/// 검사 옵션
#[derive(Debug, Clone)]
pub struct CheckOptions {
    /// 파싱 실패 파일 삭제
    pub remove_unparsable: bool,
    /// 시트 목록 수집
    pub collect_sheets: bool,
    /// 모든 워크시트의 셀 범위까지 읽기
    pub deep: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            remove_unparsable: false,
            collect_sheets: false,
            deep: false,
            mmap_threshold: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl CheckOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 실패 파일 삭제 설정
    pub fn with_remove(mut self, remove_unparsable: bool) -> Self {
        self.remove_unparsable = remove_unparsable;
        self
    }

    /// 시트 목록 수집 설정
    pub fn with_sheets(mut self, collect_sheets: bool) -> Self {
        self.collect_sheets = collect_sheets;
        self
    }

    /// 전체 워크시트 읽기 설정
    pub fn with_deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn with_mmap_threshold(mut self, mmap_threshold: u64) -> Self {
        self.mmap_threshold = mmap_threshold;
        self
    }
}

/// 단일 파일 검사
///
/// 지원하지 않는 확장자는 건너뛰며 절대 삭제하지 않습니다.
/// 파싱 오류와 파서 패닉은 모두 `Outcome::Invalid`가 됩니다.
pub fn check_file(path: PathBuf, options: &CheckOptions) -> CheckResult {
    let file_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    let Some(format) = SpreadsheetFormat::from_path(&path) else {
        debug!(path = %path.display(), "스프레드시트가 아님, 건너뜀");
        return CheckResult {
            path,
            format: None,
            outcome: Outcome::Skipped,
            file_size,
            removed: false,
        };
    };

    debug!(path = %path.display(), %format, file_size, "검사 시작");

    match read_guarded(&path, format, file_size, options) {
        Ok(sheets) => {
            debug!(path = %path.display(), sheets = sheets.len(), "파싱 성공");
            CheckResult {
                path,
                format: Some(format),
                outcome: Outcome::Valid { sheets },
                file_size,
                removed: false,
            }
        }
        Err(error) => {
            let removed = handle_parse_error(&path, &error, options);
            CheckResult {
                path,
                format: Some(format),
                outcome: Outcome::Invalid { error },
                file_size,
                removed,
            }
        }
    }
}

/// 파싱 실패 처리: 로그를 남기고, 설정된 경우 파일 삭제
///
/// 파일이 실제로 삭제되었으면 true
fn handle_parse_error(path: &Path, error: &SheetCheckError, options: &CheckOptions) -> bool {
    error!(path = %path.display(), "파싱할 수 없는 파일: {}", error);

    if !options.remove_unparsable {
        return false;
    }

    match remove_file(path) {
        Ok(()) => {
            info!(path = %path.display(), "파일 삭제됨");
            true
        }
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

/// 파일 삭제
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| SheetCheckError::RemoveError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// 파서 패닉을 잡아 에러로 변환
fn read_guarded(
    path: &Path,
    format: SpreadsheetFormat,
    file_size: u64,
    options: &CheckOptions,
) -> Result<Vec<String>> {
    guard(path, || read_sheet_names(path, format, file_size, options))
}

thread_local! {
    static GUARDED: Cell<bool> = const { Cell::new(false) };
}

/// 현재 스레드가 `guard` 안에서 실행 중인지
pub fn is_guarded() -> bool {
    GUARDED.with(Cell::get)
}

/// `f`를 실행하고, 패닉이 나면 `SheetCheckError::Panicked`로 바꿈
///
/// 실행 중에는 `install_panic_hook`이 설치한 훅이 패닉 메시지를 `debug!`로만 남깁니다.
pub fn guard<T>(path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let outer = GUARDED.with(|g| g.replace(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    GUARDED.with(|g| g.set(outer));

    result.unwrap_or_else(|payload| {
        Err(SheetCheckError::Panicked {
            file: path.to_path_buf(),
            reason: panic_message(payload.as_ref()),
        })
    })
}

/// `guard` 안의 패닉은 로그로만 남기고, 나머지는 기존 훅으로 넘기는 패닉 훅 설치
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if is_guarded() {
            debug!("파서 패닉: {}", info);
        } else {
            previous(info);
        }
    }));
}

/// 패닉 페이로드에서 메시지 추출
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "알 수 없는 패닉".to_string()
    }
}

/// 파일 크기에 따라 버퍼 리더 또는 메모리 매핑으로 통합 문서 열기
fn read_sheet_names(
    path: &Path,
    format: SpreadsheetFormat,
    file_size: u64,
    options: &CheckOptions,
) -> Result<Vec<String>> {
    if file_size >= options.mmap_threshold {
        read_with_mmap(path, format, options.deep)
    } else {
        read_with_reader(path, format, options.deep)
    }
}

/// 버퍼 리더로 열기
fn read_with_reader(path: &Path, format: SpreadsheetFormat, deep: bool) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| SheetCheckError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    open_and_inspect(path, format, BufReader::new(file), deep)
}

/// 메모리 매핑으로 열기 (대용량 파일용)
fn read_with_mmap(path: &Path, format: SpreadsheetFormat, deep: bool) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| SheetCheckError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // SAFETY: 매핑은 이 함수 안에서만 읽기 전용으로 사용
    let mmap = unsafe {
        Mmap::map(&file).map_err(|e| SheetCheckError::FileOpenError {
            file: path.to_path_buf(),
            reason: format!("메모리 매핑 실패: {}", e),
        })?
    };

    open_and_inspect(path, format, Cursor::new(&mmap[..]), deep)
}

/// 형식에 맞는 calamine 리더로 디스패치
fn open_and_inspect<RS: Read + Seek>(
    path: &Path,
    format: SpreadsheetFormat,
    reader: RS,
    deep: bool,
) -> Result<Vec<String>> {
    match format {
        SpreadsheetFormat::Xls => inspect::<RS, Xls<RS>>(path, Xls::new(reader), deep),
        SpreadsheetFormat::Xlsx => inspect::<RS, Xlsx<RS>>(path, Xlsx::new(reader), deep),
        SpreadsheetFormat::Xlsb => inspect::<RS, Xlsb<RS>>(path, Xlsb::new(reader), deep),
        SpreadsheetFormat::Ods => inspect::<RS, Ods<RS>>(path, Ods::new(reader), deep),
    }
}

/// 열린 통합 문서에서 시트 이름을 읽고, `deep`이면 모든 시트 범위까지 읽기
fn inspect<RS, R>(
    path: &Path,
    workbook: std::result::Result<R, R::Error>,
    deep: bool,
) -> Result<Vec<String>>
where
    RS: Read + Seek,
    R: Reader<RS>,
    R::Error: Display,
{
    let mut workbook = workbook.map_err(|e| SheetCheckError::ParseError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let sheets = workbook.sheet_names();

    if deep {
        for name in &sheets {
            workbook
                .worksheet_range(name)
                .map_err(|e| SheetCheckError::ParseError {
                    file: path.to_path_buf(),
                    reason: format!("시트 '{}': {}", name, e),
                })?;
        }
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_check_options_builder() {
        let options = CheckOptions::new()
            .with_remove(true)
            .with_sheets(true)
            .with_deep(false);

        assert!(options.remove_unparsable);
        assert!(options.collect_sheets);
        assert!(!options.deep);
        assert_eq!(options.mmap_threshold, 10 * 1024 * 1024);
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert_eq!(panic_message(payload.as_ref()), "owned boom");

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "알 수 없는 패닉");
    }

    #[test]
    fn test_default_matches_new() {
        let options = CheckOptions::default();
        assert_eq!(options.mmap_threshold, CheckOptions::new().mmap_threshold);
        assert!(!options.remove_unparsable);
    }

    #[test]
    fn test_guard_turns_panic_into_error() {
        let path = Path::new("boom.xlsx");
        let result: Result<Vec<String>> = guard(path, || panic!("index out of range: 7"));

        match result {
            Err(SheetCheckError::Panicked { file, reason }) => {
                assert_eq!(file, path);
                assert_eq!(reason, "index out of range: 7");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!is_guarded());
    }

    #[test]
    fn test_guard_passes_through_results() {
        let path = Path::new("ok.xlsx");

        let ok = guard(path, || Ok(vec!["Sheet1".to_string()])).unwrap();
        assert_eq!(ok, vec!["Sheet1"]);

        let err: Result<()> = guard(path, || {
            Err(SheetCheckError::ParseError {
                file: path.to_path_buf(),
                reason: "bad zip".to_string(),
            })
        });
        assert!(matches!(err, Err(SheetCheckError::ParseError { .. })));
    }

    #[test]
    fn test_guard_flag_is_scoped() {
        assert!(!is_guarded());
        let inside = guard(Path::new("a.xls"), || Ok(is_guarded())).unwrap();
        assert!(inside);
        assert!(!is_guarded());

        // 패닉 후에도 플래그가 복원됨
        let _ = guard(Path::new("b.xls"), || -> Result<()> { panic!("boom") });
        assert!(!is_guarded());
    }

    #[test]
    fn test_unsupported_file_is_skipped_and_kept() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "notes", b"no extension here");

        let options = CheckOptions::new().with_remove(true);
        let result = check_file(path.clone(), &options);

        assert!(result.is_skipped());
        assert!(result.format.is_none());
        assert!(!result.removed);
        assert!(path.exists());
    }

    #[test]
    fn test_garbage_xls_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "broken.xls", b"definitely not BIFF");

        let result = check_file(path.clone(), &CheckOptions::new());

        assert!(result.is_invalid());
        assert_eq!(result.format, Some(SpreadsheetFormat::Xls));
        assert!(result.summary().is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_garbage_is_removed_when_requested() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "broken.xlsx", b"PK\x03\x04 truncated");

        let result = check_file(path.clone(), &CheckOptions::new().with_remove(true));

        assert!(result.is_invalid());
        assert!(result.removed);
        assert!(!path.exists());
    }

    #[test]
    fn test_garbage_via_mmap_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_file(temp_dir.path(), "big.ods", &[0xAB; 4096]);

        let options = CheckOptions::new().with_mmap_threshold(1);
        let result = check_file(path, &options);

        assert!(matches!(
            result.error(),
            Some(SheetCheckError::ParseError { .. })
        ));
    }

    #[test]
    fn test_remove_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = remove_file(&temp_dir.path().join("gone.xlsx"));
        assert!(matches!(result, Err(SheetCheckError::RemoveError { .. })));
    }
}
