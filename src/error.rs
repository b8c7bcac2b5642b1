//! 에러 타입 정의 모듈
//!
//! sheetcheck에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// sheetcheck에서 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum SheetCheckError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    InputNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 폴더 탐색 실패
    #[error("폴더를 읽을 수 없습니다 ({path}): {reason}")]
    ScanError { path: PathBuf, reason: String },

    /// 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// 스프레드시트 파싱 실패
    #[error("스프레드시트 파싱 실패 ({file}): {reason}")]
    ParseError { file: PathBuf, reason: String },

    /// 파서 내부 패닉
    #[error("파서가 비정상 종료되었습니다 ({file}): {reason}")]
    Panicked { file: PathBuf, reason: String },

    /// 파일 삭제 실패
    #[error("파일 삭제 실패 ({file}): {reason}")]
    RemoveError { file: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPoolError { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },
}

/// sheetcheck 결과 타입 별칭
pub type Result<T> = std::result::Result<T, SheetCheckError>;
