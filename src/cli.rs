//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.

use clap::Parser;
use std::path::PathBuf;

use crate::processor::CheckOptions;
use crate::scanner::ScanOptions;

/// sheetcheck CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "sheetcheck",
    author = "YourName <your@email.com>",
    version,
    about = "SPREADSHEET FOLDER VALIDATOR - 폴더 내 스프레드시트 파일을 병렬로 검사하는 CLI 도구",
    long_about = r#"
SPREADSHEET FOLDER VALIDATOR
============================

지정된 폴더의 모든 파일을 형식에 맞는 파서(xls, xlsx/xlsm, xlsb, ods)로
열어 보고, 파싱할 수 없는 파일을 보고하거나 삭제합니다.

특징:
  • 파일마다 병렬로 검사
  • 파서가 비정상 종료해도 해당 파일만 실패로 처리
  • 시트 목록 출력 (텍스트 또는 JSON Lines)
  • 전체 워크시트를 읽는 정밀 검사

예제:
  sheetcheck ./reports
  sheetcheck -s ./reports
  sheetcheck -r ./reports
  sheetcheck -s --json --recursive ./reports
  sheetcheck --deep --log errors.txt ./reports
"#
)]
pub struct Args {
    /// 검사할 폴더 경로
    pub input: PathBuf,

    /// 파싱할 수 없는 파일 삭제
    #[arg(short, long)]
    pub remove: bool,

    /// 파일마다 포함된 시트 목록 출력
    #[arg(short, long)]
    pub sheets: bool,

    /// 모든 워크시트의 셀 범위까지 읽어서 검사
    #[arg(long)]
    pub deep: bool,

    /// 파일 이름 패턴 필터 (glob 형식, 예: "*_2024.xlsx")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 하위 폴더까지 탐색
    #[arg(long)]
    pub recursive: bool,

    /// 최대 폴더 탐색 깊이 (--recursive 와 함께 사용)
    #[arg(long, requires = "recursive")]
    pub max_depth: Option<usize>,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 실제 검사 없이 대상 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 시트 목록을 JSON Lines 형식으로 출력
    #[arg(long)]
    pub json: bool,

    /// 실패 목록을 기록할 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// 상세 출력 모드
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// 헤더, 진행률, 통계 출력 안 함
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// 파일 검사 옵션
    pub fn check_options(&self) -> CheckOptions {
        CheckOptions::new()
            .with_remove(self.remove)
            .with_sheets(self.sheets)
            .with_deep(self.deep)
    }

    /// 폴더 탐색 옵션
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            recursive: self.recursive,
            max_depth: self.max_depth,
        }
    }
}
