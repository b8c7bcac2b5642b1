//! 결과 집계 레코드 모듈

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// 파싱에 성공한 파일 하나의 시트 목록
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// 파일 경로
    pub path: PathBuf,
    /// 통합 문서 순서대로의 시트 이름
    pub sheets: Vec<String>,
}

impl FileSummary {
    pub fn new(path: PathBuf, sheets: Vec<String>) -> Self {
        Self { path, sheets }
    }

    /// 한 줄짜리 JSON 객체로 직렬화
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// 경로 한 줄, 그 아래 시트마다 탭 들여쓰기 한 줄
impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path.display())?;
        for sheet in &self.sheets {
            writeln!(f, "\t{}", sheet)?;
        }
        Ok(())
    }
}
