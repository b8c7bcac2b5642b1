//! 패턴 매칭 모듈
//!
//! glob 패턴으로 검사 대상 파일 이름을 거릅니다.

use glob::{MatchOptions, Pattern};

use crate::error::{Result, SheetCheckError};

/// 대소문자를 구분하지 않는 매칭 옵션
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// 컴파일된 파일 이름 필터
#[derive(Debug, Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 글로브 패턴 문자열 (None이면 모든 파일 매칭)
    ///
    /// # Examples
    /// ```
    /// use sheetcheck::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("report_*".to_string())).unwrap();
    /// assert!(matcher.matches("report_2024.xlsx"));
    /// assert!(matcher.matches("REPORT_old.xls"));
    /// assert!(!matcher.matches("budget.xlsx"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let pattern = pattern
            .map(|p| Pattern::new(&p).map_err(|_| SheetCheckError::InvalidPattern { pattern: p }))
            .transpose()?;

        Ok(Self { pattern })
    }

    /// 파일 이름이 패턴과 일치하는지 확인 (패턴이 없으면 항상 true)
    pub fn matches(&self, file_name: &str) -> bool {
        self.pattern
            .as_ref()
            .map_or(true, |p| p.matches_with(file_name, MATCH_OPTIONS))
    }

    /// 패턴 문자열
    pub fn as_str(&self) -> Option<&str> {
        self.pattern.as_ref().map(Pattern::as_str)
    }
}
