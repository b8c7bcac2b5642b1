//! 파일 형식 판별 모듈
//!
//! 확장자를 보고 어떤 스프레드시트 리더를 쓸지 결정합니다.

use std::fmt;
use std::path::Path;

/// 지원하는 스프레드시트 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpreadsheetFormat {
    /// 레거시 바이너리 형식 (BIFF, .xls)
    Xls,
    /// Office Open XML 형식 (.xlsx, .xlsm)
    Xlsx,
    /// Excel 바이너리 통합 문서 (.xlsb)
    Xlsb,
    /// OpenDocument 스프레드시트 (.ods)
    Ods,
}

impl SpreadsheetFormat {
    /// 경로의 마지막 확장자로 형식 판별 (대소문자 무시)
    ///
    /// ```
    /// use std::path::Path;
    /// use sheetcheck::format::SpreadsheetFormat;
    ///
    /// assert_eq!(
    ///     SpreadsheetFormat::from_path(Path::new("report.2024.XLSX")),
    ///     Some(SpreadsheetFormat::Xlsx)
    /// );
    /// assert_eq!(SpreadsheetFormat::from_path(Path::new("README")), None);
    /// ```
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xls" => Some(Self::Xls),
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xlsb" => Some(Self::Xlsb),
            "ods" => Some(Self::Ods),
            _ => None,
        }
    }
}

impl fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xls => write!(f, "xls"),
            Self::Xlsx => write!(f, "xlsx"),
            Self::Xlsb => write!(f, "xlsb"),
            Self::Ods => write!(f, "ods"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions() {
        let cases = [
            ("a.xls", SpreadsheetFormat::Xls),
            ("a.xlsx", SpreadsheetFormat::Xlsx),
            ("a.xlsm", SpreadsheetFormat::Xlsx),
            ("a.xlsb", SpreadsheetFormat::Xlsb),
            ("a.ods", SpreadsheetFormat::Ods),
            ("A.XLS", SpreadsheetFormat::Xls),
        ];
        for (name, expected) in cases {
            assert_eq!(SpreadsheetFormat::from_path(Path::new(name)), Some(expected));
        }
    }

    #[test]
    fn test_uses_last_extension() {
        // 첫 번째 점이 아니라 마지막 확장자 기준
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("data/v1.2.xls")),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(SpreadsheetFormat::from_path(Path::new("book.xlsx.bak")), None);
    }

    #[test]
    fn test_unsupported() {
        assert_eq!(SpreadsheetFormat::from_path(Path::new("notes.txt")), None);
        assert_eq!(SpreadsheetFormat::from_path(Path::new("noext")), None);
        assert_eq!(SpreadsheetFormat::from_path(Path::new(".xlsx")), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(SpreadsheetFormat::Xlsb.to_string(), "xlsb");
        assert_eq!(SpreadsheetFormat::Ods.to_string(), "ods");
    }
}
