//! 폴더 탐색 모듈
//!
//! 검사할 파일 목록을 수집합니다. 기본값은 지정한 폴더의 직속 파일만입니다.

use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

use crate::error::{Result, SheetCheckError};
use crate::pattern::PatternMatcher;

/// 탐색 옵션
#[derive(Debug, Clone, Copy, Default)]
pub struct ScanOptions {
    /// 하위 폴더까지 탐색
    pub recursive: bool,
    /// 재귀 탐색 시 최대 깊이 (None이면 무제한)
    pub max_depth: Option<usize>,
}

impl ScanOptions {
    /// walkdir 에 넘길 최대 깊이
    fn walk_depth(&self) -> usize {
        if self.recursive {
            self.max_depth.unwrap_or(usize::MAX).max(1)
        } else {
            1
        }
    }
}

/// 입력 경로 유효성 검사
pub fn validate_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        return Err(SheetCheckError::InputNotFound {
            path: dir.to_path_buf(),
        });
    }

    if !dir.is_dir() {
        return Err(SheetCheckError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    Ok(())
}

/// 검사 대상 파일 수집 (정렬된 순서)
///
/// 최상위 폴더를 읽지 못하면 에러, 하위 항목 오류는 경고만 남기고 계속합니다.
pub fn collect_files(
    dir: &Path,
    options: &ScanOptions,
    matcher: &PatternMatcher,
) -> Result<Vec<PathBuf>> {
    validate_dir(dir)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).max_depth(options.walk_depth()) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(SheetCheckError::ScanError {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!("탐색 중 오류: {}", e);
                continue;
            }
        };

        if !entry.path().is_file() {
            continue;
        }

        let name_matches = entry
            .file_name()
            .to_str()
            .map(|name| matcher.matches(name))
            .unwrap_or(false);

        if name_matches {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}
