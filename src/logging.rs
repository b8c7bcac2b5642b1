//! 로깅 초기화 모듈
//!
//! tracing 로그를 표준 에러로 보내되, 진행률 바를 잠시 지운 뒤 출력합니다.

use indicatif::ProgressBar;
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::processor::install_panic_hook;

/// 진행률 바와 겹치지 않게 쓰는 writer 생성기
#[derive(Clone)]
pub struct ProgressWriter {
    progress: ProgressBar,
}

impl ProgressWriter {
    pub fn new(progress: ProgressBar) -> Self {
        Self { progress }
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = SuspendingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendingWriter {
            progress: self.progress.clone(),
            buf: Vec::new(),
        }
    }
}

/// 로그 한 건을 모아 두었다가 flush/drop 시 한 번에 출력
pub struct SuspendingWriter {
    progress: ProgressBar,
    buf: Vec<u8>,
}

impl Write for SuspendingWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let buf = std::mem::take(&mut self.buf);
        self.progress
            .suspend(|| io::stderr().lock().write_all(&buf))
    }
}

impl Drop for SuspendingWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// 로깅 초기화 (RUST_LOG 우선, 없으면 warn / verbose 시 info)
///
/// 파서 패닉 훅도 함께 설치합니다.
pub fn init_logging(verbose: bool, progress: &ProgressBar) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(ProgressWriter::new(progress.clone()))
        .with_target(false)
        .init();

    install_panic_hook();
}
