//! JSONL 스트리밍 인코더
//!
//! 레코드를 한 줄에 하나씩 싱크에 기록합니다. 줄 사이에는 `\n` 하나만 들어가며
//! 앞뒤에 구분자가 붙지 않습니다. 레코드 내부의 줄바꿈 바이트(`\n`, `\r`)는 제거되므로
//! 원문 그대로 전달되는 값(`RawValue`)에 줄바꿈이 있어도 한 줄이 유지됩니다.
//!
//! 인코더는 스레드 간 공유하지 않습니다. 워커마다 하나씩 둡니다.
//!
//! 싱크 쓰기가 실패하면 레코드 일부가 이미 싱크에 들어갔을 수 있습니다.
//! 그 뒤의 `encode`는 [`EncodeError::Poisoned`]를 반환하며, [`JsonlEncoder::reset`]으로
//! 새 싱크를 넣어야 다시 쓸 수 있습니다. 실패한 싱크의 내용은 호출자가 버립니다.
//!
//! # 사용 예시
//! ```
//! use normlog_log_pipeline::encoder::JsonlEncoder;
//!
//! let mut encoder = JsonlEncoder::new(Vec::new());
//! encoder.encode("foo").unwrap();
//! encoder.encode(&serde_json::json!({"a": 1})).unwrap();
//! assert_eq!(encoder.num_lines(), 2);
//! assert_eq!(encoder.get_ref().as_slice(), b"\"foo\"\n{\"a\":1}");
//! ```

use std::io::Write;

use normlog_core::error::EncodeError;
use normlog_core::metrics as m;
use serde::Serialize;

/// 스크래치 버퍼 기본 초기 용량
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

const SEPARATOR: u8 = b'\n';

/// 줄바꿈 바이트인지 확인합니다.
#[inline]
fn is_line_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// 버퍼 앞쪽으로 줄바꿈을 제외한 바이트를 당겨 모으고, 남은 길이를 반환합니다.
///
/// 읽기 커서와 쓰기 커서를 따로 두고 앞으로만 진행합니다.
/// 쓰기 커서는 읽기 커서를 앞지르지 않으므로 같은 버퍼 위에서 안전하게 동작합니다.
pub fn compact_lines(buf: &mut [u8]) -> usize {
    let mut write = 0;
    for read in 0..buf.len() {
        let b = buf[read];
        if is_line_break(b) {
            continue;
        }
        if write != read {
            buf[write] = b;
        }
        write += 1;
    }
    write
}

/// 버퍼에서 줄바꿈을 제거합니다.
pub fn join_lines(buf: &mut Vec<u8>) {
    let len = compact_lines(buf);
    buf.truncate(len);
}

/// `src`를 줄바꿈 없이 `dst` 뒤에 덧붙입니다.
pub fn append_join_lines(dst: &mut Vec<u8>, src: &[u8]) {
    dst.reserve(src.len());
    for chunk in src.split(|b| is_line_break(*b)) {
        dst.extend_from_slice(chunk);
    }
}

/// JSONL 인코더
pub struct JsonlEncoder<W> {
    sink: W,
    scratch: Vec<u8>,
    num_lines: usize,
    max_retained_capacity: Option<usize>,
    poisoned: bool,
}

impl<W: Write> JsonlEncoder<W> {
    pub fn new(sink: W) -> Self {
        Self::with_capacity(sink, DEFAULT_BUFFER_CAPACITY)
    }

    /// 스크래치 버퍼 초기 용량을 지정해 생성합니다.
    pub fn with_capacity(sink: W, capacity: usize) -> Self {
        Self {
            sink,
            scratch: Vec::with_capacity(capacity),
            num_lines: 0,
            max_retained_capacity: None,
            poisoned: false,
        }
    }

    /// 큰 레코드로 늘어난 스크래치 버퍼를 쓰기 후 이 용량까지 줄입니다.
    pub fn with_max_retained_capacity(mut self, max: usize) -> Self {
        self.max_retained_capacity = Some(max);
        self
    }

    /// 값 하나를 한 줄로 기록합니다.
    ///
    /// 직렬화에 실패하면 싱크에 아무것도 쓰지 않고 줄 수도 바뀌지 않습니다.
    /// 싱크 쓰기에 실패하면 에러를 반환하고 인코더는 `reset` 전까지 사용할 수 없습니다.
    /// 이전에 기록된 줄은 그대로 남습니다.
    pub fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        if self.poisoned {
            metrics::counter!(m::ENCODER_ERRORS_TOTAL).increment(1);
            return Err(EncodeError::Poisoned);
        }
        let result = self.encode_line(value);
        if matches!(result, Err(EncodeError::Io(_))) {
            self.poisoned = true;
        }
        self.trim_scratch();
        match result {
            Ok(()) => {
                self.num_lines += 1;
                metrics::counter!(m::ENCODER_LINES_TOTAL).increment(1);
                Ok(())
            }
            Err(e) => {
                metrics::counter!(m::ENCODER_ERRORS_TOTAL).increment(1);
                Err(e)
            }
        }
    }

    fn encode_line<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), EncodeError> {
        self.scratch.clear();
        if self.num_lines > 0 {
            self.scratch.push(SEPARATOR);
        }
        let start = self.scratch.len();
        serde_json::to_writer(&mut self.scratch, value)?;

        let len = compact_lines(&mut self.scratch[start..]);
        self.scratch.truncate(start + len);

        self.sink.write_all(&self.scratch)?;
        Ok(())
    }

    fn trim_scratch(&mut self) {
        self.scratch.clear();
        if let Some(max) = self.max_retained_capacity {
            if self.scratch.capacity() > max {
                self.scratch.shrink_to(max);
            }
        }
    }

    /// 싱크를 flush합니다.
    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.sink.flush()?;
        Ok(())
    }

    /// 기록한 줄 수 (생성 또는 마지막 `reset` 이후)
    pub fn num_lines(&self) -> usize {
        self.num_lines
    }

    /// 싱크 쓰기 실패 이후 `reset`을 기다리는 상태인지 확인합니다.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// 싱크를 교체하고 이전 싱크를 반환합니다. 줄 수는 0으로 돌아가고 사용 불가 상태도 풀립니다.
    ///
    /// 스크래치 버퍼는 재사용됩니다.
    pub fn reset(&mut self, sink: W) -> W {
        self.num_lines = 0;
        self.poisoned = false;
        std::mem::replace(&mut self.sink, sink)
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
