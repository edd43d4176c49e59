use crate::process::ProcessId;
use tokio::io::AsyncRead;
use tokio_stream::StreamExt;
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, FramedRead};
use tracing::{info, warn};

/// Longest line emitted as one log event; longer output is split.
const MAX_LINE_LEN: usize = 64 * 1024;

/// Which standard stream of the backend a line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BackendStream {
    #[display("stdout")]
    Stdout,
    #[display("stderr")]
    Stderr,
}

/// Splits process output into lines.
///
/// Invalid UTF-8 is replaced rather than rejected, a trailing `\r` is dropped and a
/// final line without a newline is still emitted at EOF.
#[derive(Debug, Default)]
pub struct LogLineCodec;

impl Decoder for LogLineCodec {
    type Item = String;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let newline = src
            .iter()
            .take(MAX_LINE_LEN + 1)
            .position(|b| *b == b'\n');
        match newline {
            Some(newline) => {
                let line = src.split_to(newline + 1);
                Ok(Some(decode_line(&line)))
            }
            None if src.len() > MAX_LINE_LEN => {
                let cut = split_point(src);
                let chunk = src.split_to(cut);
                Ok(Some(decode_line(&chunk)))
            }
            None => Ok(None),
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        if src.is_empty() {
            return Ok(None);
        }
        let rest = src.split();
        Ok(Some(decode_line(&rest)))
    }
}

/// Cut an overlong line at `MAX_LINE_LEN`, backing off to the start of a UTF-8
/// sequence so no character is torn in half.
fn split_point(src: &[u8]) -> usize {
    let mut cut = MAX_LINE_LEN;
    // A sequence is at most 4 bytes; past that the input isn't UTF-8 anyway.
    while cut > MAX_LINE_LEN - 3 && is_continuation(src[cut]) {
        cut -= 1;
    }
    if is_continuation(src[cut]) {
        MAX_LINE_LEN
    } else {
        cut
    }
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

fn decode_line(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_end_matches(['\n', '\r'])
        .to_string()
}

/// Feed every line read from `io` to `on_line`, returning how many lines were seen.
pub async fn forward_lines<R, F>(io: R, mut on_line: F) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut frames = FramedRead::with_capacity(io, LogLineCodec, 1024);
    let mut count = 0;
    while let Some(frame) = frames.next().await {
        let line = frame?;
        on_line(&line);
        count += 1;
    }
    Ok(count)
}

/// Forward a backend output stream to the log, one event per non-empty line.
pub async fn forward_to_log<R>(
    io: R,
    stream: BackendStream,
    pid: Option<ProcessId>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    forward_lines(io, |line| {
        if line.trim().is_empty() {
            return;
        }
        match stream {
            BackendStream::Stdout => {
                info!(target: "backend", pid = ?pid, stream = %stream, "{line}")
            }
            BackendStream::Stderr => {
                warn!(target: "backend", pid = ?pid, stream = %stream, "{line}")
            }
        }
    })
    .await
    .map(|_| ())
}
