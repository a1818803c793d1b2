//! Interactive questions on stdin
//!
//! Prompts are written to stderr so that stdout only carries the report.
//! Answers come from the process-wide stdin buffer, so lines piped in ahead
//! of time are kept for the questions that follow.

use std::io::{self, BufRead};
use tokio::io::AsyncWriteExt;
use tokio::sync::oneshot;

use docsieve::utils::error::InputError;

/// Ask `question` on the terminal and read one line of answer
///
/// The read happens on a detached thread: a blocking stdin read cannot be
/// cancelled, and an interrupted run must not wait for it.
pub async fn ask(question: &str) -> Result<String, InputError> {
    let mut stderr = tokio::io::stderr();
    stderr.write_all(question.as_bytes()).await?;
    stderr.flush().await?;

    let (tx, rx) = oneshot::channel();
    std::thread::Builder::new()
        .name("docsieve-prompt".to_string())
        .spawn(move || {
            let _ = tx.send(read_answer(&mut io::stdin().lock()));
        })?;

    rx.await.map_err(|_| {
        InputError::Prompt(io::Error::new(
            io::ErrorKind::BrokenPipe,
            "prompt reader stopped without an answer",
        ))
    })?
}

/// Read one answer line, without its line terminator
///
/// End of input before any answer is an error rather than an empty answer.
pub fn read_answer<R>(reader: &mut R) -> Result<String, InputError>
where
    R: BufRead + ?Sized,
{
    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    if read == 0 {
        return Err(InputError::Prompt(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "input closed before an answer was given",
        )));
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
