//! Interactive question loop.
//!
//! Generic over the input stream, the output sink and the question handler
//! ([`Asker`]) so it can be driven from tests or reused by another front-end.
//! Turns are strictly sequential; a shutdown signal (Ctrl-C) ends the loop
//! whether it is waiting for input or a turn is in flight.

use std::future::Future;
use std::io::{self, Write};
use std::pin::Pin;

use contextor::{ContextorError, FaqAnswerer, IndicatifProgress};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{error, info};

const RULE_WIDTH: usize = 50;

pub const PROMPT: &str = "\nYour question: ";
pub const FAREWELL: &str = "\nThank you for using the FAQ RAG System. Goodbye!";
pub const EMPTY_HINT: &str = "Please enter a question or type 'exit' to quit.";

pub type AskFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ContextorError>> + Send + 'a>>;

/// Per-question handler used by the loop.
pub trait Asker: Send + Sync {
    fn answer<'a>(&'a self, question: &'a str) -> AskFuture<'a>;
}

impl Asker for FaqAnswerer {
    fn answer<'a>(&'a self, question: &'a str) -> AskFuture<'a> {
        Box::pin(async move {
            let progress = IndicatifProgress::spinner();
            Ok(self.ask_with_progress(question, &progress).await.answer)
        })
    }
}

/// Why the loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplExit {
    /// `exit` / `quit` typed.
    Command,
    /// Input stream closed.
    EndOfInput,
    /// Shutdown signal received.
    Interrupted,
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Exit,
    Empty,
    Question(&'a str),
}

fn classify(raw: &str) -> Line<'_> {
    let q = raw.trim();
    if q.eq_ignore_ascii_case("exit") || q.eq_ignore_ascii_case("quit") {
        Line::Exit
    } else if q.is_empty() {
        Line::Empty
    } else {
        Line::Question(q)
    }
}

pub fn print_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "    ╔═══════════════════════════════════════════╗")?;
    writeln!(out, "    ║           FAQ RAG System                  ║")?;
    writeln!(out, "    ║  Ask questions about the indexed FAQ      ║")?;
    writeln!(out, "    ║  Type 'exit' or 'quit' to end the session ║")?;
    writeln!(out, "    ╚═══════════════════════════════════════════╝")?;
    writeln!(out)
}

pub fn print_ready<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "\nRAG System is ready!")?;
    writeln!(
        out,
        "Enter your questions below. Type 'exit' or 'quit' to end the session."
    )?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))
}

fn print_frame<W: Write>(out: &mut W, question: &str, answer: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "Question: {question}")?;
    writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
    writeln!(out, "Answer: {answer}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Runs the loop until an exit command, end of input, or `shutdown` resolves.
///
/// Only console I/O errors are returned; a failing turn is reported to the
/// user and the loop continues.
pub async fn run_loop<R, W, A, S>(
    input: R,
    out: &mut W,
    asker: &A,
    shutdown: S,
) -> io::Result<ReplExit>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    A: Asker + ?Sized,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut lines = input.lines();

    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        let next = tokio::select! {
            _ = &mut shutdown => {
                writeln!(out, "\n\nExiting...")?;
                return Ok(ReplExit::Interrupted);
            }
            line = lines.next_line() => line?,
        };

        let Some(raw) = next else {
            writeln!(out, "{FAREWELL}")?;
            return Ok(ReplExit::EndOfInput);
        };

        let question = match classify(&raw) {
            Line::Exit => {
                writeln!(out, "{FAREWELL}")?;
                return Ok(ReplExit::Command);
            }
            Line::Empty => {
                writeln!(out, "{EMPTY_HINT}")?;
                continue;
            }
            Line::Question(q) => q,
        };

        writeln!(out, "\nSearching for answers...")?;
        out.flush()?;

        let result = tokio::select! {
            _ = &mut shutdown => {
                writeln!(out, "\n\nExiting...")?;
                return Ok(ReplExit::Interrupted);
            }
            r = asker.answer(question) => r,
        };

        match result {
            Ok(answer) => print_frame(out, question, &answer)?,
            Err(e) => {
                error!(kind = ?e.kind(), error = %e, details = ?e, "turn failed");
                writeln!(out, "\nAn error occurred: {e}")?;
                writeln!(out, "Please try again or type 'exit' to quit.")?;
            }
        }
        info!(question_len = question.len(), "turn completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::AiLlmError;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use std::sync::Mutex;

    /// Echoes the question; fails on "boom".
    #[derive(Default)]
    struct EchoAsker {
        seen: Mutex<Vec<String>>,
    }

    impl EchoAsker {
        fn calls(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl Asker for EchoAsker {
        fn answer<'a>(&'a self, question: &'a str) -> AskFuture<'a> {
            self.seen.lock().unwrap().push(question.to_string());
            Box::pin(async move {
                if question == "boom" {
                    Err(ContextorError::from(AiLlmError::from(ProviderError::new(
                        Provider::Gemini,
                        ProviderErrorKind::Decode("exploded".into()),
                    ))))
                } else {
                    Ok(format!("echo: {question}"))
                }
            })
        }
    }

    /// Never answers; used to interrupt an in-flight turn.
    struct StuckAsker;

    impl Asker for StuckAsker {
        fn answer<'a>(&'a self, _question: &'a str) -> AskFuture<'a> {
            Box::pin(std::future::pending())
        }
    }

    async fn drive<A: Asker>(input: &str, asker: &A) -> (ReplExit, String) {
        let mut out = Vec::new();
        let exit = run_loop(input.as_bytes(), &mut out, asker, std::future::pending())
            .await
            .unwrap();
        (exit, String::from_utf8(out).unwrap())
    }

    #[test]
    fn exit_words_are_case_and_space_insensitive() {
        assert_eq!(classify("exit"), Line::Exit);
        assert_eq!(classify("EXIT"), Line::Exit);
        assert_eq!(classify("  quit  "), Line::Exit);
        assert_eq!(classify("   "), Line::Empty);
        assert_eq!(classify(" exit now "), Line::Question("exit now"));
    }

    #[tokio::test]
    async fn one_call_per_question_line() {
        let asker = EchoAsker::default();
        let (exit, out) = drive("first?\n\n   \n  second?  \nQUIT\nignored\n", &asker).await;

        assert_eq!(exit, ReplExit::Command);
        assert_eq!(asker.calls(), vec!["first?", "second?"]);
        assert_eq!(out.matches(EMPTY_HINT).count(), 2);
        assert!(out.contains("Question: second?\n"));
        assert!(out.contains("Answer: echo: second?\n"));
        assert!(out.contains(&format!("{}\nQuestion: first?", "=".repeat(50))));
        assert!(out.ends_with(&format!("{FAREWELL}\n")));
    }

    #[tokio::test]
    async fn end_of_input_behaves_like_exit() {
        let asker = EchoAsker::default();
        let (exit, out) = drive("hello\n", &asker).await;
        assert_eq!(exit, ReplExit::EndOfInput);
        assert!(out.contains(FAREWELL));
        assert_eq!(asker.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_turn_keeps_loop_running() {
        let asker = EchoAsker::default();
        let (exit, out) = drive("boom\nafter\nexit\n", &asker).await;
        assert_eq!(exit, ReplExit::Command);
        assert!(out.contains("An error occurred: generation error:"));
        assert!(out.contains("decode error: exploded"));
        assert!(out.contains("Please try again or type 'exit' to quit."));
        assert!(out.contains("Answer: echo: after"));
    }

    #[tokio::test]
    async fn shutdown_while_waiting_for_input() {
        let (_tx, rx) = tokio::io::duplex(64);
        let mut out = Vec::new();
        let exit = run_loop(
            tokio::io::BufReader::new(rx),
            &mut out,
            &EchoAsker::default(),
            async {},
        )
        .await
        .unwrap();
        assert_eq!(exit, ReplExit::Interrupted);
        assert!(String::from_utf8(out).unwrap().contains("Exiting..."));
    }

    #[tokio::test]
    async fn shutdown_during_turn() {
        let mut out = Vec::new();
        let exit = run_loop(
            "slow question\n".as_bytes(),
            &mut out,
            &StuckAsker,
            tokio::time::sleep(std::time::Duration::from_millis(20)),
        )
        .await
        .unwrap();
        assert_eq!(exit, ReplExit::Interrupted);
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Searching for answers..."));
        assert!(!out.contains("Answer:"));
    }
}
