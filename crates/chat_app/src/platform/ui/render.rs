use std::io::{self, Write};

use chat_core::{Author, Bubble, ChatViewModel};

const TYPING_FRAMES: [&str; 3] = [".  ", ".. ", "..."];

type Clock = Box<dyn Fn() -> String + Send>;

/// Prints the transcript to a line-oriented terminal.
///
/// Bubbles are printed once, in order. A trailing status bubble is pending:
/// it goes to the indicator stream and never reaches the transcript, since
/// the next outcome replaces it.
pub struct TranscriptRenderer<W: Write, E: Write> {
    out: W,
    indicator: E,
    clock: Clock,
    printed: usize,
    shown_status: Option<String>,
    typing_frame: Option<usize>,
}

impl<W: Write, E: Write> TranscriptRenderer<W, E> {
    pub fn new(out: W, indicator: E) -> Self {
        Self::with_clock(
            out,
            indicator,
            Box::new(|| chrono::Local::now().format("%H:%M:%S").to_string()),
        )
    }

    pub fn with_clock(out: W, indicator: E, clock: Clock) -> Self {
        Self {
            out,
            indicator,
            clock,
            printed: 0,
            shown_status: None,
            typing_frame: None,
        }
    }

    pub fn greet(&mut self, base_url: &str) -> io::Result<()> {
        writeln!(self.out, "Connected to {base_url}.")?;
        writeln!(self.out, "Ask a question, or type /quit to leave.")?;
        self.out.flush()
    }

    pub fn render(&mut self, view: &ChatViewModel) -> io::Result<()> {
        let mut pending = None;
        for bubble in view.bubbles.iter().skip(self.printed) {
            if bubble.author == Author::Status {
                pending = Some(bubble.text.clone());
                break;
            }
            self.clear_indicator()?;
            writeln!(self.out, "{}", format_bubble(bubble, &(self.clock)()))?;
            self.printed += 1;
        }
        self.out.flush()?;

        if pending.is_some() && pending != self.shown_status {
            self.clear_indicator()?;
            if let Some(text) = &pending {
                write!(self.indicator, "{text}")?;
            }
        } else if pending.is_none() && self.shown_status.is_some() {
            self.clear_indicator()?;
        }
        self.shown_status = pending;

        if view.typing && self.typing_frame.is_none() {
            self.typing_frame = Some(0);
            write!(self.indicator, "\r{}", TYPING_FRAMES[0])?;
        } else if !view.typing && self.typing_frame.is_some() {
            self.clear_indicator()?;
        }
        self.indicator.flush()
    }

    /// Advances the typing animation; called on every tick.
    pub fn animate(&mut self) -> io::Result<()> {
        if let Some(frame) = self.typing_frame {
            let next = (frame + 1) % TYPING_FRAMES.len();
            self.typing_frame = Some(next);
            write!(self.indicator, "\r{}", TYPING_FRAMES[next])?;
            self.indicator.flush()?;
        }
        Ok(())
    }

    fn clear_indicator(&mut self) -> io::Result<()> {
        let had_status = self.shown_status.take().is_some();
        let had_typing = self.typing_frame.take().is_some();
        if had_status || had_typing {
            write!(self.indicator, "\r\x1b[2K")?;
        }
        Ok(())
    }

    #[cfg(test)]
    fn into_parts(self) -> (W, E) {
        (self.out, self.indicator)
    }
}

fn format_bubble(bubble: &Bubble, timestamp: &str) -> String {
    let who = match bubble.author {
        Author::User => "you",
        Author::Bot => "bot",
        Author::Status => "...",
    };
    format!("[{timestamp}] {who}: {}", bubble.text)
}
