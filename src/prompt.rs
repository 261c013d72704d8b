use colored::*;
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// The user-facing side of a trigger: ask before, report after.
pub trait Interaction {
    fn confirm(&self, title: &str, message: &str) -> io::Result<bool>;

    fn notify(&self, kind: NoticeKind, title: &str, message: &str);
}

pub struct Terminal;

impl Terminal {
    fn confirm_with<R: BufRead, W: Write>(
        input: &mut R,
        output: &mut W,
        title: &str,
        message: &str,
    ) -> io::Result<bool> {
        writeln!(output, "{}", title.bold())?;
        write!(output, "{} [y/N] ", message)?;
        output.flush()?;

        let mut answer = String::new();
        input.read_line(&mut answer)?;
        Ok(is_affirmative(&answer))
    }
}

impl Interaction for Terminal {
    fn confirm(&self, title: &str, message: &str) -> io::Result<bool> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        Self::confirm_with(&mut stdin.lock(), &mut stdout, title, message)
    }

    fn notify(&self, kind: NoticeKind, title: &str, message: &str) {
        match kind {
            NoticeKind::Success => println!("{} {}: {}", "✓".green(), title.green().bold(), message),
            NoticeKind::Error => eprintln!("{} {}: {}", "✗".red(), title.red().bold(), message),
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
