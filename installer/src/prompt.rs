//! Interactive yes/no confirmation.

use std::io::{self, BufRead, Write};

const PROMPT: &str = "yes/no: ";

/// Ask `question` and wait for a yes or no answer.
///
/// `yes`/`y` and `no`/`n` are accepted, ignoring case and surrounding
/// whitespace; anything else repeats the prompt. End of input counts as no.
///
/// # Errors
///
/// Returns any I/O error from reading `input` or writing `output`.
///
/// # Examples
///
/// ```
/// use goenv::prompt::confirm;
///
/// let mut output = Vec::new();
/// let answer = confirm("Set up /usr/local/go?", &mut "maybe\ny\n".as_bytes(), &mut output)?;
/// assert!(answer);
/// assert_eq!(
///     String::from_utf8(output).unwrap_or_default(),
///     "Set up /usr/local/go?\nyes/no: yes/no: "
/// );
/// # Ok::<(), std::io::Error>(())
/// ```
pub fn confirm(question: &str, input: &mut dyn BufRead, output: &mut dyn Write) -> io::Result<bool> {
    writeln!(output, "{question}")?;
    let mut line = String::new();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => {}
        }
    }
}
