/// Abstraction over user-facing output.
///
/// Command modules use this trait instead of `println!`/`eprintln!` so tests
/// can capture what a command printed.
pub trait UserOutput: Send + Sync {
    /// Informational status message (e.g., "Level 0: aws, gcp")
    fn status(&self, message: &str);

    /// Success message (e.g., "Environment 'staging' is valid")
    fn success(&self, message: &str);

    /// Warning message (e.g., "Skipping missing directory")
    fn warning(&self, message: &str);

    /// Error message (e.g., "Hook 'pre-hook-0' rejected")
    fn error(&self, message: &str);

    /// A blank line separator.
    fn blank(&self);
}

/// Standard CLI output: stdout for results, stderr for problems.
pub struct CliOutput;

impl UserOutput for CliOutput {
    fn status(&self, message: &str) {
        println!("{}", message);
    }

    fn success(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn error(&self, message: &str) {
        eprintln!("\x1b[31m{}\x1b[0m", message);
    }

    fn blank(&self) {
        println!();
    }
}

/// Collects output lines in memory.
#[cfg(test)]
#[derive(Default)]
pub struct BufferedOutput {
    lines: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl BufferedOutput {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn text(&self) -> String {
        self.lines().join("\n")
    }
}

#[cfg(test)]
impl UserOutput for BufferedOutput {
    fn status(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn success(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.lines.lock().push(format!("warning: {}", message));
    }

    fn error(&self, message: &str) {
        self.lines.lock().push(format!("error: {}", message));
    }

    fn blank(&self) {
        self.lines.lock().push(String::new());
    }
}
