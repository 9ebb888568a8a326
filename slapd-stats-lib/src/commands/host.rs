use std::io::Write;

/// The process environment the commands run in: two output streams and a way to exit.
pub trait Host: Send + Sync {
    /// Normal output, such as compiled definitions and poll summaries.
    fn output(&mut self) -> impl Write;

    /// Error reports.
    fn error(&mut self) -> impl Write;

    /// End the process with `code`; test hosts only remember it.
    fn exit(&mut self, code: i32);
}

/// Captures everything a command writes, for assertions.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct TestHost {
    pub output_buf: Vec<u8>,
    pub error_buf: Vec<u8>,
    pub exit_code: Option<i32>,
}

#[cfg(test)]
impl TestHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_text(&self) -> String {
        String::from_utf8_lossy(&self.output_buf).into_owned()
    }

    pub fn error_text(&self) -> String {
        String::from_utf8_lossy(&self.error_buf).into_owned()
    }
}

#[cfg(test)]
impl Host for TestHost {
    fn output(&mut self) -> impl Write {
        &mut self.output_buf
    }

    fn error(&mut self) -> impl Write {
        &mut self.error_buf
    }

    fn exit(&mut self, code: i32) {
        self.exit_code = Some(code);
    }
}
