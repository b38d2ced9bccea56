use std::{
    fmt,
    io::{self, Write},
};

use serde_json::{Map, Value, json};
use tracing::warn;

use super::format::{OutputFormat, OutputOverrides, ResponseFormat, render_bar, render_output};

/// Output API handed to a command handler.
///
/// Console writes are always buffered. In the default format they are also
/// written through immediately; in the JSON format nothing reaches the
/// writers until [`CommandResponse::finish`] emits the one document.
pub struct CommandResponse {
    format: ResponseFormat,
    stdout: Box<dyn Write + Send>,
    stderr: Box<dyn Write + Send>,
    stdout_text: String,
    stderr_text: String,
    message: String,
    data: Value,
    exit_code: Option<i32>,
    success: bool,
    error: Option<Value>,
    overrides: OutputOverrides,
    bar_active: bool,
    finished: bool,
}

impl fmt::Debug for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResponse")
            .field("format", &self.format)
            .field("message", &self.message)
            .field("data", &self.data)
            .field("exit_code", &self.exit_code)
            .field("success", &self.success)
            .finish_non_exhaustive()
    }
}

impl CommandResponse {
    /// Response writing to the process's stdout and stderr.
    pub fn new(format: ResponseFormat) -> Self {
        Self::with_writers(format, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Response writing to the given streams.
    pub fn with_writers(
        format: ResponseFormat,
        stdout: Box<dyn Write + Send>,
        stderr: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            format,
            stdout,
            stderr,
            stdout_text: String::new(),
            stderr_text: String::new(),
            message: String::new(),
            data: Value::Null,
            exit_code: None,
            success: true,
            error: None,
            overrides: OutputOverrides::default(),
            bar_active: false,
            finished: false,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    /// Switches the output format. Only meaningful before anything has been
    /// written.
    pub(crate) fn set_format(&mut self, format: ResponseFormat) {
        self.format = format;
    }

    /// Whether output is collected into a JSON document.
    pub fn is_json(&self) -> bool {
        self.format == ResponseFormat::Json
    }

    /// Writes a line to stdout.
    pub fn log(&mut self, text: impl AsRef<str>) {
        let line = format!("{}\n", text.as_ref());
        self.stdout_text.push_str(&line);
        if !self.is_json() {
            write_through(&mut self.stdout, &line);
        }
    }

    /// Writes a line to stderr.
    pub fn error(&mut self, text: impl AsRef<str>) {
        let line = format!("{}\n", text.as_ref());
        self.stderr_text.push_str(&line);
        if !self.is_json() {
            write_through(&mut self.stderr, &line);
        }
    }

    /// Writes an error section heading to stderr.
    pub fn error_header(&mut self, title: &str) {
        self.error(format!("{title}:"));
    }

    /// Writes `output` to stdout in the given shape.
    ///
    /// `format`, `fields` and `header` are the handler's defaults. When the
    /// command offers the response format options, whatever the user gave
    /// for them wins. An empty array or object writes nothing.
    pub fn log_output(
        &mut self,
        output: &Value,
        format: OutputFormat,
        fields: Option<&[String]>,
        header: bool,
    ) {
        let empty = match output {
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if empty {
            return;
        }

        let format = self.overrides.format.unwrap_or(format);
        let fields = self.overrides.fields.as_deref().or(fields);
        let header = self.overrides.header.unwrap_or(header);
        let text = render_output(output, format, fields, header);
        self.log(text);
    }

    /// Sets the structured data. With `merge`, object keys are added to the
    /// current object instead of replacing it.
    pub fn set_obj(&mut self, value: Value, merge: bool) {
        match value {
            Value::Object(more) if merge && self.data.is_object() => {
                if let Value::Object(current) = &mut self.data {
                    current.extend(more);
                }
            }
            value => self.data = value,
        }
    }

    /// Sets the summary message.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Requests a specific exit code.
    pub fn set_exit_code(&mut self, code: i32) {
        self.exit_code = Some(code);
    }

    /// Marks the command as failed.
    pub fn failed(&mut self) {
        self.success = false;
    }

    /// Marks the command as successful.
    pub fn succeeded(&mut self) {
        self.success = true;
    }

    /// Whether the command succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Summary message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured data.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Everything logged to stdout so far.
    pub fn stdout_text(&self) -> &str {
        &self.stdout_text
    }

    /// Everything logged to stderr so far.
    pub fn stderr_text(&self) -> &str {
        &self.stderr_text
    }

    /// Exit code the process should end with.
    pub fn exit_code(&self) -> i32 {
        match (self.exit_code, self.success) {
            (Some(code), _) => code,
            (None, true) => 0,
            (None, false) => 1,
        }
    }

    /// Shows a progress bar on stderr. No-op in JSON format.
    pub fn start_bar(&mut self, status: &str) {
        self.bar_active = true;
        self.draw_bar(0, status);
    }

    /// Moves an active progress bar.
    pub fn update_bar(&mut self, percent: u8, status: &str) {
        if self.bar_active {
            self.draw_bar(percent, status);
        }
    }

    /// Removes the progress bar.
    pub fn end_bar(&mut self) {
        if self.bar_active && !self.is_json() {
            write_through(&mut self.stderr, "\n");
        }
        self.bar_active = false;
    }

    /// The JSON document for this response.
    pub fn document(&self) -> Value {
        let mut document = Map::new();
        document.insert("success".into(), json!(self.success));
        document.insert("exitCode".into(), json!(self.exit_code()));
        document.insert("message".into(), json!(self.message));
        document.insert("stdout".into(), json!(self.stdout_text));
        document.insert("stderr".into(), json!(self.stderr_text));
        document.insert("data".into(), self.data.clone());
        if let Some(error) = &self.error {
            document.insert("error".into(), error.clone());
        }
        Value::Object(document)
    }

    /// Ends the response. In JSON format this writes the document to stdout.
    /// Calling it again does nothing.
    ///
    /// # Errors
    /// Returns an error if the document cannot be written.
    pub fn finish(&mut self) -> io::Result<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.end_bar();

        if self.is_json() {
            let rendered = serde_json::to_string_pretty(&self.document())?;
            writeln!(self.stdout, "{rendered}")?;
        }

        self.stdout.flush()?;
        self.stderr.flush()
    }

    /// Output settings chosen by the user for [`CommandResponse::log_output`].
    pub(crate) fn set_output_overrides(&mut self, overrides: OutputOverrides) {
        self.overrides = overrides;
    }

    /// Records a failure for the JSON document.
    pub(crate) fn set_error(&mut self, error: Value) {
        self.success = false;
        self.error = Some(error);
    }

    fn draw_bar(&mut self, percent: u8, status: &str) {
        if !self.is_json() {
            let text = format!("\r{}", render_bar(percent, status));
            write_through(&mut self.stderr, &text);
        }
    }
}

fn write_through(writer: &mut Box<dyn Write + Send>, text: &str) {
    if let Err(e) = writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
        warn!(error = %e, "cannot write command output");
    }
}
