use serde_json::Value;

/// How a command's output reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    /// Console text written as the handler produces it.
    #[default]
    Default,

    /// One JSON document written when the command finishes.
    Json,
}

impl ResponseFormat {
    /// Format selected by the `--response-format-json` flag.
    pub fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Default }
    }
}

/// Shape used by [`render_output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text of the value.
    String,

    /// One line per array element.
    List,

    /// `key: value` lines per object.
    Object,

    /// Columns aligned under a header.
    Table,
}

impl OutputFormat {
    /// Shape named `name` (`string`, `list`, `object` or `table`, any case).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(Self::String),
            "list" => Some(Self::List),
            "object" => Some(Self::Object),
            "table" => Some(Self::Table),
            _ => None,
        }
    }
}

/// Output settings the user gave on the command line, applied over the
/// ones a handler passes to
/// [`CommandResponse::log_output`](super::CommandResponse::log_output).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputOverrides {
    /// `--response-format-type`
    pub format: Option<OutputFormat>,

    /// `--response-format-filter`
    pub fields: Option<Vec<String>>,

    /// `--response-format-header`
    pub header: Option<bool>,
}

/// Renders `output` as human-readable text.
///
/// `fields` limits object keys to the named ones, in that order. A list
/// filtered to one field shows that field's bare value. `header` only
/// affects tables.
pub fn render_output(
    output: &Value,
    format: OutputFormat,
    fields: Option<&[String]>,
    header: bool,
) -> String {
    let items: Vec<&Value> = match output {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    };

    match format {
        OutputFormat::String => scalar_text(output),
        OutputFormat::List => items
            .iter()
            .map(|item| match (*item, fields) {
                (Value::Object(map), Some([field])) => map.get(field).map(scalar_text).unwrap_or_default(),
                (item, fields) => scalar_text(&select(item, fields)),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Object => items
            .iter()
            .map(|item| render_object(&select(item, fields)))
            .collect::<Vec<_>>()
            .join("\n\n"),
        OutputFormat::Table => render_table(&items, fields, header),
    }
}

fn render_object(value: &Value) -> String {
    let Value::Object(map) = value else {
        return scalar_text(value);
    };

    let width = map.keys().map(|key| key.len()).max().unwrap_or(0);
    map.iter()
        .map(|(key, value)| format!("{key:width$}: {}", scalar_text(value)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_table(rows: &[&Value], fields: Option<&[String]>, header: bool) -> String {
    let columns: Vec<String> = match fields {
        Some(fields) => fields.to_vec(),
        None => {
            let mut columns: Vec<String> = Vec::new();
            for row in rows {
                if let Value::Object(map) = row {
                    for key in map.keys() {
                        if !columns.contains(key) {
                            columns.push(key.clone());
                        }
                    }
                }
            }
            columns
        }
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| row.get(column).map(scalar_text).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .chain(header.then(|| column.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = Vec::new();
    if header {
        lines.push(line(&columns));
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        lines.push(line(&rule));
    }
    lines.extend(cells.iter().map(|row| line(row)));
    lines.join("\n")
}

fn select(value: &Value, fields: Option<&[String]>) -> Value {
    match (value, fields) {
        (Value::Object(map), Some(fields)) => Value::Object(
            fields
                .iter()
                .filter_map(|field| map.get(field).map(|v| (field.clone(), v.clone())))
                .collect(),
        ),
        _ => value.clone(),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Text of a progress bar at `percent` (clamped to 0..=100).
pub fn render_bar(percent: u8, status: &str) -> String {
    const WIDTH: usize = 30;

    let percent = percent.min(100);
    let filled = WIDTH * usize::from(percent) / 100;
    format!(
        "[{}{}] {percent:>3}% {status}",
        "#".repeat(filled),
        " ".repeat(WIDTH - filled)
    )
}
