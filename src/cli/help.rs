//! Help text for command nodes.

use super::formatting::{
    format_category, format_command, format_description, format_header, format_subheader,
    format_value,
};
use crate::definition::{ArgType, CommandNode, OptionDefinition};

/// Help page of `node`. `root` is the program name shown in usage lines.
pub fn render_help(node: &CommandNode, root: &str, styled: bool) -> String {
    let style = Style(styled);
    let mut out = Vec::new();

    out.push(style.header("DESCRIPTION"));
    out.push(indent(node.description(), 2));
    out.push(String::new());

    out.push(style.header("USAGE"));
    out.push(format!("  {}", usage(node, root)));
    out.push(String::new());

    if node.is_group() {
        out.push(style.header("COMMANDS"));
        let width = node
            .children()
            .iter()
            .map(|child| child_label(child).len())
            .max()
            .unwrap_or(0);
        for child in node.children() {
            let label = format!("{:width$}", child_label(child));
            out.push(format!(
                "  {}  {}",
                style.command(&label),
                child.summary()
            ));
        }
        out.push(String::new());
    }

    if !node.positionals().is_empty() {
        out.push(style.header("POSITIONAL ARGUMENTS"));
        for positional in node.positionals() {
            let requirement = if positional.required { " (required)" } else { "" };
            out.push(format!(
                "  {} {}{requirement}",
                style.command(&positional.name),
                style.category(&format!("({})", positional.positional_type))
            ));
            out.push(indent(&positional.description, 6));
            if let Some(regex) = &positional.regex {
                out.push(format!("      Must match: {regex}"));
            }
            out.push(String::new());
        }
    }

    for group in option_groups(node.options()) {
        out.push(style.subheader(&group.to_uppercase()));
        for option in node
            .options()
            .iter()
            .filter(|o| o.group.as_deref() == Some(group))
        {
            out.extend(option_lines(option, &style));
            out.push(String::new());
        }
    }

    let examples = node.definition().examples.as_slice();
    if !examples.is_empty() {
        out.push(style.header("EXAMPLES"));
        out.extend(example_lines(node, root, &style));
    }

    out.join("\n").trim_end().to_string()
}

/// Examples of `node` and every command below it.
pub fn render_examples(node: &CommandNode, root: &str, styled: bool) -> String {
    let style = Style(styled);
    let mut out = vec![style.header("EXAMPLES")];
    collect_examples(node, root, &style, &mut out);

    if out.len() == 1 {
        out.push("  No examples available.".to_string());
    }

    out.join("\n").trim_end().to_string()
}

fn collect_examples(node: &CommandNode, root: &str, style: &Style, out: &mut Vec<String>) {
    out.extend(example_lines(node, root, style));
    for child in node.children() {
        collect_examples(child, root, style, out);
    }
}

fn example_lines(node: &CommandNode, root: &str, style: &Style) -> Vec<String> {
    let command = invocation(node, root);
    node.definition()
        .examples
        .iter()
        .flat_map(|example| {
            [
                format!("  - {}:", example.description),
                String::new(),
                format!(
                    "      {}",
                    style.description(&format!("$ {command} {}", example.options).trim_end())
                ),
                String::new(),
            ]
        })
        .collect()
}

fn usage(node: &CommandNode, root: &str) -> String {
    let command = invocation(node, root);

    if node.is_group() {
        return format!("{command} <command> [options]");
    }

    let positionals: Vec<String> = node
        .positionals()
        .iter()
        .map(|p| {
            let name = if p.positional_type == ArgType::Array {
                format!("{}...", p.name)
            } else {
                p.name.clone()
            };
            if p.required { format!("<{name}>") } else { format!("[{name}]") }
        })
        .collect();

    if positionals.is_empty() {
        format!("{command} [options]")
    } else {
        format!("{command} {} [options]", positionals.join(" "))
    }
}

fn invocation(node: &CommandNode, root: &str) -> String {
    if node.path().is_empty() {
        root.to_string()
    } else {
        format!("{root} {}", node.full_name())
    }
}

fn child_label(child: &CommandNode) -> String {
    let aliases = &child.definition().aliases;
    if aliases.is_empty() {
        child.name().to_string()
    } else {
        format!("{} | {}", child.name(), aliases.join(" | "))
    }
}

fn option_groups(options: &[OptionDefinition]) -> Vec<&str> {
    let mut groups: Vec<&str> = Vec::new();
    for group in options.iter().filter_map(|o| o.group.as_deref()) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    groups
}

fn option_lines(option: &OptionDefinition, style: &Style) -> Vec<String> {
    let mut names = vec![format!("--{}", option.name)];
    names.extend(option.aliases.iter().map(|alias| {
        if alias.chars().count() == 1 {
            format!("-{alias}")
        } else {
            format!("--{alias}")
        }
    }));

    let mut lines = vec![format!(
        "  {} {}",
        style.command(&names.join(" | ")),
        style.category(&format!("({})", option.option_type))
    )];
    lines.push(indent(&option.description, 6));

    if let Some(default) = &option.default_value {
        lines.push(format!("      Default value: {}", format_value(default)));
    }
    if let Some(allowable) = &option.allowable_values {
        lines.push(format!(
            "      Allowed values: {}",
            allowable.values.join(", ")
        ));
    }
    if let Some([min, max]) = option.numeric_value_range {
        lines.push(format!("      Range: {min} to {max}"));
    }
    if !option.conflicts_with.is_empty() {
        lines.push(format!(
            "      Conflicts with: --{}",
            option.conflicts_with.join(", --")
        ));
    }

    lines
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

struct Style(bool);

impl Style {
    fn apply(&self, text: &str, paint: fn(&str) -> String) -> String {
        if self.0 { paint(text) } else { text.to_string() }
    }

    fn header(&self, text: &str) -> String {
        self.apply(text, format_header)
    }

    fn command(&self, text: &str) -> String {
        self.apply(text, format_command)
    }

    fn category(&self, text: &str) -> String {
        self.apply(text, format_category)
    }

    fn description(&self, text: &str) -> String {
        self.apply(text, format_description)
    }

    fn subheader(&self, text: &str) -> String {
        self.apply(text, format_subheader)
    }
}
