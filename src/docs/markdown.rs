use super::extract_property_info;
use crate::{
    cli::formatting::format_value,
    definition::{CommandNode, OptionDefinition},
};

const OPTION_TABLE_HEADER: &str =
    "| Option | Type | Description | Default |\n|--------|------|-------------|---------|";

const PROPERTY_TABLE_HEADER: &str =
    "| Property | Type | Description | Default |\n|----------|------|-------------|---------|";

/// Generates a markdown table documenting options.
pub fn generate_option_table(section_title: &str, options: &[&OptionDefinition]) -> String {
    if options.is_empty() {
        return String::new();
    }

    let option_rows = options
        .iter()
        .map(|option| {
            let mut names = vec![format!("`--{}`", option.name)];
            names.extend(option.aliases.iter().map(|alias| format!("`{}`", dashed(alias))));
            let default = option
                .default_value
                .as_ref()
                .map(|value| format!("`{}`", format_value(value)))
                .unwrap_or_else(|| "-".to_string());

            format!(
                "| {} | `{}` | {} | {} |",
                names.join(", "),
                option.option_type,
                escape(&option.description),
                default
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("## {section_title}\n\n{OPTION_TABLE_HEADER}\n{option_rows}\n")
}

/// Generates the markdown page of one command node.
///
/// `program` is the name the CLI is invoked by.
pub fn generate_command_page(node: &CommandNode, program: &str) -> String {
    let invocation = if node.path().is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", node.full_name())
    };

    let mut content = format!("# {invocation}\n\n{}\n\n", escape(node.description()));

    if node.is_group() {
        content.push_str("## Commands\n\n");
        for child in node.children() {
            content.push_str(&format!(
                "- [`{}`]({}) - {}\n",
                child.name(),
                page_name(child, program),
                escape(child.summary())
            ));
        }
        content.push('\n');
    } else {
        content.push_str(&format!("## Usage\n\n```\n{invocation} [options]\n```\n\n"));
    }

    if !node.positionals().is_empty() {
        content.push_str("## Positional Arguments\n\n");
        for positional in node.positionals() {
            let required = if positional.required { ", required" } else { "" };
            content.push_str(&format!(
                "- `{}` (`{}`{required}) - {}\n",
                positional.name,
                positional.positional_type,
                escape(&positional.description)
            ));
        }
        content.push('\n');
    }

    let mut groups: Vec<&str> = Vec::new();
    for group in node.options().iter().filter_map(|o| o.group.as_deref()) {
        if !groups.contains(&group) {
            groups.push(group);
        }
    }
    for group in groups {
        let options: Vec<&OptionDefinition> = node
            .options()
            .iter()
            .filter(|o| o.group.as_deref() == Some(group))
            .collect();
        content.push_str(&generate_option_table(group, &options));
        content.push('\n');
    }

    let examples = &node.definition().examples;
    if !examples.is_empty() {
        content.push_str("## Examples\n\n");
        for example in examples {
            content.push_str(&format!(
                "- {}:\n\n  ```\n  {invocation} {}\n  ```\n\n",
                example.description,
                example.options
            ));
        }
    }

    content
}

/// Generates the page describing the configuration file of `program`.
pub fn generate_config_page(program: &str, schema: &serde_json::Value) -> String {
    let properties = extract_property_info(schema);
    let rows = properties
        .iter()
        .map(|prop| {
            format!(
                "| `{}` | `{}` | {} | `{}` |",
                prop.name,
                prop.type_name,
                escape(&prop.description),
                prop.default_value
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        "# {program} Configuration\n\n**File:** `<cli home>/{program}.config.toml`\n\n{PROPERTY_TABLE_HEADER}\n{rows}\n"
    )
}

/// File name of `node`'s page.
pub(super) fn page_name(node: &CommandNode, program: &str) -> String {
    if node.path().is_empty() {
        format!("{program}.md")
    } else {
        format!("{program}_{}.md", node.path().join("_"))
    }
}

fn dashed(alias: &str) -> String {
    if alias.chars().count() == 1 {
        format!("-{alias}")
    } else {
        format!("--{alias}")
    }
}

fn escape(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
