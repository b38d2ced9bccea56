use std::collections::HashSet;

use regex::Regex;
use tracing::trace;

use super::{
    GLOBAL_OPTIONS_GROUP, HELP_EXAMPLES_OPTION, HELP_OPTION, HELP_OPTION_ALIAS, OPTIONS_GROUP,
    PROFILE_OPTIONS_GROUP, REQUIRED_OPTIONS_GROUP, RESPONSE_FORMAT_FILTER_ALIAS,
    RESPONSE_FORMAT_FILTER_OPTION, RESPONSE_FORMAT_HEADER_ALIAS, RESPONSE_FORMAT_HEADER_OPTION,
    RESPONSE_FORMAT_JSON_ALIAS, RESPONSE_FORMAT_JSON_OPTION, RESPONSE_FORMAT_OPTIONS_GROUP,
    RESPONSE_FORMAT_TYPE_ALIAS, RESPONSE_FORMAT_TYPE_OPTION, SHOW_INPUTS_ONLY_OPTION,
    profile_option_alias, profile_option_name,
    tree::CommandNode,
    types::{ArgType, CommandDefinition, NodeType, OptionDefinition, PassOn},
};
use crate::{ImperativeError, Result};

/// Prepares a definition document for use.
///
/// Validates every node, applies pass-on declarations to descendants (a
/// node's own option wins over an inherited one of the same name, and a
/// nearer ancestor wins over a farther one), places ungrouped options into
/// the default help groups, and appends the options every node understands.
/// A declared option may not take any name or alias of an appended one.
///
/// # Errors
/// Returns `ImperativeError::InvalidDefinition` naming the first node that
/// fails validation.
pub fn prepare(root: CommandDefinition) -> Result<CommandNode> {
    prepare_node(root, Vec::new(), &[])
}

fn prepare_node(
    mut definition: CommandDefinition,
    path: Vec<String>,
    inherited: &[PassOn],
) -> Result<CommandNode> {
    let is_root = path.is_empty();
    validate_node(&definition, &path, is_root)?;

    let children = std::mem::take(&mut definition.children);

    let mut for_children = definition.pass_on.clone();
    for_children.extend(inherited.iter().cloned());

    apply_pass_on(&mut definition, inherited);
    validate_option_names(&definition, &path)?;
    validate_group_constraints(&definition, &path)?;
    assign_default_groups(&mut definition);
    append_auto_options(&mut definition, &path)?;

    let mut prepared_children = Vec::with_capacity(children.len());
    for child in children {
        let mut child_path = path.clone();
        child_path.push(child.name.clone());
        prepared_children.push(prepare_node(child, child_path, &for_children)?);
    }

    trace!(node = %path.join(" "), options = definition.options.len(), "prepared node");

    Ok(CommandNode::new(definition, path, prepared_children))
}

fn validate_node(definition: &CommandDefinition, path: &[String], is_root: bool) -> Result<()> {
    let fail = |details: String| Err(ImperativeError::definition(path, details));

    if !is_root && definition.name.trim().is_empty() {
        return fail("node name is blank".to_string());
    }

    if definition.description.trim().is_empty() {
        return fail("node description is blank".to_string());
    }

    match definition.node_type {
        NodeType::Group => {
            if definition.children.is_empty() {
                return fail("group has no children".to_string());
            }
            if definition.handler.is_some() {
                return fail("group may not have a handler".to_string());
            }
        }
        NodeType::Command => {
            if !definition.children.is_empty() {
                return fail("command may not have children".to_string());
            }
        }
    }

    let mut sibling_tokens = HashSet::new();
    for child in &definition.children {
        for token in std::iter::once(&child.name).chain(child.aliases.iter()) {
            if !sibling_tokens.insert(token.as_str()) {
                return fail(format!("child name or alias '{token}' is used more than once"));
            }
        }
    }

    for option in &definition.options {
        validate_option(option, path)?;
    }

    let last = definition.positionals.len().saturating_sub(1);
    for (index, positional) in definition.positionals.iter().enumerate() {
        if positional.name.trim().is_empty() {
            return fail("positional name is blank".to_string());
        }
        if positional.description.trim().is_empty() {
            return fail(format!("positional '{}' has no description", positional.name));
        }
        if positional.positional_type == ArgType::Array && index != last {
            return fail(format!(
                "array positional '{}' must be the last positional",
                positional.name
            ));
        }
        if let Some(pattern) = &positional.regex {
            compile(pattern, path, &positional.name)?;
        }
    }

    Ok(())
}

fn validate_option(option: &OptionDefinition, path: &[String]) -> Result<()> {
    if option.name.trim().is_empty() {
        return Err(ImperativeError::definition(path, "option name is blank"));
    }

    if option.description.trim().is_empty() {
        return Err(ImperativeError::definition(
            path,
            format!("option '{}' has no description", option.name),
        ));
    }

    if let Some(allowable) = &option.allowable_values {
        for value in &allowable.values {
            compile(value, path, &option.name)?;
        }
    }

    Ok(())
}

fn compile(pattern: &str, path: &[String], owner: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        ImperativeError::definition(path, format!("'{owner}' has an invalid pattern: {e}"))
    })
}

fn apply_pass_on(definition: &mut CommandDefinition, inherited: &[PassOn]) {
    for pass_on in inherited {
        let ignored = pass_on
            .ignore_nodes
            .iter()
            .any(|rule| rule.matches(&definition.name, definition.node_type));
        if ignored {
            continue;
        }

        for option in &pass_on.options {
            if !definition.options.iter().any(|own| own.name == option.name) {
                definition.options.push(option.clone());
            }
        }

        if let Some(profile) = &pass_on.profile {
            definition
                .profile
                .get_or_insert_with(Default::default)
                .absorb(profile);
        }
    }
}

fn validate_option_names(definition: &CommandDefinition, path: &[String]) -> Result<()> {
    let mut seen = HashSet::new();

    for option in &definition.options {
        for token in std::iter::once(&option.name).chain(option.aliases.iter()) {
            if !seen.insert(token.as_str()) {
                return Err(ImperativeError::definition(
                    path,
                    format!("option name or alias '{token}' is used more than once"),
                ));
            }
        }
    }

    Ok(())
}

fn validate_group_constraints(definition: &CommandDefinition, path: &[String]) -> Result<()> {
    let referenced = definition
        .must_specify_one
        .iter()
        .chain(definition.only_one_of.iter());

    for name in referenced {
        if !definition.options.iter().any(|o| o.answers_to(name)) {
            return Err(ImperativeError::definition(
                path,
                format!("constraint references unknown option '{name}'"),
            ));
        }
    }

    Ok(())
}

fn assign_default_groups(definition: &mut CommandDefinition) {
    for option in &mut definition.options {
        if option.group.is_none() {
            let group = if option.required {
                REQUIRED_OPTIONS_GROUP
            } else {
                OPTIONS_GROUP
            };
            option.group = Some(group.to_string());
        }
    }
}

fn append_auto_options(definition: &mut CommandDefinition, path: &[String]) -> Result<()> {
    let mut auto = Vec::new();

    if let Some(profile) = &definition.profile {
        for profile_type in profile.types() {
            if profile.suppress_options.contains(profile_type) {
                continue;
            }
            auto.push(
                OptionDefinition::new(
                    profile_option_name(profile_type),
                    ArgType::String,
                    format!(
                        "The name of a ({profile_type}) profile to load for this command execution."
                    ),
                )
                .alias(profile_option_alias(profile_type))
                .group(PROFILE_OPTIONS_GROUP),
            );
        }
    }

    if definition.output_format_options {
        auto.extend(output_format_options());
    }

    auto.push(
        OptionDefinition::new(
            RESPONSE_FORMAT_JSON_OPTION,
            ArgType::Boolean,
            "Produce JSON formatted data from a command",
        )
        .alias(RESPONSE_FORMAT_JSON_ALIAS)
        .group(GLOBAL_OPTIONS_GROUP),
    );

    auto.push(
        OptionDefinition::new(HELP_OPTION, ArgType::Boolean, "Display help text")
            .alias(HELP_OPTION_ALIAS)
            .group(GLOBAL_OPTIONS_GROUP),
    );

    match definition.node_type {
        NodeType::Group => auto.push(
            OptionDefinition::new(
                HELP_EXAMPLES_OPTION,
                ArgType::Boolean,
                "Display examples for all the commands in a group",
            )
            .group(GLOBAL_OPTIONS_GROUP),
        ),
        NodeType::Command => auto.push(
            OptionDefinition::new(
                SHOW_INPUTS_ONLY_OPTION,
                ArgType::Boolean,
                "Show command inputs and do not run the command",
            )
            .group(GLOBAL_OPTIONS_GROUP),
        ),
    }

    let declared: HashSet<&str> = definition
        .options
        .iter()
        .flat_map(|own| std::iter::once(&own.name).chain(own.aliases.iter()))
        .map(String::as_str)
        .collect();

    for option in &auto {
        let mut reserved = std::iter::once(&option.name).chain(option.aliases.iter());
        if let Some(token) = reserved.find(|token| declared.contains(token.as_str())) {
            return Err(ImperativeError::definition(
                path,
                format!("option name or alias '{token}' is reserved by --{}", option.name),
            ));
        }
    }

    definition.options.extend(auto);
    Ok(())
}

fn output_format_options() -> [OptionDefinition; 3] {
    [
        OptionDefinition::new(
            RESPONSE_FORMAT_FILTER_OPTION,
            ArgType::Array,
            "Filter (include) fields in the response. Accepts an array of field names.",
        )
        .alias(RESPONSE_FORMAT_FILTER_ALIAS)
        .group(RESPONSE_FORMAT_OPTIONS_GROUP),
        OptionDefinition::new(
            RESPONSE_FORMAT_TYPE_OPTION,
            ArgType::String,
            "The command response output format type. Must be one of the following: table, list, object, string",
        )
        .alias(RESPONSE_FORMAT_TYPE_ALIAS)
        .allowable_values(["table", "list", "object", "string"], false)
        .group(RESPONSE_FORMAT_OPTIONS_GROUP),
        OptionDefinition::new(
            RESPONSE_FORMAT_HEADER_OPTION,
            ArgType::Boolean,
            "If \"--response-format-type table\" is specified, include the column headers in the output.",
        )
        .alias(RESPONSE_FORMAT_HEADER_ALIAS)
        .group(RESPONSE_FORMAT_OPTIONS_GROUP),
    ]
}
