//! Unit tests for the syntax validator
//!
//! Argument sets are built directly so each check can be exercised alone.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::io::Write;

use serde_json::{Value, json};

use crate::{
    arguments::{ArgumentSource, ResolvedArguments},
    definition::{
        ArgType, CommandDefinition, CommandNode, CommandTree, OptionDefinition,
        PositionalDefinition,
    },
    syntax::{ArgumentDefinition, SyntaxValidator, ValidationKind},
};

fn tree() -> CommandTree {
    CommandTree::new(
        CommandDefinition::root("Sample").child(
            CommandDefinition::command("order", "Order fruit")
                .handler("order")
                .positional(PositionalDefinition::new("fruit", ArgType::String, "Fruit").required())
                .positional(
                    PositionalDefinition::new("code", ArgType::String, "Order code")
                        .regex("^[A-Z]{3}$"),
                )
                .option(OptionDefinition::new("color", ArgType::String, "Color").required())
                .option(OptionDefinition::new("count", ArgType::Number, "Count").numeric_range(1.0, 10.0))
                .option(
                    OptionDefinition::new("size", ArgType::String, "Size")
                        .allowable_values(["small", "large"], false),
                )
                .option(
                    OptionDefinition::new("grade", ArgType::String, "Grade")
                        .allowable_values(["A", "B"], true)
                        .default_value("A"),
                )
                .option(
                    OptionDefinition::new("peeled", ArgType::Boolean, "Peeled")
                        .conflicts_with("whole"),
                )
                .option(OptionDefinition::new("whole", ArgType::Boolean, "Whole"))
                .option(
                    OptionDefinition::new("gift", ArgType::Boolean, "Gift wrap").implies("note"),
                )
                .option(OptionDefinition::new("note", ArgType::String, "Note").length_range(1, 5))
                .option(
                    OptionDefinition::new("pickup", ArgType::Boolean, "Pick up")
                        .absence_implies("address"),
                )
                .option(OptionDefinition::new("address", ArgType::String, "Address"))
                .option(OptionDefinition::new("extras", ArgType::Json, "Extras"))
                .option(OptionDefinition::new("manifest", ArgType::ExistingLocalFile, "File")),
        ),
    )
    .unwrap()
}

fn node(tree: &CommandTree) -> &CommandNode {
    tree.find(&["order"]).unwrap()
}

fn args(values: &[(&str, Value)]) -> ResolvedArguments {
    let mut resolved: ResolvedArguments = [
        ("fruit", json!("banana")),
        ("color", json!("yellow")),
        ("pickup", json!(true)),
        ("grade", json!("A")),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value, ArgumentSource::CommandLine))
    .collect();

    for (name, value) in values {
        resolved.set(name, value.clone(), ArgumentSource::CommandLine);
    }
    resolved
}

fn kind_of(node: &CommandNode, resolved: &ResolvedArguments) -> Option<ValidationKind> {
    SyntaxValidator::new(node).validate(resolved).err().map(|e| e.kind)
}

#[test]
fn valid_arguments_pass() {
    let tree = tree();
    let resolved = args(&[("count", json!(3)), ("size", json!("LARGE"))]);

    assert!(SyntaxValidator::new(node(&tree)).validate(&resolved).is_ok());
}

#[test]
fn missing_required_option_names_the_option() {
    let tree = tree();
    let mut resolved: ResolvedArguments = [(
        "fruit".to_string(),
        json!("banana"),
        ArgumentSource::CommandLine,
    )]
    .into_iter()
    .collect();
    resolved.set("pickup", json!(true), ArgumentSource::CommandLine);

    let error = SyntaxValidator::new(node(&tree))
        .validate(&resolved)
        .unwrap_err();

    assert_eq!(error.kind, ValidationKind::MissingRequired);
    assert_eq!(error.option, "color");
    assert!(matches!(error.definition, ArgumentDefinition::Option(ref o) if o.name == "color"));
    assert!(error.message.contains("--color"));
}

#[test]
fn missing_positional_reported_first() {
    let tree = tree();
    let resolved = ResolvedArguments::default();

    let error = SyntaxValidator::new(node(&tree))
        .validate(&resolved)
        .unwrap_err();

    assert_eq!(error.kind, ValidationKind::MissingPositional);
    assert_eq!(error.option, "fruit");
}

#[test]
fn wrong_type_rejected() {
    let tree = tree();

    assert_eq!(
        kind_of(node(&tree), &args(&[("count", json!("lots"))])),
        Some(ValidationKind::InvalidType)
    );
    assert_eq!(
        kind_of(node(&tree), &args(&[("extras", json!("{not json"))])),
        Some(ValidationKind::InvalidType)
    );
    assert_eq!(kind_of(node(&tree), &args(&[("count", json!("4"))])), None);
}

#[test]
fn allowable_values_respect_case_flag() {
    let tree = tree();

    assert_eq!(kind_of(node(&tree), &args(&[("size", json!("Small"))])), None);
    assert_eq!(
        kind_of(node(&tree), &args(&[("size", json!("medium"))])),
        Some(ValidationKind::NotAllowed)
    );
    assert_eq!(
        kind_of(node(&tree), &args(&[("grade", json!("a"))])),
        Some(ValidationKind::NotAllowed)
    );
}

#[test]
fn conflicting_options_rejected() {
    let tree = tree();
    let error = SyntaxValidator::new(node(&tree))
        .validate(&args(&[("peeled", json!(true)), ("whole", json!(true))]))
        .unwrap_err();

    assert_eq!(error.kind, ValidationKind::Conflict);
    assert_eq!(error.option, "peeled");
}

#[test]
fn defaults_never_conflict() {
    let tree = tree();
    let mut resolved = args(&[("peeled", json!(true))]);
    resolved.set("whole", json!(false), ArgumentSource::Default);

    assert_eq!(kind_of(node(&tree), &resolved), None);
}

#[test]
fn absence_implication_requires_other_option() {
    let tree = tree();
    let mut resolved: ResolvedArguments = [
        ("fruit".to_string(), json!("banana"), ArgumentSource::CommandLine),
        ("color".to_string(), json!("yellow"), ArgumentSource::CommandLine),
    ]
    .into_iter()
    .collect();

    let error = SyntaxValidator::new(node(&tree))
        .validate(&resolved)
        .unwrap_err();
    assert_eq!(error.kind, ValidationKind::AbsenceImplication);
    assert_eq!(error.option, "pickup");

    resolved.set("address", json!("Main St"), ArgumentSource::CommandLine);
    assert_eq!(kind_of(node(&tree), &resolved), None);
}

#[test]
fn flag_turned_off_counts_as_absent() {
    let tree = tree();

    let resolved = args(&[("pickup", json!(false))]);
    assert_eq!(
        kind_of(node(&tree), &resolved),
        Some(ValidationKind::AbsenceImplication)
    );

    let resolved = args(&[("pickup", json!(false)), ("address", json!("Main St"))]);
    assert_eq!(kind_of(node(&tree), &resolved), None);
}

#[test]
fn implied_option_must_be_present() {
    let tree = tree();

    assert_eq!(
        kind_of(node(&tree), &args(&[("gift", json!(true))])),
        Some(ValidationKind::Implication)
    );
    assert_eq!(
        kind_of(node(&tree), &args(&[("gift", json!(true)), ("note", json!("hi"))])),
        None
    );
}

#[test]
fn ranges_enforced() {
    let tree = tree();

    assert_eq!(
        kind_of(node(&tree), &args(&[("count", json!(11))])),
        Some(ValidationKind::OutOfRange)
    );
    assert_eq!(
        kind_of(node(&tree), &args(&[("note", json!("too long"))])),
        Some(ValidationKind::LengthOutOfRange)
    );
}

#[test]
fn positional_pattern_enforced() {
    let tree = tree();

    assert_eq!(
        kind_of(node(&tree), &args(&[("code", json!("abc"))])),
        Some(ValidationKind::PatternMismatch)
    );
    assert_eq!(kind_of(node(&tree), &args(&[("code", json!("ABC"))])), None);
}

#[test]
fn existing_local_file_checked() {
    let tree = tree();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "apples").unwrap();
    let path = file.path().to_string_lossy().to_string();

    assert_eq!(kind_of(node(&tree), &args(&[("manifest", json!(path))])), None);
    assert_eq!(
        kind_of(node(&tree), &args(&[("manifest", json!("/no/such/manifest"))])),
        Some(ValidationKind::FileNotFound)
    );
}

#[test]
fn must_specify_one_and_only_one_of() {
    let tree = CommandTree::new(
        CommandDefinition::root("Sample").child(
            CommandDefinition::command("pay", "Pay")
                .handler("pay")
                .option(OptionDefinition::new("cash", ArgType::Boolean, "Cash"))
                .option(OptionDefinition::new("card", ArgType::Boolean, "Card"))
                .must_specify_one(["cash", "card"])
                .only_one_of(["cash", "card"]),
        ),
    )
    .unwrap();
    let node = tree.find(&["pay"]).unwrap();

    let none = ResolvedArguments::default();
    assert_eq!(kind_of(node, &none), Some(ValidationKind::MustSpecifyOne));

    let both: ResolvedArguments = [
        ("cash".to_string(), json!(true), ArgumentSource::CommandLine),
        ("card".to_string(), json!(true), ArgumentSource::CommandLine),
    ]
    .into_iter()
    .collect();
    let error = SyntaxValidator::new(node).validate(&both).unwrap_err();
    assert_eq!(error.kind, ValidationKind::OnlyOneOf);
    assert_eq!(error.option, "card");
}

#[test]
fn validation_is_repeatable_and_leaves_arguments_alone() {
    let tree = tree();
    let resolved = args(&[("size", json!("medium"))]);
    let before = resolved.clone();
    let validator = SyntaxValidator::new(node(&tree));

    let first = validator.validate(&resolved).unwrap_err();
    let second = validator.validate(&resolved).unwrap_err();

    assert_eq!(first, second);
    assert_eq!(resolved, before);
}
