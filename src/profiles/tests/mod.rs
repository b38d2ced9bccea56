//! Unit tests for profiles module
//!
//! Tests profile store construction and profile selection rules.

#![allow(clippy::panic, clippy::unwrap_used)]

use std::collections::BTreeMap;

use serde_json::json;

use crate::{
    cli::CommandError,
    config::ConfigFile,
    definition::ProfileSpec,
    profiles::{CredentialStore, MemoryCredentials, Profile, ProfileResolver, ProfileStore},
};

fn store() -> ProfileStore {
    let mut store = ProfileStore::new();
    store.insert(
        Profile::new("yellow", "fruit")
            .property("color", "yellow")
            .property("fruitSize", 3)
            .secure_property("secretRecipe", "bananas foster"),
    );
    store.insert(Profile::new("green", "fruit").property("color", "green"));
    store.insert(Profile::new("crunchy", "veggie").property("texture", "crunchy"));
    store.set_default("fruit", "yellow");
    store
}

fn explicit(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn default_profile_is_selected() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let resolved = resolver
        .resolve(&ProfileSpec::required(["fruit"]), &explicit(&[]))
        .unwrap();

    assert_eq!(resolved.get("fruit").unwrap().name, "yellow");
    let color = resolved
        .arguments()
        .iter()
        .find(|a| a.option == "color")
        .unwrap();
    assert_eq!(color.value, json!("yellow"));
    assert_eq!(color.profile, "yellow");
}

#[test]
fn explicit_name_wins_over_default() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let resolved = resolver
        .resolve(
            &ProfileSpec::required(["fruit"]),
            &explicit(&[("fruit", "green")]),
        )
        .unwrap();

    assert_eq!(resolved.get("fruit").unwrap().name, "green");
}

#[test]
fn missing_required_profile_fails() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let Err(CommandError::ProfileNotFound { profile_type, name }) =
        resolver.resolve(&ProfileSpec::required(["veggie"]), &explicit(&[]))
    else {
        panic!("expected profile not found");
    };

    assert_eq!(profile_type, "veggie");
    assert_eq!(name, None);
}

#[test]
fn missing_optional_profile_contributes_nothing() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let resolved = resolver
        .resolve(&ProfileSpec::optional(["veggie"]), &explicit(&[]))
        .unwrap();

    assert!(resolved.is_empty());
    assert!(resolved.arguments().is_empty());
}

#[test]
fn unknown_explicit_name_fails_even_when_optional() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let result = resolver.resolve(
        &ProfileSpec::optional(["fruit"]),
        &explicit(&[("fruit", "purple")]),
    );

    assert!(matches!(
        result,
        Err(CommandError::ProfileNotFound { name: Some(n), .. }) if n == "purple"
    ));
}

#[test]
fn property_names_map_to_kebab_options_with_secure_marks() {
    let store = store();
    let resolver = ProfileResolver::new(&store);

    let resolved = resolver
        .resolve(&ProfileSpec::required(["fruit"]), &explicit(&[]))
        .unwrap();

    let size = resolved
        .arguments()
        .iter()
        .find(|a| a.option == "fruit-size")
        .unwrap();
    assert!(!size.secure);

    let recipe = resolved
        .arguments()
        .iter()
        .find(|a| a.option == "secret-recipe")
        .unwrap();
    assert!(recipe.secure);
}

#[test]
fn censored_properties_hide_secure_values() {
    let profile = Profile::new("p", "fruit")
        .property("color", "red")
        .property("password", "plain")
        .secure_property("token", "abc");

    let censored = profile.censored_properties();
    assert_eq!(censored["color"], json!("red"));
    assert_eq!(censored["password"], json!("****"));
    assert_eq!(censored["token"], json!("****"));
}

#[test]
fn store_from_config_file_uses_credentials_for_missing_secure_values() {
    let config: ConfigFile = toml::from_str(
        r#"
            [defaults]
            fruit = "yellow"

            [profiles.yellow]
            type = "fruit"
            secure = ["token"]

            [profiles.yellow.properties]
            color = "yellow"
            ripeness = 0.75
            when = 1979-05-27T07:32:00Z
        "#,
    )
    .unwrap();

    let mut credentials = MemoryCredentials::new();
    credentials.insert("fruit", "yellow", "token", "from-vault");

    let store = ProfileStore::from_config(&config, Some(&credentials as &dyn CredentialStore));
    let profile = store.default_profile("fruit").unwrap();

    assert_eq!(profile.get("token"), Some(&json!("from-vault")));
    assert!(profile.is_secure("token"));
    assert_eq!(profile.get("ripeness"), Some(&json!(0.75)));
    assert_eq!(profile.get("when"), Some(&json!("1979-05-27T07:32:00Z")));
    assert_eq!(store.names("fruit"), vec!["yellow"]);
    assert_eq!(store.types(), vec!["fruit"]);
}
