//! Spider registry — loads spider definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/spider/spiders/` is baked into the binary
//! at compile time via [`include_str!`].

use crate::spider_def::{SpiderDefinition, parse_spider_toml};

/// TOML configs embedded at compile time.
const SPIDER_TOMLS: &[(&str, &str)] = &[(
    "clay_plan_arb",
    include_str!("../spiders/clay_plan_arb.toml"),
)];

/// Name of the spider run when none is given.
pub const DEFAULT_SPIDER: &str = "clay_plan_arb";

/// Returns all embedded spider definitions.
///
/// # Panics
///
/// Panics if an embedded TOML config is malformed.
#[must_use]
pub fn all_spiders() -> Vec<SpiderDefinition> {
    SPIDER_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_spider_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded spider definition by name.
#[must_use]
pub fn find_spider(name: &str) -> Option<SpiderDefinition> {
    all_spiders().into_iter().find(|s| s.name == name)
}
