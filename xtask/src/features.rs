use anyhow::{Context, Result};

use crate::cargo;

/// Feature sets of `autopost-common` that must compile on their own.
const FEATURE_COMBINATIONS: &[&[&str]] = &[
    &[], // default
    &["foundation"],
];

/// Check that all required feature combinations compile successfully.
pub fn test_feature_matrix() -> Result<()> {
    println!("Testing {} autopost-common feature combinations...", FEATURE_COMBINATIONS.len());

    for (index, features) in FEATURE_COMBINATIONS.iter().enumerate() {
        let joined = features.join(",");
        let label = if features.is_empty() { "default" } else { joined.as_str() };

        let mut args = vec!["check", "-p", "autopost-common"];
        if !features.is_empty() {
            args.extend(["--features", joined.as_str()]);
        }

        println!("\n[{}/{}] cargo {}", index + 1, FEATURE_COMBINATIONS.len(), args.join(" "));
        cargo(&args).with_context(|| format!("Feature combination '{label}' failed to compile"))?;

        println!("✅ Features '{label}' compiled successfully");
    }

    println!("\n✅ All {} feature combinations compile successfully!", FEATURE_COMBINATIONS.len());

    Ok(())
}
