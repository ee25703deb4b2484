// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Caller-side identity hashing, for clients and support staff matching a
//! crisis flag back to an account.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use mindease_engine::domain::{hash_caller_identity, EngineConfigManifest, IdentityHasher};

pub fn run(manifest: &EngineConfigManifest, raw: &str, stored: bool) -> Result<()> {
    let (caller, stored_hash) = derive(manifest, raw, stored)?;

    println!("{} {}", "caller:".bold(), caller);
    if let Some(stored_hash) = stored_hash {
        println!("{} {}", "stored:".bold(), stored_hash);
    }
    Ok(())
}

fn derive(manifest: &EngineConfigManifest, raw: &str, stored: bool) -> Result<(String, Option<String>)> {
    if raw.trim().is_empty() {
        bail!("user id cannot be empty");
    }

    let caller = hash_caller_identity(raw);
    if !stored {
        return Ok((caller, None));
    }

    let hasher = IdentityHasher::from_config(&manifest.spec.identity)
        .context("Invalid identity configuration")?;
    let stored_hash = hasher.rehash(&caller).as_str().to_string();
    Ok((caller, Some(stored_hash)))
}
