//! File-level import steps shared by the CLI commands
//!
//! decode → (aliases) → normalize → diff

use crate::error::Result;
use crate::loader;
use serde_json::Value;
use std::path::Path;
use tapp_import_common::{
    diff_kind, normalize_with, AliasConfig, DiffSpec, EntityKind, NormalizationSchema,
    NormalizeOptions, Record, Snapshot,
};

/// Read a header-synonym file.
pub fn load_aliases(path: &Path) -> Result<AliasConfig> {
    let content = std::fs::read_to_string(path)?;
    Ok(AliasConfig::from_json(&content)?)
}

/// Built-in schema of `kind`, extended with any extra synonyms.
pub fn schema_for(kind: EntityKind, aliases: Option<&AliasConfig>) -> Result<NormalizationSchema> {
    let schema = match aliases {
        Some(aliases) => aliases.apply(kind.schema()),
        None => kind.schema().clone(),
    };
    schema.validate()?;
    Ok(schema)
}

pub fn normalize_file(
    kind: EntityKind,
    input: &Path,
    aliases: Option<&AliasConfig>,
    options: &NormalizeOptions,
) -> Result<Vec<Record>> {
    let payload = loader::load(input)?;
    let schema = schema_for(kind, aliases)?;
    Ok(normalize_with(&payload, &schema, options)?)
}

pub fn preview_file(
    kind: EntityKind,
    input: &Path,
    snapshot: &Snapshot,
    aliases: Option<&AliasConfig>,
    options: &NormalizeOptions,
) -> Result<Vec<DiffSpec<Value>>> {
    let records = normalize_file(kind, input, aliases, options)?;
    Ok(diff_kind(kind, &records, snapshot)?)
}
