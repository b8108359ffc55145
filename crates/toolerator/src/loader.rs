use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{CONFIG_STRIDE, MAX_INSTANCES_PER_BOARD};
use crate::Toolerator;

/// Module descriptor, as written by the board author.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct ModuleConfig {
    /// Board this module lives on; defaults to the file stem.
    #[serde(default)]
    pub board: Option<String>,
    pub instances: Vec<InstanceConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct InstanceConfig {
    /// Optional alias for the instance.
    #[serde(default)]
    pub name: Option<String>,
    /// Tool positions on the turret (6 on an EMCO 5, 8 on an EMCO 120).
    pub tool_count: u8,
}

impl ModuleConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.instances.is_empty() {
            anyhow::bail!("at least one toolerator instance is required");
        }
        if self.instances.len() > MAX_INSTANCES_PER_BOARD {
            anyhow::bail!(
                "{} toolerator instances configured, at most {MAX_INSTANCES_PER_BOARD} fit on a board",
                self.instances.len()
            );
        }
        let mut names = HashSet::new();
        for (i, inst) in self.instances.iter().enumerate() {
            if inst.tool_count == 0 {
                anyhow::bail!("instance {i}: tool_count must be at least 1");
            }
            if let Some(name) = inst.name.as_deref() {
                if !names.insert(name) {
                    anyhow::bail!("instance {i}: duplicate name '{name}'");
                }
            }
        }
        Ok(())
    }

    /// Config block the firmware reports for this module:
    /// `[count, tool_count_0, tool_count_1, tool_count_2]`, unused bytes zero.
    pub fn config_block(&self) -> anyhow::Result<[u8; CONFIG_STRIDE]> {
        self.validate()?;
        let mut block = [0u8; CONFIG_STRIDE];
        // validate() bounds the count to MAX_INSTANCES_PER_BOARD
        block[0] = self.instances.len() as u8;
        for (slot, inst) in block[1..].iter_mut().zip(&self.instances) {
            *slot = inst.tool_count;
        }
        Ok(block)
    }

    /// Configure a board the same way the driver does at start-up, through the
    /// config block, then attach the instance aliases.
    pub fn build(&self) -> anyhow::Result<Toolerator> {
        let block = self.config_block()?;
        let mut cursor: &[u8] = &block;
        let mut board = Toolerator::from_config(&mut cursor)?;
        for (inst, cfg) in board.instances_mut().iter_mut().zip(&self.instances) {
            inst.set_name(cfg.name.clone());
        }
        Ok(board)
    }
}

/// Descriptors loaded from a directory, keyed by board name.
#[derive(Debug, Default, Clone)]
pub struct ModuleSet {
    pub modules: BTreeMap<String, ModuleConfig>,
}

impl ModuleSet {
    pub fn insert(&mut self, name: String, cfg: ModuleConfig) {
        self.modules.insert(name, cfg);
    }
}

pub fn load_module_file(path: impl AsRef<Path>) -> anyhow::Result<ModuleConfig> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading descriptor: {}", path.display()))?;
    let val: Value =
        serde_yaml::from_str(&raw).with_context(|| format!("parsing yaml: {}", path.display()))?;
    let mut cfg: ModuleConfig = serde_yaml::from_value(val)
        .with_context(|| format!("decoding descriptor: {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validating descriptor: {}", path.display()))?;
    if cfg.board.is_none() {
        cfg.board = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
    }
    Ok(cfg)
}

pub fn load_modules_dir(dir: impl AsRef<Path>) -> anyhow::Result<ModuleSet> {
    let mut set = ModuleSet::default();
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if let Some(ext) = path.extension() {
            if ext == "yml" || ext == "yaml" {
                entries.push(path);
            }
        }
    }
    entries.sort();
    for p in entries {
        let cfg = load_module_file(&p)?;
        let name = cfg.board.clone().unwrap_or_default();
        set.insert(name, cfg);
    }
    Ok(set)
}
