//! `chapterdl config` – show where settings come from and their effective values.

use anyhow::Result;
use chapterdl_core::config::{self, ChapterDlConfig};
use std::path::Path;

pub fn run_config(explicit: Option<&Path>, cfg: &ChapterDlConfig) -> Result<()> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    print!("{}", toml_string(cfg)?);
    Ok(())
}

fn toml_string(cfg: &ChapterDlConfig) -> Result<String> {
    let mut effective = cfg.clone();
    effective.retry = Some(cfg.retry_config());
    Ok(toml::to_string_pretty(&effective)?)
}
