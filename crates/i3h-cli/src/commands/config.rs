use anyhow::{Result, bail};
use i3h_core::config::PortalConfig;
use i3h_infrastructure::{ConfigService, PortalPaths};
use std::path::Path;

pub fn show(config_dir: Option<&Path>) -> Result<()> {
    let paths = PortalPaths::new(config_dir);
    let config = ConfigService::new(paths.clone()).get_config()?;

    println!("# {}", paths.config_file()?.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

pub fn init(config_dir: Option<&Path>, force: bool) -> Result<()> {
    let paths = PortalPaths::new(config_dir);
    let path = paths.config_file()?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    ConfigService::new(paths).save(&PortalConfig::default())?;
    println!("✅ Wrote {}", path.display());
    Ok(())
}
