use crate::types::Config;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.search.nwindows == 0 {
            bail!("search.nwindows must be at least 1");
        }
        if self.search.seed_margin == 0 || self.search.prior_margin == 0 {
            bail!("search margins must be positive");
        }
        if self.tracking.history_length == 0 {
            bail!("tracking.history_length must be at least 1");
        }
        let m = &self.measurement;
        if !(m.ym_per_pix.is_finite() && m.ym_per_pix > 0.0)
            || !(m.xm_per_pix.is_finite() && m.xm_per_pix > 0.0)
        {
            bail!(
                "measurement scales must be positive, got ym={} xm={}",
                m.ym_per_pix,
                m.xm_per_pix
            );
        }
        Ok(())
    }
}
