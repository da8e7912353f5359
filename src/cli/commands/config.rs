use anyhow::Result;

use crate::config::CareflowConfig;

pub struct ConfigCommand;

impl ConfigCommand {
    pub fn execute(&self, config: &CareflowConfig) -> Result<()> {
        println!("# Effective careflow configuration");
        println!("# Sources: defaults < careflow.toml < .careflow-rc < CAREFLOW__SECTION__KEY");
        println!();
        print!("{}", config.to_toml()?);
        Ok(())
    }
}
