//! Schema command - print the expected tax table file format

use crate::tax::TaxTableFile;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let schema = schema_for!(TaxTableFile);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }
}
