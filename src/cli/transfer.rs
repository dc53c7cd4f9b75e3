//! Export and import commands

use super::Context;
use crate::data::{open_store, CsvStore};
use clap::Args;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Result of an export or import
#[derive(Debug, Serialize)]
struct TransferSummary<'a> {
    positions: usize,
    executions: usize,
    path: &'a Path,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Directory to write positions.csv and executions.csv into
    pub dest: PathBuf,
}

impl ExportArgs {
    pub fn execute(&self, ctx: &Context) -> anyhow::Result<()> {
        ctx.session.export_to(&CsvStore::new(&self.dest))?;
        let summary = TransferSummary {
            positions: ctx.session.ledger().len(),
            executions: ctx.session.ledger().executions().len(),
            path: &self.dest,
        };

        if ctx.json {
            return ctx.print_json(&summary);
        }
        println!(
            "Exported {} positions to {}",
            summary.positions,
            self.dest.display()
        );
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Journal directory, its positions.csv, or a single-file journal
    pub source: PathBuf,
}

impl ImportArgs {
    /// The current journal is only replaced if the whole source loads cleanly
    pub fn execute(&self, ctx: &mut Context) -> anyhow::Result<()> {
        let store = open_store(&self.source)?;
        ctx.session.import_from(&*store)?;
        ctx.save()?;
        let summary = TransferSummary {
            positions: ctx.session.ledger().len(),
            executions: ctx.session.ledger().executions().len(),
            path: &self.source,
        };

        if ctx.json {
            return ctx.print_json(&summary);
        }
        println!(
            "Imported {} positions and {} executions from {}",
            summary.positions,
            summary.executions,
            self.source.display()
        );
        Ok(())
    }
}
