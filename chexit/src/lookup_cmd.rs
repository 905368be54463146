use std::fs;

use anyhow::{Context, Result};
use chexit::format::format_policies;
use chexit::lookup::lookup_policies;
use chexit::request::{load_request, Expander, OutputFormat, RequestSpec};

use crate::cli::{Cli, ExpandMode, Formatter};

pub fn run_lookup(cli: Cli) -> Result<()> {
    let mut spec = flag_spec(&cli);
    if let Some(path) = &cli.request {
        let file_spec = load_request(path)
            .with_context(|| format!("failed to load request {}", path.display()))?;
        spec = spec.or(file_spec);
    }

    let request = spec.validate()?;
    let policies = lookup_policies(&request).with_context(|| {
        format!(
            "failed to look up policies in {}",
            request.filename.display()
        )
    })?;
    let rendered = format_policies(&policies, request.formatter)?;

    match &cli.output {
        Some(path) => fs::write(path, format!("{rendered}\n"))
            .with_context(|| format!("failed to write output {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn flag_spec(cli: &Cli) -> RequestSpec {
    RequestSpec {
        filename: cli.config.clone(),
        uuid: cli.uuid.clone(),
        v_polid: cli.v_polid.clone(),
        expander: cli.expand.map(expander),
        formatter: cli.formatter.map(output_format),
        parallel: cli.parallel.then_some(true),
    }
}

fn expander(mode: ExpandMode) -> Expander {
    match mode {
        ExpandMode::None => Expander::None,
        ExpandMode::Addr => Expander::Addr,
    }
}

fn output_format(formatter: Formatter) -> OutputFormat {
    match formatter {
        Formatter::Json => OutputFormat::Json,
        Formatter::Csv => OutputFormat::Csv,
    }
}
