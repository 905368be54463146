use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "chexit")]
#[command(about = "Extract firewall policies from a configuration dump")]
pub struct Cli {
    /// Configuration file to scan.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Policy UUIDs to look up.
    #[arg(short, long, value_name = "UUID1[:UUID2...]")]
    pub uuid: Option<String>,
    /// VDOM and policy ID pairs to look up.
    #[arg(long = "v-polid", visible_alias = "v_polid", value_name = "VDOM1,ID1[:VDOM2,ID2...]")]
    pub v_polid: Option<String>,
    /// Expand address groups into subnets [default: addr].
    #[arg(long, value_enum)]
    pub expand: Option<ExpandMode>,
    /// Output format [default: json].
    #[arg(long, value_enum)]
    pub formatter: Option<Formatter>,
    /// Write the result to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Read the file once and match every key concurrently.
    #[arg(long)]
    pub parallel: bool,
    /// Request file (TOML, or JSON by extension). Flags override its values.
    #[arg(long)]
    pub request: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum ExpandMode {
    None,
    Addr,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum Formatter {
    Json,
    Csv,
}
