//! Command-line surface

use std::path::PathBuf;

use clap::Parser;
use dumpsys_core::{SkipSet, TargetSpec};

#[derive(Debug, Parser)]
#[command(name = "dumpsys")]
#[command(author, version, about = "Dump the diagnostic state of running services")]
pub struct Cli {
    /// Only list services, do not dump them
    #[arg(short = 'l')]
    pub list: bool,

    /// List hardware services only
    #[arg(long)]
    pub hw: bool,

    /// Per-service timeout in seconds
    #[arg(short = 't', long = "timeout", value_name = "SECONDS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Services to label "(skipped)" in the summary
    #[arg(long, value_name = "NAME", num_args = 1..)]
    pub skip: Vec<String>,

    /// Configuration file path
    #[arg(short, long, env = "DUMPSYS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding general service sockets
    #[arg(long, env = "DUMPSYS_SERVICES_DIR")]
    pub services_dir: Option<PathBuf>,

    /// Directory holding hardware service sockets
    #[arg(long, env = "DUMPSYS_HARDWARE_DIR")]
    pub hardware_dir: Option<PathBuf>,

    /// Verbose logging (to stderr)
    #[arg(short, long)]
    pub verbose: bool,

    /// Service to dump, followed by arguments passed to it verbatim
    #[arg(value_name = "SERVICE", trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl Cli {
    /// What to dump; `--hw` wins over `-l`, which wins over a named service
    pub fn target(&self) -> TargetSpec {
        let skip: SkipSet = self.skip.iter().cloned().collect();

        if self.hw {
            TargetSpec::AllHardwareServices
        } else if self.list {
            TargetSpec::ListServices { skip }
        } else if let Some((name, args)) = self.command.split_first() {
            TargetSpec::single(name.as_str(), args.to_vec())
        } else {
            TargetSpec::all(skip)
        }
    }
}
