//! Command-line argument definitions for the cfn-xref CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the templates to check, how deep to
//! check them, how to print the results and how verbose logging is.

use clap::Parser;

use crate::config::OutputFormat;

/// Command-line arguments for the cfn-xref template checker
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Template files to check
    #[arg(required = true, help = "Paths to the template files")]
    pub inputs: Vec<String>,

    /// Also check the templates of nested stacks, recursively
    #[arg(short, long)]
    pub recurse: bool,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format; overrides the configuration file
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Exit with a failure status when only warnings are found
    #[arg(long)]
    pub fail_on_warnings: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let args = Args::parse_from([
            "cfn-xref",
            "--recurse",
            "--format",
            "short",
            "main.yml",
            "other.yml",
        ]);
        assert!(args.recurse);
        assert_eq!(args.format, Some(OutputFormat::Short));
        assert_eq!(args.inputs, vec!["main.yml", "other.yml"]);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["cfn-xref"]).is_err());
    }
}
