use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "modscript")]
#[command(about = "Check, format and run mod install scripts")]
pub(crate) struct Cli {
    /// Tracing filter; overrides MODSCRIPT_LOG.
    #[arg(long = "log", global = true)]
    pub(crate) log: Option<String>,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    Check(CheckArgs),
    Format(FormatArgs),
    Functions(FunctionsArgs),
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "dialect", default_value = "state-of-decay")]
    pub(crate) dialect: String,
    #[arg(long = "script", conflicts_with = "scripts_dir", required_unless_present = "scripts_dir")]
    pub(crate) script: Option<String>,
    #[arg(long = "scripts-dir")]
    pub(crate) scripts_dir: Option<String>,
}

#[derive(Debug, Args)]
pub(crate) struct FormatArgs {
    #[arg(long = "dialect", default_value = "state-of-decay")]
    pub(crate) dialect: String,
    #[arg(long = "script")]
    pub(crate) script: String,
}

#[derive(Debug, Args)]
pub(crate) struct FunctionsArgs {
    #[arg(long = "dialect", default_value = "state-of-decay")]
    pub(crate) dialect: String,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "dialect", default_value = "state-of-decay")]
    pub(crate) dialect: String,
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "mod-dir")]
    pub(crate) mod_dir: String,
    #[arg(long = "install-dir")]
    pub(crate) install_dir: String,
    #[arg(long = "game-version", default_value = "1.0")]
    pub(crate) game_version: String,
    /// JSON array of prompt answers, consumed in order.
    #[arg(long = "answers")]
    pub(crate) answers: Option<String>,
    /// Answer remaining prompts with yes, the first option or the default text.
    #[arg(long = "assume-yes")]
    pub(crate) assume_yes: bool,
}
