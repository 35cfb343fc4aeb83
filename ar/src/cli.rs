use std::path::PathBuf;

use structopt::clap::AppSettings::*;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "ar",
    about = "Create, list and extract ar archives.",
    settings = &[SubcommandRequiredElseHelp, DisableHelpSubcommand, VersionlessSubcommands],
    usage = "ar (c|l|x|p) [FLAGS|OPTIONS] <archive> [files]..."
)]
pub struct CliOpts {
    #[structopt(short, long, help = "Show verbose output", global = true)]
    pub verbose: bool,

    #[structopt(subcommand)]
    pub cmd: Commands,
}

#[derive(Debug, StructOpt)]
pub enum Commands {
    #[structopt(name = "c", visible_alias = "create", about = "Create a new archive")]
    Create(CreateArgs),

    #[structopt(name = "l", visible_alias = "list", about = "List entries of an archive")]
    List(ListArgs),

    #[structopt(
        name = "x",
        visible_alias = "extract",
        about = "Extract entries from an archive"
    )]
    Extract(ExtractArgs),

    #[structopt(
        name = "p",
        visible_alias = "print",
        about = "Write entry contents to standard output"
    )]
    Print(PrintArgs),
}

#[derive(Debug, StructOpt)]
pub struct CreateArgs {
    #[structopt(short, long, help = "Overwrite the archive if it already exists")]
    pub force: bool,

    #[structopt(name = "archive", parse(from_os_str), help = "Path to the ar archive")]
    pub archive: PathBuf,

    #[structopt(
        name = "files",
        parse(from_os_str),
        required = true,
        help = "Files to add, stored under their file name"
    )]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct ListArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the ar archive")]
    pub archive: PathBuf,
}

#[derive(Debug, StructOpt)]
pub struct ExtractArgs {
    #[structopt(
        short,
        long,
        parse(from_os_str),
        help = "Output directory [default: current directory]"
    )]
    pub output: Option<PathBuf>,

    #[structopt(name = "archive", parse(from_os_str), help = "Path to the ar archive")]
    pub archive: PathBuf,

    #[structopt(name = "names", help = "Entries to extract (all if none given)")]
    pub names: Vec<String>,
}

#[derive(Debug, StructOpt)]
pub struct PrintArgs {
    #[structopt(name = "archive", parse(from_os_str), help = "Path to the ar archive")]
    pub archive: PathBuf,

    #[structopt(name = "names", help = "Entries to print (all if none given)")]
    pub names: Vec<String>,
}
