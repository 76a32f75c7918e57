//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "cprd",
    version,
    about = "CPRD code-list curation and cohort extraction",
    long_about = "Build disease and medication code lists from CPRD GOLD/Aurum \
                  master dictionaries, compare list versions, and extract \
                  code-matched patient events from record deliveries."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "compact", global = true)]
    pub log_format: LogFormatArg,

    /// Allow row-level patient data in trace logs (off by default; the
    /// records are PHI).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build a diagnosis code list from a dictionary and a rules file.
    DiagList(DiagListArgs),

    /// Build a medication code list from a product dictionary and a
    /// medication reference directory.
    MedList(MedListArgs),

    /// Compare a new code list against a previous version.
    Diff(DiffArgs),

    /// Extract code-matched patient events from a record delivery.
    Extract(ExtractArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DatabaseArg {
    Gold,
    Aurum,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum KindArg {
    Diagnosis,
    Medication,
}

#[derive(Parser)]
pub struct DiagListArgs {
    /// Path to the diagnosis master dictionary.
    #[arg(long, value_name = "PATH")]
    pub dictionary: PathBuf,

    /// Source database the dictionary belongs to.
    #[arg(long, value_enum)]
    pub database: DatabaseArg,

    /// TOML rules file (include/exclude patterns, subtypes, exceptions).
    #[arg(long, value_name = "PATH")]
    pub rules: PathBuf,

    /// Output code-list path (tab-delimited).
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Previous code-list version to diff against.
    #[arg(long, value_name = "PATH")]
    pub previous: Option<PathBuf>,
}

#[derive(Parser)]
pub struct MedListArgs {
    /// Path to the product master dictionary.
    #[arg(long, value_name = "PATH")]
    pub dictionary: PathBuf,

    /// Source database the dictionary belongs to.
    #[arg(long, value_enum)]
    pub database: DatabaseArg,

    /// Directory of medication reference files (one per drug class).
    #[arg(long, value_name = "DIR")]
    pub reference: PathBuf,

    /// Output code-list path (tab-delimited).
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,

    /// Where to write the precision-filter reject list for review
    /// (default: <out>.excluded).
    #[arg(long = "excluded-out", value_name = "PATH")]
    pub excluded_out: Option<PathBuf>,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Previous code-list version.
    #[arg(long, value_name = "PATH")]
    pub previous: PathBuf,

    /// New code-list version.
    #[arg(long, value_name = "PATH")]
    pub new: PathBuf,

    /// Current master dictionary (diagnosis or product, per --kind), used
    /// to drop retired codes from the missing report.
    #[arg(long, value_name = "PATH")]
    pub dictionary: PathBuf,

    /// Source database the dictionary belongs to.
    #[arg(long, value_enum)]
    pub database: DatabaseArg,

    /// Kind of code list being compared.
    #[arg(long, value_enum)]
    pub kind: KindArg,
}

#[derive(Parser)]
pub struct ExtractArgs {
    /// Directory holding the record delivery (numbered part files).
    #[arg(long, value_name = "DIR")]
    pub delivery: PathBuf,

    /// Source database of the delivery.
    #[arg(long, value_enum)]
    pub database: DatabaseArg,

    /// Record kind to extract.
    #[arg(long, value_enum)]
    pub kind: KindArg,

    /// Finalized code list to join against.
    #[arg(long = "code-list", value_name = "PATH")]
    pub code_list: PathBuf,

    /// Study config TOML with the earliest/latest window dates.
    #[arg(long, value_name = "PATH")]
    pub config: PathBuf,

    /// Output patient-event table (tab-delimited).
    #[arg(long, value_name = "PATH")]
    pub out: PathBuf,
}

impl From<DatabaseArg> for cprd_model::SourceDatabase {
    fn from(arg: DatabaseArg) -> Self {
        match arg {
            DatabaseArg::Gold => cprd_model::SourceDatabase::Gold,
            DatabaseArg::Aurum => cprd_model::SourceDatabase::Aurum,
        }
    }
}

impl From<KindArg> for cprd_model::RecordKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Diagnosis => cprd_model::RecordKind::Diagnosis,
            KindArg::Medication => cprd_model::RecordKind::Medication,
        }
    }
}
