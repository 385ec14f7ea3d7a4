use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pdf_pages::{ReorganizeOptions, SplitMarkers, TransformMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdfp", about = "PDF page selection and reorganization", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the pages a selection expression resolves to (1-based)
    Select {
        /// Selection expression, e.g. "1-10 & even" or "3n+1"
        #[arg(short, long, default_value = "")]
        expr: String,

        /// Page count to resolve against
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        pages: Option<usize>,

        /// Read the page count from a PDF
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Fall back to a comma-separated reading of malformed expressions
        #[arg(long)]
        lenient: bool,
    },

    /// Reorder, filter or split the pages of a PDF
    Rearrange {
        /// Input PDF file
        #[arg(short, long, required_unless_present = "config")]
        input: Option<PathBuf>,

        /// Directory for the output document(s)
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Page order mode
        #[arg(long, default_value = "custom", value_enum)]
        mode: ModeArg,

        /// Selection expression (custom mode) or repeat count (duplicate mode)
        #[arg(long, default_value = "")]
        order: String,

        /// Start a new document after these 1-based output positions
        #[arg(long, value_delimiter = ',')]
        split_after: Vec<usize>,

        /// Reject malformed selection expressions
        #[arg(long)]
        strict: bool,

        /// Load options from a JSON file (flags above are ignored)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Show statistics only, don't write documents
        #[arg(long)]
        stats_only: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Custom,
    Reverse,
    Duplex,
    Booklet,
    SideStitch,
    OddEvenSplit,
    OddEvenMerge,
    RemoveFirst,
    RemoveLast,
    RemoveFirstAndLast,
    Duplicate,
}

impl From<ModeArg> for TransformMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Custom => Self::Custom,
            ModeArg::Reverse => Self::ReverseOrder,
            ModeArg::Duplex => Self::DuplexSort,
            ModeArg::Booklet => Self::BookletSort,
            ModeArg::SideStitch => Self::SideStitchBookletSort,
            ModeArg::OddEvenSplit => Self::OddEvenSplit,
            ModeArg::OddEvenMerge => Self::OddEvenMerge,
            ModeArg::RemoveFirst => Self::RemoveFirst,
            ModeArg::RemoveLast => Self::RemoveLast,
            ModeArg::RemoveFirstAndLast => Self::RemoveFirstAndLast,
            ModeArg::Duplicate => Self::Duplicate,
        }
    }
}

fn format_pages(pages: &[usize]) -> String {
    pages
        .iter()
        .map(|idx| (idx + 1).to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            expr,
            pages,
            input,
            lenient,
        } => {
            let total_pages = match (pages, input) {
                (Some(pages), _) => pages,
                (None, Some(input)) => pdf_pages::load_source(&input)
                    .await
                    .with_context(|| format!("Failed to load {}", input.display()))?
                    .page_count(),
                (None, None) => bail!("Either --pages or --input is required"),
            };

            let resolved = if lenient {
                let preview = pdf_pages::resolve_with_diagnostics(&expr, total_pages);
                if let Some(warning) = &preview.warning {
                    eprintln!("warning: {warning}");
                }
                preview.pages
            } else {
                pdf_pages::resolve(&expr, total_pages)?
            };

            println!("{}", format_pages(&resolved));
        }

        Commands::Rearrange {
            input,
            output_dir,
            mode,
            order,
            split_after,
            strict,
            config,
            stats_only,
        } => {
            let options = match config {
                Some(path) => ReorganizeOptions::load(&path)
                    .await
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => ReorganizeOptions {
                    input_file: input.unwrap_or_default(),
                    mode: mode.into(),
                    page_order: order,
                    split_after: split_after
                        .into_iter()
                        .filter(|&p| p > 0)
                        .map(|p| p - 1)
                        .collect::<SplitMarkers>(),
                    strict,
                },
            };
            options.validate()?;

            let source = pdf_pages::load_source(&options.input_file)
                .await
                .with_context(|| format!("Failed to load {}", options.input_file.display()))?;
            let plan = options.plan(source.page_count())?;
            if let Some(warning) = &plan.warning {
                eprintln!("warning: {warning}");
            }

            // Calculate and show statistics
            let stats =
                pdf_pages::calculate_statistics(source.page_count(), &plan.pages, &options.split_after);
            println!("Reorganization ({}):", options.mode);
            println!("  Source pages: {}", stats.source_pages);
            println!("  Output pages: {}", stats.output_pages);
            println!("  Output documents: {}", stats.output_documents);
            if stats.duplicated_pages > 0 {
                println!("  Duplicated pages: {}", stats.duplicated_pages);
            }
            println!("  Page order: {}", format_pages(&plan.pages));

            if stats_only {
                return Ok(());
            }

            let outputs = pdf_pages::materialize(&source, &plan.pages, &options.split_after).await?;
            let written = pdf_pages::save_outputs(outputs, &output_dir).await?;
            for path in written {
                println!("Wrote → {}", path.display());
            }
        }
    }

    Ok(())
}
