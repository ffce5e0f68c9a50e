use clap::{Parser, Subcommand};
use feliratok::{
    CATALOG_LANGUAGES, FeliratokEu, FeliratokError, Settings, SourceEncoding, SubtitleIdentifier,
    SubtitleInfo, SubtitleSearchRequest, VideoContentType, lookup_language, two_letter_prefix,
};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feliratok")]
#[command(version, about = "Search and download subtitles from feliratok.eu")]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search subtitles for a movie title
    Search {
        /// Title to search for
        title: String,

        /// Two-letter language code, e.g. "hu"; regional tags such as "en-US" are cut to "en"
        #[arg(short, long, default_value = "hu")]
        lang: String,

        /// Three-letter language code for the results (derived from --lang if omitted)
        #[arg(long)]
        lang3: Option<String>,

        /// Only show results whose title equals the searched title
        #[arg(long, overrides_with = "no_exact")]
        exact: bool,

        /// Show every result the catalog returns
        #[arg(long, overrides_with = "exact")]
        no_exact: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Download a subtitle by the id printed by `search`
    Download {
        /// Subtitle id, e.g. srt-hun-123456
        id: String,

        /// Encoding of the subtitle file on the catalog (latin1, latin2, utf8)
        #[arg(short, long)]
        encoding: Option<SourceEncoding>,

        /// Output file (defaults to <catalog id>.<language>.srt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the supported languages
    Languages,
}

fn init_logging(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "feliratok=info",
        _ => "feliratok=debug",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Cancels the returned token on Ctrl+C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });
    cancel
}

fn print_results(results: &[SubtitleInfo]) {
    if results.is_empty() {
        println!("No subtitles found.");
        return;
    }

    for subtitle in results {
        println!(
            "{:<20} {:<10} {}",
            subtitle.id,
            subtitle.published_date,
            subtitle.display_name.as_deref().unwrap_or("(untitled)")
        );
        if let Some(comment) = &subtitle.comment {
            println!("{:<20} {:<10} {}", "", "", comment);
        }
    }

    println!("\nFound {} subtitle(s).", results.len());
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::load(cli.config.as_deref()).map_err(FeliratokError::from)?;

    match cli.command {
        Command::Search {
            title,
            lang,
            lang3,
            exact,
            no_exact,
            json,
        } => {
            if exact {
                settings.exact_match = true;
            }
            if no_exact {
                settings.exact_match = false;
            }

            let three_letter_language = match lang3 {
                Some(code) => code,
                None => lookup_language(two_letter_prefix(&lang))?
                    .three_letter_code
                    .to_string(),
            };

            let provider = FeliratokEu::from_settings(settings)?;
            let request = SubtitleSearchRequest {
                name: title,
                two_letter_language: lang,
                three_letter_language,
                content_type: VideoContentType::Movie,
            };

            let results = provider.search(&request, &cancel_on_ctrl_c()).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_results(&results);
            }
        }

        Command::Download {
            id,
            encoding,
            output,
        } => {
            if let Some(encoding) = encoding {
                settings.source_encoding = encoding;
            }

            let identifier = SubtitleIdentifier::decode(&id)?;
            let provider = FeliratokEu::from_settings(settings)?;
            let subtitle = provider.get_subtitles(&id, &cancel_on_ctrl_c()).await?;

            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "{}.{}.{}",
                    identifier.catalog_id(),
                    subtitle.language,
                    subtitle.format
                ))
            });
            fs::write(&path, &subtitle.content)?;

            println!(
                "Saved {} to {}",
                humansize::format_size(subtitle.content.len(), humansize::DECIMAL),
                path.display()
            );
        }

        Command::Languages => {
            for language in CATALOG_LANGUAGES {
                println!(
                    "{}  {}  {}",
                    language.code, language.three_letter_code, language.facet_label
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
