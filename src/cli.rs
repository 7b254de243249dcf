//! Command-line interface definitions for the collector driver.
//!
//! All arguments can be provided via command-line flags, and the paths via
//! environment variables.

use clap::Parser;
use news_collect::Tag;
use std::path::PathBuf;

/// Command-line arguments for the collector driver.
///
/// # Examples
///
/// ```sh
/// # First two pages of the mobile and 5G channels
/// news_collect -o ./out --tag mobile --tag 5g --pages 2
///
/// # With a config file
/// news_collect -o ./out -c config.yaml --tag it
///
/// # Show which tags a collector supports
/// news_collect -o ./out --list-tags
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Output directory for the collected articles JSON
    #[arg(short, long, env = "NEWS_COLLECT_OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Optional path to config.yaml file
    #[arg(short, long, env = "NEWS_COLLECT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Collector to run
    #[arg(long, default_value = "www_163_com")]
    pub collector: String,

    /// Tags to collect; defaults to every tag the collector supports
    #[arg(short, long = "tag", value_enum)]
    pub tags: Vec<Tag>,

    /// Listing pages to walk per tag
    #[arg(short, long, default_value_t = 1)]
    pub pages: u32,

    /// Re-extract articles that already have a snapshot
    #[arg(long)]
    pub include_seen: bool,

    /// Print the supported tags and exit
    #[arg(long)]
    pub list_tags: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["news_collect", "--output-dir", "./out"]);

        assert_eq!(cli.output_dir, PathBuf::from("./out"));
        assert_eq!(cli.collector, "www_163_com");
        assert_eq!(cli.pages, 1);
        assert!(cli.tags.is_empty());
        assert!(!cli.include_seen);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "news_collect",
            "-o",
            "/tmp/out",
            "-t",
            "mobile",
            "-t",
            "5g",
            "-p",
            "3",
        ]);

        assert_eq!(cli.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(cli.tags, vec![Tag::Mobile, Tag::FiveG]);
        assert_eq!(cli.pages, 3);
    }

    #[test]
    fn test_cli_rejects_unknown_tag() {
        assert!(Cli::try_parse_from(["news_collect", "-o", "x", "-t", "weather"]).is_err());
    }
}
