//! CLI for the feedscrub sanitizer.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use feedscrub_core::config;

use commands::{run_cache_key, run_check_domain, run_sanitize, SanitizeFlags};

/// Top-level CLI for the feedscrub HTML fragment sanitizer.
#[derive(Debug, Parser)]
#[command(name = "feedscrub")]
#[command(about = "feedscrub: HTML fragment sanitizer for feed content", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Sanitize a fragment read from FILE (or stdin when omitted).
    Sanitize {
        /// Input file; reads stdin when omitted.
        file: Option<String>,

        /// Base URI for resolving relative URLs.
        #[arg(long, default_value = "")]
        base: String,

        /// Treat the input as XHTML instead of HTML.
        #[arg(long)]
        xhtml: bool,

        /// Treat the input as plain text.
        #[arg(long, conflicts_with = "xhtml")]
        text: bool,

        /// Treat the input as a resource identifier (absolutize + encode).
        #[arg(long)]
        iri: bool,

        /// Base64-decode the input first.
        #[arg(long)]
        base64: bool,

        /// Encode filtered tags as visible text instead of removing them.
        #[arg(long)]
        encode: bool,

        /// Remove HTML comments.
        #[arg(long)]
        strip_comments: bool,

        /// Keep a bare `<div>` wrapper around the output.
        #[arg(long)]
        keep_div: bool,
    },

    /// Report whether HTTPS is forced for a hostname.
    CheckDomain {
        /// Hostname to look up, e.g. `www.example.com`.
        host: String,
    },

    /// Print the image-proxy cache key for a URL.
    CacheKey {
        /// Image URL.
        url: String,
    },
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Sanitize {
                file,
                base,
                xhtml,
                text,
                iri,
                base64,
                encode,
                strip_comments,
                keep_div,
            } => {
                let flags = SanitizeFlags { xhtml, text, iri, base64, encode, strip_comments, keep_div };
                run_sanitize(cfg, file.as_deref(), &base, flags)?;
            }
            CliCommand::CheckDomain { host } => run_check_domain(&cfg, &host)?,
            CliCommand::CacheKey { url } => run_cache_key(&url)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
