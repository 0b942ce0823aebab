//! Sanitize command: clean one fragment from a file or stdin.

use anyhow::{Context, Result};
use feedscrub_core::config::SanitizeConfig;
use feedscrub_core::content::ContentType;
use feedscrub_core::sanitize::Sanitizer;
use std::io::Read;

/// Per-invocation overrides layered on the loaded config.
#[derive(Debug, Default, Clone, Copy)]
pub struct SanitizeFlags {
    pub xhtml: bool,
    pub text: bool,
    pub iri: bool,
    pub base64: bool,
    pub encode: bool,
    pub strip_comments: bool,
    pub keep_div: bool,
}

pub fn run_sanitize(
    mut cfg: SanitizeConfig,
    file: Option<&str>,
    base: &str,
    flags: SanitizeFlags,
) -> Result<()> {
    if flags.encode {
        cfg.encode_instead_of_strip = true;
    }
    if flags.strip_comments {
        cfg.strip_comments = true;
    }
    if flags.keep_div {
        cfg.remove_div = false;
    }

    let input = match file {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("read {}", path))?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };

    let mut ctype = if flags.text {
        ContentType::text()
    } else if flags.xhtml {
        ContentType::xhtml()
    } else {
        ContentType::html()
    };
    if flags.iri {
        ctype = ctype.with_iri();
    }
    if flags.base64 {
        ctype = ctype.with_base64();
    }

    let sanitizer = Sanitizer::new(cfg).context("invalid sanitizer configuration")?;
    println!("{}", sanitizer.sanitize(&input, ctype, base));
    Ok(())
}
