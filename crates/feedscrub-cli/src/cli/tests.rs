//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;

fn parse(args: &[&str]) -> CliCommand {
    Cli::try_parse_from(args).unwrap().command
}

#[test]
fn sanitize_defaults() {
    match parse(&["feedscrub", "sanitize"]) {
        CliCommand::Sanitize { file, base, xhtml, text, iri, base64, encode, strip_comments, keep_div } => {
            assert!(file.is_none());
            assert_eq!(base, "");
            assert!(!xhtml && !text && !iri && !base64);
            assert!(!encode && !strip_comments && !keep_div);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn sanitize_with_file_base_and_flags() {
    match parse(&[
        "feedscrub",
        "sanitize",
        "item.html",
        "--base",
        "https://ex.com/feed",
        "--encode",
        "--strip-comments",
        "--keep-div",
    ]) {
        CliCommand::Sanitize { file, base, encode, strip_comments, keep_div, .. } => {
            assert_eq!(file.as_deref(), Some("item.html"));
            assert_eq!(base, "https://ex.com/feed");
            assert!(encode && strip_comments && keep_div);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn sanitize_text_and_xhtml_conflict() {
    assert!(Cli::try_parse_from(["feedscrub", "sanitize", "--text", "--xhtml"]).is_err());
}

#[test]
fn check_domain_takes_a_host() {
    match parse(&["feedscrub", "check-domain", "www.example.com"]) {
        CliCommand::CheckDomain { host } => assert_eq!(host, "www.example.com"),
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn cache_key_takes_a_url() {
    match parse(&["feedscrub", "cache-key", "http://example.com/x.png"]) {
        CliCommand::CacheKey { url } => assert_eq!(url, "http://example.com/x.png"),
        other => panic!("unexpected command: {:?}", other),
    }
}
