//! Check-domain command: query the forced-HTTPS domain set.

use anyhow::Result;
use feedscrub_core::config::SanitizeConfig;
use feedscrub_core::https_domains::DomainSet;

pub fn run_check_domain(cfg: &SanitizeConfig, host: &str) -> Result<()> {
    let domains = DomainSet::from_domains(&cfg.https_domains);
    if domains.is_forced_https(host) {
        println!("{}: forced HTTPS", host);
    } else {
        println!("{}: not forced", host);
    }
    Ok(())
}
