// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Webpage fetching for `contentType: "webpage"` messages

use std::collections::HashSet;
use std::net::IpAddr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum WebpageError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    #[error("URL has no host")]
    NoHost,

    #[error("blocked host: {0}")]
    BlockedHost(String),

    #[error("DNS resolution failed: {0}")]
    DnsResolution(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream answered HTTP {0}")]
    Status(u16),

    #[error("page exceeds {limit} bytes")]
    TooLarge { limit: usize },
}

impl WebpageError {
    /// True when the URL itself was rejected before any request was made
    pub fn is_rejected_url(&self) -> bool {
        matches!(
            self,
            WebpageError::InvalidUrl(_)
                | WebpageError::DisallowedScheme(_)
                | WebpageError::NoHost
                | WebpageError::BlockedHost(_)
        )
    }
}

/// Limits for outbound page fetches
#[derive(Debug, Clone)]
pub struct WebpageConfig {
    pub timeout: Duration,
    pub max_bytes: usize,
    /// Allow loopback and private network hosts
    pub allow_private_hosts: bool,
    pub user_agent: String,
}

impl Default for WebpageConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            max_bytes: 2 * 1024 * 1024,
            allow_private_hosts: false,
            user_agent: concat!("pii-shield/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Rejects URLs that would reach internal services.
///
/// Blocks non-HTTP(S) schemes, loopback, private and link-local ranges, and
/// cloud metadata hostnames.
#[derive(Debug, Clone)]
pub struct UrlValidator {
    blocked_hosts: HashSet<String>,
    blocked_cidrs: Vec<ipnet::IpNet>,
    allow_private: bool,
}

const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "metadata.google.internal",
    "metadata.gke.internal",
    "instance-data",
];

const BLOCKED_CIDRS: &[&str] = &[
    "0.0.0.0/8",
    "10.0.0.0/8",
    "100.64.0.0/10",
    "127.0.0.0/8",
    "169.254.0.0/16",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "::/128",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

impl UrlValidator {
    pub fn new(allow_private: bool) -> Self {
        Self {
            blocked_hosts: BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
            blocked_cidrs: BLOCKED_CIDRS
                .iter()
                .filter_map(|cidr| cidr.parse().ok())
                .collect(),
            allow_private,
        }
    }

    fn check_ip(&self, ip: IpAddr) -> Result<(), WebpageError> {
        let ip = match ip {
            IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(IpAddr::V6(v6)),
            v4 => v4,
        };
        if self.blocked_cidrs.iter().any(|cidr| cidr.contains(&ip)) {
            return Err(WebpageError::BlockedHost(ip.to_string()));
        }
        Ok(())
    }

    /// Syntactic checks: scheme, host name, literal IP ranges
    pub fn validate(&self, raw: &str) -> Result<Url, WebpageError> {
        let url = Url::parse(raw.trim())?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(WebpageError::DisallowedScheme(url.scheme().to_string()));
        }

        let host = url.host().ok_or(WebpageError::NoHost)?;
        if self.allow_private {
            return Ok(url);
        }

        match host {
            url::Host::Domain(domain) => {
                let domain = domain.trim_end_matches('.').to_ascii_lowercase();
                if self.blocked_hosts.contains(&domain) || domain.ends_with(".localhost") {
                    return Err(WebpageError::BlockedHost(domain));
                }
            }
            url::Host::Ipv4(ip) => self.check_ip(IpAddr::V4(ip))?,
            url::Host::Ipv6(ip) => self.check_ip(IpAddr::V6(ip))?,
        }

        Ok(url)
    }

    /// `validate` plus a DNS lookup, so names resolving to internal
    /// addresses are rejected too
    pub async fn validate_with_dns(&self, raw: &str) -> Result<Url, WebpageError> {
        let url = self.validate(raw)?;
        if self.allow_private {
            return Ok(url);
        }

        if let Some(url::Host::Domain(domain)) = url.host() {
            let port = url.port_or_known_default().unwrap_or(80);
            let addrs = tokio::net::lookup_host((domain, port))
                .await
                .map_err(|e| WebpageError::DnsResolution(e.to_string()))?;
            for addr in addrs {
                self.check_ip(addr.ip())?;
            }
        }

        Ok(url)
    }
}

const MAX_REDIRECTS: usize = 5;

/// Fetches a page and reduces it to plain text
#[derive(Debug, Clone)]
pub struct WebpageFetcher {
    client: reqwest::Client,
    validator: UrlValidator,
    max_bytes: usize,
}

impl WebpageFetcher {
    pub fn new(config: &WebpageConfig) -> Result<Self, WebpageError> {
        let validator = UrlValidator::new(config.allow_private_hosts);

        // Every redirect hop must pass the same checks as the first URL
        let hop_validator = validator.clone();
        let redirect = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                attempt.error("too many redirects")
            } else if hop_validator.validate(attempt.url().as_str()).is_err() {
                attempt.stop()
            } else {
                attempt.follow()
            }
        });

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(redirect)
            .build()?;
        Ok(Self {
            client,
            validator,
            max_bytes: config.max_bytes,
        })
    }

    /// Fetch `url` and return the visible text of the page
    pub async fn fetch_text(&self, url: &str) -> Result<String, WebpageError> {
        let url = self.validator.validate_with_dns(url).await?;
        tracing::debug!(url = %url, "fetching webpage");

        let mut response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "webpage fetch failed");
            return Err(WebpageError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(WebpageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(WebpageError::TooLarge {
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        let html = String::from_utf8_lossy(&body);
        let text = html_to_text(&html);
        tracing::debug!(url = %url, bytes = body.len(), chars = text.chars().count(), "webpage extracted");
        Ok(text)
    }
}

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|head)\b[^>]*>.*?</(script|style|noscript|head)\s*>")
        .expect("valid script/style regex")
});
static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6]|section|article|header|footer|blockquote)\s*>")
        .expect("valid block regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static INLINE_SPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\f]+").expect("valid whitespace regex"));
static BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n(\s*\n)+").expect("valid blank line regex"));

/// Strip markup from an HTML document, keeping block boundaries as newlines
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_STYLE.replace_all(html, " ");
    let text = COMMENT.replace_all(&text, " ");
    let text = BLOCK_BREAK.replace_all(&text, "\n");
    let text = TAG.replace_all(&text, " ");

    // `&amp;` last so encoded entities are not decoded twice
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let text = INLINE_SPACE.replace_all(&text, " ");
    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = lines.join("\n");
    BLANK_LINES.replace_all(&text, "\n\n").trim().to_string()
}
