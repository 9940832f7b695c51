use crate::config;
use rand::{seq::SliceRandom, thread_rng};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, COOKIE, REFERER, SET_COOKIE,
    USER_AGENT,
};
use std::collections::BTreeMap;

// -----------------------------------------------
// PER-FETCH BROWSER SESSION
// -----------------------------------------------
// NSE fronts its APIs with an anti-bot gate: requests without the cookies
// set by the regular site pages get 401s. Each logical fetch gets its own
// session so concurrent fetches never share cookie state.
//
// Accept-Encoding is intentionally NOT set here; reqwest negotiates it and
// transparently decodes gzip/deflate/brotli bodies when the header is left
// to the client.
#[derive(Debug)]
pub struct ExchangeSession {
    base_headers: HeaderMap,
    cookies: BTreeMap<String, String>,
}

impl ExchangeSession {
    pub fn new() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(config::USER_AGENT));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

        // Rotating Accept-Language (fingerprint avoidance)
        let lang = config::ACCEPT_LANGUAGES
            .choose(&mut thread_rng())
            .copied()
            .unwrap_or("en-US,en;q=0.9");
        if let Ok(value) = HeaderValue::from_str(lang) {
            headers.insert(ACCEPT_LANGUAGE, value);
        }

        headers.insert(REFERER, HeaderValue::from_static(config::HEADER_REFERER));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

        Self {
            base_headers: headers,
            cookies: BTreeMap::new(),
        }
    }

    /// Absorb every `Set-Cookie` from a response into the jar. Later values
    /// overwrite earlier ones with the same name; cookies only accumulate
    /// within this session's lifetime.
    pub fn absorb_response(&mut self, headers: &HeaderMap) {
        for value in headers.get_all(SET_COOKIE) {
            let Ok(raw) = value.to_str() else { continue };

            // "name=value; Path=/; HttpOnly; ..." -> keep the first pair
            let Some(pair) = raw.split(';').next() else { continue };
            if let Some((name, val)) = pair.split_once('=') {
                let name = name.trim();
                if !name.is_empty() {
                    self.cookies.insert(name.to_string(), val.trim().to_string());
                }
            }
        }
    }

    /// Base headers plus a single joined `Cookie` header, omitted entirely
    /// while the jar is empty.
    pub fn request_headers(&self) -> HeaderMap {
        let mut headers = self.base_headers.clone();
        if !self.cookies.is_empty() {
            let joined = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            if let Ok(value) = HeaderValue::from_str(&joined) {
                headers.insert(COOKIE, value);
            }
        }
        headers
    }

    pub fn cookie_count(&self) -> usize {
        self.cookies.len()
    }
}

impl Default for ExchangeSession {
    fn default() -> Self {
        Self::new()
    }
}
