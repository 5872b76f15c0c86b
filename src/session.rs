//! Page-visit coordination.
//!
//! A [`PageSession`] owns everything tied to one visit of one page: the
//! in-memory parameter set, the hostname-scoped store entries, and the
//! reflection checker. It mirrors the page lifecycle: [`PageSession::load`]
//! on page load, [`PageSession::check`] on an explicit check request, and
//! [`PageSession::unload`] when the visit ends.

use anyhow::{anyhow, Context, Result};
use futures::future::join_all;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use url::Url;

use crate::aggregate::{self, ResourceKind};
use crate::config::Config;
use crate::model::{ParamSet, ProbeState};
use crate::probe::{HttpProber, ReflectionChecker};
use crate::store::SiteStore;

pub struct PageSession {
    url: Url,
    hostname: String,
    store: SiteStore,
    checker: Box<dyn ReflectionChecker>,
    client: reqwest::Client,
    params: ParamSet,
    notifier: Option<oneshot::Sender<ProbeState>>,
    checked: bool,
}

impl PageSession {
    pub fn new(url: Url, store: SiteStore, config: &Config) -> Result<Self> {
        let hostname = url
            .host_str()
            .ok_or_else(|| anyhow!("URL has no hostname: {}", url))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            url,
            hostname,
            store,
            checker: Box::new(HttpProber::new(config)?),
            client,
            params: ParamSet::new(),
            notifier: None,
            checked: false,
        })
    }

    /// Replaces the reflection checker. Used by tests and embedders.
    pub fn with_checker(mut self, checker: Box<dyn ReflectionChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Registers a one-shot listener fired when a reflection check
    /// completes, carrying [`ProbeState::Checked`].
    pub fn notify_on_checked(&mut self, notifier: oneshot::Sender<ProbeState>) {
        self.notifier = Some(notifier);
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn store(&self) -> &SiteStore {
        &self.store
    }

    /// The full in-memory parameter set accumulated so far, unfiltered.
    pub fn params(&self) -> &ParamSet {
        &self.params
    }

    /// Whether a reflection check already ran during this session.
    pub fn checked(&self) -> bool {
        self.checked
    }

    /// Fetches the page, aggregates parameters from it and from every
    /// linked script, persists the set, and runs the reflection check
    /// immediately when autocheck is enabled for this hostname.
    pub async fn load(&mut self) -> Result<()> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("failed to fetch page: {}", self.url))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed to read page body: {}", self.url))?;

        self.ingest_snapshot(&body, &content_type)?;

        // Linked scripts fetch concurrently; each successful body merges
        // into the same set through its own aggregation pass.
        let scripts = aggregate::linked_scripts(&self.url, &body);
        let bodies = join_all(scripts.iter().map(|script_url| self.fetch_script(script_url))).await;
        for (script_url, text) in scripts.iter().zip(bodies) {
            if let Some(text) = text {
                debug!(url = %script_url, "merging linked script");
                self.ingest(None, &text, ResourceKind::Script)?;
            }
        }

        if self.store.autocheck_enabled(&self.hostname) {
            debug!(host = %self.hostname, "autocheck enabled, probing now");
            self.check().await?;
        }

        Ok(())
    }

    /// Aggregates a page body supplied by the caller instead of fetched
    /// over the network.
    pub fn ingest_snapshot(&mut self, body: &str, content_type: &str) -> Result<()> {
        let kind = ResourceKind::from_content_type(content_type);
        self.ingest(Some(self.url.clone()), body, kind)
    }

    /// Probes the current in-memory set against the page URL, persists
    /// the reflections, and fires the completion signal.
    pub async fn check(&mut self) -> Result<Vec<String>> {
        let reflections = self
            .checker
            .check(self.params.as_slice(), self.url.as_str())
            .await?;

        self.store
            .save_reflections(&self.hostname, &reflections)
            .with_context(|| format!("failed to persist reflections for {}", self.hostname))?;
        self.checked = true;

        if let Some(notifier) = self.notifier.take() {
            // The listener may be gone; that is not our problem.
            let _ = notifier.send(ProbeState::Checked);
        }

        Ok(reflections)
    }

    /// Page-unload: removes this hostname's parameters and reflections
    /// from the store. Settings and logged history survive.
    pub fn unload(&self) -> Result<()> {
        self.store
            .clear_site(&self.hostname)
            .with_context(|| format!("failed to clear site state for {}", self.hostname))
    }

    fn ingest(&mut self, page_url: Option<Url>, body: &str, kind: ResourceKind) -> Result<()> {
        let candidates = aggregate::collect(page_url.as_ref(), body, kind);
        self.params.extend(candidates);
        self.persist_params()?;

        if self.store.logging_enabled(&self.hostname) {
            self.store
                .append_logged(&self.hostname, self.params.as_slice())
                .with_context(|| format!("failed to append log for {}", self.hostname))?;
        }

        Ok(())
    }

    // The stored set honors the regex filter; the in-memory set used for
    // probing stays unfiltered.
    fn persist_params(&self) -> Result<()> {
        let persisted = match self.store.regex_filter(&self.hostname) {
            Some(pattern) => self.params.filtered(&pattern),
            None => self.params.to_vec(),
        };
        self.store
            .save_params(&self.hostname, &persisted)
            .with_context(|| format!("failed to persist parameters for {}", self.hostname))
    }

    async fn fetch_script(&self, script_url: &str) -> Option<String> {
        let response = match self.client.get(script_url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = script_url, error = %e, "linked script fetch failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(url = script_url, status = %response.status(), "linked script fetch skipped");
            return None;
        }

        match response.text().await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(url = script_url, error = %e, "failed to read linked script body");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedChecker(Vec<String>);

    #[async_trait]
    impl ReflectionChecker for FixedChecker {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn check(&self, params: &[String], _base_url: &str) -> Result<Vec<String>> {
            Ok(self
                .0
                .iter()
                .filter(|name| params.contains(*name))
                .cloned()
                .collect())
        }
    }

    fn test_session(dir: &TempDir) -> PageSession {
        let url = Url::parse("https://x.test/search?q=cats&page=2").unwrap();
        let store = SiteStore::with_dir(dir.path());
        PageSession::new(url, store, &Config::default()).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_client_config() {
        let dir = TempDir::new().unwrap();
        let url = Url::parse("https://x.test/").unwrap();
        let store = SiteStore::with_dir(dir.path());
        let config = Config {
            user_agent: "bad\nagent".to_string(),
            ..Config::default()
        };
        assert!(PageSession::new(url, store, &config).is_err());
    }

    #[test]
    fn test_snapshot_aggregates_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut session = test_session(&dir);

        let body = r#"<script>const foo, bar = 1;</script><input name="q">"#;
        session.ingest_snapshot(body, "text/html").unwrap();

        let params = session.params().to_vec();
        assert_eq!(params[..2].to_vec(), vec!["q", "page"]);
        assert!(params.contains(&"foo".to_string()));
        assert!(params.contains(&"bar".to_string()));

        let store = SiteStore::with_dir(dir.path());
        assert_eq!(store.load_params("x.test"), params);
    }

    #[test]
    fn test_filter_applies_to_store_not_memory() {
        let dir = TempDir::new().unwrap();
        let store = SiteStore::with_dir(dir.path());
        store.set_regex_filter("x.test", Some("^user")).unwrap();

        let mut session = test_session(&dir);
        session
            .ingest_snapshot(r#"{"user_id": 1, "token": 2}"#, "text/html")
            .unwrap();

        // In-memory set keeps everything; the persisted view is filtered.
        assert!(session.params().contains("token"));
        assert_eq!(store.load_params("x.test"), vec!["user_id"]);
    }

    #[test]
    fn test_logging_accumulates_across_ingests() {
        let dir = TempDir::new().unwrap();
        let store = SiteStore::with_dir(dir.path());
        store.set_logging("x.test", true).unwrap();

        let mut session = test_session(&dir);
        session
            .ingest_snapshot(r#"{"alpha": 1}"#, "text/html")
            .unwrap();
        session
            .ingest(None, r#"{"beta": 1}"#, ResourceKind::Script)
            .unwrap();

        let logged = store.logged_params("x.test");
        assert!(logged.contains(&"alpha".to_string()));
        assert!(logged.contains(&"beta".to_string()));
    }

    #[tokio::test]
    async fn test_check_persists_and_signals() {
        let dir = TempDir::new().unwrap();
        let mut session = test_session(&dir)
            .with_checker(Box::new(FixedChecker(vec!["q".to_string()])));

        session.ingest_snapshot("", "text/html").unwrap();

        let (tx, rx) = oneshot::channel();
        session.notify_on_checked(tx);

        let reflections = session.check().await.unwrap();
        assert_eq!(reflections, vec!["q"]);
        assert!(session.checked());
        assert_eq!(rx.await.unwrap(), ProbeState::Checked);

        let store = SiteStore::with_dir(dir.path());
        assert_eq!(store.load_reflections("x.test"), vec!["q"]);
    }

    #[tokio::test]
    async fn test_unload_clears_visit_state_only() {
        let dir = TempDir::new().unwrap();
        let store = SiteStore::with_dir(dir.path());
        store.set_autocheck("x.test", true).unwrap();

        let mut session = test_session(&dir)
            .with_checker(Box::new(FixedChecker(vec!["q".to_string()])));
        session.ingest_snapshot("", "text/html").unwrap();
        session.check().await.unwrap();

        session.unload().unwrap();

        assert!(store.load_params("x.test").is_empty());
        assert!(store.load_reflections("x.test").is_empty());
        assert!(store.autocheck_enabled("x.test"));
    }
}
