//! Font-metrics readiness gate.
//!
//! A [`Session`] owns the mutable state of one notation view. Until the
//! glyph metrics resource arrives, parse and render requests are not
//! executed: at most one of each is queued, and a second request before
//! readiness overwrites the pending one. When the gate opens the
//! pending requests replay once, in order (parse, then render). There
//! is no cancellation.

use crate::config::EngraveConfig;
use crate::error::Error;
use crate::layout::{layout_score, LayoutResult};
use crate::metrics::GlyphMetrics;
use crate::model::Score;
use crate::parser::parse_notation;

pub struct Session {
    config: EngraveConfig,
    metrics: Option<GlyphMetrics>,
    score: Option<Score>,
    pending_parse: Option<String>,
    pending_render: bool,
}

impl Session {
    /// A session waiting for its glyph metrics.
    pub fn new(config: EngraveConfig) -> Self {
        Self { config, metrics: None, score: None, pending_parse: None, pending_render: false }
    }

    /// A session that is ready immediately.
    pub fn with_metrics(config: EngraveConfig, metrics: GlyphMetrics) -> Self {
        let mut session = Self::new(config);
        session.metrics = Some(metrics);
        session
    }

    pub fn is_ready(&self) -> bool {
        self.metrics.is_some()
    }

    /// Parse notation source. Before readiness the source is queued
    /// (replacing any queued source) and `false` is returned.
    pub fn load(&mut self, source: &str) -> Result<bool, Error> {
        if self.metrics.is_none() {
            self.pending_parse = Some(source.to_string());
            return Ok(false);
        }
        self.score = Some(parse_notation(source, self.config.language)?);
        Ok(true)
    }

    /// Lay out the loaded notation. Before readiness the request is
    /// queued and `None` is returned.
    pub fn render(&mut self) -> Result<Option<LayoutResult>, Error> {
        let metrics = match &self.metrics {
            Some(metrics) => metrics,
            None => {
                self.pending_render = true;
                return Ok(None);
            }
        };
        let score = self
            .score
            .as_ref()
            .ok_or_else(|| Error::BadInput("no notation loaded".to_string()))?;
        layout_score(score, metrics, &self.config).map(Some)
    }

    /// Open the gate: store the metrics and replay the pending parse
    /// and render requests, in that order.
    pub fn metrics_ready(&mut self, metrics: GlyphMetrics) -> Result<Option<LayoutResult>, Error> {
        self.metrics = Some(metrics);
        if let Some(source) = self.pending_parse.take() {
            self.score = Some(parse_notation(&source, self.config.language)?);
        }
        if self.pending_render {
            self.pending_render = false;
            return self.render();
        }
        Ok(None)
    }
}
