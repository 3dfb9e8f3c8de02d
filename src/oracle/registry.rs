//! PriceFeedRegistry: pares, reporters, configuração e operações administrativas.
//!
//! Concorrência: um `Mutex` por par; a rodada (filtro -> cálculo -> publicar/disparar)
//! acontece inteira sob esse lock. Ordem de locks: `settings` (leitura curta, antes de
//! tudo), depois par, depois `reporters`. Eventos saem só depois do commit, fora do lock.
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::amm::types::Amount;
use crate::auth::{ensure_admin, Address, CallContext, Timestamp};
use crate::config::{OracleSettings, SettingsUpdate};
use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::events::{Event, EventSink};
use crate::metrics;

use super::aggregation::{AggregationEngine, AggregationParams, Decision};
use super::breaker::CircuitBreaker;
use super::history::{HistoryBucket, HistoryLedger};
use super::reporter::{is_accurate, OracleReporter};
use super::types::{PairId, Price, PriceFeed, PriceSubmission, SubmissionOutcome};

/// Estado de um par: tudo o que uma rodada lê ou escreve.
#[derive(Debug, Clone)]
struct PairState {
    feed: PriceFeed,
    breaker: CircuitBreaker,
    history: HistoryLedger,
    /// Uma submissão por reporter; reenvio substitui.
    buffer: BTreeMap<Address, PriceSubmission>,
}

impl PairState {
    fn new(settings: &OracleSettings) -> Self {
        Self {
            feed: PriceFeed::empty(),
            breaker: CircuitBreaker::new(settings.reset_threshold_bps),
            history: HistoryLedger::new(settings.history_capacity, settings.bucket_secs),
            buffer: BTreeMap::new(),
        }
    }
}

type SharedPair = Arc<Mutex<PairState>>;

pub struct PriceFeedRegistry {
    admin: Address,
    settings: RwLock<OracleSettings>,
    paused: AtomicBool,
    reporters: RwLock<HashMap<Address, OracleReporter>>,
    pairs: RwLock<HashMap<PairId, SharedPair>>,
    sink: Arc<dyn EventSink>,
}

impl PriceFeedRegistry {
    pub fn new(admin: Address, settings: OracleSettings, sink: Arc<dyn EventSink>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            admin,
            settings: RwLock::new(settings),
            paused: AtomicBool::new(false),
            reporters: RwLock::new(HashMap::new()),
            pairs: RwLock::new(HashMap::new()),
            sink,
        })
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    pub fn settings(&self) -> OracleSettings {
        self.settings.read().clone()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    fn pair(&self, id: &PairId) -> Result<SharedPair> {
        self.pairs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| crate::core_err!(ErrorCode::UnknownPair, pair => id))
    }

    fn emit_all(&self, events: Vec<Event>) {
        for e in events {
            self.sink.emit(e);
        }
    }

    // -------------------------
    // Reporters
    // -------------------------

    /// Cadastra o chamador como reporter (ainda não autorizado).
    pub fn register_reporter(&self, ctx: &CallContext, stake: Amount) -> Result<()> {
        if stake == 0 {
            crate::core_bail!(ErrorCode::InvalidStake, stake => 0);
        }
        {
            let mut reporters = self.reporters.write();
            if reporters.contains_key(&ctx.caller) {
                crate::core_bail!(ErrorCode::InvalidStake, reporter => ctx.caller, detalhe => "já registrado");
            }
            reporters.insert(ctx.caller, OracleReporter::new(ctx.caller, stake));
        }
        info!(reporter = %ctx.caller, stake, "reporter registrado");
        self.sink.emit(Event::ReporterRegistered { reporter: ctx.caller, stake });
        Ok(())
    }

    pub fn authorize_reporter(&self, ctx: &CallContext, reporter: &Address) -> Result<()> {
        self.set_authorized(ctx, reporter, true)
    }

    pub fn deauthorize_reporter(&self, ctx: &CallContext, reporter: &Address) -> Result<()> {
        self.set_authorized(ctx, reporter, false)
    }

    fn set_authorized(&self, ctx: &CallContext, reporter: &Address, value: bool) -> Result<()> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let mut reporters = self.reporters.write();
        let r = reporters
            .get_mut(reporter)
            .ok_or_else(|| crate::core_err!(ErrorCode::UnknownReporter, reporter => reporter))?;
        r.is_authorized = value;
        info!(reporter = %reporter, authorized = value, "autorização de reporter alterada");
        Ok(())
    }

    pub fn reporter(&self, address: &Address) -> Option<OracleReporter> {
        self.reporters.read().get(address).cloned()
    }

    pub fn get_reporter_reputation(&self, address: &Address) -> Result<u32> {
        self.reporters
            .read()
            .get(address)
            .map(|r| r.reputation_score)
            .ok_or_else(|| crate::core_err!(ErrorCode::UnknownReporter, reporter => address))
    }

    // -------------------------
    // Pares
    // -------------------------

    pub fn add_pair(&self, ctx: &CallContext, id: PairId) -> Result<()> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let settings = self.settings();
        let mut pairs = self.pairs.write();
        if pairs.contains_key(&id) {
            crate::core_bail!(ErrorCode::PairExists, pair => id);
        }
        info!(pair = %id, "par adicionado");
        pairs.insert(id, Arc::new(Mutex::new(PairState::new(&settings))));
        Ok(())
    }

    pub fn set_pair_active(&self, ctx: &CallContext, id: &PairId, active: bool) -> Result<()> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let shared = self.pair(id)?;
        shared.lock().feed.is_active = active;
        info!(pair = %id, active, "status do par alterado");
        Ok(())
    }

    pub fn pair_ids(&self) -> Vec<PairId> {
        let mut ids: Vec<PairId> = self.pairs.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    // -------------------------
    // Submissão e rodada
    // -------------------------

    /// Bufferiza a observação do chamador e, no quórum, roda a agregação na mesma chamada.
    pub fn submit_price(
        &self,
        ctx: &CallContext,
        id: &PairId,
        price: Price,
        confidence: u8,
        timestamp: Timestamp,
    ) -> Result<SubmissionOutcome> {
        if self.is_paused() {
            crate::core_bail!(ErrorCode::OraclePaused, pair => id);
        }
        if confidence > 100 {
            crate::core_bail!(ErrorCode::InvalidConfidence, confidence => confidence);
        }
        if price == 0 {
            crate::core_bail!(ErrorCode::InvalidAmount, price => 0, pair => id);
        }
        if timestamp > ctx.now {
            crate::core_bail!(ErrorCode::InvalidAmount, timestamp => timestamp, now => ctx.now, pair => id);
        }
        let settings = self.settings();
        let shared = self.pair(id)?;

        let (outcome, events) = metrics::time("submit_price", || {
            let mut state = shared.lock();
            self.ensure_authorized_reporter(&ctx.caller)?;
            if !state.feed.is_active {
                crate::core_bail!(ErrorCode::PairInactive, pair => id);
            }
            self.submit_locked(&mut state, &settings, ctx, id, price, confidence, timestamp)
        })?;

        metrics::record_submission(id.as_str(), outcome.label());
        self.emit_all(events);
        Ok(outcome)
    }

    fn ensure_authorized_reporter(&self, caller: &Address) -> Result<()> {
        match self.reporters.read().get(caller) {
            Some(r) if r.is_authorized => Ok(()),
            _ => Err(crate::core_err!(ErrorCode::Unauthorized, caller => caller)),
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn submit_locked(
        &self,
        state: &mut PairState,
        settings: &OracleSettings,
        ctx: &CallContext,
        id: &PairId,
        price: Price,
        confidence: u8,
        timestamp: Timestamp,
    ) -> Result<(SubmissionOutcome, Vec<Event>)> {
        let engine = AggregationEngine::with_params(AggregationParams::from(settings));
        let submission = PriceSubmission { reporter: ctx.caller, price, confidence, timestamp };

        if !engine.is_fresh(&submission, ctx.now) {
            debug!(pair = %id, reporter = %ctx.caller, timestamp, "submissão já velha; ignorada");
            return Ok((SubmissionOutcome::Excluded, Vec::new()));
        }
        if !state.breaker.admits(price) {
            warn!(pair = %id, reporter = %ctx.caller, price,
                last_normal = state.breaker.last_normal_price, "submissão fora da faixa de reset; excluída");
            return Ok((SubmissionOutcome::Excluded, Vec::new()));
        }

        // trabalha numa cópia do buffer; só grava depois que a rodada (se houver) deu certo
        let mut buffer = state.buffer.clone();
        buffer.insert(ctx.caller, submission);
        buffer.retain(|_, s| engine.is_fresh(s, ctx.now));

        if buffer.len() < settings.min_sources {
            state.buffer = buffer;
            self.record_submissions(&[submission]);
            let pending = state.buffer.len();
            debug!(pair = %id, pending, "submissão bufferizada");
            return Ok((SubmissionOutcome::Buffered { pending }, Vec::new()));
        }

        let round: Vec<PriceSubmission> = buffer.values().copied().collect();
        let decision = engine.run_round(&round, state.feed.current_price, ctx.now)?;
        self.record_submissions(&[submission]);
        Ok(self.apply_decision(state, settings, id, &round, decision, ctx.now))
    }

    fn record_submissions(&self, subs: &[PriceSubmission]) {
        let mut reporters = self.reporters.write();
        for s in subs {
            if let Some(r) = reporters.get_mut(&s.reporter) {
                r.record_submission(s.timestamp);
            }
        }
    }

    /// Commit do desfecho da rodada. Infalível: toda validação já ocorreu.
    fn apply_decision(
        &self,
        state: &mut PairState,
        settings: &OracleSettings,
        id: &PairId,
        round: &[PriceSubmission],
        decision: Decision,
        now: Timestamp,
    ) -> (SubmissionOutcome, Vec<Event>) {
        let previous = state.feed.current_price;
        let stats = *decision.stats();
        let mut events = Vec::with_capacity(2);
        state.buffer.clear();

        let outcome = match decision {
            Decision::Publish(stats) => {
                state.feed.current_price = stats.price;
                state.feed.confidence = stats.confidence;
                state.feed.last_update_time = now;
                state.feed.source_count = stats.source_count;
                state.history.record(stats.price, now);
                state.feed.twap = state.history.twap(settings.twap_window);
                state.feed.volume_weighted_price = state.history.volume_weighted(settings.twap_window);
                let healed = state.breaker.record_normal(stats.price);

                self.settle_reporters(round, stats.price, settings.accuracy_band_bps);
                info!(pair = %id, price = stats.price, old = previous, sources = stats.source_count,
                    deviation_bps = stats.deviation_bps, "preço publicado");
                metrics::record_round(id.as_str(), "published");

                events.push(Event::PriceUpdated {
                    pair: id.clone(),
                    new_price: stats.price,
                    old_price: previous,
                    confidence: stats.confidence,
                    source_count: stats.source_count,
                    deviation_bps: stats.deviation_bps,
                    timestamp: now,
                });
                if healed {
                    events.push(Event::CircuitBreakerReset { pair: id.clone(), manual: false, timestamp: now });
                }
                SubmissionOutcome::Published { price: stats.price, deviation_bps: stats.deviation_bps }
            }
            Decision::Trip(_) => {
                state.breaker.trip(stats.price, now);
                self.settle_reporters(round, previous, settings.accuracy_band_bps);
                warn!(pair = %id, trigger = stats.price, previous, deviation_bps = stats.deviation_bps,
                    "rodada anômala; preço não publicado");
                metrics::record_round(id.as_str(), "tripped");

                events.push(Event::CircuitBreakerTriggered {
                    pair: id.clone(),
                    trigger_price: stats.price,
                    previous_price: previous,
                    deviation_bps: stats.deviation_bps,
                    timestamp: now,
                });
                SubmissionOutcome::Tripped { trigger_price: stats.price, deviation_bps: stats.deviation_bps }
            }
        };
        (outcome, events)
    }

    fn settle_reporters(&self, round: &[PriceSubmission], reference: Price, band_bps: u32) {
        let mut reporters = self.reporters.write();
        for s in round {
            if let Some(r) = reporters.get_mut(&s.reporter) {
                r.settle(is_accurate(s.price, reference, band_bps));
            }
        }
    }

    /// Roda a rodada sobre o buffer atual (admin ou reporter autorizado).
    /// Aqui `InsufficientDataSources` aparece como erro, sem mutação.
    pub fn aggregate_now(&self, ctx: &CallContext, id: &PairId) -> Result<SubmissionOutcome> {
        if self.is_paused() {
            crate::core_bail!(ErrorCode::OraclePaused, pair => id);
        }
        if ctx.caller != self.admin {
            self.ensure_authorized_reporter(&ctx.caller)?;
        }
        let settings = self.settings();
        let shared = self.pair(id)?;

        let (outcome, events) = metrics::time("aggregate_now", || {
            let mut state = shared.lock();
            if !state.feed.is_active {
                crate::core_bail!(ErrorCode::PairInactive, pair => id);
            }
            let engine = AggregationEngine::with_params(AggregationParams::from(&settings));
            let buffered: Vec<PriceSubmission> = state.buffer.values().copied().collect();
            let decision = engine.run_round(&buffered, state.feed.current_price, ctx.now)?;
            let round = engine.filter_fresh(&buffered, ctx.now);
            Ok::<_, crate::error::Error>(self.apply_decision(&mut state, &settings, id, &round, decision, ctx.now))
        })?;

        self.emit_all(events);
        Ok(outcome)
    }

    // -------------------------
    // Leituras (sem efeito colateral)
    // -------------------------

    /// Preço atual; 0 para par desconhecido ou sem publicação ("sem preço confiável").
    pub fn get_price(&self, id: &PairId) -> Price {
        self.pair(id).map(|p| p.lock().feed.current_price).unwrap_or(0)
    }

    pub fn get_twap(&self, id: &PairId) -> Price {
        self.pair(id).map(|p| p.lock().feed.twap).unwrap_or(0)
    }

    pub fn price_feed(&self, id: &PairId) -> Option<PriceFeed> {
        self.pair(id).ok().map(|p| p.lock().feed)
    }

    /// Fresco, confiante, ativo e com breaker em NORMAL.
    pub fn is_healthy(&self, id: &PairId, now: Timestamp) -> bool {
        self.checked_price(id, now).is_ok()
    }

    /// Preço confiável ou o motivo de não haver um.
    pub fn checked_price(&self, id: &PairId, now: Timestamp) -> Result<Price> {
        let settings = self.settings();
        let shared = self.pair(id)?;
        let state = shared.lock();
        if !state.feed.is_active {
            crate::core_bail!(ErrorCode::PairInactive, pair => id);
        }
        if state.breaker.is_triggered {
            crate::core_bail!(ErrorCode::CircuitBreakerActive, pair => id, trigger_price => state.breaker.trigger_price);
        }
        let feed = state.feed;
        if !feed.has_price() || now.saturating_sub(feed.last_update_time) > settings.stale_threshold_secs {
            crate::core_bail!(ErrorCode::StalePrice, pair => id, last_update => feed.last_update_time, now => now);
        }
        if feed.confidence < settings.confidence_threshold {
            crate::core_bail!(ErrorCode::StalePrice, pair => id, confidence => feed.confidence,
                threshold => settings.confidence_threshold);
        }
        Ok(feed.current_price)
    }

    pub fn history(&self, id: &PairId) -> Result<Vec<HistoryBucket>> {
        Ok(self.pair(id)?.lock().history.buckets())
    }

    pub fn breaker_state(&self, id: &PairId) -> Result<CircuitBreaker> {
        Ok(self.pair(id)?.lock().breaker.clone())
    }

    pub fn pending_submissions(&self, id: &PairId) -> Result<Vec<PriceSubmission>> {
        Ok(self.pair(id)?.lock().buffer.values().copied().collect())
    }

    // -------------------------
    // Admin
    // -------------------------

    pub fn update_settings(&self, ctx: &CallContext, update: &SettingsUpdate) -> Result<OracleSettings> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let mut settings = self.settings.write();
        let next = settings.apply(update)?;
        *settings = next.clone();
        info!(?update, "configuração do oráculo atualizada");
        Ok(next)
    }

    pub fn reset_circuit_breaker(&self, ctx: &CallContext, id: &PairId) -> Result<()> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let shared = self.pair(id)?;
        let was_triggered = shared.lock().breaker.reset();
        if was_triggered {
            self.sink.emit(Event::CircuitBreakerReset { pair: id.clone(), manual: true, timestamp: ctx.now });
        }
        Ok(())
    }

    pub fn set_pause(&self, ctx: &CallContext, paused: bool) -> Result<()> {
        ensure_admin(&ctx.caller, &self.admin)?;
        self.paused.store(paused, Ordering::Release);
        info!(paused, "pausa do oráculo alterada");
        Ok(())
    }
}
