//! PoolRegistry: dono de todos os pools, um `Mutex` por pool.
//!
//! Cada operação trava só o pool alvo, aplica a transição e, se tudo deu certo,
//! emite o evento e registra as métricas. Erros não emitem nada.
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug_span, info};

use crate::auth::{ensure_admin, Address, CallContext};
use crate::config::PoolDefaults;
use crate::error::Result;
use crate::error_catalog::ErrorCode;
use crate::events::{Event, EventSink};
use crate::metrics;

use super::flash::{FlashRepayment, FlashTerms};
use super::pool::{LiquidityReceipt, PoolInfo, PoolParams, ReservePool, SwapReceipt, Withdrawal};
use super::types::{Amount, PoolId, Side, SwapDirection};

type SharedPool = Arc<Mutex<ReservePool>>;

pub struct PoolRegistry {
    admin: Address,
    defaults: PoolDefaults,
    pools: RwLock<HashMap<PoolId, SharedPool>>,
    sink: Arc<dyn EventSink>,
}

impl PoolRegistry {
    pub fn new(admin: Address, defaults: PoolDefaults, sink: Arc<dyn EventSink>) -> Result<Self> {
        defaults.validate()?;
        Ok(Self { admin, defaults, pools: RwLock::new(HashMap::new()), sink })
    }

    pub fn admin(&self) -> &Address {
        &self.admin
    }

    fn pool(&self, id: &PoolId) -> Result<SharedPool> {
        self.pools
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| crate::core_err!(ErrorCode::UnknownPool, pool => id))
    }

    pub fn pool_ids(&self) -> Vec<PoolId> {
        let mut ids: Vec<PoolId> = self.pools.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Cria um pool (admin). O depósito inicial fica creditado ao admin.
    pub fn initialize_pool(
        &self,
        ctx: &CallContext,
        id: PoolId,
        params: PoolParams,
        initial_a: Amount,
        initial_b: Amount,
    ) -> Result<Amount> {
        ensure_admin(&ctx.caller, &self.admin)?;
        let _span = debug_span!("initialize_pool", pool = %id).entered();

        let mut pools = self.pools.write();
        if pools.contains_key(&id) {
            crate::core_bail!(ErrorCode::PoolExists, pool => id);
        }
        let pool = ReservePool::initialize(
            id.clone(),
            params,
            ctx.caller,
            initial_a,
            initial_b,
            ctx.now,
            self.defaults,
        )?;
        let minted = pool.lp_supply();
        pools.insert(id.clone(), Arc::new(Mutex::new(pool)));
        drop(pools);

        info!(pool = %id, initial_a, initial_b, minted, "pool inicializado");
        metrics::record_liquidity(id.as_str(), "initialize");
        self.sink.emit(Event::LiquidityAdded {
            pool: id,
            provider: ctx.caller,
            amount_a: initial_a,
            amount_b: initial_b,
            lp_minted: minted,
        });
        Ok(minted)
    }

    pub fn swap_exact_input(
        &self,
        ctx: &CallContext,
        id: &PoolId,
        direction: SwapDirection,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> Result<SwapReceipt> {
        let shared = self.pool(id)?;
        let receipt = metrics::time("swap", || {
            let _span = debug_span!("swap", pool = %id).entered();
            shared.lock().swap_exact_input(direction, amount_in, min_amount_out, ctx.now)
        })?;

        metrics::record_swap(id.as_str(), receipt.price_impact_bps, receipt.k_growth_rel);
        self.sink.emit(Event::SwapExecuted {
            pool: id.clone(),
            direction,
            amount_in: receipt.amount_in,
            amount_out: receipt.amount_out,
            fee_amount: receipt.fee_amount,
            price_impact_bps: receipt.price_impact_bps,
        });
        Ok(receipt)
    }

    pub fn add_liquidity(
        &self,
        ctx: &CallContext,
        id: &PoolId,
        amount_a: Amount,
        amount_b: Amount,
        min_lp_out: Amount,
    ) -> Result<LiquidityReceipt> {
        let shared = self.pool(id)?;
        let receipt = metrics::time("add_liquidity", || {
            shared.lock().add_liquidity(ctx.caller, amount_a, amount_b, min_lp_out, ctx.now)
        })?;

        metrics::record_liquidity(id.as_str(), "add");
        self.sink.emit(Event::LiquidityAdded {
            pool: id.clone(),
            provider: ctx.caller,
            amount_a: receipt.amount_a,
            amount_b: receipt.amount_b,
            lp_minted: receipt.lp_minted,
        });
        Ok(receipt)
    }

    pub fn remove_liquidity(
        &self,
        ctx: &CallContext,
        id: &PoolId,
        shares: Amount,
        min_a: Amount,
        min_b: Amount,
    ) -> Result<Withdrawal> {
        let shared = self.pool(id)?;
        let w = metrics::time("remove_liquidity", || {
            shared.lock().remove_liquidity(ctx.caller, shares, min_a, min_b, ctx.now)
        })?;

        metrics::record_liquidity(id.as_str(), "remove");
        self.sink.emit(Event::LiquidityRemoved {
            pool: id.clone(),
            provider: ctx.caller,
            amount_a: w.amount_a,
            amount_b: w.amount_b,
            lp_burned: w.lp_burned,
        });
        Ok(w)
    }

    /// Flash loan em forma de closure: o pool fica travado do empréstimo ao pagamento.
    /// `callback` recebe os termos e devolve quanto está repagando.
    pub fn flash_loan<F>(
        &self,
        ctx: &CallContext,
        id: &PoolId,
        side: Side,
        amount: Amount,
        callback: F,
    ) -> Result<FlashRepayment>
    where
        F: FnOnce(&FlashTerms) -> Result<Amount>,
    {
        let shared = self.pool(id)?;
        let repayment = metrics::time("flash_loan", || {
            let mut pool = shared.lock();
            let loan = pool.flash_borrow(side, amount, ctx.now)?;
            let terms = loan.terms();
            let repaid = callback(&terms)?;
            loan.repay(repaid)
        })?;

        metrics::record_flash_loan(id.as_str());
        self.sink.emit(Event::FlashLoanRepaid {
            pool: id.clone(),
            side,
            principal: repayment.principal,
            fee: repayment.fee,
        });
        Ok(repayment)
    }

    pub fn quote(&self, id: &PoolId, direction: SwapDirection, amount_in: Amount) -> Result<Amount> {
        self.pool(id)?.lock().quote(direction, amount_in)
    }

    pub fn quote_exact_output(&self, id: &PoolId, direction: SwapDirection, amount_out: Amount) -> Result<Amount> {
        self.pool(id)?.lock().quote_exact_output(direction, amount_out)
    }

    pub fn pool_info(&self, id: &PoolId) -> Result<PoolInfo> {
        Ok(self.pool(id)?.lock().info())
    }

    pub fn lp_balance_of(&self, id: &PoolId, provider: &Address) -> Result<Amount> {
        Ok(self.pool(id)?.lock().lp_balance_of(provider))
    }
}
