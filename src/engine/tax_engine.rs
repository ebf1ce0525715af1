use crate::domain::{Decimal, Operation, OperationKind, TaxResult};
use tracing::trace;

use super::{EngineError, TaxRules};

/// Running position for one batch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineState {
    /// Cost basis per held share (only meaningful when held_quantity > 0).
    pub weighted_average_price: Decimal,

    /// Shares currently held.
    pub held_quantity: u64,

    /// Loss carried forward to offset future taxable profit. Never negative.
    pub accumulated_loss: Decimal,
}

impl EngineState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_flat(&self) -> bool {
        self.held_quantity == 0
    }
}

/// Stateful tax calculator for a single batch of operations.
///
/// An engine always starts flat with no carried loss; create a new one for
/// every batch instead of reusing an old one.
pub struct TaxEngine {
    rules: TaxRules,
    state: EngineState,
    operations_processed: usize,
}

impl TaxEngine {
    pub fn new(rules: TaxRules) -> Self {
        Self {
            rules,
            state: EngineState::new(),
            operations_processed: 0,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Apply one operation and return the tax it owes.
    ///
    /// # Errors
    /// Returns [`EngineError::InsufficientHoldings`] when a sell exceeds the
    /// shares currently held, and [`EngineError::Overflow`] when any amount
    /// leaves the representable range. State is not modified in either case.
    pub fn process_operation(&mut self, op: &Operation) -> Result<TaxResult, EngineError> {
        let result = match op.kind {
            OperationKind::Buy => self.handle_buy(op)?,
            OperationKind::Sell => self.handle_sell(op)?,
        };
        self.operations_processed += 1;
        Ok(result)
    }

    fn overflow(&self) -> EngineError {
        EngineError::Overflow {
            operation: self.operations_processed,
        }
    }

    /// Buys move the cost basis and never owe tax.
    fn handle_buy(&mut self, op: &Operation) -> Result<TaxResult, EngineError> {
        let held_quantity = self
            .state
            .held_quantity
            .checked_add(op.quantity)
            .ok_or_else(|| self.overflow())?;

        let weighted_average_price = if self.state.is_flat() {
            op.unit_price
        } else {
            let held = Decimal::from(self.state.held_quantity);
            let bought = Decimal::from(op.quantity);
            held
                .checked_mul(self.state.weighted_average_price)
                .zip(bought.checked_mul(op.unit_price))
                .and_then(|(held_value, bought_value)| held_value.checked_add(bought_value))
                .and_then(|total_cost| total_cost.checked_div(Decimal::from(held_quantity)))
                .ok_or_else(|| self.overflow())?
        };

        self.state.weighted_average_price = weighted_average_price;
        self.state.held_quantity = held_quantity;

        trace!(
            index = self.operations_processed,
            quantity = op.quantity,
            unit_price = %op.unit_price,
            weighted_average_price = %self.state.weighted_average_price,
            held_quantity = self.state.held_quantity,
            "buy applied"
        );

        Ok(TaxResult::exempt())
    }

    fn handle_sell(&mut self, op: &Operation) -> Result<TaxResult, EngineError> {
        if op.quantity > self.state.held_quantity {
            return Err(EngineError::InsufficientHoldings {
                operation: self.operations_processed,
                requested: op.quantity,
                held: self.state.held_quantity,
            });
        }

        let total_value = op.total_value().ok_or_else(|| self.overflow())?;
        let profit = op
            .unit_price
            .checked_sub(self.state.weighted_average_price)
            .and_then(|margin| margin.checked_mul(Decimal::from(op.quantity)))
            .ok_or_else(|| self.overflow())?;

        // Losses carry forward even from exempt sells; exempt profit is discarded.
        let taxable_sell = total_value > self.rules.tax_free_threshold;
        let (accumulated_loss, tax) = if profit.is_negative() {
            let loss = self
                .state
                .accumulated_loss
                .checked_add(-profit)
                .ok_or_else(|| self.overflow())?;
            (loss, Decimal::zero())
        } else if taxable_sell && profit.is_positive() {
            self.offset_and_tax(profit).ok_or_else(|| self.overflow())?
        } else {
            (self.state.accumulated_loss, Decimal::zero())
        };

        self.state.held_quantity -= op.quantity;
        self.state.accumulated_loss = accumulated_loss;

        trace!(
            index = self.operations_processed,
            quantity = op.quantity,
            unit_price = %op.unit_price,
            total_value = %total_value,
            profit = %profit,
            accumulated_loss = %self.state.accumulated_loss,
            held_quantity = self.state.held_quantity,
            tax = %tax,
            "sell applied"
        );

        Ok(TaxResult::new(tax))
    }

    /// Drain carried loss against a taxable profit, then tax what remains.
    ///
    /// Returns the remaining carried loss and the tax owed.
    fn offset_and_tax(&self, profit: Decimal) -> Option<(Decimal, Decimal)> {
        let carried = self.state.accumulated_loss;
        if carried >= profit {
            return Some((carried - profit, Decimal::zero()));
        }

        let taxable = profit - carried;
        let tax = taxable.checked_mul(self.rules.tax_rate)?;
        Some((Decimal::zero(), tax))
    }
}

/// Run one batch through a fresh engine.
///
/// Results are returned in input order, one per operation. The batch fails
/// as a whole on the first engine error.
pub fn process_batch(
    rules: TaxRules,
    operations: &[Operation],
) -> Result<Vec<TaxResult>, EngineError> {
    let mut engine = TaxEngine::new(rules);
    operations
        .iter()
        .map(|op| engine.process_operation(op))
        .collect()
}
