//! Cancellation business rule.
//!
//! The rule itself is a threshold plus a fee; the interesting part is the
//! logging contract: every outcome is forwarded to the log service on a
//! detached task, and the response never waits on or reflects the logging
//! result.

use std::sync::Arc;

use crate::logs::{CancellationAttemptRecord, CancellationLogService};
use crate::observability::metrics;
use crate::orders::types::{CancellationResponse, Order, OrderStatus, RequestMeta};

/// Inclusive upper bound on cancellable order amounts.
pub const CANCELLATION_LIMIT: f64 = 1000.0;

/// Fee charged on successful cancellation, as a fraction of the amount.
pub const CANCELLATION_FEE_RATE: f64 = 0.10;

/// Whether an order amount is eligible for cancellation. Pure function of
/// the amount alone; the boundary is inclusive.
pub fn can_cancel_order(total_amount: f64) -> bool {
    total_amount <= CANCELLATION_LIMIT
}

/// Cancellation processor.
///
/// The log service is an optional collaborator: when absent, logging calls
/// are no-ops, never errors.
pub struct CancellationService {
    logs: Option<Arc<CancellationLogService>>,
}

impl CancellationService {
    pub fn new(logs: Option<Arc<CancellationLogService>>) -> Self {
        Self { logs }
    }

    /// Decide the cancellation outcome and fire off the attempt record.
    ///
    /// Returns as soon as the decision is made; the log write proceeds
    /// concurrently on its own task.
    pub fn cancel(&self, order: Order, meta: RequestMeta) -> CancellationResponse {
        let response = Self::decide(order.clone());

        metrics::record_cancellation(response.success);

        let record = if response.success {
            CancellationAttemptRecord::succeeded(
                &order.id,
                order.total_amount,
                order.status.as_str(),
                response.message.clone(),
                response.tax.unwrap_or(0.0),
            )
        } else {
            CancellationAttemptRecord::failed(
                &order.id,
                order.total_amount,
                order.status.as_str(),
                response.message.clone(),
                failure_reason(&order),
            )
        };
        self.log_attempt(record.with_client(meta.client_ip, meta.user_agent));

        response
    }

    fn decide(order: Order) -> CancellationResponse {
        if !can_cancel_order(order.total_amount) {
            return CancellationResponse {
                success: false,
                message: format!(
                    "Order {} cannot be cancelled: amount {:.2} is above the {:.2} limit",
                    order.id, order.total_amount, CANCELLATION_LIMIT
                ),
                tax: None,
                order: None,
            };
        }

        if order.status == OrderStatus::Canceled {
            return CancellationResponse {
                success: false,
                message: format!("Order {} is already cancelled", order.id),
                tax: None,
                order: None,
            };
        }

        let tax = order.total_amount * CANCELLATION_FEE_RATE;
        let cancelled = Order {
            status: OrderStatus::Canceled,
            ..order
        };
        CancellationResponse {
            success: true,
            message: format!("Order {} cancelled successfully", cancelled.id),
            tax: Some(tax),
            order: Some(cancelled),
        }
    }

    /// Fire-and-forget: spawn the log write and return immediately.
    fn log_attempt(&self, record: CancellationAttemptRecord) {
        let Some(logs) = &self.logs else {
            return;
        };
        let logs = Arc::clone(logs);
        tokio::spawn(async move {
            logs.record_attempt(record).await;
        });
    }
}

/// The failure reason recorded for a refused attempt.
fn failure_reason(order: &Order) -> &'static str {
    if !can_cancel_order(order.total_amount) {
        "amount above limit"
    } else {
        "already cancelled"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, total_amount: f64, status: OrderStatus) -> Order {
        Order {
            id: id.to_string(),
            total_amount,
            status,
        }
    }

    fn service() -> CancellationService {
        // No log collaborator: logging must be a silent no-op.
        CancellationService::new(None)
    }

    #[test]
    fn eligibility_boundary_is_inclusive() {
        assert!(can_cancel_order(999.99));
        assert!(can_cancel_order(1000.00));
        assert!(!can_cancel_order(1000.01));
    }

    #[test]
    fn pending_order_below_limit_cancels_with_exact_fee() {
        let response = service().cancel(order("A1", 500.0, OrderStatus::Pending), RequestMeta::default());
        assert!(response.success);
        assert_eq!(response.tax, Some(50.0));
        let cancelled = response.order.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Canceled);
        assert_eq!(cancelled.id, "A1");
    }

    #[test]
    fn order_above_limit_is_refused_without_fee() {
        let response = service().cancel(order("A2", 1500.0, OrderStatus::Pending), RequestMeta::default());
        assert!(!response.success);
        assert!(response.tax.is_none());
        assert!(response.order.is_none());
    }

    #[test]
    fn already_cancelled_order_reports_that_reason_not_the_limit() {
        let target = order("A3", 400.0, OrderStatus::Canceled);
        let response = service().cancel(target.clone(), RequestMeta::default());
        assert!(!response.success);
        assert!(response.message.contains("already cancelled"));
        assert_eq!(failure_reason(&target), "already cancelled");
    }

    #[test]
    fn amount_limit_applies_even_to_cancelled_orders() {
        let target = order("A4", 1500.0, OrderStatus::Canceled);
        let response = service().cancel(target.clone(), RequestMeta::default());
        assert!(!response.success);
        assert_eq!(failure_reason(&target), "amount above limit");
    }

    #[test]
    fn exact_limit_order_cancels() {
        let response = service().cancel(order("A5", 1000.0, OrderStatus::Paid), RequestMeta::default());
        assert!(response.success);
        assert_eq!(response.tax, Some(100.0));
    }
}
