//! Order status changes driven by gateways and managers.
//!
//! Every change goes through [`apply_status`], which checks the transition
//! against the order state machine, writes it with a compare-and-set so
//! concurrent webhooks cannot double-apply, and revokes channel access on
//! refunds when the Telegram bot is configured.

use coursely_core::error::CoreError;
use coursely_core::payments::{OrderStatus, Transition};
use coursely_db::models::order::Order;
use coursely_db::repositories::OrderRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Result of [`apply_status`]: the current order and whether this call changed it.
#[derive(Debug)]
pub struct StatusChange {
    pub order: Order,
    pub applied: bool,
}

/// Move `order` to `to`. Repeating the current status is a no-op.
pub async fn apply_status(
    state: &AppState,
    order: &Order,
    to: OrderStatus,
    gateway_reference: Option<&str>,
) -> AppResult<StatusChange> {
    let from = order.order_status().ok_or_else(|| {
        AppError::InternalError(format!("Order {} has unknown status '{}'", order.id, order.status))
    })?;

    if from.transition(to)? == Transition::Unchanged {
        return Ok(StatusChange {
            order: order.clone(),
            applied: false,
        });
    }

    let Some(updated) =
        OrderRepo::transition(&state.pool, order.id, from, to, gateway_reference).await?
    else {
        // Lost a race with another delivery; report the winner's state.
        let current = OrderRepo::find_by_id(&state.pool, order.id)
            .await?
            .ok_or_else(|| CoreError::not_found("Order", order.id))?;
        if current.order_status() != Some(to) {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Order {} is now '{}'",
                order.id, current.status
            ))));
        }
        return Ok(StatusChange {
            order: current,
            applied: false,
        });
    };

    tracing::info!(
        order_id = updated.id,
        from = from.as_str(),
        to = to.as_str(),
        "Order status changed"
    );

    if to == OrderStatus::Refunded {
        revoke_channel_access(state, &updated).await;
    }

    Ok(StatusChange {
        order: updated,
        applied: true,
    })
}

/// Ban the buyer from the course channel. Failures are logged, not returned:
/// the refund itself has already been recorded.
async fn revoke_channel_access(state: &AppState, order: &Order) {
    let Some(telegram) = &state.telegram else {
        return;
    };
    if let Err(e) =
        coursely_telegram::revoke_access(telegram, &state.pool, order.user_id, order.course_id).await
    {
        tracing::error!(
            order_id = order.id,
            user_id = order.user_id,
            error = %e,
            "Failed to revoke channel access"
        );
    }
}
