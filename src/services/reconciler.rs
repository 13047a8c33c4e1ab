use tokio::time::{interval, MissedTickBehavior};

use crate::db;
use crate::services::asaas::NewCustomer;
use crate::state::AppState;

/// Spawns the customer-link reconciler: a periodic pass that retries gateway
/// customer registration for accounts whose inline attempt failed (or never
/// ran), so a transient gateway outage cannot leave an account permanently
/// unable to check out.
pub fn spawn(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(state))
}

async fn run(state: AppState) {
    let mut ticker = interval(state.config.customer_sync_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        if let Err(err) = sync_unlinked_customers(&state).await {
            tracing::warn!(error = ?err, "Customer link sync pass failed");
        }
    }
}

async fn sync_unlinked_customers(state: &AppState) -> Result<(), sqlx::Error> {
    let pending = db::accounts::with_unlinked_customer(&state.pool).await?;
    if pending.is_empty() {
        return Ok(());
    }

    tracing::info!(
        count = pending.len(),
        "Retrying gateway customer registration"
    );

    for account in pending {
        // The query only returns complete profiles, but the row may have
        // been edited between the select and this iteration.
        let Some(payload) = NewCustomer::from_account(&account) else {
            continue;
        };

        match state.asaas.create_customer(&payload).await {
            Ok(customer_id) => {
                db::accounts::link_customer(&state.pool, account.id, &customer_id).await?;
                tracing::info!(
                    account_id = %account.id,
                    customer_id = %customer_id,
                    "Gateway customer linked by reconciler"
                );
            }
            Err(err) => {
                tracing::warn!(
                    account_id = %account.id,
                    error = %err,
                    "Gateway customer registration failed, will retry next pass"
                );
                db::accounts::mark_link_failed(&state.pool, account.id).await?;
            }
        }
    }

    Ok(())
}
