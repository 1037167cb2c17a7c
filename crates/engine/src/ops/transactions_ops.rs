use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CategoryTxCmd, EngineError, MoneyCents, ResultEngine, Transaction, TransactionKind, categories,
    transactions, util::normalize_text, validation::validate_expense,
};

use super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// `from` is inclusive and `to` is exclusive (`[from, to)`), both in UTC.
/// Without `limit` every matching transaction is returned.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    pub category_id: Option<Uuid>,
    pub kind: Option<TransactionKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<u64>,
    pub offset: u64,
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(EngineError::invalid("invalid range: from must be < to"));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(category_id) = filter.category_id {
            self = self.filter(transactions::Column::CategoryId.eq(category_id.to_string()));
        }
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::TransactionType.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::CreatedAt.lt(to));
        }
        self
    }
}

impl Engine {
    /// Record an expense against a category.
    ///
    /// The category balance goes down by `amount`; the budget's
    /// `available_balance` is untouched. Fails with `InsufficientFunds` when
    /// the balance does not cover the expense.
    pub async fn create_expense(&self, cmd: CategoryTxCmd) -> ResultEngine<Transaction> {
        validate_expense(&cmd)?;

        let _lock = self.locks.lock(cmd.category_id).await;
        let tx = with_tx!(self, |db_tx| {
            let category = self
                .require_category(&db_tx, cmd.user_id, cmd.category_id)
                .await?;
            category.preview_debit(cmd.amount)?;

            self.debit_category(&db_tx, category.id, cmd.amount, cmd.created_at)
                .await?;

            let mut tx = Transaction::new(
                category.budget_id,
                category.id,
                TransactionKind::Expense,
                cmd.amount,
                normalize_text(&cmd.description),
                cmd.created_at,
            );
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            tx.category_name = category.name;
            Ok::<_, EngineError>(tx)
        })?;

        tracing::info!(
            user_id = %cmd.user_id,
            category_id = %tx.category_id,
            amount = %tx.amount,
            "expense recorded"
        );
        Ok(tx)
    }

    /// Credit a category with money coming back (a refund or
    /// reimbursement).
    ///
    /// The credit cannot exceed what was spent from the category
    /// (`allocated_amount - current_balance`).
    pub async fn record_income(&self, cmd: CategoryTxCmd) -> ResultEngine<Transaction> {
        validate_expense(&cmd)?;

        let _lock = self.locks.lock(cmd.category_id).await;
        let tx = with_tx!(self, |db_tx| {
            let category = self
                .require_category(&db_tx, cmd.user_id, cmd.category_id)
                .await?;
            let spent = category.spent();
            if cmd.amount > spent {
                return Err(EngineError::InvalidState(format!(
                    "income of {} exceeds the {} spent from category '{}'",
                    cmd.amount,
                    spent.max(MoneyCents::ZERO),
                    category.name
                )));
            }

            self.credit_category(
                &db_tx,
                category.id,
                cmd.amount,
                Some(category.allocated_amount),
                cmd.created_at,
            )
            .await?;

            let mut tx = Transaction::new(
                category.budget_id,
                category.id,
                TransactionKind::Income,
                cmd.amount,
                normalize_text(&cmd.description),
                cmd.created_at,
            );
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            tx.category_name = category.name;
            Ok::<_, EngineError>(tx)
        })?;

        tracing::info!(
            user_id = %cmd.user_id,
            category_id = %tx.category_id,
            amount = %tx.amount,
            "income recorded"
        );
        Ok(tx)
    }

    /// List the transactions of the user's budget, newest first.
    ///
    /// Ordering is `(created_at DESC, id DESC)`, so transactions sharing a
    /// timestamp keep a stable order across pages. A user without a budget
    /// has no transactions.
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            let Some(budget) = self.find_budget(&db_tx, user_id).await? else {
                return Ok(Vec::new());
            };

            let mut query = transactions::Entity::find()
                .find_also_related(categories::Entity)
                .filter(transactions::Column::BudgetId.eq(budget.id))
                .apply_tx_filters(filter)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id);
            if filter.offset > 0 {
                // SQLite needs a LIMIT for OFFSET to apply.
                query = query
                    .offset(filter.offset)
                    .limit(filter.limit.unwrap_or(i64::MAX as u64));
            } else if let Some(limit) = filter.limit {
                query = query.limit(limit);
            }

            let rows: Vec<(transactions::Model, Option<categories::Model>)> =
                query.all(&db_tx).await?;
            rows.into_iter()
                .map(|(tx, category)| Transaction::try_from((tx, category.map(|c| c.name))))
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Page through the same listing as [`Engine::list_transactions`],
    /// `page_size` transactions at a time.
    ///
    /// The pager starts at `filter.offset` and, when `filter.limit` is set,
    /// stops after that many transactions.
    pub fn transaction_pages(
        &self,
        user_id: Uuid,
        filter: TransactionListFilter,
        page_size: u64,
    ) -> TransactionPager<'_> {
        TransactionPager {
            engine: self,
            user_id,
            filter,
            page_size: page_size.max(1),
            yielded: 0,
            done: false,
        }
    }
}

/// Lazy, finite pager over a user's transactions.
///
/// Each call to [`TransactionPager::next_page`] runs one query. Once a short
/// or empty page is seen the pager is exhausted until [`TransactionPager::reset`].
#[derive(Debug)]
pub struct TransactionPager<'a> {
    engine: &'a Engine,
    user_id: Uuid,
    filter: TransactionListFilter,
    page_size: u64,
    yielded: u64,
    done: bool,
}

impl TransactionPager<'_> {
    /// Next page, or `None` once every transaction was returned.
    pub async fn next_page(&mut self) -> ResultEngine<Option<Vec<Transaction>>> {
        if self.done {
            return Ok(None);
        }

        let mut page_size = self.page_size;
        if let Some(limit) = self.filter.limit {
            page_size = page_size.min(limit.saturating_sub(self.yielded));
        }
        if page_size == 0 {
            self.done = true;
            return Ok(None);
        }

        let page_filter = TransactionListFilter {
            limit: Some(page_size),
            offset: self.filter.offset + self.yielded,
            ..self.filter.clone()
        };
        let page = self
            .engine
            .list_transactions(self.user_id, &page_filter)
            .await?;

        self.yielded += page.len() as u64;
        if (page.len() as u64) < page_size {
            self.done = true;
        }
        if page.is_empty() {
            return Ok(None);
        }
        Ok(Some(page))
    }

    /// Start again from the first page.
    pub fn reset(&mut self) {
        self.yielded = 0;
        self.done = false;
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn empty_range_is_rejected() {
        let now = Utc::now();
        let filter = TransactionListFilter {
            from: Some(now),
            to: Some(now - Duration::days(1)),
            ..Default::default()
        };
        assert!(matches!(
            validate_list_filter(&filter),
            Err(EngineError::Validation(_))
        ));
        assert!(validate_list_filter(&TransactionListFilter::default()).is_ok());
    }
}
