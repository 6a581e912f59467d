use models::ordering::next_order;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect,
    sea_query::Expr,
};

/// Order values scoped to a parent row (modules within a course, contents within a module)
pub struct OrderScope;

impl OrderScope {
    /// Largest order among the rows of `E` whose `scope` column equals `scope_id`
    pub async fn current_max<E, C>(
        conn: &C,
        scope: E::Column,
        scope_id: i32,
        order: E::Column,
    ) -> Result<Option<i32>, DbErr>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let max = E::find()
            .select_only()
            .column_as(order.max(), "max_order")
            .filter(scope.eq(scope_id))
            .into_tuple::<Option<i32>>()
            .one(conn)
            .await?;

        Ok(max.flatten())
    }

    /// Smallest order in the scope
    pub async fn current_min<E, C>(
        conn: &C,
        scope: E::Column,
        scope_id: i32,
        order: E::Column,
    ) -> Result<Option<i32>, DbErr>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let min = E::find()
            .select_only()
            .column_as(order.min(), "min_order")
            .filter(scope.eq(scope_id))
            .into_tuple::<Option<i32>>()
            .one(conn)
            .await?;

        Ok(min.flatten())
    }

    /// Order for a new row in the scope: one past the current maximum, or 0
    pub async fn next<E, C>(
        conn: &C,
        scope: E::Column,
        scope_id: i32,
        order: E::Column,
    ) -> Result<i32, DbErr>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let max = Self::current_max::<E, C>(conn, scope, scope_id, order).await?;
        next_order(max).ok_or_else(|| DbErr::Custom(format!("no order left in scope {scope_id}")))
    }

    /// Assigns explicit orders to rows of one scope
    ///
    /// Rows are first parked below the smallest order of the scope so that
    /// swapping two orders never trips the `(scope, order)` unique index
    /// halfway through. Ids that do not belong to the scope are left alone.
    /// Run this inside a transaction.
    pub async fn reorder<E, C>(
        conn: &C,
        id: E::Column,
        scope: E::Column,
        scope_id: i32,
        order: E::Column,
        orders: &[(i32, i32)],
    ) -> Result<u64, DbErr>
    where
        E: EntityTrait,
        C: ConnectionTrait,
    {
        let floor = Self::current_min::<E, C>(conn, scope, scope_id, order)
            .await?
            .unwrap_or(0)
            .min(0);

        for (idx, (row_id, _)) in orders.iter().enumerate() {
            let parked = i32::try_from(idx)
                .ok()
                .and_then(|idx| floor.checked_sub(idx))
                .and_then(|value| value.checked_sub(1))
                .ok_or_else(|| DbErr::Custom(format!("cannot park {} rows", orders.len())))?;
            E::update_many()
                .col_expr(order, Expr::value(parked))
                .filter(id.eq(*row_id))
                .filter(scope.eq(scope_id))
                .exec(conn)
                .await?;
        }

        let mut updated = 0;
        for (row_id, new_order) in orders {
            let result = E::update_many()
                .col_expr(order, Expr::value(*new_order))
                .filter(id.eq(*row_id))
                .filter(scope.eq(scope_id))
                .exec(conn)
                .await?;
            updated += result.rows_affected;
        }

        Ok(updated)
    }
}
