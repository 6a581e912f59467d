use crate::{
    entities::{course, module},
    error::ServiceError,
    services::ordering::OrderScope,
};
use log::info;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, ModelTrait, QueryFilter, QueryOrder, TransactionTrait,
};

/// Editable fields of a module
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleFields {
    pub title: String,
    pub description: String,
    pub content: Option<String>,
}

/// One row of a submitted module formset, after validation
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleChange {
    Create(ModuleFields),
    Update(i32, ModuleFields),
    Delete(i32),
}

pub struct ModuleService;

impl ModuleService {
    /// Creates a module at the end of its course unless an order is given
    pub async fn create(
        db: &DatabaseConnection,
        course_id: i32,
        fields: ModuleFields,
        order: Option<i32>,
    ) -> Result<module::Model, DbErr> {
        let txn = db.begin().await?;
        let model = Self::insert(&txn, course_id, fields, order).await?;
        txn.commit().await?;

        Ok(model)
    }

    async fn insert<C: ConnectionTrait>(
        conn: &C,
        course_id: i32,
        fields: ModuleFields,
        order: Option<i32>,
    ) -> Result<module::Model, DbErr> {
        let order = match order {
            Some(order) => order,
            None => {
                OrderScope::next::<module::Entity, _>(
                    conn,
                    module::Column::CourseId,
                    course_id,
                    module::Column::Order,
                )
                .await?
            }
        };

        let model = module::ActiveModel {
            course_id: Set(course_id),
            title: Set(fields.title),
            description: Set(fields.description),
            content: Set(fields.content),
            order: Set(order),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        info!(
            "Created module {} in course {course_id} at position {order}",
            model.id
        );
        Ok(model)
    }

    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        fields: ModuleFields,
    ) -> Result<Option<module::Model>, DbErr> {
        let Some(existing) = module::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        Self::apply_fields(db, existing, fields).await.map(Some)
    }

    async fn apply_fields<C: ConnectionTrait>(
        conn: &C,
        existing: module::Model,
        fields: ModuleFields,
    ) -> Result<module::Model, DbErr> {
        let mut active: module::ActiveModel = existing.into();
        active.title = Set(fields.title);
        active.description = Set(fields.description);
        active.content = Set(fields.content);
        active.update(conn).await
    }

    /// Deletes a module and, through the cascade, its content slots
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<bool, DbErr> {
        let result = module::Entity::delete_by_id(id).exec(db).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn get(db: &DatabaseConnection, id: i32) -> Result<Option<module::Model>, DbErr> {
        module::Entity::find_by_id(id).one(db).await
    }

    /// The module together with the course it belongs to
    pub async fn get_with_course(
        db: &DatabaseConnection,
        id: i32,
    ) -> Result<Option<(module::Model, course::Model)>, DbErr> {
        let found = module::Entity::find_by_id(id)
            .find_also_related(course::Entity)
            .one(db)
            .await?;

        Ok(found.and_then(|(module, course)| course.map(|course| (module, course))))
    }

    pub async fn list_for_course(
        db: &DatabaseConnection,
        course_id: i32,
    ) -> Result<Vec<module::Model>, DbErr> {
        module::Entity::find()
            .filter(module::Column::CourseId.eq(course_id))
            .order_by_asc(module::Column::Order)
            .all(db)
            .await
    }

    /// Sets explicit positions for modules of one course
    pub async fn reorder(
        db: &DatabaseConnection,
        course_id: i32,
        orders: &[(i32, i32)],
    ) -> Result<u64, DbErr> {
        let txn = db.begin().await?;
        let updated = OrderScope::reorder::<module::Entity, _>(
            &txn,
            module::Column::Id,
            module::Column::CourseId,
            course_id,
            module::Column::Order,
            orders,
        )
        .await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Applies a validated module formset to a course in one transaction
    ///
    /// Deletions run first, then updates, then creations (each appended after
    /// the current last module). Every referenced module must belong to the course.
    pub async fn apply_formset(
        db: &DatabaseConnection,
        course_id: i32,
        changes: Vec<ModuleChange>,
    ) -> Result<Vec<module::Model>, ServiceError> {
        let txn = db.begin().await?;

        let existing = module::Entity::find()
            .filter(module::Column::CourseId.eq(course_id))
            .all(&txn)
            .await?;
        let find = |id: i32| existing.iter().find(|m| m.id == id).cloned();

        let (mut deletes, mut updates, mut creates) = (Vec::new(), Vec::new(), Vec::new());
        for change in changes {
            match change {
                ModuleChange::Delete(id) => {
                    deletes.push(find(id).ok_or(ServiceError::NotFound("module"))?)
                }
                ModuleChange::Update(id, fields) => {
                    updates.push((find(id).ok_or(ServiceError::NotFound("module"))?, fields))
                }
                ModuleChange::Create(fields) => creates.push(fields),
            }
        }

        for module in deletes {
            info!("Deleting module {} from course {course_id}", module.id);
            module.delete(&txn).await?;
        }
        for (module, fields) in updates {
            Self::apply_fields(&txn, module, fields).await?;
        }
        for fields in creates {
            Self::insert(&txn, course_id, fields, None).await?;
        }

        let modules = module::Entity::find()
            .filter(module::Column::CourseId.eq(course_id))
            .order_by_asc(module::Column::Order)
            .all(&txn)
            .await?;
        txn.commit().await?;

        Ok(modules)
    }
}
